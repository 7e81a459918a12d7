use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::api::types::{ThoughtsByDate, UserProfile};
use crate::config::AppConfig;
use mindtrace::dates::{self, format_for_display};
use mindtrace::profile::life_day_label;
use mindtrace::Session;

#[derive(Parser, Debug)]
#[command(name = "mindtrace", version, about = "Journal thoughts by day")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Override the config file location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the most recent days of thoughts
    List(ListArgs),
    /// Write a new thought
    Add(AddArgs),
    /// Replace the content of a thought
    Edit { id: String, content: String },
    /// Delete a thought
    Delete { id: String },
    /// Hide or unhide a thought
    Toggle { id: String },
    /// Show or set the birth date used for life-day labels
    Profile(ProfileArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Number of pages to load (defaults to display.pages)
    #[arg(long)]
    pub pages: Option<usize>,
    /// Show the content of hidden thoughts
    #[arg(long)]
    pub show_hidden: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub content: String,
    /// Day to file the thought under (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_day, conflicts_with = "yesterday")]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub yesterday: bool,
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[arg(long, value_parser = parse_day, conflicts_with = "clear")]
    pub birth_date: Option<NaiveDate>,
    /// Remove the stored birth date
    #[arg(long)]
    pub clear: bool,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    dates::parse_date(s).ok_or_else(|| format!("expected YYYY-MM-DD, got {:?}", s))
}

pub async fn run(
    command: Command,
    config: &AppConfig,
    session: &Session,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = session.thoughts();
    match command {
        Command::List(args) => {
            store.load_initial().await?;
            let pages = args.pages.unwrap_or(config.display.pages).max(1);
            for _ in 1..pages {
                if !store.has_more() {
                    break;
                }
                store.load_more().await?;
            }
            let profile = match session.profiles().load_profile(session.user_id()).await {
                Ok(profile) => profile,
                Err(err) => {
                    tracing::warn!(%err, "listing thoughts without life-day labels");
                    None
                }
            };
            let hide_hidden = config.display.hide_hidden && !args.show_hidden;
            print!(
                "{}",
                render_thoughts(&store.thoughts(), profile.as_ref(), hide_hidden)
            );
            if store.has_more() {
                println!("(older days available: --pages {})", pages + 1);
            }
        }
        Command::Add(args) => {
            let date = match (args.date, args.yesterday) {
                (Some(date), _) => date,
                (None, true) => dates::yesterday(),
                (None, false) => dates::today(),
            };
            let thought = store.add_thought(&args.content, date, args.hidden).await?;
            println!("Added {} on {}", thought.id, format_for_display(thought.date));
        }
        Command::Edit { id, content } => {
            store.update_thought(&id, &content).await?;
            println!("Updated {}", id);
        }
        Command::Delete { id } => {
            store.delete_thought(&id).await?;
            println!("Deleted {}", id);
        }
        Command::Toggle { id } => {
            // Toggling reads the current flag from loaded state, so page until found.
            store.load_initial().await?;
            while store.get(&id).is_none() && store.has_more() {
                store.load_more().await?;
            }
            store.toggle_thought_hidden(&id).await?;
            let hidden = store.get(&id).map(|t| t.thought.hidden).unwrap_or_default();
            println!("{} is now {}", id, if hidden { "hidden" } else { "visible" });
        }
        Command::Profile(args) => {
            let profiles = session.profiles();
            let profile = if args.clear {
                Some(profiles.save_birth_date(session.user_id(), None).await?)
            } else if let Some(birth_date) = args.birth_date {
                Some(profiles.save_birth_date(session.user_id(), Some(birth_date)).await?)
            } else {
                profiles.load_profile(session.user_id()).await?
            };
            println!("{}", render_profile(profile.as_ref(), dates::today()));
        }
        Command::Config => print!("{}", config.to_redacted_toml()?),
    }
    Ok(())
}

pub fn render_thoughts(
    thoughts: &ThoughtsByDate,
    profile: Option<&UserProfile>,
    hide_hidden: bool,
) -> String {
    if thoughts.is_empty() {
        return "No thoughts yet.\n".into();
    }
    let mut out = String::new();
    for (date, bucket) in thoughts.iter().rev() {
        let label = life_day_label(*date, profile);
        if label == date.to_string() {
            let _ = writeln!(out, "## {}", format_for_display(*date));
        } else {
            let _ = writeln!(out, "## Day {} · {}", label, format_for_display(*date));
        }
        for entry in bucket {
            let content = if entry.thought.hidden && hide_hidden {
                "[hidden]"
            } else {
                entry.thought.content.as_str()
            };
            let _ = writeln!(out, "  #{:<3} {}  {}", entry.number, entry.thought.id, content);
        }
        out.push('\n');
    }
    out
}

fn render_profile(profile: Option<&UserProfile>, today: NaiveDate) -> String {
    match profile.and_then(|p| p.birth_date) {
        Some(birth) => format!(
            "Birth date: {}\nToday is life day {}",
            birth,
            life_day_label(today, profile)
        ),
        None => "No birth date set.".into(),
    }
}
