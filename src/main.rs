// Re-export SDK modules so binary-internal modules can use crate::api:: and crate::error::
pub(crate) use mindtrace::{api, error};

mod cli;
mod config;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use cli::Cli;
use config::AppConfig;
use mindtrace::{RestClient, Session};

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(|| {
        AppConfig::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    })
}

fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| e as Box<dyn std::error::Error>)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let path = config_path(&cli);
    if !path.exists() {
        AppConfig::write_default(&path)?;
        eprintln!(
            "Created default config at: {}\nPlease edit it with your backend URL, keys and user id, then run again.",
            path.display()
        );
        return Ok(());
    }

    let config = match AppConfig::load_from_path(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            eprintln!("Fix the config file or delete it to regenerate defaults.");
            std::process::exit(1);
        }
    };

    let client = RestClient::new(
        &config.backend.url,
        &config.backend.anon_key,
        &config.backend.access_token,
    );
    let session = Session::sign_in(client, &config.session.user_id, config.session.days_per_load);

    let result = cli::run(cli.command, &config, &session).await;
    session.sign_out();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
