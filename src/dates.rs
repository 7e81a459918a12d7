use chrono::{Days, Local, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn yesterday() -> NaiveDate {
    day_before(today())
}

pub fn today_string() -> String {
    today().format(DATE_FORMAT).to_string()
}

pub fn yesterday_string() -> String {
    yesterday().format(DATE_FORMAT).to_string()
}

fn day_before(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// "Jun 5, 2025"
pub fn format_for_display(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn sort_dates_desc(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
}

pub fn sort_dates_asc(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();
    sorted
}

/// Day of life for `date`, counting the birth day as day 1. `None` before birth.
pub fn life_days(date: NaiveDate, birth_date: NaiveDate) -> Option<u32> {
    let diff = date.signed_duration_since(birth_date).num_days();
    if diff < 0 {
        return None;
    }
    u32::try_from(diff + 1).ok()
}
