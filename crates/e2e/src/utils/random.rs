//! Random test values and input validators

use std::sync::OnceLock;

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use uuid::Uuid;

/// `test-<millis>-<9 chars>`, unique per call
pub fn generate_test_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("test-{}-{}", Utc::now().timestamp_millis(), suffix)
}

pub fn random_email() -> String {
    format!(
        "test{}{}@example.com",
        Utc::now().timestamp_millis(),
        random_string(4).to_ascii_lowercase()
    )
}

/// Lowercase alphanumeric string of `length` characters
pub fn random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Uniform integer in `min..=max`; bounds are swapped when reversed
pub fn random_number(min: i64, max: i64) -> i64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rand::thread_rng().gen_range(low..=high)
}

/// A date between `years_back` years ago and today, as `YYYY-MM-DD`
pub fn random_date(years_back: u32) -> String {
    let today = Utc::now().date_naive();
    // Clamped to the earliest representable date
    let span_days = (i64::from(years_back) * 365).min((today - NaiveDate::MIN).num_days());
    let offset = if span_days == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=span_days)
    };
    today
        .checked_sub_signed(ChronoDuration::days(offset))
        .unwrap_or(NaiveDate::MIN)
        .format("%Y-%m-%d")
        .to_string()
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

/// Parses as an absolute URL
pub fn is_valid_url(url: &str) -> bool {
    reqwest::Url::parse(url).is_ok()
}

/// `YYYY-MM-DD` that names a real calendar day
pub fn is_valid_date(date: &str) -> bool {
    static SHAPE: OnceLock<Option<Regex>> = OnceLock::new();
    let shaped = SHAPE
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(date));
    shaped && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}
