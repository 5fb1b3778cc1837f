//! Calendar parsing and the current date

use super::InferenceSettings;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// A calendar parser: turns text into a date and time, or nothing
///
/// Type inference only relies on this trait, so a locale-aware parser can
/// be plugged in with [`super::TypeInference::with_parser`]. Closures of
/// the right shape implement it too.
pub trait DateParser: Send + Sync {
    /// Parse `text`; dates without a time of day come back at midnight
    fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime>;
}

impl<F> DateParser for F
where
    F: Fn(&str) -> Option<NaiveDateTime> + Send + Sync,
{
    fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
        self(text)
    }
}

/// Default parser: RFC 3339, then the configured `chrono` format strings
#[derive(Debug, Clone)]
pub struct ChronoDateParser {
    datetime_formats: Vec<String>,
    date_formats: Vec<String>,
}

impl ChronoDateParser {
    /// Create a parser using the formats from `settings`
    pub fn new(settings: &InferenceSettings) -> Self {
        Self {
            datetime_formats: settings.datetime_formats.clone(),
            date_formats: settings.date_formats.clone(),
        }
    }
}

impl Default for ChronoDateParser {
    fn default() -> Self {
        Self::new(&InferenceSettings::default())
    }
}

impl DateParser for ChronoDateParser {
    fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.naive_local());
        }

        self.datetime_formats
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .or_else(|| {
                self.date_formats.iter().find_map(|fmt| {
                    NaiveDate::parse_from_str(text, fmt)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
            })
    }
}

/// Today's date on the local clock
pub fn current_date() -> NaiveDate {
    Local::now().date_naive()
}

/// The current local date and time
pub fn current_datetime() -> NaiveDateTime {
    Local::now().naive_local()
}
