//! Precision-matched rendering of parsed test-case dates.
//!
//! A parsed instant is rendered as a full ISO-8601 UTC string and then cut
//! back so that it shows no more time detail than the raw input did:
//!
//! - `"2024-03-05"` renders as `"2024-03-05T00:00Z"` (seconds and fraction dropped)
//! - `"2024-03-05T10:20"` renders as `"2024-03-05T10:20Z"`
//! - `"2024-03-05 10:20:30.123"` renders as `"2024-03-05T10:20:30.123Z"`

use crate::domain::model::ParseResult;
use chrono::{DateTime, Datelike, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

pub const REJECTION_MARKER: &str = "NaN";

static TIME_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[T ].").expect("time separator pattern is valid"));

static SECONDS_AND_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\d+\.\d+").expect("seconds pattern is valid"));

/// Renders `ts` as `YYYY-MM-DDTHH:mm:ss.sssZ`. Years outside `0..=9999` use
/// the six-digit signed form (`+012345`, `-000001`).
pub fn to_iso_string(ts: &DateTime<Utc>) -> String {
    let year = ts.year();
    let year_str = if (0..=9999).contains(&year) {
        format!("{year:04}")
    } else if year < 0 {
        format!("-{:06}", -i64::from(year))
    } else {
        format!("+{year:06}")
    };
    format!(
        "{year_str}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second(),
        ts.timestamp_subsec_millis().min(999)
    )
}

/// True when the input carries a date/time separator: a `T` (any case) or a
/// space, followed by at least one more character.
pub fn has_time_component(raw_input: &str) -> bool {
    TIME_SEPARATOR.is_match(raw_input)
}

/// Number of precision delimiters (`:`, `.`, `,`) anywhere in the input.
pub fn precision(raw_input: &str) -> usize {
    raw_input
        .chars()
        .filter(|c| matches!(c, ':' | '.' | ','))
        .count()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecisionFormatter {
    rejection_marker: String,
}

impl Default for PrecisionFormatter {
    fn default() -> Self {
        Self::new(REJECTION_MARKER)
    }
}

impl PrecisionFormatter {
    pub fn new(rejection_marker: impl Into<String>) -> Self {
        Self {
            rejection_marker: rejection_marker.into(),
        }
    }

    pub fn rejection_marker(&self) -> &str {
        &self.rejection_marker
    }

    pub fn format(&self, raw_input: &str, result: &ParseResult) -> String {
        match result {
            ParseResult::Rejected => self.rejection_marker.clone(),
            ParseResult::Accepted(ts) => {
                let rendered = to_iso_string(ts);
                if has_time_component(raw_input) {
                    keep_time_groups(&rendered, precision(raw_input))
                } else {
                    SECONDS_AND_FRACTION.replace(&rendered, "").into_owned()
                }
            }
        }
    }
}

/// Formats with the default `NaN` rejection marker.
pub fn format(raw_input: &str, result: &ParseResult) -> String {
    PrecisionFormatter::default().format(raw_input, result)
}

/// Keeps the hour plus `groups` delimiter-led digit groups of a rendered ISO
/// string, then the trailing `Z`. Left untouched if fewer groups exist.
fn keep_time_groups(rendered: &str, groups: usize) -> String {
    let Some(separator) = rendered.find('T') else {
        return rendered.to_string();
    };
    let anchor = separator + 3;
    let Some(time) = rendered
        .get(anchor..)
        .and_then(|rest| rest.strip_suffix('Z'))
    else {
        return rendered.to_string();
    };

    let pattern = match Regex::new(&format!(r"^(?:[:.]\d+){{{groups}}}")) {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::debug!("Precision {} cannot be matched: {}", groups, e);
            return rendered.to_string();
        }
    };

    match pattern.find(time) {
        Some(kept) => format!("{}{}Z", &rendered[..anchor], kept.as_str()),
        None => rendered.to_string(),
    }
}
