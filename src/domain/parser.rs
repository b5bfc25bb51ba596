//! Default host date parser.
//!
//! Accepts the ECMAScript date-time string format
//! (`YYYY[-MM[-DD]][(T| )HH:mm[:ss[.sss]][Z|±HH:mm]]`, with `±YYYYYY`
//! expanded years) and falls back to RFC 2822. Forms without an offset are
//! read as UTC so results do not depend on the machine's zone.

use crate::domain::model::ParseResult;
use crate::domain::ports::DateParser;
use chrono::{DateTime, Duration, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, Default)]
pub struct HostDateParser;

impl HostDateParser {
    pub fn new() -> Self {
        Self
    }
}

impl DateParser for HostDateParser {
    fn parse(&self, input: &str) -> ParseResult {
        let src = input.trim();
        if src.is_empty() {
            return ParseResult::Rejected;
        }

        if let Some(ts) = parse_date_time_string(src) {
            return ParseResult::Accepted(ts);
        }

        match DateTime::parse_from_rfc2822(src) {
            Ok(ts) => ParseResult::Accepted(ts.with_timezone(&Utc)),
            Err(e) => {
                tracing::trace!("Rejected date string {:?}: {}", src, e);
                ParseResult::Rejected
            }
        }
    }
}

fn parse_fixed_digits(src: &str, i: &mut usize, width: usize) -> Option<u32> {
    let end = i.checked_add(width)?;
    let segment = src.get(*i..end)?;
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    *i = end;
    segment.parse().ok()
}

fn parse_year(src: &str, i: &mut usize) -> Option<i32> {
    let bytes = src.as_bytes();
    match *bytes.first()? {
        sign @ (b'+' | b'-') => {
            *i += 1;
            let magnitude = parse_fixed_digits(src, i, 6)?;
            if sign == b'-' {
                // -000000 is not a valid expanded year.
                if magnitude == 0 {
                    return None;
                }
                Some(-i32::try_from(magnitude).ok()?)
            } else {
                i32::try_from(magnitude).ok()
            }
        }
        _ => parse_fixed_digits(src, i, 4).and_then(|year| i32::try_from(year).ok()),
    }
}

fn parse_date_time_string(src: &str) -> Option<DateTime<Utc>> {
    let bytes = src.as_bytes();
    let mut i = 0usize;

    let year = parse_year(src, &mut i)?;
    let mut month = 1u32;
    let mut day = 1u32;

    if bytes.get(i) == Some(&b'-') {
        i += 1;
        month = parse_fixed_digits(src, &mut i, 2)?;
        if bytes.get(i) == Some(&b'-') {
            i += 1;
            day = parse_fixed_digits(src, &mut i, 2)?;
        }
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let mut hour = 0u32;
    let mut minute = 0u32;
    let mut second = 0u32;
    let mut millisecond = 0u32;
    let mut offset_minutes = 0i64;

    if i < bytes.len() {
        if bytes[i] != b'T' && bytes[i] != b' ' {
            return None;
        }
        i += 1;

        hour = parse_fixed_digits(src, &mut i, 2)?;
        if bytes.get(i) != Some(&b':') {
            return None;
        }
        i += 1;
        minute = parse_fixed_digits(src, &mut i, 2)?;

        if bytes.get(i) == Some(&b':') {
            i += 1;
            second = parse_fixed_digits(src, &mut i, 2)?;

            if bytes.get(i) == Some(&b'.') {
                i += 1;
                let frac_start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if i == frac_start {
                    return None;
                }
                // Only milliseconds are kept; extra digits are truncated.
                let frac = &src[frac_start..i];
                let digits: String = frac.chars().chain("00".chars()).take(3).collect();
                millisecond = digits.parse().ok()?;
            }
        }

        if i < bytes.len() {
            match bytes[i] {
                b'Z' | b'z' => i += 1,
                sign @ (b'+' | b'-') => {
                    i += 1;
                    let tz_hour = parse_fixed_digits(src, &mut i, 2)?;
                    if bytes.get(i) == Some(&b':') {
                        i += 1;
                    }
                    let tz_minute = parse_fixed_digits(src, &mut i, 2)?;
                    if tz_hour > 23 || tz_minute > 59 {
                        return None;
                    }
                    let magnitude = i64::from(tz_hour * 60 + tz_minute);
                    offset_minutes = if sign == b'+' { magnitude } else { -magnitude };
                }
                _ => return None,
            }
        }
    }

    if i != bytes.len() {
        return None;
    }

    // 24:00 is the end of the day, equal to the next midnight.
    let (date, hour) = if hour == 24 {
        if minute != 0 || second != 0 || millisecond != 0 {
            return None;
        }
        (date.succ_opt()?, 0)
    } else {
        (date, hour)
    };

    let local = date.and_hms_milli_opt(hour, minute, second, millisecond)?;
    local
        .and_utc()
        .checked_sub_signed(Duration::minutes(offset_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::format::to_iso_string;

    fn iso(input: &str) -> Option<String> {
        HostDateParser::new()
            .parse(input)
            .timestamp()
            .map(|ts| to_iso_string(&ts))
    }

    #[test]
    fn test_date_only_forms() {
        assert_eq!(iso("2024-03-05").as_deref(), Some("2024-03-05T00:00:00.000Z"));
        assert_eq!(iso("2024-03").as_deref(), Some("2024-03-01T00:00:00.000Z"));
        assert_eq!(iso("2024").as_deref(), Some("2024-01-01T00:00:00.000Z"));
    }

    #[test]
    fn test_date_time_forms() {
        assert_eq!(
            iso("2024-03-05T10:20").as_deref(),
            Some("2024-03-05T10:20:00.000Z")
        );
        assert_eq!(
            iso("2024-03-05 10:20:30").as_deref(),
            Some("2024-03-05T10:20:30.000Z")
        );
        assert_eq!(
            iso("2024-03-05T10:20:30.1").as_deref(),
            Some("2024-03-05T10:20:30.100Z")
        );
        assert_eq!(
            iso("2024-03-05T10:20:30.123456Z").as_deref(),
            Some("2024-03-05T10:20:30.123Z")
        );
    }

    #[test]
    fn test_offsets_are_normalized_to_utc() {
        assert_eq!(
            iso("2024-03-05T10:20:30+05:30").as_deref(),
            Some("2024-03-05T04:50:30.000Z")
        );
        assert_eq!(
            iso("2024-03-05T23:00-0200").as_deref(),
            Some("2024-03-06T01:00:00.000Z")
        );
        assert!(iso("2024-03-05T10:20+24:00").is_none());
    }

    #[test]
    fn test_end_of_day_hour() {
        assert_eq!(
            iso("2024-02-29T24:00").as_deref(),
            Some("2024-03-01T00:00:00.000Z")
        );
        assert!(iso("2024-02-29T24:01").is_none());
    }

    #[test]
    fn test_expanded_years() {
        assert_eq!(
            iso("+012345-01-02T03:04:05Z").as_deref(),
            Some("+012345-01-02T03:04:05.000Z")
        );
        assert_eq!(
            iso("-000001-01-01").as_deref(),
            Some("-000001-01-01T00:00:00.000Z")
        );
        assert!(iso("-000000-01-01").is_none());
        assert!(iso("+2024-01-01").is_none());
    }

    #[test]
    fn test_rfc2822_fallback() {
        assert_eq!(
            iso("Tue, 05 Mar 2024 10:20:30 GMT").as_deref(),
            Some("2024-03-05T10:20:30.000Z")
        );
        assert_eq!(
            iso("Tue, 05 Mar 2024 10:20:30 +0100").as_deref(),
            Some("2024-03-05T09:20:30.000Z")
        );
    }

    #[test]
    fn test_rejections() {
        for input in [
            "",
            "   ",
            "not a date",
            "2024-13-01",
            "2023-02-29",
            "2024-03-05T",
            "2024-03-05T10",
            "2024-03-05T25:00",
            "2024-03-05T10:60",
            "2024-03-05T10:20:30.",
            "2024-03-05T10:20Q",
            "24-03-05",
            "2024/03/05",
        ] {
            assert!(iso(input).is_none(), "expected {:?} to be rejected", input);
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(iso("  2024-03-05 ").as_deref(), Some("2024-03-05T00:00:00.000Z"));
    }

    #[test]
    fn test_closure_parser() {
        let always_rejects = |_: &str| ParseResult::Rejected;
        assert!(always_rejects.parse("2024-03-05").is_rejected());
    }
}
