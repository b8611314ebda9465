use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_english::{parse_date_string, Dialect};

use crate::cli::{RecurrenceArgs, RecurrenceShortcut};

const INSTANT_FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parses a calendar date such as `2025-11-18`, `today` or `next friday`.
/// Relative dates resolve against the current UTC day.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_string(input, Utc::now(), Dialect::Uk)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", input, e))
}

/// Parses a UTC instant such as `2025-01-15 10:00`, an RFC 3339 string or
/// `tomorrow 9am`.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in INSTANT_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }
    parse_date_string(input, Utc::now(), Dialect::Uk)
        .map_err(|e| anyhow!("Failed to parse date/time '{}': {}", input, e))
}

/// Builds the RRULE for the recurrence options, or `None` for a one-off.
pub fn build_rrule(args: &RecurrenceArgs) -> Result<Option<String>> {
    // RFC 5545: UNTIL and COUNT must not occur in the same rule
    if args.until.is_some() && args.count.is_some() {
        return Err(anyhow!("--until and --count cannot be used together"));
    }

    let mut rrule = match (&args.recurrence, args.every) {
        (Some(raw), _) => raw.trim().to_string(),
        (None, Some(shortcut)) => shortcut.to_rrule().to_string(),
        (None, None) => {
            if args.until.is_some() || args.count.is_some() {
                return Err(anyhow!("--until and --count need --every or --recurrence"));
            }
            return Ok(None);
        }
    };

    if let Some(days) = &args.on {
        if args.every != Some(RecurrenceShortcut::Weekly) {
            return Err(anyhow!("--on only applies to --every weekly"));
        }
        rrule = format!("{};BYDAY={}", rrule, parse_days(days)?.join(","));
    }

    if let Some(until) = &args.until {
        let until = parse_date(until)?;
        rrule = format!("{};UNTIL={}T235959Z", rrule, until.format("%Y%m%d"));
    }

    if let Some(count) = args.count {
        rrule = format!("{};COUNT={}", rrule, count);
    }

    Ok(Some(rrule))
}

/// Parse days string like "mon,tue,wed", "monday,tuesday", or "weekdays"
fn parse_days(days_str: &str) -> Result<Vec<&'static str>> {
    let input = days_str.trim().to_lowercase();

    match input.as_str() {
        "weekdays" => return Ok(vec!["MO", "TU", "WE", "TH", "FR"]),
        "weekends" => return Ok(vec!["SA", "SU"]),
        _ => {}
    }

    let mut days = Vec::new();
    let mut invalid = Vec::new();

    for day in input.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        let code = match day {
            "mon" | "monday" => "MO",
            "tue" | "tuesday" => "TU",
            "wed" | "wednesday" => "WE",
            "thu" | "thursday" => "TH",
            "fri" | "friday" => "FR",
            "sat" | "saturday" => "SA",
            "sun" | "sunday" => "SU",
            _ => {
                invalid.push(day.to_string());
                continue;
            }
        };
        if !days.contains(&code) {
            days.push(code);
        }
    }

    if !invalid.is_empty() {
        return Err(anyhow!(
            "Invalid day(s): {}. Use names like 'mon,wed,fri' or 'weekdays'",
            invalid.join(", ")
        ));
    }
    if days.is_empty() {
        return Err(anyhow!("No days given in '{}'", days_str));
    }
    Ok(days)
}
