use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Error type for user-entered time strings
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    #[error("duration must be positive")]
    NonPositive,
    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),
}

/// Parse a countdown duration like `"30s"`, `"2m"`, `"1.5h"` into seconds.
/// A bare number is taken as seconds.
pub fn parse_duration_secs(input: &str) -> Result<f64, ParseError> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }
    let (number, scale) = match input.strip_suffix(['h', 'm', 's']) {
        Some(num) => {
            let scale = match input.chars().last() {
                Some('h') => 3600.0,
                Some('m') => 60.0,
                _ => 1.0,
            };
            (num, scale)
        }
        None => (input.as_str(), 1.0),
    };
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidDuration(input.clone()))?;
    let secs = value * scale;
    if secs <= 0.0 {
        return Err(ParseError::NonPositive);
    }
    Ok(secs)
}

/// Parse a time estimate like `"45"`, `"30m"`, `"2h"` into minutes.
/// A bare number is taken as minutes.
pub fn parse_estimate_minutes(input: &str) -> Result<f64, ParseError> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }
    let (number, scale) = match input.strip_suffix(['h', 'm']) {
        Some(num) => {
            let scale = if input.ends_with('h') { 60.0 } else { 1.0 };
            (num, scale)
        }
        None => (input.as_str(), 1.0),
    };
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidDuration(input.clone()))?;
    let minutes = value * scale;
    if minutes < 0.0 {
        return Err(ParseError::NonPositive);
    }
    Ok(minutes)
}

/// Parse a reminder string into an epoch timestamp (seconds).
///
/// Accepts `"HH:MM"` (today, relative to `now`) or `"YYYY-MM-DD HH:MM"`.
pub fn parse_reminder(input: &str, now: DateTime<Local>) -> Result<f64, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }
    let naive: NaiveDateTime = if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")
    {
        dt
    } else if let Ok(t) = NaiveTime::parse_from_str(input, "%H:%M") {
        now.date_naive().and_time(t)
    } else if let Ok(d) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        d.and_hms_opt(0, 0, 0)
            .ok_or_else(|| ParseError::InvalidDateTime(input.to_string()))?
    } else {
        return Err(ParseError::InvalidDateTime(input.to_string()));
    };
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ParseError::InvalidDateTime(input.to_string()))?;
    Ok(local.timestamp() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn duration_suffixes() {
        assert_eq!(parse_duration_secs("30s").unwrap(), 30.0);
        assert_eq!(parse_duration_secs("2m").unwrap(), 120.0);
        assert_eq!(parse_duration_secs("1.5h").unwrap(), 5400.0);
        assert_eq!(parse_duration_secs("45").unwrap(), 45.0);
        assert_eq!(parse_duration_secs(" 2M ").unwrap(), 120.0);
    }

    #[test]
    fn duration_rejects_garbage() {
        assert!(parse_duration_secs("").is_err());
        assert!(parse_duration_secs("soon").is_err());
        assert!(parse_duration_secs("-5m").is_err());
        assert!(parse_duration_secs("0").is_err());
    }

    #[test]
    fn estimate_suffixes() {
        assert_eq!(parse_estimate_minutes("45").unwrap(), 45.0);
        assert_eq!(parse_estimate_minutes("30m").unwrap(), 30.0);
        assert_eq!(parse_estimate_minutes("2h").unwrap(), 120.0);
        assert_eq!(parse_estimate_minutes("1.5h").unwrap(), 90.0);
    }

    #[test]
    fn estimate_rejects_garbage() {
        assert!(parse_estimate_minutes("later").is_err());
        assert!(parse_estimate_minutes("-10").is_err());
    }

    #[test]
    fn reminder_full_datetime() {
        let now = Local::now();
        let ts = parse_reminder("2030-01-02 09:30", now).unwrap();
        assert!(ts > now.timestamp() as f64);
    }

    #[test]
    fn reminder_time_of_day_uses_today() {
        let now = Local::now();
        let ts = parse_reminder("12:00", now).unwrap();
        let parsed = Local.timestamp_opt(ts as i64, 0).unwrap();
        assert_eq!(parsed.date_naive(), now.date_naive());
    }

    #[test]
    fn reminder_rejects_garbage() {
        let now = Local::now();
        assert!(parse_reminder("", now).is_err());
        assert!(parse_reminder("tomorrowish", now).is_err());
        assert!(parse_reminder("25:99", now).is_err());
    }
}
