use anyhow::{anyhow, Result};
use chrono::{NaiveTime, Timelike, Utc};

use crate::error::TrackerError;
use crate::models::ShiftWindow;

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Parses a strict `HH:MM` clock time (00-23, 00-59) into minutes since midnight.
pub fn parse_hhmm(value: &str) -> Result<u32, TrackerError> {
    let invalid = || TrackerError::InvalidTime(value.to_string());
    let (hour, minute) = value.split_once(':').ok_or_else(invalid)?;
    if hour.len() != 2 || minute.len() != 2 {
        return Err(invalid());
    }
    if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok(hour * 60 + minute)
}

pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

pub fn parse_window(start: &str, end: &str) -> Result<ShiftWindow, TrackerError> {
    Ok(ShiftWindow::new(parse_hhmm(start)?, parse_hhmm(end)?))
}

pub fn format_decimal(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn parse_decimal(value: &str) -> Result<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|e| anyhow!("Parse decimal: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hhmm_accepts_strict_format() {
        assert_eq!(parse_hhmm("00:00").unwrap(), 0);
        assert_eq!(parse_hhmm("09:00").unwrap(), 540);
        assert_eq!(parse_hhmm("17:30").unwrap(), 1050);
        assert_eq!(parse_hhmm("23:59").unwrap(), 1439);
    }

    #[test]
    fn test_parse_hhmm_rejects_malformed_input() {
        for raw in ["9:00", "24:00", "12:60", "12-00", "ab:cd", "", "12:5", "+1:00", "12:00:00"] {
            assert!(
                matches!(parse_hhmm(raw), Err(TrackerError::InvalidTime(_))),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_minute_of_day() {
        let time = NaiveTime::from_hms_opt(12, 15, 42).unwrap();
        assert_eq!(minute_of_day(time), 735);
    }

    #[test]
    fn test_parse_decimal_accepts_comma() {
        assert_eq!(parse_decimal("1200,50").unwrap(), 1200.5);
        assert_eq!(parse_decimal(" 99 ").unwrap(), 99.0);
        assert!(parse_decimal("abc").is_err());
    }
}
