//! Wall-clock times for schedules and planned routes.
//!
//! GTFS schedules give times as "HH:MM:SS" strings, where the hour may run
//! past 24 for trips that continue after midnight. The routing service gives
//! full ISO-8601 timestamps with an offset. Both end up as a [`ClockTime`],
//! which only keeps the time of day.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day (hour, minute, second).
///
/// Ordering is by hour, then minute, then second. Hours are not capped at 23
/// so that GTFS after-midnight times ("25:10:00") keep their order within a
/// service day.
///
/// # Examples
///
/// ```
/// use transit_server::domain::ClockTime;
///
/// let t = ClockTime::parse_iso("2024-11-27T23:40:30.000+00:00").unwrap();
/// assert_eq!(t, ClockTime::new(23, 40, 30));
/// assert_eq!(t.to_military(), "23:40");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockTime {
    hours: u32,
    minutes: u32,
    seconds: u32,
}

impl ClockTime {
    /// Create a time from its components.
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Parse an ISO-8601 timestamp with an offset and keep its UTC time of day.
    ///
    /// ```
    /// use transit_server::domain::ClockTime;
    ///
    /// assert_eq!(
    ///     ClockTime::parse_iso("2024-11-27T18:40:30-05:00").unwrap(),
    ///     ClockTime::new(23, 40, 30)
    /// );
    /// assert!(ClockTime::parse_iso("23:40").is_err());
    /// ```
    pub fn parse_iso(s: &str) -> Result<Self, TimeError> {
        let parsed = DateTime::parse_from_rfc3339(s)
            .map_err(|_| TimeError::new("expected ISO-8601 timestamp with offset"))?;
        let utc = parsed.with_timezone(&Utc);
        Ok(Self::from(utc.time()))
    }

    /// Parse a GTFS "HH:MM:SS" time. The hour may be greater than 23.
    ///
    /// ```
    /// use transit_server::domain::ClockTime;
    ///
    /// assert_eq!(ClockTime::parse_hms("08:30:00").unwrap(), ClockTime::new(8, 30, 0));
    /// assert_eq!(ClockTime::parse_hms("25:01:02").unwrap(), ClockTime::new(25, 1, 2));
    /// assert!(ClockTime::parse_hms("8:30").is_err());
    /// assert!(ClockTime::parse_hms("08:60:00").is_err());
    /// ```
    pub fn parse_hms(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        let hours: u32 = h
            .parse()
            .map_err(|_| TimeError::new("invalid hour digits"))?;
        let minutes =
            parse_two_digits(m.as_bytes()).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        let seconds = parse_two_digits(sec.as_bytes())
            .ok_or_else(|| TimeError::new("invalid second digits"))?;

        if minutes > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if seconds > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }

        Ok(Self::new(hours, minutes, seconds))
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Minutes from `start` to `end`, ignoring seconds.
    ///
    /// Negative if `end` is earlier than `start`; no midnight wrap is applied.
    pub fn minute_duration(start: ClockTime, end: ClockTime) -> i64 {
        (end.hours as i64 - start.hours as i64) * 60 + (end.minutes as i64 - start.minutes as i64)
    }

    /// Format as "HH:MM".
    pub fn to_military(&self) -> String {
        format!("{:02}:{:02}", self.hours, self.minutes)
    }

    /// Place this time on a calendar date.
    ///
    /// Hours past 23 roll over onto the following days. Returns `None` only
    /// if the date arithmetic overflows.
    pub fn on_date(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        let extra_days = self.hours / 24;
        let time = NaiveTime::from_hms_opt(self.hours % 24, self.minutes, self.seconds)?;
        let day = date.checked_add_days(chrono::Days::new(u64::from(extra_days)))?;
        Some(day.and_time(time))
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self::new(time.hour(), time.minute(), time.second())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_iso_with_fractional_seconds() {
        let t = ClockTime::parse_iso("2024-11-27T23:40:30.000+00:00").unwrap();
        assert_eq!(t.hours(), 23);
        assert_eq!(t.minutes(), 40);
        assert_eq!(t.seconds(), 30);
    }

    #[test]
    fn parse_iso_zulu() {
        let t = ClockTime::parse_iso("2024-11-27T08:30:00Z").unwrap();
        assert_eq!(t, ClockTime::new(8, 30, 0));
    }

    #[test]
    fn parse_iso_converts_to_utc() {
        let t = ClockTime::parse_iso("2024-11-27T22:15:00-05:00").unwrap();
        assert_eq!(t, ClockTime::new(3, 15, 0));
    }

    #[test]
    fn parse_iso_rejects_garbage() {
        assert!(ClockTime::parse_iso("").is_err());
        assert!(ClockTime::parse_iso("yesterday").is_err());
        assert!(ClockTime::parse_iso("2024-11-27T08:30:00").is_err());
    }

    #[test]
    fn parse_hms_rejects_bad_shapes() {
        assert!(ClockTime::parse_hms("").is_err());
        assert!(ClockTime::parse_hms("08:30").is_err());
        assert!(ClockTime::parse_hms("08:30:00:00").is_err());
        assert!(ClockTime::parse_hms("aa:30:00").is_err());
        assert!(ClockTime::parse_hms("08:3:00").is_err());
        assert!(ClockTime::parse_hms("08:30:61").is_err());
    }

    #[test]
    fn parse_hms_tolerates_padding() {
        assert_eq!(
            ClockTime::parse_hms(" 7:05:09 ").unwrap(),
            ClockTime::new(7, 5, 9)
        );
    }

    #[test]
    fn minute_duration_ignores_seconds() {
        let start = ClockTime::new(8, 30, 59);
        let end = ClockTime::new(9, 15, 0);
        assert_eq!(ClockTime::minute_duration(start, end), 45);
        assert_eq!(ClockTime::minute_duration(end, start), -45);
    }

    #[test]
    fn ordering() {
        assert!(ClockTime::new(8, 30, 0) < ClockTime::new(8, 30, 1));
        assert!(ClockTime::new(8, 59, 59) < ClockTime::new(9, 0, 0));
        assert!(ClockTime::new(23, 0, 0) < ClockTime::new(24, 5, 0));
    }

    #[test]
    fn display_formats() {
        let t = ClockTime::new(8, 5, 3);
        assert_eq!(t.to_string(), "08:05:03");
        assert_eq!(t.to_military(), "08:05");
    }

    #[test]
    fn on_date_rolls_over_after_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let dt = ClockTime::new(25, 10, 0).on_date(date).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(1, 10, 0).unwrap());
    }
}
