//! Time remaining until a sale ends.

use core::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Remaining time split into display fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// All fields zero; what an ended sale shows.
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Remaining time from `now` until `end`. Zero once `end` has passed.
    #[must_use]
    pub fn between(now: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let total = (end - now).num_seconds();
        if total <= 0 {
            return Self::ZERO;
        }

        Self {
            days: total / SECONDS_PER_DAY,
            hours: (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
            minutes: (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            seconds: total % SECONDS_PER_MINUTE,
        }
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    /// Zero-padded fields in days/hours/minutes/seconds order.
    #[must_use]
    pub fn padded(&self) -> [String; 4] {
        [
            format!("{:02}", self.days),
            format!("{:02}", self.hours),
            format!("{:02}", self.minutes),
            format!("{:02}", self.seconds),
        ]
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Countdown for a sale whose end timestamp may be missing or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Running(Countdown),
    Ended,
    /// The end timestamp could not be parsed; fields render as placeholders.
    Unknown,
}

impl CountdownState {
    /// Evaluate against `now`.
    #[must_use]
    pub fn evaluate(end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match end {
            None => Self::Unknown,
            Some(end) => {
                let remaining = Countdown::between(now, end);
                if remaining.is_zero() {
                    Self::Ended
                } else {
                    Self::Running(remaining)
                }
            }
        }
    }

    #[must_use]
    pub const fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Display fields: zero-padded numbers, zeros once ended, `--` when unknown.
    #[must_use]
    pub fn fields(&self) -> [String; 4] {
        match self {
            Self::Running(countdown) => countdown.padded(),
            Self::Ended => Countdown::ZERO.padded(),
            Self::Unknown => std::array::from_fn(|_| "--".to_string()),
        }
    }
}

/// Parse a sale end timestamp.
///
/// Accepts RFC 3339 (`2026-11-01T00:00:00Z`), a naive datetime read as UTC
/// (`2026-11-01T00:00:00`, `2026-11-01T00:00`), or a bare date meaning the end
/// of that day.
#[must_use]
pub fn parse_end(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_800_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_splits_into_fields() {
        let now = at(0);
        let end = now
            + Duration::days(2)
            + Duration::hours(3)
            + Duration::minutes(4)
            + Duration::seconds(5);
        let countdown = Countdown::between(now, end);

        assert_eq!(
            countdown,
            Countdown {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );
        assert_eq!(countdown.padded(), ["02", "03", "04", "05"]);
        assert_eq!(countdown.to_string(), "02d 03h 04m 05s");
    }

    #[test]
    fn test_past_end_is_zero() {
        assert_eq!(Countdown::between(at(10), at(0)), Countdown::ZERO);
        assert_eq!(Countdown::between(at(0), at(0)), Countdown::ZERO);
        assert!(CountdownState::evaluate(Some(at(0)), at(1)).is_ended());
        assert_eq!(
            CountdownState::evaluate(Some(at(0)), at(1)).fields(),
            ["00", "00", "00", "00"]
        );
    }

    #[test]
    fn test_unknown_end_renders_placeholders() {
        let state = CountdownState::evaluate(None, at(0));
        assert_eq!(state, CountdownState::Unknown);
        assert!(!state.is_ended());
        assert_eq!(state.fields(), ["--", "--", "--", "--"]);
    }

    #[test]
    fn test_parse_end_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 11, 1, 8, 30, 0).unwrap();
        assert_eq!(parse_end("2026-11-01T08:30:00Z"), Some(expected));
        assert_eq!(parse_end("2026-11-01T10:30:00+02:00"), Some(expected));
        assert_eq!(parse_end("2026-11-01T08:30:00"), Some(expected));
        assert_eq!(parse_end("2026-11-01T08:30"), Some(expected));
        assert_eq!(
            parse_end("2026-11-01"),
            Some(Utc.with_ymd_and_hms(2026, 11, 1, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn test_parse_end_rejects_garbage() {
        assert_eq!(parse_end(""), None);
        assert_eq!(parse_end("soon"), None);
        assert_eq!(parse_end("2026-13-45"), None);
    }
}
