use std::fmt::{Display, Formatter};
use std::ops::{Add, Sub};
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::tsdiff::TsDiff;
use crate::utils::error::{Result, TsError};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];

/// Calendar timestamp used as the default comparison domain for dates.
///
/// Date-only values are stored at midnight, so a date and the midnight
/// date-time of the same day compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ts(NaiveDateTime);

impl Ts {
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// Builds a timestamp from an eight digit `YYYYMMDD` integer.
    pub fn from_yyyymmdd(value: i64) -> Result<Self> {
        if !(10_000_000..=99_999_999).contains(&value) {
            return Err(TsError::InvalidTimestamp {
                value: value.to_string(),
                reason: "expected eight digits YYYYMMDD".to_string(),
            });
        }
        let year = (value / 10_000) as i32;
        let month = (value / 100 % 100) as u32;
        let day = (value % 100) as u32;
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from)
            .ok_or_else(|| TsError::InvalidTimestamp {
                value: value.to_string(),
                reason: "no such calendar date".to_string(),
            })
    }

    /// Reads a float of the form `YYYYMMDD.HHMMSS`.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(TsError::InvalidTimestamp {
                value: value.to_string(),
                reason: "expected a positive YYYYMMDD.HHMMSS number".to_string(),
            });
        }
        Self::parse_decimal(&value.to_string())
    }

    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .map(Self)
            .ok_or_else(|| TsError::InvalidTimestamp {
                value: format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                ),
                reason: "no such calendar date or time".to_string(),
            })
    }

    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let invalid = |reason: &str| TsError::InvalidTimestamp {
            value: input.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty string"));
        }

        if let Some((date, _)) = trimmed.split_once('.') {
            if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
                return Self::parse_decimal(trimmed);
            }
        }

        if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let value = trimmed
                .parse::<i64>()
                .map_err(|e| invalid(&e.to_string()))?;
            return Self::from_yyyymmdd(value);
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(parsed.naive_local()));
        }

        for format in DATETIME_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self(parsed));
            }
        }

        for format in DATE_FORMATS {
            if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
                return Ok(Self::from(parsed));
            }
        }

        Err(invalid("unrecognised date format"))
    }

    // `YYYYMMDD` or `YYYYMMDD.HHMMSS`, missing time digits are zero.
    fn parse_decimal(input: &str) -> Result<Self> {
        let invalid = |reason: &str| TsError::InvalidTimestamp {
            value: input.to_string(),
            reason: reason.to_string(),
        };

        let (date, time) = input.split_once('.').unwrap_or((input, ""));
        if date.len() != 8 || time.len() > 6 || !time.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected YYYYMMDD.HHMMSS"));
        }
        let day = date
            .parse::<i64>()
            .map_err(|e| invalid(&e.to_string()))?;
        let day = Self::from_yyyymmdd(day)?;

        let time = format!("{:0<6}", time);
        let field = |range: std::ops::Range<usize>| -> Result<u32> {
            time[range]
                .parse::<u32>()
                .map_err(|e| invalid(&e.to_string()))
        };
        let (hour, minute, second) = (field(0..2)?, field(2..4)?, field(4..6)?);
        NaiveTime::from_hms_opt(hour, minute, second)
            .map(|t| Self(day.0.date().and_time(t)))
            .ok_or_else(|| invalid("no such time of day"))
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn is_date_only(&self) -> bool {
        self.0.time() == NaiveTime::default()
    }

    pub fn to_yyyymmdd(&self) -> i64 {
        let date = self.0.date();
        date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64
    }

    /// `YYYYMMDD.HHMMSS` as a float; sub-second precision is dropped.
    pub fn to_f64(&self) -> f64 {
        let time = self.0.time();
        let hms = time.hour() * 10_000 + time.minute() * 100 + time.second();
        self.to_yyyymmdd() as f64 + hms as f64 / 1_000_000.0
    }

    /// `None` when the result falls outside the calendar range.
    pub fn checked_add(&self, diff: &TsDiff) -> Option<Self> {
        self.0.checked_add_signed(diff.delta()).map(Self)
    }

    pub fn checked_sub(&self, diff: &TsDiff) -> Option<Self> {
        self.0.checked_sub_signed(diff.delta()).map(Self)
    }
}

impl From<NaiveDate> for Ts {
    fn from(value: NaiveDate) -> Self {
        Self(value.and_time(NaiveTime::default()))
    }
}

impl From<NaiveDateTime> for Ts {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Ts {
    fn from(value: DateTime<Tz>) -> Self {
        Self(value.naive_local())
    }
}

impl TryFrom<i64> for Ts {
    type Error = TsError;

    fn try_from(value: i64) -> Result<Self> {
        Self::from_yyyymmdd(value)
    }
}

impl TryFrom<i32> for Ts {
    type Error = TsError;

    fn try_from(value: i32) -> Result<Self> {
        Self::from_yyyymmdd(value as i64)
    }
}

impl TryFrom<u32> for Ts {
    type Error = TsError;

    fn try_from(value: u32) -> Result<Self> {
        Self::from_yyyymmdd(value as i64)
    }
}

impl TryFrom<&str> for Ts {
    type Error = TsError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl FromStr for Ts {
    type Err = TsError;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl Display for Ts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_date_only() {
            write!(f, "{}", self.0.format("%Y-%m-%d"))
        } else if self.0.nanosecond() == 0 {
            write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
        } else {
            write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.f"))
        }
    }
}

impl Serialize for Ts {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ts {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

impl Sub for Ts {
    type Output = TsDiff;

    fn sub(self, other: Ts) -> TsDiff {
        TsDiff::with_origin(self.0 - other.0, other)
    }
}

impl Add<TsDiff> for Ts {
    type Output = Ts;

    /// # Panics
    ///
    /// When the result falls outside the calendar range; see [`Ts::checked_add`].
    fn add(self, diff: TsDiff) -> Ts {
        Ts(self.0 + diff.delta())
    }
}

impl Sub<TsDiff> for Ts {
    type Output = Ts;

    /// # Panics
    ///
    /// When the result falls outside the calendar range; see [`Ts::checked_sub`].
    fn sub(self, diff: TsDiff) -> Ts {
        Ts(self.0 - diff.delta())
    }
}
