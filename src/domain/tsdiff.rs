use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::domain::ts::Ts;
use crate::utils::error::{Result, TsError};

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Signed distance between two [`Ts`] values.
///
/// Remembers the timestamp it was measured from, which `year_fraction`
/// uses for an actual/actual day count. The origin takes no part in
/// equality or ordering.
#[derive(Debug, Clone, Copy)]
pub struct TsDiff {
    delta: TimeDelta,
    origin: Option<Ts>,
}

impl TsDiff {
    pub fn new(delta: TimeDelta) -> Self {
        Self {
            delta,
            origin: None,
        }
    }

    pub fn with_origin(delta: TimeDelta, origin: Ts) -> Self {
        Self {
            delta,
            origin: Some(origin),
        }
    }

    pub fn zero() -> Self {
        Self::new(TimeDelta::zero())
    }

    pub fn days(&self) -> i64 {
        self.delta.num_days()
    }

    pub fn delta(&self) -> TimeDelta {
        self.delta
    }

    pub fn origin(&self) -> Option<Ts> {
        self.origin
    }

    pub fn is_zero(&self) -> bool {
        self.delta.is_zero()
    }

    pub fn checked_add(&self, other: &TsDiff) -> Option<Self> {
        self.delta.checked_add(&other.delta).map(Self::new)
    }

    pub fn checked_sub(&self, other: &TsDiff) -> Option<Self> {
        self.delta.checked_sub(&other.delta).map(Self::new)
    }

    pub fn checked_mul(&self, factor: i32) -> Option<Self> {
        self.delta.checked_mul(factor).map(Self::new)
    }

    pub fn total_seconds(&self) -> f64 {
        self.delta.num_milliseconds() as f64 / 1_000.0
    }

    /// Length in years: actual/actual from the origin when one is known,
    /// otherwise days over 365.25. Time of day counts in both cases.
    pub fn year_fraction(&self) -> f64 {
        match self.origin.and_then(|start| start.checked_add(self).map(|end| (start, end))) {
            Some((start, end)) if end >= start => actual_actual(start.datetime(), end.datetime()),
            Some((start, end)) => -actual_actual(end.datetime(), start.datetime()),
            None => self.total_seconds() / SECONDS_PER_DAY / DAYS_PER_YEAR,
        }
    }

    /// Parses compact durations such as `9d`, `-2w3d` (minus two weeks
    /// and three days), `1d3600s` or `5 days and 3 hours`. Year, quarter
    /// and month units are refused.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: String| TsError::InvalidDuration {
            value: input.to_string(),
            reason,
        };

        let mut text = input.to_lowercase();
        for noise in ["and", "_", ",", " "] {
            text = text.replace(noise, "");
        }
        for (word, unit) in [
            ("microseconds", "u"),
            ("years", "y"),
            ("quarters", "q"),
            ("months", "m"),
            ("weeks", "w"),
            ("days", "d"),
            ("hours", "h"),
            ("minutes", "i"),
            ("seconds", "s"),
            ("sec", "s"),
            ("µs", "u"),
            ("μs", "u"),
            ("μ", "u"),
            ("us", "u"),
        ] {
            text = text.replace(word, unit);
        }
        if text.is_empty() {
            return Err(invalid("empty duration".to_string()));
        }

        // a leading sign applies to the whole duration, as `Display` writes it
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(&text)),
        };
        if body.is_empty() {
            return Err(invalid("sign without amount".to_string()));
        }

        let mut delta = TimeDelta::zero();
        let mut digits = String::new();
        for ch in body.chars() {
            if ch.is_ascii_digit() || ((ch == '-' || ch == '+') && digits.is_empty()) {
                digits.push(ch);
                continue;
            }
            let amount = digits
                .parse::<i64>()
                .map_err(|_| invalid(format!("missing amount before '{}'", ch)))?;
            digits.clear();
            let part = match ch {
                'w' => TimeDelta::try_weeks(amount),
                'd' => TimeDelta::try_days(amount),
                'h' => TimeDelta::try_hours(amount),
                'i' => TimeDelta::try_minutes(amount),
                's' => TimeDelta::try_seconds(amount),
                'u' => Some(TimeDelta::microseconds(amount)),
                'y' | 'q' | 'm' => {
                    return Err(invalid(
                        "years, quarters and months have no fixed length".to_string(),
                    ))
                }
                other => return Err(invalid(format!("unknown unit '{}'", other))),
            };
            delta = part
                .and_then(|part| delta.checked_add(&part))
                .ok_or_else(|| invalid("duration out of range".to_string()))?;
        }
        if !digits.is_empty() {
            return Err(invalid(format!("trailing amount '{}' without unit", digits)));
        }
        Ok(Self::new(if negative { -delta } else { delta }))
    }
}

// Year fraction of [start, end] summed per calendar year, to the
// millisecond.
fn actual_actual(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let mut fraction = 0.0;
    let mut cursor = start;
    while cursor < end {
        let year = cursor.year();
        let segment_end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
            .map(|date| date.and_time(NaiveTime::MIN))
            .map_or(end, |next_year| next_year.min(end));
        let days_in_year = if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
            366.0
        } else {
            365.0
        };
        let millis = (segment_end - cursor).num_milliseconds() as f64;
        fraction += millis / (days_in_year * SECONDS_PER_DAY * 1_000.0);
        cursor = segment_end;
    }
    fraction
}

impl PartialEq for TsDiff {
    fn eq(&self, other: &Self) -> bool {
        self.delta == other.delta
    }
}

impl Eq for TsDiff {}

impl Hash for TsDiff {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.delta.hash(state);
    }
}

impl PartialOrd for TsDiff {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TsDiff {
    fn cmp(&self, other: &Self) -> Ordering {
        self.delta.cmp(&other.delta)
    }
}

impl From<TimeDelta> for TsDiff {
    fn from(delta: TimeDelta) -> Self {
        Self::new(delta)
    }
}

impl FromStr for TsDiff {
    type Err = TsError;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl Display for TsDiff {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.delta.is_zero() {
            return f.write_str("0d");
        }
        let sign = if self.delta < TimeDelta::zero() { "-" } else { "" };
        let delta = self.delta.abs();
        let days = delta.num_days();
        let seconds = delta.num_seconds() - days * 86_400;
        let micros = delta.subsec_nanos() / 1_000;

        f.write_str(sign)?;
        if days != 0 {
            write!(f, "{}d", days)?;
        }
        if seconds != 0 {
            write!(f, "{}s", seconds)?;
        }
        if micros != 0 {
            write!(f, "{}us", micros)?;
        }
        Ok(())
    }
}

impl Add for TsDiff {
    type Output = TsDiff;

    /// # Panics
    ///
    /// On overflow of the underlying `TimeDelta`; see [`TsDiff::checked_add`].
    fn add(self, other: TsDiff) -> TsDiff {
        TsDiff::new(self.delta + other.delta)
    }
}

impl Sub for TsDiff {
    type Output = TsDiff;

    /// # Panics
    ///
    /// On overflow of the underlying `TimeDelta`; see [`TsDiff::checked_sub`].
    fn sub(self, other: TsDiff) -> TsDiff {
        TsDiff::new(self.delta - other.delta)
    }
}

impl Add<Ts> for TsDiff {
    type Output = Ts;

    /// # Panics
    ///
    /// When the result falls outside the calendar range; see [`Ts::checked_add`].
    fn add(self, ts: Ts) -> Ts {
        ts + self
    }
}

impl Neg for TsDiff {
    type Output = TsDiff;

    fn neg(self) -> TsDiff {
        TsDiff::new(-self.delta)
    }
}

impl Mul<i32> for TsDiff {
    type Output = TsDiff;

    /// # Panics
    ///
    /// On overflow of the underlying `TimeDelta`; see [`TsDiff::checked_mul`].
    fn mul(self, factor: i32) -> TsDiff {
        TsDiff::new(self.delta * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: i64) -> Ts {
        Ts::from_yyyymmdd(value).unwrap()
    }

    #[test]
    fn test_parse_compact_forms() {
        assert_eq!(TsDiff::parse("9d").unwrap().days(), 9);
        assert_eq!(TsDiff::parse("2w").unwrap().days(), 14);
        assert_eq!(TsDiff::parse("-3d").unwrap().days(), -3);
        assert_eq!(
            TsDiff::parse("1d3600s").unwrap().delta(),
            TimeDelta::days(1) + TimeDelta::hours(1)
        );
        assert_eq!(
            TsDiff::parse("5 days and 3 hours").unwrap().delta(),
            TimeDelta::days(5) + TimeDelta::hours(3)
        );
        assert_eq!(TsDiff::parse("250us").unwrap().delta(), TimeDelta::microseconds(250));
    }

    #[test]
    fn test_parse_rejects_months_and_garbage() {
        assert!(matches!(
            TsDiff::parse("1m"),
            Err(TsError::InvalidDuration { .. })
        ));
        assert!(TsDiff::parse("2y").is_err());
        assert!(TsDiff::parse("").is_err());
        assert!(TsDiff::parse("12").is_err());
        assert!(TsDiff::parse("d").is_err());
        assert!(TsDiff::parse("3x").is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        for input in ["9d", "1d3600s", "-3d", "-1d3600s", "0d", "45s"] {
            let diff = TsDiff::parse(input).unwrap();
            assert_eq!(diff.to_string(), input);
        }
    }

    #[test]
    fn test_arithmetic() {
        let diff = ts(20211221) - ts(20211212);
        assert_eq!((diff + diff).days(), 18);
        assert_eq!((diff * 2).days(), 18);
        assert_eq!((-diff).days(), -9);
        assert!((diff - diff).is_zero());
        assert_eq!(diff + ts(20211212), ts(20211221));
    }

    #[test]
    fn test_equality_ignores_origin() {
        let measured = ts(20211221) - ts(20211212);
        let parsed = TsDiff::parse("9d").unwrap();
        assert_eq!(measured, parsed);
        assert!(measured.origin().is_some());
        assert!(parsed.origin().is_none());
        assert!(TsDiff::parse("1d").unwrap() < parsed);
    }

    #[test]
    fn test_year_fraction() {
        let whole_year = ts(20210101) - ts(20200101);
        assert!((whole_year.year_fraction() - 1.0).abs() < 1e-12);

        let straddle = ts(20210101) - ts(20201231);
        assert!((straddle.year_fraction() - 1.0 / 366.0).abs() < 1e-12);

        let plain = TsDiff::parse("365d").unwrap();
        assert!((plain.year_fraction() - 365.0 / 365.25).abs() < 1e-12);

        let backwards = ts(20200101) - ts(20210101);
        assert!((backwards.year_fraction() + 1.0).abs() < 1e-12);
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> Ts {
        Ts::from_ymd_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_year_fraction_counts_time_of_day() {
        let measured = at(2024, 1, 1, 12) - at(2024, 1, 1, 0);
        let parsed = TsDiff::parse("12h").unwrap();
        assert_eq!(measured, parsed);
        assert!((measured.year_fraction() - 0.5 / 366.0).abs() < 1e-12);
        assert!((parsed.year_fraction() - 0.5 / 365.25).abs() < 1e-12);

        let list = crate::core::list::TsList::from(vec![measured, parsed]);
        assert_eq!(list.select(0.0001..1.0).unwrap().len(), 2);
    }

    #[test]
    fn test_year_fraction_across_midnight() {
        let overnight = at(2024, 3, 11, 1) - at(2024, 3, 10, 23);
        assert!((overnight.year_fraction() - 2.0 / (366.0 * 24.0)).abs() < 1e-12);

        let new_year = at(2024, 1, 1, 1) - at(2023, 12, 31, 23);
        let expected = 1.0 / (365.0 * 24.0) + 1.0 / (366.0 * 24.0);
        assert!((new_year.year_fraction() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_checked_arithmetic() {
        let huge = TsDiff::parse("100000000d").unwrap();
        let last_day = ts(99991231);
        assert!(last_day.checked_add(&huge).is_none());
        let one_day = TsDiff::parse("1d").unwrap();
        assert_eq!(last_day.checked_sub(&one_day), Some(ts(99991230)));

        assert!(huge.checked_mul(i32::MAX).is_none());
        assert_eq!(huge.checked_mul(2).unwrap().days(), 200_000_000);
        let max = TsDiff::new(TimeDelta::MAX);
        assert!(max.checked_add(&huge).is_none());
        assert!((-max).checked_sub(&huge).is_none());
        assert_eq!(huge.checked_sub(&huge), Some(TsDiff::zero()));
    }
}
