//! Timestamps with a distinguished *not-a-time* value.
//!
//! Overview
//! -----------------
//! The crate measures time with [`hifitime`]: a [`Timestamp`] is either a UTC
//! [`Epoch`] kept at microsecond resolution or the distinguished [`Timestamp::NotATime`]
//! value used for points whose time is not (yet) known. Ordering is total over valid
//! timestamps; `NotATime` compares as unordered (`partial_cmp` returns `None`).
//!
//! Wire formats
//! -----------------
//! Parsing and formatting go through `hifitime`'s format strings
//! (e.g. `"%Y-%m-%d %H:%M:%S"`). The process-wide default input and output formats are
//! kept in mutable slots with plain get/set accessors; callers that change them from
//! several threads must synchronize externally.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::{LazyLock, RwLock};

use hifitime::efmt::{Format, Formatter};
use hifitime::{Duration, Epoch, Unit};

use crate::constants::{COMPACT_TIMESTAMP_FORMAT, DEFAULT_TIMESTAMP_FORMAT};
use crate::trajkit_errors::TrajkitError;

static DEFAULT_INPUT_FORMAT: LazyLock<RwLock<String>> =
    LazyLock::new(|| RwLock::new(DEFAULT_TIMESTAMP_FORMAT.to_string()));

static DEFAULT_OUTPUT_FORMAT: LazyLock<RwLock<String>> =
    LazyLock::new(|| RwLock::new(DEFAULT_TIMESTAMP_FORMAT.to_string()));

/// Process-wide default format used when parsing timestamps without an explicit format.
pub fn default_input_format() -> String {
    DEFAULT_INPUT_FORMAT.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Replace the process-wide default input format.
pub fn set_default_input_format(format: &str) {
    *DEFAULT_INPUT_FORMAT.write().unwrap_or_else(|e| e.into_inner()) = format.to_string();
}

/// Process-wide default format used when writing timestamps without an explicit format.
pub fn default_output_format() -> String {
    DEFAULT_OUTPUT_FORMAT.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Replace the process-wide default output format.
pub fn set_default_output_format(format: &str) {
    *DEFAULT_OUTPUT_FORMAT.write().unwrap_or_else(|e| e.into_inner()) = format.to_string();
}

/// A moment in UTC at microsecond resolution, or the distinguished `NotATime` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    Moment(Epoch),
    NotATime,
}

impl Timestamp {
    /// Wrap an [`Epoch`], rounding it to the crate's microsecond resolution.
    pub fn from_epoch(epoch: Epoch) -> Self {
        Timestamp::Moment(epoch.round(Unit::Microsecond * 1))
    }

    /// Build a timestamp from a UTC Gregorian date.
    pub fn from_gregorian_utc(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Self {
        Timestamp::Moment(Epoch::from_gregorian_utc(year, month, day, hour, minute, second, 0))
    }

    /// `true` unless this is `NotATime`.
    pub fn is_valid(&self) -> bool {
        matches!(self, Timestamp::Moment(_))
    }

    /// The wrapped epoch, or `None` for `NotATime`.
    pub fn epoch(&self) -> Option<Epoch> {
        match self {
            Timestamp::Moment(e) => Some(*e),
            Timestamp::NotATime => None,
        }
    }

    /// Parse a timestamp with an explicit `hifitime` format string.
    ///
    /// Arguments
    /// ---------
    /// * `text`: the timestamp text, e.g. `"2013-07-10 08:00:00"`
    /// * `format`: a format string, e.g. `"%Y-%m-%d %H:%M:%S"`
    ///
    /// Return
    /// ------
    /// * the parsed timestamp, or [`TrajkitError::UnrecognizedTimestampFormat`] if the
    ///   text does not match the format.
    pub fn parse(text: &str, format: &str) -> Result<Self, TrajkitError> {
        let epoch = Epoch::from_format_str(text, format).map_err(|e| {
            TrajkitError::UnrecognizedTimestampFormat(format!("'{text}' with '{format}': {e}"))
        })?;
        Ok(Timestamp::from_epoch(epoch))
    }

    /// Parse with the process-wide default input format.
    pub fn parse_default(text: &str) -> Result<Self, TrajkitError> {
        Timestamp::parse(text, &default_input_format())
    }

    /// Render this timestamp with an explicit format string.
    ///
    /// `NotATime` cannot be rendered and fails with [`TrajkitError::InvalidTimestamp`].
    pub fn format(&self, format: &str) -> Result<String, TrajkitError> {
        let epoch = self.epoch().ok_or(TrajkitError::InvalidTimestamp)?;
        let fmt = Format::from_str(format).map_err(|e| {
            TrajkitError::UnrecognizedTimestampFormat(format!("'{format}': {e}"))
        })?;
        Ok(Formatter::new(epoch, fmt).to_string())
    }

    /// Render with the process-wide default output format.
    pub fn format_default(&self) -> Result<String, TrajkitError> {
        self.format(&default_output_format())
    }

    /// Compact `YYYYmmddHHMMSS` form used to derive trajectory identifiers.
    pub(crate) fn compact(&self) -> String {
        self.format(COMPACT_TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| "not-a-time".to_string())
    }

    /// Drop any fractional second (floor to the whole second).
    pub fn truncate_fractional_seconds(&self) -> Self {
        match self {
            Timestamp::Moment(e) => Timestamp::Moment(e.floor(Unit::Second * 1)),
            Timestamp::NotATime => Timestamp::NotATime,
        }
    }

    /// Round to the nearest whole second.
    pub fn round_to_nearest_second(&self) -> Self {
        match self {
            Timestamp::Moment(e) => Timestamp::Moment(e.round(Unit::Second * 1)),
            Timestamp::NotATime => Timestamp::NotATime,
        }
    }

    /// Microseconds since the Unix epoch, or `None` for `NotATime`.
    ///
    /// Goes through [`Epoch::to_unix_duration`] so that leap seconds cancel out;
    /// subtracting the Unix reference epoch directly would shift every moment by the
    /// accumulated leap-second count.
    pub fn to_unix_microseconds(&self) -> Option<i64> {
        let epoch = self.epoch()?;
        Some((epoch.to_unix_duration().total_nanoseconds() / 1_000) as i64)
    }

    /// Rebuild a timestamp from microseconds since the Unix epoch.
    pub fn from_unix_microseconds(microseconds: i64) -> Self {
        Timestamp::Moment(Epoch::from_unix_duration(Unit::Microsecond * microseconds))
    }

    /// Signed duration `self − earlier`, or `None` if either side is `NotATime`.
    pub fn duration_since(&self, earlier: &Timestamp) -> Option<Duration> {
        Some(self.epoch()? - earlier.epoch()?)
    }

    /// Linear interpolation between two valid timestamps at fraction `t` (microsecond
    /// resolution). Any `NotATime` operand propagates.
    pub fn lerp(a: &Timestamp, b: &Timestamp, t: f64) -> Timestamp {
        match (a.epoch(), b.epoch()) {
            (Some(ea), Some(eb)) => Timestamp::from_epoch(ea + (eb - ea) * t),
            _ => Timestamp::NotATime,
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Timestamp::Moment(a), Timestamp::Moment(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format_default() {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str("not-a-time"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_round_trip() {
        let ts = Timestamp::parse("2013-07-10 08:30:15", "%Y-%m-%d %H:%M:%S").unwrap();
        assert!(ts.is_valid());
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").unwrap(), "2013-07-10 08:30:15");
    }

    #[test]
    fn unparseable_text_is_reported() {
        let err = Timestamp::parse("not a date", "%Y-%m-%d %H:%M:%S").unwrap_err();
        assert!(matches!(err, TrajkitError::UnrecognizedTimestampFormat(_)));
    }

    #[test]
    fn not_a_time_is_unordered() {
        let valid = Timestamp::from_gregorian_utc(2020, 1, 1, 0, 0, 0);
        assert_eq!(valid.partial_cmp(&Timestamp::NotATime), None);
        assert_eq!(Timestamp::NotATime.partial_cmp(&valid), None);
        assert!(valid < Timestamp::from_gregorian_utc(2020, 1, 1, 0, 0, 1));
    }

    #[test]
    fn unix_microseconds_round_trip() {
        let ts = Timestamp::from_gregorian_utc(2013, 7, 10, 8, 0, 0);
        let us = ts.to_unix_microseconds().unwrap();
        assert_eq!(Timestamp::from_unix_microseconds(us), ts);
    }

    #[test]
    fn unix_microseconds_match_the_civil_calendar() {
        // Pinned value: a round trip alone would also pass with a constant
        // leap-second offset applied in both directions.
        let ts = Timestamp::from_gregorian_utc(2013, 7, 10, 8, 0, 0);
        assert_eq!(ts.to_unix_microseconds(), Some(1_373_443_200_000_000));
        let epoch = Timestamp::from_gregorian_utc(1970, 1, 1, 0, 0, 0);
        assert_eq!(epoch.to_unix_microseconds(), Some(0));
    }

    #[test]
    fn second_rounding() {
        let base = Timestamp::from_gregorian_utc(2020, 6, 1, 12, 0, 0);
        let later = Timestamp::Moment(base.epoch().unwrap() + Unit::Millisecond * 700);
        assert_eq!(later.truncate_fractional_seconds(), base);
        assert_eq!(
            later.round_to_nearest_second(),
            Timestamp::from_gregorian_utc(2020, 6, 1, 12, 0, 1)
        );
    }

    #[test]
    fn lerp_halfway() {
        let a = Timestamp::from_gregorian_utc(2020, 1, 1, 0, 0, 0);
        let b = Timestamp::from_gregorian_utc(2020, 1, 1, 0, 0, 10);
        assert_eq!(
            Timestamp::lerp(&a, &b, 0.5),
            Timestamp::from_gregorian_utc(2020, 1, 1, 0, 0, 5)
        );
        assert_eq!(Timestamp::lerp(&a, &Timestamp::NotATime, 0.5), Timestamp::NotATime);
    }
}
