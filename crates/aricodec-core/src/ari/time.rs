//! Time scalar values.
//!
//! Timepoints and timeperiods are stored as signed microsecond offsets; a
//! timepoint is an offset from a configurable epoch. The wire form is an
//! integer number of seconds when exact, otherwise a decimal fraction
//! `[exponent, mantissa]` pair.

use chrono::{DateTime, TimeZone, Utc};

/// Microseconds per second.
const USEC_PER_SEC: i64 = 1_000_000;

/// A time scalar with microsecond resolution.
///
/// Used for both timeperiod values and timepoint offsets. Comparison and
/// equality are by scalar value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeVal {
    usec: i64,
}

/// Decimal-fraction split of a time scalar.
///
/// The value is `mant * 10^exp` seconds. `exp` is zero only when the value
/// is a whole number of seconds, in which case the wire form is a bare
/// integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecFrac {
    /// Power-of-ten exponent, in `[-6, 0]` after normalization.
    pub exp: i32,
    /// Mantissa with trailing decimal zeros removed.
    pub mant: i64,
}

impl TimeVal {
    /// Construct from a microsecond count.
    #[must_use]
    pub const fn from_usec(usec: i64) -> Self {
        Self { usec }
    }

    /// Construct from a whole second count.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        secs.checked_mul(USEC_PER_SEC).map(|usec| Self { usec })
    }

    /// Construct from fractional seconds.
    ///
    /// Returns `None` for non-finite input or overflow.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        let usec = secs * USEC_PER_SEC as f64;
        if usec < i64::MIN as f64 || usec > i64::MAX as f64 {
            return None;
        }
        Some(Self { usec: usec.round() as i64 })
    }

    /// The microsecond count.
    #[must_use]
    pub const fn usec(self) -> i64 {
        self.usec
    }

    /// Split into whole seconds and a nonnegative microsecond remainder.
    #[must_use]
    pub const fn split(self) -> (i64, u32) {
        let secs = self.usec.div_euclid(USEC_PER_SEC);
        let frac = self.usec.rem_euclid(USEC_PER_SEC);
        (secs, frac as u32)
    }

    /// Normalize to the decimal-fraction wire split.
    #[must_use]
    pub fn to_decfrac(self) -> DecFrac {
        if self.usec == 0 {
            return DecFrac { exp: 0, mant: 0 };
        }
        let mut mant = self.usec;
        let mut exp = -6;
        while exp < 0 && mant % 10 == 0 {
            mant /= 10;
            exp += 1;
        }
        DecFrac { exp, mant }
    }

    /// Reconstruct from a decimal-fraction pair.
    ///
    /// Rejects sub-microsecond resolution (`exp < -6`) and any value that
    /// overflows the microsecond range.
    #[must_use]
    pub fn from_decfrac(exp: i64, mant: i64) -> Option<Self> {
        if !(-6..=18).contains(&exp) {
            return None;
        }
        // scale mantissa to microseconds: mant * 10^(exp + 6)
        let mut usec = mant;
        for _ in 0..(exp + 6) {
            usec = usec.checked_mul(10)?;
        }
        Some(Self { usec })
    }
}

/// The DTN management epoch: 2000-01-01T00:00:00Z.
#[must_use]
pub fn dtn_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single().expect("valid epoch")
}

/// The reference epoch for timepoint values.
///
/// The default is the DTN management epoch; deployments whose ADM catalog
/// declares a different time origin construct this from that declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBase {
    epoch: DateTime<Utc>,
}

impl Default for TimeBase {
    fn default() -> Self {
        Self { epoch: dtn_epoch() }
    }
}

impl TimeBase {
    /// Construct from an explicit epoch.
    #[must_use]
    pub const fn new(epoch: DateTime<Utc>) -> Self {
        Self { epoch }
    }

    /// The epoch instant.
    #[must_use]
    pub const fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Convert a timepoint offset to a calendar instant.
    ///
    /// Returns `None` if the offset is outside the representable calendar
    /// range.
    #[must_use]
    pub fn datetime(&self, tp: TimeVal) -> Option<DateTime<Utc>> {
        self.epoch.checked_add_signed(chrono::Duration::microseconds(tp.usec()))
    }

    /// Convert a calendar instant to a timepoint offset.
    #[must_use]
    pub fn timeval(&self, at: DateTime<Utc>) -> TimeVal {
        let delta = at.signed_duration_since(self.epoch);
        TimeVal::from_usec(delta.num_microseconds().unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decfrac_whole_seconds() {
        let tv = TimeVal::from_secs(101).unwrap();
        assert_eq!(tv.to_decfrac(), DecFrac { exp: 0, mant: 101 });
    }

    #[test]
    fn test_decfrac_zero() {
        assert_eq!(TimeVal::from_usec(0).to_decfrac(), DecFrac { exp: 0, mant: 0 });
    }

    #[test]
    fn test_decfrac_fractional() {
        // 12.34 seconds
        let tv = TimeVal::from_usec(12_340_000);
        assert_eq!(tv.to_decfrac(), DecFrac { exp: -2, mant: 1234 });
        assert_eq!(TimeVal::from_decfrac(-2, 1234), Some(tv));
    }

    #[test]
    fn test_decfrac_positive_exponent() {
        // 1000 seconds normalizes away the trailing zeros only below the
        // second; whole-second counts keep exp == 0.
        let tv = TimeVal::from_secs(1000).unwrap();
        assert_eq!(tv.to_decfrac(), DecFrac { exp: 0, mant: 1000 });
        assert_eq!(TimeVal::from_decfrac(3, 1), Some(tv));
    }

    #[test]
    fn test_decfrac_rejects_submicro() {
        assert_eq!(TimeVal::from_decfrac(-7, 1), None);
    }

    #[test]
    fn test_negative_split() {
        let tv = TimeVal::from_usec(-1_500_000);
        assert_eq!(tv.split(), (-2, 500_000));
    }

    #[test]
    fn test_timebase_roundtrip() {
        let base = TimeBase::default();
        let tv = TimeVal::from_usec(725_943_845_000_000);
        let dt = base.datetime(tv).unwrap();
        assert_eq!(base.timeval(dt), tv);
    }
}
