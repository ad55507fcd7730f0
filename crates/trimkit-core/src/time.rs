//! Time representation for seek targets and trim ranges.
//!
//! Interactive code works in `f64` seconds. Anything handed to a backend is
//! quantized to a rational value on a fixed timescale so that repeated
//! conversions never drift.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Ticks per second used when no other timescale is configured (millisecond precision).
pub const DEFAULT_TIMESCALE: i64 = 1000;

/// A point in media time, stored as an exact rational number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RationalTime {
    value: Rational64,
}

impl RationalTime {
    /// Zero time constant.
    pub const ZERO: Self = Self {
        value: Rational64::new_raw(0, 1),
    };

    /// Create a time of `ticks / timescale` seconds.
    #[inline]
    pub fn new(ticks: i64, timescale: i64) -> Self {
        Self {
            value: Rational64::new(ticks, timescale),
        }
    }

    /// Quantize seconds onto `timescale` ticks, rounding to the nearest tick.
    ///
    /// Non-finite input maps to zero; the timescale is clamped to at least 1.
    pub fn from_seconds_f64(seconds: f64, timescale: i64) -> Self {
        let timescale = timescale.max(1);
        if !seconds.is_finite() {
            return Self::ZERO;
        }
        let ticks = (seconds * timescale as f64).round() as i64;
        Self::new(ticks, timescale)
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn to_seconds_f64(self) -> f64 {
        *self.value.numer() as f64 / *self.value.denom() as f64
    }

    /// Check if this time is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        *self.value.numer() == 0
    }

    /// Check if this time lies before zero.
    #[inline]
    pub fn is_negative(self) -> bool {
        *self.value.numer() < 0
    }
}

impl Default for RationalTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for RationalTime {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
        }
    }
}

impl Sub for RationalTime {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.value,
        }
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.to_seconds_f64())
    }
}

/// A time range with inclusive start and exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: RationalTime,
    /// Length of the range
    pub duration: RationalTime,
}

impl TimeRange {
    /// Empty range starting at zero.
    pub const EMPTY: Self = Self {
        start: RationalTime::ZERO,
        duration: RationalTime::ZERO,
    };

    /// Create a new time range from start and duration.
    #[inline]
    pub fn new(start: RationalTime, duration: RationalTime) -> Self {
        Self { start, duration }
    }

    /// Create a time range from start and end times.
    #[inline]
    pub fn from_start_end(start: RationalTime, end: RationalTime) -> Self {
        Self {
            start,
            duration: end - start,
        }
    }

    /// Quantize a `[start, end)` pair given in seconds.
    pub fn from_seconds_f64(start: f64, end: f64, timescale: i64) -> Self {
        Self::from_start_end(
            RationalTime::from_seconds_f64(start, timescale),
            RationalTime::from_seconds_f64(end, timescale),
        )
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(self) -> RationalTime {
        self.start + self.duration
    }

    /// Whether the range covers no time at all.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.duration.is_zero()
    }

    /// Check if a time is within this range.
    #[inline]
    pub fn contains(self, time: RationalTime) -> bool {
        time >= self.start && time < self.end()
    }

    /// True when `other` lies entirely inside this range.
    pub fn encloses(self, other: Self) -> bool {
        other.start >= self.start && other.end() <= self.end() && !other.duration.is_negative()
    }

    /// The same range moved later by `offset`.
    #[inline]
    pub fn shifted(self, offset: RationalTime) -> Self {
        Self {
            start: self.start + offset,
            duration: self.duration,
        }
    }

    /// Compute the intersection of two ranges, if any.
    pub fn intersection(self, other: Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        (start < end).then(|| Self::from_start_end(start, end))
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}
