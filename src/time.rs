//! Definition of time on the chart, as [`Time`].
//!
//! Every timestamp in the IMD format is an integral count of milliseconds. Fractional inputs are rounded half to even, so `Time::from(468.5)` and `Time::from(467.5)` both land on `468`.

use std::ops::{Add, Div, Mul, Sub};

use num::Integer;

/// A millisecond-precision timestamp on the chart.
///
/// It should be non-negative, but it is not enforced because intermediate arithmetic may go below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Time {
    ms: i64,
}

/// Display form of [`Time`], split into minutes, seconds and milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinSecMs {
    /// Whole minutes.
    pub minutes: i64,
    /// Seconds in the minute, `0..60`.
    pub seconds: i64,
    /// Milliseconds in the second, `0..1000`.
    pub millis: i64,
}

impl Time {
    /// The origin of the chart.
    pub const ZERO: Self = Self { ms: 0 };

    /// Creates a new time from whole milliseconds.
    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self { ms }
    }

    /// Creates a new time from minutes, seconds and milliseconds. The sum is rounded into whole milliseconds.
    #[must_use]
    pub fn from_parts(minutes: f64, seconds: f64, millis: f64) -> Self {
        Self::from((minutes * 60.0 + seconds) * 1000.0 + millis)
    }

    /// Gets the time in milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.ms
    }

    /// Splits the time into its display form. Floor division is used, so a negative time has a negative minute part and non-negative others.
    #[must_use]
    pub fn to_parts(self) -> MinSecMs {
        let (minutes, rest) = self.ms.div_mod_floor(&60_000);
        let (seconds, millis) = rest.div_mod_floor(&1_000);
        MinSecMs {
            minutes,
            seconds,
            millis,
        }
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let MinSecMs {
            minutes,
            seconds,
            millis,
        } = self.to_parts();
        write!(f, "[{minutes}, {seconds}, {millis}]")
    }
}

impl From<i64> for Time {
    fn from(ms: i64) -> Self {
        Self { ms }
    }
}

impl From<u32> for Time {
    fn from(ms: u32) -> Self {
        Self { ms: ms.into() }
    }
}

impl From<f64> for Time {
    fn from(ms: f64) -> Self {
        Self {
            ms: ms.round_ties_even() as i64,
        }
    }
}

impl From<[f64; 3]> for Time {
    fn from([minutes, seconds, millis]: [f64; 3]) -> Self {
        Self::from_parts(minutes, seconds, millis)
    }
}

/// Saturates at the bounds of `i64`, as the conversion from `f64` does.
impl<T: Into<Time>> Add<T> for Time {
    type Output = Self;

    fn add(self, rhs: T) -> Self::Output {
        Self {
            ms: self.ms.saturating_add(rhs.into().ms),
        }
    }
}

impl<T: Into<Time>> Sub<T> for Time {
    type Output = Self;

    fn sub(self, rhs: T) -> Self::Output {
        Self {
            ms: self.ms.saturating_sub(rhs.into().ms),
        }
    }
}

impl Mul<f64> for Time {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::from(self.ms as f64 * rhs)
    }
}

impl Div<f64> for Time {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self::from(self.ms as f64 / rhs)
    }
}
