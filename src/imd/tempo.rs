//! Tempo table of the chart.
//!
//! The table is a dense list of gridlines. Each [`TempoSegment`] marks a beat and the BPM that produced it, so consecutive segments with the same BPM are subdivisions of one tempo rather than tempo changes.

use strict_num_extended::PositiveF64;
use thiserror::Error;

use crate::time::Time;

/// A gridline of the tempo table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoSegment {
    /// BPM in effect from this gridline, stored as read so that every bit round-trips.
    pub bpm: f64,
    /// Start time of the gridline.
    pub start: Time,
}

impl TempoSegment {
    /// Creates a new gridline.
    #[must_use]
    pub const fn new(bpm: f64, start: Time) -> Self {
        Self { bpm, start }
    }
}

/// A sparse tempo change point, used to regenerate the whole tempo table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoChange {
    /// BPM from the change point.
    pub bpm: PositiveF64,
    /// Time where the BPM starts.
    pub start: Time,
}

impl TempoChange {
    /// Creates a new change point.
    #[must_use]
    pub const fn new(bpm: PositiveF64, start: Time) -> Self {
        Self { bpm, start }
    }
}

/// An error occurred when regenerating the tempo table.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TempoError {
    /// No change point was given.
    #[error("at least one tempo change is required")]
    NoTempoChanges,
    /// A beat of the change point is shorter than a millisecond.
    #[error("bpm {bpm} is too fast for a millisecond grid")]
    TempoTooFast {
        /// The BPM of the change point.
        bpm: f64,
    },
}

/// Regenerates a dense tempo table from sparse change points, over `total` milliseconds.
///
/// The grid starts at zero with the first BPM. For each change point, a beat of `60000 / bpm` ms is added repeatedly while the last gridline is before the next change point (or `total` for the last one), and each new gridline is tagged with that BPM. Beats are accumulated in floating point and every gridline is rounded on its own, so the spacing does not drift. The start of the first change point is assumed to be zero.
///
/// Rounding every gridline on its own gives other bytes than adding a beat already rounded to whole milliseconds: at 128 BPM this yields 0, 469, 938, 1406, 1875 where stepping by rounded beats yields 0, 469, 938, 1407, 1876.
///
/// # Errors
///
/// Returns [`TempoError::NoTempoChanges`] if `changes` is empty, or [`TempoError::TempoTooFast`] if a beat of any change point is shorter than a millisecond.
pub fn regenerate_grid(changes: &[TempoChange], total: Time) -> Result<Vec<TempoSegment>, TempoError> {
    let first = changes.first().ok_or(TempoError::NoTempoChanges)?;
    if let Some(change) = changes.iter().find(|change| change.bpm.as_f64() > 60_000.0) {
        return Err(TempoError::TempoTooFast {
            bpm: change.bpm.as_f64(),
        });
    }
    let mut grid = vec![TempoSegment::new(first.bpm.as_f64(), Time::ZERO)];
    let mut cursor = 0.0f64;
    for (i, change) in changes.iter().enumerate() {
        let bpm = change.bpm.as_f64();
        let beat = 60_000.0 / bpm;
        let end = changes.get(i + 1).map_or(total, |next| next.start);
        while Time::from(cursor) < end {
            cursor += beat;
            grid.push(TempoSegment::new(bpm, Time::from(cursor)));
        }
    }
    Ok(grid)
}
