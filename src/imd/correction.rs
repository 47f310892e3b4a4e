//! Timing correction of traces onto a tempo-derived grid.
//!
//! The grid unit is one sixteenth note, `floor(15000 / bpm)` ms. A delay between two waypoints which falls just after a gridline is pulled back, either snapped below the gridline when it is very close, or blended smoothly towards the soft boundary `delta1` when it is in the soft band `[max_ms, delta1]` of its grid cell. Delays shorter than one unit and delays beyond the soft band are left alone.

use strict_num_extended::{FinF64, PositiveF64};
use thiserror::Error;

use super::{model::Imd, trace::Trace};

/// Parameters of the timing correction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrectionConfig {
    /// Offsets into a grid cell below this are snapped below the gridline.
    pub max_ms: f64,
    /// Exponent of the blend curve.
    pub n: f64,
    /// Relative position of the soft boundary in a grid cell, in `(0, 1]`.
    pub p: f64,
    /// BPM used when the chart has no tempo table.
    pub bpm: f64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            max_ms: 5.0,
            n: 1.5,
            p: 0.7,
            bpm: 150.0,
        }
    }
}

impl CorrectionConfig {
    /// Creates a new config with the snapping threshold and the blend exponent.
    #[must_use]
    pub fn new(max_ms: f64, n: f64) -> Self {
        Self {
            max_ms,
            n,
            ..Self::default()
        }
    }

    /// Sets the relative position of the soft boundary.
    #[must_use]
    pub const fn p(mut self, p: f64) -> Self {
        self.p = p;
        self
    }

    /// Sets the fallback BPM.
    #[must_use]
    pub const fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }
}

/// An error occurred when deriving the correction grid.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CorrectionError {
    /// A parameter is out of its domain.
    #[error("correction parameter `{name}` is out of range: {value}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The given value.
        value: f64,
    },
    /// The grid unit is shorter than a millisecond.
    #[error("bpm {bpm} is too fast for a millisecond grid")]
    TempoTooFast {
        /// The BPM in effect.
        bpm: f64,
    },
    /// The soft band is empty, so the blend curve is undefined.
    #[error("soft band is empty at bpm {bpm}: max_ms {max_ms} is not below delta1 {delta1}")]
    DegenerateSoftBand {
        /// The BPM in effect.
        bpm: f64,
        /// The snapping threshold.
        max_ms: f64,
        /// The soft boundary derived from the BPM.
        delta1: i64,
    },
}

/// The correction grid derived for one tempo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    delta: i64,
    delta1: i64,
    max_ms: f64,
    n: f64,
}

impl GridParams {
    /// Derives the grid for `bpm`.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectionError`] if a parameter is out of range, if the grid unit would be zero, or if `max_ms` is not below the soft boundary.
    pub fn new(bpm: f64, config: &CorrectionConfig) -> Result<Self, CorrectionError> {
        let invalid = |name, value| CorrectionError::InvalidParameter { name, value };
        let bpm = PositiveF64::try_from(bpm)
            .map_err(|_| invalid("bpm", bpm))?
            .as_f64();
        let max_ms = FinF64::try_from(config.max_ms)
            .ok()
            .filter(|max_ms| max_ms.as_f64() >= 0.0)
            .ok_or_else(|| invalid("max_ms", config.max_ms))?
            .as_f64();
        let n = PositiveF64::try_from(config.n)
            .map_err(|_| invalid("n", config.n))?
            .as_f64();
        let p = PositiveF64::try_from(config.p)
            .ok()
            .filter(|p| p.as_f64() <= 1.0)
            .ok_or_else(|| invalid("p", config.p))?
            .as_f64();

        let delta = (15_000.0 / bpm).floor() as i64;
        if delta < 1 {
            return Err(CorrectionError::TempoTooFast { bpm });
        }
        let delta1 = (15_000.0 * p / bpm).round_ties_even() as i64;
        if delta1 as f64 <= max_ms {
            return Err(CorrectionError::DegenerateSoftBand {
                bpm,
                max_ms,
                delta1,
            });
        }
        Ok(Self {
            delta,
            delta1,
            max_ms,
            n,
        })
    }

    /// Gets the grid unit in milliseconds.
    #[must_use]
    pub const fn delta(&self) -> i64 {
        self.delta
    }

    /// Gets the soft boundary in a grid cell.
    #[must_use]
    pub const fn delta1(&self) -> i64 {
        self.delta1
    }

    /// The blend curve on the soft band, rising from `max_ms` towards `delta1`.
    fn blend(&self, x: f64) -> f64 {
        let delta1 = self.delta1 as f64;
        delta1 - (delta1 - x).powf(self.n) / (delta1 - self.max_ms).powf(self.n - 1.0)
    }

    /// Corrects a delay between two waypoints.
    #[must_use]
    pub fn correct(&self, dt: i64) -> i64 {
        if dt < self.delta {
            return dt;
        }
        let cell_start = dt / self.delta * self.delta;
        let local = (dt - cell_start) as f64;
        if local < self.max_ms {
            cell_start - 1
        } else if local <= self.delta1 as f64 {
            let blended = self.blend(local).round_ties_even() as i64;
            cell_start + blended.min(self.delta - 1)
        } else {
            dt
        }
    }
}

impl Trace {
    /// Corrects the delay of every timed waypoint, moving the following waypoint to keep up with it.
    ///
    /// The opening record never moves, and the following ones cascade.
    pub fn correct(&mut self, grid: &GridParams) {
        let mut records = self.records.iter_mut().peekable();
        while let Some(record) = records.next() {
            if !record.kind.is_timed() {
                continue;
            }
            let corrected = grid.correct(i64::from(record.params.value));
            record.params.value = corrected.clamp(i32::MIN.into(), i32::MAX.into()) as i32;
            if let Some(next) = records.peek_mut() {
                next.time = record.time + corrected;
            }
        }
    }
}

impl Imd {
    /// Corrects every split trace, with the grid of the tempo in effect at its start.
    ///
    /// Traces are processed in order of their start. The tempo of a trace is the last segment starting at or before it, or [`CorrectionConfig::bpm`] if the table is empty. A grid is derived only for the tempos which some trace starts under, so tempos without traces are never checked.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectionError`] if the grid for the tempo of any trace cannot be derived.
    pub fn correct(&mut self, config: &CorrectionConfig) -> Result<(), CorrectionError> {
        let tempo = &self.tempo;
        let mut segment = 0;
        let mut current: Option<(f64, GridParams)> = None;

        self.traces.sort_by_key(Trace::start);
        for trace in &mut self.traces {
            let start = trace.start();
            while tempo.get(segment + 1).is_some_and(|next| next.start <= start) {
                segment += 1;
            }
            let bpm = tempo.get(segment).map_or(config.bpm, |segment| segment.bpm);
            let grid = match current {
                Some((current_bpm, grid)) if current_bpm.to_bits() == bpm.to_bits() => grid,
                _ => {
                    let grid = GridParams::new(bpm, config)?;
                    current = Some((bpm, grid));
                    grid
                }
            };
            trace.correct(&grid);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteenth_at_150() {
        let grid = GridParams::new(150.0, &CorrectionConfig::new(5.0, 1.5).p(0.7)).unwrap();
        assert_eq!(grid.delta(), 100);
        assert_eq!(grid.delta1(), 70);

        // 70 - 20^1.5 / 65^0.5 = 58.906...
        assert_eq!(grid.correct(250), 259);
        // Snapped below the gridline.
        assert_eq!(grid.correct(201), 199);
        // Beyond the soft band.
        assert_eq!(grid.correct(285), 285);
        // Shorter than a unit.
        assert_eq!(grid.correct(99), 99);
        // The soft boundary itself is a fixed point.
        assert_eq!(grid.correct(170), 170);
    }

    #[test]
    fn soft_band_never_reaches_next_gridline() {
        // 15000 / 160 = 93.75, so delta1 rounds past delta.
        let grid = GridParams::new(160.0, &CorrectionConfig::new(5.0, 1.5).p(1.0)).unwrap();
        assert_eq!(grid.delta(), 93);
        assert_eq!(grid.delta1(), 94);
        for dt in 93..1000 {
            let corrected = grid.correct(dt);
            assert_ne!(corrected % 93, 0, "dt {dt} corrected onto a gridline");
            assert_eq!(corrected / 93, dt / 93 - i64::from(dt % 93 < 5));
        }
    }

    #[test]
    fn degenerate_soft_band_is_rejected() {
        let config = CorrectionConfig::new(70.0, 1.5).p(0.7);
        assert_eq!(
            GridParams::new(150.0, &config),
            Err(CorrectionError::DegenerateSoftBand {
                bpm: 150.0,
                max_ms: 70.0,
                delta1: 70
            })
        );
    }

    #[test]
    fn invalid_parameters() {
        let config = CorrectionConfig::default();
        assert!(matches!(
            GridParams::new(0.0, &config),
            Err(CorrectionError::InvalidParameter { name: "bpm", .. })
        ));
        assert!(matches!(
            GridParams::new(150.0, &config.p(1.5)),
            Err(CorrectionError::InvalidParameter { name: "p", .. })
        ));
        assert!(matches!(
            GridParams::new(20_000.0, &config),
            Err(CorrectionError::TempoTooFast { .. })
        ));
    }
}
