//! In-memory model of a chart, as [`Imd`].

use itertools::Itertools;

use super::{
    event::EventRecord,
    tempo::{TempoChange, TempoError, TempoSegment, regenerate_grid},
    trace::Trace,
};
use crate::time::Time;

/// A decoded chart: the tempo table and the event timeline.
///
/// Records grouped by [`Imd::split_traces`] are moved out of [`Imd::events`] into [`Imd::traces`] until [`Imd::merge_traces`] brings them back.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Imd {
    total_time: Time,
    pub(crate) tempo: Vec<TempoSegment>,
    events: Vec<EventRecord>,
    pub(crate) traces: Vec<Trace>,
}

impl Imd {
    /// Creates a new chart from its tables. The records are kept in the given order.
    #[must_use]
    pub const fn new(total_time: Time, tempo: Vec<TempoSegment>, events: Vec<EventRecord>) -> Self {
        Self {
            total_time,
            tempo,
            events,
            traces: Vec::new(),
        }
    }

    /// Gets the length of the chart.
    #[must_use]
    pub const fn total_time(&self) -> Time {
        self.total_time
    }

    /// Gets the tempo table.
    #[must_use]
    pub fn tempo(&self) -> &[TempoSegment] {
        &self.tempo
    }

    /// Replaces the tempo table as is.
    pub fn set_tempo(&mut self, tempo: Vec<TempoSegment>) {
        self.tempo = tempo;
    }

    /// Gets the records on the flat timeline, excluding the ones held in traces.
    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Gets the records on the flat timeline mutably. Call [`Imd::reorder`] after moving any of them in time.
    pub fn events_mut(&mut self) -> &mut Vec<EventRecord> {
        &mut self.events
    }

    /// Gets the traces split from the timeline.
    #[must_use]
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Sorts the flat timeline by time. Records at the same time keep their relative order.
    pub fn reorder(&mut self) {
        self.events.sort_by_key(|event| event.time);
    }

    /// Regenerates the tempo table from sparse change points over the length of the chart, and replaces the current one with it.
    ///
    /// # Errors
    ///
    /// See [`regenerate_grid`].
    pub fn retarget_tempo(&mut self, changes: &[TempoChange]) -> Result<(), TempoError> {
        self.tempo = regenerate_grid(changes, self.total_time)?;
        Ok(())
    }

    /// Summarizes the chart.
    #[must_use]
    pub fn info(&self) -> ImdInfo {
        ImdInfo {
            total_time: self.total_time,
            tempo_changes: self
                .tempo
                .iter()
                .dedup_by(|a, b| a.bpm.to_bits() == b.bpm.to_bits())
                .copied()
                .collect(),
            gridlines: self.tempo.len(),
            events: self.events.len() + self.traces.iter().map(Trace::len).sum::<usize>(),
            traces: self.traces.len(),
        }
    }
}

/// Summary of an [`Imd`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImdInfo {
    /// Length of the chart.
    pub total_time: Time,
    /// Gridlines where the BPM changes, including the first one.
    pub tempo_changes: Vec<TempoSegment>,
    /// Number of gridlines in the tempo table.
    pub gridlines: usize,
    /// Number of records, including the ones held in traces.
    pub events: usize,
    /// Number of traces currently split out.
    pub traces: usize,
}

impl std::fmt::Display for ImdInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total time: {}", self.total_time)?;
        write!(f, "Bpm:")?;
        for (i, change) in self.tempo_changes.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{} from {}", change.bpm, change.start)?;
        }
        writeln!(f)?;
        writeln!(f, "Gridlines: {}", self.gridlines)?;
        write!(f, "Events: {} ({} traces)", self.events, self.traces)
    }
}
