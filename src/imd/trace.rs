//! Reconstruction of multi-waypoint gestures from the flat timeline.
//!
//! A hold or a slide is stored as separate records: an opener, any number of continuations, and a terminal record, all at the same lane. A slide may move its lane between waypoints, so the lane to match is tracked along the trace.

use thiserror::Error;

use super::{
    event::{EventKind, EventRecord},
    model::Imd,
};
use crate::time::Time;

/// An ordered group of records forming one gesture. It is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trace {
    pub(crate) records: Vec<EventRecord>,
}

impl Trace {
    /// Gets the waypoints in order.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Gets the time of the opening record.
    #[must_use]
    pub fn start(&self) -> Time {
        self.records.first().map_or(Time::ZERO, |record| record.time)
    }

    /// Gets the number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the trace has no waypoint, which never holds for a split trace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the trace ends with a terminal record.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.records
            .last()
            .is_some_and(|record| record.kind.is_terminal())
    }
}

/// A finding while splitting traces.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitWarning {
    /// The timeline ended before a terminal record of the trace. The trace is kept as it is.
    #[error("trace opened at {start} on lane {lane} has no terminal record")]
    UnterminatedTrace {
        /// Time of the opening record.
        start: Time,
        /// Lane of the opening record.
        lane: u8,
    },
}

/// Output of [`Imd::split_traces`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitOutput {
    /// Warnings that occurred during splitting.
    pub warnings: Vec<SplitWarning>,
}

impl Imd {
    /// Moves every non-standalone record of the timeline into a [`Trace`].
    ///
    /// The timeline is reordered first, then scanned from the front. Each record which is not standalone opens a trace, and the rest of the timeline is searched for records at its lane: continuations join the trace, and a terminal record joins and closes it. Other records at the lane are skipped. A [`EventKind::ShiftOpen`] or [`EventKind::ShiftContinue`] moves the lane to search by its value.
    pub fn split_traces(&mut self) -> SplitOutput {
        self.reorder();
        let mut warnings = Vec::new();
        let mut slots: Vec<Option<EventRecord>> =
            std::mem::take(self.events_mut()).into_iter().map(Some).collect();

        for open in 0..slots.len() {
            let Some(opener) = slots
                .get_mut(open)
                .and_then(|slot| slot.take_if(|record| !record.kind.is_standalone()))
            else {
                continue;
            };

            let mut lane = i64::from(opener.params.lane);
            if opener.kind == EventKind::ShiftOpen {
                lane += i64::from(opener.params.value);
            }
            let mut records = vec![opener];

            for slot in slots.iter_mut().skip(open + 1) {
                let Some(record) = slot.filter(|record| i64::from(record.params.lane) == lane)
                else {
                    continue;
                };
                if record.kind.is_continuation() {
                    if record.kind.shifts_lane() {
                        lane += i64::from(record.params.value);
                    }
                    *slot = None;
                    records.push(record);
                } else if record.kind.is_terminal() {
                    *slot = None;
                    records.push(record);
                    break;
                }
            }

            let trace = Trace { records };
            if !trace.is_terminated() {
                warnings.push(SplitWarning::UnterminatedTrace {
                    start: opener.time,
                    lane: opener.params.lane,
                });
            }
            self.traces.push(trace);
        }

        *self.events_mut() = slots.into_iter().flatten().collect();
        SplitOutput { warnings }
    }

    /// Moves the records of every trace back onto the timeline, then reorders it.
    pub fn merge_traces(&mut self) {
        let traces = std::mem::take(&mut self.traces);
        self.events_mut()
            .extend(traces.into_iter().flat_map(|trace| trace.records));
        self.reorder();
    }
}
