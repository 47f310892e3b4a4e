//! Binary reader and writer of the IMD container.
//!
//! All fields are little-endian:
//!
//! | field | width |
//! |---|---|
//! | total time (ms) | 4 |
//! | tempo count `T` | 4 |
//! | `T` × (start ms: 4, bpm: binary64 8) | 12·T |
//! | separator `03 03` | 2 |
//! | event count `E` | 4 |
//! | `E` × (type code: 2, time ms: 4, parameters: 5) | 11·E |

use super::{
    DecodeConfig, ImdError, ImdWarning, Result, SeparatorCheck,
    event::{EventKind, EventRecord, Params},
    model::Imd,
    tempo::TempoSegment,
};
use crate::time::Time;

/// The bytes expected between the tempo table and the event table.
pub const SEPARATOR: [u8; 2] = [0x03, 0x03];

const TEMPO_RECORD_LEN: usize = 4 + 8;
const EVENT_RECORD_LEN: usize = 2 + 4 + 5;

/// Reads fixed-width fields from the front of a byte slice.
struct ByteCursor<'a> {
    /// The read position.
    index: usize,
    /// The source bytes.
    source: &'a [u8],
}

impl<'a> ByteCursor<'a> {
    const fn new(source: &'a [u8]) -> Self {
        Self { index: 0, source }
    }

    const fn remaining(&self) -> usize {
        self.source.len() - self.index
    }

    fn take<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let bytes = self
            .source
            .get(self.index..self.index + N)
            .and_then(|slice| <[u8; N]>::try_from(slice).ok())
            .ok_or(ImdError::TruncatedInput {
                field,
                offset: self.index,
                needed: N,
                available: self.remaining(),
            })?;
        self.index += N;
        Ok(bytes)
    }

    fn u32(&mut self, field: &'static str) -> Result<u32> {
        self.take(field).map(u32::from_le_bytes)
    }

    fn f64(&mut self, field: &'static str) -> Result<f64> {
        self.take(field).map(f64::from_le_bytes)
    }
}

/// Decodes the container into an [`Imd`], collecting non-fatal findings into `warnings`.
pub(crate) fn decode(
    source: &[u8],
    config: &DecodeConfig,
    warnings: &mut Vec<ImdWarning>,
) -> Result<Imd> {
    let mut cursor = ByteCursor::new(source);

    let total_time = Time::from(cursor.u32("total time")?);

    let tempo_count = cursor.u32("tempo count")? as usize;
    if tempo_count
        .checked_mul(TEMPO_RECORD_LEN)
        .is_none_or(|len| len > cursor.remaining())
    {
        return Err(ImdError::MalformedTempoTable {
            declared: tempo_count,
            available: cursor.remaining(),
        });
    }
    let mut tempo = Vec::with_capacity(tempo_count);
    for _ in 0..tempo_count {
        let start = Time::from(cursor.u32("tempo start")?);
        let bpm = cursor.f64("tempo bpm")?;
        tempo.push(TempoSegment::new(bpm, start));
    }

    let separator = cursor.take::<2>("separator")?;
    if separator != SEPARATOR {
        match config.separator {
            SeparatorCheck::Strict => {
                return Err(ImdError::InvalidSeparator { found: separator });
            }
            SeparatorCheck::Lenient => {
                warnings.push(ImdWarning::UnexpectedSeparator { found: separator });
            }
        }
    }

    let event_count = cursor.u32("event count")? as usize;
    if event_count
        .checked_mul(EVENT_RECORD_LEN)
        .is_none_or(|len| len > cursor.remaining())
    {
        return Err(ImdError::MalformedEventTable {
            declared: event_count,
            available: cursor.remaining(),
        });
    }
    let mut events = Vec::with_capacity(event_count);
    for index in 0..event_count {
        let code = cursor.take::<2>("event type")?;
        let time = Time::from(cursor.u32("event time")?);
        let params = Params::from_bytes(cursor.take::<5>("event parameters")?);
        let kind = EventKind::from_code(code);
        if matches!(kind, EventKind::Unknown(_)) {
            warnings.push(ImdWarning::UnknownTypeCode { index, code });
        }
        events.push(EventRecord { kind, time, params });
    }

    if cursor.remaining() != 0 {
        warnings.push(ImdWarning::TrailingBytes {
            count: cursor.remaining(),
        });
    }

    Ok(Imd::new(total_time, tempo, events))
}

fn count_field(len: usize, field: &'static str) -> Result<u32> {
    u32::try_from(len).map_err(|_| ImdError::CountOverflow { field, len })
}

fn time_field(time: Time, field: &'static str) -> Result<u32> {
    u32::try_from(time.as_millis()).map_err(|_| ImdError::TimeOutOfRange { field, time })
}

/// Encodes the flat tables of `imd`. Pending traces must be merged beforehand.
pub(crate) fn encode(imd: &Imd) -> Result<Vec<u8>> {
    let tempo = imd.tempo();
    let events = imd.events();
    let mut out = Vec::with_capacity(
        4 + 4 + TEMPO_RECORD_LEN * tempo.len() + 2 + 4 + EVENT_RECORD_LEN * events.len(),
    );

    out.extend(time_field(imd.total_time(), "total time")?.to_le_bytes());
    out.extend(count_field(tempo.len(), "tempo count")?.to_le_bytes());
    for segment in tempo {
        out.extend(time_field(segment.start, "tempo start")?.to_le_bytes());
        out.extend(segment.bpm.to_le_bytes());
    }
    out.extend(SEPARATOR);
    out.extend(count_field(events.len(), "event count")?.to_le_bytes());
    for event in events {
        out.extend(event.kind.code());
        out.extend(time_field(event.time, "event time")?.to_le_bytes());
        out.extend(event.params.to_bytes());
    }
    Ok(out)
}
