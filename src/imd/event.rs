//! Definitions of the event records on the chart timeline.
//!
//! Each record carries a two-byte type code. The known codes are mapped onto [`EventKind`], and the others are kept as [`EventKind::Unknown`] so that they round-trip untouched.

use crate::time::Time;

/// Kind of an event record, decoded from its raw two-byte type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// A single tap. `00 00`
    Tap,
    /// A single flick, the value is its direction. `01 00`
    Flick,
    /// A standalone hold, the value is its length. `02 00`
    Hold,
    /// Opens a slide, moving the lane by the value. `61 00`
    ShiftOpen,
    /// Opens a hold whose value is the time to the next waypoint. `62 00`
    HoldOpen,
    /// Continues a slide, moving the lane by the value. `21 00`
    ShiftContinue,
    /// Continues a hold whose value is the time to the next waypoint. `22 00`
    HoldContinue,
    /// Terminates a slide. `A1 00`
    ShiftEnd,
    /// Terminates a hold. `A2 00`
    HoldEnd,
    /// Any other code, kept as is.
    Unknown([u8; 2]),
}

impl EventKind {
    /// Code table of the known kinds.
    const TABLE: [([u8; 2], Self); 9] = [
        ([0x00, 0x00], Self::Tap),
        ([0x01, 0x00], Self::Flick),
        ([0x02, 0x00], Self::Hold),
        ([0x61, 0x00], Self::ShiftOpen),
        ([0x62, 0x00], Self::HoldOpen),
        ([0x21, 0x00], Self::ShiftContinue),
        ([0x22, 0x00], Self::HoldContinue),
        ([0xA1, 0x00], Self::ShiftEnd),
        ([0xA2, 0x00], Self::HoldEnd),
    ];

    /// Decodes the kind from a raw type code.
    #[must_use]
    pub fn from_code(code: [u8; 2]) -> Self {
        Self::TABLE
            .iter()
            .find(|(raw, _)| *raw == code)
            .map_or(Self::Unknown(code), |&(_, kind)| kind)
    }

    /// Encodes the kind into its raw type code.
    #[must_use]
    pub fn code(self) -> [u8; 2] {
        if let Self::Unknown(code) = self {
            return code;
        }
        Self::TABLE
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or([0, 0], |&(raw, _)| raw)
    }

    /// Whether the record stands alone and never takes part in a trace.
    #[must_use]
    pub const fn is_standalone(self) -> bool {
        matches!(self, Self::Tap | Self::Flick | Self::Hold)
    }

    /// Whether the record moves the lane of the trace by its value.
    #[must_use]
    pub const fn shifts_lane(self) -> bool {
        matches!(self, Self::ShiftOpen | Self::ShiftContinue)
    }

    /// Whether the record continues an open trace.
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        matches!(self, Self::ShiftContinue | Self::HoldContinue)
    }

    /// Whether the record closes an open trace.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ShiftEnd | Self::HoldEnd)
    }

    /// Whether the value is the delay to the next waypoint, which is subject to timing correction.
    #[must_use]
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::HoldOpen | Self::HoldContinue)
    }
}

impl From<[u8; 2]> for EventKind {
    fn from(code: [u8; 2]) -> Self {
        Self::from_code(code)
    }
}

/// The five-byte parameter payload of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Params {
    /// The lane, or column, which the record belongs to.
    pub lane: u8,
    /// Signed value whose meaning depends on the [`EventKind`]: a delay in milliseconds, a lane shift, or a direction.
    pub value: i32,
}

impl Params {
    /// Decodes the payload from raw bytes.
    #[must_use]
    pub fn from_bytes([lane, b0, b1, b2, b3]: [u8; 5]) -> Self {
        Self {
            lane,
            value: i32::from_le_bytes([b0, b1, b2, b3]),
        }
    }

    /// Encodes the payload into raw bytes.
    #[must_use]
    pub fn to_bytes(self) -> [u8; 5] {
        let [b0, b1, b2, b3] = self.value.to_le_bytes();
        [self.lane, b0, b1, b2, b3]
    }
}

/// One record on the chart timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventRecord {
    /// Kind of the record.
    pub kind: EventKind,
    /// Absolute time of the record.
    pub time: Time,
    /// Parameter payload.
    pub params: Params,
}

impl EventRecord {
    /// Creates a new record.
    #[must_use]
    pub const fn new(kind: EventKind, time: Time, lane: u8, value: i32) -> Self {
        Self {
            kind,
            time,
            params: Params { lane, value },
        }
    }
}
