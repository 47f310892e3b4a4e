//! The codec and editing tools of IMD (.imd) chart files.
//!
//! An IMD file has a dense tempo table and a flat, time-ordered table of event records. This module consists of some phases:
//!
//! - `codec` translates between the binary container and [`model::Imd`].
//! - `trace` regroups the records of holds and slides into [`trace::Trace`]s and merges them back.
//! - `correction` quantizes the delays inside traces onto a grid derived from the tempo.
//! - `pipeline` runs them in order over a whole file.
//!
//! Operations on the same chart must be sequenced: traces are split before correction, and merged before encoding. [`Imd::to_bytes`] merges them on its own.

pub mod codec;
pub mod correction;
pub mod event;
pub mod model;
pub mod pipeline;
pub mod prelude;
pub mod tempo;
pub mod trace;

use std::path::Path;

use thiserror::Error;

use self::{correction::CorrectionError, model::Imd, tempo::TempoError, trace::SplitWarning};
use crate::time::Time;

/// An error occurred when reading, editing or writing an IMD chart. Decoding is aborted on these.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ImdError {
    /// The input ended in the middle of a field.
    #[error("input truncated at {field} (offset {offset}): {needed} bytes needed, {available} available")]
    TruncatedInput {
        /// Name of the field.
        field: &'static str,
        /// Byte offset of the field.
        offset: usize,
        /// Width of the field.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },
    /// The declared tempo count does not fit in the remaining input.
    #[error("tempo table declares {declared} entries but only {available} bytes remain")]
    MalformedTempoTable {
        /// Declared count of tempo entries.
        declared: usize,
        /// Bytes left in the input.
        available: usize,
    },
    /// The declared event count does not fit in the remaining input.
    #[error("event table declares {declared} entries but only {available} bytes remain")]
    MalformedEventTable {
        /// Declared count of event records.
        declared: usize,
        /// Bytes left in the input.
        available: usize,
    },
    /// The separator between the tables is not `03 03`.
    #[error("separator must be [03, 03], found {found:02X?}")]
    InvalidSeparator {
        /// The bytes found.
        found: [u8; 2],
    },
    /// A table is too long to write its count.
    #[error("{field} {len} does not fit in 32 bits")]
    CountOverflow {
        /// Name of the field.
        field: &'static str,
        /// Length of the table.
        len: usize,
    },
    /// A time cannot be written as an unsigned 32-bit millisecond count.
    #[error("{field} {time} is out of the writable range")]
    TimeOutOfRange {
        /// Name of the field.
        field: &'static str,
        /// The time.
        time: Time,
    },
    /// Regenerating the tempo table failed.
    #[error("tempo: {0}")]
    Tempo(#[from] TempoError),
    /// Correcting the traces failed.
    #[error("correction: {0}")]
    Correction(#[from] CorrectionError),
    /// Reading or writing the file failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias of `core::result::Result<T, ImdError>`
pub type Result<T> = std::result::Result<T, ImdError>;

/// A non-fatal finding on an IMD chart.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImdWarning {
    /// The separator is not `03 03`, accepted by [`SeparatorCheck::Lenient`].
    #[error("Warn: codec: separator {found:02X?} is not [03, 03]")]
    UnexpectedSeparator {
        /// The bytes found.
        found: [u8; 2],
    },
    /// A record has a type code out of the known table. It is kept as is.
    #[error("Warn: codec: unknown type code {code:02X?} at record {index}")]
    UnknownTypeCode {
        /// Index of the record in the event table.
        index: usize,
        /// The raw code.
        code: [u8; 2],
    },
    /// Bytes left after the event table.
    #[error("Warn: codec: {count} trailing bytes after the event table")]
    TrailingBytes {
        /// Number of the bytes.
        count: usize,
    },
    /// A finding while splitting traces.
    #[error("Warn: trace: {0}")]
    Split(#[from] SplitWarning),
}

/// How to treat the separator between the tempo table and the event table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeparatorCheck {
    /// A mismatch is an [`ImdError::InvalidSeparator`].
    #[default]
    Strict,
    /// A mismatch is an [`ImdWarning::UnexpectedSeparator`].
    Lenient,
}

/// Configuration of decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodeConfig {
    /// Treatment of the separator.
    pub separator: SeparatorCheck,
}

impl DecodeConfig {
    /// Config which accepts any separator with a warning.
    #[must_use]
    pub fn lenient() -> Self {
        Self::default().separator(SeparatorCheck::Lenient)
    }

    /// Sets the treatment of the separator.
    #[must_use]
    pub const fn separator(mut self, separator: SeparatorCheck) -> Self {
        self.separator = separator;
        self
    }
}

/// Output of decoding an IMD chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct ImdOutput {
    /// The decoded chart.
    pub imd: Imd,
    /// Warnings that occurred during decoding.
    pub warnings: Vec<ImdWarning>,
}

/// Decode an IMD chart from bytes.
///
/// # Errors
///
/// Returns [`ImdError`] if the input is truncated, if a table count does not fit, or if the separator is invalid under [`SeparatorCheck::Strict`].
pub fn parse_imd(source: &[u8], config: &DecodeConfig) -> Result<ImdOutput> {
    let mut warnings = Vec::new();
    let imd = codec::decode(source, config, &mut warnings)?;
    Ok(ImdOutput { imd, warnings })
}

impl Imd {
    /// Decodes a chart from bytes. Same as [`parse_imd`].
    ///
    /// # Errors
    ///
    /// See [`parse_imd`].
    pub fn from_bytes(source: &[u8], config: &DecodeConfig) -> Result<ImdOutput> {
        parse_imd(source, config)
    }

    /// Merges the traces back, then encodes the chart into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ImdError::CountOverflow`] or [`ImdError::TimeOutOfRange`] if a value cannot be written in its field.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.merge_traces();
        codec::encode(self)
    }

    /// Reads and decodes a chart file.
    ///
    /// # Errors
    ///
    /// Returns [`ImdError::Io`] if reading fails, otherwise see [`parse_imd`].
    pub fn open(path: impl AsRef<Path>, config: &DecodeConfig) -> Result<ImdOutput> {
        let source = std::fs::read(path)?;
        parse_imd(&source, config)
    }

    /// Merges the traces back, then encodes and writes the chart into a file.
    ///
    /// # Errors
    ///
    /// Returns [`ImdError::Io`] if writing fails, otherwise see [`Imd::to_bytes`].
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
