//! One-call processing of a chart: decode, retarget the tempo, correct the traces, and encode.

use std::path::Path;

use super::{
    DecodeConfig, ImdOutput, ImdWarning, Result, correction::CorrectionConfig, model::Imd,
    tempo::TempoChange, trace::SplitOutput,
};

/// Configuration of [`process`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessConfig {
    /// Configuration of decoding.
    pub decode: DecodeConfig,
    /// Sparse tempo changes to regenerate the tempo table from. The table in the file is kept if `None`.
    pub tempo_changes: Option<Vec<TempoChange>>,
    /// Parameters of the timing correction. Traces are left untouched if `None`.
    pub correction: Option<CorrectionConfig>,
}

impl ProcessConfig {
    /// Sets the configuration of decoding.
    #[must_use]
    pub const fn decode(mut self, decode: DecodeConfig) -> Self {
        self.decode = decode;
        self
    }

    /// Sets the tempo changes to regenerate the tempo table from.
    #[must_use]
    pub fn tempo_changes(mut self, changes: Vec<TempoChange>) -> Self {
        self.tempo_changes = Some(changes);
        self
    }

    /// Sets the parameters of the timing correction.
    #[must_use]
    pub const fn correction(mut self, correction: CorrectionConfig) -> Self {
        self.correction = Some(correction);
        self
    }
}

/// Output of [`process`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub struct ProcessOutput {
    /// The encoded chart.
    pub bytes: Vec<u8>,
    /// Warnings that occurred during processing.
    pub warnings: Vec<ImdWarning>,
}

/// Processes an encoded chart.
///
/// The steps run in this order: decode, regenerate the tempo table, split traces, correct them with the new tempo table, merge them back, and encode.
///
/// # Errors
///
/// Returns [`super::ImdError`] from the first failing step.
pub fn process(source: &[u8], config: &ProcessConfig) -> Result<ProcessOutput> {
    let ImdOutput { mut imd, mut warnings } = Imd::from_bytes(source, &config.decode)?;
    if let Some(changes) = &config.tempo_changes {
        imd.retarget_tempo(changes)?;
    }
    if let Some(correction) = &config.correction {
        let SplitOutput {
            warnings: split_warnings,
        } = imd.split_traces();
        warnings.extend(split_warnings.into_iter().map(ImdWarning::Split));
        imd.correct(correction)?;
    }
    let bytes = imd.to_bytes()?;
    Ok(ProcessOutput { bytes, warnings })
}

/// Processes the chart file at `source` and writes the result to `destination`.
///
/// # Errors
///
/// Returns [`super::ImdError::Io`] if reading or writing fails, otherwise see [`process`].
pub fn process_file(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    config: &ProcessConfig,
) -> Result<Vec<ImdWarning>> {
    let bytes = std::fs::read(source)?;
    let ProcessOutput { bytes, warnings } = process(&bytes, config)?;
    std::fs::write(destination, bytes)?;
    Ok(warnings)
}
