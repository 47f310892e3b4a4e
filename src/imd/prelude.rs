//! Prelude module for the IMD module.
//!
//! You can use `use imd_rs::imd::prelude::*;` to import all IMD types at once.

pub use super::{
    DecodeConfig, ImdError, ImdOutput, ImdWarning, SeparatorCheck,
    codec::SEPARATOR,
    correction::{CorrectionConfig, CorrectionError, GridParams},
    event::{EventKind, EventRecord, Params},
    model::{Imd, ImdInfo},
    parse_imd,
    pipeline::{ProcessConfig, ProcessOutput, process, process_file},
    tempo::{TempoChange, TempoError, TempoSegment, regenerate_grid},
    trace::{SplitOutput, SplitWarning, Trace},
};
pub use crate::time::{MinSecMs, Time};
