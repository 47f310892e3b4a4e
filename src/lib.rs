//! The IMD chart format codec and editing tools.
//!
//! IMD is a binary chart format of a rhythm game: a dense tempo table followed by a flat table of timed event records. Holds and slides are stored as separate waypoint records which must be regrouped to be edited as a whole.
//!
//! This crate provides:
//!
//! - a bit-exact decoder and encoder of the container,
//! - reconstruction of holds and slides into traces, and merging them back,
//! - quantization of the delays inside traces onto a tempo-derived grid with a smooth snapping curve,
//! - regeneration of the tempo table from sparse tempo changes.
//!
//! # Example
//!
//! ```
//! use imd_rs::imd::prelude::*;
//!
//! let mut imd = Imd::new(
//!     Time::from_millis(60_000),
//!     vec![TempoSegment::new(150.0, Time::ZERO)],
//!     vec![
//!         EventRecord::new(EventKind::HoldOpen, Time::from_millis(1000), 2, 250),
//!         EventRecord::new(EventKind::HoldEnd, Time::from_millis(1250), 2, 0),
//!     ],
//! );
//! imd.split_traces();
//! imd.correct(&CorrectionConfig::new(5.0, 1.5)).unwrap();
//! let bytes = imd.to_bytes().unwrap();
//!
//! let ImdOutput { imd, warnings } = parse_imd(&bytes, &DecodeConfig::default()).unwrap();
//! assert!(warnings.is_empty());
//! assert_eq!(imd.events()[1].time, Time::from_millis(1259));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod imd;
pub mod time;
pub mod test_helpers;
