use pretty_assertions::assert_eq;
use strict_num_extended::PositiveF64;

use imd_rs::{
    imd::prelude::*,
    test_helpers::{hold_chart, raw_chart},
};

fn change(bpm: f64, start: i64) -> TempoChange {
    TempoChange::new(
        PositiveF64::try_from(bpm).unwrap(),
        Time::from_millis(start),
    )
}

fn two_holds() -> Vec<u8> {
    raw_chart(
        120_000,
        &[(0, 100.0)],
        &[
            ([0x62, 0x00], 1000, 0, 250),
            ([0xA2, 0x00], 1250, 0, 0),
            ([0x00, 0x00], 50_000, 2, 0),
            ([0x62, 0x00], 95_000, 1, 250),
            ([0xA2, 0x00], 95_250, 1, 0),
        ],
    )
}

#[test]
fn retarget_then_correct() {
    let config = ProcessConfig::default()
        .tempo_changes(vec![change(128.0, 0), change(150.0, 90_000)])
        .correction(CorrectionConfig::new(5.0, 1.5).p(0.7));
    let ProcessOutput { bytes, warnings } = process(&two_holds(), &config).unwrap();
    assert_eq!(warnings, vec![]);

    let ImdOutput { imd, .. } = parse_imd(&bytes, &DecodeConfig::default()).unwrap();
    assert_eq!(imd.tempo().len(), 268);
    assert_eq!(imd.tempo()[193], TempoSegment::new(150.0, Time::from_millis(90_400)));
    assert_eq!(
        imd.events(),
        &[
            EventRecord::new(EventKind::HoldOpen, Time::from_millis(1000), 0, 255),
            EventRecord::new(EventKind::HoldEnd, Time::from_millis(1255), 0, 0),
            EventRecord::new(EventKind::Tap, Time::from_millis(50_000), 2, 0),
            EventRecord::new(EventKind::HoldOpen, Time::from_millis(95_000), 1, 259),
            EventRecord::new(EventKind::HoldEnd, Time::from_millis(95_259), 1, 0),
        ]
    );
}

#[test]
fn empty_config_only_reencodes() {
    let source = hold_chart(150.0, 8, 2);
    let ProcessOutput { bytes, warnings } = process(&source, &ProcessConfig::default()).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(bytes, source);
}

#[test]
fn split_warnings_are_forwarded() {
    let source = raw_chart(
        5000,
        &[(0, 150.0)],
        &[([0x62, 0x00], 1000, 3, 250), ([0x00, 0x00], 1200, 3, 0)],
    );
    let config = ProcessConfig::default().correction(CorrectionConfig::default());
    let ProcessOutput { bytes, warnings } = process(&source, &config).unwrap();
    assert_eq!(
        warnings,
        vec![ImdWarning::Split(SplitWarning::UnterminatedTrace {
            start: Time::from_millis(1000),
            lane: 3
        })]
    );
    let ImdOutput { imd, .. } = parse_imd(&bytes, &DecodeConfig::default()).unwrap();
    assert_eq!(imd.events()[0].params.value, 259);
}

#[test]
fn errors_stop_the_pipeline() {
    assert!(matches!(
        process(
            &two_holds(),
            &ProcessConfig::default().tempo_changes(vec![])
        ),
        Err(ImdError::Tempo(TempoError::NoTempoChanges))
    ));
    assert!(matches!(
        process(
            &two_holds(),
            &ProcessConfig::default().correction(CorrectionConfig::new(110.0, 1.5))
        ),
        Err(ImdError::Correction(CorrectionError::DegenerateSoftBand { .. }))
    ));
}

#[test]
fn process_between_files() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.imd");
    let destination = dir.path().join("out.imd");
    std::fs::write(&source, hold_chart(128.0, 4, 1)).unwrap();

    let config = ProcessConfig::default()
        .decode(DecodeConfig::lenient())
        .correction(CorrectionConfig::default());
    let warnings = process_file(&source, &destination, &config).unwrap();
    assert!(warnings.is_empty());

    let ImdOutput { mut imd, .. } = Imd::open(&destination, &DecodeConfig::default()).unwrap();
    imd.split_traces();
    assert_eq!(imd.traces().len(), 4);
    // 15000 / 128 = 117.18..., so each delay of 241 ms sits 7 ms into its cell.
    assert!(
        imd.traces()
            .iter()
            .all(|trace| trace.records()[0].params.value != 241)
    );
}
