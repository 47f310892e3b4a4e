#![cfg(feature = "serde")]

use pretty_assertions::assert_eq;

use imd_rs::{imd::prelude::*, test_helpers::raw_chart};

#[test]
fn process_config_from_json() {
    let json = r#"{
        "decode": { "separator": "Lenient" },
        "tempo_changes": null,
        "correction": { "max_ms": 5.0, "n": 1.5, "p": 0.7, "bpm": 150.0 }
    }"#;
    let config: ProcessConfig = serde_json::from_str(json).unwrap();
    assert_eq!(
        config,
        ProcessConfig::default()
            .decode(DecodeConfig::lenient())
            .correction(CorrectionConfig::default())
    );
}

#[test]
fn decoded_chart_round_trips_through_json() {
    let source = raw_chart(
        5000,
        &[(0, 120.0), (500, 120.0)],
        &[([0x62, 0x00], 100, 1, 250), ([0xA2, 0x00], 350, 1, 0)],
    );
    let ImdOutput { mut imd, .. } = parse_imd(&source, &DecodeConfig::default()).unwrap();
    imd.split_traces();

    let json = serde_json::to_string(&imd).unwrap();
    let restored: Imd = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, imd);
    assert_eq!(restored.traces().len(), 1);
}
