use pretty_assertions::assert_eq;
use strict_num_extended::PositiveF64;

use imd_rs::imd::prelude::*;

fn at(kind: EventKind, ms: i64, lane: u8, value: i32) -> EventRecord {
    EventRecord::new(kind, Time::from_millis(ms), lane, value)
}

fn hold(start: i64, lane: u8, delays: &[i32]) -> Vec<EventRecord> {
    let mut records = Vec::new();
    let mut time = start;
    for (i, &delay) in delays.iter().enumerate() {
        let kind = if i == 0 {
            EventKind::HoldOpen
        } else {
            EventKind::HoldContinue
        };
        records.push(at(kind, time, lane, delay));
        time += i64::from(delay);
    }
    records.push(at(EventKind::HoldEnd, time, lane, 0));
    records
}

#[test]
fn short_delays_are_untouched() {
    let config = CorrectionConfig::new(5.0, 1.5).p(0.7);
    for bpm in [90.0, 128.0, 150.0, 181.5, 240.0] {
        let grid = GridParams::new(bpm, &config).unwrap();
        for dt in 0..grid.delta() {
            assert_eq!(grid.correct(dt), dt);
        }
    }
}

#[test]
fn soft_band_stays_in_its_cell() {
    let config = CorrectionConfig::new(5.0, 2.0).p(0.8);
    for bpm in [100.0, 150.0, 200.0] {
        let grid = GridParams::new(bpm, &config).unwrap();
        let delta = grid.delta();
        for dt in delta..delta * 8 {
            let cell_start = dt / delta * delta;
            let local = dt - cell_start;
            let corrected = grid.correct(dt);
            if (5..=grid.delta1()).contains(&local) {
                assert!(
                    (cell_start + 5..=cell_start + grid.delta1()).contains(&corrected),
                    "bpm {bpm}, dt {dt} corrected to {corrected}"
                );
                assert_ne!(corrected % delta, 0);
            }
        }
    }
}

#[test]
fn soft_band_is_monotonic() {
    let grid = GridParams::new(150.0, &CorrectionConfig::new(5.0, 1.5).p(0.7)).unwrap();
    let corrected: Vec<i64> = (305..=370).map(|dt| grid.correct(dt)).collect();
    assert!(corrected.is_sorted());
    assert_eq!(corrected.first(), Some(&305));
    assert_eq!(corrected.last(), Some(&370));
}

#[test]
fn scenario_at_150() {
    let grid = GridParams::new(150.0, &CorrectionConfig::new(5.0, 1.5).p(0.7)).unwrap();
    assert_eq!(grid.delta(), 100);
    assert_eq!(grid.delta1(), 70);
    assert_eq!(grid.correct(250), 259);
}

#[test]
fn waypoints_cascade() {
    let mut imd = Imd::new(
        Time::from_millis(60_000),
        vec![TempoSegment::new(150.0, Time::ZERO)],
        hold(1000, 2, &[250, 250]),
    );
    imd.split_traces();
    imd.correct(&CorrectionConfig::new(5.0, 1.5)).unwrap();
    assert_eq!(
        imd.traces()[0].records(),
        &[
            at(EventKind::HoldOpen, 1000, 2, 259),
            at(EventKind::HoldContinue, 1259, 2, 259),
            at(EventKind::HoldEnd, 1518, 2, 0),
        ]
    );
}

#[test]
fn slides_are_not_timed() {
    let slide = vec![
        at(EventKind::ShiftOpen, 1000, 2, 1),
        at(EventKind::ShiftContinue, 1250, 3, 1),
        at(EventKind::ShiftEnd, 1500, 4, 0),
    ];
    let mut imd = Imd::new(
        Time::from_millis(60_000),
        vec![TempoSegment::new(150.0, Time::ZERO)],
        slide.clone(),
    );
    imd.split_traces();
    imd.correct(&CorrectionConfig::default()).unwrap();
    assert_eq!(imd.traces()[0].records(), slide.as_slice());
}

#[test]
fn grid_follows_tempo_table() {
    let mut events = hold(2000, 0, &[260]);
    events.extend(hold(12_000, 1, &[260]));
    let mut imd = Imd::new(
        Time::from_millis(60_000),
        vec![
            TempoSegment::new(150.0, Time::ZERO),
            TempoSegment::new(150.0, Time::from_millis(400)),
            TempoSegment::new(120.0, Time::from_millis(10_000)),
            TempoSegment::new(120.0, Time::from_millis(10_500)),
        ],
        events,
    );
    imd.split_traces();
    imd.correct(&CorrectionConfig::new(5.0, 1.5).p(0.7)).unwrap();

    // At 150 bpm: 70 - 10^1.5 / 65^0.5 = 66.08...
    assert_eq!(imd.traces()[0].records()[0].params.value, 266);
    // At 120 bpm: delta 125, delta1 88, 88 - 78^1.5 / 83^0.5 = 12.38...
    assert_eq!(imd.traces()[1].records()[0].params.value, 262);
    assert_eq!(imd.traces()[1].records()[1].time, Time::from_millis(12_262));
}

#[test]
fn empty_tempo_table_uses_config_bpm() {
    let mut imd = Imd::new(Time::from_millis(60_000), vec![], hold(0, 0, &[250]));
    imd.split_traces();
    imd.correct(&CorrectionConfig::new(5.0, 1.5).p(0.7).bpm(150.0))
        .unwrap();
    assert_eq!(imd.traces()[0].records()[0].params.value, 259);
}

#[test]
fn degenerate_tempo_is_reported() {
    let mut imd = Imd::new(
        Time::from_millis(60_000),
        vec![
            TempoSegment::new(150.0, Time::ZERO),
            TempoSegment::new(1000.0, Time::from_millis(5000)),
        ],
        hold(6000, 0, &[250]),
    );
    imd.split_traces();
    // At 1000 bpm, delta1 = round(10.5) = 10, which is not above max_ms.
    assert_eq!(
        imd.correct(&CorrectionConfig::new(10.0, 1.5).p(0.7)),
        Err(CorrectionError::DegenerateSoftBand {
            bpm: 1000.0,
            max_ms: 10.0,
            delta1: 10
        })
    );
}

#[test]
fn tempo_without_traces_is_not_checked() {
    let mut imd = Imd::new(
        Time::from_millis(60_000),
        vec![
            TempoSegment::new(150.0, Time::ZERO),
            TempoSegment::new(1000.0, Time::from_millis(5000)),
            TempoSegment::new(150.0, Time::from_millis(6000)),
        ],
        hold(7000, 0, &[250]),
    );
    imd.split_traces();
    assert_eq!(imd.correct(&CorrectionConfig::new(10.0, 1.5).p(0.7)), Ok(()));
    // 70 - 20^1.5 / 60^0.5 = 58.45...
    assert_eq!(imd.traces()[0].records()[0].params.value, 258);
}

#[test]
fn chart_without_traces_is_untouched() {
    let taps = vec![at(EventKind::Tap, 100, 0, 0), at(EventKind::Flick, 200, 1, 1)];
    let mut imd = Imd::new(
        Time::from_millis(1000),
        vec![TempoSegment::new(0.0, Time::ZERO)],
        taps.clone(),
    );
    imd.split_traces();
    assert_eq!(imd.correct(&CorrectionConfig::default()), Ok(()));
    assert_eq!(imd.events(), taps.as_slice());
}

#[test]
fn trace_on_a_tempo_change_gridline() {
    let bpm = |value: f64| PositiveF64::try_from(value).unwrap();
    let mut events = hold(89_999, 0, &[250]);
    events.extend(hold(90_000, 1, &[250]));
    events.extend(hold(90_399, 2, &[250]));
    events.extend(hold(90_400, 3, &[250]));
    let mut imd = Imd::new(Time::from_millis(120_000), vec![], events);
    imd.retarget_tempo(&[
        TempoChange::new(bpm(128.0), Time::ZERO),
        TempoChange::new(bpm(150.0), Time::from_millis(90_000)),
    ])
    .unwrap();
    imd.split_traces();
    imd.correct(&CorrectionConfig::new(5.0, 1.5).p(0.7)).unwrap();

    // The gridline at 90000 still carries 128 bpm, and 150 bpm starts from 90400.
    let values: Vec<i32> = imd
        .traces()
        .iter()
        .map(|trace| trace.records()[0].params.value)
        .collect();
    assert_eq!(values, vec![255, 255, 255, 259]);
}
