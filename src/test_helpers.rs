//! Test helpers for building raw chart files in integration tests and benches.
//!
//! These functions write the container by hand, independent of the encoder, so that tests can check the codec against them.

/// Writes a chart file from plain tables.
///
/// `tempo` is a list of `(start ms, bpm)`, and `events` is a list of `(type code, time ms, lane, value)`.
#[must_use]
pub fn raw_chart(total_ms: u32, tempo: &[(u32, f64)], events: &[([u8; 2], u32, u8, i32)]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(14 + 12 * tempo.len() + 11 * events.len());
    bytes.extend(total_ms.to_le_bytes());
    bytes.extend((tempo.len() as u32).to_le_bytes());
    for &(start, bpm) in tempo {
        bytes.extend(start.to_le_bytes());
        bytes.extend(bpm.to_le_bytes());
    }
    bytes.extend([0x03, 0x03]);
    bytes.extend((events.len() as u32).to_le_bytes());
    for &(code, time, lane, value) in events {
        bytes.extend(code);
        bytes.extend(time.to_le_bytes());
        bytes.push(lane);
        bytes.extend(value.to_le_bytes());
    }
    bytes
}

/// Writes a chart of `holds` evenly spaced holds, each with `waypoints` timed waypoints whose delays slightly miss the sixteenth grid of `bpm`, plus a tap between each hold.
#[must_use]
pub fn hold_chart(bpm: f64, holds: u32, waypoints: u32) -> Vec<u8> {
    let unit = (15_000.0 / bpm) as u32;
    let step = unit * 2 + 7;
    let span = step * (waypoints + 1) + unit * 4;
    let mut events = Vec::new();
    for hold in 0..holds {
        let start = hold * span;
        let lane = (hold % 4) as u8;
        events.push(([0x00, 0x00], start, (lane + 1) % 4, 0));
        events.push(([0x62, 0x00], start, lane, step as i32));
        for waypoint in 1..=waypoints {
            events.push(([0x22, 0x00], start + waypoint * step, lane, step as i32));
        }
        events.push(([0xA2, 0x00], start + (waypoints + 1) * step, lane, 0));
    }
    raw_chart(holds * span, &[(0, bpm)], &events)
}
