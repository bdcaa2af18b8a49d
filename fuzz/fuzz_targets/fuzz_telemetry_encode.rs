//! Fuzz target: `FrameEncoder::frame`
//!
//! Arbitrary value, base, width and separator.  The encoder must never
//! panic, must reject bad bases and widths with an error, and every frame
//! it does produce must parse back to the value it encoded.
//!
//! cargo fuzz run fuzz_telemetry_encode

#![no_main]

use libfuzzer_sys::fuzz_target;
use plantwater::telemetry::{FRAME_CAPACITY, FRAME_DIGITS_MAX, FrameEncoder};

fuzz_target!(|data: &[u8]| {
    if data.len() < 7 {
        return;
    }
    let value = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let base = u32::from(data[4]);
    let width = usize::from(data[5]);
    let separator = data[6];

    let encoder = FrameEncoder::new(separator, base, width);
    let Ok(frame) = encoder.frame(value) else {
        assert!(!(2..=36).contains(&base) || width > FRAME_DIGITS_MAX);
        return;
    };

    assert!(frame.len() <= FRAME_CAPACITY);
    assert_eq!(frame[0], separator);
    let text = core::str::from_utf8(&frame[1..]).expect("frame digits are ASCII");
    assert!(text.len() >= width);
    assert_eq!(i64::from_str_radix(text, base).ok(), Some(i64::from(value)));
});
