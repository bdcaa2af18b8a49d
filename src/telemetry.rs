//! Moisture telemetry encoding.
//!
//! Readings leave the device as ASCII over the UART, one frame per control
//! iteration:
//!
//! ```text
//!   ';' digit+ ';' digit+ ';' digit+ ...
//! ```
//!
//! Each frame is the separator byte followed by the value's digits, most
//! significant first.  There is no terminator; the next separator ends the
//! previous field.  Signed values carry a leading `-` ahead of any padding.

use heapless::Vec;

use crate::config::SystemConfig;
use crate::error::EncodeError;

/// Widest digit field: `i32::MIN` in base 2 is 32 digits plus the sign.
pub const FRAME_DIGITS_MAX: usize = 33;
/// Separator plus the widest digit field.
pub const FRAME_CAPACITY: usize = FRAME_DIGITS_MAX + 1;

pub type Digits = Vec<u8, FRAME_DIGITS_MAX>;
pub type Frame = Vec<u8, FRAME_CAPACITY>;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Encode `value` in `base` with the minimum number of digits.
pub fn encode(value: i32, base: u32) -> Result<Digits, EncodeError> {
    encode_padded(value, base, 0)
}

/// Encode `value` in `base`, zero-padded to at least `width` characters
/// (the sign counts towards the width).
pub fn encode_padded(value: i32, base: u32, width: usize) -> Result<Digits, EncodeError> {
    if !(2..=36).contains(&base) {
        return Err(EncodeError::InvalidBase(base));
    }
    if width > FRAME_DIGITS_MAX {
        return Err(EncodeError::WidthTooLarge(width));
    }

    // Least-significant digit first, reversed on the way out.
    let mut scratch = [0u8; 32];
    let mut len = 0;
    let mut magnitude = value.unsigned_abs();
    loop {
        scratch[len] = ALPHABET[(magnitude % base) as usize];
        len += 1;
        magnitude /= base;
        if magnitude == 0 {
            break;
        }
    }

    let sign = usize::from(value < 0);
    let pad = width.saturating_sub(len + sign);

    let mut out = Digits::new();
    let overflow = |_| EncodeError::WidthTooLarge(width);
    if value < 0 {
        out.push(b'-').map_err(overflow)?;
    }
    for _ in 0..pad {
        out.push(b'0').map_err(overflow)?;
    }
    for &d in scratch[..len].iter().rev() {
        out.push(d).map_err(overflow)?;
    }
    Ok(out)
}

/// Builds separator-prefixed telemetry frames with a fixed policy.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    separator: u8,
    base: u32,
    width: usize,
}

impl FrameEncoder {
    pub fn new(separator: u8, base: u32, width: usize) -> Self {
        Self {
            separator,
            base,
            width,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(
            config.telemetry_separator,
            config.telemetry_base,
            usize::from(config.telemetry_digits),
        )
    }

    /// One frame: separator, then the encoded value.
    pub fn frame(&self, value: i32) -> Result<Frame, EncodeError> {
        let digits = encode_padded(value, self.base, self.width)?;
        let mut frame = Frame::new();
        frame
            .push(self.separator)
            .map_err(|_| EncodeError::WidthTooLarge(self.width))?;
        frame
            .extend_from_slice(&digits)
            .map_err(|()| EncodeError::WidthTooLarge(self.width))?;
        Ok(frame)
    }
}
