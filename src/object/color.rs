//! Color object: CMYK tuple, channels in `[0, 255]`. Grounded in the
//! teacher's `color::Cmyk` (`c, m, y, k: f32`), narrowed to the integer
//! 0..=255 channel domain the language spec actually uses and converted to
//! the teacher's `0.0..=1.0` float channels only at the PDF-writer seam.

use crate::error::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Cmyk {
    pub c: u8,
    pub m: u8,
    pub y: u8,
    pub k: u8,
}

impl Cmyk {
    pub fn new(c: u8, m: u8, y: u8, k: u8) -> Self {
        Cmyk { c, m, y, k }
    }

    pub fn from_hex_channels(channels: [u8; 4]) -> Self {
        Cmyk { c: channels[0], m: channels[1], y: channels[2], k: channels[3] }
    }

    pub fn from_gray(percent: u8) -> Self {
        Cmyk { c: 0, m: 0, y: 0, k: percent }
    }

    /// Converts to the `0.0..=1.0` float channels the PDF content-stream
    /// colour operators expect.
    pub fn to_unit_floats(self) -> [f32; 4] {
        [
            self.c as f32 / 255.0,
            self.m as f32 / 255.0,
            self.y as f32 / 255.0,
            self.k as f32 / 255.0,
        ]
    }
}

/// Validates four stack-popped integers as CMYK channels. Channel values
/// arrive as plain integers (0..=255), not fixed-point.
pub fn validate_channel(n: i32) -> Result<u8, Error> {
    u8::try_from(n).map_err(|_| Error::domain(format!("color channel {} out of range [0, 255]", n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_range() {
        assert!(validate_channel(0).is_ok());
        assert!(validate_channel(255).is_ok());
        assert!(validate_channel(256).is_err());
        assert!(validate_channel(-1).is_err());
    }
}
