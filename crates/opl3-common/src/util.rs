//! Shared helper utilities for OPL3 register math.
//!
//! These functions are used by the register core and the command-line tools
//! to derive channel addressing and sample values in a consistent way.

use crate::CHANNELS_PER_BANK;

const SAMPLE_SCALE: f32 = 1.0 / 32_768.0;

/// Convert a signed 16-bit chip sample to a float in [-1.0, 1.0).
#[inline]
pub fn sample_to_f32(sample: i16) -> f32 {
    sample as f32 * SAMPLE_SCALE
}

/// Register bank (0 or 1) holding a channel's registers.
#[inline]
pub fn bank_of_channel(channel: usize) -> u8 {
    if channel < CHANNELS_PER_BANK {
        0
    } else {
        1
    }
}

/// Per-bank slot of a channel's 0xA0/0xB0/0xC0 registers.
#[inline]
pub fn slot_of_channel(channel: usize) -> u8 {
    (channel % CHANNELS_PER_BANK) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_conversion_bounds() {
        assert_eq!(sample_to_f32(0), 0.0);
        assert_eq!(sample_to_f32(i16::MIN), -1.0);
        assert!(sample_to_f32(i16::MAX) < 1.0);
    }

    #[test]
    fn test_channel_addressing() {
        assert_eq!((bank_of_channel(0), slot_of_channel(0)), (0, 0));
        assert_eq!((bank_of_channel(8), slot_of_channel(8)), (0, 8));
        assert_eq!((bank_of_channel(9), slot_of_channel(9)), (1, 0));
        assert_eq!((bank_of_channel(17), slot_of_channel(17)), (1, 8));
    }
}
