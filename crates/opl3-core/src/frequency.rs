//! MIDI note to OPL3 frequency registers
//!
//! Equal temperament with A4 (note 69) at 440 Hz. The octave ("block") is taken
//! directly from the note number and the 10-bit F-number is derived from the
//! output sample rate:
//!
//! ```text
//! block    = clamp(note / 12 - 1, 0, 7)
//! f_number = floor(freq * 2^(20 - block) / sample_rate) & 0x3FF
//! ```

use crate::layout::KEY_ON;

/// Reference pitch of A4.
pub const A4_FREQUENCY: f32 = 440.0;

/// MIDI note number of A4.
pub const A4_NOTE: u8 = 69;

const F_NUMBER_MASK: u32 = 0x3FF;
const MAX_BLOCK: i32 = 7;

/// Equal-tempered frequency of a MIDI note in Hz.
#[inline]
pub fn note_frequency(note: u8) -> f32 {
    A4_FREQUENCY * 2f32.powf((note as f32 - A4_NOTE as f32) / 12.0)
}

/// Octave selector for a MIDI note (0-7).
#[inline]
pub fn note_block(note: u8) -> u8 {
    (note as i32 / 12 - 1).clamp(0, MAX_BLOCK) as u8
}

/// Frequency register contents for one note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRegisters {
    /// Note frequency in Hz
    pub frequency: f32,
    /// Octave selector (0-7)
    pub block: u8,
    /// 10-bit F-number
    pub f_number: u16,
    /// Value of the 0xA0 register
    pub low: u8,
    /// Value of the 0xB0 register with the key-on bit set
    pub high: u8,
}

impl FrequencyRegisters {
    /// Compute the registers for `note` at `sample_rate`.
    ///
    /// Out-of-range F-numbers wrap to 10 bits like the hardware field does.
    pub fn for_note(note: u8, sample_rate: f32) -> Self {
        let frequency = note_frequency(note);
        let block = note_block(note);

        // f32 throughout; f64 rounds differently near integer boundaries
        let scaled = frequency * (1u32 << (20 - block as u32)) as f32 / sample_rate;
        let f_number = (scaled as u32 & F_NUMBER_MASK) as u16;

        FrequencyRegisters {
            frequency,
            block,
            f_number,
            low: (f_number & 0xFF) as u8,
            high: ((f_number >> 8) as u8 & 0x03) | (block << 2) | KEY_ON,
        }
    }

    /// High byte with the key-on bit cleared, block and F-number kept.
    #[inline]
    pub fn key_off_high(&self) -> u8 {
        self.high & !KEY_ON
    }
}
