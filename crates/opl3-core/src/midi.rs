//! MIDI channel-voice message decoding
//!
//! Only the subset the synth reacts to is decoded. Anything else, including
//! truncated messages and running status, decodes to `None` and is ignored.

/// Controller number for All Sound Off.
pub const CC_ALL_SOUND_OFF: u8 = 120;

/// Controller number for All Notes Off.
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// Centre value of a 14-bit pitch bend.
pub const PITCH_BEND_CENTER: u16 = 0x2000;

const DATA_MASK: u8 = 0x7F;

/// A decoded MIDI message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// 0x9n
    NoteOn {
        /// MIDI channel (0-15)
        channel: u8,
        /// Note number
        note: u8,
        /// Velocity; 0 means NoteOff
        velocity: u8,
    },
    /// 0x8n
    NoteOff {
        /// MIDI channel (0-15)
        channel: u8,
        /// Note number
        note: u8,
    },
    /// 0xBn
    ControlChange {
        /// MIDI channel (0-15)
        channel: u8,
        /// Controller number
        controller: u8,
        /// Controller value
        value: u8,
    },
    /// 0xEn
    PitchBend {
        /// MIDI channel (0-15)
        channel: u8,
        /// 14-bit bend amount, centre at [`PITCH_BEND_CENTER`]
        value: u16,
    },
}

impl MidiMessage {
    /// Decode a three-byte channel-voice message.
    ///
    /// Data bytes are masked to 7 bits.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let [status, data1, data2, ..] = *bytes else {
            return None;
        };
        let channel = status & 0x0F;
        let (data1, data2) = (data1 & DATA_MASK, data2 & DATA_MASK);

        match status & 0xF0 {
            0x80 => Some(MidiMessage::NoteOff {
                channel,
                note: data1,
            }),
            0x90 => Some(MidiMessage::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            }),
            0xB0 => Some(MidiMessage::ControlChange {
                channel,
                controller: data1,
                value: data2,
            }),
            0xE0 => Some(MidiMessage::PitchBend {
                channel,
                value: (data2 as u16) << 7 | data1 as u16,
            }),
            _ => None,
        }
    }

    /// MIDI channel the message was sent on.
    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::PitchBend { channel, .. } => channel,
        }
    }

    /// Whether this is a CC 120 or CC 123, which both release every voice.
    pub fn is_all_off(&self) -> bool {
        matches!(
            self,
            MidiMessage::ControlChange {
                controller: CC_ALL_SOUND_OFF | CC_ALL_NOTES_OFF,
                ..
            }
        )
    }
}
