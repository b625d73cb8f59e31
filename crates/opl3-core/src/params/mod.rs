//! Synthesis parameter identifiers and storage
//!
//! Parameters are normalized `f32` values in [0, 1]. Two address spaces are
//! exposed over the same underlying storage:
//!
//! - per-voice: every operator, channel and global field is addressable
//!   ([`ParamId`], 512 entries)
//! - monotimbral: one modulator/carrier/channel template broadcast to all
//!   voice slots plus tremolo/vibrato depth ([`MonoParamId`], 30 entries)

mod monotimbral;
mod names;
mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::{ChannelId, OperatorId};
use opl3_common::{CHANNEL_COUNT, OPERATOR_COUNT};

pub use monotimbral::MonotimbralParams;
pub use store::ParameterStore;

/// Per-operator parameter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorField {
    /// Amplitude modulation enable
    Am,
    /// Vibrato enable
    Vib,
    /// Envelope type (sustaining)
    Egt,
    /// Key scale rate
    Ksr,
    /// Frequency multiplier
    Mult,
    /// Key scale level
    Ksl,
    /// Total level (attenuation)
    Tl,
    /// Attack rate
    Ar,
    /// Decay rate
    Dr,
    /// Sustain level
    Sl,
    /// Release rate
    Rr,
    /// Waveform select
    Ws,
}

impl OperatorField {
    /// Number of fields per operator.
    pub const COUNT: usize = 12;

    /// Fields in parameter-index order.
    pub const ALL: [OperatorField; Self::COUNT] = [
        OperatorField::Am,
        OperatorField::Vib,
        OperatorField::Egt,
        OperatorField::Ksr,
        OperatorField::Mult,
        OperatorField::Ksl,
        OperatorField::Tl,
        OperatorField::Ar,
        OperatorField::Dr,
        OperatorField::Sl,
        OperatorField::Rr,
        OperatorField::Ws,
    ];

    /// Offset inside an operator's parameter block.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Field at `index`, or `None` past the end of the block.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Register bit width of the field.
    pub fn width(self) -> u32 {
        match self {
            OperatorField::Am | OperatorField::Vib | OperatorField::Egt | OperatorField::Ksr => 1,
            OperatorField::Ksl => 2,
            OperatorField::Ws => 3,
            OperatorField::Tl => 6,
            OperatorField::Mult
            | OperatorField::Ar
            | OperatorField::Dr
            | OperatorField::Sl
            | OperatorField::Rr => 4,
        }
    }

    /// Short register mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            OperatorField::Am => "AM",
            OperatorField::Vib => "VIB",
            OperatorField::Egt => "EGT",
            OperatorField::Ksr => "KSR",
            OperatorField::Mult => "MULT",
            OperatorField::Ksl => "KSL",
            OperatorField::Tl => "TL",
            OperatorField::Ar => "AR",
            OperatorField::Dr => "DR",
            OperatorField::Sl => "SL",
            OperatorField::Rr => "RR",
            OperatorField::Ws => "WS",
        }
    }
}

impl fmt::Display for OperatorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Per-channel parameter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelField {
    /// Modulator self-feedback (3 bits)
    Feedback,
    /// Connection type, FM below 0.5, additive above
    Connection,
    /// Left output enable
    LeftOut,
    /// Right output enable
    RightOut,
}

impl ChannelField {
    /// Number of fields per channel.
    pub const COUNT: usize = 4;

    /// Fields in parameter-index order.
    pub const ALL: [ChannelField; Self::COUNT] = [
        ChannelField::Feedback,
        ChannelField::Connection,
        ChannelField::LeftOut,
        ChannelField::RightOut,
    ];

    /// Offset inside a channel's parameter block.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Field at `index`, or `None` past the end of the block.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Chip-wide parameter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalField {
    /// Deep tremolo
    TremoloDepth,
    /// Deep vibrato
    VibratoDepth,
    /// Rhythm (percussion) mode
    RhythmMode,
    /// Hi-hat enable
    HiHat,
    /// Top cymbal enable
    TopCymbal,
    /// Tom-tom enable
    TomTom,
    /// Snare drum enable
    SnareDrum,
    /// Bass drum enable
    BassDrum,
}

impl GlobalField {
    /// Number of global fields.
    pub const COUNT: usize = 8;

    /// Fields in parameter-index order.
    pub const ALL: [GlobalField; Self::COUNT] = [
        GlobalField::TremoloDepth,
        GlobalField::VibratoDepth,
        GlobalField::RhythmMode,
        GlobalField::HiHat,
        GlobalField::TopCymbal,
        GlobalField::TomTom,
        GlobalField::SnareDrum,
        GlobalField::BassDrum,
    ];

    /// Offset inside the global block.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Field at `index`, or `None` past the end of the block.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// First index of the channel block in the per-voice address space.
pub const CHANNEL_PARAMS_START: usize = OPERATOR_COUNT * OperatorField::COUNT;
/// First index of the global block in the per-voice address space.
pub const GLOBAL_PARAMS_START: usize = CHANNEL_PARAMS_START + CHANNEL_COUNT * ChannelField::COUNT;
/// Size of the per-voice address space.
pub const PER_VOICE_PARAM_COUNT: usize = GLOBAL_PARAMS_START + GlobalField::COUNT;

/// Identifier in the per-voice address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// One field of one operator
    Operator(OperatorId, OperatorField),
    /// One field of one channel
    Channel(ChannelId, ChannelField),
    /// A chip-wide field
    Global(GlobalField),
}

impl ParamId {
    /// Flat index: operators first, then channels, then globals.
    pub fn index(self) -> usize {
        match self {
            ParamId::Operator(op, field) => op.index() * OperatorField::COUNT + field.index(),
            ParamId::Channel(ch, field) => {
                CHANNEL_PARAMS_START + ch.index() * ChannelField::COUNT + field.index()
            }
            ParamId::Global(field) => GLOBAL_PARAMS_START + field.index(),
        }
    }

    /// Inverse of [`ParamId::index`]; `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        if index < CHANNEL_PARAMS_START {
            let op = OperatorId::new(index / OperatorField::COUNT)?;
            let field = OperatorField::from_index(index % OperatorField::COUNT)?;
            Some(ParamId::Operator(op, field))
        } else if index < GLOBAL_PARAMS_START {
            let rel = index - CHANNEL_PARAMS_START;
            let ch = ChannelId::new(rel / ChannelField::COUNT)?;
            let field = ChannelField::from_index(rel % ChannelField::COUNT)?;
            Some(ParamId::Channel(ch, field))
        } else {
            GlobalField::from_index(index - GLOBAL_PARAMS_START).map(ParamId::Global)
        }
    }
}

/// Size of the monotimbral address space.
pub const MONO_PARAM_COUNT: usize = 2 * OperatorField::COUNT + ChannelField::COUNT + 2;

/// Identifier in the monotimbral address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonoParamId {
    /// Modulator template field (indices 0-11)
    Modulator(OperatorField),
    /// Carrier template field (indices 12-23)
    Carrier(OperatorField),
    /// Channel template field (indices 24-27)
    Channel(ChannelField),
    /// Deep tremolo (index 28)
    TremoloDepth,
    /// Deep vibrato (index 29)
    VibratoDepth,
}

impl MonoParamId {
    const CARRIER_START: usize = OperatorField::COUNT;
    const CHANNEL_START: usize = 2 * OperatorField::COUNT;
    const TREMOLO: usize = Self::CHANNEL_START + ChannelField::COUNT;
    const VIBRATO: usize = Self::TREMOLO + 1;

    /// Flat index in the monotimbral address space.
    pub fn index(self) -> usize {
        match self {
            MonoParamId::Modulator(field) => field.index(),
            MonoParamId::Carrier(field) => Self::CARRIER_START + field.index(),
            MonoParamId::Channel(field) => Self::CHANNEL_START + field.index(),
            MonoParamId::TremoloDepth => Self::TREMOLO,
            MonoParamId::VibratoDepth => Self::VIBRATO,
        }
    }

    /// Inverse of [`MonoParamId::index`]; `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            i if i < Self::CARRIER_START => OperatorField::from_index(i).map(MonoParamId::Modulator),
            i if i < Self::CHANNEL_START => {
                OperatorField::from_index(i - Self::CARRIER_START).map(MonoParamId::Carrier)
            }
            i if i < Self::TREMOLO => {
                ChannelField::from_index(i - Self::CHANNEL_START).map(MonoParamId::Channel)
            }
            Self::TREMOLO => Some(MonoParamId::TremoloDepth),
            Self::VIBRATO => Some(MonoParamId::VibratoDepth),
            _ => None,
        }
    }
}

/// Which parameter address space the synth exposes to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSurface {
    /// Every operator, channel and global field individually (512 parameters)
    #[default]
    PerVoice,
    /// One template broadcast to every voice slot (30 parameters)
    Monotimbral,
}

impl ParameterSurface {
    /// Number of addressable parameters.
    pub fn parameter_count(self) -> usize {
        match self {
            ParameterSurface::PerVoice => PER_VOICE_PARAM_COUNT,
            ParameterSurface::Monotimbral => MONO_PARAM_COUNT,
        }
    }
}

/// Clamp a host value into [0, 1]; NaN becomes 0.
#[inline]
pub(crate) fn normalize(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_space_sizes() {
        assert_eq!(CHANNEL_PARAMS_START, 432);
        assert_eq!(GLOBAL_PARAMS_START, 504);
        assert_eq!(PER_VOICE_PARAM_COUNT, 512);
        assert_eq!(MONO_PARAM_COUNT, 30);
    }

    #[test]
    fn test_param_id_index_is_bijective() {
        for index in 0..PER_VOICE_PARAM_COUNT {
            let id = ParamId::from_index(index).expect("index in range");
            assert_eq!(id.index(), index);
        }
        assert_eq!(ParamId::from_index(PER_VOICE_PARAM_COUNT), None);
    }

    #[test]
    fn test_param_id_layout() {
        let op = OperatorId::new(3).unwrap();
        assert_eq!(ParamId::Operator(op, OperatorField::Tl).index(), 3 * 12 + 6);

        let ch = ChannelId::new(17).unwrap();
        assert_eq!(ParamId::Channel(ch, ChannelField::RightOut).index(), 432 + 17 * 4 + 3);

        assert_eq!(ParamId::Global(GlobalField::BassDrum).index(), 511);
    }

    #[test]
    fn test_mono_param_id_index_is_bijective() {
        for index in 0..MONO_PARAM_COUNT {
            let id = MonoParamId::from_index(index).expect("index in range");
            assert_eq!(id.index(), index);
        }
        assert_eq!(MonoParamId::from_index(MONO_PARAM_COUNT), None);
        assert_eq!(MonoParamId::from_index(12), Some(MonoParamId::Carrier(OperatorField::Am)));
        assert_eq!(MonoParamId::from_index(28), Some(MonoParamId::TremoloDepth));
    }

    #[test]
    fn test_field_widths() {
        let total: u32 = OperatorField::ALL.iter().map(|f| f.width()).sum();
        // 0x20: 8 bits, 0x40: 8 bits, 0x60: 8 bits, 0x80: 8 bits, 0xE0: 3 bits
        assert_eq!(total, 35);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(-0.5), 0.0);
        assert_eq!(normalize(1.5), 1.0);
        assert_eq!(normalize(f32::NAN), 0.0);
        assert_eq!(normalize(0.25), 0.25);
    }
}
