//! Parameter to register encoding
//!
//! Stateless transform from a [`ParameterStore`] to `(address, byte)` writes.
//! A full encode emits the 0xBD global register, then the five registers of each
//! of the 36 operators, then the 0xC0 register of each of the 18 channels.
//! Encoding the same store twice yields the same sequence.

use crate::layout::{
    ChannelFlags, ChannelId, OperatorFlags, OperatorId, OperatorRegister, RegisterAddress,
    RhythmFlags, FEEDBACK_CONNECTION_BASE, RHYTHM_REGISTER,
};
use crate::params::{ChannelField, GlobalField, OperatorField, ParameterStore};
use opl3_common::{Opl3Backend, CHANNEL_COUNT, OPERATOR_COUNT};

/// Number of writes produced by [`encode_all`].
pub const FULL_ENCODE_LEN: usize = 1 + OPERATOR_COUNT * OperatorRegister::ALL.len() + CHANNEL_COUNT;

/// One register write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterWrite {
    /// Composite register address
    pub addr: RegisterAddress,
    /// Byte written
    pub value: u8,
}

impl RegisterWrite {
    /// Build a write.
    #[inline]
    pub const fn new(addr: RegisterAddress, value: u8) -> Self {
        RegisterWrite { addr, value }
    }

    /// Dispatch this write to a chip.
    #[inline]
    pub fn apply<B: Opl3Backend + ?Sized>(self, chip: &mut B) {
        chip.write_register(self.addr.raw(), self.value);
    }
}

/// Multiplier just below `2^width`, so that 1.0 never reaches the next integer.
///
/// Defined for the chip's field widths, 1 to 6 bits. Literal constants:
/// `2^n as f32 - 0.001` can land one ulp away from them.
#[inline]
fn field_scale(width: u32) -> Option<f32> {
    match width {
        1 => Some(1.999),
        2 => Some(3.999),
        3 => Some(7.999),
        4 => Some(15.999),
        5 => Some(31.999),
        6 => Some(63.999),
        _ => None,
    }
}

/// Scale a normalized value into an unsigned `width`-bit field.
///
/// Computes `floor(value * (2^width - 0.001))` clamped to `[0, 2^width - 1]`.
/// `width` must be 1 to 6; any other width encodes as 0.
#[inline]
pub fn scale_field(value: f32, width: u32) -> u8 {
    let Some(scale) = field_scale(width) else {
        return 0;
    };
    let max = (1i32 << width) - 1;
    // `as` saturates and maps NaN to 0
    ((value * scale) as i32).clamp(0, max) as u8
}

/// 1-bit switch: on strictly above one half.
#[inline]
pub fn flag(value: f32) -> bool {
    value > 0.5
}

/// Encode the five registers of one operator.
pub fn encode_operator(store: &ParameterStore, op: OperatorId) -> [RegisterWrite; 5] {
    let get = |field: OperatorField| store.operator(op, field);
    let scaled = |field: OperatorField| scale_field(get(field), field.width());

    let mut flags = OperatorFlags::empty();
    flags.set(OperatorFlags::AM, flag(get(OperatorField::Am)));
    flags.set(OperatorFlags::VIB, flag(get(OperatorField::Vib)));
    flags.set(OperatorFlags::EGT, flag(get(OperatorField::Egt)));
    flags.set(OperatorFlags::KSR, flag(get(OperatorField::Ksr)));

    let flags_mult = flags.bits() | scaled(OperatorField::Mult);
    let ksl_tl = (scaled(OperatorField::Ksl) << 6) | scaled(OperatorField::Tl);
    let attack_decay = (scaled(OperatorField::Ar) << 4) | scaled(OperatorField::Dr);
    let sustain_release = (scaled(OperatorField::Sl) << 4) | scaled(OperatorField::Rr);
    let waveform = scaled(OperatorField::Ws);

    [
        RegisterWrite::new(op.register(OperatorRegister::FlagsMult), flags_mult),
        RegisterWrite::new(op.register(OperatorRegister::KslTl), ksl_tl),
        RegisterWrite::new(op.register(OperatorRegister::AttackDecay), attack_decay),
        RegisterWrite::new(op.register(OperatorRegister::SustainRelease), sustain_release),
        RegisterWrite::new(op.register(OperatorRegister::Waveform), waveform),
    ]
}

/// Encode a channel's 0xC0 register: `RIGHT<<5 | LEFT<<4 | FB<<1 | CON`.
pub fn encode_channel(store: &ParameterStore, ch: ChannelId) -> RegisterWrite {
    let get = |field: ChannelField| store.channel(ch, field);

    let mut flags = ChannelFlags::empty();
    flags.set(ChannelFlags::RIGHT, flag(get(ChannelField::RightOut)));
    flags.set(ChannelFlags::LEFT, flag(get(ChannelField::LeftOut)));
    flags.set(ChannelFlags::CONNECTION, flag(get(ChannelField::Connection)));
    let feedback = scale_field(get(ChannelField::Feedback), 3);

    RegisterWrite::new(
        RegisterAddress::for_channel(ch, FEEDBACK_CONNECTION_BASE),
        flags.bits() | (feedback << 1),
    )
}

/// Encode the 0xBD register. Drum bits are only emitted in rhythm mode.
pub fn encode_globals(store: &ParameterStore) -> RegisterWrite {
    let on = |field: GlobalField| flag(store.global(field));

    let mut bits = RhythmFlags::empty();
    bits.set(RhythmFlags::TREMOLO_DEPTH, on(GlobalField::TremoloDepth));
    bits.set(RhythmFlags::VIBRATO_DEPTH, on(GlobalField::VibratoDepth));
    if on(GlobalField::RhythmMode) {
        bits.insert(RhythmFlags::RHYTHM_MODE);
        bits.set(RhythmFlags::BASS_DRUM, on(GlobalField::BassDrum));
        bits.set(RhythmFlags::SNARE_DRUM, on(GlobalField::SnareDrum));
        bits.set(RhythmFlags::TOM_TOM, on(GlobalField::TomTom));
        bits.set(RhythmFlags::TOP_CYMBAL, on(GlobalField::TopCymbal));
        bits.set(RhythmFlags::HI_HAT, on(GlobalField::HiHat));
    }

    RegisterWrite::new(RHYTHM_REGISTER, bits.bits())
}

/// Every register derived from `store`, in dispatch order.
pub fn encode_all(store: &ParameterStore) -> impl Iterator<Item = RegisterWrite> + '_ {
    std::iter::once(encode_globals(store))
        .chain(OperatorId::all().flat_map(move |op| encode_operator(store, op)))
        .chain(ChannelId::all().map(move |ch| encode_channel(store, ch)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamId;

    fn op(index: usize) -> OperatorId {
        OperatorId::new(index).unwrap()
    }

    fn ch(index: usize) -> ChannelId {
        ChannelId::new(index).unwrap()
    }

    #[test]
    fn test_scale_field_formula() {
        for width in 1..=6u32 {
            let max = (1u32 << width) - 1;
            let delta = match width {
                1 => 1.999f32,
                2 => 3.999,
                3 => 7.999,
                4 => 15.999,
                5 => 31.999,
                _ => 63.999,
            };
            for step in 0..=1000 {
                let v = step as f32 / 1000.0;
                let expected = ((v * delta).floor() as u32).min(max) as u8;
                assert_eq!(scale_field(v, width), expected, "width {width} value {v}");
            }
            assert_eq!(scale_field(1.0, width) as u32, max);
            assert_eq!(scale_field(0.0, width), 0);
        }
    }

    #[test]
    fn test_scale_field_clamps() {
        assert_eq!(scale_field(2.0, 4), 15);
        assert_eq!(scale_field(-1.0, 4), 0);
        assert_eq!(scale_field(f32::NAN, 4), 0);
        assert_eq!(scale_field(0.5, 4), 7); // 7.9995
    }

    #[test]
    fn test_scale_field_rejects_unknown_widths() {
        for width in [0, 7, 8, 32] {
            assert_eq!(scale_field(1.0, width), 0, "width {width}");
            assert_eq!(scale_field(0.5, width), 0, "width {width}");
        }
    }

    #[test]
    fn test_flag_threshold() {
        assert!(!flag(0.5));
        assert!(flag(0.500_001));
        assert!(flag(1.0));
    }

    #[test]
    fn test_encode_operator_packing() {
        let mut store = ParameterStore::new();
        let target = op(7); // channel 3 carrier, slot 0x0B
        for (field, value) in [
            (OperatorField::Am, 1.0),
            (OperatorField::Vib, 0.0),
            (OperatorField::Egt, 1.0),
            (OperatorField::Ksr, 0.0),
            (OperatorField::Mult, 1.0),
            (OperatorField::Ksl, 1.0),
            (OperatorField::Tl, 0.5),
            (OperatorField::Ar, 1.0),
            (OperatorField::Dr, 0.0),
            (OperatorField::Sl, 0.25),
            (OperatorField::Rr, 1.0),
            (OperatorField::Ws, 1.0),
        ] {
            store.set(ParamId::Operator(target, field), value);
        }

        let writes = encode_operator(&store, target);
        let raw: Vec<(u16, u8)> = writes.iter().map(|w| (w.addr.raw(), w.value)).collect();
        assert_eq!(
            raw,
            vec![
                (0x02B, 0b1010_1111),
                (0x04B, (3 << 6) | 31),
                (0x06B, 0xF0),
                (0x08B, (3 << 4) | 15),
                (0x0EB, 7),
            ]
        );
    }

    #[test]
    fn test_encode_operator_defaults() {
        let store = ParameterStore::new();
        // MULT 0.2 -> 3, TL 0.2 -> 12, AR 0.8 -> 12, DR 0.4 -> 6, SL 0.3 -> 4, RR 0.5 -> 7
        let writes = encode_operator(&store, op(0));
        let values: Vec<u8> = writes.iter().map(|w| w.value).collect();
        assert_eq!(values, vec![3, 12, 0xC6, 0x47, 0]);

        let writes = encode_operator(&store, op(1));
        assert_eq!(writes[1].value, 0); // Carrier TL 0
        assert_eq!(writes[1].addr.raw(), 0x043);
    }

    #[test]
    fn test_encode_channel_packing() {
        let mut store = ParameterStore::new();
        let target = ch(13);
        store.set(ParamId::Channel(target, ChannelField::Feedback), 1.0);
        store.set(ParamId::Channel(target, ChannelField::Connection), 1.0);
        store.set(ParamId::Channel(target, ChannelField::LeftOut), 0.0);
        store.set(ParamId::Channel(target, ChannelField::RightOut), 1.0);

        let write = encode_channel(&store, target);
        assert_eq!(write.addr.raw(), 0x1C4);
        assert_eq!(write.value, 0x20 | (7 << 1) | 1);

        // Factory default: both outputs on, FM, no feedback
        assert_eq!(encode_channel(&store, ch(0)).value, 0x30);
    }

    #[test]
    fn test_encode_globals_ignores_drums_without_rhythm_mode() {
        let mut store = ParameterStore::new();
        for field in GlobalField::ALL {
            store.set(ParamId::Global(field), 1.0);
        }
        assert_eq!(encode_globals(&store), RegisterWrite::new(RHYTHM_REGISTER, 0xFF));

        store.set(ParamId::Global(GlobalField::RhythmMode), 0.0);
        assert_eq!(encode_globals(&store).value, 0xC0);

        store.set(ParamId::Global(GlobalField::RhythmMode), 1.0);
        store.set(ParamId::Global(GlobalField::TremoloDepth), 0.0);
        store.set(ParamId::Global(GlobalField::HiHat), 0.0);
        store.set(ParamId::Global(GlobalField::SnareDrum), 0.0);
        assert_eq!(encode_globals(&store).value, 0x40 | 0x20 | 0x10 | 0x04 | 0x02);
    }

    #[test]
    fn test_encode_all_order_and_length() {
        let store = ParameterStore::new();
        let writes: Vec<RegisterWrite> = encode_all(&store).collect();
        assert_eq!(writes.len(), FULL_ENCODE_LEN);
        assert_eq!(FULL_ENCODE_LEN, 199);

        assert_eq!(writes[0].addr, RHYTHM_REGISTER);
        assert_eq!(writes[1].addr.raw(), 0x020);
        assert_eq!(writes[6].addr.raw(), 0x023); // Operator 1 = carrier of channel 0
        assert_eq!(writes[181].addr.raw(), 0x0C0);
        assert_eq!(writes[198].addr.raw(), 0x1C8);
    }

    #[test]
    fn test_encode_all_is_idempotent() {
        let mut store = ParameterStore::new();
        store.set_index(100, 0.42);
        let first: Vec<RegisterWrite> = encode_all(&store).collect();
        let second: Vec<RegisterWrite> = encode_all(&store).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_operator_register_is_addressed_once() {
        let store = ParameterStore::new();
        let mut addrs: Vec<u16> = encode_all(&store).map(|w| w.addr.raw()).collect();
        addrs.sort_unstable();
        addrs.dedup();
        assert_eq!(addrs.len(), FULL_ENCODE_LEN);
    }
}
