//! Monotimbral parameter surface
//!
//! One modulator, carrier and channel template shared by every voice slot.
//! Expansion copies the templates into the per-voice storage of slots
//! 0..[`MAX_VOICES`] and keeps the rhythm section switched off.

use super::store::{default_channel_value, default_operator_value};
use super::{
    normalize, ChannelField, GlobalField, MonoParamId, OperatorField, ParamId, ParameterStore,
};
use crate::layout::{ChannelId, OperatorRole};
use opl3_common::MAX_VOICES;

/// Template values of the monotimbral surface
#[derive(Debug, Clone, PartialEq)]
pub struct MonotimbralParams {
    modulator: [f32; OperatorField::COUNT],
    carrier: [f32; OperatorField::COUNT],
    channel: [f32; ChannelField::COUNT],
    tremolo_depth: f32,
    vibrato_depth: f32,
}

impl MonotimbralParams {
    /// Templates initialized from the factory patch of channel 0.
    pub fn new() -> Self {
        let ch0 = ChannelId::FIRST;
        let modulator = ch0.operator(OperatorRole::Modulator);
        let carrier = ch0.operator(OperatorRole::Carrier);
        MonotimbralParams {
            modulator: OperatorField::ALL.map(|f| default_operator_value(modulator, f)),
            carrier: OperatorField::ALL.map(|f| default_operator_value(carrier, f)),
            channel: ChannelField::ALL.map(default_channel_value),
            tremolo_depth: 0.0,
            vibrato_depth: 0.0,
        }
    }

    fn slot_mut(&mut self, id: MonoParamId) -> &mut f32 {
        match id {
            MonoParamId::Modulator(field) => &mut self.modulator[field.index()],
            MonoParamId::Carrier(field) => &mut self.carrier[field.index()],
            MonoParamId::Channel(field) => &mut self.channel[field.index()],
            MonoParamId::TremoloDepth => &mut self.tremolo_depth,
            MonoParamId::VibratoDepth => &mut self.vibrato_depth,
        }
    }

    /// Store `value` (clamped to [0, 1]).
    pub fn set(&mut self, id: MonoParamId, value: f32) {
        *self.slot_mut(id) = normalize(value);
    }

    /// Stored value of `id`.
    pub fn get(&self, id: MonoParamId) -> f32 {
        match id {
            MonoParamId::Modulator(field) => self.modulator[field.index()],
            MonoParamId::Carrier(field) => self.carrier[field.index()],
            MonoParamId::Channel(field) => self.channel[field.index()],
            MonoParamId::TremoloDepth => self.tremolo_depth,
            MonoParamId::VibratoDepth => self.vibrato_depth,
        }
    }

    /// Store by flat index; returns `false` (and does nothing) when out of range.
    pub fn set_index(&mut self, index: usize, value: f32) -> bool {
        match MonoParamId::from_index(index) {
            Some(id) => {
                self.set(id, value);
                true
            }
            None => false,
        }
    }

    /// Value at a flat index, or 0 when out of range.
    pub fn get_index(&self, index: usize) -> f32 {
        MonoParamId::from_index(index).map_or(0.0, |id| self.get(id))
    }

    /// Broadcast the templates into the per-voice storage of every voice slot.
    ///
    /// Channels beyond the voice pool keep their own values. Rhythm mode and the
    /// five drum enables are forced off.
    pub fn expand_into(&self, store: &mut ParameterStore) {
        for ch in ChannelId::all().take(MAX_VOICES) {
            let modulator = ch.operator(OperatorRole::Modulator);
            let carrier = ch.operator(OperatorRole::Carrier);
            for field in OperatorField::ALL {
                store.set(ParamId::Operator(modulator, field), self.modulator[field.index()]);
                store.set(ParamId::Operator(carrier, field), self.carrier[field.index()]);
            }
            for field in ChannelField::ALL {
                store.set(ParamId::Channel(ch, field), self.channel[field.index()]);
            }
        }

        store.set(ParamId::Global(GlobalField::TremoloDepth), self.tremolo_depth);
        store.set(ParamId::Global(GlobalField::VibratoDepth), self.vibrato_depth);
        for field in &GlobalField::ALL[GlobalField::RhythmMode.index()..] {
            store.set(ParamId::Global(*field), 0.0);
        }
    }
}

impl Default for MonotimbralParams {
    fn default() -> Self {
        Self::new()
    }
}
