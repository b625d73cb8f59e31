//! Per-voice parameter storage

use super::{
    normalize, ChannelField, GlobalField, OperatorField, ParamId, PER_VOICE_PARAM_COUNT,
};
use crate::layout::{ChannelId, OperatorId, OperatorRole};

/// Normalized values for every operator, channel and global field
///
/// Created with the factory patch, mutated only through `set*`, never shrunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    values: [f32; PER_VOICE_PARAM_COUNT],
}

impl ParameterStore {
    /// Create a store holding the factory defaults.
    pub fn new() -> Self {
        let mut store = ParameterStore {
            values: [0.0; PER_VOICE_PARAM_COUNT],
        };
        for op in OperatorId::all() {
            for field in OperatorField::ALL {
                store.set(ParamId::Operator(op, field), default_operator_value(op, field));
            }
        }
        for ch in ChannelId::all() {
            for field in ChannelField::ALL {
                store.set(ParamId::Channel(ch, field), default_channel_value(field));
            }
        }
        store
    }

    /// Store `value` (clamped to [0, 1]).
    #[inline]
    pub fn set(&mut self, id: ParamId, value: f32) {
        self.values[id.index()] = normalize(value);
    }

    /// Stored value of `id`.
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()]
    }

    /// Store by flat index; returns `false` (and does nothing) when out of range.
    pub fn set_index(&mut self, index: usize, value: f32) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = normalize(value);
                true
            }
            None => false,
        }
    }

    /// Value at a flat index, or 0 when out of range.
    pub fn get_index(&self, index: usize) -> f32 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    /// Shorthand for an operator field.
    #[inline]
    pub fn operator(&self, op: OperatorId, field: OperatorField) -> f32 {
        self.get(ParamId::Operator(op, field))
    }

    /// Shorthand for a channel field.
    #[inline]
    pub fn channel(&self, ch: ChannelId, field: ChannelField) -> f32 {
        self.get(ParamId::Channel(ch, field))
    }

    /// Shorthand for a global field.
    #[inline]
    pub fn global(&self, field: GlobalField) -> f32 {
        self.get(ParamId::Global(field))
    }

    /// All values in flat index order.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory value of an operator field. Modulators start 0.2 quieter than carriers.
pub(crate) fn default_operator_value(op: OperatorId, field: OperatorField) -> f32 {
    match field {
        OperatorField::Mult => 0.2,
        OperatorField::Tl => match op.role() {
            OperatorRole::Modulator => 0.2,
            OperatorRole::Carrier => 0.0,
        },
        OperatorField::Ar => 0.8,
        OperatorField::Dr => 0.4,
        OperatorField::Sl => 0.3,
        OperatorField::Rr => 0.5,
        _ => 0.0,
    }
}

/// Factory value of a channel field: FM connection, no feedback, both outputs on.
pub(crate) fn default_channel_value(field: ChannelField) -> f32 {
    match field {
        ChannelField::Feedback | ChannelField::Connection => 0.0,
        ChannelField::LeftOut | ChannelField::RightOut => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GLOBAL_PARAMS_START;

    #[test]
    fn test_defaults() {
        let store = ParameterStore::new();
        let modulator = OperatorId::new(0).unwrap();
        let carrier = OperatorId::new(1).unwrap();

        assert_eq!(store.operator(modulator, OperatorField::Tl), 0.2);
        assert_eq!(store.operator(carrier, OperatorField::Tl), 0.0);
        assert_eq!(store.operator(carrier, OperatorField::Ar), 0.8);
        assert_eq!(store.operator(carrier, OperatorField::Ws), 0.0);

        let ch = ChannelId::new(17).unwrap();
        assert_eq!(store.channel(ch, ChannelField::LeftOut), 1.0);
        assert_eq!(store.channel(ch, ChannelField::Feedback), 0.0);

        for field in GlobalField::ALL {
            assert_eq!(store.global(field), 0.0);
        }
    }

    #[test]
    fn test_round_trip_every_index() {
        let mut store = ParameterStore::new();
        for value in [0.0f32, 0.001, 0.25, 0.5, 0.999, 1.0] {
            for index in 0..PER_VOICE_PARAM_COUNT {
                assert!(store.set_index(index, value));
                assert_eq!(store.get_index(index), value);
            }
        }
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut store = ParameterStore::new();
        let before = store.clone();
        assert!(!store.set_index(PER_VOICE_PARAM_COUNT, 0.7));
        assert!(!store.set_index(usize::MAX, 0.7));
        assert_eq!(store, before);
        assert_eq!(store.get_index(PER_VOICE_PARAM_COUNT), 0.0);
    }

    #[test]
    fn test_values_are_clamped() {
        let mut store = ParameterStore::new();
        store.set_index(GLOBAL_PARAMS_START, 3.0);
        assert_eq!(store.global(GlobalField::TremoloDepth), 1.0);
        store.set_index(GLOBAL_PARAMS_START, -1.0);
        assert_eq!(store.global(GlobalField::TremoloDepth), 0.0);
    }
}
