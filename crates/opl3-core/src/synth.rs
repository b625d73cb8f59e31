//! Synth context
//!
//! [`Opl3Synth`] ties the parameter surfaces, the encoder and the voice pool to
//! one chip backend. Every state change is dispatched to the chip as register
//! writes before the call returns.

use log::{debug, trace, warn};

use crate::config::{validate_sample_rate, SynthConfig};
use crate::encoder::{encode_all, RegisterWrite};
use crate::layout::OPL3_MODE_REGISTER;
use crate::midi::MidiMessage;
use crate::params::{
    MonoParamId, MonotimbralParams, ParamId, ParameterStore, ParameterSurface,
};
use crate::voice::{NoteOffMode, Voice, VoiceAllocator};
use crate::Result;
use opl3_common::Opl3Backend;

/// OPL3 voice and register core driving one chip backend
#[derive(Debug)]
pub struct Opl3Synth<B: Opl3Backend> {
    backend: B,
    config: SynthConfig,
    store: ParameterStore,
    mono: MonotimbralParams,
    voices: VoiceAllocator,
    active: bool,
}

impl<B: Opl3Backend> Opl3Synth<B> {
    /// Create a synth and initialize the chip.
    ///
    /// Resets the backend, enables OPL3 mode and writes every register from the
    /// factory patch.
    ///
    /// # Errors
    ///
    /// Returns [`Opl3Error::InvalidSampleRate`](crate::Opl3Error::InvalidSampleRate)
    /// when the configured rate is not finite and positive.
    pub fn new(backend: B, config: SynthConfig) -> Result<Self> {
        config.validate()?;
        let mut synth = Opl3Synth {
            backend,
            config,
            store: ParameterStore::new(),
            mono: MonotimbralParams::new(),
            voices: VoiceAllocator::new(config.note_off_mode),
            active: true,
        };
        if config.surface == ParameterSurface::Monotimbral {
            synth.mono.expand_into(&mut synth.store);
        }
        synth.reset_chip();
        Ok(synth)
    }

    fn reset_chip(&mut self) {
        debug!("chip reset at {} Hz", self.config.sample_rate);
        self.backend.reset(self.config.sample_rate);
        RegisterWrite::new(OPL3_MODE_REGISTER, 1).apply(&mut self.backend);
        self.reencode();
    }

    /// Write every register derived from the current parameters.
    pub fn reencode(&mut self) {
        for write in encode_all(&self.store) {
            write.apply(&mut self.backend);
        }
    }

    /// Change the output sample rate.
    ///
    /// All voices go idle without key-off writes, the chip is reset and every
    /// register is rewritten. Rates that are not finite and positive are ignored.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if let Err(err) = validate_sample_rate(sample_rate) {
            warn!("ignoring sample rate change: {err}");
            return;
        }
        self.config.sample_rate = sample_rate;
        self.voices.force_idle();
        self.reset_chip();
    }

    /// Current output sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Number of parameters on the configured surface.
    pub fn parameter_count(&self) -> usize {
        self.config.surface.parameter_count()
    }

    /// Set a parameter by flat index on the configured surface.
    ///
    /// The value is clamped to [0, 1] and every register is rewritten.
    /// Out-of-range indices are ignored.
    pub fn set_parameter(&mut self, index: usize, value: f32) {
        let stored = match self.config.surface {
            ParameterSurface::PerVoice => self.store.set_index(index, value),
            ParameterSurface::Monotimbral => {
                let stored = self.mono.set_index(index, value);
                if stored {
                    self.mono.expand_into(&mut self.store);
                }
                stored
            }
        };
        if stored {
            self.reencode();
        } else {
            trace!("parameter index {index} out of range");
        }
    }

    /// Value of a parameter on the configured surface; 0 when out of range.
    pub fn get_parameter(&self, index: usize) -> f32 {
        match self.config.surface {
            ParameterSurface::PerVoice => self.store.get_index(index),
            ParameterSurface::Monotimbral => self.mono.get_index(index),
        }
    }

    /// Name of a parameter on the configured surface.
    pub fn parameter_name(&self, index: usize) -> Option<String> {
        match self.config.surface {
            ParameterSurface::PerVoice => ParamId::from_index(index).map(|id| id.to_string()),
            ParameterSurface::Monotimbral => {
                MonoParamId::from_index(index).map(|id| id.to_string())
            }
        }
    }

    /// Current value of a parameter formatted for display.
    pub fn parameter_display(&self, index: usize) -> Option<String> {
        let value = self.get_parameter(index);
        match self.config.surface {
            ParameterSurface::PerVoice => {
                ParamId::from_index(index).map(|id| id.display_value(value))
            }
            ParameterSurface::Monotimbral => {
                MonoParamId::from_index(index).map(|id| id.display_value(value))
            }
        }
    }

    /// Set a per-voice parameter and rewrite every register.
    ///
    /// Ignored unless the synth exposes the per-voice surface.
    pub fn set_param(&mut self, id: ParamId, value: f32) {
        if self.config.surface != ParameterSurface::PerVoice {
            trace!("per-voice parameter {id} ignored on monotimbral surface");
            return;
        }
        self.store.set(id, value);
        self.reencode();
    }

    /// Set a template parameter, broadcast it and rewrite every register.
    ///
    /// Ignored unless the synth exposes the monotimbral surface.
    pub fn set_mono_param(&mut self, id: MonoParamId, value: f32) {
        if self.config.surface != ParameterSurface::Monotimbral {
            trace!("template parameter {id} ignored on per-voice surface");
            return;
        }
        self.mono.set(id, value);
        self.mono.expand_into(&mut self.store);
        self.reencode();
    }

    /// Per-voice parameter storage.
    pub fn params(&self) -> &ParameterStore {
        &self.store
    }

    /// Monotimbral templates.
    pub fn mono_params(&self) -> &MonotimbralParams {
        &self.mono
    }

    // ========================================================================
    // Notes
    // ========================================================================

    /// Start a note; velocity 0 is a NoteOff. Returns the voice slot used.
    pub fn note_on(&mut self, note: u8, velocity: u8) -> Option<usize> {
        let rate = self.config.sample_rate;
        self.voices.note_on(&mut self.backend, note, velocity, rate)
    }

    /// Release every voice playing `note`.
    pub fn note_off(&mut self, note: u8) -> usize {
        self.voices.note_off(&mut self.backend, note)
    }

    /// Release every active voice.
    pub fn all_notes_off(&mut self) -> usize {
        self.voices.all_notes_off(&mut self.backend)
    }

    /// Release every active voice. Identical to [`all_notes_off`](Self::all_notes_off).
    pub fn all_sound_off(&mut self) -> usize {
        self.all_notes_off()
    }

    /// Decode and apply one MIDI message. Unsupported messages are ignored.
    pub fn handle_midi(&mut self, bytes: &[u8]) {
        match MidiMessage::from_bytes(bytes) {
            Some(MidiMessage::NoteOn { note, velocity, .. }) => {
                self.note_on(note, velocity);
            }
            Some(MidiMessage::NoteOff { note, .. }) => {
                self.note_off(note);
            }
            Some(msg @ MidiMessage::ControlChange { .. }) if msg.is_all_off() => {
                self.all_notes_off();
            }
            Some(MidiMessage::PitchBend { value, .. }) => {
                trace!("pitch bend {value:#06x} ignored");
            }
            Some(_) | None => {}
        }
    }

    /// Host activation state; deactivating releases every voice.
    pub fn set_active(&mut self, active: bool) {
        if self.active && !active {
            let released = self.all_notes_off();
            debug!("deactivated, released {released} voices");
        }
        self.active = active;
    }

    /// Whether the host has the synth activated.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Voice pool in slot order.
    pub fn voices(&self) -> &[Voice] {
        self.voices.voices()
    }

    /// Number of sounding voices.
    pub fn active_voice_count(&self) -> usize {
        self.voices.active_count()
    }

    /// Change what a NoteOff writes.
    pub fn set_note_off_mode(&mut self, mode: NoteOffMode) {
        self.config.note_off_mode = mode;
        self.voices.set_note_off_mode(mode);
    }

    // ========================================================================
    // Audio
    // ========================================================================

    /// Render one stereo frame.
    pub fn generate(&mut self) -> (i16, i16) {
        self.backend.generate()
    }

    /// Render a block into two f32 buffers.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.backend.generate_into(left, right);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current configuration.
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Chip backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Chip backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consume the synth and return the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }
}
