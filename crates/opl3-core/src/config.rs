//! Synth configuration
//!
//! Loaded from JSON; every field is optional and falls back to its default.
//!
//! ```json
//! { "sample_rate": 48000, "surface": "monotimbral", "note_off_mode": "clear_key_on_only" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::params::ParameterSurface;
use crate::voice::NoteOffMode;
use crate::{Opl3Error, Result};
use opl3_common::DEFAULT_SAMPLE_RATE;

/// Construction-time settings of an [`Opl3Synth`](crate::Opl3Synth)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Output sample rate in Hz
    pub sample_rate: f32,
    /// Which parameter address space `set_parameter` addresses
    pub surface: ParameterSurface,
    /// What a NoteOff writes to the channel's 0xB0 register
    pub note_off_mode: NoteOffMode,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            surface: ParameterSurface::default(),
            note_off_mode: NoteOffMode::default(),
        }
    }
}

impl SynthConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SynthConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject sample rates that are not finite and positive.
    pub fn validate(&self) -> Result<()> {
        validate_sample_rate(self.sample_rate)
    }

    /// Replace the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Replace the parameter surface.
    pub fn with_surface(mut self, surface: ParameterSurface) -> Self {
        self.surface = surface;
        self
    }

    /// Replace the NoteOff behaviour.
    pub fn with_note_off_mode(mut self, mode: NoteOffMode) -> Self {
        self.note_off_mode = mode;
        self
    }
}

/// Check that `sample_rate` is usable for frequency computation.
pub fn validate_sample_rate(sample_rate: f32) -> Result<()> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(Opl3Error::InvalidSampleRate(sample_rate))
    }
}
