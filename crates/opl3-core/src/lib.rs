//! OPL3 voice allocation and register encoding
//!
//! Drives an 18-channel OPL3 FM chip from normalized synthesis parameters and
//! MIDI note events. The chip itself is an external collaborator behind the
//! [`Opl3Backend`] trait; this crate decides which registers to write and when.
//!
//! # Features
//! - Bit-exact encoding of operator, channel and rhythm registers
//! - Two parameter surfaces: per-voice (512 parameters) and monotimbral
//!   (30 parameters broadcast to every voice)
//! - 16-voice polyphony with first-free allocation and no stealing
//! - Equal-tempered MIDI note to F-number/block conversion
//! - A silent [`RegisterFile`] backend for inspection and tests
//!
//! # Quick start
//! ```no_run
//! use opl3::{Opl3Synth, RegisterFile, SynthConfig};
//!
//! let mut synth = Opl3Synth::new(RegisterFile::new(), SynthConfig::default()).unwrap();
//! synth.handle_midi(&[0x90, 69, 100]); // A4 on
//! assert_eq!(synth.backend().read_register(0x0A0), 0x8D);
//! synth.handle_midi(&[0x80, 69, 0]);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod encoder;
pub mod frequency;
pub mod layout;
pub mod midi;
pub mod params;
mod register_file;
mod synth;
pub mod voice;

/// Error types for configuration loading and register scripts
///
/// Core operations never fail; invalid input there degrades to a no-op.
#[derive(thiserror::Error, Debug)]
pub enum Opl3Error {
    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration document
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Sample rate that is not finite and positive
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    /// Malformed line in a register script
    #[error("line {line}: {message}")]
    Script {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },
}

/// Result type for fallible OPL3 operations
pub type Result<T> = std::result::Result<T, Opl3Error>;

// Public API exports
pub use config::SynthConfig;
pub use encoder::{encode_all, RegisterWrite};
pub use frequency::FrequencyRegisters;
pub use layout::{ChannelId, OperatorId, OperatorRegister, RegisterAddress};
pub use midi::MidiMessage;
pub use params::{MonoParamId, MonotimbralParams, ParamId, ParameterStore, ParameterSurface};
pub use register_file::RegisterFile;
pub use synth::Opl3Synth;
pub use voice::{NoteOffMode, Voice, VoiceAllocator, VoiceState};

pub use opl3_common::Opl3Backend;
