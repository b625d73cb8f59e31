//! Common traits and constants for OPL3 register-level synthesis.
//!
//! This crate provides the chip-facing abstraction shared by the voice/register
//! core (`opl3`) and the tools built on top of it.
//!
//! # Traits
//!
//! - [`Opl3Backend`] - register-addressable chip that produces stereo frames
//!
//! # Example
//!
//! ```ignore
//! use opl3_common::Opl3Backend;
//!
//! fn key_on_a4<B: Opl3Backend>(chip: &mut B) {
//!     chip.write_register(0x0A0, 0x8D); // F-number low, channel 0
//!     chip.write_register(0x0B0, 0x32); // key on, block 4, F-number high
//!     let (left, right) = chip.generate();
//! }
//! ```

#![warn(missing_docs)]

mod backend;
pub mod util;

pub use backend::Opl3Backend;
pub use util::{bank_of_channel, sample_to_f32, slot_of_channel};

// ============================================================================
// Common Constants
// ============================================================================

/// Standard audio sample rate (44.1 kHz CD quality).
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

/// Number of two-operator channels on the chip.
pub const CHANNEL_COUNT: usize = 18;

/// Operators per channel (modulator + carrier).
pub const OPERATORS_PER_CHANNEL: usize = 2;

/// Total number of operators addressed by the register layer.
pub const OPERATOR_COUNT: usize = CHANNEL_COUNT * OPERATORS_PER_CHANNEL;

/// Number of channels addressed through one register bank.
pub const CHANNELS_PER_BANK: usize = 9;

/// Number of register banks (bank 1 is selected by bit 8 of the address).
pub const BANK_COUNT: usize = 2;

/// Size of the polyphonic voice pool; voice slot `n` drives channel `n`.
pub const MAX_VOICES: usize = 16;
