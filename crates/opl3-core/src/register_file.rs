//! Register-file backend
//!
//! Mirrors the two 256-byte banks of the chip without synthesizing audio. Used
//! as the device for tests and the register dump tool, and as a model of what a
//! real emulator receives through [`Opl3Backend`].

use log::trace;

use crate::encoder::RegisterWrite;
use crate::layout::RegisterAddress;
use opl3_common::{Opl3Backend, BANK_COUNT};

const BANK_SIZE: usize = 256;

/// Silent OPL3 backend that remembers every register value
#[derive(Debug, Clone)]
pub struct RegisterFile {
    banks: [[u8; BANK_SIZE]; BANK_COUNT],
    log: Option<Vec<RegisterWrite>>,
    sample_rate: f32,
}

impl RegisterFile {
    /// Create a register file with all registers zero.
    pub fn new() -> Self {
        RegisterFile {
            banks: [[0; BANK_SIZE]; BANK_COUNT],
            log: None,
            sample_rate: opl3_common::DEFAULT_SAMPLE_RATE,
        }
    }

    /// Create a register file that also records every write in order.
    pub fn with_log() -> Self {
        RegisterFile {
            log: Some(Vec::new()),
            ..Self::new()
        }
    }

    /// Current value of a register.
    pub fn read_register(&self, addr: u16) -> u8 {
        let addr = RegisterAddress::from(addr);
        self.banks[addr.bank() as usize][addr.offset() as usize]
    }

    /// Both banks, bank 0 first.
    pub fn banks(&self) -> &[[u8; BANK_SIZE]; BANK_COUNT] {
        &self.banks
    }

    /// Writes recorded since the last [`take_log`](Self::take_log); empty when
    /// logging is disabled.
    pub fn log(&self) -> &[RegisterWrite] {
        self.log.as_deref().unwrap_or(&[])
    }

    /// Drain the write log.
    pub fn take_log(&mut self) -> Vec<RegisterWrite> {
        self.log.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Whether writes are being recorded.
    pub fn is_logging(&self) -> bool {
        self.log.is_some()
    }

    /// Sample rate passed to the last reset.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Opl3Backend for RegisterFile {
    fn reset(&mut self, sample_rate: f32) {
        self.banks = [[0; BANK_SIZE]; BANK_COUNT];
        self.sample_rate = sample_rate;
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        let addr = RegisterAddress::from(addr);
        trace!("write {addr} = {value:02X}");
        self.banks[addr.bank() as usize][addr.offset() as usize] = value;
        if let Some(log) = self.log.as_mut() {
            log.push(RegisterWrite::new(addr, value));
        }
    }

    fn generate(&mut self) -> (i16, i16) {
        (0, 0)
    }
}
