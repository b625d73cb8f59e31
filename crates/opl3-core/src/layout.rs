//! OPL3 Register Layout
//!
//! Defines the composite register addresses, the per-register bit fields and the
//! operator slot tables of the chip. Operators are not laid out linearly: within a
//! bank the modulator of channel `n` lives at a slot taken from a fixed table and
//! its carrier three slots later, with gaps at 0x06-0x07 and 0x0E-0x0F.

use std::fmt;

use bitflags::bitflags;
use opl3_common::{bank_of_channel, slot_of_channel, CHANNEL_COUNT, OPERATOR_COUNT};

/// Modulator slot of each channel within its bank.
pub const MODULATOR_SLOTS: [u8; 9] = [0x00, 0x01, 0x02, 0x08, 0x09, 0x0A, 0x10, 0x11, 0x12];

/// Carrier slot of each channel within its bank.
pub const CARRIER_SLOTS: [u8; 9] = [0x03, 0x04, 0x05, 0x0B, 0x0C, 0x0D, 0x13, 0x14, 0x15];

/// F-number low byte, one per channel slot.
pub const FNUM_LOW_BASE: u8 = 0xA0;
/// Key-on, block and F-number high bits, one per channel slot.
pub const KEY_BLOCK_FNUM_BASE: u8 = 0xB0;
/// Output routing, feedback and connection, one per channel slot.
pub const FEEDBACK_CONNECTION_BASE: u8 = 0xC0;
/// Tremolo/vibrato depth and rhythm section control (bank 0 only).
pub const RHYTHM_REGISTER: RegisterAddress = RegisterAddress(0x0BD);
/// OPL3 mode enable ("NEW" bit, bank 1).
pub const OPL3_MODE_REGISTER: RegisterAddress = RegisterAddress(0x105);

/// Key-on bit in the 0xB0 register.
pub const KEY_ON: u8 = 0x20;

/// Composite register address `(bank << 8) | offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisterAddress(u16);

impl RegisterAddress {
    /// Build an address from a bank (only bit 0 is used) and an 8-bit offset.
    #[inline]
    pub const fn new(bank: u8, offset: u8) -> Self {
        RegisterAddress((((bank & 1) as u16) << 8) | offset as u16)
    }

    /// Address of a per-channel register (`base + slot`) in the channel's bank.
    #[inline]
    pub fn for_channel(channel: ChannelId, base: u8) -> Self {
        RegisterAddress::new(channel.bank(), base + channel.slot())
    }

    /// Raw value as dispatched to the chip.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Register bank (0 or 1).
    #[inline]
    pub const fn bank(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Offset inside the bank.
    #[inline]
    pub const fn offset(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl From<RegisterAddress> for u16 {
    fn from(addr: RegisterAddress) -> Self {
        addr.raw()
    }
}

impl From<u16> for RegisterAddress {
    /// Bits above the bank bit are ignored, as on the chip's address port.
    fn from(raw: u16) -> Self {
        RegisterAddress(raw & 0x1FF)
    }
}

impl fmt::Display for RegisterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02X}", self.bank(), self.offset())
    }
}

/// Per-operator register groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorRegister {
    /// AM, VIB, EGT, KSR, MULT - 0x20
    FlagsMult = 0x20,
    /// KSL, TL - 0x40
    KslTl = 0x40,
    /// Attack and decay rates - 0x60
    AttackDecay = 0x60,
    /// Sustain level and release rate - 0x80
    SustainRelease = 0x80,
    /// Waveform select - 0xE0
    Waveform = 0xE0,
}

impl OperatorRegister {
    /// Register groups in the order they are written.
    pub const ALL: [OperatorRegister; 5] = [
        OperatorRegister::FlagsMult,
        OperatorRegister::KslTl,
        OperatorRegister::AttackDecay,
        OperatorRegister::SustainRelease,
        OperatorRegister::Waveform,
    ];

    /// Base offset of the group.
    pub fn base(self) -> u8 {
        self as u8
    }

    /// Group of an operator register address, `None` for channel, global and gap slots.
    pub fn of_address(addr: RegisterAddress) -> Option<Self> {
        let slot = addr.offset() & 0x1F;
        if slot > 0x15 || slot & 0x07 > 0x05 {
            return None;
        }
        let base = addr.offset() & 0xE0;
        Self::ALL.into_iter().find(|group| group.base() == base)
    }
}

impl fmt::Display for OperatorRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorRegister::FlagsMult => write!(f, "0x20 (AM/VIB/EGT/KSR/MULT)"),
            OperatorRegister::KslTl => write!(f, "0x40 (KSL/TL)"),
            OperatorRegister::AttackDecay => write!(f, "0x60 (AR/DR)"),
            OperatorRegister::SustainRelease => write!(f, "0x80 (SL/RR)"),
            OperatorRegister::Waveform => write!(f, "0xE0 (WS)"),
        }
    }
}

bitflags! {
    /// Bits of the 0xBD register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RhythmFlags: u8 {
        /// Deep tremolo (4.8 dB instead of 1 dB)
        const TREMOLO_DEPTH = 0x80;
        /// Deep vibrato (14 cents instead of 7)
        const VIBRATO_DEPTH = 0x40;
        /// Rhythm (percussion) mode
        const RHYTHM_MODE = 0x20;
        /// Bass drum key-on
        const BASS_DRUM = 0x10;
        /// Snare drum key-on
        const SNARE_DRUM = 0x08;
        /// Tom-tom key-on
        const TOM_TOM = 0x04;
        /// Top cymbal key-on
        const TOP_CYMBAL = 0x02;
        /// Hi-hat key-on
        const HI_HAT = 0x01;
    }
}

bitflags! {
    /// Flag bits of the 0x20 operator register (MULT occupies the low nibble)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OperatorFlags: u8 {
        /// Amplitude modulation (tremolo)
        const AM = 0x80;
        /// Vibrato
        const VIB = 0x40;
        /// Sustaining envelope
        const EGT = 0x20;
        /// Key scale rate
        const KSR = 0x10;
    }
}

bitflags! {
    /// Flag bits of the 0xC0 channel register (feedback occupies bits 3..1)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelFlags: u8 {
        /// Right output enable
        const RIGHT = 0x20;
        /// Left output enable
        const LEFT = 0x10;
        /// Additive (AM) connection instead of FM
        const CONNECTION = 0x01;
    }
}

/// Position of an operator inside its channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorRole {
    /// First operator, modulates the carrier in FM connection
    Modulator,
    /// Second operator, produces the channel output
    Carrier,
}

/// Index of one of the 18 chip channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Channel 0.
    pub const FIRST: ChannelId = ChannelId(0);

    /// Returns `None` when `index >= 18`.
    pub fn new(index: usize) -> Option<Self> {
        (index < CHANNEL_COUNT).then_some(ChannelId(index as u8))
    }

    /// All channels in ascending order.
    pub fn all() -> impl Iterator<Item = ChannelId> {
        (0..CHANNEL_COUNT as u8).map(ChannelId)
    }

    /// Linear channel index (0-17).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Register bank of this channel.
    #[inline]
    pub fn bank(self) -> u8 {
        bank_of_channel(self.index())
    }

    /// Channel slot within its bank (0-8).
    #[inline]
    pub fn slot(self) -> u8 {
        slot_of_channel(self.index())
    }

    /// Operator playing `role` on this channel.
    #[inline]
    pub fn operator(self, role: OperatorRole) -> OperatorId {
        let base = self.0 * 2;
        match role {
            OperatorRole::Modulator => OperatorId(base),
            OperatorRole::Carrier => OperatorId(base + 1),
        }
    }
}

/// Index of one of the 36 operators, two per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(u8);

impl OperatorId {
    /// Returns `None` when `index >= 36`.
    pub fn new(index: usize) -> Option<Self> {
        (index < OPERATOR_COUNT).then_some(OperatorId(index as u8))
    }

    /// All operators in ascending order.
    pub fn all() -> impl Iterator<Item = OperatorId> {
        (0..OPERATOR_COUNT as u8).map(OperatorId)
    }

    /// Linear operator index (0-35).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Channel owning this operator.
    #[inline]
    pub fn channel(self) -> ChannelId {
        ChannelId(self.0 / 2)
    }

    /// Modulator for even indices, carrier for odd ones.
    #[inline]
    pub fn role(self) -> OperatorRole {
        if self.0 % 2 == 0 {
            OperatorRole::Modulator
        } else {
            OperatorRole::Carrier
        }
    }

    /// Register slot of this operator within its bank, from the hardware table.
    #[inline]
    pub fn slot(self) -> u8 {
        let in_bank = self.channel().slot() as usize;
        match self.role() {
            OperatorRole::Modulator => MODULATOR_SLOTS[in_bank],
            OperatorRole::Carrier => CARRIER_SLOTS[in_bank],
        }
    }

    /// Address of one of this operator's registers.
    #[inline]
    pub fn register(self, group: OperatorRegister) -> RegisterAddress {
        RegisterAddress::new(self.channel().bank(), group.base() + self.slot())
    }
}
