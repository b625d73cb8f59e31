//! Polyphonic voice allocation
//!
//! A fixed pool of [`MAX_VOICES`] voices, voice slot `n` permanently driving chip
//! channel `n`. Each voice is `Idle` or `Active`; a NoteOn takes the first idle
//! slot in ascending order and a NoteOn arriving with every slot busy is dropped.
//! There is no stealing and no queue.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::frequency::FrequencyRegisters;
use crate::layout::{ChannelId, RegisterAddress, FNUM_LOW_BASE, KEY_BLOCK_FNUM_BASE};
use opl3_common::{Opl3Backend, MAX_VOICES};

/// Lifecycle state of a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceState {
    /// Free for allocation
    #[default]
    Idle,
    /// Bound to a sounding note
    Active,
}

/// What a NoteOff writes to the channel's 0xB0 register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteOffMode {
    /// Write 0, clearing block and F-number along with the key-on bit.
    ///
    /// This is what existing patches were tuned against, so it stays the default.
    #[default]
    ZeroHighByte,
    /// Rewrite the last high byte with only the key-on bit cleared, so the
    /// release phase keeps its pitch.
    ClearKeyOnOnly,
}

/// One entry of the voice pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    state: VoiceState,
    note: u8,
    frequency: f32,
    channel: ChannelId,
    registers: Option<FrequencyRegisters>,
}

impl Voice {
    fn new(channel: ChannelId) -> Self {
        Voice {
            state: VoiceState::Idle,
            note: 0,
            frequency: 0.0,
            channel,
            registers: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Whether the voice is bound to a sounding note.
    pub fn is_active(&self) -> bool {
        self.state == VoiceState::Active
    }

    /// Bound note while active.
    pub fn note(&self) -> Option<u8> {
        self.is_active().then_some(self.note)
    }

    /// Frequency of the last note bound to this voice, in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Hardware channel driven by this voice.
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Frequency registers written by the last NoteOn.
    pub fn registers(&self) -> Option<FrequencyRegisters> {
        self.registers
    }

    fn high_register(&self) -> RegisterAddress {
        RegisterAddress::for_channel(self.channel, KEY_BLOCK_FNUM_BASE)
    }
}

/// Fixed pool of voices bound 1:1 to the first [`MAX_VOICES`] channels
#[derive(Debug, Clone)]
pub struct VoiceAllocator {
    voices: [Voice; MAX_VOICES],
    note_off_mode: NoteOffMode,
}

impl VoiceAllocator {
    /// Create a pool with every voice idle.
    pub fn new(note_off_mode: NoteOffMode) -> Self {
        let mut channels = ChannelId::all();
        let voices = std::array::from_fn(|_| {
            Voice::new(channels.next().unwrap_or(ChannelId::FIRST))
        });
        VoiceAllocator {
            voices,
            note_off_mode,
        }
    }

    /// Start `note` on the first idle voice.
    ///
    /// A velocity of 0 is a NoteOff. Returns the voice slot that was bound, or
    /// `None` when the note was released or dropped because every voice is busy.
    pub fn note_on<B: Opl3Backend + ?Sized>(
        &mut self,
        chip: &mut B,
        note: u8,
        velocity: u8,
        sample_rate: f32,
    ) -> Option<usize> {
        if velocity == 0 {
            self.note_off(chip, note);
            return None;
        }

        let Some(slot) = self.voices.iter().position(|v| !v.is_active()) else {
            debug!("voice pool exhausted, dropping note {note}");
            return None;
        };

        let regs = FrequencyRegisters::for_note(note, sample_rate);
        let voice = &mut self.voices[slot];
        voice.state = VoiceState::Active;
        voice.note = note;
        voice.frequency = regs.frequency;
        voice.registers = Some(regs);

        let low = RegisterAddress::for_channel(voice.channel, FNUM_LOW_BASE);
        chip.write_register(low.raw(), regs.low);
        chip.write_register(voice.high_register().raw(), regs.high);

        trace!(
            "note {note} -> voice {slot} (block {}, fnum {:#05x})",
            regs.block,
            regs.f_number
        );
        Some(slot)
    }

    /// Release every active voice bound to `note`. Returns how many were released.
    pub fn note_off<B: Opl3Backend + ?Sized>(&mut self, chip: &mut B, note: u8) -> usize {
        let mode = self.note_off_mode;
        let mut released = 0;
        for voice in self
            .voices
            .iter_mut()
            .filter(|v| v.is_active() && v.note == note)
        {
            let high = match (mode, voice.registers) {
                (NoteOffMode::ClearKeyOnOnly, Some(regs)) => regs.key_off_high(),
                _ => 0,
            };
            chip.write_register(voice.high_register().raw(), high);
            voice.state = VoiceState::Idle;
            released += 1;
        }
        released
    }

    /// Release every active voice regardless of note, writing 0 to its 0xB0
    /// register. Returns how many were released.
    pub fn all_notes_off<B: Opl3Backend + ?Sized>(&mut self, chip: &mut B) -> usize {
        let mut released = 0;
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            chip.write_register(voice.high_register().raw(), 0);
            voice.state = VoiceState::Idle;
            released += 1;
        }
        released
    }

    /// Mark every voice idle without touching the chip (used after a device reset).
    pub fn force_idle(&mut self) {
        for voice in &mut self.voices {
            voice.state = VoiceState::Idle;
        }
    }

    /// Number of active voices.
    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// All voices in slot order.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Voice in `slot`, if the slot exists.
    pub fn voice(&self, slot: usize) -> Option<&Voice> {
        self.voices.get(slot)
    }

    /// Active NoteOff behaviour.
    pub fn note_off_mode(&self) -> NoteOffMode {
        self.note_off_mode
    }

    /// Change the NoteOff behaviour; affects subsequent NoteOffs only.
    pub fn set_note_off_mode(&mut self, mode: NoteOffMode) {
        self.note_off_mode = mode;
    }
}

impl Default for VoiceAllocator {
    fn default() -> Self {
        Self::new(NoteOffMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegisterFile;

    const RATE: f32 = 44_100.0;

    fn setup() -> (VoiceAllocator, RegisterFile) {
        let mut chip = RegisterFile::with_log();
        chip.reset(RATE);
        (VoiceAllocator::default(), chip)
    }

    #[test]
    fn test_voices_bound_to_first_channels() {
        let pool = VoiceAllocator::default();
        for (slot, voice) in pool.voices().iter().enumerate() {
            assert_eq!(voice.channel().index(), slot);
            assert_eq!(voice.state(), VoiceState::Idle);
        }
    }

    #[test]
    fn test_note_on_writes_frequency_pair() {
        let (mut pool, mut chip) = setup();
        assert_eq!(pool.note_on(&mut chip, 69, 100, RATE), Some(0));

        let writes = chip.take_log();
        assert_eq!(writes.len(), 2);
        assert_eq!((writes[0].addr.raw(), writes[0].value), (0x0A0, 0x8D));
        assert_eq!((writes[1].addr.raw(), writes[1].value), (0x0B0, 0x32));

        let voice = pool.voice(0).unwrap();
        assert_eq!(voice.note(), Some(69));
        approx::assert_relative_eq!(voice.frequency(), 440.0);
    }

    #[test]
    fn test_allocation_order_and_exhaustion() {
        let (mut pool, mut chip) = setup();
        for (i, note) in (40u8..56).enumerate() {
            assert_eq!(pool.note_on(&mut chip, note, 90, RATE), Some(i));
        }
        assert_eq!(pool.active_count(), MAX_VOICES);
        chip.take_log();

        assert_eq!(pool.note_on(&mut chip, 80, 90, RATE), None);
        assert_eq!(pool.active_count(), MAX_VOICES);
        assert!(chip.log().is_empty());
    }

    #[test]
    fn test_freed_slot_is_reused_first() {
        let (mut pool, mut chip) = setup();
        for note in 60..64 {
            pool.note_on(&mut chip, note, 100, RATE);
        }
        pool.note_off(&mut chip, 61);
        assert_eq!(pool.note_on(&mut chip, 70, 100, RATE), Some(1));
    }

    #[test]
    fn test_velocity_zero_is_note_off() {
        let (mut pool, mut chip) = setup();
        pool.note_on(&mut chip, 60, 100, RATE);
        chip.take_log();

        assert_eq!(pool.note_on(&mut chip, 60, 0, RATE), None);
        assert_eq!(pool.active_count(), 0);
        let writes = chip.take_log();
        assert_eq!(writes.len(), 1);
        assert_eq!((writes[0].addr.raw(), writes[0].value), (0x0B0, 0));
    }

    #[test]
    fn test_note_off_releases_all_duplicates() {
        let (mut pool, mut chip) = setup();
        pool.note_on(&mut chip, 64, 100, RATE);
        pool.note_on(&mut chip, 64, 100, RATE);
        pool.note_on(&mut chip, 67, 100, RATE);
        chip.take_log();

        assert_eq!(pool.note_off(&mut chip, 64), 2);
        assert_eq!(pool.active_count(), 1);
        let addrs: Vec<u16> = chip.take_log().iter().map(|w| w.addr.raw()).collect();
        assert_eq!(addrs, vec![0x0B0, 0x0B1]);
    }

    #[test]
    fn test_note_off_unknown_note_is_noop() {
        let (mut pool, mut chip) = setup();
        pool.note_on(&mut chip, 64, 100, RATE);
        chip.take_log();
        assert_eq!(pool.note_off(&mut chip, 65), 0);
        assert!(chip.log().is_empty());
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_clear_key_on_only_preserves_pitch() {
        let (mut pool, mut chip) = setup();
        pool.set_note_off_mode(NoteOffMode::ClearKeyOnOnly);
        pool.note_on(&mut chip, 69, 100, RATE);
        chip.take_log();

        pool.note_off(&mut chip, 69);
        let writes = chip.take_log();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].addr.raw(), 0x0B0);
        assert_eq!(writes[0].value, 0x12); // Block 4, F-number high 2, key off
    }

    #[test]
    fn test_all_notes_off_writes_zero_per_active_voice() {
        let (mut pool, mut chip) = setup();
        pool.set_note_off_mode(NoteOffMode::ClearKeyOnOnly);
        for note in [50, 52, 55] {
            pool.note_on(&mut chip, note, 100, RATE);
        }
        pool.note_off(&mut chip, 52);
        chip.take_log();

        assert_eq!(pool.all_notes_off(&mut chip), 2);
        let writes: Vec<(u16, u8)> = chip
            .take_log()
            .iter()
            .map(|w| (w.addr.raw(), w.value))
            .collect();
        assert_eq!(writes, vec![(0x0B0, 0), (0x0B2, 0)]);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_force_idle_writes_nothing() {
        let (mut pool, mut chip) = setup();
        pool.note_on(&mut chip, 50, 100, RATE);
        chip.take_log();
        pool.force_idle();
        assert_eq!(pool.active_count(), 0);
        assert!(chip.log().is_empty());
    }

    #[test]
    fn test_bank_one_voice_addresses() {
        let (mut pool, mut chip) = setup();
        for note in 30..40 {
            pool.note_on(&mut chip, note, 100, RATE);
        }
        // Slot 9 is channel 9: bank 1, slot 0
        let writes = chip.take_log();
        assert_eq!(writes[18].addr.raw(), 0x1A0);
        assert_eq!(writes[19].addr.raw(), 0x1B0);
    }
}
