//! Backend trait abstraction for OPL3 chip implementations
//!
//! This module defines the interface the register core drives, whether the
//! implementation is a full emulation or a register mirror used for tests.

/// Common interface for OPL3 chip backends
///
/// The register core never inspects envelope or oscillator state; it only
/// resets the device, writes registers and pulls stereo frames.
///
/// # Example
///
/// ```
/// use opl3_common::Opl3Backend;
///
/// struct Silence;
///
/// impl Opl3Backend for Silence {
///     fn reset(&mut self, _sample_rate: f32) {}
///     fn write_register(&mut self, _addr: u16, _value: u8) {}
///     fn generate(&mut self) -> (i16, i16) {
///         (0, 0)
///     }
/// }
///
/// let mut chip = Silence;
/// chip.reset(44_100.0);
/// chip.write_register(0x1B0, 0x20);
/// assert_eq!(chip.generate(), (0, 0));
/// ```
pub trait Opl3Backend {
    /// Re-initialize the device for a new output sample rate
    ///
    /// Clears every register and silences all channels.
    fn reset(&mut self, sample_rate: f32);

    /// Write to an OPL3 register
    ///
    /// # Arguments
    ///
    /// * `addr` - Composite address `(bank << 8) | offset`, bank 0 or 1
    /// * `value` - Register value (0x00-0xFF)
    fn write_register(&mut self, addr: u16, value: u8);

    /// Produce one interleaved stereo frame
    ///
    /// Call once per output audio frame.
    fn generate(&mut self) -> (i16, i16);

    /// Render frames into caller-provided left/right buffers
    ///
    /// Converts each sample to a float in [-1.0, 1.0). Renders
    /// `min(left.len(), right.len())` frames; this avoids per-call allocations.
    fn generate_into(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (sl, sr) = self.generate();
            *l = crate::sample_to_f32(sl);
            *r = crate::sample_to_f32(sr);
        }
    }
}

impl<B: Opl3Backend + ?Sized> Opl3Backend for &mut B {
    fn reset(&mut self, sample_rate: f32) {
        (**self).reset(sample_rate)
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        (**self).write_register(addr, value)
    }

    fn generate(&mut self) -> (i16, i16) {
        (**self).generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ramp {
        next: i16,
    }

    impl Opl3Backend for Ramp {
        fn reset(&mut self, _sample_rate: f32) {
            self.next = 0;
        }

        fn write_register(&mut self, _addr: u16, _value: u8) {}

        fn generate(&mut self) -> (i16, i16) {
            let out = (self.next, -self.next);
            self.next = self.next.saturating_add(16_384);
            out
        }
    }

    #[test]
    fn test_generate_into_converts_frames() {
        let mut chip = Ramp { next: 0 };
        let mut left = [1.0f32; 3];
        let mut right = [1.0f32; 3];
        chip.generate_into(&mut left, &mut right);

        approx::assert_abs_diff_eq!(left[0], 0.0);
        approx::assert_abs_diff_eq!(left[1], 0.5);
        approx::assert_abs_diff_eq!(right[1], -0.5);
        approx::assert_abs_diff_eq!(left[2], 1.0 - 1.0 / 32_768.0, epsilon = 1e-6);
    }

    #[test]
    fn test_generate_into_uses_shorter_buffer() {
        let mut chip = Ramp { next: 0 };
        let mut left = [9.0f32; 4];
        let mut right = [9.0f32; 2];
        chip.generate_into(&mut left, &mut right);

        assert_eq!(left[2], 9.0);
        assert_eq!(left[3], 9.0);
        assert_eq!(chip.next, i16::MAX);
    }

    #[test]
    fn test_mut_reference_forwards() {
        fn drive<B: Opl3Backend>(mut chip: B) -> (i16, i16) {
            chip.generate();
            chip.generate()
        }

        let mut chip = Ramp { next: 0 };
        assert_eq!(drive(&mut chip), (16_384, -16_384));
        assert_eq!(chip.next, i16::MAX);
    }
}
