use rand_core::RngCore;

use crate::error::DegenerateRollingCode;

/// Identifies one emulated sensor to the base station. Drawn once at power-on
/// and kept until the next reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollingCode(u8);

impl RollingCode {
    pub fn new(code: u8) -> Result<Self, DegenerateRollingCode> {
        match code {
            0x00 | 0xff => Err(DegenerateRollingCode(code)),
            _ => Ok(RollingCode(code)),
        }
    }

    /// Draws uniformly from 0x01..=0xFE, re-drawing the reserved values.
    pub fn generate<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        loop {
            let mut byte = [0u8; 1];
            rng.fill_bytes(&mut byte);
            if let Ok(code) = RollingCode::new(byte[0]) {
                return code;
            }
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::{impls, Error};

    // Hands out the bytes of `script` in order.
    struct Scripted {
        script: Vec<u8>,
        position: usize,
    }

    impl RngCore for Scripted {
        fn next_u32(&mut self) -> u32 {
            impls::next_u32_via_fill(self)
        }

        fn next_u64(&mut self) -> u64 {
            impls::next_u64_via_fill(self)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for byte in dest {
                *byte = self.script[self.position % self.script.len()];
                self.position += 1;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn reserved_codes_are_rejected() {
        assert_eq!(RollingCode::new(0x00), Err(DegenerateRollingCode(0x00)));
        assert_eq!(RollingCode::new(0xff), Err(DegenerateRollingCode(0xff)));
        assert_eq!(RollingCode::new(0x12).map(RollingCode::value), Ok(0x12));
    }

    #[test]
    fn generate_redraws_reserved_codes() {
        let mut rng = Scripted {
            script: vec![0x00, 0xff, 0x00, 0x5a],
            position: 0,
        };
        assert_eq!(RollingCode::generate(&mut rng).value(), 0x5a);
        assert_eq!(rng.position, 4);
    }
}
