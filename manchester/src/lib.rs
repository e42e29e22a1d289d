// Manchester line encoder for on/off keyed transmitters, as expected by
// Oregon Scientific V3 receivers.
//
// Every bit occupies one bit period. A 1 is sent as HIGH then LOW, a 0 as LOW
// then HIGH. Within a byte the bits go out in the order 4, 5, 6, 7, 0, 1, 2, 3,
// i.e. high nibble first, each nibble least significant bit first.
//
// The receiver recovers its clock from the mid-bit edges, so the encoder never
// sleeps for a fixed delay: it keeps an absolute deadline that advances by
// exactly one bit period per bit and only waits for that deadline. Time spent
// toggling the pin is absorbed instead of accumulating over the frame.
#![cfg_attr(not(any(test, feature = "use-std")), no_std)]

pub mod clock;

use core::fmt;

use embedded_hal::digital::v2::OutputPin;

pub use clock::MicrosClock;
#[cfg(feature = "use-std")]
pub use clock::StdClock;

/// Bit transmission order within one byte.
pub const BIT_ORDER: [u8; 8] = [4, 5, 6, 7, 0, 1, 2, 3];

fn bit_is_set(byte: u8, bit: u8) -> bool {
    byte & (1 << bit) != 0
}

/// Where the mid-bit edge falls.
///
/// `on_us` is the length of the first phase of each bit. The nominal value is
/// the half period, but the pin write latency of a particular board and
/// transmitter pulls the edge late, so it is tuned per deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseTiming {
    half_period_us: u32,
    on_us: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingError {
    pub on_us: i32,
    pub bit_period_us: u32,
}

impl fmt::Display for TimingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "first phase of {}us does not fit a {}us bit period",
            self.on_us, self.bit_period_us
        )
    }
}

impl PulseTiming {
    pub fn new(half_period_us: u32, on_us: u32) -> Result<Self, TimingError> {
        if on_us == 0 || on_us >= 2 * half_period_us {
            return Err(TimingError {
                on_us: on_us as i32,
                bit_period_us: 2 * half_period_us,
            });
        }
        Ok(PulseTiming {
            half_period_us,
            on_us,
        })
    }

    /// Mid-bit edge exactly half way through the bit.
    pub fn nominal(half_period_us: u32) -> Self {
        let half_period_us = half_period_us.max(1);
        PulseTiming {
            half_period_us,
            on_us: half_period_us,
        }
    }

    /// `half_period_us * tuning - shortening_us`
    pub fn tuned(half_period_us: u32, tuning: f32, shortening_us: u32) -> Result<Self, TimingError> {
        let on_us = (half_period_us as f32 * tuning) as i32 - shortening_us as i32;
        if on_us <= 0 {
            return Err(TimingError {
                on_us,
                bit_period_us: 2 * half_period_us,
            });
        }
        Self::new(half_period_us, on_us as u32)
    }

    pub fn half_period_us(&self) -> u32 {
        self.half_period_us
    }

    pub fn on_us(&self) -> u32 {
        self.on_us
    }

    pub fn bit_period_us(&self) -> u32 {
        2 * self.half_period_us
    }
}

pub struct ManchesterEncoder<PIN, CLOCK> {
    pin: PIN,
    clock: CLOCK,
    timing: PulseTiming,
}

impl<PIN, CLOCK> ManchesterEncoder<PIN, CLOCK>
where
    PIN: OutputPin,
    CLOCK: MicrosClock,
{
    pub fn new(pin: PIN, clock: CLOCK, timing: PulseTiming) -> Self {
        Self { pin, clock, timing }
    }

    pub fn timing(&self) -> PulseTiming {
        self.timing
    }

    pub fn set_timing(&mut self, timing: PulseTiming) {
        self.timing = timing;
    }

    pub fn clock(&mut self) -> &mut CLOCK {
        &mut self.clock
    }

    pub fn release(self) -> (PIN, CLOCK) {
        (self.pin, self.clock)
    }

    /// Sends `bytes` and leaves the line LOW. Runs to completion; nothing in
    /// here may log or otherwise stall, every stall shows up as jitter on air.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), PIN::Error> {
        self.pin.set_low()?;
        let mut deadline = self.clock.now();
        let mut last = false;

        for &byte in bytes {
            for &bit in BIT_ORDER.iter() {
                last = bit_is_set(byte, bit);
                self.send_bit(last, &mut deadline)?;
            }
        }

        // A trailing 1 ends on a falling edge; give the receiver one more
        // half period to sample it.
        if last {
            self.wait(deadline.wrapping_add(self.timing.half_period_us));
        }
        self.pin.set_low()
    }

    fn send_bit(&mut self, one: bool, deadline: &mut u32) -> Result<(), PIN::Error> {
        let start = *deadline;
        if one {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.wait(start.wrapping_add(self.timing.on_us));
        if one {
            self.pin.set_low()?;
        } else {
            self.pin.set_high()?;
        }
        *deadline = start.wrapping_add(self.timing.bit_period_us());
        self.wait(*deadline);
        Ok(())
    }

    fn wait(&mut self, deadline: u32) {
        nb::block!(self.clock.wait_until(deadline)).unwrap_or_else(|never| match never {})
    }
}
