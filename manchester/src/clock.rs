use core::convert::Infallible;

/// A free running microsecond counter. It wraps at `u32::MAX`; deadlines are
/// compared with wrapping arithmetic, so they must lie within ~35 minutes of
/// `now()`.
pub trait MicrosClock {
    fn now(&mut self) -> u32;

    /// Completes once `now()` has reached `deadline`. The default polls the
    /// counter; platforms with a better sleep override it.
    fn wait_until(&mut self, deadline: u32) -> nb::Result<(), Infallible> {
        if reached(self.now(), deadline) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

pub fn reached(now: u32, deadline: u32) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}

#[cfg(feature = "use-std")]
pub use self::hosted::StdClock;

#[cfg(feature = "use-std")]
mod hosted {
    use super::{reached, MicrosClock};
    use core::convert::Infallible;
    use std::thread;
    use std::time::{Duration, Instant};

    // Below this the OS scheduler is too coarse, so spin instead.
    const SPIN_US: u32 = 2_000;

    /// Clock for hosted builds: sleeps while the deadline is far away and
    /// spins through the last couple of milliseconds.
    #[derive(Debug)]
    pub struct StdClock {
        origin: Instant,
    }

    impl StdClock {
        pub fn new() -> Self {
            StdClock {
                origin: Instant::now(),
            }
        }
    }

    impl Default for StdClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MicrosClock for StdClock {
        fn now(&mut self) -> u32 {
            self.origin.elapsed().as_micros() as u32
        }

        fn wait_until(&mut self, deadline: u32) -> nb::Result<(), Infallible> {
            let now = self.now();
            if reached(now, deadline) {
                return Ok(());
            }
            let remaining = deadline.wrapping_sub(now);
            if remaining > SPIN_US {
                thread::sleep(Duration::from_micros((remaining - SPIN_US) as u64));
            }
            Err(nb::Error::WouldBlock)
        }
    }
}
