use manchester::PulseTiming;
use oregon_protocol::{
    ConfigurationError, DeviceProfile, Frame, FrameBuilder, Reading, ReadingKindMismatch,
    RollingCode, HALF_PERIOD_US,
};
use rand_core::RngCore;

use crate::scheduler::TransmitScheduler;

/// One emulated sensor: a validated profile, the identity it picked at
/// power-on and its own transmit schedule.
#[derive(Clone, Debug)]
pub struct Device {
    builder: FrameBuilder,
    rolling_code: RollingCode,
    battery_low: bool,
    timing: PulseTiming,
    scheduler: TransmitScheduler,
}

impl Device {
    pub fn new(profile: DeviceProfile, rolling_code: RollingCode) -> Result<Self, ConfigurationError> {
        let builder = FrameBuilder::new(profile)?;
        let timing = PulseTiming::tuned(HALF_PERIOD_US, profile.pulse_tuning, profile.pulse_shortening_us)
            .map_err(|e| ConfigurationError::PulseTiming { on_us: e.on_us })?;
        Ok(Device {
            builder,
            rolling_code,
            battery_low: false,
            timing,
            scheduler: TransmitScheduler::new(profile.interval_secs),
        })
    }

    /// Validates the profile and draws a fresh rolling code, as the real
    /// sensor does when its batteries go in.
    pub fn power_on<R: RngCore + ?Sized>(profile: DeviceProfile, rng: &mut R) -> Result<Self, ConfigurationError> {
        let device = Device::new(profile, RollingCode::generate(rng))?;
        log::info!(
            "{} on channel {} with rolling code {:02X}",
            profile.name,
            profile.channel,
            device.rolling_code.value()
        );
        Ok(device)
    }

    /// Replaces the profile's pulse timing, for transmitters tuned on the bench.
    pub fn with_timing(mut self, timing: PulseTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn profile(&self) -> &DeviceProfile {
        self.builder.profile()
    }

    pub fn rolling_code(&self) -> RollingCode {
        self.rolling_code
    }

    pub fn battery_low(&self) -> bool {
        self.battery_low
    }

    pub fn set_battery_low(&mut self, low: bool) {
        self.battery_low = low;
    }

    pub fn timing(&self) -> PulseTiming {
        self.timing
    }

    pub fn scheduler(&self) -> &TransmitScheduler {
        &self.scheduler
    }

    pub(crate) fn scheduler_mut(&mut self) -> &mut TransmitScheduler {
        &mut self.scheduler
    }

    pub fn frame(&self, reading: &Reading) -> Result<Frame, ReadingKindMismatch> {
        self.builder.build(self.rolling_code, self.battery_low, reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oregon_protocol::profile::{THGR810, UVN800};

    #[test]
    fn bad_profile_fails_before_anything_is_sent() {
        let broken = DeviceProfile {
            frame_len: 10,
            ..THGR810
        };
        let code = RollingCode::new(0x42).unwrap();
        assert!(matches!(
            Device::new(broken, code),
            Err(ConfigurationError::FrameTooShort { .. })
        ));
    }

    #[test]
    fn timing_comes_from_profile() {
        let device = Device::new(UVN800, RollingCode::new(0x42).unwrap()).unwrap();
        assert_eq!(device.timing().on_us(), 488 - 24);
        assert_eq!(device.scheduler().interval_secs(), 73);

        let bench = PulseTiming::new(HALF_PERIOD_US, 450).unwrap();
        assert_eq!(device.with_timing(bench).timing().on_us(), 450);
    }

    #[test]
    fn battery_flag_reaches_the_frame() {
        let mut device = Device::new(UVN800, RollingCode::new(0x12).unwrap()).unwrap();
        let reading = Reading::Uv { index: 3 };
        assert_eq!(device.frame(&reading).unwrap()[7], 0x03);
        device.set_battery_low(true);
        assert_eq!(device.frame(&reading).unwrap()[7], 0x83);
    }
}
