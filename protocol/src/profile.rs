// Per-sensor constants. Sensor ids, nibble counts and the fixed nibbles come
// from captures of the real sensors; intervals are deliberately not round so
// that several emulated sensors on one channel rarely collide.

use crate::checksum::CHECKSUM_START;
use crate::error::ConfigurationError;
use crate::reading::Reading;
use crate::{BIT_PERIOD_US, HALF_PERIOD_US, MAX_FRAME_LEN};

/// Sensor id, channel, rolling code and battery flag.
pub const HEADER_NIBBLES: usize = 8;
pub const CHECKSUM_NIBBLES: usize = 4;
pub const MAX_SENSOR_NIBBLES: usize = 10;

// One byte the base station requires after the direction; meaning unknown.
const ANEMOMETER_FIXED: [u8; 2] = [0xc, 0x0];

/// Packs a reading into the sensor specific nibbles of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasurementEncoder {
    Uv,
    Anemometer,
    TempHumidity,
    RainGauge,
}

impl MeasurementEncoder {
    pub const fn nibble_count(self) -> usize {
        match self {
            MeasurementEncoder::Uv => 5,
            MeasurementEncoder::Anemometer => 9,
            MeasurementEncoder::TempHumidity => 7,
            MeasurementEncoder::RainGauge => 10,
        }
    }

    /// Writes the sensor nibbles for `reading` into `out`, which must hold
    /// `nibble_count()` entries. Every entry is overwritten; unused nibbles
    /// come out zero. Fields too large for their digits saturate.
    pub fn encode(self, reading: &Reading, out: &mut [u8]) {
        for nibble in out.iter_mut() {
            *nibble = 0;
        }
        match *reading {
            Reading::Uv { index } => {
                decimal(&mut out[0..2], index as u32);
            }
            Reading::Wind {
                average_mps,
                gust_mps,
                direction_deg,
            } => {
                out[0] = direction_sector(direction_deg);
                out[1..3].copy_from_slice(&ANEMOMETER_FIXED);
                decimal(&mut out[3..6], fixed_point(gust_mps, 10.0));
                decimal(&mut out[6..9], fixed_point(average_mps, 10.0));
            }
            Reading::TemperatureHumidity {
                celsius,
                humidity_pct,
            } => {
                let magnitude = if celsius < 0.0 { -celsius } else { celsius };
                let tenths = fixed_point(magnitude, 10.0);
                decimal(&mut out[0..3], tenths);
                // no sign on a reading that rounds to zero
                out[3] = if celsius < 0.0 && tenths > 0 { 0x8 } else { 0x0 };
                decimal(&mut out[4..6], humidity_pct as u32);
            }
            Reading::Rain {
                rate_in_per_hr,
                total_in,
            } => {
                decimal(&mut out[0..4], fixed_point(rate_in_per_hr, 100.0));
                decimal(&mut out[4..10], fixed_point(total_in, 1000.0));
            }
        }
    }
}

/// Decimal digits of `value`, least significant first, saturating at the
/// largest value the slice can hold.
fn decimal(out: &mut [u8], value: u32) {
    let max = 10u32.pow(out.len() as u32) - 1;
    let value = value.min(max);
    for (k, digit) in out.iter_mut().enumerate() {
        *digit = (value / 10u32.pow(k as u32) % 10) as u8;
    }
}

/// Rounds a non-negative value to a fixed point integer. Negative and NaN
/// values become zero.
fn fixed_point(value: f32, scale: f32) -> u32 {
    if value > 0.0 {
        (value * scale + 0.5) as u32
    } else {
        0
    }
}

/// Compass sector of 22.5 degrees, 0 = north.
fn direction_sector(degrees: f32) -> u8 {
    if degrees.is_nan() {
        return 0;
    }
    let mut degrees = degrees % 360.0;
    if degrees < 0.0 {
        degrees += 360.0;
    }
    ((degrees / 22.5 + 0.5) as u32 % 16) as u8
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub sensor_id: [u8; 4],
    pub channel: u8,
    /// Nibbles covered by both checksums: header plus sensor nibbles.
    pub checksum_nibbles: u8,
    pub frame_len: u8,
    pub interval_secs: u32,
    /// Scales the half period to get the first Manchester phase.
    pub pulse_tuning: f32,
    /// Subtracted from the first phase to absorb pin-write latency.
    pub pulse_shortening_us: u32,
    pub encoder: MeasurementEncoder,
}

impl DeviceProfile {
    pub fn sensor_nibbles(&self) -> usize {
        (self.checksum_nibbles as usize).saturating_sub(HEADER_NIBBLES)
    }

    /// Duration of the first phase of every bit, before the mid-bit edge.
    pub fn on_phase_us(&self) -> i32 {
        (HALF_PERIOD_US as f32 * self.pulse_tuning) as i32 - self.pulse_shortening_us as i32
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let checksum_nibbles = self.checksum_nibbles as usize;
        if checksum_nibbles < HEADER_NIBBLES {
            return Err(ConfigurationError::HeaderNotCovered {
                checksum_nibbles: self.checksum_nibbles,
            });
        }
        if self.sensor_nibbles() != self.encoder.nibble_count() {
            return Err(ConfigurationError::NibbleCountMismatch {
                declared: self.sensor_nibbles() as u8,
                encoder: self.encoder.nibble_count() as u8,
            });
        }
        if self.frame_len as usize > MAX_FRAME_LEN {
            return Err(ConfigurationError::FrameTooLong {
                frame_len: self.frame_len,
            });
        }
        let required = CHECKSUM_START + checksum_nibbles + CHECKSUM_NIBBLES;
        if required > 2 * self.frame_len as usize {
            return Err(ConfigurationError::FrameTooShort {
                required_nibbles: required as u8,
                frame_len: self.frame_len,
            });
        }
        if self.interval_secs == 0 {
            return Err(ConfigurationError::ZeroInterval);
        }
        let on_us = self.on_phase_us();
        if on_us <= 0 || on_us >= BIT_PERIOD_US as i32 {
            return Err(ConfigurationError::PulseTiming { on_us });
        }
        Ok(())
    }
}

pub const UVN800: DeviceProfile = DeviceProfile {
    name: "UVN800",
    sensor_id: [0xd, 0x8, 0x7, 0x4],
    channel: 1,
    checksum_nibbles: 13,
    frame_len: 12,
    interval_secs: 73,
    pulse_tuning: 1.0,
    pulse_shortening_us: 24,
    encoder: MeasurementEncoder::Uv,
};

pub const WGR800: DeviceProfile = DeviceProfile {
    name: "WGR800",
    sensor_id: [0x1, 0x9, 0x8, 0x4],
    channel: 0,
    checksum_nibbles: 17,
    frame_len: 14,
    interval_secs: 14,
    pulse_tuning: 1.02,
    pulse_shortening_us: 36,
    encoder: MeasurementEncoder::Anemometer,
};

pub const THGR810: DeviceProfile = DeviceProfile {
    name: "THGR810",
    sensor_id: [0xf, 0x8, 0x2, 0x4],
    channel: 1,
    checksum_nibbles: 15,
    frame_len: 13,
    interval_secs: 53,
    pulse_tuning: 1.0,
    pulse_shortening_us: 20,
    encoder: MeasurementEncoder::TempHumidity,
};

pub const PCR800: DeviceProfile = DeviceProfile {
    name: "PCR800",
    sensor_id: [0x2, 0x9, 0x1, 0x4],
    channel: 0,
    checksum_nibbles: 18,
    frame_len: 15,
    interval_secs: 47,
    pulse_tuning: 0.98,
    pulse_shortening_us: 16,
    encoder: MeasurementEncoder::RainGauge,
};

pub const PROFILES: [DeviceProfile; 4] = [UVN800, WGR800, THGR810, PCR800];

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(reading: Reading) -> Vec<u8> {
        let encoder = reading.encoder();
        let mut out = vec![0u8; encoder.nibble_count()];
        encoder.encode(&reading, &mut out);
        out
    }

    #[test]
    fn builtin_profiles_are_valid() {
        for profile in PROFILES.iter() {
            assert_eq!(profile.validate(), Ok(()), "{}", profile.name);
            assert!((12..=15).contains(&profile.frame_len));
        }
    }

    #[test]
    fn validate_catches_bad_profiles() {
        let short = DeviceProfile {
            frame_len: 11,
            ..UVN800
        };
        assert_eq!(
            short.validate(),
            Err(ConfigurationError::FrameTooShort {
                required_nibbles: 24,
                frame_len: 11
            })
        );

        let mismatch = DeviceProfile {
            checksum_nibbles: 14,
            ..UVN800
        };
        assert_eq!(
            mismatch.validate(),
            Err(ConfigurationError::NibbleCountMismatch {
                declared: 6,
                encoder: 5
            })
        );

        let headless = DeviceProfile {
            checksum_nibbles: 6,
            ..UVN800
        };
        assert_eq!(
            headless.validate(),
            Err(ConfigurationError::HeaderNotCovered { checksum_nibbles: 6 })
        );

        let long = DeviceProfile {
            frame_len: 17,
            ..UVN800
        };
        assert_eq!(long.validate(), Err(ConfigurationError::FrameTooLong { frame_len: 17 }));

        let idle = DeviceProfile {
            interval_secs: 0,
            ..UVN800
        };
        assert_eq!(idle.validate(), Err(ConfigurationError::ZeroInterval));

        let late = DeviceProfile {
            pulse_tuning: 2.0,
            pulse_shortening_us: 0,
            ..UVN800
        };
        assert_eq!(late.validate(), Err(ConfigurationError::PulseTiming { on_us: 976 }));
    }

    #[test]
    fn uv_digits() {
        assert_eq!(encode(Reading::Uv { index: 7 }), vec![7, 0, 0, 0, 0]);
        assert_eq!(encode(Reading::Uv { index: 12 }), vec![2, 1, 0, 0, 0]);
    }

    #[test]
    fn wind_digits_keep_fixed_nibbles() {
        let nibbles = encode(Reading::Wind {
            average_mps: 3.4,
            gust_mps: 12.7,
            direction_deg: 90.0,
        });
        assert_eq!(nibbles, vec![4, 0xc, 0, 7, 2, 1, 4, 3, 0]);

        let north = encode(Reading::Wind {
            average_mps: 0.0,
            gust_mps: 0.0,
            direction_deg: -5.0,
        });
        assert_eq!(north[0], 0);
    }

    #[test]
    fn temperature_sign_is_separate_from_digits() {
        let warm = encode(Reading::TemperatureHumidity {
            celsius: 21.4,
            humidity_pct: 56,
        });
        assert_eq!(warm, vec![4, 1, 2, 0, 6, 5, 0]);

        let cold = encode(Reading::TemperatureHumidity {
            celsius: -21.4,
            humidity_pct: 56,
        });
        assert_eq!(cold, vec![4, 1, 2, 8, 6, 5, 0]);

        let barely = encode(Reading::TemperatureHumidity {
            celsius: -0.04,
            humidity_pct: 56,
        });
        assert_eq!(barely, vec![0, 0, 0, 0, 6, 5, 0]);

        let just_below = encode(Reading::TemperatureHumidity {
            celsius: -0.06,
            humidity_pct: 56,
        });
        assert_eq!(just_below[..4], [1, 0, 0, 8]);
    }

    #[test]
    fn encode_overwrites_every_nibble() {
        let expected: [(MeasurementEncoder, &[u8]); 4] = [
            (MeasurementEncoder::Uv, &[0, 0, 0, 0, 0]),
            (MeasurementEncoder::Anemometer, &[0, 0xc, 0, 0, 0, 0, 0, 0, 0]),
            (MeasurementEncoder::TempHumidity, &[0, 0, 0, 0, 0, 0, 0]),
            (MeasurementEncoder::RainGauge, &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        ];
        for &(encoder, zeros) in expected.iter() {
            let mut out = vec![0xfu8; encoder.nibble_count()];
            encoder.encode(&Reading::zero(encoder), &mut out);
            assert_eq!(out, zeros, "{:?}", encoder);
        }
        let mut dirty = vec![0xfu8; 5];
        MeasurementEncoder::Uv.encode(&Reading::Uv { index: 3 }, &mut dirty);
        assert_eq!(dirty, vec![3, 0, 0, 0, 0]);
    }

    #[test]
    fn rain_digits_and_saturation() {
        let nibbles = encode(Reading::Rain {
            rate_in_per_hr: 0.25,
            total_in: 12.345,
        });
        assert_eq!(nibbles, vec![5, 2, 0, 0, 5, 4, 3, 2, 1, 0]);

        let flooded = encode(Reading::Rain {
            rate_in_per_hr: 500.0,
            total_in: -1.0,
        });
        assert_eq!(flooded, vec![9, 9, 9, 9, 0, 0, 0, 0, 0, 0]);
    }
}
