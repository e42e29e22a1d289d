// Frame layer of the Oregon Scientific V3 protocol, as spoken by the
// UVN800, WGR800, THGR810 and PCR800 sensors.
//
// A frame is addressed in nibbles. Nibble 0 is the high half of byte 0 and is
// the first one on air; the line encoder sends each nibble least significant
// bit first.
//
//   nibbles 0-5    preamble, all ones
//   nibble  6      sync, 0xA
//   nibbles 7-10   sensor id
//   nibble  11     channel
//   nibbles 12-13  rolling code (byte 6, verbatim)
//   nibble  14     battery flag, 0x8 when low
//   nibbles 15..   sensor data, decimal digits, least significant first
//   then           additive checksum and CRC-8, each low nibble first
#![cfg_attr(not(any(test, feature = "use-std")), no_std)]

pub mod checksum;
pub mod error;
pub mod frame;
pub mod nibble;
pub mod profile;
pub mod reading;
pub mod rolling_code;

pub use error::{ConfigurationError, DegenerateRollingCode, ReadingError, ReadingKindMismatch};
pub use frame::{Frame, FrameBuilder, MAX_FRAME_LEN};
pub use profile::{DeviceProfile, MeasurementEncoder, PROFILES};
pub use reading::Reading;
pub use rolling_code::RollingCode;

/// Half of one Manchester bit period at 1024 bit/s.
pub const HALF_PERIOD_US: u32 = 488;
pub const BIT_PERIOD_US: u32 = 2 * HALF_PERIOD_US;
