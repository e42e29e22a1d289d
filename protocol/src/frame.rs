use core::fmt;
use core::ops::Deref;

use crate::checksum;
use crate::error::{ConfigurationError, ReadingKindMismatch};
use crate::nibble;
use crate::profile::{DeviceProfile, MAX_SENSOR_NIBBLES};
use crate::reading::Reading;
use crate::rolling_code::RollingCode;

pub const MAX_FRAME_LEN: usize = 16;

const PREAMBLE_BYTES: usize = 3;
const SYNC_NIBBLE: u8 = 0xa;
const SYNC_INDEX: usize = 6;
const SENSOR_ID_INDEX: usize = 7;
const CHANNEL_INDEX: usize = 11;
const ROLLING_CODE_BYTE: usize = 6;
const BATTERY_FLAG_INDEX: usize = 14;
const DATA_INDEX: usize = 15;

const BATTERY_LOW: u8 = 0x8;
const MAX_CHANNEL: u8 = 15;

/// One complete frame, ready for the line encoder.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl Frame {
    fn zeroed(len: usize) -> Self {
        Frame {
            bytes: [0; MAX_FRAME_LEN],
            len,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Space separated, two digit upper case hex.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self)
    }
}

/// Builds frames for one validated profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameBuilder {
    profile: DeviceProfile,
}

impl FrameBuilder {
    pub fn new(profile: DeviceProfile) -> Result<Self, ConfigurationError> {
        profile.validate()?;
        Ok(FrameBuilder { profile })
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Builds a complete frame from scratch. The only failure is a reading
    /// that belongs to another sensor type.
    pub fn build(
        &self,
        rolling_code: RollingCode,
        battery_low: bool,
        reading: &Reading,
    ) -> Result<Frame, ReadingKindMismatch> {
        let profile = &self.profile;
        if reading.encoder() != profile.encoder {
            return Err(ReadingKindMismatch {
                expected: profile.encoder,
                found: reading.encoder(),
            });
        }

        let mut frame = Frame::zeroed(profile.frame_len as usize);
        let buf = frame.as_bytes_mut();

        for byte in &mut buf[..PREAMBLE_BYTES] {
            *byte = 0xff;
        }
        nibble::set(buf, SYNC_INDEX, SYNC_NIBBLE);
        for (i, id) in profile.sensor_id.iter().enumerate() {
            nibble::set(buf, SENSOR_ID_INDEX + i, *id);
        }
        nibble::set(buf, CHANNEL_INDEX, profile.channel.min(MAX_CHANNEL));
        buf[ROLLING_CODE_BYTE] = rolling_code.value();
        if battery_low {
            nibble::set(buf, BATTERY_FLAG_INDEX, BATTERY_LOW);
        }

        let mut data = [0u8; MAX_SENSOR_NIBBLES];
        let data = &mut data[..profile.sensor_nibbles()];
        profile.encoder.encode(reading, data);
        for (i, value) in data.iter().enumerate() {
            nibble::set(buf, DATA_INDEX + i, *value);
        }

        checksum::append(buf, profile.checksum_nibbles as usize);
        Ok(frame)
    }
}
