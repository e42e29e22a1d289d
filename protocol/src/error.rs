use core::fmt;

use crate::profile::MeasurementEncoder;

/// A device profile that cannot produce a valid frame. Detected once, before
/// anything is transmitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The checksum range must at least cover id, channel, rolling code and flag.
    HeaderNotCovered { checksum_nibbles: u8 },
    /// The checksum range and the measurement encoder disagree on the number
    /// of sensor nibbles.
    NibbleCountMismatch { declared: u8, encoder: u8 },
    /// Preamble, payload and checksums need more nibbles than the frame has.
    FrameTooShort { required_nibbles: u8, frame_len: u8 },
    FrameTooLong { frame_len: u8 },
    ZeroInterval,
    /// The first Manchester phase must fall strictly inside one bit period.
    PulseTiming { on_us: i32 },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigurationError::HeaderNotCovered { checksum_nibbles } => write!(
                f,
                "checksum covers {} nibbles, fewer than the fixed header",
                checksum_nibbles
            ),
            ConfigurationError::NibbleCountMismatch { declared, encoder } => write!(
                f,
                "profile declares {} sensor nibbles but its encoder writes {}",
                declared, encoder
            ),
            ConfigurationError::FrameTooShort { required_nibbles, frame_len } => write!(
                f,
                "frame needs {} nibbles but is only {} bytes long",
                required_nibbles, frame_len
            ),
            ConfigurationError::FrameTooLong { frame_len } => {
                write!(f, "frame length {} exceeds {} bytes", frame_len, crate::MAX_FRAME_LEN)
            }
            ConfigurationError::ZeroInterval => f.write_str("transmit interval is zero"),
            ConfigurationError::PulseTiming { on_us } => write!(
                f,
                "first phase of {}us does not fit a {}us bit period",
                on_us,
                crate::BIT_PERIOD_US
            ),
        }
    }
}

/// Rolling codes 0x00 and 0xFF are reserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DegenerateRollingCode(pub u8);

impl fmt::Display for DegenerateRollingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rolling code {:#04x} is reserved", self.0)
    }
}

/// A reading whose value cannot be represented by its decimal nibbles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadingError {
    OutOfRange { field: &'static str },
    NotANumber { field: &'static str },
}

impl fmt::Display for ReadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingError::OutOfRange { field } => write!(f, "{} is out of range", field),
            ReadingError::NotANumber { field } => write!(f, "{} is not a number", field),
        }
    }
}

/// The reading handed to a frame builder belongs to another sensor type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadingKindMismatch {
    pub expected: MeasurementEncoder,
    pub found: MeasurementEncoder,
}

impl fmt::Display for ReadingKindMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a {:?} reading, got {:?}", self.expected, self.found)
    }
}
