use crate::error::ReadingError;
use crate::profile::MeasurementEncoder;

/// A snapshot of what a sensor measures, taken when its frame is due.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reading {
    Uv {
        index: u8,
    },
    Wind {
        average_mps: f32,
        gust_mps: f32,
        direction_deg: f32,
    },
    TemperatureHumidity {
        celsius: f32,
        humidity_pct: u8,
    },
    Rain {
        rate_in_per_hr: f32,
        total_in: f32,
    },
}

impl Reading {
    /// The encoder that knows how to pack this reading.
    pub fn encoder(&self) -> MeasurementEncoder {
        match self {
            Reading::Uv { .. } => MeasurementEncoder::Uv,
            Reading::Wind { .. } => MeasurementEncoder::Anemometer,
            Reading::TemperatureHumidity { .. } => MeasurementEncoder::TempHumidity,
            Reading::Rain { .. } => MeasurementEncoder::RainGauge,
        }
    }

    /// An all-zero reading of the given kind.
    pub fn zero(encoder: MeasurementEncoder) -> Reading {
        match encoder {
            MeasurementEncoder::Uv => Reading::Uv { index: 0 },
            MeasurementEncoder::Anemometer => Reading::Wind {
                average_mps: 0.0,
                gust_mps: 0.0,
                direction_deg: 0.0,
            },
            MeasurementEncoder::TempHumidity => Reading::TemperatureHumidity {
                celsius: 0.0,
                humidity_pct: 0,
            },
            MeasurementEncoder::RainGauge => Reading::Rain {
                rate_in_per_hr: 0.0,
                total_in: 0.0,
            },
        }
    }

    /// Checks that every field fits its decimal nibbles. The encoders saturate
    /// whatever does not, so callers that care reject the reading here.
    pub fn check(&self) -> Result<(), ReadingError> {
        match *self {
            Reading::Uv { index } => within("uv index", index as f32, 0.0, 15.0),
            Reading::Wind {
                average_mps,
                gust_mps,
                direction_deg,
            } => {
                within("average speed", average_mps, 0.0, 99.9)?;
                within("gust speed", gust_mps, 0.0, 99.9)?;
                within("direction", direction_deg, -360.0, 360.0)
            }
            Reading::TemperatureHumidity {
                celsius,
                humidity_pct,
            } => {
                within("temperature", celsius, -99.9, 99.9)?;
                within("humidity", humidity_pct as f32, 0.0, 99.0)
            }
            Reading::Rain {
                rate_in_per_hr,
                total_in,
            } => {
                within("rain rate", rate_in_per_hr, 0.0, 99.99)?;
                within("rain total", total_in, 0.0, 999.999)
            }
        }
    }
}

fn within(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ReadingError> {
    if value.is_nan() {
        Err(ReadingError::NotANumber { field })
    } else if value < min || value > max {
        Err(ReadingError::OutOfRange { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_rejects_what_nibbles_cannot_hold() {
        assert_eq!(Reading::Uv { index: 15 }.check(), Ok(()));
        assert_eq!(
            Reading::Uv { index: 16 }.check(),
            Err(ReadingError::OutOfRange { field: "uv index" })
        );
        assert_eq!(
            Reading::Rain {
                rate_in_per_hr: -0.1,
                total_in: 1.0
            }
            .check(),
            Err(ReadingError::OutOfRange { field: "rain rate" })
        );
        assert_eq!(
            Reading::TemperatureHumidity {
                celsius: f32::NAN,
                humidity_pct: 50
            }
            .check(),
            Err(ReadingError::NotANumber { field: "temperature" })
        );
        assert_eq!(
            Reading::TemperatureHumidity {
                celsius: -12.5,
                humidity_pct: 100
            }
            .check(),
            Err(ReadingError::OutOfRange { field: "humidity" })
        );
    }

    #[test]
    fn zero_matches_encoder() {
        for encoder in [
            MeasurementEncoder::Uv,
            MeasurementEncoder::Anemometer,
            MeasurementEncoder::TempHumidity,
            MeasurementEncoder::RainGauge,
        ]
        .iter()
        {
            assert_eq!(Reading::zero(*encoder).encoder(), *encoder);
            assert_eq!(Reading::zero(*encoder).check(), Ok(()));
        }
    }
}
