use core::fmt;

use embedded_hal::digital::v2::OutputPin;
use heapless::{consts::U4, Vec};
use manchester::{ManchesterEncoder, MicrosClock};
use oregon_protocol::{Frame, MeasurementEncoder, Reading};

use crate::device::Device;

/// Supplies the current reading for a sensor type when its frame is due.
pub trait ReadingSource {
    fn reading(&mut self, encoder: MeasurementEncoder) -> Reading;
}

impl<F> ReadingSource for F
where
    F: FnMut(MeasurementEncoder) -> Reading,
{
    fn reading(&mut self, encoder: MeasurementEncoder) -> Reading {
        self(encoder)
    }
}

/// Record of one frame that went out, for the host's debug console.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transmission {
    pub elapsed_secs: u32,
    pub device: &'static str,
    pub frame: Frame,
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}s] {} {}", self.elapsed_secs, self.device, self.frame)
    }
}

/// Several emulated sensors sharing one transmitter.
///
/// The station owns the only encoder, so frames go out strictly one after the
/// other, in device order, even when two devices fall due on the same second.
pub struct Station<PIN, CLOCK> {
    encoder: ManchesterEncoder<PIN, CLOCK>,
    devices: Vec<Device, U4>,
}

impl<PIN, CLOCK> Station<PIN, CLOCK>
where
    PIN: OutputPin,
    CLOCK: MicrosClock,
{
    pub fn new(encoder: ManchesterEncoder<PIN, CLOCK>) -> Self {
        Station {
            encoder,
            devices: Vec::new(),
        }
    }

    /// Hands the device back when all four slots are taken.
    pub fn add_device(&mut self, device: Device) -> Result<(), Device> {
        self.devices.push(device)
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut [Device] {
        &mut self.devices
    }

    pub fn release(self) -> ManchesterEncoder<PIN, CLOCK> {
        self.encoder
    }

    /// Call on every one second boundary.
    pub fn tick(&mut self) {
        for device in self.devices.iter_mut() {
            device.scheduler_mut().tick();
        }
    }

    /// Sends a frame for every device that is due and returns how many went
    /// out. `sink` sees each transmission after its last bit has left.
    ///
    /// Readings that do not fit their nibbles are dropped with a warning; the
    /// device waits for its next interval. A pin error aborts the remaining
    /// devices for this tick.
    pub fn service<S, F>(&mut self, source: &mut S, mut sink: F) -> Result<usize, PIN::Error>
    where
        S: ReadingSource + ?Sized,
        F: FnMut(&Transmission),
    {
        let mut sent = 0;
        for device in self.devices.iter_mut() {
            if !device.scheduler_mut().poll() {
                continue;
            }
            let name = device.profile().name;
            let reading = source.reading(device.profile().encoder);

            let frame = match reading.check() {
                Ok(()) => match device.frame(&reading) {
                    Ok(frame) => Some(frame),
                    Err(e) => {
                        log::warn!("{}: {}", name, e);
                        None
                    }
                },
                Err(e) => {
                    log::warn!("{}: dropping reading, {}", name, e);
                    None
                }
            };

            let frame = match frame {
                Some(frame) => frame,
                None => {
                    device.scheduler_mut().complete();
                    continue;
                }
            };

            self.encoder.set_timing(device.timing());
            let result = self.encoder.send(&frame);
            device.scheduler_mut().complete();
            result?;

            let transmission = Transmission {
                elapsed_secs: device.scheduler().elapsed_secs(),
                device: name,
                frame,
            };
            log::debug!("{}", transmission);
            sink(&transmission);
            sent += 1;
        }
        Ok(sent)
    }
}
