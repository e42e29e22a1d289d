// Emulated Oregon Scientific V3 sensors: per-device schedules driving frame
// builds and a shared Manchester transmitter.
//
// The host calls `Station::tick` once a second and `Station::service` from its
// main loop or a low priority task. Nothing here touches pin or clock setup.
#![cfg_attr(not(any(test, feature = "use-std")), no_std)]

pub mod device;
pub mod scheduler;
pub mod station;

pub use device::Device;
pub use scheduler::{SchedulerState, TransmitScheduler};
pub use station::{ReadingSource, Station, Transmission};
