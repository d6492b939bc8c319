//! AS7331 UV sensor driver with closed-loop auto-ranging.
//!
//! The AS7331 digitizes UVA/UVB (and optionally UVC) photocurrent behind a
//! programmable gain and integration time. A fixed setting only covers a
//! slice of the sensor's dynamic range, so [`As7331::measure`] runs a bounded
//! adjustment loop that keeps the raw counts inside a usable window before
//! converting them to µW/cm².
//!
//! Hardware access goes through the [`RegisterBus`] trait; any `embedded-hal`
//! I²C master fits via [`I2cAdapter`].

pub mod bus;
pub mod calibration;
pub mod config;
pub mod error;
pub mod flags;
pub mod ranging;
pub mod registers;
pub mod sample;
pub mod sensor;

pub use bus::{I2cAdapter, RegisterBus, DEFAULT_ADDRESS};
pub use calibration::{Calibration, ChannelCalibration};
pub use config::{decode_config, encode_config, Gain, IntegrationTime};
pub use error::{Error, Result};
pub use flags::StatusFlags;
pub use ranging::RangingPolicy;
pub use sample::RawSample;
pub use sensor::{As7331, MeasurementResult, SensorConfig};
