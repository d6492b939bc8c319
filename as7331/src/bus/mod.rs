//! Register transport boundary.

pub(crate) mod embedded_hal;

pub use self::embedded_hal::{I2cAdapter, DEFAULT_ADDRESS};

use crate::error::Result;

/// Byte-level access to the sensor's register file.
///
/// Implementations own the device address; the core never sees it. Every
/// method maps a bus NACK or timeout to a transport error, which the
/// measurement loop treats as retryable.
#[cfg_attr(test, mockall::automock)]
pub trait RegisterBus {
    fn write_register(&mut self, address: u8, byte: u8) -> Result<()>;

    /// Reads `len` consecutive bytes starting at `address`.
    fn read_block(&mut self, address: u8, len: usize) -> Result<Vec<u8>>;

    /// Reads a 16-bit little-endian word at `address`.
    fn read_word(&mut self, address: u8) -> Result<u16>;
}
