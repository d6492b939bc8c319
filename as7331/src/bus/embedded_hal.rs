use embedded_hal::i2c::{Error as _, I2c, SevenBitAddress};

use super::RegisterBus;
use crate::error::{Error, Result};
use crate::sensor::As7331;

/// Default 7-bit bus address of the AS7331.
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x74;

/// Adapts any `embedded-hal` I²C master into a [`RegisterBus`].
pub struct I2cAdapter<I: I2c> {
    i2c: I,
    address: SevenBitAddress,
}

impl<I: I2c> I2cAdapter<I> {
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I, address: SevenBitAddress) -> Self {
        I2cAdapter { i2c, address }
    }

    /// Builds a measurement session on top of this adapter.
    pub fn open_sensor(self) -> As7331<Self> {
        As7331::new(self)
    }

    /// Releases the underlying I²C bus.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for I2cAdapter<I> {
    fn write_register(&mut self, address: u8, byte: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[address, byte])
            .map_err(|e| Error::Transport(e.kind()))
    }

    fn read_block(&mut self, address: u8, len: usize) -> Result<Vec<u8>> {
        let mut block = vec![0u8; len];
        self.i2c
            .write_read(self.address, &[address], &mut block)
            .map_err(|e| Error::Transport(e.kind()))?;
        Ok(block)
    }

    fn read_word(&mut self, address: u8) -> Result<u16> {
        let mut word = [0u8; 2];
        self.i2c
            .write_read(self.address, &[address], &mut word)
            .map_err(|e| Error::Transport(e.kind()))?;
        Ok(u16::from_le_bytes(word))
    }
}
