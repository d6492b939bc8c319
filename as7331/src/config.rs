//! Gain and integration time settings and their CREG1 packing.

use core::fmt;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::error::{Error, Result};
use crate::registers::register;

/// Analog gain, 1x up to 2048x in powers of two.
///
/// The discriminant is the logical index: higher index, higher gain. The
/// hardware register orders codes the other way around (code 0 = 2048x),
/// see [`Gain::reg_code`].
#[derive(
    ToPrimitive, FromPrimitive, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default,
)]
pub enum Gain {
    #[default]
    X1 = 0,
    X2,
    X4,
    X8,
    X16,
    X32,
    X64,
    X128,
    X256,
    X512,
    X1024,
    X2048,
}

impl Gain {
    pub const MAX_INDEX: u8 = 11;

    pub fn from_index(index: u8) -> Option<Self> {
        FromPrimitive::from_u8(index)
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Amplification multiplier, `2^index`.
    pub fn multiplier(self) -> u16 {
        1 << self.index()
    }

    /// CREG1 gain field. Hardware code 0 selects the highest gain, so the
    /// logical index is complemented against [`Self::MAX_INDEX`].
    pub(crate) fn reg_code(self) -> u8 {
        Self::MAX_INDEX - self.index()
    }

    pub(crate) fn from_reg_code(code: u8) -> Result<Self> {
        if code > Self::MAX_INDEX {
            return Err(Error::InvalidConfig);
        }
        Self::from_index(Self::MAX_INDEX - code).ok_or(Error::InvalidConfig)
    }

    pub fn is_min(self) -> bool {
        self.index() == 0
    }

    pub fn is_max(self) -> bool {
        self.index() == Self::MAX_INDEX
    }

    /// Steps toward 1x, saturating at the bottom of the table.
    pub(crate) fn lowered(self, steps: u8) -> Self {
        Self::from_index(self.index().saturating_sub(steps)).unwrap_or(Gain::X1)
    }

    /// Steps toward 2048x, saturating at the top of the table.
    pub(crate) fn raised(self, steps: u8) -> Self {
        Self::from_index((self.index() + steps).min(Self::MAX_INDEX)).unwrap_or(Gain::X2048)
    }
}

impl fmt::Display for Gain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

/// Exposure duration per conversion, `2^code` milliseconds.
#[derive(
    ToPrimitive, FromPrimitive, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default,
)]
pub enum IntegrationTime {
    Ms1 = 0,
    Ms2,
    Ms4,
    /// Mid-range default; long enough for indoor light, short enough to
    /// leave headroom in both directions.
    #[default]
    Ms8,
    Ms16,
    Ms32,
    Ms64,
}

impl IntegrationTime {
    pub const MAX_CODE: u8 = 6;

    pub fn from_code(code: u8) -> Result<Self> {
        if code > Self::MAX_CODE {
            return Err(Error::InvalidConfig);
        }
        FromPrimitive::from_u8(code).ok_or(Error::InvalidConfig)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn millis(self) -> u16 {
        1 << self.code()
    }

    pub fn is_min(self) -> bool {
        self.code() == 0
    }

    pub fn is_max(self) -> bool {
        self.code() == Self::MAX_CODE
    }

    pub(crate) fn lowered(self, steps: u8) -> Self {
        Self::from_code(self.code().saturating_sub(steps)).unwrap_or(IntegrationTime::Ms1)
    }

    pub(crate) fn raised(self, steps: u8) -> Self {
        Self::from_code((self.code() + steps).min(Self::MAX_CODE)).unwrap_or(IntegrationTime::Ms64)
    }
}

impl fmt::Display for IntegrationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.millis())
    }
}

/// Packs settings into the CREG1 write: gain code in the high nibble,
/// integration time code in the low nibble.
pub fn encode_config(gain: Gain, time: IntegrationTime) -> (u8, u8) {
    let byte = (gain.reg_code() & 0x0F) << 4 | (time.code() & 0x0F);
    (register::CREG1, byte)
}

/// Inverse of [`encode_config`]; rejects codes outside the supported tables.
pub fn decode_config(byte: u8) -> Result<(Gain, IntegrationTime)> {
    let gain = Gain::from_reg_code(byte >> 4)?;
    let time = IntegrationTime::from_code(byte & 0x0F)?;
    Ok((gain, time))
}
