use crate::registers::status;

/// Hardware flags carried in the status byte.
///
/// When the OSR address is read as a 16-bit word the status byte occupies
/// the high half, with the OSR mirror in the low half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusFlags {
    /// Conversion still running; result registers are stale.
    pub data_not_ready: bool,
    /// An ADC stage clipped; the reading saturated upstream of the result.
    pub adc_overflow: bool,
    /// A result register overflowed.
    pub result_overflow: bool,
}

impl StatusFlags {
    pub fn from_status_byte(byte: u8) -> Self {
        StatusFlags {
            data_not_ready: byte & status::NOTREADY != 0,
            adc_overflow: byte & status::ADCOF != 0,
            result_overflow: byte & status::MRESOF != 0,
        }
    }

    pub fn from_status_word(word: u16) -> Self {
        Self::from_status_byte((word >> 8) as u8)
    }
}
