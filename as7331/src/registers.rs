//! AS7331 register map, command bytes and status bit positions.
//!
//! Addresses follow the datasheet. The CREG* registers are only writable
//! while the device sits in configuration state.

pub mod register {
    /// Operational state register; doubles as the status word address.
    pub const OSR: u8 = 0x00;
    /// First result register; UVA, UVB (and UVC) words follow contiguously.
    pub const MRES1: u8 = 0x02;
    /// Gain and integration time configuration.
    pub const CREG1: u8 = 0x06;
    /// Measurement mode configuration.
    pub const CREG3: u8 = 0x08;
}

pub mod osr {
    /// Software power-up, device parked in configuration state.
    pub const CONFIGURATION: u8 = 0x02;
    /// Kick off a single conversion in CMD mode.
    pub const START_MEASUREMENT: u8 = 0x83;
}

pub mod creg3 {
    /// CMD (on-demand) measurement mode.
    pub const CMD_MODE: u8 = 0x40;
}

pub mod status {
    /// Conversion still in progress.
    pub const NOTREADY: u8 = 1 << 2;
    /// An ADC stage clipped during conversion.
    pub const ADCOF: u8 = 1 << 5;
    /// A result register overflowed.
    pub const MRESOF: u8 = 1 << 6;
}
