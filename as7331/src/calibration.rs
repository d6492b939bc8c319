//! Raw count to irradiance conversion.

use crate::config::{Gain, IntegrationTime};

/// Gain the responsivity constants were characterized at.
pub const REFERENCE_GAIN: f32 = 2048.0;
/// Integration time the responsivity constants were characterized at.
pub const REFERENCE_TIME_MS: f32 = 64.0;

/// Responsivity of one channel in counts per µW/cm², valid at
/// [`REFERENCE_GAIN`] and [`REFERENCE_TIME_MS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelCalibration {
    pub responsivity: f32,
}

impl ChannelCalibration {
    pub const fn new(responsivity: f32) -> Self {
        ChannelCalibration { responsivity }
    }

    /// Converts a raw count captured under the given settings to µW/cm².
    ///
    /// Responsivity scales linearly with gain; shorter exposures collect
    /// proportionally fewer counts, so the result is scaled back up by the
    /// reference-to-actual time ratio. A collapsed responsivity yields 0.0
    /// instead of dividing by zero.
    pub fn convert(&self, raw: u16, gain: Gain, time: IntegrationTime) -> f32 {
        let effective = self.responsivity * (gain.multiplier() as f32 / REFERENCE_GAIN);
        if effective <= 0.0 {
            return 0.0;
        }
        let time_correction = REFERENCE_TIME_MS / time.millis() as f32;
        (raw as f32 / effective) * time_correction
    }
}

/// Factory calibration for the two characterized channels. UVC carries no
/// responsivity constant and is surfaced raw-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub uva: ChannelCalibration,
    pub uvb: ChannelCalibration,
}

impl Calibration {
    /// Constants from the sensor's optical characterization.
    pub const DEFAULT: Self = Calibration {
        uva: ChannelCalibration::new(385.0),
        uvb: ChannelCalibration::new(347.0),
    };
}

impl Default for Calibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_raw_converts_to_zero() {
        let cal = Calibration::default();
        for gain in [Gain::X1, Gain::X64, Gain::X2048] {
            for time in [IntegrationTime::Ms1, IntegrationTime::Ms8, IntegrationTime::Ms64] {
                assert_eq!(cal.uva.convert(0, gain, time), 0.0);
                assert_eq!(cal.uvb.convert(0, gain, time), 0.0);
            }
        }
    }

    #[test]
    fn reference_point_identity() {
        // At the characterization settings, one responsivity worth of counts
        // is exactly one µW/cm².
        let uva = Calibration::DEFAULT.uva;
        assert_relative_eq!(
            uva.convert(385, Gain::X2048, IntegrationTime::Ms64),
            1.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn higher_gain_lowers_converted_value() {
        let cal = ChannelCalibration::new(385.0);
        let at_1x = cal.convert(1000, Gain::X1, IntegrationTime::Ms64);
        let at_2x = cal.convert(1000, Gain::X2, IntegrationTime::Ms64);
        assert!(at_2x < at_1x);
        assert_relative_eq!(at_1x / at_2x, 2.0, max_relative = 1e-6);
    }

    #[test]
    fn shorter_exposure_scales_result_up() {
        let cal = ChannelCalibration::new(385.0);
        let full = cal.convert(1000, Gain::X1, IntegrationTime::Ms64);
        let half = cal.convert(1000, Gain::X1, IntegrationTime::Ms32);
        assert_relative_eq!(half / full, 2.0, max_relative = 1e-6);
    }

    #[test]
    fn collapsed_responsivity_guards_division() {
        let cal = ChannelCalibration::new(0.0);
        assert_eq!(cal.convert(1234, Gain::X1, IntegrationTime::Ms64), 0.0);
    }
}
