//! Closed-loop dynamic-range seeking.
//!
//! Raw counts are pushed into a target window by trading gain against
//! integration time. Brightness is always resolved by cutting gain before
//! shortening exposure; darkness by lengthening exposure before raising
//! gain. The asymmetry keeps saturation recovery fast while favoring
//! exposure (better signal-to-noise) on the way back up.

use crate::config::{Gain, IntegrationTime};
use crate::flags::StatusFlags;

/// Dynamic-range window and loop bounds.
///
/// The numeric thresholds are tunable; the adjustment ordering is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangingPolicy {
    /// Lower edge of the usable window.
    pub target_min: u16,
    /// Upper edge of the usable window.
    pub target_max: u16,
    /// At or below this count an immediate dark adjustment fires.
    pub hard_low: u16,
    /// At or above this count the reading is treated as saturated.
    pub hard_high: u16,
    /// Consecutive soft observations required before acting.
    pub streak: u8,
    /// Attempt ceiling per measurement call.
    pub max_attempts: u8,
}

impl Default for RangingPolicy {
    fn default() -> Self {
        RangingPolicy {
            target_min: 2000,
            target_max: 50_000,
            hard_low: 300,
            hard_high: 65_000,
            streak: 2,
            max_attempts: 12,
        }
    }
}

/// Where a sample landed relative to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    HardBright,
    SoftBright,
    HardDark,
    SoftDark,
    InWindow,
}

impl RangingPolicy {
    fn region(&self, raw_ref: u16, status: StatusFlags) -> Region {
        if status.adc_overflow || raw_ref >= self.hard_high {
            Region::HardBright
        } else if raw_ref <= self.hard_low {
            Region::HardDark
        } else if raw_ref > self.target_max {
            Region::SoftBright
        } else if raw_ref < self.target_min {
            Region::SoftDark
        } else {
            Region::InWindow
        }
    }
}

/// What the measurement loop should do after one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Sample is usable; stop here.
    Accepted,
    /// Settings moved one remediation step; configure and measure again.
    Adjusted,
    /// Soft condition seen but the streak is not long enough yet; measure
    /// again unchanged.
    Deferred,
    /// Out of window with no headroom left in either setting; stop with
    /// what we have.
    Locked,
}

/// Controller-owned settings and streak counters.
///
/// Persists across measurement calls so the loop tracks a slowly drifting
/// scene instead of re-ranging from scratch every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangingState {
    gain: Gain,
    time: IntegrationTime,
    bright_streak: u8,
    dark_streak: u8,
}

impl RangingState {
    pub fn new(gain: Gain, time: IntegrationTime) -> Self {
        RangingState {
            gain,
            time,
            bright_streak: 0,
            dark_streak: 0,
        }
    }

    pub fn gain(&self) -> Gain {
        self.gain
    }

    pub fn integration_time(&self) -> IntegrationTime {
        self.time
    }

    pub(crate) fn reset(&mut self, gain: Gain, time: IntegrationTime) {
        *self = RangingState::new(gain, time);
    }

    /// Scores one sample against the policy and, when warranted, moves
    /// gain or integration time one remediation step.
    pub fn observe(&mut self, raw_ref: u16, status: StatusFlags, policy: &RangingPolicy) -> Step {
        match policy.region(raw_ref, status) {
            Region::HardBright => {
                self.note_bright();
                self.step_down(2)
            }
            Region::SoftBright => {
                if self.note_bright() >= policy.streak {
                    self.step_down(1)
                } else {
                    Step::Deferred
                }
            }
            Region::HardDark => {
                self.note_dark();
                self.step_up()
            }
            Region::SoftDark => {
                if self.note_dark() >= policy.streak {
                    self.step_up()
                } else {
                    Step::Deferred
                }
            }
            Region::InWindow => {
                self.bright_streak = 0;
                self.dark_streak = 0;
                Step::Accepted
            }
        }
    }

    fn note_bright(&mut self) -> u8 {
        self.bright_streak = self.bright_streak.saturating_add(1);
        self.dark_streak = 0;
        self.bright_streak
    }

    fn note_dark(&mut self) -> u8 {
        self.dark_streak = self.dark_streak.saturating_add(1);
        self.bright_streak = 0;
        self.dark_streak
    }

    /// Bright remediation: gain first, integration time only once gain is
    /// exhausted.
    fn step_down(&mut self, gain_steps: u8) -> Step {
        if !self.gain.is_min() {
            self.gain = self.gain.lowered(gain_steps);
            Step::Adjusted
        } else if !self.time.is_min() {
            self.time = self.time.lowered(1);
            Step::Adjusted
        } else {
            Step::Locked
        }
    }

    /// Dark remediation: integration time first, gain only once exposure is
    /// exhausted.
    fn step_up(&mut self) -> Step {
        if !self.time.is_max() {
            self.time = self.time.raised(1);
            Step::Adjusted
        } else if !self.gain.is_max() {
            self.gain = self.gain.raised(1);
            Step::Adjusted
        } else {
            Step::Locked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: RangingPolicy = RangingPolicy {
        target_min: 2000,
        target_max: 50_000,
        hard_low: 300,
        hard_high: 65_000,
        streak: 2,
        max_attempts: 12,
    };

    fn clear() -> StatusFlags {
        StatusFlags::default()
    }

    fn overflowed() -> StatusFlags {
        StatusFlags {
            adc_overflow: true,
            ..StatusFlags::default()
        }
    }

    #[test]
    fn hard_bright_cuts_gain_two_steps() {
        let mut state = RangingState::new(Gain::X64, IntegrationTime::Ms64);
        assert_eq!(state.observe(65_200, clear(), &POLICY), Step::Adjusted);
        assert_eq!(state.gain(), Gain::X16);
        assert_eq!(state.integration_time(), IntegrationTime::Ms64);
    }

    #[test]
    fn hard_bright_gain_cut_clamps_at_one_x() {
        let mut state = RangingState::new(Gain::X2, IntegrationTime::Ms64);
        assert_eq!(state.observe(65_500, clear(), &POLICY), Step::Adjusted);
        assert_eq!(state.gain(), Gain::X1);
    }

    #[test]
    fn adc_overflow_is_hard_bright_regardless_of_count() {
        let mut state = RangingState::new(Gain::X64, IntegrationTime::Ms64);
        assert_eq!(state.observe(100, overflowed(), &POLICY), Step::Adjusted);
        assert_eq!(state.gain(), Gain::X16);
    }

    #[test]
    fn hard_bright_at_min_gain_shortens_exposure() {
        let mut state = RangingState::new(Gain::X1, IntegrationTime::Ms64);
        assert_eq!(state.observe(65_500, clear(), &POLICY), Step::Adjusted);
        assert_eq!(state.gain(), Gain::X1);
        assert_eq!(state.integration_time(), IntegrationTime::Ms32);
    }

    #[test]
    fn hard_bright_at_both_floors_locks() {
        let mut state = RangingState::new(Gain::X1, IntegrationTime::Ms1);
        assert_eq!(state.observe(65_500, clear(), &POLICY), Step::Locked);
        assert_eq!(state.gain(), Gain::X1);
        assert_eq!(state.integration_time(), IntegrationTime::Ms1);
    }

    #[test]
    fn hard_dark_lengthens_exposure_before_gain() {
        let mut state = RangingState::new(Gain::X1, IntegrationTime::Ms8);
        assert_eq!(state.observe(100, clear(), &POLICY), Step::Adjusted);
        assert_eq!(state.integration_time(), IntegrationTime::Ms16);
        assert_eq!(state.gain(), Gain::X1);
    }

    #[test]
    fn hard_dark_at_max_exposure_raises_gain() {
        let mut state = RangingState::new(Gain::X1, IntegrationTime::Ms64);
        assert_eq!(state.observe(100, clear(), &POLICY), Step::Adjusted);
        assert_eq!(state.integration_time(), IntegrationTime::Ms64);
        assert_eq!(state.gain(), Gain::X2);
    }

    #[test]
    fn dark_at_both_ceilings_locks() {
        let mut state = RangingState::new(Gain::X2048, IntegrationTime::Ms64);
        assert_eq!(state.observe(0, clear(), &POLICY), Step::Locked);
    }

    #[test]
    fn soft_bright_needs_two_consecutive_observations() {
        let mut state = RangingState::new(Gain::X64, IntegrationTime::Ms64);
        assert_eq!(state.observe(55_000, clear(), &POLICY), Step::Deferred);
        assert_eq!(state.gain(), Gain::X64);
        assert_eq!(state.observe(55_000, clear(), &POLICY), Step::Adjusted);
        assert_eq!(state.gain(), Gain::X32);
    }

    #[test]
    fn transient_soft_bright_does_not_change_settings() {
        let mut state = RangingState::new(Gain::X64, IntegrationTime::Ms64);
        assert_eq!(state.observe(55_000, clear(), &POLICY), Step::Deferred);
        assert_eq!(state.observe(10_000, clear(), &POLICY), Step::Accepted);
        // The streak restarted; another lone soft sample still defers.
        assert_eq!(state.observe(55_000, clear(), &POLICY), Step::Deferred);
        assert_eq!(state.gain(), Gain::X64);
        assert_eq!(state.integration_time(), IntegrationTime::Ms64);
    }

    #[test]
    fn soft_dark_needs_two_consecutive_observations() {
        let mut state = RangingState::new(Gain::X1, IntegrationTime::Ms8);
        assert_eq!(state.observe(1500, clear(), &POLICY), Step::Deferred);
        assert_eq!(state.observe(1500, clear(), &POLICY), Step::Adjusted);
        assert_eq!(state.integration_time(), IntegrationTime::Ms16);
        assert_eq!(state.gain(), Gain::X1);
    }

    #[test]
    fn opposite_soft_observation_resets_the_other_streak() {
        let mut state = RangingState::new(Gain::X64, IntegrationTime::Ms8);
        assert_eq!(state.observe(55_000, clear(), &POLICY), Step::Deferred);
        // A dark observation wipes the bright streak...
        assert_eq!(state.observe(1500, clear(), &POLICY), Step::Deferred);
        // ...so a new bright run starts from one again.
        assert_eq!(state.observe(55_000, clear(), &POLICY), Step::Deferred);
        assert_eq!(state.observe(55_000, clear(), &POLICY), Step::Adjusted);
    }

    #[test]
    fn soft_bright_at_min_gain_shortens_exposure() {
        let mut state = RangingState::new(Gain::X1, IntegrationTime::Ms8);
        state.observe(55_000, clear(), &POLICY);
        assert_eq!(state.observe(55_000, clear(), &POLICY), Step::Adjusted);
        assert_eq!(state.integration_time(), IntegrationTime::Ms4);
    }
}
