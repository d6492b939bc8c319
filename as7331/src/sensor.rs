//! Measurement session over the register bus.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::bus::RegisterBus;
use crate::calibration::Calibration;
use crate::config::{encode_config, Gain, IntegrationTime};
use crate::error::{Error, Result};
use crate::flags::StatusFlags;
use crate::ranging::{RangingPolicy, RangingState, Step};
use crate::registers::{creg3, osr, register};
use crate::sample::{decode_sample, RawSample};

/// Settle time after the software power-up write.
const POWER_UP_DELAY: Duration = Duration::from_millis(50);
/// Settle time after each configuration register write.
const CONFIG_DELAY: Duration = Duration::from_millis(5);
/// Settle time after switching measurement mode.
const MODE_DELAY: Duration = Duration::from_millis(10);
/// Margin on top of the integration time before the first status read.
const CONVERSION_MARGIN: Duration = Duration::from_millis(2);
/// Wall-clock limit for polling NOTREADY past the nominal wait.
const READY_POLL_DEADLINE: Duration = Duration::from_millis(50);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(1);
/// Pause before retrying an attempt that died on the bus.
const RETRY_BACKOFF: Duration = Duration::from_millis(5);

/// Starting settings applied by [`As7331::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorConfig {
    pub gain: Gain,
    pub integration_time: IntegrationTime,
    /// Also read the third (UVC) channel. Raw-only; no calibration constant
    /// exists for it.
    pub include_uvc: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            gain: Gain::X1,
            integration_time: IntegrationTime::Ms8,
            include_uvc: false,
        }
    }
}

/// One finished measurement together with the settings it was captured
/// under.
///
/// Gain at 1x with a raw count still at the saturation ceiling (or gain at
/// 2048x with counts near zero) means the scene exceeded what the sensor
/// can range over; the values are still the best available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementResult {
    pub uva_raw: u16,
    pub uvb_raw: u16,
    pub uvc_raw: Option<u16>,
    pub uva_uw_cm2: f32,
    pub uvb_uw_cm2: f32,
    pub gain: Gain,
    pub integration_time: IntegrationTime,
}

/// Owns the bus handle and the ranging state across measurement calls.
pub struct As7331<B: RegisterBus> {
    bus: B,
    policy: RangingPolicy,
    calibration: Calibration,
    state: RangingState,
    /// Settings last written to CREG1. Trails `state` until the next
    /// Configure step runs, so a sample is never read under settings that
    /// were not applied.
    applied: (Gain, IntegrationTime),
    include_uvc: bool,
}

impl<B: RegisterBus> As7331<B> {
    pub fn new(bus: B) -> Self {
        Self::with_policy(bus, RangingPolicy::default(), Calibration::default())
    }

    pub fn with_policy(bus: B, policy: RangingPolicy, calibration: Calibration) -> Self {
        let defaults = SensorConfig::default();
        As7331 {
            bus,
            policy,
            calibration,
            state: RangingState::new(defaults.gain, defaults.integration_time),
            applied: (defaults.gain, defaults.integration_time),
            include_uvc: defaults.include_uvc,
        }
    }

    /// Powers the sensor up in CMD mode with default starting settings.
    pub fn init(&mut self) -> Result<()> {
        self.init_with_config(SensorConfig::default())
    }

    /// Powers the sensor up in CMD mode with the given starting settings.
    ///
    /// Every write in the bring-up sequence is required; the first failure
    /// aborts and is surfaced as an initialization error.
    pub fn init_with_config(&mut self, config: SensorConfig) -> Result<()> {
        self.bring_up(config)
            .map_err(|e| Error::Initialization(Box::new(e)))
    }

    fn bring_up(&mut self, config: SensorConfig) -> Result<()> {
        self.bus
            .write_register(register::OSR, osr::CONFIGURATION)?;
        thread::sleep(POWER_UP_DELAY);

        self.state.reset(config.gain, config.integration_time);
        self.include_uvc = config.include_uvc;
        self.write_config(config.gain, config.integration_time)?;

        self.bus.write_register(register::CREG3, creg3::CMD_MODE)?;
        thread::sleep(MODE_DELAY);

        debug!(
            "sensor up: gain {}, integration {}",
            config.gain, config.integration_time
        );
        Ok(())
    }

    /// Takes one auto-ranged reading.
    ///
    /// Never fails: a transport error burns one attempt and the loop moves
    /// on; once attempts run out the last captured sample (or zeros, if the
    /// bus never answered) is converted as-is. The conversion always uses
    /// the settings the returned sample was captured under.
    pub fn measure(&mut self) -> MeasurementResult {
        let mut captured: Option<(RawSample, Gain, IntegrationTime)> = None;

        for attempt in 1..=self.policy.max_attempts {
            if let Err(err) = self.configure_pending() {
                warn!("attempt {attempt}: config write failed, retrying: {err}");
                thread::sleep(RETRY_BACKOFF);
                continue;
            }
            let (gain, time) = self.applied;

            let sample = match self.acquire() {
                Ok(sample) => sample,
                Err(err) => {
                    warn!("attempt {attempt}: acquisition failed, retrying: {err}");
                    thread::sleep(RETRY_BACKOFF);
                    continue;
                }
            };
            captured = Some((sample, gain, time));

            let raw_ref = sample.reference_count();
            match self.state.observe(raw_ref, sample.status, &self.policy) {
                Step::Accepted => {
                    debug!("attempt {attempt}: {raw_ref} in window at {gain}/{time}");
                    break;
                }
                Step::Adjusted => {
                    debug!(
                        "attempt {attempt}: {raw_ref} out of window, moving to {}/{}",
                        self.state.gain(),
                        self.state.integration_time()
                    );
                }
                Step::Deferred => {
                    debug!("attempt {attempt}: {raw_ref} soft out of window, watching");
                }
                Step::Locked => {
                    debug!("attempt {attempt}: {raw_ref} out of window at range limit");
                    break;
                }
            }
        }

        self.finish(captured)
    }

    /// One measurement at the currently configured settings, no range
    /// seeking. Errors are surfaced instead of retried.
    pub fn measure_raw(&mut self) -> Result<MeasurementResult> {
        self.configure_pending()?;
        let (gain, time) = self.applied;
        let sample = self.acquire()?;
        Ok(self.convert(sample, gain, time))
    }

    /// Hands the bus handle back.
    pub fn release(self) -> B {
        self.bus
    }

    fn configure_pending(&mut self) -> Result<()> {
        let wanted = (self.state.gain(), self.state.integration_time());
        if wanted != self.applied {
            self.write_config(wanted.0, wanted.1)?;
        }
        Ok(())
    }

    fn write_config(&mut self, gain: Gain, time: IntegrationTime) -> Result<()> {
        // Configuration registers are only writable from configuration state.
        self.bus
            .write_register(register::OSR, osr::CONFIGURATION)?;
        thread::sleep(CONFIG_DELAY);
        let (address, byte) = encode_config(gain, time);
        self.bus.write_register(address, byte)?;
        thread::sleep(CONFIG_DELAY);
        self.applied = (gain, time);
        Ok(())
    }

    fn acquire(&mut self) -> Result<RawSample> {
        self.bus
            .write_register(register::OSR, osr::START_MEASUREMENT)?;
        let (_, time) = self.applied;
        thread::sleep(Duration::from_millis(u64::from(time.millis())) + CONVERSION_MARGIN);

        let mut status = self.read_status()?;
        let deadline = Instant::now() + READY_POLL_DEADLINE;
        while status.data_not_ready && Instant::now() < deadline {
            thread::sleep(READY_POLL_INTERVAL);
            status = self.read_status()?;
        }

        let len = if self.include_uvc { 6 } else { 4 };
        let block = self.bus.read_block(register::MRES1, len)?;
        decode_sample(&block, self.include_uvc, status)
    }

    fn read_status(&mut self) -> Result<StatusFlags> {
        let word = self.bus.read_word(register::OSR)?;
        Ok(StatusFlags::from_status_word(word))
    }

    fn finish(&self, captured: Option<(RawSample, Gain, IntegrationTime)>) -> MeasurementResult {
        match captured {
            Some((sample, gain, time)) => self.convert(sample, gain, time),
            // The bus never produced a sample this call.
            None => self.convert(
                RawSample {
                    uva: 0,
                    uvb: 0,
                    uvc: self.include_uvc.then_some(0),
                    status: StatusFlags::default(),
                },
                self.state.gain(),
                self.state.integration_time(),
            ),
        }
    }

    fn convert(&self, sample: RawSample, gain: Gain, time: IntegrationTime) -> MeasurementResult {
        MeasurementResult {
            uva_raw: sample.uva,
            uvb_raw: sample.uvb,
            uvc_raw: sample.uvc,
            uva_uw_cm2: self.calibration.uva.convert(sample.uva, gain, time),
            uvb_uw_cm2: self.calibration.uvb.convert(sample.uvb, gain, time),
            gain,
            integration_time: time,
        }
    }
}
