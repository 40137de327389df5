//! System configuration parameters
//!
//! All tunable timing and control constants for the fan controller.
//! The threshold itself is runtime state, not configuration; only its
//! start-up offset and touch step live here.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Sampling ---
    /// Period of the sensor-refresh timer (milliseconds)
    pub sample_period_ms: u32,
    /// Analog full-scale volts per degree Celsius (LM35: 10 mV/°C)
    pub sensor_volts_per_degree: f32,

    // --- Ramp ---
    /// Delay between ramp steps (milliseconds)
    pub ramp_interval_ms: u32,
    /// Duty cycle written when the ramp starts (0.0–1.0)
    pub ramp_initial_duty: f32,
    /// Duty cycle added per ramp step (0.0–1.0]
    pub ramp_step: f32,

    // --- Input ---
    /// Minimum spacing between accepted touch inputs (milliseconds)
    pub debounce_ms: u32,
    /// Threshold change per accepted +/- touch (°C)
    pub threshold_step_c: f32,
    /// Start-up threshold = round(first reading) + this offset (°C)
    pub threshold_offset_c: f32,

    // --- Telemetry ---
    /// Interval between telemetry events (milliseconds)
    pub telemetry_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sampling
            sample_period_ms: 500, // 2 Hz
            sensor_volts_per_degree: 0.01,

            // Ramp: 0.1 → 1.0 in 0.05 steps, one step per 100 ms
            ramp_interval_ms: 100,
            ramp_initial_duty: 0.1,
            ramp_step: 0.05,

            // Input
            debounce_ms: 500,
            threshold_step_c: 0.5,
            threshold_offset_c: 1.0,

            // Telemetry
            telemetry_interval_ms: 5000,
        }
    }
}

impl SystemConfig {
    /// Parse a JSON document and validate the result.
    /// Missing fields take their default values.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Compact binary form for persisting to flash.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Config("encode failed"))
    }

    /// Decode a blob written by [`to_bytes`](Self::to_bytes) and validate it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config("corrupted blob"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values.  Nothing is clamped here: a bad value
    /// is an error, not something to silently repair.
    pub fn validate(&self) -> Result<()> {
        if self.sample_period_ms == 0 {
            return Err(Error::Config("sample_period_ms must be > 0"));
        }
        if self.ramp_interval_ms == 0 {
            return Err(Error::Config("ramp_interval_ms must be > 0"));
        }
        if self.debounce_ms == 0 {
            return Err(Error::Config("debounce_ms must be > 0"));
        }
        if self.telemetry_interval_ms == 0 {
            return Err(Error::Config("telemetry_interval_ms must be > 0"));
        }
        if !(self.ramp_step > 0.0 && self.ramp_step <= 1.0) {
            return Err(Error::Config("ramp_step must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.ramp_initial_duty) {
            return Err(Error::Config("ramp_initial_duty must be in [0, 1]"));
        }
        if !(self.sensor_volts_per_degree.is_finite() && self.sensor_volts_per_degree != 0.0) {
            return Err(Error::Config("sensor_volts_per_degree must be finite and non-zero"));
        }
        if !(self.threshold_step_c.is_finite() && self.threshold_step_c > 0.0) {
            return Err(Error::Config("threshold_step_c must be > 0"));
        }
        if !self.threshold_offset_c.is_finite() {
            return Err(Error::Config("threshold_offset_c must be finite"));
        }
        Ok(())
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms as u64)
    }

    pub fn ramp_interval(&self) -> Duration {
        Duration::from_millis(self.ramp_interval_ms as u64)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms as u64)
    }

    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms as u64)
    }

    /// Start-up threshold derived from the first temperature reading.
    pub fn initial_threshold(&self, first_reading_c: f32) -> f32 {
        first_reading_c.round() + self.threshold_offset_c
    }
}
