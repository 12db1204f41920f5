//! Telemetry parameter definitions
//!
//! # Parameters
//!
//! - `TLM_ENABLE` - transmit periodic telemetry frames when set
//! - `TLM_INTERVAL` - telemetry cadence (ms), independent of beacons

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// Telemetry cadence parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryParams {
    /// Transmit telemetry frames at all.
    pub enabled: bool,
    /// Interval between telemetry frames (ms).
    pub interval_ms: u32,
}

impl Default for TelemetryParams {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: 600_000,
        }
    }
}

impl TelemetryParams {
    /// Register telemetry parameters with default values.
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let defaults = Self::default();
        store.register(
            "TLM_ENABLE",
            ParamValue::Bool(defaults.enabled),
            ParamFlags::empty(),
        )?;
        store.register(
            "TLM_INTERVAL",
            ParamValue::Uint(defaults.interval_ms),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    /// Load telemetry parameters from the store.
    pub fn load(store: &ParameterStore) -> Self {
        let defaults = Self::default();
        Self {
            enabled: store.get_bool("TLM_ENABLE", defaults.enabled),
            interval_ms: store.get_uint("TLM_INTERVAL", defaults.interval_ms),
        }
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.interval_ms == 0 {
            return Err(ParameterError::OutOfRange);
        }
        Ok(())
    }
}
