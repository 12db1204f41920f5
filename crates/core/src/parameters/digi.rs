//! Digipeater parameter definitions
//!
//! # Parameters
//!
//! - `DIGI_ENABLE` - relay heard packets when set
//! - `DIGI_MAX_HOPS` - hop budget above which packets are not relayed
//! - `DIGI_TTL` - heard-station entry lifetime (ms)
//! - `DIGI_DEDUPE` - duplicate suppression window (ms)

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// Station tracking and relay parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigiParams {
    /// Relay eligible heard packets.
    pub enabled: bool,
    /// Packets that already consumed this many hops are not relayed.
    pub max_hops: u8,
    /// Heard-station entries older than this are evicted (ms).
    pub station_ttl_ms: u32,
    /// A (source, signature) pair is relayed at most once per window (ms).
    pub dedupe_window_ms: u32,
}

impl Default for DigiParams {
    fn default() -> Self {
        Self {
            enabled: false,
            max_hops: 2,
            station_ttl_ms: 1_800_000,
            dedupe_window_ms: 10_000,
        }
    }
}

impl DigiParams {
    /// Register digipeater parameters with default values.
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let defaults = Self::default();
        store.register(
            "DIGI_ENABLE",
            ParamValue::Bool(defaults.enabled),
            ParamFlags::empty(),
        )?;
        store.register(
            "DIGI_MAX_HOPS",
            ParamValue::Uint(defaults.max_hops as u32),
            ParamFlags::empty(),
        )?;
        store.register(
            "DIGI_TTL",
            ParamValue::Uint(defaults.station_ttl_ms),
            ParamFlags::empty(),
        )?;
        store.register(
            "DIGI_DEDUPE",
            ParamValue::Uint(defaults.dedupe_window_ms),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    /// Load digipeater parameters from the store.
    pub fn load(store: &ParameterStore) -> Self {
        let defaults = Self::default();
        Self {
            enabled: store.get_bool("DIGI_ENABLE", defaults.enabled),
            max_hops: store.get_uint("DIGI_MAX_HOPS", defaults.max_hops as u32) as u8,
            station_ttl_ms: store.get_uint("DIGI_TTL", defaults.station_ttl_ms),
            dedupe_window_ms: store.get_uint("DIGI_DEDUPE", defaults.dedupe_window_ms),
        }
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.max_hops == 0 || self.station_ttl_ms == 0 {
            return Err(ParameterError::OutOfRange);
        }
        Ok(())
    }
}
