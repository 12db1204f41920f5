//! SmartBeacon parameter definitions
//!
//! Rate-control knobs for the adaptive beacon scheduler. The formula shape
//! is fixed; every constant in it lives here as configuration.
//!
//! # Parameters
//!
//! - `SB_LOW_SPEED` - below this speed the slow rate applies (km/h)
//! - `SB_HIGH_SPEED` - at or above this speed the fast rate applies (km/h)
//! - `SB_SLOW_RATE` - beacon interval when slow (ms)
//! - `SB_FAST_RATE` - beacon interval when fast (ms)
//! - `SB_TURN_MIN` - minimum heading change to consider a corner (deg)
//! - `SB_TURN_SLOPE` - speed-dependent addition to the corner threshold
//! - `SB_TURN_TIME` - minimum time between corner-triggered beacons (ms)
//! - `SB_STAND_RATE` - beacon interval while stationary (ms)
//! - `SB_COMMENT_N` - include the comment text every N-th beacon

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// SmartBeacon rate-control parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartBeaconParams {
    /// Speed at or below which the slow rate applies (km/h).
    pub low_speed_kmh: f32,
    /// Speed at or above which the fast rate applies (km/h).
    pub high_speed_kmh: f32,
    /// Interval between beacons at low speed (ms).
    pub slow_rate_ms: u32,
    /// Interval between beacons at high speed (ms).
    pub fast_rate_ms: u32,
    /// Minimum course change that can trigger a corner beacon (degrees).
    pub turn_min_deg: f32,
    /// Speed-scaled addition to the corner threshold (degrees * km/h).
    pub turn_slope: f32,
    /// Minimum elapsed time since the last transmission before a corner
    /// beacon may fire (ms).
    pub min_corner_time_ms: u32,
    /// Beacon interval while stationary (ms), typically much longer than
    /// the slow rate.
    pub standing_update_ms: u32,
    /// Every N-th beacon carries the profile comment text.
    pub comment_every_n: u8,
}

impl Default for SmartBeaconParams {
    fn default() -> Self {
        Self {
            low_speed_kmh: 10.0,
            high_speed_kmh: 70.0,
            slow_rate_ms: 120_000,
            fast_rate_ms: 60_000,
            turn_min_deg: 25.0,
            turn_slope: 255.0,
            min_corner_time_ms: 15_000,
            standing_update_ms: 900_000,
            comment_every_n: 10,
        }
    }
}

impl SmartBeaconParams {
    /// Register SmartBeacon parameters with default values.
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let defaults = Self::default();
        store.register(
            "SB_LOW_SPEED",
            ParamValue::Float(defaults.low_speed_kmh),
            ParamFlags::empty(),
        )?;
        store.register(
            "SB_HIGH_SPEED",
            ParamValue::Float(defaults.high_speed_kmh),
            ParamFlags::empty(),
        )?;
        store.register(
            "SB_SLOW_RATE",
            ParamValue::Uint(defaults.slow_rate_ms),
            ParamFlags::empty(),
        )?;
        store.register(
            "SB_FAST_RATE",
            ParamValue::Uint(defaults.fast_rate_ms),
            ParamFlags::empty(),
        )?;
        store.register(
            "SB_TURN_MIN",
            ParamValue::Float(defaults.turn_min_deg),
            ParamFlags::empty(),
        )?;
        store.register(
            "SB_TURN_SLOPE",
            ParamValue::Float(defaults.turn_slope),
            ParamFlags::empty(),
        )?;
        store.register(
            "SB_TURN_TIME",
            ParamValue::Uint(defaults.min_corner_time_ms),
            ParamFlags::empty(),
        )?;
        store.register(
            "SB_STAND_RATE",
            ParamValue::Uint(defaults.standing_update_ms),
            ParamFlags::empty(),
        )?;
        store.register(
            "SB_COMMENT_N",
            ParamValue::Uint(defaults.comment_every_n as u32),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    /// Load SmartBeacon parameters from the store, falling back to defaults
    /// for missing entries.
    pub fn load(store: &ParameterStore) -> Self {
        let defaults = Self::default();
        Self {
            low_speed_kmh: store.get_float("SB_LOW_SPEED", defaults.low_speed_kmh),
            high_speed_kmh: store.get_float("SB_HIGH_SPEED", defaults.high_speed_kmh),
            slow_rate_ms: store.get_uint("SB_SLOW_RATE", defaults.slow_rate_ms),
            fast_rate_ms: store.get_uint("SB_FAST_RATE", defaults.fast_rate_ms),
            turn_min_deg: store.get_float("SB_TURN_MIN", defaults.turn_min_deg),
            turn_slope: store.get_float("SB_TURN_SLOPE", defaults.turn_slope),
            min_corner_time_ms: store.get_uint("SB_TURN_TIME", defaults.min_corner_time_ms),
            standing_update_ms: store.get_uint("SB_STAND_RATE", defaults.standing_update_ms),
            comment_every_n: store.get_uint("SB_COMMENT_N", defaults.comment_every_n as u32) as u8,
        }
    }

    /// Check internal consistency.
    ///
    /// The scheduler's interval invariant (`fast <= interval <= slow`)
    /// requires `fast_rate_ms <= slow_rate_ms` and a non-degenerate speed
    /// band.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.fast_rate_ms > self.slow_rate_ms {
            return Err(ParameterError::OutOfRange);
        }
        if self.low_speed_kmh >= self.high_speed_kmh {
            return Err(ParameterError::OutOfRange);
        }
        if self.low_speed_kmh < 0.0 || self.turn_min_deg <= 0.0 {
            return Err(ParameterError::OutOfRange);
        }
        if self.comment_every_n == 0 {
            return Err(ParameterError::OutOfRange);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SmartBeaconParams::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_rates_rejected() {
        let params = SmartBeaconParams {
            slow_rate_ms: 30_000,
            fast_rate_ms: 60_000,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParameterError::OutOfRange));
    }

    #[test]
    fn test_degenerate_speed_band_rejected() {
        let params = SmartBeaconParams {
            low_speed_kmh: 50.0,
            high_speed_kmh: 50.0,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParameterError::OutOfRange));
    }

    #[test]
    fn test_register_then_load_round_trip() {
        let mut store = ParameterStore::new();
        SmartBeaconParams::register_defaults(&mut store).unwrap();
        store.set("SB_SLOW_RATE", ParamValue::Uint(300_000)).unwrap();
        let params = SmartBeaconParams::load(&store);
        assert_eq!(params.slow_rate_ms, 300_000);
        assert_eq!(params.fast_rate_ms, SmartBeaconParams::default().fast_rate_ms);
    }
}
