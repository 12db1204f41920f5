//! Configuration blocks and the runtime parameter store
//!
//! Each subsystem reads an immutable typed parameter block for the session.
//! The blocks register their defaults in the name-keyed [`ParameterStore`],
//! which backs the control channel's get/set config surface; persistence of
//! the store is a host concern.
//!
//! # Blocks
//!
//! - [`SmartBeaconParams`]: adaptive beacon rate control
//! - [`DigiParams`]: station table and relay policy
//! - [`MessageParams`]: delivery retry policy
//! - [`TelemetryParams`]: telemetry cadence
//! - [`BeaconProfile`] / [`ProfileSet`]: on-air identities (not store-backed)

pub mod digi;
pub mod error;
pub mod message;
pub mod profile;
pub mod smart_beacon;
pub mod storage;
pub mod telemetry;

pub use digi::DigiParams;
pub use error::ParameterError;
pub use message::MessageParams;
pub use profile::{BeaconProfile, ProfileSet, MAX_PROFILES, MAX_PROFILE_PATH};
pub use smart_beacon::SmartBeaconParams;
pub use storage::{ParamFlags, ParamValue, ParameterStore, MAX_PARAMS, PARAM_NAME_LEN};
pub use telemetry::TelemetryParams;

use heapless::String;

use crate::packet::MAX_STATUS_LEN;

/// Ordering between a due message retry and a due beacon when both want the
/// channel in the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxPriority {
    /// Message retries transmit before beacons (default).
    #[default]
    MessageFirst,
    /// Beacons transmit before message retries.
    BeaconFirst,
}

/// Aggregate of all tracker configuration read at construction time.
#[derive(Debug, Clone)]
pub struct TrackerParams {
    /// Adaptive beacon rate control.
    pub smart_beacon: SmartBeaconParams,
    /// Station table and relay policy.
    pub digi: DigiParams,
    /// Message delivery retry policy.
    pub message: MessageParams,
    /// Telemetry cadence.
    pub telemetry: TelemetryParams,
    /// Message-retry vs beacon arbitration.
    pub tx_priority: TxPriority,
    /// Status text transmitted once after boot; empty disables it.
    pub startup_status: String<MAX_STATUS_LEN>,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            smart_beacon: SmartBeaconParams::default(),
            digi: DigiParams::default(),
            message: MessageParams::default(),
            telemetry: TelemetryParams::default(),
            tx_priority: TxPriority::default(),
            startup_status: String::new(),
        }
    }
}

impl TrackerParams {
    /// Register every store-backed block with its defaults.
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        SmartBeaconParams::register_defaults(store)?;
        DigiParams::register_defaults(store)?;
        MessageParams::register_defaults(store)?;
        TelemetryParams::register_defaults(store)?;
        Ok(())
    }

    /// Load every store-backed block; non-store fields keep their defaults.
    pub fn load(store: &ParameterStore) -> Self {
        Self {
            smart_beacon: SmartBeaconParams::load(store),
            digi: DigiParams::load(store),
            message: MessageParams::load(store),
            telemetry: TelemetryParams::load(store),
            tx_priority: TxPriority::default(),
            startup_status: String::new(),
        }
    }

    /// Set the startup status text, truncating to the storage limit.
    pub fn with_startup_status(mut self, text: &str) -> Self {
        self.startup_status.clear();
        for ch in text.chars() {
            if self.startup_status.push(ch).is_err() {
                break;
            }
        }
        self
    }

    /// Validate every block.
    pub fn validate(&self) -> Result<(), ParameterError> {
        self.smart_beacon.validate()?;
        self.digi.validate()?;
        self.message.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(TrackerParams::default().validate().is_ok());
    }

    #[test]
    fn test_register_and_load_all_blocks() {
        let mut store = ParameterStore::new();
        TrackerParams::register_defaults(&mut store).unwrap();
        store.set("DIGI_ENABLE", ParamValue::Bool(true)).unwrap();
        store.set("MSG_RETRIES", ParamValue::Uint(5)).unwrap();
        let params = TrackerParams::load(&store);
        assert!(params.digi.enabled);
        assert_eq!(params.message.max_retries, 5);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_startup_status_truncated() {
        let text = "LoRa APRS tracker up and running, firmware 2024.01, see project page";
        assert!(text.len() > MAX_STATUS_LEN);
        let params = TrackerParams::default().with_startup_status(text);
        assert_eq!(params.startup_status.len(), MAX_STATUS_LEN);
    }
}
