//! Message delivery parameter definitions
//!
//! # Parameters
//!
//! - `MSG_RETRIES` - transmissions attempted before a message fails
//! - `MSG_RETRY_MS` - delay between retry attempts (ms)

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// Acknowledged message delivery parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageParams {
    /// Maximum transmissions per message before it is marked failed.
    pub max_retries: u8,
    /// Delay between transmissions while no ack has arrived (ms).
    pub retry_interval_ms: u32,
}

impl Default for MessageParams {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_interval_ms: 30_000,
        }
    }
}

impl MessageParams {
    /// Register message parameters with default values.
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let defaults = Self::default();
        store.register(
            "MSG_RETRIES",
            ParamValue::Uint(defaults.max_retries as u32),
            ParamFlags::empty(),
        )?;
        store.register(
            "MSG_RETRY_MS",
            ParamValue::Uint(defaults.retry_interval_ms),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    /// Load message parameters from the store.
    pub fn load(store: &ParameterStore) -> Self {
        let defaults = Self::default();
        Self {
            max_retries: store.get_uint("MSG_RETRIES", defaults.max_retries as u32) as u8,
            retry_interval_ms: store.get_uint("MSG_RETRY_MS", defaults.retry_interval_ms),
        }
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.max_retries == 0 || self.retry_interval_ms == 0 {
            return Err(ParameterError::OutOfRange);
        }
        Ok(())
    }
}
