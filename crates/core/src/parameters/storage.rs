//! Name-keyed parameter store
//!
//! Backs the control-channel "get config" / "set config" surface. Typed
//! parameter blocks register their defaults here and load themselves back
//! out; persistence of the store content is handled by the host side and is
//! not part of the core.

use heapless::index_map::FnvIndexMap;
use heapless::String;

use super::error::ParameterError;

/// Maximum parameter name length.
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of registered parameters.
pub const MAX_PARAMS: usize = 64;

/// Maximum string parameter length.
pub const MAX_STRING_LEN: usize = 63;

bitflags::bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Parameter is not reported over the control channel
        const HIDDEN = 0b0000_0001;
        /// Parameter cannot be modified at runtime
        const READ_ONLY = 0b0000_0010;
    }
}

/// Parameter value types
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// String parameter (max 63 chars)
    String(String<MAX_STRING_LEN>),
    /// Boolean parameter
    Bool(bool),
    /// 32-bit unsigned integer
    Uint(u32),
    /// 32-bit floating point
    Float(f32),
}

impl ParamValue {
    /// Build a string value from a slice, truncating to the storage limit.
    pub fn string(s: &str) -> Self {
        let mut inner: String<MAX_STRING_LEN> = String::new();
        for ch in s.chars() {
            if inner.push(ch).is_err() {
                break;
            }
        }
        ParamValue::String(inner)
    }

    fn same_type(&self, other: &ParamValue) -> bool {
        matches!(
            (self, other),
            (ParamValue::String(_), ParamValue::String(_))
                | (ParamValue::Bool(_), ParamValue::Bool(_))
                | (ParamValue::Uint(_), ParamValue::Uint(_))
                | (ParamValue::Float(_), ParamValue::Float(_))
        )
    }
}

#[derive(Debug, Clone)]
struct ParamEntry {
    value: ParamValue,
    flags: ParamFlags,
}

/// Runtime parameter store.
///
/// Insertion order is not significant; lookups are by name.
pub struct ParameterStore {
    entries: FnvIndexMap<String<PARAM_NAME_LEN>, ParamEntry, MAX_PARAMS>,
    dirty: bool,
}

impl ParameterStore {
    /// Create a new empty parameter store.
    pub fn new() -> Self {
        Self {
            entries: FnvIndexMap::new(),
            dirty: false,
        }
    }

    fn key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
        let mut key: String<PARAM_NAME_LEN> = String::new();
        key.push_str(name)
            .map_err(|_| ParameterError::NameTooLong)?;
        Ok(key)
    }

    /// Register a parameter with its default value.
    ///
    /// Re-registering an existing name keeps the current value (so values
    /// set before a block re-registers survive) and only updates the flags.
    pub fn register(
        &mut self,
        name: &str,
        default: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = Self::key(name)?;
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.flags = flags;
            return Ok(());
        }
        self.entries
            .insert(
                key,
                ParamEntry {
                    value: default,
                    flags,
                },
            )
            .map_err(|_| ParameterError::StoreFull)?;
        Ok(())
    }

    /// Get a parameter value by name.
    pub fn get(&self, name: &str) -> Result<&ParamValue, ParameterError> {
        let key = Self::key(name)?;
        self.entries
            .get(&key)
            .map(|entry| &entry.value)
            .ok_or(ParameterError::NotFound)
    }

    /// Set a parameter value by name.
    ///
    /// The new value must match the registered type and the parameter must
    /// not be read-only.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = Self::key(name)?;
        let entry = self.entries.get_mut(&key).ok_or(ParameterError::NotFound)?;
        if entry.flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }
        if !entry.value.same_type(&value) {
            return Err(ParameterError::TypeMismatch);
        }
        entry.value = value;
        self.dirty = true;
        Ok(())
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no parameters are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when a value changed since the last [`Self::clear_dirty`].
    ///
    /// The host side polls this to decide when to persist.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reset the dirty flag after the host persisted the store.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    // Convenience accessors used by the typed blocks.

    /// Get a u32 value, falling back when missing or mistyped.
    pub fn get_uint(&self, name: &str, fallback: u32) -> u32 {
        match self.get(name) {
            Ok(ParamValue::Uint(v)) => *v,
            _ => fallback,
        }
    }

    /// Get a float value, falling back when missing or mistyped.
    pub fn get_float(&self, name: &str, fallback: f32) -> f32 {
        match self.get(name) {
            Ok(ParamValue::Float(v)) => *v,
            _ => fallback,
        }
    }

    /// Get a bool value, falling back when missing or mistyped.
    pub fn get_bool(&self, name: &str, fallback: bool) -> bool {
        match self.get(name) {
            Ok(ParamValue::Bool(v)) => *v,
            _ => fallback,
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
