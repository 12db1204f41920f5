//! Beacon profiles
//!
//! A tracker carries one or more beacon profiles (callsign-SSID, symbol,
//! comment, default digi path) and cycles between them at runtime. Profiles
//! come from host configuration; they are structured data and do not go
//! through the name-keyed parameter store.

use heapless::{String, Vec};

use crate::packet::{Callsign, MAX_COMMENT_LEN};

/// Maximum number of configured beacon profiles.
pub const MAX_PROFILES: usize = 4;

/// Maximum number of digipeater aliases in a profile's default path.
pub const MAX_PROFILE_PATH: usize = 3;

/// One beacon identity: who we are on air and how we draw on maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconProfile {
    /// Our callsign-SSID for this profile.
    pub callsign: Callsign,
    /// Protocol destination (tocall).
    pub destination: Callsign,
    /// Default digipeater path requested for our transmissions.
    pub path: Vec<Callsign, MAX_PROFILE_PATH>,
    /// APRS symbol table identifier.
    pub symbol_table: u8,
    /// APRS symbol code.
    pub symbol_code: u8,
    /// Comment text appended every N-th beacon.
    pub comment: String<MAX_COMMENT_LEN>,
}

impl BeaconProfile {
    /// Minimal profile: given callsign, generic tocall, bike symbol, no path.
    pub fn new(callsign: Callsign) -> Self {
        Self {
            callsign,
            destination: Callsign::default_tocall(),
            path: Vec::new(),
            symbol_table: b'/',
            symbol_code: b'b',
            comment: String::new(),
        }
    }

    /// Replace the comment text, truncating to the storage limit.
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment.clear();
        for ch in comment.chars() {
            if self.comment.push(ch).is_err() {
                break;
            }
        }
        self
    }
}

/// The configured profiles plus the active index.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    profiles: Vec<BeaconProfile, MAX_PROFILES>,
    active: usize,
}

impl ProfileSet {
    /// Build a set with a single profile.
    pub fn single(profile: BeaconProfile) -> Self {
        let mut profiles = Vec::new();
        // Capacity is MAX_PROFILES >= 1, push cannot fail.
        let _ = profiles.push(profile);
        Self {
            profiles,
            active: 0,
        }
    }

    /// Append another profile; ignored beyond [`MAX_PROFILES`].
    pub fn push(&mut self, profile: BeaconProfile) -> bool {
        self.profiles.push(profile).is_ok()
    }

    /// The currently active profile.
    pub fn active(&self) -> &BeaconProfile {
        &self.profiles[self.active]
    }

    /// Advance to the next profile, wrapping to the first.
    ///
    /// Returns the newly active profile.
    pub fn cycle(&mut self) -> &BeaconProfile {
        self.active = (self.active + 1) % self.profiles.len();
        &self.profiles[self.active]
    }

    /// Number of configured profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false: a set holds at least one profile.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
