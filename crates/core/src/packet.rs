//! Logical packet model
//!
//! The core never parses APRS wire syntax. The encode/decode collaborator
//! (behind [`crate::traits::RadioPort`]) maps wire text to and from these
//! logical fields: source and destination callsign-SSID, the digipeater
//! path with per-hop used markers, and a typed payload.

use heapless::{String, Vec};

/// Maximum length of a callsign-SSID ("AB1CDE-15").
pub const MAX_CALLSIGN_LEN: usize = 9;

/// Maximum number of digipeater hops carried in a path.
pub const MAX_PATH_HOPS: usize = 8;

/// Maximum length of a beacon comment.
pub const MAX_COMMENT_LEN: usize = 40;

/// Maximum length of a text message body (APRS message limit).
pub const MAX_MESSAGE_LEN: usize = 67;

/// Maximum length of a status text.
pub const MAX_STATUS_LEN: usize = 62;

/// Maximum length of an unclassified payload kept for display purposes.
pub const MAX_INFO_LEN: usize = 100;

/// Station identifier: base callsign plus optional numeric SSID suffix.
///
/// Stored verbatim (uppercase expected from the decoding collaborator).
/// Equality and hashing are byte-wise, so `N0CALL` and `N0CALL-0` are
/// distinct stations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Callsign(String<MAX_CALLSIGN_LEN>);

impl Callsign {
    /// Build a callsign from a string slice.
    ///
    /// Returns `None` when empty, too long, or containing characters outside
    /// `A-Z`, `0-9` and `-`.
    pub fn new(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > MAX_CALLSIGN_LEN {
            return None;
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-')
        {
            return None;
        }
        let mut inner = String::new();
        // Length checked above, push cannot fail.
        let _ = inner.push_str(s);
        Some(Self(inner))
    }

    /// The full callsign-SSID as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Base callsign without the SSID suffix.
    pub fn base(&self) -> &str {
        match self.0.find('-') {
            Some(idx) => &self.0.as_str()[..idx],
            None => self.0.as_str(),
        }
    }

    /// The generic tocall used when no profile overrides it.
    pub fn default_tocall() -> Self {
        let mut inner = String::new();
        // "APRS" is within the length and charset limits.
        let _ = inner.push_str("APRS");
        Self(inner)
    }

    /// Numeric SSID, 0 when absent or malformed.
    pub fn ssid(&self) -> u8 {
        match self.0.find('-') {
            Some(idx) => self.0.as_str()[idx + 1..].parse().unwrap_or(0),
            None => 0,
        }
    }
}

/// One digipeater path element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathHop {
    /// Digipeater callsign (or alias such as `WIDE1-1`).
    pub call: Callsign,
    /// Set once the hop has been consumed by a relaying station.
    pub used: bool,
}

impl PathHop {
    /// A hop that has not been consumed yet.
    pub fn pending(call: Callsign) -> Self {
        Self { call, used: false }
    }

    /// A hop already consumed (a station that relayed the packet).
    pub fn consumed(call: Callsign) -> Self {
        Self { call, used: true }
    }
}

/// Environmental and supply readings attached to telemetry frames.
///
/// Sampled from the [`crate::traits::SensorSource`] collaborator at
/// transmit time; the core treats the values as opaque.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorReadings {
    /// Battery voltage in volts.
    pub battery_v: f32,
    /// Ambient temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Barometric pressure in hPa.
    pub pressure_hpa: f32,
    /// Relative humidity in percent.
    pub humidity_pct: f32,
}

/// Typed packet payload as seen by the core.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Position report with optional comment text.
    Position {
        /// Latitude in decimal degrees, north positive.
        lat: f32,
        /// Longitude in decimal degrees, east positive.
        lon: f32,
        /// Ground speed in km/h.
        speed_kmh: f32,
        /// Course over ground in degrees, 0 = north.
        course_deg: f32,
        /// APRS symbol table identifier.
        symbol_table: u8,
        /// APRS symbol code.
        symbol_code: u8,
        /// Comment appended to the report, when due.
        comment: Option<String<MAX_COMMENT_LEN>>,
    },
    /// Free-text status transmission.
    Status(String<MAX_STATUS_LEN>),
    /// Directed text message, optionally carrying a `{NNN` delivery id.
    Message {
        /// Station the message is addressed to.
        addressee: Callsign,
        /// Message body.
        text: String<MAX_MESSAGE_LEN>,
        /// Delivery id when the sender expects an ack.
        id: Option<u16>,
    },
    /// Acknowledgement for a previously received message id.
    Ack {
        /// Station whose message is being acknowledged.
        addressee: Callsign,
        /// The acknowledged message id.
        id: u16,
    },
    /// Telemetry frame with a wrapping sequence number.
    Telemetry {
        /// Frame sequence number.
        sequence: u16,
        /// Sampled sensor values.
        readings: SensorReadings,
    },
    /// Anything the decoder recognized but the core does not act on.
    Other(String<MAX_INFO_LEN>),
}

/// A logical packet: addressing, digipeater path and typed payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    /// Originating station.
    pub source: Callsign,
    /// Protocol destination (tocall), not a delivery address.
    pub destination: Callsign,
    /// Digipeater path, at most [`MAX_PATH_HOPS`] entries.
    pub path: Vec<PathHop, MAX_PATH_HOPS>,
    /// Typed payload.
    pub payload: Payload,
}

/// A packet received from the channel.
pub type RxPacket = Packet;

/// A packet queued for transmission.
pub type TxPacket = Packet;

impl Packet {
    /// Build a packet with an empty digipeater path.
    pub fn new(source: Callsign, destination: Callsign, payload: Payload) -> Self {
        Self {
            source,
            destination,
            path: Vec::new(),
            payload,
        }
    }

    /// Number of digipeater hops already consumed.
    pub fn hops_used(&self) -> u8 {
        self.path.iter().filter(|hop| hop.used).count() as u8
    }

    /// Whether the path already carries the given callsign.
    pub fn path_contains(&self, call: &Callsign) -> bool {
        self.path.iter().any(|hop| hop.call == *call)
    }
}
