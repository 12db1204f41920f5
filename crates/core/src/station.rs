//! Heard-station bookkeeping and digipeat logic
//!
//! Every decoded packet refreshes the heard-station table. When relaying is
//! enabled, a packet is repeated at most once per dedupe window, never when
//! our own callsign already appears in its path, and never past the hop
//! budget.

use heapless::index_map::FnvIndexMap;
use heapless::Vec;

use crate::packet::{Callsign, PathHop, Payload, RxPacket, TxPacket};
use crate::parameters::DigiParams;

/// Capacity of the heard-station table (power of two).
pub const MAX_STATIONS: usize = 32;

/// Slots in the recently-relayed ring.
const DEDUPE_SLOTS: usize = 16;

/// Bookkeeping for one heard station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationEntry {
    /// When the station was last heard (ms).
    pub last_heard_ms: u32,
    /// Digipeater hops the last packet had consumed on arrival.
    pub hop_count: u8,
    /// Signature of the last packet, for display/debug.
    pub last_signature: u32,
}

/// FNV-1a over the source call and the payload content.
///
/// Identifies "this exact transmission" for duplicate suppression: a station
/// re-sending identical content hashes identically, a new position or new
/// message text does not.
fn packet_signature(packet: &RxPacket) -> u32 {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    let mut hash = FNV_OFFSET;
    let mut eat = |bytes: &[u8]| {
        for &b in bytes {
            hash ^= b as u32;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    };

    eat(packet.source.as_str().as_bytes());
    match &packet.payload {
        Payload::Position {
            lat,
            lon,
            speed_kmh,
            course_deg,
            comment,
            ..
        } => {
            eat(&[1]);
            eat(&lat.to_bits().to_le_bytes());
            eat(&lon.to_bits().to_le_bytes());
            eat(&speed_kmh.to_bits().to_le_bytes());
            eat(&course_deg.to_bits().to_le_bytes());
            if let Some(comment) = comment {
                eat(comment.as_bytes());
            }
        }
        Payload::Status(text) => {
            eat(&[2]);
            eat(text.as_bytes());
        }
        Payload::Message {
            addressee,
            text,
            id,
        } => {
            eat(&[3]);
            eat(addressee.as_str().as_bytes());
            eat(text.as_bytes());
            if let Some(id) = id {
                eat(&id.to_le_bytes());
            }
        }
        Payload::Ack { addressee, id } => {
            eat(&[4]);
            eat(addressee.as_str().as_bytes());
            eat(&id.to_le_bytes());
        }
        Payload::Telemetry { sequence, .. } => {
            eat(&[5]);
            eat(&sequence.to_le_bytes());
        }
        Payload::Other(text) => {
            eat(&[6]);
            eat(text.as_bytes());
        }
    }
    hash
}

/// Heard-station table with relay (digipeat) eligibility.
pub struct StationTracker {
    params: DigiParams,
    own_call: Callsign,
    stations: FnvIndexMap<Callsign, StationEntry, MAX_STATIONS>,
    /// Ring of (signature, relayed_at_ms) pairs, oldest slot overwritten.
    dedupe: Vec<(u32, u32), DEDUPE_SLOTS>,
    dedupe_next: usize,
}

impl StationTracker {
    /// Create a tracker for the given own callsign and relay policy.
    pub fn new(own_call: Callsign, params: DigiParams) -> Self {
        Self {
            params,
            own_call,
            stations: FnvIndexMap::new(),
            dedupe: Vec::new(),
            dedupe_next: 0,
        }
    }

    /// Switch the own callsign (profile cycling).
    pub fn set_own_call(&mut self, own_call: Callsign) {
        self.own_call = own_call;
    }

    /// Number of stations currently tracked.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// True when no stations are tracked.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Look up a heard station.
    pub fn heard(&self, call: &Callsign) -> Option<&StationEntry> {
        self.stations.get(call)
    }

    /// Record a received packet and decide relay eligibility.
    ///
    /// Returns the relayed packet (our callsign appended to the path as a
    /// consumed hop) when all of the relay conditions hold, `None`
    /// otherwise. Ineligible and duplicate packets are still recorded in the
    /// station table.
    pub fn on_packet(&mut self, packet: &RxPacket, now: u32) -> Option<TxPacket> {
        if packet.source == self.own_call {
            // Our own transmission coming back through a digi.
            return None;
        }

        let hop_count = packet.hops_used();
        let signature = packet_signature(packet);
        self.record(&packet.source, hop_count, signature, now);

        if !self.params.enabled {
            return None;
        }
        if packet.path_contains(&self.own_call) {
            // Hard loop-prevention rule, never relay, no error.
            return None;
        }
        if hop_count >= self.params.max_hops {
            return None;
        }
        if self.recently_relayed(signature, now) {
            return None;
        }

        let mut relayed = packet.clone();
        if relayed
            .path
            .push(PathHop::consumed(self.own_call.clone()))
            .is_err()
        {
            return None;
        }
        self.remember_relayed(signature, now);
        Some(relayed)
    }

    fn record(&mut self, source: &Callsign, hop_count: u8, signature: u32, now: u32) {
        // Entries never exceed the hop budget, however far the packet came.
        let hop_count = hop_count.min(self.params.max_hops);
        if let Some(entry) = self.stations.get_mut(source) {
            entry.last_heard_ms = now;
            entry.hop_count = hop_count;
            entry.last_signature = signature;
            return;
        }
        let entry = StationEntry {
            last_heard_ms: now,
            hop_count,
            last_signature: signature,
        };
        if self.stations.len() == MAX_STATIONS {
            self.evict_oldest(now);
        }
        // Capacity ensured above, insert cannot fail.
        let _ = self.stations.insert(source.clone(), entry);
    }

    /// Drop the entry heard longest ago to make room.
    fn evict_oldest(&mut self, now: u32) {
        let mut oldest: Option<(Callsign, u32)> = None;
        for (call, entry) in self.stations.iter() {
            let age = now.wrapping_sub(entry.last_heard_ms);
            match oldest {
                Some((_, oldest_age)) if age <= oldest_age => {}
                _ => oldest = Some((call.clone(), age)),
            }
        }
        if let Some((call, _)) = oldest {
            self.stations.remove(&call);
        }
    }

    /// Evict every entry not heard within the TTL.
    ///
    /// Driven by the owning loop; an entry is removed exactly when
    /// `now - last_heard_ms > ttl`, never earlier.
    pub fn sweep(&mut self, now: u32) {
        let mut expired: Vec<Callsign, MAX_STATIONS> = Vec::new();
        for (call, entry) in self.stations.iter() {
            if now.wrapping_sub(entry.last_heard_ms) > self.params.station_ttl_ms {
                // Capacity matches the table, push cannot fail.
                let _ = expired.push(call.clone());
            }
        }
        for call in &expired {
            self.stations.remove(call);
        }
    }

    fn recently_relayed(&self, signature: u32, now: u32) -> bool {
        self.dedupe.iter().any(|&(sig, at)| {
            sig == signature && now.wrapping_sub(at) <= self.params.dedupe_window_ms
        })
    }

    fn remember_relayed(&mut self, signature: u32, now: u32) {
        if self.dedupe.len() < DEDUPE_SLOTS {
            let _ = self.dedupe.push((signature, now));
        } else {
            self.dedupe[self.dedupe_next] = (signature, now);
        }
        self.dedupe_next = (self.dedupe_next + 1) % DEDUPE_SLOTS;
    }
}
