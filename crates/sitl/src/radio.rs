//! Simulated radio channel.

use std::collections::VecDeque;

use aprs_tracker_core::{RadioPort, RxPacket, TxPacket};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::codec::{decode_wire, encode_wire};
use crate::error::SimulatorError;

/// Scripted half-duplex channel.
///
/// Inbound traffic is injected by the scenario (as logical packets or wire
/// text); every transmission is logged both as a logical packet and as its
/// wire encoding. The channel can be pinned busy or refuse sends with a
/// configured probability (deterministically seeded).
pub struct SimRadio {
    inbound: VecDeque<RxPacket>,
    transmitted: Vec<TxPacket>,
    wire_log: Vec<String>,
    busy: bool,
    busy_probability: f64,
    rng: StdRng,
    refused: u32,
}

impl SimRadio {
    /// A quiet channel that accepts every transmission.
    pub fn new() -> Self {
        Self::with_busy_probability(0.0, 0)
    }

    /// A channel that refuses each send with probability `p`.
    pub fn with_busy_probability(p: f64, seed: u64) -> Self {
        Self {
            inbound: VecDeque::new(),
            transmitted: Vec::new(),
            wire_log: Vec::new(),
            busy: false,
            busy_probability: p,
            rng: StdRng::seed_from_u64(seed),
            refused: 0,
        }
    }

    /// Pin the channel busy (carrier present) or release it.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Queue a logical packet for reception.
    pub fn inject(&mut self, packet: RxPacket) {
        self.inbound.push_back(packet);
    }

    /// Queue a wire-text frame for reception, as an off-air decoder would.
    pub fn inject_wire(&mut self, frame: &str) -> Result<(), SimulatorError> {
        let packet = decode_wire(frame)?;
        self.inbound.push_back(packet);
        Ok(())
    }

    /// Every packet transmitted so far.
    pub fn transmitted(&self) -> &[TxPacket] {
        &self.transmitted
    }

    /// Wire text of every transmission, in order.
    pub fn wire_log(&self) -> &[String] {
        &self.wire_log
    }

    /// Number of sends refused because the channel was busy.
    pub fn refused(&self) -> u32 {
        self.refused
    }
}

impl Default for SimRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioPort for SimRadio {
    fn try_send(&mut self, packet: &TxPacket) -> bool {
        if self.busy || (self.busy_probability > 0.0 && self.rng.gen_bool(self.busy_probability)) {
            self.refused += 1;
            trace!("channel busy, refusing {}", packet.source.as_str());
            return false;
        }
        let frame = encode_wire(packet);
        debug!("tx {}", frame);
        self.transmitted.push(packet.clone());
        self.wire_log.push(frame);
        true
    }

    fn try_receive(&mut self) -> Option<RxPacket> {
        self.inbound.pop_front()
    }
}
