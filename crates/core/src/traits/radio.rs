//! Radio channel abstraction.
//!
//! The physical radio driver and the APRS wire-format codec live outside the
//! core. Implementations of [`RadioPort`] wrap both and expose the channel
//! at the logical-packet level.

use crate::packet::{RxPacket, TxPacket};

/// Non-blocking access to the shared half-duplex radio channel.
///
/// The channel is a single-owner resource: the tracker loop issues at most
/// one `try_send` per tick, arbitrated across beacons, relays, message
/// retries and telemetry.
pub trait RadioPort {
    /// Attempt to transmit one packet.
    ///
    /// Returns `false` when the channel is busy (carrier sensed, transmitter
    /// not ready). A refused packet is not queued anywhere; the caller's own
    /// scheduling re-attempts it on a later tick.
    fn try_send(&mut self, packet: &TxPacket) -> bool;

    /// Fetch the next fully decoded received packet, if any.
    ///
    /// Garbled frames are dropped by the decoding collaborator and never
    /// surface here.
    fn try_receive(&mut self) -> Option<RxPacket>;
}
