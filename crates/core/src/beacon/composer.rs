//! Beacon packet composition
//!
//! Thin layer turning a scheduler decision plus the active beacon profile
//! into a logical packet. Wire-format encoding happens later, in the
//! collaborator behind the radio port.

use heapless::String;

use super::Fix;
use crate::packet::{Packet, PathHop, Payload, TxPacket, MAX_STATUS_LEN};
use crate::parameters::BeaconProfile;

/// Builds outbound beacon and status packets from the active profile.
pub struct BeaconComposer;

impl BeaconComposer {
    fn base_packet(profile: &BeaconProfile, payload: Payload) -> TxPacket {
        let mut packet = Packet::new(profile.callsign.clone(), profile.destination.clone(), payload);
        for alias in &profile.path {
            // Path capacity exceeds profile path capacity, push cannot fail.
            let _ = packet.path.push(PathHop::pending(alias.clone()));
        }
        packet
    }

    /// Compose a position beacon from the current fix.
    ///
    /// `with_comment` attaches the profile comment when the comment cycle is
    /// due; an empty configured comment is never attached.
    pub fn position(profile: &BeaconProfile, fix: &Fix, with_comment: bool) -> TxPacket {
        let comment = if with_comment && !profile.comment.is_empty() {
            Some(profile.comment.clone())
        } else {
            None
        };
        Self::base_packet(
            profile,
            Payload::Position {
                lat: fix.lat,
                lon: fix.lon,
                speed_kmh: fix.speed_kmh,
                course_deg: fix.course_deg,
                symbol_table: profile.symbol_table,
                symbol_code: profile.symbol_code,
                comment,
            },
        )
    }

    /// Compose a free-text status packet.
    pub fn status(profile: &BeaconProfile, text: &str) -> TxPacket {
        let mut status: String<MAX_STATUS_LEN> = String::new();
        for ch in text.chars() {
            if status.push(ch).is_err() {
                break;
            }
        }
        Self::base_packet(profile, Payload::Status(status))
    }
}
