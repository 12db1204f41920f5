//! Acknowledged message delivery
//!
//! Outbound messages carry a small wrapping delivery id and are re-sent on a
//! fixed interval until the recipient acks or the retry budget runs out.
//! Inbound messages addressed to this station are acked once and kept in a
//! bounded history for the host to display.

use heapless::{HistoryBuf, String, Vec};

use crate::packet::{Callsign, Packet, Payload, RxPacket, TxPacket, MAX_MESSAGE_LEN};
use crate::parameters::MessageParams;

/// Capacity of the outbound message queue.
pub const MAX_OUTBOUND: usize = 8;

/// Capacity of the inbound message history (oldest overwritten).
pub const INBOUND_HISTORY: usize = 16;

/// Message ids occupy 1..=999 and wrap (three-digit `{NNN` suffix space).
pub const MESSAGE_ID_SPAN: u16 = 1000;

/// Pending fire-once acks waiting for the channel.
const MAX_PENDING_ACKS: usize = 4;

/// Delivery lifecycle of an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// Waiting for an ack, retries remaining.
    Pending,
    /// Recipient confirmed receipt.
    Acked,
    /// Retry budget exhausted without an ack.
    Failed,
}

/// One queued outbound message.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Delivery id transmitted as the `{NNN` suffix.
    pub id: u16,
    /// Destination station.
    pub recipient: Callsign,
    /// Message body.
    pub text: String<MAX_MESSAGE_LEN>,
    /// Transmissions performed so far.
    pub attempt: u8,
    /// Next transmission is due at this time (ms).
    pub next_retry_ms: u32,
    /// Current lifecycle state.
    pub state: DeliveryState,
}

/// One received message kept for display.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Sending station.
    pub from: Callsign,
    /// Message body.
    pub text: String<MAX_MESSAGE_LEN>,
    /// When it arrived (ms).
    pub received_ms: u32,
}

/// Errors raised by the delivery manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// Outbound queue is full.
    QueueFull,
}

/// What an inbound packet meant to the delivery layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageEvent {
    /// A message for this station arrived and was stored.
    Received(InboundMessage),
    /// An outbound message was confirmed delivered.
    Acked {
        /// The delivery id that was confirmed.
        id: u16,
        /// The station that confirmed it.
        recipient: Callsign,
    },
}

/// Outbound queue with ack/retry plus inbound ack generation and history.
pub struct MessageDeliveryManager {
    params: MessageParams,
    own_call: Callsign,
    destination: Callsign,
    queue: Vec<OutboundMessage, MAX_OUTBOUND>,
    /// Fire-once acks waiting for the channel: (station to ack, id).
    acks: Vec<(Callsign, u16), MAX_PENDING_ACKS>,
    history: HistoryBuf<InboundMessage, INBOUND_HISTORY>,
    next_id: u16,
}

impl MessageDeliveryManager {
    /// Create a manager transmitting as `own_call` with tocall `destination`.
    pub fn new(own_call: Callsign, destination: Callsign, params: MessageParams) -> Self {
        Self {
            params,
            own_call,
            destination,
            queue: Vec::new(),
            acks: Vec::new(),
            history: HistoryBuf::new(),
            next_id: 1,
        }
    }

    /// Switch the on-air identity (profile cycling).
    pub fn set_identity(&mut self, own_call: Callsign, destination: Callsign) {
        self.own_call = own_call;
        self.destination = destination;
    }

    /// Queue a message for delivery.
    ///
    /// The first transmission happens on the next tick. Returns the assigned
    /// delivery id.
    pub fn enqueue(&mut self, recipient: Callsign, text: &str, now: u32) -> Result<u16, MessageError> {
        if self.queue.is_full() {
            return Err(MessageError::QueueFull);
        }
        let id = self.next_id;
        self.next_id += 1;
        if self.next_id >= MESSAGE_ID_SPAN {
            self.next_id = 1;
        }
        let mut body: String<MAX_MESSAGE_LEN> = String::new();
        for ch in text.chars() {
            if body.push(ch).is_err() {
                break;
            }
        }
        // Fullness checked above, push cannot fail.
        let _ = self.queue.push(OutboundMessage {
            id,
            recipient,
            text: body,
            attempt: 0,
            next_retry_ms: now,
            state: DeliveryState::Pending,
        });
        Ok(id)
    }

    /// Number of messages in the outbound queue.
    pub fn outbound_len(&self) -> usize {
        self.queue.len()
    }

    /// Iterate the outbound queue, for display.
    pub fn outbound(&self) -> impl Iterator<Item = &OutboundMessage> {
        self.queue.iter()
    }

    /// Iterate stored inbound messages, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &InboundMessage> {
        self.history.oldest_ordered()
    }

    /// The ack packet that should go out next, if any.
    ///
    /// Acks are fire-once: they stay queued while the channel is busy and
    /// are dropped after one successful transmission
    /// ([`Self::commit_ack_sent`]); they are never re-sent afterwards.
    pub fn pending_ack(&self) -> Option<TxPacket> {
        self.acks.first().map(|(station, id)| {
            Packet::new(
                self.own_call.clone(),
                self.destination.clone(),
                Payload::Ack {
                    addressee: station.clone(),
                    id: *id,
                },
            )
        })
    }

    /// Record that the head-of-line ack left the radio.
    pub fn commit_ack_sent(&mut self) {
        if !self.acks.is_empty() {
            self.acks.remove(0);
        }
    }

    /// The message retry that should go out next, if any.
    ///
    /// Returns the delivery id with the packet so the caller can commit the
    /// attempt once the radio accepted it.
    pub fn pending_retry(&self, now: u32) -> Option<(u16, TxPacket)> {
        self.queue
            .iter()
            .find(|msg| {
                msg.state == DeliveryState::Pending
                    && msg.attempt < self.params.max_retries
                    && now.wrapping_sub(msg.next_retry_ms) < u32::MAX / 2
            })
            .map(|msg| {
                let packet = Packet::new(
                    self.own_call.clone(),
                    self.destination.clone(),
                    Payload::Message {
                        addressee: msg.recipient.clone(),
                        text: msg.text.clone(),
                        id: Some(msg.id),
                    },
                );
                (msg.id, packet)
            })
    }

    /// Record that a retry for `id` left the radio.
    pub fn commit_retry_sent(&mut self, id: u16, now: u32) {
        if let Some(msg) = self.queue.iter_mut().find(|msg| msg.id == id) {
            msg.attempt = msg.attempt.saturating_add(1);
            msg.next_retry_ms = now.wrapping_add(self.params.retry_interval_ms);
        }
    }

    /// Fail and remove messages whose retry budget ran out.
    ///
    /// A message fails once its last transmission has waited a full retry
    /// interval without an ack. Each failure is surfaced exactly once,
    /// through the returned list.
    pub fn expire(&mut self, now: u32) -> Vec<(u16, Callsign), MAX_OUTBOUND> {
        let mut failed: Vec<(u16, Callsign), MAX_OUTBOUND> = Vec::new();
        for msg in self.queue.iter_mut() {
            if msg.state == DeliveryState::Pending
                && msg.attempt >= self.params.max_retries
                && now.wrapping_sub(msg.next_retry_ms) < u32::MAX / 2
            {
                msg.state = DeliveryState::Failed;
                // Capacity matches the queue, push cannot fail.
                let _ = failed.push((msg.id, msg.recipient.clone()));
            }
        }
        self.queue.retain(|msg| msg.state != DeliveryState::Failed);
        failed
    }

    /// Process a received packet.
    ///
    /// Acks matching a pending delivery id confirm and drop that message;
    /// unknown ids are ignored without error. Messages addressed to this
    /// station are stored, surfaced, and acked once when they carry an id.
    pub fn on_packet(&mut self, packet: &RxPacket, now: u32) -> Option<MessageEvent> {
        match &packet.payload {
            Payload::Ack { addressee, id } if *addressee == self.own_call => {
                let matched = self
                    .queue
                    .iter()
                    .position(|msg| msg.state == DeliveryState::Pending && msg.id == *id)?;
                let mut msg = self.queue.remove(matched);
                msg.state = DeliveryState::Acked;
                Some(MessageEvent::Acked {
                    id: msg.id,
                    recipient: msg.recipient,
                })
            }
            Payload::Message {
                addressee,
                text,
                id,
            } if *addressee == self.own_call => {
                let inbound = InboundMessage {
                    from: packet.source.clone(),
                    text: text.clone(),
                    received_ms: now,
                };
                self.history.write(inbound.clone());
                if let Some(id) = id {
                    let pending = (packet.source.clone(), *id);
                    if !self.acks.contains(&pending) {
                        // Full ack queue drops the ack; the sender's retry
                        // gives us another chance.
                        let _ = self.acks.push(pending);
                    }
                }
                Some(MessageEvent::Received(inbound))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn own() -> Callsign {
        Callsign::new("N0CALL-7").unwrap()
    }

    fn tocall() -> Callsign {
        Callsign::new("APRS").unwrap()
    }

    fn peer() -> Callsign {
        Callsign::new("CD2RXU-9").unwrap()
    }

    fn manager() -> MessageDeliveryManager {
        MessageDeliveryManager::new(
            own(),
            tocall(),
            MessageParams {
                max_retries: 3,
                retry_interval_ms: 30_000,
            },
        )
    }

    fn ack_from_peer(id: u16) -> RxPacket {
        Packet::new(
            peer(),
            tocall(),
            Payload::Ack {
                addressee: own(),
                id,
            },
        )
    }

    fn message_from_peer(text: &str, id: Option<u16>) -> RxPacket {
        let mut body: String<MAX_MESSAGE_LEN> = String::new();
        body.push_str(text).unwrap();
        Packet::new(
            peer(),
            tocall(),
            Payload::Message {
                addressee: own(),
                text: body,
                id,
            },
        )
    }

    #[test]
    fn test_enqueue_is_due_immediately() {
        let mut manager = manager();
        let id = manager.enqueue(peer(), "hello", 1_000).unwrap();
        let (due_id, packet) = manager.pending_retry(1_000).unwrap();
        assert_eq!(due_id, id);
        match packet.payload {
            Payload::Message { id: msg_id, .. } => assert_eq!(msg_id, Some(id)),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_retry_schedule_and_exhaustion() {
        let mut manager = manager();
        let id = manager.enqueue(peer(), "hello", 0).unwrap();

        // Exactly max_retries transmissions happen.
        let mut now = 0;
        for attempt in 1..=3u8 {
            let (due_id, _) = manager.pending_retry(now).expect("retry due");
            assert_eq!(due_id, id);
            manager.commit_retry_sent(id, now);
            assert_eq!(manager.outbound().next().unwrap().attempt, attempt);
            assert!(manager.pending_retry(now).is_none());
            now += 30_000;
        }
        // Budget exhausted: no fourth transmission, not failed until the
        // last interval has fully elapsed.
        assert!(manager.pending_retry(now).is_none());
        assert!(manager.expire(now - 1).is_empty());
        let failed = manager.expire(now);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, id);
        assert_eq!(manager.outbound_len(), 0);
        // Surfaced exactly once.
        assert!(manager.expire(now + 1).is_empty());
    }

    #[test]
    fn test_ack_cancels_further_retries() {
        let mut manager = manager();
        let id = manager.enqueue(peer(), "hello", 0).unwrap();
        manager.commit_retry_sent(id, 0);
        // Ack lands between attempt 1 and attempt 2.
        let event = manager.on_packet(&ack_from_peer(id), 10_000).unwrap();
        assert_eq!(
            event,
            MessageEvent::Acked {
                id,
                recipient: peer()
            }
        );
        assert_eq!(manager.outbound_len(), 0);
        assert!(manager.pending_retry(60_000).is_none());
    }

    #[test]
    fn test_unknown_ack_ignored() {
        let mut manager = manager();
        manager.enqueue(peer(), "hello", 0).unwrap();
        assert!(manager.on_packet(&ack_from_peer(999), 1_000).is_none());
        assert_eq!(manager.outbound_len(), 1);
    }

    #[test]
    fn test_inbound_message_stored_and_acked_once() {
        let mut manager = manager();
        let event = manager.on_packet(&message_from_peer("hi there", Some(42)), 5_000);
        match event {
            Some(MessageEvent::Received(msg)) => {
                assert_eq!(msg.from, peer());
                assert_eq!(msg.text.as_str(), "hi there");
                assert_eq!(msg.received_ms, 5_000);
            }
            other => panic!("unexpected event {:?}", other),
        }
        // An ack is pending until it gets through once.
        let ack = manager.pending_ack().expect("ack queued");
        match ack.payload {
            Payload::Ack { addressee, id } => {
                assert_eq!(addressee, peer());
                assert_eq!(id, 42);
            }
            other => panic!("unexpected payload {:?}", other),
        }
        manager.commit_ack_sent();
        assert!(manager.pending_ack().is_none());
        assert_eq!(manager.history().count(), 1);
    }

    #[test]
    fn test_inbound_message_without_id_not_acked() {
        let mut manager = manager();
        manager.on_packet(&message_from_peer("no ack wanted", None), 0);
        assert!(manager.pending_ack().is_none());
        assert_eq!(manager.history().count(), 1);
    }

    #[test]
    fn test_message_for_other_station_ignored() {
        let mut manager = manager();
        let mut packet = message_from_peer("hi", Some(1));
        if let Payload::Message { addressee, .. } = &mut packet.payload {
            *addressee = Callsign::new("EA5JMB-9").unwrap();
        }
        assert!(manager.on_packet(&packet, 0).is_none());
        assert_eq!(manager.history().count(), 0);
        assert!(manager.pending_ack().is_none());
    }

    #[test]
    fn test_history_overwrites_oldest() {
        let mut manager = manager();
        extern crate std;
        use std::format;
        for i in 0..20 {
            manager.on_packet(&message_from_peer(&format!("msg {}", i), None), i);
        }
        assert_eq!(manager.history().count(), INBOUND_HISTORY);
        let oldest = manager.history().next().unwrap();
        assert_eq!(oldest.text.as_str(), "msg 4");
    }

    #[test]
    fn test_message_id_wraps_before_1000() {
        let mut manager = manager();
        let mut last_id = 0;
        for _ in 0..1005 {
            let id = manager.enqueue(peer(), "x", 0).unwrap();
            assert!(id >= 1 && id < MESSAGE_ID_SPAN);
            if last_id == 999 {
                assert_eq!(id, 1);
            }
            last_id = id;
            manager.on_packet(&ack_from_peer(id), 0);
        }
    }

    #[test]
    fn test_queue_full_rejected() {
        let mut manager = manager();
        for _ in 0..MAX_OUTBOUND {
            manager.enqueue(peer(), "x", 0).unwrap();
        }
        assert_eq!(
            manager.enqueue(peer(), "overflow", 0),
            Err(MessageError::QueueFull)
        );
    }
}
