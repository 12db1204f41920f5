//! Host notification events
//!
//! The core never calls into display or notification code. Everything the
//! host might want to render is queued as an event and drained by polling,
//! dispatched through one `match` in the host's main loop.

use heapless::Deque;

use crate::message::InboundMessage;
use crate::packet::Callsign;

/// Capacity of the event queue; the oldest event is dropped on overflow.
pub const MAX_EVENTS: usize = 16;

/// Something the host layer may want to surface.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// A position beacon went out.
    BeaconSent {
        /// True for a stationary-cadence beacon.
        standing: bool,
        /// True when the profile comment was attached.
        with_comment: bool,
    },
    /// The one-shot startup status went out.
    StatusSent,
    /// A message addressed to this station arrived.
    MessageReceived(InboundMessage),
    /// An outbound message was confirmed delivered.
    MessageAcked {
        /// Confirmed delivery id.
        id: u16,
        /// Station that confirmed it.
        recipient: Callsign,
    },
    /// An outbound message ran out of retries.
    DeliveryFailed {
        /// Failed delivery id.
        id: u16,
        /// Station the message was for.
        recipient: Callsign,
    },
    /// A heard packet was repeated on the channel.
    RelayPerformed {
        /// Originating station of the relayed packet.
        source: Callsign,
    },
    /// A telemetry frame went out.
    TelemetrySent {
        /// Sequence number of the frame.
        sequence: u16,
    },
}

/// Bounded event queue, oldest dropped on overflow.
pub struct EventQueue {
    events: Deque<TrackerEvent, MAX_EVENTS>,
    dropped: u32,
}

impl EventQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
            dropped: 0,
        }
    }

    /// Append an event, evicting the oldest when full.
    pub fn push(&mut self, event: TrackerEvent) {
        if self.events.is_full() {
            self.events.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        // Room ensured above, push cannot fail.
        let _ = self.events.push_back(event);
    }

    /// Take the oldest queued event.
    pub fn pop(&mut self) -> Option<TrackerEvent> {
        self.events.pop_front()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events lost to overflow since start.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
