//! Tracker super-loop
//!
//! One cooperative, tick-driven loop owns the radio. Each tick fully
//! processes freshly received packets (station bookkeeping, then message
//! delivery) before any transmit decision, then issues at most one send
//! attempt, arbitrated across the competing producers: raw control-channel
//! packets, acks, message retries, relays, beacons and telemetry.
//!
//! Nothing here blocks; a refused `try_send` simply leaves the action
//! pending for a later tick.

pub mod events;

pub use events::{EventQueue, TrackerEvent, MAX_EVENTS};

use crate::beacon::{BeaconComposer, BeaconDecision, Fix, SmartBeaconScheduler};
use crate::message::{MessageDeliveryManager, MessageError, MessageEvent};
use crate::packet::TxPacket;
use crate::parameters::{ProfileSet, TrackerParams};
use crate::station::StationTracker;
use crate::telemetry::TelemetryScheduler;
use crate::traits::{RadioPort, SensorSource};

pub use crate::parameters::TxPriority;

/// Received packets fully processed per tick.
const MAX_RX_PER_TICK: usize = 4;

/// How often the station table is swept for expired entries (ms).
const SWEEP_INTERVAL_MS: u32 = 10_000;

/// The transmit arbitration candidates, highest priority first.
#[derive(Clone, Copy, PartialEq, Eq)]
enum TxAction {
    Raw,
    Ack,
    Retry,
    Relay,
    Beacon,
    Telemetry,
}

/// The tracker core: beacon scheduling, station tracking and message
/// delivery sharing one radio channel.
pub struct Tracker<R: RadioPort, S: SensorSource> {
    radio: R,
    sensors: S,
    params: TrackerParams,
    profiles: ProfileSet,
    scheduler: SmartBeaconScheduler,
    stations: StationTracker,
    messages: MessageDeliveryManager,
    telemetry: TelemetryScheduler,
    events: EventQueue,
    current_fix: Fix,
    armed_decision: BeaconDecision,
    pending_relay: Option<TxPacket>,
    pending_raw: Option<TxPacket>,
    startup_status_due: bool,
    last_sweep_ms: u32,
}

impl<R: RadioPort, S: SensorSource> Tracker<R, S> {
    /// Assemble a tracker from its collaborators and configuration.
    pub fn new(radio: R, sensors: S, profiles: ProfileSet, params: TrackerParams, now: u32) -> Self {
        let active = profiles.active();
        let stations = StationTracker::new(active.callsign.clone(), params.digi.clone());
        let messages = MessageDeliveryManager::new(
            active.callsign.clone(),
            active.destination.clone(),
            params.message,
        );
        let scheduler = SmartBeaconScheduler::new(params.smart_beacon.clone());
        let telemetry = TelemetryScheduler::new(params.telemetry, now);
        let startup_status_due = !params.startup_status.is_empty();
        Self {
            radio,
            sensors,
            params,
            profiles,
            scheduler,
            stations,
            messages,
            telemetry,
            events: EventQueue::new(),
            current_fix: Fix::invalid(),
            armed_decision: BeaconDecision::None,
            pending_relay: None,
            pending_raw: None,
            startup_status_due,
            last_sweep_ms: now,
        }
    }

    /// The radio port, for host-side inspection.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Mutable radio port access (simulation harnesses, driver upkeep).
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// The heard-station table, for display.
    pub fn stations(&self) -> &StationTracker {
        &self.stations
    }

    /// The message delivery layer, for display.
    pub fn messages(&self) -> &MessageDeliveryManager {
        &self.messages
    }

    /// The beacon scheduler, for display.
    pub fn scheduler(&self) -> &SmartBeaconScheduler {
        &self.scheduler
    }

    /// Take the oldest pending host notification.
    pub fn next_event(&mut self) -> Option<TrackerEvent> {
        self.events.pop()
    }

    /// Deliver a fresh GPS sample.
    ///
    /// Invalid samples are remembered as the current fix (for display) but
    /// produce no beacon decision; losing the solution also cancels an
    /// armed decision, which re-arms on the next valid sample.
    pub fn on_fix(&mut self, fix: Fix, now: u32) {
        if !fix.valid {
            if self.armed_decision != BeaconDecision::None {
                self.scheduler.disarm();
                self.armed_decision = BeaconDecision::None;
            }
            self.current_fix = fix;
            return;
        }
        let decision = self.scheduler.on_fix(&fix, now);
        self.current_fix = fix;
        if decision != BeaconDecision::None {
            self.armed_decision = decision;
        }
    }

    /// Queue a text message for acknowledged delivery.
    pub fn enqueue_message(
        &mut self,
        recipient: crate::packet::Callsign,
        text: &str,
        now: u32,
    ) -> Result<u16, MessageError> {
        self.messages.enqueue(recipient, text, now)
    }

    /// Control-channel bypass: transmit a pre-built packet as soon as the
    /// channel allows, ahead of everything else.
    ///
    /// Returns `true` when the packet went out immediately. When the channel
    /// is busy the packet is parked in a single-slot queue and sent on a
    /// later tick; a second raw packet while the slot is occupied is
    /// rejected with `false` and dropped.
    pub fn send_raw(&mut self, packet: TxPacket) -> bool {
        if self.radio.try_send(&packet) {
            return true;
        }
        if self.pending_raw.is_none() {
            self.pending_raw = Some(packet);
        }
        false
    }

    /// Switch to the next beacon profile.
    ///
    /// Station bookkeeping and message identity follow the new profile; the
    /// beacon timers carry over unchanged.
    pub fn next_profile(&mut self) -> &crate::parameters::BeaconProfile {
        let active = self.profiles.cycle();
        self.stations.set_own_call(active.callsign.clone());
        self.messages
            .set_identity(active.callsign.clone(), active.destination.clone());
        self.profiles.active()
    }

    /// Run one loop iteration.
    ///
    /// Receives and dispatches pending packets, sweeps the station table,
    /// expires failed deliveries and issues at most one send attempt.
    /// Returns `true` when a transmission left the radio this tick.
    pub fn tick(&mut self, now: u32) -> bool {
        self.receive(now);

        if now.wrapping_sub(self.last_sweep_ms) >= SWEEP_INTERVAL_MS {
            self.stations.sweep(now);
            self.last_sweep_ms = now;
        }

        for (id, recipient) in self.messages.expire(now) {
            self.events.push(TrackerEvent::DeliveryFailed { id, recipient });
        }

        self.transmit(now)
    }

    /// Drain and dispatch received packets.
    ///
    /// Every packet is fully processed by the station tracker and the
    /// message layer before this tick's transmit decision.
    fn receive(&mut self, now: u32) {
        for _ in 0..MAX_RX_PER_TICK {
            let Some(packet) = self.radio.try_receive() else {
                break;
            };
            if let Some(relayed) = self.stations.on_packet(&packet, now) {
                // Single relay slot; an occupied slot means the channel is
                // already backed up and the extra relay is dropped.
                if self.pending_relay.is_none() {
                    self.pending_relay = Some(relayed);
                }
            }
            match self.messages.on_packet(&packet, now) {
                Some(MessageEvent::Received(inbound)) => {
                    self.events.push(TrackerEvent::MessageReceived(inbound));
                }
                Some(MessageEvent::Acked { id, recipient }) => {
                    self.events.push(TrackerEvent::MessageAcked { id, recipient });
                }
                None => {}
            }
        }
    }

    fn priority_order(&self) -> [TxAction; 6] {
        match self.params.tx_priority {
            TxPriority::MessageFirst => [
                TxAction::Raw,
                TxAction::Ack,
                TxAction::Retry,
                TxAction::Relay,
                TxAction::Beacon,
                TxAction::Telemetry,
            ],
            TxPriority::BeaconFirst => [
                TxAction::Raw,
                TxAction::Ack,
                TxAction::Beacon,
                TxAction::Retry,
                TxAction::Relay,
                TxAction::Telemetry,
            ],
        }
    }

    /// Issue at most one send attempt, highest-priority action first.
    ///
    /// When the chosen action is refused by the radio nothing lower in the
    /// order is tried: the channel is busy and every attempt would fail the
    /// same way. The action stays pending for a later tick.
    fn transmit(&mut self, now: u32) -> bool {
        for action in self.priority_order() {
            match action {
                TxAction::Raw => {
                    if self.pending_raw.is_some() {
                        return self.transmit_raw();
                    }
                }
                TxAction::Ack => {
                    if self.messages.pending_ack().is_some() {
                        return self.transmit_ack();
                    }
                }
                TxAction::Retry => {
                    if self.messages.pending_retry(now).is_some() {
                        return self.transmit_retry(now);
                    }
                }
                TxAction::Relay => {
                    if self.pending_relay.is_some() {
                        return self.transmit_relay();
                    }
                }
                TxAction::Beacon => {
                    if self.startup_status_due {
                        return self.transmit_status();
                    }
                    if self.armed_decision != BeaconDecision::None && self.current_fix.valid {
                        return self.transmit_beacon(now);
                    }
                }
                TxAction::Telemetry => {
                    if self.telemetry.due(now) {
                        return self.transmit_telemetry(now);
                    }
                }
            }
        }
        false
    }

    fn transmit_raw(&mut self) -> bool {
        let Some(packet) = self.pending_raw.take() else {
            return false;
        };
        if self.radio.try_send(&packet) {
            true
        } else {
            self.pending_raw = Some(packet);
            false
        }
    }

    fn transmit_ack(&mut self) -> bool {
        let Some(packet) = self.messages.pending_ack() else {
            return false;
        };
        if self.radio.try_send(&packet) {
            self.messages.commit_ack_sent();
            true
        } else {
            false
        }
    }

    fn transmit_retry(&mut self, now: u32) -> bool {
        let Some((id, packet)) = self.messages.pending_retry(now) else {
            return false;
        };
        if self.radio.try_send(&packet) {
            self.messages.commit_retry_sent(id, now);
            true
        } else {
            false
        }
    }

    fn transmit_relay(&mut self) -> bool {
        let Some(packet) = self.pending_relay.take() else {
            return false;
        };
        let source = packet.source.clone();
        if self.radio.try_send(&packet) {
            self.events.push(TrackerEvent::RelayPerformed { source });
            true
        } else {
            self.pending_relay = Some(packet);
            false
        }
    }

    fn transmit_status(&mut self) -> bool {
        let packet =
            BeaconComposer::status(self.profiles.active(), self.params.startup_status.as_str());
        if self.radio.try_send(&packet) {
            self.startup_status_due = false;
            self.events.push(TrackerEvent::StatusSent);
            true
        } else {
            false
        }
    }

    fn transmit_beacon(&mut self, now: u32) -> bool {
        let with_comment = self.scheduler.comment_due();
        let packet =
            BeaconComposer::position(self.profiles.active(), &self.current_fix, with_comment);
        if self.radio.try_send(&packet) {
            let standing = self.armed_decision == BeaconDecision::SendStanding;
            self.scheduler.mark_sent(&self.current_fix, now, with_comment);
            self.armed_decision = BeaconDecision::None;
            self.events.push(TrackerEvent::BeaconSent {
                standing,
                with_comment,
            });
            true
        } else {
            false
        }
    }

    fn transmit_telemetry(&mut self, now: u32) -> bool {
        let readings = self.sensors.sample();
        let active = self.profiles.active();
        let packet = self
            .telemetry
            .compose(&active.callsign, &active.destination, readings);
        if self.radio.try_send(&packet) {
            let sequence = self.telemetry.sequence();
            self.telemetry.commit_sent(now);
            self.events.push(TrackerEvent::TelemetrySent { sequence });
            true
        } else {
            false
        }
    }
}
