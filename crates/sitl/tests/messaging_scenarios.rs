//! Message delivery scenarios: acks, retries, failures, lossy channels.

use aprs_tracker_core::{
    BeaconProfile, Callsign, Payload, ProfileSet, TimeSource, TrackerEvent, TrackerParams,
};
use aprs_tracker_sitl::{SimClock, SimHarness, SimRadio};

fn profiles() -> ProfileSet {
    ProfileSet::single(BeaconProfile::new(Callsign::new("N0CALL-7").unwrap()))
}

fn params() -> TrackerParams {
    // Digipeating off: these scenarios watch the message traffic alone.
    let mut params = TrackerParams::default();
    params.digi.enabled = false;
    params
}

fn peer() -> Callsign {
    Callsign::new("CD2RXU-9").unwrap()
}

fn message_frames(harness: &SimHarness) -> Vec<&String> {
    harness
        .radio()
        .wire_log()
        .iter()
        .filter(|frame| frame.contains(":CD2RXU-9 :") && !frame.contains(":ack"))
        .collect()
}

#[test]
fn ack_after_first_attempt_stops_retries() {
    let mut harness = SimHarness::new(profiles(), params());
    let id = harness
        .tracker
        .enqueue_message(peer(), "QRV tonight?", harness.clock.now_ms())
        .unwrap();

    // First transmission happens on the next tick.
    harness.step(1_000);
    assert_eq!(message_frames(&harness).len(), 1);
    assert!(message_frames(&harness)[0].ends_with(&format!("{{{}", id)));

    // The recipient acks before the retry interval expires.
    harness
        .radio_mut()
        .inject_wire("CD2RXU-9>APRS::N0CALL-7 :ack1")
        .unwrap();
    harness.step(1_000);
    assert!(harness
        .events
        .iter()
        .any(|event| matches!(event, TrackerEvent::MessageAcked { id: 1, .. })));

    // Five more minutes pass without another transmission of it.
    harness.run_for(300_000, 1_000);
    assert_eq!(message_frames(&harness).len(), 1);
    assert_eq!(
        harness.count_events(|event| matches!(event, TrackerEvent::DeliveryFailed { .. })),
        0
    );
}

#[test]
fn unanswered_message_retries_then_fails_once() {
    let mut harness = SimHarness::new(profiles(), params());
    harness
        .tracker
        .enqueue_message(peer(), "anyone out there", harness.clock.now_ms())
        .unwrap();
    // Default policy: 3 transmissions, 30s apart, then failure.
    harness.run_for(200_000, 1_000);

    assert_eq!(message_frames(&harness).len(), 3);
    assert_eq!(
        harness.count_events(|event| matches!(event, TrackerEvent::DeliveryFailed { .. })),
        1
    );
    // The queue is clear for the next message.
    assert_eq!(harness.tracker.messages().outbound_len(), 0);
}

#[test]
fn lossy_channel_still_transmits_the_full_retry_budget() {
    let radio = SimRadio::with_busy_probability(0.4, 11);
    let mut harness = SimHarness::with_radio(radio, SimClock::new(), profiles(), params());
    harness
        .tracker
        .enqueue_message(peer(), "rough band today", harness.clock.now_ms())
        .unwrap();
    harness.run_for(400_000, 1_000);

    // Refused sends do not consume attempts: exactly three message frames
    // made it to air before the failure.
    assert_eq!(message_frames(&harness).len(), 3);
    assert!(harness.radio().refused() > 0);
    assert_eq!(
        harness.count_events(|event| matches!(event, TrackerEvent::DeliveryFailed { .. })),
        1
    );
}

#[test]
fn inbound_message_is_acked_surfaced_and_stored() {
    let mut harness = SimHarness::new(profiles(), params());
    harness
        .radio_mut()
        .inject_wire("CD2RXU-9>APRS::N0CALL-7 :QSL? meet at the summit{77")
        .unwrap();
    harness.step(1_000);

    // Fire-once ack went straight out.
    let acks: Vec<_> = harness
        .radio()
        .wire_log()
        .iter()
        .filter(|frame| frame.contains(":ack77"))
        .collect();
    assert_eq!(acks.len(), 1);
    assert!(acks[0].starts_with("N0CALL-7>APRS::CD2RXU-9 :"));

    // Surfaced to the host and kept in history.
    assert!(harness.events.iter().any(|event| matches!(
        event,
        TrackerEvent::MessageReceived(msg) if msg.text.as_str() == "QSL? meet at the summit"
    )));
    assert_eq!(harness.tracker.messages().history().count(), 1);

    // No retries of the ack afterwards.
    harness.run_for(120_000, 1_000);
    let acks_later = harness
        .radio()
        .wire_log()
        .iter()
        .filter(|frame| frame.contains(":ack77"))
        .count();
    assert_eq!(acks_later, 1);
}

#[test]
fn senders_retry_is_acked_again() {
    let mut harness = SimHarness::new(profiles(), params());
    // The sender repeats the message because our first ack was lost on air.
    harness
        .radio_mut()
        .inject_wire("CD2RXU-9>APRS::N0CALL-7 :are you there{5")
        .unwrap();
    harness.step(1_000);
    harness
        .radio_mut()
        .inject_wire("CD2RXU-9>APRS::N0CALL-7 :are you there{5")
        .unwrap();
    harness.step(1_000);

    let acks = harness
        .radio()
        .wire_log()
        .iter()
        .filter(|frame| frame.contains(":ack5"))
        .count();
    assert_eq!(acks, 2);
}

#[test]
fn ack_for_unknown_id_is_ignored() {
    let mut harness = SimHarness::new(profiles(), params());
    harness
        .radio_mut()
        .inject_wire("CD2RXU-9>APRS::N0CALL-7 :ack404")
        .unwrap();
    harness.run_for(5_000, 1_000);
    assert!(harness.events.is_empty());
    assert!(harness.radio().transmitted().is_empty());
}

#[test]
fn queued_message_does_not_block_later_ones() {
    let mut harness = SimHarness::new(profiles(), params());
    let now = harness.clock.now_ms();
    harness
        .tracker
        .enqueue_message(peer(), "first, doomed", now)
        .unwrap();
    let second = harness
        .tracker
        .enqueue_message(Callsign::new("EA5JMB-9").unwrap(), "second, acked", now)
        .unwrap();
    harness.run_for(10_000, 1_000);
    // Both went out; ack the second.
    harness
        .radio_mut()
        .inject_wire(&format!("EA5JMB-9>APRS::N0CALL-7 :ack{}", second))
        .unwrap();
    harness.run_for(200_000, 1_000);

    assert!(harness
        .events
        .iter()
        .any(|event| matches!(event, TrackerEvent::MessageAcked { id, .. } if *id == second)));
    assert_eq!(
        harness.count_events(|event| matches!(event, TrackerEvent::DeliveryFailed { .. })),
        1
    );
    assert_eq!(harness.tracker.messages().outbound_len(), 0);
}

#[test]
fn telemetry_runs_on_its_own_cadence() {
    let mut params = params();
    params.telemetry.enabled = true;
    params.telemetry.interval_ms = 60_000;
    let mut harness = SimHarness::new(profiles(), params);
    harness.run_for(310_000, 1_000);

    let telemetry: Vec<_> = harness
        .radio()
        .transmitted()
        .iter()
        .filter_map(|packet| match &packet.payload {
            Payload::Telemetry { sequence, .. } => Some(*sequence),
            _ => None,
        })
        .collect();
    assert_eq!(telemetry, vec![0, 1, 2, 3, 4]);
}
