//! Beacon scheduling scenarios against the simulated channel.

use aprs_tracker_core::{
    BeaconProfile, Callsign, Payload, ProfileSet, SmartBeaconParams, TimeSource, TrackerEvent,
    TrackerParams,
};
use aprs_tracker_sitl::{SimClock, SimHarness, SimRadio};

fn profiles() -> ProfileSet {
    ProfileSet::single(
        BeaconProfile::new(Callsign::new("N0CALL-7").unwrap()).with_comment("sitl run"),
    )
}

fn params() -> TrackerParams {
    let mut params = TrackerParams::default();
    params.smart_beacon = SmartBeaconParams {
        low_speed_kmh: 10.0,
        high_speed_kmh: 60.0,
        slow_rate_ms: 300_000,
        fast_rate_ms: 60_000,
        turn_min_deg: 25.0,
        turn_slope: 255.0,
        min_corner_time_ms: 15_000,
        standing_update_ms: 900_000,
        comment_every_n: 10,
    };
    params
}

fn beacon_count(harness: &SimHarness) -> usize {
    harness.count_events(|event| matches!(event, TrackerEvent::BeaconSent { .. }))
}

#[test]
fn highway_run_beacons_at_fast_rate() {
    let mut harness = SimHarness::new(profiles(), params());
    // Five minutes due north at 80 km/h, one fix per second.
    harness.fixes.add_run(1_000, 35.0, 139.0, 0.0, 80.0, 1_000, 300);
    harness.run_for(301_000, 1_000);

    // Cold-start beacon plus one per 60s interval.
    let beacons = beacon_count(&harness);
    assert!(
        (5..=7).contains(&beacons),
        "expected fast-rate beaconing, got {}",
        beacons
    );
    // All transmissions are position reports from our callsign.
    for frame in harness.radio().wire_log() {
        assert!(frame.starts_with("N0CALL-7>APRS"));
    }
}

#[test]
fn corner_peg_beacons_on_sharp_turn() {
    let mut harness = SimHarness::new(profiles(), params());
    // Half a minute east, then a hard turn south.
    let (lat, lon) = harness.fixes.add_run(1_000, 35.0, 139.0, 90.0, 36.0, 1_000, 30);
    harness.fixes.add_run(31_000, lat, lon, 180.0, 36.0, 1_000, 5);
    harness.run_for(36_000, 1_000);

    // Cold start plus the corner-pegged beacon, well before the 300s
    // interval for 36 km/h would expire.
    assert_eq!(beacon_count(&harness), 2);
    let last = harness.radio().transmitted().last().unwrap();
    match &last.payload {
        Payload::Position { course_deg, .. } => assert_eq!(*course_deg, 180.0),
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn gentle_turn_does_not_peg() {
    let mut harness = SimHarness::new(profiles(), params());
    // threshold at 36 km/h = 25 + 255/36 ~= 32deg; a 20deg course change
    // stays under it.
    let (lat, lon) = harness.fixes.add_run(1_000, 35.0, 139.0, 90.0, 36.0, 1_000, 30);
    harness.fixes.add_run(31_000, lat, lon, 110.0, 36.0, 1_000, 5);
    harness.run_for(36_000, 1_000);

    assert_eq!(beacon_count(&harness), 1);
}

#[test]
fn parked_tracker_falls_back_to_standing_updates() {
    let mut harness = SimHarness::new(profiles(), params());
    // One hour parked at the same spot, a fix every 10 seconds.
    for i in 0..360 {
        harness.fixes.push(
            1_000 + i * 10_000,
            aprs_tracker_core::Fix {
                lat: 35.0,
                lon: 139.0,
                speed_kmh: 0.0,
                course_deg: 0.0,
                timestamp_ms: 1_000 + i * 10_000,
                valid: true,
            },
        );
    }
    harness.run_for(3_600_000, 1_000);

    let standing = harness.count_events(|event| {
        matches!(event, TrackerEvent::BeaconSent { standing: true, .. })
    });
    let moving = harness.count_events(|event| {
        matches!(event, TrackerEvent::BeaconSent { standing: false, .. })
    });
    // Cold start (and at most one slow-interval beacon) before the standing
    // cadence takes over at 900s.
    assert!(standing >= 2, "expected standing updates, got {}", standing);
    assert!(moving <= 2, "standing tracker beaconed too much: {}", moving);
}

#[test]
fn busy_channel_defers_beacon_until_clear() {
    let mut harness = SimHarness::new(profiles(), params());
    harness.fixes.add_run(1_000, 35.0, 139.0, 0.0, 80.0, 1_000, 40);
    harness.radio_mut().set_busy(true);
    harness.run_for(30_000, 1_000);
    assert_eq!(harness.radio().transmitted().len(), 0);
    assert!(harness.radio().refused() > 0);

    harness.radio_mut().set_busy(false);
    harness.run_for(2_000, 1_000);
    assert_eq!(beacon_count(&harness), 1);
}

#[test]
fn gps_outage_produces_no_transmissions() {
    let mut harness = SimHarness::new(profiles(), params());
    for i in 0..60 {
        harness.fixes.push_outage(1_000 + i * 1_000);
    }
    harness.run_for(120_000, 1_000);
    assert!(harness.radio().transmitted().is_empty());
}

#[test]
fn beaconing_survives_clock_wraparound() {
    let clock = SimClock::starting_at(u32::MAX - 30_000);
    let start = clock.now_ms().wrapping_add(1_000);
    let mut harness =
        SimHarness::with_radio(SimRadio::new(), clock, profiles(), params());
    harness.fixes.add_run(start, 35.0, 139.0, 0.0, 80.0, 1_000, 120);
    harness.run_for(121_000, 1_000);

    // Cold start, then fast-rate beacons across the wrap.
    let beacons = beacon_count(&harness);
    assert!(
        (2..=4).contains(&beacons),
        "wraparound broke beaconing: {}",
        beacons
    );
}

#[test]
fn comment_attached_on_first_beacon_only_within_cycle() {
    let mut harness = SimHarness::new(profiles(), params());
    harness.fixes.add_run(1_000, 35.0, 139.0, 0.0, 80.0, 1_000, 300);
    harness.run_for(301_000, 1_000);

    let with_comment = harness.count_events(|event| {
        matches!(event, TrackerEvent::BeaconSent { with_comment: true, .. })
    });
    assert_eq!(with_comment, 1);
    assert!(harness.radio().wire_log()[0].ends_with("sitl run"));
}
