//! Scripted drive demo.
//!
//! Runs the tracker over a short simulated drive with a stop and a couple of
//! sharp corners, some third-party traffic and an exchanged message, then
//! prints everything that went on air.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p aprs-tracker-sitl --example tracker_sim
//! ```

use aprs_tracker_core::{
    BeaconProfile, Callsign, ProfileSet, SmartBeaconParams, TrackerParams,
};
use aprs_tracker_sitl::SimHarness;

fn main() {
    env_logger::init();

    let profile = BeaconProfile::new(Callsign::new("N0CALL-7").unwrap())
        .with_comment("LoRa tracker demo");
    let mut params = TrackerParams::default().with_startup_status("tracker up");
    params.smart_beacon = SmartBeaconParams {
        slow_rate_ms: 300_000,
        fast_rate_ms: 60_000,
        ..Default::default()
    };
    params.digi.enabled = true;
    params.telemetry.enabled = true;
    params.telemetry.interval_ms = 300_000;

    let mut harness = SimHarness::new(ProfileSet::single(profile), params);

    // Ten minutes of driving: north, a hard right, east, then parked.
    let (lat, lon) = harness.fixes.add_run(1_000, 35.0, 139.0, 0.0, 70.0, 1_000, 180);
    let (lat, lon) = harness.fixes.add_run(181_000, lat, lon, 90.0, 50.0, 1_000, 180);
    for i in 0..24 {
        harness.fixes.push(
            361_000 + i * 10_000,
            aprs_tracker_core::Fix {
                lat,
                lon,
                speed_kmh: 0.0,
                course_deg: 90.0,
                timestamp_ms: 361_000 + i * 10_000,
                valid: true,
            },
        );
    }

    // Some channel activity along the way.
    harness
        .radio_mut()
        .inject_wire("CD2RXU-9>APRS:>mobile and listening")
        .unwrap();
    harness
        .tracker
        .enqueue_message(Callsign::new("CD2RXU-9").unwrap(), "QRV?", 0)
        .unwrap();

    harness.run_for(40_000, 1_000);
    // The peer acks our message mid-drive.
    harness
        .radio_mut()
        .inject_wire("CD2RXU-9>APRS::N0CALL-7 :ack1")
        .unwrap();
    harness.run_for(560_000, 1_000);

    println!("=== on air ===");
    for frame in harness.tracker.radio().wire_log() {
        println!("{}", frame);
    }
    println!("=== events ===");
    for event in &harness.events {
        println!("{:?}", event);
    }
}
