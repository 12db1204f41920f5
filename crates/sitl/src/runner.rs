//! Scenario runner
//!
//! Drives a tracker tick by tick against the simulated clock, radio and fix
//! script, collecting transmissions and host events for assertions.

use aprs_tracker_core::{
    ProfileSet, SensorReadings, SensorSource, TimeSource, Tracker, TrackerEvent, TrackerParams,
};
use log::debug;

use crate::fix::ScriptedFixSource;
use crate::radio::SimRadio;
use crate::time::SimClock;

/// Fixed sensor readings for telemetry scenarios.
#[derive(Debug, Clone, Copy)]
pub struct SimSensors {
    /// Readings returned by every sample.
    pub readings: SensorReadings,
}

impl Default for SimSensors {
    fn default() -> Self {
        Self {
            readings: SensorReadings {
                battery_v: 4.05,
                temperature_c: 21.0,
                pressure_hpa: 1012.0,
                humidity_pct: 45.0,
            },
        }
    }
}

impl SensorSource for SimSensors {
    fn sample(&mut self) -> SensorReadings {
        self.readings
    }
}

/// A complete simulated tracker with its collaborators.
pub struct SimHarness {
    /// Shared simulated clock.
    pub clock: SimClock,
    /// The tracker under test (owns the simulated radio).
    pub tracker: Tracker<SimRadio, SimSensors>,
    /// The scripted fix source feeding it.
    pub fixes: ScriptedFixSource,
    /// Every host event observed, in order.
    pub events: Vec<TrackerEvent>,
}

impl SimHarness {
    /// Harness with a quiet channel and the clock at 0.
    pub fn new(profiles: ProfileSet, params: TrackerParams) -> Self {
        Self::with_radio(SimRadio::new(), SimClock::new(), profiles, params)
    }

    /// Harness over a prepared radio and clock.
    pub fn with_radio(
        radio: SimRadio,
        clock: SimClock,
        profiles: ProfileSet,
        params: TrackerParams,
    ) -> Self {
        let now = clock.now_ms();
        let tracker = Tracker::new(radio, SimSensors::default(), profiles, params, now);
        Self {
            clock,
            tracker,
            fixes: ScriptedFixSource::new(),
            events: Vec::new(),
        }
    }

    /// The simulated radio, for injection and log inspection.
    pub fn radio(&self) -> &SimRadio {
        self.tracker.radio()
    }

    /// Mutable access to the simulated radio.
    pub fn radio_mut(&mut self) -> &mut SimRadio {
        self.tracker.radio_mut()
    }

    /// Advance time by `dt_ms` and run one tracker tick.
    pub fn step(&mut self, dt_ms: u32) {
        self.clock.advance(dt_ms);
        let now = self.clock.now_ms();
        while let Some(fix) = self.fixes.poll(now) {
            self.tracker.on_fix(fix, now);
        }
        self.tracker.tick(now);
        while let Some(event) = self.tracker.next_event() {
            debug!("event at {}: {:?}", now, event);
            self.events.push(event);
        }
    }

    /// Run ticks of `tick_ms` until `total_ms` of simulated time passed.
    pub fn run_for(&mut self, total_ms: u32, tick_ms: u32) {
        let mut remaining = total_ms;
        while remaining > 0 {
            let dt = remaining.min(tick_ms);
            self.step(dt);
            remaining -= dt;
        }
    }

    /// Events of one kind, filtered by a predicate.
    pub fn count_events(&self, predicate: impl Fn(&TrackerEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }
}
