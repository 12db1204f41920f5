//! SmartBeacon rate control
//!
//! Decides *when* the tracker transmits its own position. The interval
//! scales with speed between a slow and a fast rate, sharp heading changes
//! force an immediate beacon (corner pegging), and a tracker that stops
//! moving falls back to a much slower standing cadence so it keeps
//! announcing presence without loading the shared channel.
//!
//! The scheduler only decides; composing the packet is [`BeaconComposer`]'s
//! job and transmitting it is the tracker loop's.

pub mod composer;

pub use composer::BeaconComposer;

use crate::geo::{course_delta, haversine_distance_m};
use crate::parameters::SmartBeaconParams;

/// Movement below this distance from the last transmitted position counts
/// as "not materially moved" for stationary detection (meters).
const STANDING_EPSILON_M: f32 = 30.0;

/// One GPS sample as delivered by the fix source.
///
/// Read-only to the core; superseded whenever a new sample arrives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    /// Latitude in decimal degrees, north positive.
    pub lat: f32,
    /// Longitude in decimal degrees, east positive.
    pub lon: f32,
    /// Ground speed in km/h.
    pub speed_kmh: f32,
    /// Course over ground in degrees, 0 = north.
    pub course_deg: f32,
    /// Receiver timestamp of the sample (ms).
    pub timestamp_ms: u32,
    /// False while the receiver has no usable solution.
    pub valid: bool,
}

impl Fix {
    /// An invalid placeholder fix.
    pub const fn invalid() -> Self {
        Self {
            lat: 0.0,
            lon: 0.0,
            speed_kmh: 0.0,
            course_deg: 0.0,
            timestamp_ms: 0,
            valid: false,
        }
    }
}

/// Outcome of evaluating a fix against the beacon timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeaconDecision {
    /// Nothing due this tick.
    #[default]
    None,
    /// Transmit a position beacon now.
    SendPosition,
    /// Transmit a standing (stationary-cadence) beacon now.
    SendStanding,
}

/// Scheduler lifecycle phase.
///
/// `Evaluating` exists only within a call to
/// [`SmartBeaconScheduler::on_fix`]; externally the scheduler is observed
/// either `Idle` (waiting on timers) or `Armed` (a decision is awaiting the
/// composer and the radio).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerPhase {
    /// Waiting for an interval or trigger.
    #[default]
    Idle,
    /// A fix is being evaluated.
    Evaluating,
    /// A decision was made and has not been acted on yet.
    Armed,
}

/// Adaptive beacon scheduler.
///
/// Owns all beacon timing state. State is mutated in exactly two places:
/// [`Self::on_fix`] (evaluation) and [`Self::mark_sent`] (after the packet
/// actually left the radio).
pub struct SmartBeaconScheduler {
    params: SmartBeaconParams,
    phase: SchedulerPhase,
    /// False until the first beacon went out (cold-start trigger).
    sent_any: bool,
    last_tx_ms: u32,
    last_tx_lat: f32,
    last_tx_lon: f32,
    /// True once a valid position has been transmitted.
    last_tx_valid_pos: bool,
    last_tx_course: f32,
    current_interval_ms: u32,
    /// Beacons sent since the comment text last went out. Starts at the
    /// threshold so the first beacon carries the comment.
    beacons_since_comment: u8,
    /// Set when the position stopped changing; cleared on movement.
    stationary_since: Option<u32>,
    /// Distance from the last transmitted position (m), for display.
    distance_since_tx_m: f32,
}

impl SmartBeaconScheduler {
    /// Create a scheduler with the given rate-control parameters.
    pub fn new(params: SmartBeaconParams) -> Self {
        let initial_interval = params.slow_rate_ms;
        let comment_threshold = params.comment_every_n;
        Self {
            params,
            phase: SchedulerPhase::Idle,
            sent_any: false,
            last_tx_ms: 0,
            last_tx_lat: 0.0,
            last_tx_lon: 0.0,
            last_tx_valid_pos: false,
            last_tx_course: 0.0,
            current_interval_ms: initial_interval,
            beacons_since_comment: comment_threshold,
            stationary_since: None,
            distance_since_tx_m: 0.0,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// Current target interval between beacons (ms).
    ///
    /// Always within `[fast_rate_ms, slow_rate_ms]`.
    pub fn current_interval_ms(&self) -> u32 {
        self.current_interval_ms
    }

    /// Distance from the last transmitted position (m).
    pub fn distance_since_tx_m(&self) -> f32 {
        self.distance_since_tx_m
    }

    /// True when the next beacon should carry the profile comment.
    pub fn comment_due(&self) -> bool {
        self.beacons_since_comment >= self.params.comment_every_n
    }

    /// Target interval for a given speed.
    ///
    /// Linear between the slow rate at `low_speed_kmh` and the fast rate at
    /// `high_speed_kmh`, clamped outside that band.
    pub fn interval_for_speed(&self, speed_kmh: f32) -> u32 {
        let p = &self.params;
        if speed_kmh >= p.high_speed_kmh {
            return p.fast_rate_ms;
        }
        if speed_kmh <= p.low_speed_kmh {
            return p.slow_rate_ms;
        }
        let span = p.slow_rate_ms.saturating_sub(p.fast_rate_ms) as f32;
        let fraction = (speed_kmh - p.low_speed_kmh) / (p.high_speed_kmh - p.low_speed_kmh);
        let interval = p.slow_rate_ms as f32 - span * fraction;
        (interval as u32).max(p.fast_rate_ms).min(p.slow_rate_ms)
    }

    /// Evaluate a fresh fix against the beacon timers.
    ///
    /// Invalid fixes are skipped silently with no state mutation. While a
    /// previous decision is still armed (awaiting the radio) no new decision
    /// is produced.
    pub fn on_fix(&mut self, fix: &Fix, now: u32) -> BeaconDecision {
        if !fix.valid {
            return BeaconDecision::None;
        }
        if self.phase == SchedulerPhase::Armed {
            return BeaconDecision::None;
        }
        self.phase = SchedulerPhase::Evaluating;

        // Cold start: announce as soon as the first valid fix arrives.
        if !self.sent_any {
            return self.arm(BeaconDecision::SendPosition);
        }

        let speed = if fix.speed_kmh > 0.0 { fix.speed_kmh } else { 0.0 };
        self.current_interval_ms = self.interval_for_speed(speed);
        let elapsed = now.wrapping_sub(self.last_tx_ms);

        if self.last_tx_valid_pos {
            self.distance_since_tx_m =
                haversine_distance_m(self.last_tx_lat, self.last_tx_lon, fix.lat, fix.lon);
        }

        // Corner pegging: a sharp heading change beacons immediately,
        // independent of the interval timer, rate-limited by the corner
        // holdoff.
        if self.last_tx_valid_pos && speed > 0.0 {
            let delta = course_delta(fix.course_deg, self.last_tx_course);
            let abs_delta = if delta < 0.0 { -delta } else { delta };
            let speed_floor = if speed > 1.0 { speed } else { 1.0 };
            let threshold = self.params.turn_min_deg + self.params.turn_slope / speed_floor;
            if abs_delta >= threshold && elapsed >= self.params.min_corner_time_ms {
                return self.arm(BeaconDecision::SendPosition);
            }
        }

        // Stationary tracking relative to the last transmitted position.
        let moved = !self.last_tx_valid_pos || self.distance_since_tx_m >= STANDING_EPSILON_M;
        let stationary = speed <= 0.0 || !moved;
        if stationary {
            if self.stationary_since.is_none() {
                self.stationary_since = Some(now);
            }
        } else {
            self.stationary_since = None;
        }

        let standing_mode = match self.stationary_since {
            Some(since) => now.wrapping_sub(since) > self.current_interval_ms,
            None => false,
        };

        if standing_mode {
            if elapsed >= self.params.standing_update_ms {
                return self.arm(BeaconDecision::SendStanding);
            }
        } else if elapsed >= self.current_interval_ms {
            return self.arm(BeaconDecision::SendPosition);
        }

        self.phase = SchedulerPhase::Idle;
        BeaconDecision::None
    }

    fn arm(&mut self, decision: BeaconDecision) -> BeaconDecision {
        self.phase = SchedulerPhase::Armed;
        decision
    }

    /// Drop an armed decision without transmitting.
    ///
    /// Used when the fix that produced the decision is no longer current.
    pub fn disarm(&mut self) {
        self.phase = SchedulerPhase::Idle;
    }

    /// Record a successful beacon transmission.
    ///
    /// `with_comment` states whether the composed packet carried the profile
    /// comment, which resets the comment cycle.
    pub fn mark_sent(&mut self, fix: &Fix, now: u32, with_comment: bool) {
        self.sent_any = true;
        self.last_tx_ms = now;
        self.last_tx_lat = fix.lat;
        self.last_tx_lon = fix.lon;
        self.last_tx_valid_pos = fix.valid;
        self.last_tx_course = fix.course_deg;
        self.distance_since_tx_m = 0.0;
        if with_comment {
            self.beacons_since_comment = 0;
        } else {
            self.beacons_since_comment = self.beacons_since_comment.saturating_add(1);
        }
        self.phase = SchedulerPhase::Idle;
    }
}
