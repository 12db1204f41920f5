//! Scripted GPS fix sources.

use std::collections::VecDeque;

use aprs_tracker_core::Fix;

/// Meters of northing per degree of latitude, near enough for short
/// simulated routes.
const M_PER_DEG_LAT: f32 = 111_320.0;

/// Time-stamped fix script.
///
/// Fixes are handed out in order once simulated time reaches their
/// timestamp, like a receiver emitting one solution per update cycle.
pub struct ScriptedFixSource {
    steps: VecDeque<(u32, Fix)>,
}

impl ScriptedFixSource {
    /// An empty script.
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
        }
    }

    /// Append one fix at an absolute simulated time.
    pub fn push(&mut self, at_ms: u32, fix: Fix) {
        self.steps.push_back((at_ms, fix));
    }

    /// Append an invalid sample (receiver lost its solution).
    pub fn push_outage(&mut self, at_ms: u32) {
        self.steps.push_back((at_ms, Fix::invalid()));
    }

    /// Append a dead-reckoned straight run.
    ///
    /// Starting at (`lat`, `lon`) and `start_ms`, emits `count` fixes every
    /// `interval_ms`, moving along `course_deg` at `speed_kmh`. Returns the
    /// (lat, lon) reached, so runs can be chained into a route.
    #[allow(clippy::too_many_arguments)]
    pub fn add_run(
        &mut self,
        start_ms: u32,
        lat: f32,
        lon: f32,
        course_deg: f32,
        speed_kmh: f32,
        interval_ms: u32,
        count: u32,
    ) -> (f32, f32) {
        let course_rad = course_deg.to_radians();
        let step_m = speed_kmh / 3.6 * interval_ms as f32 / 1000.0;
        let mut lat = lat;
        let mut lon = lon;
        for i in 0..count {
            let at_ms = start_ms.wrapping_add(i * interval_ms);
            self.push(
                at_ms,
                Fix {
                    lat,
                    lon,
                    speed_kmh,
                    course_deg,
                    timestamp_ms: at_ms,
                    valid: true,
                },
            );
            lat += step_m * course_rad.cos() / M_PER_DEG_LAT;
            lon += step_m * course_rad.sin() / (M_PER_DEG_LAT * lat.to_radians().cos());
        }
        (lat, lon)
    }

    /// Hand out the next fix once its timestamp has been reached.
    pub fn poll(&mut self, now: u32) -> Option<Fix> {
        let &(at_ms, fix) = self.steps.front()?;
        if now.wrapping_sub(at_ms) < u32::MAX / 2 {
            self.steps.pop_front();
            Some(fix)
        } else {
            None
        }
    }

    /// Remaining scripted fixes.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl Default for ScriptedFixSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixes_released_in_time_order() {
        let mut source = ScriptedFixSource::new();
        source.add_run(1_000, 35.0, 139.0, 0.0, 36.0, 1_000, 3);
        assert!(source.poll(0).is_none());
        assert!(source.poll(1_000).is_some());
        assert!(source.poll(1_500).is_none());
        assert!(source.poll(2_000).is_some());
        assert!(source.poll(3_000).is_some());
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_run_advances_position_northward() {
        let mut source = ScriptedFixSource::new();
        // 36 km/h due north, one fix per second: 10 m per step.
        let (lat_end, lon_end) = source.add_run(0, 35.0, 139.0, 0.0, 36.0, 1_000, 10);
        assert!(lat_end > 35.0008 && lat_end < 35.001);
        assert!((lon_end - 139.0).abs() < 1e-6);
    }

    #[test]
    fn test_outage_fix_is_invalid() {
        let mut source = ScriptedFixSource::new();
        source.push_outage(500);
        let fix = source.poll(500).unwrap();
        assert!(!fix.valid);
    }
}
