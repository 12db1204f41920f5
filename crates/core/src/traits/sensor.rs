//! Sensor sampling abstraction for telemetry frames.

use crate::packet::SensorReadings;

/// Supplies environmental readings at telemetry transmit time.
///
/// Implementations poll whatever hardware is fitted (barometric module,
/// battery gauge). The core samples once per telemetry frame and never
/// caches readings between frames.
pub trait SensorSource {
    /// Take a fresh sample of all available readings.
    fn sample(&mut self) -> SensorReadings;
}
