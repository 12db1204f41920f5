//! Telemetry scheduling
//!
//! Telemetry frames run on their own fixed cadence, independent of the
//! position beacon timers. Each frame carries a wrapping sequence number
//! and readings sampled from the sensor collaborator at transmit time.

use crate::packet::{Callsign, Packet, Payload, SensorReadings, TxPacket};
use crate::parameters::TelemetryParams;

/// Telemetry sequence numbers occupy 0..=999 (three-digit frame counter).
pub const SEQUENCE_SPAN: u16 = 1000;

/// Fixed-cadence telemetry timer.
pub struct TelemetryScheduler {
    params: TelemetryParams,
    last_tx_ms: u32,
    sequence: u16,
}

impl TelemetryScheduler {
    /// Create a scheduler; the first frame is due one interval after `now`.
    pub fn new(params: TelemetryParams, now: u32) -> Self {
        Self {
            params,
            last_tx_ms: now,
            sequence: 0,
        }
    }

    /// Sequence number the next frame will carry.
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// True when a telemetry frame should be transmitted.
    pub fn due(&self, now: u32) -> bool {
        self.params.enabled && now.wrapping_sub(self.last_tx_ms) >= self.params.interval_ms
    }

    /// Compose the telemetry frame for the current sequence number.
    pub fn compose(
        &self,
        own_call: &Callsign,
        destination: &Callsign,
        readings: SensorReadings,
    ) -> TxPacket {
        Packet::new(
            own_call.clone(),
            destination.clone(),
            Payload::Telemetry {
                sequence: self.sequence,
                readings,
            },
        )
    }

    /// Record a successful transmission: restart the interval and advance
    /// the sequence, wrapping at [`SEQUENCE_SPAN`].
    pub fn commit_sent(&mut self, now: u32) {
        self.last_tx_ms = now;
        self.sequence = (self.sequence + 1) % SEQUENCE_SPAN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_params() -> TelemetryParams {
        TelemetryParams {
            enabled: true,
            interval_ms: 600_000,
        }
    }

    #[test]
    fn test_not_due_before_interval() {
        let scheduler = TelemetryScheduler::new(enabled_params(), 0);
        assert!(!scheduler.due(599_999));
        assert!(scheduler.due(600_000));
    }

    #[test]
    fn test_disabled_never_due() {
        let params = TelemetryParams {
            enabled: false,
            interval_ms: 600_000,
        };
        let scheduler = TelemetryScheduler::new(params, 0);
        assert!(!scheduler.due(10_000_000));
    }

    #[test]
    fn test_sequence_advances_and_wraps() {
        let mut scheduler = TelemetryScheduler::new(enabled_params(), 0);
        assert_eq!(scheduler.sequence(), 0);
        scheduler.commit_sent(600_000);
        assert_eq!(scheduler.sequence(), 1);
        for _ in 0..998 {
            scheduler.commit_sent(0);
        }
        assert_eq!(scheduler.sequence(), 999);
        scheduler.commit_sent(0);
        assert_eq!(scheduler.sequence(), 0);
    }

    #[test]
    fn test_due_across_clock_wrap() {
        let start = u32::MAX - 100_000;
        let scheduler = TelemetryScheduler::new(enabled_params(), start);
        assert!(!scheduler.due(start.wrapping_add(599_999)));
        assert!(scheduler.due(start.wrapping_add(600_000)));
    }

    #[test]
    fn test_compose_carries_sequence_and_readings() {
        let scheduler = TelemetryScheduler::new(enabled_params(), 0);
        let readings = SensorReadings {
            battery_v: 3.9,
            temperature_c: 21.5,
            pressure_hpa: 1013.2,
            humidity_pct: 40.0,
        };
        let packet = scheduler.compose(
            &Callsign::new("N0CALL-7").unwrap(),
            &Callsign::new("APRS").unwrap(),
            readings,
        );
        match packet.payload {
            Payload::Telemetry { sequence, readings } => {
                assert_eq!(sequence, 0);
                assert!((readings.battery_v - 3.9).abs() < 1e-6);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
