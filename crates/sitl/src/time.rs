//! Simulated monotonic clock.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use aprs_tracker_core::TimeSource;

/// Controllable wrapping millisecond clock.
///
/// Clones share the same counter, so the harness and the components it
/// drives always agree on "now". Construct near `u32::MAX` to exercise
/// counter wraparound in scenarios.
#[derive(Clone, Default)]
pub struct SimClock {
    current_ms: Arc<AtomicU32>,
}

impl SimClock {
    /// A clock starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock starting at the given timestamp.
    pub fn starting_at(ms: u32) -> Self {
        Self {
            current_ms: Arc::new(AtomicU32::new(ms)),
        }
    }

    /// Advance simulated time, wrapping on overflow.
    pub fn advance(&self, ms: u32) {
        self.current_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.wrapping_add(ms))
            })
            .ok();
    }
}

impl TimeSource for SimClock {
    fn now_ms(&self) -> u32 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_time() {
        let clock = SimClock::new();
        let other = clock.clone();
        clock.advance(1234);
        assert_eq!(other.now_ms(), 1234);
    }

    #[test]
    fn test_wraps_at_u32_max() {
        let clock = SimClock::starting_at(u32::MAX);
        clock.advance(1);
        assert_eq!(clock.now_ms(), 0);
    }
}
