//! Time abstraction traits for platform-agnostic timing operations.
//!
//! This module provides the `TimeSource` trait that abstracts over different
//! time providers (hardware timer, mock, etc.) to enable host testing without
//! embedded dependencies.
//!
//! The clock is a free-running 32-bit millisecond counter and is expected to
//! wrap roughly every 49.7 days of uptime. All interval checks therefore go
//! through [`TimeSource::elapsed_since`], which uses wrapping subtraction;
//! absolute timestamps must never be compared directly.

use core::cell::Cell;

/// Platform-agnostic time source for schedulers and timers.
///
/// This trait abstracts over different time providers:
/// - a hardware millisecond timer on embedded targets
/// - `MockTime` for host testing with controllable time
/// - `SimClock` in the sitl crate for scenario runs
///
/// # Example
///
/// ```
/// use aprs_tracker_core::traits::{TimeSource, MockTime};
///
/// fn beacon_due<T: TimeSource>(time: &T, last_tx_ms: u32, interval_ms: u32) -> bool {
///     time.elapsed_since(last_tx_ms) >= interval_ms
/// }
///
/// let time = MockTime::new();
/// time.advance(60_000);
/// assert!(beacon_due(&time, 0, 60_000));
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Returns the current time in milliseconds since system start.
    ///
    /// The counter wraps at `u32::MAX`.
    fn now_ms(&self) -> u32;

    /// Returns elapsed milliseconds since a reference timestamp.
    ///
    /// Uses wrapping subtraction so intervals stay correct across the
    /// counter wrap.
    fn elapsed_since(&self, reference_ms: u32) -> u32 {
        self.now_ms().wrapping_sub(reference_ms)
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source for testing with controllable time advancement.
///
/// This implementation allows tests to control time progression,
/// enabling deterministic testing of timing-dependent code.
///
/// # Example
///
/// ```
/// use aprs_tracker_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// assert_eq!(time.now_ms(), 0);
///
/// time.advance(1500);
/// assert_eq!(time.now_ms(), 1500);
/// ```
#[derive(Clone, Default)]
pub struct MockTime {
    current_ms: Cell<u32>,
}

// Safety: MockTime is only used in single-threaded test contexts
// where Cell is safe. The Send+Sync bounds on TimeSource trait
// are required for embedded contexts, but MockTime is not used there.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_ms: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    ///
    /// Useful for starting just below `u32::MAX` to exercise wraparound.
    pub fn with_initial(ms: u32) -> Self {
        Self {
            current_ms: Cell::new(ms),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, ms: u32) {
        self.current_ms.set(ms);
    }

    /// Advances the current time by the specified amount, wrapping on overflow.
    pub fn advance(&self, ms: u32) {
        self.current_ms.set(self.current_ms.get().wrapping_add(ms));
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u32 {
        self.current_ms.get()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
