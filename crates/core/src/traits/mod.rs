//! Platform-agnostic trait abstractions
//!
//! These traits decouple the tracker core from hardware services so the
//! whole decision logic can run on host:
//!
//! - [`TimeSource`]: wrapping monotonic millisecond clock
//! - [`RadioPort`]: non-blocking access to the shared radio channel
//! - [`SensorSource`]: environmental readings for telemetry frames

pub mod radio;
pub mod sensor;
pub mod time;

pub use radio::RadioPort;
pub use sensor::SensorSource;
pub use time::{MockTime, TimeSource};
