//! aprs_tracker_sitl - Software-in-the-loop harness for the tracker core
//!
//! Runs the complete tracker decision logic on host against simulated
//! collaborators: a controllable wrapping millisecond clock, a radio channel
//! with scripted inbound traffic and configurable busy behavior, scripted
//! GPS routes, and a TNC2-style text codec standing in for the wire-format
//! encoder.
//!
//! Scenario-level integration tests live in `tests/`; a runnable demo is in
//! `examples/tracker_sim.rs`.

pub mod codec;
pub mod error;
pub mod fix;
pub mod radio;
pub mod runner;
pub mod time;

pub use codec::{decode_wire, encode_wire};
pub use error::SimulatorError;
pub use fix::ScriptedFixSource;
pub use radio::SimRadio;
pub use runner::{SimHarness, SimSensors};
pub use time::SimClock;
