//! aprs_tracker_core - Pure no_std core logic for the APRS tracker
//!
//! This crate contains the platform-agnostic decision logic of the tracker:
//! when to transmit a position beacon, which heard packets to relay, and how
//! to deliver text messages reliably over a shared half-duplex channel.
//! It can be tested on host without any feature flags or hardware access.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Platform services injected via traits
//! - **Tick-driven**: No blocking calls; waiting is a stored deadline
//!   checked against a wrapping millisecond clock on the next tick
//!
//! # Modules
//!
//! - [`traits`]: Platform seams (TimeSource, RadioPort, SensorSource)
//! - [`packet`]: Logical packet model (callsign-SSID, digi path, payloads)
//! - [`geo`]: Haversine distance and course-delta helpers
//! - [`parameters`]: Typed parameter blocks and the name-keyed store
//! - [`beacon`]: SmartBeacon rate control and beacon composition
//! - [`station`]: Heard-station table and digipeat eligibility
//! - [`message`]: Acknowledged message delivery with bounded retry
//! - [`telemetry`]: Fixed-cadence telemetry scheduling
//! - [`tracker`]: The super-loop tying everything to one radio channel

#![no_std]

pub mod beacon;
pub mod geo;
pub mod message;
pub mod packet;
pub mod parameters;
pub mod station;
pub mod telemetry;
pub mod tracker;
pub mod traits;

pub use beacon::{BeaconComposer, BeaconDecision, Fix, SchedulerPhase, SmartBeaconScheduler};
pub use message::{DeliveryState, InboundMessage, MessageDeliveryManager, MessageError};
pub use packet::{Callsign, Packet, PathHop, Payload, RxPacket, SensorReadings, TxPacket};
pub use parameters::{
    BeaconProfile, DigiParams, MessageParams, ParameterError, ParameterStore, ProfileSet,
    SmartBeaconParams, TelemetryParams, TrackerParams,
};
pub use station::{StationEntry, StationTracker};
pub use telemetry::TelemetryScheduler;
pub use tracker::{Tracker, TrackerEvent, TxPriority};
pub use traits::{MockTime, RadioPort, SensorSource, TimeSource};
