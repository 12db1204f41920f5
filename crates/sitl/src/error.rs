//! Simulator error types.

/// Errors that can occur while driving a simulated tracker.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("Malformed wire frame: {0}")]
    MalformedFrame(String),

    #[error("Invalid callsign: {0}")]
    InvalidCallsign(String),

    #[error("Field out of range: {0}")]
    FieldOutOfRange(&'static str),
}
