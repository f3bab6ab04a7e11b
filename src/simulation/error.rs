//! Error types for driving the simulator

use thiserror::Error;

/// Errors raised while configuring, editing or stepping a simulation
#[derive(Debug, Error)]
pub enum SimError {
    /// A required environment or configuration input is absent.
    #[error("Missing configuration: {what}")]
    ConfigurationMissing {
        /// What was missing
        what: String,
    },

    /// An operation needed an open session and there was none.
    #[error("Simulation session is not ready")]
    SessionNotReady,

    /// A control point reported zero timing programs.
    #[error("Control point '{control_point}' has no timing program")]
    NoActiveProgram {
        /// The offending control point
        control_point: String,
    },

    /// Any failure in a request/response round-trip with the simulator.
    #[error("Simulation communication error: {reason}")]
    SimulationCommunication {
        /// What went wrong
        reason: String,
    },
}

impl SimError {
    pub fn configuration_missing(what: impl Into<String>) -> Self {
        SimError::ConfigurationMissing { what: what.into() }
    }

    pub fn communication(reason: impl Into<String>) -> Self {
        SimError::SimulationCommunication {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::communication(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
