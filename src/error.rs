//! Error taxonomy for the controller and its engine boundary.

use crate::model::{Architecture, ExecutionStatus};
use thiserror::Error;

/// Failure raised by an engine implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineFault {
    pub message: String,
}

impl EngineFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failures that move the controller into `Errored`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("failed to construct {architecture} engine: {message}")]
    EngineInit {
        architecture: Architecture,
        message: String,
    },
    #[error("program rejected: {message}")]
    ProgramLoad { message: String },
    #[error("execution failed: {message}")]
    Execution { message: String },
}

impl SessionError {
    /// The message retained for the error banner.
    pub fn message(&self) -> &str {
        match self {
            SessionError::EngineInit { message, .. }
            | SessionError::ProgramLoad { message }
            | SessionError::Execution { message } => message,
        }
    }
}

/// A control request the current status does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("cannot {operation} while {status}")]
    Refused {
        operation: &'static str,
        status: ExecutionStatus,
    },
    #[error("no processor session")]
    NoSession,
}
