use thiserror::Error;
use crate::types::ids::{DestinationKey, OperatorId, SourceId};

#[derive(Error, Debug)]
pub enum Error {
    // Configuration Errors
    #[error("Source already registered: {0}")]
    AlreadyRegistered(SourceId),

    #[error("Source not registered: {0}")]
    NotRegistered(SourceId),

    #[error("Destination key already bound: {0}")]
    KeyTaken(DestinationKey),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Source Read Errors
    #[error("Source {source_id} unavailable: {reason}")]
    SourceUnavailable {
        source_id: SourceId,
        reason: String,
    },

    #[error("Source panicked: {0}")]
    SourcePanicked(SourceId),

    #[error("Source busy (re-entrant call): {0}")]
    SourceBusy(SourceId),

    // Arithmetic Errors
    #[error("Overflow in {operation}")]
    Overflow { operation: String },

    #[error("Division by zero")]
    DivisionByZero,

    // Protocol Errors
    #[error("No update needed")]
    NoUpdateNeeded,

    // Downstream Errors
    #[error("Push to {key} failed: {reason}")]
    PushFailed {
        key: DestinationKey,
        reason: String,
    },

    // Access Errors
    #[error("Unauthorized: {0}")]
    Unauthorized(OperatorId),

    #[error("Oracle paused")]
    Paused,
}

impl Error {
    /// `NoUpdateNeeded` is the expected answer to a keeper probing an idle
    /// relayer; automation should not treat it as a fault.
    pub fn is_benign(&self) -> bool {
        matches!(self, Error::NoUpdateNeeded)
    }

    pub fn overflow(operation: &str) -> Self {
        Error::Overflow { operation: operation.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
