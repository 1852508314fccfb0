//! Error taxonomy for the controller core.
//!
//! Caller-facing failures of `process_operation` never escape as `Err`: they are
//! rendered into a failure [`Response`](crate::models::Response). Background loop
//! errors are logged by the loop and never reach callers.

use crate::lifecycle::OperationalState;

/// Why an operation was rejected. Rendered inline into the failure response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    #[error("Controller not active")]
    NotActive,
    #[error("Invalid operation")]
    Invalid,
    #[error("{0}")]
    Internal(String),
}

impl From<time::error::Format> for ProcessError {
    fn from(err: time::error::Format) -> Self {
        ProcessError::Internal(format!("timestamp formatting failed: {err}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("illegal state transition {from} -> {to}")]
    IllegalTransition {
        from: OperationalState,
        to: OperationalState,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("link {link} unreachable: {reason}")]
    Unreachable { link: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("synchronization with {peer} failed: {reason}")]
    Peer { peer: String, reason: String },
    #[error("sync peer registered twice: {0}")]
    DuplicatePeer(String),
}

/// Terminal recovery outcome. `Reconnect` leaves the controller in `FAILED`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
    #[error("recovery refused: {0}")]
    State(#[from] StateError),
    #[error("recovery failed to reconnect: {0}")]
    Reconnect(#[from] LinkError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealthCheckError {
    #[error("auto-recovery did not complete: {0}")]
    Recovery(#[from] RecoveryError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("system requirements not met: {0}")]
    Requirements(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("secure connection establishment failed: {0}")]
    Links(#[from] LinkError),
    #[error("synchronization initialization failed: {0}")]
    Sync(#[from] SyncError),
}

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("cannot start controller in state {0}")]
    NotReady(OperationalState),
    #[error("no async runtime available: {0}")]
    Runtime(String),
    #[error(transparent)]
    State(#[from] StateError),
}
