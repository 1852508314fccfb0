//! OMEGA operational controller
//!
//! A long-lived controller that classifies incoming operations under an explicit
//! state machine and watches itself through two background loops:
//! - health monitor: latency threshold check with single-attempt auto-recovery
//! - sync loop: synchronization hooks toward external collaborators
//!
//! State, metrics and health thresholds share a single lock; the loops are Tokio
//! tasks cancelled through a token on `stop()`.

pub mod config;
pub mod controller;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod links;
pub mod metrics;
pub mod models;
pub mod processor;
pub mod recovery;
pub mod schedule;
pub mod state;
pub mod sync;

pub use config::{load_config, ControllerConfig};
pub use controller::{Controller, CLASSIFICATION, VERSION};
pub use error::{
    ConfigError, HealthCheckError, InitError, LinkError, ProcessError, RecoveryError, StartError,
    StateError, SyncError,
};
pub use health::HealthReport;
pub use lifecycle::{OperationalState, StateTransition};
pub use links::{LinkEstablisher, StaticLinks};
pub use metrics::ControllerMetrics;
pub use models::{timestamp_now, Operation, Priority, Response, StatusReport, ThreatLevel};
pub use sync::{StubPeer, SyncPeer, SyncReport};
