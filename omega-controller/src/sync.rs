//! Synchronization toward external collaborators.
//!
//! Each cycle walks the registered peers. Unavailable peers are skipped, a failing
//! peer is logged and does not prevent the others from running.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::links::{G3_MANDATE, PROJECT_JANUS};

pub trait SyncPeer: Send + Sync {
    fn name(&self) -> &str;

    /// Peers that are not reachable right now are skipped for the cycle.
    fn is_available(&self) -> bool {
        true
    }

    /// Runs under the controller lock; must not block on I/O.
    fn synchronize(&self) -> Result<(), SyncError>;
}

/// Extension point that accepts every synchronization without doing anything.
#[derive(Debug, Clone)]
pub struct StubPeer {
    name: String,
}

impl StubPeer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SyncPeer for StubPeer {
    fn name(&self) -> &str {
        &self.name
    }

    fn synchronize(&self) -> Result<(), SyncError> {
        Ok(())
    }
}

pub fn default_peers() -> Vec<Arc<dyn SyncPeer>> {
    vec![
        Arc::new(StubPeer::new(G3_MANDATE)),
        Arc::new(StubPeer::new(PROJECT_JANUS)),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub synchronized: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct SyncLoop {
    peers: Vec<Arc<dyn SyncPeer>>,
}

impl SyncLoop {
    pub fn new(peers: Vec<Arc<dyn SyncPeer>>) -> Self {
        Self { peers }
    }

    pub fn peer_names(&self) -> Vec<String> {
        self.peers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Checks the peer set before the loop starts. Peer names must be unique.
    pub fn prepare(&self) -> Result<(), SyncError> {
        let mut seen = HashSet::new();
        for peer in &self.peers {
            if !seen.insert(peer.name()) {
                return Err(SyncError::DuplicatePeer(peer.name().to_string()));
            }
            info!(peer = peer.name(), available = peer.is_available(), "sync peer registered");
        }
        Ok(())
    }

    pub fn run_cycle(&self) -> SyncReport {
        let mut report = SyncReport::default();

        for peer in &self.peers {
            if !peer.is_available() {
                debug!(peer = peer.name(), "sync peer unavailable, skipping");
                report.skipped += 1;
                continue;
            }
            match peer.synchronize() {
                Ok(()) => report.synchronized += 1,
                Err(e) => {
                    warn!(peer = peer.name(), error = %e, "synchronization error");
                    report.failed += 1;
                }
            }
        }

        report
    }
}
