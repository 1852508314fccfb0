/*!
Test doubles for the controller's collaborators

`ScriptedLinks` stands in for the dependent-system links and can be told to fail,
`RecordingPeer` stands in for a synchronization peer and counts its calls.
Both are cheap to clone and share their state between clones.
*/

use omega_controller::{LinkError, LinkEstablisher, SyncError, SyncPeer};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct LinksState {
    attempts: AtomicUsize,
    failing: AtomicBool,
}

/// Link establisher whose outcome is decided by the test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLinks {
    state: Arc<LinksState>,
}

impl ScriptedLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every establish call fails while this is set.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    pub fn as_establisher(&self) -> Arc<dyn LinkEstablisher> {
        Arc::new(self.clone())
    }
}

impl LinkEstablisher for ScriptedLinks {
    fn links(&self) -> Vec<String> {
        vec!["SCRIPTED".to_string()]
    }

    fn establish(&self) -> Result<(), LinkError> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(LinkError::Unreachable {
                link: "SCRIPTED".to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
struct PeerState {
    calls: AtomicUsize,
    available: AtomicBool,
    failing: AtomicBool,
}

/// Sync peer that records how often it was synchronized.
#[derive(Debug, Clone)]
pub struct RecordingPeer {
    name: String,
    state: Arc<PeerState>,
}

impl RecordingPeer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(PeerState {
                calls: AtomicUsize::new(0),
                available: AtomicBool::new(true),
                failing: AtomicBool::new(false),
            }),
        }
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn set_available(&self, available: bool) {
        self.state.available.store(available, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn as_peer(&self) -> Arc<dyn SyncPeer> {
        Arc::new(self.clone())
    }
}

impl SyncPeer for RecordingPeer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.state.available.load(Ordering::SeqCst)
    }

    fn synchronize(&self) -> Result<(), SyncError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(SyncError::Peer {
                peer: self.name.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}
