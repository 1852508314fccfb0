/*!
Test harness for the controller

Wires a `Controller` to a `ScriptedLinks` and a `RecordingPeer`, with:
- a fast configuration so background loops tick within a test's lifetime
- polling helpers to wait for loop side effects
- assertions on the recorded state transitions
*/

use anyhow::Result;
use omega_controller::{Controller, ControllerConfig, OperationalState};
use std::time::Duration;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use crate::doubles::{RecordingPeer, ScriptedLinks};

pub const PEER_NAME: &str = "RECORDER";

/// Installs a test-friendly subscriber once; later calls are ignored.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Loops tick every 50ms, shutdown waits at most 2s per loop.
pub fn fast_config() -> ControllerConfig {
    ControllerConfig {
        sync_interval_seconds: 0.05,
        health_check_interval_seconds: 0.05,
        shutdown_timeout_seconds: 2.0,
        ..ControllerConfig::default()
    }
}

pub struct TestHarness {
    pub controller: Controller,
    pub links: ScriptedLinks,
    pub peer: RecordingPeer,
}

impl TestHarness {
    pub fn new(config: ControllerConfig) -> Self {
        init_tracing();

        let links = ScriptedLinks::new();
        let peer = RecordingPeer::new(PEER_NAME);
        let controller = Controller::with_collaborators(config, links.as_establisher(), vec![peer.as_peer()]);

        Self { controller, links, peer }
    }

    /// Harness over [`fast_config`].
    pub fn fast() -> Self {
        Self::new(fast_config())
    }

    /// Runs `initialize` then `start`. Needs a Tokio runtime.
    pub fn activate(&self) -> Result<()> {
        self.controller.initialize()?;
        self.controller.start()?;
        Ok(())
    }

    /// Polls `condition` every 10ms until it holds or `timeout_ms` elapses.
    pub async fn wait_until<F>(&self, timeout_ms: u64, mut condition: F) -> bool
    where
        F: FnMut(&Self) -> bool,
    {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        while Instant::now() < deadline {
            if condition(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        condition(self)
    }

    pub async fn wait_for_state(&self, state: OperationalState, timeout_ms: u64) -> bool {
        self.wait_until(timeout_ms, |h| h.controller.state() == state).await
    }

    /// Every `(from, to)` pair recorded so far, oldest first.
    pub fn transitions(&self) -> Vec<(OperationalState, OperationalState)> {
        self.controller
            .journal()
            .into_iter()
            .map(|t| (t.from, t.to))
            .collect()
    }

    /// Asserts that `expected` appears as a contiguous run in the journal.
    pub fn assert_path(&self, expected: &[(OperationalState, OperationalState)]) -> Result<()> {
        let recorded = self.transitions();
        if expected.is_empty() || recorded.windows(expected.len()).any(|w| w == expected) {
            return Ok(());
        }
        anyhow::bail!("transition path {:?} not found in {:?}", expected, recorded);
    }
}
