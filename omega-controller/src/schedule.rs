//! Periodic background tasks with cooperative cancellation and bounded joins.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Spawns `cycle` every `period`. The first run happens one full period after
/// spawning. The token is checked on every wake and again right before `cycle`,
/// so a cancelled task never takes the controller lock again.
pub fn spawn_periodic<F>(
    runtime: &Handle,
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    mut cycle: F,
) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    runtime.spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(task = name, period_ms = period.as_millis() as u64, "background task started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if cancel.is_cancelled() {
                break;
            }
            cycle();
        }

        info!(task = name, "background task stopped");
    })
}

/// Waits up to `timeout` for `handle`. A task that overruns is aborted.
/// Returns whether the task exited on its own.
pub async fn join_within(name: &'static str, mut handle: JoinHandle<()>, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(())) => {
            debug!(task = name, "background task joined");
            true
        }
        Ok(Err(e)) => {
            warn!(task = name, error = %e, "background task ended abnormally");
            true
        }
        Err(_) => {
            warn!(task = name, timeout_ms = timeout.as_millis() as u64, "background task did not exit in time, aborting");
            handle.abort();
            false
        }
    }
}
