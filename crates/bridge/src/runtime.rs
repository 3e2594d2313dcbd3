use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::session::SessionRegistry;

/// How long the sweeper sleeps when no teardown is pending before it checks
/// for documents the host has dropped.
const IDLE_PRUNE_INTERVAL: Duration = Duration::from_secs(30);

pub struct TeardownSweeperHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl TeardownSweeperHandle {
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    pub async fn wait(mut self) -> Result<()> {
        self.shutdown();
        if let Some(task) = self.task.take() {
            task.await.context("teardown sweeper task failed")?;
        }
        Ok(())
    }
}

impl Drop for TeardownSweeperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run pending session teardowns on the current tokio runtime.
///
/// The task sleeps until the earliest teardown deadline and wakes early when
/// a bridge arms a new one. Dropping the handle stops it.
pub fn spawn_teardown_sweeper(registry: SessionRegistry) -> TeardownSweeperHandle {
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(4);

    let task = tokio::spawn(async move {
        info!("teardown sweeper started");
        loop {
            let wake_at = registry
                .next_teardown_deadline()
                .unwrap_or_else(|| Instant::now() + IDLE_PRUNE_INTERVAL);

            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = registry.deadline_changed() => continue,
                _ = tokio::time::sleep_until(wake_at) => {}
            }

            let expired = registry.sweep_expired_at(Instant::now());
            let released = registry.prune_released();
            if !expired.is_empty() || !released.is_empty() {
                debug!(
                    expired = expired.len(),
                    released = released.len(),
                    remaining = registry.len(),
                    "teardown sweep"
                );
            }
        }
        info!("teardown sweeper stopped");
    });

    TeardownSweeperHandle { shutdown_tx, task: Some(task) }
}
