use std::time::Duration;

use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};

use crate::{
    foundation::error::{CardError, CardResult},
    output::store::{OutputStore, SweepReport},
};

/// How long artifacts live and how often the directory is swept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Artifacts older than this are removed.
    pub ttl: Duration,
    /// Time between sweeps.
    pub interval: Duration,
}

impl RetentionPolicy {
    /// Validated policy; the interval must be non-zero.
    pub fn new(ttl: Duration, interval: Duration) -> CardResult<Self> {
        if interval.is_zero() {
            return Err(CardError::validation("sweep interval must be > 0"));
        }
        Ok(Self { ttl, interval })
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(120),
            interval: Duration::from_secs(30),
        }
    }
}

/// Background task sweeping the output directory on a fixed schedule.
///
/// The first sweep runs immediately. Dropping the handle without calling
/// [`RetentionTask::shutdown_and_join`] also stops the loop at its next wakeup.
pub struct RetentionTask {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl RetentionTask {
    /// Start sweeping `store` according to `policy` on the current runtime.
    pub fn spawn(store: OutputStore, policy: RetentionPolicy) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(run(store, policy, shutdown_rx));
        tracing::info!(
            ttl_secs = policy.ttl.as_secs(),
            interval_secs = policy.interval.as_secs(),
            "retention sweeper started"
        );
        Self { shutdown_tx, join }
    }

    /// Request shutdown without waiting.
    pub fn request_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Request shutdown and wait for the loop to exit.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            tracing::warn!(error = %e, "retention sweeper ended abnormally");
        }
    }
}

async fn run(store: OutputStore, policy: RetentionPolicy, mut shutdown_rx: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(policy.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {}
            res = shutdown_rx.changed() => {
                // A dropped sender means nobody can stop us later either; stop now.
                if res.is_err() || *shutdown_rx.borrow() {
                    break;
                }
                continue;
            }
        }

        match sweep_once(&store, policy.ttl).await {
            Ok(report) if report.removed > 0 || report.failed > 0 => {
                tracing::info!(
                    removed = report.removed,
                    failed = report.failed,
                    scanned = report.scanned,
                    "retention sweep"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "retention sweep failed"),
        }
    }

    tracing::info!("retention sweeper stopped");
}

/// Run one sweep on the blocking pool.
pub async fn sweep_once(store: &OutputStore, ttl: Duration) -> CardResult<SweepReport> {
    let store = store.clone();
    tokio::task::spawn_blocking(move || store.sweep_expired(ttl))
        .await
        .map_err(|e| CardError::Other(anyhow::Error::new(e).context("sweep task panicked")))?
}

#[cfg(test)]
#[path = "../../tests/unit/output/retention.rs"]
mod tests;
