//! Cancellable periodic execution
//!
//! Watch mode needs "run this batch every N seconds until told to stop".
//! Rather than a detached sleep loop, the runner drives one recurring
//! operation off a tokio interval and exits promptly when its shutdown
//! handle fires.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// The recurring operation driven by [`PeriodicRunner`]
#[async_trait]
pub trait PeriodicTask: Send {
    async fn execute(&mut self) -> Result<()>;
}

/// Counters returned when the runner stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub runs: usize,
    pub failures: usize,
}

/// Signals the runner to stop; safe to trigger from another task
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

/// Drives one [`PeriodicTask`] on a fixed interval until shut down
pub struct PeriodicRunner {
    interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl PeriodicRunner {
    pub fn new(interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self { interval, shutdown_tx, shutdown_rx }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle { tx: self.shutdown_tx.clone() }
    }

    /// Run the task once per tick (first tick immediately) until the
    /// shutdown handle fires. Task errors are logged and counted, never
    /// fatal to the loop.
    pub async fn run(mut self, task: &mut dyn PeriodicTask) -> RunStats {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut stats = RunStats::default();
        info!("periodic runner started, interval {:?}", self.interval);

        loop {
            if *self.shutdown_rx.borrow() {
                break;
            }
            tokio::select! {
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match task.execute().await {
                        Ok(()) => stats.runs += 1,
                        Err(err) => {
                            error!("periodic task failed: {err:#}");
                            stats.failures += 1;
                        }
                    }
                }
            }
        }

        info!("periodic runner stopped after {} run(s)", stats.runs + stats.failures);
        stats
    }
}
