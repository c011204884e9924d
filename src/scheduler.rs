use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::SchedulerConfig;
use crate::housekeeping::LogJanitor;
use crate::monitor::{StockMonitor, TickReport};
use crate::utils::error::{AppError, NotifyError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulerStats {
    pub ticks_completed: u64,
    pub checks_failed: u64,
    pub notifications_sent: u64,
    pub housekeeping_runs: u64,
    pub logs_pruned: u64,
    pub last_tick: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
}

impl SchedulerStats {
    fn new() -> Self {
        Self {
            ticks_completed: 0,
            checks_failed: 0,
            notifications_sent: 0,
            housekeeping_runs: 0,
            logs_pruned: 0,
            last_tick: None,
            started_at: Utc::now(),
        }
    }

    fn record_tick(&mut self, report: &TickReport) {
        self.ticks_completed += 1;
        self.checks_failed += report.failed as u64;
        self.notifications_sent += report.notifications_sent as u64;
        self.last_tick = Some(Utc::now());
    }
}

/// Drives stock checks and log housekeeping on two independent timers.
pub struct StockScheduler {
    monitor: StockMonitor,
    janitor: LogJanitor,
    check_interval: Duration,
    housekeeping_interval: Duration,
}

/// Running scheduler. Dropping it closes the cancel channel, which also ends
/// both loops; `stop` additionally waits for them and returns the monitor.
pub struct SchedulerHandle {
    cancel_tx: broadcast::Sender<()>,
    stock_join: JoinHandle<StockMonitor>,
    housekeeping_join: JoinHandle<()>,
    stats: Arc<RwLock<SchedulerStats>>,
}

impl StockScheduler {
    pub fn new(monitor: StockMonitor, janitor: LogJanitor, config: &SchedulerConfig) -> Self {
        Self::with_intervals(monitor, janitor, config.check_interval(), config.housekeeping_interval())
    }

    pub fn with_intervals(
        monitor: StockMonitor,
        janitor: LogJanitor,
        check_interval: Duration,
        housekeeping_interval: Duration,
    ) -> Self {
        Self {
            monitor,
            janitor,
            check_interval,
            housekeeping_interval,
        }
    }

    /// Wait for `ready`, then spawn both loops.
    ///
    /// Nothing is scheduled if the messaging connection fails to come up.
    pub async fn start<R>(self, ready: R) -> Result<SchedulerHandle>
    where
        R: Future<Output = std::result::Result<(), NotifyError>>,
    {
        ready.await?;

        let (cancel_tx, _) = broadcast::channel(1);
        let stats = Arc::new(RwLock::new(SchedulerStats::new()));

        tracing::info!(
            "Scheduler started: stock checks every {:?}, housekeeping every {:?}",
            self.check_interval,
            self.housekeeping_interval
        );

        let stock_join = tokio::spawn(Self::run_stock_checks(
            self.monitor,
            self.check_interval,
            cancel_tx.subscribe(),
            Arc::clone(&stats),
        ));

        let housekeeping_join = tokio::spawn(Self::run_housekeeping(
            self.janitor,
            self.housekeeping_interval,
            cancel_tx.subscribe(),
            Arc::clone(&stats),
        ));

        Ok(SchedulerHandle {
            cancel_tx,
            stock_join,
            housekeeping_join,
            stats,
        })
    }

    async fn run_stock_checks(
        mut monitor: StockMonitor,
        period: Duration,
        mut cancel_rx: broadcast::Receiver<()>,
        stats: Arc<RwLock<SchedulerStats>>,
    ) -> StockMonitor {
        let mut ticker = tokio::time::interval(period);
        // A tick that overruns its period drops the missed ones instead of
        // firing them back to back.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel_rx.recv() => {
                    tracing::info!("Stock check loop shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    let report = monitor.tick().await;
                    stats.write().await.record_tick(&report);
                }
            }
        }

        monitor
    }

    async fn run_housekeeping(
        janitor: LogJanitor,
        period: Duration,
        mut cancel_rx: broadcast::Receiver<()>,
        stats: Arc<RwLock<SchedulerStats>>,
    ) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel_rx.recv() => {
                    tracing::info!("Housekeeping loop shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    tracing::debug!("Log housekeeping running");
                    let removed = janitor.run().await;
                    let mut stats = stats.write().await;
                    stats.housekeeping_runs += 1;
                    stats.logs_pruned += removed as u64;
                }
            }
        }
    }
}

impl SchedulerHandle {
    pub async fn stats(&self) -> SchedulerStats {
        self.stats.read().await.clone()
    }

    /// Stop both loops, waiting for an in-flight tick to finish, and hand the
    /// monitor back.
    pub async fn stop(self) -> Result<StockMonitor> {
        let _ = self.cancel_tx.send(());

        self.housekeeping_join
            .await
            .map_err(|e| AppError::Internal(format!("housekeeping task failed: {}", e)))?;

        let monitor = self
            .stock_join
            .await
            .map_err(|e| AppError::Internal(format!("stock check task failed: {}", e)))?;

        tracing::info!("Scheduler stopped");
        Ok(monitor)
    }
}
