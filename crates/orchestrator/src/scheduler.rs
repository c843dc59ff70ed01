use crate::cycle::CycleOrchestrator;
use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// Full trading cycle at the top of every hour (sec min hour day month
/// weekday).
const CYCLE_CRON: &str = "0 0 * * * *";

/// Read-only status snapshot every 30 minutes.
const STATUS_CRON: &str = "0 */30 * * * *";

/// Owns the two periodic triggers of the trading loop.
///
/// The cycle trigger is guarded by a `try_lock` so an overrunning cycle
/// causes the next tick to be skipped rather than stacked; the two triggers
/// are independent and may interleave.
pub struct TradingScheduler {
    orchestrator: Arc<CycleOrchestrator>,
}

impl TradingScheduler {
    #[must_use]
    pub const fn new(orchestrator: Arc<CycleOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Starts both triggers and keeps them running until the task is
    /// dropped or the process shuts down.
    ///
    /// # Errors
    /// Returns an error if the scheduler fails to start or a job cannot be
    /// scheduled (e.g. malformed cron expression).
    pub async fn start(self) -> Result<()> {
        if !self.orchestrator.config().trading.enabled {
            info!("trading is disabled in configuration, scheduler not started");
            return Ok(());
        }

        info!(
            cycle_cron = CYCLE_CRON,
            status_cron = STATUS_CRON,
            "starting trading scheduler"
        );

        let scheduler = JobScheduler::new().await?;

        let cycle_guard = Arc::new(tokio::sync::Mutex::new(()));
        let orchestrator = self.orchestrator.clone();
        let cycle_job = Job::new_async(CYCLE_CRON, move |_uuid, _lock| {
            let orchestrator = orchestrator.clone();
            let guard = cycle_guard.clone();
            Box::pin(async move {
                // Non-overlap: if the previous cycle is still running, skip
                // this tick instead of starting a second one.
                let Ok(_held) = guard.try_lock() else {
                    warn!("previous trading cycle still running, skipping this tick");
                    return;
                };
                if let Err(e) = orchestrator.run_cycle_once().await {
                    error!("critical error in trading cycle: {e:#}");
                }
            })
        })?;
        scheduler.add(cycle_job).await?;

        let orchestrator = self.orchestrator.clone();
        let status_job = Job::new_async(STATUS_CRON, move |_uuid, _lock| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                orchestrator.status_snapshot().await;
            })
        })?;
        scheduler.add(status_job).await?;

        scheduler.start().await?;
        info!("trading scheduler started");

        // Keep the scheduler alive.
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
        }
    }
}
