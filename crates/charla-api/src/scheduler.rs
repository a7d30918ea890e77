//! Periodic job scheduling.
//!
//! Registers the three ticks (cleanup, auto-summary, snapshot) with
//! `tokio-cron-scheduler`. The intervals come from config; each fires a
//! standalone pass on the shared [`DigestJobs`](charla_core::jobs::DigestJobs).

use std::sync::Arc;

use anyhow::anyhow;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use charla_types::config::BotConfig;

use crate::state::ConcreteJobs;

/// 6-field cron expression firing every `n` hours.
fn hours_cron(n: u32) -> String {
    format!("0 0 */{n} * * *")
}

/// 6-field cron expression firing every `n` minutes (`n` < 60).
fn minutes_cron(n: u32) -> String {
    format!("0 */{n} * * * *")
}

/// Build and start the scheduler with the three periodic jobs.
pub async fn start_jobs(
    jobs: Arc<ConcreteJobs>,
    config: &BotConfig,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|err| anyhow!("scheduler init failed: {err}"))?;

    let cleanup_cron = hours_cron(config.jobs.cleanup_interval_hours);
    let cleanup_jobs = jobs.clone();
    let cleanup = Job::new_async(cleanup_cron.as_str(), move |_uuid, _lock| {
        let jobs = cleanup_jobs.clone();
        Box::pin(async move { jobs.run_cleanup().await })
    })
    .map_err(|err| anyhow!("invalid cleanup schedule '{cleanup_cron}': {err}"))?;
    scheduler
        .add(cleanup)
        .await
        .map_err(|err| anyhow!("failed to register cleanup job: {err}"))?;

    let summary_cron = hours_cron(config.jobs.summary_interval_hours);
    let summary_jobs = jobs.clone();
    let summary = Job::new_async(summary_cron.as_str(), move |_uuid, _lock| {
        let jobs = summary_jobs.clone();
        Box::pin(async move { jobs.run_auto_summaries().await })
    })
    .map_err(|err| anyhow!("invalid summary schedule '{summary_cron}': {err}"))?;
    scheduler
        .add(summary)
        .await
        .map_err(|err| anyhow!("failed to register summary job: {err}"))?;

    let snapshot_cron = minutes_cron(config.snapshot.interval_minutes);
    let snapshot_jobs = jobs;
    let snapshot = Job::new_async(snapshot_cron.as_str(), move |_uuid, _lock| {
        let jobs = snapshot_jobs.clone();
        Box::pin(async move { jobs.run_snapshot().await })
    })
    .map_err(|err| anyhow!("invalid snapshot schedule '{snapshot_cron}': {err}"))?;
    scheduler
        .add(snapshot)
        .await
        .map_err(|err| anyhow!("failed to register snapshot job: {err}"))?;

    scheduler
        .start()
        .await
        .map_err(|err| anyhow!("scheduler start failed: {err}"))?;

    info!(
        cleanup_hours = config.jobs.cleanup_interval_hours,
        summary_hours = config.jobs.summary_interval_hours,
        snapshot_minutes = config.snapshot.interval_minutes,
        "periodic jobs scheduled"
    );
    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cron_expressions() {
        assert_eq!(hours_cron(6), "0 0 */6 * * *");
        assert_eq!(minutes_cron(30), "0 */30 * * * *");
    }
}
