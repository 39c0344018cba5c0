//! Cron wiring for the daily background jobs.
//!
//! Triggers fire in the configured timezone. Each job is single-flight: a
//! trigger that fires while the previous run of the same job is still going
//! is skipped.

use std::{future::Future, sync::Arc};

use chrono::{NaiveTime, Timelike};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info, warn};

use crate::{
    services::{notification_job, release_sync},
    state::SharedState,
};

/// Register the release sync and both reminder jobs, then start ticking.
///
/// The returned handle must be kept alive for the jobs to keep firing.
pub async fn start(state: SharedState) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    let sync_at = state.config().sync_at();
    let notify_at = state.config().notify_at();

    scheduler
        .add(daily_job(&state, "release-sync", sync_at, |state| async move {
            let today = state.today();
            if let Err(err) = release_sync::run(&state, today).await {
                error!(error = %err, "release sync aborted");
            }
        })?)
        .await?;

    scheduler
        .add(daily_job(&state, "release-today", notify_at, |state| async move {
            let today = state.today();
            if let Err(err) = notification_job::send_release_today(&state, today).await {
                error!(error = %err, "release-today reminders aborted");
            }
        })?)
        .await?;

    scheduler
        .add(daily_job(&state, "release-soon", notify_at, |state| async move {
            let today = state.today();
            if let Err(err) = notification_job::send_release_soon(&state, today).await {
                error!(error = %err, "release-soon reminders aborted");
            }
        })?)
        .await?;

    scheduler.start().await?;
    info!(
        timezone = %state.config().timezone(),
        %sync_at,
        %notify_at,
        "background jobs scheduled"
    );
    Ok(scheduler)
}

fn daily_job<F, Fut>(
    state: &SharedState,
    name: &'static str,
    at: NaiveTime,
    run: F,
) -> Result<Job, JobSchedulerError>
where
    F: Fn(SharedState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let state = state.clone();
    let gate = Arc::new(Mutex::new(()));
    let run = Arc::new(run);

    Job::new_async_tz(
        cron_expression(at).as_str(),
        state.config().timezone(),
        move |_id, _scheduler| {
            let state = state.clone();
            let gate = gate.clone();
            let run = run.clone();
            Box::pin(async move {
                let Ok(_guard) = gate.try_lock_owned() else {
                    warn!(job = name, "previous run still in progress; skipping trigger");
                    return;
                };
                info!(job = name, "job triggered");
                run(state).await;
            })
        },
    )
}

/// Six-field cron expression (with seconds) firing daily at `at`.
fn cron_expression(at: NaiveTime) -> String {
    format!("0 {} {} * * *", at.minute(), at.hour())
}
