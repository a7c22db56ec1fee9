//! Cron-driven job scheduler.
//!
//! A single owned `JobScheduler` is created at startup and exposes explicit
//! `start`/`stop`. Each job runs on its own task that sleeps until the next
//! cron fire and awaits the job before scheduling the next one, so two runs
//! of the same job never overlap; a slow run simply delays the next tick.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    /// Cron expression (seconds granularity) this job fires on.
    fn schedule(&self) -> &str;

    async fn execute(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Clone)]
pub struct JobStatus {
    pub is_active: bool,
    pub next_run: Option<DateTime<Utc>>,
}

struct RegisteredJob {
    job: Arc<dyn Job>,
    schedule: Schedule,
    handle: Option<JoinHandle<()>>,
}

#[derive(Default)]
pub struct JobScheduler {
    jobs: Mutex<Vec<RegisteredJob>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub async fn register_job(&self, job: Box<dyn Job>) -> anyhow::Result<()> {
        let schedule = Schedule::from_str(job.schedule()).map_err(|e| {
            anyhow::anyhow!("invalid cron expression for job '{}': {}", job.name(), e)
        })?;

        self.jobs.lock().await.push(RegisteredJob {
            job: Arc::from(job),
            schedule,
            handle: None,
        });
        Ok(())
    }

    pub async fn start(&self) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().await;
        for entry in jobs.iter_mut() {
            if entry.handle.is_some() {
                continue;
            }

            let job = entry.job.clone();
            let schedule = entry.schedule.clone();
            entry.handle = Some(tokio::spawn(run_job_loop(job, schedule)));
        }

        info!("Scheduler started with {} job(s)", jobs.len());
        Ok(())
    }

    pub async fn stop(&self) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().await;
        for entry in jobs.iter_mut() {
            if let Some(handle) = entry.handle.take() {
                handle.abort();
            }
        }

        info!("Scheduler stopped");
        Ok(())
    }

    pub async fn get_job_status(&self) -> HashMap<String, JobStatus> {
        let jobs = self.jobs.lock().await;
        jobs.iter()
            .map(|entry| {
                (
                    entry.job.name().to_string(),
                    JobStatus {
                        is_active: entry.handle.is_some(),
                        next_run: entry.schedule.upcoming(Utc).next(),
                    },
                )
            })
            .collect()
    }
}

async fn run_job_loop(job: Arc<dyn Job>, schedule: Schedule) {
    loop {
        let Some(next) = schedule.upcoming(Utc).next() else {
            error!("Job '{}' has no upcoming fire time, exiting", job.name());
            return;
        };

        let wait = next - Utc::now();
        if let Ok(wait) = wait.to_std() {
            tokio::time::sleep(wait).await;
        }

        if let Err(e) = job.execute().await {
            error!("Job '{}' failed: {}", job.name(), e);
        }
    }
}
