// src/pipeline/queue.rs

//! Background update queue.
//!
//! `submit` returns as soon as the job is queued; a single worker task runs
//! jobs in order. Job outcomes are only visible in the logs.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::models::Term;
use crate::pipeline::update::{Updater, validate_year};

#[derive(Debug)]
struct UpdateJob {
    year: String,
    term: Term,
}

/// Fire-and-forget handle for scheduling term updates.
pub struct UpdateQueue {
    sender: mpsc::UnboundedSender<UpdateJob>,
    worker: JoinHandle<usize>,
}

impl UpdateQueue {
    /// Start the worker task on the current tokio runtime.
    pub fn spawn(updater: Arc<Updater>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<UpdateJob>();

        let worker = tokio::spawn(async move {
            let mut processed = 0;
            while let Some(job) = receiver.recv().await {
                match updater.run_update(&job.year, job.term).await {
                    Ok(summary) => log::info!(
                        "Update {} {} done: {} courses, {} instructors, {} teachings added",
                        job.year,
                        job.term,
                        summary.courses,
                        summary.instructors,
                        summary.teachings
                    ),
                    Err(e) => log::error!("Update {} {} failed: {}", job.year, job.term, e),
                }
                processed += 1;
            }
            processed
        });

        Self { sender, worker }
    }

    /// Queue an update. Validation failures are returned immediately.
    pub fn submit(&self, year: &str, term: Term) -> Result<()> {
        validate_year(year)?;
        self.sender
            .send(UpdateJob {
                year: year.to_string(),
                term,
            })
            .map_err(|_| AppError::Queue("update worker has stopped".to_string()))?;
        log::info!("Database update requested for {} {}", year, term);
        Ok(())
    }

    /// Queue an update from a human semester token.
    pub fn submit_raw(&self, year: &str, raw_term: &str) -> Result<()> {
        let term: Term = raw_term.parse()?;
        self.submit(year, term)
    }

    /// Stop accepting jobs and wait for queued ones to finish.
    ///
    /// Returns how many jobs the worker ran.
    pub async fn shutdown(self) -> Result<usize> {
        drop(self.sender);
        self.worker
            .await
            .map_err(|e| AppError::Queue(format!("update worker panicked: {e}")))
    }
}
