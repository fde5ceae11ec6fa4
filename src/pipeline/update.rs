// src/pipeline/update.rs

//! Fetch → parse → reconcile for one term.
//!
//! The SQLite write runs on tokio's blocking pool since it may wait up to
//! the configured busy timeout.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{ScrapedSections, Term};
use crate::pipeline::reconcile::reconcile;
use crate::services::{ScheduleParser, ScheduleSource};
use crate::storage::{ReconcileSummary, Store};

/// Check that a year is four ASCII digits.
pub fn validate_year(year: &str) -> Result<()> {
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::validation(format!("Year must be four digits, got '{year}'")))
    }
}

/// Runs schedule updates against one store.
pub struct Updater {
    source: Box<dyn ScheduleSource>,
    parser: ScheduleParser,
    store: Arc<Store>,
}

impl Updater {
    pub fn new(source: impl ScheduleSource + 'static, store: Arc<Store>) -> Result<Self> {
        Ok(Self {
            source: Box::new(source),
            parser: ScheduleParser::new()?,
            store,
        })
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Fetch and parse a term without touching the store.
    ///
    /// An unavailable registrar yields an empty set; an explicit rejection
    /// of the term is returned as [`AppError::InvalidTerm`].
    pub async fn scrape(&self, year: &str, term: Term) -> Result<ScrapedSections> {
        validate_year(year)?;

        let markup = self.source.fetch(year, term).await?;
        if markup.is_empty() {
            return Ok(ScrapedSections::new());
        }

        self.parser
            .parse(&markup)
            .ok_or_else(|| AppError::InvalidTerm {
                year: year.to_string(),
                term,
            })
    }

    /// Scrape a term and reconcile it into the store.
    pub async fn run_update(&self, year: &str, term: Term) -> Result<ReconcileSummary> {
        let sections = self.scrape(year, term).await?;
        log::info!(
            "Scraped {} sections for {} {}",
            sections.len(),
            year,
            term
        );

        let store = Arc::clone(&self.store);
        let year = year.to_string();
        let summary =
            tokio::task::spawn_blocking(move || reconcile(&store, &year, term, &sections)).await??;
        log::debug!("Update complete");
        Ok(summary)
    }

    /// Like [`Updater::run_update`], decoding a human semester token first.
    pub async fn run_update_raw(&self, year: &str, raw_term: &str) -> Result<ReconcileSummary> {
        let term: Term = raw_term.parse()?;
        self.run_update(year, term).await
    }
}
