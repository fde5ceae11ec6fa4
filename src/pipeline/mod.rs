//! Pipeline entry points for schedule updates.
//!
//! - `Updater::run_update`: Fetch, parse and reconcile one term
//! - `UpdateQueue`: Run updates on a background worker
//! - `write_sections`: Export a scrape without touching the store

pub mod export;
pub mod queue;
pub mod reconcile;
pub mod update;

pub use export::{format_sections, write_sections};
pub use queue::UpdateQueue;
pub use reconcile::{ReconcilePlan, reconcile};
pub use update::{Updater, validate_year};
