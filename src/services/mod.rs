//! Service layer for the scraper.
//!
//! This module contains the business logic for:
//! - Fetching the registrar schedule page (`RegistrarClient`)
//! - Parsing section rows into tuples (`ScheduleParser`)

mod fetcher;
mod parser;

pub use fetcher::{DEFAULT_TEMPLATE, RegistrarClient, RequestTemplate, ScheduleSource};
pub use parser::{INVALID_TERM_MARKER, ScheduleParser};
