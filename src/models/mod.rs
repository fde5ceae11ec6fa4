// src/models/mod.rs

//! Domain models for the course review scraper.

mod config;
mod records;
mod term;

// Re-export all public types
pub use config::{Config, DB_PATH_ENV, DatabaseConfig, RegistrarConfig};
pub use records::{CourseRecord, InstructorRecord, ScrapedSections, ScrapedTuple, TeachingLink};
pub use term::Term;
