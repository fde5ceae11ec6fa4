// src/error.rs

//! Unified error handling for the scraper and store.

use std::fmt;

use thiserror::Error;

use crate::models::Term;

/// Result type alias for course review operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Regex compilation failed
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// SQLite operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Semester token not recognized
    #[error("Provided semester is not valid: '{0}'")]
    InvalidSemester(String),

    /// The registrar rejected the requested term
    #[error("{year}{code} is not a valid term string", code = .term.registrar_code())]
    InvalidTerm { year: String, term: Term },

    /// Review references a teaching that does not exist
    #[error("Provided teaching_id is invalid: {0}")]
    TeachingNotFound(i64),

    /// User already reviewed this teaching
    #[error("User {user_id} has already posted a review on teaching {teaching_id}")]
    DuplicateReview { user_id: i64, teaching_id: i64 },

    /// Rating violates the store check constraint
    #[error("Ratings should be between 1 to 5")]
    RatingOutOfRange,

    /// Blocking store work panicked or was cancelled
    #[error("Blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),

    /// Background update queue is closed
    #[error("Update queue error: {0}")]
    Queue(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
