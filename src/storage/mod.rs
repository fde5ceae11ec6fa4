//! SQLite store for courses, instructors, teachings and reviews.
//!
//! ## Tables
//!
//! - `course` - unique on (subject, course_no)
//! - `instructor` - unique on email
//! - `teaching` - instructor/course/term link, unique on all four columns
//! - `review` - one per (user, teaching), ratings checked to 1..=5
//!
//! The connection is owned by [`Store`]. Every operation probes it first
//! and reopens it if the probe fails; a failed reopen is returned to the
//! caller. Concurrent writers rely on the uniqueness constraints alone.

pub mod queries;
pub mod reviews;
pub mod schema;
pub mod upsert;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::DatabaseConfig;

pub use queries::{
    CourseFilter, CourseRow, InstructorFilter, InstructorRow, ReviewRow, TeachingFilter,
    TeachingRow,
};
pub use reviews::NewReview;
pub use upsert::ReconcileSummary;

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    File(PathBuf),
    /// Private in-memory database; contents do not survive a reconnect.
    Memory,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub courses: u64,
    pub instructors: u64,
    pub teachings: u64,
    pub reviews: u64,
}

/// Connection handle shared by the update pipeline and readers.
pub struct Store {
    target: DbTarget,
    busy_timeout: Duration,
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        Self::with_target(DbTarget::File(path.as_ref().to_path_buf()), busy_timeout)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::with_target(DbTarget::Memory, Duration::from_secs(1))
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::open(&config.path, Duration::from_secs(config.busy_timeout_secs))
    }

    fn with_target(target: DbTarget, busy_timeout: Duration) -> Result<Self> {
        let conn = Self::connect(&target, busy_timeout)?;
        Ok(Self {
            target,
            busy_timeout,
            conn: Mutex::new(conn),
        })
    }

    fn connect(target: &DbTarget, busy_timeout: Duration) -> Result<Connection> {
        let conn = match target {
            DbTarget::File(path) => {
                log::info!("Opening SQLite database at {:?}", path);
                Connection::open(path)?
            }
            DbTarget::Memory => {
                log::debug!("Opening in-memory SQLite database");
                Connection::open_in_memory()?
            }
        };

        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::init_schema(&conn)?;
        Ok(conn)
    }

    pub fn target(&self) -> &DbTarget {
        &self.target
    }

    /// Drop the current connection and open a fresh one.
    pub fn reconnect(&self) -> Result<()> {
        let mut conn = self.lock();
        *conn = Self::connect(&self.target, self.busy_timeout)?;
        Ok(())
    }

    /// Run `f` against a live connection, reopening it first if needed.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.lock();
        if !Self::is_alive(&conn) {
            log::warn!("Database connection check failed, reconnecting");
            *conn = Self::connect(&self.target, self.busy_timeout)?;
        }
        f(&mut conn)
    }

    /// Get row counts for every table.
    pub fn counts(&self) -> Result<TableCounts> {
        self.with_conn(|conn| {
            let count = |table: &str| -> Result<u64> {
                let n: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
                Ok(n as u64)
            };

            Ok(TableCounts {
                courses: count("course")?,
                instructors: count("instructor")?,
                teachings: count("teaching")?,
                reviews: count("review")?,
            })
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// False for a closed connection or a missing schema; reads at most one row.
    fn is_alive(conn: &Connection) -> bool {
        conn.prepare("SELECT 1 FROM course LIMIT 1")
            .and_then(|mut stmt| stmt.exists([]))
            .is_ok()
    }
}
