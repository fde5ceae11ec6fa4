//! Database schema definitions

use rusqlite::Connection;

use crate::error::Result;

/// Create any missing tables. Safe to run on every connect.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS course (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    subject     TEXT NOT NULL,
    course_no   TEXT NOT NULL,
    title       TEXT NOT NULL,
    UNIQUE (subject, course_no)
);

CREATE TABLE IF NOT EXISTS instructor (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE,
    first_name  TEXT NOT NULL,
    middle_name TEXT NOT NULL DEFAULT '',
    last_name   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS teaching (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    instructor_id   INTEGER NOT NULL REFERENCES instructor(id),
    course_id       INTEGER NOT NULL REFERENCES course(id),
    year            TEXT NOT NULL,
    semester        TEXT NOT NULL CHECK (semester IN ('F', 'S', 'X')),
    UNIQUE (instructor_id, course_id, year, semester)
);

CREATE TABLE IF NOT EXISTS review (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id             INTEGER NOT NULL,
    teaching_id         INTEGER NOT NULL REFERENCES teaching(id),
    instructor_rating   INTEGER NOT NULL CHECK (instructor_rating BETWEEN 1 AND 5),
    difficulty_rating   INTEGER NOT NULL CHECK (difficulty_rating BETWEEN 1 AND 5),
    comment             TEXT NOT NULL DEFAULT '',
    UNIQUE (user_id, teaching_id)
);

CREATE INDEX IF NOT EXISTS idx_teaching_course ON teaching(course_id);
CREATE INDEX IF NOT EXISTS idx_review_teaching ON review(teaching_id);
"#;
