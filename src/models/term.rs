// src/models/term.rs

//! Academic term (semester) encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One semester offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Fall,
    Spring,
    Summer,
}

/// Human synonyms accepted for each term (matched case-insensitively).
const SYNONYMS: &[(&str, Term)] = &[
    ("f", Term::Fall),
    ("fall", Term::Fall),
    ("s", Term::Spring),
    ("spring", Term::Spring),
    ("x", Term::Summer),
    ("summer", Term::Summer),
];

impl Term {
    pub const ALL: [Term; 3] = [Term::Spring, Term::Summer, Term::Fall];

    /// Look up a human-readable semester token.
    ///
    /// Returns `None` for anything outside the synonym table, including the
    /// empty string. Callers treat that as a validation failure.
    pub fn encode(raw: &str) -> Option<Self> {
        let raw = raw.to_lowercase();
        SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == raw)
            .map(|(_, term)| *term)
    }

    /// Code stored in the `teaching.semester` column.
    pub fn enum_code(&self) -> &'static str {
        match self {
            Term::Fall => "F",
            Term::Spring => "S",
            Term::Summer => "X",
        }
    }

    /// Month code the registrar appends to the year in its term identifier.
    pub fn registrar_code(&self) -> &'static str {
        match self {
            Term::Fall => "08",
            Term::Spring => "02",
            Term::Summer => "05",
        }
    }

    /// Decode a stored `semester` column value.
    pub fn from_enum_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.enum_code() == code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Term::Fall => "FALL",
            Term::Spring => "SPRING",
            Term::Summer => "SUMMER",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Term {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Term::encode(s).ok_or_else(|| AppError::InvalidSemester(s.to_string()))
    }
}
