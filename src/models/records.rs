// src/models/records.rs

//! Records produced by a single scrape.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::Term;

/// One (course, instructor) pairing extracted from the schedule page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScrapedTuple {
    pub subject: String,
    pub course_no: String,
    pub title: String,
    pub email: String,
    pub first: String,
    pub middle: String,
    pub last: String,
}

impl ScrapedTuple {
    /// Fields in export column order.
    pub fn fields(&self) -> [&str; 7] {
        [
            &self.subject,
            &self.course_no,
            &self.title,
            &self.email,
            &self.first,
            &self.middle,
            &self.last,
        ]
    }
}

/// Deduplicated parser output.
///
/// Exact repeats collapse into one entry. Iteration follows the order in
/// which tuples were first seen in the document.
#[derive(Debug, Clone, Default)]
pub struct ScrapedSections {
    seen: HashSet<ScrapedTuple>,
    order: Vec<ScrapedTuple>,
}

impl ScrapedSections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tuple, returning `false` if an identical one already exists.
    pub fn insert(&mut self, tuple: ScrapedTuple) -> bool {
        if self.seen.contains(&tuple) {
            return false;
        }
        self.seen.insert(tuple.clone());
        self.order.push(tuple);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScrapedTuple> {
        self.order.iter()
    }
}

impl PartialEq for ScrapedSections {
    fn eq(&self, other: &Self) -> bool {
        self.seen == other.seen
    }
}

impl Eq for ScrapedSections {}

impl FromIterator<ScrapedTuple> for ScrapedSections {
    fn from_iter<I: IntoIterator<Item = ScrapedTuple>>(iter: I) -> Self {
        let mut sections = Self::new();
        for tuple in iter {
            sections.insert(tuple);
        }
        sections
    }
}

impl<'a> IntoIterator for &'a ScrapedSections {
    type Item = &'a ScrapedTuple;
    type IntoIter = std::slice::Iter<'a, ScrapedTuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Course keyed by (subject, course_no).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub subject: String,
    pub course_no: String,
    pub title: String,
}

/// Instructor keyed by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorRecord {
    pub email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
}

/// "This instructor taught this course in this term."
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeachingLink {
    pub year: String,
    pub term: Term,
    pub email: String,
    pub subject: String,
    pub course_no: String,
}
