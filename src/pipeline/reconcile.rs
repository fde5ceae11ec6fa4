// src/pipeline/reconcile.rs

//! Turns a scraped tuple set into course, instructor and teaching batches.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{CourseRecord, InstructorRecord, ScrapedSections, TeachingLink, Term};
use crate::storage::{ReconcileSummary, Store};

/// Deduplicated insert batches for one scrape.
///
/// Each batch keeps the first record seen for a natural key; later tuples
/// with a different title or name spelling for the same key are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub courses: Vec<CourseRecord>,
    pub instructors: Vec<InstructorRecord>,
    pub teachings: Vec<TeachingLink>,
}

impl ReconcilePlan {
    pub fn build(year: &str, term: Term, sections: &ScrapedSections) -> Self {
        let mut plan = Self::default();
        let mut course_keys = HashSet::new();
        let mut instructor_keys = HashSet::new();
        let mut teaching_keys = HashSet::new();

        for tuple in sections {
            if course_keys.insert((tuple.subject.as_str(), tuple.course_no.as_str())) {
                plan.courses.push(CourseRecord {
                    subject: tuple.subject.clone(),
                    course_no: tuple.course_no.clone(),
                    title: tuple.title.clone(),
                });
            }

            if instructor_keys.insert(tuple.email.as_str()) {
                plan.instructors.push(InstructorRecord {
                    email: tuple.email.clone(),
                    first_name: tuple.first.clone(),
                    middle_name: tuple.middle.clone(),
                    last_name: tuple.last.clone(),
                });
            }

            let link = TeachingLink {
                year: year.to_string(),
                term,
                email: tuple.email.clone(),
                subject: tuple.subject.clone(),
                course_no: tuple.course_no.clone(),
            };
            if teaching_keys.insert(link.clone()) {
                plan.teachings.push(link);
            }
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty() && self.instructors.is_empty() && self.teachings.is_empty()
    }
}

/// Reconcile scraped tuples into the store.
///
/// Returns immediately for an empty set. Otherwise all three batches are
/// written in one transaction with ignore-on-conflict semantics, so running
/// it again with the same input changes nothing.
pub fn reconcile(
    store: &Store,
    year: &str,
    term: Term,
    sections: &ScrapedSections,
) -> Result<ReconcileSummary> {
    if sections.is_empty() {
        return Ok(ReconcileSummary::default());
    }

    let plan = ReconcilePlan::build(year, term, sections);
    log::debug!(
        "Reconciling {} courses, {} instructors, {} teachings for {} {}",
        plan.courses.len(),
        plan.instructors.len(),
        plan.teachings.len(),
        year,
        term
    );

    store.upsert_batches(&plan.courses, &plan.instructors, &plan.teachings)
}
