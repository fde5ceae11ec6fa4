//! Ignore-on-conflict batch inserts for scraped data.

use rusqlite::params;

use crate::error::Result;
use crate::models::{CourseRecord, InstructorRecord, TeachingLink};
use crate::storage::Store;

const INSERT_COURSE: &str = "\
    INSERT INTO course (subject, course_no, title)
    VALUES (?1, ?2, ?3) ON CONFLICT DO NOTHING";

const INSERT_INSTRUCTOR: &str = "\
    INSERT INTO instructor (email, first_name, middle_name, last_name)
    VALUES (?1, ?2, ?3, ?4) ON CONFLICT DO NOTHING";

const INSERT_TEACHING: &str = "\
    INSERT INTO teaching (instructor_id, course_id, year, semester)
    SELECT i.id, c.id, ?1, ?2
    FROM instructor i, course c
    WHERE i.email = ?3 AND c.subject = ?4 AND c.course_no = ?5
    ON CONFLICT DO NOTHING";

/// Rows actually inserted by one reconcile. Existing rows count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub courses: usize,
    pub instructors: usize,
    pub teachings: usize,
}

impl ReconcileSummary {
    pub fn is_noop(&self) -> bool {
        self.courses == 0 && self.instructors == 0 && self.teachings == 0
    }
}

impl Store {
    /// Insert courses, instructors and teaching links in one transaction.
    ///
    /// Rows whose natural key already exists are left untouched. Nothing is
    /// committed unless all three batches succeed.
    pub fn upsert_batches(
        &self,
        courses: &[CourseRecord],
        instructors: &[InstructorRecord],
        teachings: &[TeachingLink],
    ) -> Result<ReconcileSummary> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut summary = ReconcileSummary::default();

            {
                let mut stmt = tx.prepare_cached(INSERT_COURSE)?;
                for course in courses {
                    summary.courses +=
                        stmt.execute(params![course.subject, course.course_no, course.title])?;
                }
            }

            {
                let mut stmt = tx.prepare_cached(INSERT_INSTRUCTOR)?;
                for instructor in instructors {
                    summary.instructors += stmt.execute(params![
                        instructor.email,
                        instructor.first_name,
                        instructor.middle_name,
                        instructor.last_name,
                    ])?;
                }
            }

            {
                let mut stmt = tx.prepare_cached(INSERT_TEACHING)?;
                for link in teachings {
                    summary.teachings += stmt.execute(params![
                        link.year,
                        link.term.enum_code(),
                        link.email,
                        link.subject,
                        link.course_no,
                    ])?;
                }
            }

            tx.commit()?;
            Ok(summary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Term;

    fn course(title: &str) -> CourseRecord {
        CourseRecord {
            subject: "CSCI".to_string(),
            course_no: "1301".to_string(),
            title: title.to_string(),
        }
    }

    fn instructor(first: &str) -> InstructorRecord {
        InstructorRecord {
            email: "jqp@example.edu".to_string(),
            first_name: first.to_string(),
            middle_name: "Q".to_string(),
            last_name: "Public".to_string(),
        }
    }

    fn link() -> TeachingLink {
        TeachingLink {
            year: "2021".to_string(),
            term: Term::Fall,
            email: "jqp@example.edu".to_string(),
            subject: "CSCI".to_string(),
            course_no: "1301".to_string(),
        }
    }

    #[test]
    fn test_upsert_inserts_all_batches() {
        let store = Store::open_in_memory().unwrap();
        let summary = store
            .upsert_batches(&[course("Intro")], &[instructor("Jane")], &[link()])
            .unwrap();
        assert_eq!(
            summary,
            ReconcileSummary {
                courses: 1,
                instructors: 1,
                teachings: 1
            }
        );

        let semester: String = store
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT semester FROM teaching", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(semester, "F");
    }

    #[test]
    fn test_upsert_ignores_existing_rows() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_batches(&[course("Intro")], &[instructor("Jane")], &[link()])
            .unwrap();

        let summary = store
            .upsert_batches(&[course("Renamed")], &[instructor("Janet")], &[link()])
            .unwrap();
        assert!(summary.is_noop());

        let (title, first): (String, String) = store
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT c.title, i.first_name FROM course c, instructor i",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?)
            })
            .unwrap();
        assert_eq!(title, "Intro");
        assert_eq!(first, "Jane");
    }

    #[test]
    fn test_failed_batch_rolls_back_everything() {
        let store = Store::open_in_memory().unwrap();
        store
            .with_conn(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER reject_teaching BEFORE INSERT ON teaching
                     BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
                )?;
                Ok(())
            })
            .unwrap();

        let result = store.upsert_batches(&[course("Intro")], &[instructor("Jane")], &[link()]);
        assert!(result.is_err());

        let counts = store.counts().unwrap();
        assert_eq!(counts.courses, 0);
        assert_eq!(counts.instructors, 0);
    }
}
