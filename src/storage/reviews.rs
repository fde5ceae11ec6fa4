//! Review writes.

use rusqlite::{ErrorCode, ffi, params};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::storage::Store;

/// A review submitted by an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub user_id: i64,
    pub teaching_id: i64,
    pub instructor_rating: i64,
    pub difficulty_rating: i64,
    #[serde(default)]
    pub comment: String,
}

impl Store {
    /// Insert a review and return its id.
    ///
    /// Rating bounds are enforced by the table's check constraints; a
    /// violation comes back as [`AppError::RatingOutOfRange`].
    pub fn insert_review(&self, review: &NewReview) -> Result<i64> {
        self.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM teaching WHERE id = ?1)",
                [review.teaching_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(AppError::TeachingNotFound(review.teaching_id));
            }

            let inserted = conn.execute(
                "INSERT INTO review (user_id, teaching_id, instructor_rating, difficulty_rating, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    review.user_id,
                    review.teaching_id,
                    review.instructor_rating,
                    review.difficulty_rating,
                    review.comment,
                ],
            );

            match inserted {
                Ok(_) => Ok(conn.last_insert_rowid()),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation
                        && e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    Err(AppError::DuplicateReview {
                        user_id: review.user_id,
                        teaching_id: review.teaching_id,
                    })
                }
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation
                        && e.extended_code == ffi::SQLITE_CONSTRAINT_CHECK =>
                {
                    Err(AppError::RatingOutOfRange)
                }
                Err(e) => Err(e.into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourseRecord, InstructorRecord, TeachingLink, Term};
    use crate::storage::TeachingFilter;

    fn store_with_teaching() -> (Store, i64) {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_batches(
                &[CourseRecord {
                    subject: "CSCI".to_string(),
                    course_no: "1301".to_string(),
                    title: "Intro".to_string(),
                }],
                &[InstructorRecord {
                    email: "jqp@example.edu".to_string(),
                    first_name: "Jane".to_string(),
                    middle_name: "Q".to_string(),
                    last_name: "Public".to_string(),
                }],
                &[TeachingLink {
                    year: "2021".to_string(),
                    term: Term::Fall,
                    email: "jqp@example.edu".to_string(),
                    subject: "CSCI".to_string(),
                    course_no: "1301".to_string(),
                }],
            )
            .unwrap();
        let id = store.find_teachings(&TeachingFilter::default()).unwrap()[0].id;
        (store, id)
    }

    fn review(teaching_id: i64, rating: i64) -> NewReview {
        NewReview {
            user_id: 7,
            teaching_id,
            instructor_rating: rating,
            difficulty_rating: 3,
            comment: "Clear lectures".to_string(),
        }
    }

    #[test]
    fn test_insert_review_and_read_back() {
        let (store, teaching_id) = store_with_teaching();
        let id = store.insert_review(&review(teaching_id, 5)).unwrap();

        let reviews = store.find_reviews(&TeachingFilter::default()).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, id);
        assert_eq!(reviews[0].instructor_rating, 5);
        assert_eq!(reviews[0].teaching.course.subject, "CSCI");
        assert_eq!(reviews[0].comment, "Clear lectures");
    }

    #[test]
    fn test_duplicate_review_rejected() {
        let (store, teaching_id) = store_with_teaching();
        store.insert_review(&review(teaching_id, 4)).unwrap();
        assert!(matches!(
            store.insert_review(&review(teaching_id, 2)),
            Err(AppError::DuplicateReview { user_id: 7, .. })
        ));
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let (store, teaching_id) = store_with_teaching();
        assert!(matches!(
            store.insert_review(&review(teaching_id, 6)),
            Err(AppError::RatingOutOfRange)
        ));
        assert!(matches!(
            store.insert_review(&review(teaching_id, 0)),
            Err(AppError::RatingOutOfRange)
        ));
        assert_eq!(store.counts().unwrap().reviews, 0);
    }

    #[test]
    fn test_unknown_teaching_rejected() {
        let (store, teaching_id) = store_with_teaching();
        assert!(matches!(
            store.insert_review(&review(teaching_id + 100, 3)),
            Err(AppError::TeachingNotFound(_))
        ));
    }
}
