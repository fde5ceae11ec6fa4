//! Read queries over the course catalog.
//!
//! String filters are SQL `LIKE` patterns (case-insensitive for ASCII);
//! `%` matches anything and is the default for every field.

use rusqlite::types::{Type, Value};
use rusqlite::{Row, params_from_iter};
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::models::Term;
use crate::storage::Store;

const MATCH_ALL: &str = "%";

/// Query rows report the semester as its stored code.
fn serialize_enum_code<S>(term: &Term, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(term.enum_code())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRow {
    pub id: i64,
    pub subject: String,
    pub course_no: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructorRow {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeachingRow {
    pub id: i64,
    pub instructor: InstructorRow,
    pub course: CourseRow,
    pub year: String,
    #[serde(serialize_with = "serialize_enum_code")]
    pub semester: Term,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub id: i64,
    pub teaching: TeachingRow,
    pub instructor_rating: i64,
    pub difficulty_rating: i64,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct InstructorFilter {
    pub email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
}

impl Default for InstructorFilter {
    fn default() -> Self {
        Self {
            email: MATCH_ALL.to_string(),
            first_name: MATCH_ALL.to_string(),
            middle_name: MATCH_ALL.to_string(),
            last_name: MATCH_ALL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CourseFilter {
    pub subject: String,
    pub course_no: String,
}

impl Default for CourseFilter {
    fn default() -> Self {
        Self {
            subject: MATCH_ALL.to_string(),
            course_no: MATCH_ALL.to_string(),
        }
    }
}

/// Filter shared by teaching and review lookups.
#[derive(Debug, Clone)]
pub struct TeachingFilter {
    /// `LIKE` pattern on the year column
    pub year: String,
    pub semester: Option<Term>,
    pub instructor_id: Option<i64>,
    pub course_id: Option<i64>,
}

impl Default for TeachingFilter {
    fn default() -> Self {
        Self {
            year: MATCH_ALL.to_string(),
            semester: None,
            instructor_id: None,
            course_id: None,
        }
    }
}

impl TeachingFilter {
    /// Extra `AND` clauses plus every bound value, year first.
    fn clauses(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut values = vec![Value::Text(self.year.clone())];

        if let Some(term) = self.semester {
            sql.push_str(" AND t.semester = ?");
            values.push(Value::Text(term.enum_code().to_string()));
        }
        if let Some(id) = self.instructor_id {
            sql.push_str(" AND t.instructor_id = ?");
            values.push(Value::Integer(id));
        }
        if let Some(id) = self.course_id {
            sql.push_str(" AND t.course_id = ?");
            values.push(Value::Integer(id));
        }

        (sql, values)
    }
}

const TEACHING_COLUMNS: &str = "\
    t.id,
    i.id, i.email, i.first_name, i.middle_name, i.last_name,
    c.id, c.subject, c.course_no, c.title,
    t.year, t.semester";

const TEACHING_JOINS: &str = "\
    FROM teaching t
    INNER JOIN instructor i ON t.instructor_id = i.id
    INNER JOIN course c ON t.course_id = c.id";

/// Column count of [`TEACHING_COLUMNS`].
const TEACHING_WIDTH: usize = 12;

fn semester_from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Term> {
    let code: String = row.get(idx)?;
    Term::from_enum_code(&code).ok_or_else(|| {
        let message = format!("unknown semester code '{code}'");
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
    })
}

fn teaching_from_row(row: &Row<'_>) -> rusqlite::Result<TeachingRow> {
    Ok(TeachingRow {
        id: row.get(0)?,
        instructor: InstructorRow {
            id: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            middle_name: row.get(4)?,
            last_name: row.get(5)?,
        },
        course: CourseRow {
            id: row.get(6)?,
            subject: row.get(7)?,
            course_no: row.get(8)?,
            title: row.get(9)?,
        },
        year: row.get(10)?,
        semester: semester_from_column(row, 11)?,
    })
}

impl Store {
    pub fn find_instructors(&self, filter: &InstructorFilter) -> Result<Vec<InstructorRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, email, first_name, middle_name, last_name FROM instructor
                 WHERE email LIKE ?1 AND first_name LIKE ?2
                 AND middle_name LIKE ?3 AND last_name LIKE ?4
                 ORDER BY id",
            )?;
            let rows = stmt.query_map(
                [
                    &filter.email,
                    &filter.first_name,
                    &filter.middle_name,
                    &filter.last_name,
                ],
                |row| {
                    Ok(InstructorRow {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        first_name: row.get(2)?,
                        middle_name: row.get(3)?,
                        last_name: row.get(4)?,
                    })
                },
            )?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn find_courses(&self, filter: &CourseFilter) -> Result<Vec<CourseRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, subject, course_no, title FROM course
                 WHERE subject LIKE ?1 AND course_no LIKE ?2
                 ORDER BY id",
            )?;
            let rows = stmt.query_map([&filter.subject, &filter.course_no], |row| {
                Ok(CourseRow {
                    id: row.get(0)?,
                    subject: row.get(1)?,
                    course_no: row.get(2)?,
                    title: row.get(3)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn find_teachings(&self, filter: &TeachingFilter) -> Result<Vec<TeachingRow>> {
        let (clauses, values) = filter.clauses();
        let sql = format!(
            "SELECT {TEACHING_COLUMNS} {TEACHING_JOINS}
             WHERE t.year LIKE ?{clauses}
             ORDER BY t.id"
        );

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), teaching_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn find_reviews(&self, filter: &TeachingFilter) -> Result<Vec<ReviewRow>> {
        let (clauses, values) = filter.clauses();
        let sql = format!(
            "SELECT {TEACHING_COLUMNS},
                    r.id, r.instructor_rating, r.difficulty_rating, r.comment
             FROM review r
             INNER JOIN teaching t ON t.id = r.teaching_id
             INNER JOIN instructor i ON t.instructor_id = i.id
             INNER JOIN course c ON t.course_id = c.id
             WHERE t.year LIKE ?{clauses}
             ORDER BY r.id"
        );

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
                Ok(ReviewRow {
                    teaching: teaching_from_row(row)?,
                    id: row.get(TEACHING_WIDTH)?,
                    instructor_rating: row.get(TEACHING_WIDTH + 1)?,
                    difficulty_rating: row.get(TEACHING_WIDTH + 2)?,
                    comment: row.get(TEACHING_WIDTH + 3)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourseRecord, InstructorRecord, TeachingLink};

    fn seeded() -> Store {
        let store = Store::open_in_memory().unwrap();
        let courses = [
            CourseRecord {
                subject: "CSCI".to_string(),
                course_no: "1301".to_string(),
                title: "Intro to Programming".to_string(),
            },
            CourseRecord {
                subject: "MATH".to_string(),
                course_no: "2250".to_string(),
                title: "Calculus I".to_string(),
            },
        ];
        let instructors = [
            InstructorRecord {
                email: "jqp@example.edu".to_string(),
                first_name: "Jane".to_string(),
                middle_name: "Q".to_string(),
                last_name: "Public".to_string(),
            },
            InstructorRecord {
                email: "jd@example.edu".to_string(),
                first_name: "John".to_string(),
                middle_name: String::new(),
                last_name: "Doe".to_string(),
            },
        ];
        let link = |year: &str, term, email: &str, subject: &str, course_no: &str| TeachingLink {
            year: year.to_string(),
            term,
            email: email.to_string(),
            subject: subject.to_string(),
            course_no: course_no.to_string(),
        };
        let teachings = [
            link("2021", Term::Fall, "jqp@example.edu", "CSCI", "1301"),
            link("2021", Term::Spring, "jd@example.edu", "MATH", "2250"),
            link("2022", Term::Fall, "jqp@example.edu", "MATH", "2250"),
        ];
        store.upsert_batches(&courses, &instructors, &teachings).unwrap();
        store
    }

    #[test]
    fn test_find_instructors_like_is_case_insensitive() {
        let store = seeded();
        assert_eq!(store.find_instructors(&InstructorFilter::default()).unwrap().len(), 2);

        let filter = InstructorFilter {
            last_name: "pub%".to_string(),
            ..InstructorFilter::default()
        };
        let found = store.find_instructors(&filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "jqp@example.edu");
    }

    #[test]
    fn test_find_courses_by_subject() {
        let store = seeded();
        let filter = CourseFilter {
            subject: "math".to_string(),
            ..CourseFilter::default()
        };
        let found = store.find_courses(&filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Calculus I");
    }

    #[test]
    fn test_find_teachings_filters() {
        let store = seeded();
        assert_eq!(store.find_teachings(&TeachingFilter::default()).unwrap().len(), 3);

        let fall = TeachingFilter {
            semester: Some(Term::Fall),
            ..TeachingFilter::default()
        };
        assert_eq!(store.find_teachings(&fall).unwrap().len(), 2);

        let fall_2022 = TeachingFilter {
            year: "2022".to_string(),
            semester: Some(Term::Fall),
            ..TeachingFilter::default()
        };
        let found = store.find_teachings(&fall_2022).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].course.subject, "MATH");
        assert_eq!(found[0].instructor.first_name, "Jane");
        assert_eq!(found[0].semester, Term::Fall);

        let by_instructor = TeachingFilter {
            instructor_id: Some(found[0].instructor.id),
            ..TeachingFilter::default()
        };
        assert_eq!(store.find_teachings(&by_instructor).unwrap().len(), 2);
    }

    #[test]
    fn test_teaching_row_serializes_stored_code() {
        let store = seeded();
        let spring = TeachingFilter {
            semester: Some(Term::Spring),
            ..TeachingFilter::default()
        };
        let found = store.find_teachings(&spring).unwrap();
        let json = serde_json::to_value(&found[0]).unwrap();
        assert_eq!(json["semester"], "S");
        assert_eq!(json["year"], "2021");
    }
}
