// src/services/parser.rs

//! Schedule page parser.
//!
//! The registrar renders every section as two consecutive rows of the
//! results table: a title row whose link reads
//! `"<title> - <crn> - <subject> <course no>"`, and a body row holding one
//! `mailto:` link per instructor whose `target` attribute is the full name.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ScrapedSections, ScrapedTuple};

/// Text the registrar renders in place of results for an unknown term.
pub const INVALID_TERM_MARKER: &str = "Not a valid term";

const COURSE_TITLE_REGEX: &str =
    r"(?P<t>\A.+) - \d{5} - (?P<s>[A-Z]{2,4}) (?P<c>[0-9A-Z]{4,5})";
const NAME_REGEX: &str = r"(?P<first>[^ ]+) (?P<middle>.+) (?P<last>[^ ]+)";
const NAME_NO_MIDDLE_REGEX: &str = r"(?P<first>[^ ]+) (?P<last>[^ ]+)";

const MAILTO_PREFIX_LEN: usize = "mailto:".len();

/// Extracts (course, instructor) tuples from a schedule results page.
pub struct ScheduleParser {
    caption_sel: Selector,
    link_sel: Selector,
    mailto_sel: Selector,
    title_pattern: Regex,
    name_pattern: Regex,
    name_no_middle_pattern: Regex,
}

/// Title fields of one section.
#[derive(Debug, PartialEq, Eq)]
struct SectionTitle {
    title: String,
    subject: String,
    course_no: String,
}

/// Parsed instructor full name.
#[derive(Debug, PartialEq, Eq)]
struct FullName {
    first: String,
    middle: String,
    last: String,
}

impl ScheduleParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            caption_sel: Self::parse_selector("caption")?,
            link_sel: Self::parse_selector("a")?,
            mailto_sel: Self::parse_selector(r#"a[href^="mailto"]"#)?,
            title_pattern: Regex::new(COURSE_TITLE_REGEX)?,
            name_pattern: Regex::new(NAME_REGEX)?,
            name_no_middle_pattern: Regex::new(NAME_NO_MIDDLE_REGEX)?,
        })
    }

    /// Parse a results page into a deduplicated tuple set.
    ///
    /// Returns `None` when the registrar rejected the term. Rows or
    /// instructors that do not match their patterns are logged and skipped.
    pub fn parse(&self, markup: &str) -> Option<ScrapedSections> {
        let document = Html::parse_document(markup);

        if document
            .root_element()
            .text()
            .any(|text| text.trim() == INVALID_TERM_MARKER)
        {
            return None;
        }

        let mut sections = ScrapedSections::new();

        let Some(table) = self.results_table(&document) else {
            log::warn!("No results table found in schedule page");
            return Some(sections);
        };

        let rows = Self::direct_rows(table);
        for pair in rows.chunks_exact(2) {
            let (title_row, body_row) = (pair[0], pair[1]);

            let title_raw: String = match title_row.select(&self.link_sel).next() {
                Some(link) => link.text().collect(),
                None => String::new(),
            };

            // NOTE: an unmatched title ends the scan and returns what was
            // collected so far. Later rows are never examined even if they
            // would match. Possibly unintended.
            let Some(section) = self.parse_title(&title_raw) else {
                log::debug!("match is None\n{}", title_raw);
                return Some(sections);
            };

            for mailto in body_row.select(&self.mailto_sel) {
                let Some(instructor) = mailto.value().attr("target") else {
                    log::debug!("Instructor link without a name in {}", title_raw);
                    continue;
                };

                let Some(name) = self.parse_name(instructor) else {
                    log::debug!("Could not parse the fullname of: {}", instructor);
                    continue;
                };

                let href = mailto.value().attr("href").unwrap_or_default();
                let email: String = href.chars().skip(MAILTO_PREFIX_LEN).collect();

                sections.insert(ScrapedTuple {
                    subject: section.subject.clone(),
                    course_no: section.course_no.clone(),
                    title: section.title.clone(),
                    email,
                    first: name.first,
                    middle: name.middle,
                    last: name.last,
                });
            }
        }

        Some(sections)
    }

    /// The table holding the page's `<caption>`.
    fn results_table<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let caption = document.select(&self.caption_sel).next()?;
        caption.parent().and_then(ElementRef::wrap)
    }

    /// Rows directly under the table, looking through the implicit
    /// `tbody` that HTML parsing inserts. Rows of nested tables are excluded.
    fn direct_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
        let mut rows = Vec::new();
        for child in table.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "tr" => rows.push(child),
                "tbody" | "thead" | "tfoot" => rows.extend(
                    child
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|row| row.value().name() == "tr"),
                ),
                _ => {}
            }
        }
        rows
    }

    fn parse_title(&self, raw: &str) -> Option<SectionTitle> {
        let caps = self.title_pattern.captures(raw)?;
        Some(SectionTitle {
            title: caps["t"].to_string(),
            subject: caps["s"].to_string(),
            course_no: caps["c"].to_string(),
        })
    }

    fn parse_name(&self, raw: &str) -> Option<FullName> {
        if let Some(caps) = self.name_pattern.captures(raw) {
            return Some(FullName {
                first: caps["first"].to_string(),
                middle: caps["middle"].to_string(),
                last: caps["last"].to_string(),
            });
        }

        let caps = self.name_no_middle_pattern.captures(raw)?;
        Some(FullName {
            first: caps["first"].to_string(),
            middle: String::new(),
            last: caps["last"].to_string(),
        })
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}
