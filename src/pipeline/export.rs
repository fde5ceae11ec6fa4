// src/pipeline/export.rs

//! Scrape export in the `,,`-delimited format used for offline inspection.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::ScrapedSections;

const DELIMITER: &str = ",,";
const HEADER: [&str; 7] = ["subject", "course_no", "title", "email", "first", "middle", "last"];

/// Render a header line followed by one line per tuple.
pub fn format_sections(sections: &ScrapedSections) -> String {
    let mut out = HEADER.join(DELIMITER);
    for tuple in sections {
        out.push('\n');
        out.push_str(&tuple.fields().join(DELIMITER));
    }
    out
}

/// Write scraped tuples to a file, creating parent directories.
pub fn write_sections(path: &Path, sections: &ScrapedSections) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format_sections(sections))?;
    Ok(())
}
