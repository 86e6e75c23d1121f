//! Tab-separated file helpers
//!
//! IMDb dumps are tab-separated with no quoting and `\N` as the null marker.
//! The extractor rewrites nulls as empty fields, so readers accept both.

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::Result;

/// Null marker used by the raw IMDb dumps
pub const NULL_MARKER: &str = "\\N";

/// Open a tab-separated file with a header row
pub fn tsv_reader(path: &Path) -> Result<csv::Reader<File>> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    Ok(reader)
}

/// Create (or truncate) a tab-separated output file
pub fn tsv_writer(path: &Path) -> Result<csv::Writer<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(tsv_writer_from_file(file))
}

/// Wrap an already opened file (e.g. opened for append) in a TSV writer
pub fn tsv_writer_from_file(file: File) -> csv::Writer<File> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .has_headers(false)
        .from_writer(file)
}

/// True for empty fields and the `\N` marker
pub fn is_null(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == NULL_MARKER
}

/// Field value, or None when it is a null
pub fn nullable(value: &str) -> Option<&str> {
    if is_null(value) {
        None
    } else {
        Some(value.trim())
    }
}

/// Parse an integer field leniently
///
/// Accepts `2015` as well as `2015.0` (intermediate files written through a
/// float column). Nulls and non-numeric text yield None.
pub fn parse_int(value: &str) -> Option<i64> {
    let value = nullable(value)?;
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

/// Position of a named column in a header record
pub fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_markers() {
        assert!(is_null(""));
        assert!(is_null("\\N"));
        assert!(is_null("  "));
        assert!(!is_null("Drama"));
        assert_eq!(nullable("Drama"), Some("Drama"));
        assert_eq!(nullable("\\N"), None);
    }

    #[test]
    fn test_parse_int_variants() {
        assert_eq!(parse_int("2015"), Some(2015));
        assert_eq!(parse_int("2015.0"), Some(2015));
        assert_eq!(parse_int("\\N"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("90.5"), None);
    }

    #[test]
    fn test_reader_and_writer_roundtrip_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tsv");

        let mut writer = tsv_writer(&path).unwrap();
        writer.write_record(["tconst", "primaryTitle"]).unwrap();
        writer.write_record(["tt1", "A \"quoted\" title"]).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut reader = tsv_reader(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(column_index(&headers, "primaryTitle"), Some(1));
        assert_eq!(column_index(&headers, "missing"), None);

        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[1], "A \"quoted\" title");
    }
}
