//! Chunked filtered copy
//!
//! Streams a tab-separated file, keeps the rows a predicate selects and
//! appends them to the output one chunk at a time, so peak memory follows the
//! chunk size rather than the file size. The header is always written, and
//! `\N` nulls are rewritten as empty fields.

use std::collections::HashSet;
use std::path::Path;

use csv::StringRecord;
use filmdb_common::tsv::{column_index, tsv_reader, tsv_writer, NULL_MARKER};
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};

/// How many rows to buffer between flushes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSize {
    Rows(usize),
    /// Whole file in one pass
    Unbounded,
}

impl ChunkSize {
    fn limit(self) -> usize {
        match self {
            ChunkSize::Rows(n) => n.max(1),
            ChunkSize::Unbounded => usize::MAX,
        }
    }
}

/// Predicate verdict for a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Skip,
    /// Keep nothing further and stop reading
    Stop,
}

/// Copy statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub rows_read: u64,
    pub rows_kept: u64,
    pub chunks: u64,
}

/// Read-only view of one row with column lookup by header name
pub struct Row<'r> {
    headers: &'r StringRecord,
    record: &'r StringRecord,
}

impl<'r> Row<'r> {
    /// Raw field value for a column, None if the column or field is absent
    pub fn get(&self, column: &str) -> Option<&'r str> {
        column_index(self.headers, column).and_then(|i| self.record.get(i))
    }
}

/// Copy the rows of `input` selected by `decide` into `output`
///
/// `required_columns` are checked against the header before anything is
/// written.
pub fn filtered_copy<F>(
    input: &Path,
    output: &Path,
    required_columns: &[&str],
    chunk: ChunkSize,
    mut decide: F,
) -> ExtractResult<CopyStats>
where
    F: FnMut(&Row<'_>) -> Decision,
{
    let mut reader = tsv_reader(input)?;
    let headers = reader.headers()?.clone();

    for column in required_columns {
        if column_index(&headers, column).is_none() {
            return Err(ExtractError::MissingColumn {
                path: input.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut writer = tsv_writer(output)?;
    writer.write_record(&headers)?;

    let limit = chunk.limit();
    let mut stats = CopyStats::default();
    let mut buffer: Vec<StringRecord> = Vec::new();
    let mut stopped = false;

    while !stopped {
        // Fill one chunk
        buffer.clear();
        let mut record = StringRecord::new();
        while buffer.len() < limit && reader.read_record(&mut record)? {
            buffer.push(std::mem::take(&mut record));
        }
        if buffer.is_empty() {
            break;
        }
        let reached_end = buffer.len() < limit;
        stats.rows_read += buffer.len() as u64;

        for record in &buffer {
            let row = Row {
                headers: &headers,
                record,
            };
            match decide(&row) {
                Decision::Keep => {
                    writer.write_record(record.iter().map(normalize_null))?;
                    stats.rows_kept += 1;
                }
                Decision::Skip => {}
                Decision::Stop => {
                    stopped = true;
                    break;
                }
            }
        }

        writer.flush()?;
        stats.chunks += 1;
        debug!(
            "Flushed chunk {} of {} ({} rows kept so far)",
            stats.chunks,
            input.display(),
            stats.rows_kept
        );

        if reached_end {
            break;
        }
    }

    writer.flush()?;
    Ok(stats)
}

/// Keep rows whose `key_column` value is in `keys`
pub fn filter_by_key(
    input: &Path,
    output: &Path,
    key_column: &str,
    keys: &HashSet<String>,
    chunk: ChunkSize,
) -> ExtractResult<CopyStats> {
    filtered_copy(input, output, &[key_column], chunk, |row| {
        match row.get(key_column) {
            Some(key) if keys.contains(key) => Decision::Keep,
            _ => Decision::Skip,
        }
    })
}

fn normalize_null(field: &str) -> &str {
    if field == NULL_MARKER {
        ""
    } else {
        field
    }
}
