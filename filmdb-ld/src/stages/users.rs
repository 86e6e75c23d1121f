//! Users stage

use std::path::Path;

use csv::StringRecord;
use tracing::info;

use super::{count_of, StageCounts};
use crate::batch::BatchInsert;
use crate::error::LoadResult;
use crate::pipeline::LoadContext;
use crate::sources::require;

/// User names from the first column of every non-empty row
///
/// A leading `username` header row is dropped.
pub fn read_user_names(path: &Path) -> LoadResult<Vec<String>> {
    require(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut names = Vec::new();
    let mut record = StringRecord::new();
    let mut first = true;
    while reader.read_record(&mut record)? {
        let name = record
            .get(0)
            .map(|field| field.trim_start_matches('\u{feff}').trim())
            .unwrap_or("");
        let is_header = first && name.eq_ignore_ascii_case("username");
        first = false;
        if name.is_empty() || is_header {
            continue;
        }
        names.push(name.to_string());
    }
    Ok(names)
}

pub async fn load(ctx: &mut LoadContext) -> LoadResult<StageCounts> {
    let names = read_user_names(&ctx.inputs.users)?;
    let mut tx = ctx.pool.begin().await?;

    let mut batch = BatchInsert::new("User", &["userName"], ctx.config.batch_size);
    for name in names {
        batch.push(&mut tx, vec![name.into()]).await?;
    }
    batch.flush(&mut tx).await?;
    tx.commit().await?;

    info!("✓ Inserted {} users", batch.rows_written());
    Ok(vec![count_of(&batch)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_user_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, "username\nalice\n\nbob,extra\n  carol \n").unwrap();
        assert_eq!(read_user_names(&path).unwrap(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_headerless_user_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, "alice\nbob\n").unwrap();
        assert_eq!(read_user_names(&path).unwrap(), vec!["alice", "bob"]);
    }
}
