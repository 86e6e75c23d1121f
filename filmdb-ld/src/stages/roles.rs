//! Roles stage: Actor/Director/Writer rows and their memberships
//!
//! One streaming pass over the principals. A person gets one role row per
//! role kind, created at first sighting (the sighting's movie becomes the
//! best-known movie for directors and writers); every sighting adds a
//! membership row. Role buffers are always flushed before membership
//! buffers so a membership never references a role row not yet written.

use std::collections::{HashMap, HashSet};

use csv::StringRecord;
use filmdb_common::db::RoleKind;
use filmdb_common::tsv::nullable;
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use super::{count_of, fetch_text_column, loaded_movie_set, StageCounts};
use crate::batch::{BatchInsert, SqlValue};
use crate::error::LoadResult;
use crate::pipeline::LoadContext;
use crate::sources::ColumnReader;
use crate::synthetic::Synthetic;

struct RoleBuffers {
    roles: HashMap<RoleKind, BatchInsert>,
    memberships: HashMap<RoleKind, BatchInsert>,
    seen: HashMap<RoleKind, HashSet<String>>,
}

impl RoleBuffers {
    fn new(batch_size: usize) -> Self {
        let mut roles = HashMap::new();
        let mut memberships = HashMap::new();
        let mut seen = HashMap::new();
        for kind in RoleKind::ALL {
            let columns: &[&str] = match kind {
                RoleKind::Actor => &["actorId", "number_of_fans"],
                RoleKind::Director => &["directorId", "directing_style", "best_known_movieId"],
                RoleKind::Writer => &["writerId", "writing_style", "best_known_movieId"],
            };
            roles.insert(kind, BatchInsert::new(kind.role_table(), columns, batch_size));
            memberships.insert(
                kind,
                BatchInsert::new(kind.membership_table(), &["movieId", kind.id_column()], batch_size).or_ignore(),
            );
            seen.insert(kind, HashSet::new());
        }
        Self {
            roles,
            memberships,
            seen,
        }
    }

    /// Buffer one principal sighting; true when some buffer is full
    fn observe(&mut self, kind: RoleKind, movie_id: &str, person_id: &str, synth: &mut Synthetic) -> bool {
        let mut full = false;
        let seen = self.seen.entry(kind).or_default();
        if seen.insert(person_id.to_string()) {
            let row: Vec<SqlValue> = match kind {
                RoleKind::Actor => vec![person_id.into(), SqlValue::Int(synth.fan_count())],
                RoleKind::Director => vec![person_id.into(), synth.directing_style().into(), movie_id.into()],
                RoleKind::Writer => vec![person_id.into(), synth.writing_style().into(), movie_id.into()],
            };
            if let Some(batch) = self.roles.get_mut(&kind) {
                full |= batch.add(row);
            }
        }
        if let Some(batch) = self.memberships.get_mut(&kind) {
            full |= batch.add(vec![movie_id.into(), person_id.into()]);
        }
        full
    }

    async fn flush(&mut self, conn: &mut SqliteConnection) -> LoadResult<()> {
        for kind in RoleKind::ALL {
            if let Some(batch) = self.roles.get_mut(&kind) {
                batch.flush(conn).await?;
            }
        }
        for kind in RoleKind::ALL {
            if let Some(batch) = self.memberships.get_mut(&kind) {
                batch.flush(conn).await?;
            }
        }
        Ok(())
    }

    fn counts(&self) -> StageCounts {
        let mut counts = Vec::with_capacity(6);
        for batches in [&self.roles, &self.memberships] {
            for kind in RoleKind::ALL {
                if let Some(batch) = batches.get(&kind) {
                    counts.push(count_of(batch));
                }
            }
        }
        counts
    }
}

pub async fn load(ctx: &mut LoadContext) -> LoadResult<StageCounts> {
    let path = ctx.inputs.working_set.principals();
    let mut reader = ColumnReader::open(&path, &["tconst", "nconst", "category"])?;
    let mut tx = ctx.pool.begin().await?;

    let movies = loaded_movie_set(&mut tx).await?;
    let people: HashSet<String> = fetch_text_column(&mut tx, "SELECT pId FROM People")
        .await?
        .into_iter()
        .collect();

    let mut buffers = RoleBuffers::new(ctx.config.batch_size);
    let mut record = StringRecord::new();
    let mut other_categories = 0usize;
    let mut unknown_refs = 0usize;
    while let Some(fields) = reader.next_fields(&mut record)? {
        let Some(kind) = RoleKind::from_category(&fields[2]) else {
            other_categories += 1;
            continue;
        };
        let (Some(movie_id), Some(person_id)) = (nullable(&fields[0]), nullable(&fields[1])) else {
            unknown_refs += 1;
            continue;
        };
        if !movies.contains(movie_id) || !people.contains(person_id) {
            unknown_refs += 1;
            continue;
        }
        if buffers.observe(kind, movie_id, person_id, &mut ctx.synth) {
            buffers.flush(&mut tx).await?;
        }
    }
    buffers.flush(&mut tx).await?;
    tx.commit().await?;

    debug!("{} principals with other categories ignored", other_categories);
    if unknown_refs > 0 {
        warn!("{} principals reference movies or people that are not loaded", unknown_refs);
    }
    let counts = buffers.counts();
    for count in &counts {
        info!("✓ {}: {} rows", count.table, count.rows);
    }
    Ok(counts)
}
