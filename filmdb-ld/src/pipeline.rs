//! Load pipeline
//!
//! Runs the load stages in foreign-key order against one database.
//!
//! # Architecture
//! - **movies**: Movies from the working set
//! - **studios**: Studio catalog, Produced_By links
//! - **people**: People, each assigned a random current studio
//! - **roles**: Actor/Director/Writer rows and memberships
//! - **genres**: Genre catalog, Has_Genre links
//! - **awards**: Award catalog, randomized Wins_Award rows
//! - **users**: User names
//! - **reviews**: Sampled corpus reviews
//! - **favorites**: Random favorite lists
//!
//! # Error Handling
//! Each stage commits its own transaction. The first failing stage is
//! rolled back and stops the run; stages before it stay committed and stages
//! after it never start.

use std::fmt;
use std::str::FromStr;

use filmdb_common::config::LoadConfig;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::error::{LoadError, LoadResult};
use crate::sources::LoadInputs;
use crate::stages::{self, StageCounts};
use crate::synthetic::Synthetic;

/// A load stage, in dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Movies,
    Studios,
    People,
    Roles,
    Genres,
    Awards,
    Users,
    Reviews,
    Favorites,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Movies,
        Stage::Studios,
        Stage::People,
        Stage::Roles,
        Stage::Genres,
        Stage::Awards,
        Stage::Users,
        Stage::Reviews,
        Stage::Favorites,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Movies => "movies",
            Stage::Studios => "studios",
            Stage::People => "people",
            Stage::Roles => "roles",
            Stage::Genres => "genres",
            Stage::Awards => "awards",
            Stage::Users => "users",
            Stage::Reviews => "reviews",
            Stage::Favorites => "favorites",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Stage::ALL.iter().map(|stage| stage.name()).collect();
                format!("unknown stage '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// Which stages a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageSelection {
    #[default]
    All,
    Only(Stage),
    From(Stage),
}

impl StageSelection {
    /// Selected stages in execution order
    pub fn stages(self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| match self {
                StageSelection::All => true,
                StageSelection::Only(only) => *stage == only,
                StageSelection::From(first) => *stage >= first,
            })
            .collect()
    }
}

/// Outcome of one committed stage
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub counts: StageCounts,
}

/// Rows inserted by a load run, per stage and table
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub stages: Vec<StageReport>,
}

impl LoadReport {
    /// Rows inserted into `table` across all stages
    pub fn rows_for(&self, table: &str) -> u64 {
        self.stages
            .iter()
            .flat_map(|report| report.counts.iter())
            .filter(|count| count.table == table)
            .map(|count| count.rows)
            .sum()
    }

    pub fn completed(&self) -> Vec<Stage> {
        self.stages.iter().map(|report| report.stage).collect()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.stages {
            writeln!(f, "{}:", report.stage)?;
            for count in &report.counts {
                writeln!(f, "  {:<20} {:>10}", count.table, count.rows)?;
            }
        }
        Ok(())
    }
}

/// Everything a stage needs
pub struct LoadContext {
    pub pool: SqlitePool,
    pub inputs: LoadInputs,
    pub config: LoadConfig,
    pub synth: Synthetic,
}

/// Stage runner
pub struct Loader {
    ctx: LoadContext,
}

impl Loader {
    pub fn new(pool: SqlitePool, config: LoadConfig) -> Self {
        let inputs = LoadInputs::from_config(&config);
        let synth = Synthetic::new(config.seed);
        Self {
            ctx: LoadContext {
                pool,
                inputs,
                config,
                synth,
            },
        }
    }

    pub fn context(&self) -> &LoadContext {
        &self.ctx
    }

    /// Run one stage in its own transaction
    pub async fn run_stage(&mut self, stage: Stage) -> LoadResult<StageCounts> {
        let ctx = &mut self.ctx;
        match stage {
            Stage::Movies => stages::movies::load(ctx).await,
            Stage::Studios => stages::studios::load(ctx).await,
            Stage::People => stages::people::load(ctx).await,
            Stage::Roles => stages::roles::load(ctx).await,
            Stage::Genres => stages::genres::load(ctx).await,
            Stage::Awards => stages::awards::load(ctx).await,
            Stage::Users => stages::users::load(ctx).await,
            Stage::Reviews => stages::reviews::load(ctx).await,
            Stage::Favorites => stages::favorites::load(ctx).await,
        }
    }

    /// Run the selected stages in order, stopping at the first failure
    pub async fn run(&mut self, selection: StageSelection) -> LoadResult<LoadReport> {
        let mut report = LoadReport::default();

        for stage in selection.stages() {
            info!("Loading stage: {}", stage);
            match self.run_stage(stage).await {
                Ok(counts) => report.stages.push(StageReport { stage, counts }),
                Err(e) => {
                    error!("Stage {} failed and was rolled back: {}", stage, e);
                    if !report.stages.is_empty() {
                        info!("Committed stages: {:?}", report.completed());
                    }
                    return Err(LoadError::StageFailed {
                        stage,
                        source: Box::new(e),
                    });
                }
            }
        }

        info!("✓ Load complete ({} stages)", report.stages.len());
        Ok(report)
    }
}
