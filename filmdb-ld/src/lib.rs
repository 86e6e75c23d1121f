//! filmdb-ld library - Bulk Loader
//!
//! Populates the filmdb schema from the extractor's working set, generating
//! the synthetic studios, roles, awards, reviews and favorites the source
//! data lacks.

pub mod batch;
pub mod error;
pub mod pipeline;
pub mod sources;
pub mod stages;
pub mod synthetic;

pub use crate::batch::{BatchInsert, SqlValue};
pub use crate::error::{LoadError, LoadResult};
pub use crate::pipeline::{LoadContext, LoadReport, Loader, Stage, StageReport, StageSelection};
pub use crate::sources::LoadInputs;
pub use crate::synthetic::Synthetic;
