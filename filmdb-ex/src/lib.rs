//! filmdb-ex library - Source Extractor
//!
//! Filters the raw IMDb dumps down to the working dataset consumed by
//! `filmdb-ld`.

pub mod error;
pub mod extract;
pub mod filter;

pub use crate::error::{ExtractError, ExtractResult};
pub use crate::extract::{ExtractSummary, Extractor, InputFiles};
pub use crate::filter::{filter_by_key, filtered_copy, ChunkSize, CopyStats, Decision};
