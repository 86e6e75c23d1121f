//! Schema-level models shared by the loader and the query service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a person can hold on a title
///
/// Each kind has its own subtype table (one row per person) and its own
/// membership table (one row per movie/person pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Actor,
    Director,
    Writer,
}

impl RoleKind {
    pub const ALL: [RoleKind; 3] = [RoleKind::Actor, RoleKind::Director, RoleKind::Writer];

    /// Map a principals `category` value to a role; other categories
    /// (producer, composer, self, ...) have no role table.
    pub fn from_category(category: &str) -> Option<Self> {
        match category.trim() {
            "actor" | "actress" => Some(RoleKind::Actor),
            "director" => Some(RoleKind::Director),
            "writer" => Some(RoleKind::Writer),
            _ => None,
        }
    }

    /// Subtype table holding one row per person in this role
    pub fn role_table(self) -> &'static str {
        match self {
            RoleKind::Actor => "Actor",
            RoleKind::Director => "Director",
            RoleKind::Writer => "Writer",
        }
    }

    /// Primary key column of the subtype table (also used by the membership table)
    pub fn id_column(self) -> &'static str {
        match self {
            RoleKind::Actor => "actorId",
            RoleKind::Director => "directorId",
            RoleKind::Writer => "writerId",
        }
    }

    /// Movie/person association table
    pub fn membership_table(self) -> &'static str {
        match self {
            RoleKind::Actor => "Acts_In",
            RoleKind::Director => "Directs",
            RoleKind::Writer => "Writes_Script_For",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoleKind::Actor => "actor",
            RoleKind::Director => "director",
            RoleKind::Writer => "writer",
        };
        f.write_str(name)
    }
}
