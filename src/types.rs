// src/types.rs

//! Shared identifier and enum types used across the graph, scheduler and
//! engine layers.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Opaque task identifier. The engine never interprets it.
pub type TaskId = String;

/// Opaque project identifier; every graph is scoped to one project.
pub type ProjectId = String;

/// Relationship between a predecessor and a successor task.
///
/// - `FinishToStart` (default): successor starts after predecessor finishes.
/// - `StartToStart`: successor starts after predecessor starts.
/// - `FinishToFinish`: successor finishes after predecessor finishes.
/// - `StartToFinish`: successor finishes after predecessor starts.
///
/// The signed lag of a dependency is added to whichever boundary the type
/// propagates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum DependencyType {
    #[default]
    #[serde(rename = "FS", alias = "fs", alias = "finish_to_start")]
    FinishToStart,
    #[serde(rename = "SS", alias = "ss", alias = "start_to_start")]
    StartToStart,
    #[serde(rename = "FF", alias = "ff", alias = "finish_to_finish")]
    FinishToFinish,
    #[serde(rename = "SF", alias = "sf", alias = "start_to_finish")]
    StartToFinish,
}

impl DependencyType {
    /// Short code (`FS`, `SS`, `FF`, `SF`).
    pub fn code(self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "FS",
            DependencyType::StartToStart => "SS",
            DependencyType::FinishToFinish => "FF",
            DependencyType::StartToFinish => "SF",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DependencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fs" | "finish_to_start" => Ok(DependencyType::FinishToStart),
            "ss" | "start_to_start" => Ok(DependencyType::StartToStart),
            "ff" | "finish_to_finish" => Ok(DependencyType::FinishToFinish),
            "sf" | "start_to_finish" => Ok(DependencyType::StartToFinish),
            other => Err(format!(
                "invalid dependency type: {other} (expected FS, SS, FF or SF)"
            )),
        }
    }
}

/// Which side of a node to look at when listing neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Tasks this node points to (`self -> other`).
    Successors,
    /// Tasks pointing at this node (`other -> self`).
    Predecessors,
}
