// src/config/model.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::dag::TaskNode;
use crate::engine::{ActorOptions, ProjectGraph};
use crate::errors::GraphError;
use crate::schedule::{ExceptionCalendar, ScheduleOptions};
use crate::types::DependencyType;

/// Project file as read from TOML, before validation.
///
/// ```toml
/// [project]
/// id = "launch"
/// start = 0
/// deadline = 30
/// non_working = [5, 6]
///
/// [engine]
/// recompute_on_change = true
///
/// [task.A]
/// duration = 3
///
/// [task.B]
/// duration = 2
/// after = ["A"]
///
/// [[dependency]]
/// predecessor = "A"
/// successor = "B"
/// type = "SS"
/// lag = 1
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawProjectFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub engine: EngineSection,

    /// All tasks from `[task.<id>]`, keyed by task id.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,

    /// Explicit `[[dependency]]` entries.
    #[serde(default)]
    pub dependency: Vec<DependencyConfig>,
}

/// Validated project file. Build through `ProjectFile::try_from(raw)` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub project: ProjectSection,
    pub engine: EngineSection,
    pub task: BTreeMap<String, TaskConfig>,
    pub dependency: Vec<DependencyConfig>,
}

/// `[project]` section: scheduling anchors and calendar exceptions.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    #[serde(default = "default_project_id")]
    pub id: String,

    /// Project start anchor in calendar units.
    #[serde(default)]
    pub start: i64,

    /// Optional project-end anchor for the backward pass.
    #[serde(default)]
    pub deadline: Option<i64>,

    /// Non-working calendar units (holidays, shutdowns).
    #[serde(default)]
    pub non_working: Vec<i64>,
}

fn default_project_id() -> String {
    "default".to_string()
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            id: default_project_id(),
            start: 0,
            deadline: None,
            non_working: Vec::new(),
        }
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_recompute_on_change")]
    pub recompute_on_change: bool,

    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_recompute_on_change() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            recompute_on_change: default_recompute_on_change(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// `[task.<id>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Duration estimate. Required unless `milestone = true`.
    #[serde(default)]
    pub duration: Option<i64>,

    #[serde(default)]
    pub milestone: bool,

    #[serde(default)]
    pub pinned_start: Option<i64>,

    #[serde(default)]
    pub pinned_end: Option<i64>,

    /// Shorthand for Finish-to-Start dependencies with zero lag.
    #[serde(default)]
    pub after: Vec<String>,
}

/// `[[dependency]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependencyConfig {
    pub predecessor: String,
    pub successor: String,

    #[serde(default, rename = "type")]
    pub kind: DependencyType,

    #[serde(default)]
    pub lag: i64,
}

impl ProjectFile {
    /// Used by validation once all invariants have been checked.
    pub(crate) fn new_unchecked(raw: RawProjectFile) -> Self {
        Self {
            project: raw.project,
            engine: raw.engine,
            task: raw.task,
            dependency: raw.dependency,
        }
    }

    /// Every dependency in the file: `after` shorthands first (in task id
    /// order), then explicit `[[dependency]]` entries in file order.
    pub fn dependencies(&self) -> Vec<DependencyConfig> {
        let mut deps: Vec<DependencyConfig> = self
            .task
            .iter()
            .flat_map(|(name, task)| {
                task.after.iter().map(move |pred| DependencyConfig {
                    predecessor: pred.clone(),
                    successor: name.clone(),
                    kind: DependencyType::FinishToStart,
                    lag: 0,
                })
            })
            .collect();
        deps.extend(self.dependency.iter().cloned());
        deps
    }

    pub fn schedule_options(&self) -> ScheduleOptions {
        ScheduleOptions {
            project_start: self.project.start,
            deadline: self.project.deadline,
        }
    }

    pub fn actor_options(&self) -> ActorOptions {
        ActorOptions {
            recompute_on_change: self.engine.recompute_on_change,
            channel_capacity: self.engine.channel_capacity,
        }
    }

    /// Build the project graph, sending every edge through the cycle gate.
    pub fn build_graph(&self) -> Result<ProjectGraph, GraphError> {
        let mut graph = ProjectGraph::new(self.project.id.clone())
            .with_options(self.schedule_options());

        if !self.project.non_working.is_empty() {
            graph = graph.with_calendar(Arc::new(ExceptionCalendar::new(
                self.project.non_working.iter().copied(),
            )));
        }

        for (name, task) in &self.task {
            graph.add_task(task.to_node(name))?;
        }
        for dep in self.dependencies() {
            graph.add_dependency(&dep.predecessor, &dep.successor, dep.kind, dep.lag)?;
        }

        Ok(graph)
    }
}

impl TaskConfig {
    pub fn to_node(&self, id: &str) -> TaskNode {
        TaskNode {
            id: id.to_string(),
            duration: if self.milestone {
                Some(self.duration.unwrap_or(0))
            } else {
                self.duration
            },
            pinned_start: self.pinned_start,
            pinned_end: self.pinned_end,
            is_milestone: self.milestone,
        }
    }
}
