// src/schedule/snapshot.rs

//! Immutable result of one schedule computation.

use std::collections::{BTreeMap, BTreeSet};

use crate::dag::Dependency;
use crate::types::TaskId;

/// Computed timing for a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSchedule {
    pub earliest_start: i64,
    pub earliest_finish: i64,
    pub latest_start: i64,
    pub latest_finish: i64,
    /// `latest_start - earliest_start`. Negative when a deadline or pinned
    /// date cannot be met.
    pub slack: i64,
    pub is_critical: bool,
}

/// Consistent schedule for every task in a project.
///
/// A snapshot is only ever built whole; the engine publishes it behind an
/// `Arc` so readers never observe a half-updated schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSnapshot {
    pub(crate) project_start: i64,
    pub(crate) project_finish: i64,
    pub(crate) project_end: i64,
    pub(crate) tasks: BTreeMap<TaskId, TaskSchedule>,
    pub(crate) order: Vec<TaskId>,
    pub(crate) critical_tasks: BTreeSet<TaskId>,
    pub(crate) critical_edges: Vec<Dependency>,
}

impl ScheduleSnapshot {
    pub fn task(&self, id: &str) -> Option<&TaskSchedule> {
        self.tasks.get(id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = (&TaskId, &TaskSchedule)> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_critical(&self, id: &str) -> bool {
        self.critical_tasks.contains(id)
    }

    /// Every critical task (slack `<= 0`). Equal-length critical chains are
    /// all included.
    ///
    /// Slack is measured against the project-end anchor. Without a deadline
    /// the longest chain always has zero slack, so this set is never empty
    /// for a non-empty graph. A deadline later than the computed finish
    /// gives every task positive slack and leaves the set empty.
    pub fn critical_tasks(&self) -> &BTreeSet<TaskId> {
        &self.critical_tasks
    }

    /// Edges whose constraint is tight and whose endpoints are both critical.
    pub fn critical_edges(&self) -> &[Dependency] {
        &self.critical_edges
    }

    /// Critical tasks in topological order. Empty under a deadline with
    /// room to spare; see [`Self::critical_tasks`].
    pub fn critical_chain(&self) -> Vec<&TaskId> {
        self.order
            .iter()
            .filter(|id| self.critical_tasks.contains(*id))
            .collect()
    }

    /// Topological order the passes ran in.
    pub fn topological_order(&self) -> &[TaskId] {
        &self.order
    }

    pub fn project_start(&self) -> i64 {
        self.project_start
    }

    /// Latest earliest-finish across all tasks.
    pub fn project_finish(&self) -> i64 {
        self.project_finish
    }

    /// Anchor used for the backward pass: the deadline if one was set,
    /// otherwise [`Self::project_finish`].
    pub fn project_end(&self) -> i64 {
        self.project_end
    }

    /// Total computed duration of the project.
    pub fn makespan(&self) -> i64 {
        self.project_finish - self.project_start
    }
}
