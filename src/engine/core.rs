// src/engine/core.rs

//! Synchronous multi-project facade.
//!
//! `GraphEngine` owns independent [`ProjectGraph`]s keyed by project id and
//! exposes the engine's external operations with an explicit `project_id`
//! argument. It performs no locking of its own: `&mut self` on every
//! mutation means the owner must already hold whatever exclusion scope
//! serializes mutations (a lock, a transaction, or the per-project actor in
//! [`crate::engine::runtime`]).

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::dag::validator::EdgeCheck;
use crate::dag::{Dependency, TaskNode};
use crate::engine::project::ProjectGraph;
use crate::errors::GraphError;
use crate::schedule::ScheduleSnapshot;
use crate::types::{DependencyType, ProjectId};

#[derive(Debug, Default)]
pub struct GraphEngine {
    projects: HashMap<ProjectId, ProjectGraph>,
}

impl GraphEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty project graph with default options.
    pub fn create_project(&mut self, id: &str) -> Result<&mut ProjectGraph, GraphError> {
        self.insert_project(ProjectGraph::new(id))?;
        self.project_mut(id)
    }

    /// Register a fully configured project graph.
    pub fn insert_project(&mut self, project: ProjectGraph) -> Result<(), GraphError> {
        if self.projects.contains_key(project.id()) {
            return Err(GraphError::DuplicateProject(project.id().to_string()));
        }
        debug!(project = %project.id(), "engine: registering project");
        self.projects.insert(project.id().to_string(), project);
        Ok(())
    }

    /// Remove a project and hand its graph back to the caller.
    pub fn drop_project(&mut self, id: &str) -> Result<ProjectGraph, GraphError> {
        self.projects
            .remove(id)
            .ok_or_else(|| GraphError::UnknownProject(id.to_string()))
    }

    pub fn project(&self, id: &str) -> Result<&ProjectGraph, GraphError> {
        self.projects
            .get(id)
            .ok_or_else(|| GraphError::UnknownProject(id.to_string()))
    }

    pub fn project_mut(&mut self, id: &str) -> Result<&mut ProjectGraph, GraphError> {
        self.projects
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownProject(id.to_string()))
    }

    pub fn project_ids(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(|s| s.as_str())
    }

    pub fn add_task(&mut self, project_id: &str, task: TaskNode) -> Result<(), GraphError> {
        self.project_mut(project_id)?.add_task(task)
    }

    pub fn remove_task(&mut self, project_id: &str, task_id: &str) -> Result<TaskNode, GraphError> {
        self.project_mut(project_id)?.remove_task(task_id)
    }

    pub fn remove_task_cascade(
        &mut self,
        project_id: &str,
        task_id: &str,
    ) -> Result<Vec<Dependency>, GraphError> {
        self.project_mut(project_id)?.remove_task_cascade(task_id)
    }

    pub fn add_dependency(
        &mut self,
        project_id: &str,
        predecessor: &str,
        successor: &str,
        kind: DependencyType,
        lag: i64,
    ) -> Result<(), GraphError> {
        self.project_mut(project_id)?
            .add_dependency(predecessor, successor, kind, lag)
    }

    pub fn remove_dependency(
        &mut self,
        project_id: &str,
        predecessor: &str,
        successor: &str,
        kind: DependencyType,
    ) -> Result<(), GraphError> {
        self.project_mut(project_id)?
            .remove_dependency(predecessor, successor, kind)
    }

    pub fn recompute_schedule(&mut self, project_id: &str) -> Result<Arc<ScheduleSnapshot>, GraphError> {
        self.project_mut(project_id)?.recompute_schedule()
    }

    /// Read-only cycle pre-check. Fails for an unknown project or task.
    pub fn would_create_cycle(
        &self,
        project_id: &str,
        predecessor: &str,
        successor: &str,
    ) -> Result<bool, GraphError> {
        self.project(project_id)?
            .would_create_cycle(predecessor, successor)
    }

    pub fn check_dependency(
        &self,
        project_id: &str,
        predecessor: &str,
        successor: &str,
    ) -> Result<EdgeCheck, GraphError> {
        self.project(project_id)?
            .check_dependency(predecessor, successor)
    }

    /// Last published schedule for a project.
    pub fn schedule(&self, project_id: &str) -> Result<Option<Arc<ScheduleSnapshot>>, GraphError> {
        Ok(self.project(project_id)?.schedule())
    }
}
