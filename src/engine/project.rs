// src/engine/project.rs

//! One project's graph plus its last published schedule.
//!
//! Every mutation goes through the sequence
//! "check feasibility -> mutate store", and `recompute_schedule` swaps in a
//! whole new snapshot or nothing. `ProjectGraph` takes `&mut self` for
//! mutations; whoever owns it (the caller's lock, or the actor in
//! [`crate::engine::runtime`]) provides the mutual exclusion that keeps two
//! edge insertions from passing the cycle check against the same stale
//! graph.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dag::validator::{self, EdgeCheck};
use crate::dag::{Dependency, GraphStore, TaskNode};
use crate::errors::GraphError;
use crate::schedule::{compute_schedule, Calendar, ContinuousCalendar, ScheduleOptions, ScheduleSnapshot};
use crate::types::{DependencyType, Direction, ProjectId};

pub struct ProjectGraph {
    id: ProjectId,
    store: GraphStore,
    options: ScheduleOptions,
    calendar: Arc<dyn Calendar>,
    schedule: Option<Arc<ScheduleSnapshot>>,
    /// Set by every successful mutation, cleared by a successful recompute.
    stale: bool,
}

impl fmt::Debug for ProjectGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectGraph")
            .field("id", &self.id)
            .field("nodes", &self.store.node_count())
            .field("edges", &self.store.edge_count())
            .field("options", &self.options)
            .field("calendar", &self.calendar)
            .field("stale", &self.stale)
            .finish_non_exhaustive()
    }
}

impl ProjectGraph {
    pub fn new(id: impl Into<ProjectId>) -> Self {
        Self {
            id: id.into(),
            store: GraphStore::new(),
            options: ScheduleOptions::default(),
            calendar: Arc::new(ContinuousCalendar),
            schedule: None,
            stale: false,
        }
    }

    /// Adopt a store loaded from elsewhere (e.g. persisted rows).
    ///
    /// The edges are taken as-is, without passing the cycle check; a
    /// corrupted import surfaces as `GraphNotAcyclic` on recompute.
    pub fn from_store(id: impl Into<ProjectId>, store: GraphStore) -> Self {
        Self {
            store,
            stale: true,
            ..Self::new(id)
        }
    }

    pub fn with_options(mut self, options: ScheduleOptions) -> Self {
        self.options = options;
        self.stale = true;
        self
    }

    pub fn with_calendar(mut self, calendar: Arc<dyn Calendar>) -> Self {
        self.calendar = calendar;
        self.stale = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }

    /// Last successfully published schedule, if any.
    pub fn schedule(&self) -> Option<Arc<ScheduleSnapshot>> {
        self.schedule.clone()
    }

    /// Whether the graph changed since the last published schedule.
    pub fn is_schedule_stale(&self) -> bool {
        self.stale || self.schedule.is_none()
    }

    pub fn add_task(&mut self, task: TaskNode) -> Result<(), GraphError> {
        self.store.add_node(task)?;
        self.stale = true;
        Ok(())
    }

    /// Remove a task that has no remaining dependencies.
    pub fn remove_task(&mut self, id: &str) -> Result<TaskNode, GraphError> {
        let task = self.store.remove_node(id)?;
        self.stale = true;
        Ok(task)
    }

    /// Remove every edge touching `id`, then the task itself. Returns the
    /// removed edges so the caller can mirror the cascade in storage.
    pub fn remove_task_cascade(&mut self, id: &str) -> Result<Vec<Dependency>, GraphError> {
        let mut edges = self.store.edges_of(id, Direction::Predecessors)?;
        edges.extend(self.store.edges_of(id, Direction::Successors)?);

        for edge in &edges {
            self.store
                .remove_edge(&edge.predecessor, &edge.successor, edge.kind)?;
        }
        self.store.remove_node(id)?;
        self.stale = true;

        debug!(project = %self.id, task = %id, edges = edges.len(), "task removed with cascade");
        Ok(edges)
    }

    /// Validator-gated edge insertion.
    ///
    /// Checks run in a fixed order so each failure has exactly one reason:
    /// unknown endpoint, then duplicate edge, then cycle.
    pub fn add_dependency(
        &mut self,
        predecessor: &str,
        successor: &str,
        kind: DependencyType,
        lag: i64,
    ) -> Result<(), GraphError> {
        self.ensure_endpoints(predecessor, successor)?;

        if self.store.contains_edge(predecessor, successor, kind) {
            return Err(GraphError::DuplicateEdge {
                predecessor: predecessor.to_string(),
                successor: successor.to_string(),
                kind,
            });
        }

        if let EdgeCheck::Rejected { cycle_path } =
            validator::can_add_edge(&self.store, predecessor, successor)
        {
            warn!(
                project = %self.id,
                predecessor = %predecessor,
                successor = %successor,
                cycle = %cycle_path.join(" -> "),
                "dependency rejected: would create a cycle"
            );
            return Err(GraphError::CycleDetected { cycle_path });
        }

        self.store.add_edge(predecessor, successor, kind, lag)?;
        self.stale = true;
        Ok(())
    }

    pub fn remove_dependency(
        &mut self,
        predecessor: &str,
        successor: &str,
        kind: DependencyType,
    ) -> Result<(), GraphError> {
        self.store.remove_edge(predecessor, successor, kind)?;
        self.stale = true;
        Ok(())
    }

    /// Read-only pre-check for a UI, distinct from [`Self::add_dependency`].
    ///
    /// Unknown endpoints fail with `UnknownNode`, as the real insert would.
    pub fn would_create_cycle(
        &self,
        predecessor: &str,
        successor: &str,
    ) -> Result<bool, GraphError> {
        Ok(!self.check_dependency(predecessor, successor)?.is_allowed())
    }

    pub fn check_dependency(
        &self,
        predecessor: &str,
        successor: &str,
    ) -> Result<EdgeCheck, GraphError> {
        self.ensure_endpoints(predecessor, successor)?;
        Ok(validator::can_add_edge(&self.store, predecessor, successor))
    }

    fn ensure_endpoints(&self, predecessor: &str, successor: &str) -> Result<(), GraphError> {
        for id in [predecessor, successor] {
            if !self.store.contains_node(id) {
                return Err(GraphError::UnknownNode(id.to_string()));
            }
        }
        Ok(())
    }

    /// Recompute and publish the schedule.
    ///
    /// On failure the previously published snapshot (if any) stays in place.
    pub fn recompute_schedule(&mut self) -> Result<Arc<ScheduleSnapshot>, GraphError> {
        let snapshot = Arc::new(compute_schedule(
            &self.store,
            &self.options,
            self.calendar.as_ref(),
        )?);

        info!(
            project = %self.id,
            tasks = snapshot.len(),
            makespan = snapshot.makespan(),
            critical = snapshot.critical_tasks().len(),
            "schedule published"
        );

        self.schedule = Some(Arc::clone(&snapshot));
        self.stale = false;
        Ok(snapshot)
    }
}
