// src/dag/store.rs

//! In-memory adjacency store for one project's task graph.
//!
//! The store is a pure data structure: it enforces referential integrity
//! (known endpoints, no duplicate nodes or edges, no dangling edges on node
//! removal) but does **not** check for cycles. Cycle prevention is the job
//! of [`crate::dag::validator`], which callers consult before `add_edge`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::GraphError;
use crate::types::{DependencyType, Direction, TaskId};

/// A schedulable unit of work as seen by the graph engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub id: TaskId,
    /// Duration estimate in abstract calendar units. `None` means
    /// "not estimated yet", which the scheduler rejects unless the task is
    /// a milestone.
    pub duration: Option<i64>,
    /// Fixed start; overrides the computed earliest start.
    pub pinned_start: Option<i64>,
    /// Fixed end; used to derive the start when no start is pinned.
    pub pinned_end: Option<i64>,
    /// Milestones always have zero duration.
    pub is_milestone: bool,
}

impl TaskNode {
    pub fn new(id: impl Into<TaskId>, duration: i64) -> Self {
        Self {
            id: id.into(),
            duration: Some(duration),
            pinned_start: None,
            pinned_end: None,
            is_milestone: false,
        }
    }

    pub fn milestone(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            duration: Some(0),
            pinned_start: None,
            pinned_end: None,
            is_milestone: true,
        }
    }

    /// A task with no duration estimate.
    pub fn unestimated(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            duration: None,
            pinned_start: None,
            pinned_end: None,
            is_milestone: false,
        }
    }

    pub fn with_pinned_start(mut self, start: i64) -> Self {
        self.pinned_start = Some(start);
        self
    }

    pub fn with_pinned_end(mut self, end: i64) -> Self {
        self.pinned_end = Some(end);
        self
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_start.is_some() || self.pinned_end.is_some()
    }

    /// Duration used by the scheduler: `0` for milestones, the estimate
    /// otherwise.
    pub fn effective_duration(&self) -> Option<i64> {
        if self.is_milestone {
            Some(0)
        } else {
            self.duration
        }
    }
}

/// A directed edge `predecessor -> successor`.
///
/// Identity is `(predecessor, successor, kind)`; `lag` is an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub predecessor: TaskId,
    pub successor: TaskId,
    pub kind: DependencyType,
    /// Signed offset: positive is a lag, negative a lead.
    pub lag: i64,
}

impl Dependency {
    pub fn finish_to_start(predecessor: impl Into<TaskId>, successor: impl Into<TaskId>) -> Self {
        Self {
            predecessor: predecessor.into(),
            successor: successor.into(),
            kind: DependencyType::FinishToStart,
            lag: 0,
        }
    }
}

type EdgeKey = (TaskId, DependencyType);

/// Internal node structure: the task plus both adjacency lists.
///
/// Each list maps `(neighbour, type)` to the edge's lag, so an edge is
/// recorded twice: once as a successor of its predecessor and once as a
/// predecessor of its successor.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeEntry {
    task: TaskNode,
    successors: BTreeMap<EdgeKey, i64>,
    predecessors: BTreeMap<EdgeKey, i64>,
}

impl NodeEntry {
    fn degree(&self) -> usize {
        self.successors.len() + self.predecessors.len()
    }
}

/// Authoritative adjacency structure over one project's tasks.
///
/// Nodes and neighbour lists are kept in `BTreeMap`s so every snapshot is
/// ordered by task id, which keeps algorithm output deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStore {
    nodes: BTreeMap<TaskId, NodeEntry>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task. Fails if the id already exists.
    pub fn add_node(&mut self, task: TaskNode) -> Result<(), GraphError> {
        if self.nodes.contains_key(&task.id) {
            return Err(GraphError::DuplicateNode(task.id));
        }

        debug!(task = %task.id, "graph store: adding node");
        self.nodes.insert(
            task.id.clone(),
            NodeEntry {
                task,
                successors: BTreeMap::new(),
                predecessors: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Remove a task that no longer has any edges.
    ///
    /// Callers cascade-delete edges first; the store re-checks and refuses
    /// to leave dangling edges behind.
    pub fn remove_node(&mut self, id: &str) -> Result<TaskNode, GraphError> {
        let entry = self
            .nodes
            .get(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;

        let edge_count = entry.degree();
        if edge_count > 0 {
            return Err(GraphError::NodeHasDependencies {
                task: id.to_string(),
                edge_count,
            });
        }

        debug!(task = %id, "graph store: removing node");
        let entry = self
            .nodes
            .remove(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
        Ok(entry.task)
    }

    /// Insert an edge without any cycle check.
    pub fn add_edge(
        &mut self,
        predecessor: &str,
        successor: &str,
        kind: DependencyType,
        lag: i64,
    ) -> Result<(), GraphError> {
        self.ensure_node(predecessor)?;
        self.ensure_node(successor)?;

        if self.contains_edge(predecessor, successor, kind) {
            return Err(GraphError::DuplicateEdge {
                predecessor: predecessor.to_string(),
                successor: successor.to_string(),
                kind,
            });
        }

        debug!(
            predecessor = %predecessor,
            successor = %successor,
            kind = %kind,
            lag,
            "graph store: adding edge"
        );

        if let Some(entry) = self.nodes.get_mut(predecessor) {
            entry.successors.insert((successor.to_string(), kind), lag);
        }
        if let Some(entry) = self.nodes.get_mut(successor) {
            entry.predecessors.insert((predecessor.to_string(), kind), lag);
        }
        Ok(())
    }

    /// Remove an edge and return it.
    pub fn remove_edge(
        &mut self,
        predecessor: &str,
        successor: &str,
        kind: DependencyType,
    ) -> Result<Dependency, GraphError> {
        let not_found = || GraphError::EdgeNotFound {
            predecessor: predecessor.to_string(),
            successor: successor.to_string(),
            kind,
        };

        let key = (successor.to_string(), kind);
        let lag = self
            .nodes
            .get_mut(predecessor)
            .and_then(|entry| entry.successors.remove(&key))
            .ok_or_else(not_found)?;

        if let Some(entry) = self.nodes.get_mut(successor) {
            entry.predecessors.remove(&(predecessor.to_string(), kind));
        }

        debug!(
            predecessor = %predecessor,
            successor = %successor,
            kind = %kind,
            "graph store: removed edge"
        );

        Ok(Dependency {
            predecessor: predecessor.to_string(),
            successor: successor.to_string(),
            kind,
            lag,
        })
    }

    /// Adjacent task ids in the given direction, ordered by id and without
    /// repeats (two edges of different types to the same neighbour yield one
    /// id). Each call returns a fresh snapshot.
    pub fn neighbors(&self, id: &str, direction: Direction) -> Result<Vec<TaskId>, GraphError> {
        let entry = self
            .nodes
            .get(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;

        let list = match direction {
            Direction::Successors => &entry.successors,
            Direction::Predecessors => &entry.predecessors,
        };

        let mut ids: Vec<TaskId> = list.keys().map(|(other, _)| other.clone()).collect();
        ids.dedup();
        Ok(ids)
    }

    /// Full edge records touching `id` in the given direction.
    pub fn edges_of(&self, id: &str, direction: Direction) -> Result<Vec<Dependency>, GraphError> {
        let entry = self
            .nodes
            .get(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;

        let edges = match direction {
            Direction::Successors => entry
                .successors
                .iter()
                .map(|((succ, kind), lag)| Dependency {
                    predecessor: id.to_string(),
                    successor: succ.clone(),
                    kind: *kind,
                    lag: *lag,
                })
                .collect(),
            Direction::Predecessors => entry
                .predecessors
                .iter()
                .map(|((pred, kind), lag)| Dependency {
                    predecessor: pred.clone(),
                    successor: id.to_string(),
                    kind: *kind,
                    lag: *lag,
                })
                .collect(),
        };
        Ok(edges)
    }

    /// Snapshot of every task, ordered by id.
    pub fn all_nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.values().map(|entry| &entry.task)
    }

    /// Snapshot of every edge, ordered by `(predecessor, successor, type)`.
    pub fn all_edges(&self) -> Vec<Dependency> {
        self.nodes
            .iter()
            .flat_map(|(pred, entry)| {
                entry.successors.iter().map(move |((succ, kind), lag)| Dependency {
                    predecessor: pred.clone(),
                    successor: succ.clone(),
                    kind: *kind,
                    lag: *lag,
                })
            })
            .collect()
    }

    pub fn node(&self, id: &str) -> Option<&TaskNode> {
        self.nodes.get(id).map(|entry| &entry.task)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_edge(&self, predecessor: &str, successor: &str, kind: DependencyType) -> bool {
        self.nodes
            .get(predecessor)
            .is_some_and(|entry| entry.successors.contains_key(&(successor.to_string(), kind)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|entry| entry.successors.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrowing iterator over successor ids, for traversals that must not
    /// allocate a snapshot per step. May repeat an id once per edge type.
    pub(crate) fn successor_ids<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(|entry| entry.successors.keys().map(|(succ, _)| succ.as_str()))
    }

    fn ensure_node(&self, id: &str) -> Result<(), GraphError> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id.to_string()))
        }
    }
}
