// src/errors.rs

//! Crate-wide error types.
//!
//! [`GraphError`] is the engine's own taxonomy: every failure of the graph
//! store, the dependency validator and the schedule calculator is one of
//! its variants. [`PronaflowError`] wraps it together with the IO/config
//! failures that only the project-file loader and CLI can hit.

use thiserror::Error;

use crate::types::{DependencyType, ProjectId, TaskId};

/// Coarse classification of a [`GraphError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referential contract of the graph store was violated. Caller-fixable.
    Structural,
    /// The validator refused an edge because it would close a loop.
    Cycle,
    /// The acyclic invariant was bypassed; a severe integrity fault.
    Integrity,
    /// Task data is unusable for scheduling.
    InvalidInput,
    /// The project actor is gone.
    Unavailable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("task '{0}' does not exist")]
    UnknownNode(TaskId),

    #[error("task '{0}' already exists in this project")]
    DuplicateNode(TaskId),

    #[error("dependency {predecessor} -> {successor} ({kind}) already exists")]
    DuplicateEdge {
        predecessor: TaskId,
        successor: TaskId,
        kind: DependencyType,
    },

    #[error("dependency {predecessor} -> {successor} ({kind}) does not exist")]
    EdgeNotFound {
        predecessor: TaskId,
        successor: TaskId,
        kind: DependencyType,
    },

    #[error("task '{task}' still has {edge_count} dependencies; remove them first")]
    NodeHasDependencies { task: TaskId, edge_count: usize },

    #[error("would create a cycle: {}", cycle_path.join(" -> "))]
    CycleDetected { cycle_path: Vec<TaskId> },

    #[error("task graph is not acyclic (cycle through task '{task}')")]
    GraphNotAcyclic { task: TaskId },

    #[error("invalid data for task '{task}': {reason}")]
    InvalidTaskData { task: TaskId, reason: String },

    #[error("project '{0}' does not exist")]
    UnknownProject(ProjectId),

    #[error("project '{0}' already exists")]
    DuplicateProject(ProjectId),

    #[error("actor for project '{0}' has shut down")]
    ActorClosed(ProjectId),
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::UnknownNode(_)
            | GraphError::DuplicateNode(_)
            | GraphError::DuplicateEdge { .. }
            | GraphError::EdgeNotFound { .. }
            | GraphError::NodeHasDependencies { .. }
            | GraphError::UnknownProject(_)
            | GraphError::DuplicateProject(_) => ErrorKind::Structural,
            GraphError::CycleDetected { .. } => ErrorKind::Cycle,
            GraphError::GraphNotAcyclic { .. } => ErrorKind::Integrity,
            GraphError::InvalidTaskData { .. } => ErrorKind::InvalidInput,
            GraphError::ActorClosed(_) => ErrorKind::Unavailable,
        }
    }

    /// The offending loop, if this is a rejected edge.
    pub fn cycle_path(&self) -> Option<&[TaskId]> {
        match self {
            GraphError::CycleDetected { cycle_path } => Some(cycle_path),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum PronaflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PronaflowError>;
