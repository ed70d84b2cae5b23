// src/dag/validator.rs

//! Cycle gate for new edges.
//!
//! Adding `predecessor -> successor` closes a loop exactly when
//! `predecessor` is already reachable from `successor`. We answer that with
//! a single depth-first walk from `successor` over successor edges, keeping
//! a parent map so a rejection can report the actual loop.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::dag::store::GraphStore;
use crate::errors::GraphError;
use crate::types::TaskId;

/// Outcome of [`can_add_edge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeCheck {
    Allowed,
    /// The edge would close a loop. `cycle_path` starts and ends with the
    /// same task, e.g. `[A, B, C, A]`.
    Rejected { cycle_path: Vec<TaskId> },
}

impl EdgeCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, EdgeCheck::Allowed)
    }

    /// Convert into `Ok(())` or [`GraphError::CycleDetected`].
    pub fn into_result(self) -> Result<(), GraphError> {
        match self {
            EdgeCheck::Allowed => Ok(()),
            EdgeCheck::Rejected { cycle_path } => Err(GraphError::CycleDetected { cycle_path }),
        }
    }
}

/// Decide whether `predecessor -> successor` keeps the graph acyclic.
///
/// Self-loops are always rejected. Unknown endpoints are not this
/// function's concern: an unknown node has no edges and therefore cannot
/// close a loop.
pub fn can_add_edge(store: &GraphStore, predecessor: &str, successor: &str) -> EdgeCheck {
    if predecessor == successor {
        return EdgeCheck::Rejected {
            cycle_path: vec![predecessor.to_string(), successor.to_string()],
        };
    }

    match find_path(store, successor, predecessor) {
        Some(mut path) => {
            // path is successor -> ... -> predecessor; the new edge closes it.
            path.push(successor.to_string());
            EdgeCheck::Rejected { cycle_path: path }
        }
        None => EdgeCheck::Allowed,
    }
}

/// Read-only pre-check: would adding `predecessor -> successor` create a
/// cycle?
pub fn would_create_cycle(store: &GraphStore, predecessor: &str, successor: &str) -> bool {
    !can_add_edge(store, predecessor, successor).is_allowed()
}

/// Depth-first search for a path `from -> ... -> to` along successor edges.
fn find_path(store: &GraphStore, from: &str, to: &str) -> Option<Vec<TaskId>> {
    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![from];
    visited.insert(from);

    while let Some(current) = stack.pop() {
        if current == to {
            let mut path = vec![current.to_string()];
            let mut cursor = current;
            while let Some(&prev) = parent.get(cursor) {
                path.push(prev.to_string());
                cursor = prev;
            }
            path.reverse();
            return Some(path);
        }

        for next in store.successor_ids(current) {
            if visited.insert(next) {
                parent.insert(next, current);
                stack.push(next);
            }
        }
    }

    trace!(from = %from, to = %to, visited = visited.len(), "no path found");
    None
}
