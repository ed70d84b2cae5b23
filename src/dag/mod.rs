// src/dag/mod.rs

//! Task dependency graph.
//!
//! - [`store`] holds one project's tasks and dependency edges.
//! - [`validator`] decides whether a proposed edge keeps the graph acyclic,
//!   and reports the offending loop when it does not.

pub mod store;
pub mod validator;

pub use store::{Dependency, GraphStore, TaskNode};
pub use validator::{can_add_edge, would_create_cycle, EdgeCheck};
