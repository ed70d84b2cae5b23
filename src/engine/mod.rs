// src/engine/mod.rs

//! Task graph engine: the operations external collaborators call.
//!
//! - [`project`] bundles one project's graph store, schedule options,
//!   calendar and last published schedule, and implements the gated
//!   mutation sequence.
//! - [`core`] is the synchronous multi-project facade.
//! - [`runtime`] is the async single-writer actor for a project.
//!
//! Concurrency contract: mutations of one project must be serialized with
//! respect to each other and to the recompute they drive. `core` relies on
//! the caller for that; `runtime` provides it by construction. Published
//! schedules are immutable `Arc`s and may be read concurrently.

pub mod core;
pub mod project;
pub mod runtime;

pub use core::GraphEngine;
pub use project::ProjectGraph;
pub use runtime::{spawn_project, ActorOptions, ProjectHandle};
