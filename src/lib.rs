// src/lib.rs

//! Task dependency graph engine for PronaFlow projects.
//!
//! The engine keeps a project's task graph acyclic and derives its
//! critical-path schedule:
//! - [`dag`]: graph store and the cycle-preventing dependency validator.
//! - [`schedule`]: forward/backward pass, slack, critical path.
//! - [`engine`]: per-project gated operations, multi-project facade and the
//!   async single-writer actor.
//! - [`config`]: TOML project files for the command-line front end.

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod schedule;
pub mod types;

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_project;
use crate::config::ProjectFile;
use crate::dag::EdgeCheck;
use crate::engine::{spawn_project, ProjectGraph};
use crate::schedule::ScheduleSnapshot;
use crate::types::Direction;

pub use crate::dag::{Dependency, GraphStore, TaskNode};
pub use crate::engine::{GraphEngine, ProjectHandle};
pub use crate::errors::{ErrorKind, GraphError};
pub use crate::schedule::{ScheduleOptions, TaskSchedule};
pub use crate::types::{DependencyType, ProjectId, TaskId};

/// High-level entry point used by `main.rs`.
///
/// Loads the project file, builds the graph through the dependency
/// validator, hands it to a project actor and prints the result.
pub async fn run(args: CliArgs) -> Result<()> {
    let (project, graph) = load_project(&args.config)?;

    if args.dry_run {
        print_dry_run(&project, &graph);
        return Ok(());
    }

    let (handle, actor) = spawn_project(graph, project.actor_options());

    if let Some(edge) = args.check_edge.as_deref() {
        let [predecessor, successor] = edge else {
            bail!("--check-edge expects exactly two task ids");
        };
        match handle
            .check_dependency(predecessor.as_str(), successor.as_str())
            .await?
        {
            EdgeCheck::Allowed => println!("{predecessor} -> {successor}: allowed"),
            EdgeCheck::Rejected { cycle_path } => println!(
                "{predecessor} -> {successor}: would create a cycle: {}",
                cycle_path.join(" -> ")
            ),
        }
    } else {
        let snapshot = handle.recompute_schedule().await?;
        print_schedule(handle.project_id(), &snapshot);
    }

    drop(handle);
    let graph = actor.await?;
    info!(project = %graph.id(), "done");
    Ok(())
}

fn print_dry_run(project: &ProjectFile, graph: &ProjectGraph) {
    let store = graph.store();

    println!("pronaflow-graph dry-run");
    println!("  project.id = {}", project.project.id);
    println!("  project.start = {}", project.project.start);
    if let Some(deadline) = project.project.deadline {
        println!("  project.deadline = {deadline}");
    }
    if !project.project.non_working.is_empty() {
        println!("  project.non_working = {:?}", project.project.non_working);
    }
    println!();

    println!("tasks ({}):", store.node_count());
    for task in store.all_nodes() {
        match task.effective_duration() {
            Some(d) if task.is_milestone => println!("  - {} (milestone, duration {d})", task.id),
            Some(d) => println!("  - {} (duration {d})", task.id),
            None => println!("  - {} (no estimate)", task.id),
        }
        if let Some(start) = task.pinned_start {
            println!("      pinned_start: {start}");
        }
        if let Some(end) = task.pinned_end {
            println!("      pinned_end: {end}");
        }
        if let Ok(deps) = store.edges_of(&task.id, Direction::Predecessors) {
            for dep in deps {
                println!("      after: {} ({}, lag {})", dep.predecessor, dep.kind, dep.lag);
            }
        }
    }

    debug!("dry-run complete (no schedule computed)");
}

fn print_schedule(project: &str, snapshot: &ScheduleSnapshot) {
    println!("project {project}: makespan {}", snapshot.makespan());
    println!(
        "  start {}  finish {}  end anchor {}",
        snapshot.project_start(),
        snapshot.project_finish(),
        snapshot.project_end()
    );
    println!();
    println!(
        "  {:<16} {:>6} {:>6} {:>6} {:>6} {:>6}  critical",
        "task", "ES", "EF", "LS", "LF", "slack"
    );
    for id in snapshot.topological_order() {
        if let Some(s) = snapshot.task(id) {
            println!(
                "  {:<16} {:>6} {:>6} {:>6} {:>6} {:>6}  {}",
                id,
                s.earliest_start,
                s.earliest_finish,
                s.latest_start,
                s.latest_finish,
                s.slack,
                if s.is_critical { "yes" } else { "" }
            );
        }
    }
    println!();

    let chain: Vec<&str> = snapshot
        .critical_chain()
        .into_iter()
        .map(|id| id.as_str())
        .collect();
    println!("critical tasks: {}", chain.join(", "));
}
