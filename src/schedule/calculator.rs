// src/schedule/calculator.rs

//! Critical path method over a validated task graph.
//!
//! One computation runs through these stages, each feeding the next:
//!
//! 1. `Pending`: task data is checked (durations present and
//!    non-negative, pinned dates consistent).
//! 2. `TopologicallySorted`: a full topological order is derived; a cycle
//!    here means the validator gate was bypassed.
//! 3. `ForwardPassComplete`: earliest start/finish in topological order.
//! 4. `BackwardPassComplete`: latest start/finish in reverse order.
//! 5. `SlackComputed`: slack, criticality and critical edges.
//!
//! Nothing is published unless every stage succeeds; the result is a
//! fresh [`ScheduleSnapshot`] value.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, error, trace};

use crate::dag::{Dependency, GraphStore};
use crate::errors::GraphError;
use crate::schedule::calendar::Calendar;
use crate::schedule::snapshot::{ScheduleSnapshot, TaskSchedule};
use crate::types::{DependencyType, TaskId};

/// Project-level anchors for a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleOptions {
    /// No task starts before this boundary unless it is pinned earlier.
    pub project_start: i64,
    /// Project-end anchor for the backward pass. When `None` the computed
    /// project finish is used, so the longest chain has zero slack.
    pub deadline: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Pending,
    TopologicallySorted,
    ForwardPassComplete,
    BackwardPassComplete,
    SlackComputed,
}

/// Validated per-task input.
#[derive(Debug, Clone, Copy)]
struct Prepared {
    duration: i64,
    fixed_start: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start: i64,
    finish: i64,
}

/// Run a full forward/backward pass over `store`.
pub fn compute_schedule(
    store: &GraphStore,
    options: &ScheduleOptions,
    calendar: &dyn Calendar,
) -> Result<ScheduleSnapshot, GraphError> {
    trace!(stage = ?Stage::Pending, nodes = store.node_count(), "schedule run");
    let prepared = prepare_tasks(store, calendar)?;

    let edges = store.all_edges();
    let order = topological_order(store, &edges)?;
    trace!(stage = ?Stage::TopologicallySorted, "schedule run");

    let mut incoming: HashMap<&str, Vec<&Dependency>> = HashMap::new();
    let mut outgoing: HashMap<&str, Vec<&Dependency>> = HashMap::new();
    for edge in &edges {
        incoming.entry(edge.successor.as_str()).or_default().push(edge);
        outgoing.entry(edge.predecessor.as_str()).or_default().push(edge);
    }

    // Forward pass.
    let mut early: HashMap<&str, Window> = HashMap::with_capacity(order.len());
    for id in &order {
        let task = prepared[id.as_str()];
        let overflow = || out_of_range(id);
        let mut start = options.project_start;
        for dep in incoming.get(id.as_str()).into_iter().flatten() {
            let pred = early[dep.predecessor.as_str()];
            let bound = forward_bound(dep, pred, task.duration, calendar).ok_or_else(overflow)?;
            start = start.max(bound);
        }
        start = match task.fixed_start {
            Some(fixed) => fixed,
            None if task.duration > 0 => calendar.align_start(start).ok_or_else(overflow)?,
            None => start,
        };
        let finish = calendar
            .finish_from(start, task.duration)
            .ok_or_else(overflow)?;
        early.insert(id.as_str(), Window { start, finish });
    }
    trace!(stage = ?Stage::ForwardPassComplete, "schedule run");

    let project_finish = early
        .values()
        .map(|w| w.finish)
        .fold(options.project_start, i64::max);
    if project_finish.checked_sub(options.project_start).is_none() {
        let last = early
            .iter()
            .max_by_key(|(_, w)| w.finish)
            .map(|(id, _)| *id)
            .unwrap_or_default();
        return Err(out_of_range(last));
    }
    let project_end = options.deadline.unwrap_or(project_finish);

    // Backward pass.
    let mut late: HashMap<&str, Window> = HashMap::with_capacity(order.len());
    for id in order.iter().rev() {
        let task = prepared[id.as_str()];
        let overflow = || out_of_range(id);
        let mut finish = project_end;
        for dep in outgoing.get(id.as_str()).into_iter().flatten() {
            let succ = late[dep.successor.as_str()];
            let bound = backward_bound(dep, succ, task.duration, calendar).ok_or_else(overflow)?;
            finish = finish.min(bound);
        }
        if task.duration > 0 {
            finish = calendar.align_finish(finish).ok_or_else(overflow)?;
        }
        let start = calendar
            .start_from(finish, task.duration)
            .ok_or_else(overflow)?;
        late.insert(id.as_str(), Window { start, finish });
    }
    trace!(stage = ?Stage::BackwardPassComplete, "schedule run");

    let mut tasks = BTreeMap::new();
    let mut critical_tasks = BTreeSet::new();
    for id in &order {
        let e = early[id.as_str()];
        let l = late[id.as_str()];
        let slack = l.start.checked_sub(e.start).ok_or_else(|| out_of_range(id))?;
        let is_critical = slack <= 0;
        if is_critical {
            critical_tasks.insert(id.clone());
        }
        tasks.insert(
            id.clone(),
            TaskSchedule {
                earliest_start: e.start,
                earliest_finish: e.finish,
                latest_start: l.start,
                latest_finish: l.finish,
                slack,
                is_critical,
            },
        );
    }

    let critical_edges: Vec<Dependency> = edges
        .iter()
        .filter(|dep| {
            critical_tasks.contains(&dep.predecessor) && critical_tasks.contains(&dep.successor)
        })
        .filter(|dep| {
            let succ = prepared[dep.successor.as_str()];
            let bound = forward_bound(dep, early[dep.predecessor.as_str()], succ.duration, calendar)
                .and_then(|bound| {
                    if succ.fixed_start.is_none() && succ.duration > 0 {
                        calendar.align_start(bound)
                    } else {
                        Some(bound)
                    }
                });
            bound == Some(early[dep.successor.as_str()].start)
        })
        .cloned()
        .collect();
    trace!(stage = ?Stage::SlackComputed, "schedule run");

    debug!(
        tasks = tasks.len(),
        critical = critical_tasks.len(),
        project_finish,
        project_end,
        "schedule computed"
    );

    Ok(ScheduleSnapshot {
        project_start: options.project_start,
        project_finish,
        project_end,
        tasks,
        order,
        critical_tasks,
        critical_edges,
    })
}

/// Reject unusable task data before any pass runs.
fn prepare_tasks<'a>(
    store: &'a GraphStore,
    calendar: &dyn Calendar,
) -> Result<HashMap<&'a str, Prepared>, GraphError> {
    let mut prepared = HashMap::with_capacity(store.node_count());

    for task in store.all_nodes() {
        let invalid = |reason: &str| GraphError::InvalidTaskData {
            task: task.id.clone(),
            reason: reason.to_string(),
        };

        let duration = task
            .effective_duration()
            .ok_or_else(|| invalid("missing duration on a non-milestone task"))?;
        if duration < 0 {
            return Err(invalid(&format!("negative duration {duration}")));
        }

        let fixed_start = match (task.pinned_start, task.pinned_end) {
            (Some(start), Some(end)) => {
                let expected = calendar.finish_from(start, duration);
                if expected != Some(end) {
                    return Err(invalid(&format!(
                        "pinned dates {start}..{end} do not match duration {duration}"
                    )));
                }
                Some(start)
            }
            (Some(start), None) => Some(start),
            (None, Some(end)) => Some(
                calendar
                    .start_from(end, duration)
                    .ok_or_else(|| out_of_range(&task.id))?,
            ),
            (None, None) => None,
        };

        prepared.insert(task.id.as_str(), Prepared { duration, fixed_start });
    }

    Ok(prepared)
}

/// Topological order of every task, or `GraphNotAcyclic` if the acyclic
/// invariant was bypassed.
fn topological_order(store: &GraphStore, edges: &[Dependency]) -> Result<Vec<TaskId>, GraphError> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for task in store.all_nodes() {
        graph.add_node(task.id.as_str());
    }
    for edge in edges {
        graph.add_edge(edge.predecessor.as_str(), edge.successor.as_str(), ());
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => {
            let task = cycle.node_id().to_string();
            error!(
                task = %task,
                "integrity fault: task graph contains a cycle; an edge bypassed validation"
            );
            Err(GraphError::GraphNotAcyclic { task })
        }
    }
}

fn out_of_range(task: &str) -> GraphError {
    GraphError::InvalidTaskData {
        task: task.to_string(),
        reason: "dates fall outside the representable time range (check lag, duration and pinned dates)"
            .to_string(),
    }
}

/// Lower bound on the successor's start implied by one incoming edge.
fn forward_bound(
    dep: &Dependency,
    pred: Window,
    succ_duration: i64,
    calendar: &dyn Calendar,
) -> Option<i64> {
    match dep.kind {
        DependencyType::FinishToStart => pred.finish.checked_add(dep.lag),
        DependencyType::StartToStart => pred.start.checked_add(dep.lag),
        DependencyType::FinishToFinish => {
            calendar.start_from(pred.finish.checked_add(dep.lag)?, succ_duration)
        }
        DependencyType::StartToFinish => {
            calendar.start_from(pred.start.checked_add(dep.lag)?, succ_duration)
        }
    }
}

/// Upper bound on the predecessor's finish implied by one outgoing edge.
fn backward_bound(
    dep: &Dependency,
    succ: Window,
    pred_duration: i64,
    calendar: &dyn Calendar,
) -> Option<i64> {
    match dep.kind {
        DependencyType::FinishToStart => succ.start.checked_sub(dep.lag),
        DependencyType::StartToStart => {
            calendar.finish_from(succ.start.checked_sub(dep.lag)?, pred_duration)
        }
        DependencyType::FinishToFinish => succ.finish.checked_sub(dep.lag),
        DependencyType::StartToFinish => {
            calendar.finish_from(succ.finish.checked_sub(dep.lag)?, pred_duration)
        }
    }
}
