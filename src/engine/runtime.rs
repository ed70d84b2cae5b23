// src/engine/runtime.rs

//! Single-writer actor per project.
//!
//! The actor owns a [`ProjectGraph`] and applies commands one at a time
//! from an mpsc channel, so the whole "validate -> mutate -> recompute"
//! sequence for a project is serialized without any lock. Published
//! schedules go out on a `watch` channel: readers take the latest
//! `Arc<ScheduleSnapshot>` straight from their receiver and never queue
//! behind mutations.
//!
//! Separate projects get separate actors and run in parallel.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dag::validator::EdgeCheck;
use crate::dag::{Dependency, GraphStore, TaskNode};
use crate::engine::project::ProjectGraph;
use crate::errors::GraphError;
use crate::schedule::ScheduleSnapshot;
use crate::types::{DependencyType, ProjectId, TaskId};

type Reply<T> = oneshot::Sender<Result<T, GraphError>>;

/// Behaviour of a spawned project actor.
#[derive(Debug, Clone, Copy)]
pub struct ActorOptions {
    /// Recompute and publish the schedule after every successful mutation.
    pub recompute_on_change: bool,
    /// Capacity of the command channel.
    pub channel_capacity: usize,
}

impl Default for ActorOptions {
    fn default() -> Self {
        Self {
            recompute_on_change: true,
            channel_capacity: 64,
        }
    }
}

/// Commands accepted by the actor.
#[derive(Debug)]
enum ProjectCommand {
    AddTask {
        task: TaskNode,
        reply: Reply<()>,
    },
    RemoveTask {
        task: TaskId,
        cascade: bool,
        reply: Reply<Vec<Dependency>>,
    },
    AddDependency {
        predecessor: TaskId,
        successor: TaskId,
        kind: DependencyType,
        lag: i64,
        reply: Reply<()>,
    },
    RemoveDependency {
        predecessor: TaskId,
        successor: TaskId,
        kind: DependencyType,
        reply: Reply<()>,
    },
    CheckDependency {
        predecessor: TaskId,
        successor: TaskId,
        reply: Reply<EdgeCheck>,
    },
    Recompute {
        reply: Reply<Arc<ScheduleSnapshot>>,
    },
    Store {
        reply: Reply<GraphStore>,
    },
}

/// Cheap, cloneable handle to a running project actor.
#[derive(Debug, Clone)]
pub struct ProjectHandle {
    project: ProjectId,
    tx: mpsc::Sender<ProjectCommand>,
    schedule_rx: watch::Receiver<Option<Arc<ScheduleSnapshot>>>,
}

/// Spawn an actor owning `graph`.
///
/// The actor stops once every [`ProjectHandle`] is dropped; the join handle
/// then yields the graph back so the caller can persist it.
pub fn spawn_project(
    graph: ProjectGraph,
    options: ActorOptions,
) -> (ProjectHandle, JoinHandle<ProjectGraph>) {
    let (tx, rx) = mpsc::channel(options.channel_capacity.max(1));
    let (schedule_tx, schedule_rx) = watch::channel(graph.schedule());
    let project = graph.id().to_string();

    let actor = ProjectActor {
        graph,
        rx,
        schedule_tx,
        options,
    };
    let join = tokio::spawn(actor.run());

    (
        ProjectHandle {
            project,
            tx,
            schedule_rx,
        },
        join,
    )
}

impl ProjectHandle {
    pub fn project_id(&self) -> &str {
        &self.project
    }

    /// Latest published schedule, read without going through the actor.
    pub fn latest_schedule(&self) -> Option<Arc<ScheduleSnapshot>> {
        self.schedule_rx.borrow().clone()
    }

    /// Receiver that observes every published schedule.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<ScheduleSnapshot>>> {
        self.schedule_rx.clone()
    }

    pub async fn add_task(&self, task: TaskNode) -> Result<(), GraphError> {
        self.request(|reply| ProjectCommand::AddTask { task, reply })
            .await
    }

    pub async fn remove_task(&self, task: impl Into<TaskId>) -> Result<(), GraphError> {
        let task = task.into();
        self.request(|reply| ProjectCommand::RemoveTask {
            task,
            cascade: false,
            reply,
        })
        .await
        .map(|_| ())
    }

    /// Remove a task along with every edge touching it.
    pub async fn remove_task_cascade(
        &self,
        task: impl Into<TaskId>,
    ) -> Result<Vec<Dependency>, GraphError> {
        let task = task.into();
        self.request(|reply| ProjectCommand::RemoveTask {
            task,
            cascade: true,
            reply,
        })
        .await
    }

    pub async fn add_dependency(
        &self,
        predecessor: impl Into<TaskId>,
        successor: impl Into<TaskId>,
        kind: DependencyType,
        lag: i64,
    ) -> Result<(), GraphError> {
        let (predecessor, successor) = (predecessor.into(), successor.into());
        self.request(|reply| ProjectCommand::AddDependency {
            predecessor,
            successor,
            kind,
            lag,
            reply,
        })
        .await
    }

    pub async fn remove_dependency(
        &self,
        predecessor: impl Into<TaskId>,
        successor: impl Into<TaskId>,
        kind: DependencyType,
    ) -> Result<(), GraphError> {
        let (predecessor, successor) = (predecessor.into(), successor.into());
        self.request(|reply| ProjectCommand::RemoveDependency {
            predecessor,
            successor,
            kind,
            reply,
        })
        .await
    }

    pub async fn check_dependency(
        &self,
        predecessor: impl Into<TaskId>,
        successor: impl Into<TaskId>,
    ) -> Result<EdgeCheck, GraphError> {
        let (predecessor, successor) = (predecessor.into(), successor.into());
        self.request(|reply| ProjectCommand::CheckDependency {
            predecessor,
            successor,
            reply,
        })
        .await
    }

    pub async fn would_create_cycle(
        &self,
        predecessor: impl Into<TaskId>,
        successor: impl Into<TaskId>,
    ) -> Result<bool, GraphError> {
        Ok(!self
            .check_dependency(predecessor, successor)
            .await?
            .is_allowed())
    }

    pub async fn recompute_schedule(&self) -> Result<Arc<ScheduleSnapshot>, GraphError> {
        self.request(|reply| ProjectCommand::Recompute { reply })
            .await
    }

    /// Clone of the actor's current store.
    pub async fn store(&self) -> Result<GraphStore, GraphError> {
        self.request(|reply| ProjectCommand::Store { reply }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> ProjectCommand,
    ) -> Result<T, GraphError> {
        let closed = || GraphError::ActorClosed(self.project.clone());
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).await.map_err(|_| closed())?;
        rx.await.map_err(|_| closed())?
    }
}

struct ProjectActor {
    graph: ProjectGraph,
    rx: mpsc::Receiver<ProjectCommand>,
    schedule_tx: watch::Sender<Option<Arc<ScheduleSnapshot>>>,
    options: ActorOptions,
}

impl ProjectActor {
    async fn run(mut self) -> ProjectGraph {
        info!(project = %self.graph.id(), "project actor started");

        while let Some(command) = self.rx.recv().await {
            self.handle(command);
        }

        info!(project = %self.graph.id(), "all handles dropped; project actor stopping");
        self.graph
    }

    fn handle(&mut self, command: ProjectCommand) {
        debug!(project = %self.graph.id(), ?command, "project actor received command");

        match command {
            ProjectCommand::AddTask { task, reply } => {
                let result = self.graph.add_task(task);
                self.after_mutation(&result);
                let _ = reply.send(result);
            }
            ProjectCommand::RemoveTask {
                task,
                cascade,
                reply,
            } => {
                let result = if cascade {
                    self.graph.remove_task_cascade(&task)
                } else {
                    self.graph.remove_task(&task).map(|_| Vec::new())
                };
                self.after_mutation(&result);
                let _ = reply.send(result);
            }
            ProjectCommand::AddDependency {
                predecessor,
                successor,
                kind,
                lag,
                reply,
            } => {
                let result = self
                    .graph
                    .add_dependency(&predecessor, &successor, kind, lag);
                self.after_mutation(&result);
                let _ = reply.send(result);
            }
            ProjectCommand::RemoveDependency {
                predecessor,
                successor,
                kind,
                reply,
            } => {
                let result = self.graph.remove_dependency(&predecessor, &successor, kind);
                self.after_mutation(&result);
                let _ = reply.send(result);
            }
            ProjectCommand::CheckDependency {
                predecessor,
                successor,
                reply,
            } => {
                let _ = reply.send(self.graph.check_dependency(&predecessor, &successor));
            }
            ProjectCommand::Recompute { reply } => {
                let result = self.recompute_and_publish();
                let _ = reply.send(result);
            }
            ProjectCommand::Store { reply } => {
                let _ = reply.send(Ok(self.graph.store().clone()));
            }
        }
    }

    fn after_mutation<T>(&mut self, result: &Result<T, GraphError>) {
        if result.is_err() || !self.options.recompute_on_change {
            return;
        }
        if let Err(err) = self.recompute_and_publish() {
            warn!(
                project = %self.graph.id(),
                error = %err,
                "automatic recompute failed; previous schedule stays published"
            );
        }
    }

    fn recompute_and_publish(&mut self) -> Result<Arc<ScheduleSnapshot>, GraphError> {
        let snapshot = self.graph.recompute_schedule()?;
        self.schedule_tx.send_replace(Some(Arc::clone(&snapshot)));
        Ok(snapshot)
    }
}
