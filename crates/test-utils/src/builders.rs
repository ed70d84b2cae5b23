#![allow(dead_code)]

use std::collections::BTreeMap;

use pronaflow_graph::config::{
    DependencyConfig, EngineSection, ProjectFile, ProjectSection, RawProjectFile, TaskConfig,
};
use pronaflow_graph::engine::ProjectGraph;
use pronaflow_graph::{DependencyType, ScheduleOptions, TaskNode};

/// Builder for `ProjectFile` to simplify config-level test setup.
pub struct ProjectFileBuilder {
    raw: RawProjectFile,
}

impl ProjectFileBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            raw: RawProjectFile {
                project: ProjectSection {
                    id: id.to_string(),
                    ..ProjectSection::default()
                },
                engine: EngineSection::default(),
                task: BTreeMap::new(),
                dependency: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.raw.task.insert(name.to_string(), task);
        self
    }

    pub fn with_dependency(
        mut self,
        predecessor: &str,
        successor: &str,
        kind: DependencyType,
        lag: i64,
    ) -> Self {
        self.raw.dependency.push(DependencyConfig {
            predecessor: predecessor.to_string(),
            successor: successor.to_string(),
            kind,
            lag,
        });
        self
    }

    pub fn start(mut self, start: i64) -> Self {
        self.raw.project.start = start;
        self
    }

    pub fn deadline(mut self, deadline: i64) -> Self {
        self.raw.project.deadline = Some(deadline);
        self
    }

    pub fn non_working(mut self, unit: i64) -> Self {
        self.raw.project.non_working.push(unit);
        self
    }

    pub fn build(self) -> ProjectFile {
        ProjectFile::try_from(self.raw).expect("Failed to build valid project file from builder")
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(duration: i64) -> Self {
        Self {
            task: TaskConfig {
                duration: Some(duration),
                ..TaskConfig::default()
            },
        }
    }

    pub fn milestone() -> Self {
        Self {
            task: TaskConfig {
                milestone: true,
                ..TaskConfig::default()
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn pinned_start(mut self, start: i64) -> Self {
        self.task.pinned_start = Some(start);
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

/// Fluent builder for a `ProjectGraph` that goes through the validated
/// `add_dependency` path and panics on any rejection.
pub struct GraphBuilder {
    graph: ProjectGraph,
}

impl GraphBuilder {
    pub fn new(project: &str) -> Self {
        Self {
            graph: ProjectGraph::new(project),
        }
    }

    pub fn options(mut self, options: ScheduleOptions) -> Self {
        self.graph = self.graph.with_options(options);
        self
    }

    pub fn task(mut self, id: &str, duration: i64) -> Self {
        self.graph
            .add_task(TaskNode::new(id, duration))
            .expect("add_task failed in GraphBuilder");
        self
    }

    pub fn milestone(mut self, id: &str) -> Self {
        self.graph
            .add_task(TaskNode::milestone(id))
            .expect("add_task failed in GraphBuilder");
        self
    }

    pub fn node(mut self, node: TaskNode) -> Self {
        self.graph
            .add_task(node)
            .expect("add_task failed in GraphBuilder");
        self
    }

    /// Finish-to-Start edge with zero lag.
    pub fn fs(self, predecessor: &str, successor: &str) -> Self {
        self.edge(predecessor, successor, DependencyType::FinishToStart, 0)
    }

    pub fn edge(mut self, predecessor: &str, successor: &str, kind: DependencyType, lag: i64) -> Self {
        self.graph
            .add_dependency(predecessor, successor, kind, lag)
            .expect("add_dependency failed in GraphBuilder");
        self
    }

    pub fn build(self) -> ProjectGraph {
        self.graph
    }
}

/// Scenario graph: A(3) -> B(2) -> C(4), all Finish-to-Start.
pub fn chain_abc(project: &str) -> ProjectGraph {
    GraphBuilder::new(project)
        .task("A", 3)
        .task("B", 2)
        .task("C", 4)
        .fs("A", "B")
        .fs("B", "C")
        .build()
}
