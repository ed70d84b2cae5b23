// tests/config_loading.rs

use std::io::Write;

use tempfile::NamedTempFile;
use pronaflow_graph::config::{load_and_validate, load_project};
use pronaflow_graph::errors::PronaflowError;
use pronaflow_graph::{DependencyType, GraphError};
use pronaflow_test_utils::builders::{ProjectFileBuilder, TaskConfigBuilder};

fn write_project(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_project_file_round_trips_into_graph() {
    let file = write_project(
        r#"
[project]
id = "launch"
start = 2
deadline = 20
non_working = [7]

[engine]
recompute_on_change = false

[task.A]
duration = 3

[task.B]
duration = 3
after = ["A"]

[task.M]
milestone = true
after = ["B"]

[[dependency]]
predecessor = "A"
successor = "M"
type = "SS"
lag = 1
"#,
    );

    let (project, mut graph) = load_project(file.path()).unwrap();
    assert_eq!(project.project.id, "launch");
    assert!(!project.actor_options().recompute_on_change);
    assert_eq!(graph.id(), "launch");
    assert_eq!(graph.store().node_count(), 3);
    assert_eq!(graph.store().edge_count(), 3);
    assert!(graph.store().contains_edge("A", "M", DependencyType::StartToStart));

    let snap = graph.recompute_schedule().unwrap();
    assert_eq!(snap.task("A").unwrap().earliest_start, 2);
    // B covers units 5, 6 and 8; unit 7 is non-working.
    assert_eq!(snap.task("B").unwrap().earliest_finish, 9);
    assert_eq!(snap.task("M").unwrap().earliest_start, 9);
    assert_eq!(snap.project_end(), 20);
}

#[test]
fn cycle_in_file_reports_path() {
    let file = write_project(
        r#"
[task.A]
duration = 1
after = ["B"]

[task.B]
duration = 1
after = ["A"]
"#,
    );

    match load_project(file.path()) {
        Err(PronaflowError::Graph(GraphError::CycleDetected { cycle_path })) => {
            assert_eq!(cycle_path.len(), 3);
            assert_eq!(cycle_path.first(), cycle_path.last());
        }
        Err(e) => panic!("Expected CycleDetected, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_dependency_returns_config_error() {
    let file = write_project(
        r#"
[task.A]
duration = 1
after = ["NonExistent"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(PronaflowError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn explicit_dependency_checks() {
    let self_dep = write_project(
        r#"
[task.A]
duration = 1

[[dependency]]
predecessor = "A"
successor = "A"
"#,
    );
    assert!(matches!(
        load_and_validate(self_dep.path()),
        Err(PronaflowError::ConfigError(msg)) if msg.contains("itself")
    ));

    let bad_type = write_project(
        r#"
[task.A]
duration = 1

[task.B]
duration = 1

[[dependency]]
predecessor = "A"
successor = "B"
type = "XX"
"#,
    );
    assert!(matches!(
        load_and_validate(bad_type.path()),
        Err(PronaflowError::TomlError(_))
    ));
}

#[test]
fn empty_and_inconsistent_projects_are_rejected() {
    let empty = write_project("[project]\nid = \"x\"\n");
    assert!(matches!(
        load_and_validate(empty.path()),
        Err(PronaflowError::ConfigError(msg)) if msg.contains("at least one")
    ));

    let deadline = write_project(
        r#"
[project]
start = 10
deadline = 5

[task.A]
duration = 1
"#,
    );
    assert!(matches!(
        load_and_validate(deadline.path()),
        Err(PronaflowError::ConfigError(msg)) if msg.contains("deadline")
    ));
}

#[test]
fn missing_file_is_io_error() {
    assert!(matches!(
        load_and_validate("/definitely/not/here/Project.toml"),
        Err(PronaflowError::IoError(_))
    ));
}

#[test]
fn builder_project_builds_through_validator() {
    let project = ProjectFileBuilder::new("built")
        .with_task("A", TaskConfigBuilder::new(3).build())
        .with_task("B", TaskConfigBuilder::new(2).after("A").build())
        .with_task("M", TaskConfigBuilder::milestone().pinned_start(9).build())
        .with_dependency("B", "M", DependencyType::FinishToStart, 0)
        .build();

    assert_eq!(project.dependencies().len(), 2);
    let mut graph = project.build_graph().unwrap();
    let snap = graph.recompute_schedule().unwrap();
    assert_eq!(snap.task("M").unwrap().earliest_start, 9);
    assert_eq!(snap.task("B").unwrap().slack, 4);
}

#[test]
fn dependency_type_defaults_to_finish_to_start() {
    let file = write_project(
        r#"
[task.A]
duration = 1

[task.B]
duration = 1

[[dependency]]
predecessor = "A"
successor = "B"
"#,
    );

    let project = load_and_validate(file.path()).unwrap();
    assert_eq!(project.dependency[0].kind, DependencyType::FinishToStart);
    assert_eq!(DependencyType::default(), DependencyType::FinishToStart);
}
