// tests/dependency_validator.rs

use pronaflow_graph::dag::{can_add_edge, would_create_cycle, EdgeCheck, GraphStore, TaskNode};
use pronaflow_graph::{DependencyType, ErrorKind, GraphError};
use pronaflow_test_utils::builders::{chain_abc, GraphBuilder};

const FS: DependencyType = DependencyType::FinishToStart;

#[test]
fn closing_edge_reports_full_cycle_path() {
    let mut graph = chain_abc("p");

    let err = graph.add_dependency("C", "A", FS, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cycle);
    assert_eq!(err.cycle_path().unwrap(), ["A", "B", "C", "A"]);
    assert_eq!(err.to_string(), "would create a cycle: A -> B -> C -> A");

    // Rejected edge was not inserted.
    assert_eq!(graph.store().edge_count(), 2);
}

#[test]
fn self_loop_is_always_rejected() {
    let mut graph = GraphBuilder::new("p").task("A", 1).build();

    let err = graph.add_dependency("A", "A", FS, 0).unwrap_err();
    assert_eq!(
        err,
        GraphError::CycleDetected {
            cycle_path: vec!["A".to_string(), "A".to_string()]
        }
    );

    // Independent of graph contents: even on an empty store.
    assert!(would_create_cycle(&GraphStore::new(), "X", "X"));
}

#[test]
fn parallel_branch_is_allowed() {
    let graph = chain_abc("p");
    assert_eq!(can_add_edge(graph.store(), "A", "C"), EdgeCheck::Allowed);
    assert!(!graph.would_create_cycle("A", "C").unwrap());
    assert!(can_add_edge(graph.store(), "A", "C").into_result().is_ok());
    assert_eq!(
        can_add_edge(graph.store(), "B", "A").into_result().unwrap_err().cycle_path().unwrap(),
        ["A", "B", "A"]
    );
}

#[test]
fn cycle_through_any_dependency_type_is_detected() {
    let graph = GraphBuilder::new("p")
        .task("A", 1)
        .task("B", 1)
        .task("C", 1)
        .edge("A", "B", DependencyType::StartToStart, 0)
        .edge("B", "C", DependencyType::FinishToFinish, 2)
        .build();

    match can_add_edge(graph.store(), "C", "A") {
        EdgeCheck::Rejected { cycle_path } => assert_eq!(cycle_path, ["A", "B", "C", "A"]),
        EdgeCheck::Allowed => panic!("expected rejection"),
    }
}

#[test]
fn diamond_reports_a_real_path() {
    // A -> B -> D, A -> C -> D; adding D -> A must report a path that
    // actually exists in the graph.
    let graph = GraphBuilder::new("p")
        .task("A", 1)
        .task("B", 1)
        .task("C", 1)
        .task("D", 1)
        .fs("A", "B")
        .fs("A", "C")
        .fs("B", "D")
        .fs("C", "D")
        .build();

    let EdgeCheck::Rejected { cycle_path } = can_add_edge(graph.store(), "D", "A") else {
        panic!("expected rejection");
    };
    assert_eq!(cycle_path.first().map(String::as_str), Some("A"));
    assert_eq!(cycle_path.last().map(String::as_str), Some("A"));
    assert_eq!(cycle_path[cycle_path.len() - 2], "D");
    for pair in cycle_path[..cycle_path.len() - 1].windows(2) {
        assert!(
            graph.store().contains_edge(&pair[0], &pair[1], FS),
            "path step {} -> {} is not an edge",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn existence_checks_precede_cycle_check() {
    let mut graph = chain_abc("p");

    // Duplicate, not cycle.
    assert!(matches!(
        graph.add_dependency("A", "B", FS, 0),
        Err(GraphError::DuplicateEdge { .. })
    ));
    // Unknown node, not cycle.
    assert_eq!(
        graph.add_dependency("C", "Z", FS, 0).unwrap_err(),
        GraphError::UnknownNode("Z".to_string())
    );
}

#[test]
fn unknown_nodes_cannot_close_a_loop() {
    let mut store = GraphStore::new();
    store.add_node(TaskNode::new("A", 1)).unwrap();
    assert!(can_add_edge(&store, "A", "missing").is_allowed());
}

#[test]
fn pre_check_reports_unknown_endpoints_like_the_insert() {
    let mut graph = GraphBuilder::new("p").task("A", 1).build();

    let unknown = GraphError::UnknownNode("Zzz".to_string());
    assert_eq!(graph.check_dependency("A", "Zzz").unwrap_err(), unknown);
    assert_eq!(graph.would_create_cycle("A", "Zzz").unwrap_err(), unknown);
    assert_eq!(graph.add_dependency("A", "Zzz", FS, 0).unwrap_err(), unknown);
    assert_eq!(
        graph.check_dependency("Zzz", "A").unwrap_err().kind(),
        ErrorKind::Structural
    );
}
