// tests/runtime_actor.rs

use pronaflow_graph::engine::{spawn_project, ActorOptions, ProjectGraph};
use pronaflow_graph::{DependencyType, ErrorKind, GraphError, TaskNode};
use pronaflow_test_utils::builders::chain_abc;
use pronaflow_test_utils::{init_tracing, with_timeout};

const FS: DependencyType = DependencyType::FinishToStart;

#[tokio::test]
async fn mutations_publish_schedule_when_enabled() {
    init_tracing();
    with_timeout(async {
        let (handle, actor) = spawn_project(chain_abc("p"), ActorOptions::default());
        assert!(handle.latest_schedule().is_none());

        handle.add_task(TaskNode::new("D", 1)).await.unwrap();
        handle.add_dependency("A", "D", FS, 0).await.unwrap();
        handle.add_dependency("D", "C", FS, 0).await.unwrap();

        let snap = handle.latest_schedule().expect("schedule should be published");
        assert_eq!(snap.task("D").unwrap().slack, 1);
        assert_eq!(snap.makespan(), 9);

        drop(handle);
        let graph = actor.await.unwrap();
        assert_eq!(graph.store().edge_count(), 4);
    })
    .await;
}

#[tokio::test]
async fn rejected_edge_leaves_graph_and_schedule_untouched() {
    with_timeout(async {
        let (handle, _actor) = spawn_project(chain_abc("p"), ActorOptions::default());
        let before = handle.recompute_schedule().await.unwrap();

        let err = handle.add_dependency("C", "A", FS, 0).await.unwrap_err();
        assert_eq!(err.cycle_path().unwrap(), ["A", "B", "C", "A"]);

        assert!(handle.would_create_cycle("C", "A").await.unwrap());
        assert!(!handle.would_create_cycle("A", "C").await.unwrap());
        assert_eq!(
            handle.check_dependency("A", "Typo").await.unwrap_err(),
            GraphError::UnknownNode("Typo".to_string())
        );

        let after = handle.latest_schedule().unwrap();
        assert!(std::sync::Arc::ptr_eq(&before, &after));
        assert_eq!(handle.store().await.unwrap().edge_count(), 2);
    })
    .await;
}

#[tokio::test]
async fn concurrent_inserts_cannot_jointly_create_a_cycle() {
    with_timeout(async {
        let mut graph = ProjectGraph::new("p");
        graph.add_task(TaskNode::new("A", 1)).unwrap();
        graph.add_task(TaskNode::new("B", 1)).unwrap();
        let (handle, actor) = spawn_project(graph, ActorOptions::default());

        // Both directions race; the actor serializes them so exactly one wins.
        let h1 = handle.clone();
        let h2 = handle.clone();
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { h1.add_dependency("A", "B", FS, 0).await }),
            tokio::spawn(async move { h2.add_dependency("B", "A", FS, 0).await }),
        );
        let results = [r1.unwrap(), r2.unwrap()];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let cycles = results
            .iter()
            .filter(|r| matches!(r, Err(GraphError::CycleDetected { .. })))
            .count();
        assert_eq!((ok, cycles), (1, 1));

        drop(handle);
        let graph = actor.await.unwrap();
        assert_eq!(graph.store().edge_count(), 1);
    })
    .await;
}

#[tokio::test]
async fn subscribers_see_published_schedules() {
    with_timeout(async {
        let options = ActorOptions {
            recompute_on_change: false,
            ..ActorOptions::default()
        };
        let (handle, _actor) = spawn_project(chain_abc("p"), options);
        let mut rx = handle.subscribe();

        handle.remove_dependency("B", "C", FS).await.unwrap();
        // No automatic recompute.
        assert!(handle.latest_schedule().is_none());

        handle.recompute_schedule().await.unwrap();
        rx.changed().await.unwrap();
        let snap = rx.borrow().clone().unwrap();
        assert_eq!(snap.makespan(), 5);
    })
    .await;
}

#[tokio::test]
async fn failing_auto_recompute_does_not_fail_mutation() {
    with_timeout(async {
        let (handle, _actor) = spawn_project(chain_abc("p"), ActorOptions::default());
        handle.recompute_schedule().await.unwrap();

        // The mutation itself is valid; only the schedule cannot be computed.
        handle.add_task(TaskNode::unestimated("E")).await.unwrap();
        let err = handle.recompute_schedule().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(handle.latest_schedule().unwrap().makespan(), 9);

        let removed = handle.remove_task_cascade("E").await.unwrap();
        assert!(removed.is_empty());
        handle.remove_task("C").await.unwrap_err();
    })
    .await;
}

#[tokio::test]
async fn projects_run_independently() {
    with_timeout(async {
        let (alpha, _a) = spawn_project(chain_abc("alpha"), ActorOptions::default());
        let (beta, _b) = spawn_project(chain_abc("beta"), ActorOptions::default());

        beta.remove_dependency("B", "C", FS).await.unwrap();
        beta.add_dependency("C", "A", FS, 0).await.unwrap();
        assert!(alpha.add_dependency("C", "A", FS, 0).await.is_err());

        assert_eq!(alpha.project_id(), "alpha");
        assert_eq!(beta.recompute_schedule().await.unwrap().task("A").unwrap().earliest_start, 4);
    })
    .await;
}
