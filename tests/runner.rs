mod common;
use common::*;

use std::sync::Arc;

use relayflow::events::{EventStatus, MemoryPublisher};
use relayflow::executors::ExecutorRegistry;
use relayflow::journal::InMemoryJournal;
use relayflow::loader::InMemoryGraphLoader;
use relayflow::model::{Connection, Workflow};
use relayflow::runner::{RunRequest, Runner, RunnerError};
use relayflow::types::NodeType;
use serde_json::json;

fn runner_with(
    workflow: Option<Workflow>,
    registry: ExecutorRegistry,
    publisher: &MemoryPublisher,
) -> Runner {
    let loader = Arc::new(InMemoryGraphLoader::new());
    if let Some(workflow) = workflow {
        loader.insert(workflow);
    }
    Runner::new(
        Arc::new(registry),
        loader,
        Arc::new(InMemoryJournal::new()),
        Arc::new(publisher.clone()),
    )
}

#[tokio::test]
async fn trigger_then_http_accumulates_context() {
    let server = httpmock::MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(httpmock::Method::GET).path("/items");
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;

    let publisher = MemoryPublisher::new();
    let runner = runner_with(
        Some(trigger_then_http("wf-1", &server.url("/items"))),
        ExecutorRegistry::with_defaults(),
        &publisher,
    );

    let outcome = runner.run(RunRequest::new("wf-1")).await.unwrap();
    mock.assert_async().await;

    // Both nodes contributed; nothing was overwritten.
    assert_eq!(outcome.workflow_id, "wf-1");
    assert!(outcome.context.get("manual").is_some());
    let http = outcome.context.get("httpRequest").unwrap();
    assert_eq!(http["status"], 200);
    assert_eq!(http["body"]["ok"], true);

    // loading/success per node, trigger strictly before fetch.
    let events = publisher.snapshot();
    assert_eq!(events.len(), 4);
    assert_eq!(
        events
            .iter()
            .map(|e| (e.node_id.as_str(), e.status))
            .collect::<Vec<_>>(),
        vec![
            ("trigger", EventStatus::Loading),
            ("trigger", EventStatus::Success),
            ("fetch", EventStatus::Loading),
            ("fetch", EventStatus::Success),
        ]
    );
    // Every event is stamped with the run and channel.
    let job_id = events[0].job_id.clone();
    for event in &events {
        assert_eq!(event.job_id, job_id);
        assert_eq!(event.channel, "wf-1");
    }
}

#[tokio::test]
async fn later_node_wins_on_context_key_conflict() {
    let workflow = Workflow {
        id: "wf-merge".to_string(),
        nodes: vec![
            node("first", NodeType::HttpRequest, "wf-merge"),
            node("second", NodeType::ManualTrigger, "wf-merge"),
        ],
        connections: vec![Connection::new("first", "second")],
        secret: TEST_SECRET.to_string(),
    };

    let publisher = MemoryPublisher::new();
    let registry = ExecutorRegistry::new()
        .register(NodeType::HttpRequest, KeyExecutor::new("shared", json!(1)))
        .register(NodeType::ManualTrigger, KeyExecutor::new("shared", json!(2)));
    let runner = runner_with(Some(workflow), registry, &publisher);

    let outcome = runner.run(RunRequest::new("wf-merge")).await.unwrap();
    assert_eq!(outcome.context.get("shared").unwrap(), &json!(2));
    assert_eq!(outcome.context.len(), 1);
}

#[tokio::test]
async fn cyclic_workflow_executes_no_node() {
    let probe = KeyExecutor::new("ran", json!(true));
    let publisher = MemoryPublisher::new();
    let registry = ExecutorRegistry::new().register(NodeType::HttpRequest, probe.handle());
    let runner = runner_with(Some(cyclic_workflow("wf-cycle")), registry, &publisher);

    let err = runner.run(RunRequest::new("wf-cycle")).await.unwrap_err();
    assert!(matches!(err, RunnerError::Cycle(_)));
    assert!(!err.is_retriable());
    assert_eq!(probe.call_count(), 0);
    assert!(publisher.snapshot().is_empty());
}

#[tokio::test]
async fn missing_workflow_is_not_found_and_not_retriable() {
    let publisher = MemoryPublisher::new();
    let runner = runner_with(None, ExecutorRegistry::with_defaults(), &publisher);

    let err = runner.run(RunRequest::new("ghost")).await.unwrap_err();
    assert!(matches!(err, RunnerError::WorkflowNotFound { .. }));
    assert!(!err.is_retriable());
}

#[tokio::test]
async fn unregistered_node_type_aborts_the_run() {
    let publisher = MemoryPublisher::new();
    let runner = runner_with(
        Some(google_form_workflow("wf-g")),
        ExecutorRegistry::new(),
        &publisher,
    );

    let err = runner.run(RunRequest::new("wf-g")).await.unwrap_err();
    match &err {
        RunnerError::UnknownExecutor(inner) => {
            assert_eq!(inner.kind, NodeType::GoogleFormTrigger);
        }
        other => panic!("expected UnknownExecutor, got {other}"),
    }
    assert!(!err.is_retriable());
}

#[tokio::test]
async fn node_failure_stops_downstream_nodes() {
    let workflow = Workflow {
        id: "wf-fail".to_string(),
        nodes: vec![
            node("broken", NodeType::HttpRequest, "wf-fail"),
            node("after", NodeType::ManualTrigger, "wf-fail"),
        ],
        connections: vec![Connection::new("broken", "after")],
        secret: TEST_SECRET.to_string(),
    };

    let downstream = KeyExecutor::new("after", json!(true));
    let publisher = MemoryPublisher::new();
    let registry = ExecutorRegistry::new()
        .register(NodeType::HttpRequest, FailingExecutor)
        .register(NodeType::ManualTrigger, downstream.handle());
    let runner = runner_with(Some(workflow), registry, &publisher);

    let err = runner.run(RunRequest::new("wf-fail")).await.unwrap_err();
    match &err {
        RunnerError::Executor { node_id, .. } => assert_eq!(node_id, "broken"),
        other => panic!("expected Executor error, got {other}"),
    }
    assert!(err.is_retriable());
    assert_eq!(downstream.call_count(), 0);

    let events = publisher.snapshot();
    assert_eq!(events.last().unwrap().status, EventStatus::Error);
    assert!(events.iter().all(|e| e.node_id == "broken"));
}

#[tokio::test]
async fn misconfigured_http_node_still_reports_on_the_channel() {
    // No url in the node data: the executor cannot even build a request.
    let workflow = Workflow {
        id: "wf-badcfg".to_string(),
        nodes: vec![node("fetch", NodeType::HttpRequest, "wf-badcfg")],
        connections: vec![],
        secret: TEST_SECRET.to_string(),
    };

    let publisher = MemoryPublisher::new();
    let runner = runner_with(
        Some(workflow),
        ExecutorRegistry::with_defaults(),
        &publisher,
    );

    let err = runner.run(RunRequest::new("wf-badcfg")).await.unwrap_err();
    match &err {
        RunnerError::Executor { node_id, .. } => assert_eq!(node_id, "fetch"),
        other => panic!("expected Executor error, got {other}"),
    }

    // A subscriber sees the node start and fail; the channel is never silent
    // for a node that ran.
    let events = publisher.snapshot();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].status, EventStatus::Loading);
    assert_eq!(events[1].status, EventStatus::Error);
    assert!(events[1].status.is_terminal());
    assert!(events.iter().all(|e| e.node_id == "fetch"));
}

#[tokio::test]
async fn replay_reuses_journaled_steps_without_reexecuting() {
    let probe = KeyExecutor::new("manual", json!({"seen": true}));
    let journal = Arc::new(InMemoryJournal::new());
    let loader = Arc::new(InMemoryGraphLoader::new());
    loader.insert(Workflow {
        id: "wf-replay".to_string(),
        nodes: vec![node("trigger", NodeType::ManualTrigger, "wf-replay")],
        connections: vec![],
        secret: TEST_SECRET.to_string(),
    });

    let publisher = MemoryPublisher::new();
    let runner = Runner::new(
        Arc::new(ExecutorRegistry::new().register(NodeType::ManualTrigger, probe.handle())),
        loader,
        journal.clone(),
        Arc::new(publisher.clone()),
    );

    let request = RunRequest::new("wf-replay").with_job_id("job-fixed");
    let first = runner.run(request.clone()).await.unwrap();
    assert_eq!(probe.call_count(), 1);
    assert_eq!(journal.len(), 1);

    // Same job id: the checkpoint is found, the executor does not run again,
    // and the outcome is identical.
    let second = runner.run(request).await.unwrap();
    assert_eq!(probe.call_count(), 1);
    assert_eq!(second.context, first.context);

    // A fresh job id is a new run instance and executes normally.
    let third = runner
        .run(RunRequest::new("wf-replay").with_job_id("job-other"))
        .await
        .unwrap();
    assert_eq!(probe.call_count(), 2);
    assert_eq!(third.context, first.context);
}

#[tokio::test]
async fn execution_follows_connection_order_not_list_order() {
    // Nodes listed out of order on purpose; connections define c -> b -> a.
    let workflow = Workflow {
        id: "wf-order".to_string(),
        nodes: vec![
            node("a", NodeType::HttpRequest, "wf-order"),
            node("b", NodeType::HttpRequest, "wf-order"),
            node("c", NodeType::HttpRequest, "wf-order"),
        ],
        connections: vec![Connection::new("c", "b"), Connection::new("b", "a")],
        secret: TEST_SECRET.to_string(),
    };

    let publisher = MemoryPublisher::new();
    let registry = ExecutorRegistry::new().register(NodeType::HttpRequest, EchoExecutor);
    let runner = runner_with(Some(workflow), registry, &publisher);

    runner.run(RunRequest::new("wf-order")).await.unwrap();

    let loading_order: Vec<String> = publisher
        .snapshot()
        .into_iter()
        .filter(|e| e.status == EventStatus::Loading)
        .map(|e| e.node_id)
        .collect();
    assert_eq!(loading_order, vec!["c", "b", "a"]);
}
