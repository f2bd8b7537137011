#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::FakeGraph;
use dbemu_core::errors::{ExError, ExErrorKind, PipelineError};
use dbemu_core::logging_facility::test_capture::init_test_capture;
use dbemu_core::{log_op_end, log_op_error, log_op_start};
use dbemu_core::{EntityTarget, SnapshotAssembler};
use dbemu_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_PROGRESS, EVENT_START, FIELD_DURATION_MS, FIELD_ENTITY_ID,
    FIELD_ERR_CODE, FIELD_ERR_KIND, FIELD_FAILED, FIELD_INDEX, FIELD_LABEL, FIELD_SUCCEEDED,
    FIELD_TOTAL,
};
use serde_json::json;

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    capture.assert_event_exists(op_name, EVENT_START);
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = PipelineError::EntityNotFound {
        entity: "Student".to_string(),
        entity_id: "s2".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let error_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(error_events.len(), 1);
    let event = &error_events[0];
    assert_eq!(event.field(FIELD_ERR_CODE), Some("ERR_NOT_FOUND"));
    assert_eq!(
        event.field(FIELD_ERR_KIND),
        Some(format!("{:?}", ExErrorKind::NotFound).as_str())
    );
}

#[test]
fn test_build_emits_lifecycle_and_progress_events() {
    let capture = init_test_capture();
    let graph = FakeGraph::new()
        .with_plain_node("log-s1")
        .with_plain_node("log-s2")
        .with_fault(
            "log-s2",
            ExError::new(ExErrorKind::Timeout).with_message("timeout"),
        );
    let target = EntityTarget::new("LogStudent", "id").unwrap();

    SnapshotAssembler::new(&graph, &target).build().unwrap();

    capture.assert_event_exists("build_snapshot", EVENT_START);
    capture.assert_event_exists("list_ids", EVENT_END);

    let listed = capture.count_events(|e| {
        e.op.as_deref() == Some("list_ids")
            && e.event.as_deref() == Some(EVENT_START)
            && e.field(FIELD_LABEL) == Some("LogStudent")
    });
    assert_eq!(listed, 1);

    let progress: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| {
            e.event.as_deref() == Some(EVENT_PROGRESS)
                && e.field(FIELD_ENTITY_ID)
                    .is_some_and(|id| id == "log-s1" || id == "log-s2")
        })
        .collect();
    assert_eq!(progress.len(), 2);
    assert_eq!(progress[0].field(FIELD_INDEX), Some("1"));
    assert_eq!(progress[1].field(FIELD_INDEX), Some("2"));
    assert!(progress.iter().all(|e| e.field(FIELD_TOTAL) == Some("2")));

    let counted_end = capture.count_events(|e| {
        e.op.as_deref() == Some("build_snapshot")
            && e.event.as_deref() == Some(EVENT_END)
            && e.field(FIELD_TOTAL) == Some("2")
            && e.field(FIELD_SUCCEEDED) == Some("1")
            && e.field(FIELD_FAILED) == Some("1")
    });
    assert!(counted_end >= 1);

    let failed_fetches = capture.count_events(|e| {
        e.op.as_deref() == Some("fetch_entity")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field(FIELD_ENTITY_ID) == Some("log-s2")
    });
    assert_eq!(failed_fetches, 1);
}

#[test]
fn test_enumeration_failure_is_logged_as_error() {
    let capture = init_test_capture();
    let graph = FakeGraph::new().with_enumeration_fault(
        ExError::new(ExErrorKind::Connection).with_message("log test: refused"),
    );
    let target = EntityTarget::new("LogFailure", "id").unwrap();

    assert!(SnapshotAssembler::new(&graph, &target).build().is_err());

    let errors = capture.count_events(|e| {
        e.op.as_deref() == Some("build_snapshot")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field("err.message")
                .is_some_and(|m| m.contains("log test: refused"))
    });
    assert_eq!(errors, 1);
}

#[test]
fn test_null_identifier_is_kept_with_warning() {
    let capture = init_test_capture();
    let graph = FakeGraph::new().with_listed_ids(vec![json!(null)]);
    let target = EntityTarget::new("LogNullIds", "id").unwrap();

    let outcome = SnapshotAssembler::new(&graph, &target).build().unwrap();

    let summary = outcome.summary();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.failed[0].id.as_str(), "null");
    let warnings = capture.count_events(|e| {
        e.level == tracing::Level::WARN
            && e.field(FIELD_LABEL) == Some("LogNullIds")
            && e.field("message")
                .is_some_and(|m| m.contains("without an identifier"))
    });
    assert_eq!(warnings, 1);
}
