//! End-to-end flow through the session façade.
//!
//! Uses wiremock as the model backend and a temp directory for snapshots.

use std::time::Duration;

use human_judge::persistence::{latest_snapshot, list_snapshots, load_snapshot};
use human_judge::{
    Config, Dimension, EvalError, EvaluationSession, JudgmentDraft, JudgmentStore,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn backend_answering(content: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })))
        .mount(&server)
        .await;
    server
}

fn open_session(server: &MockServer, dir: &TempDir) -> EvaluationSession {
    let config = Config::with_backend(server.uri(), &["model-a", "model-b"], dir.path());
    config.validate().expect("test config is valid");
    EvaluationSession::from_config(&config).expect("session opens")
}

#[tokio::test]
async fn test_trial_judge_summarize() {
    let server = backend_answering("我理解你的焦虑，可以先试试规律作息和放松练习。").await;
    let dir = TempDir::new().unwrap();
    let session = open_session(&server, &dir);

    let tc = session.scenario("tc_001").unwrap();
    assert_eq!(tc.category, "anxiety");

    let response = session
        .run_trial("tc_001", "model-a", Duration::from_secs(30))
        .await
        .expect("trial succeeds");
    assert!(!response.response_text.is_empty());
    assert!(response.latency_seconds > 0.0);

    let judgment = session
        .submit_judgment(
            JudgmentDraft::new("tc_001", "model-a", "judge-7")
                .with_scores(4, 5, 4, 5, 4)
                .with_confidence(4)
                .with_comments("empathetic", "no hotline", "mention professional help"),
        )
        .await
        .expect("judgment accepted");
    assert_eq!(judgment.judge_id, "judge-7");

    let summary = session.get_summary().await;
    assert_eq!(summary.count, 1);
    let overall = summary
        .model_stat("model-a", Dimension::OverallQuality)
        .unwrap();
    assert_eq!(overall.mean, 4.0);
    assert_eq!(overall.stddev, None);

    let snapshot = latest_snapshot(dir.path()).unwrap();
    assert_eq!(load_snapshot(&snapshot).unwrap(), vec![judgment]);
}

#[tokio::test]
async fn test_multiple_models_and_restart() {
    let server = backend_answering("ok").await;
    let dir = TempDir::new().unwrap();
    let session = open_session(&server, &dir);

    for (model, overall) in [("model-a", 3), ("model-a", 4), ("model-a", 5), ("model-b", 2)] {
        session
            .submit_judgment(
                JudgmentDraft::new("tc_004", model, "judge-1").with_scores(3, 3, 3, 3, overall),
            )
            .await
            .unwrap();
    }
    assert_eq!(list_snapshots(dir.path()).len(), 4);

    let before = session.get_summary().await;
    let a = before.model_stat("model-a", Dimension::OverallQuality).unwrap();
    assert_eq!(a.mean, 4.0);
    assert!((a.stddev.unwrap() - 1.0).abs() < 1e-9);

    let restarted = open_session(&server, &dir);
    assert_eq!(restarted.recover().await.unwrap(), 4);
    assert_eq!(restarted.judgments().await, session.judgments().await);
    assert_eq!(restarted.get_summary().await, before);
}

#[tokio::test]
async fn test_errors_are_typed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let session = open_session(&server, &dir);

    let err = session
        .run_trial("tc_005", "model-a", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, EvalError::Backend { status_code: 500, .. }));
    assert!(!err.is_retryable());

    let err = session
        .run_trial("nonexistent-id", "model-a", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, EvalError::NotFound(_)));

    // Only the backend-error trial reached the server.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_independent_sessions_do_not_share_state() {
    let server = backend_answering("ok").await;
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let first = open_session(&server, &dir_a);
    let second = open_session(&server, &dir_b);

    first
        .submit_judgment(JudgmentDraft::new("tc_001", "model-a", "judge-1"))
        .await
        .unwrap();

    assert_eq!(first.get_summary().await.count, 1);
    assert_eq!(second.get_summary().await.count, 0);

    let store = JudgmentStore::new(dir_b.path());
    assert!(matches!(
        store.reload().await,
        Err(EvalError::SnapshotNotFound(_))
    ));
}
