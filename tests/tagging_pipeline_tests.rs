//! Tagging pipeline tests
//!
//! click → profile → session → latest conversation → event label

mod common;

use std::sync::Arc;

use clicktag::backend::TaggingBackend;
use clicktag::errors::ClickTagError;
use clicktag::services::{ClickDescriptor, TaggingOutcome, TaggingPipeline, TaggingPolicy};

use common::{BackendCall, MockBackend, content, conversation, profile, session};

fn click(enterprise_id: Option<&str>, customer_id: Option<&str>) -> ClickDescriptor {
    ClickDescriptor {
        target_url: "https://example.com/offer".to_string(),
        enterprise_id: enterprise_id.map(String::from),
        customer_id: customer_id.map(String::from),
        label_name: Some("offer_clicked".to_string()),
        label_value: Some("spring".to_string()),
    }
}

fn pipeline(backend: Arc<MockBackend>, policy: TaggingPolicy) -> TaggingPipeline {
    TaggingPipeline::new(backend as Arc<dyn TaggingBackend>, policy)
}

#[tokio::test]
async fn test_labels_latest_interaction() {
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("e1", "p1", "c1"))
            .with_sessions(vec![session(
                "s1",
                "c1",
                vec![conversation("cv1", "2024-05-01T10:00:00.000Z", &content("I1", "N1"))],
            )]),
    );

    let outcome = pipeline(backend.clone(), TaggingPolicy::default())
        .run(&click(Some("e1"), Some("p1")))
        .await;

    match &outcome {
        TaggingOutcome::Labeled {
            session_id,
            interaction_id,
            ..
        } => {
            assert_eq!(session_id, "s1");
            assert_eq!(interaction_id, "I1");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let labels = backend.labels();
    assert_eq!(labels.len(), 1);
    let label = &labels[0];
    assert_eq!(label.interaction_id, "I1");
    assert_eq!(label.node_id.as_deref(), Some("N1"));
    assert_eq!(label.conversation_id, "cv1");
    assert_eq!(label.label.as_deref(), Some("offer_clicked"));
    assert_eq!(label.value.as_deref(), Some("spring"));
    assert_eq!(label.label_type, "DATA_POINT");
    assert_eq!(label.enterprise_id, "e1");
    assert_eq!(label.mode, "TEST");
    assert_eq!(label.workspace_id.as_deref(), Some("w1"));
    assert_eq!(label.flow_id.as_deref(), Some("f1"));
    assert!(uuid::Uuid::parse_str(&label.label_id).is_ok());
}

#[tokio::test]
async fn test_profile_lookup_uses_policy_mode_and_channel() {
    let backend = Arc::new(MockBackend::new());
    let policy = TaggingPolicy {
        mode: "LIVE".to_string(),
        channel: "SMS".to_string(),
        ..TaggingPolicy::default()
    };

    let outcome = pipeline(backend.clone(), policy)
        .run(&click(Some("e1"), Some("p1")))
        .await;
    assert!(matches!(outcome, TaggingOutcome::IdentityUnresolved));

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        BackendCall::GetProfile(key) => {
            assert_eq!(key.enterprise_id, "e1");
            assert_eq!(key.profile_id, "p1");
            assert_eq!(key.mode, "LIVE");
            assert_eq!(key.channel, "SMS");
        }
        other => panic!("unexpected call: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_identifiers_make_no_calls() {
    let backend = Arc::new(MockBackend::new().with_profile(profile("e1", "p1", "c1")));
    let p = pipeline(backend.clone(), TaggingPolicy::default());

    assert!(matches!(
        p.run(&click(None, Some("p1"))).await,
        TaggingOutcome::IdentityUnresolved
    ));
    assert!(matches!(
        p.run(&click(Some("e1"), None)).await,
        TaggingOutcome::IdentityUnresolved
    ));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_profile_error_degrades_to_unresolved() {
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("e1", "p1", "c1"))
            .failing_profile(ClickTagError::timeout("slow backend")),
    );

    let outcome = pipeline(backend.clone(), TaggingPolicy::default())
        .run(&click(Some("e1"), Some("p1")))
        .await;

    assert!(matches!(outcome, TaggingOutcome::IdentityUnresolved));
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn test_sessions_are_searched_by_profile_customer_id() {
    let backend = Arc::new(MockBackend::new().with_profile(profile("e1", "p1", "c-linked")));

    let outcome = pipeline(backend.clone(), TaggingPolicy::default())
        .run(&click(Some("e1"), Some("p1")))
        .await;
    assert!(matches!(outcome, TaggingOutcome::SessionUnresolved));

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    match &calls[1] {
        BackendCall::SearchSessions(query) => {
            assert_eq!(query.enterprise_id, "e1");
            assert_eq!(query.customer_id, "c-linked");
            assert_eq!(query.mode, "TEST");
            assert_eq!(query.conversation_window, 20);
        }
        other => panic!("unexpected call: {:?}", other),
    }
}

#[tokio::test]
async fn test_profile_without_customer_id_stops_pipeline() {
    let mut unlinked = profile("e1", "p1", "c1");
    unlinked.customer = None;
    unlinked.customer_id = None;
    let backend = Arc::new(MockBackend::new().with_profile(unlinked));

    let outcome = pipeline(backend.clone(), TaggingPolicy::default())
        .run(&click(Some("e1"), Some("p1")))
        .await;

    assert!(matches!(outcome, TaggingOutcome::IdentityUnresolved));
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn test_session_error_degrades_to_unresolved() {
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("e1", "p1", "c1"))
            .failing_sessions(ClickTagError::backend_status("HTTP 502")),
    );

    let outcome = pipeline(backend.clone(), TaggingPolicy::default())
        .run(&click(Some("e1"), Some("p1")))
        .await;

    assert!(matches!(outcome, TaggingOutcome::SessionUnresolved));
    assert!(backend.labels().is_empty());
}

#[tokio::test]
async fn test_first_session_is_selected() {
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("e1", "p1", "c1"))
            .with_sessions(vec![
                session(
                    "newest",
                    "c1",
                    vec![conversation("cv-new", "2024-05-01T09:00:00Z", &content("I-new", "N"))],
                ),
                session(
                    "older",
                    "c1",
                    vec![conversation("cv-old", "2024-05-02T09:00:00Z", &content("I-old", "N"))],
                ),
            ]),
    );

    pipeline(backend.clone(), TaggingPolicy::default())
        .run(&click(Some("e1"), Some("p1")))
        .await;

    let labels = backend.labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].session_id, "newest");
    assert_eq!(labels[0].interaction_id, "I-new");
}

#[tokio::test]
async fn test_scans_for_true_latest_conversation() {
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("e1", "p1", "c1"))
            .with_sessions(vec![session(
                "s1",
                "c1",
                vec![
                    conversation("t1", "2024-05-01T10:00:00Z", &content("I1", "N1")),
                    conversation("t3", "2024-05-01T12:00:00Z", &content("I3", "N3")),
                    conversation("t2", "2024-05-01T11:00:00Z", &content("I2", "N2")),
                ],
            )]),
    );

    pipeline(backend.clone(), TaggingPolicy::default())
        .run(&click(Some("e1"), Some("p1")))
        .await;

    let labels = backend.labels();
    assert_eq!(labels[0].conversation_id, "t3");
    assert_eq!(labels[0].interaction_id, "I3");
    assert_eq!(labels[0].node_id.as_deref(), Some("N3"));
}

#[tokio::test]
async fn test_no_label_without_interaction() {
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("e1", "p1", "c1"))
            .with_sessions(vec![session(
                "s1",
                "c1",
                vec![
                    conversation("old", "2024-05-01T10:00:00Z", &content("I1", "N1")),
                    conversation("new", "2024-05-01T11:00:00Z", r#"{"text":"no ids"}"#),
                ],
            )]),
    );

    let outcome = pipeline(backend.clone(), TaggingPolicy::default())
        .run(&click(Some("e1"), Some("p1")))
        .await;

    assert!(matches!(outcome, TaggingOutcome::InteractionUnresolved));
    assert!(backend.labels().is_empty());
}

#[tokio::test]
async fn test_empty_conversation_window() {
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("e1", "p1", "c1"))
            .with_sessions(vec![session("s1", "c1", vec![])]),
    );

    let outcome = pipeline(backend.clone(), TaggingPolicy::default())
        .run(&click(Some("e1"), Some("p1")))
        .await;

    assert!(matches!(outcome, TaggingOutcome::InteractionUnresolved));
}

#[tokio::test]
async fn test_next_node_match_policy() {
    // session 的 nextNodeId 为 N2
    let conversations = vec![
        conversation("match", "2024-05-01T10:00:00Z", &content("I-match", "N2")),
        conversation("later", "2024-05-01T11:00:00Z", &content("I-later", "N9")),
    ];
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("e1", "p1", "c1"))
            .with_sessions(vec![session("s1", "c1", conversations)]),
    );
    let policy = TaggingPolicy {
        require_next_node_match: true,
        ..TaggingPolicy::default()
    };

    pipeline(backend.clone(), policy)
        .run(&click(Some("e1"), Some("p1")))
        .await;

    let labels = backend.labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].interaction_id, "I-match");
}

#[tokio::test]
async fn test_next_node_match_without_next_node() {
    let mut s = session(
        "s1",
        "c1",
        vec![conversation("cv1", "2024-05-01T10:00:00Z", &content("I1", "N1"))],
    );
    s.next_node_id = None;
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("e1", "p1", "c1"))
            .with_sessions(vec![s]),
    );
    let policy = TaggingPolicy {
        require_next_node_match: true,
        ..TaggingPolicy::default()
    };

    let outcome = pipeline(backend.clone(), policy)
        .run(&click(Some("e1"), Some("p1")))
        .await;

    assert!(matches!(outcome, TaggingOutcome::InteractionUnresolved));
    assert!(backend.labels().is_empty());
}

#[tokio::test]
async fn test_label_write_failure_is_reported_not_raised() {
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("e1", "p1", "c1"))
            .with_sessions(vec![session(
                "s1",
                "c1",
                vec![conversation("cv1", "2024-05-01T10:00:00Z", &content("I1", "N1"))],
            )])
            .failing_label(ClickTagError::backend_response("ConditionalCheckFailed")),
    );

    let outcome = pipeline(backend.clone(), TaggingPolicy::default())
        .run(&click(Some("e1"), Some("p1")))
        .await;

    match outcome {
        TaggingOutcome::WriteFailed { label_id, error } => {
            assert!(!label_id.is_empty());
            assert!(matches!(error, ClickTagError::BackendResponse(_)));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(backend.labels().len(), 1);
}
