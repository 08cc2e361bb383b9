//! Session orchestrator integration tests.

mod common;

use auramind_core::{
    AnalysisResult, Concept, PortError, ReasoningKind, Role, SessionEvent, SessionState,
    TutorSession, VideoReference, CREDENTIAL_MISSING_MESSAGE,
};
use common::{resolver_with_key, FixedModel, GatedModel};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn youtube() -> VideoReference {
    VideoReference::from_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .expect("valid url")
}

fn upload() -> VideoReference {
    VideoReference::Upload {
        file_name: "lecture.mp4".to_string(),
    }
}

fn assistant_messages(state: &SessionState) -> Vec<String> {
    state
        .conversation
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.content.clone())
        .collect()
}

fn reasoning_kinds(state: &SessionState) -> Vec<ReasoningKind> {
    state.reasoning.iter().map(|r| r.kind).collect()
}

#[tokio::test]
async fn missing_credential_answers_without_network_call() {
    let model = FixedModel::text("never used");
    let (session, _events) = TutorSession::new(upload(), model.clone(), resolver_with_key(None));

    session.send_message("What is a monad?").await;

    let state = session.snapshot().await;
    assert_eq!(state.conversation.len(), 2);
    assert_eq!(state.conversation[0].role, Role::User);
    assert_eq!(assistant_messages(&state), vec![CREDENTIAL_MISSING_MESSAGE.to_string()]);
    assert!(model.calls().is_empty());
    assert_eq!(reasoning_kinds(&state), vec![ReasoningKind::Thinking]);
    assert!(!state.is_processing());
}

#[tokio::test]
async fn rate_limited_chat_surfaces_api_error() {
    let model = FixedModel::failing(PortError::Api("rate limited".to_string()));
    let (session, _events) = TutorSession::new(youtube(), model, resolver_with_key(Some("k")));

    session.send_message("Explain the intro").await;

    let state = session.snapshot().await;
    let replies = assistant_messages(&state);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Sorry, I encountered an error: API Error: rate limited"));
    assert!(!state
        .reasoning
        .iter()
        .any(|r| matches!(r.kind, ReasoningKind::Insight | ReasoningKind::Conclusion)));
    assert!(state.analysis.is_none());
    assert!(state.blueprints.is_empty());
}

#[tokio::test]
async fn failed_analysis_appends_one_message_and_no_insight() {
    let model = FixedModel::failing(PortError::Transport("connection reset".to_string()));
    let (session, _events) = TutorSession::new(youtube(), model, resolver_with_key(Some("k")));

    assert!(session.start().await);

    let state = session.snapshot().await;
    assert_eq!(
        assistant_messages(&state),
        vec!["Sorry, I encountered an error: connection reset".to_string()]
    );
    assert_eq!(reasoning_kinds(&state), vec![ReasoningKind::Thinking]);
    assert!(state.analysis.is_none());
}

#[tokio::test]
async fn successful_chat_follows_the_script() {
    let model = FixedModel::text("Ownership moves values.");
    let (session, _events) =
        TutorSession::new(upload(), model.clone(), resolver_with_key(Some("secret")));

    session.send_message("What is ownership?").await;

    let state = session.snapshot().await;
    assert_eq!(
        reasoning_kinds(&state),
        vec![
            ReasoningKind::Thinking,
            ReasoningKind::Analyzing,
            ReasoningKind::Insight,
            ReasoningKind::Conclusion
        ]
    );
    assert_eq!(assistant_messages(&state), vec!["Ownership moves values.".to_string()]);

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "gemini-pro");
    assert_eq!(calls[0].credential, "secret");
    assert!(!calls[0].parts[0].contains("ID:"));
    assert_eq!(calls[0].parts[1], "What is ownership?");
}

#[tokio::test]
async fn empty_reply_uses_canned_fallback() {
    let model = FixedModel::text("   ");
    let (session, _events) = TutorSession::new(upload(), model, resolver_with_key(Some("k")));

    session.send_message("hello?").await;

    let state = session.snapshot().await;
    assert_eq!(
        assistant_messages(&state),
        vec!["I'm here to help! Ask me anything about the video.".to_string()]
    );
}

#[tokio::test]
async fn analysis_runs_once_and_feeds_chat_context() {
    let model = FixedModel::text(
        r#"Here you go: {"summary":"S","concepts":[{"time":5,"concept":"C"}]}"#,
    );
    let (session, _events) =
        TutorSession::new(youtube(), model.clone(), resolver_with_key(Some("k")));

    assert!(session.start().await);
    assert!(!session.start().await);
    assert_eq!(model.calls().len(), 1);

    let state = session.snapshot().await;
    assert_eq!(
        state.analysis,
        Some(AnalysisResult {
            summary: Some("S".to_string()),
            concepts: Some(vec![Concept {
                time: 5.0,
                concept: "C".to_string()
            }]),
            topics: None,
        })
    );
    assert_eq!(state.reasoning[2].content, "Found 1 key concepts");
    assert_eq!(assistant_messages(&state), vec!["S".to_string()]);

    session.send_message("Tell me more about C").await;
    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].parts[0].contains("a youtube (ID: dQw4w9WgXcQ)"));
    assert!(calls[1].parts[0].contains("Video summary: S"));
}

#[tokio::test]
async fn uploads_skip_automatic_analysis() {
    let model = FixedModel::text("unused");
    let (session, _events) = TutorSession::new(upload(), model.clone(), resolver_with_key(Some("k")));

    assert!(!session.start().await);
    assert!(model.calls().is_empty());
    assert!(session.snapshot().await.reasoning.is_empty());
}

#[tokio::test]
async fn diagram_keyword_routes_to_gallery() {
    let model = FixedModel::text(
        r#"```json {"description":"Boxes and arrows","elements":["parser","lexer"],"visualPrompt":"draw a pipeline"} ```"#,
    );
    let (session, _events) =
        TutorSession::new(upload(), model.clone(), resolver_with_key(Some("k")));

    session.send_message("Show me a diagram of the pipeline").await;

    let state = session.snapshot().await;
    assert_eq!(state.blueprints.len(), 1);
    let blueprint = &state.blueprints[0];
    assert_eq!(blueprint.title, "Show me a diagram of the pipeline");
    assert_eq!(blueprint.diagram.visual_prompt.as_deref(), Some("draw a pipeline"));
    assert!(assistant_messages(&state)[0].contains("Boxes and arrows"));
    assert!(model.calls()[0].parts[0].contains("Generate a detailed visual diagram description"));
}

#[tokio::test]
async fn explicit_diagram_request_without_description_uses_fallback() {
    let model = FixedModel::text(r#"{"elements":["a"]}"#);
    let (session, _events) = TutorSession::new(upload(), model, resolver_with_key(Some("k")));

    session.request_diagram("binary search").await;

    let state = session.snapshot().await;
    assert_eq!(state.conversation[0].content, "binary search");
    assert!(assistant_messages(&state)[0].starts_with("I've prepared a diagram concept"));
    assert_eq!(state.blueprints.len(), 1);
}

#[tokio::test]
async fn concurrent_sends_settle_in_arrival_order() {
    let model = Arc::new(GatedModel::default());
    let first = model.gate("first question");
    let second = model.gate("second question");
    let (session, _events) =
        TutorSession::new(upload(), model.clone(), resolver_with_key(Some("k")));

    let first_handle = session.spawn_send_message("first question".to_string());
    let second_handle = session.spawn_send_message("second question".to_string());

    second.send("answer two".to_string()).expect("second gate open");
    second_handle.await.expect("second task");
    assert!(session.is_processing().await);

    first.send("answer one".to_string()).expect("first gate open");
    first_handle.await.expect("first task");

    let state = session.snapshot().await;
    assert_eq!(state.conversation.len(), 4);
    assert_eq!(
        state
            .conversation
            .iter()
            .filter(|m| m.role == Role::User)
            .count(),
        2
    );
    assert_eq!(
        assistant_messages(&state),
        vec!["answer two".to_string(), "answer one".to_string()]
    );
    assert!(!state.is_processing());
}

#[tokio::test]
async fn shutdown_aborts_outstanding_requests() {
    let model = Arc::new(GatedModel::default());
    let held = model.gate("never answered");
    let (session, _events) =
        TutorSession::new(upload(), model.clone(), resolver_with_key(Some("k")));

    let handle = session.spawn_send_message("never answered".to_string());
    while model.started() < 1 {
        tokio::task::yield_now().await;
    }
    session.shutdown().await;
    handle.await.expect("task finishes after cancellation");

    let late = session.spawn_send_message("after teardown".to_string());
    late.await.expect("late task");

    let state = session.snapshot().await;
    assert!(session.is_shut_down());
    assert_eq!(state.conversation.len(), 1);
    assert!(assistant_messages(&state).is_empty());
    assert!(!state.is_processing());
    drop(held);
}

#[tokio::test]
async fn direct_calls_after_shutdown_are_ignored() {
    let model = FixedModel::text(r#"{"summary":"S"}"#);
    let (session, _events) =
        TutorSession::new(youtube(), model.clone(), resolver_with_key(Some("k")));

    session.shutdown().await;
    assert!(!session.start().await);
    session.send_message("after teardown").await;
    session.request_diagram("a diagram after teardown").await;

    let state = session.snapshot().await;
    assert!(model.calls().is_empty());
    assert!(state.conversation.is_empty());
    assert!(state.reasoning.is_empty());
    assert!(state.analysis.is_none());
    assert!(!state.is_processing());
}

#[tokio::test]
async fn events_mirror_the_request_lifecycle() {
    let model = FixedModel::text("42");
    let (session, mut events) = TutorSession::new(upload(), model, resolver_with_key(Some("k")));

    session.send_message("meaning of life").await;

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert!(matches!(received.first(), Some(SessionEvent::Message(m)) if m.role == Role::User));
    assert!(matches!(received.get(1), Some(SessionEvent::Processing(true))));
    assert!(matches!(received.last(), Some(SessionEvent::Processing(false))));
    let messages = received
        .iter()
        .filter(|e| matches!(e, SessionEvent::Message(_)))
        .count();
    assert_eq!(messages, 2);
}
