//! crates/auramind_core/src/tutor.rs
//!
//! The session orchestrator. Each user action runs one request through
//! building → sent → interpreting → settled, and turns the outcome into
//! appends on the session's conversation, reasoning feed and gallery.
//!
//! Requests are not serialized against each other: two sends issued back to
//! back both run, and their results land in whatever order the model answers.

use crate::domain::{
    AnalysisResult, Blueprint, ChatMessage, ReasoningEntry, Role, VideoReference,
};
use crate::interpret::{interpret_analysis, interpret_diagram};
use crate::ports::{GenerativeModelService, PortError, PortResult, CREDENTIAL_MISSING_MESSAGE};
use crate::prompts::{build_prompt, PromptTask};
use crate::reasoning::{self, ScriptLine, ScriptedTask};
use crate::settings::ConfigResolver;
use crate::transport;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

const APOLOGY_PREFIX: &str = "Sorry, I encountered an error: ";
const CHAT_ERROR_HINT: &str = ". Please make sure your Gemini API key is set in Settings.";
const CHAT_FALLBACK: &str = "I'm here to help! Ask me anything about the video.";
const ANALYSIS_FALLBACK: &str = "I've analyzed the video. Ask me anything about it!";
const DIAGRAM_FALLBACK: &str = "I've prepared a diagram concept for you. The visual representation would show the key relationships and elements we discussed.";

/// Words that turn a chat message into a diagram request.
const DIAGRAM_KEYWORDS: [&str; 3] = ["diagram", "visual", "generate"];

//=========================================================================================
// Session Events and State
//=========================================================================================

/// Everything a presentation layer needs to mirror the session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Reasoning(ReasoningEntry),
    Message(ChatMessage),
    Blueprint(Blueprint),
    AnalysisReady(AnalysisResult),
    Processing(bool),
}

/// Where a single request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Building,
    Sent,
    Interpreting,
    Settled(Settlement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Success,
    Error,
    Cancelled,
}

/// The session's view state. Lists are append-only.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub conversation: Vec<ChatMessage>,
    pub reasoning: Vec<ReasoningEntry>,
    pub analysis: Option<AnalysisResult>,
    pub blueprints: Vec<Blueprint>,
    pub analysis_started: bool,
    pub pending: usize,
}

impl SessionState {
    pub fn is_processing(&self) -> bool {
        self.pending > 0
    }
}

struct RequestTracker {
    id: Uuid,
    task: ScriptedTask,
    phase: RequestPhase,
}

impl RequestTracker {
    fn new(task: ScriptedTask) -> Self {
        Self {
            id: Uuid::new_v4(),
            task,
            phase: RequestPhase::Idle,
        }
    }

    fn advance(&mut self, phase: RequestPhase) {
        debug!(request = %self.id, task = ?self.task, from = ?self.phase, to = ?phase, "Request phase change");
        self.phase = phase;
    }
}

//=========================================================================================
// TutorSession
//=========================================================================================

/// One tutoring session bound to a single video reference.
///
/// Cloning is cheap; clones share the same state, event channel and cancellation token.
#[derive(Clone)]
pub struct TutorSession {
    inner: Arc<TutorInner>,
}

struct TutorInner {
    video: VideoReference,
    model_service: Arc<dyn GenerativeModelService>,
    resolver: ConfigResolver,
    state: Mutex<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
    cancellation_token: CancellationToken,
}

impl TutorSession {
    pub fn new(
        video: VideoReference,
        model_service: Arc<dyn GenerativeModelService>,
        resolver: ConfigResolver,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let session = Self {
            inner: Arc::new(TutorInner {
                video,
                model_service,
                resolver,
                state: Mutex::new(SessionState::default()),
                events,
                cancellation_token: CancellationToken::new(),
            }),
        };
        (session, events_rx)
    }

    pub fn video(&self) -> &VideoReference {
        &self.inner.video
    }

    pub async fn snapshot(&self) -> SessionState {
        self.inner.state.lock().await.clone()
    }

    pub async fn is_processing(&self) -> bool {
        self.inner.state.lock().await.is_processing()
    }

    /// Runs the one-time video analysis. Returns `false` when nothing was started,
    /// either because the video has no external id or analysis already ran.
    pub async fn start(&self) -> bool {
        if self.is_shut_down() {
            return false;
        }
        let Some(video_id) = self.inner.video.video_id().map(str::to_string) else {
            debug!("Uploaded video; skipping automatic analysis.");
            return false;
        };
        {
            let mut state = self.inner.state.lock().await;
            if state.analysis_started {
                return false;
            }
            state.analysis_started = true;
        }
        info!("Starting analysis for video {}", video_id);

        let Some(mut tracker) = self.begin(ScriptedTask::Analysis, None).await else {
            return false;
        };
        let Some(result) = self
            .exchange(&mut tracker, &PromptTask::Analyze { video_id })
            .await
        else {
            self.abandon(&mut tracker).await;
            return true;
        };

        match result {
            Ok(raw) => {
                tracker.advance(RequestPhase::Interpreting);
                let analysis = interpret_analysis(&raw);
                let reply = analysis
                    .summary
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| ANALYSIS_FALLBACK.to_string());
                let script = reasoning::on_success(ScriptedTask::Analysis, Some(&analysis));
                self.settle_success(&mut tracker, script, reply, move |state| {
                    state.analysis = Some(analysis.clone());
                    Some(SessionEvent::AnalysisReady(analysis))
                })
                .await;
            }
            Err(e) => self.settle_error(&mut tracker, e).await,
        }
        true
    }

    /// Appends the user's message and answers it, as a diagram when the text asks for one.
    pub async fn send_message(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring empty chat message.");
            return;
        }
        if !self.append_user_message(text).await {
            return;
        }

        if wants_diagram(text) {
            self.run_diagram(text).await;
        } else {
            self.run_chat(text).await;
        }
    }

    /// Explicit diagram request for `concept`.
    pub async fn request_diagram(&self, concept: &str) {
        let concept = concept.trim();
        if concept.is_empty() {
            debug!("Ignoring empty diagram request.");
            return;
        }
        if !self.append_user_message(concept).await {
            return;
        }
        self.run_diagram(concept).await;
    }

    //-------------------------------------------------------------------------------------
    // Background execution
    //-------------------------------------------------------------------------------------

    pub fn spawn_start(&self) -> JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move {
            session.start().await;
        })
    }

    pub fn spawn_send_message(&self, text: String) -> JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move { session.send_message(&text).await })
    }

    pub fn spawn_request_diagram(&self, concept: String) -> JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move { session.request_diagram(&concept).await })
    }

    /// Aborts all outstanding requests. Nothing is appended after this returns,
    /// and later calls to the entry points are no-ops.
    ///
    /// The token is cancelled under the state lock; every append checks it under
    /// the same lock.
    pub async fn shutdown(&self) {
        let _state = self.inner.state.lock().await;
        info!("Shutting down tutor session.");
        self.inner.cancellation_token.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancellation_token.is_cancelled()
    }

    //-------------------------------------------------------------------------------------
    // Request flows
    //-------------------------------------------------------------------------------------

    async fn run_chat(&self, message: &str) {
        let Some(mut tracker) = self.begin(ScriptedTask::Chat, Some(message)).await else {
            return;
        };
        let summary = self.cached_summary().await;
        let prompt = PromptTask::Chat {
            message: message.to_string(),
            video_id: self.inner.video.video_id().map(str::to_string),
            video_type: Some(self.inner.video.source_label().to_string()),
            summary,
        };

        let Some(result) = self.exchange(&mut tracker, &prompt).await else {
            self.abandon(&mut tracker).await;
            return;
        };
        match result {
            Ok(raw) => {
                tracker.advance(RequestPhase::Interpreting);
                let reply = if raw.trim().is_empty() {
                    CHAT_FALLBACK.to_string()
                } else {
                    raw
                };
                let script = reasoning::on_success(ScriptedTask::Chat, None);
                self.settle_success(&mut tracker, script, reply, |_| None)
                    .await;
            }
            Err(e) => self.settle_error(&mut tracker, e).await,
        }
    }

    async fn run_diagram(&self, concept: &str) {
        let Some(mut tracker) = self.begin(ScriptedTask::Diagram, Some(concept)).await else {
            return;
        };
        let prompt = PromptTask::Diagram {
            concept: concept.to_string(),
            context: self.cached_summary().await,
        };

        let Some(result) = self.exchange(&mut tracker, &prompt).await else {
            self.abandon(&mut tracker).await;
            return;
        };
        match result {
            Ok(raw) => {
                tracker.advance(RequestPhase::Interpreting);
                let diagram = interpret_diagram(&raw);
                let reply = match diagram.description.as_deref().filter(|d| !d.trim().is_empty()) {
                    Some(description) => format!(
                        "Here's a visual diagram description:\n\n{}\n\nI can help you create this visualization. Would you like me to generate it?",
                        description
                    ),
                    None => DIAGRAM_FALLBACK.to_string(),
                };
                let blueprint = Blueprint {
                    id: Uuid::new_v4(),
                    title: concept.to_string(),
                    diagram,
                    created_at: Utc::now(),
                };
                let script = reasoning::on_success(ScriptedTask::Diagram, None);
                self.settle_success(&mut tracker, script, reply, move |state| {
                    state.blueprints.push(blueprint.clone());
                    Some(SessionEvent::Blueprint(blueprint))
                })
                .await;
            }
            Err(e) => self.settle_error(&mut tracker, e).await,
        }
    }

    /// Resolves configuration, builds the prompt and performs the exchange.
    /// Returns `None` when the session is shut down first.
    async fn exchange(
        &self,
        tracker: &mut RequestTracker,
        prompt: &PromptTask,
    ) -> Option<PortResult<String>> {
        let work = async {
            let model = self.inner.resolver.resolve_model().await;
            let credential = self.inner.resolver.resolve_credential().await;
            let parts = build_prompt(prompt);

            tracker.advance(RequestPhase::Sent);
            transport::send(
                self.inner.model_service.as_ref(),
                &model,
                credential.as_deref(),
                &parts,
            )
            .await
        };

        tokio::select! {
            biased;
            _ = self.inner.cancellation_token.cancelled() => {
                debug!("Request cancelled by session shutdown.");
                None
            }
            result = work => Some(result),
        }
    }

    //-------------------------------------------------------------------------------------
    // State transitions
    //-------------------------------------------------------------------------------------

    /// Idle → building. The thinking line goes out before any network work.
    async fn begin(&self, task: ScriptedTask, user_text: Option<&str>) -> Option<RequestTracker> {
        let mut state = self.inner.state.lock().await;
        if self.is_shut_down() {
            return None;
        }
        let mut tracker = RequestTracker::new(task);
        tracker.advance(RequestPhase::Building);

        state.pending += 1;
        if state.pending == 1 {
            self.emit(SessionEvent::Processing(true));
        }
        for line in reasoning::on_start(task, user_text) {
            self.push_reasoning(&mut *state, line);
        }
        Some(tracker)
    }

    /// Appends the success script, the assistant reply and any task-specific state in one step.
    async fn settle_success<F>(
        &self,
        tracker: &mut RequestTracker,
        script: Vec<ScriptLine>,
        reply: String,
        apply: F,
    ) where
        F: FnOnce(&mut SessionState) -> Option<SessionEvent>,
    {
        let mut state = self.inner.state.lock().await;
        if self.is_shut_down() {
            self.finish(&mut *state);
            tracker.advance(RequestPhase::Settled(Settlement::Cancelled));
            return;
        }
        for line in script {
            self.push_reasoning(&mut *state, line);
        }
        if let Some(event) = apply(&mut *state) {
            self.emit(event);
        }
        self.push_message(&mut *state, ChatMessage::new(Role::Assistant, reply));
        self.finish(&mut *state);
        tracker.advance(RequestPhase::Settled(Settlement::Success));
    }

    async fn settle_error(&self, tracker: &mut RequestTracker, error: PortError) {
        warn!(task = ?tracker.task, "Request failed: {}", error);
        let content = error_message(tracker.task, &error);

        let mut state = self.inner.state.lock().await;
        if self.is_shut_down() {
            self.finish(&mut *state);
            tracker.advance(RequestPhase::Settled(Settlement::Cancelled));
            return;
        }
        self.push_message(&mut *state, ChatMessage::new(Role::Assistant, content));
        self.finish(&mut *state);
        tracker.advance(RequestPhase::Settled(Settlement::Error));
    }

    /// Releases a request that was cut short by shutdown. Appends nothing.
    async fn abandon(&self, tracker: &mut RequestTracker) {
        let mut state = self.inner.state.lock().await;
        self.finish(&mut *state);
        tracker.advance(RequestPhase::Settled(Settlement::Cancelled));
    }

    fn finish(&self, state: &mut SessionState) {
        state.pending = state.pending.saturating_sub(1);
        if state.pending == 0 {
            self.emit(SessionEvent::Processing(false));
        }
    }

    /// Returns `false` once the session is shut down.
    async fn append_user_message(&self, text: &str) -> bool {
        let mut state = self.inner.state.lock().await;
        if self.is_shut_down() {
            debug!("Session is shut down; ignoring new request.");
            return false;
        }
        self.push_message(&mut *state, ChatMessage::new(Role::User, text));
        true
    }

    async fn cached_summary(&self) -> Option<String> {
        let state = self.inner.state.lock().await;
        state.analysis.as_ref().and_then(|a| a.summary.clone())
    }

    fn push_reasoning(&self, state: &mut SessionState, (kind, content): ScriptLine) {
        let entry = ReasoningEntry::new(kind, content);
        state.reasoning.push(entry.clone());
        self.emit(SessionEvent::Reasoning(entry));
    }

    fn push_message(&self, state: &mut SessionState, message: ChatMessage) {
        state.conversation.push(message.clone());
        self.emit(SessionEvent::Message(message));
    }

    /// A closed receiver means the view is gone; the event is dropped.
    fn emit(&self, event: SessionEvent) {
        let _ = self.inner.events.send(event);
    }
}

fn wants_diagram(text: &str) -> bool {
    let lowered = text.to_lowercase();
    DIAGRAM_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// The single assistant message shown for a failed request.
pub fn error_message(task: ScriptedTask, error: &PortError) -> String {
    match (task, error) {
        (_, PortError::MissingCredential) => CREDENTIAL_MISSING_MESSAGE.to_string(),
        (ScriptedTask::Chat, e) => format!("{}{}{}", APOLOGY_PREFIX, e, CHAT_ERROR_HINT),
        (_, e) => format!("{}{}", APOLOGY_PREFIX, e),
    }
}
