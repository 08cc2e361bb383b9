//! crates/auramind_core/src/domain.rs
//!
//! Defines the pure, core data structures for the tutor.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single message in a tutoring conversation.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
        }
    }
}

/// Category of a line in the "thinking" feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningKind {
    Thinking,
    Analyzing,
    Insight,
    Conclusion,
}

impl ReasoningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningKind::Thinking => "thinking",
            ReasoningKind::Analyzing => "analyzing",
            ReasoningKind::Insight => "insight",
            ReasoningKind::Conclusion => "conclusion",
        }
    }
}

/// One synthetic line of the reasoning feed. Never mutated once appended.
#[derive(Debug, Clone)]
pub struct ReasoningEntry {
    pub id: Uuid,
    pub kind: ReasoningKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ReasoningEntry {
    pub fn new(kind: ReasoningKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Identifies the subject video of a tutoring session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoReference {
    /// A file the user uploaded directly.
    Upload { file_name: String },
    /// A video hosted on YouTube.
    YouTube { video_id: String, url: String },
}

impl VideoReference {
    /// The label of the reference's source kind.
    pub fn source_label(&self) -> &'static str {
        match self {
            VideoReference::Upload { .. } => "upload",
            VideoReference::YouTube { .. } => "youtube",
        }
    }

    /// The external platform identifier, if the video lives on one.
    pub fn video_id(&self) -> Option<&str> {
        match self {
            VideoReference::Upload { .. } => None,
            VideoReference::YouTube { video_id, .. } => Some(video_id),
        }
    }
}

/// A key concept found in the video, with its approximate position in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Concept {
    pub time: f64,
    pub concept: String,
}

/// Cached outcome of the one-time video analysis call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    pub summary: Option<String>,
    pub concepts: Option<Vec<Concept>>,
    pub topics: Option<Vec<String>>,
}

/// Structured description of a diagram for a concept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramResult {
    pub description: Option<String>,
    pub elements: Option<Vec<String>>,
    pub relationships: Option<Vec<String>>,
    pub visual_prompt: Option<String>,
}

/// A diagram kept in the session's gallery.
#[derive(Debug, Clone)]
pub struct Blueprint {
    pub id: Uuid,
    pub title: String,
    pub diagram: DiagramResult,
    pub created_at: DateTime<Utc>,
}

/// An AI model variant the user can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// Where the resolved credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Default,
    Stored,
    None,
}

/// What the settings view shows. Never carries the secret itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSnapshot {
    pub credential_source: CredentialSource,
    pub model: String,
}

impl SettingsSnapshot {
    pub fn has_credential(&self) -> bool {
        self.credential_source != CredentialSource::None
    }
}
