//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the tutoring session.

use auramind_core::{
    AnalysisResult, Blueprint, ChatMessage, Concept, ReasoningEntry, SessionEvent,
    VideoReference,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Claims a session created over REST. This must be the first message sent on the connection.
    Init { session_id: Uuid },

    /// A chat question. Mentioning a diagram turns it into a diagram request.
    SendMessage { text: String },

    /// Asks for a diagram of `concept`.
    RequestDiagram { concept: String },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms successful session initialization.
    SessionInitialized {
        session_id: Uuid,
        video_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        video_id: Option<String>,
    },

    /// A new line in the thinking feed.
    Reasoning {
        id: Uuid,
        kind: String,
        content: String,
        timestamp: DateTime<Utc>,
    },

    /// A new conversation message from either side.
    Message { id: Uuid, role: String, content: String },

    /// A diagram was added to the gallery.
    Blueprint {
        id: Uuid,
        title: String,
        description: Option<String>,
        elements: Option<Vec<String>>,
        relationships: Option<Vec<String>>,
        visual_prompt: Option<String>,
        created_at: DateTime<Utc>,
    },

    /// The one-time video analysis finished.
    AnalysisReady {
        summary: Option<String>,
        concepts: Option<Vec<ConceptView>>,
        topics: Option<Vec<String>>,
    },

    /// Whether any request is outstanding. The UI shows a spinner while `true`.
    Processing { active: bool },

    /// Reports an error to the client, which should display an error message.
    Error { message: String },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ConceptView {
    pub time: f64,
    pub concept: String,
}

impl From<&Concept> for ConceptView {
    fn from(c: &Concept) -> Self {
        Self {
            time: c.time,
            concept: c.concept.clone(),
        }
    }
}

impl ServerMessage {
    pub fn session_initialized(session_id: Uuid, video: &VideoReference) -> Self {
        ServerMessage::SessionInitialized {
            session_id,
            video_type: video.source_label().to_string(),
            video_id: video.video_id().map(str::to_string),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    fn reasoning(entry: ReasoningEntry) -> Self {
        ServerMessage::Reasoning {
            id: entry.id,
            kind: entry.kind.as_str().to_string(),
            content: entry.content,
            timestamp: entry.timestamp,
        }
    }

    fn message(message: ChatMessage) -> Self {
        ServerMessage::Message {
            id: message.id,
            role: message.role.as_str().to_string(),
            content: message.content,
        }
    }

    fn blueprint(blueprint: Blueprint) -> Self {
        let diagram = blueprint.diagram;
        ServerMessage::Blueprint {
            id: blueprint.id,
            title: blueprint.title,
            description: diagram.description,
            elements: diagram.elements,
            relationships: diagram.relationships,
            visual_prompt: diagram.visual_prompt,
            created_at: blueprint.created_at,
        }
    }

    fn analysis_ready(analysis: AnalysisResult) -> Self {
        ServerMessage::AnalysisReady {
            concepts: analysis
                .concepts
                .as_ref()
                .map(|cs| cs.iter().map(ConceptView::from).collect()),
            summary: analysis.summary,
            topics: analysis.topics,
        }
    }
}

impl From<SessionEvent> for ServerMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Reasoning(entry) => ServerMessage::reasoning(entry),
            SessionEvent::Message(message) => ServerMessage::message(message),
            SessionEvent::Blueprint(blueprint) => ServerMessage::blueprint(blueprint),
            SessionEvent::AnalysisReady(analysis) => ServerMessage::analysis_ready(analysis),
            SessionEvent::Processing(active) => ServerMessage::Processing { active },
        }
    }
}
