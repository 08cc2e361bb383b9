//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use auramind_core::{ConfigResolver, GenerativeModelService, PortError, PortResult, VideoReference};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub model_service: Arc<dyn GenerativeModelService>,
    pub resolver: ConfigResolver,
    /// Video references submitted over REST and not yet claimed by a WebSocket `init`.
    pub pending_sessions: Arc<Mutex<HashMap<Uuid, VideoReference>>>,
}

impl AppState {
    pub fn new(model_service: Arc<dyn GenerativeModelService>, resolver: ConfigResolver) -> Self {
        Self {
            model_service,
            resolver,
            pending_sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Stores `video` under a fresh session id.
    pub async fn register_session(&self, video: VideoReference) -> Uuid {
        let session_id = Uuid::new_v4();
        self.pending_sessions.lock().await.insert(session_id, video);
        session_id
    }

    /// Removes and returns the reference for `session_id`. A session can be claimed once.
    pub async fn claim_session(&self, session_id: Uuid) -> PortResult<VideoReference> {
        self.pending_sessions
            .lock()
            .await
            .remove(&session_id)
            .ok_or_else(|| PortError::NotFound(format!("session {}", session_id)))
    }
}
