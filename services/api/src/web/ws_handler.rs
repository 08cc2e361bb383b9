//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! It binds one `TutorSession` to the socket, forwards session events to the
//! client and dispatches client requests to the session.

use crate::{
    error::ApiError,
    web::{
        protocol::{ClientMessage, ServerMessage},
        state::AppState,
    },
};
use auramind_core::{PortError, SessionEvent, TutorSession, VideoReference};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");

    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    // --- 1. Initialization Phase ---
    let (session_id, video) = match initialize(&mut receiver, &app_state).await {
        Ok(Some(claimed)) => claimed,
        Ok(None) => {
            info!("Client disconnected before sending Init message.");
            return;
        }
        Err(e) => {
            warn!("Session initialization failed: {}", e);
            if let Err(e) = send_message(&ws_sender, &ServerMessage::error(init_failure_text(&e))).await {
                debug!("Could not report initialization failure: {}", e);
            }
            return;
        }
    };
    info!("Initializing session with ID: {}", session_id);

    let init_msg = ServerMessage::session_initialized(session_id, &video);
    let (session, events) = TutorSession::new(
        video,
        app_state.model_service.clone(),
        app_state.resolver.clone(),
    );
    if let Err(e) = send_message(&ws_sender, &init_msg).await {
        error!("Failed to send session initialized message: {}", e);
        session.shutdown().await;
        return;
    }

    let connection_token = CancellationToken::new();
    let forwarder = tokio::spawn(forward_events(
        events,
        ws_sender.clone(),
        connection_token.child_token(),
    ));
    session.spawn_start();

    // --- 2. Main Message Loop ---
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => handle_text_message(&text, &session, &ws_sender).await,
            Ok(Message::Close(_)) => {
                info!("Client sent close message.");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("{}", ApiError::from(e));
                break;
            }
        }
    }

    // --- 3. Cleanup ---
    session.shutdown().await;
    connection_token.cancel();
    if let Err(e) = forwarder.await {
        error!("Event forwarder panicked: {:?}", e);
    }
    info!("WebSocket connection for session {} closed.", session_id);
}

/// Waits for the `init` frame and claims its session. Control and binary frames
/// before it are skipped. `Ok(None)` means the client left first.
async fn initialize(
    receiver: &mut SplitStream<WebSocket>,
    app_state: &AppState,
) -> Result<Option<(Uuid, VideoReference)>, ApiError> {
    while let Some(msg) = receiver.next().await {
        match msg? {
            Message::Text(text) => {
                let session_id = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Init { session_id }) => session_id,
                    _ => {
                        return Err(ApiError::Protocol(
                            "Expected an init message.".to_string(),
                        ))
                    }
                };
                let video = app_state.claim_session(session_id).await?;
                return Ok(Some((session_id, video)));
            }
            Message::Close(_) => return Ok(None),
            _ => debug!("Skipping non-text frame before Init."),
        }
    }
    Ok(None)
}

fn init_failure_text(error: &ApiError) -> String {
    match error {
        ApiError::Port(PortError::NotFound(_)) => "Session not found.".to_string(),
        ApiError::Protocol(message) => message.clone(),
        _ => "Failed to initialize session.".to_string(),
    }
}

/// Pushes every session event to the socket until the connection goes away.
async fn forward_events(
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    ws_sender: WsSender,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                if let Err(e) = send_message(&ws_sender, &ServerMessage::from(event)).await {
                    warn!("Stopping event forwarding: {}", e);
                    break;
                }
            }
        }
    }
    debug!("Event forwarder finished.");
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message(text: &str, session: &TutorSession, ws_sender: &WsSender) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::SendMessage { text }) => {
            debug!("SendMessage received.");
            session.spawn_send_message(text);
        }
        Ok(ClientMessage::RequestDiagram { concept }) => {
            debug!("RequestDiagram received.");
            session.spawn_request_diagram(concept);
        }
        Ok(ClientMessage::Init { .. }) => {
            warn!("Received subsequent Init message, which is ignored.");
        }
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            if let Err(e) = send_message(ws_sender, &ServerMessage::error("Unrecognised message.")).await {
                debug!("Could not report bad message: {}", e);
            }
        }
    }
}

/// Serializes and sends one message.
async fn send_message(ws_sender: &WsSender, message: &ServerMessage) -> Result<(), ApiError> {
    let json = serde_json::to_string(message)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize server message: {}", e)))?;
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await?;
    Ok(())
}
