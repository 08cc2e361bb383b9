//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use auramind_core::{CredentialSource, PortError, VideoReference, AVAILABLE_MODELS};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_session_handler,
        get_settings_handler,
        put_api_key_handler,
        put_model_handler,
    ),
    components(
        schemas(
            CreateSessionRequest,
            CreateSessionResponse,
            SettingsResponse,
            ModelOptionResponse,
            ApiKeyRequest,
            ModelRequest,
        )
    ),
    tags(
        (name = "AuraMind API", description = "API endpoints for the AI video tutor.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Either a YouTube link or the name of an uploaded file.
#[derive(Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub youtube_url: Option<String>,
    pub file_name: Option<String>,
}

/// The response payload sent after successfully creating a session.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub video_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ModelOptionResponse {
    pub value: String,
    pub label: String,
    pub description: String,
}

/// Settings as shown to the user. The API key itself is never returned.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct SettingsResponse {
    pub has_api_key: bool,
    /// `default`, `stored` or `none`.
    pub api_key_source: String,
    pub model: String,
    pub available_models: Vec<ModelOptionResponse>,
}

#[derive(Deserialize, ToSchema)]
pub struct ApiKeyRequest {
    pub api_key: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ModelRequest {
    pub model: String,
}

fn port_error_response(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
        other => {
            error!("Request failed: {:?}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new tutoring session for a video.
///
/// The session is claimed by sending `init` with the returned id over `/ws`.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created successfully", body = CreateSessionResponse),
        (status = 400, description = "Missing or invalid video reference")
    )
)]
pub async fn create_session_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let video = match (payload.youtube_url, payload.file_name) {
        (Some(url), _) => VideoReference::from_youtube_url(&url).map_err(port_error_response)?,
        (None, Some(file_name)) if !file_name.trim().is_empty() => VideoReference::Upload {
            file_name: file_name.trim().to_string(),
        },
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "Either youtube_url or file_name is required".to_string(),
            ))
        }
    };

    let video_type = video.source_label().to_string();
    let video_id = video.video_id().map(str::to_string);
    let session_id = app_state.register_session(video).await;
    info!("Registered {} session {}", video_type, session_id);

    let response = CreateSessionResponse {
        session_id,
        video_type,
        video_id,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Current settings and the selectable model catalog.
#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Current settings", body = SettingsResponse)
    )
)]
pub async fn get_settings_handler(State(app_state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    let snapshot = app_state.resolver.settings_snapshot().await;
    let api_key_source = match snapshot.credential_source {
        CredentialSource::Default => "default",
        CredentialSource::Stored => "stored",
        CredentialSource::None => "none",
    };
    Json(SettingsResponse {
        has_api_key: snapshot.has_credential(),
        api_key_source: api_key_source.to_string(),
        model: snapshot.model,
        available_models: AVAILABLE_MODELS
            .iter()
            .map(|m| ModelOptionResponse {
                value: m.value.to_string(),
                label: m.label.to_string(),
                description: m.description.to_string(),
            })
            .collect(),
    })
}

/// Save the user's Gemini API key.
#[utoipa::path(
    put,
    path = "/settings/api-key",
    request_body = ApiKeyRequest,
    responses(
        (status = 204, description = "API key saved"),
        (status = 400, description = "Empty API key")
    )
)]
pub async fn put_api_key_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ApiKeyRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    app_state
        .resolver
        .save_credential(&payload.api_key)
        .await
        .map_err(port_error_response)?;
    info!("Stored a new Gemini API key.");
    Ok(StatusCode::NO_CONTENT)
}

/// Select the Gemini model used for subsequent requests.
#[utoipa::path(
    put,
    path = "/settings/model",
    request_body = ModelRequest,
    responses(
        (status = 204, description = "Model saved"),
        (status = 400, description = "Model is not in the catalog")
    )
)]
pub async fn put_model_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ModelRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    app_state
        .resolver
        .save_model(&payload.model)
        .await
        .map_err(port_error_response)?;
    info!("Model set to {}", payload.model.trim());
    Ok(StatusCode::NO_CONTENT)
}
