pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use rest::{
    create_session_handler, get_settings_handler, put_api_key_handler, put_model_handler, ApiDoc,
};
pub use state::AppState;
pub use ws_handler::ws_handler;

/// All API routes plus the Swagger UI. Layers such as CORS are added by the binary.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/sessions", post(create_session_handler))
        .route("/settings", get(get_settings_handler))
        .route("/settings/api-key", put(put_api_key_handler))
        .route("/settings/model", put(put_model_handler))
        .route("/ws", get(ws_handler))
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
