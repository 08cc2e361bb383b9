//! crates/auramind_core/src/transport.rs
//!
//! A single request/response exchange with the generative model.

use crate::ports::{GenerativeModelService, PortError, PortResult};
use tracing::debug;

/// Sends `parts` to `model`. An absent credential fails before the service is touched.
pub async fn send(
    service: &dyn GenerativeModelService,
    model: &str,
    credential: Option<&str>,
    parts: &[String],
) -> PortResult<String> {
    let credential = credential.ok_or(PortError::MissingCredential)?;
    debug!(model, parts = parts.len(), "Sending generateContent request");
    service.generate_content(model, credential, parts).await
}
