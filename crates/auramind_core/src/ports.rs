//! crates/auramind_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the tutor's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete AI endpoint and settings medium.

use async_trait::async_trait;

/// Shown verbatim when no credential could be resolved.
pub const CREDENTIAL_MISSING_MESSAGE: &str =
    "API key not found. Please add your Gemini API key in Settings.";

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., storage, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// No credential is configured; raised before any network call.
    #[error("{}", CREDENTIAL_MISSING_MESSAGE)]
    MissingCredential,
    /// The AI endpoint answered with a non-success status. Carries the body text.
    #[error("API Error: {0}")]
    Api(String),
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait GenerativeModelService: Send + Sync {
    /// Performs one `generateContent` exchange and returns the first candidate's text.
    ///
    /// Each entry of `parts` becomes its own content element of the request.
    async fn generate_content(
        &self,
        model: &str,
        credential: &str,
        parts: &[String],
    ) -> PortResult<String>;
}

/// Durable key-value storage for user settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;
}
