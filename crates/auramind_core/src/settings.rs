//! crates/auramind_core/src/settings.rs
//!
//! Resolves which model and credential a request uses, preferring persisted
//! user choices over deployment defaults where appropriate.

use crate::domain::{CredentialSource, ModelOption, SettingsSnapshot};
use crate::ports::{PortError, PortResult, SettingsStore};
use std::sync::Arc;
use tracing::warn;

pub const CREDENTIAL_KEY: &str = "gemini_api_key";
pub const MODEL_KEY: &str = "gemini_model";
pub const DEFAULT_MODEL: &str = "gemini-pro";

pub const AVAILABLE_MODELS: &[ModelOption] = &[
    ModelOption {
        value: "gemini-pro",
        label: "Gemini Pro",
        description: "Standard model for general tasks",
    },
    ModelOption {
        value: "gemini-1.5-flash",
        label: "Gemini 1.5 Flash",
        description: "Fast and efficient model",
    },
    ModelOption {
        value: "gemini-1.5-pro",
        label: "Gemini 1.5 Pro",
        description: "Advanced reasoning model (if available)",
    },
];

/// Looks up a model in the catalog.
pub fn find_model(value: &str) -> Option<&'static ModelOption> {
    AVAILABLE_MODELS.iter().find(|m| m.value == value)
}

#[derive(Clone)]
pub struct ConfigResolver {
    default_credential: Option<String>,
    store: Arc<dyn SettingsStore>,
}

impl ConfigResolver {
    /// `default_credential` is the deployment-provided key (e.g. `GEMINI_API_KEY`).
    pub fn new(default_credential: Option<String>, store: Arc<dyn SettingsStore>) -> Self {
        Self {
            default_credential: default_credential.filter(|k| !k.trim().is_empty()),
            store,
        }
    }

    /// Default first, then the stored key, else absent.
    pub async fn resolve_credential(&self) -> Option<String> {
        self.resolve_credential_with_source().await.0
    }

    /// Stored choice first, then [`DEFAULT_MODEL`].
    pub async fn resolve_model(&self) -> String {
        self.read(MODEL_KEY)
            .await
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub async fn save_credential(&self, credential: &str) -> PortResult<()> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(PortError::InvalidInput(
                "Please enter a valid API key".to_string(),
            ));
        }
        self.store.set(CREDENTIAL_KEY, credential).await
    }

    pub async fn save_model(&self, model: &str) -> PortResult<()> {
        let option = find_model(model.trim())
            .ok_or_else(|| PortError::InvalidInput(format!("Unknown model '{}'", model)))?;
        self.store.set(MODEL_KEY, option.value).await
    }

    pub async fn settings_snapshot(&self) -> SettingsSnapshot {
        let (_, credential_source) = self.resolve_credential_with_source().await;
        SettingsSnapshot {
            credential_source,
            model: self.resolve_model().await,
        }
    }

    async fn resolve_credential_with_source(&self) -> (Option<String>, CredentialSource) {
        if let Some(key) = &self.default_credential {
            return (Some(key.clone()), CredentialSource::Default);
        }
        match self.read(CREDENTIAL_KEY).await {
            Some(key) => (Some(key), CredentialSource::Stored),
            None => (None, CredentialSource::None),
        }
    }

    /// A failed read counts as "nothing persisted".
    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                warn!("Failed to read setting '{}': {}", key, e);
                None
            }
        }
    }
}
