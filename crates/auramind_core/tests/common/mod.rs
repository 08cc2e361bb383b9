//! Port doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use auramind_core::{
    ConfigResolver, GenerativeModelService, PortError, PortResult, SettingsStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn resolver_with_key(key: Option<&str>) -> ConfigResolver {
    ConfigResolver::new(key.map(str::to_string), Arc::new(MemoryStore::default()))
}

/// A recorded `generate_content` call.
#[derive(Debug, Clone)]
pub struct Call {
    pub model: String,
    pub credential: String,
    pub parts: Vec<String>,
}

/// Answers every call with the same result.
pub struct FixedModel {
    reply: PortResult<String>,
    calls: Mutex<Vec<Call>>,
}

impl FixedModel {
    pub fn text(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: PortError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModelService for FixedModel {
    async fn generate_content(
        &self,
        model: &str,
        credential: &str,
        parts: &[String],
    ) -> PortResult<String> {
        self.calls.lock().unwrap().push(Call {
            model: model.to_string(),
            credential: credential.to_string(),
            parts: parts.to_vec(),
        });
        self.reply.clone()
    }
}

/// Holds each call until the test releases it, keyed by the last prompt part.
#[derive(Default)]
pub struct GatedModel {
    gates: Mutex<HashMap<String, oneshot::Receiver<String>>>,
    started: AtomicUsize,
}

impl GatedModel {
    pub fn gate(&self, last_part: &str) -> oneshot::Sender<String> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .insert(last_part.to_string(), rx);
        tx
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModelService for GatedModel {
    async fn generate_content(
        &self,
        _model: &str,
        _credential: &str,
        parts: &[String],
    ) -> PortResult<String> {
        let key = parts.last().cloned().unwrap_or_default();
        let gate = self.gates.lock().unwrap().remove(&key);
        self.started.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(rx) => rx
                .await
                .map_err(|_| PortError::Transport("gate dropped".to_string())),
            None => Err(PortError::Unexpected(format!("no gate for {key:?}"))),
        }
    }
}
