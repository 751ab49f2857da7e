use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::error::{OutlineError, Result};

/// Where outline payloads come from, keyed by document id. The service
/// backs this with its history store; tests use the in-memory variant.
#[async_trait]
pub trait OutlineSource: Send + Sync {
    async fn fetch_outline(&self, document_id: &str) -> Result<Value>;
}

/// In-memory outline source.
#[derive(Default)]
pub struct InMemoryOutlineSource {
    outlines: DashMap<String, Value>,
}

impl InMemoryOutlineSource {
    pub fn new() -> Self {
        Self {
            outlines: DashMap::new(),
        }
    }

    pub fn insert(&self, document_id: impl Into<String>, outline: Value) {
        self.outlines.insert(document_id.into(), outline);
    }
}

#[async_trait]
impl OutlineSource for InMemoryOutlineSource {
    async fn fetch_outline(&self, document_id: &str) -> Result<Value> {
        self.outlines
            .get(document_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| OutlineError::DocumentNotFound(document_id.to_string()))
    }
}

/// Outline source backed by a remote mindmap backend.
#[cfg(feature = "http")]
pub struct HttpOutlineSource {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpOutlineSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl OutlineSource for HttpOutlineSource {
    async fn fetch_outline(&self, document_id: &str) -> Result<Value> {
        let url = format!(
            "{}/api/history/{}",
            self.base_url.trim_end_matches('/'),
            document_id
        );
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: Value = response.json().await?;
        // History payloads wrap the outline in a `mindmap` field; bare
        // outline responses are accepted as-is.
        Ok(body.get("mindmap").cloned().unwrap_or(body))
    }
}
