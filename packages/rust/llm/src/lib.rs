//! Collaborator capabilities used by the pipeline.
//!
//! Two narrow capabilities are passed explicitly to the pipeline driver:
//! - [`StructuredExtractor`]: prompt + JSON schema in, conforming JSON out
//! - [`TextGenerator`]: prompt in, Markdown out
//!
//! [`OpenAiClient`] implements both against an OpenAI-compatible API.
//! Scripted fakes live in [`mock`] behind the `testing` feature.

#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde_json::Value;

use bandsite_shared::Result;

pub use openai::{OpenAiClient, OpenAiConfig};

/// One structured extraction call.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    /// Schema name reported to the remote service (e.g. `ops_extract`).
    pub name: &'a str,
    pub system_prompt: &'a str,
    pub user_prompt: &'a str,
    /// JSON schema the reply must conform to.
    pub schema: &'a Value,
}

/// Returns a JSON value conforming to the request's schema.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<Value>;
}

/// Returns free-form Markdown for a system/user prompt pair.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}
