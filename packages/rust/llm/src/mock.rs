//! Scripted collaborators for tests.
//!
//! Enabled with the `testing` feature so downstream crates can drive the
//! pipeline without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use bandsite_shared::{BandsiteError, Result};

use crate::{ExtractionRequest, StructuredExtractor, TextGenerator};

/// A recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub name: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

type Responder = Box<dyn Fn(&ExtractionRequest<'_>) -> Result<Value> + Send + Sync>;

/// Extractor returning scripted fragments.
pub struct ScriptedExtractor {
    responder: Responder,
    delays: Vec<Duration>,
    started: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedExtractor {
    /// Fragments handed out in call order; running out is a collaborator failure.
    pub fn queue(fragments: Vec<Value>) -> Self {
        let queue = Mutex::new(VecDeque::from(fragments));
        Self::from_fn(move |_| {
            queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .ok_or_else(|| BandsiteError::collaborator("extraction", "script exhausted"))
        })
    }

    /// The same fragment for every call.
    pub fn fixed(fragment: Value) -> Self {
        Self::from_fn(move |_| Ok(fragment.clone()))
    }

    /// Every call fails.
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::from_fn(move |_| Err(BandsiteError::collaborator("extraction", message.clone())))
    }

    /// Fragment computed from the request, e.g. keyed on the prompt text.
    pub fn from_fn(
        responder: impl Fn(&ExtractionRequest<'_>) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            delays: Vec::new(),
            started: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering; call `n` waits `delays[n % len]`.
    pub fn with_delays(mut self, delays: Vec<Duration>) -> Self {
        self.delays = delays;
        self
    }

    /// Calls in the order they started.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl StructuredExtractor for ScriptedExtractor {
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<Value> {
        let n = self.started.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                name: request.name.to_string(),
                system_prompt: request.system_prompt.to_string(),
                user_prompt: request.user_prompt.to_string(),
            });
        if !self.delays.is_empty() {
            tokio::time::sleep(self.delays[n % self.delays.len()]).await;
        }
        (self.responder)(&request)
    }
}

/// Generator returning the same Markdown for every page.
pub struct StaticGenerator {
    markdown: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StaticGenerator {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: Some(markdown.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self {
            markdown: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                name: "generate".into(),
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
            });
        self.markdown
            .clone()
            .ok_or_else(|| BandsiteError::collaborator("generation", "scripted failure"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request<'a>(schema: &'a Value, user: &'a str) -> ExtractionRequest<'a> {
        ExtractionRequest {
            name: "test",
            system_prompt: "sys",
            user_prompt: user,
            schema,
        }
    }

    #[tokio::test]
    async fn queue_hands_out_in_order_then_fails() {
        let schema = json!({});
        let extractor = ScriptedExtractor::queue(vec![json!({"a": 1}), json!({"a": 2})]);
        assert_eq!(extractor.extract(request(&schema, "1")).await.expect("first"), json!({"a": 1}));
        assert_eq!(extractor.extract(request(&schema, "2")).await.expect("second"), json!({"a": 2}));
        assert!(extractor.extract(request(&schema, "3")).await.is_err());
        assert_eq!(extractor.call_count(), 3);
        assert_eq!(extractor.calls()[1].user_prompt, "2");
    }

    #[tokio::test]
    async fn static_generator_records_prompts() {
        let generator = StaticGenerator::new("# Hi");
        assert_eq!(generator.generate("s", "u").await.expect("generate"), "# Hi");
        assert_eq!(generator.calls().len(), 1);
        assert!(StaticGenerator::failing().generate("s", "u").await.is_err());
    }
}
