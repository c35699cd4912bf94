//! OpenAI-compatible chat completions client.
//!
//! One HTTP request per call; failures surface immediately as
//! [`BandsiteError::CollaboratorFailure`] without retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use bandsite_shared::{AppConfig, BandsiteError, Result, resolve_api_key};

use crate::{ExtractionRequest, StructuredExtractor, TextGenerator};

const EXTRACTION: &str = "extraction";
const GENERATION: &str = "generation";

/// Connection settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Build from the app config. The key is read from the env var the
    /// config names; `model` is the already-resolved model.
    pub fn from_app_config(config: &AppConfig, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key: resolve_api_key(config)?,
            base_url: config.llm.base_url.clone(),
            model: model.into(),
            timeout: Duration::from_secs(config.llm.timeout_secs),
        })
    }
}

pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BandsiteError::config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, stage: &str, body: &ChatRequest<'_>) -> Result<String> {
        debug!(stage, model = %body.model, "sending chat completion");
        let response = self
            .client
            .post(self.completions_url())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| BandsiteError::collaborator(stage, format!("request failed: {e}")))?;
        Self::handle_response(stage, response).await
    }

    /// First choice's message content, or a collaborator failure.
    async fn handle_response(stage: &str, response: Response) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BandsiteError::collaborator(stage, format!("reading body: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(BandsiteError::collaborator(
                stage,
                format!("HTTP {status}: {detail}"),
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| BandsiteError::collaborator(stage, format!("unexpected response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| BandsiteError::collaborator(stage, "response has no content"))
    }
}

#[async_trait]
impl StructuredExtractor for OpenAiClient {
    #[instrument(skip_all, fields(name = request.name))]
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<Value> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: messages(request.system_prompt, request.user_prompt),
            response_format: Some(ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.name,
                    schema: request.schema,
                    strict: true,
                },
            }),
        };
        let content = self.complete(EXTRACTION, &body).await?;
        serde_json::from_str(&content)
            .map_err(|e| BandsiteError::collaborator(EXTRACTION, format!("reply is not JSON: {e}")))
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    #[instrument(skip_all)]
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: messages(system_prompt, user_prompt),
            response_format: None,
        };
        self.complete(GENERATION, &body).await
    }
}

fn messages<'a>(system: &'a str, user: &'a str) -> [ChatMessage<'a>; 2] {
    [
        ChatMessage {
            role: "system",
            content: system,
        },
        ChatMessage {
            role: "user",
            content: user,
        },
    ]
}

// Wire types

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(OpenAiConfig {
            api_key: "test-key".into(),
            base_url: format!("{}/v1/", server.uri()),
            model: "gpt-test".into(),
            timeout: Duration::from_secs(5),
        })
        .expect("client")
    }

    fn completion(content: &str) -> Value {
        json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]})
    }

    #[tokio::test]
    async fn extract_sends_strict_schema_and_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-test",
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {"name": "ops_extract", "strict": true}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"{"tasks": []}"#)))
            .expect(1)
            .mount(&server)
            .await;

        let schema = json!({"type": "object"});
        let value = client_for(&server)
            .extract(ExtractionRequest {
                name: "ops_extract",
                system_prompt: "sys",
                user_prompt: "user",
                schema: &schema,
            })
            .await
            .expect("extract");
        assert_eq!(value, json!({"tasks": []}));
    }

    #[tokio::test]
    async fn generate_returns_markdown_without_response_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system", "content": "write"},
                    {"role": "user", "content": "page"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("# Gigs")))
            .mount(&server)
            .await;

        let md = client_for(&server).generate("write", "page").await.expect("generate");
        assert_eq!(md, "# Gigs");
    }

    #[tokio::test]
    async fn server_error_is_a_collaborator_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"error": {"message": "overloaded"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).generate("s", "u").await.expect_err("should fail");
        match err {
            BandsiteError::CollaboratorFailure { stage, message } => {
                assert_eq!(stage, "generation");
                assert!(message.contains("overloaded"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_json_extraction_reply_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("sorry, no")))
            .mount(&server)
            .await;

        let schema = json!({});
        let err = client_for(&server)
            .extract(ExtractionRequest {
                name: "x",
                system_prompt: "s",
                user_prompt: "u",
                schema: &schema,
            })
            .await
            .expect_err("should fail");
        assert!(matches!(err, BandsiteError::CollaboratorFailure { ref stage, .. } if stage == "extraction"));
    }

    #[tokio::test]
    async fn empty_content_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("s", "u").await.expect_err("should fail");
        assert!(err.to_string().contains("no content"));
    }

    #[test]
    fn config_requires_api_key_env() {
        let mut app = AppConfig::default();
        app.llm.api_key_env = "BANDSITE_TEST_KEY_THAT_IS_NEVER_SET".into();
        assert!(OpenAiConfig::from_app_config(&app, "m").is_err());
    }
}
