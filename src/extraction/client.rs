//! Structured-extraction service client
//!
//! The service takes an HTML document plus a JSON schema and answers with JSON
//! shaped by that schema. `OpenAiExtractionClient` speaks the OpenAI-compatible
//! chat-completions API using a strict `json_schema` response format.

use crate::config::ExtractionConfig;
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You extract product records from HTML. Each product is \
wrapped in an element carrying a data-item-id attribute, with a summary section and an \
optional detail section. Return one record per product, using only facts present in the \
document.";

/// Capability consumed by the extraction dispatcher
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Extracts structured JSON from `document` according to `schema`
    ///
    /// Transport and authentication failures are errors. A response that is
    /// valid JSON but does not match the schema is returned as-is; validating it
    /// is the caller's job.
    async fn complete(&self, schema: &Value, document: &str) -> Result<Value, HarvestError>;
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct StructuredRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Extraction client for OpenAI-compatible chat-completions endpoints
#[derive(Debug, Clone)]
pub struct OpenAiExtractionClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiExtractionClient {
    /// Creates a client from extraction configuration
    pub fn new(config: &ExtractionConfig) -> Result<Self, HarvestError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ExtractionClient for OpenAiExtractionClient {
    async fn complete(&self, schema: &Value, document: &str) -> Result<Value, HarvestError> {
        let request = StructuredRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: document,
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "extracted_records",
                    strict: true,
                    schema,
                },
            },
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| HarvestError::Service(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarvestError::Service(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| HarvestError::MalformedResponse(format!("unreadable body: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| HarvestError::MalformedResponse("no message content".to_string()))?;

        serde_json::from_str(&content)
            .map_err(|e| HarvestError::MalformedResponse(format!("content is not JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiExtractionClient {
        OpenAiExtractionClient::new(&ExtractionConfig {
            base_url: format!("{}/v1/", server.uri()),
            api_key: "sk-test".to_string(),
            ..ExtractionConfig::default()
        })
        .unwrap()
    }

    fn chat_reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    #[tokio::test]
    async fn test_complete_parses_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(chat_reply(r#"{"products":[]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let value = client_for(&server)
            .complete(&json!({"type": "object"}), "<html></html>")
            .await
            .unwrap();

        assert_eq!(value, json!({ "products": [] }));
    }

    #[tokio::test]
    async fn test_request_carries_schema_and_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(chat_reply("{}"))
            .mount(&server)
            .await;

        let schema = json!({ "type": "object", "title": "marker" });
        client_for(&server)
            .complete(&schema, "<p>doc-body</p>")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["schema"], schema);
        assert_eq!(body["messages"][1]["content"], "<p>doc-body</p>");
    }

    #[tokio::test]
    async fn test_http_error_is_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let result = client_for(&server).complete(&json!({}), "<p/>").await;
        assert!(matches!(result, Err(HarvestError::Service(_))));
    }

    #[tokio::test]
    async fn test_non_json_content_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("Sorry, I cannot help with that."))
            .mount(&server)
            .await;

        let result = client_for(&server).complete(&json!({}), "<p/>").await;
        assert!(matches!(result, Err(HarvestError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_missing_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let result = client_for(&server).complete(&json!({}), "<p/>").await;
        assert!(matches!(result, Err(HarvestError::MalformedResponse(_))));
    }
}
