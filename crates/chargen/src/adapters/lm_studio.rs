//! LM Studio client
//!
//! Talks to any OpenAI-compatible server (LM Studio by default) to list
//! models and to generate characters. The model reply may wrap the JSON
//! object in prose; everything from the first `{` to the last `}` is taken
//! as the record.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{errors::DomainError, CharacterRecord};
use crate::ports::{ChatMessage, GenerationClient, GENERATE_INSTRUCTION};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1234/v1";
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// Client for an OpenAI-compatible chat completion server
#[derive(Debug, Clone)]
pub struct LmStudioClient {
    client: Client,
    base_url: String,
    list_timeout: Duration,
    generate_timeout: Duration,
    temperature: f32,
}

impl Default for LmStudioClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl LmStudioClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            list_timeout: DEFAULT_LIST_TIMEOUT,
            generate_timeout: DEFAULT_GENERATE_TIMEOUT,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_timeouts(mut self, list: Duration, generate: Duration) -> Self {
        self.list_timeout = list;
        self.generate_timeout = generate;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List model ids, reporting why it failed
    pub async fn try_list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.list_timeout)
            .send()
            .await
            .map_err(|err| GenerationError::RequestFailed(err.to_string()))?;

        let payload = read_json(response).await?;
        tracing::debug!(response = %payload, "/models response");

        let models: ModelsResponse = serde_json::from_value(payload)
            .map_err(|err| GenerationError::ParseError(err.to_string()))?;

        Ok(models.data.into_iter().filter_map(|m| m.id).collect())
    }

    /// Generate a character record, reporting why it failed
    pub async fn try_generate_character(
        &self,
        model: &str,
        system_prompt: &str,
    ) -> Result<CharacterRecord, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(GENERATE_INSTRUCTION),
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.generate_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|err| GenerationError::RequestFailed(err.to_string()))?;

        let payload = read_json(response).await?;
        tracing::debug!(response = %payload, "/chat/completions response");

        parse_completion(&payload)
    }
}

#[async_trait]
impl GenerationClient for LmStudioClient {
    async fn list_models(&self) -> Vec<String> {
        match self.try_list_models().await {
            Ok(models) => models,
            Err(err) => {
                tracing::error!(error = %err, base_url = %self.base_url, "Failed to fetch models");
                Vec::new()
            }
        }
    }

    async fn generate_character(
        &self,
        model: &str,
        system_prompt: &str,
    ) -> Option<CharacterRecord> {
        match self.try_generate_character(model, system_prompt).await {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::error!(error = %err, model, "Character generation failed");
                None
            }
        }
    }
}

// ============================================
// Request/Response Types
// ============================================

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: Option<String>,
}

/// Generation error types
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    RequestFailed(String),
    ApiError { status: u16, message: String },
    ParseError(String),
    NoJsonBlock,
    InvalidRecord(String),
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            GenerationError::ApiError { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            GenerationError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            GenerationError::NoJsonBlock => write!(f, "No JSON found in model output"),
            GenerationError::InvalidRecord(msg) => write!(f, "Invalid character record: {}", msg),
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<GenerationError> for DomainError {
    fn from(err: GenerationError) -> Self {
        DomainError::ExternalService(err.to_string())
    }
}

// ============================================
// Helper Functions
// ============================================

async fn read_json(response: reqwest::Response) -> Result<Value, GenerationError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        return Err(map_http_error(status, body));
    }

    response
        .json()
        .await
        .map_err(|err| GenerationError::ParseError(err.to_string()))
}

/// Pull the character record out of a chat completion payload
pub fn parse_completion(payload: &Value) -> Result<CharacterRecord, GenerationError> {
    let content = payload
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .ok_or_else(|| {
            GenerationError::ParseError("missing choices[0].message.content".to_string())
        })?;

    let block = extract_json_block(content).ok_or(GenerationError::NoJsonBlock)?;

    serde_json::from_str(block).map_err(|err| GenerationError::InvalidRecord(err.to_string()))
}

/// Greedy `{ ... }` match: first opening brace through last closing brace
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn map_http_error(status: StatusCode, body: String) -> GenerationError {
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message").or(Some(err)))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or(body);

    GenerationError::ApiError {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Gender;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion(content: &str) -> String {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
    }

    #[test]
    fn test_extract_json_block_from_prose() {
        let text = "Sure! Here is your character:\n{\n  \"name\": \"Leo\",\n  \"reasoning\": {\"why\": \"x\"}\n}\nEnjoy.";
        let block = extract_json_block(text).unwrap();
        assert!(block.starts_with('{'));
        assert!(block.ends_with('}'));
        assert!(serde_json::from_str::<Value>(block).is_ok());
    }

    #[test]
    fn test_extract_json_block_absent() {
        assert_eq!(extract_json_block("no braces here"), None);
        assert_eq!(extract_json_block("} backwards {"), None);
    }

    #[test]
    fn test_parse_completion() {
        let payload: Value = serde_json::from_str(&completion(
            "```json\n{\"name\": \"Isla\", \"gender\": \"Female\", \"age\": 24, \"traits\": [\"shy\"]}\n```",
        ))
        .unwrap();

        let record = parse_completion(&payload).unwrap();
        assert_eq!(record.name.as_deref(), Some("Isla"));
        assert_eq!(record.gender, Some(Gender::Female));
        assert_eq!(record.age, Some(24));
        assert_eq!(record.backstory, None);
    }

    #[test]
    fn test_parse_completion_failures() {
        assert!(matches!(
            parse_completion(&json!({"choices": []})),
            Err(GenerationError::ParseError(_))
        ));
        assert_eq!(
            parse_completion(&serde_json::from_str(&completion("I cannot do that")).unwrap()),
            Err(GenerationError::NoJsonBlock)
        );
        assert!(matches!(
            parse_completion(&serde_json::from_str(&completion("{\"age\": \"old\"}")).unwrap()),
            Err(GenerationError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_map_http_error_prefers_error_message() {
        let err = map_http_error(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"message": "model not loaded"}}"#.to_string(),
        );
        assert_eq!(
            err,
            GenerationError::ApiError {
                status: 400,
                message: "model not loaded".to_string()
            }
        );

        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert_eq!(err.to_string(), "API error (502): upstream down");
    }

    fn base_url(server: &MockServer) -> String {
        format!("{}/v1", server.uri())
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "llama-3"}, {"object": "model"}, {"id": "qwen"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LmStudioClient::new(&base_url(&server));
        assert_eq!(client.list_models().await, vec!["llama-3", "qwen"]);
    }

    #[tokio::test]
    async fn test_generate_character_sends_chat_request() {
        let server = MockServer::start().await;
        let content = "Here you go: {\"name\": \"Marcus\", \"gender\": \"male\", \"age\": 40}";
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "model": "llama-3",
                "messages": [
                    {"role": "system", "content": "You write characters."},
                    {"role": "user", "content": GENERATE_INSTRUCTION}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(completion(content)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = LmStudioClient::new(&format!("{}/", base_url(&server)));
        let record = client
            .generate_character("llama-3", "You write characters.")
            .await
            .unwrap();
        assert_eq!(record.name.as_deref(), Some("Marcus"));
        assert_eq!(record.age, Some(40));

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!((body["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_http_error_yields_no_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})),
            )
            .mount(&server)
            .await;

        let client = LmStudioClient::new(&base_url(&server));
        let err = client.try_generate_character("m", "p").await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::ApiError {
                status: 500,
                message: "boom".to_string()
            }
        );
        assert!(client.generate_character("m", "p").await.is_none());

        let domain_err: DomainError = err.into();
        assert!(matches!(domain_err, DomainError::ExternalService(msg) if msg.contains("boom")));
    }

    #[tokio::test]
    async fn test_missing_endpoints_yield_no_result() {
        let server = MockServer::start().await;
        let client = LmStudioClient::new(&base_url(&server))
            .with_timeouts(Duration::from_secs(2), Duration::from_secs(2));

        assert!(client.list_models().await.is_empty());
        assert!(client.first_model().await.is_none());
        assert!(client.generate_character("m", "p").await.is_none());
    }
}
