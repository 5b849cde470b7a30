//! OpenAI-compatible chat-completions client.
//!
//! Non-streaming: the orchestration loop consumes whole assistant entries,
//! so each invocation is a single request/response exchange.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::capabilities::ManifestEntry;
use crate::config::ModelConfig;
use crate::models::entry::{CapabilityRequest, Entry, Role};
use crate::models::state::TokenUsage;
use crate::models::turn::Language;
use crate::{AppError, Result};

use super::{prompts, Decision, ReasoningEngine};

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiReasoner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f64,
    api_key: String,
}

impl OpenAiReasoner {
    /// Build a client from the model configuration.
    #[must_use]
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
            model: config.name.clone(),
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        }
    }

    async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.endpoint);

        let mut builder = self.client.post(&url).json(request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| AppError::Reasoning(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Reasoning(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|err| AppError::Reasoning(format!("invalid response body: {err}")))
    }
}

#[async_trait]
impl ReasoningEngine for OpenAiReasoner {
    async fn decide(&self, entries: &[Entry], manifest: &[ManifestEntry]) -> Result<Decision> {
        let messages = entries.iter().map(WireMessage::from_entry).collect();
        let tools: Vec<WireTool<'_>> = manifest.iter().map(WireTool::from_manifest).collect();

        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
        };

        let response = self.chat(&request).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Reasoning("response carried no choices".into()))?;

        let requests = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(WireToolCall::into_request)
            .collect::<Vec<_>>();

        let content = choice.message.content.unwrap_or_default();
        let entry = if requests.is_empty() {
            Entry::assistant(content)
        } else {
            Entry::assistant_with_requests(content, requests)
        };

        Ok(Decision {
            entry,
            usage: TokenUsage {
                input_tokens: response.usage.prompt_tokens,
                output_tokens: response.usage.completion_tokens,
            },
        })
    }

    async fn condense(&self, text: &str, language: Language) -> Result<String> {
        let prompt = prompts::condensation_prompt(text, language);
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![WireMessage {
                role: "user",
                content: Some(prompt),
                tool_call_id: None,
                tool_calls: None,
            }],
            tools: None,
        };

        let response = self.chat(&request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(content.trim().to_owned())
    }
}

// ── Wire shapes ─────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool<'a>>>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireRequestToolCall>>,
}

impl WireMessage {
    fn from_entry(entry: &Entry) -> Self {
        let role = match entry.role {
            Role::System => "system",
            Role::Human => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };

        let tool_calls = if entry.capability_requests.is_empty() {
            None
        } else {
            Some(
                entry
                    .capability_requests
                    .iter()
                    .map(WireRequestToolCall::from_request)
                    .collect(),
            )
        };

        Self {
            role,
            content: Some(entry.content.clone()),
            tool_call_id: entry.tool_call_id.clone(),
            tool_calls,
        }
    }
}

#[derive(Serialize)]
struct WireRequestToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireRequestFunction,
}

#[derive(Serialize)]
struct WireRequestFunction {
    name: String,
    arguments: String,
}

impl WireRequestToolCall {
    fn from_request(request: &CapabilityRequest) -> Self {
        Self {
            id: request.call_id.clone(),
            kind: "function",
            function: WireRequestFunction {
                name: request.name.clone(),
                arguments: request.arguments.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

impl<'a> WireTool<'a> {
    fn from_manifest(entry: &'a ManifestEntry) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: &entry.name,
                description: &entry.description,
                parameters: &entry.parameters,
            },
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<WireChoice>,
    usage: WireUsage,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireCalledFunction,
}

#[derive(Deserialize)]
struct WireCalledFunction {
    name: String,
    arguments: String,
}

impl WireToolCall {
    /// Decode a tool call into a capability request. Malformed argument JSON
    /// degrades to an empty object so dispatch can still answer the call.
    fn into_request(self) -> CapabilityRequest {
        let arguments = serde_json::from_str(&self.function.arguments)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));
        CapabilityRequest {
            name: self.function.name,
            arguments,
            call_id: self.id,
        }
    }
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}
