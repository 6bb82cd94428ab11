//! OpenAI-compatible model client.
//!
//! One call, one request: no retries, no state carried between calls.

use crate::config::BackendConfig;
use crate::error::{EvalError, Result};
use chrono::{Local, SecondsFormat};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Prompts are sent as a single user turn.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    User,
}

#[derive(Debug, Serialize)]
struct Message {
    role: Role,
    content: String,
}

impl Message {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body for chat completion.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

/// Response from chat completion.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// A model's answer to one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub model_name: String,
    /// Backend content, verbatim.
    pub response_text: String,
    /// Wall-clock seconds from dispatch to complete body.
    pub latency_seconds: f64,
    /// ISO-8601 time the response arrived.
    pub timestamp: String,
}

/// OpenAI-compatible model client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ModelClient {
    client: Client,
    config: BackendConfig,
}

impl ModelClient {
    /// Create a new model client with the given configuration.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Get the API endpoint URL.
    fn endpoint(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    /// Ask `model_name` to answer `prompt`, giving up after `timeout`.
    ///
    /// Dropping the in-flight request on timeout closes its connection.
    pub async fn complete(
        &self,
        model_name: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<ModelResponse> {
        if prompt.trim().is_empty() {
            return Err(EvalError::validation("prompt", "must not be empty"));
        }

        debug!(model = model_name, timeout_ms = timeout.as_millis() as u64, "dispatching completion");
        let start = Instant::now();

        let content = match tokio::time::timeout(timeout, self.send(model_name, prompt)).await {
            Ok(result) => result.inspect_err(|e| {
                warn!(model = model_name, error = %e, "completion failed");
            })?,
            Err(_) => {
                warn!(model = model_name, timeout_ms = timeout.as_millis() as u64, "completion timed out");
                return Err(EvalError::Timeout {
                    model: model_name.to_string(),
                    timeout_secs: timeout.as_secs_f64(),
                });
            }
        };

        let latency_seconds = start.elapsed().as_secs_f64().max(f64::MIN_POSITIVE);
        info!(
            model = model_name,
            latency_ms = (latency_seconds * 1000.0) as u64,
            chars = content.chars().count(),
            "completion received"
        );

        Ok(ModelResponse {
            model_name: model_name.to_string(),
            response_text: content,
            latency_seconds,
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
        })
    }

    /// Send a chat completion request and return the first choice's content.
    async fn send(&self, model_name: &str, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: model_name,
            messages: vec![Message::user(prompt)],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&request);

        if !self.config.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.config.api_key));
        }

        let response = builder.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(EvalError::Backend {
                status_code: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|_| EvalError::Backend {
                status_code: status.as_u16(),
                body: body.clone(),
            })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| EvalError::Backend {
                status_code: status.as_u16(),
                body,
            })
    }

    /// Test connectivity to the backend with a trivial prompt.
    pub async fn test_connection(&self, model_name: &str) -> Result<ModelResponse> {
        self.complete(
            model_name,
            "Say 'hello' and nothing else.",
            self.config.timeout(),
        )
        .await
    }
}
