use std::time::Duration;

use reqwest::{Client, Response};
use scout_core::error::AppError;
use scout_core::models::ModelSelection;
use scout_core::traits::ModelClient;
use serde::{Deserialize, Serialize};

use crate::fetcher::transport_error;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(60);

/// Where each backend family lives.
#[derive(Debug, Clone)]
pub struct ModelEndpoints {
    pub ollama_url: String,
    pub openai_base_url: String,
    pub timeout: Duration,
}

impl Default for ModelEndpoints {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }
}

fn build_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::HttpError(e.to_string()))
}

/// Turn a non-success backend response into an error.
async fn backend_error(response: Response) -> AppError {
    let status_code = response.status().as_u16();
    if status_code == 429 {
        return AppError::RateLimitExceeded;
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("HTTP {status_code}: {body}"));
    AppError::LlmError {
        message,
        status_code,
    }
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ---------------------------------------------------------------------------
// Ollama
// ---------------------------------------------------------------------------

/// Client for a self-hosted Ollama server.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct VersionResponse {
    version: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    /// Ping `/api/version` and return the server version.
    pub async fn health_check(&self) -> Result<String, AppError> {
        let response = self
            .client
            .get(format!("{}/api/version", self.base_url))
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }
        let version: VersionResponse = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse Ollama version: {e}")))?;
        Ok(format!("Ollama {} at {}", version.version, self.base_url))
    }
}

impl ModelClient for OllamaClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, AppError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: max_tokens,
            },
        };

        tracing::debug!(model = %self.model, max_tokens, "Ollama generate");
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse Ollama response: {e}")))?;
        Ok(body.response.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible
// ---------------------------------------------------------------------------

/// Client for any OpenAI-compatible chat completion API.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
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
struct ModelList {
    data: Vec<serde_json::Value>,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError(format!(
                "Model openai/{model} requires an API key"
            )));
        }
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    /// List models visible to the credential.
    pub async fn health_check(&self) -> Result<String, AppError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }
        let models: ModelList = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse model list: {e}")))?;
        Ok(format!(
            "{} model(s) available at {}",
            models.data.len(),
            self.base_url
        ))
    }
}

impl ModelClient for OpenAiClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, AppError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens,
        };

        tracing::debug!(model = %self.model, max_tokens, "Chat completion");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse LLM response: {e}")))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AppError::LlmError {
                message: "Empty response from LLM".into(),
                status_code: 200,
            })
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// A model client chosen at runtime from a [`ModelSelection`].
#[derive(Clone)]
pub enum AnyModelClient {
    Ollama(OllamaClient),
    OpenAi(OpenAiClient),
}

impl AnyModelClient {
    /// Build the client for `selection`.
    ///
    /// Fails with a configuration error before any call when a hosted
    /// model has no credential.
    pub fn from_selection(
        selection: &ModelSelection,
        credential: Option<&str>,
        endpoints: &ModelEndpoints,
    ) -> Result<Self, AppError> {
        match selection {
            ModelSelection::Ollama(model) => Ok(Self::Ollama(OllamaClient::new(
                &endpoints.ollama_url,
                model,
                endpoints.timeout,
            )?)),
            ModelSelection::OpenAi(model) => {
                let api_key = credential.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                    AppError::ConfigError(format!(
                        "Model {selection} requires an API key (--api-key or SCOUT_API_KEY)"
                    ))
                })?;
                Ok(Self::OpenAi(OpenAiClient::new(
                    &endpoints.openai_base_url,
                    api_key,
                    model,
                    endpoints.timeout,
                )?))
            }
        }
    }

    pub async fn health_check(&self) -> Result<String, AppError> {
        match self {
            Self::Ollama(client) => client.health_check().await,
            Self::OpenAi(client) => client.health_check().await,
        }
    }
}

impl ModelClient for AnyModelClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, AppError> {
        match self {
            Self::Ollama(client) => client.generate(prompt, max_tokens).await,
            Self::OpenAi(client) => client.generate(prompt, max_tokens).await,
        }
    }
}

/// One-shot query by model identifier against the default endpoints.
pub async fn query_model(
    model_name: &str,
    prompt: &str,
    credential: Option<&str>,
    max_tokens: u32,
) -> Result<String, AppError> {
    let selection = ModelSelection::parse(model_name)?;
    let client = AnyModelClient::from_selection(&selection, credential, &ModelEndpoints::default())?;
    client.generate(prompt, max_tokens).await
}
