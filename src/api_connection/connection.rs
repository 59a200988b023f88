use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::endpoints::{
    AnthropicRequest, AnthropicResponse, ApiErrorBody, ChatCompletionRequest,
    ChatCompletionResponse, ChatMessage, GeminiContent, GeminiGenerationConfig, GeminiRequest,
    GeminiResponse, ModelList, OllamaGenerateRequest, OllamaGenerateResponse, OllamaOptions,
    OllamaTagList, ResponseFormat,
};
use crate::config::{ApiConfig, ApiProvider};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const CONNECTION_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Asks the model for the JSON shape that `recipe_parser` normalizes.
pub const RECIPE_SYSTEM_PROMPT: &str = r#"You are a professional chef assistant. Answer every cooking or recipe question with a single JSON object in exactly this shape:

{
  "name": "Recipe name",
  "description": "One or two sentences about the dish",
  "prep_time": "15 minutes",
  "cook_time": "30 minutes",
  "servings": "4",
  "difficulty": "Easy, Medium or Hard",
  "ingredients": [
    {"amount": "2 cups", "item": "flour"},
    {"amount": "1 tsp", "item": "salt"}
  ],
  "instructions": ["First step", "Second step"],
  "tips": ["A helpful tip"],
  "tags": ["healthy", "quick", "vegetarian"],
  "nutrition": {"calories": "250", "protein": "15g", "carbs": "30g", "fat": "10g"}
}

Respond with the JSON object only, with no text before or after it."#;

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("{provider} requires an API key. {help}")]
    MissingApiKey {
        provider: ApiProvider,
        help: &'static str,
    },
    #[error("Invalid API key or insufficient permissions: {0}")]
    Unauthorized(String),
    #[error("Rate limit exceeded. Please wait a moment and try again. ({0})")]
    RateLimited(String),
    #[error("Model '{model}' not found: {body}")]
    ModelNotFound { model: String, body: String },
    #[error("Request timed out")]
    Timeout,
    #[error("Cannot connect to {0}. Please make sure the server is running and the port is correct.")]
    ConnectionRefused(String),
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: StatusCode,
        error_body: String,
    },
    #[error("API returned an empty completion")]
    EmptyResponse,
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiConnectionError::Timeout
        } else if err.is_connect() {
            let target = err
                .url()
                .map(|url| url.to_string())
                .unwrap_or_else(|| "server".to_string());
            ApiConnectionError::ConnectionRefused(target)
        } else {
            ApiConnectionError::Network(err)
        }
    }
}

/// Human-readable message from an error body, or the body itself.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.message().to_string())
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Maps a non-success HTTP status onto the error the user should see.
pub fn classify_status(status: StatusCode, body: &str, model: &str) -> ApiConnectionError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiConnectionError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => ApiConnectionError::RateLimited(message),
        StatusCode::NOT_FOUND => ApiConnectionError::ModelNotFound {
            model: model.to_string(),
            body: message,
        },
        _ => ApiConnectionError::ApiError {
            status,
            error_body: message,
        },
    }
}

/// A configured backend plus the HTTP client used to reach it.
#[derive(Debug, Clone)]
pub struct Provider {
    config: ApiConfig,
    client: Client,
}

impl Provider {
    pub fn new(config: ApiConfig) -> Result<Self, ApiConnectionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiConnectionError::Network)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn require_api_key(&self) -> Result<Option<&str>, ApiConnectionError> {
        let info = self.config.provider.info();
        match self.config.api_key.as_deref() {
            None if info.requires_api_key => Err(ApiConnectionError::MissingApiKey {
                provider: self.config.provider,
                help: info.api_key_help,
            }),
            key => Ok(key),
        }
    }

    /// Sends one user message with the recipe system prompt and returns the
    /// raw completion text.
    pub async fn send_message(&self, message: &str) -> Result<String, ApiConnectionError> {
        let api_key = self.require_api_key()?;
        debug!(provider = %self.config.provider, model = %self.config.model, "sending message");

        let content = match self.config.provider {
            ApiProvider::OpenAi | ApiProvider::LmStudio | ApiProvider::Custom => {
                self.send_chat_completion(message, api_key).await?
            }
            ApiProvider::Anthropic => self.send_anthropic(message, api_key).await?,
            ApiProvider::Google => self.send_gemini(message, api_key).await?,
            ApiProvider::Ollama => self.send_ollama(message).await?,
            ApiProvider::HuggingFace | ApiProvider::Cohere => {
                return Err(ApiConnectionError::UnsupportedProvider(
                    self.config.provider.to_string(),
                ))
            }
        };

        if content.trim().is_empty() {
            return Err(ApiConnectionError::EmptyResponse);
        }
        Ok(content)
    }

    async fn send_chat_completion(
        &self,
        message: &str,
        api_key: Option<&str>,
    ) -> Result<String, ApiConnectionError> {
        let json_mode = self.config.provider.info().supports_json_mode;
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(RECIPE_SYSTEM_PROMPT),
                ChatMessage::user(message),
            ],
            response_format: json_mode.then(ResponseFormat::json_object),
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            stream: Some(false),
        };

        let builder = self.with_auth(self.client.post(self.config.endpoint("chat/completions")), api_key);
        let response: ChatCompletionResponse = self.post_json(builder, &request).await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    async fn send_anthropic(
        &self,
        message: &str,
        api_key: Option<&str>,
    ) -> Result<String, ApiConnectionError> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            system: RECIPE_SYSTEM_PROMPT.to_string(),
            messages: vec![ChatMessage::user(message)],
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
        };

        let builder = self.with_auth(self.client.post(self.config.endpoint("messages")), api_key);
        let response: AnthropicResponse = self.post_json(builder, &request).await?;

        Ok(response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }

    async fn send_gemini(
        &self,
        message: &str,
        api_key: Option<&str>,
    ) -> Result<String, ApiConnectionError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent::text(Some("user"), message)],
            system_instruction: GeminiContent::text(None, RECIPE_SYSTEM_PROMPT),
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let url = self
            .config
            .endpoint(&format!("models/{}:generateContent", self.config.model));
        let builder = self.with_auth(self.client.post(url), api_key);
        let response: GeminiResponse = self.post_json(builder, &request).await?;

        Ok(response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default())
    }

    async fn send_ollama(&self, message: &str) -> Result<String, ApiConnectionError> {
        let request = OllamaGenerateRequest {
            model: self.config.model.clone(),
            prompt: message.to_string(),
            system: RECIPE_SYSTEM_PROMPT.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let builder = self.client.post(self.config.endpoint("generate"));
        let response: OllamaGenerateResponse = self.post_json(builder, &request).await?;
        Ok(response.response)
    }

    /// Attaches the provider's style of credentials to a request.
    fn with_auth(&self, builder: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
        let Some(key) = api_key else {
            return builder;
        };
        match self.config.provider {
            ApiProvider::Anthropic => builder
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            ApiProvider::Google => builder.query(&[("key", key)]),
            _ => {
                let builder = builder.bearer_auth(key);
                match self.config.organization_id.as_deref() {
                    Some(org) => builder.header("OpenAI-Organization", org),
                    None => builder,
                }
            }
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: &impl Serialize,
    ) -> Result<T, ApiConnectionError> {
        let response = builder.json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_status(status, &text, &self.config.model));
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn models_endpoint(&self) -> String {
        match self.config.provider {
            ApiProvider::Ollama => self.config.endpoint("tags"),
            _ => self.config.endpoint("models"),
        }
    }

    async fn fetch_models(&self) -> Result<Vec<String>, ApiConnectionError> {
        let builder = self.with_auth(
            self.client.get(self.models_endpoint()),
            self.config.api_key.as_deref(),
        );
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(classify_status(status, &text, &self.config.model));
        }

        let models = match self.config.provider {
            ApiProvider::Ollama => serde_json::from_str::<OllamaTagList>(&text)?
                .models
                .into_iter()
                .map(|m| m.name)
                .collect(),
            _ => serde_json::from_str::<ModelList>(&text)?
                .data
                .into_iter()
                .map(|m| m.id)
                .collect(),
        };
        Ok(models)
    }

    /// Models the backend offers. Local servers are queried; hosted APIs
    /// return the built-in list. Any failure also yields the built-in list.
    pub async fn list_models(&self) -> Vec<String> {
        let defaults = || {
            self.config
                .provider
                .info()
                .default_models
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
        };

        match self.config.provider {
            ApiProvider::LmStudio | ApiProvider::Ollama | ApiProvider::Custom => {
                match self.fetch_models().await {
                    Ok(models) => models,
                    Err(err) => {
                        warn!(error = %err, "could not list models, using defaults");
                        defaults()
                    }
                }
            }
            _ => defaults(),
        }
    }

    /// True when the backend answers its models endpoint with 200 OK.
    pub async fn validate_connection(&self) -> bool {
        let api_key = self.config.api_key.as_deref();
        let builder = self
            .with_auth(self.client.get(self.models_endpoint()), api_key)
            .timeout(CONNECTION_CHECK_TIMEOUT);
        match builder.send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(err) => {
                debug!(error = %err, "connection check failed");
                false
            }
        }
    }
}
