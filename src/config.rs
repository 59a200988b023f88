use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use thiserror::Error;

pub const PROVIDER_ENV_VAR: &str = "RECIPE_CHAT_PROVIDER";
pub const API_KEY_ENV_VAR: &str = "RECIPE_CHAT_API_KEY";
pub const BASE_URL_ENV_VAR: &str = "RECIPE_CHAT_BASE_URL";
pub const MODEL_ENV_VAR: &str = "RECIPE_CHAT_MODEL";
pub const ORG_ID_ENV_VAR: &str = "RECIPE_CHAT_ORG_ID";
pub const TIMEOUT_ENV_VAR: &str = "RECIPE_CHAT_TIMEOUT_SECS";

const LOCAL_TIMEOUT: Duration = Duration::from_secs(120);
const HOSTED_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown provider '{0}' (expected one of: openai, anthropic, google, huggingface, cohere, lmstudio, ollama, custom)")]
    UnknownProvider(String),
    #[error("invalid value '{value}' for {var}")]
    InvalidValue { var: &'static str, value: String },
    #[error("{provider} requires an API key. {help}")]
    MissingApiKey {
        provider: ApiProvider,
        help: &'static str,
    },
    #[error("no base URL configured for {0}")]
    MissingBaseUrl(ApiProvider),
    #[error("no model configured for {0}")]
    MissingModel(ApiProvider),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiProvider {
    OpenAi,
    Anthropic,
    Google,
    HuggingFace,
    Cohere,
    LmStudio,
    Ollama,
    Custom,
}

/// Static facts about a backend.
#[derive(Debug, Clone, Copy)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub requires_api_key: bool,
    pub supports_json_mode: bool,
    pub default_models: &'static [&'static str],
    pub api_key_help: &'static str,
}

impl ApiProvider {
    pub const ALL: [ApiProvider; 8] = [
        ApiProvider::OpenAi,
        ApiProvider::Anthropic,
        ApiProvider::Google,
        ApiProvider::HuggingFace,
        ApiProvider::Cohere,
        ApiProvider::LmStudio,
        ApiProvider::Ollama,
        ApiProvider::Custom,
    ];

    pub fn info(self) -> ProviderInfo {
        match self {
            ApiProvider::OpenAi => ProviderInfo {
                name: "OpenAI",
                requires_api_key: true,
                supports_json_mode: true,
                default_models: &["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo-preview"],
                api_key_help: "Get your API key from https://platform.openai.com/api-keys",
            },
            ApiProvider::Anthropic => ProviderInfo {
                name: "Anthropic",
                requires_api_key: true,
                supports_json_mode: false,
                default_models: &[
                    "claude-3-haiku-20240307",
                    "claude-3-sonnet-20240229",
                    "claude-3-opus-20240229",
                ],
                api_key_help: "Get your API key from https://console.anthropic.com/",
            },
            ApiProvider::Google => ProviderInfo {
                name: "Google Gemini",
                requires_api_key: true,
                supports_json_mode: false,
                default_models: &["gemini-pro"],
                api_key_help: "Get your API key from https://makersuite.google.com/app/apikey",
            },
            ApiProvider::HuggingFace => ProviderInfo {
                name: "HuggingFace",
                requires_api_key: true,
                supports_json_mode: false,
                default_models: &["mistralai/Mixtral-8x7B-Instruct-v0.1"],
                api_key_help: "Get your API token from https://huggingface.co/settings/tokens",
            },
            ApiProvider::Cohere => ProviderInfo {
                name: "Cohere",
                requires_api_key: true,
                supports_json_mode: false,
                default_models: &["command", "command-light"],
                api_key_help: "Get your API key from https://dashboard.cohere.ai/api-keys",
            },
            ApiProvider::LmStudio => ProviderInfo {
                name: "LM Studio",
                requires_api_key: false,
                supports_json_mode: false,
                default_models: &[],
                api_key_help: "No API key required for local models",
            },
            ApiProvider::Ollama => ProviderInfo {
                name: "Ollama",
                requires_api_key: false,
                supports_json_mode: false,
                default_models: &["llama2", "mistral"],
                api_key_help: "No API key required for local models",
            },
            ApiProvider::Custom => ProviderInfo {
                name: "Custom API",
                requires_api_key: false,
                supports_json_mode: false,
                default_models: &[],
                api_key_help: "Enter credentials as required by your custom API",
            },
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ApiProvider::OpenAi => "https://api.openai.com/v1",
            ApiProvider::Anthropic => "https://api.anthropic.com/v1",
            ApiProvider::Google => "https://generativelanguage.googleapis.com/v1beta",
            ApiProvider::HuggingFace => "https://api-inference.huggingface.co/models",
            ApiProvider::Cohere => "https://api.cohere.ai/v1",
            ApiProvider::LmStudio => "http://localhost:1234/v1",
            ApiProvider::Ollama => "http://localhost:11434/api",
            ApiProvider::Custom => "",
        }
    }

    /// Local servers may take minutes to produce a first token.
    pub fn is_local(self) -> bool {
        matches!(self, ApiProvider::LmStudio | ApiProvider::Ollama)
    }
}

impl fmt::Display for ApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().name)
    }
}

impl FromStr for ApiProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match key.as_str() {
            "openai" => Ok(ApiProvider::OpenAi),
            "anthropic" | "claude" => Ok(ApiProvider::Anthropic),
            "google" | "gemini" => Ok(ApiProvider::Google),
            "huggingface" | "hf" => Ok(ApiProvider::HuggingFace),
            "cohere" => Ok(ApiProvider::Cohere),
            "lmstudio" => Ok(ApiProvider::LmStudio),
            "ollama" => Ok(ApiProvider::Ollama),
            "custom" => Ok(ApiProvider::Custom),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Connection settings for one backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub provider: ApiProvider,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub organization_id: Option<String>,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ApiConfig {
    pub fn new(provider: ApiProvider) -> Self {
        Self {
            provider,
            api_key: None,
            base_url: provider.default_base_url().to_string(),
            model: provider
                .info()
                .default_models
                .first()
                .map(|m| m.to_string())
                .unwrap_or_default(),
            organization_id: None,
            timeout: if provider.is_local() {
                LOCAL_TIMEOUT
            } else {
                HOSTED_TIMEOUT
            },
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    /// Builds a config from `.env` and the process environment. Variables
    /// that are unset keep the provider defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let provider = match non_empty(PROVIDER_ENV_VAR) {
            Some(value) => value.parse()?,
            None => ApiProvider::LmStudio,
        };
        let mut config = Self::new(provider);

        config.api_key = non_empty(API_KEY_ENV_VAR);
        config.organization_id = non_empty(ORG_ID_ENV_VAR);
        if let Some(base_url) = non_empty(BASE_URL_ENV_VAR) {
            config.base_url = base_url;
        }
        if let Some(model) = non_empty(MODEL_ENV_VAR) {
            config.model = model;
        }
        if let Some(raw) = non_empty(TIMEOUT_ENV_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: TIMEOUT_ENV_VAR,
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Switches backend, resetting the URL, model and timeout to the new
    /// provider's defaults. Credentials are kept.
    pub fn with_provider(self, provider: ApiProvider) -> Self {
        Self {
            api_key: self.api_key,
            organization_id: self.organization_id,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Self::new(provider)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let info = self.provider.info();
        if info.requires_api_key && self.api_key.is_none() {
            return Err(ConfigError::MissingApiKey {
                provider: self.provider,
                help: info.api_key_help,
            });
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl(self.provider));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingModel(self.provider));
        }
        Ok(())
    }

    /// Base URL without a trailing slash, ready for path joining.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
