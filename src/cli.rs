use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ApiConfig, ApiProvider, ConfigError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ask a language model for recipes and read them as structured output", long_about = None)]
pub struct Cli {
    /// Backend to use (openai, anthropic, google, lmstudio, ollama, custom)
    #[arg(short, long, global = true, value_parser = parse_provider)]
    pub provider: Option<ApiProvider>,

    /// Model name; defaults to the provider's first known model
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Override the provider's base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// API key; prefer RECIPE_CHAT_API_KEY in the environment or .env
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Print recipes as JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a single question and print the recipe
    Ask {
        /// The cooking question
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Interactive session; one question per line, /quit to exit
    Chat,
    /// Parse a saved model response without calling any backend
    Parse {
        /// File holding the raw response; reads stdin when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// List the models the backend offers
    Models,
    /// Check that the backend is reachable
    Check,
    /// Show the supported providers
    Providers,
}

fn parse_provider(value: &str) -> Result<ApiProvider, ConfigError> {
    value.parse()
}

impl Cli {
    /// Applies command-line overrides on top of an environment config.
    pub fn apply_overrides(&self, mut config: ApiConfig) -> ApiConfig {
        if let Some(provider) = self.provider {
            if provider != config.provider {
                config = config.with_provider(provider);
            }
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        config
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
