use std::io::Write;

use anyhow::{bail, Context, Result};
use recipe_chat::api_connection::Provider;
use recipe_chat::chat_session::ChatSession;
use recipe_chat::cli::{parse_args, Cli, Command};
use recipe_chat::config::{ApiConfig, ApiProvider};
use recipe_chat::recipe_parser::{parse_response, parse_response_file, ParsedRecipe};
use recipe_chat::recipe_renderer::{render_recipe, DisplayLimits};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn print_recipe(recipe: &ParsedRecipe, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(recipe)?);
    } else {
        print!("{}", render_recipe(recipe, &DisplayLimits::default()));
    }
    Ok(())
}

/// `require_complete` is off for commands that only probe the backend, where
/// a missing model name is fine.
fn build_provider(cli: &Cli, require_complete: bool) -> Result<Provider> {
    let config = ApiConfig::from_env().context("Invalid API settings in environment")?;
    let config = cli.apply_overrides(config);
    if require_complete {
        config.validate().context("Incomplete API settings")?;
    }
    Provider::new(config).context("Failed to create HTTP client")
}

async fn run_chat(provider: Provider, as_json: bool) -> Result<()> {
    let mut session = ChatSession::new(provider);
    let config = session.provider().config();
    println!(
        "Chatting with {} ({}). Ask for a recipe; /clear resets, /quit exits.",
        config.provider, config.model
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("Conversation cleared.");
                continue;
            }
            question => match session.ask(question).await {
                Ok(turn) => print_recipe(&turn.recipe, as_json)?,
                Err(err) => eprintln!("Error: {err}"),
            },
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();

    match &cli.command {
        Command::Ask { question } => {
            let provider = build_provider(&cli, true)?;
            let answer = provider
                .send_message(&question.join(" "))
                .await
                .context("Request to the model failed")?;
            print_recipe(&parse_response(&answer), cli.json)?;
        }
        Command::Chat => {
            let provider = build_provider(&cli, true)?;
            run_chat(provider, cli.json).await?;
        }
        Command::Parse { file } => {
            let recipe = match file {
                Some(path) => parse_response_file(path).await?,
                None => {
                    let mut text = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut text)
                        .await
                        .context("Failed to read response from stdin")?;
                    parse_response(&text)
                }
            };
            print_recipe(&recipe, cli.json)?;
        }
        Command::Models => {
            let provider = build_provider(&cli, false)?;
            let models = provider.list_models().await;
            if models.is_empty() {
                println!("No models reported by {}.", provider.config().provider);
            }
            for model in models {
                println!("{model}");
            }
        }
        Command::Check => {
            let provider = build_provider(&cli, false)?;
            let config = provider.config();
            if !provider.validate_connection().await {
                bail!("Could not reach {} at {}", config.provider, config.base_url);
            }
            println!("Connected to {} at {}", config.provider, config.base_url);
        }
        Command::Providers => {
            for provider in ApiProvider::ALL {
                let info = provider.info();
                let key = if info.requires_api_key { "API key required" } else { "no API key" };
                println!("{:<14} {:<50} {}", info.name, provider.default_base_url(), key);
            }
        }
    }

    Ok(())
}
