use tracing::{info, warn};

use crate::api_connection::{ApiConnectionError, Provider};
use crate::recipe_parser::{parse_response, ParsedRecipe};

/// One question and what came back for it.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub question: String,
    pub raw_response: String,
    pub recipe: ParsedRecipe,
}

/// A conversation with one backend. `ask` borrows the session mutably, so a
/// session never has more than one request in flight.
#[derive(Debug)]
pub struct ChatSession {
    provider: Provider,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            history: Vec::new(),
        }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Sends the question, parses whatever the model answered, and records
    /// the turn. Transport errors are returned unchanged and nothing is
    /// recorded for them.
    pub async fn ask(&mut self, question: &str) -> Result<&ChatTurn, ApiConnectionError> {
        let question = question.trim();
        info!(turn = self.history.len() + 1, "asking {}", self.provider.config().provider);

        let raw_response = self.provider.send_message(question).await?;
        let recipe = parse_response(&raw_response);
        if recipe.ingredients.is_empty() && recipe.instructions.is_empty() {
            warn!("response contained no ingredients or instructions");
        }

        self.history.push(ChatTurn {
            question: question.to_string(),
            raw_response,
            recipe,
        });
        Ok(&self.history[self.history.len() - 1])
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
