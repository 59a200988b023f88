pub mod connection;
pub mod endpoints;

pub use connection::{ApiConnectionError, Provider, RECIPE_SYSTEM_PROMPT};
