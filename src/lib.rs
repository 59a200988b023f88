pub mod api_connection;
pub mod chat_session;
pub mod cli;
pub mod config;
pub mod recipe_parser;
pub mod recipe_renderer;
