pub mod config;
pub mod get;
pub mod prompts;
