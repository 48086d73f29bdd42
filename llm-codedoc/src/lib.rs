pub mod cli;
pub mod load_config;
pub mod provider;
pub mod tokenizer;

pub use cli::{run, Cli, Commands, GenerateArgs};
