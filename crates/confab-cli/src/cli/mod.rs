//! CLI argument definitions and command handlers.

pub mod chat;
pub mod session;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "confab",
    version,
    about = "Terminal client for the Confab chat service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Export spans via OpenTelemetry (stdout exporter)
    #[arg(long, global = true)]
    pub otel: bool,

    /// Override the persistence service URL from config.toml
    #[arg(long, global = true)]
    pub server_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat
    Chat {
        /// Resume an existing session by id instead of starting fresh
        #[arg(long)]
        session: Option<String>,

        /// API key for the completion provider
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Base URL of the OpenAI-compatible completion endpoint
        #[arg(
            long,
            env = "OPENAI_BASE_URL",
            default_value = "https://api.openai.com/v1"
        )]
        llm_base_url: String,
    },

    /// List chat sessions, most recently updated first
    Sessions,

    /// Delete a chat session
    Delete {
        /// Session id to delete
        chat_id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}
