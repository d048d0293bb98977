//! Confab CLI entry point.
//!
//! Binary name: `confab`
//!
//! Parses CLI arguments, loads configuration, builds the sync engine over
//! the HTTP persistence gateway, then dispatches to the command handlers.

mod cli;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match args.verbose {
        0 if args.quiet => "error",
        0 => "warn",
        1 => "info,confab=debug",
        _ => "trace",
    };
    if let Err(e) = confab_observe::tracing_setup::init_tracing(args.otel, filter) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let state = AppState::init(args.server_url.clone()).await;

    let result = match args.command {
        Commands::Chat {
            session,
            api_key,
            llm_base_url,
        } => cli::chat::run_chat_loop(&state, session, api_key, &llm_base_url).await,

        Commands::Sessions => cli::session::list_sessions(&state).await,

        Commands::Delete { chat_id, force } => {
            cli::session::delete_session(&state, &chat_id, force).await
        }
    };

    confab_observe::tracing_setup::shutdown_tracing();
    result
}
