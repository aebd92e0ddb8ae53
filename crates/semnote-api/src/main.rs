//! semnote CLI entry point.
//!
//! Binary name: `semnote`
//!
//! Parses CLI arguments, initializes tracing, loads configuration, opens the
//! vector store, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use semnote_core::vector::store::VectorStore;
use semnote_observe::tracing_setup::{TracingConfig, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity; RUST_LOG overrides it.
    let tracing_config = TracingConfig::new(cli::verbosity_filter(cli.verbose, cli.quiet))
        .with_otel(cli.otel);
    init_tracing(&tracing_config)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "semnote", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Initialize application state (config, model, store)
    let state = AppState::init().await?;

    let result = dispatch(&state, cli.command, cli.json).await;
    // Close on the error path as well.
    state.vector_service.store().close().await;
    result
}

async fn dispatch(state: &AppState, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Index { text, file, yes } => {
            let content = cli::index::read_input(text, file.as_deref()).await?;
            cli::index::index(state, &content, yes, json).await
        }

        Commands::Search { query, limit } => cli::search::search(state, &query, limit, json).await,

        Commands::Status => cli::status::status(state, json).await,

        Commands::Recreate { yes } => cli::table::recreate(state, yes, json).await,

        Commands::Model { action } => cli::model::handle_model_command(action, state, json).await,

        Commands::Completions { .. } => unreachable!("handled above"),
    }
}
