//! aiplug command-line entry point.
//!
//! Binary name: `aiplug`
//!
//! Parses CLI arguments, sets up tracing, wires the adapter against the data
//! directory, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,aiplug_core=debug,aiplug_infra=debug",
        _ => "trace",
    };
    aiplug_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "aiplug", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.json).await?;
    tracing::debug!(data_dir = %state.data_dir.display(), "adapter ready");

    let json = cli.json;
    let result = match cli.command {
        Commands::Predict { input, path } => cli::predict::predict(&state, &input, path, json).await,
        Commands::ChatCompletion { input } => cli::predict::chat_completion(&state, &input, json).await,
        Commands::Completion { input } => cli::predict::completion(&state, &input, json).await,
        Commands::ParseSettings { input } => cli::predict::parse_settings(&state, &input, json).await,
        Commands::CheckConnection { input } => cli::call::check_connection(&state, &input, json).await,
        Commands::Describe { input } => cli::call::describe(&state, &input, json).await,
        Commands::Execute { input } => cli::call::execute(&state, &input, json).await,
        Commands::Call { input } => cli::call::call(&state, &input, json).await,
        Commands::Stream { input, stream_id } => {
            cli::call::stream(&state, &input, stream_id, json).await
        }
        Commands::CountTokens { input } => cli::call::count_tokens(&state, &input, json).await,
        Commands::Embed { input } => cli::call::embed(&state, &input, json).await,
        Commands::IndexerConfig { input, model } => {
            cli::call::indexer_config(&state, &input, &model, json).await
        }
        Commands::Catalog { action } => cli::catalog::run(&state, action, json).await,
        Commands::Secret { action } => cli::secret::run(&state, action, json).await,
        // Handled before state initialization.
        Commands::Completions { .. } => Ok(()),
    };

    aiplug_observe::tracing_setup::shutdown_tracing();
    result
}
