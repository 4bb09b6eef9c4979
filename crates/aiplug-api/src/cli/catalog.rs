//! Model catalog commands: list, show, seed.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use aiplug_core::model::catalog::{CatalogSource, seed_defaults};
use aiplug_types::model::ModelInfo;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// List every model the catalog knows, with capabilities and token limits.
    #[command(alias = "ls")]
    List,

    /// Show the resolved model info for one model id.
    Show {
        /// Model id (exact match).
        model: String,
    },

    /// Write the default capability map and token limits where missing.
    Seed,
}

pub async fn run(state: &AppState, action: CatalogCommand, json: bool) -> Result<()> {
    match action {
        CatalogCommand::List => list(state, json).await,
        CatalogCommand::Show { model } => show(state, &model).await,
        CatalogCommand::Seed => seed(state, json).await,
    }
}

async fn list(state: &AppState, json: bool) -> Result<()> {
    let snapshot = state
        .adapter
        .catalog()
        .load()
        .await
        .context("failed to load model catalog")?;
    let models: Vec<ModelInfo> = snapshot
        .known_models()
        .iter()
        .map(|id| snapshot.model_info(id))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Model").fg(Color::White),
        Cell::new("Completion").fg(Color::White),
        Cell::new("Chat").fg(Color::White),
        Cell::new("Embeddings").fg(Color::White),
        Cell::new("Token limit").fg(Color::White),
    ]);

    let flag = |on: bool| {
        if on {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("-").fg(Color::DarkGrey)
        }
    };

    for info in &models {
        let limit = match info.token_limit {
            Some(limit) => Cell::new(limit).fg(Color::Cyan),
            None => Cell::new("unknown").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(&info.id).fg(Color::White),
            flag(info.capabilities.completion),
            flag(info.capabilities.chat_completion),
            flag(info.capabilities.embeddings),
            limit,
        ]);
    }

    println!("{table}");
    Ok(())
}

async fn show(state: &AppState, model: &str) -> Result<()> {
    let snapshot = state
        .adapter
        .catalog()
        .load()
        .await
        .context("failed to load model catalog")?;
    println!("{}", serde_json::to_string_pretty(&snapshot.model_info(model))?);
    Ok(())
}

async fn seed(state: &AppState, json: bool) -> Result<()> {
    let written = seed_defaults(&state.store)
        .await
        .context("failed to seed model catalog")?;

    if json {
        println!("{}", serde_json::json!({"written": written}));
    } else if written.is_empty() {
        println!(
            "  {} Catalog already present in {}",
            style("i").blue().bold(),
            state.store.path().display()
        );
    } else {
        println!(
            "  {} Wrote {} to {}",
            style("✓").green().bold(),
            written.join(", "),
            state.store.path().display()
        );
    }
    Ok(())
}
