//! Secret management commands: set, list.

use std::io::BufRead;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use console::style;

use aiplug_types::secret::{ProjectId, Redacted, SecretScope};

use crate::state::AppState;

#[derive(Subcommand)]
pub enum SecretCommand {
    /// Store a secret in the file store.
    Set {
        /// Secret name, as referenced by `{{secret.<name>}}`.
        name: String,

        /// Value; read from the first line of stdin when omitted.
        #[arg(long)]
        value: Option<String>,

        /// Bind the secret to a project instead of the global scope.
        #[arg(long)]
        project: Option<u64>,
    },

    /// List secret names (never values).
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        project: Option<u64>,
    },
}

pub async fn run(state: &AppState, action: SecretCommand, json: bool) -> Result<()> {
    match action {
        SecretCommand::Set {
            name,
            value,
            project,
        } => set_secret(state, &name, value, project, json).await,
        SecretCommand::List { project } => list_secrets(state, project, json).await,
    }
}

fn scope(project: Option<u64>) -> SecretScope {
    SecretScope::for_project(project.map(ProjectId))
}

async fn set_secret(
    state: &AppState,
    name: &str,
    value: Option<String>,
    project: Option<u64>,
    json: bool,
) -> Result<()> {
    let value = match value {
        Some(v) => v,
        None => {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read secret value from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if value.is_empty() {
        bail!("secret value is empty");
    }

    let scope = scope(project);
    state.adapter.secrets().set_secret(name, &value, &scope).await?;
    let masked = Redacted::new(value).masked();

    if json {
        println!(
            "{}",
            serde_json::json!({"set": true, "name": name, "scope": scope.to_string(), "masked": masked})
        );
    } else {
        println!(
            "  {} Secret '{}' set for {} ({})",
            style("✓").green().bold(),
            style(name).bold(),
            scope,
            masked
        );
    }
    Ok(())
}

async fn list_secrets(state: &AppState, project: Option<u64>, json: bool) -> Result<()> {
    let scope = scope(project);
    let names = state.adapter.secrets().list_secrets(&scope).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    if names.is_empty() {
        println!(
            "  {} No secrets stored for {}. Add one with: {}",
            style("i").blue().bold(),
            scope,
            style("aiplug secret set open_ai_token").yellow()
        );
        return Ok(());
    }

    for name in names {
        println!("  {name}");
    }
    Ok(())
}
