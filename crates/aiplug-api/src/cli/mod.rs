//! CLI command definitions for the `aiplug` binary.
//!
//! Request commands read one JSON document (from `--input FILE`, or stdin by
//! default) and print the platform's `{ok, response | error}` envelope.

pub mod call;
pub mod catalog;
pub mod input;
pub mod predict;
pub mod secret;
pub mod sink;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// OpenAI integration adapter.
#[derive(Parser)]
#[command(name = "aiplug", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print compact single-line JSON (stream events as JSON lines).
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all logs except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed logs (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through the OpenTelemetry stdout exporter.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input source shared by request commands.
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// JSON request file; `-` or omitted reads stdin.
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PredictPath {
    /// Pick chat or text completion from the model's capabilities.
    Auto,
    Chat,
    Text,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a prompt: `{settings, overrides?, prompt}`.
    Predict {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value = "auto")]
        path: PredictPath,
    },

    /// Run an OpenAI-style chat completion body: `{settings, body}`.
    #[command(name = "chat-completion")]
    ChatCompletion {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Run an OpenAI-style legacy completion body: `{settings, body}`.
    Completion {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Validate integration settings and fill in catalog data.
    #[command(name = "parse-settings")]
    ParseSettings {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List provider models with the configured key: settings envelope.
    #[command(name = "check-connection")]
    CheckConnection {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Build a call descriptor without running it: `{settings, overrides?, method}`.
    Describe {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Run a call descriptor.
    Execute {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Build and run a call descriptor: `{settings, overrides?, method}`.
    Call {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Stream a chat or text completion: `{settings, overrides?, messages | text}`.
    Stream {
        #[command(flatten)]
        input: InputArgs,

        /// Correlation id for stream events (a fresh UUID v7 by default).
        #[arg(long)]
        stream_id: Option<String>,
    },

    /// Count tokens: `{settings, overrides?, data}`.
    #[command(name = "count-tokens")]
    CountTokens {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Embed documents or a query: `{settings, texts}` or `{settings, text}`.
    Embed {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Model configuration for the document indexer: settings envelope.
    #[command(name = "indexer-config")]
    IndexerConfig {
        #[command(flatten)]
        input: InputArgs,

        /// Model id to configure.
        #[arg(long)]
        model: String,
    },

    /// Inspect and seed the model catalog.
    Catalog {
        #[command(subcommand)]
        action: catalog::CatalogCommand,
    },

    /// Manage stored secrets.
    Secret {
        #[command(subcommand)]
        action: secret::SecretCommand,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
