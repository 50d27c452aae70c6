//! Pressroom — draft Markdown posts locally, publish them to a GitHub repo.
//!
//! # Usage
//!
//! ```text
//! pressroom draft new [--title T] [--content C | --file F]
//! pressroom draft list|show|edit|rm|dup|export|import|clear
//! pressroom files [--branch B] [--max-size N] [--group] [--no-stats] [--json]
//! pressroom read <path> [--json]
//! pressroom publish <id> [--filename F] [--meta k=v]... [--meta-json J] [--no-timestamp] [--json]
//! pressroom publish-all [<id>...] [--json]
//! pressroom delete <path> [--message M] [--json]
//! ```
//!
//! Repository settings come from `~/.pressroom/config.yaml` and the
//! `GITHUB_OWNER`, `GITHUB_REPO`, `GITHUB_TOKEN`, `GITHUB_BRANCH` variables.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    draft::DraftCommand,
    files::FilesArgs,
    publish::{DeleteArgs, PublishAllArgs, PublishArgs},
    read::ReadArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "pressroom",
    version,
    about = "Draft Markdown posts and publish them to a GitHub repository",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create, edit and manage local drafts.
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// List Markdown files in the repository.
    Files(FilesArgs),

    /// Print one file from the repository.
    Read(ReadArgs),

    /// Publish a draft as a commit.
    Publish(PublishArgs),

    /// Publish several drafts (all of them when no ids are given).
    PublishAll(PublishAllArgs),

    /// Delete a published file.
    Delete(DeleteArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Draft { command } => commands::draft::run(command),
        Commands::Files(args) => args.run().await,
        Commands::Read(args) => args.run().await,
        Commands::Publish(args) => args.run().await,
        Commands::PublishAll(args) => args.run().await,
        Commands::Delete(args) => args.run().await,
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
