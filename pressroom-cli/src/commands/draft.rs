//! `pressroom draft ...` — local draft management.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use pressroom_codec::{reading_time_minutes, word_count};
use pressroom_core::{Draft, DraftId, DraftUpdate};
use tabled::{settings::Style, Table, Tabled};

use super::{body_from, open_store};

#[derive(Subcommand, Debug)]
pub enum DraftCommand {
    /// Create a draft.
    New(BodyArgs),

    /// List drafts, most recently updated first.
    List {
        #[arg(long)]
        json: bool,
    },

    /// Print one draft.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Change a draft's title and/or content.
    Edit {
        id: String,
        #[command(flatten)]
        body: BodyArgs,
    },

    /// Delete one or more drafts.
    Rm {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Copy a draft under a new id.
    Dup { id: String },

    /// Write every draft as a JSON array.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Add drafts from a JSON array file.
    Import { file: PathBuf },

    /// Delete every draft.
    Clear,
}

#[derive(Args, Debug)]
pub struct BodyArgs {
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Markdown body.
    #[arg(long, short = 'c', conflicts_with = "file")]
    pub content: Option<String>,

    /// Read the Markdown body from a file.
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

#[derive(Tabled)]
struct DraftRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "words")]
    words: usize,
    #[tabled(rename = "updated")]
    updated: String,
}

pub fn run(cmd: DraftCommand) -> Result<()> {
    let mut store = open_store()?;
    match cmd {
        DraftCommand::New(args) => {
            let content = body_from(args.content, args.file)?;
            let draft = store.create(args.title, content).context("failed to save draft")?;
            println!("✓ Created draft {} '{}'", draft.id.to_string().bold(), draft.title);
        }
        DraftCommand::List { json } => {
            let drafts = store.list();
            if json {
                println!("{}", serde_json::to_string_pretty(&drafts)?);
            } else if drafts.is_empty() {
                println!("No drafts yet.");
                println!("Run: pressroom draft new --title <title>");
            } else {
                print_table(&drafts);
            }
        }
        DraftCommand::Show { id, json } => {
            let id = DraftId::from(id);
            let draft = store
                .get(&id)
                .with_context(|| format!("draft not found: {id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(draft)?);
            } else {
                print_draft(draft);
            }
        }
        DraftCommand::Edit { id, body } => {
            let content = body_from(body.content, body.file)?;
            if body.title.is_none() && content.is_none() {
                anyhow::bail!("nothing to change; pass --title, --content or --file");
            }
            let draft = store
                .update(
                    &DraftId::from(id.clone()),
                    DraftUpdate {
                        title: body.title,
                        content,
                    },
                )
                .with_context(|| format!("failed to update draft {id}"))?;
            println!("✓ Updated draft {} '{}'", draft.id, draft.title);
        }
        DraftCommand::Rm { ids } => {
            let ids: Vec<DraftId> = ids.into_iter().map(DraftId::from).collect();
            let removed = store.delete_many(&ids).context("failed to delete drafts")?;
            println!("✓ Deleted {removed} of {} draft(s)", ids.len());
        }
        DraftCommand::Dup { id } => {
            let copy = store
                .duplicate(&DraftId::from(id.clone()))
                .with_context(|| format!("failed to duplicate draft {id}"))?;
            println!("✓ Created draft {} '{}'", copy.id.to_string().bold(), copy.title);
        }
        DraftCommand::Export { out } => {
            let json = store.export().context("failed to export drafts")?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("✓ Exported {} draft(s) to {}", store.count(), path.display());
                }
                None => println!("{json}"),
            }
        }
        DraftCommand::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let report = store.import(&json).context("failed to import drafts")?;
            println!("✓ Imported {} draft(s)", report.imported);
            for error in &report.errors {
                eprintln!("  {} {error}", "✗".red());
            }
            if !report.success {
                anyhow::bail!("import finished with {} error(s)", report.errors.len());
            }
        }
        DraftCommand::Clear => {
            let count = store.count();
            store.clear().context("failed to clear drafts")?;
            println!("✓ Removed {count} draft(s)");
        }
    }
    Ok(())
}

fn print_table(drafts: &[&Draft]) {
    let rows: Vec<DraftRow> = drafts
        .iter()
        .map(|d| DraftRow {
            id: d.id.to_string(),
            title: d.title.clone(),
            words: word_count(&d.content),
            updated: relative_age(d.updated_at),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn print_draft(draft: &Draft) {
    println!("{}", draft.title.bold());
    println!(
        "{}",
        format!(
            "{} · {} words · {} min read · updated {}",
            draft.id,
            word_count(&draft.content),
            reading_time_minutes(&draft.content),
            relative_age(draft.updated_at)
        )
        .bright_black()
    );
    if let Some(slug) = &draft.slug {
        println!("{}", format!("slug: {slug}").bright_black());
    }
    println!();
    println!("{}", draft.content);
}

fn relative_age(at: DateTime<Utc>) -> String {
    let secs = (Utc::now() - at).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
