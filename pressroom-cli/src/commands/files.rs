//! `pressroom files` — Markdown files in the repository.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pressroom_publish::{FilesBody, ListQuery};
use tabled::{settings::Style, Table, Tabled};

use super::{emit, service};

#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Branch to list (falls back through main, master, develop, dev).
    #[arg(long)]
    pub branch: Option<String>,

    /// Skip files larger than this many bytes (0 = no limit).
    #[arg(long, value_name = "BYTES")]
    pub max_size: Option<u64>,

    /// Group files by folder.
    #[arg(long)]
    pub group: bool,

    /// Omit the summary line.
    #[arg(long)]
    pub no_stats: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "size")]
    size: String,
    #[tabled(rename = "sha")]
    sha: String,
}

impl FilesArgs {
    pub async fn run(self) -> Result<()> {
        let query = ListQuery {
            branch: self.branch,
            max_size: self.max_size,
            group_by_folder: self.group,
            include_stats: !self.no_stats,
        };
        let response = service().list_files(query).await;
        emit(response, self.json, print_files)
    }
}

fn print_files(body: FilesBody) {
    let listing = &body.listing;
    println!(
        "{} @ {} ({})",
        listing.repository.bold(),
        listing.branch,
        listing.commit.bright_black()
    );
    if listing.truncated {
        println!(
            "{} the repository tree was truncated upstream; this list may be incomplete",
            "warning:".yellow().bold()
        );
    }

    if listing.files.is_empty() {
        println!("No Markdown files found.");
    } else if let Some(folders) = &body.folders {
        for (folder, files) in folders {
            println!("{}", folder.bold());
            for file in files {
                println!("  {}  {}", file.name, size_label(file.size).bright_black());
            }
        }
    } else {
        let rows: Vec<FileRow> = listing
            .files
            .iter()
            .map(|f| FileRow {
                path: f.path.clone(),
                size: size_label(f.size),
                sha: f.sha.chars().take(7).collect(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if let Some(stats) = &body.stats {
        println!(
            "{} of {} tree items · {} folders · {} · {} total, {} average",
            stats.markdown_count,
            stats.total_tree_items,
            stats.folders,
            stats.extensions.join(", "),
            size_label(Some(stats.total_size)),
            size_label(Some(stats.average_size)),
        );
    }
}

fn size_label(size: Option<u64>) -> String {
    match size {
        None => "?".to_string(),
        Some(bytes) if bytes < 1024 => format!("{bytes} B"),
        Some(bytes) => format!("{:.1} KiB", bytes as f64 / 1024.0),
    }
}
