//! `pressroom publish`, `pressroom publish-all` and `pressroom delete`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pressroom_codec::Frontmatter;
use pressroom_core::DraftId;
use pressroom_publish::{
    ApiResponse, BatchPublishResult, DraftInput, PublishOptions, PublishOutcome, PublishRequest,
    Published, WriteMode,
};
use tabled::{settings::Style, Table, Tabled};

use super::{emit, open_store, service};

// ---------------------------------------------------------------------------
// publish
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Draft id (see `pressroom draft list`).
    pub id: String,

    /// Target path in the repository; `.md` is added when missing.
    #[arg(long)]
    pub filename: Option<String>,

    /// Extra metadata as key=value; repeatable. Wins over --meta-json.
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,

    /// Extra metadata as a JSON object.
    #[arg(long, value_name = "JSON")]
    pub meta_json: Option<String>,

    /// Do not add a publishedAt timestamp.
    #[arg(long)]
    pub no_timestamp: bool,

    #[arg(long)]
    pub json: bool,
}

impl PublishArgs {
    pub async fn run(self) -> Result<()> {
        let store = open_store()?;
        let id = DraftId::from(self.id.clone());
        let draft = store
            .get(&id)
            .with_context(|| format!("draft not found: {id}"))?;

        let request = PublishRequest {
            draft: DraftInput::from(draft),
            options: PublishOptions {
                filename: self.filename.clone(),
                metadata: parse_metadata(self.meta_json.as_deref(), &self.meta)?,
                published_at: !self.no_timestamp,
            },
        };
        let response = service().publish(request).await;
        emit(response, self.json, print_published)
    }
}

fn parse_metadata(json: Option<&str>, pairs: &[String]) -> Result<Frontmatter> {
    let mut metadata = match json {
        Some(json) => serde_json::from_str::<Frontmatter>(json)
            .context("--meta-json must be a JSON object")?,
        None => Frontmatter::new(),
    };
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("invalid --meta '{pair}'; expected KEY=VALUE"))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("invalid --meta '{pair}'; key is empty");
        }
        metadata.insert_parsed(key, value);
    }
    Ok(metadata)
}

fn print_published(published: Published) {
    let verb = match published.mode {
        WriteMode::Created => "Published",
        WriteMode::Updated => "Updated",
    };
    println!(
        "✓ {verb} {} ({})",
        published.filename.bold(),
        short(&published.commit.sha).bright_black()
    );
    if let Some(url) = &published.url {
        println!("  {url}");
    }
}

// ---------------------------------------------------------------------------
// publish-all
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct PublishAllArgs {
    /// Draft ids; every draft when omitted.
    pub ids: Vec<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "draft")]
    draft: String,
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "result")]
    result: String,
}

impl PublishAllArgs {
    pub async fn run(self) -> Result<()> {
        let store = open_store()?;
        let drafts: Vec<DraftInput> = if self.ids.is_empty() {
            store.list().into_iter().map(DraftInput::from).collect()
        } else {
            self.ids
                .iter()
                .map(|id| {
                    let id = DraftId::from(id.as_str());
                    store
                        .get(&id)
                        .map(DraftInput::from)
                        .with_context(|| format!("draft not found: {id}"))
                })
                .collect::<Result<_>>()?
        };

        let response = service().publish_batch(drafts).await;
        let failed = match &response {
            ApiResponse::Ok(batch) => batch.failed,
            ApiResponse::ApiError(_) => 0,
        };
        emit(response, self.json, print_batch)?;
        if failed > 0 {
            anyhow::bail!("{failed} draft(s) failed to publish");
        }
        Ok(())
    }
}

fn print_batch(batch: BatchPublishResult) {
    println!(
        "{} requested · {} · {}",
        batch.requested,
        format!("{} published", batch.succeeded).green(),
        if batch.failed > 0 {
            format!("{} failed", batch.failed).red().to_string()
        } else {
            "0 failed".to_string()
        }
    );
    let rows: Vec<ResultRow> = batch
        .results
        .into_iter()
        .map(|r| ResultRow {
            draft: r.draft_id.map(|id| id.to_string()).unwrap_or_default(),
            file: r.filename,
            result: match r.outcome {
                PublishOutcome::Committed { mode, commit, .. } => {
                    let label = match mode {
                        WriteMode::Created => "created",
                        WriteMode::Updated => "updated",
                    };
                    format!("{label} {}", short(&commit.sha))
                }
                PublishOutcome::Failed { error } => format!("failed: {error}"),
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Path of the file inside the repository.
    pub path: String,

    /// Commit message (default "Delete post: <path>").
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    #[arg(long)]
    pub json: bool,
}

impl DeleteArgs {
    pub async fn run(self) -> Result<()> {
        let response = service().delete_file(&self.path, self.message).await;
        emit(response, self.json, |body| {
            println!(
                "✓ Deleted {} ({})",
                body.path.bold(),
                short(&body.commit.sha).bright_black()
            );
        })
    }
}

fn short(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_override_json_metadata() {
        let meta = parse_metadata(
            Some(r#"{"author":"Ada","tags":["rust"]}"#),
            &["author=Grace".to_string(), "featured=true".to_string()],
        )
        .unwrap();
        assert_eq!(meta.get_str("author"), Some("Grace"));
        assert_eq!(meta.get("featured").and_then(|v| v.as_bool()), Some(true));
        assert!(meta.contains_key("tags"));
    }

    #[test]
    fn value_may_contain_equals() {
        let meta = parse_metadata(None, &["query=a=b".to_string()]).unwrap();
        assert_eq!(meta.get_str("query"), Some("a=b"));
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        assert!(parse_metadata(None, &["novalue".to_string()]).is_err());
        assert!(parse_metadata(None, &["=x".to_string()]).is_err());
        assert!(parse_metadata(Some("[1, 2]"), &[]).is_err());
    }
}
