//! `pressroom read <path>`

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pressroom_publish::ReadBody;

use super::{emit, service};

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Path of the file inside the repository.
    pub path: String,

    #[arg(long)]
    pub json: bool,
}

impl ReadArgs {
    pub async fn run(self) -> Result<()> {
        let response = service().read_file(&self.path).await;
        emit(response, self.json, print_file)
    }
}

fn print_file(body: ReadBody) {
    eprintln!(
        "{} · {} · {} words · {} min read",
        body.title.bold(),
        body.path,
        body.word_count,
        body.reading_time_minutes
    );
    print!("{}", body.content);
    if !body.content.ends_with('\n') {
        println!();
    }
}
