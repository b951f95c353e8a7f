use clap::Args;

use chrono::Local;
use planbot_core::extract::CompletionClient;
use planbot_core::{Config, ExtractionMode};

#[derive(Args)]
pub struct ExtractArgs {
    /// The message to analyze, e.g. "встреча с коллегами завтра в 15:00"
    pub text: String,
    /// Treat the message as a task instead of an event
    #[arg(long)]
    pub task: bool,
}

pub async fn run(args: ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let client = CompletionClient::new(config.completion);

    let mode = if args.task {
        ExtractionMode::Task
    } else {
        ExtractionMode::Event
    };
    let now = Local::now().naive_local();

    let event = client.extract_details(&args.text, mode, now).await?;
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}
