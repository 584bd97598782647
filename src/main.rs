use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use weatherbot::{bot, config, log};

/// Telegram bot answering with the current weather
#[derive(Parser, Debug)]
struct Args {
    /// Config file
    #[arg(short, long)]
    config: PathBuf,
    /// Log lookups and session transitions
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let conf = config::App::parse(&args.config).context("Failed to parse config")?;

    log::init(args.verbose).context("Failed to initialize logger")?;

    bot::run(conf).await.context("Unexpected error on bot")
}
