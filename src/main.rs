use clap::Parser;
use knowledge_chunker::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Process(args) => cli::process::run(args).await,
        Command::Inspect(args) => cli::inspect::run(args).await,
        Command::Reprocess(args) => cli::reprocess::run(args).await,
    }
}
