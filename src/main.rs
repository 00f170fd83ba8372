use clap::Parser;
use lesion_scan::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => cli::serve::run(args).await,
        Command::Migrate(args) => cli::migrate::run(args).await,
    }
}
