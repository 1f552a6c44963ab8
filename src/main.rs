mod cli;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    c2pa_demo::observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server(args) => c2pa_demo::api::run(args.address, args.config).await?,
    }

    Ok(())
}
