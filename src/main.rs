//! gouml - Go structural model to PlantUML

mod uml_cli;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gouml")]
#[command(about = "Go class diagrams from source, kept in sync", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Class diagram generation
    #[command(subcommand)]
    Uml(uml_cli::UmlCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Uml(cmd) => uml_cli::run(cmd).await?,
    }

    Ok(())
}
