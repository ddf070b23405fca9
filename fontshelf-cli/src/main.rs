//! fontshelf CLI - font preview tooling
//!
//! Lists installed fonts, fetches font previews, replays selection
//! sequences through the preview loader and manages configuration.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::list::ListArgs;
use commands::preview::PreviewArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "fontshelf")]
#[command(version = fontshelf::VERSION)]
#[command(about = "Preview installed fonts", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read one font file and report its preview payload
    Fetch(FetchArgs),

    /// List installed fonts grouped by family
    List(ListArgs),

    /// Select font files in sequence and report the final preview
    Preview(PreviewArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config(command) => commands::config::run(command),
        Commands::Fetch(args) => {
            let runner = CliRunner::with_debug(cli.debug)?;
            commands::fetch::run(args, &runner).await
        }
        Commands::List(args) => {
            let runner = CliRunner::with_debug(cli.debug)?;
            commands::list::run(args, &runner).await
        }
        Commands::Preview(args) => {
            let runner = CliRunner::with_debug(cli.debug)?;
            commands::preview::run(args, &runner).await
        }
    }
}
