//! confkit CLI tool.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::DocKind;

#[derive(Parser)]
#[command(name = "confkit")]
#[command(about = "Typed loaders for logging and CI pipeline documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration document
    Validate {
        /// Path to the document
        path: String,
        /// Document kind (inferred from the file name when omitted)
        #[arg(long, value_enum)]
        kind: Option<DocKind>,
    },
    /// Print the parsed model
    Show {
        /// Path to the document
        path: String,
        #[arg(long, value_enum)]
        kind: Option<DocKind>,
        /// Emit JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Re-serialize a document in canonical form
    Fmt {
        /// Path to the document
        path: String,
        #[arg(long, value_enum)]
        kind: Option<DocKind>,
        /// Rewrite the file in place instead of printing
        #[arg(long)]
        write: bool,
    },
    /// List the expanded build-matrix jobs of a pipeline document
    Jobs {
        /// Path to the pipeline document
        path: String,
    },
    /// Print the wired logger topology of a logging document
    Topology {
        /// Path to the logging document
        path: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path, kind } => commands::validate(&path, kind),
        Commands::Show { path, kind, json } => commands::show(&path, kind, json),
        Commands::Fmt { path, kind, write } => commands::fmt(&path, kind, write),
        Commands::Jobs { path } => commands::jobs(&path),
        Commands::Topology { path } => commands::topology(&path),
    }
}
