//! dbemu CLI
//!
//! Command-line interface for building and inspecting db emulator snapshots

use clap::{Parser, Subcommand, ValueEnum};
use dbemu_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    /// Human-readable lines on stderr
    Text,
    /// One JSON object per line on stderr
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "dbemu")]
#[command(about = "dbemu - offline snapshot of a graph database's per-entity API", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Export every entity of one label into a snapshot file
    Build(commands::build::BuildArgs),
    /// Print one entry (or the summary) of an existing snapshot file
    Show(commands::show::ShowArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Text => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Show(args) => commands::show::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
