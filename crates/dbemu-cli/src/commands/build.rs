//! Snapshot build command

use super::report::{print_summary, ConsoleProgress};
use super::DEFAULT_SNAPSHOT_PATH;
use clap::Args;
use dbemu_core::pipeline::{BuildOutcome, PartialBuild};
use dbemu_core::target::{DEFAULT_ID_PROPERTY, DEFAULT_LABEL};
use dbemu_core::{CancelFlag, EntityTarget, ExError, Snapshot, SnapshotAssembler};
use dbemu_store::config::load_env_file;
use dbemu_store::{save_snapshot, ConnectionConfig, Neo4jHttpProvider, SaveReport};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Snapshot file to write (replaced if it exists)
    #[arg(long, short, default_value = DEFAULT_SNAPSHOT_PATH)]
    pub output: PathBuf,

    /// Node label to export
    #[arg(long, default_value = DEFAULT_LABEL)]
    pub label: String,

    /// Property holding each node's identifier
    #[arg(long, default_value = DEFAULT_ID_PROPERTY)]
    pub id_property: String,

    /// Env file loaded over the process environment (default: ./.env if present)
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Database name, overriding NEO4J_DATABASE
    #[arg(long)]
    pub database: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

pub fn execute(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    match &args.env_file {
        Some(path) => load_env_file(path, true).map_err(ExError::from)?,
        None => load_env_file(Path::new(".env"), false).map_err(ExError::from)?,
    };

    let target = EntityTarget::new(&args.label, &args.id_property)?;
    let mut config = ConnectionConfig::from_env()
        .map_err(ExError::from)?
        .with_timeout(Duration::from_secs(args.timeout_secs));
    if let Some(database) = &args.database {
        config = config.with_database(database).map_err(ExError::from)?;
    }

    let cancel = CancelFlag::new();
    install_interrupt_handler(&cancel)?;

    println!("Connecting to {} (database {})", config.uri, config.database);
    let provider = Neo4jHttpProvider::connect(&config)?;

    let assembler = SnapshotAssembler::new(&provider, &target).with_cancel(cancel.clone());
    tracing::info!(run_id = %assembler.run_id(), label = target.label(), "Starting build");
    let outcome = assembler.build_with_observer(&mut ConsoleProgress::new(target.label()))?;

    match outcome {
        BuildOutcome::Completed(snapshot) if snapshot.is_empty() => {
            println!("No data to save");
        }
        BuildOutcome::Completed(snapshot) => {
            match save_unless_cancelled(&snapshot, &args.output, &cancel)? {
                Some(report) => {
                    print_summary(&snapshot.summary());
                    println!(
                        "Saved {} entries to {} ({} bytes, sha256 {})",
                        report.entries,
                        report.path.display(),
                        report.size_bytes,
                        report.digest
                    );
                }
                None => {
                    let partial = PartialBuild {
                        summary: snapshot.summary(),
                        pending: 0,
                    };
                    print_interrupted(&partial, &args.output);
                }
            }
        }
        BuildOutcome::Interrupted(partial) => print_interrupted(&partial, &args.output),
    }

    Ok(())
}

/// Save `snapshot` unless a signal arrived after the last fetch
fn save_unless_cancelled(
    snapshot: &Snapshot,
    path: &Path,
    cancel: &CancelFlag,
) -> dbemu_store::Result<Option<SaveReport>> {
    if cancel.is_cancelled() {
        tracing::warn!(path = %path.display(), "Interrupted before saving, discarding snapshot");
        return Ok(None);
    }
    save_snapshot(snapshot, path).map(Some)
}

fn print_interrupted(partial: &PartialBuild, output: &Path) {
    println!("{}", partial.interruption());
    print_summary(&partial.summary);
    println!("Nothing was written to {}", output.display());
}

/// Route SIGINT and SIGTERM into `cancel`
///
/// The first signal asks the build to stop after the current entity. A
/// second one terminates the process immediately. Either way nothing is
/// written and the exit status is 0.
fn install_interrupt_handler(cancel: &CancelFlag) -> std::io::Result<()> {
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register_conditional_shutdown(signal, 0, cancel.handle())?;
        signal_hook::flag::register(signal, cancel.handle())?;
    }
    Ok(())
}
