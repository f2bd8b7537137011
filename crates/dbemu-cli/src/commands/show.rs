//! Snapshot inspection command

use super::report::print_summary;
use super::DEFAULT_SNAPSHOT_PATH;
use clap::Args;
use dbemu_core::target::{DEFAULT_ID_PROPERTY, DEFAULT_LABEL};
use dbemu_core::{EntityId, EntityTarget, ExErrorKind};
use dbemu_store::snapshot::get_entry;
use dbemu_store::load_snapshot;
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Identifier to look up; omit to print the summary
    pub id: Option<String>,

    /// Snapshot file to read
    #[arg(long, short, default_value = DEFAULT_SNAPSHOT_PATH)]
    pub input: PathBuf,

    /// Label used in the not-found message
    #[arg(long, default_value = DEFAULT_LABEL)]
    pub label: String,
}

pub fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let target = EntityTarget::new(&args.label, DEFAULT_ID_PROPERTY)?;
    let snapshot = load_snapshot(&args.input)?;

    let Some(id) = args.id else {
        println!("Snapshot: {}", args.input.display());
        print_summary(&snapshot.summary());
        return Ok(());
    };

    match get_entry(&snapshot, &target, &EntityId::new(id)) {
        Ok(entry) => {
            println!("{}", serde_json::to_string_pretty(entry)?);
            Ok(())
        }
        Err(err) if err.kind() == ExErrorKind::NotFound => {
            println!("{}", serde_json::to_string_pretty(&json!({ "error": err.message() }))?);
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
