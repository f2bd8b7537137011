pub mod build;
pub mod report;
pub mod show;

/// Where `build` writes and `show` reads by default
pub const DEFAULT_SNAPSHOT_PATH: &str = "src/lib/db_emulator.json";
