//! Console output shared by the commands

use dbemu_core::pipeline::BuildObserver;
use dbemu_core::{EntityId, Summary};

/// Prints build progress to stdout
pub struct ConsoleProgress<'a> {
    label: &'a str,
}

impl<'a> ConsoleProgress<'a> {
    pub fn new(label: &'a str) -> Self {
        Self { label }
    }
}

impl BuildObserver for ConsoleProgress<'_> {
    fn on_ids_listed(&mut self, total: usize) {
        println!("Found {} {} entities", total, self.label);
    }

    fn on_entity(&mut self, index: usize, total: usize, id: &EntityId) {
        println!("[{}/{}] {}", index, total, id);
    }

    fn on_fetch_failed(&mut self, id: &EntityId, message: &str) {
        println!("  {} failed: {}", id, message);
    }
}

pub fn print_summary(summary: &Summary) {
    println!("Processed: {}", summary.total);
    println!("Succeeded: {}", summary.succeeded);
    println!("Failed: {}", summary.failed_count());
    for failed in &summary.failed {
        println!("  - {}: {}", failed.id, failed.error);
    }
}
