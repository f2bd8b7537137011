//! Progress hooks for the assembler
//!
//! Progress is a side effect only; the observer cannot influence the
//! snapshot.

use crate::model::EntityId;

pub trait BuildObserver {
    /// Enumeration finished with `total` identifiers
    fn on_ids_listed(&mut self, _total: usize) {}

    /// About to fetch entity `index` (1-based) of `total`
    fn on_entity(&mut self, _index: usize, _total: usize, _id: &EntityId) {}

    /// The fetch for `id` failed and was recorded with `message`
    fn on_fetch_failed(&mut self, _id: &EntityId, _message: &str) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {}
