//! The keyed snapshot and its run summary

use crate::model::entity::{EntityId, EntitySnapshot};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Complete mapping from identifier to per-entity result
///
/// Keys iterate in ascending identifier order, which is the order the
/// enumerator returns them in. There is no mutating API: a snapshot is
/// produced once by `SnapshotBuilder::finish` (or read back from a file) and
/// only read afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: BTreeMap<EntityId, EntitySnapshot>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &EntityId) -> Option<&EntitySnapshot> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, EntityId, EntitySnapshot> {
        self.entries.iter()
    }

    pub fn summary(&self) -> Summary {
        Summary::from_entries(self.iter())
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a EntityId, &'a EntitySnapshot);
    type IntoIter = btree_map::Iter<'a, EntityId, EntitySnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Accumulates entries during one build run
///
/// Owned exclusively by the assembler until `finish` hands the result off.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    entries: BTreeMap<EntityId, EntitySnapshot>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the entry for `id`, replacing any earlier one
    pub fn insert(&mut self, id: EntityId, entry: EntitySnapshot) {
        self.entries.insert(id, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> Summary {
        Summary::from_entries(self.entries.iter())
    }

    pub fn finish(self) -> Snapshot {
        Snapshot {
            entries: self.entries,
        }
    }
}

impl FromIterator<(EntityId, EntitySnapshot)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (EntityId, EntitySnapshot)>>(iter: I) -> Self {
        Snapshot {
            entries: iter.into_iter().collect(),
        }
    }
}

/// An identifier whose entry is error-shaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedEntity {
    pub id: EntityId,
    pub error: String,
}

/// Succeeded / failed counts over a set of entries
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedEntity>,
}

impl Summary {
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a EntityId, &'a EntitySnapshot)>,
    ) -> Self {
        let mut summary = Summary::default();
        for (id, entry) in entries {
            summary.total += 1;
            match entry.error() {
                None => summary.succeeded += 1,
                Some(error) => summary.failed.push(FailedEntity {
                    id: id.clone(),
                    error: error.to_string(),
                }),
            }
        }
        summary
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}
