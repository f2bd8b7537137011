//! Snapshot assembly
//!
//! Drives enumeration and per-entity fetches and isolates failures: one
//! entity's error becomes that entity's entry and the run moves on. Only a
//! failed enumeration aborts the build.

use crate::dbemu_core_types::schema::EVENT_PROGRESS;
use crate::dbemu_core_types::RunId;
use crate::errors::{PipelineError, Result};
use crate::model::{EntitySnapshot, Snapshot, SnapshotBuilder, Summary};
use crate::pipeline::cancel::CancelFlag;
use crate::pipeline::enumerator::list_ids;
use crate::pipeline::fetcher::fetch_entity;
use crate::pipeline::observer::{BuildObserver, NoopObserver};
use crate::session::ConnectionProvider;
use crate::target::EntityTarget;
use crate::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

const OP: &str = "build_snapshot";

/// Result of one build run
#[derive(Debug)]
pub enum BuildOutcome {
    /// Every enumerated identifier has an entry
    Completed(Snapshot),
    /// Cancelled between entities; nothing from this run may be persisted
    Interrupted(PartialBuild),
}

impl BuildOutcome {
    pub fn summary(&self) -> Summary {
        match self {
            BuildOutcome::Completed(snapshot) => snapshot.summary(),
            BuildOutcome::Interrupted(partial) => partial.summary.clone(),
        }
    }
}

/// What an interrupted run got through before it stopped
#[derive(Debug, Clone, PartialEq)]
pub struct PartialBuild {
    /// Counts over the entities processed before cancellation
    pub summary: Summary,
    /// Identifiers that were enumerated but never fetched
    pub pending: usize,
}

impl PartialBuild {
    pub fn interruption(&self) -> PipelineError {
        PipelineError::Interrupted {
            processed: self.summary.total,
            total: self.summary.total + self.pending,
        }
    }
}

/// Builds a `Snapshot` for one entity type
pub struct SnapshotAssembler<'a, P: ConnectionProvider + ?Sized> {
    provider: &'a P,
    target: &'a EntityTarget,
    cancel: CancelFlag,
    run_id: RunId,
}

impl<'a, P: ConnectionProvider + ?Sized> SnapshotAssembler<'a, P> {
    pub fn new(provider: &'a P, target: &'a EntityTarget) -> Self {
        Self {
            provider,
            target,
            cancel: CancelFlag::new(),
            run_id: RunId::new(),
        }
    }

    /// Poll `cancel` between entities
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Build without progress reporting
    ///
    /// # Errors
    ///
    /// `Connection` if enumeration fails.
    pub fn build(&self) -> Result<BuildOutcome> {
        self.build_with_observer(&mut NoopObserver)
    }

    /// Build, reporting progress to `observer`
    ///
    /// On completion the snapshot has exactly one entry per enumerated
    /// identifier. Zero identifiers yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// `Connection` if enumeration fails. Per-entity failures never surface
    /// here.
    pub fn build_with_observer(&self, observer: &mut dyn BuildObserver) -> Result<BuildOutcome> {
        let span = tracing::info_span!("build", run_id = %self.run_id, label = self.target.label());
        let _guard = span.enter();

        let start = Instant::now();
        log_op_start!(OP);

        let ids = match list_ids(self.provider, self.target) {
            Ok(ids) => ids,
            Err(err) => {
                log_op_error!(OP, &err, duration_ms = start.elapsed().as_millis() as u64);
                return Err(err);
            }
        };
        let total = ids.len();
        observer.on_ids_listed(total);

        let mut builder = SnapshotBuilder::new();
        for (i, id) in ids.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Ok(self.interrupted(&builder, total - i, start));
            }

            let key = id.key();
            observer.on_entity(i + 1, total, key);
            tracing::info!(
                event = EVENT_PROGRESS,
                index = i + 1,
                total,
                entity_id = key.as_str(),
                "Processing entity"
            );

            let entry = match fetch_entity(self.provider, self.target, id) {
                Ok(entry) => entry,
                Err(err) => {
                    let message = PipelineError::FetchFailed {
                        entity_id: key.to_string(),
                        message: err.detail().to_string(),
                    }
                    .to_string();
                    observer.on_fetch_failed(key, &message);
                    EntitySnapshot::failed(message)
                }
            };
            builder.insert(key.clone(), entry);
        }

        // A cancel that arrives during the last fetch still abandons the run.
        if self.cancel.is_cancelled() {
            return Ok(self.interrupted(&builder, 0, start));
        }

        let snapshot = builder.finish();
        let summary = snapshot.summary();
        log_op_end!(
            OP,
            duration_ms = start.elapsed().as_millis() as u64,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed_count()
        );
        Ok(BuildOutcome::Completed(snapshot))
    }

    fn interrupted(&self, builder: &SnapshotBuilder, pending: usize, start: Instant) -> BuildOutcome {
        let partial = PartialBuild {
            summary: builder.summary(),
            pending,
        };
        tracing::warn!(
            op = OP,
            duration_ms = start.elapsed().as_millis() as u64,
            processed = partial.summary.total,
            pending,
            "Build interrupted, discarding partial snapshot"
        );
        BuildOutcome::Interrupted(partial)
    }
}
