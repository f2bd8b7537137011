//! Per-entity fetch

use crate::errors::{ExError, PipelineError, Result};
use crate::model::{EntityRecord, EntitySnapshot, ListedId, Relationship};
use crate::session::{ConnectionProvider, Row};
use crate::target::{EntityTarget, COL_ENTITY, COL_RELATIONSHIPS};
use crate::{log_op_end, log_op_error, log_op_start};
use serde_json::Value;
use std::time::Instant;

const OP: &str = "fetch_entity";

/// Fetch one entity and its outgoing relationships
///
/// A missing entity is data, not an error: it comes back as an error-shaped
/// entry (`"<Label> not found"`). An entity without edges gets exactly one
/// all-null placeholder relationship. A null id never matches a node, so it
/// is reported not found without a query.
///
/// # Errors
///
/// Any infrastructure failure (session, transport, timeout, malformed row)
/// is returned unchanged for the caller to record.
pub fn fetch_entity<P>(provider: &P, target: &EntityTarget, id: &ListedId) -> Result<EntitySnapshot>
where
    P: ConnectionProvider + ?Sized,
{
    let start = Instant::now();
    log_op_start!(OP, entity_id = id.key().as_str());

    let result = run_fetch(provider, target, id);
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(entry) => {
            log_op_end!(
                OP,
                duration_ms = duration_ms,
                entity_id = id.key().as_str(),
                found = entry.is_success()
            );
        }
        Err(err) => {
            log_op_error!(OP, err, duration_ms = duration_ms, entity_id = id.key().as_str());
        }
    }
    result
}

fn run_fetch<P>(provider: &P, target: &EntityTarget, id: &ListedId) -> Result<EntitySnapshot>
where
    P: ConnectionProvider + ?Sized,
{
    if id.is_null() {
        return Ok(EntitySnapshot::failed(target.not_found(id.key()).to_string()));
    }

    let rows = {
        let mut session = provider.session()?;
        session.run(&target.fetch_query(id))?
    };

    let Some(row) = rows.first() else {
        return Ok(EntitySnapshot::failed(target.not_found(id.key()).to_string()));
    };
    if rows.len() > 1 {
        tracing::warn!(
            entity_id = id.key().as_str(),
            rows = rows.len(),
            "Identifier matched more than one node, using the first"
        );
    }

    entry_from_row(row).map_err(|e| ExError::from(e).with_entity_id(id.key().as_str()))
}

/// Convert the single fetch row into a success entry
fn entry_from_row(row: &Row) -> std::result::Result<EntitySnapshot, PipelineError> {
    let entity = match row.get(COL_ENTITY) {
        Some(node) => EntityRecord::from_json(node)?,
        None => {
            return Err(PipelineError::MalformedRow {
                reason: format!("missing column '{}'", COL_ENTITY),
            })
        }
    };

    let relationships = match row.get(COL_RELATIONSHIPS) {
        Some(Value::Array(items)) => items
            .iter()
            .map(Relationship::from_json)
            .collect::<std::result::Result<Vec<_>, _>>()?,
        Some(Value::Null) => Vec::new(),
        Some(other) => {
            return Err(PipelineError::MalformedRow {
                reason: format!("'{}' is not a list: {}", COL_RELATIONSHIPS, other),
            })
        }
        None => {
            return Err(PipelineError::MalformedRow {
                reason: format!("missing column '{}'", COL_RELATIONSHIPS),
            })
        }
    };

    // An empty collection is normalized to the single placeholder entry.
    Ok(EntitySnapshot::found(entity, relationships))
}
