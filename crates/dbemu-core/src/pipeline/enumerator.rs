//! Identifier enumeration

use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::ListedId;
use crate::session::ConnectionProvider;
use crate::target::{EntityTarget, COL_ID};
use crate::{log_op_end, log_op_error, log_op_start};
use serde_json::Value;
use std::time::Instant;

const OP: &str = "list_ids";

/// List every identifier of the target label, ascending and deduplicated by key
///
/// Issues exactly one query through one scoped session. An empty result is
/// not an error. Each id keeps the value the database returned, so the
/// fetch can bind it with its original type. A node without the id
/// property is listed under the key `null`.
///
/// # Errors
///
/// `Connection` if the session cannot be opened or the query fails. The
/// underlying message is kept verbatim and the original error is attached
/// as the source. There is no retry.
pub fn list_ids<P>(provider: &P, target: &EntityTarget) -> Result<Vec<ListedId>>
where
    P: ConnectionProvider + ?Sized,
{
    let start = Instant::now();
    log_op_start!(OP, label = target.label());

    let result = run_enumeration(provider, target);
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(ids) => {
            log_op_end!(OP, duration_ms = duration_ms, total = ids.len());
        }
        Err(err) => {
            log_op_error!(OP, err, duration_ms = duration_ms);
        }
    }
    result
}

fn run_enumeration<P>(provider: &P, target: &EntityTarget) -> Result<Vec<ListedId>>
where
    P: ConnectionProvider + ?Sized,
{
    let rows = {
        let mut session = provider.session().map_err(as_connection_error)?;
        session
            .run(&target.enumerate_query())
            .map_err(as_connection_error)?
    };

    let mut ids = Vec::with_capacity(rows.len());
    for row in &rows {
        let value = row.get(COL_ID).cloned().unwrap_or(Value::Null);
        if value.is_null() {
            tracing::warn!(label = target.label(), "Node without an identifier, keyed as null");
        }
        ids.push(ListedId::from_value(value));
    }

    let before = ids.len();
    ids.sort_by(|a, b| a.key().cmp(b.key()));
    ids.dedup_by(|a, b| a.key() == b.key());
    if ids.len() != before {
        tracing::warn!(
            label = target.label(),
            duplicates = before - ids.len(),
            "Duplicate identifiers collapsed"
        );
    }

    Ok(ids)
}

fn as_connection_error(err: ExError) -> ExError {
    if err.kind() == ExErrorKind::Connection {
        return err.with_op(OP);
    }
    ExError::new(ExErrorKind::Connection)
        .with_op(OP)
        .with_message(err.message().to_string())
        .with_source(err)
}
