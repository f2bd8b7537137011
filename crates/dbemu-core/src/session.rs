//! Connection seam between the pipeline and a graph database
//!
//! The pipeline only ever sees these two traits. `dbemu-store` provides the
//! Neo4j-backed implementation; tests provide in-memory ones.

use crate::errors::Result;
use serde_json::{Map, Value};

/// One result row: column name → value as returned by the database
pub type Row = Map<String, Value>;

/// A parameterized read query
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: String,
    params: Map<String, Value>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Map::new(),
        }
    }

    /// Bind a named parameter (referenced as `$name` in the text)
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}

/// A short-lived handle used to issue queries
///
/// Released when dropped.
pub trait GraphSession {
    /// Run one read query to completion and return all of its rows
    ///
    /// # Errors
    ///
    /// `Connection`, `Timeout`, `Query` or `MalformedResponse` depending on
    /// where the round trip failed.
    fn run(&mut self, query: &Query) -> Result<Vec<Row>>;
}

/// Process-scoped handle to the database
///
/// Acquired once per run and shared read-only by every query.
pub trait ConnectionProvider {
    /// Open a scoped session
    ///
    /// # Errors
    ///
    /// `Connection` if no session can be opened.
    fn session(&self) -> Result<Box<dyn GraphSession + '_>>;
}
