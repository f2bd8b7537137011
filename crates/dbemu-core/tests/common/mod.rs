//! In-memory graph used by the pipeline tests

use dbemu_core::errors::{ExError, Result};
use dbemu_core::pipeline::CancelFlag;
use dbemu_core::session::{ConnectionProvider, GraphSession, Query, Row};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

/// One outgoing edge: (type, properties, target properties)
pub type FakeEdge = (&'static str, Value, Option<Value>);

/// Nodes and faults are keyed by the JSON text of the id, so the string
/// `"7"` and the integer `7` are different nodes, as they are in Neo4j.
#[derive(Default)]
pub struct FakeGraph {
    nodes: BTreeMap<String, (Value, Value, Vec<FakeEdge>)>,
    listed_ids: Option<Vec<Value>>,
    faults: HashMap<String, ExError>,
    enumeration_fault: Option<ExError>,
    session_fault: Option<ExError>,
    empty_collect: bool,
    cancel_after: Option<(usize, CancelFlag)>,
    fetches: Cell<usize>,
    pub queries: RefCell<Vec<Query>>,
}

#[allow(dead_code)]
impl FakeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(self, id: &str, props: Value, edges: Vec<FakeEdge>) -> Self {
        self.with_node_keyed(json!(id), props, edges)
    }

    /// Node whose id property has a non-string value
    pub fn with_node_keyed(mut self, id: Value, props: Value, edges: Vec<FakeEdge>) -> Self {
        self.nodes.insert(id.to_string(), (id, props, edges));
        self
    }

    /// Node whose only property is its id
    pub fn with_plain_node(self, id: &str) -> Self {
        self.with_node(id, json!({ "id": id }), Vec::new())
    }

    /// Enumeration returns exactly these values instead of the node keys
    pub fn with_listed_ids(mut self, ids: Vec<Value>) -> Self {
        self.listed_ids = Some(ids);
        self
    }

    pub fn with_fault(mut self, id: &str, err: ExError) -> Self {
        self.faults.insert(json!(id).to_string(), err);
        self
    }

    pub fn with_enumeration_fault(mut self, err: ExError) -> Self {
        self.enumeration_fault = Some(err);
        self
    }

    pub fn with_session_fault(mut self, err: ExError) -> Self {
        self.session_fault = Some(err);
        self
    }

    /// Return `[]` for edge-less nodes instead of the one all-null map
    pub fn with_empty_collect(mut self) -> Self {
        self.empty_collect = true;
        self
    }

    /// Set `flag` once `fetches` fetch queries have completed
    pub fn cancel_after(mut self, fetches: usize, flag: CancelFlag) -> Self {
        self.cancel_after = Some((fetches, flag));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    fn enumerate(&self) -> Result<Vec<Row>> {
        if let Some(err) = &self.enumeration_fault {
            return Err(err.clone());
        }
        let ids: Vec<Value> = match &self.listed_ids {
            Some(ids) => ids.clone(),
            None => self.nodes.values().map(|(id, _, _)| id.clone()).collect(),
        };
        Ok(ids.into_iter().map(|id| row(json!({ "id": id }))).collect())
    }

    fn fetch(&self, id: &Value) -> Result<Vec<Row>> {
        let slot = id.to_string();
        self.fetches.set(self.fetches.get() + 1);
        if let Some((after, flag)) = &self.cancel_after {
            if self.fetches.get() >= *after {
                flag.cancel();
            }
        }

        if let Some(err) = self.faults.get(&slot) {
            return Err(err.clone());
        }
        let Some((_, props, edges)) = self.nodes.get(&slot) else {
            return Ok(Vec::new());
        };

        let mut relationships: Vec<Value> = edges
            .iter()
            .map(|(rel_type, rel_props, target)| {
                json!({
                    "relationship": rel_type,
                    "properties": rel_props,
                    "target": target,
                })
            })
            .collect();
        if relationships.is_empty() && !self.empty_collect {
            relationships.push(json!({"relationship": null, "properties": null, "target": null}));
        }

        Ok(vec![row(json!({
            "entity": props,
            "relationships": relationships,
        }))])
    }
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

struct FakeSession<'a> {
    graph: &'a FakeGraph,
}

impl GraphSession for FakeSession<'_> {
    fn run(&mut self, query: &Query) -> Result<Vec<Row>> {
        self.graph.queries.borrow_mut().push(query.clone());
        match query.params().get("id") {
            Some(id) => self.graph.fetch(id),
            None => self.graph.enumerate(),
        }
    }
}

impl ConnectionProvider for FakeGraph {
    fn session(&self) -> Result<Box<dyn GraphSession + '_>> {
        if let Some(err) = &self.session_fault {
            return Err(err.clone());
        }
        Ok(Box::new(FakeSession { graph: self }))
    }
}
