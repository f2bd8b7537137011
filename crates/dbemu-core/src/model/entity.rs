//! Per-entity shapes: identifiers, records, relationships and the
//! success-or-error entry stored under each identifier.

use crate::errors::PipelineError;
use crate::model::value::{property_map_from_json, PropertyMap, PropertyValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Opaque entity identifier, used as the snapshot key and as the query parameter
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An enumerated identifier: the snapshot key plus the value exactly as the
/// database returned it
///
/// The fetch binds `value`, not the key text, so an integer id matches its
/// integer-keyed node.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedId {
    key: EntityId,
    value: Value,
}

impl ListedId {
    /// Strings key as themselves; anything else (null included) by its JSON text
    pub fn from_value(value: Value) -> Self {
        let key = match &value {
            Value::String(s) => EntityId::new(s.as_str()),
            other => EntityId::new(other.to_string()),
        };
        Self { key, value }
    }

    pub fn key(&self) -> &EntityId {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

impl From<&str> for ListedId {
    fn from(s: &str) -> Self {
        Self::from_value(Value::String(s.to_string()))
    }
}

/// One entity's own properties
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRecord {
    properties: PropertyMap,
}

impl EntityRecord {
    pub fn new(properties: PropertyMap) -> Self {
        Self { properties }
    }

    /// Build a record from a node returned as a JSON property map
    ///
    /// # Errors
    ///
    /// `PipelineError::MalformedRow` if the node is not a map.
    pub fn from_json(value: &Value) -> Result<Self, PipelineError> {
        property_map_from_json(value, "node").map(Self::new)
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for EntityRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One outgoing edge of an entity
///
/// All fields are `None` only for the placeholder entry that stands in for
/// "no outgoing relationships".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub relationship_type: Option<String>,
    pub properties: Option<PropertyMap>,
    pub target: Option<EntityRecord>,
}

impl Relationship {
    pub fn new(
        relationship_type: impl Into<String>,
        properties: PropertyMap,
        target: Option<EntityRecord>,
    ) -> Self {
        Self {
            relationship_type: Some(relationship_type.into()),
            properties: Some(properties),
            target,
        }
    }

    /// The all-null entry emitted for an entity with no outgoing edges
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.relationship_type.is_none() && self.properties.is_none() && self.target.is_none()
    }

    /// Parse one element of the collected `relationships` column
    ///
    /// # Errors
    ///
    /// `PipelineError::MalformedRow` if the element or its `properties` /
    /// `target` members are not maps.
    pub fn from_json(value: &Value) -> Result<Self, PipelineError> {
        let object = value.as_object().ok_or_else(|| PipelineError::MalformedRow {
            reason: format!("relationship is not a map: {}", value),
        })?;

        let relationship_type = match object.get("relationship") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        let properties = match object.get("properties") {
            None | Some(Value::Null) => None,
            Some(v) => Some(property_map_from_json(v, "relationship properties")?),
        };
        let target = match object.get("target") {
            None | Some(Value::Null) => None,
            Some(v) => Some(EntityRecord::from_json(v)?),
        };

        Ok(Self {
            relationship_type,
            properties,
            target,
        })
    }
}

/// Reasons a persisted entry cannot be read back as an `EntitySnapshot`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryShapeError {
    #[error("entry has both 'entity' and 'error' set")]
    Hybrid,
    #[error("entry has neither 'entity' nor 'error' set")]
    Empty,
    #[error("entry with 'entity' has no 'relationships'")]
    MissingRelationships,
}

/// The value stored under one identifier in the snapshot
///
/// Serialized with a fixed schema: `entity`, `relationships` and `error` are
/// always present, the unused ones as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireEntry", into = "WireEntry")]
pub enum EntitySnapshot {
    Found {
        entity: EntityRecord,
        relationships: Vec<Relationship>,
    },
    Failed {
        error: String,
    },
}

impl EntitySnapshot {
    /// Success entry; an empty relationship list is replaced by one placeholder
    pub fn found(entity: EntityRecord, mut relationships: Vec<Relationship>) -> Self {
        if relationships.is_empty() {
            relationships.push(Relationship::placeholder());
        }
        EntitySnapshot::Found {
            entity,
            relationships,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        EntitySnapshot::Failed {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EntitySnapshot::Found { .. })
    }

    pub fn entity(&self) -> Option<&EntityRecord> {
        match self {
            EntitySnapshot::Found { entity, .. } => Some(entity),
            EntitySnapshot::Failed { .. } => None,
        }
    }

    pub fn relationships(&self) -> Option<&[Relationship]> {
        match self {
            EntitySnapshot::Found { relationships, .. } => Some(relationships),
            EntitySnapshot::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            EntitySnapshot::Found { .. } => None,
            EntitySnapshot::Failed { error } => Some(error),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireEntry {
    #[serde(default)]
    entity: Option<EntityRecord>,
    #[serde(default)]
    relationships: Option<Vec<Relationship>>,
    #[serde(default)]
    error: Option<String>,
}

impl From<EntitySnapshot> for WireEntry {
    fn from(entry: EntitySnapshot) -> Self {
        match entry {
            EntitySnapshot::Found {
                entity,
                relationships,
            } => WireEntry {
                entity: Some(entity),
                relationships: Some(relationships),
                error: None,
            },
            EntitySnapshot::Failed { error } => WireEntry {
                entity: None,
                relationships: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<WireEntry> for EntitySnapshot {
    type Error = EntryShapeError;

    fn try_from(wire: WireEntry) -> Result<Self, Self::Error> {
        match (wire.entity, wire.relationships, wire.error) {
            (Some(_), _, Some(_)) | (None, Some(_), Some(_)) => Err(EntryShapeError::Hybrid),
            (Some(entity), Some(relationships), None) => Ok(EntitySnapshot::Found {
                entity,
                relationships,
            }),
            (Some(_), None, None) => Err(EntryShapeError::MissingRelationships),
            (None, None, Some(error)) => Ok(EntitySnapshot::Failed { error }),
            (None, _, None) => Err(EntryShapeError::Empty),
        }
    }
}
