//! The entity type being exported and the two queries issued for it

use crate::errors::{PipelineError, Result};
use crate::model::{EntityId, ListedId};
use crate::session::Query;

/// Column holding the identifier in the enumeration query
pub const COL_ID: &str = "id";
/// Column holding the entity node in the fetch query
pub const COL_ENTITY: &str = "entity";
/// Column holding the collected relationship maps in the fetch query
pub const COL_RELATIONSHIPS: &str = "relationships";
/// Parameter name of the identifier in the fetch query
pub const PARAM_ID: &str = "id";

pub const DEFAULT_LABEL: &str = "Student";
pub const DEFAULT_ID_PROPERTY: &str = "id";

/// Node label plus the property that identifies nodes of that label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTarget {
    label: String,
    id_property: String,
}

impl EntityTarget {
    /// # Errors
    ///
    /// `InvalidInput` if the label or property is not a plain identifier.
    /// Both are spliced into query text, so nothing else is accepted.
    pub fn new(label: impl Into<String>, id_property: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let id_property = id_property.into();
        validate_identifier("label", &label)?;
        validate_identifier("id property", &id_property)?;
        Ok(Self { label, id_property })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn id_property(&self) -> &str {
        &self.id_property
    }

    /// All identifiers of the label, ascending
    pub fn enumerate_query(&self) -> Query {
        Query::new(format!(
            "MATCH (e:`{label}`) RETURN e.`{id}` AS {col} ORDER BY e.`{id}`",
            label = self.label,
            id = self.id_property,
            col = COL_ID,
        ))
    }

    /// One entity plus every outgoing edge, collected into a single row
    ///
    /// The optional match keeps the entity row when it has no edges; the
    /// collect then yields one map whose members are all null. The id is
    /// bound with the type enumeration returned it in.
    pub fn fetch_query(&self, id: &ListedId) -> Query {
        Query::new(format!(
            "MATCH (e:`{label}` {{`{id}`: ${param}}})\n\
             OPTIONAL MATCH (e)-[r]->(n)\n\
             RETURN e AS {entity}, \
             collect({{relationship: type(r), properties: properties(r), target: n}}) AS {rels}",
            label = self.label,
            id = self.id_property,
            param = PARAM_ID,
            entity = COL_ENTITY,
            rels = COL_RELATIONSHIPS,
        ))
        .param(PARAM_ID, id.value().clone())
    }

    /// Entry text for an identifier that no longer matches any node
    pub fn not_found(&self, id: &EntityId) -> PipelineError {
        PipelineError::EntityNotFound {
            entity: self.label.clone(),
            entity_id: id.to_string(),
        }
    }
}

impl Default for EntityTarget {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            id_property: DEFAULT_ID_PROPERTY.to_string(),
        }
    }
}

fn validate_identifier(field: &str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PipelineError::InvalidIdentifier {
            field: field.to_string(),
            value: value.to_string(),
        }
        .into())
    }
}
