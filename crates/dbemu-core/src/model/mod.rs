pub mod entity;
pub mod snapshot;
pub mod value;

pub use entity::{EntityId, EntityRecord, EntitySnapshot, EntryShapeError, ListedId, Relationship};
pub use snapshot::{FailedEntity, Snapshot, SnapshotBuilder, Summary};
pub use value::{PropertyMap, PropertyValue};
