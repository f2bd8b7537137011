//! Canonical schema constants for structured logging
//!
//! These constants keep field names identical between the pipeline, the
//! provider and the CLI, and let tests assert on captured events by key.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_ENTITY_ID: &str = "entity_id";
pub const FIELD_LABEL: &str = "label";

// Progress and counts
pub const FIELD_INDEX: &str = "index";
pub const FIELD_TOTAL: &str = "total";
pub const FIELD_SUCCEEDED: &str = "succeeded";
pub const FIELD_FAILED: &str = "failed";
pub const FIELD_SIZE_BYTES: &str = "size_bytes";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_PROGRESS: &str = "progress";
