//! Core types shared across dbemu facilities
//!
//! This crate provides foundational types used by the error, logging and
//! pipeline layers:
//!
//! - **Correlation types**: RunId, stamped on every event of one build run
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::RunId;
pub use sensitive::Sensitive;
