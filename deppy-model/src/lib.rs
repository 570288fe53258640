//! Entity model for the deppy registry.
//!
//! Defines the types shared by the store, the registry and its readers:
//! - [`Entity`] — an identified record with an opaque payload and typed annotations
//! - [`TypedValue`] — a (type tag, JSON value) pair used for properties and constraints
//! - [`Payload`] — an already-encoded JSON value, emitted verbatim on export
//! - [`ExportRecord`] — one line of the newline-delimited export stream
//!
//! Payloads are never interpreted by the registry. Producers choose their own
//! type-tag namespaces and payload shapes.

mod entity;
mod payload;
mod record;

pub use entity::{Entity, TypedValue};
pub use payload::Payload;
pub use record::ExportRecord;
