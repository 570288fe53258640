//! In-memory entity registry and its HTTP export API.
//!
//! Producers call [`Registry::upsert`] and [`Registry::delete`]; readers
//! fetch every entity as a JSON-lines stream from the router returned by
//! [`build_router`], sorted by entity ID.

mod error;
mod export;
mod registry;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};

pub use deppy_model::{Entity, ExportRecord, Payload, TypedValue};
pub use error::{ExportError, LoadError, ValidationError};
pub use registry::Registry;

/// Content type of the export stream.
pub const EXPORT_CONTENT_TYPE: &str = "application/json";

async fn export_handler(State(registry): State<Arc<Registry>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPORT_CONTENT_TYPE)],
        Body::from_stream(registry.export()),
    )
}

/// Build the HTTP API router serving exports of `registry`.
///
/// Every request takes its own snapshot, so writes made after the router is
/// built show up in later responses.
pub fn build_router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/", get(export_handler))
        .route("/api/v1/entities", get(export_handler))
        .with_state(registry)
}
