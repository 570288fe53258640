//! Encoding of entity snapshots into the JSON-lines export stream.

use std::convert::Infallible;
use std::sync::Arc;

use deppy_model::{Entity, ExportRecord};
use futures::{stream, Stream, StreamExt};
use tracing::{debug, error, warn};

use crate::error::ExportError;

/// Lazily encode `entities` as one newline-terminated record per item.
///
/// Nothing is encoded ahead of the consumer, so when the HTTP layer drops the
/// body after a disconnect no further entities are processed.
pub(crate) fn encode_entities(
    entities: Vec<Arc<Entity>>,
) -> impl Stream<Item = Result<Vec<u8>, Infallible>> + Send + 'static {
    let mut progress = ExportProgress::new(entities.len());
    // The guard moves into the closure whole and drops with the stream.
    stream::iter(entities).map(move |entity| {
        progress.record();
        Ok(encode_record(&entity))
    })
}

/// Encode a single entity record, or an error record in its place.
///
/// Each record goes into its own buffer, so a failure part way through an
/// entity never leaks a truncated object into the stream.
fn encode_record(entity: &Entity) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    if let Err(source) = serde_json::to_writer(&mut buf, entity) {
        let err = ExportError::Encode {
            id: entity.id.clone(),
            source,
        };
        error!("Skipping entity in export: {}", err);
        buf.clear();
        // A record holding a single string always encodes.
        let _ = serde_json::to_writer(&mut buf, &ExportRecord::error(err.to_string()));
    }
    buf.push(b'\n');
    buf
}

/// Tracks how far an export got so an abandoned stream can be reported.
struct ExportProgress {
    total: usize,
    produced: usize,
}

impl ExportProgress {
    fn new(total: usize) -> Self {
        debug!("Exporting {} entities", total);
        Self { total, produced: 0 }
    }

    fn record(&mut self) {
        self.produced += 1;
    }
}

impl Drop for ExportProgress {
    fn drop(&mut self) {
        if self.produced < self.total {
            warn!(
                "Export aborted after {} of {} entities, client went away",
                self.produced, self.total
            );
        } else {
            debug!("Export of {} entities finished", self.total);
        }
    }
}
