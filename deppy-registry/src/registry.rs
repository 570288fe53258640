use std::convert::Infallible;
use std::io::BufRead;
use std::sync::Arc;

use deppy_model::Entity;
use deppy_store::SyncMap;
use futures::Stream;
use tracing::debug;

use crate::error::{LoadError, ValidationError};
use crate::export::encode_entities;

/// Concurrency-safe set of entities keyed by ID.
///
/// Producers write through [`upsert`](Self::upsert) and
/// [`delete`](Self::delete) from any thread. Readers never see the live map:
/// [`snapshot`](Self::snapshot) and [`export`](Self::export) work on a copy
/// taken at the moment of the call, so later writes only affect later reads.
///
/// Two upserts racing on the same ID are resolved by lock order; the last
/// one to acquire the store lock wins.
#[derive(Debug, Default)]
pub struct Registry {
    entities: SyncMap<String, Arc<Entity>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entity`, replacing any entity with the same ID wholesale.
    ///
    /// Accepts `Option<Entity>` so that a missing entity (`None`) is reported
    /// as [`ValidationError::MissingEntity`]. An empty ID is rejected with
    /// [`ValidationError::EmptyId`]. Rejected writes leave the store untouched.
    pub fn upsert(&self, entity: impl Into<Option<Entity>>) -> Result<(), ValidationError> {
        let entity = entity.into().ok_or(ValidationError::MissingEntity)?;
        if entity.id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        debug!("Upserting entity {:?}", entity.id);
        self.entities.set(entity.id.clone(), Arc::new(entity));
        Ok(())
    }

    /// Like [`upsert`](Self::upsert), but treats an invalid entity as a bug
    /// in the caller.
    ///
    /// # Panics
    ///
    /// Panics if the entity is missing or has an empty ID.
    #[track_caller]
    pub fn must_upsert(&self, entity: impl Into<Option<Entity>>) {
        if let Err(err) = self.upsert(entity) {
            panic!("must_upsert: {err}");
        }
    }

    /// Remove the entity with `id`. Removing an unknown ID is a no-op.
    pub fn delete(&self, id: &str) {
        if self.entities.delete(id).is_some() {
            debug!("Deleted entity {:?}", id);
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Copy of the current entities, sorted by ID in ascending byte order.
    pub fn snapshot(&self) -> Vec<Arc<Entity>> {
        let mut entities = self.entities.values();
        entities.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        entities
    }

    /// Newline-terminated JSON records for a snapshot taken now.
    ///
    /// Each item is one complete record. An entity that fails to encode is
    /// replaced by an `{"error":...}` record and the stream moves on.
    pub fn export(&self) -> impl Stream<Item = Result<Vec<u8>, Infallible>> + Send + use<> {
        encode_entities(self.snapshot())
    }

    /// Upsert every entity in a JSON-lines document, returning how many were
    /// stored.
    ///
    /// Blank lines are skipped and a `null` line counts as a missing entity.
    /// Loading stops at the first bad line; entities from earlier lines stay
    /// in the registry.
    pub fn load_json_lines(&self, reader: impl BufRead) -> Result<usize, LoadError> {
        let mut loaded = 0;
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entity: Option<Entity> = serde_json::from_str(&line)
                .map_err(|source| LoadError::Parse { line: idx + 1, source })?;
            self.upsert(entity)
                .map_err(|source| LoadError::Invalid { line: idx + 1, source })?;
            loaded += 1;
        }
        Ok(loaded)
    }
}
