//! Error types for the registry.

use thiserror::Error;

/// Why an entity was refused by [`Registry::upsert`](crate::Registry::upsert).
///
/// Raised before the store is touched, so a rejected write never changes
/// what readers see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("nil entity cannot be upserted")]
    MissingEntity,

    #[error("entity must have an ID")]
    EmptyId,
}

/// A failure local to one entity while an export is being encoded.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode entity {id:?}: {source}")]
    Encode {
        id: String,
        source: serde_json::Error,
    },
}

/// Errors from [`Registry::load_json_lines`](crate::Registry::load_json_lines).
/// Line numbers start at 1.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid entity JSON: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        source: ValidationError,
    },
}
