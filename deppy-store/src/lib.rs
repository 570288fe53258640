//! In-memory storage for the deppy registry.
//!
//! [`SyncMap`] is a generic key/value map guarded by a single reader/writer
//! lock. Any number of readers proceed together; a writer excludes everyone
//! else for the duration of one map operation. Enumeration hands out copies,
//! so callers never iterate the live map.

mod sync_map;

pub use sync_map::SyncMap;
