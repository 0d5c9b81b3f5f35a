use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use keydrop_catalog::CatalogEntries;

/// Durable store operation error.
///
/// These are **infrastructure errors**; the catalog itself has no failure modes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    Serialize(String),

    #[error("stored catalog is corrupt: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Whole-catalog persistence.
///
/// ## Semantics
///
/// - `read_all()` returns `Ok(None)` when nothing has ever been written
///   (an absent store is an empty catalog, not an error)
/// - `write_all()` replaces everything previously stored, as atomically as the
///   backend allows
/// - no concurrency control: callers serialize writes
pub trait DurableStore: Send + Sync {
    fn read_all(&self) -> Result<Option<CatalogEntries>, StoreError>;

    fn write_all(&self, entries: &CatalogEntries) -> Result<(), StoreError>;
}

impl<S> DurableStore for Arc<S>
where
    S: DurableStore + ?Sized,
{
    fn read_all(&self) -> Result<Option<CatalogEntries>, StoreError> {
        (**self).read_all()
    }

    fn write_all(&self, entries: &CatalogEntries) -> Result<(), StoreError> {
        (**self).write_all(entries)
    }
}
