use std::collections::BTreeMap;

/// Serialized catalog shape: product name → resource link.
pub type CatalogEntries = BTreeMap<String, String>;

/// In-memory catalog of registered products.
///
/// Names are case-sensitive unique keys. Links are opaque: they are handed to
/// recipients as-is and never parsed or validated here.
///
/// Backed by an ordered map so listings are deterministic (byte-wise name
/// order) for the lifetime of the process and across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: CatalogEntries,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from previously persisted entries.
    pub fn from_entries(entries: CatalogEntries) -> Self {
        Self { entries }
    }

    /// Upsert a product (last write wins).
    ///
    /// Returns the link that was replaced, if the name already existed.
    pub fn register(&mut self, name: impl Into<String>, link: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), link.into())
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Registered product names in deterministic order.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The full mapping, as written to durable storage.
    pub fn entries(&self) -> &CatalogEntries {
        &self.entries
    }
}
