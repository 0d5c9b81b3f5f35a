use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use keydrop_catalog::CatalogEntries;

use super::r#trait::{DurableStore, StoreError};

/// Catalog persisted as one pretty-printed JSON object (`name -> link`).
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the target, so readers never observe a half-written catalog. Non-ASCII
/// names are written verbatim (UTF-8).
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(entries: &CatalogEntries) -> Result<Vec<u8>, StoreError> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        entries
            .serialize(&mut ser)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        buf.push(b'\n');
        Ok(buf)
    }
}

impl DurableStore for JsonFileStore {
    fn read_all(&self) -> Result<Option<CatalogEntries>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if raw.trim().is_empty() {
            return Ok(Some(CatalogEntries::new()));
        }

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    fn write_all(&self, entries: &CatalogEntries) -> Result<(), StoreError> {
        let bytes = Self::encode(entries)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tmp.write_all(&bytes).map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        tracing::debug!(path = %self.path.display(), products = entries.len(), "catalog written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> CatalogEntries {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("product_links.json"));
        assert!(store.read_all().unwrap().is_none());
    }

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("product_links.json"));
        let data = entries(&[("KeyA", "http://x/a"), ("설치 파일", "http://x/설치")]);

        store.write_all(&data).unwrap();
        assert_eq!(store.read_all().unwrap(), Some(data));
    }

    #[test]
    fn file_is_a_flat_pretty_json_object_with_raw_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product_links.json");
        let store = JsonFileStore::new(&path);

        store.write_all(&entries(&[("가방", "http://x/bag")])).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "{\n    \"가방\": \"http://x/bag\"\n}\n");
    }

    #[test]
    fn overwrite_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("catalog.json"));

        store.write_all(&entries(&[("A", "1"), ("B", "2")])).unwrap();
        store.write_all(&entries(&[("A", "3")])).unwrap();

        assert_eq!(store.read_all().unwrap(), Some(entries(&[("A", "3")])));
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/catalog.json"));
        store.write_all(&entries(&[("A", "1")])).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn blocked_parent_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("state"), b"").unwrap();
        let store = JsonFileStore::new(dir.path().join("state/catalog.json"));

        let err = store.write_all(&entries(&[("A", "1")])).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).read_all().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn blank_file_reads_as_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "\n").unwrap();

        assert_eq!(JsonFileStore::new(&path).read_all().unwrap(), Some(CatalogEntries::new()));
    }
}
