//! Keyed byte storage for clip media.
//!
//! Clip bytes are stored per clip id; clips that share a `source_id` share
//! the backing bytes, so duplication is a cheap reference copy.

use framecut_core::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A simple keyed byte store.
pub trait BlobStore: Send + Sync {
    /// Persist bytes under a key, replacing any existing entry.
    fn save(&self, key: &str, bytes: Arc<Vec<u8>>) -> Result<()>;

    /// Fetch the bytes for a key, if present.
    fn load(&self, key: &str) -> Option<Arc<Vec<u8>>>;

    /// Remove a key. Missing keys are not an error.
    fn remove(&self, key: &str);
}

/// In-memory `BlobStore`. Shared byte buffers make copy-by-reference the
/// natural duplication path.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: RwLock<HashMap<String, Arc<Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn save(&self, key: &str, bytes: Arc<Vec<u8>>) -> Result<()> {
        self.entries.write().insert(key.to_string(), bytes);
        Ok(())
    }

    fn load(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.entries.read().get(key).cloned()
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}
