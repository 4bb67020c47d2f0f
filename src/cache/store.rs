use std::{collections::HashMap, path::{Path, PathBuf}, sync::Arc};

use crate::{cache::CacheKey, common::ensure_parent_exists, Result};

/// Byte store for pipeline tables, keyed by path-shaped [`CacheKey`]s.
pub trait TableCache {
    /// The stored bytes, or `None` when the key was never written.
    fn get(&self, key: &CacheKey) -> Result<Option<Arc<[u8]>>>;
    fn has(&self, key: &CacheKey) -> bool;
    fn put(&mut self, key: &CacheKey, bytes: &[u8]) -> Result<()>;
}

impl<C: TableCache + ?Sized> TableCache for &mut C {
    fn get(&self, key: &CacheKey) -> Result<Option<Arc<[u8]>>> { (**self).get(key) }

    fn has(&self, key: &CacheKey) -> bool { (**self).has(key) }

    fn put(&mut self, key: &CacheKey, bytes: &[u8]) -> Result<()> { (**self).put(key, bytes) }
}

/// Files under a resources root; a key is the relative file path.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    pub fn path(&self, key: &CacheKey) -> PathBuf { key.to_path(&self.root) }
}

impl TableCache for DiskCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Arc<[u8]>>> {
        let path = self.path(key);
        if !path.is_file() {
            return Ok(None)
        }
        Ok(Some(Arc::from(std::fs::read(path)?)))
    }

    fn has(&self, key: &CacheKey) -> bool { self.path(key).is_file() }

    fn put(&mut self, key: &CacheKey, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        ensure_parent_exists(&path)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// In-memory store, for tests and one-shot runs.
#[derive(Debug, Default, Clone)]
pub struct MemCache {
    files: HashMap<CacheKey, Arc<[u8]>>,
}

impl MemCache {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.files.len() }

    pub fn is_empty(&self) -> bool { self.files.is_empty() }
}

impl TableCache for MemCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Arc<[u8]>>> {
        Ok(self.files.get(key).cloned())
    }

    fn has(&self, key: &CacheKey) -> bool { self.files.contains_key(key) }

    fn put(&mut self, key: &CacheKey, bytes: &[u8]) -> Result<()> {
        self.files.insert(key.clone(), Arc::from(bytes));
        Ok(())
    }
}
