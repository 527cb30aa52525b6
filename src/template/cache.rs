//! Per-file template cache

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::SentinelMarkers;
use crate::core::Result;
use crate::template::indexer::{self, Template};

/// Indexes each template file once and hands out shared references
pub struct TemplateCache {
    dir: PathBuf,
    markers: SentinelMarkers,
    templates: RwLock<HashMap<PathBuf, Arc<Template>>>,
}

impl TemplateCache {
    pub fn new(dir: impl Into<PathBuf>, markers: SentinelMarkers) -> Self {
        Self {
            dir: dir.into(),
            markers,
            templates: RwLock::new(HashMap::new()),
        }
    }

    /// Template for `file`, resolved against the template directory
    pub fn get(&self, file: impl AsRef<Path>) -> Result<Arc<Template>> {
        let path = self.dir.join(file);
        if let Some(template) = self.templates.read().unwrap().get(&path) {
            return Ok(Arc::clone(template));
        }

        // Index outside the lock; a racing reader may index twice but the
        // first insert wins so every caller shares one instance.
        let template = Arc::new(indexer::index(&path, &self.markers)?);
        let mut templates = self.templates.write().unwrap();
        Ok(Arc::clone(templates.entry(path).or_insert(template)))
    }

    /// Drop every cached template
    pub fn clear(&self) {
        self.templates.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.templates.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn markers(&self) -> &SentinelMarkers {
        &self.markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::indexer::tests::sample_file;
    use tempfile::TempDir;

    #[test]
    fn test_indexes_once() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        sample_file().write(&temp_dir.path().join("mine.json")).expect("write");

        let cache = TemplateCache::new(temp_dir.path(), SentinelMarkers::default());
        let a = cache.get("mine.json").expect("first get");
        let b = cache.get("mine.json").expect("second get");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_file_not_cached() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let cache = TemplateCache::new(temp_dir.path(), SentinelMarkers::default());
        assert!(cache.get("absent.json").unwrap_err().is_transient());
        assert!(cache.is_empty());
    }
}
