//! Content hashes of watched files
//!
//! Editors often save a file without changing it. Those saves must not start
//! a rebuild, so the driver remembers the hash of every file the last program
//! read and compares against it when a change is reported.

use std::collections::HashMap;

use crate::domain::value_objects::ContentHash;

#[derive(Debug, Default)]
pub struct ContentCache {
    /// Canonical file path to the hash of its last seen content
    hashes: HashMap<String, ContentHash>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Remember `content` as the current text of `path`.
    pub fn update(&mut self, path: &str, content: &str) {
        self.hashes.insert(path.to_string(), ContentHash::from_content(content));
    }

    /// Record `content` for `path` and report whether it differs from what
    /// was seen before. Unknown files count as changed.
    pub fn observe(&mut self, path: &str, content: &str) -> bool {
        let hash = ContentHash::from_content(content);
        match self.hashes.get(path) {
            Some(cached) if *cached == hash => false,
            _ => {
                self.hashes.insert(path.to_string(), hash);
                true
            }
        }
    }

    pub fn invalidate(&mut self, path: &str) {
        self.hashes.remove(path);
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.hashes.retain(|path, _| keep(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_is_not_a_change() {
        let mut cache = ContentCache::new();
        cache.update("/p/a.ts", "let a = 1;");
        assert!(!cache.observe("/p/a.ts", "let a = 1;"));
        assert!(cache.observe("/p/a.ts", "let a = 2;"));
        assert!(!cache.observe("/p/a.ts", "let a = 2;"));
    }

    #[test]
    fn unknown_and_invalidated_files_are_changes() {
        let mut cache = ContentCache::new();
        assert!(cache.observe("/p/new.ts", ""));
        cache.invalidate("/p/new.ts");
        assert!(cache.observe("/p/new.ts", ""));
    }

    #[test]
    fn retain_drops_files_no_longer_in_program() {
        let mut cache = ContentCache::new();
        cache.update("/p/a.ts", "a");
        cache.update("/p/b.ts", "b");
        cache.retain(|path| path == "/p/a.ts");
        assert_eq!(cache.len(), 1);
        assert!(!cache.observe("/p/a.ts", "a"));
    }
}
