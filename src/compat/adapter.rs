//! Read-through lookup cache over a [`KnowledgeBase`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use super::{FeatureSupportFact, KnowledgeBase};

/// Per-run view of the knowledge base.
///
/// Resolved facts are cached under the exact key string on first hit.
/// Entries never change for a key, so the cache is monotonic; create a new
/// adapter for each run.
pub struct CompatAdapter<'kb> {
    kb: &'kb KnowledgeBase,
    cache: RwLock<HashMap<String, FeatureSupportFact>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<'kb> CompatAdapter<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self {
            kb,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Resolve a dotted key. `None` means the knowledge base has no data.
    pub fn resolve(&self, key: &str) -> Option<FeatureSupportFact> {
        if let Ok(cache) = self.cache.read() {
            if let Some(fact) = cache.get(key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(*fact);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let fact = *self.kb.lookup(key)?;
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key.to_string(), fact);
        }
        Some(fact)
    }

    /// Whether `key` resolves to support data.
    pub fn contains(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    /// Number of cached keys.
    pub fn cached_len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Cache hit and miss counters.
    pub fn stats(&self) -> (usize, usize) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = r#"{
        "javascript": {"builtins": {"Promise": {"__compat": {"support": {
            "chrome": {"version_added": "32"}, "firefox": {"version_added": "29"},
            "safari": {"version_added": "8"}, "edge": {"version_added": "12"}
        }}}}}
    }"#;

    fn kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::empty();
        kb.merge_json_str(DATA).unwrap();
        kb
    }

    #[test]
    fn test_caches_hits_only() {
        let kb = kb();
        let adapter = CompatAdapter::new(&kb);

        assert!(adapter.resolve("javascript.builtins.Promise").is_some());
        assert_eq!(adapter.cached_len(), 1);
        assert!(adapter.resolve("javascript.builtins.Nope").is_none());
        assert_eq!(adapter.cached_len(), 1);

        // Second lookup of the same key is served from the cache.
        adapter.resolve("javascript.builtins.Promise");
        assert_eq!(adapter.stats(), (1, 2));
    }

    #[test]
    fn test_clear() {
        let kb = kb();
        let adapter = CompatAdapter::new(&kb);
        adapter.resolve("javascript.builtins.Promise");
        adapter.clear();
        assert_eq!(adapter.cached_len(), 0);
        assert!(adapter.contains("javascript.builtins.Promise"));
    }
}
