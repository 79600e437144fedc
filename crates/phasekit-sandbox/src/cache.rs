//! Opt-in, content-addressed AST cache.
//!
//! Key = SHA256 of identifier + source, so an edited plugin always misses and
//! is parsed again. Only parsing is reused; scripts still execute on every
//! compile.

use rhai::AST;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct AstCache {
    entries: Mutex<HashMap<String, Arc<AST>>>,
}

impl AstCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the cache key for a script.
    pub fn key(identifier: &str, code: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(identifier.as_bytes());
        hasher.update([0u8]);
        hasher.update(code.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<Arc<AST>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: String, ast: Arc<AST>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, ast);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_deterministic_and_content_sensitive() {
        let k1 = AstCache::key("a.rhai", "exports.x = 1;");
        let k2 = AstCache::key("a.rhai", "exports.x = 1;");
        let k3 = AstCache::key("a.rhai", "exports.x = 2;");
        let k4 = AstCache::key("b.rhai", "exports.x = 1;");
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), 64);
        assert_ne!(k1, k3);
        assert_ne!(k1, k4);
    }

    #[test]
    fn test_insert_and_get() {
        let cache = AstCache::new();
        assert!(cache.is_empty());
        let ast = Arc::new(rhai::Engine::new().compile("1 + 1").unwrap());
        cache.insert("k".to_string(), ast.clone());
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&cache.get("k").unwrap(), &ast));
        assert!(cache.get("missing").is_none());
    }
}
