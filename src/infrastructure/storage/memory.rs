use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::models::Storage;

/// In memory storage for tests. Clones share the same entries, so a test can
/// keep a clone around to inspect what was persisted.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<DashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        return self.entries.get(key).map(|val| return val.to_string());
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}
