use std::{collections::HashMap, sync::Mutex};

use tracing::warn;

/// Key-value cache for L402 credentials, keyed by request URL.
pub trait L402Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&self, key: &str, value: String);
}

/// Keeps credentials for the lifetime of the process.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: HashMap<String, String>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }
}

impl L402Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.items.lock() {
            Ok(items) => items.get(key).cloned(),
            Err(e) => {
                warn!("L402 storage lock poisoned: {e}");
                None
            }
        }
    }

    fn put(&self, key: &str, value: String) {
        match self.items.lock() {
            Ok(mut items) => {
                items.insert(key.to_string(), value);
            }
            Err(e) => warn!("L402 storage lock poisoned: {e}"),
        }
    }
}

/// Never remembers anything, every request pays again.
pub struct NoStorage;

impl L402Storage for NoStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn put(&self, _key: &str, _value: String) {}
}
