//! Persistence port for dashboard state.
//!
//! The [`StateStore`] trait defines the key-value operations needed by the
//! lists, saved-search, notes, and enrichment-cache layers, enabling pluggable
//! backends (JSON file, in-memory, future remote stores) without touching
//! call sites.
//!
//! State is organized into flat namespaces, each a map of id → JSON value:
//!
//! | Namespace | Contents |
//! |-----------|----------|
//! | `lists` | [`CompanyList`](crate::models::CompanyList) records |
//! | `saved_searches` | [`SavedSearch`](crate::models::SavedSearch) records |
//! | `notes` | Free-text note strings keyed by company id |
//! | `enrichment` | Cached [`EnrichmentResult`](crate::models::EnrichmentResult)s keyed by company id |
//!
//! Writes are synchronous and last-write-wins; there is no cross-process
//! locking or merge. [`CachedStore`] layers a process-local in-memory cache
//! in front of any backend for cheap synchronous reads.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// Namespace for curated lists.
pub const NS_LISTS: &str = "lists";
/// Namespace for saved searches.
pub const NS_SAVED_SEARCHES: &str = "saved_searches";
/// Namespace for per-company notes.
pub const NS_NOTES: &str = "notes";
/// Namespace for cached enrichment results.
pub const NS_ENRICHMENT: &str = "enrichment";

/// Callback invoked with `(namespace, key)` after every mutation.
pub type StoreListener = Box<dyn Fn(&str, &str) + Send + Sync>;

/// Abstract key-value backend for dashboard state.
pub trait StateStore: Send + Sync {
    /// Read a single value, or `None` if absent.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>>;

    /// Insert or overwrite a value. Last write wins.
    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<()>;

    /// Remove a value. Removing an absent key is a no-op.
    fn remove(&self, namespace: &str, key: &str) -> Result<()>;

    /// All `(key, value)` pairs in a namespace, sorted by key.
    fn entries(&self, namespace: &str) -> Result<Vec<(String, Value)>>;

    /// Register a listener notified after every `put`/`remove`.
    fn subscribe(&self, listener: StoreListener);
}

// ============ In-memory store ============

/// In-memory [`StateStore`] for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, BTreeMap<String, Value>>>,
    listeners: Mutex<Vec<StoreListener>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, namespace: &str, key: &str) {
        let listeners = self.listeners.lock().unwrap();
        for l in listeners.iter() {
            l(namespace, key);
        }
    }
}

impl StateStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>> {
        let data = self.data.read().unwrap();
        Ok(data.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<()> {
        {
            let mut data = self.data.write().unwrap();
            data.entry(namespace.to_string())
                .or_default()
                .insert(key.to_string(), value);
        }
        self.notify(namespace, key);
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<()> {
        {
            let mut data = self.data.write().unwrap();
            if let Some(ns) = data.get_mut(namespace) {
                ns.remove(key);
            }
        }
        self.notify(namespace, key);
        Ok(())
    }

    fn entries(&self, namespace: &str) -> Result<Vec<(String, Value)>> {
        let data = self.data.read().unwrap();
        Ok(data
            .get(namespace)
            .map(|ns| ns.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn subscribe(&self, listener: StoreListener) {
        self.listeners.lock().unwrap().push(listener);
    }
}

// ============ JSON file store ============

/// [`StateStore`] backed by a single JSON file.
///
/// The file holds one object per namespace. Every mutation rewrites the
/// whole file; concurrent processes editing the same file silently
/// overwrite each other.
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<BTreeMap<String, BTreeMap<String, Value>>>,
    listeners: Mutex<Vec<StoreListener>>,
}

impl JsonFileStore {
    /// Open (or create) the state file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Corrupt state file: {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            state: RwLock::new(state),
            listeners: Mutex::new(Vec::new()),
        })
    }

    fn flush(&self, state: &BTreeMap<String, BTreeMap<String, Value>>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;
        Ok(())
    }

    fn notify(&self, namespace: &str, key: &str) {
        let listeners = self.listeners.lock().unwrap();
        for l in listeners.iter() {
            l(namespace, key);
        }
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>> {
        let state = self.state.read().unwrap();
        Ok(state.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<()> {
        {
            let mut state = self.state.write().unwrap();
            state
                .entry(namespace.to_string())
                .or_default()
                .insert(key.to_string(), value);
            self.flush(&state)?;
        }
        self.notify(namespace, key);
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<()> {
        {
            let mut state = self.state.write().unwrap();
            if let Some(ns) = state.get_mut(namespace) {
                ns.remove(key);
            }
            self.flush(&state)?;
        }
        self.notify(namespace, key);
        Ok(())
    }

    fn entries(&self, namespace: &str) -> Result<Vec<(String, Value)>> {
        let state = self.state.read().unwrap();
        Ok(state
            .get(namespace)
            .map(|ns| ns.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn subscribe(&self, listener: StoreListener) {
        self.listeners.lock().unwrap().push(listener);
    }
}

// ============ Read-through cache ============

/// Process-local in-memory cache layered in front of another backend.
///
/// Reads are served from the cache once populated; writes go through to the
/// inner store and update the cache. A namespace is loaded in full on first
/// access, so `entries` never hits the backend twice.
pub struct CachedStore {
    inner: Box<dyn StateStore>,
    cache: RwLock<BTreeMap<String, BTreeMap<String, Value>>>,
}

impl CachedStore {
    pub fn new(inner: Box<dyn StateStore>) -> Self {
        Self {
            inner,
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    fn ensure_loaded(&self, namespace: &str) -> Result<()> {
        {
            let cache = self.cache.read().unwrap();
            if cache.contains_key(namespace) {
                return Ok(());
            }
        }
        let loaded: BTreeMap<String, Value> =
            self.inner.entries(namespace)?.into_iter().collect();
        let mut cache = self.cache.write().unwrap();
        cache.entry(namespace.to_string()).or_insert(loaded);
        Ok(())
    }
}

impl StateStore for CachedStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>> {
        self.ensure_loaded(namespace)?;
        let cache = self.cache.read().unwrap();
        Ok(cache.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<()> {
        self.ensure_loaded(namespace)?;
        self.inner.put(namespace, key, value.clone())?;
        let mut cache = self.cache.write().unwrap();
        cache
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<()> {
        self.ensure_loaded(namespace)?;
        self.inner.remove(namespace, key)?;
        let mut cache = self.cache.write().unwrap();
        if let Some(ns) = cache.get_mut(namespace) {
            ns.remove(key);
        }
        Ok(())
    }

    fn entries(&self, namespace: &str) -> Result<Vec<(String, Value)>> {
        self.ensure_loaded(namespace)?;
        let cache = self.cache.read().unwrap();
        Ok(cache
            .get(namespace)
            .map(|ns| ns.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn subscribe(&self, listener: StoreListener) {
        self.inner.subscribe(listener);
    }
}

/// Open the configured store: a JSON file behind a read-through cache.
pub fn open_store(path: &Path) -> Result<Box<dyn StateStore>> {
    let file = JsonFileStore::open(path)?;
    Ok(Box::new(CachedStore::new(Box::new(file))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_memory_put_get_remove() {
        let store = MemoryStore::new();
        store.put(NS_NOTES, "c1", json!("promising team")).unwrap();
        assert_eq!(
            store.get(NS_NOTES, "c1").unwrap(),
            Some(json!("promising team"))
        );

        store.remove(NS_NOTES, "c1").unwrap();
        assert_eq!(store.get(NS_NOTES, "c1").unwrap(), None);

        // Removing an absent key is a no-op
        store.remove(NS_NOTES, "never-existed").unwrap();
    }

    #[test]
    fn test_memory_entries_sorted() {
        let store = MemoryStore::new();
        store.put(NS_LISTS, "b", json!(2)).unwrap();
        store.put(NS_LISTS, "a", json!(1)).unwrap();
        let entries = store.entries(NS_LISTS).unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_subscribe_fires_on_mutation() {
        let store = MemoryStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        store.subscribe(Box::new(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        store.put(NS_NOTES, "c1", json!("x")).unwrap();
        store.remove(NS_NOTES, "c1").unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("state.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.put(NS_NOTES, "c1", json!("note text")).unwrap();
            store
                .put(NS_LISTS, "list_1", json!({"name": "Pipeline"}))
                .unwrap();
        }

        // Reopen and verify persistence
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get(NS_NOTES, "c1").unwrap(), Some(json!("note text")));
        assert_eq!(
            store.get(NS_LISTS, "list_1").unwrap(),
            Some(json!({"name": "Pipeline"}))
        );
    }

    #[test]
    fn test_json_file_last_write_wins() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        let store = JsonFileStore::open(&path).unwrap();

        store.put(NS_NOTES, "c1", json!("first")).unwrap();
        store.put(NS_NOTES, "c1", json!("second")).unwrap();
        assert_eq!(store.get(NS_NOTES, "c1").unwrap(), Some(json!("second")));
    }

    #[test]
    fn test_cached_store_write_through() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("state.json");

        let cached = CachedStore::new(Box::new(JsonFileStore::open(&path).unwrap()));
        cached.put(NS_ENRICHMENT, "c1", json!({"summary": "s"})).unwrap();

        // The write must reach the backing file, not just the cache
        let fresh = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            fresh.get(NS_ENRICHMENT, "c1").unwrap(),
            Some(json!({"summary": "s"}))
        );
    }

    #[test]
    fn test_cached_store_loads_existing_state() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("state.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.put(NS_NOTES, "c9", json!("seeded")).unwrap();
        }

        let cached = CachedStore::new(Box::new(JsonFileStore::open(&path).unwrap()));
        assert_eq!(cached.get(NS_NOTES, "c9").unwrap(), Some(json!("seeded")));
        assert_eq!(cached.entries(NS_NOTES).unwrap().len(), 1);
    }
}
