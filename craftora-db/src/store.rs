use crate::error::CraftoraDbResult as Result;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError, RwLock},
};

/// A named slot holding one JSON-encoded value of type `T`.
///
/// Slots are the unit of persistence: every mutation reads the whole slot,
/// computes a new value and writes it back wholesale.
pub struct Slot<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Slot<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The storage port. Implementations only move opaque strings; all typing
/// and corruption recovery happens in [`Store`].
pub trait StoreBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory backend, used by tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryBackend {
    map: RwLock<HashMap<String, String>>,
}

impl StoreBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(key);
        Ok(())
    }
}

/// File-backed backend: the whole key space lives in one JSON document (the
/// "profile"), reloaded at open and rewritten on every set. A missing or
/// unreadable profile loads as the empty map.
pub struct FileBackend {
    path: PathBuf,
    map: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let map = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            map: Mutex::new(map),
        })
    }

    fn flush(&self, map: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl StoreBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), value.to_string());
        self.flush(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.remove(key);
        self.flush(&map)
    }
}

type Watcher = Box<dyn Fn(&str) + Send + Sync>;

/// Handle to the key-value store every workflow operates on.
///
/// Reading a slot never fails on bad data: a value that is absent, not valid
/// JSON or of the wrong shape comes back as `T::default()`.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn StoreBackend>,
    watchers: Arc<Mutex<Vec<Watcher>>>,
}

impl Store {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend,
            watchers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Arc::new(FileBackend::open(path)?)))
    }

    pub fn read<T>(&self, slot: &Slot<T>) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.backend.get(slot.name())? {
            Some(raw) => Ok(serde_json::from_str(&raw).unwrap_or_default()),
            None => Ok(T::default()),
        }
    }

    pub fn write<T>(&self, slot: &Slot<T>, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let raw = serde_json::to_string(value)?;
        self.backend.set(slot.name(), &raw)?;
        self.notify(slot.name());
        Ok(())
    }

    pub fn clear<T>(&self, slot: &Slot<T>) -> Result<()> {
        self.backend.remove(slot.name())?;
        self.notify(slot.name());
        Ok(())
    }

    // Untyped access, needed by the legacy-data migration which has to look
    // at records before they fit the current shapes.
    pub fn read_raw(&self, name: &str) -> Result<Option<String>> {
        self.backend.get(name)
    }

    pub fn write_raw(&self, name: &str, raw: &str) -> Result<()> {
        self.backend.set(name, raw)?;
        self.notify(name);
        Ok(())
    }

    /// Register a callback invoked with the slot name after every write.
    /// This mirrors the cross-tab change notification of the original store:
    /// it is a display-refresh trigger, not a conflict-resolution hook.
    pub fn subscribe(&self, f: impl Fn(&str) + Send + Sync + 'static) {
        let mut watchers = self
            .watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        watchers.push(Box::new(f));
    }

    fn notify(&self, name: &str) {
        let watchers = self
            .watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for w in watchers.iter() {
            w(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const NUMBERS: Slot<Vec<i64>> = Slot::new("numbers");

    #[test]
    fn missing_slot_reads_as_default() {
        let store = Store::in_memory();
        assert_eq!(store.read(&NUMBERS).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn corrupt_slot_reads_as_default() {
        let store = Store::in_memory();
        store.write_raw("numbers", "definitely-not-json").unwrap();
        assert_eq!(store.read(&NUMBERS).unwrap(), Vec::<i64>::new());

        // Wrong shape is treated the same way as garbage
        store.write_raw("numbers", "{\"a\": 1}").unwrap();
        assert_eq!(store.read(&NUMBERS).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn rereading_never_changes_stored_bytes() {
        let store = Store::in_memory();
        store.write(&NUMBERS, &vec![1, 2, 3]).unwrap();
        let before = store.read_raw("numbers").unwrap();
        let _ = store.read(&NUMBERS).unwrap();
        let _ = store.read(&NUMBERS).unwrap();
        assert_eq!(store.read_raw("numbers").unwrap(), before);
    }

    #[test]
    fn subscribers_see_writes() {
        let store = Store::in_memory();
        let hits = Arc::new(AtomicUsize::new(0));
        let counted = hits.clone();
        store.subscribe(move |name| {
            if name == "numbers" {
                counted.fetch_add(1, Ordering::SeqCst);
            }
        });

        store.write(&NUMBERS, &vec![1]).unwrap();
        store.write(&Slot::<Vec<i64>>::new("other"), &vec![2]).unwrap();
        store.clear(&NUMBERS).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn file_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let store = Store::open(&path).unwrap();
        store.write(&NUMBERS, &vec![7, 8]).unwrap();
        drop(store);

        let store = Store::open(&path).unwrap();
        assert_eq!(store.read(&NUMBERS).unwrap(), vec![7, 8]);
    }

    #[test]
    fn corrupt_profile_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, "{{{{").unwrap();

        let store = Store::open(&path).unwrap();
        assert_eq!(store.read(&NUMBERS).unwrap(), Vec::<i64>::new());
    }
}
