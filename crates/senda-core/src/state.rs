// ── View and notification state ──
//
// `ViewState` holds the latest snapshot of one view and drops results from
// superseded requests. `ReadStateStore` remembers which notifications a
// user has already read.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;

// ── ViewState ────────────────────────────────────────────────────────

/// Ticket for one fetch. Only the most recently issued ticket may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug)]
struct Snapshot<T> {
    generation: u64,
    value: Option<Arc<T>>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            value: self.value.clone(),
        }
    }
}

/// Latest-request-wins holder for a view's data.
///
/// Every fetch calls [`begin`](Self::begin) for a [`Generation`] and hands
/// it back with the result to [`apply`](Self::apply). A result is applied
/// only if no newer fetch has started since, so a slow response can never
/// overwrite a fresher one.
pub struct ViewState<T: Send + Sync + 'static> {
    issued: AtomicU64,
    tx: watch::Sender<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> ViewState<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot {
            generation: 0,
            value: None,
        });
        Self {
            issued: AtomicU64::new(0),
            tx,
        }
    }

    /// Start a fetch. Invalidates every earlier generation.
    pub fn begin(&self) -> Generation {
        Generation(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Store `value` if `generation` is still the latest. Returns whether it was applied.
    pub fn apply(&self, generation: Generation, value: T) -> bool {
        let mut value = Some(Arc::new(value));
        let applied = self.tx.send_if_modified(|snap| {
            let latest = self.issued.load(Ordering::SeqCst);
            if generation.0 == latest && generation.0 > snap.generation {
                snap.generation = generation.0;
                snap.value = value.take();
                true
            } else {
                false
            }
        });
        if !applied {
            debug!(generation = generation.0, "dropping stale view result");
        }
        applied
    }

    /// The applied value, `None` until the first fetch lands.
    pub fn current(&self) -> Option<Arc<T>> {
        self.tx.borrow().value.clone()
    }

    pub fn subscribe(&self) -> ViewStream<T> {
        ViewStream {
            receiver: self.tx.subscribe(),
        }
    }
}

impl<T: Send + Sync + 'static> Default for ViewState<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription to a [`ViewState`].
pub struct ViewStream<T: Send + Sync + 'static> {
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> ViewStream<T> {
    /// Wait for the next applied value. `None` once the state is dropped.
    pub async fn changed(&mut self) -> Option<Arc<T>> {
        self.receiver.changed().await.ok()?;
        self.receiver.borrow_and_update().value.clone()
    }
}

// ── Notification read state ──────────────────────────────────────────

/// Remembers read notification ids per user.
pub trait ReadStateStore: Send + Sync {
    fn read_ids(&self, user_id: &str) -> Result<BTreeSet<String>, CoreError>;

    fn mark_read(&self, user_id: &str, ids: &[String]) -> Result<(), CoreError>;
}

fn poisoned() -> CoreError {
    CoreError::Internal("read-state lock poisoned".into())
}

/// Process-local store; forgets everything on exit.
#[derive(Debug, Default)]
pub struct MemoryReadState {
    inner: Mutex<BTreeMap<String, BTreeSet<String>>>,
}

impl MemoryReadState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadStateStore for MemoryReadState {
    fn read_ids(&self, user_id: &str) -> Result<BTreeSet<String>, CoreError> {
        let map = self.inner.lock().map_err(|_| poisoned())?;
        Ok(map.get(user_id).cloned().unwrap_or_default())
    }

    fn mark_read(&self, user_id: &str, ids: &[String]) -> Result<(), CoreError> {
        let mut map = self.inner.lock().map_err(|_| poisoned())?;
        map.entry(user_id.to_owned())
            .or_default()
            .extend(ids.iter().cloned());
        Ok(())
    }
}

/// JSON file of `{ "<user id>": ["<notification id>", ...] }`.
#[derive(Debug)]
pub struct FileReadState {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileReadState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `notifications.json` in the platform data directory.
    pub fn default_location() -> Option<Self> {
        ProjectDirs::from("com", "senda", "senda")
            .map(|dirs| Self::new(dirs.data_dir().join("notifications.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, BTreeSet<String>>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| CoreError::Config {
                message: format!("cannot parse {}: {e}", self.path.display()),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, map: &BTreeMap<String, BTreeSet<String>>) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| CoreError::Internal(format!("cannot encode read state: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ReadStateStore for FileReadState {
    fn read_ids(&self, user_id: &str) -> Result<BTreeSet<String>, CoreError> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        Ok(self.load()?.remove(user_id).unwrap_or_default())
    }

    fn mark_read(&self, user_id: &str, ids: &[String]) -> Result<(), CoreError> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut map = self.load()?;
        map.entry(user_id.to_owned())
            .or_default()
            .extend(ids.iter().cloned());
        self.store(&map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::{FileReadState, MemoryReadState, ReadStateStore, ViewState};

    #[test]
    fn stale_generation_never_overwrites_newer() {
        let state = ViewState::new();
        let slow = state.begin();
        let fast = state.begin();

        assert!(state.apply(fast, "fresh"));
        assert!(!state.apply(slow, "stale"));
        assert_eq!(state.current().as_deref(), Some(&"fresh"));
    }

    #[test]
    fn result_from_superseded_request_is_dropped_even_if_first() {
        let state = ViewState::new();
        let first = state.begin();
        let _second = state.begin();

        assert!(!state.apply(first, 1));
        assert_eq!(state.current(), None);
    }

    #[test]
    fn generation_applies_once() {
        let state = ViewState::new();
        let g = state.begin();
        assert!(state.apply(g, 1));
        assert!(!state.apply(g, 2));
        assert_eq!(state.current().as_deref(), Some(&1));
    }

    #[tokio::test]
    async fn subscribers_see_applied_values() {
        let state = ViewState::new();
        let mut stream = state.subscribe();

        let g = state.begin();
        state.apply(g, vec![1, 2, 3]);
        assert_eq!(stream.changed().await.as_deref(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn memory_store_is_per_user() {
        let store = MemoryReadState::new();
        store.mark_read("u1", &["v1".into(), "v2".into()]).unwrap();
        store.mark_read("u1", &["v2".into()]).unwrap();

        assert_eq!(store.read_ids("u1").unwrap().len(), 2);
        assert!(store.read_ids("u2").unwrap().is_empty());
    }

    #[test]
    fn file_store_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("notifications.json");

        FileReadState::new(&path)
            .mark_read("u1", &["v1".into()])
            .unwrap();
        let reloaded = FileReadState::new(&path);
        reloaded.mark_read("u2", &["v9".into()]).unwrap();

        let expected: BTreeSet<String> = ["v1".to_owned()].into();
        assert_eq!(reloaded.read_ids("u1").unwrap(), expected);
        assert_eq!(reloaded.read_ids("u2").unwrap().len(), 1);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileReadState::new(dir.path().join("none.json"));
        assert!(store.read_ids("u1").unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(FileReadState::new(path).read_ids("u1").is_err());
    }
}
