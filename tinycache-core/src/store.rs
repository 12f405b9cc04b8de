use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::PatternError;
use crate::pattern::Pattern;
use crate::sweeper::{self, ExpirationSweeper, SharedState};

/// TTLs are capped to ~100 years so expiry arithmetic cannot overflow.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// The value map plus the sparse expiry map.
///
/// Every key in `expiries` is also in `values`; a key without an expiry is permanent.
#[derive(Debug, Default)]
pub(crate) struct Maps {
    values: HashMap<String, Arc<Value>>,
    expiries: HashMap<String, Instant>,
}

impl Maps {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: HashMap::with_capacity(capacity),
            expiries: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts or overwrites `key`; `None` clears any previous expiry.
    pub(crate) fn insert(&mut self, key: String, value: Arc<Value>, expires_at: Option<Instant>) {
        match expires_at {
            Some(at) => {
                self.expiries.insert(key.clone(), at);
            }
            None => {
                self.expiries.remove(&key);
            }
        }
        self.values.insert(key, value);
    }

    pub(crate) fn is_expired(&self, key: &str, now: Instant) -> bool {
        self.expiries.get(key).is_some_and(|at| *at <= now)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.expiries.remove(key);
        self.values.remove(key).is_some()
    }

    pub(crate) fn remove_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .expiries
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

/// Internal shared state for the store
struct StoreInner {
    state: SharedState,
    sweeper: ExpirationSweeper,
}

/// Thread-safe in-memory key-value store with per-key TTL
///
/// All state sits behind a single reader/writer lock. Reads (`get`, `keys`)
/// share it; every mutation takes it exclusively for its whole critical
/// section, so operations on the same key are linearizable.
///
/// Expired entries are dropped in two ways: lazily, when `get` finds one, and
/// actively, by a background sweeper that wakes every
/// [`sweep_resolution`](StoreConfig::sweep_resolution).
///
/// `close` is terminal. Calling any operation on a closed store panics; that is
/// a caller bug, not a recoverable condition.
///
/// # Example
///
/// ```rust,no_run
/// use tinycache_core::{Store, StoreConfig};
/// use serde_json::json;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let store = Store::with_config(
///         StoreConfig::default().with_sweep_resolution(Duration::from_millis(500)),
///     );
///
///     store.set("session:1", json!({"user": "alice"}), Duration::from_secs(30));
///     store.set("config", "permanent", Duration::ZERO);
///
///     assert!(store.get("config").is_some());
///     assert_eq!(store.keys("session:*").unwrap(), vec!["session:1"]);
///     assert_eq!(store.delete(["session:1", "missing"]), 1);
///
///     store.close();
/// }
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Creates a new store with default configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The store requires
    /// a runtime to spawn its expiration sweeper.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a new store with custom configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    pub fn with_config(config: StoreConfig) -> Self {
        if tokio::runtime::Handle::try_current().is_err() {
            panic!(
                "tinycache_core::Store requires a Tokio runtime. \
                 Create the store from within a #[tokio::main] or #[tokio::test] \
                 context, or from code running on a Tokio runtime."
            );
        }

        let resolution = config.effective_sweep_resolution();
        let state: SharedState = Arc::new(RwLock::new(Some(Maps::with_capacity(
            config.initial_capacity,
        ))));
        let sweeper = ExpirationSweeper::spawn(Arc::clone(&state), resolution);

        tracing::debug!(?resolution, "store opened");

        Self {
            inner: Arc::new(StoreInner { state, sweeper }),
        }
    }

    /// Stores `value` under `key`, overwriting any previous entry.
    ///
    /// A zero `ttl` means the entry never expires and clears any expiry the key
    /// carried before. A positive `ttl` makes the entry expire `ttl` from now.
    ///
    /// # Panics
    ///
    /// Panics if the store has been closed.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>, ttl: Duration) {
        let key = key.into();
        let value = Arc::new(value.into());

        let mut guard = self.inner.state.write();
        let maps = open_mut(&mut guard, "set");
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl.min(MAX_TTL));
        maps.insert(key, value, expires_at);
    }

    /// Returns the value stored under `key`, or `None` if it is absent or expired.
    ///
    /// Only the shared lock is taken to look the key up. When the entry turns
    /// out to be expired, one non-blocking attempt is made to remove it; if the
    /// lock is busy the entry is left for the sweeper.
    ///
    /// # Panics
    ///
    /// Panics if the store has been closed.
    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        {
            let guard = self.inner.state.read();
            let maps = open_ref(&guard, "get");
            let value = maps.values.get(key)?;
            if !maps.is_expired(key, Instant::now()) {
                return Some(Arc::clone(value));
            }
        }

        self.try_remove_expired(key);
        None
    }

    fn try_remove_expired(&self, key: &str) {
        let Some(mut guard) = self.inner.state.try_write() else {
            tracing::trace!(key = %truncate_key_for_log(key), "lock busy, leaving expired key to the sweeper");
            return;
        };

        // a concurrent set may have refreshed the key since the read lock was released
        if let Some(maps) = guard.as_mut() {
            if maps.is_expired(key, Instant::now()) {
                maps.remove(key);
                tracing::trace!(key = %truncate_key_for_log(key), "removed expired key on read");
            }
        }
    }

    /// Removes every listed key that exists, expired or not.
    ///
    /// Returns how many of the removed keys were still live. Unknown keys add
    /// nothing, and a key listed twice is only found the first time.
    ///
    /// # Panics
    ///
    /// Panics if the store has been closed.
    pub fn delete<I, K>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut guard = self.inner.state.write();
        let maps = open_mut(&mut guard, "delete");
        let now = Instant::now();

        let mut deleted = 0;
        for key in keys {
            let key = key.as_ref();
            if !maps.contains(key) {
                continue;
            }
            if !maps.is_expired(key, now) {
                deleted += 1;
            }
            maps.remove(key);
        }
        deleted
    }

    /// Returns every live key whose whole value matches the glob `pattern`.
    ///
    /// The order of the result is unspecified. Expired keys are skipped but
    /// not removed; the sweeper or the next `get` takes care of them.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if `pattern` is malformed.
    ///
    /// # Panics
    ///
    /// Panics if the store has been closed.
    pub fn keys(&self, pattern: &str) -> Result<Vec<String>, PatternError> {
        let guard = self.inner.state.read();
        let maps = open_ref(&guard, "keys");
        let pattern = Pattern::compile(pattern)?;
        let now = Instant::now();

        Ok(maps
            .values
            .keys()
            .filter(|key| !maps.is_expired(key, now))
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect())
    }

    /// Runs one expiration pass immediately and returns the number of entries removed.
    ///
    /// The sweeper does this on its own; this is for callers that want it now.
    ///
    /// # Panics
    ///
    /// Panics if the store has been closed.
    pub fn cleanup(&self) -> usize {
        match sweeper::sweep(&self.inner.state) {
            Some(removed) => removed,
            None => closed_violation("cleanup"),
        }
    }

    /// Closes the store: drops every entry and stops the sweeper.
    ///
    /// The sweeper task is signalled and aborted; it never touches the state again.
    ///
    /// # Panics
    ///
    /// Panics if the store is already closed.
    pub fn close(&self) {
        let previous = self.inner.state.write().take();
        if previous.is_none() {
            closed_violation("close");
        }

        self.inner.sweeper.stop();
        tracing::debug!("store closed");
    }

    /// Returns `true` once [`close`](Store::close) has been called
    pub fn is_closed(&self) -> bool {
        self.inner.state.read().is_none()
    }

    /// Returns `true` while the background sweeper task is alive
    pub fn is_sweeper_running(&self) -> bool {
        self.inner.sweeper.is_running()
    }

    /// Returns the number of entries held, including expired ones not yet removed.
    ///
    /// A closed store holds nothing and reports zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.read().as_ref().map_or(0, Maps::len)
    }

    /// Returns `true` if the store holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn open_ref<'a>(state: &'a Option<Maps>, op: &str) -> &'a Maps {
    match state {
        Some(maps) => maps,
        None => closed_violation(op),
    }
}

fn open_mut<'a>(state: &'a mut Option<Maps>, op: &str) -> &'a mut Maps {
    match state {
        Some(maps) => maps,
        None => closed_violation(op),
    }
}

fn closed_violation(op: &str) -> ! {
    panic!("{op} called on a closed store")
}

/// Truncates a key for safe logging
pub fn truncate_key_for_log(key: &str) -> String {
    const MAX_LOG_LEN: usize = 16;
    match key.char_indices().nth(MAX_LOG_LEN) {
        Some((idx, _)) => format!("{}...", &key[..idx]),
        None => key.to_string(),
    }
}
