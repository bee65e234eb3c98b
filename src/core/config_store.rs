//! NF-002: Process-wide configuration store.
//!
//! The store is created exactly once per process. The first caller of
//! [`ConfigStore::get_or_create`] decides the environment name; every later
//! caller receives the same instance and its argument is ignored.

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, OnceLock};

static INSTANCE: OnceLock<ConfigStore> = OnceLock::new();

/// Shared key/value settings plus the environment they were created for.
#[derive(Debug)]
pub struct ConfigStore {
    env_name: String,
    created_at: String,
    settings: Mutex<IndexMap<String, Value>>,
}

impl ConfigStore {
    pub(crate) fn new(env_name: &str) -> Self {
        Self {
            env_name: env_name.to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            settings: Mutex::new(IndexMap::new()),
        }
    }

    /// Return the process-wide store, creating it on first use.
    ///
    /// Concurrent first callers block on the one-time initializer; exactly
    /// one of them constructs the instance.
    pub fn get_or_create(initial_env_name: &str) -> &'static ConfigStore {
        if let Some(store) = INSTANCE.get() {
            return store;
        }
        INSTANCE.get_or_init(|| {
            log::debug!("creating config store for env '{}'", initial_env_name);
            ConfigStore::new(initial_env_name)
        })
    }

    /// The store if it has been created, without creating it.
    pub fn try_get() -> Option<&'static ConfigStore> {
        INSTANCE.get()
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    /// RFC 3339 UTC creation time.
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Insert or overwrite a setting.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.lock().insert(key.into(), value.into());
    }

    /// Stored value for `key`, or `default` when absent.
    pub fn get(&self, key: &str, default: Value) -> Value {
        self.lock().get(key).cloned().unwrap_or(default)
    }

    /// String setting, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.lock()
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Bulk insert, preserving the iteration order of `settings`.
    pub fn extend<I>(&self, settings: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.lock().extend(settings);
    }

    /// Ordered copy of all settings.
    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.lock().clone()
    }

    // A panic while holding the lock leaves the map itself intact.
    fn lock(&self) -> MutexGuard<'_, IndexMap<String, Value>> {
        self.settings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
