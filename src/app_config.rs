use log::{debug, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

use crate::errors::SettingsError;

// Application settings module
// Settings are stored as named groups of key/value pairs, mirroring the
// preference pages of the editor ("timing", ...). The store notifies
// subscribers through a revision counter whenever a value changes.

/// Settings group holding the timing constraints
pub const TIMING_GROUP: &str = "timing";

/// Name of the settings file inside the user config directory
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Key/value access to grouped settings
///
/// Getters return `None` when the key is absent or holds a value of another
/// type; callers apply their own defaults.
pub trait ConfigStore {
    fn get_bool(&self, group: &str, key: &str) -> Option<bool>;
    fn get_int(&self, group: &str, key: &str) -> Option<i64>;
    fn get_float(&self, group: &str, key: &str) -> Option<f64>;

    fn set_bool(&mut self, group: &str, key: &str, value: bool);
    fn set_int(&mut self, group: &str, key: &str, value: i64);
    fn set_float(&mut self, group: &str, key: &str, value: f64);
}

type Groups = BTreeMap<String, BTreeMap<String, Value>>;

/// JSON-file backed settings store
#[derive(Debug)]
pub struct SettingsStore {
    /// Backing file, `None` for an in-memory store
    path: Option<PathBuf>,

    /// group -> key -> value
    groups: Groups,

    /// Bumped on every effective change
    revision: watch::Sender<u64>,
}

impl SettingsStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::with_groups(None, Groups::new())
    }

    fn with_groups(path: Option<PathBuf>, groups: Groups) -> Self {
        let (revision, _) = watch::channel(0);
        Self { path, groups, revision }
    }

    /// Load settings from a JSON file; a missing file yields an empty store
    /// bound to that path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            debug!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::with_groups(Some(path), Groups::new()));
        }

        let content = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;

        let groups: Groups = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.clone(),
            source,
        })?;

        debug!("Loaded {} settings group(s) from {}", groups.len(), path.display());
        Ok(Self::with_groups(Some(path), groups))
    }

    /// Write settings back to the file they were loaded from
    ///
    /// In-memory stores have nowhere to write and succeed silently.
    pub fn save(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.groups).map_err(|source| SettingsError::Parse {
            path: path.clone(),
            source,
        })?;

        fs::write(path, json).map_err(|source| SettingsError::Write {
            path: path.clone(),
            source,
        })
    }

    /// Subscribe to change notifications
    ///
    /// The received value is the store revision; use `has_changed` to poll.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision (number of effective changes so far)
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Iterate over the keys and raw values of a group
    pub fn group(&self, group: &str) -> impl Iterator<Item = (&str, &Value)> {
        self.groups
            .get(group)
            .into_iter()
            .flat_map(|keys| keys.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Drop every value of a group so defaults apply again
    pub fn reset_group(&mut self, group: &str) {
        if self.groups.remove(group).is_some() {
            debug!("Reset settings group '{}'", group);
            self.bump();
        }
    }

    fn get(&self, group: &str, key: &str) -> Option<&Value> {
        self.groups.get(group).and_then(|keys| keys.get(key))
    }

    fn set(&mut self, group: &str, key: &str, value: Value) {
        let keys = self.groups.entry(group.to_string()).or_default();
        if keys.get(key) == Some(&value) {
            return;
        }

        debug!("Setting {}/{} = {}", group, key, value);
        keys.insert(key.to_string(), value);
        self.bump();
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for SettingsStore {
    fn get_bool(&self, group: &str, key: &str) -> Option<bool> {
        self.get(group, key).and_then(Value::as_bool)
    }

    fn get_int(&self, group: &str, key: &str) -> Option<i64> {
        self.get(group, key).and_then(Value::as_i64)
    }

    fn get_float(&self, group: &str, key: &str) -> Option<f64> {
        self.get(group, key).and_then(Value::as_f64)
    }

    fn set_bool(&mut self, group: &str, key: &str, value: bool) {
        self.set(group, key, Value::Bool(value));
    }

    fn set_int(&mut self, group: &str, key: &str, value: i64) {
        self.set(group, key, Value::from(value));
    }

    fn set_float(&mut self, group: &str, key: &str, value: f64) {
        // NaN and infinities have no JSON representation
        match serde_json::Number::from_f64(value) {
            Some(number) => self.set(group, key, Value::Number(number)),
            None => warn!("Ignoring non-finite value {} for {}/{}", value, group, key),
        }
    }
}

/// Default settings file location (`<config dir>/subtiming/settings.json`)
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("subtiming")
        .join(SETTINGS_FILE_NAME)
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
