// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persisted user configuration and environment access

use crate::constants::config_file::{DIR, FILE_NAME, KEY_FEATURES, KEY_NAMESPACE};
use crate::error::{Result, VeleroError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of environment variables used during client resolution
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// User configuration stored at `$HOME/.config/velero/config.json`.
///
/// Keys other than `namespace` and `features` are kept as-is so that saving
/// the file never drops settings written by other tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VeleroConfig(Map<String, Value>);

impl VeleroConfig {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(VeleroError::ConfigDirNotFound)?;
        Ok(DIR.iter().fold(home, |p, d| p.join(d)).join(FILE_NAME))
    }

    /// Load the config from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load the config from a specific path. A missing file yields an empty config.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Config file {} not found, using empty config", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(VeleroError::ConfigFileIo {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| VeleroError::ConfigFileParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the config to a specific path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_err = |source| VeleroError::ConfigFileIo {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents =
            serde_json::to_string_pretty(&self.0).map_err(|source| VeleroError::ConfigFileParse {
                path: path.to_path_buf(),
                source,
            })?;
        fs::write(path, contents).map_err(io_err)
    }

    /// The configured namespace, if set and non-empty
    pub fn namespace(&self) -> Option<&str> {
        self.0
            .get(KEY_NAMESPACE)
            .and_then(Value::as_str)
            .filter(|ns| !ns.is_empty())
    }

    /// The configured features in file order.
    ///
    /// Accepts either a JSON array of strings or a comma-separated string.
    pub fn features(&self) -> Vec<String> {
        let names: Vec<&str> = match self.0.get(KEY_FEATURES) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(s)) => s.split(',').collect(),
            _ => Vec::new(),
        };

        names
            .into_iter()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect()
    }

    /// Raw value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a key from its command-line string form. An empty value removes the key.
    pub fn set(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.0.remove(key);
            return;
        }

        let value = if key == KEY_FEATURES {
            Value::Array(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(|n| Value::String(n.to_string()))
                    .collect(),
            )
        } else {
            Value::String(value.to_string())
        };
        self.0.insert(key.to_string(), value);
    }

    /// All stored key/value pairs in key order
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}
