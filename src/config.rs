//! Configuration for the session history

use std::env;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::persistence::validate_key;

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "session-history";

/// Configuration for a [`SessionHistory`](crate::SessionHistory)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Directory backing the file key-value store
    pub data_dir: PathBuf,
    /// Key the timeline is saved under
    pub storage_key: String,
    /// Save after every mutation; otherwise only on `flush()`/`dispose()`
    pub autosave: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            autosave: true,
        }
    }
}

impl HistoryConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Override the storage key
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Enable or disable save-on-mutation
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    /// Build config from `TIMELINE_DATA_DIR`, `TIMELINE_STORAGE_KEY` and
    /// `TIMELINE_AUTOSAVE`. Relative data directories resolve against the
    /// current directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut config = Self::new(current_dir.join("data"));

        if let Some(dir) = lookup("TIMELINE_DATA_DIR") {
            let path = PathBuf::from(&dir);
            config.data_dir = if path.is_absolute() {
                path
            } else {
                current_dir.join(path)
            };
        }

        if let Some(key) = lookup("TIMELINE_STORAGE_KEY") {
            if validate_key(&key).is_err() {
                return Err(ConfigError::InvalidValue {
                    var: "TIMELINE_STORAGE_KEY",
                    value: key,
                });
            }
            config.storage_key = key;
        }

        if let Some(raw) = lookup("TIMELINE_AUTOSAVE") {
            config.autosave = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "TIMELINE_AUTOSAVE",
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HistoryConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert!(config.autosave);
        assert!(config.data_dir.ends_with("data"));
    }

    #[test]
    fn test_env_overrides() {
        let config = HistoryConfig::from_lookup(lookup_from(&[
            ("TIMELINE_DATA_DIR", "/tmp/timeline"),
            ("TIMELINE_STORAGE_KEY", "learner-42"),
            ("TIMELINE_AUTOSAVE", "off"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/timeline"));
        assert_eq!(config.storage_key, "learner-42");
        assert!(!config.autosave);
    }

    #[test]
    fn test_relative_dir_resolves_against_cwd() {
        let config =
            HistoryConfig::from_lookup(lookup_from(&[("TIMELINE_DATA_DIR", "sessions")])).unwrap();
        assert!(config.data_dir.is_absolute() || config.data_dir.starts_with("."));
        assert!(config.data_dir.ends_with("sessions"));
    }

    #[test]
    fn test_invalid_autosave_rejected() {
        let err =
            HistoryConfig::from_lookup(lookup_from(&[("TIMELINE_AUTOSAVE", "sometimes")]))
                .unwrap_err();
        assert!(err.to_string().contains("TIMELINE_AUTOSAVE"));
    }

    #[test]
    fn test_invalid_storage_key_rejected() {
        for key in ["", "  ", "learner/42", "../escape", ".hidden", "learner 42"] {
            let err = HistoryConfig::from_lookup(lookup_from(&[("TIMELINE_STORAGE_KEY", key)]))
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue {
                    var: "TIMELINE_STORAGE_KEY",
                    ..
                }
            ));
        }

        let config =
            HistoryConfig::from_lookup(lookup_from(&[("TIMELINE_STORAGE_KEY", "learner_42.v2")]))
                .unwrap();
        assert_eq!(config.storage_key, "learner_42.v2");
    }

    #[test]
    fn test_builder_setters() {
        let config = HistoryConfig::new("x")
            .with_storage_key("k")
            .with_autosave(false);
        assert_eq!(config.data_dir, PathBuf::from("x"));
        assert_eq!(config.storage_key, "k");
        assert!(!config.autosave);
    }
}
