//! Configuration for the CapyFlows host.
//!
//! The config file is optional and lives at `~/.capyflows/config.toml`:
//!
//! ```toml
//! [storage]
//! data_dir = "${XDG_STATE_HOME}/capyflows"
//! ```
//!
//! String values may reference environment variables with `${VAR}`.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CAPYFLOWS_DATA_DIR";

const APP_DIR: &str = ".capyflows";

#[derive(Debug, Default, Deserialize)]
pub struct CapyConfig {
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted client state. Supports `${VAR}` and a leading `~/`.
    pub data_dir: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + end_rel];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + end_rel + 1..];
    }

    out.push_str(rest);
    out
}

fn expand_home(value: &str) -> PathBuf {
    if let Some(stripped) = value.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(value)
}

impl CapyConfig {
    /// Load the user config. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(source) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, source);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// The configured data directory, with env vars and `~/` expanded.
    #[must_use]
    pub fn data_dir(&self) -> Option<PathBuf> {
        let raw = self.storage.as_ref()?.data_dir.as_deref()?;
        let expanded = expand_env_vars(raw);
        if expanded.trim().is_empty() {
            return None;
        }
        Some(expand_home(&expanded))
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR).join("config.toml"))
}

#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR).join("data"))
}

/// Pick the data directory: explicit flag, then `CAPYFLOWS_DATA_DIR`, then the
/// config file, then `~/.capyflows/data`.
#[must_use]
pub fn resolve_data_dir(
    explicit: Option<PathBuf>,
    config: Option<&CapyConfig>,
) -> Option<PathBuf> {
    resolve_data_dir_from(explicit, env::var(DATA_DIR_ENV).ok(), config)
}

fn resolve_data_dir_from(
    explicit: Option<PathBuf>,
    env_value: Option<String>,
    config: Option<&CapyConfig>,
) -> Option<PathBuf> {
    explicit
        .or_else(|| {
            env_value
                .filter(|v| !v.trim().is_empty())
                .map(|v| expand_home(&v))
        })
        .or_else(|| config.and_then(CapyConfig::data_dir))
        .or_else(default_data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_env_vars_no_vars() {
        assert_eq!(expand_env_vars("hello world"), "hello world");
    }

    #[test]
    fn expand_env_vars_single_var() {
        unsafe {
            env::set_var("CAPYFLOWS_TEST_SINGLE", "replaced");
        }
        let result = expand_env_vars("prefix ${CAPYFLOWS_TEST_SINGLE} suffix");
        assert_eq!(result, "prefix replaced suffix");
        unsafe {
            env::remove_var("CAPYFLOWS_TEST_SINGLE");
        }
    }

    #[test]
    fn expand_env_vars_missing_var_becomes_empty() {
        unsafe {
            env::remove_var("CAPYFLOWS_TEST_MISSING");
        }
        let result = expand_env_vars("before ${CAPYFLOWS_TEST_MISSING} after");
        assert_eq!(result, "before  after");
    }

    #[test]
    fn expand_env_vars_unclosed_brace_preserved() {
        assert_eq!(expand_env_vars("test ${UNCLOSED"), "test ${UNCLOSED");
    }

    #[test]
    fn expand_env_vars_empty_var_name_dropped() {
        assert_eq!(expand_env_vars("test ${} more"), "test  more");
    }

    #[test]
    fn load_from_missing_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = CapyConfig::load_from(&dir.path().join("config.toml")).expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn load_from_parses_storage_section() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage]\ndata_dir = \"/var/lib/capyflows\"\n").expect("write");

        let config = CapyConfig::load_from(&path).expect("load").expect("present");
        assert_eq!(config.data_dir(), Some(PathBuf::from("/var/lib/capyflows")));
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage\n").expect("write");

        let err = CapyConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn empty_config_has_no_data_dir() {
        let config: CapyConfig = toml::from_str("").expect("parse");
        assert!(config.data_dir().is_none());
    }

    #[test]
    fn resolution_prefers_explicit_then_env_then_config() {
        let config: CapyConfig =
            toml::from_str("[storage]\ndata_dir = \"/from/config\"\n").expect("parse");

        let explicit = resolve_data_dir_from(
            Some(PathBuf::from("/from/flag")),
            Some("/from/env".to_owned()),
            Some(&config),
        );
        assert_eq!(explicit, Some(PathBuf::from("/from/flag")));

        let from_env =
            resolve_data_dir_from(None, Some("/from/env".to_owned()), Some(&config));
        assert_eq!(from_env, Some(PathBuf::from("/from/env")));

        let from_config = resolve_data_dir_from(None, Some("  ".to_owned()), Some(&config));
        assert_eq!(from_config, Some(PathBuf::from("/from/config")));
    }
}
