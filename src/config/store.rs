//! Configuration store
//!
//! Owns the cached Configuration. A load replaces the cache only once the
//! file has been read and parsed completely, so readers holding a snapshot
//! never see a half-loaded state, and a failed reload keeps the old one.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::ConfigReadError;
use crate::toggle::Configuration;

/// Bundled document copied into place when no configuration exists yet
const DEFAULT_DOCUMENT: &str = include_str!("defaults.json");

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    configuration: Option<Arc<Configuration>>,
}

impl ConfigStore {
    /// Store backed by an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            configuration: None,
        }
    }

    /// Store at the path chosen by [`Self::resolve_path`] from the process environment
    pub fn from_env(override_path: Option<PathBuf>) -> Self {
        let env_path = std::env::var_os(crate::constants::env::CONFIG_PATH);
        Self::new(Self::resolve_path(override_path, env_path))
    }

    /// Explicit path first, then `TOGGLER_CONFIG`, then the platform config dir
    pub fn resolve_path(override_path: Option<PathBuf>, env_path: Option<OsString>) -> PathBuf {
        if let Some(path) = override_path {
            return path;
        }
        if let Some(path) = env_path.filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        Self::default_path()
    }

    fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once a configuration file exists at the resolved path
    pub fn is_configured(&self) -> bool {
        self.path.exists()
    }

    /// Raw text of the bundled default configuration
    pub fn bootstrap_default() -> &'static str {
        DEFAULT_DOCUMENT
    }

    /// Write the bundled default if nothing exists at the path yet.
    ///
    /// Returns `true` when the file was created.
    pub fn ensure_configured(&self) -> io::Result<bool> {
        if self.is_configured() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, DEFAULT_DOCUMENT)?;
        info!(path = %self.path.display(), "Created configuration from bundled default");
        Ok(true)
    }

    /// Currently cached configuration, if any load has succeeded
    pub fn snapshot(&self) -> Option<Arc<Configuration>> {
        self.configuration.clone()
    }

    /// Load the configuration, reading the file only when needed.
    ///
    /// Without `force`, a cached configuration is returned as is, even if the
    /// file changed since. With `force`, the file is re-read and the cache is
    /// replaced on success. On failure the cache is left untouched.
    pub fn load(&mut self, force: bool) -> Result<Arc<Configuration>, ConfigReadError> {
        if let Some(configuration) = self.configuration.as_ref().filter(|_| !force) {
            debug!(path = %self.path.display(), "Using cached configuration");
            return Ok(Arc::clone(configuration));
        }

        let configuration = Arc::new(Self::read(&self.path)?);
        info!(path = %self.path.display(), groups = configuration.len(), "Loaded configuration");

        let duplicates = configuration.duplicates();
        if !duplicates.is_empty() {
            warn!(path = %self.path.display(), words = ?duplicates, "Words appear in more than one group; only the first group is used");
        }

        self.configuration = Some(Arc::clone(&configuration));
        Ok(configuration)
    }

    fn read(path: &Path) -> Result<Configuration, ConfigReadError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigReadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("toggler").join("toggler.json"))
    }

    #[test]
    fn test_bootstrap_default_parses() {
        let configuration: Configuration =
            serde_json::from_str(ConfigStore::bootstrap_default()).unwrap();
        assert!(!configuration.is_empty());
        assert_eq!(configuration.resolve("true").unwrap(), "false");
        assert!(configuration.duplicates().is_empty());
    }

    #[test]
    fn test_not_configured_until_file_written() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert!(!store.is_configured());

        assert!(store.ensure_configured().unwrap());
        assert!(store.is_configured());
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            ConfigStore::bootstrap_default()
        );

        let configuration = store.load(false).unwrap();
        assert_eq!(configuration.resolve("Yes").unwrap(), "No");
    }

    #[test]
    fn test_ensure_configured_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"[["a","b"]]"#).unwrap();

        assert!(!store.ensure_configured().unwrap());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), r#"[["a","b"]]"#);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let err = store.load(false).unwrap_err();
        assert!(matches!(err, ConfigReadError::Io { .. }));
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_cached_load_ignores_file_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("toggler.json");
        fs::write(&path, r#"[["true","false"]]"#).unwrap();
        let mut store = ConfigStore::new(&path);

        let first = store.load(false).unwrap();
        fs::write(&path, r#"[["get","set"]]"#).unwrap();

        let second = store.load(false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.resolve("get").is_err());
    }

    #[test]
    fn test_forced_load_replaces_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("toggler.json");
        fs::write(&path, r#"[["true","false"]]"#).unwrap();
        let mut store = ConfigStore::new(&path);

        let before = store.load(false).unwrap();
        fs::write(&path, r#"[["get","set"]]"#).unwrap();

        let after = store.load(true).unwrap();
        assert_eq!(after.resolve("get").unwrap(), "set");
        assert!(after.resolve("true").is_err());

        // Snapshots taken before the reload are unaffected
        assert_eq!(before.resolve("true").unwrap(), "false");
        assert!(Arc::ptr_eq(&after, &store.snapshot().unwrap()));
    }

    #[test]
    fn test_failed_reload_keeps_previous_configuration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("toggler.json");
        fs::write(&path, r#"[["true","false"]]"#).unwrap();
        let mut store = ConfigStore::new(&path);
        store.load(false).unwrap();

        fs::write(&path, r#"[["true","false""#).unwrap();
        let err = store.load(true).unwrap_err();
        assert!(matches!(err, ConfigReadError::Parse { .. }));
        assert!(!err.message().is_empty());

        let cached = store.snapshot().unwrap();
        assert_eq!(cached.resolve("false").unwrap(), "true");

        fs::remove_file(&path).unwrap();
        assert!(matches!(store.load(true), Err(ConfigReadError::Io { .. })));
        assert_eq!(store.load(false).unwrap().resolve("true").unwrap(), "false");
    }

    #[test]
    fn test_malformed_first_load_leaves_store_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("toggler.json");
        fs::write(&path, r#"{"true": "false"}"#).unwrap();
        let mut store = ConfigStore::new(&path);

        assert!(store.is_configured());
        assert!(store.load(false).is_err());
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_resolve_path_precedence() {
        let flag = PathBuf::from("/flag/toggler.json");
        let env = OsString::from("/env/toggler.json");

        assert_eq!(ConfigStore::resolve_path(Some(flag.clone()), Some(env.clone())), flag);
        assert_eq!(ConfigStore::resolve_path(None, Some(env)), PathBuf::from("/env/toggler.json"));

        let fallback = ConfigStore::resolve_path(None, Some(OsString::new()));
        assert!(fallback.ends_with("toggler/toggler.json"));
        assert_eq!(fallback, ConfigStore::resolve_path(None, None));
    }
}
