//! Process-wide settings storage
//!
//! Settings are provisioned out-of-band (a TOML file shipped with the
//! deployment, `.env` files or environment variables) and are read-only to the
//! option services. Programmatic `set`/`unset` exists for provisioning code and
//! tests.

use anyhow::{Context, Result};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Environment variable overriding the settings file location
pub const SETTINGS_PATH_ENV: &str = "CONF_OPTIONS_SETTINGS";

/// Prefix of environment variables loaded as settings
pub const ENV_PREFIX: &str = "CONF_OPTIONS_";

#[derive(Debug, Default)]
pub struct Settings {
    values: RwLock<HashMap<String, Value>>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings file: `<config dir>/conf-options/settings.toml`
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("conf-options")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".conf-options")
        };

        Ok(config_dir.join("settings.toml"))
    }

    /// Load settings from the default file, `.env` and the process environment
    ///
    /// A missing settings file is not an error; environment variables with
    /// [`ENV_PREFIX`] override file values.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        let settings = if path.exists() {
            Self::load_file(&path)?
        } else {
            debug!("Settings file {:?} doesn't exist, starting empty", path);
            Self::new()
        };

        match dotenvy::dotenv() {
            Ok(env_path) => debug!("Loaded environment from {:?}", env_path),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("Failed to load .env file"),
        }

        let applied = settings.apply_vars(std::env::vars(), ENV_PREFIX);
        info!("Loaded {} settings ({} from environment)", settings.len(), applied);
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load_file(path: &Path) -> Result<Self> {
        debug!("Loading settings from: {:?}", path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))
    }

    /// Parse settings from TOML text; top-level keys become setting names
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content).context("Invalid TOML")?;

        let settings = Self::new();
        {
            let mut values = settings.values.write().expect("settings lock poisoned");
            for (key, value) in table {
                let value = serde_json::to_value(value)
                    .with_context(|| format!("Failed to convert setting '{}'", key))?;
                values.insert(key, value);
            }
        }

        Ok(settings)
    }

    /// Apply `PREFIX_KEY=value` pairs as string settings named `KEY`
    ///
    /// Returns the number of settings applied.
    pub fn apply_vars<I>(&self, vars: I, prefix: &str) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut values = self.values.write().expect("settings lock poisoned");
        let mut applied = 0;
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(prefix) else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            values.insert(key.to_string(), Value::String(value));
            applied += 1;
        }
        applied
    }

    /// Read a setting; `null` counts as unset
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .expect("settings lock poisoned")
            .get(key)
            .filter(|value| !value.is_null())
            .cloned()
    }

    pub fn set(&self, key: &str, value: Value) {
        self.values
            .write()
            .expect("settings lock poisoned")
            .insert(key.to_string(), value);
    }

    pub fn unset(&self, key: &str) {
        self.values
            .write()
            .expect("settings lock poisoned")
            .remove(key);
    }

    pub fn len(&self) -> usize {
        self.values.read().expect("settings lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_toml() {
        let settings = Settings::from_toml_str(
            r#"
            K8S_NAMESPACE = "builds"
            K8S_IN_CLUSTER = false
            BUILD_RETRIES = 3

            [NODE_SELECTORS]
            gpu = "true"
            "#,
        )
        .unwrap();

        assert_eq!(settings.get("K8S_NAMESPACE"), Some(json!("builds")));
        assert_eq!(settings.get("K8S_IN_CLUSTER"), Some(json!(false)));
        assert_eq!(settings.get("BUILD_RETRIES"), Some(json!(3)));
        assert_eq!(settings.get("NODE_SELECTORS"), Some(json!({"gpu": "true"})));
        assert_eq!(settings.get("MISSING"), None);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Settings::from_toml_str("not = [valid").is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "FOO_BAR = \"foo\"\n").unwrap();

        let settings = Settings::load_file(&path).unwrap();
        assert_eq!(settings.get("FOO_BAR"), Some(json!("foo")));

        assert!(Settings::load_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_apply_vars_with_prefix() {
        let settings = Settings::new();
        let applied = settings.apply_vars(
            vec![
                ("CONF_OPTIONS_K8S_NAMESPACE".to_string(), "builds".to_string()),
                ("CONF_OPTIONS_".to_string(), "ignored".to_string()),
                ("HOME".to_string(), "/root".to_string()),
            ],
            ENV_PREFIX,
        );

        assert_eq!(applied, 1);
        assert_eq!(settings.get("K8S_NAMESPACE"), Some(json!("builds")));
        assert_eq!(settings.get("HOME"), None);
    }

    #[test]
    fn test_null_is_unset() {
        let settings = Settings::new();
        settings.set("FOO_BAR", Value::Null);
        assert_eq!(settings.get("FOO_BAR"), None);

        settings.set("FOO_BAR", json!("foo"));
        assert_eq!(settings.get("FOO_BAR"), Some(json!("foo")));

        settings.unset("FOO_BAR");
        assert_eq!(settings.get("FOO_BAR"), None);
    }
}
