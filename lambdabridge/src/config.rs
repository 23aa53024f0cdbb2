//! Translator configuration.
//!
//! The defaults match the conventions of DreamCoder (anonymous side) and Stitch
//! (named side). A TOML file can override any subset of the fields.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

/// Binder keyword used by anonymous (de Bruijn) programs.
pub const DEFAULT_ANONYMOUS_BINDER: &str = "lambda";

/// Binder keyword used by named programs.
pub const DEFAULT_NAMED_BINDER: &str = "lam";

/// Environment variable overriding the configuration path.
pub const ENV_CONFIG_PATH: &str = "LAMBDABRIDGE_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Binder keyword on the anonymous side.
    pub anonymous_binder: String,
    /// Binder keyword on the named side.
    pub named_binder: String,
    /// Prefix of the synthetic names given to anonymous abstractions found in the input.
    pub mapping_prefix: String,
    /// Prefix of the names the compression engine gives to learned abstractions.
    pub learned_prefix: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            anonymous_binder: DEFAULT_ANONYMOUS_BINDER.to_string(),
            named_binder: DEFAULT_NAMED_BINDER.to_string(),
            mapping_prefix: "dreamcoder_abstraction_".to_string(),
            learned_prefix: "fn_".to_string(),
        }
    }
}

impl TranslatorConfig {
    /// Both binder spellings, anonymous first.
    pub fn binders(&self) -> [&str; 2] {
        [self.anonymous_binder.as_str(), self.named_binder.as_str()]
    }

    /// Get the default path to the configuration file.
    pub fn default_path() -> PathBuf {
        if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
            return config_path.into();
        }

        let mut path = PathBuf::new();
        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
            path.push(xdg_config_home);
        } else if let Ok(home) = std::env::var("HOME") {
            path.push(home);
            path.push(".config");
        }
        path.push("lambdabridge");
        path.push("config.toml");
        path
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> BridgeResult<Self> {
        toml::from_str(toml_str).map_err(|e| BridgeError::ConfigParse {
            source: e,
            file: "<string>".to_string(),
        })
    }

    /// Load a configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> BridgeResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        toml::from_str(&toml_str).map_err(|e| BridgeError::ConfigParse {
            source: e,
            file: path.display().to_string(),
        })
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save_to_toml(&self, path: &Path) -> BridgeResult<()> {
        let toml_str = toml::to_string(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Load from `path` if given, else from [`Self::default_path`] if it exists, else defaults.
    pub fn resolve(path: Option<&Path>) -> BridgeResult<Self> {
        match path {
            Some(path) => Self::load_from_toml(path),
            None => {
                let path = Self::default_path();
                if path.is_file() {
                    Self::load_from_toml(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = TranslatorConfig::from_toml_str("learned_prefix = \"inv_\"\n").unwrap();
        assert_eq!(cfg.learned_prefix, "inv_");
        assert_eq!(cfg.anonymous_binder, "lambda");
        assert_eq!(cfg.named_binder, "lam");
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = TranslatorConfig::from_toml_str("named_binder = [").unwrap_err();
        assert!(err.is_config_parse());
    }

    #[test]
    fn string_source_is_named_not_echoed() {
        let source = "mapping_prefix = \"dc_\"\nnamed_binder = [";
        let message = TranslatorConfig::from_toml_str(source).unwrap_err().to_string();
        assert!(message.contains("'<string>'"), "{message}");
        assert!(!message.contains(source), "{message}");
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("lambdabridge-cfg-{}", std::process::id()));
        let path = dir.join("config.toml");
        let cfg = TranslatorConfig {
            mapping_prefix: "dc_".to_string(),
            ..TranslatorConfig::default()
        };
        cfg.save_to_toml(&path).unwrap();
        assert_eq!(TranslatorConfig::load_from_toml(&path).unwrap(), cfg);
        let _ = std::fs::remove_dir_all(dir);
    }
}
