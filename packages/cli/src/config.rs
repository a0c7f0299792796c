use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trellis_loader::{LoaderOptions, Registry};

pub const DEFAULT_CONFIG_NAME: &str = "trellis.config.json";

/// Name of the only type module the CLI ships
pub const STANDARD_MODULE: &str = "standard";

/// Trellis configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory searched for documents
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Document file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Type-name prefix to module name
    #[serde(default)]
    pub prefixes: IndexMap<String, String>,

    /// Fail on diagnostics as well as errors
    #[serde(default)]
    pub strict: bool,
}

fn default_src_dir() -> String {
    "src".to_string()
}

fn default_extension() -> String {
    "trellis".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| anyhow!("Invalid {}: {}", config_path.display(), e))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn src_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.src_dir)
    }

    pub fn is_document(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
    }

    /// Standard registry with every configured prefix mounted
    pub fn registry(&self) -> Result<Registry> {
        let mut registry = Registry::with_standard_library();
        for (prefix, module) in &self.prefixes {
            if module != STANDARD_MODULE {
                return Err(anyhow!(
                    "Unknown type module '{}' for prefix '{}' (available: {})",
                    module,
                    prefix,
                    STANDARD_MODULE
                ));
            }
            registry.mount(prefix.clone(), Registry::with_standard_library());
        }
        Ok(registry)
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            strict_implicit_strings: self.strict,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            extension: default_extension(),
            prefixes: IndexMap::new(),
            strict: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "srcDir": "ui",
            "extension": "tml",
            "prefixes": { "Std": "standard" },
            "strict": true
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.src_dir, "ui");
        assert_eq!(config.extension, "tml");
        assert_eq!(config.prefixes.get("Std").map(String::as_str), Some("standard"));
        assert!(config.strict);
        assert!(config.loader_options().strict_implicit_strings);
        assert!(config.registry().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.src_dir, "src");
        assert_eq!(config.extension, "trellis");
        assert!(!config.strict);
        assert!(config.is_document(Path::new("forms/order.trellis")));
        assert!(!config.is_document(Path::new("forms/order.json")));
    }

    #[test]
    fn test_unknown_module() {
        let mut config = Config::default();
        config.prefixes.insert("Shop".into(), "shop".into());
        assert!(config.registry().is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.src_dir(dir.path()), dir.path().join("src"));
    }
}
