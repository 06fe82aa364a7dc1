//! CLI configuration

use anyhow::Context;
use hashchain_core::SerializerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Format used when neither `--format` nor the file extension decides
    pub default_format: String,
    /// Indent JSON exports
    pub pretty_json: bool,
    /// Refuse to overwrite existing files on `new`
    pub protect_existing: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        let serializer = SerializerConfig::default();
        Self {
            default_format: serializer.default_format,
            pretty_json: serializer.pretty_json,
            protect_existing: true,
        }
    }
}

impl CliConfig {
    /// Default location: `<config dir>/hashchain/config.toml`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("hashchain");
        path.push("config.toml");
        path
    }

    /// Load config from file or create default
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: CliConfig = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            config.serializer_config().validate()?;
            Ok(config)
        } else {
            let config = Self::default();

            // Create parent directories
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            // Save default config
            config.save(path)?;

            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Serializer settings for the chain library
    pub fn serializer_config(&self) -> SerializerConfig {
        SerializerConfig {
            default_format: self.default_format.clone(),
            pretty_json: self.pretty_json,
        }
    }
}
