//! Serializer configuration

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};
use crate::serializer::{JSON_KEY, XML_KEY};

/// Configuration for a [`SerializerRegistry`](crate::SerializerRegistry)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Key of the serializer used when none is named
    pub default_format: String,
    /// Indent JSON output
    pub pretty_json: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            default_format: JSON_KEY.to_string(),
            pretty_json: false,
        }
    }
}

impl SerializerConfig {
    /// Create with a default format
    pub fn with_default_format(format: impl Into<String>) -> Self {
        Self {
            default_format: format.into(),
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.default_format.as_str() {
            JSON_KEY | XML_KEY => Ok(()),
            other => Err(ChainError::Config(format!(
                "default_format must be \"{}\" or \"{}\", got \"{}\"",
                JSON_KEY, XML_KEY, other
            ))),
        }
    }
}
