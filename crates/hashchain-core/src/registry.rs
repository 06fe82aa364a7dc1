//! Serializer registry
//!
//! Maps format keys to [`ChainSerializer`] strategies with one designated
//! default. The registry is passed explicitly to export and import calls.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::SerializerConfig;
use crate::error::{ChainError, Result};
use crate::serializer::{ChainSerializer, JsonSerializer, XmlSerializer, JSON_KEY};

/// Keyed set of chain serializers
#[derive(Clone, Default)]
pub struct SerializerRegistry {
    serializers: BTreeMap<&'static str, Arc<dyn ChainSerializer>>,
    default_key: Option<&'static str>,
}

impl SerializerRegistry {
    /// Empty registry with no default
    pub fn new() -> Self {
        Self::default()
    }

    /// Compact JSON (default) and XML
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(JsonSerializer::new());
        registry.register(XmlSerializer::new());
        registry.default_key = Some(JSON_KEY);
        registry
    }

    /// Build from configuration
    pub fn from_config(config: &SerializerConfig) -> Result<Self> {
        config.validate()?;

        let mut registry = Self::new();
        if config.pretty_json {
            registry.register(JsonSerializer::pretty());
        } else {
            registry.register(JsonSerializer::new());
        }
        registry.register(XmlSerializer::new());
        registry.set_default(&config.default_format)?;
        Ok(registry)
    }

    /// Add or replace a serializer under its own key.
    ///
    /// The first serializer registered becomes the default.
    pub fn register<S: ChainSerializer + 'static>(&mut self, serializer: S) -> &mut Self {
        let key = serializer.key();
        if self.serializers.insert(key, Arc::new(serializer)).is_some() {
            debug!("Replaced serializer {}", key);
        }
        self.default_key.get_or_insert(key);
        self
    }

    /// Designate the default serializer
    pub fn set_default(&mut self, key: &str) -> Result<()> {
        let key = self
            .serializers
            .get_key_value(key)
            .map(|(k, _)| *k)
            .ok_or_else(|| ChainError::UnknownSerializer(key.to_string()))?;
        self.default_key = Some(key);
        info!("Default chain serializer set to {}", key);
        Ok(())
    }

    /// Serializer for `key`, or the default when `key` is `None`
    pub fn get(&self, key: Option<&str>) -> Result<Arc<dyn ChainSerializer>> {
        let key = match key {
            Some(k) => k,
            None => self.default_key.ok_or(ChainError::NoDefaultSerializer)?,
        };
        self.serializers
            .get(key)
            .cloned()
            .ok_or_else(|| ChainError::UnknownSerializer(key.to_string()))
    }

    /// Whether `key` is registered
    pub fn contains(&self, key: &str) -> bool {
        self.serializers.contains_key(key)
    }

    /// Registered keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.serializers.keys().copied()
    }

    /// Current default key
    pub fn default_key(&self) -> Option<&'static str> {
        self.default_key
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerRegistry")
            .field("keys", &self.serializers.keys().collect::<Vec<_>>())
            .field("default_key", &self.default_key)
            .finish()
    }
}
