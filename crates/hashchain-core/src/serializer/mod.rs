//! Chain serializer strategies
//!
//! A serializer turns a chain id plus its ordered links into a transportable
//! byte representation and back. Both strategies share the wire model in
//! [`model`]; they differ only in the outer format.
//!
//! Deserializing never validates linkage. [`HashChain::parse`] does that.
//!
//! [`HashChain::parse`]: crate::HashChain::parse

pub mod json;
pub mod model;
pub mod xml;

pub use json::JsonSerializer;
pub use model::{ChainExport, LinkRecord};
pub use xml::XmlSerializer;

use crate::chain::HashChain;
use crate::error::Result;
use crate::link::ChainLink;

/// Registry key of the JSON serializer
pub const JSON_KEY: &str = "json";

/// Registry key of the XML serializer
pub const XML_KEY: &str = "xml";

/// A pluggable chain format
pub trait ChainSerializer: Send + Sync {
    /// Registry key, e.g. `"json"`
    fn key(&self) -> &'static str;

    /// Serialize `links` belonging to `chain_id`.
    ///
    /// # Errors
    ///
    /// * [`ChainError::Serialization`](crate::ChainError::Serialization) when
    ///   `links` is empty or the format writer fails
    /// * [`ChainError::BrokenChain`](crate::ChainError::BrokenChain) when a
    ///   link carries a different chain id
    fn serialize(&self, chain_id: &str, links: &[ChainLink]) -> Result<Vec<u8>>;

    /// Rebuild a chain from its serialized form, trusting stored hashes.
    fn deserialize(&self, data: &[u8]) -> Result<HashChain>;

    /// Whether there is anything to serialize
    fn can_serialize(&self, links: &[ChainLink]) -> bool {
        !links.is_empty()
    }

    /// Whether `data` parses as this format's chain document
    fn can_deserialize(&self, data: &[u8]) -> bool;
}

/// Serde helper for base64 payloads
pub(crate) mod base64_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.trim()).map_err(serde::de::Error::custom)
    }
}
