//! Payload codecs
//!
//! The chain itself only stores bytes. Typed values pass through a
//! [`PayloadCodec`] on the way in and out.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ChainError, Result};

/// Converts typed payloads to and from link bytes
pub trait PayloadCodec {
    /// Encode a value into payload bytes
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Decode payload bytes into a value
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON payloads (the default)
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPayloadCodec;

impl PayloadCodec for JsonPayloadCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| ChainError::Codec(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| ChainError::Codec(e.to_string()))
    }
}

/// Compact binary payloads
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodePayloadCodec;

impl PayloadCodec for BincodePayloadCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(bincode::serialize(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(bincode::deserialize(bytes)?)
    }
}
