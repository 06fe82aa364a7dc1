//! JSON chain format

use tracing::debug;

use super::{ChainExport, ChainSerializer, JSON_KEY};
use crate::chain::HashChain;
use crate::error::{ChainError, Result};
use crate::link::ChainLink;

/// JSON serializer, compact unless `pretty` is set
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented JSON
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn parse(data: &[u8]) -> Result<ChainExport> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(ChainError::Serialization("empty input".to_string()));
        }
        Ok(serde_json::from_slice(data)?)
    }
}

impl ChainSerializer for JsonSerializer {
    fn key(&self) -> &'static str {
        JSON_KEY
    }

    fn serialize(&self, chain_id: &str, links: &[ChainLink]) -> Result<Vec<u8>> {
        let export = ChainExport::from_links(chain_id, links)?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&export)?
        } else {
            serde_json::to_vec(&export)?
        };
        debug!("Serialized chain {} to {} JSON bytes", chain_id, bytes.len());
        Ok(bytes)
    }

    fn deserialize(&self, data: &[u8]) -> Result<HashChain> {
        Self::parse(data)?.into_chain()
    }

    fn can_deserialize(&self, data: &[u8]) -> bool {
        Self::parse(data).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_output_shape() {
        let mut chain = HashChain::new();
        chain.append(b"hi".to_vec());

        let bytes = JsonSerializer::new().serialize(chain.chain_id(), chain.links()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["chain_id"], chain.chain_id());
        assert_eq!(value["first_index"], 0);
        assert_eq!(value["last_index"], 1);
        assert_eq!(value["links"][1]["payload"], "aGk=");
        assert_eq!(value["links"][0]["previous_hash"], "");
        assert!(value["links"][1]["timestamp"].is_i64());
    }

    #[test]
    fn test_pretty_output() {
        let chain = HashChain::new();
        let bytes = JsonSerializer::pretty().serialize(chain.chain_id(), chain.links()).unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains('\n'));
    }

    #[test]
    fn test_roundtrip() {
        let mut chain = HashChain::new();
        chain.append(vec![0, 159, 255]);
        chain.append(Vec::new());

        let serializer = JsonSerializer::new();
        let bytes = serializer.serialize(chain.chain_id(), chain.links()).unwrap();
        let back = serializer.deserialize(&bytes).unwrap();

        assert_eq!(back.chain_id(), chain.chain_id());
        assert_eq!(back.links(), chain.links());
    }

    #[test]
    fn test_empty_input() {
        let serializer = JsonSerializer::new();
        assert!(matches!(serializer.deserialize(b""), Err(ChainError::Serialization(_))));
        assert!(matches!(serializer.deserialize(b"  \n"), Err(ChainError::Serialization(_))));
    }

    #[test]
    fn test_can_deserialize() {
        let chain = HashChain::new();
        let serializer = JsonSerializer::new();
        let bytes = serializer.serialize(chain.chain_id(), chain.links()).unwrap();

        assert!(serializer.can_deserialize(&bytes));
        assert!(!serializer.can_deserialize(b"{\"chain_id\": 3}"));
        assert!(!serializer.can_deserialize(b"<chain/>"));
        assert!(!serializer.can_deserialize(&[0xff, 0xfe]));
    }

    #[test]
    fn test_can_serialize() {
        let chain = HashChain::new();
        assert!(JsonSerializer::new().can_serialize(chain.links()));
        assert!(!JsonSerializer::new().can_serialize(&[]));
    }

    #[test]
    fn test_bad_base64_payload() {
        let data = br#"{"chain_id":"a","first_index":0,"last_index":0,
            "links":[{"index":0,"timestamp":1,"payload":"***","previous_hash":"","hash":"h"}]}"#;
        assert!(matches!(
            JsonSerializer::new().deserialize(data),
            Err(ChainError::Serialization(_))
        ));
    }
}
