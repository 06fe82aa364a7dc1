//! XML chain format
//!
//! ```text
//! <chain>
//!   <chain_id>..</chain_id>
//!   <first_index>0</first_index>
//!   <last_index>2</last_index>
//!   <links>
//!     <link><index>0</index><timestamp>..</timestamp><payload/>...</link>
//!   </links>
//! </chain>
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChainExport, ChainSerializer, LinkRecord, XML_KEY};
use crate::chain::HashChain;
use crate::error::{ChainError, Result};
use crate::link::ChainLink;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

#[derive(Serialize, Deserialize)]
#[serde(rename = "chain")]
struct ChainDocument {
    chain_id: String,
    first_index: u64,
    last_index: u64,
    #[serde(default)]
    links: LinkList,
}

#[derive(Default, Serialize, Deserialize)]
struct LinkList {
    #[serde(rename = "link", default)]
    items: Vec<LinkRecord>,
}

impl From<ChainExport> for ChainDocument {
    fn from(export: ChainExport) -> Self {
        Self {
            chain_id: export.chain_id,
            first_index: export.first_index,
            last_index: export.last_index,
            links: LinkList {
                items: export.links,
            },
        }
    }
}

impl From<ChainDocument> for ChainExport {
    fn from(doc: ChainDocument) -> Self {
        Self {
            chain_id: doc.chain_id,
            first_index: doc.first_index,
            last_index: doc.last_index,
            links: doc.links.items,
        }
    }
}

/// XML serializer
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlSerializer;

impl XmlSerializer {
    /// Create the serializer
    pub fn new() -> Self {
        Self
    }

    fn parse(data: &[u8]) -> Result<ChainExport> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ChainError::Serialization(format!("invalid UTF-8: {}", e)))?;
        if text.trim().is_empty() {
            return Err(ChainError::Serialization("empty input".to_string()));
        }
        let doc: ChainDocument = quick_xml::de::from_str(text)?;
        Ok(doc.into())
    }
}

impl ChainSerializer for XmlSerializer {
    fn key(&self) -> &'static str {
        XML_KEY
    }

    fn serialize(&self, chain_id: &str, links: &[ChainLink]) -> Result<Vec<u8>> {
        let doc = ChainDocument::from(ChainExport::from_links(chain_id, links)?);
        let body = quick_xml::se::to_string(&doc)
            .map_err(|e| ChainError::Serialization(e.to_string()))?;

        let mut out = String::with_capacity(XML_DECLARATION.len() + body.len());
        out.push_str(XML_DECLARATION);
        out.push_str(&body);
        debug!("Serialized chain {} to {} XML bytes", chain_id, out.len());
        Ok(out.into_bytes())
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

    fn sample_chain() -> HashChain {
        let mut chain = HashChain::new();
        chain.append(b"<tag> & \"quotes\"".to_vec());
        chain.append(vec![0, 1, 2, 255]);
        chain
    }

    #[test]
    fn test_document_shape() {
        let chain = sample_chain();
        let bytes = XmlSerializer.serialize(chain.chain_id(), chain.links()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with(XML_DECLARATION));
        assert!(text.contains("<chain>"));
        assert!(text.contains(&format!("<chain_id>{}</chain_id>", chain.chain_id())));
        assert!(text.contains("<first_index>0</first_index>"));
        assert!(text.contains("<last_index>2</last_index>"));
        assert_eq!(text.matches("<link>").count(), 3);
    }

    #[test]
    fn test_roundtrip() {
        let chain = sample_chain();
        let bytes = XmlSerializer.serialize(chain.chain_id(), chain.links()).unwrap();
        let back = XmlSerializer.deserialize(&bytes).unwrap();

        assert_eq!(back.chain_id(), chain.chain_id());
        assert_eq!(back.links(), chain.links());
        assert!(back.links()[0].previous_hash().is_none());
        assert_eq!(back.links()[2].previous_hash(), chain.links()[2].previous_hash());
    }

    #[test]
    fn test_empty_links_rejected() {
        let err = XmlSerializer.serialize("abc", &[]).unwrap_err();
        assert!(matches!(err, ChainError::Serialization(_)));
    }

    #[test]
    fn test_garbage_input() {
        assert!(!XmlSerializer.can_deserialize(b""));
        assert!(!XmlSerializer.can_deserialize(b"{\"chain_id\":\"x\"}"));
        assert!(!XmlSerializer.can_deserialize(b"<chain><chain_id>"));
        assert!(matches!(
            XmlSerializer.deserialize(&[0xc3, 0x28]),
            Err(ChainError::Serialization(_))
        ));
    }

    #[test]
    fn test_json_is_not_xml() {
        let chain = sample_chain();
        let json = super::super::JsonSerializer::new()
            .serialize(chain.chain_id(), chain.links())
            .unwrap();
        assert!(!XmlSerializer.can_deserialize(&json));
    }
}
