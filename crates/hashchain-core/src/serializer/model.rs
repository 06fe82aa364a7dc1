//! Format-independent export model

use serde::{Deserialize, Serialize};

use super::base64_serde;
use crate::chain::HashChain;
use crate::error::{ChainError, Result};
use crate::link::ChainLink;
use crate::timestamp::Timestamp;

/// Exported chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainExport {
    /// Id of the exported chain
    pub chain_id: String,
    /// Lowest link index
    pub first_index: u64,
    /// Highest link index
    pub last_index: u64,
    /// Links in index order
    pub links: Vec<LinkRecord>,
}

/// Exported link
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Position in the chain
    pub index: u64,
    /// Creation time in ticks
    pub timestamp: i64,
    /// Payload bytes, base64 on the wire
    #[serde(with = "base64_serde", default)]
    pub payload: Vec<u8>,
    /// Hash of the preceding link, empty for genesis
    #[serde(default)]
    pub previous_hash: String,
    /// Stored link hash
    pub hash: String,
}

impl From<&ChainLink> for LinkRecord {
    fn from(link: &ChainLink) -> Self {
        Self {
            index: link.index(),
            timestamp: link.timestamp().ticks(),
            payload: link.payload().to_vec(),
            previous_hash: link.previous_hash().unwrap_or_default().to_string(),
            hash: link.hash().to_string(),
        }
    }
}

impl ChainExport {
    /// Build the export model, rejecting empty and cross-chain link sets
    pub fn from_links(chain_id: &str, links: &[ChainLink]) -> Result<Self> {
        if links.is_empty() {
            return Err(ChainError::Serialization("no links".to_string()));
        }

        if let Some(stranger) = links.iter().find(|l| l.chain_id() != chain_id) {
            return Err(ChainError::broken(
                stranger.index(),
                format!(
                    "link belongs to chain {} instead of {}",
                    stranger.chain_id(),
                    chain_id
                ),
            ));
        }

        let mut ordered: Vec<&ChainLink> = links.iter().collect();
        ordered.sort_by(|a, b| a.compare_to(b));

        let first_index = ordered[0].index();
        let last_index = ordered[ordered.len() - 1].index();

        Ok(Self {
            chain_id: chain_id.to_string(),
            first_index,
            last_index,
            links: ordered.into_iter().map(LinkRecord::from).collect(),
        })
    }

    /// Rebuild the chain through the trusted construction path
    pub fn into_chain(self) -> Result<HashChain> {
        let (first, last) = match (self.links.first(), self.links.last()) {
            (Some(first), Some(last)) => (first.index, last.index),
            _ => return Err(ChainError::Serialization("no links".to_string())),
        };
        if first != self.first_index || last != self.last_index {
            return Err(ChainError::Serialization(format!(
                "index range {}..={} does not match links {}..={}",
                self.first_index, self.last_index, first, last
            )));
        }

        let chain_id = self.chain_id;
        let links = self
            .links
            .into_iter()
            .map(|r| {
                ChainLink::new_trusted(
                    chain_id.as_str(),
                    r.index,
                    Timestamp::from_ticks(r.timestamp),
                    r.payload,
                    r.hash,
                    Some(r.previous_hash),
                )
            })
            .collect::<Result<Vec<_>>>()
            .map_err(into_serialization)?;

        HashChain::from_parts(chain_id, links).map_err(into_serialization)
    }
}

fn into_serialization(err: ChainError) -> ChainError {
    match err {
        ChainError::InvalidArgument(msg) => ChainError::Serialization(msg),
        other => other,
    }
}
