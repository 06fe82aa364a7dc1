//! Chain links
//!
//! A link is one immutable ledger entry. Its hash covers the owning chain id,
//! the timestamp, the previous link's hash and the payload, so any edit to a
//! link or to its predecessor is detectable.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{ChainError, Result};
use crate::hash::compute_link_hash;
use crate::timestamp::Timestamp;

/// A link in the hash chain
#[derive(Clone, Debug)]
pub struct ChainLink {
    chain_id: String,
    index: u64,
    timestamp: Timestamp,
    payload: Vec<u8>,
    previous_hash: Option<String>,
    hash: String,
}

impl ChainLink {
    /// Create a link and compute its hash
    pub fn new(
        chain_id: impl Into<String>,
        index: u64,
        timestamp: Timestamp,
        payload: Vec<u8>,
        previous_hash: Option<String>,
    ) -> Result<Self> {
        let chain_id = chain_id.into();
        if chain_id.is_empty() {
            return Err(ChainError::InvalidArgument("chain id is empty".to_string()));
        }
        Ok(Self::build(chain_id, index, timestamp, payload, previous_hash))
    }

    /// Compute a link for a chain id already known to be non-empty
    pub(crate) fn build(
        chain_id: String,
        index: u64,
        timestamp: Timestamp,
        payload: Vec<u8>,
        previous_hash: Option<String>,
    ) -> Self {
        let previous_hash = previous_hash.filter(|h| !h.is_empty());
        let hash = compute_link_hash(&chain_id, timestamp, previous_hash.as_deref(), &payload);

        Self {
            chain_id,
            index,
            timestamp,
            payload,
            previous_hash,
            hash,
        }
    }

    /// Create the genesis link of a chain
    pub fn genesis(chain_id: impl Into<String>, timestamp: Timestamp) -> Result<Self> {
        Self::new(chain_id, 0, timestamp, Vec::new(), None)
    }

    /// Rehydrate a link with a stored hash, without recomputing it.
    ///
    /// Nothing here checks that `hash` matches the other fields; run
    /// [`HashChain::validate`](crate::HashChain::validate) on the chain
    /// the link ends up in.
    pub fn new_trusted(
        chain_id: impl Into<String>,
        index: u64,
        timestamp: Timestamp,
        payload: Vec<u8>,
        hash: impl Into<String>,
        previous_hash: Option<String>,
    ) -> Result<Self> {
        let chain_id = chain_id.into();
        let hash = hash.into();
        if chain_id.is_empty() {
            return Err(ChainError::InvalidArgument("chain id is empty".to_string()));
        }
        if hash.is_empty() {
            return Err(ChainError::InvalidArgument(format!(
                "link {} has an empty hash",
                index
            )));
        }

        Ok(Self {
            chain_id,
            index,
            timestamp,
            payload,
            previous_hash: previous_hash.filter(|h| !h.is_empty()),
            hash,
        })
    }

    /// Id of the owning chain
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Position in the chain
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Creation time
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Raw payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Hash of the preceding link, `None` for genesis
    pub fn previous_hash(&self) -> Option<&str> {
        self.previous_hash.as_deref()
    }

    /// Stored hash
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Whether this is the first link of its chain
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Recompute the hash from the current fields
    pub fn recompute_hash(&self) -> String {
        compute_link_hash(
            &self.chain_id,
            self.timestamp,
            self.previous_hash.as_deref(),
            &self.payload,
        )
    }

    /// Stored hash matches the content
    pub fn verify_hash(&self) -> bool {
        self.hash == self.recompute_hash()
    }

    /// Same index, timestamp, hash and payload
    pub fn equals(&self, other: &ChainLink) -> bool {
        self.index == other.index
            && self.timestamp == other.timestamp
            && self.hash == other.hash
            && self.payload == other.payload
    }

    /// Order by index only
    pub fn compare_to(&self, other: &ChainLink) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl PartialEq for ChainLink {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for ChainLink {}

impl fmt::Display for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.hash.get(..16).unwrap_or(&self.hash);
        write!(f, "#{} {}", self.index, short)
    }
}
