//! Hash chain aggregate
//!
//! [`HashChain`] owns an ordered, append-only sequence of [`ChainLink`]s and
//! enforces the chain-wide invariants:
//!
//! - the first link is a genesis link at index 0 with no previous hash
//! - indices increase by exactly one
//! - every link's `previous_hash` is its predecessor's hash
//! - every stored hash matches a recomputation of the link content
//!
//! # Concurrency
//!
//! A chain is single-writer. [`HashChain::append`] takes `&mut self`; callers
//! that need shared mutation wrap the chain in a mutex.

use std::fmt;
use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::codec::{JsonPayloadCodec, PayloadCodec};
use crate::error::{ChainError, Result};
use crate::link::ChainLink;
use crate::registry::SerializerRegistry;
use crate::timestamp::Timestamp;

/// Append-only, tamper-evident chain of links
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashChain {
    chain_id: String,
    links: Vec<ChainLink>,
}

impl HashChain {
    /// Create a chain with a fresh id and a genesis link stamped now
    pub fn new() -> Self {
        Self::new_at(Timestamp::now())
    }

    /// Create a chain whose genesis link carries `timestamp`
    pub fn new_at(timestamp: Timestamp) -> Self {
        let chain_id = Uuid::new_v4().simple().to_string();
        let genesis = ChainLink::build(chain_id.clone(), 0, timestamp, Vec::new(), None);

        debug!("Created chain {}", chain_id);
        Self {
            chain_id,
            links: vec![genesis],
        }
    }

    /// Assemble a chain from existing links without validating them.
    ///
    /// Stored hashes are trusted as-is; call [`validate`](Self::validate)
    /// before relying on the result.
    pub fn from_parts(chain_id: impl Into<String>, links: Vec<ChainLink>) -> Result<Self> {
        let chain_id = chain_id.into();
        if chain_id.is_empty() {
            return Err(ChainError::InvalidArgument("chain id is empty".to_string()));
        }
        if links.is_empty() {
            return Err(ChainError::InvalidArgument(format!(
                "chain {} has no links",
                chain_id
            )));
        }
        Ok(Self { chain_id, links })
    }

    /// Chain identifier
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// All links in index order
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    /// Number of links, genesis included
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always false; a chain holds at least its genesis link
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// First link
    pub fn genesis(&self) -> &ChainLink {
        &self.links[0]
    }

    /// Most recent link
    pub fn tail(&self) -> &ChainLink {
        &self.links[self.links.len() - 1]
    }

    /// Iterate over links in index order
    pub fn iter(&self) -> std::slice::Iter<'_, ChainLink> {
        self.links.iter()
    }

    /// Append raw payload bytes as a new link stamped now.
    ///
    /// Returns the new link's hash.
    pub fn append(&mut self, payload: Vec<u8>) -> String {
        self.append_at(payload, Timestamp::now())
    }

    /// Append raw payload bytes with an explicit timestamp
    pub fn append_at(&mut self, payload: Vec<u8>, timestamp: Timestamp) -> String {
        let tail = self.tail();
        let link = ChainLink::build(
            self.chain_id.clone(),
            tail.index() + 1,
            timestamp,
            payload,
            Some(tail.hash().to_string()),
        );
        let hash = link.hash().to_string();

        debug!(
            "Appended link {} to chain {} ({} payload bytes)",
            link.index(),
            self.chain_id,
            link.payload().len()
        );
        self.links.push(link);
        hash
    }

    /// Encode `value` as JSON and append it
    pub fn add<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<String> {
        self.add_with(&JsonPayloadCodec, value)
    }

    /// Encode `value` with `codec` and append it
    pub fn add_with<C, T>(&mut self, codec: &C, value: &T) -> Result<String>
    where
        C: PayloadCodec,
        T: Serialize + ?Sized,
    {
        let payload = codec.encode(value)?;
        Ok(self.append(payload))
    }

    /// Link at `index`
    pub fn link(&self, index: u64) -> Result<&ChainLink> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.links.get(i))
            .filter(|l| l.index() == index)
            .or_else(|| self.links.iter().find(|l| l.index() == index))
            .ok_or(ChainError::IndexNotFound(index))
    }

    /// Link whose hash equals `hash`
    pub fn link_by_hash(&self, hash: &str) -> Result<&ChainLink> {
        self.links
            .iter()
            .find(|l| l.hash() == hash)
            .ok_or_else(|| ChainError::HashNotFound(hash.to_string()))
    }

    /// Decode the JSON payload at `index`
    pub fn get<T: DeserializeOwned>(&self, index: u64) -> Result<T> {
        self.get_with(&JsonPayloadCodec, index)
    }

    /// Decode the payload at `index` with `codec`
    pub fn get_with<C: PayloadCodec, T: DeserializeOwned>(
        &self,
        codec: &C,
        index: u64,
    ) -> Result<T> {
        codec.decode(self.link(index)?.payload())
    }

    /// Decode the JSON payload of the link with `hash`
    pub fn get_by_hash<T: DeserializeOwned>(&self, hash: &str) -> Result<T> {
        self.get_by_hash_with(&JsonPayloadCodec, hash)
    }

    /// Decode the payload of the link with `hash` using `codec`
    pub fn get_by_hash_with<C: PayloadCodec, T: DeserializeOwned>(
        &self,
        codec: &C,
        hash: &str,
    ) -> Result<T> {
        codec.decode(self.link_by_hash(hash)?.payload())
    }

    /// Check every chain invariant.
    ///
    /// Returns the first violation as [`ChainError::BrokenChain`] carrying
    /// the offending index. Has no side effects.
    pub fn validate(&self) -> Result<()> {
        let result = self.check_links();
        if let Err(ref e) = result {
            warn!("Chain {} failed validation: {}", self.chain_id, e);
        }
        result
    }

    /// Whether [`validate`](Self::validate) passes
    pub fn is_valid(&self) -> bool {
        self.check_links().is_ok()
    }

    fn check_links(&self) -> Result<()> {
        let genesis = self
            .links
            .first()
            .ok_or_else(|| ChainError::broken(0, "chain has no links"))?;

        if !genesis.is_genesis() {
            return Err(ChainError::broken(
                genesis.index(),
                "first link is not at index 0",
            ));
        }
        if genesis.previous_hash().is_some() {
            return Err(ChainError::broken(0, "genesis link has a previous hash"));
        }
        self.check_own(genesis)?;

        for pair in self.links.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);

            if curr.index() != prev.index() + 1 {
                return Err(ChainError::broken(
                    curr.index(),
                    format!("expected index {}", prev.index() + 1),
                ));
            }
            self.check_own(curr)?;
            if curr.previous_hash() != Some(prev.hash()) {
                return Err(ChainError::broken(
                    curr.index(),
                    "previous hash does not match preceding link",
                ));
            }
        }

        Ok(())
    }

    fn check_own(&self, link: &ChainLink) -> Result<()> {
        if link.chain_id() != self.chain_id {
            return Err(ChainError::broken(
                link.index(),
                format!("link belongs to chain {}", link.chain_id()),
            ));
        }
        if !link.verify_hash() {
            return Err(ChainError::broken(link.index(), "stored hash does not match content"));
        }
        Ok(())
    }

    /// Serialize with the registry's `key` (or default) serializer
    pub fn to_bytes(&self, registry: &SerializerRegistry, key: Option<&str>) -> Result<Vec<u8>> {
        registry.get(key)?.serialize(&self.chain_id, &self.links)
    }

    /// Serialize and write to `writer`
    pub fn export<W: Write>(
        &self,
        mut writer: W,
        registry: &SerializerRegistry,
        key: Option<&str>,
    ) -> Result<()> {
        let bytes = self.to_bytes(registry, key)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Deserialize and validate a chain.
    ///
    /// A chain that fails validation is never returned; the validation error
    /// propagates unchanged.
    pub fn parse(data: &[u8], registry: &SerializerRegistry, key: Option<&str>) -> Result<Self> {
        let serializer = registry.get(key)?;
        let chain = serializer.deserialize(data)?;
        chain.validate()?;

        debug!(
            "Parsed chain {} ({} links) with {} serializer",
            chain.chain_id,
            chain.len(),
            serializer.key()
        );
        Ok(chain)
    }

    /// Like [`parse`](Self::parse), but reports failure as `false` together
    /// with a fresh chain.
    pub fn try_parse(
        data: &[u8],
        registry: &SerializerRegistry,
        key: Option<&str>,
    ) -> (bool, Self) {
        match Self::parse(data, registry, key) {
            Ok(chain) => (true, chain),
            Err(e) => {
                debug!("try_parse rejected input: {}", e);
                (false, Self::new())
            }
        }
    }

    /// Read everything from `reader` and [`parse`](Self::parse) it
    pub fn read_from<R: Read>(
        mut reader: R,
        registry: &SerializerRegistry,
        key: Option<&str>,
    ) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::parse(&data, registry, key)
    }
}

impl Default for HashChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Dot-joined link hashes in index order
impl fmt::Display for HashChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, link) in self.links.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(link.hash())?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a HashChain {
    type Item = &'a ChainLink;
    type IntoIter = std::slice::Iter<'a, ChainLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
