//! # Hashchain Core
//!
//! An in-memory, append-only hash chain. Each link's SHA-512 hash covers the
//! previous link's hash, so editing any link breaks validation from that
//! point forward.
//!
//! ## Features
//!
//! - **Genesis initialization**: every chain starts with an index-0 link
//! - **Linked-hash validation**: [`HashChain::validate`] reports the first
//!   broken index
//! - **Typed payloads**: values pass through a [`PayloadCodec`]; links only
//!   ever hold bytes
//! - **Pluggable export**: JSON and XML [`ChainSerializer`]s selected through
//!   an explicit [`SerializerRegistry`]
//!
//! ## Example
//!
//! ```
//! use hashchain_core::{HashChain, SerializerRegistry};
//!
//! let mut chain = HashChain::new();
//! chain.add("hello")?;
//! let hash = chain.add("world")?;
//!
//! assert_eq!(chain.get::<String>(1)?, "hello");
//! assert_eq!(chain.get_by_hash::<String>(&hash)?, "world");
//! chain.validate()?;
//!
//! let registry = SerializerRegistry::with_defaults();
//! let mut exported = Vec::new();
//! chain.export(&mut exported, &registry, Some("xml"))?;
//! let parsed = HashChain::parse(&exported, &registry, Some("xml"))?;
//! assert_eq!(parsed, chain);
//! # Ok::<(), hashchain_core::ChainError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod chain;
pub mod codec;
pub mod config;
pub mod error;
pub mod hash;
pub mod link;
pub mod registry;
pub mod serializer;
pub mod timestamp;

pub use chain::HashChain;
pub use codec::{BincodePayloadCodec, JsonPayloadCodec, PayloadCodec};
pub use config::SerializerConfig;
pub use error::{ChainError, Result};
pub use hash::compute_sha512_hex;
pub use link::ChainLink;
pub use registry::SerializerRegistry;
pub use serializer::{ChainSerializer, JsonSerializer, XmlSerializer};
pub use timestamp::Timestamp;
