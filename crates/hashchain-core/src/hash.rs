//! SHA-512 link hashing

use sha2::{Digest, Sha512};

use crate::timestamp::Timestamp;

/// Length of a hex-encoded SHA-512 digest
pub const HASH_HEX_LEN: usize = 128;

/// Compute the lower-case hex SHA-512 of `text`
pub fn compute_sha512_hex(text: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build the string a link hash is computed over:
/// `{chain_id}-{ticks}-{previous_hash}-{payload_hex}`
pub fn link_hash_input(
    chain_id: &str,
    timestamp: Timestamp,
    previous_hash: Option<&str>,
    payload: &[u8],
) -> String {
    format!(
        "{}-{}-{}-{}",
        chain_id,
        timestamp,
        previous_hash.unwrap_or_default(),
        hex::encode(payload)
    )
}

/// Hash of a link with the given content
pub fn compute_link_hash(
    chain_id: &str,
    timestamp: Timestamp,
    previous_hash: Option<&str>,
    payload: &[u8],
) -> String {
    compute_sha512_hex(&link_hash_input(chain_id, timestamp, previous_hash, payload))
}
