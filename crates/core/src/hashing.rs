//! SHA-256 digests and single-use access tokens.
//!
//! Quote access links carry a random plaintext token; only its SHA-256 hex
//! digest is persisted.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a quote access token (hex-encoded to 64 chars).
const ACCESS_TOKEN_BYTES: usize = 32;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Hash a plaintext access token for storage or lookup.
pub fn hash_access_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

/// Generate a new access token.
///
/// Returns `(plaintext, sha256_hex_hash)`. The plaintext goes into the
/// customer's link; only the hash is stored.
pub fn generate_access_token() -> (String, String) {
    let mut bytes = [0u8; ACCESS_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let plaintext: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let hash = hash_access_token(&plaintext);
    (plaintext, hash)
}
