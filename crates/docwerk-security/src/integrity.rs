// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document fingerprints: SHA-256 hashing of input and output buffers.

use sha2::{Digest, Sha256};

/// Length of the abbreviated fingerprint used in log fields.
const FINGERPRINT_LEN: usize = 12;

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Abbreviated fingerprint for log output, e.g. `2cf24dba5fb0`.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hex = hash_bytes(data);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn hash_empty_input() {
        assert_eq!(hash_bytes(b""), EMPTY_SHA256);
    }

    #[test]
    fn hash_known_value() {
        // SHA-256("hello") as printed by coreutils sha256sum.
        let expected = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        assert_eq!(hash_bytes(b"hello"), expected);
        assert_eq!(fingerprint(b"hello"), "2cf24dba5fb0");
    }

    #[test]
    fn fingerprint_is_a_prefix_of_the_full_hash() {
        let data = vec![7u8; 4096];
        let full = hash_bytes(&data);
        let short = fingerprint(&data);
        assert_eq!(short.len(), 12);
        assert!(full.starts_with(&short));
    }
}
