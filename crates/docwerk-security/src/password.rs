// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Salted password digests for the password wrapper.
//
// Encoded form: `<salt hex>$<digest hex>`, where the digest is
// PBKDF2-HMAC-SHA256 over the password with `PBKDF2_ITERATIONS` rounds.

use std::num::NonZeroU32;

use docwerk_core::error::{DocwerkError, Result};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::debug;

const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;
const PBKDF2_ITERATIONS: NonZeroU32 = NonZeroU32::MIN.saturating_add(9_999);
const PBKDF2_ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;
const SEPARATOR: char = '$';

/// A salted one-way digest of a password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    salt: [u8; SALT_LEN],
    digest: [u8; DIGEST_LEN],
}

impl PasswordDigest {
    /// Hash `password` under a fresh random salt.
    pub fn create(password: &str) -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        SystemRandom::new()
            .fill(&mut salt)
            .map_err(|_| DocwerkError::ProtectionFailed("random salt unavailable".into()))?;
        Ok(Self::with_salt(password, salt))
    }

    /// Hash `password` under a caller-supplied salt.
    pub fn with_salt(password: &str, salt: [u8; SALT_LEN]) -> Self {
        let mut digest = [0u8; DIGEST_LEN];
        pbkdf2::derive(
            PBKDF2_ALGORITHM,
            PBKDF2_ITERATIONS,
            &salt,
            password.as_bytes(),
            &mut digest,
        );
        Self { salt, digest }
    }

    /// Whether `password` produces this digest.
    pub fn verify(&self, password: &str) -> bool {
        pbkdf2::verify(
            PBKDF2_ALGORITHM,
            PBKDF2_ITERATIONS,
            &self.salt,
            password.as_bytes(),
            &self.digest,
        )
        .is_ok()
    }

    /// Encode as `<salt hex>$<digest hex>`.
    pub fn encode(&self) -> String {
        format!(
            "{}{SEPARATOR}{}",
            hex::encode(self.salt),
            hex::encode(self.digest)
        )
    }

    /// Parse the output of [`PasswordDigest::encode`].
    pub fn decode(encoded: &str) -> Result<Self> {
        let (salt_hex, digest_hex) = encoded
            .split_once(SEPARATOR)
            .ok_or_else(|| DocwerkError::InvalidFormat("password digest has no salt".into()))?;

        let salt = decode_fixed::<SALT_LEN>(salt_hex, "salt")?;
        let digest = decode_fixed::<DIGEST_LEN>(digest_hex, "digest")?;
        debug!("password digest decoded");
        Ok(Self { salt, digest })
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordDigest")
            .field("salt", &hex::encode(self.salt))
            .finish_non_exhaustive()
    }
}

fn decode_fixed<const N: usize>(hex_str: &str, what: &str) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    hex::decode_to_slice(hex_str, &mut bytes).map_err(|e| {
        DocwerkError::InvalidFormat(format!("password {what} is not {N} hex bytes: {e}"))
    })?;
    Ok(bytes)
}
