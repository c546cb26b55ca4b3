// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docwerk-security: Hashing primitives used by the password wrapper and for
// fingerprinting documents in log output.
//
// Nothing here encrypts document content: the password wrapper only stores a
// salted digest and checks it later.

pub mod integrity;
pub mod password;

pub use integrity::{fingerprint, hash_bytes};
pub use password::PasswordDigest;
