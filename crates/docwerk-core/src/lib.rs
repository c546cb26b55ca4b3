// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docwerk: Core types, operation options, the job wire protocol and error
// definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod options;
pub mod protocol;
pub mod types;

pub use config::EngineConfig;
pub use error::{DocwerkError, JobFailure};
pub use options::*;
pub use protocol::*;
pub use types::*;
