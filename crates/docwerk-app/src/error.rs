// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Errors surfaced by the command-line host.

use std::path::PathBuf;
use std::process::ExitCode;

use docwerk_core::{DocwerkError, ErrorCode, JobFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration: {0}")]
    Config(#[from] DocwerkError),

    #[error(transparent)]
    Job(JobFailure),

    #[error("cannot encode summary: {0}")]
    Summary(#[from] serde_json::Error),
}

impl CliError {
    /// 2 for bad arguments, 130 for an interrupted job, 1 otherwise.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_) => ExitCode::from(2),
            Self::Job(failure) if failure.code == ErrorCode::Cancelled => ExitCode::from(130),
            _ => ExitCode::FAILURE,
        }
    }
}
