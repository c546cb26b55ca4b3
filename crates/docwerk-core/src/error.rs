// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Docwerk.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ErrorCode, JobId, OperationKind};

/// Top-level error type for all Docwerk operations.
#[derive(Debug, Error)]
pub enum DocwerkError {
    // -- Coordinator errors --
    #[error("job {running} is already in progress")]
    AlreadyInProgress { running: JobId },

    #[error("job {0} was cancelled")]
    Cancelled(JobId),

    #[error("background context failed: {0}")]
    ContextFailed(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(OperationKind),

    // -- Operation errors --
    #[error("merge failed: {0}")]
    MergeFailed(String),

    #[error("split failed: {0}")]
    SplitFailed(String),

    #[error("invalid pages {pages:?} (document has {total} pages)")]
    InvalidPages { pages: Vec<u32>, total: usize },

    #[error("rotation failed: {0}")]
    RotationFailed(String),

    #[error("watermark failed: {0}")]
    WatermarkFailed(String),

    #[error("conversion failed: {0}")]
    ConversionFailed(String),

    #[error("compression failed: {0}")]
    CompressionError(String),

    #[error("protection failed: {0}")]
    ProtectionFailed(String),

    #[error("the password is incorrect")]
    InvalidPassword,

    #[error("not a protected document: {0}")]
    InvalidFormat(String),

    // -- Document library errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Ambient --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocwerkError {
    /// The machine code for this error, or `None` for generic document,
    /// image and ambient errors whose code depends on the failing operation.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::AlreadyInProgress { .. } => Some(ErrorCode::AlreadyInProgress),
            Self::Cancelled(_) => Some(ErrorCode::Cancelled),
            Self::ContextFailed(_) => Some(ErrorCode::ContextFailed),
            Self::UnknownOperation(_) => Some(ErrorCode::UnknownOperation),
            Self::MergeFailed(_) => Some(ErrorCode::MergeFailed),
            Self::SplitFailed(_) => Some(ErrorCode::SplitFailed),
            Self::InvalidPages { .. } => Some(ErrorCode::InvalidPages),
            Self::RotationFailed(_) => Some(ErrorCode::RotationFailed),
            Self::WatermarkFailed(_) => Some(ErrorCode::WatermarkFailed),
            Self::ConversionFailed(_) => Some(ErrorCode::ConversionFailed),
            Self::CompressionError(_) => Some(ErrorCode::CompressionError),
            Self::ProtectionFailed(_) => Some(ErrorCode::ProtectionFailed),
            Self::InvalidPassword => Some(ErrorCode::InvalidPassword),
            Self::InvalidFormat(_) => Some(ErrorCode::InvalidFormat),
            Self::PdfError(_)
            | Self::ImageError(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Serialization(_) => None,
        }
    }

    /// Convert into the wire-level failure reported for a job of `kind`.
    pub fn into_failure(self, kind: OperationKind) -> JobFailure {
        let code = self.code().unwrap_or_else(|| kind.failure_code());
        JobFailure::new(code, self.to_string())
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocwerkError>;

/// A failure as it crosses the context boundary: a machine code plus a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct JobFailure {
    pub code: ErrorCode,
    pub message: String,
}

impl JobFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
