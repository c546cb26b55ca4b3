// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Docwerk transformation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique correlation id for a transformation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The transformation a job performs. Doubles as the request type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Merge,
    Split,
    Rotate,
    Watermark,
    ImageToDocument,
    Compress,
    PasswordWrap,
    PasswordUnwrap,
}

impl OperationKind {
    /// Every kind, in declaration order.
    pub const ALL: [OperationKind; 8] = [
        Self::Merge,
        Self::Split,
        Self::Rotate,
        Self::Watermark,
        Self::ImageToDocument,
        Self::Compress,
        Self::PasswordWrap,
        Self::PasswordUnwrap,
    ];

    /// Wire name of the kind (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "MERGE",
            Self::Split => "SPLIT",
            Self::Rotate => "ROTATE",
            Self::Watermark => "WATERMARK",
            Self::ImageToDocument => "IMAGE_TO_DOCUMENT",
            Self::Compress => "COMPRESS",
            Self::PasswordWrap => "PASSWORD_WRAP",
            Self::PasswordUnwrap => "PASSWORD_UNWRAP",
        }
    }

    /// Code reported when a handler of this kind fails with a generic
    /// document or image error.
    pub fn failure_code(&self) -> ErrorCode {
        match self {
            Self::Merge => ErrorCode::MergeFailed,
            Self::Split => ErrorCode::SplitFailed,
            Self::Rotate => ErrorCode::RotationFailed,
            Self::Watermark => ErrorCode::WatermarkFailed,
            Self::ImageToDocument => ErrorCode::ConversionFailed,
            Self::Compress => ErrorCode::CompressionError,
            Self::PasswordWrap => ErrorCode::ProtectionFailed,
            Self::PasswordUnwrap => ErrorCode::InvalidFormat,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle states of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Created by `submit`, not yet posted to the background context.
    Queued,
    /// Posted and executing in the background context.
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Machine-readable failure codes carried by every error the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AlreadyInProgress,
    UnknownOperation,
    MergeFailed,
    SplitFailed,
    InvalidPages,
    RotationFailed,
    WatermarkFailed,
    ConversionFailed,
    CompressionError,
    ProtectionFailed,
    InvalidPassword,
    InvalidFormat,
    Cancelled,
    ContextFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyInProgress => "ALREADY_IN_PROGRESS",
            Self::UnknownOperation => "UNKNOWN_OPERATION",
            Self::MergeFailed => "MERGE_FAILED",
            Self::SplitFailed => "SPLIT_FAILED",
            Self::InvalidPages => "INVALID_PAGES",
            Self::RotationFailed => "ROTATION_FAILED",
            Self::WatermarkFailed => "WATERMARK_FAILED",
            Self::ConversionFailed => "CONVERSION_FAILED",
            Self::CompressionError => "COMPRESSION_ERROR",
            Self::ProtectionFailed => "PROTECTION_FAILED",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::Cancelled => "CANCELLED",
            Self::ContextFailed => "CONTEXT_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single transformation request as tracked by the coordinator.
///
/// Lives only for one submit/resolve cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub kind: OperationKind,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            id: JobId::new(),
            kind,
            status: JobStatus::Queued,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Move to `status`. Returns `false` (and changes nothing) once a
    /// terminal status has been reached.
    pub fn transition(&mut self, status: JobStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        if status.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        true
    }
}

/// Page orientation as seen by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Classify a page of `width` x `height` points carrying `rotation`
    /// degrees. Quarter turns swap the visible axes.
    pub fn classify(width: f32, height: f32, rotation: i64) -> Self {
        let (w, h) = if rotation.rem_euclid(180) == 90 {
            (height, width)
        } else {
            (width, height)
        };
        if w > h { Self::Landscape } else { Self::Portrait }
    }
}

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const GRAY: Rgb = Rgb { r: 128, g: 128, b: 128 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to the 0.0..=1.0 range used by PDF colour operators.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(input: &str) -> Option<Self> {
        let hex = input.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}
