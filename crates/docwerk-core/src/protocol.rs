// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Messages exchanged between the job coordinator and the background execution
// context.
//
// Requests carry their input buffers by value: posting a request moves the
// bytes into the context, the host keeps no copy.

use serde::{Deserialize, Serialize};

use crate::error::JobFailure;
use crate::options::{
    CompressOptions, CompressionQuality, ImageToDocumentOptions, MergeOptions,
    PasswordUnwrapOptions, PasswordWrapOptions, RotateOptions, SplitMode, SplitOptions,
    WatermarkOptions,
};
use crate::types::{ErrorCode, JobId, OperationKind, Orientation};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One transformation with its typed options and input buffers.
#[derive(Clone)]
pub enum Operation {
    Merge {
        documents: Vec<Vec<u8>>,
        options: MergeOptions,
    },
    Split {
        document: Vec<u8>,
        options: SplitOptions,
    },
    Rotate {
        document: Vec<u8>,
        options: RotateOptions,
    },
    Watermark {
        document: Vec<u8>,
        options: WatermarkOptions,
    },
    ImageToDocument {
        images: Vec<Vec<u8>>,
        options: ImageToDocumentOptions,
    },
    Compress {
        document: Vec<u8>,
        options: CompressOptions,
    },
    PasswordWrap {
        document: Vec<u8>,
        options: PasswordWrapOptions,
    },
    PasswordUnwrap {
        document: Vec<u8>,
        options: PasswordUnwrapOptions,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Merge { .. } => OperationKind::Merge,
            Self::Split { .. } => OperationKind::Split,
            Self::Rotate { .. } => OperationKind::Rotate,
            Self::Watermark { .. } => OperationKind::Watermark,
            Self::ImageToDocument { .. } => OperationKind::ImageToDocument,
            Self::Compress { .. } => OperationKind::Compress,
            Self::PasswordWrap { .. } => OperationKind::PasswordWrap,
            Self::PasswordUnwrap { .. } => OperationKind::PasswordUnwrap,
        }
    }

    /// Total size of all input buffers in bytes.
    pub fn input_size(&self) -> usize {
        match self {
            Self::Merge { documents, .. } => documents.iter().map(Vec::len).sum(),
            Self::ImageToDocument { images, .. } => images.iter().map(Vec::len).sum(),
            Self::Split { document, .. }
            | Self::Rotate { document, .. }
            | Self::Watermark { document, .. }
            | Self::Compress { document, .. }
            | Self::PasswordWrap { document, .. }
            | Self::PasswordUnwrap { document, .. } => document.len(),
        }
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("kind", &self.kind())
            .field("input_bytes", &self.input_size())
            .finish()
    }
}

/// A job request posted to the background context.
#[derive(Debug)]
pub struct JobRequest {
    pub id: JobId,
    pub operation: Operation,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Message emitted by the background context, tagged with the originating
/// job id.
#[derive(Debug)]
pub struct WorkerMessage {
    pub id: JobId,
    pub body: MessageBody,
}

#[derive(Debug)]
pub enum MessageBody {
    Progress {
        percent: u8,
        message: Option<String>,
    },
    Success(JobOutput),
    Error(JobFailure),
}

/// Progress notification delivered to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub job_id: JobId,
    /// 0..=100, non-decreasing for a given job.
    pub percent: u8,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Successful output of a job.
#[derive(Debug)]
pub enum JobOutput {
    /// A single output document.
    Document(DocumentResult),
    /// Independently successful or failed items (split).
    Batch(Vec<BatchItem>),
}

impl JobOutput {
    pub fn into_document(self) -> Option<DocumentResult> {
        match self {
            Self::Document(doc) => Some(doc),
            Self::Batch(_) => None,
        }
    }

    pub fn into_batch(self) -> Option<Vec<BatchItem>> {
        match self {
            Self::Batch(items) => Some(items),
            Self::Document(_) => None,
        }
    }
}

/// Output bytes plus the metadata shown to the user.
pub struct DocumentResult {
    pub bytes: Vec<u8>,
    pub metadata: ResultMetadata,
}

impl std::fmt::Debug for DocumentResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentResult")
            .field("bytes", &self.bytes.len())
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub original_size: usize,
    pub processed_size: usize,
    pub page_count: usize,
    pub details: OperationDetails,
}

/// Operation-specific result fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationDetails {
    Merge {
        file_count: usize,
    },
    Split {
        mode: SplitMode,
        /// 0-based source indices contained in this output.
        source_pages: Vec<u32>,
    },
    Rotate {
        angle: i64,
        /// 0-based indices that were rotated.
        rotated_pages: Vec<u32>,
        orientations: Vec<OrientationChange>,
    },
    Watermark {
        pages_stamped: usize,
        /// The text actually drawn after sanitising.
        rendered_text: String,
    },
    ImageToDocument {
        images_converted: usize,
        page_width: f32,
        page_height: f32,
        failures: Vec<ItemFailure>,
    },
    Compress {
        quality: CompressionQuality,
        metadata_removed: bool,
        /// `1 - processed / original`.
        compression_ratio: f64,
        image_compression_hint: Option<u8>,
    },
    PasswordWrap {
        fragment_bytes: usize,
    },
    PasswordUnwrap {
        /// Always true: the original content is not reconstructed.
        placeholder: bool,
    },
}

/// Orientation of one page before and after a rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationChange {
    pub page: u32,
    pub before: Orientation,
    pub after: Orientation,
}

/// One entry of a batch result.
#[derive(Debug)]
pub struct BatchItem {
    pub index: usize,
    pub outcome: std::result::Result<DocumentResult, ItemFailure>,
}

impl BatchItem {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// A per-item failure that did not abort its batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub index: usize,
    pub code: ErrorCode,
    pub message: String,
}
