// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compress: structural size reduction. Embedded images are left untouched.

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{
    CompressionQuality, DocumentResult, JobOutput, Operation, OperationDetails, OperationKind,
    ResultMetadata,
};
use docwerk_document::{MetadataField, PdfDocument, SaveOptions};
use tracing::{info, instrument};

use super::misrouted;
use crate::progress::ProgressReporter;
use crate::registry::OperationHandler;

/// Re-saves the document with structural optimisations chosen by the
/// quality tier, optionally dropping document information fields.
pub struct CompressHandler;

impl OperationHandler for CompressHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::Compress
    }

    #[instrument(skip_all, fields(job_id = %progress.job_id()))]
    fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
        let Operation::Compress { document, options } = operation else {
            return Err(misrouted(self.kind()));
        };

        progress.report(10, Some("Loading document"))?;
        let mut doc = PdfDocument::load(&document).map_err(|err| {
            DocwerkError::CompressionError(format!("cannot load document: {err}"))
        })?;

        if options.remove_metadata {
            for field in MetadataField::ALL {
                doc.set_metadata_field(field, None)?;
            }
            progress.report(30, Some("Metadata removed"))?;
        }

        progress.report(50, Some("Optimising structure"))?;
        let bytes = doc
            .save(&save_options(options.quality))
            .map_err(|err| DocwerkError::CompressionError(err.to_string()))?;

        let ratio = compression_ratio(document.len(), bytes.len());
        info!(
            original = document.len(),
            compressed = bytes.len(),
            ratio,
            "Compression finished"
        );

        let result = DocumentResult {
            metadata: ResultMetadata {
                original_size: document.len(),
                processed_size: bytes.len(),
                page_count: doc.page_count(),
                details: OperationDetails::Compress {
                    quality: options.quality,
                    metadata_removed: options.remove_metadata,
                    compression_ratio: ratio,
                    image_compression_hint: options.image_compression_hint,
                },
            },
            bytes,
        };
        progress.report(100, Some("Compression complete"))?;
        Ok(JobOutput::Document(result))
    }
}

fn save_options(quality: CompressionQuality) -> SaveOptions {
    let medium_or_lower = matches!(quality, CompressionQuality::Medium | CompressionQuality::Low);
    let low = quality == CompressionQuality::Low;
    SaveOptions {
        compress_streams: true,
        prune_unreferenced: medium_or_lower,
        renumber_objects: low,
        strip_page_extras: low,
    }
}

/// `1 - output / input`; negative when the output grew.
fn compression_ratio(original: usize, processed: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    1.0 - processed as f64 / original as f64
}
