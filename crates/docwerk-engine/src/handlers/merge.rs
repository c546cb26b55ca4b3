// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Merge: concatenate documents in input order.

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{JobOutput, Operation, OperationDetails, OperationKind};
use docwerk_document::PdfDocument;
use tracing::{debug, instrument};

use super::{finish, misrouted};
use crate::progress::ProgressReporter;
use crate::registry::OperationHandler;

/// Concatenates every page of every input into one document.
///
/// Strict: one unreadable input fails the whole job.
pub struct MergeHandler;

impl OperationHandler for MergeHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::Merge
    }

    #[instrument(skip_all, fields(job_id = %progress.job_id()))]
    fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
        let Operation::Merge { documents, .. } = operation else {
            return Err(misrouted(self.kind()));
        };
        if documents.is_empty() {
            return Err(DocwerkError::MergeFailed("no documents to merge".into()));
        }

        let original_size = documents.iter().map(Vec::len).sum();
        let file_count = documents.len();
        let mut output = PdfDocument::new();
        progress.report(20, Some("Merging documents"))?;

        for (index, bytes) in documents.iter().enumerate() {
            let source = PdfDocument::load(bytes).map_err(|err| {
                DocwerkError::MergeFailed(format!("document {}: {err}", index + 1))
            })?;
            let pages: Vec<usize> = (0..source.page_count()).collect();
            output.copy_pages(&source, &pages).map_err(|err| {
                DocwerkError::MergeFailed(format!("document {}: {err}", index + 1))
            })?;
            debug!(index, pages = pages.len(), "Document appended");
            progress.report_step(20, 90, index + 1, file_count)?;
        }

        let result = finish(
            &mut output,
            original_size,
            OperationDetails::Merge { file_count },
        )
        .map_err(|err| DocwerkError::MergeFailed(err.to_string()))?;
        progress.report(100, Some("Merge complete"))?;
        Ok(JobOutput::Document(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::{numbered_pdf, page_widths, sized_pdf};
    use crate::progress::test_reporter;
    use docwerk_core::{MergeOptions, MessageBody};

    fn merge(documents: Vec<Vec<u8>>) -> Result<JobOutput> {
        let (mut progress, _rx) = test_reporter();
        MergeHandler.run(
            Operation::Merge {
                documents,
                options: MergeOptions::default(),
            },
            &mut progress,
        )
    }

    #[test]
    fn output_is_the_concatenation_of_inputs() {
        let a = numbered_pdf(2);
        let b = sized_pdf(&[(300.0, 400.0)]);
        let c = sized_pdf(&[(400.0, 300.0), (500.0, 500.0)]);

        let result = merge(vec![a, b, c])
            .expect("merge")
            .into_document()
            .expect("document");
        assert_eq!(
            page_widths(&result.bytes),
            vec![100.0, 101.0, 300.0, 400.0, 500.0]
        );
        assert_eq!(result.metadata.page_count, 5);
        assert_eq!(
            result.metadata.details,
            OperationDetails::Merge { file_count: 3 }
        );
    }

    #[test]
    fn one_bad_input_fails_the_job() {
        let err = merge(vec![numbered_pdf(1), b"garbage".to_vec()]).err().expect("fails");
        assert!(matches!(err, DocwerkError::MergeFailed(ref m) if m.contains("document 2")));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(merge(Vec::new()), Err(DocwerkError::MergeFailed(_))));
    }

    #[test]
    fn progress_runs_from_twenty_to_ninety_per_file() {
        let (mut progress, mut rx) = test_reporter();
        MergeHandler
            .run(
                Operation::Merge {
                    documents: vec![numbered_pdf(1), numbered_pdf(1)],
                    options: MergeOptions::default(),
                },
                &mut progress,
            )
            .expect("merge");

        let mut seen = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            if let MessageBody::Progress { percent, .. } = msg.body {
                seen.push(percent);
            }
        }
        assert_eq!(seen, vec![20, 55, 90, 100]);
    }
}
