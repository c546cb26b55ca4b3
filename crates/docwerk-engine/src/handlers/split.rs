// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Split: produce a batch of documents from selected pages.

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{
    BatchItem, ErrorCode, ItemFailure, JobOutput, Operation, OperationDetails, OperationKind,
    SplitMode, SplitOptions,
};
use docwerk_document::PdfDocument;
use tracing::{debug, instrument, warn};

use super::{extract_pages, finish, misrouted};
use crate::progress::ProgressReporter;
use crate::registry::OperationHandler;

/// Splits one document into a batch. Invalid page requests fail only their
/// own batch item; only an unreadable source fails the job.
pub struct SplitHandler;

impl OperationHandler for SplitHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::Split
    }

    #[instrument(skip_all, fields(job_id = %progress.job_id()))]
    fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
        let Operation::Split { document, options } = operation else {
            return Err(misrouted(self.kind()));
        };

        progress.report(10, Some("Loading document"))?;
        let source = PdfDocument::load(&document)
            .map_err(|err| DocwerkError::SplitFailed(format!("cannot load source: {err}")))?;
        let total = source.page_count();
        debug!(total, mode = ?options.mode, "Splitting document");

        let groups = plan(&options, total)?;
        let mut items = Vec::with_capacity(groups.len());
        for (index, group) in groups.iter().enumerate() {
            let outcome = match group {
                Ok(pages) => build_item(&source, pages, document.len(), options.mode)
                    .map_err(|err| ItemFailure {
                        index,
                        code: ErrorCode::SplitFailed,
                        message: err.to_string(),
                    }),
                Err(message) => Err(ItemFailure {
                    index,
                    code: ErrorCode::SplitFailed,
                    message: message.clone(),
                }),
            };
            if let Err(failure) = &outcome {
                warn!(index, "Split item failed: {}", failure.message);
            }
            items.push(BatchItem { index, outcome });
            progress.report_step(10, 95, index + 1, groups.len())?;
        }

        progress.report(100, Some("Split complete"))?;
        Ok(JobOutput::Batch(items))
    }
}

/// Page groups to extract, one per batch item. An `Err` group is an
/// invalid request that becomes a failed item.
type Group = std::result::Result<Vec<usize>, String>;

fn plan(options: &SplitOptions, total: usize) -> Result<Vec<Group>> {
    match options.mode {
        SplitMode::AllPages => Ok((0..total).map(|page| Ok(vec![page])).collect()),
        SplitMode::SpecificPages => {
            let pages = options.pages.as_deref().unwrap_or_default();
            if pages.is_empty() {
                return Err(DocwerkError::SplitFailed("no pages requested".into()));
            }
            Ok(pages
                .iter()
                .map(|&page| {
                    let page = page as usize;
                    if page < total {
                        Ok(vec![page])
                    } else {
                        Err(format!(
                            "page index {page} is out of range (document has {total} pages)"
                        ))
                    }
                })
                .collect())
        }
        SplitMode::Range => {
            let (Some(start), Some(end)) = (options.start, options.end) else {
                return Err(DocwerkError::SplitFailed(
                    "range split needs a start and an end".into(),
                ));
            };
            let (start, end) = (start as usize, end as usize);
            let group = if start <= end && end < total {
                Ok((start..=end).collect())
            } else {
                Err(format!(
                    "range {start}..={end} is invalid (document has {total} pages)"
                ))
            };
            Ok(vec![group])
        }
    }
}

fn build_item(
    source: &PdfDocument,
    pages: &[usize],
    original_size: usize,
    mode: SplitMode,
) -> Result<docwerk_core::DocumentResult> {
    let mut output = extract_pages(source, pages)?;
    finish(
        &mut output,
        original_size,
        OperationDetails::Split {
            mode,
            source_pages: pages.iter().map(|&p| p as u32).collect(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::{numbered_pdf, page_widths};
    use crate::progress::test_reporter;

    fn split(document: Vec<u8>, options: SplitOptions) -> Result<Vec<BatchItem>> {
        let (mut progress, _rx) = test_reporter();
        SplitHandler
            .run(Operation::Split { document, options }, &mut progress)
            .map(|output| output.into_batch().expect("batch output"))
    }

    fn widths(item: &BatchItem) -> Vec<f32> {
        let doc = item.outcome.as_ref().expect("successful item");
        page_widths(&doc.bytes)
    }

    #[test]
    fn all_pages_yields_one_document_per_page() {
        let items = split(numbered_pdf(3), SplitOptions::all_pages()).expect("split");
        assert_eq!(items.len(), 3);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.index, i);
            assert_eq!(widths(item), vec![100.0 + i as f32]);
        }
    }

    #[test]
    fn specific_pages_isolate_out_of_range_requests() {
        let items = split(numbered_pdf(3), SplitOptions::specific(vec![0, 5, 2])).expect("split");
        assert_eq!(items.len(), 3);
        assert_eq!(widths(&items[0]), vec![100.0]);
        let failure = items[1].outcome.as_ref().err().expect("item 1 fails");
        assert_eq!(failure.code, ErrorCode::SplitFailed);
        assert_eq!(failure.index, 1);
        assert_eq!(widths(&items[2]), vec![102.0]);
    }

    #[test]
    fn range_copies_contiguous_pages_into_one_document() {
        let items = split(numbered_pdf(5), SplitOptions::range(1, 3)).expect("split");
        assert_eq!(items.len(), 1);
        assert_eq!(widths(&items[0]), vec![101.0, 102.0, 103.0]);
        let doc = items[0].outcome.as_ref().expect("ok");
        assert_eq!(
            doc.metadata.details,
            OperationDetails::Split {
                mode: SplitMode::Range,
                source_pages: vec![1, 2, 3],
            }
        );
    }

    #[test]
    fn invalid_ranges_fail_their_item() {
        for (start, end) in [(3, 1), (0, 5)] {
            let items = split(numbered_pdf(5), SplitOptions::range(start, end)).expect("split");
            assert_eq!(items.len(), 1);
            assert!(!items[0].is_success());
        }
    }

    #[test]
    fn unreadable_source_fails_the_job() {
        assert!(matches!(
            split(b"nope".to_vec(), SplitOptions::all_pages()),
            Err(DocwerkError::SplitFailed(_))
        ));
    }
}
