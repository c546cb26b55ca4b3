// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operation handlers: one per operation kind, all written against the
// `docwerk-document` capability surface.

pub mod compress;
pub mod image_to_document;
pub mod merge;
pub mod password;
pub mod rotate;
pub mod split;
pub mod transliterate;
pub mod watermark;

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{DocumentResult, OperationDetails, OperationKind, ResultMetadata};
use docwerk_document::{PdfDocument, SaveOptions};

/// Error for an operation that reached a handler of another kind.
pub(crate) fn misrouted(handler: OperationKind) -> DocwerkError {
    DocwerkError::ContextFailed(format!(
        "operation delivered to the {handler} handler has a different kind"
    ))
}

/// Serialise `document` with default save options and wrap it as a result.
pub(crate) fn finish(
    document: &mut PdfDocument,
    original_size: usize,
    details: OperationDetails,
) -> Result<DocumentResult> {
    let bytes = document.save(&SaveOptions::default())?;
    Ok(DocumentResult {
        metadata: ResultMetadata {
            original_size,
            processed_size: bytes.len(),
            page_count: document.page_count(),
            details,
        },
        bytes,
    })
}

/// Build a single-document copy of `pages` from `source`.
pub(crate) fn extract_pages(source: &PdfDocument, pages: &[usize]) -> Result<PdfDocument> {
    let mut output = PdfDocument::new();
    output.copy_pages(source, pages)?;
    Ok(output)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use docwerk_document::{PdfDocument, SaveOptions};

    /// A document whose page `i` is `100 + i` points wide and 200 tall, so
    /// page identity survives copying.
    pub fn numbered_pdf(pages: usize) -> Vec<u8> {
        sized_pdf(&(0..pages).map(|i| (100.0 + i as f32, 200.0)).collect::<Vec<_>>())
    }

    pub fn sized_pdf(sizes: &[(f32, f32)]) -> Vec<u8> {
        let mut doc = PdfDocument::new();
        for &(w, h) in sizes {
            doc.add_page(w, h).expect("add page");
        }
        doc.save(&SaveOptions::default()).expect("save fixture")
    }

    /// Page widths of a serialised document, in order.
    pub fn page_widths(bytes: &[u8]) -> Vec<f32> {
        let doc = PdfDocument::load(bytes).expect("load output");
        (0..doc.page_count())
            .map(|i| doc.page_size(i).expect("page size").0)
            .collect()
    }
}
