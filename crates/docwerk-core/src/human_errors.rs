// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for job failures.
//
// Every machine code is mapped to plain English with a clear suggestion, so
// the host can show something better than "MERGE_FAILED: xref stream
// missing".

use crate::error::JobFailure;
use crate::types::ErrorCode;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Momentary condition; trying the same thing again may work.
    Transient,
    /// The user must change something (another file, password, page list).
    ActionRequired,
    /// The input cannot be processed as-is.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether simply resubmitting the job may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a job failure into a `HumanError`.
pub fn humanize_failure(failure: &JobFailure) -> HumanError {
    humanize_code(failure.code)
}

/// Plain-language description for a machine code.
pub fn humanize_code(code: ErrorCode) -> HumanError {
    match code {
        ErrorCode::AlreadyInProgress => HumanError {
            message: "Another document is still being processed.".into(),
            suggestion: "Wait for it to finish, or cancel it, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ErrorCode::Cancelled => HumanError {
            message: "The operation was cancelled.".into(),
            suggestion: "Start it again whenever you're ready.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ErrorCode::ContextFailed => HumanError {
            message: "The document engine stopped unexpectedly.".into(),
            suggestion: "Try again. A fresh engine is started automatically.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ErrorCode::UnknownOperation => HumanError {
            message: "This operation isn't available.".into(),
            suggestion: "Update the application or choose a different operation.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ErrorCode::MergeFailed => HumanError {
            message: "The documents couldn't be combined.".into(),
            suggestion: "One of the files may be damaged. Try removing files one at a time to find it.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ErrorCode::SplitFailed => HumanError {
            message: "Some pages couldn't be extracted.".into(),
            suggestion: "Check the page numbers and try the failed pages again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ErrorCode::InvalidPages => HumanError {
            message: "Some of the selected pages don't exist.".into(),
            suggestion: "Check the page numbers against the number of pages in the document.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ErrorCode::RotationFailed => HumanError {
            message: "The pages couldn't be rotated.".into(),
            suggestion: "Rotate by a multiple of 90 degrees. If the file is damaged, try another copy.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ErrorCode::WatermarkFailed => HumanError {
            message: "The watermark couldn't be added.".into(),
            suggestion: "The file may be damaged. Try opening it elsewhere first to check it works.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ErrorCode::ConversionFailed => HumanError {
            message: "An image couldn't be turned into a page.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ErrorCode::CompressionError => HumanError {
            message: "The document couldn't be compressed.".into(),
            suggestion: "Try a different quality level, or check that the file opens correctly.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ErrorCode::ProtectionFailed => HumanError {
            message: "The document couldn't be protected.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ErrorCode::InvalidPassword => HumanError {
            message: "That password is incorrect.".into(),
            suggestion: "Check for typos and caps lock, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ErrorCode::InvalidFormat => HumanError {
            message: "This isn't a protected document.".into(),
            suggestion: "Choose a file that was protected with this application.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
