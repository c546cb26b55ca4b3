// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: the editable document model, page copying, and notice pages.

mod copy;
pub mod document;
pub mod notice;

pub use document::{
    ImageRef, MetadataField, PageBox, PdfDocument, Rect, SaveOptions, TextStyle,
};
pub use notice::NoticeWriter;
