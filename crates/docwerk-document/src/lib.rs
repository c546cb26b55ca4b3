// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docwerk-document: In-memory document model for the Docwerk engine.
//
// Provides the capability surface every operation handler is written against:
// PDF load/save, page enumeration and copying, rotation, text and image
// drawing, metadata, notice-page generation, and raster image embedding.

pub mod font;
pub mod image;
pub mod pdf;

// Re-export the primary types so callers can use `docwerk_document::PdfDocument` etc.
pub use font::StandardFont;
pub use image::{EmbeddableImage, RasterImage};
pub use pdf::{MetadataField, NoticeWriter, PdfDocument, Rect, SaveOptions, TextStyle};
