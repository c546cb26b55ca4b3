// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image to document: one page per image.

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{
    ErrorCode, ImageLayout, ImageToDocumentOptions, ItemFailure, JobOutput, Operation,
    OperationDetails, OperationKind, PageOrientation, Rgb,
};
use docwerk_document::{EmbeddableImage, PdfDocument, RasterImage, Rect};
use tracing::{debug, instrument, warn};

use super::{finish, misrouted};
use crate::progress::ProgressReporter;
use crate::registry::OperationHandler;

/// Lays each decodable image out on its own page. Images that cannot be
/// decoded or embedded are reported per item; the job fails only when no
/// image makes it into the document.
pub struct ImageToDocumentHandler {
    auto_base_width: f32,
}

impl ImageToDocumentHandler {
    pub fn new(auto_base_width: f32) -> Self {
        Self { auto_base_width }
    }

    /// Page dimensions in points for the decoded images.
    fn page_dimensions(
        &self,
        options: &ImageToDocumentOptions,
        images: &[(usize, RasterImage)],
    ) -> Result<(f32, f32)> {
        let Some((width, height)) = options.page_size.dimensions_pt() else {
            let largest = images
                .iter()
                .map(|(_, image)| image)
                .max_by_key(|image| image.area())
                .ok_or_else(|| DocwerkError::ConversionFailed("no images to size".into()))?;
            let aspect = largest.height() as f32 / largest.width().max(1) as f32;
            return Ok((self.auto_base_width, self.auto_base_width * aspect));
        };
        Ok(match options.orientation {
            PageOrientation::Portrait => (width, height),
            PageOrientation::Landscape => (height, width),
        })
    }
}

impl OperationHandler for ImageToDocumentHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::ImageToDocument
    }

    #[instrument(skip_all, fields(job_id = %progress.job_id()))]
    fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
        let Operation::ImageToDocument { images, options } = operation else {
            return Err(misrouted(self.kind()));
        };
        if images.is_empty() {
            return Err(DocwerkError::ConversionFailed("no images supplied".into()));
        }
        let original_size = images.iter().map(Vec::len).sum();
        let total = images.len();
        let mut failures = Vec::new();

        progress.report(5, Some("Decoding images"))?;
        let mut decoded = Vec::with_capacity(total);
        for (index, bytes) in images.into_iter().enumerate() {
            match RasterImage::decode(bytes) {
                Ok(image) => decoded.push((index, image)),
                Err(err) => failures.push(item_failure(index, err)),
            }
        }
        if decoded.is_empty() {
            return Err(DocwerkError::ConversionFailed(format!(
                "none of the {total} images could be decoded"
            )));
        }

        let (page_width, page_height) = self.page_dimensions(&options, &decoded)?;
        let margin = options.margin_points.max(0.0);
        let available = (page_width - 2.0 * margin, page_height - 2.0 * margin);
        if available.0 <= 0.0 || available.1 <= 0.0 {
            return Err(DocwerkError::ConversionFailed(format!(
                "margin of {margin}pt leaves no room on a {page_width}x{page_height}pt page"
            )));
        }
        let background = options.background_color.unwrap_or(Rgb::WHITE);
        debug!(page_width, page_height, images = decoded.len(), "Page size chosen");

        let mut doc = PdfDocument::new();
        let mut converted = 0;
        for (done, (index, image)) in decoded.iter().enumerate() {
            match embeddable(image, options.quality, background) {
                Ok(embeddable) => {
                    let placement = place(
                        image.width() as f32,
                        image.height() as f32,
                        available,
                        margin,
                        options.layout,
                    );
                    let page = doc.add_page(page_width, page_height)?;
                    if let Some(color) = options.background_color {
                        let full = Rect {
                            x: 0.0,
                            y: 0.0,
                            width: page_width,
                            height: page_height,
                        };
                        doc.fill_rect(page, full, color)?;
                    }
                    let image_ref = doc.embed_image(&embeddable)?;
                    doc.draw_image(page, &image_ref, placement)?;
                    converted += 1;
                }
                Err(err) => failures.push(item_failure(*index, err)),
            }
            progress.report_step(10, 90, done + 1, decoded.len())?;
        }

        if converted == 0 {
            return Err(DocwerkError::ConversionFailed(format!(
                "none of the {total} images could be embedded"
            )));
        }
        failures.sort_by_key(|failure| failure.index);

        let result = finish(
            &mut doc,
            original_size,
            OperationDetails::ImageToDocument {
                images_converted: converted,
                page_width,
                page_height,
                failures,
            },
        )?;
        progress.report(100, Some("Conversion complete"))?;
        Ok(JobOutput::Document(result))
    }
}

/// Native embedding first; if that fails, re-encode as JPEG and retry.
fn embeddable(image: &RasterImage, quality: u8, background: Rgb) -> Result<EmbeddableImage> {
    image.native_embedding(background).or_else(|err| {
        warn!(%err, "Native embedding failed, re-encoding as JPEG");
        image.jpeg_embedding(quality, background)
    })
}

fn item_failure(index: usize, err: DocwerkError) -> ItemFailure {
    warn!(index, %err, "Image skipped");
    ItemFailure {
        index,
        code: ErrorCode::ConversionFailed,
        message: err.to_string(),
    }
}

/// Drawn rectangle for an image of `width` x `height` pixels (one pixel per
/// point at actual size), centered in the `available` area.
fn place(width: f32, height: f32, available: (f32, f32), margin: f32, layout: ImageLayout) -> Rect {
    let (avail_w, avail_h) = available;
    let scale = match layout {
        ImageLayout::ActualSize => 1.0,
        ImageLayout::FitWidth => avail_w / width,
        ImageLayout::FitHeight => avail_h / height,
        ImageLayout::FitToPage => (avail_w / width).min(avail_h / height),
    };
    let (drawn_w, drawn_h) = (width * scale, height * scale);
    Rect {
        x: margin + (avail_w - drawn_w) / 2.0,
        y: margin + (avail_h - drawn_h) / 2.0,
        width: drawn_w,
        height: drawn_h,
    }
}
