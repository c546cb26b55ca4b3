// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Watermark: stamp one line of text on every page.

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{
    JobOutput, Operation, OperationDetails, OperationKind, WatermarkOptions, WatermarkPosition,
};
use docwerk_document::pdf::PageBox;
use docwerk_document::{PdfDocument, StandardFont, TextStyle};
use tracing::{debug, instrument, warn};

use super::transliterate::sanitize;
use super::{finish, misrouted};
use crate::progress::ProgressReporter;
use crate::registry::OperationHandler;

const FONT: StandardFont = StandardFont::Helvetica;

/// Draws the watermark text at a named position with the requested size,
/// colour, opacity and rotation.
pub struct WatermarkHandler {
    corner_inset: f32,
}

impl WatermarkHandler {
    pub fn new(corner_inset: f32) -> Self {
        Self { corner_inset }
    }
}

impl OperationHandler for WatermarkHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::Watermark
    }

    #[instrument(skip_all, fields(job_id = %progress.job_id()))]
    fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
        let Operation::Watermark { document, options } = operation else {
            return Err(misrouted(self.kind()));
        };
        let text = sanitize(&options.text, FONT);
        if text.trim().is_empty() {
            return Err(DocwerkError::WatermarkFailed("watermark text is empty".into()));
        }
        if !(options.font_size.is_finite() && options.font_size > 0.0) {
            return Err(DocwerkError::WatermarkFailed(format!(
                "font size must be positive, got {}",
                options.font_size
            )));
        }

        progress.report(10, Some("Loading document"))?;
        let mut doc = PdfDocument::load(&document).map_err(|err| {
            DocwerkError::WatermarkFailed(format!("cannot load document: {err}"))
        })?;
        let total = doc.page_count();
        let width = FONT.width_of_text_at_size(&text, options.font_size);
        let height = FONT.height_at_size(options.font_size);

        for index in 0..total {
            let page = doc.page_box(index)?;
            let (x, y) = self.anchor(&page, width, height, &options).unwrap_or_else(|| {
                warn!(index, "Watermark position unavailable, using page center");
                centered(&page, width, height, options.rotation_degrees)
            });
            let style = TextStyle {
                font: FONT,
                size: options.font_size,
                color: options.color,
                opacity: options.opacity_percent.min(100) as f32 / 100.0,
                rotation_degrees: options.rotation_degrees,
                x,
                y,
            };
            doc.draw_text(index, &text, &style)?;
            debug!(index, x, y, "Watermark drawn");
            progress.report_step(10, 90, index + 1, total)?;
        }

        let result = finish(
            &mut doc,
            document.len(),
            OperationDetails::Watermark {
                pages_stamped: total,
                rendered_text: text,
            },
        )?;
        progress.report(100, Some("Watermark complete"))?;
        Ok(JobOutput::Document(result))
    }
}

impl WatermarkHandler {
    /// Text origin for the requested position, or `None` if the position
    /// cannot be honoured on this page.
    fn anchor(
        &self,
        page: &PageBox,
        width: f32,
        height: f32,
        options: &WatermarkOptions,
    ) -> Option<(f32, f32)> {
        let theta = options.rotation_degrees;
        if options.position == WatermarkPosition::Center {
            return finite(centered(page, width, height, theta));
        }

        let bounds = RotatedBounds::new(width, height, theta);
        let inset = self.corner_inset;
        if bounds.width() + 2.0 * inset > page.width || bounds.height() + 2.0 * inset > page.height
        {
            return None;
        }

        let left = page.x + inset;
        let right = page.x + page.width - inset - bounds.width();
        let bottom = page.y + inset;
        let top = page.y + page.height - inset - bounds.height();
        let (box_x, box_y) = match options.position {
            WatermarkPosition::TopLeft => (left, top),
            WatermarkPosition::TopRight => (right, top),
            WatermarkPosition::BottomLeft => (left, bottom),
            WatermarkPosition::BottomRight => (right, bottom),
            WatermarkPosition::Center => return None,
        };
        finite((box_x - bounds.min_x, box_y - bounds.min_y))
    }
}

/// Origin that puts the center of the rotated text box on the page center.
fn centered(page: &PageBox, width: f32, height: f32, rotation_degrees: f32) -> (f32, f32) {
    let (sin, cos) = rotation_degrees.to_radians().sin_cos();
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    let cx = page.x + page.width / 2.0;
    let cy = page.y + page.height / 2.0;
    (
        cx - (half_w * cos - half_h * sin),
        cy - (half_w * sin + half_h * cos),
    )
}

fn finite((x, y): (f32, f32)) -> Option<(f32, f32)> {
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// Axis-aligned bounds of a `width` x `height` box rotated about its origin.
struct RotatedBounds {
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

impl RotatedBounds {
    fn new(width: f32, height: f32, rotation_degrees: f32) -> Self {
        let (sin, cos) = rotation_degrees.to_radians().sin_cos();
        let corners = [
            (0.0, 0.0),
            (width * cos, width * sin),
            (-height * sin, height * cos),
            (width * cos - height * sin, width * sin + height * cos),
        ];
        let mut bounds = Self {
            min_x: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
        };
        for (x, y) in corners {
            bounds.min_x = bounds.min_x.min(x);
            bounds.max_x = bounds.max_x.max(x);
            bounds.min_y = bounds.min_y.min(y);
            bounds.max_y = bounds.max_y.max(y);
        }
        bounds
    }

    fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}
