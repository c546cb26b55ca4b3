// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Notice pages: short, text-only documents generated with `printpdf` 0.8.
//
// printpdf builds documents from `PdfPage` structs holding `Vec<Op>`
// operation lists, serialised via `PdfDocument::save()`. Its document type is
// aliased to keep it apart from our editable `PdfDocument`.

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument as LayoutDocument, PdfPage, PdfSaveOptions, PdfWarnMsg,
    Point, Pt, TextItem,
};
use tracing::{debug, instrument};

use crate::font::StandardFont;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Lays out a heading and wrapped body text on as many pages as needed.
#[derive(Debug, Clone)]
pub struct NoticeWriter {
    title: String,
    page_width: f32,
    page_height: f32,
    margin: f32,
    heading_size: f32,
    body_size: f32,
}

impl NoticeWriter {
    /// A4 portrait notice with the given document title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            page_width: 595.28,
            page_height: 841.89,
            margin: 56.0,
            heading_size: 18.0,
            body_size: 11.0,
        }
    }

    /// Render `heading` followed by `body` and return the PDF bytes. Both
    /// must already be printable ASCII; anything else is rendered by the
    /// viewer's fallback glyph.
    #[instrument(skip(self, body), fields(title = %self.title, body_len = body.len()))]
    pub fn render(&self, heading: &str, body: &str) -> Vec<u8> {
        let font = StandardFont::Helvetica;
        let line_height = self.body_size * 1.3;
        let usable_width = self.page_width - 2.0 * self.margin;
        let lines = wrap_text(body, usable_width, self.body_size, font);

        let top = self.page_height - self.margin - self.heading_size;
        let body_top = top - self.heading_size * 1.5;
        let lines_per_page = (((body_top - self.margin) / line_height) as usize).max(1);

        let page_w = Mm(self.page_width / POINTS_PER_MM);
        let page_h = Mm(self.page_height / POINTS_PER_MM);

        let mut pages: Vec<PdfPage> = Vec::new();
        let mut chunks = lines.chunks(lines_per_page).peekable();
        // The heading page is emitted even when the body is empty.
        loop {
            let chunk = chunks.next().unwrap_or(&[]);
            let mut ops: Vec<Op> = Vec::new();
            if pages.is_empty() {
                push_line(&mut ops, heading, self.margin, top, self.heading_size);
            }
            for (i, line) in chunk.iter().enumerate() {
                let y = body_top - i as f32 * line_height;
                push_line(&mut ops, line, self.margin, y, self.body_size);
            }
            pages.push(PdfPage::new(page_w, page_h, ops));
            if chunks.peek().is_none() {
                break;
            }
        }

        let mut doc = LayoutDocument::new(&self.title);
        doc.with_pages(pages);
        debug!(lines = lines.len(), pages = doc.pages.len(), "Notice layout complete");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        doc.save(&PdfSaveOptions::default(), &mut warnings)
    }
}

fn push_line(ops: &mut Vec<Op>, text: &str, x: f32, y: f32, size: f32) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point { x: Pt(x), y: Pt(y) },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font: BuiltinFont::Helvetica,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font: BuiltinFont::Helvetica,
    });
    ops.push(Op::EndTextSection);
}

/// Wrap `text` so that no line is wider than `max_width` points at `size`.
///
/// Existing newlines are kept as paragraph breaks. Words wider than a whole
/// line are broken at character boundaries.
fn wrap_text(text: &str, max_width: f32, size: f32, font: StandardFont) -> Vec<String> {
    let fits = |candidate: &str| font.width_of_text_at_size(candidate, size) <= max_width;
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                result.push(std::mem::take(&mut current));
            }
            // Force-break a word that cannot fit on a line of its own.
            for c in word.chars() {
                current.push(c);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    result.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        result.push(current);
    }

    result
}
