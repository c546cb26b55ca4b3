// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the document model in the docwerk-document crate:
// copying pages between documents (the merge/split hot path) and stamping
// text onto every page (the watermark hot path).

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use docwerk_core::Rgb;
use docwerk_document::{PdfDocument, SaveOptions, StandardFont, TextStyle};

/// Build and serialise a document with `pages` blank A4 pages.
fn fixture(pages: usize) -> Vec<u8> {
    let mut doc = PdfDocument::new();
    for _ in 0..pages {
        doc.add_page(595.28, 841.89).expect("add page");
    }
    doc.save(&SaveOptions::default()).expect("save fixture")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark loading a 50-page document and copying every page into a new
/// one, then serialising the result.
fn bench_copy_pages(c: &mut Criterion) {
    let bytes = fixture(50);

    c.bench_function("copy_pages (50 pages)", |b| {
        b.iter(|| {
            let source = PdfDocument::load(black_box(&bytes)).expect("load");
            let mut target = PdfDocument::new();
            let indices: Vec<usize> = (0..source.page_count()).collect();
            target.copy_pages(&source, &indices).expect("copy");
            black_box(target.save(&SaveOptions::default()).expect("save"));
        });
    });
}

/// Benchmark drawing one semi-transparent rotated line of text per page.
fn bench_stamp_text(c: &mut Criterion) {
    let bytes = fixture(20);
    let style = TextStyle {
        font: StandardFont::Helvetica,
        size: 48.0,
        color: Rgb::GRAY,
        opacity: 0.3,
        rotation_degrees: 45.0,
        x: 100.0,
        y: 300.0,
    };

    c.bench_function("stamp_text (20 pages)", |b| {
        b.iter(|| {
            let mut doc = PdfDocument::load(&bytes).expect("load");
            for index in 0..doc.page_count() {
                doc.draw_text(index, black_box("CONFIDENTIAL"), &style)
                    .expect("draw");
            }
            black_box(doc.save(&SaveOptions::default()).expect("save"));
        });
    });
}

criterion_group!(benches, bench_copy_pages, bench_stamp_text);
criterion_main!(benches);
