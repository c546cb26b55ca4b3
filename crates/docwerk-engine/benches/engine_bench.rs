// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the docwerk-engine crate: watermark text
// sanitisation and a full merge job through the coordinator.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use docwerk_core::{EngineConfig, MergeOptions, Operation};
use docwerk_document::{PdfDocument, SaveOptions, StandardFont};
use docwerk_engine::JobCoordinator;
use docwerk_engine::handlers::transliterate::sanitize;

fn fixture(pages: usize) -> Vec<u8> {
    let mut doc = PdfDocument::new();
    for _ in 0..pages {
        doc.add_page(612.0, 792.0).expect("add page");
    }
    doc.save(&SaveOptions::default()).expect("save fixture")
}

/// Benchmark sanitising a mixed Cyrillic and accented Latin line.
fn bench_sanitize(c: &mut Criterion) {
    let text = "Черновик — Entwurf für Ångström “draft” ﬁnal 機密".repeat(8);

    c.bench_function("sanitize (mixed script)", |b| {
        b.iter(|| black_box(sanitize(black_box(&text), StandardFont::Helvetica)));
    });
}

/// Benchmark merging four 10-page documents, including the hop to the
/// background context and back.
fn bench_merge_job(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let coordinator = runtime.block_on(async { JobCoordinator::new(EngineConfig::default()) });
    let documents: Vec<Vec<u8>> = (0..4).map(|_| fixture(10)).collect();

    c.bench_function("merge job (4 x 10 pages)", |b| {
        b.iter(|| {
            let operation = Operation::Merge {
                documents: documents.clone(),
                options: MergeOptions::default(),
            };
            let output = runtime
                .block_on(coordinator.run(operation))
                .expect("merge");
            black_box(output);
        });
    });
}

criterion_group!(benches, bench_sanitize, bench_merge_job);
criterion_main!(benches);
