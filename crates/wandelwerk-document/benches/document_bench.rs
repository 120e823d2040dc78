// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the wandelwerk-document crate: line layout of a
// long edited text, and full reconstruction of that text as a PDF.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use wandelwerk_core::{Alignment, EditableText, FontFamily, PageSize};
use wandelwerk_document::PdfWriter;

/// Roughly ten A4 pages of prose in 40 paragraphs.
fn sample_text() -> EditableText {
    let paragraph = "Wandelwerk lays out edited text with the metrics of the standard \
        PDF faces, wrapping on whitespace and never splitting a word. "
        .repeat(6);
    EditableText {
        content: vec![paragraph; 40].join("\n\n"),
        font_family: FontFamily::TimesRoman,
        alignment: Alignment::Left,
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_layout(c: &mut Criterion) {
    let text = sample_text();
    let writer = PdfWriter::new(PageSize::A4);

    c.bench_function("layout (40 paragraphs, A4)", |b| {
        b.iter(|| black_box(writer.layout_text(black_box(&text), None)));
    });
}

/// Layout plus printpdf serialisation.
fn bench_reconstruct(c: &mut Criterion) {
    let text = sample_text();
    let writer = PdfWriter::new(PageSize::A4);

    c.bench_function("reconstruct (40 paragraphs, A4)", |b| {
        b.iter(|| {
            let bytes = writer.reconstruct(black_box(&text), None);
            black_box(bytes.map(|pdf| pdf.len()).unwrap_or_default());
        });
    });
}

criterion_group!(benches, bench_layout, bench_reconstruct);
criterion_main!(benches);
