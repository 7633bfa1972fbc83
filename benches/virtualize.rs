//! Benchmarks for row layout and viewport windowing.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use gridview::layout::{RowLayout, Viewport};
use gridview::types::{CellValue, Row};

fn make_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let mut row = Row::new();
            row.insert("id".into(), CellValue::Number(i as f64));
            row.insert("name".into(), CellValue::Text(format!("row {i}")));
            row.insert("active".into(), CellValue::Bool(i % 2 == 0));
            row
        })
        .collect()
}

/// Benchmark the prefix-sum offset build over uniform heights.
fn bench_layout_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_build");
    for &n in &[1_000usize, 10_000, 100_000] {
        let rows = make_rows(n);
        let refs: Vec<&Row> = rows.iter().collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &refs, |b, refs| {
            b.iter(|| RowLayout::build(black_box(refs), 36.0, None));
        });
    }
    group.finish();
}

/// Benchmark the visible-window computation at varying scroll depths.
fn bench_visible_window(c: &mut Criterion) {
    let rows = make_rows(100_000);
    let refs: Vec<&Row> = rows.iter().collect();
    let layout = RowLayout::build(&refs, 36.0, None);
    let total = layout.total_height();

    let mut group = c.benchmark_group("visible_window");
    for &fraction in &[0.0f32, 0.5, 0.99] {
        let viewport = Viewport {
            scroll_y: total * fraction,
            height: 600.0,
            overscan: 5,
            min_render_rows: 8,
            min_buffer_rows: 10,
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(fraction),
            &viewport,
            |b, viewport| {
                b.iter(|| viewport.visible_window(black_box(&layout)));
            },
        );
    }
    group.finish();
}

/// Benchmark hit-testing a scroll position to a row index.
fn bench_row_at_y(c: &mut Criterion) {
    let rows = make_rows(100_000);
    let refs: Vec<&Row> = rows.iter().collect();
    let layout = RowLayout::build(&refs, 36.0, None);
    let total = layout.total_height();

    c.bench_function("row_at_y", |b| {
        let mut y = 0.0f32;
        b.iter(|| {
            y = (y + 9_137.0) % total;
            layout.row_at_y(black_box(y))
        });
    });
}

criterion_group!(
    benches,
    bench_layout_build,
    bench_visible_window,
    bench_row_at_y
);
criterion_main!(benches);
