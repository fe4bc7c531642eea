//! Benchmarks for range planning and page reordering.
//!
//! Run with: cargo bench --package ppt-preview-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ppt_preview_core::plan_ranges;
use ppt_preview_core::rasterizer::order_by_page;
use std::path::PathBuf;
use std::time::Duration;

fn benchmark_plan_ranges(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_ranges");
    group.measurement_time(Duration::from_secs(5));

    for total_pages in [10usize, 200, 5_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(total_pages),
            &total_pages,
            |b, &total_pages| b.iter(|| plan_ranges(black_box(total_pages), black_box(4))),
        );
    }

    group.finish();
}

fn benchmark_order_by_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_by_page");
    group.measurement_time(Duration::from_secs(5));

    for total_pages in [10usize, 200, 5_000] {
        // Reverse completion order, as if the last range finished first.
        let paths: Vec<PathBuf> = plan_ranges(total_pages, 4)
            .unwrap()
            .into_iter()
            .rev()
            .flat_map(|range| {
                (range.start..=range.end)
                    .map(move |page| PathBuf::from(format!("{}_-{:04}.png", range.prefix(), page)))
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(total_pages),
            &paths,
            |b, paths| b.iter(|| order_by_page(black_box(paths.clone()), total_pages)),
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_plan_ranges, benchmark_order_by_page);
criterion_main!(benches);
