//! Benchmarks for target grid generation and action list diffing.

use cellselector_core::{ActionManager, Cell, Completion, Fade, RenderTable, TableShape, View};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use futures::FutureExt;
use std::rc::Rc;

struct NullView;

impl View for NullView {
    fn request_repaint(&self, _grid: &[Vec<Cell>]) -> Completion {
        futures::future::ready(()).boxed_local()
    }

    fn animate(&self, _fade: Fade) -> Completion {
        futures::future::ready(()).boxed_local()
    }
}

fn table(items: usize, expanding: bool) -> RenderTable {
    let shape = TableShape::new(items, 4).expect("valid width");
    RenderTable::new(shape, true, expanding, 2, Rc::new(NullView)).expect("valid rows")
}

fn bench_target_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_target_grid");
    for items in [10, 100, 1000] {
        let table = table(items, false);
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |b, _| {
            b.iter(|| table.compute_target_grid(black_box(true)))
        });
    }
    group.finish();
}

fn bench_expand_diff(c: &mut Criterion) {
    let manager = ActionManager::new();
    let mut group = c.benchmark_group("on_expand_requested");
    for items in [10, 100, 1000] {
        let table = table(items, false);
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |b, _| {
            b.iter(|| manager.on_expand_requested(black_box(&table)))
        });
    }
    group.finish();
}

fn bench_packup_diff(c: &mut Criterion) {
    let manager = ActionManager::new();
    let mut group = c.benchmark_group("on_packup_requested");
    for items in [10, 100, 1000] {
        let mut table = table(items, true);
        table.set_expanding(false);
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |b, _| {
            b.iter(|| manager.on_packup_requested(black_box(&table)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_target_grid,
    bench_expand_diff,
    bench_packup_diff
);
criterion_main!(benches);
