//! `ListenerRegistry::fire` benchmark.
//!
//! Measures one notification across 1, 2, 4 and 16 listeners, covering the
//! single-listener path, the inline `Many` storage and a spilled track.
//! A complex change fired at simple change listeners exercises the fan-out.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use observable_listeners::prelude::*;
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

const LISTENER_COUNTS: [usize; 4] = [1, 2, 4, 16];

fn registry_of(
    count: usize,
    build: impl Fn(Rc<Cell<u64>>) -> Listener<u64>,
) -> (ListenerRegistry<u64>, Rc<Cell<u64>>) {
    let sink = Rc::new(Cell::new(0));
    let mut handle = None;
    for _ in 0..count {
        let listener = build(Rc::clone(&sink));
        handle = ListenerRegistry::add(handle.as_ref(), Some(listener)).ok();
    }
    (handle.expect("at least one listener is registered"), sink)
}

fn invalidation(sink: Rc<Cell<u64>>) -> Listener<u64> {
    Listener::invalidation(move || sink.set(sink.get().wrapping_add(1)))
}

fn change(sink: Rc<Cell<u64>>) -> Listener<u64> {
    Listener::change(move |change: &SimpleChange<u64>| {
        sink.set(sink.get().wrapping_add(*change.element()));
    })
}

fn complex_change(sink: Rc<Cell<u64>>) -> Listener<u64> {
    Listener::complex_change(move |change: &ComplexChange<u64>| {
        sink.set(sink.get().wrapping_add(change.len() as u64));
    })
}

fn benchmark_fire_invalidation(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("fire_invalidation");
    let event: SetChange<u64> = SimpleChange::added(7).into();

    for count in LISTENER_COUNTS {
        let (registry, sink) = registry_of(count, invalidation);
        group.bench_with_input(BenchmarkId::new("simple", count), &count, |bencher, _| {
            bencher.iter(|| {
                ListenerRegistry::fire_with(Some(&registry), black_box(&event), &SilentFaultReporter);
            });
        });
        black_box(sink.get());
    }

    group.finish();
}

fn benchmark_fire_change(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("fire_change");
    let simple: SetChange<u64> = SimpleChange::removed(3).into();
    let complex: SetChange<u64> = ComplexChange::new([1, 2, 3], [4]).into();

    for count in LISTENER_COUNTS {
        let (registry, sink) = registry_of(count, change);
        group.bench_with_input(BenchmarkId::new("simple", count), &count, |bencher, _| {
            bencher.iter(|| {
                ListenerRegistry::fire_with(Some(&registry), black_box(&simple), &SilentFaultReporter);
            });
        });
        group.bench_with_input(BenchmarkId::new("fan_out", count), &count, |bencher, _| {
            bencher.iter(|| {
                ListenerRegistry::fire_with(Some(&registry), black_box(&complex), &SilentFaultReporter);
            });
        });
        black_box(sink.get());
    }

    group.finish();
}

fn benchmark_fire_complex_change(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("fire_complex_change");
    let simple: SetChange<u64> = SimpleChange::added(9).into();

    for count in LISTENER_COUNTS {
        let (registry, sink) = registry_of(count, complex_change);
        group.bench_with_input(BenchmarkId::new("adapted", count), &count, |bencher, _| {
            bencher.iter(|| {
                ListenerRegistry::fire_with(Some(&registry), black_box(&simple), &SilentFaultReporter);
            });
        });
        black_box(sink.get());
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_fire_invalidation,
    benchmark_fire_change,
    benchmark_fire_complex_change
);
criterion_main!(benches);
