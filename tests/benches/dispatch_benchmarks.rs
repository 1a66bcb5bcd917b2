//! # Dispatch Hot Path Benchmarks
//!
//! | Path | Claim |
//! |------|-------|
//! | `FilterIndex::lookup` | At most two hash probes, independent of subscriber count |
//! | `Dispatcher::on_event_written` | One conversion per record, shared across matches |
//! | `SubscriptionBuffer::drain_up_to` | Linear in the drained count only |

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use relay_bus::{DispatchTarget, Dispatcher, EventListener, FilterIndex, SubscriptionBuffer};
use relay_types::{EmittedEvent, EventLevel, EventRecord, Keywords, Registration, SourceFilter};
use std::sync::Arc;

/// `count` subscriptions over 10 sources: half wildcard, half exact.
fn filters(count: usize) -> Vec<Vec<SourceFilter>> {
    (0..count)
        .map(|i| {
            let source = format!("source-{}", i % 10);
            if i % 2 == 0 {
                vec![SourceFilter::wildcard(source, EventLevel::Verbose)]
            } else {
                vec![SourceFilter::exact(source, (i % 7) as i32, EventLevel::Verbose)]
            }
        })
        .collect()
}

fn bench_filter_index_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter-index");

    for count in [10usize, 100, 1000] {
        let subs = filters(count);
        let index = FilterIndex::build(subs.iter().enumerate());

        group.bench_with_input(BenchmarkId::new("lookup", count), &index, |b, index| {
            b.iter(|| black_box(index.lookup(black_box("source-3"), black_box(3)).len()))
        });
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatcher");

    for count in [1usize, 10, 100] {
        let targets: Vec<DispatchTarget> = filters(count)
            .into_iter()
            .enumerate()
            .map(|(i, filters)| DispatchTarget {
                id: format!("sub-{}", i),
                buffer: Arc::new(SubscriptionBuffer::new(1024)),
                filters,
            })
            .collect();
        let buffers: Vec<_> = targets.iter().map(|t| t.buffer.clone()).collect();
        let dispatcher = Dispatcher::filtered(targets);

        group.throughput(Throughput::Elements(1));
        group.bench_function(BenchmarkId::new("on_event_written", count), |b| {
            b.iter(|| {
                dispatcher.on_event_written(EmittedEvent::new("source-3", 3, "Bench"));
                for buffer in &buffers {
                    buffer.drain_up_to(usize::MAX);
                }
            })
        });
    }

    group.finish();
}

fn bench_buffer_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");
    let record = Arc::new(EventRecord::from_emitted(
        EmittedEvent::new("source", 1, "Bench"),
        Registration::new("source", EventLevel::Verbose, Keywords::ALL),
        Utc::now(),
    ));

    for batch in [10usize, 100, 1000] {
        let buffer = SubscriptionBuffer::new(batch * 2);
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("fill_and_drain", batch), &batch, |b, &batch| {
            b.iter(|| {
                for _ in 0..batch {
                    let _ = buffer.try_enqueue(record.clone());
                }
                black_box(buffer.drain_up_to(batch).entries.len())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_filter_index_lookup,
    bench_dispatch,
    bench_buffer_drain
);
criterion_main!(benches);
