use std::sync::Arc;

use criterion::{black_box, BatchSize, BenchmarkId, Criterion};
use criterion::{criterion_group, criterion_main};

use saveq::{CallQueue, NullSink, Sink, Timestamp};

fn bench_enqueue_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue_process");
    let sink: Arc<dyn Sink> = Arc::new(NullSink);
    for &count in &[16_usize, 1_024, 65_536] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                CallQueue::new,
                |mut queue| {
                    for i in 0..count {
                        queue.enqueue(
                            &sink,
                            Timestamp::from_nanos(i as u64),
                            black_box("bench message"),
                            "bench",
                        );
                    }
                    queue.process().expect("process")
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_enqueue_process);
criterion_main!(benches);
