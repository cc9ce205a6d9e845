/*!
 * Marshalling Benchmarks
 * String array construction and environment snapshots
 */

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use system_natives::natives::to_string_array;
use system_natives::{EnvironmentTable, Heap};

fn bench_to_string_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_string_array");

    for count in [6usize, 64, 512] {
        let strings: Vec<String> = (0..count)
            .map(|i| format!("SYSTEM_NATIVES_BENCH_{}=/usr/local/bin:/usr/bin:/bin", i))
            .collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &strings, |b, strings| {
            b.iter_batched(
                Heap::new,
                |heap| to_string_array(&heap, black_box(strings)).map(|_| heap.object_count()),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_environment_capture(c: &mut Criterion) {
    c.bench_function("environment_capture", |b| {
        b.iter(|| black_box(EnvironmentTable::capture()).len())
    });
}

criterion_group!(benches, bench_to_string_array, bench_environment_capture);
criterion_main!(benches);
