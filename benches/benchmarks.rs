use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use tincan_derived::{derive, Store};

fn derived_creation_benchmark(c: &mut Criterion) {
    let a: Store<i32> = Store::new(5);
    let b: Store<i32> = Store::new(10);

    c.bench_function("derived_creation", |bench| {
        bench.iter(|| {
            let sum = derive((a.clone(), b.clone()), |deps: &(i32, i32), _, _| deps.0 + deps.1);
            black_box(sum.get_state())
        });
    });
}

fn derived_read_benchmark(c: &mut Criterion) {
    let a: Store<i32> = Store::new(5);
    let b: Store<i32> = Store::new(10);
    let sum = derive((a, b), |deps: &(i32, i32), _, _| deps.0 + deps.1);

    c.bench_function("derived_read", |bench| {
        bench.iter(|| {
            black_box(sum.get_state());
        });
    });
}

fn store_update_benchmark(c: &mut Criterion) {
    #[derive(Clone)]
    struct State {
        counter: usize,
        name: String,
    }

    let store = Store::new(State {
        counter: 0,
        name: "test".to_string(),
    });

    c.bench_function("store_update", |b| {
        let mut i = 0;
        b.iter(|| {
            store.update(|state| {
                state.counter = black_box(i);
            });
            i += 1;
        });
        black_box(store.read(|state| state.name.len()));
    });
}

fn derived_recompute_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("derived_recompute");

    for source_count in [1usize, 4, 8].iter() {
        let sources: [Store<usize>; 8] = std::array::from_fn(|_| Store::new(0));
        let total = derive(sources.clone(), |deps: &[usize; 8], _, _| deps.iter().sum::<usize>());

        group.bench_with_input(
            BenchmarkId::from_parameter(source_count),
            source_count,
            |b, &source_count| {
                let mut i = 0;
                b.iter(|| {
                    for source in sources.iter().take(source_count) {
                        source.set(black_box(i));
                    }
                    i += 1;
                });
            },
        );
        black_box(total.get_state());
    }
    group.finish();
}

fn derived_fan_out_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("derived_fan_out");

    for listener_count in [1, 10, 100].iter() {
        let source = Store::new(0usize);
        let doubled = derive((source.clone(),), |deps: &(usize,), _, _| deps.0 * 2);

        for _ in 0..*listener_count {
            let _ = doubled.subscribe(|_, _| {
                // Empty listener
            });
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(listener_count),
            listener_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    source.set(black_box(i));
                    i += 1;
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    derived_creation_benchmark,
    derived_read_benchmark,
    store_update_benchmark,
    derived_recompute_benchmark,
    derived_fan_out_benchmark,
);
criterion_main!(benches);
