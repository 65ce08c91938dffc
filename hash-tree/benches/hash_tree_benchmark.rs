#[macro_use]
extern crate criterion;

use chain_hash_tree::{
    FullTreeCalculator, HashableValue, IncrementalTreeCalculator, MemoryHashTree,
    MsgPackHashSerialiser,
};
use criterion::{BenchmarkId, Criterion};

fn entries(count: u64) -> Vec<Vec<HashableValue>> {
    (0..count)
        .map(|i| vec![HashableValue::UInt(i), format!("address-{i}").into()])
        .collect()
}

fn bench(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("full recompute");
        for size in [1_000u64, 10_000, 100_000] {
            let data = entries(size);
            group.bench_with_input(BenchmarkId::new("entries", size), &data, |b, data| {
                let calc = FullTreeCalculator::new(MsgPackHashSerialiser);
                b.iter(|| calc.compute(data).unwrap().expect("compute"));
            });
        }
    }

    {
        let mut group = c.benchmark_group("incremental single change");
        for size in [1_000u64, 10_000, 100_000] {
            let mut data = entries(size);
            let calc = IncrementalTreeCalculator::new(MsgPackHashSerialiser);
            let mut tree = MemoryHashTree::new();
            calc.update(&mut tree, &data, 0..size, None)
                .unwrap()
                .expect("initial build");
            data[(size / 2) as usize] = vec!["changed".into()];
            group.bench_with_input(BenchmarkId::new("entries", size), &size, |b, &size| {
                b.iter(|| {
                    calc.update(&mut tree, &data, [size / 2], None)
                        .unwrap()
                        .expect("update")
                });
            });
        }
    }
}

criterion_group!(benches, bench);
criterion_main!(benches);
