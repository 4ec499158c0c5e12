use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use seqdedup::Trie;

/// Builds a trie from reads sampled out of a bounded pool of
/// molecules, the workload `pop_cluster` exists for
fn deduplication_trie(reads: usize, molecules: usize) -> Trie {
    const BASES: [char; 4] = ['A', 'C', 'G', 'T'];
    let mut rng = StdRng::seed_from_u64(42);
    let pool: Vec<String> = (0..molecules)
        .map(|_| (0..12).map(|_| BASES[rng.gen_range(0..4)]).collect())
        .collect();

    let mut trie = Trie::new();
    for _ in 0..reads {
        trie.add_sequence(&pool[rng.gen_range(0..pool.len())])
            .unwrap();
    }
    trie
}

fn pop_cluster_benchmark(c: &mut Criterion) {
    let trie = deduplication_trie(50_000, 2_000);
    c.bench_function("pop all clusters at distance 1", |b| {
        b.iter_batched(
            || trie.clone(),
            |mut trie| {
                let mut clusters = 0usize;
                while trie.pop_cluster(1).is_ok() {
                    clusters += 1;
                }
                clusters
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group! {
    name = cluster;
    config = Criterion::default().sample_size(10);
    targets = pop_cluster_benchmark
}
criterion_main!(cluster);
