use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use seqdedup::Trie;

fn random_sequences(n: usize, length: usize, seed: u64) -> Vec<String> {
    const BASES: [char; 4] = ['A', 'C', 'G', 'T'];
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..length).map(|_| BASES[rng.gen_range(0..4)]).collect())
        .collect()
}

fn add_sequences_benchmark(c: &mut Criterion) {
    let sequences = random_sequences(10_000, 12, 42);
    c.bench_function("add 10k 12-mers", |b| {
        b.iter(|| {
            let mut trie = Trie::new();
            for sequence in &sequences {
                trie.add_sequence(black_box(sequence)).unwrap();
            }
            trie.number_of_sequences()
        })
    });
}

fn contains_benchmark(c: &mut Criterion) {
    let sequences = random_sequences(10_000, 12, 42);
    let queries = random_sequences(1_000, 12, 43);
    let mut trie = Trie::new();
    for sequence in &sequences {
        trie.add_sequence(sequence).unwrap();
    }
    c.bench_function("contains at distance 1", |b| {
        b.iter(|| {
            queries
                .iter()
                .filter(|query| trie.contains_sequence(black_box(query.as_str()), 1).unwrap())
                .count()
        })
    });
}

criterion_group! {
    name = trie;
    config = Criterion::default().sample_size(20);
    targets = add_sequences_benchmark, contains_benchmark
}
criterion_main!(trie);
