//! Benchmarks for diagram construction, apply and sifting

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mdd_logic::{BinOp, Diagram, DiagramManager};
use rand::prelude::*;

/// Conjunction of pairwise constraints over `n*n` board variables; a
/// scaled-down n-queens constraint system.
fn build_queens(n: usize) -> (DiagramManager, Diagram) {
    let m = DiagramManager::bdd(n * n, 1_000_000);
    m.set_cache_ratio(2.0);
    let board: Vec<Diagram> = m.variables(&(0..n * n).collect::<Vec<_>>());
    let mut result = m.constant(1);
    for i in 0..n {
        for j in 0..n {
            let mut tmp = m.constant(1);
            for k in 0..n {
                if j != k {
                    tmp = m.apply(BinOp::And, &tmp, &m.negate(&board[i * n + k]));
                }
            }
            tmp = m.apply(BinOp::Or, &tmp, &m.negate(&board[i * n + j]));
            result = m.apply(BinOp::And, &result, &tmp);
        }
    }
    for i in 0..n {
        let mut tmp = m.constant(0);
        for j in 0..n {
            tmp = m.apply(BinOp::Or, &tmp, &board[i * n + j]);
        }
        result = m.apply(BinOp::And, &result, &tmp);
    }
    (m, result)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for n in [4, 5, 6] {
        group.bench_with_input(BenchmarkId::new("queens_rows", n), &n, |b, &n| {
            b.iter(|| {
                let (_, result) = build_queens(black_box(n));
                black_box(result);
            });
        });
    }
    group.finish();
}

fn bench_apply_chain(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let var_count = 14;
    let m = DiagramManager::bdd(var_count, 1_000_000);
    let vectors: Vec<Vec<u32>> = (0..8)
        .map(|_| (0..1 << var_count).map(|_| rng.gen_range(0..2)).collect())
        .collect();
    let diagrams: Vec<Diagram> = vectors.iter().map(|v| m.from_vector(v)).collect();

    c.bench_function("apply_tree_fold_or", |b| {
        b.iter(|| black_box(m.tree_fold(BinOp::Or, &diagrams)));
    });
    c.bench_function("apply_left_fold_xor", |b| {
        b.iter(|| black_box(m.left_fold(BinOp::Xor, &diagrams)));
    });
}

fn bench_satisfy_count(c: &mut Criterion) {
    let (m, result) = build_queens(6);
    c.bench_function("satisfy_count_queens_6", |b| {
        b.iter(|| black_box(m.satisfy_count(1, &result)));
    });
}

fn bench_sifting(c: &mut Criterion) {
    c.bench_function("sift_interleaved_or_of_ands", |b| {
        b.iter_with_setup(
            || {
                let var_count = 16;
                let m = DiagramManager::bdd(var_count, 1_000_000);
                let xs: Vec<Diagram> =
                    m.variables(&(0..var_count).collect::<Vec<_>>());
                let mut products = Vec::new();
                for i in 0..var_count / 2 {
                    products.push(m.apply(BinOp::And, &xs[i], &xs[var_count / 2 + i]));
                }
                let f = m.left_fold(BinOp::Or, &products);
                (m, f)
            },
            |(m, f)| {
                m.sift_variables();
                black_box((m, f));
            },
        );
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_apply_chain,
    bench_satisfy_count,
    bench_sifting
);
criterion_main!(benches);
