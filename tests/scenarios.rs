//! End-to-end scenarios exercising the public API

use mdd_logic::{BinOp, Diagram, DiagramManager, FoldType, PlaFile};
use rand::prelude::*;
use std::io::Write;

#[test]
fn two_variable_and() {
    let m = DiagramManager::bdd(2, 100);
    let f = m.apply(BinOp::And, &m.variable(0), &m.variable(1));

    assert_eq!(m.satisfy_count(1, &f), 1);
    assert_eq!(m.satisfy_all(1, &f), vec![vec![1, 1]]);
    assert_eq!(m.evaluate(&f, &[0, 1]), 0);
    assert_eq!(m.evaluate(&f, &[1, 1]), 1);
}

/// The classical 4-queens board has exactly two solutions.
#[test]
fn four_queens_has_two_solutions() {
    let n = 4;
    let m = DiagramManager::bdd(n * n, 100_000);
    let board: Vec<Diagram> = m.variables(&(0..n * n).collect::<Vec<_>>());
    let mut result = m.constant(1);

    let constrain = |result: &Diagram, i: usize, j: usize, others: Vec<usize>| {
        let mut tmp = m.constant(1);
        for other in others {
            tmp = m.apply(BinOp::And, &tmp, &m.negate(&board[other]));
        }
        let tmp = m.apply(BinOp::Or, &tmp, &m.negate(&board[i * n + j]));
        m.apply(BinOp::And, result, &tmp)
    };

    for i in 0..n {
        for j in 0..n {
            // No second queen in the same row, column or diagonal.
            let row = (0..n).filter(|&k| k != j).map(|k| i * n + k).collect();
            result = constrain(&result, i, j, row);
            let column = (0..n).filter(|&k| k != i).map(|k| k * n + j).collect();
            result = constrain(&result, i, j, column);
            let rising = (0..n)
                .filter(|&k| j + k >= i && j + k < n + i && k != i)
                .map(|k| k * n + (j + k - i))
                .collect();
            result = constrain(&result, i, j, rising);
            let falling = (0..n)
                .filter(|&k| j + i >= k && j + i < n + k && k != i)
                .map(|k| k * n + (j + i - k))
                .collect();
            result = constrain(&result, i, j, falling);
        }
    }

    for i in 0..n {
        let mut row = m.constant(0);
        for j in 0..n {
            row = m.apply(BinOp::Or, &row, &board[i * n + j]);
        }
        result = m.apply(BinOp::And, &result, &row);
    }

    assert_eq!(m.satisfy_count(1, &result), 2);
}

#[test]
fn mixed_domain_structure_function() {
    let vector: Vec<u32> = vec![
        0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 2, 2, 2,
        2, 2, 1, 2, 2, 2, 2, 2,
    ];
    let m = DiagramManager::mixed(4, 1_000, vec![2, 3, 2, 3]);
    let f = m.from_vector(&vector);

    assert_eq!(m.evaluate(&f, &[0, 0, 0, 0]), 0);
    assert_eq!(m.evaluate(&f, &[1, 1, 0, 2]), 2);
    assert_eq!(m.to_vector(&f), vector);
    assert!(m.from_vector(&m.to_vector(&f)).equals(&f));
}

/// A 5-input XOR written out as a PLA file: 16 odd-parity product terms.
#[test]
fn five_input_xor_pla() {
    let mut pla = String::from(".i 5\n.o 1\n.p 16\n");
    for bits in 0..32u32 {
        if bits.count_ones() % 2 == 1 {
            for position in 0..5 {
                pla.push(if (bits >> position) & 1 == 1 { '1' } else { '0' });
            }
            pla.push_str(" 1\n");
        }
    }
    pla.push_str(".e\n");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(pla.as_bytes()).unwrap();
    let parsed = PlaFile::from_file(file.path()).unwrap();
    assert_eq!(parsed.line_count(), 16);

    let m = DiagramManager::bdd(5, 10_000);
    let functions = m.from_pla(&parsed, FoldType::Tree);
    assert_eq!(functions.len(), 1);
    assert_eq!(m.satisfy_count(1, &functions[0]), 16);

    // It really is XOR.
    let xs = m.variables(&[0, 1, 2, 3, 4]);
    let xor = m.tree_fold(BinOp::Xor, &xs);
    assert!(functions[0].equals(&xor));
}

/// Sifting must not change any function a live handle refers to.
#[test]
fn sifting_is_semantically_invariant() {
    let var_count = 12;
    let m = DiagramManager::bdd(var_count, 100_000);
    let xs: Vec<Diagram> = m.variables(&(0..var_count).collect::<Vec<_>>());

    // OR over ANDs of variable pairs, deliberately interleaved so the
    // default order is suboptimal.
    let mut products = Vec::new();
    for i in 0..var_count / 2 {
        products.push(m.apply(BinOp::And, &xs[i], &xs[var_count / 2 + i]));
    }
    let f = m.left_fold(BinOp::Or, &products);

    let mut rng = StdRng::seed_from_u64(2054);
    let assignments: Vec<Vec<u32>> = (0..100)
        .map(|_| (0..var_count).map(|_| rng.gen_range(0..2)).collect())
        .collect();
    let before: Vec<u32> = assignments.iter().map(|x| m.evaluate(&f, x)).collect();

    drop(products);
    drop(xs);
    m.force_gc();
    let nodes_before = m.node_count();
    m.sift_variables();
    let nodes_after = m.node_count();

    let after: Vec<u32> = assignments.iter().map(|x| m.evaluate(&f, x)).collect();
    assert_eq!(before, after);
    assert!(nodes_after <= nodes_before);
}

#[test]
fn commutative_apply_reuses_the_cache() {
    let m = DiagramManager::bdd(2, 1_000);
    let a = m.variable(0);
    let b = m.variable(1);
    let ab = m.apply(BinOp::And, &a, &b);
    let ba = m.apply(BinOp::And, &b, &a);
    assert!(ab.equals(&ba));
}
