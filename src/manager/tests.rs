//! Tests for the diagram manager facade

use super::*;
use crate::ops::BinOp;

fn two_var_bdd() -> (DiagramManager, Diagram, Diagram) {
    let m = DiagramManager::bdd(2, 1_000);
    let x0 = m.variable(0);
    let x1 = m.variable(1);
    (m, x0, x1)
}

#[test]
fn constant_evaluates_to_itself() {
    let m = DiagramManager::bdd(2, 100);
    let zero = m.constant(0);
    let one = m.constant(1);
    assert_eq!(m.evaluate(&zero, &[0, 1]), 0);
    assert_eq!(m.evaluate(&one, &[1, 0]), 1);
}

#[test]
fn variable_projects_its_input() {
    let m = DiagramManager::mdd(2, 100, 3);
    let x1 = m.variable(1);
    assert_eq!(m.evaluate(&x1, &[0, 2]), 2);
    assert_eq!(m.evaluate(&x1, &[1, 0]), 0);
}

#[test]
fn and_of_two_variables() {
    let (m, x0, x1) = two_var_bdd();
    let f = m.apply(BinOp::And, &x0, &x1);
    assert_eq!(m.evaluate(&f, &[0, 0]), 0);
    assert_eq!(m.evaluate(&f, &[0, 1]), 0);
    assert_eq!(m.evaluate(&f, &[1, 0]), 0);
    assert_eq!(m.evaluate(&f, &[1, 1]), 1);
    assert_eq!(m.satisfy_count(1, &f), 1);
    assert_eq!(m.satisfy_all(1, &f), vec![vec![1, 1]]);
}

#[test]
fn algebraic_identities() {
    let (m, x0, x1) = two_var_bdd();
    let f = m.apply(BinOp::Or, &x0, &x1);

    let xor_self = m.apply(BinOp::Xor, &f, &f);
    assert!(xor_self.equals(&m.constant(0)));

    let and_self = m.apply(BinOp::And, &f, &f);
    assert!(and_self.equals(&f));

    let or_self = m.apply(BinOp::Or, &f, &f);
    assert!(or_self.equals(&f));
}

#[test]
fn commutative_apply_shares_roots() {
    let (m, x0, x1) = two_var_bdd();
    let ab = m.apply(BinOp::And, &x0, &x1);
    let ba = m.apply(BinOp::And, &x1, &x0);
    assert!(ab.equals(&ba));
}

#[test]
fn canonicity_across_build_orders() {
    let m = DiagramManager::bdd(3, 1_000);
    let xs = m.variables(&[0, 1, 2]);

    // (x0 AND x1) OR x2 built two different ways.
    let lhs = {
        let conj = m.apply(BinOp::And, &xs[0], &xs[1]);
        m.apply(BinOp::Or, &conj, &xs[2])
    };
    let rhs = {
        let with_x2_first = m.apply(BinOp::Or, &xs[2], &m.apply(BinOp::And, &xs[1], &xs[0]));
        with_x2_first
    };
    assert!(lhs.equals(&rhs));
}

#[test]
fn evaluate_agrees_with_operator_pointwise() {
    let m = DiagramManager::mixed(2, 1_000, vec![2, 3]);
    let x0 = m.variable(0);
    let x1 = m.variable(1);
    for op in [BinOp::And, BinOp::Or, BinOp::Min, BinOp::Max, BinOp::Xor] {
        let f = m.apply(op, &x0, &x1);
        for a in 0..2 {
            for b in 0..3 {
                assert_eq!(
                    m.evaluate(&f, &[a, b]),
                    op.terminal_rule(a, b),
                    "{op:?} at ({a}, {b})"
                );
            }
        }
    }
}

#[test]
fn negate_is_complement() {
    let (m, x0, x1) = two_var_bdd();
    let f = m.apply(BinOp::And, &x0, &x1);
    let g = m.negate(&f);
    for a in 0..2 {
        for b in 0..2 {
            assert_eq!(m.evaluate(&g, &[a, b]), 1 - m.evaluate(&f, &[a, b]));
        }
    }
    assert!(m.negate(&g).equals(&f));
}

#[test]
fn variable_not_matches_negated_variable() {
    let (m, x0, _) = two_var_bdd();
    let not_x0 = m.variable_not(0);
    assert!(not_x0.equals(&m.negate(&x0)));
}

#[test]
fn folds_agree() {
    let m = DiagramManager::bdd(5, 10_000);
    let xs = m.variables(&[0, 1, 2, 3, 4]);
    let left = m.left_fold(BinOp::Or, &xs);
    let tree = m.tree_fold(BinOp::Or, &xs);
    assert!(left.equals(&tree));
    assert_eq!(m.satisfy_count(1, &left), 31);
}

#[test]
fn satisfy_count_with_skipped_variables() {
    let m = DiagramManager::bdd(3, 1_000);
    let x1 = m.variable(1);
    // f = x1 ignores x0 and x2, so every satisfying assignment of x1
    // extends in four ways.
    assert_eq!(m.satisfy_count(1, &x1), 4);
    assert_eq!(m.satisfy_all(1, &x1).len(), 4);
}

#[test]
fn satisfy_count_ln_matches_exact_count() {
    let m = DiagramManager::bdd(4, 1_000);
    let xs = m.variables(&[0, 1, 2, 3]);
    let f = m.tree_fold(BinOp::Or, &xs);
    let exact = m.satisfy_count(1, &f);
    let from_ln = m.satisfy_count_ln(1, &f).exp();
    assert!((from_ln - exact as f64).abs() < 1e-6);

    let zero = m.constant(0);
    assert_eq!(m.satisfy_count_ln(1, &zero), f64::NEG_INFINITY);
}

#[test]
fn mixed_domain_vector_round_trip() {
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

#[test]
fn bdd_vector_round_trip() {
    let m = DiagramManager::bdd(3, 1_000);
    let vector = vec![0, 1, 0, 0, 1, 1, 0, 1];
    let f = m.from_vector(&vector);
    assert_eq!(m.to_vector(&f), vector);
}

#[test]
fn gc_reclaims_dropped_diagrams() {
    let m = DiagramManager::bdd(4, 1_000);
    let xs = m.variables(&[0, 1, 2, 3]);
    let f = m.tree_fold(BinOp::And, &xs);
    drop(xs);

    m.force_gc();
    let with_f = m.node_count();
    assert!(with_f >= m.node_count_of(&f));

    drop(f);
    m.force_gc();
    assert_eq!(m.node_count(), 0);
}

#[test]
fn node_count_of_counts_the_dag() {
    let (m, x0, x1) = two_var_bdd();
    let f = m.apply(BinOp::And, &x0, &x1);
    // x0 node, x1 node and both terminals.
    assert_eq!(m.node_count_of(&f), 4);
}

#[test]
fn sifting_preserves_semantics_and_roots() {
    let m = DiagramManager::bdd(6, 10_000);
    let xs = m.variables(&[0, 1, 2, 3, 4, 5]);
    let pairs: Vec<Diagram> = (0..3)
        .map(|i| m.apply(BinOp::And, &xs[2 * i], &xs[2 * i + 1]))
        .collect();
    let f = m.left_fold(BinOp::Or, &pairs);

    let assignments: Vec<Vec<Value>> = (0..64u32)
        .map(|bits| (0..6).map(|i| (bits >> i) & 1).collect())
        .collect();
    let before: Vec<Value> = assignments
        .iter()
        .map(|vars| m.evaluate(&f, vars))
        .collect();

    m.sift_variables();

    let after: Vec<Value> = assignments
        .iter()
        .map(|vars| m.evaluate(&f, vars))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn evaluate_returns_undefined_for_incomplete_functions() {
    use crate::types::UNDEFINED;
    let m = DiagramManager::bdd(1, 100);
    let vector = vec![0, UNDEFINED];
    let f = m.from_vector(&vector);
    assert_eq!(m.evaluate(&f, &[0]), 0);
    assert_eq!(m.evaluate(&f, &[1]), UNDEFINED);
}

#[test]
fn reduction_and_ordering_hold_for_reachable_nodes() {
    let m = DiagramManager::mixed(4, 1_000, vec![2, 3, 2, 3]);
    let x0 = m.variable(0);
    let x1 = m.variable(1);
    let x3 = m.variable(3);
    let f = m.apply(BinOp::Max, &m.apply(BinOp::Min, &x0, &x1), &x3);

    let mut nodes = m.store().borrow_mut();
    for id in nodes.traverse_pre(f.root()) {
        if !nodes.node(id).is_internal() {
            continue;
        }
        let sons = nodes.node(id).sons().to_vec();
        assert!(
            sons.iter().any(|&son| son != sons[0]),
            "redundant node survived canonicalisation"
        );
        let level = nodes.level(id);
        for son in sons {
            assert!(nodes.level(son) > level, "ordering violated");
        }
    }
}

#[test]
fn gc_keeps_reachable_nodes_referenced() {
    let m = DiagramManager::bdd(3, 1_000);
    let xs = m.variables(&[0, 1, 2]);
    let f = m.tree_fold(BinOp::Or, &xs);
    drop(xs);
    m.force_gc();

    let mut nodes = m.store().borrow_mut();
    for id in nodes.traverse_pre(f.root()) {
        assert!(nodes.node(id).is_used());
        assert!(nodes.node(id).ref_count() >= 1);
    }
}

#[test]
#[should_panic(expected = "out of range")]
fn variable_index_is_checked() {
    let m = DiagramManager::bdd(2, 100);
    m.variable(2);
}

#[test]
#[should_panic(expected = "outside the domain")]
fn evaluate_checks_values() {
    let m = DiagramManager::mixed(2, 100, vec![2, 3]);
    let x0 = m.variable(0);
    m.evaluate(&x0, &[2, 0]);
}

#[test]
fn custom_order_is_respected() {
    let m = DiagramManager::bdd_with_order(3, 1_000, vec![2, 0, 1]);
    assert_eq!(m.order(), vec![2, 0, 1]);
    let x2 = m.variable(2);
    let x1 = m.variable(1);
    let f = m.apply(BinOp::And, &x2, &x1);
    assert_eq!(m.evaluate(&f, &[0, 1, 1]), 1);
    assert_eq!(m.evaluate(&f, &[0, 0, 1]), 0);
}
