//! Tests for the arena internals

use super::*;

fn boolean_manager(var_count: usize) -> NodeManager {
    NodeManager::new(var_count, 200, None, None, vec![2; var_count])
}

#[test]
fn terminals_are_unique() {
    let mut m = boolean_manager(2);
    let t0 = m.make_terminal(0);
    let t0_again = m.make_terminal(0);
    let t1 = m.make_terminal(1);
    assert_eq!(t0, t0_again);
    assert_ne!(t0, t1);
    assert_eq!(m.node(t1).value(), 1);
}

#[test]
fn internal_nodes_are_hash_consed() {
    let mut m = boolean_manager(2);
    let t0 = m.make_terminal(0);
    let t1 = m.make_terminal(1);
    let a = m.make_internal(0, vec![t0, t1].into_boxed_slice());
    let b = m.make_internal(0, vec![t0, t1].into_boxed_slice());
    assert_eq!(a, b);
    assert_eq!(m.node_count_at_index(0), 1);
}

#[test]
fn redundant_tuple_reduces_to_son() {
    let mut m = boolean_manager(2);
    let t1 = m.make_terminal(1);
    let reduced = m.make_internal(0, vec![t1, t1].into_boxed_slice());
    assert_eq!(reduced, t1);
    assert_eq!(m.node_count_at_index(0), 0);
}

#[test]
fn sons_gain_references_from_parent() {
    let mut m = boolean_manager(2);
    let t0 = m.make_terminal(0);
    let t1 = m.make_terminal(1);
    let node = m.make_internal(0, vec![t0, t1].into_boxed_slice());
    assert_eq!(m.node(t0).ref_count(), 1);
    assert_eq!(m.node(t1).ref_count(), 1);
    assert_eq!(m.node(node).ref_count(), 0);
    assert!(m.node(node).is_marked());
    assert!(!m.node(t0).is_marked());
}

#[test]
fn gc_reclaims_unreferenced_nodes() {
    let mut m = boolean_manager(2);
    let t0 = m.make_terminal(0);
    let t1 = m.make_terminal(1);
    let node = m.make_internal(0, vec![t0, t1].into_boxed_slice());
    assert_eq!(m.node_count(), 3);

    // Still protected by the transient mark.
    m.force_gc();
    assert_eq!(m.node_count(), 3);

    m.node_mut(node).set_notmarked();
    m.force_gc();
    assert_eq!(m.node_count(), 0);
    assert!(!m.node(node).is_used());
}

#[test]
fn gc_keeps_referenced_nodes() {
    let mut m = boolean_manager(2);
    let t0 = m.make_terminal(0);
    let t1 = m.make_terminal(1);
    let node = m.make_internal(0, vec![t0, t1].into_boxed_slice());
    m.node_mut(node).set_notmarked();
    m.node_mut(node).inc_ref_count();

    m.force_gc();
    assert_eq!(m.node_count(), 3);
    assert!(m.node(node).is_used());
}

#[test]
fn destroyed_slots_are_recycled() {
    let mut m = boolean_manager(2);
    let t0 = m.make_terminal(0);
    let t1 = m.make_terminal(1);
    let node = m.make_internal(0, vec![t0, t1].into_boxed_slice());
    m.node_mut(node).set_notmarked();
    m.node_mut(t0).set_notmarked();
    m.node_mut(t1).set_notmarked();
    m.force_gc();

    let reused = m.make_terminal(1);
    assert!([t0, t1, node].contains(&reused));
}

#[test]
fn traversals_restore_marks() {
    let mut m = boolean_manager(2);
    let t0 = m.make_terminal(0);
    let t1 = m.make_terminal(1);
    let inner = m.make_internal(1, vec![t0, t1].into_boxed_slice());
    let root = m.make_internal(0, vec![t0, inner].into_boxed_slice());
    m.node_mut(root).set_notmarked();

    let pre = m.traverse_pre(root);
    assert_eq!(pre.len(), 4);
    assert_eq!(pre[0], root);

    let post = m.traverse_post(root);
    assert_eq!(post.len(), 4);
    assert_eq!(*post.last().unwrap(), root);

    let by_level = m.traverse_level(root);
    assert_eq!(by_level[0], root);
    assert_eq!(by_level[1], inner);

    for id in pre {
        assert!(!m.node(id).is_marked());
    }
}

#[test]
fn domain_products() {
    let m = NodeManager::new(3, 100, None, None, vec![2, 3, 4]);
    assert_eq!(m.domain_product(0, 3), 24);
    assert_eq!(m.domain_product(1, 3), 12);
    assert_eq!(m.domain_product(2, 2), 1);
}

#[test]
fn swap_keeps_node_identity() {
    let mut m = boolean_manager(2);
    let t0 = m.make_terminal(0);
    let t1 = m.make_terminal(1);
    // f = x0 AND x1 built by hand.
    let inner = m.make_internal(1, vec![t0, t1].into_boxed_slice());
    let root = m.make_internal(0, vec![t0, inner].into_boxed_slice());
    m.node_mut(root).set_notmarked();
    m.node_mut(root).inc_ref_count();

    m.swap_variable_with_next(0);

    assert_eq!(m.node(root).index(), 1);
    assert_eq!(m.index_at_level(0), 1);
    assert_eq!(m.index_at_level(1), 0);
    assert_eq!(m.level_of_index(0), 1);

    // The function is symmetric, so the swapped diagram still sends
    // (1, 1) to 1 and everything else to 0.
    let son0 = m.node(root).son(0);
    let son1 = m.node(root).son(1);
    assert_eq!(m.node(son0).value(), 0);
    let high = m.node(son1).son(1);
    assert_eq!(m.node(high).value(), 1);
}

#[test]
#[should_panic(expected = "permutation")]
fn duplicate_order_is_rejected() {
    NodeManager::new(3, 100, None, Some(vec![0, 0, 1]), vec![2, 2, 2]);
}

#[test]
#[should_panic(expected = "at least 2")]
fn unary_domain_is_rejected() {
    NodeManager::new(2, 100, None, None, vec![2, 1]);
}
