//! Counting and enumerating satisfying assignments

use std::collections::HashMap;

use crate::diagram::Diagram;
use crate::node::{NodeId, NodeManager};
use crate::types::Value;

use super::DiagramManager;

impl DiagramManager {
    /// Number of variable assignments for which the diagram evaluates to
    /// `value`. Saturates at `u64::MAX`; use [`Self::satisfy_count_ln`]
    /// for systems whose state count overflows.
    pub fn satisfy_count(&self, value: Value, diagram: &Diagram) -> u64 {
        self.check_same_store(diagram);
        let nodes = self.store().borrow();
        let mut memo = HashMap::new();
        let count = satisfy_count_step(&nodes, &mut memo, value, diagram.root());
        count.saturating_mul(nodes.domain_product(0, nodes.level(diagram.root())))
    }

    /// Natural logarithm of the satisfy count. Returns `-inf` when the
    /// count is zero.
    pub fn satisfy_count_ln(&self, value: Value, diagram: &Diagram) -> f64 {
        self.check_same_store(diagram);
        let nodes = self.store().borrow();
        let mut memo = HashMap::new();
        let count_ln = satisfy_count_ln_step(&nodes, &mut memo, value, diagram.root());
        count_ln + nodes.domain_product_ln(0, nodes.level(diagram.root()))
    }

    /// All assignments for which the diagram evaluates to `value`, each as
    /// one vector indexed by variable. Mind the output size; prefer
    /// [`Self::satisfy_all_g`] when the count can be large.
    pub fn satisfy_all(&self, value: Value, diagram: &Diagram) -> Vec<Vec<Value>> {
        let mut assignments = Vec::new();
        self.satisfy_all_g(value, diagram, |vars| assignments.push(vars.to_vec()));
        assignments
    }

    /// Generator-style enumeration: calls `out` once per satisfying
    /// assignment. Depth-first over the DAG with an outer enumeration of
    /// variables that the diagram skipped by reduction.
    pub fn satisfy_all_g(&self, value: Value, diagram: &Diagram, mut out: impl FnMut(&[Value])) {
        self.check_same_store(diagram);
        let nodes = self.store().borrow();
        let mut vars = vec![0 as Value; nodes.var_count()];
        satisfy_all_step(&nodes, value, diagram.root(), 0, &mut vars, &mut out);
    }
}

/// Post-order DP: a leaf counts 1 for its own value, an internal node sums
/// its sons scaled by the product of the domains of variables skipped
/// between the node and each son.
fn satisfy_count_step(
    nodes: &NodeManager,
    memo: &mut HashMap<NodeId, u64>,
    value: Value,
    id: NodeId,
) -> u64 {
    if nodes.node(id).is_terminal() {
        return u64::from(nodes.node(id).value() == value);
    }
    if let Some(&count) = memo.get(&id) {
        return count;
    }

    let level = nodes.level(id);
    let index = nodes.node(id).index();
    let mut total = 0u64;
    for k in 0..nodes.domain_usize(index) {
        let son = nodes.node(id).son(k);
        let son_count = satisfy_count_step(nodes, memo, value, son);
        let skipped = nodes.domain_product(level + 1, nodes.level(son));
        total = total.saturating_add(son_count.saturating_mul(skipped));
    }
    memo.insert(id, total);
    total
}

fn satisfy_count_ln_step(
    nodes: &NodeManager,
    memo: &mut HashMap<NodeId, f64>,
    value: Value,
    id: NodeId,
) -> f64 {
    if nodes.node(id).is_terminal() {
        return if nodes.node(id).value() == value {
            0.0
        } else {
            f64::NEG_INFINITY
        };
    }
    if let Some(&count_ln) = memo.get(&id) {
        return count_ln;
    }

    let level = nodes.level(id);
    let index = nodes.node(id).index();
    let mut terms = Vec::with_capacity(nodes.domain_usize(index));
    for k in 0..nodes.domain_usize(index) {
        let son = nodes.node(id).son(k);
        let son_ln = satisfy_count_ln_step(nodes, memo, value, son);
        terms.push(son_ln + nodes.domain_product_ln(level + 1, nodes.level(son)));
    }
    let result = log_sum_exp(&terms);
    memo.insert(id, result);
    result
}

fn log_sum_exp(terms: &[f64]) -> f64 {
    let max = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + terms.iter().map(|&term| (term - max).exp()).sum::<f64>().ln()
}

fn satisfy_all_step(
    nodes: &NodeManager,
    value: Value,
    id: NodeId,
    level: usize,
    vars: &mut [Value],
    out: &mut impl FnMut(&[Value]),
) {
    let node = nodes.node(id);
    if node.is_terminal() && node.value() != value {
        return;
    }
    if level == nodes.leaf_level() {
        out(vars);
        return;
    }

    let index = nodes.index_at_level(level);
    let domain = nodes.domain_usize(index);
    if nodes.level(id) == level {
        for k in 0..domain {
            vars[index] = k as Value;
            let son = nodes.node(id).son(k);
            satisfy_all_step(nodes, value, son, level + 1, vars, out);
        }
    } else {
        // The diagram does not depend on the variable at this level; every
        // value of it extends the assignment.
        for k in 0..domain {
            vars[index] = k as Value;
            satisfy_all_step(nodes, value, id, level + 1, vars, out);
        }
    }
}
