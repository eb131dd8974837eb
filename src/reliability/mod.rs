//! Reliability analysis on top of structure functions
//!
//! A diagram can encode the structure function of a system whose components
//! (variables) degrade through a number of states. This module layers the
//! classical reliability quantities over the core: state probabilities,
//! availability, state frequency, direct partial logic derivatives and the
//! importance measures and minimal cut/path vectors derived from them.
//!
//! Component state probabilities come in as a matrix where `probs[i][k]` is
//! the probability that component `i` is in state `k`; any `&[P]` with
//! `P: AsRef<[f64]>` works, so vectors of arrays and vectors of vectors are
//! both fine. Boolean systems may instead pass a plain vector of
//! p(component works) to the convenience entry points.


use std::collections::HashMap;

use crate::diagram::Diagram;
use crate::manager::DiagramManager;
use crate::node::{NodeId, NodeManager};
use crate::ops::BinOp;
use crate::types::{Value, UNDEFINED};

/// Describes a change in the value of one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarChange {
    /// Index of the changing variable.
    pub index: usize,
    /// Value before the change.
    pub from: Value,
    /// Value after the change.
    pub to: Value,
}

/// Predicates over (old, new) function values for the standard types of
/// direct partial logic derivatives.
pub mod dpld {
    use crate::types::Value;

    /// f falls from exactly `state` to anything below it.
    pub fn type_1_decrease(state: Value) -> impl Fn(Value, Value) -> bool {
        move |old, new| old == state && new < state
    }

    /// f rises from exactly `state` to anything above it.
    pub fn type_1_increase(state: Value) -> impl Fn(Value, Value) -> bool {
        move |old, new| old == state && new > state
    }

    /// f decreases.
    pub fn type_2_decrease() -> impl Fn(Value, Value) -> bool {
        |old, new| new < old
    }

    /// f increases.
    pub fn type_2_increase() -> impl Fn(Value, Value) -> bool {
        |old, new| new > old
    }

    /// f drops below `state` from at least `state`.
    pub fn type_3_decrease(state: Value) -> impl Fn(Value, Value) -> bool {
        move |old, new| old >= state && new < state
    }

    /// f reaches at least `state` from below it.
    pub fn type_3_increase(state: Value) -> impl Fn(Value, Value) -> bool {
        move |old, new| old < state && new >= state
    }
}

impl DiagramManager {
    /// Probability of every system state: entry `j` is the probability that
    /// the function evaluates to `j` under the given component state
    /// probabilities. One top-down pass over the DAG.
    pub fn calculate_probabilities<P: AsRef<[f64]>>(
        &self,
        probs: &[P],
        diagram: &Diagram,
    ) -> Vec<f64> {
        self.check_same_store(diagram);
        let nodes = self.store().borrow();
        let memo = terminal_probabilities(&nodes, probs, diagram.root());
        let mut result = Vec::new();
        for id in nodes.terminal_ids() {
            let value = nodes.node(id).value() as usize;
            if value >= result.len() {
                result.resize(value + 1, 0.0);
            }
            result[value] = memo.get(&id).copied().unwrap_or(0.0);
        }
        result
    }

    /// Probability that the function evaluates to exactly `state`.
    pub fn calculate_probability<P: AsRef<[f64]>>(
        &self,
        state: Value,
        probs: &[P],
        diagram: &Diagram,
    ) -> f64 {
        self.check_same_store(diagram);
        let nodes = self.store().borrow();
        let mut memo = HashMap::new();
        terminal_set_probability(&nodes, &mut memo, &[state], probs, diagram.root())
    }

    /// Probability that the system is in state `state` or better.
    pub fn calculate_availability<P: AsRef<[f64]>>(
        &self,
        state: Value,
        probs: &[P],
        diagram: &Diagram,
    ) -> f64 {
        self.check_same_store(diagram);
        let nodes = self.store().borrow();
        let values: Vec<Value> = nodes
            .terminal_ids()
            .into_iter()
            .map(|id| nodes.node(id).value())
            .filter(|&value| value >= state)
            .collect();
        let mut memo = HashMap::new();
        terminal_set_probability(&nodes, &mut memo, &values, probs, diagram.root())
    }

    /// Probability that the system is in a state below `state`.
    pub fn calculate_unavailability<P: AsRef<[f64]>>(
        &self,
        state: Value,
        probs: &[P],
        diagram: &Diagram,
    ) -> f64 {
        self.check_same_store(diagram);
        let nodes = self.store().borrow();
        let values: Vec<Value> = nodes
            .terminal_ids()
            .into_iter()
            .map(|id| nodes.node(id).value())
            .filter(|&value| value < state)
            .collect();
        let mut memo = HashMap::new();
        terminal_set_probability(&nodes, &mut memo, &values, probs, diagram.root())
    }

    /// Availability of a boolean system; `probs[i]` is the probability
    /// that component `i` works.
    pub fn availability(&self, probs: &[f64], diagram: &Diagram) -> f64 {
        self.calculate_availability(1, &boolean_matrix(probs), diagram)
    }

    /// Unavailability of a boolean system.
    pub fn unavailability(&self, probs: &[f64], diagram: &Diagram) -> f64 {
        self.calculate_unavailability(1, &boolean_matrix(probs), diagram)
    }

    /// Share of the state space on which the function takes `state`:
    /// `|{x : f(x) = state}| / |D|`.
    pub fn state_frequency(&self, diagram: &Diagram, state: Value) -> f64 {
        self.check_same_store(diagram);
        let nodes = self.store().borrow();
        let mut memo = HashMap::new();
        frequency_step(&nodes, &mut memo, diagram.root(), state)
    }

    /// Direct partial logic derivative: the boolean function that is 1
    /// exactly where changing the variable as described by `change` makes
    /// the function value change as accepted by `fchange`.
    pub fn dpld(
        &self,
        change: VarChange,
        fchange: impl Fn(Value, Value) -> bool,
        diagram: &Diagram,
    ) -> Diagram {
        self.check_same_store(diagram);
        let root = {
            let mut nodes = self.store().borrow_mut();
            assert!(change.index < nodes.var_count(), "variable index out of range");
            assert!(
                nodes.is_valid_var_value(change.index, change.from)
                    && nodes.is_valid_var_value(change.index, change.to),
                "variable change outside the domain"
            );

            let old_root = diagram.root();
            let (lhs, rhs) = if nodes.node(old_root).is_internal()
                && nodes.node(old_root).index() == change.index
            {
                (
                    nodes.node(old_root).son(change.from as usize),
                    nodes.node(old_root).son(change.to as usize),
                )
            } else {
                (old_root, old_root)
            };

            let mut cache = HashMap::new();
            let root = dpld_step(&mut nodes, &mut cache, change, &fchange, lhs, rhs);
            nodes.run_deferred();
            root
        };
        self.wrap(root)
    }

    /// Extends a derivative to the full variable set: the changed variable
    /// re-enters the diagram with UNDEFINED on every branch other than
    /// `var_from`.
    pub fn to_dpld_e(&self, var_from: Value, var_index: usize, dpld: &Diagram) -> Diagram {
        self.check_same_store(dpld);
        let new_root = {
            let mut nodes = self.store().borrow_mut();
            let root = dpld.root();
            let root_level = nodes.level(root);
            let var_level = nodes.level_of_index(var_index);

            let new_root = if var_level < root_level {
                let sons = nodes.make_sons(var_index, |nodes, k| {
                    if k as Value == var_from {
                        root
                    } else {
                        nodes.make_terminal(UNDEFINED)
                    }
                });
                nodes.make_internal(var_index, sons)
            } else {
                let mut memo = HashMap::new();
                to_dpld_e_step(&mut nodes, &mut memo, var_from, var_index, root)
            };
            nodes.run_deferred();
            new_root
        };
        self.wrap(new_root)
    }

    /// Structural importance: the share of state vectors on which the
    /// derivative is 1.
    pub fn structural_importance(&self, dpld: &Diagram) -> f64 {
        self.state_frequency(dpld, 1)
    }

    /// Birnbaum importance: the probability that the derivative is 1.
    pub fn birnbaum_importance<P: AsRef<[f64]>>(&self, probs: &[P], dpld: &Diagram) -> f64 {
        self.calculate_probability(1, probs, dpld)
    }

    /// Fussell-Vesely importance of a component with respect to a
    /// derivative and the overall system unavailability.
    pub fn fussell_vesely_importance<P: AsRef<[f64]>>(
        &self,
        probs: &[P],
        dpld: &Diagram,
        unavailability: f64,
        component_state: Value,
        component_index: usize,
    ) -> f64 {
        let mnf = self.to_mnf(dpld);
        let mnf_probability = self.calculate_probability(1, probs, &mnf);
        let mut numerator = 0.0;
        for lower_state in 0..component_state {
            numerator += probs[component_index].as_ref()[lower_state as usize];
        }
        numerator * mnf_probability / unavailability
    }

    /// Minimal cut vectors with respect to system state `state`.
    pub fn mcvs(&self, diagram: &Diagram, state: Value) -> Vec<Vec<Value>> {
        let mut cuts = Vec::new();
        self.mcvs_g(diagram, state, |vars| cuts.push(vars.to_vec()));
        cuts
    }

    /// Minimal path vectors with respect to system state `state`.
    pub fn mpvs(&self, diagram: &Diagram, state: Value) -> Vec<Vec<Value>> {
        let mut paths = Vec::new();
        self.mpvs_g(diagram, state, |vars| paths.push(vars.to_vec()));
        paths
    }

    /// Generator-style enumeration of minimal cut vectors. For larger
    /// systems the number of vectors can be huge.
    pub fn mcvs_g(&self, diagram: &Diagram, state: Value, out: impl FnMut(&[Value])) {
        let domains = self.domains();
        let mut extended = Vec::new();
        for (var_index, &domain) in domains.iter().enumerate() {
            for var_from in 0..domain - 1 {
                let change = VarChange {
                    index: var_index,
                    from: var_from,
                    to: var_from + 1,
                };
                let derivative = self.dpld(change, dpld::type_3_increase(state), diagram);
                extended.push(self.to_dpld_e(var_from, var_index, &derivative));
            }
        }
        let conjunction = self.tree_fold(BinOp::PiConj, &extended);
        self.satisfy_all_g(1, &conjunction, out);
    }

    /// Generator-style enumeration of minimal path vectors.
    pub fn mpvs_g(&self, diagram: &Diagram, state: Value, out: impl FnMut(&[Value])) {
        let domains = self.domains();
        let mut extended = Vec::new();
        for (var_index, &domain) in domains.iter().enumerate() {
            for var_from in 1..domain {
                let change = VarChange {
                    index: var_index,
                    from: var_from,
                    to: var_from - 1,
                };
                let derivative = self.dpld(change, dpld::type_3_decrease(state), diagram);
                extended.push(self.to_dpld_e(var_from, var_index, &derivative));
            }
        }
        let conjunction = self.tree_fold(BinOp::PiConj, &extended);
        self.satisfy_all_g(1, &conjunction, out);
    }

    /// Rewrites a derivative so that 1-branches absorb everything below
    /// them; satisfying vectors of the result are exactly the minimal ones.
    fn to_mnf(&self, diagram: &Diagram) -> Diagram {
        let root = {
            let mut nodes = self.store().borrow_mut();
            let mut memo = HashMap::new();
            let root = to_mnf_step(&mut nodes, &mut memo, diagram.root());
            nodes.run_deferred();
            root
        };
        self.wrap(root)
    }
}

fn boolean_matrix(probs: &[f64]) -> Vec<[f64; 2]> {
    probs.iter().map(|&p| [1.0 - p, p]).collect()
}

/// Top-down pass: the root carries probability 1 and every node splits its
/// mass among its sons weighted by the component state probabilities. On
/// return the memo holds, for each terminal, the probability of reaching it.
fn terminal_probabilities<P: AsRef<[f64]>>(
    nodes: &NodeManager,
    probs: &[P],
    root: NodeId,
) -> HashMap<NodeId, f64> {
    let mut memo: HashMap<NodeId, f64> = HashMap::new();
    let bucket_count = nodes.var_count() + 1;
    let mut buckets: Vec<Vec<NodeId>> = vec![Vec::new(); bucket_count];
    buckets[nodes.level(root)].push(root);
    memo.insert(root, 1.0);

    for level in 0..bucket_count {
        for id in std::mem::take(&mut buckets[level]) {
            if nodes.node(id).is_terminal() {
                continue;
            }
            let node_prob = memo[&id];
            let index = nodes.node(id).index();
            for k in 0..nodes.domain_usize(index) {
                let son = nodes.node(id).son(k);
                let son_prob = memo.entry(son).or_insert_with(|| {
                    buckets[nodes.level(son)].push(son);
                    0.0
                });
                *son_prob += node_prob * probs[index].as_ref()[k];
            }
        }
    }
    memo
}

/// Bottom-up pass: probability that evaluation ends in a terminal whose
/// value belongs to `values`.
fn terminal_set_probability<P: AsRef<[f64]>>(
    nodes: &NodeManager,
    memo: &mut HashMap<NodeId, f64>,
    values: &[Value],
    probs: &[P],
    id: NodeId,
) -> f64 {
    if nodes.node(id).is_terminal() {
        let value = nodes.node(id).value();
        return if values.contains(&value) { 1.0 } else { 0.0 };
    }
    if let Some(&probability) = memo.get(&id) {
        return probability;
    }

    let index = nodes.node(id).index();
    let mut result = 0.0;
    for k in 0..nodes.domain_usize(index) {
        let son = nodes.node(id).son(k);
        let son_prob = terminal_set_probability(nodes, memo, values, probs, son);
        result += son_prob * probs[index].as_ref()[k];
    }
    memo.insert(id, result);
    result
}

fn frequency_step(
    nodes: &NodeManager,
    memo: &mut HashMap<NodeId, f64>,
    id: NodeId,
    state: Value,
) -> f64 {
    if nodes.node(id).is_terminal() {
        return if nodes.node(id).value() == state { 1.0 } else { 0.0 };
    }
    if let Some(&frequency) = memo.get(&id) {
        return frequency;
    }

    let index = nodes.node(id).index();
    let domain = nodes.domain_usize(index);
    let mut frequency = 0.0;
    for k in 0..domain {
        let son = nodes.node(id).son(k);
        frequency += frequency_step(nodes, memo, son, state) / domain as f64;
    }
    memo.insert(id, frequency);
    frequency
}

/// Son of `node` along branch `k`, with the changed variable already fixed
/// to `var_value` when it appears directly below.
fn cofactor_son(
    nodes: &NodeManager,
    node: NodeId,
    k: usize,
    var_index: usize,
    var_value: Value,
) -> NodeId {
    let son = nodes.node(node).son(k);
    if nodes.node(son).is_internal() && nodes.node(son).index() == var_index {
        nodes.node(son).son(var_value as usize)
    } else {
        son
    }
}

fn dpld_step(
    nodes: &mut NodeManager,
    cache: &mut HashMap<(NodeId, NodeId), NodeId>,
    change: VarChange,
    fchange: &impl Fn(Value, Value) -> bool,
    lhs: NodeId,
    rhs: NodeId,
) -> NodeId {
    if let Some(&hit) = cache.get(&(lhs, rhs)) {
        return hit;
    }

    let result = if nodes.node(lhs).is_terminal() && nodes.node(rhs).is_terminal() {
        let changed = fchange(nodes.node(lhs).value(), nodes.node(rhs).value());
        nodes.make_terminal(Value::from(changed))
    } else {
        let top_level = nodes.level(lhs).min(nodes.level(rhs));
        let top_index = nodes.index_at_level(top_level);
        let domain = nodes.domain_usize(top_index);
        let mut sons = Vec::with_capacity(domain);
        for k in 0..domain {
            let first = if nodes.level(lhs) == top_level {
                cofactor_son(nodes, lhs, k, change.index, change.from)
            } else {
                lhs
            };
            let second = if nodes.level(rhs) == top_level {
                cofactor_son(nodes, rhs, k, change.index, change.to)
            } else {
                rhs
            };
            sons.push(dpld_step(nodes, cache, change, fchange, first, second));
        }
        nodes.make_internal(top_index, sons.into_boxed_slice())
    };

    cache.insert((lhs, rhs), result);
    result
}

fn to_dpld_e_step(
    nodes: &mut NodeManager,
    memo: &mut HashMap<NodeId, NodeId>,
    var_from: Value,
    var_index: usize,
    id: NodeId,
) -> NodeId {
    if nodes.node(id).is_terminal() {
        return id;
    }
    if let Some(&mapped) = memo.get(&id) {
        return mapped;
    }

    let var_level = nodes.level_of_index(var_index);
    let node_level = nodes.level(id);
    let node_index = nodes.node(id).index();
    let node_domain = nodes.domain_usize(node_index);

    let mut sons = Vec::with_capacity(node_domain);
    for k in 0..node_domain {
        let son = nodes.node(id).son(k);
        let son_level = nodes.level(son);
        if var_level > node_level && var_level < son_level {
            // The changed variable goes between this node and its son; no
            // deeper rewriting is needed on this branch.
            let guard_sons = nodes.make_sons(var_index, |nodes, l| {
                if l as Value == var_from {
                    son
                } else {
                    nodes.make_terminal(UNDEFINED)
                }
            });
            sons.push(nodes.make_internal(var_index, guard_sons));
        } else {
            sons.push(to_dpld_e_step(nodes, memo, var_from, var_index, son));
        }
    }

    let new_node = nodes.make_internal(node_index, sons.into_boxed_slice());
    memo.insert(id, new_node);
    new_node
}

fn to_mnf_step(
    nodes: &mut NodeManager,
    memo: &mut HashMap<NodeId, NodeId>,
    id: NodeId,
) -> NodeId {
    if nodes.node(id).is_terminal() {
        return id;
    }
    if let Some(&mapped) = memo.get(&id) {
        return mapped;
    }

    let index = nodes.node(id).index();
    let domain = nodes.domain_usize(index);
    let mut sons: Vec<NodeId> = (0..domain)
        .map(|k| {
            let son = nodes.node(id).son(k);
            to_mnf_step(nodes, memo, son)
        })
        .collect();

    // A 1 on some branch absorbs every lower branch.
    for k in (1..domain).rev() {
        let son = sons[k];
        if nodes.node(son).is_terminal() && nodes.node(son).value() == 1 {
            for lower in sons.iter_mut().take(k) {
                *lower = son;
            }
            break;
        }
    }

    // A 0 branch inherits the branch above it.
    for k in (0..domain - 1).rev() {
        let son = sons[k];
        if nodes.node(son).is_terminal() && nodes.node(son).value() == 0 {
            sons[k] = sons[k + 1];
        }
    }

    let new_node = nodes.make_internal(index, sons.into_boxed_slice());
    memo.insert(id, new_node);
    new_node
}
