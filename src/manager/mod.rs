//! Diagram manager: the public facade of the engine
//!
//! A manager is fixed at construction with a variable count and a domain
//! per variable. It hands out cheap [`Diagram`] handles and implements the
//! operations on them: building projection and constant diagrams, combining
//! diagrams with `apply`, evaluating, folding, counting and enumerating
//! satisfying assignments, truth-vector conversion, DOT output, garbage
//! collection and dynamic variable reordering.
//!
//! The three constructors select the flavour of the value domain:
//!
//! - [`DiagramManager::bdd`]: every domain is `{0, 1}`,
//! - [`DiagramManager::mdd`]: homogeneous domains `{0, ..., m-1}`,
//! - [`DiagramManager::mixed`]: an explicit domain per variable.
//!
//! # Examples
//!
//! ```
//! use mdd_logic::{BinOp, DiagramManager};
//!
//! let m = DiagramManager::bdd(2, 1_000);
//! let x0 = m.variable(0);
//! let x1 = m.variable(1);
//! let f = m.apply(BinOp::And, &x0, &x1);
//!
//! assert_eq!(m.satisfy_count(1, &f), 1);
//! assert_eq!(m.evaluate(&f, &[1, 1]), 1);
//! assert_eq!(m.evaluate(&f, &[0, 1]), 0);
//! ```

mod dot;
mod satisfy;
mod vector;

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::rc::Rc;

use crate::diagram::Diagram;
use crate::node::{NodeId, NodeManager};
use crate::ops::BinOp;
use crate::types::{Value, NONDETERMINED};

/// Construction-time settings. The convenience constructors fill in the
/// defaults; use [`DiagramManager::with_settings`] for full control.
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    /// Number of variables.
    pub var_count: usize,
    /// Capacity of the main node pool.
    pub pool_size: usize,
    /// Capacity of each overflow slab; defaults to half the main pool.
    pub overflow_pool_size: Option<usize>,
    /// Level-to-index permutation; defaults to the identity.
    pub order: Option<Vec<usize>>,
    /// Domain per variable index; every entry must be at least 2.
    pub domains: Vec<Value>,
}

/// The public facade. See the module documentation for an overview.
pub struct DiagramManager {
    nodes: Rc<RefCell<NodeManager>>,
}

impl DiagramManager {
    /// Manager for binary decision diagrams: every domain is `{0, 1}`.
    pub fn bdd(var_count: usize, pool_size: usize) -> Self {
        Self::with_settings(ManagerSettings {
            var_count,
            pool_size,
            overflow_pool_size: None,
            order: None,
            domains: vec![2; var_count],
        })
    }

    /// BDD manager with an explicit initial variable order.
    pub fn bdd_with_order(var_count: usize, pool_size: usize, order: Vec<usize>) -> Self {
        Self::with_settings(ManagerSettings {
            var_count,
            pool_size,
            overflow_pool_size: None,
            order: Some(order),
            domains: vec![2; var_count],
        })
    }

    /// Manager for homogeneous multi-valued diagrams: every domain is
    /// `{0, ..., domain-1}`.
    pub fn mdd(var_count: usize, pool_size: usize, domain: Value) -> Self {
        Self::with_settings(ManagerSettings {
            var_count,
            pool_size,
            overflow_pool_size: None,
            order: None,
            domains: vec![domain; var_count],
        })
    }

    /// Manager with an explicit domain per variable.
    pub fn mixed(var_count: usize, pool_size: usize, domains: Vec<Value>) -> Self {
        Self::with_settings(ManagerSettings {
            var_count,
            pool_size,
            overflow_pool_size: None,
            order: None,
            domains,
        })
    }

    /// Mixed-domain manager with an explicit initial variable order.
    pub fn mixed_with_order(
        var_count: usize,
        pool_size: usize,
        domains: Vec<Value>,
        order: Vec<usize>,
    ) -> Self {
        Self::with_settings(ManagerSettings {
            var_count,
            pool_size,
            overflow_pool_size: None,
            order: Some(order),
            domains,
        })
    }

    pub fn with_settings(settings: ManagerSettings) -> Self {
        DiagramManager {
            nodes: Rc::new(RefCell::new(NodeManager::new(
                settings.var_count,
                settings.pool_size,
                settings.overflow_pool_size,
                settings.order,
                settings.domains,
            ))),
        }
    }

    // --- introspection & policy ---

    pub fn var_count(&self) -> usize {
        self.nodes.borrow().var_count()
    }

    /// Current level-to-index permutation.
    pub fn order(&self) -> Vec<usize> {
        self.nodes.borrow().order().to_vec()
    }

    pub fn domains(&self) -> Vec<Value> {
        self.nodes.borrow().domains().to_vec()
    }

    /// Total number of unique live nodes in the manager.
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().node_count()
    }

    /// Number of nodes in the DAG rooted at `diagram`, terminals included.
    pub fn node_count_of(&self, diagram: &Diagram) -> usize {
        self.check_same_store(diagram);
        self.nodes.borrow_mut().node_count_of(diagram.root())
    }

    /// Target ratio between operation-cache capacity and node count.
    pub fn set_cache_ratio(&self, ratio: f64) {
        self.nodes.borrow_mut().set_cache_ratio(ratio);
    }

    /// If a collection frees less than this fraction of the main pool, the
    /// pool grows proactively instead.
    pub fn set_gc_ratio(&self, ratio: f64) {
        self.nodes.borrow_mut().set_gc_ratio(ratio);
    }

    /// Enables deferred automatic reordering: when the pool has to grow in
    /// the middle of an operation, a GC + sifting pass runs once the
    /// operation completes.
    pub fn set_auto_reorder(&self, reorder: bool) {
        self.nodes.borrow_mut().set_auto_reorder(reorder);
    }

    /// Mark-sweep garbage collection followed by an operation-cache scrub.
    pub fn force_gc(&self) {
        self.nodes.borrow_mut().force_gc();
    }

    /// Runs Rudell's sifting over all variables. Handles stay valid: a swap
    /// rewrites nodes in place, so root ids do not change.
    pub fn sift_variables(&self) {
        let mut nodes = self.nodes.borrow_mut();
        nodes.collect_garbage();
        nodes.sift_variables();
    }

    // --- building blocks ---

    /// Diagram of the constant function `v`.
    pub fn constant(&self, value: Value) -> Diagram {
        assert_ne!(value, NONDETERMINED, "constant value must not be a sentinel");
        let root = self.nodes.borrow_mut().make_terminal(value);
        Diagram::new(Rc::clone(&self.nodes), root)
    }

    /// Projection diagram for variable `index`: the node whose k-th son is
    /// the terminal `k`.
    pub fn variable(&self, index: usize) -> Diagram {
        let root = {
            let mut nodes = self.nodes.borrow_mut();
            assert!(index < nodes.var_count(), "variable index out of range");
            let sons = nodes.make_sons(index, |nodes, k| nodes.make_terminal(k as Value));
            nodes.make_internal(index, sons)
        };
        Diagram::new(Rc::clone(&self.nodes), root)
    }

    /// Complemented projection for a boolean variable.
    pub fn variable_not(&self, index: usize) -> Diagram {
        let root = {
            let mut nodes = self.nodes.borrow_mut();
            assert!(index < nodes.var_count(), "variable index out of range");
            assert_eq!(
                nodes.domain(index),
                2,
                "complemented variables exist only for boolean domains"
            );
            let sons = nodes.make_sons(index, |nodes, k| {
                nodes.make_terminal(if k == 0 { 1 } else { 0 })
            });
            nodes.make_internal(index, sons)
        };
        Diagram::new(Rc::clone(&self.nodes), root)
    }

    /// Projection diagrams for several variables at once.
    pub fn variables(&self, indices: &[usize]) -> Vec<Diagram> {
        indices.iter().map(|&index| self.variable(index)).collect()
    }

    /// Boolean complement, `apply(Xor, d, 1)`.
    pub fn negate(&self, diagram: &Diagram) -> Diagram {
        assert!(
            self.nodes.borrow().is_boolean(),
            "negate is defined for boolean managers only"
        );
        let one = self.constant(1);
        self.apply(BinOp::Xor, diagram, &one)
    }

    // --- apply ---

    /// Combines two diagrams with a binary operator. Near-linear in
    /// practice thanks to the operation cache.
    pub fn apply(&self, op: BinOp, lhs: &Diagram, rhs: &Diagram) -> Diagram {
        self.check_same_store(lhs);
        self.check_same_store(rhs);
        let root = {
            let mut nodes = self.nodes.borrow_mut();
            let root = apply_step(&mut nodes, op, lhs.root(), rhs.root());
            nodes.run_deferred();
            root
        };
        Diagram::new(Rc::clone(&self.nodes), root)
    }

    /// Left-to-right reduction of a non-empty sequence.
    pub fn left_fold(&self, op: BinOp, diagrams: &[Diagram]) -> Diagram {
        assert!(!diagrams.is_empty(), "cannot fold an empty sequence");
        let mut accumulator = diagrams[0].clone();
        for diagram in &diagrams[1..] {
            accumulator = self.apply(op, &accumulator, diagram);
        }
        accumulator
    }

    /// Pairwise reduction in O(log n) passes; keeps the operation-cache
    /// working set small for long sequences.
    pub fn tree_fold(&self, op: BinOp, diagrams: &[Diagram]) -> Diagram {
        assert!(!diagrams.is_empty(), "cannot fold an empty sequence");
        let mut current: Vec<Diagram> = diagrams.to_vec();
        while current.len() > 1 {
            let mut next = Vec::with_capacity(current.len() / 2 + 1);
            for pair in current.chunks(2) {
                next.push(if pair.len() == 2 {
                    self.apply(op, &pair[0], &pair[1])
                } else {
                    pair[0].clone()
                });
            }
            current = next;
        }
        current.pop().unwrap()
    }

    // --- evaluation ---

    /// Walks from the root picking the son given by `vars[index]` at every
    /// internal node. Reaching UNDEFINED returns it to the caller.
    pub fn evaluate(&self, diagram: &Diagram, vars: &[Value]) -> Value {
        self.check_same_store(diagram);
        let nodes = self.nodes.borrow();
        assert_eq!(
            vars.len(),
            nodes.var_count(),
            "one value per variable is required"
        );
        evaluate_node(&nodes, diagram.root(), vars)
    }

    pub(crate) fn store(&self) -> &Rc<RefCell<NodeManager>> {
        &self.nodes
    }

    pub(crate) fn wrap(&self, root: NodeId) -> Diagram {
        Diagram::new(Rc::clone(&self.nodes), root)
    }

    pub(crate) fn check_same_store(&self, diagram: &Diagram) {
        assert!(
            Rc::ptr_eq(&self.nodes, diagram.store()),
            "diagram belongs to a different manager"
        );
    }
}

pub(crate) fn evaluate_node(nodes: &NodeManager, root: NodeId, vars: &[Value]) -> Value {
    let mut current = root;
    while nodes.node(current).is_internal() {
        let index = nodes.node(current).index();
        let value = vars[index];
        assert!(
            nodes.is_valid_var_value(index, value),
            "value {value} is outside the domain of variable {index}"
        );
        current = nodes.node(current).son(value as usize);
    }
    nodes.node(current).value()
}

/// One step of the apply recursion: terminal fusion, memo probe, Shannon
/// cofactor expansion on the topmost variable, reduce + canonicalise,
/// memoise. Every node returned is marked, which protects the partial
/// result if the pool runs dry and a collection fires mid-recursion.
fn apply_step(nodes: &mut NodeManager, op: BinOp, lhs: NodeId, rhs: NodeId) -> NodeId {
    if nodes.node(lhs).is_terminal() && nodes.node(rhs).is_terminal() {
        let value = op.terminal_rule(nodes.node(lhs).value(), nodes.node(rhs).value());
        return nodes.make_terminal(value);
    }

    let (lhs_key, rhs_key) = if op.is_commutative() && rhs < lhs {
        (rhs, lhs)
    } else {
        (lhs, rhs)
    };
    let op_id = op.cache_id();
    if let Some(hit) = nodes.cache_find(op_id, lhs_key, rhs_key) {
        return hit;
    }

    let top_level = nodes.level(lhs).min(nodes.level(rhs));
    let index = nodes.index_at_level(top_level);
    let domain = nodes.domain_usize(index);

    let mut sons = Vec::with_capacity(domain);
    for k in 0..domain {
        let lhs_cofactor = if nodes.level(lhs) == top_level {
            nodes.node(lhs).son(k)
        } else {
            lhs
        };
        let rhs_cofactor = if nodes.level(rhs) == top_level {
            nodes.node(rhs).son(k)
        } else {
            rhs
        };
        sons.push(apply_step(nodes, op, lhs_cofactor, rhs_cofactor));
    }

    let result = nodes.make_internal(index, sons.into_boxed_slice());
    nodes.cache_put(op_id, lhs_key, rhs_key, result);
    result
}
