//! Node manager: composes the arena, the unique tables and the operation
//! cache, owns the variable order and the per-variable domains, and exposes
//! the node-level primitives everything else is built on.
//!
//! Construction primitives return *marked* nodes: a fresh or looked-up node
//! is transiently live until it becomes a son of another node or an external
//! handle claims it. Garbage collection never touches a marked node, which
//! is what makes it safe to collect in the middle of a recursive build when
//! the pool runs dry.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::debug;

use crate::types::{is_special, Value, UNDEFINED};

use super::{Node, NodeId, NodeKind, NodePool, OpCache, UniqueTable, NIL};

#[derive(Debug)]
pub(crate) struct NodeManager {
    pub(super) pool: NodePool,
    pub(super) unique_tables: Vec<UniqueTable>,
    op_cache: OpCache,
    terminals: Vec<NodeId>,
    /// Slots for the Undefined and Nondetermined terminals, outside the regular
    /// per-value vector so sentinels can never be confused with user values.
    specials: [NodeId; 2],
    pub(super) index_to_level: Vec<usize>,
    pub(super) level_to_index: Vec<usize>,
    domains: Vec<Value>,
    pub(super) node_count: usize,
    cache_ratio: f64,
    gc_ratio: f64,
    next_table_adjustment: usize,
    auto_reorder: bool,
    gc_reorder_deferred: bool,
}

impl NodeManager {
    pub(crate) fn new(
        var_count: usize,
        pool_size: usize,
        overflow_pool_size: Option<usize>,
        order: Option<Vec<usize>>,
        domains: Vec<Value>,
    ) -> Self {
        assert_eq!(
            domains.len(),
            var_count,
            "one domain per variable is required"
        );
        for (index, &domain) in domains.iter().enumerate() {
            assert!(
                domain >= 2 && !is_special(domain),
                "domain of variable {index} must be at least 2"
            );
        }

        let level_to_index =
            order.unwrap_or_else(|| (0..var_count).collect::<Vec<_>>());
        assert_eq!(
            level_to_index.len(),
            var_count,
            "variable order must mention every variable exactly once"
        );
        assert!(
            check_distinct(&level_to_index, var_count),
            "variable order must be a permutation of 0..var_count"
        );

        let mut index_to_level = vec![0; var_count];
        for (level, &index) in level_to_index.iter().enumerate() {
            index_to_level[index] = level;
        }

        let overflow = overflow_pool_size.unwrap_or_else(|| (pool_size / 2).max(1));
        NodeManager {
            pool: NodePool::new(pool_size, overflow),
            unique_tables: (0..var_count).map(|_| UniqueTable::new()).collect(),
            op_cache: OpCache::new(),
            terminals: Vec::new(),
            specials: [NIL; 2],
            index_to_level,
            level_to_index,
            domains,
            node_count: 0,
            cache_ratio: 0.5,
            gc_ratio: 0.05,
            next_table_adjustment: 230,
            auto_reorder: false,
            gc_reorder_deferred: false,
        }
    }

    pub(crate) fn set_cache_ratio(&mut self, ratio: f64) {
        assert!(ratio > 0.0, "cache ratio must be positive");
        self.cache_ratio = ratio;
    }

    pub(crate) fn set_gc_ratio(&mut self, ratio: f64) {
        assert!(
            (0.0..=1.0).contains(&ratio),
            "gc ratio must be within [0, 1]"
        );
        self.gc_ratio = ratio;
    }

    pub(crate) fn set_auto_reorder(&mut self, reorder: bool) {
        self.auto_reorder = reorder;
    }

    // --- introspection ---

    pub(crate) fn var_count(&self) -> usize {
        self.unique_tables.len()
    }

    pub(crate) fn domain(&self, index: usize) -> Value {
        self.domains[index]
    }

    pub(crate) fn domain_usize(&self, index: usize) -> usize {
        self.domains[index] as usize
    }

    pub(crate) fn domains(&self) -> &[Value] {
        &self.domains
    }

    pub(crate) fn order(&self) -> &[usize] {
        &self.level_to_index
    }

    pub(crate) fn is_boolean(&self) -> bool {
        self.domains.iter().all(|&domain| domain == 2)
    }

    pub(crate) fn level_of_index(&self, index: usize) -> usize {
        self.index_to_level[index]
    }

    pub(crate) fn leaf_level(&self) -> usize {
        self.var_count()
    }

    pub(crate) fn index_at_level(&self, level: usize) -> usize {
        self.level_to_index[level]
    }

    /// Level of a node; terminals live on the leaf level below every
    /// variable.
    pub(crate) fn level(&self, id: NodeId) -> usize {
        let node = self.node(id);
        if node.is_terminal() {
            self.leaf_level()
        } else {
            self.level_of_index(node.index())
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.pool.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.pool.get_mut(id)
    }

    pub(crate) fn node_count(&self) -> usize {
        self.node_count
    }

    pub(crate) fn node_count_at_index(&self, index: usize) -> usize {
        self.unique_tables[index].size()
    }

    /// Number of distinct nodes reachable from `root`, the root and
    /// terminals included.
    pub(crate) fn node_count_of(&mut self, root: NodeId) -> usize {
        self.traverse_pre(root).len()
    }

    pub(crate) fn is_valid_var_value(&self, index: usize, value: Value) -> bool {
        value < self.domains[index]
    }

    /// Ids of every canonical node at a variable index.
    pub(crate) fn unique_table_ids(&self, index: usize) -> Vec<NodeId> {
        self.unique_tables[index].collect_ids(&self.pool)
    }

    /// Ids of the live regular terminals (sentinel terminals excluded).
    pub(crate) fn terminal_ids(&self) -> Vec<NodeId> {
        self.terminals
            .iter()
            .copied()
            .filter(|&id| id != NIL)
            .collect()
    }

    /// Product of `D_{index(level)}` over the half-open level range, saturating.
    pub(crate) fn domain_product(&self, level_from: usize, level_to: usize) -> u64 {
        let mut product = 1u64;
        for level in level_from..level_to {
            let index = self.level_to_index[level];
            product = product.saturating_mul(u64::from(self.domains[index]));
        }
        product
    }

    /// Same in the log domain, for systems whose state count overflows.
    pub(crate) fn domain_product_ln(&self, level_from: usize, level_to: usize) -> f64 {
        let mut sum = 0.0;
        for level in level_from..level_to {
            let index = self.level_to_index[level];
            sum += f64::from(self.domains[index]).ln();
        }
        sum
    }

    // --- node construction ---

    pub(crate) fn get_terminal(&self, value: Value) -> Option<NodeId> {
        let id = if is_special(value) {
            self.specials[(UNDEFINED - value) as usize]
        } else {
            self.terminals.get(value as usize).copied().unwrap_or(NIL)
        };
        (id != NIL).then_some(id)
    }

    /// Returns the unique terminal for `value`, creating it on first
    /// demand. The node comes back marked.
    pub(crate) fn make_terminal(&mut self, value: Value) -> NodeId {
        let id = match self.get_terminal(value) {
            Some(existing) => existing,
            None => {
                let created = self.make_new_node(NodeKind::Terminal(value));
                if is_special(value) {
                    self.specials[(UNDEFINED - value) as usize] = created;
                } else {
                    let slot = value as usize;
                    if slot >= self.terminals.len() {
                        self.terminals.resize(slot + 1, NIL);
                    }
                    self.terminals[slot] = created;
                }
                created
            }
        };
        self.node_mut(id).set_marked();
        id
    }

    /// Canonicalises `(index, sons)`: reduces a redundant tuple to its son,
    /// consults the unique table, and only allocates on a miss. The result
    /// comes back marked; the sons are unmarked once they hold a reference
    /// from the new parent.
    pub(crate) fn make_internal(&mut self, index: usize, sons: Box<[NodeId]>) -> NodeId {
        debug_assert_eq!(sons.len(), self.domain_usize(index));

        if sons.iter().all(|&son| son == sons[0]) {
            let ret = sons[0];
            self.node_mut(ret).set_marked();
            return ret;
        }

        let (found, hash) = self.unique_tables[index].find(&self.pool, &sons);
        let ret = match found {
            Some(existing) => existing,
            None => {
                let created = self.make_new_node(NodeKind::Internal { index, sons });
                self.unique_tables[index].insert(&mut self.pool, created, hash);
                for k in 0..self.domain_usize(index) {
                    let son = self.node(created).son(k);
                    self.node_mut(son).inc_ref_count();
                }
                created
            }
        };

        // The sons certainly hold a reference now, so they no longer need
        // the transient mark.
        for k in 0..self.domain_usize(index) {
            let son = self.node(ret).son(k);
            self.node_mut(son).set_notmarked();
        }
        self.node_mut(ret).set_marked();
        ret
    }

    /// Builds a son container for `index` from a generator.
    pub(crate) fn make_sons(
        &mut self,
        index: usize,
        mut generator: impl FnMut(&mut Self, usize) -> NodeId,
    ) -> Box<[NodeId]> {
        let domain = self.domain_usize(index);
        let mut sons = Vec::with_capacity(domain);
        for k in 0..domain {
            sons.push(generator(self, k));
        }
        sons.into_boxed_slice()
    }

    fn make_new_node(&mut self, kind: NodeKind) -> NodeId {
        if self.auto_reorder {
            // GC and reordering are deferred until the current top-level
            // operation finishes; until then just grow the pool.
            if self.pool.available_node_count() == 0 {
                self.pool.grow();
                self.gc_reorder_deferred = true;
            }
        } else if self.pool.available_node_count() == 0 {
            let grow_threshold =
                ((self.gc_ratio * self.pool.main_pool_size() as f64) as usize).max(1);
            self.force_gc();
            if self.pool.available_node_count() < grow_threshold {
                self.pool.grow();
            }
        }

        if self.node_count >= self.next_table_adjustment {
            // Once the node count doubles, let the tables and the cache
            // catch up.
            self.adjust_tables();
            self.adjust_caches();
            self.next_table_adjustment *= 2;
        }

        self.node_count += 1;
        self.pool.create(kind)
    }

    pub(super) fn delete_node(&mut self, id: NodeId) {
        debug_assert!(!self.node(id).is_marked());
        self.node_count -= 1;
        self.pool.destroy(id);
    }

    fn adjust_tables(&mut self) {
        debug!(
            "node_manager: adjusting unique tables, node count is {}",
            self.node_count
        );
        for index in 0..self.unique_tables.len() {
            self.unique_tables[index].adjust_capacity(&mut self.pool);
        }
    }

    fn adjust_caches(&mut self) {
        let target = (self.cache_ratio * self.node_count as f64) as usize;
        self.op_cache.adjust_capacity(target);
    }

    // --- operation cache ---

    /// Probes the memo; a hit comes back marked because the entry holds no
    /// strong reference and the node may be sitting at zero references.
    pub(crate) fn cache_find(&mut self, op: u64, lhs: NodeId, rhs: NodeId) -> Option<NodeId> {
        let hit = self.op_cache.find(op, lhs, rhs)?;
        self.node_mut(hit).set_marked();
        Some(hit)
    }

    pub(crate) fn cache_put(&mut self, op: u64, lhs: NodeId, rhs: NodeId, result: NodeId) {
        self.op_cache.put(op, lhs, rhs, result);
    }

    pub(crate) fn cache_clear(&mut self) {
        self.op_cache.clear();
    }

    // --- garbage collection ---

    fn can_be_gced(node: &Node) -> bool {
        node.ref_count() == 0 && !node.is_marked()
    }

    /// Mark-sweep pass followed by a cache scrub.
    pub(crate) fn force_gc(&mut self) {
        self.collect_garbage();
        self.op_cache.remove_unused(&self.pool);
    }

    /// Sweeps level by level so reference counts cascade from parents to
    /// sons within a single pass, then reaps orphaned terminals.
    pub(crate) fn collect_garbage(&mut self) {
        let before = self.node_count;

        for level in 0..self.var_count() {
            let index = self.level_to_index[level];
            for id in self.unique_tables[index].collect_ids(&self.pool) {
                if Self::can_be_gced(self.node(id)) {
                    for k in 0..self.domain_usize(index) {
                        let son = self.node(id).son(k);
                        self.node_mut(son).dec_ref_count();
                    }
                    self.unique_tables[index].erase(&mut self.pool, id);
                    self.delete_node(id);
                }
            }
        }

        for slot in 0..self.terminals.len() {
            let id = self.terminals[slot];
            if id != NIL && Self::can_be_gced(self.node(id)) {
                self.delete_node(id);
                self.terminals[slot] = NIL;
            }
        }
        for slot in 0..self.specials.len() {
            let id = self.specials[slot];
            if id != NIL && Self::can_be_gced(self.node(id)) {
                self.delete_node(id);
                self.specials[slot] = NIL;
            }
        }

        debug!(
            "node_manager: collected {} nodes, {} remain",
            before - self.node_count,
            self.node_count
        );
    }

    /// Decrements a reference count and immediately reaps the node if it
    /// became garbage, cascading into its sons. Used by variable swap where
    /// waiting for the next sweep would bloat the pool.
    pub(super) fn dec_ref_try_gc(&mut self, id: NodeId) {
        self.node_mut(id).dec_ref_count();
        if !Self::can_be_gced(self.node(id)) {
            return;
        }

        if self.node(id).is_internal() {
            let index = self.node(id).index();
            for k in 0..self.domain_usize(index) {
                let son = self.node(id).son(k);
                self.dec_ref_try_gc(son);
            }
            self.unique_tables[index].erase(&mut self.pool, id);
        } else {
            let value = self.node(id).value();
            if is_special(value) {
                self.specials[(UNDEFINED - value) as usize] = NIL;
            } else {
                self.terminals[value as usize] = NIL;
            }
        }

        self.delete_node(id);
    }

    /// Runs the GC + sift pass postponed by an auto-reorder pool growth.
    pub(crate) fn run_deferred(&mut self) {
        if self.gc_reorder_deferred {
            self.collect_garbage();
            self.op_cache.clear();
            self.sift_variables();
        }
    }

    pub(super) fn clear_deferred(&mut self) {
        self.gc_reorder_deferred = false;
    }

    // --- traversal ---

    /// Visit order of a pre-order walk over the DAG under `root`. Marks are
    /// toggled on first visit and restored by a second pass, so the walk is
    /// idempotent and leaves every node as it found it.
    pub(crate) fn traverse_pre(&mut self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        self.traverse_step(root, &mut order, true);
        self.traverse_reset(root);
        order
    }

    /// Post-order variant: every son is visited before its parent.
    pub(crate) fn traverse_post(&mut self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        self.traverse_step(root, &mut order, false);
        self.traverse_reset(root);
        order
    }

    /// Level-order variant driven by a priority queue keyed by level.
    pub(crate) fn traverse_level(&mut self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut queue: BinaryHeap<Reverse<(usize, NodeId)>> = BinaryHeap::new();
        self.node_mut(root).toggle_marked();
        queue.push(Reverse((self.level(root), root)));
        while let Some(Reverse((_, current))) = queue.pop() {
            order.push(current);
            if self.node(current).is_internal() {
                let domain = self.domain_usize(self.node(current).index());
                for k in 0..domain {
                    let son = self.node(current).son(k);
                    if self.node(son).is_marked() != self.node(current).is_marked() {
                        self.node_mut(son).toggle_marked();
                        queue.push(Reverse((self.level(son), son)));
                    }
                }
            }
        }
        self.traverse_reset(root);
        order
    }

    fn traverse_step(&mut self, id: NodeId, out: &mut Vec<NodeId>, pre: bool) {
        self.node_mut(id).toggle_marked();
        if pre {
            out.push(id);
        }
        if self.node(id).is_internal() {
            let domain = self.domain_usize(self.node(id).index());
            for k in 0..domain {
                let son = self.node(id).son(k);
                if self.node(id).is_marked() != self.node(son).is_marked() {
                    self.traverse_step(son, out, pre);
                }
            }
        }
        if !pre {
            out.push(id);
        }
    }

    fn traverse_reset(&mut self, id: NodeId) {
        self.node_mut(id).toggle_marked();
        if self.node(id).is_internal() {
            let domain = self.domain_usize(self.node(id).index());
            for k in 0..domain {
                let son = self.node(id).son(k);
                if self.node(id).is_marked() != self.node(son).is_marked() {
                    self.traverse_reset(son);
                }
            }
        }
    }
}

fn check_distinct(order: &[usize], var_count: usize) -> bool {
    let mut seen = vec![false; var_count];
    for &index in order {
        if index >= var_count || seen[index] {
            return false;
        }
        seen[index] = true;
    }
    true
}
