//! Dynamic variable reordering: adjacent-level swap and Rudell's sifting
//!
//! A swap mutates every node of the upper variable in place: the node keeps
//! its id (so external handles stay valid) but moves to the lower variable's
//! index, with freshly canonicalised sons built from the cofactor matrix.
//! Sifting walks each variable to every level and parks it where the global
//! node count was smallest.

use log::debug;

use super::{NodeId, NodeManager, NIL};

impl NodeManager {
    /// Rudell's sifting. Variables are processed in order of descending
    /// node count at their index.
    pub(crate) fn sift_variables(&mut self) {
        debug!(
            "node_manager: sifting variables, node count before {}",
            self.node_count
        );

        // Memo entries are keyed by node identity and a swap changes what
        // an id means, so the cache must not survive reordering.
        self.cache_clear();

        let mut counts: Vec<(usize, usize)> = (0..self.var_count())
            .map(|index| (index, self.node_count_at_index(index)))
            .collect();
        counts.sort_by(|lhs, rhs| rhs.1.cmp(&lhs.1));

        for (index, _) in counts {
            self.place_variable(index);
        }

        debug!(
            "node_manager: done sifting, node count after {}",
            self.node_count
        );
        self.clear_deferred();
    }

    /// Tries the variable on every level and restores the position with the
    /// lowest total node count.
    fn place_variable(&mut self, index: usize) {
        let last_internal_level = self.var_count() - 1;
        let mut current_level = self.level_of_index(index);
        let mut optimal_level = current_level;
        let mut optimal_count = self.node_count;

        while current_level != last_internal_level {
            self.move_var_down(index);
            current_level += 1;
            if self.node_count < optimal_count {
                optimal_count = self.node_count;
                optimal_level = current_level;
            }
        }

        while current_level != 0 {
            self.move_var_up(index);
            current_level -= 1;
            if self.node_count < optimal_count {
                optimal_count = self.node_count;
                optimal_level = current_level;
            }
        }

        while current_level != optimal_level {
            self.move_var_down(index);
            current_level += 1;
        }
    }

    fn move_var_down(&mut self, index: usize) {
        self.swap_variable_with_next(index);
    }

    fn move_var_up(&mut self, index: usize) {
        let level = self.level_of_index(index);
        let prev_index = self.index_at_level(level - 1);
        self.swap_variable_with_next(prev_index);
    }

    /// Swaps the variable at some level with the one directly below it.
    pub(crate) fn swap_variable_with_next(&mut self, index: usize) {
        let level = self.level_of_index(index);
        let next_index = self.index_at_level(level + 1);

        let tmp = self.unique_tables[index].take();
        for id in tmp.collect_ids(&self.pool) {
            self.swap_node_with_next(id);
        }
        self.unique_tables[index].adjust_capacity(&mut self.pool);
        self.unique_tables[next_index].merge(&mut self.pool, tmp);

        self.level_to_index.swap(level, level + 1);
        self.index_to_level[index] += 1;
        self.index_to_level[next_index] -= 1;
    }

    fn swap_node_with_next(&mut self, id: NodeId) {
        let node_index = self.node(id).index();
        let next_index = self.index_at_level(self.level(id) + 1);
        let node_domain = self.domain_usize(node_index);
        let son_domain = self.domain_usize(next_index);

        let old_sons: Vec<NodeId> = self.node(id).sons().to_vec();

        // C[p][q] is the son reached by taking branch p of this node and
        // then branch q of its son, or the son itself when it does not
        // depend on the next variable.
        let mut cofactors = vec![vec![NIL; son_domain]; node_domain];
        for (p, &son) in old_sons.iter().enumerate() {
            let independent =
                self.node(son).is_terminal() || self.node(son).index() != next_index;
            for q in 0..son_domain {
                cofactors[p][q] = if independent {
                    son
                } else {
                    self.node(son).son(q)
                };
            }
        }

        self.node_mut(id).set_index(next_index);
        let mut new_sons = Vec::with_capacity(son_domain);
        for q in 0..son_domain {
            let inner: Box<[NodeId]> =
                (0..node_domain).map(|p| cofactors[p][q]).collect();
            new_sons.push(self.make_internal(node_index, inner));
        }
        self.node_mut(id).set_sons(new_sons.into_boxed_slice());

        for q in 0..son_domain {
            let son = self.node(id).son(q);
            self.node_mut(son).inc_ref_count();
        }
        for q in 0..son_domain {
            let son = self.node(id).son(q);
            self.node_mut(son).set_notmarked();
        }
        for &old_son in &old_sons {
            self.dec_ref_try_gc(old_son);
        }
    }
}
