//! Operation cache: the weak memo behind near-linear `apply`
//!
//! A single flat open-addressed array keyed by `(op, lhs, rhs)`. Collisions
//! overwrite: the cache is lossy on purpose and entries hold no strong
//! references. An empty slot is encoded as `result == NIL`.

use super::unique::CAPACITIES;
use super::{NodeId, NodePool, NIL};

const LOAD_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone, Copy)]
struct Entry {
    op: u64,
    lhs: NodeId,
    rhs: NodeId,
    result: NodeId,
}

const EMPTY: Entry = Entry {
    op: 0,
    lhs: NIL,
    rhs: NIL,
    result: NIL,
};

#[derive(Debug)]
pub(crate) struct OpCache {
    entries: Vec<Entry>,
    size: usize,
    capacity_index: usize,
}

impl OpCache {
    pub(crate) fn new() -> Self {
        OpCache {
            entries: vec![EMPTY; CAPACITIES[0]],
            size: 0,
            capacity_index: 0,
        }
    }

    /// Returns the memoised result when the slot holds exactly this key.
    /// The caller must treat the returned node as transiently live (mark
    /// it): it may sit at zero references, about to be collected.
    pub(crate) fn find(&self, op: u64, lhs: NodeId, rhs: NodeId) -> Option<NodeId> {
        let entry = &self.entries[self.slot(op, lhs, rhs)];
        if entry.result != NIL && entry.op == op && entry.lhs == lhs && entry.rhs == rhs {
            Some(entry.result)
        } else {
            None
        }
    }

    /// Unconditionally stores, overwriting whatever occupied the slot.
    pub(crate) fn put(&mut self, op: u64, lhs: NodeId, rhs: NodeId, result: NodeId) {
        let slot = self.slot(op, lhs, rhs);
        let entry = &mut self.entries[slot];
        if entry.result == NIL {
            self.size += 1;
        }
        *entry = Entry {
            op,
            lhs,
            rhs,
            result,
        };
    }

    pub(crate) fn clear(&mut self) {
        if self.size > 0 {
            self.size = 0;
            for entry in &mut self.entries {
                entry.result = NIL;
            }
        }
    }

    /// Drops every entry that references a node destroyed by the last
    /// sweep. Must run after each garbage collection, before any slot is
    /// recycled under a stale id.
    pub(crate) fn remove_unused(&mut self, pool: &NodePool) {
        for entry in &mut self.entries {
            if entry.result == NIL {
                continue;
            }
            if !pool.is_live(entry.result)
                || !pool.is_live(entry.lhs)
                || !pool.is_live(entry.rhs)
            {
                entry.result = NIL;
                self.size -= 1;
            }
        }
    }

    /// Grows towards the first prime capacity >= `target` once the current
    /// load exceeds the threshold. Entries are re-placed lossily.
    pub(crate) fn adjust_capacity(&mut self, target: usize) {
        if self.size == 0 || self.capacity_index + 1 >= CAPACITIES.len() {
            return;
        }
        let mut wanted = self.capacity_index;
        while wanted + 1 < CAPACITIES.len() && CAPACITIES[wanted] < target {
            wanted += 1;
        }
        if wanted <= self.capacity_index {
            return;
        }
        let load = self.size as f64 / self.entries.len() as f64;
        if load < LOAD_THRESHOLD {
            return;
        }

        self.capacity_index = wanted;
        let old = std::mem::replace(&mut self.entries, vec![EMPTY; CAPACITIES[wanted]]);
        self.size = 0;
        for entry in old {
            if entry.result != NIL {
                self.put(entry.op, entry.lhs, entry.rhs, entry.result);
            }
        }
    }

    fn slot(&self, op: u64, lhs: NodeId, rhs: NodeId) -> usize {
        let mut seed = 0u64;
        for part in [op, lhs as u64, rhs as u64] {
            seed ^= part
                .wrapping_mul(0x9e37_79b9_7f4a_7c15)
                .wrapping_add(0x9e37_79b9)
                .wrapping_add(seed << 6)
                .wrapping_add(seed >> 2);
        }
        (seed % self.entries.len() as u64) as usize
    }
}
