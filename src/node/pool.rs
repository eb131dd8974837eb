//! Slab allocator for nodes
//!
//! The pool hands out fixed slots that never move: the main slab is
//! allocated up front and overflow slabs of a fixed capacity are appended
//! on demand. Destroyed nodes go onto an intrusive free list threaded
//! through the node's `next` field and are recycled before the bump pointer
//! advances.

use log::debug;

use super::{Node, NodeId, NodeKind, NIL};

#[derive(Debug)]
pub(crate) struct NodePool {
    slabs: Vec<Vec<Node>>,
    free_head: NodeId,
    main_capacity: usize,
    overflow_capacity: usize,
    available: usize,
}

impl NodePool {
    pub(crate) fn new(main_capacity: usize, overflow_capacity: usize) -> Self {
        assert!(main_capacity > 0, "node pool must not be empty");
        assert!(overflow_capacity > 0, "overflow pool must not be empty");
        debug!("node_pool: allocating main pool with capacity {main_capacity}");
        NodePool {
            slabs: vec![Vec::with_capacity(main_capacity)],
            free_head: NIL,
            main_capacity,
            overflow_capacity,
            available: main_capacity,
        }
    }

    pub(crate) fn available_node_count(&self) -> usize {
        self.available
    }

    pub(crate) fn main_pool_size(&self) -> usize {
        self.main_capacity
    }

    /// Takes a slot from the free list, or bumps the current slab.
    /// The caller must have checked `available_node_count` beforehand and
    /// grown the pool if needed.
    pub(crate) fn create(&mut self, kind: NodeKind) -> NodeId {
        assert!(self.available > 0, "node pool exhausted");
        self.available -= 1;

        if self.free_head != NIL {
            let id = self.free_head;
            self.free_head = self.get(id).next();
            *self.get_mut(id) = Node::new(kind);
            id
        } else {
            let slab_index = self.slabs.len() - 1;
            let base = self.flat_base(slab_index);
            let slab = &mut self.slabs[slab_index];
            debug_assert!(slab.len() < slab.capacity());
            let id = base + slab.len();
            slab.push(Node::new(kind));
            id
        }
    }

    /// Flags the slot unused and pushes it onto the free list. Memory is
    /// recycled, never returned to the allocator.
    pub(crate) fn destroy(&mut self, id: NodeId) {
        self.available += 1;
        let head = self.free_head;
        let node = self.get_mut(id);
        node.set_unused();
        node.set_next(head);
        self.free_head = id;
    }

    /// Appends a fresh overflow slab. Only called after the current slab's
    /// bump pointer reached its end; recycled slots may still be on the
    /// free list.
    pub(crate) fn grow(&mut self) {
        debug_assert!(self
            .slabs
            .last()
            .is_some_and(|slab| slab.len() == slab.capacity()));
        debug!(
            "node_pool: allocating overflow pool with capacity {}",
            self.overflow_capacity
        );
        self.slabs.push(Vec::with_capacity(self.overflow_capacity));
        self.available += self.overflow_capacity;
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node {
        let (slab, offset) = self.locate(id);
        &self.slabs[slab][offset]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node {
        let (slab, offset) = self.locate(id);
        &mut self.slabs[slab][offset]
    }

    /// True when the slot currently holds a live node.
    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        id != NIL && self.get(id).is_used()
    }

    fn flat_base(&self, slab_index: usize) -> usize {
        if slab_index == 0 {
            0
        } else {
            self.main_capacity + (slab_index - 1) * self.overflow_capacity
        }
    }

    fn locate(&self, id: NodeId) -> (usize, usize) {
        if id < self.main_capacity {
            (0, id)
        } else {
            let offset = id - self.main_capacity;
            (1 + offset / self.overflow_capacity, offset % self.overflow_capacity)
        }
    }
}
