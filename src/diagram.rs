//! Cheap owning handle to a diagram root
//!
//! A [`Diagram`] is a value type holding a root node id together with a
//! shared reference to the node store. Construction increments the root's
//! reference count and clears its transient mark; clones increment and
//! drops decrement, so a root stays alive across garbage collections for
//! exactly as long as some handle refers to it.
//!
//! Equality is structural by identity: thanks to canonicity, two handles
//! represent the same function iff their root ids are equal.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::node::{NodeId, NodeManager};

pub struct Diagram {
    store: Rc<RefCell<NodeManager>>,
    root: NodeId,
}

impl Diagram {
    pub(crate) fn new(store: Rc<RefCell<NodeManager>>, root: NodeId) -> Self {
        {
            let mut nodes = store.borrow_mut();
            nodes.node_mut(root).inc_ref_count();
            nodes.node_mut(root).set_notmarked();
        }
        Diagram { store, root }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn store(&self) -> &Rc<RefCell<NodeManager>> {
        &self.store
    }

    /// True iff both handles share the same root node, which by canonicity
    /// means they represent the same function.
    pub fn equals(&self, other: &Diagram) -> bool {
        debug_assert!(
            Rc::ptr_eq(&self.store, &other.store),
            "diagrams from different managers are never comparable"
        );
        self.root == other.root
    }

    /// True when the diagram is a single terminal.
    pub fn is_constant(&self) -> bool {
        self.store.borrow().node(self.root).is_terminal()
    }
}

impl Clone for Diagram {
    fn clone(&self) -> Self {
        self.store
            .borrow_mut()
            .node_mut(self.root)
            .inc_ref_count();
        Diagram {
            store: Rc::clone(&self.store),
            root: self.root,
        }
    }
}

impl Drop for Diagram {
    fn drop(&mut self) {
        if let Ok(mut nodes) = self.store.try_borrow_mut() {
            nodes.node_mut(self.root).dec_ref_count();
        }
    }
}

impl PartialEq for Diagram {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Diagram {}

impl Hash for Diagram {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root.hash(state);
    }
}

impl fmt::Debug for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagram").field("root", &self.root).finish()
    }
}
