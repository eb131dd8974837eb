//! Truth-vector conversion
//!
//! The truth vector lists function values in lexicographic order of the
//! assignment read along the variable order, the variable on the last
//! level being least significant. `from_vector` and `to_vector` are exact
//! inverses of each other.

use crate::diagram::Diagram;
use crate::node::{NodeId, NodeManager};
use crate::types::Value;

use super::{evaluate_node, DiagramManager};

struct Frame {
    node: NodeId,
    level: usize,
}

impl DiagramManager {
    /// Builds the diagram of the function given by its truth vector.
    /// The vector length must equal the product of all domains.
    pub fn from_vector(&self, vector: &[Value]) -> Diagram {
        let root = {
            let mut nodes = self.store().borrow_mut();
            let root = from_vector_impl(&mut nodes, vector);
            nodes.run_deferred();
            root
        };
        self.wrap(root)
    }

    /// Enumerates the full domain and evaluates the diagram for every
    /// assignment, producing the truth vector.
    pub fn to_vector(&self, diagram: &Diagram) -> Vec<Value> {
        self.check_same_store(diagram);
        let nodes = self.store().borrow();
        let var_count = nodes.var_count();
        if var_count == 0 {
            return vec![nodes.node(diagram.root()).value()];
        }

        let mut vector = Vec::with_capacity(nodes.domain_product(0, var_count) as usize);
        let mut vars = vec![0 as Value; var_count];
        let mut was_last = false;
        while !was_last {
            vector.push(evaluate_node(&nodes, diagram.root(), &vars));

            // Advance the odometer, least significant level first.
            let mut level = nodes.leaf_level();
            let mut overflow = true;
            while level > 0 && overflow {
                level -= 1;
                let index = nodes.index_at_level(level);
                vars[index] += 1;
                overflow = vars[index] == nodes.domain(index);
                if overflow {
                    vars[index] = 0;
                }
                was_last = overflow && level == 0;
            }
        }
        vector
    }
}

/// Builds nodes bottom-up with an explicit stack: terminals are grouped
/// into last-level nodes and the stack is shrunk whenever enough siblings
/// for the level above have accumulated.
fn from_vector_impl(nodes: &mut NodeManager, vector: &[Value]) -> NodeId {
    if nodes.var_count() == 0 {
        assert_eq!(vector.len(), 1, "a constant function has exactly one value");
        return nodes.make_terminal(vector[0]);
    }

    let expected = nodes.domain_product(0, nodes.var_count());
    assert_eq!(
        vector.len() as u64,
        expected,
        "truth vector length must equal the domain size"
    );

    let last_level = nodes.var_count() - 1;
    let last_index = nodes.index_at_level(last_level);
    let last_domain = nodes.domain_usize(last_index);

    let mut stack: Vec<Frame> = Vec::new();
    let mut values = vector.iter();
    while values.len() > 0 {
        let mut sons = Vec::with_capacity(last_domain);
        for _ in 0..last_domain {
            sons.push(nodes.make_terminal(*values.next().unwrap()));
        }
        let node = nodes.make_internal(last_index, sons.into_boxed_slice());
        stack.push(Frame {
            node,
            level: last_level,
        });
        shrink_stack(nodes, &mut stack);
    }

    assert_eq!(stack.len(), 1);
    stack.pop().unwrap().node
}

fn shrink_stack(nodes: &mut NodeManager, stack: &mut Vec<Frame>) {
    loop {
        let current_level = stack.last().unwrap().level;
        if current_level == 0 {
            break;
        }

        let run = stack
            .iter()
            .rev()
            .take_while(|frame| frame.level == current_level)
            .count();
        let new_index = nodes.index_at_level(current_level - 1);
        let new_domain = nodes.domain_usize(new_index);
        if run < new_domain {
            break;
        }

        let first = stack.len() - new_domain;
        let sons: Box<[NodeId]> = stack[first..].iter().map(|frame| frame.node).collect();
        let node = nodes.make_internal(new_index, sons);
        stack.truncate(first);
        stack.push(Frame {
            node,
            level: current_level - 1,
        });
    }
}
