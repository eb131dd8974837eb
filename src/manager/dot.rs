//! Graphviz output
//!
//! Terminals render as squares labelled with their value (`*` for the
//! undefined sentinel), internal nodes as circles labelled `x_i`. BDD
//! edges use dashed/solid style for the 0/1 branch; wider domains label
//! each edge with the branch number. Nodes of one level share a
//! `rank = same` group.

use std::io::{self, Write};

use crate::diagram::Diagram;
use crate::node::{NodeId, NodeManager};
use crate::types::{Value, NONDETERMINED, UNDEFINED};

use super::DiagramManager;

impl DiagramManager {
    /// Writes the whole multi-rooted graph owned by the manager.
    pub fn to_dot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let nodes = self.store().borrow();
        let mut ids = Vec::new();
        for index in 0..nodes.var_count() {
            ids.extend(nodes.unique_table_ids(index));
        }
        ids.extend(nodes.terminal_ids());
        if let Some(undefined) = nodes.get_terminal(UNDEFINED) {
            ids.push(undefined);
        }
        write_dot(&nodes, out, &ids)
    }

    /// Writes the DAG reachable from one diagram.
    pub fn to_dot_diagram<W: Write>(&self, out: &mut W, diagram: &Diagram) -> io::Result<()> {
        self.check_same_store(diagram);
        let mut nodes = self.store().borrow_mut();
        let ids = nodes.traverse_level(diagram.root());
        write_dot(&nodes, out, &ids)
    }
}

fn terminal_label(value: Value) -> String {
    match value {
        UNDEFINED => "*".to_string(),
        NONDETERMINED => "N".to_string(),
        other => other.to_string(),
    }
}

fn write_dot<W: Write>(nodes: &NodeManager, out: &mut W, ids: &[NodeId]) -> io::Result<()> {
    let is_bdd = nodes.is_boolean();
    let level_count = nodes.var_count() + 1;

    let mut labels = Vec::new();
    let mut squares = Vec::new();
    let mut arcs = Vec::new();
    let mut rank_groups: Vec<Vec<String>> = vec![Vec::new(); level_count];

    for &id in ids {
        let node = nodes.node(id);
        let label = if node.is_terminal() {
            terminal_label(node.value())
        } else {
            format!("x{}", node.index())
        };
        labels.push(format!(
            "{id} [label = \"{label}\", tooltip = \"{}\"];",
            node.ref_count()
        ));

        if node.is_terminal() {
            squares.push(id.to_string());
            rank_groups[level_count - 1].push(format!("{id};"));
            continue;
        }

        rank_groups[nodes.level(id)].push(format!("{id};"));
        for (k, &son) in node.sons().iter().enumerate() {
            if is_bdd {
                let style = if k == 0 { "dashed" } else { "solid" };
                arcs.push(format!("{id} -> {son} [style = {style}];"));
            } else {
                arcs.push(format!("{id} -> {son} [label = {k}];"));
            }
        }
    }

    writeln!(out, "digraph DD {{")?;
    writeln!(out, "    node [shape = square] {};", squares.join(" "))?;
    writeln!(out, "    node [shape = circle];")?;
    writeln!(out)?;
    writeln!(out, "    {}", labels.join("\n    "))?;
    writeln!(out)?;
    writeln!(out, "    {}", arcs.join("\n    "))?;
    writeln!(out)?;
    for group in &rank_groups {
        if !group.is_empty() {
            writeln!(out, "    {{ rank = same; {} }}", group.join(" "))?;
        }
    }
    writeln!(out, "}}")?;
    Ok(())
}
