//! Example: Building and querying a BDD
//!
//! Builds f(x) = (x0 AND x1) OR (x2 AND x3), evaluates it, counts its
//! satisfying assignments and prints the diagram in Graphviz format.

use mdd_logic::{BinOp, DiagramManager};
use std::io;

fn main() {
    env_logger::init();

    // 4 variables, 1000 pre-allocated nodes.
    let m = DiagramManager::bdd(4, 1_000);

    // Diagrams for single variables (indices start at 0).
    let xs = m.variables(&[0, 1, 2, 3]);

    // f(x) = (x0 AND x1) OR (x2 AND x3)
    let f1 = m.apply(BinOp::And, &xs[0], &xs[1]);
    let f2 = m.apply(BinOp::And, &xs[2], &xs[3]);
    let f = m.apply(BinOp::Or, &f1, &f2);

    println!("evaluate([1,1,0,1]) = {}", m.evaluate(&f, &[1, 1, 0, 1]));
    println!("satisfy-count(1)    = {}", m.satisfy_count(1, &f));
    println!("node count          = {}", m.node_count_of(&f));

    println!("\nsatisfying assignments:");
    for assignment in m.satisfy_all(1, &f) {
        println!("  {assignment:?}");
    }

    println!();
    m.to_dot_diagram(&mut io::stdout(), &f).unwrap();
}
