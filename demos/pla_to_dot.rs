//! Example: Rendering a PLA file as Graphviz
//!
//! Loads the PLA file given on the command line, builds one BDD per output
//! and prints the whole diagram forest in dot format.

use mdd_logic::{DiagramManager, FoldType, PlaFile};
use std::env;
use std::io;
use std::process;

fn main() {
    env_logger::init();

    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("Usage: pla_to_dot <FILE>");
            process::exit(1);
        }
    };

    let file = match PlaFile::from_file(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let m = DiagramManager::bdd(file.input_count(), 100_000);
    let outputs = m.from_pla(&file, FoldType::Tree);
    eprintln!(
        "{} output function(s), {} unique nodes",
        outputs.len(),
        m.node_count()
    );
    m.to_dot(&mut io::stdout()).unwrap();
}
