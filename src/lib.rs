//! # mdd-logic
//!
//! A decision diagram engine: discrete functions
//! `f: D_0 x ... x D_{n-1} -> {0, ..., M-1}` represented as reduced ordered
//! multi-valued decision diagrams (MDDs), with binary decision diagrams
//! (BDDs) as the two-valued special case.
//!
//! The engine keeps every diagram canonical: structurally equal functions
//! share one root node, so comparing two diagrams is a pointer comparison
//! and combining them with [`DiagramManager::apply`] is near-linear in
//! practice thanks to an operation cache. Nodes live in a pooled arena
//! managed by reference counting plus mark-sweep garbage collection, and
//! the variable order can be improved on the fly with Rudell's sifting.
//!
//! ## Building and querying diagrams
//!
//! ```
//! use mdd_logic::{BinOp, DiagramManager};
//!
//! // Two boolean variables, 1000 pre-allocated nodes.
//! let m = DiagramManager::bdd(2, 1_000);
//! let x0 = m.variable(0);
//! let x1 = m.variable(1);
//!
//! // f(x) = x0 AND x1
//! let f = m.apply(BinOp::And, &x0, &x1);
//!
//! assert_eq!(m.evaluate(&f, &[1, 1]), 1);
//! assert_eq!(m.satisfy_count(1, &f), 1);
//! assert_eq!(m.satisfy_all(1, &f), vec![vec![1, 1]]);
//! ```
//!
//! Multi-valued and mixed-domain managers work the same way; diagrams can
//! also be built from truth vectors:
//!
//! ```
//! use mdd_logic::DiagramManager;
//!
//! // Components with 2, 3, 2 and 3 states.
//! let m = DiagramManager::mixed(4, 1_000, vec![2, 3, 2, 3]);
//! let f = m.from_vector(&[
//!     0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1,
//!     0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2,
//! ]);
//! assert_eq!(m.evaluate(&f, &[1, 1, 0, 2]), 2);
//! assert_eq!(m.to_vector(&f).len(), 36);
//! ```
//!
//! ## Reliability analysis
//!
//! A diagram can serve as the structure function of a multi-state system.
//! The reliability layer computes state probabilities, availability,
//! logic derivatives and the importance measures built from them:
//!
//! ```
//! use mdd_logic::{BinOp, DiagramManager};
//!
//! let m = DiagramManager::bdd(2, 1_000);
//! let x0 = m.variable(0);
//! let x1 = m.variable(1);
//! let series = m.apply(BinOp::And, &x0, &x1);
//!
//! let availability = m.availability(&[0.9, 0.8], &series);
//! assert!((availability - 0.72).abs() < 1e-8);
//!
//! let cuts = m.mcvs(&series, 1);
//! assert_eq!(cuts.len(), 2);
//! ```
//!
//! ## PLA files
//!
//! Sum-of-products descriptions in the classical Espresso PLA format load
//! into one BDD per output:
//!
//! ```
//! use mdd_logic::{DiagramManager, FoldType, PlaFile};
//!
//! let file = PlaFile::from_string(".i 2\n.o 1\n.p 2\n01 1\n10 1\n.e\n").unwrap();
//! let m = DiagramManager::bdd(2, 1_000);
//! let outputs = m.from_pla(&file, FoldType::Tree);
//! assert_eq!(m.satisfy_count(1, &outputs[0]), 2);
//! ```
//!
//! ## Memory management
//!
//! Nodes are pooled; the pool never moves a live node. A [`Diagram`] handle
//! keeps its root (and hence the DAG under it) alive across garbage
//! collections. Collection runs when the pool is exhausted, or on demand
//! through [`DiagramManager::force_gc`]. With
//! [`DiagramManager::set_auto_reorder`] enabled, pool growth during an
//! operation schedules a deferred GC + sifting pass that runs as soon as
//! the operation finishes. The engine is single-threaded by design; use
//! one manager per thread.

pub mod diagram;
pub mod error;
pub mod manager;
mod node;
pub mod ops;
pub mod pla;
pub mod reliability;
pub mod types;

pub use diagram::Diagram;
pub use error::PlaError;
pub use manager::{DiagramManager, ManagerSettings};
pub use ops::{BinOp, FoldType};
pub use pla::{CubeValue, PlaFile, PlaLine};
pub use reliability::{dpld, VarChange};
pub use types::{Value, NONDETERMINED, UNDEFINED};
