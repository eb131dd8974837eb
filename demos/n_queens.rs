//! Example: The N-queens problem as a BDD
//!
//! One boolean variable per board square; the constraint system is the
//! conjunction of "no two queens attack each other" and "every row holds a
//! queen". The number of satisfying assignments is the number of
//! solutions.

use mdd_logic::{BinOp, Diagram, DiagramManager};
use std::env;
use std::process;
use std::time::Instant;

fn solve(n: usize) {
    let m = DiagramManager::bdd(n * n, 1_000_000);
    m.set_cache_ratio(2.0);
    m.set_gc_ratio(0.30);

    let board: Vec<Diagram> = m.variables(&(0..n * n).collect::<Vec<_>>());
    let mut result = m.constant(1);

    // Rows.
    for i in 0..n {
        for j in 0..n {
            let mut tmp = m.constant(1);
            for k in 0..n {
                if j != k {
                    tmp = m.apply(BinOp::And, &tmp, &m.negate(&board[i * n + k]));
                }
            }
            tmp = m.apply(BinOp::Or, &tmp, &m.negate(&board[i * n + j]));
            result = m.apply(BinOp::And, &result, &tmp);
        }
    }

    // Columns.
    for j in 0..n {
        for i in 0..n {
            let mut tmp = m.constant(1);
            for k in 0..n {
                if i != k {
                    tmp = m.apply(BinOp::And, &tmp, &m.negate(&board[k * n + j]));
                }
            }
            tmp = m.apply(BinOp::Or, &tmp, &m.negate(&board[i * n + j]));
            result = m.apply(BinOp::And, &result, &tmp);
        }
    }

    // Rising diagonals.
    for i in 0..n {
        for j in 0..n {
            let mut tmp = m.constant(1);
            for k in 0..n {
                if j + k >= i && j + k < n + i && k != i {
                    tmp = m.apply(BinOp::And, &tmp, &m.negate(&board[k * n + (j + k - i)]));
                }
            }
            tmp = m.apply(BinOp::Or, &tmp, &m.negate(&board[i * n + j]));
            result = m.apply(BinOp::And, &result, &tmp);
        }
    }

    // Falling diagonals.
    for i in 0..n {
        for j in 0..n {
            let mut tmp = m.constant(1);
            for k in 0..n {
                if j + i >= k && j + i < n + k && k != i {
                    tmp = m.apply(BinOp::And, &tmp, &m.negate(&board[k * n + (j + i - k)]));
                }
            }
            tmp = m.apply(BinOp::Or, &tmp, &m.negate(&board[i * n + j]));
            result = m.apply(BinOp::And, &result, &tmp);
        }
    }

    // Place a queen in every row.
    for i in 0..n {
        let mut tmp = m.constant(0);
        for j in 0..n {
            tmp = m.apply(BinOp::Or, &tmp, &board[i * n + j]);
        }
        result = m.apply(BinOp::And, &result, &tmp);
    }

    println!("bdd node-count:      {}", m.node_count_of(&result));
    println!("number of solutions: {}", m.satisfy_count(1, &result));
}

fn main() {
    env_logger::init();

    let n: usize = match env::args().nth(1).and_then(|arg| arg.parse().ok()) {
        Some(n) if n > 0 => n,
        _ => {
            eprintln!("Please specify the number of queens.");
            process::exit(1);
        }
    };

    let before = Instant::now();
    solve(n);
    println!("elapsed time:        {:?}", before.elapsed());
}
