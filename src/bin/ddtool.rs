//! Decision diagram command line tool
//!
//! Loads a PLA file, builds one BDD per output function and reports on
//! them: node counts, satisfy counts or a Graphviz rendering.

use clap::{Parser, ValueEnum};
use mdd_logic::{DiagramManager, FoldType, PlaFile};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, PartialEq, ValueEnum)]
enum Command {
    /// Print node and satisfy counts per output function (default)
    Stats,
    /// Print the number of satisfying assignments per output function
    Count,
    /// Emit the diagrams in Graphviz dot format
    Dot,
}

#[derive(Debug, Clone, ValueEnum)]
enum Fold {
    /// Fold products left to right
    Left,
    /// Fold products pairwise
    Tree,
}

impl From<Fold> for FoldType {
    fn from(fold: Fold) -> Self {
        match fold {
            Fold::Left => FoldType::Left,
            Fold::Tree => FoldType::Tree,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ddtool")]
#[command(about = "Build and inspect decision diagrams from PLA files", long_about = None)]
#[command(version)]
struct Args {
    /// Input PLA file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Subcommand to execute
    #[arg(short = 'D', long = "do", value_enum, default_value = "stats")]
    command: Command,

    /// Terminal value counted by the count command
    #[arg(short = 'v', long = "value", default_value_t = 1)]
    value: u32,

    /// Fold strategy used when combining products
    #[arg(short = 'f', long = "fold", value_enum, default_value = "tree")]
    fold: Fold,

    /// Run a sifting pass before reporting
    #[arg(short = 's', long = "sift")]
    sift: bool,

    /// Node pool size
    #[arg(long = "pool-size", default_value_t = 1_000_000)]
    pool_size: usize,

    /// Output file (writes to stdout if not specified)
    #[arg(short = 'O', long = "out-file")]
    output_file: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let file = match PlaFile::from_file(&args.input) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("ddtool: {err}");
            process::exit(1);
        }
    };
    if !file.is_binary() {
        eprintln!("ddtool: multi-valued PLA files cannot be turned into BDDs");
        process::exit(1);
    }

    let manager = DiagramManager::bdd(file.input_count(), args.pool_size);
    let functions = manager.from_pla(&file, args.fold.clone().into());
    if args.sift {
        manager.sift_variables();
    }

    let mut out: Box<dyn Write> = match &args.output_file {
        Some(path) => match File::create(path) {
            Ok(created) => Box::new(BufWriter::new(created)),
            Err(err) => {
                eprintln!("ddtool: cannot create {}: {err}", path.display());
                process::exit(1);
            }
        },
        None => Box::new(io::stdout()),
    };

    if let Err(err) = run(&args, &file, &manager, &functions, &mut out) {
        eprintln!("ddtool: {err}");
        process::exit(1);
    }
}

fn run<W: Write>(
    args: &Args,
    file: &PlaFile,
    manager: &DiagramManager,
    functions: &[mdd_logic::Diagram],
    out: &mut W,
) -> io::Result<()> {
    match args.command {
        Command::Stats => {
            writeln!(
                out,
                "{} inputs, {} outputs, {} products",
                file.input_count(),
                file.output_count(),
                file.line_count()
            )?;
            writeln!(out, "manager holds {} unique nodes", manager.node_count())?;
            for (label, function) in file.output_labels().iter().zip(functions) {
                writeln!(
                    out,
                    "{label}: {} nodes, satisfy-count({}) = {}",
                    manager.node_count_of(function),
                    args.value,
                    manager.satisfy_count(args.value, function)
                )?;
            }
        }
        Command::Count => {
            for (label, function) in file.output_labels().iter().zip(functions) {
                writeln!(
                    out,
                    "{label} {}",
                    manager.satisfy_count(args.value, function)
                )?;
            }
        }
        Command::Dot => {
            manager.to_dot(out)?;
        }
    }
    Ok(())
}
