use clap::{Parser, Subcommand};
use std::process;

use kaleido::{
    channel, compile, compose, evaluate, generate_batch, interpret, synthesize, Catalog, Program,
    RngStream, Tree,
};

#[derive(Parser)]
#[command(
    name = "kaleido",
    version,
    about = "Random expression programs for procedural art"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a batch of programs and print them
    Gen {
        /// Style name (built-in: classic, or styles/{name}.toml)
        #[arg(long, default_value = "classic")]
        style: String,
        /// Parent seed for the batch
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Operator nodes per tree
        #[arg(long, default_value_t = 15)]
        nodes: u32,
        /// Number of programs in the batch
        #[arg(long, default_value_t = 12)]
        count: usize,
    },
    /// Print one program's instruction stream
    Disasm {
        /// Style name (built-in: classic, or styles/{name}.toml)
        #[arg(long, default_value = "classic")]
        style: String,
        /// Seed (the batch's generation 0)
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Operator nodes per tree
        #[arg(long, default_value_t = 15)]
        nodes: u32,
        /// Also print the raw instruction words
        #[arg(long)]
        words: bool,
    },
    /// Evaluate one program at a pixel coordinate
    Eval {
        /// Style name (built-in: classic, or styles/{name}.toml)
        #[arg(long, default_value = "classic")]
        style: String,
        /// Seed (the batch's generation 0)
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Operator nodes per tree
        #[arg(long, default_value_t = 15)]
        nodes: u32,
        /// Pixel x coordinate
        #[arg(long, default_value_t = 0)]
        x: u32,
        /// Pixel y coordinate
        #[arg(long, default_value_t = 0)]
        y: u32,
        /// Cross-check the interpreter against the tree evaluator
        #[arg(long)]
        check: bool,
    },
    /// List a style's operators and input kinds
    Catalog {
        /// Style name (built-in: classic, or styles/{name}.toml)
        #[arg(long, default_value = "classic")]
        style: String,
    },
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Gen {
            style,
            seed,
            nodes,
            count,
        } => cmd_gen(&style, seed, nodes, count),
        Command::Disasm {
            style,
            seed,
            nodes,
            words,
        } => cmd_disasm(&style, seed, nodes, words),
        Command::Eval {
            style,
            seed,
            nodes,
            x,
            y,
            check,
        } => cmd_eval(&style, seed, nodes, x, y, check),
        Command::Catalog { style } => cmd_catalog(&style),
    }
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

// --- kaleido gen ---

fn cmd_gen(style: &str, seed: u64, nodes: u32, count: usize) {
    let catalog = resolve_style(style);
    let generations = match generate_batch(&catalog, seed, nodes, count) {
        Ok(generations) => generations,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    for (i, generation) in generations.iter().enumerate() {
        println!(
            "[{}] {}  ({} words, {} cells)",
            i,
            generation.program.digest(),
            generation.program.word_count(),
            generation.program.cell_count()
        );
        println!("    {}", generation.text);
    }
}

// --- kaleido disasm ---

fn cmd_disasm(style: &str, seed: u64, nodes: u32, words: bool) {
    let catalog = resolve_style(style);
    let (tree, program) = first_generation(&catalog, seed, nodes);

    match compose(&tree, &catalog) {
        Ok(text) => println!("; {}", text),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }

    match program.disassemble(&catalog) {
        Ok(listing) => print!("{}", listing),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }

    if words {
        let raw: Vec<String> = program.words().iter().map(u32::to_string).collect();
        println!("; {} words, {} cells", program.word_count(), program.cell_count());
        println!("; {}", raw.join(" "));
    }
}

// --- kaleido eval ---

fn cmd_eval(style: &str, seed: u64, nodes: u32, x: u32, y: u32, check: bool) {
    let catalog = resolve_style(style);
    let (tree, program) = first_generation(&catalog, seed, nodes);

    let mut rgb = [0u8; 3];
    for z in 0..3u32 {
        let value = match interpret(&program, &catalog, x, y, z) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        };

        if check {
            let reference = match evaluate(&tree, &catalog, x, y, z) {
                Ok(reference) => reference,
                Err(e) => {
                    eprintln!("error: {}", e);
                    process::exit(1);
                }
            };
            if reference != value {
                eprintln!(
                    "error: interpreter disagrees with evaluator at z={}: {} != {}",
                    z, value, reference
                );
                process::exit(1);
            }
        }

        rgb[z as usize] = channel(value);
    }

    println!("rgb({}, {}, {})", rgb[0], rgb[1], rgb[2]);
    if check {
        eprintln!("check OK: interpreter matches evaluator");
    }
}

// --- kaleido catalog ---

fn cmd_catalog(style: &str) {
    let catalog = resolve_style(style);

    println!("style: {}", catalog.name());
    println!("operators:");
    for op in catalog.operators() {
        println!(
            "  {:>4}  {:<4} arity {}  {}",
            op.opcode, op.kind, op.arity, op.template
        );
    }
    println!("inputs:");
    for input in catalog.inputs() {
        println!("  {:>4}  {}", input.opcode, input.symbol);
    }
}

// --- Helpers ---

fn resolve_style(name: &str) -> Catalog {
    match Catalog::resolve(name) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Build generation 0 for a seed, keeping the tree for reference use.
fn first_generation(catalog: &Catalog, seed: u64, nodes: u32) -> (Tree, Program) {
    let mut rng = RngStream::derive(seed, 0);
    let tree = match synthesize(catalog, &mut rng, nodes) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    let program = match compile(&tree, catalog) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    (tree, program)
}
