//! `bench_local.rs`: quick local timing runner (no Criterion)
//!
//! Loads the lexicon once, then runs each query several times and reports the
//! median. Equation queries and QAT queries are timed side by side.
//!
//! - Optimized build:          `cargo run --bin bench_local --release -- -l words.txt`
//! - Multiple repeats:         `cargo run --bin bench_local --release -- -l words.txt -r 5`
//! - Print a few results:      `cargo run --bin bench_local --release -- -l words.txt -p 5`
//! - Compare with rayon scans: `cargo run --bin bench_local --release -- -l words.txt --parallel`
//!
//! Printing is kept outside the timed section, and one untimed warm-up run
//! fills the pattern cache before the repeats.

use std::hint::black_box;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use lexiq::qat::format_qat_match;
use lexiq::solver::{format_match, SolveOptions};
use lexiq::{Engine, SolverError};

/// Local benchmark runner: load the lexicon once, time several queries.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the lexicon file (one word per line)
    #[arg(short, long, default_value = "words.txt")]
    lexicon: PathBuf,

    /// Number of repeats per query (median is reported)
    #[arg(short = 'r', long = "repeats", default_value_t = 1)]
    num_repeats: usize,

    /// Print up to this many results per query (0 = print none)
    #[arg(short = 'p', long = "print", default_value_t = 0)]
    print_limit: usize,

    /// Scan large candidate lists on all cores
    #[arg(long)]
    parallel: bool,
}

/// Every query asks for this many results so runs stay comparable.
const NUM_RESULTS: usize = 100;

const MAX_QUERY_LEN: usize = 40;

#[derive(Clone, Copy)]
enum Dsl {
    Equation,
    Qat,
}

#[derive(Clone, Copy)]
struct Case {
    query: &'static str,
    dsl: Dsl,
}

fn get_cases() -> Vec<Case> {
    vec![
        Case { query: "l*x", dsl: Dsl::Equation },
        Case { query: "5:l@n#*", dsl: Dsl::Equation },
        Case { query: "/landform", dsl: Dsl::Equation },
        Case { query: "/ab.*", dsl: Dsl::Equation },
        Case { query: "c*;*t", dsl: Dsl::Equation },
        Case { query: "A=(4:*);A~A", dsl: Dsl::Equation },
        Case { query: "A=(3:*);B=(3:*);AB;BA", dsl: Dsl::Equation },
        Case { query: "A=(3:*);B=(2:*);AB", dsl: Dsl::Qat },
        Case { query: "A=(2-4:*);B=(2-4:*);reA;B;AB.", dsl: Dsl::Qat },
    ]
}

/// Robust central tendency for small samples.
fn median(mut xs: Vec<f64>) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(f64::total_cmp);
    let n = xs.len();
    if n % 2 == 1 { xs[n / 2] } else { 0.5 * (xs[n / 2 - 1] + xs[n / 2]) }
}

/// Solve once, returning the printable results.
fn run_case(engine: &Engine, case: Case) -> Result<Vec<String>, SolverError> {
    match case.dsl {
        Dsl::Equation => Ok(engine.solve(black_box(case.query))?.matches.iter().map(format_match).collect()),
        Dsl::Qat => Ok(engine.solve_qat(black_box(case.query))?.matches.iter().map(format_qat_match).collect()),
    }
}

fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    eprintln!("Loading lexicon from: {}", cli.lexicon.display());
    let t_load = Instant::now();
    let engine = Engine::load_from_path(&cli.lexicon)?.with_options(SolveOptions {
        max_results: Some(NUM_RESULTS),
        parallel: cli.parallel,
        ..SolveOptions::default()
    });
    eprintln!("Loaded {} words in {:.3}s", engine.lexicon().len(), t_load.elapsed().as_secs_f64());

    let mut summary: Vec<(&str, f64, usize)> = Vec::new();

    for (idx, case) in get_cases().into_iter().enumerate() {
        eprintln!("\n[{:02}] {}", idx + 1, case.query);

        if let Err(e) = run_case(&engine, case) {
            eprintln!("  ✗ Warm-up failed: {}", e.display_detailed());
            continue;
        }

        let mut times = Vec::with_capacity(cli.num_repeats);
        let mut last = Vec::new();
        for rep in 0..cli.num_repeats {
            let t_solve = Instant::now();
            let results = match run_case(&engine, case) {
                Ok(results) => results,
                Err(e) => {
                    eprintln!("  ✗ Run {}/{} failed: {e}", rep + 1, cli.num_repeats);
                    continue;
                }
            };
            let secs = t_solve.elapsed().as_secs_f64();
            times.push(secs);
            last = results;
            eprintln!("  run {:>2}/{:>2}: {secs:.3}s ({} results)", rep + 1, cli.num_repeats, last.len());
        }

        let med = median(times);
        for line in last.iter().take(cli.print_limit) {
            println!("{line}");
        }
        eprintln!("  → median {med:.3}s over {} run(s); {} {}", cli.num_repeats, last.len(), pluralize(last.len(), "result"));
        summary.push((case.query, med, last.len()));
    }

    eprintln!("\n==== Summary ====");
    eprintln!("{:<MAX_QUERY_LEN$} | {:>10} | {:>9}", "query", "median (s)", "# results");
    eprintln!("{:-<MAX_QUERY_LEN$}-+-{:-<10}-+-{:-<9}", "", "", "");
    for (query, med, count) in &summary {
        let display = if query.chars().count() > MAX_QUERY_LEN {
            format!("{}…", query.chars().take(MAX_QUERY_LEN - 1).collect::<String>())
        } else {
            (*query).to_string()
        };
        eprintln!("{display:<MAX_QUERY_LEN$} | {med:>10.3} | {count:>9}");
    }

    Ok(())
}

fn pluralize(count: usize, singular: &str) -> String {
    if count == 1 { singular.to_string() } else { format!("{singular}s") }
}
