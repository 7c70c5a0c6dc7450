use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

use lexiq::qat::format_qat_match;
use lexiq::solver::{format_match, SolveOptions, SolveStatus, SolverError};
use lexiq::{Engine, ParseError};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("LEXIQ_GIT_HASH"), ")");

/// Word-puzzle query engine
#[derive(Parser, Debug)]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
struct Cli {
    /// The query to solve (e.g., "A=(3-5:*);A~A" or "l@n#*")
    query: String,

    /// Path to the lexicon file (one word per line)
    #[arg(short, long, default_value = "words.txt")]
    lexicon: PathBuf,

    /// Treat the query as a QAT segment query; " - " separates a batch
    #[arg(long)]
    qat: bool,

    /// Time limit in seconds (0 disables it)
    #[arg(short, long, default_value_t = 120)]
    timeout: u64,

    /// Maximum number of results to return
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// Scan large candidate lists on all cores
    #[arg(long)]
    parallel: bool,
}

impl Cli {
    fn options(&self) -> SolveOptions {
        SolveOptions {
            timeout: (self.timeout > 0).then(|| Duration::from_secs(self.timeout)),
            max_results: self.max_results,
            parallel: self.parallel,
            ..SolveOptions::default()
        }
    }
}

fn main() -> ExitCode {
    lexiq::log::init_logger(lexiq::log::debug_from_env());

    if let Err(e) = try_main() {
        if let Some(solver_err) = e.downcast_ref::<SolverError>() {
            eprintln!("Error: {}", solver_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Load the lexicon, solve, print matches on stdout and timings on stderr.
fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let t_load = Instant::now();
    let engine = Engine::load_from_path(&cli.lexicon)
        .map_err(|e| format!("cannot read lexicon {}: {e}", cli.lexicon.display()))?
        .with_options(cli.options());
    let load_secs = t_load.elapsed().as_secs_f64();

    let t_solve = Instant::now();
    let count = if cli.qat { run_qat(&engine, &cli.query)? } else { run_equation(&engine, &cli.query)? };
    let solve_secs = t_solve.elapsed().as_secs_f64();

    eprintln!(
        "Loaded {} words in {:.3}s; solved in {:.3}s ({} results).",
        engine.lexicon().len(),
        load_secs,
        solve_secs,
        count
    );
    Ok(())
}

fn run_equation(engine: &Engine, query: &str) -> Result<usize, SolverError> {
    let result = engine.solve_isolated(query)?;
    log::debug!("solved as {} query", result.kind);

    for m in &result.matches {
        println!("{}", format_match(m));
    }
    report_diagnostics(&result.diagnostics);
    report_status(&result.status, result.len(), engine.options().max_results);
    Ok(result.len())
}

fn run_qat(engine: &Engine, input: &str) -> Result<usize, SolverError> {
    let queries: Vec<&str> = input.split(lexiq::qat::BATCH_SEPARATOR).map(str::trim).filter(|q| !q.is_empty()).collect();
    if queries.len() == 1 {
        let result = engine.solve_qat_isolated(queries[0])?;
        for m in &result.matches {
            println!("{}", format_qat_match(m));
        }
        report_diagnostics(&result.diagnostics);
        report_status(&result.status, result.matches.len(), engine.options().max_results);
        return Ok(result.matches.len());
    }

    let mut total = 0;
    for (query, outcome) in engine.solve_qat_batch(input) {
        println!("# {query}");
        match outcome {
            Ok(result) => {
                for m in &result.matches {
                    println!("{}", format_qat_match(m));
                }
                report_diagnostics(&result.diagnostics);
                report_status(&result.status, result.matches.len(), engine.options().max_results);
                total += result.matches.len();
            }
            // one bad query does not sink the batch
            Err(e) => eprintln!("Error in {query:?}: {}", e.display_detailed()),
        }
    }
    Ok(total)
}

fn report_diagnostics(diagnostics: &[ParseError]) {
    for d in diagnostics {
        eprintln!("warning: {}", d.display_detailed());
    }
}

fn report_status(status: &SolveStatus, found: usize, requested: Option<usize>) {
    match status {
        SolveStatus::TimedOut { elapsed } => {
            eprintln!("⚠️  Timed out after {:.1}s; some results may not have been returned", elapsed.as_secs_f64());
        }
        SolveStatus::FoundEnough => {
            let requested = requested.unwrap_or(found);
            eprintln!("✓ Stopped after finding {found}/{requested} requested results");
        }
        SolveStatus::LexiconExhausted => eprintln!("✓ Lexicon exhausted (no more results)"),
        SolveStatus::DefinitionOnly => eprintln!("✓ Query only defines variables; nothing to solve"),
        SolveStatus::EmptyLexicon => eprintln!("⚠️  Lexicon is empty"),
    }
}
