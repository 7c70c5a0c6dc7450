//! Word-puzzle query engine.
//!
//! Two query languages run over a [`Lexicon`]:
//!
//! - the equation DSL ([`solver::solve_query`]): wildcard patterns, anagrams,
//!   intersections of several `;`-separated patterns, and variable equations
//!   such as `A=(3-5:*);A~A`;
//! - the segment DSL ([`qat::solve_qat`]): per-variable filter steps followed
//!   by a combination step, e.g. `A=(3:*);B=(2:*);AB`.
//!
//! [`Engine`] bundles a lexicon, a shared pattern cache and [`SolveOptions`].

pub mod bindings;
pub mod engine;
pub mod errors;
pub mod letters;
pub mod lexicon;
pub mod log;
pub mod parser;
pub mod qat;
mod scan;
pub mod solver;
pub mod supervisor;
pub mod wildcard;

pub use bindings::Bindings;
pub use engine::Engine;
pub use errors::ParseError;
pub use lexicon::Lexicon;
pub use qat::{QatMatch, QatResult};
pub use solver::{Match, QueryKind, SolveOptions, SolveResult, SolveStatus, SolverError};
