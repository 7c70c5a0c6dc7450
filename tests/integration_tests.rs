//! Integration tests for the lexiq query engine.
//!
//! These run whole queries through the public [`Engine`] API against a small
//! fixture lexicon and check the documented properties of each query kind.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use lexiq::errors::ParseError;
use lexiq::letters::{CONSONANTS, VOWELS};
use lexiq::solver::{format_match, SolveOptions, SolveResult, SolveStatus, SolverError};
use lexiq::{Engine, Lexicon, QueryKind};

const FIXTURE: &str = "tests/fixtures/test_lexicon.txt";

fn fixture_engine() -> Engine {
    Engine::load_from_path(FIXTURE).expect("Failed to read test lexicon")
}

fn engine_of(words: &str) -> Engine {
    Engine::new(Lexicon::parse_from_str(words))
}

/// A large synthetic lexicon for timing tests.
fn big_engine(options: SolveOptions) -> Engine {
    let words = (0..200_000).map(|i| format!("w{i:06}"));
    Engine::new(Lexicon::from_words(words)).with_options(options)
}

fn primaries(result: &SolveResult) -> Vec<&str> {
    result.matches.iter().map(|m| m.primary.as_str()).collect()
}

#[cfg(test)]
mod lexicon_loading {
    use super::*;

    #[test]
    fn test_fixture_is_normalized() {
        let engine = fixture_engine();
        let lexicon = engine.lexicon();
        // lines with spaces or punctuation are dropped
        assert_eq!(lexicon.len(), 34);
        assert!(!lexicon.contains("extra"));
        assert!(!lexicon.contains("o'clock"));
        assert!(lexicon.words().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_reload_replaces_lexicon() {
        let mut engine = engine_of("zebra");
        assert_eq!(engine.reload_from_path(FIXTURE).unwrap(), 34);
        assert!(engine.lexicon().contains("landform"));
        assert!(!engine.lexicon().contains("zebra"));
    }

    #[test]
    fn test_failed_reload_leaves_no_lexicon() {
        let mut engine = fixture_engine();
        assert!(engine.reload_from_path("tests/fixtures/missing.txt").is_err());
        let result = engine.solve("c*").unwrap();
        assert_eq!(result.status, SolveStatus::EmptyLexicon);
        assert!(result.is_empty());
    }
}

#[cfg(test)]
mod simple_patterns {
    use super::*;

    #[test]
    fn test_literal_is_exact_membership() {
        let engine = fixture_engine();
        for word in ["acid", "lands", "zebra", "catt"] {
            let result = engine.solve(word).unwrap();
            let expected: Vec<&str> = if engine.lexicon().contains(word) { vec![word] } else { vec![] };
            assert_eq!(primaries(&result), expected, "literal {word}");
            assert_eq!(result.status, SolveStatus::LexiconExhausted);
        }

        let prefixed = engine.solve("5:lands").unwrap();
        assert_eq!(primaries(&prefixed), ["lands"]);
    }

    #[test]
    fn test_vowel_and_consonant_classes() {
        let result = fixture_engine().solve("l@n#*").unwrap();
        assert_eq!(primaries(&result), ["landform", "lands", "links"]);
        for word in primaries(&result) {
            let chars: Vec<char> = word.chars().collect();
            assert!(VOWELS.contains(chars[1]), "{word}");
            assert!(CONSONANTS.contains(chars[3]), "{word}");
        }
    }

    #[test]
    fn test_star_and_dot() {
        let engine = fixture_engine();
        assert_eq!(primaries(&engine.solve("c*t").unwrap()), ["cart", "cast", "cat", "coat"]);
        assert_eq!(primaries(&engine.solve("c.t").unwrap()), ["cat"]);
        assert_eq!(primaries(&engine.solve("ca..").unwrap()), ["cart", "cast", "cats"]);

        // `*` alone matches every word; `*` inside may match nothing
        assert_eq!(engine.solve("*").unwrap().len(), engine.lexicon().len());
        assert_eq!(primaries(&engine.solve("cat*").unwrap()), ["cat", "cats"]);
    }

    #[test]
    fn test_length_range() {
        let engine = fixture_engine();
        let result = engine.solve("2-4:*").unwrap();
        let expected = engine.lexicon().words().iter().filter(|w| (2..=4).contains(&w.len())).count();
        assert_eq!(result.len(), expected);
        assert!(result.matches.iter().all(|m| (2..=4).contains(&m.primary.len())));
    }

    #[test]
    fn test_max_results() {
        let engine = fixture_engine().with_options(SolveOptions { max_results: Some(3), ..SolveOptions::default() });
        let result = engine.solve("*").unwrap();
        assert_eq!(primaries(&result), ["abba", "abbaabba", "able"]);
        assert_eq!(result.status, SolveStatus::FoundEnough);
    }

    #[test]
    fn test_intersection() {
        let result = fixture_engine().solve("c*;*t").unwrap();
        assert_eq!(result.kind, QueryKind::Intersection);
        assert_eq!(primaries(&result), ["cart", "cast", "cat", "coat"]);
    }
}

#[cfg(test)]
mod anagrams {
    use super::*;

    fn sorted_letters(word: &str) -> Vec<char> {
        let mut letters: Vec<char> = word.chars().collect();
        letters.sort_unstable();
        letters
    }

    #[test]
    fn test_exact_anagram() {
        let engine = fixture_engine();
        let result = engine.solve("/landform").unwrap();
        assert_eq!(result.kind, QueryKind::Anagram);
        assert_eq!(primaries(&result), ["landform"]);

        let result = engine.solve("/stressed").unwrap();
        assert_eq!(primaries(&result), ["desserts", "stressed"]);
        for word in primaries(&result) {
            assert_eq!(sorted_letters(word), sorted_letters("stressed"));
        }
    }

    #[test]
    fn test_anagram_with_extras() {
        let engine = fixture_engine();
        // one unknown letter
        assert_eq!(primaries(&engine.solve("/tac.").unwrap()), ["cart", "cast", "cats", "coat"]);
        // any number of extras
        let result = engine.solve("/tac*").unwrap();
        assert!(result.matches.iter().all(|m| {
            let word = &m.primary;
            word.len() >= 3 && ['t', 'a', 'c'].iter().all(|c| word.contains(*c))
        }));
        assert!(primaries(&result).contains(&"caste"));
    }
}

#[cfg(test)]
mod equations {
    use super::*;

    #[test]
    fn test_reverse_equation() {
        let result = fixture_engine().solve("A=(4:*);A~A").unwrap();
        assert_eq!(result.kind, QueryKind::Equation);
        assert_eq!(primaries(&result), ["abbaabba", "deeddeed", "noonnoon"]);
        for m in &result.matches {
            let a = m.bindings.get('A').unwrap();
            let reversed: String = a.chars().rev().collect();
            assert_eq!(m.primary, format!("{a}{reversed}"));
        }
    }

    #[test]
    fn test_mirror_companion() {
        let result = fixture_engine().solve("A=(3:*);~A").unwrap();
        let dog = result.matches.iter().find(|m| m.primary == "dog").unwrap();
        assert_eq!(dog.companion.as_deref(), Some("god"));
        assert_eq!(format_match(dog), "dog / god    (A=god)");

        let cat = result.matches.iter().find(|m| m.primary == "cat").unwrap();
        assert_eq!(cat.companion, None);
    }

    #[test]
    fn test_composite_with_secondary() {
        // A word whose halves swapped also form a word
        let result = engine_of("reward\ndrawer\nwardre\ntest").solve("A=(2:*);B=(4:*);AB;BA").unwrap();
        let found: Vec<_> = result.matches.iter().map(|m| (m.primary.as_str(), m.companion.as_deref())).collect();
        assert_eq!(found, [("reward", Some("wardre"))]);
    }

    #[test]
    fn test_idempotent() {
        let engine = fixture_engine();
        for query in ["A=(4:*);A~A", "/stressed", "c*;*t", "l@n#*"] {
            let first = engine.solve(query).unwrap().matches;
            let second = engine.solve(query).unwrap().matches;
            assert_eq!(first, second, "{query}");
        }
    }

    #[test]
    fn test_undefined_variable_fails() {
        let err = fixture_engine().solve("A=(3:*);AB").unwrap_err();
        match err {
            SolverError::ParseFailure(pe) => {
                assert!(matches!(*pe, ParseError::UndefinedVariableReference { var: 'B', .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_definition_only() {
        let result = fixture_engine().solve("A=(3:*);B=(2:*)").unwrap();
        assert_eq!(result.kind, QueryKind::DefinitionOnly);
        assert_eq!(result.status, SolveStatus::DefinitionOnly);
        assert!(result.is_empty());
    }

    #[test]
    fn test_bad_definition_is_a_diagnostic() {
        let result = fixture_engine().solve("A=(5-3:*);c*t").unwrap();
        assert_eq!(result.kind, QueryKind::Simple);
        assert_eq!(result.len(), 4);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code(), "E012");
    }

    #[test]
    fn test_empty_lexicon() {
        let result = Engine::default().solve("A=(4:*);A~A").unwrap();
        assert_eq!(result.status, SolveStatus::EmptyLexicon);
        assert!(result.is_empty());
    }
}

#[cfg(test)]
mod qat_queries {
    use super::*;

    #[test]
    fn test_combination_exists_in_lexicon() {
        let engine = engine_of("cat\nat\nc");
        let result = engine.solve_qat("A=(1-3:*);B=(1-3:*);AB").unwrap();
        assert_eq!(result.matches.len(), 1);

        let m = &result.matches[0];
        assert_eq!(m.combined, "cat");
        assert_eq!(m.segments.get('A'), Some("c"));
        assert_eq!(m.segments.get('B'), Some("at"));
        assert_eq!(m.words, ["c", "at"]);
        assert!(engine.lexicon().contains(&m.combined));
    }

    #[test]
    fn test_combination_property_on_fixture() {
        let engine = fixture_engine();
        let result = engine.solve_qat("A=(1-3:*);B=(1-3:*);AB").unwrap();
        assert!(!result.matches.is_empty());
        for m in &result.matches {
            let a = m.segments.get('A').unwrap();
            let b = m.segments.get('B').unwrap();
            assert_eq!(m.combined, format!("{a}{b}"));
            assert!(engine.lexicon().contains(&m.combined));
        }
    }

    #[test]
    fn test_batch() {
        let engine = engine_of("cat\nat\nc");
        let batch = engine.solve_qat_batch("A=(1:*);B=(2:*);AB - A=(1:*);AA -  ");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].1.as_ref().unwrap().matches.len(), 1);
        assert!(batch[1].1.as_ref().unwrap().matches.is_empty());
    }

    #[test]
    fn test_no_steps() {
        let err = fixture_engine().solve_qat("A=(3:*)").unwrap_err();
        assert!(matches!(err, SolverError::NoSteps));
        assert_eq!(err.code(), "S002");
    }
}

#[cfg(test)]
mod timeouts {
    use super::*;

    #[test]
    fn test_cooperative_timeout_returns_promptly() {
        let engine = big_engine(SolveOptions { timeout: Some(Duration::ZERO), ..SolveOptions::default() });
        let start = Instant::now();
        let result = engine.solve("*5*").unwrap();
        assert!(matches!(result.status, SolveStatus::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_qat_timeout() {
        let engine = big_engine(SolveOptions { timeout: Some(Duration::ZERO), ..SolveOptions::default() });
        let result = engine.solve_qat("A=(3:*);B=(4:*);AB").unwrap();
        assert!(matches!(result.status, SolveStatus::TimedOut { .. }));
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_isolated_deadline() {
        let engine = big_engine(SolveOptions { timeout: Some(Duration::from_nanos(1)), ..SolveOptions::default() });
        let err = engine.solve_isolated("*1*2*3*").unwrap_err();
        assert!(matches!(err, SolverError::Timeout { .. }));
        assert_eq!(err.code(), "S003");
    }

    #[test]
    fn test_parallel_scan_agrees() {
        let sequential = big_engine(SolveOptions::default());
        let parallel = big_engine(SolveOptions { parallel: true, ..SolveOptions::default() });
        let a: BTreeSet<String> = sequential.solve("w1*7").unwrap().matches.into_iter().map(|m| m.primary).collect();
        let b: Vec<String> = parallel.solve("w1*7").unwrap().matches.into_iter().map(|m| m.primary).collect();
        assert_eq!(b.len(), a.len());
        assert_eq!(b.into_iter().collect::<BTreeSet<_>>(), a);
    }
}
