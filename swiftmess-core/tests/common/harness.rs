//! Test harness for running fixture cases with stochastic variations

use crate::common::{Gen, TestCase};
use swiftmess_core::{Error, Item, Tokenizer};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: String,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub seed: u64,
    pub errors: Vec<String>,
}

/// Tokenize `input`, returning the formatted items and the name of the
/// error code the tokenizer stopped with, if any.
pub fn collect_items(input: &str) -> (Vec<String>, Option<String>) {
    let mut items = Vec::new();
    for result in Tokenizer::from_text(input) {
        match result {
            Ok(item) => items.push(item.to_string()),
            Err(Error::Parse(error)) => return (items, Some(format!("{:?}", error.code))),
            Err(error) => return (items, Some(error.to_string())),
        }
    }
    (items, None)
}

/// Format items the way fixtures spell them
pub fn format_items(items: &[Item]) -> Vec<String> {
    items.iter().map(Item::to_string).collect()
}

/// Run a single test case (canonical, no variations)
pub fn run_test(case: &TestCase) -> TestResult {
    let (actual, error) = collect_items(&case.input);
    let expected = case.items.clone();

    let mut errors = Vec::new();

    if actual.len() != expected.len() {
        errors.push(format!(
            "Item count mismatch: expected {}, got {}",
            expected.len(),
            actual.len()
        ));
    }

    for (i, (act, exp)) in actual.iter().zip(expected.iter()).enumerate() {
        if act != exp {
            errors.push(format!("Item {}: expected '{}', got '{}'", i, exp, act));
        }
    }

    if error != case.error {
        errors.push(format!("Error: expected {:?}, got {:?}", case.error, error));
    }

    TestResult {
        passed: errors.is_empty(),
        input: case.input.clone(),
        expected,
        actual,
        seed: 0,
        errors,
    }
}

/// Run a well-formed test case with stochastic variations
///
/// Applies independent variations:
/// - 40% chance of generated messages before the case
/// - 30% chance of CRLF line endings
/// - 40% chance of generated messages after the case, if it ends a message
pub fn run_with_variations(case: &TestCase, gen: &mut Gen) -> TestResult {
    let mut input = String::new();

    if gen.chance(0.4) {
        for _ in 0..1 + gen.geometric(0.5) {
            input.push_str(&gen.message_text());
        }
    }

    if gen.chance(0.3) {
        input.push_str(&case.input.replace('\n', "\r\n"));
    } else {
        input.push_str(&case.input);
    }

    if (case.input.is_empty() || case.input.ends_with('\n')) && gen.chance(0.4) {
        for _ in 0..1 + gen.geometric(0.5) {
            input.push_str(&gen.message_text());
        }
    }

    let (actual, error) = collect_items(&input);
    let expected = case.items.clone();

    // Surrounding messages add items, so the case's items only have to
    // appear in order.
    let mut errors = Vec::new();
    let mut exp_idx = 0;

    for act in &actual {
        if exp_idx < expected.len() && act == &expected[exp_idx] {
            exp_idx += 1;
        }
    }

    if exp_idx < expected.len() {
        errors.push(format!(
            "Missing expected items starting at index {}: {:?}",
            exp_idx,
            &expected[exp_idx..]
        ));
    }

    if let Some(error) = error {
        errors.push(format!("Unexpected error: {}", error));
    }

    TestResult {
        passed: errors.is_empty(),
        input,
        expected,
        actual,
        seed: gen.seed,
        errors,
    }
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!("Seed: {} (set SWIFTMESS_TEST_SEED={} to reproduce)", self.seed, self.seed);
        eprintln!("\nInput:");
        eprintln!("{:?}", self.input);
        eprintln!("\nExpected items:");
        for (i, e) in self.expected.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nActual items:");
        for (i, e) in self.actual.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
