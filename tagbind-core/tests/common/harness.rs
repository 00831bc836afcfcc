//! Test harness for running fixture cases with stochastic variations

use crate::common::{Gen, TestCase};
use tagbind_core::{Error, EventReader, StructEvent};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: Vec<u8>,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub seed: u64,
    pub errors: Vec<String>,
}

/// Format one event for comparison (no spans). Attributes become
/// separate `Attribute "key=value"` entries after their ElementStart.
pub fn format_event(event: &StructEvent<'_>) -> Vec<String> {
    match event {
        StructEvent::DocumentStart => vec!["DocumentStart".to_string()],
        StructEvent::ElementStart {
            name, attributes, ..
        } => {
            let mut out = vec![format!("ElementStart {:?}", name)];
            for attr in attributes {
                out.push(format!("Attribute {:?}", format!("{}={}", attr.name, attr.value)));
            }
            out
        }
        StructEvent::Characters { text, .. } => vec![format!("Characters {:?}", text)],
        StructEvent::ElementEnd { name, .. } => vec![format!("ElementEnd {:?}", name)],
        StructEvent::DocumentEnd => vec!["DocumentEnd".to_string()],
    }
}

/// Variant name of an error, as written in fixtures.
pub fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::MalformedMarkup { .. } => "MalformedMarkup",
        Error::UnbalancedElement { .. } => "UnbalancedElement",
        Error::UnexpectedEof { .. } => "UnexpectedEof",
        Error::InvalidDocumentStructure { .. } => "InvalidDocumentStructure",
        Error::MissingRequiredField { .. } => "MissingRequiredField",
        Error::FieldDecodeError { .. } => "FieldDecodeError",
        Error::DuplicateField { .. } => "DuplicateField",
        Error::UnknownField { .. } => "UnknownField",
        Error::UnknownSchema(_) => "UnknownSchema",
        Error::Io(_) => "Io",
    }
}

/// Collect formatted events up to the first error.
pub fn collect_events(input: &[u8]) -> (Vec<String>, Option<Error>) {
    let mut events = Vec::new();
    for event in EventReader::new(input) {
        match event {
            Ok(event) => events.extend(format_event(&event)),
            Err(err) => return (events, Some(err)),
        }
    }
    (events, None)
}

fn check(case: &TestCase, input: Vec<u8>, seed: u64) -> TestResult {
    let (actual, err) = collect_events(&input);
    let expected: Vec<String> = case.events.iter().map(|e| e.format()).collect();
    let mut errors = Vec::new();

    match (&case.error, &err) {
        (None, None) => {}
        (None, Some(err)) => errors.push(format!("Unexpected error: {}", err)),
        (Some(kind), None) => errors.push(format!("Expected {} but parse succeeded", kind)),
        (Some(kind), Some(err)) if kind != error_kind(err) => {
            errors.push(format!("Expected {}, got {}", kind, err))
        }
        (Some(_), Some(_)) => {}
    }

    // Error cases with no listed events only check the error kind
    if case.error.is_none() || !expected.is_empty() {
        if actual.len() != expected.len() {
            errors.push(format!(
                "Event count mismatch: expected {}, got {}",
                expected.len(),
                actual.len()
            ));
        }
        for (i, (act, exp)) in actual.iter().zip(expected.iter()).enumerate() {
            if act != exp {
                errors.push(format!("Event {}: expected '{}', got '{}'", i, exp, act));
            }
        }
    }

    TestResult {
        passed: errors.is_empty(),
        input,
        expected,
        actual,
        seed,
        errors,
    }
}

/// Run a single test case (canonical, no variations)
pub fn run_test(case: &TestCase) -> TestResult {
    check(case, case.input.as_bytes().to_vec(), 0)
}

/// Run test with stochastic variations
///
/// Wraps the case in a random prolog (XML declaration, comments, DOCTYPE,
/// blank lines) and epilog (comments, whitespace). Neither produces events,
/// so the expected events are unchanged.
pub fn run_with_variations(case: &TestCase, gen: &mut Gen) -> TestResult {
    let mut input = Vec::new();
    input.extend(gen.prolog());
    input.extend(case.input.as_bytes());
    input.extend(gen.epilog());
    check(case, input, gen.seed)
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!("Seed: {} (set TAGBIND_TEST_SEED={} to reproduce)", self.seed, self.seed);
        eprintln!("\nInput:");
        eprintln!("{}", String::from_utf8_lossy(&self.input));
        eprintln!("\nExpected events:");
        for (i, e) in self.expected.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nActual events:");
        for (i, e) in self.actual.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
