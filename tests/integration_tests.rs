// Integration tests for the tcalc pipeline
//
// The suite harness drives expression-level cases through the direct
// evaluation path; the standalone tests below cover the postfix parser and
// the visualization evaluator.

use tcalc::error::{CalcError, ErrorKind};
use tcalc::evaluator;
use tcalc::lexer::Lexer;
use tcalc::parser::Parser;
use tcalc::value::Value;
use tcalc::visual::VisualStep;

/// What a single test case expects from evaluation.
#[derive(Debug, Clone)]
pub enum Expectation {
    /// Evaluation succeeds and the result displays as this string
    Value(&'static str),
    /// Evaluation fails with this error kind; optionally the message must
    /// contain the given text
    Error(ErrorKind, Option<&'static str>),
}

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
}

/// Individual test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub expectation: Expectation,
}

impl TestCase {
    pub fn evaluates_to(name: &str, input: &str, expected: &'static str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            expectation: Expectation::Value(expected),
        }
    }

    pub fn fails_with(name: &str, input: &str, kind: ErrorKind) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            expectation: Expectation::Error(kind, None),
        }
    }

    pub fn fails_with_message(
        name: &str,
        input: &str,
        kind: ErrorKind,
        message: &'static str,
    ) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            expectation: Expectation::Error(kind, Some(message)),
        }
    }
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Run all tests in this suite, returning the failures.
    pub fn run(&self) -> Vec<(String, String)> {
        let mut failures = Vec::new();

        println!("Running test suite: {}", self.name);

        for test in &self.tests {
            match run_single_test(test) {
                TestResult::Pass => println!("  ok {}", test.name),
                TestResult::Fail(msg) => {
                    println!("  FAIL {}: {}", test.name, msg);
                    failures.push((test.name.clone(), msg));
                }
            }
        }

        failures
    }
}

/// Evaluate through the full pipeline without the direct mode's
/// number-only restriction, so time-valued results can be asserted on.
fn evaluate_expression(input: &str) -> Result<Value, CalcError> {
    let mut lexer = Lexer::new(input.to_string());
    let tokens = lexer.scan_tokens()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse()?;
    evaluator::evaluate(&expr)
}

fn run_single_test(test: &TestCase) -> TestResult {
    let result = evaluate_expression(&test.input);

    match (&test.expectation, result) {
        (Expectation::Value(expected), Ok(value)) => {
            let rendered = value.to_string();
            if rendered == *expected {
                TestResult::Pass
            } else {
                TestResult::Fail(format!("expected '{}', got '{}'", expected, rendered))
            }
        }
        (Expectation::Value(expected), Err(error)) => TestResult::Fail(format!(
            "expected '{}', got error: {}",
            expected, error.message
        )),
        (Expectation::Error(kind, expected_msg), Err(error)) => {
            if std::mem::discriminant(kind) != std::mem::discriminant(&error.kind) {
                return TestResult::Fail(format!(
                    "expected {:?} error, got {:?}: {}",
                    kind, error.kind, error.message
                ));
            }
            if let Some(expected) = expected_msg {
                if !error.message.contains(expected) {
                    return TestResult::Fail(format!(
                        "error message '{}' doesn't contain '{}'",
                        error.message, expected
                    ));
                }
            }
            TestResult::Pass
        }
        (Expectation::Error(kind, _), Ok(value)) => TestResult::Fail(format!(
            "expected {:?} error, but evaluation succeeded with '{}'",
            kind, value
        )),
    }
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_arithmetic_tests() -> TestSuite {
    let mut suite = TestSuite::new("Arithmetic");

    suite.add_test(TestCase::evaluates_to("integer_literal", "42", "42"));
    suite.add_test(TestCase::evaluates_to("double_literal", "3.14", "3.14"));
    suite.add_test(TestCase::evaluates_to("precedence", "2 + 3 * 4", "14"));
    suite.add_test(TestCase::evaluates_to("grouping", "(2 + 3) * 4", "20"));
    suite.add_test(TestCase::evaluates_to("subtraction", "10 - 4 - 3", "3"));
    suite.add_test(TestCase::evaluates_to("unary_minus", "-5 + 8", "3"));
    suite.add_test(TestCase::evaluates_to("unary_plus", "+5", "5"));
    suite.add_test(TestCase::evaluates_to("double_negation", "1 -- 2", "3"));
    suite.add_test(TestCase::evaluates_to("mixed_unary", "1 +- 2", "-1"));

    // Unary minus applies to the result of the exponentiation
    suite.add_test(TestCase::evaluates_to("negate_power", "-2^2", "-4"));
    suite.add_test(TestCase::evaluates_to("power_right_assoc", "2^3^2", "512"));
    suite.add_test(TestCase::evaluates_to("negative_exponent", "2^-1", "0.5"));

    // Trimming: integral floating results collapse to integers
    suite.add_test(TestCase::evaluates_to("divide_exact", "6 / 3", "2"));
    suite.add_test(TestCase::evaluates_to("divide_fractional", "7 / 2", "3.5"));
    suite.add_test(TestCase::evaluates_to("multiply_trims", "2.5 * 2", "5"));
    suite.add_test(TestCase::evaluates_to("power_trims", "4^0.5", "2"));
    suite.add_test(TestCase::evaluates_to("addition_keeps_double", "1.5 + 1.5", "3.0"));

    suite
}

fn create_time_arithmetic_tests() -> TestSuite {
    let mut suite = TestSuite::new("Time Arithmetic");

    suite.add_test(TestCase::evaluates_to("time_literal", "43:21", "43:21"));
    suite.add_test(TestCase::evaluates_to(
        "time_literal_with_hours",
        "65:43:21",
        "65:43:21",
    ));
    suite.add_test(TestCase::evaluates_to(
        "time_addition",
        "65:43:21 + 10:00",
        "65:53:21",
    ));
    suite.add_test(TestCase::evaluates_to(
        "time_addition_carries_hours",
        "65:43:21 + 1:10:00",
        "66:53:21",
    ));
    suite.add_test(TestCase::evaluates_to(
        "time_seconds_carry_to_minutes",
        "0:59 + 0:01",
        "1:00",
    ));
    suite.add_test(TestCase::evaluates_to(
        "time_subtraction_negative",
        "10:00 - 65:43:21",
        "-65:33:21",
    ));
    suite.add_test(TestCase::evaluates_to("time_scaling", "10:00 * 3", "30:00"));
    suite.add_test(TestCase::evaluates_to(
        "time_scaling_commutes",
        "3 * 10:00",
        "30:00",
    ));
    suite.add_test(TestCase::evaluates_to("time_division", "10:00 / 2", "5:00"));
    suite.add_test(TestCase::evaluates_to(
        "time_minutes_carry_to_hours",
        "90:00 * 1",
        "1:30:00",
    ));
    suite.add_test(TestCase::evaluates_to(
        "time_division_drops_hours",
        "1:00:00 / 2",
        "30:00",
    ));
    suite.add_test(TestCase::evaluates_to("negate_time", "-10:00 + 10:00", "0:00"));
    suite.add_test(TestCase::evaluates_to(
        "time_fractional_scaling",
        "10:00 * 1.5",
        "15:00",
    ));

    suite
}

fn create_domain_mismatch_tests() -> TestSuite {
    let mut suite = TestSuite::new("Domain Mismatches");

    suite.add_test(TestCase::fails_with_message(
        "add_time_and_number",
        "10:00 + 5",
        ErrorKind::ArithmeticError,
        "Cannot add time and number",
    ));
    suite.add_test(TestCase::fails_with_message(
        "subtract_time_from_number",
        "5 - 10:00",
        ErrorKind::ArithmeticError,
        "Cannot subtract number and time",
    ));
    suite.add_test(TestCase::fails_with_message(
        "multiply_two_times",
        "10:00 * 10:00",
        ErrorKind::ArithmeticError,
        "Cannot multiply time and time",
    ));
    suite.add_test(TestCase::fails_with_message(
        "divide_by_time",
        "4 / 10:00",
        ErrorKind::ArithmeticError,
        "Cannot divide number by time",
    ));
    suite.add_test(TestCase::fails_with_message(
        "time_as_base",
        "10:00 ^ 2",
        ErrorKind::ArithmeticError,
        "not defined for time",
    ));
    suite.add_test(TestCase::fails_with_message(
        "time_as_exponent",
        "2 ^ 10:00",
        ErrorKind::ArithmeticError,
        "not defined for time",
    ));
    suite.add_test(TestCase::fails_with_message(
        "number_division_by_zero",
        "4 / 0",
        ErrorKind::ArithmeticError,
        "Division by zero",
    ));
    suite.add_test(TestCase::fails_with_message(
        "time_division_by_zero",
        "4:00 / 0",
        ErrorKind::ArithmeticError,
        "Division by zero",
    ));

    suite
}

fn create_lex_error_tests() -> TestSuite {
    let mut suite = TestSuite::new("Lex Errors");

    suite.add_test(TestCase::fails_with_message(
        "unknown_character",
        "2 + @",
        ErrorKind::LexError,
        "Unexpected character: '@'",
    ));
    suite.add_test(TestCase::fails_with(
        "multiple_dots",
        "3.14.159",
        ErrorKind::LexError,
    ));
    suite.add_test(TestCase::fails_with(
        "too_many_time_segments",
        "1:02:03:04",
        ErrorKind::LexError,
    ));
    suite.add_test(TestCase::fails_with(
        "lone_colon",
        "2 : 3",
        ErrorKind::LexError,
    ));

    suite
}

fn create_parse_error_tests() -> TestSuite {
    let mut suite = TestSuite::new("Parse Errors");

    suite.add_test(TestCase::fails_with_message(
        "empty_input",
        "",
        ErrorKind::ParseError,
        "Empty expression",
    ));
    suite.add_test(TestCase::fails_with_message(
        "only_whitespace",
        "   \t ",
        ErrorKind::ParseError,
        "Empty expression",
    ));
    suite.add_test(TestCase::fails_with_message(
        "unmatched_opening_paren",
        "(2 + 3",
        ErrorKind::ParseError,
        "Expected ')' after expression",
    ));
    suite.add_test(TestCase::fails_with_message(
        "unmatched_closing_paren",
        "2 + 3)",
        ErrorKind::ParseError,
        "Unexpected token ')'",
    ));
    suite.add_test(TestCase::fails_with_message(
        "empty_parentheses",
        "()",
        ErrorKind::ParseError,
        "Expected expression, found ')'",
    ));
    suite.add_test(TestCase::fails_with(
        "missing_right_operand",
        "2 +",
        ErrorKind::ParseError,
    ));
    suite.add_test(TestCase::fails_with_message(
        "missing_left_operand",
        "* 2",
        ErrorKind::ParseError,
        "Expected expression, found '*'",
    ));
    suite.add_test(TestCase::fails_with_message(
        "two_operands_in_a_row",
        "2 3",
        ErrorKind::ParseError,
        "Unexpected token '3' after expression",
    ));
    suite.add_test(TestCase::fails_with(
        "trailing_operator_in_group",
        "(2 +) * 3",
        ErrorKind::ParseError,
    ));

    suite
}

// ============================================================================
// Suite Runner
// ============================================================================

#[test]
fn comprehensive_calculator_tests() {
    let suites = vec![
        create_arithmetic_tests(),
        create_time_arithmetic_tests(),
        create_domain_mismatch_tests(),
        create_lex_error_tests(),
        create_parse_error_tests(),
    ];

    let mut all_failures = Vec::new();
    for suite in suites {
        all_failures.extend(suite.run());
    }

    assert!(
        all_failures.is_empty(),
        "{} test case(s) failed: {:?}",
        all_failures.len(),
        all_failures
    );
}

// ============================================================================
// Postfix Parser
// ============================================================================

fn postfix_strings(input: &str) -> Vec<String> {
    tcalc::parse_postfix(input)
        .expect("expression should parse")
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn postfix_orders_by_precedence() {
    assert_eq!(postfix_strings("2 + 3 * 4"), ["2", "3", "4", "*", "+"]);
}

#[test]
fn postfix_grouping_overrides_precedence() {
    assert_eq!(postfix_strings("(2 + 3) * 4"), ["2", "3", "+", "4", "*"]);
}

#[test]
fn postfix_power_is_right_associative() {
    assert_eq!(postfix_strings("2^3^2"), ["2", "3", "2", "^", "^"]);
}

#[test]
fn postfix_tags_unary_operators() {
    // Unary minus applies after the exponentiation
    assert_eq!(postfix_strings("-2^2"), ["2", "2", "^", "-₁"]);
    assert_eq!(postfix_strings("2 * -3"), ["2", "3", "-₁", "*"]);
    assert_eq!(postfix_strings("+5"), ["5", "+₁"]);
}

#[test]
fn postfix_rejects_the_same_inputs_as_the_direct_parser() {
    for input in ["", "(2 + 3", "2 + 3)", "2 +", "()", "2 3", "* 2"] {
        let result = tcalc::parse_postfix(input);
        assert!(
            matches!(result, Err(CalcError { kind: ErrorKind::ParseError, .. })),
            "expected parse error for '{}', got {:?}",
            input,
            result
        );
    }
}

// ============================================================================
// Visualization Evaluator
// ============================================================================

fn collect_steps(input: &str) -> Vec<Result<VisualStep, CalcError>> {
    tcalc::visualize(input)
        .expect("expression should parse")
        .collect()
}

#[test]
fn visual_steps_replay_the_postfix_sequence() {
    let steps = collect_steps("2 + 3 * 4");
    // Initial step + one per token + final result
    assert_eq!(steps.len(), 7);

    let steps: Vec<VisualStep> = steps.into_iter().map(|s| s.unwrap()).collect();

    // Initial step shows the sentinels and the whole input
    assert_eq!(steps[0].operation, None);
    assert_eq!(steps[0].stack.as_deref(), Some("$"));
    assert_eq!(steps[0].input.as_deref(), Some("2 3 4 * + $"));

    assert_eq!(steps[1].operation.as_deref(), Some("Stack 2"));
    assert_eq!(steps[3].operation.as_deref(), Some("Stack 4"));
    assert_eq!(steps[3].stack.as_deref(), Some("$ 2 3 4"));

    assert_eq!(steps[4].operation.as_deref(), Some("3 * 4 = 12"));
    assert_eq!(steps[4].stack.as_deref(), Some("$ 2 12"));
    assert_eq!(steps[4].input.as_deref(), Some("+ $"));

    assert_eq!(steps[5].operation.as_deref(), Some("2 + 12 = 14"));

    assert_eq!(steps[6].operation.as_deref(), Some("The result is 14"));
    assert_eq!(steps[6].stack, None);
    assert_eq!(steps[6].input, None);
}

#[test]
fn visual_final_step_renders_time_results() {
    let steps = collect_steps("10:00 * 3");
    let last = steps.last().unwrap().as_ref().unwrap().clone();
    assert_eq!(last.operation.as_deref(), Some("The result is 30:00"));
}

#[test]
fn visual_unary_step_describes_the_negation() {
    let steps: Vec<VisualStep> = collect_steps("-10:00")
        .into_iter()
        .map(|s| s.unwrap())
        .collect();
    assert_eq!(steps[2].operation.as_deref(), Some("-10:00 = -10:00"));
    assert_eq!(steps[3].operation.as_deref(), Some("The result is -10:00"));
}

#[test]
fn visual_power_step_has_no_spaces() {
    let steps: Vec<VisualStep> = collect_steps("2^3")
        .into_iter()
        .map(|s| s.unwrap())
        .collect();
    assert_eq!(steps[3].operation.as_deref(), Some("2^3 = 8"));
}

#[test]
fn visual_surfaces_arithmetic_errors_and_stops() {
    let steps = collect_steps("4 / 0");
    let last = steps.last().unwrap();
    match last {
        Err(error) => {
            assert!(matches!(error.kind, ErrorKind::ArithmeticError));
            assert!(error.message.contains("Division by zero"));
        }
        Ok(step) => panic!("expected an error step, got {:?}", step),
    }
}

// ============================================================================
// Direct Mode Contract
// ============================================================================

#[test]
fn direct_mode_returns_numbers() {
    assert_eq!(tcalc::calculate("2 + 3 * 4").unwrap(), Value::Int(14));
    assert_eq!(tcalc::calculate("7 / 2").unwrap(), Value::Double(3.5));
}

#[test]
fn direct_mode_rejects_time_results() {
    let result = tcalc::calculate("10:00 + 5:00");
    match result {
        Err(error) => {
            assert!(matches!(error.kind, ErrorKind::ArithmeticError));
            assert!(error.message.contains("time value"));
        }
        Ok(value) => panic!("expected rejection, got {}", value),
    }
}

#[test]
fn lexer_iterates_lazily() {
    // Tokens before the bad character are produced; the error arrives only
    // when the cursor reaches it
    let mut lexer = Lexer::new("1 + @".to_string());
    assert!(lexer.next().unwrap().is_ok());
    assert!(lexer.next().unwrap().is_ok());
    let third = lexer.next().unwrap();
    assert!(matches!(third, Err(CalcError { kind: ErrorKind::LexError, .. })));
}
