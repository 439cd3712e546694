use crate::error::CalcError;
use crate::evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::postfix::{PostfixParser, PostfixToken};
use crate::value::Value;
use crate::visual::VisualEvaluator;

/// Direct mode: lex, parse, and fold the expression into one number.
///
/// A top-level time result is rejected here; the direct use case's contract
/// is a number, and only the visualization path renders durations.
pub fn calculate(source: &str) -> Result<Value, CalcError> {
    let mut lexer = Lexer::new(source.to_string());
    let tokens = lexer.scan_tokens()?;

    let mut parser = Parser::new(tokens);
    let expr = parser.parse()?;

    let value = evaluator::evaluate(&expr)?;
    if value.is_time() {
        return Err(CalcError::arithmetic_error_with_help(
            expr.span().clone(),
            "Expression evaluates to a time value".to_string(),
            "Plain calculation prints a number. Run with --visualize to evaluate time results."
                .to_string(),
        ));
    }

    Ok(value)
}

/// Visualization front half: lex and reorder the expression into postfix.
pub fn parse_postfix(source: &str) -> Result<Vec<PostfixToken>, CalcError> {
    let mut lexer = Lexer::new(source.to_string());
    let tokens = lexer.scan_tokens()?;

    let mut parser = PostfixParser::new(tokens);
    parser.parse()
}

/// Build the step iterator for the visualization mode.
pub fn visualize(source: &str) -> Result<VisualEvaluator, CalcError> {
    Ok(VisualEvaluator::new(parse_postfix(source)?))
}

/// Run direct mode end to end, printing the result or reporting the error.
/// Returns false when the invocation failed.
pub fn run(source: &str, filename: Option<&str>, full_message: bool) -> bool {
    match calculate(source) {
        Ok(value) => {
            if full_message {
                println!("Result: {}", value);
            } else {
                println!("{}", value);
            }
            true
        }
        Err(error) => {
            error.report(source, filename);
            false
        }
    }
}

/// Run visualization mode end to end: print each step and call `ack`
/// between steps. The acknowledgment source is injected so the evaluator
/// never owns terminal concerns (and tests can pass a no-op).
pub fn run_visual<F: FnMut()>(
    source: &str,
    filename: Option<&str>,
    width: usize,
    mut ack: F,
) -> bool {
    let steps = match visualize(source) {
        Ok(steps) => steps,
        Err(error) => {
            error.report(source, filename);
            return false;
        }
    };

    for step in steps {
        match step {
            Ok(step) => {
                if let Some(ref operation) = step.operation {
                    println!("> {}", operation);
                }
                if let (Some(stack), Some(input)) = (step.stack, step.input) {
                    println!();
                    print_with_padding(&stack, &input, width);
                }
                ack();
            }
            Err(error) => {
                error.report(source, filename);
                return false;
            }
        }
    }

    true
}

/// Print the stack left-aligned and the remaining input right-aligned on
/// one line. Falls back to a two-space separator when the line overflows.
fn print_with_padding(left_side: &str, right_side: &str, width: usize) {
    let used = left_side.chars().count() + right_side.chars().count();
    if width > used {
        println!("{}{}{}", left_side, " ".repeat(width - used), right_side);
    } else {
        println!("{}  {}", left_side, right_side);
    }
}
