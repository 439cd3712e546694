use crate::ast::BinaryOp;
use crate::error::CalcError;
use crate::evaluator::{apply_binary, apply_unary};
use crate::postfix::{PostfixKind, PostfixToken};
use crate::value::Value;
use std::collections::VecDeque;

/// One evaluation action of the visualization: what happened, plus the
/// rendered operand stack and remaining postfix input after it happened.
/// The final step carries only the result line.
#[derive(Debug, Clone)]
pub struct VisualStep {
    pub operation: Option<String>,
    pub stack: Option<String>,
    pub input: Option<String>,
}

/// Replays a postfix token sequence against an explicit operand stack,
/// yielding one [`VisualStep`] per consumed token, plus an initial step
/// showing the starting state and a final step reporting the result.
///
/// The evaluator owns no IO; pacing between steps belongs to whoever pulls
/// the iterator.
pub struct VisualEvaluator {
    input: VecDeque<PostfixToken>,
    stack: Vec<Value>,
    started: bool,
    done: bool,
}

impl VisualEvaluator {
    pub fn new(postfix: Vec<PostfixToken>) -> Self {
        Self {
            input: postfix.into(),
            stack: Vec::new(),
            started: false,
            done: false,
        }
    }

    /// Stack rendered bottom-first, with the sentinel marker at the bottom.
    fn render_stack(&self) -> String {
        let mut parts = vec!["$".to_string()];
        parts.extend(self.stack.iter().map(ToString::to_string));
        parts.join(" ")
    }

    /// Remaining input rendered in consumption order, sentinel last.
    fn render_input(&self) -> String {
        let mut parts: Vec<String> = self.input.iter().map(ToString::to_string).collect();
        parts.push("$".to_string());
        parts.join(" ")
    }

    fn pop_operand(&mut self, token: &PostfixToken) -> Result<Value, CalcError> {
        self.stack.pop().ok_or_else(|| {
            CalcError::internal_error(
                token.span.clone(),
                format!("Operand stack underflow at '{}'", token),
            )
        })
    }

    fn step(&mut self) -> Result<VisualStep, CalcError> {
        let token = match self.input.pop_front() {
            Some(token) => token,
            None => {
                // Input exhausted: exactly one value must remain
                self.done = true;
                if self.stack.len() != 1 {
                    return Err(CalcError::internal_error(
                        crate::error::Span::single(0),
                        format!(
                            "Evaluation ended with {} values on the stack",
                            self.stack.len()
                        ),
                    ));
                }
                let result = self.stack.pop().unwrap();
                return Ok(VisualStep {
                    operation: Some(format!("The result is {}", result)),
                    stack: None,
                    input: None,
                });
            }
        };

        let operation = match token.kind {
            PostfixKind::Operand(value) => {
                self.stack.push(value);
                format!("Stack {}", value)
            }
            PostfixKind::Unary(op) => {
                let operand = self.pop_operand(&token)?;
                let result = apply_unary(op, operand, &token.span)?;
                self.stack.push(result);
                format!("{}{} = {}", op.symbol(), operand, result)
            }
            PostfixKind::Binary(op) => {
                // Second popped value is the left operand
                let right = self.pop_operand(&token)?;
                let left = self.pop_operand(&token)?;
                let result = apply_binary(op, left, right, &token.span)?;
                self.stack.push(result);
                if op == BinaryOp::Power {
                    format!("{}^{} = {}", left, right, result)
                } else {
                    format!("{} {} {} = {}", left, op, right, result)
                }
            }
        };

        Ok(VisualStep {
            operation: Some(operation),
            stack: Some(self.render_stack()),
            input: Some(self.render_input()),
        })
    }
}

impl Iterator for VisualEvaluator {
    type Item = Result<VisualStep, CalcError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            return Some(Ok(VisualStep {
                operation: None,
                stack: Some(self.render_stack()),
                input: Some(self.render_input()),
            }));
        }

        match self.step() {
            Ok(step) => Some(Ok(step)),
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
