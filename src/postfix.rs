use crate::ast::{BinaryOp, UnaryOp};
use crate::error::{CalcError, Span};
use crate::lexer::{Token, TokenType};
use crate::parser::literal_value;
use crate::value::Value;
use std::fmt;

/// One unit of a postfix (Reverse Polish) expression. Operands carry their
/// typed value; unary operators keep a distinct identity from binary ones
/// so the stack machine never has to guess arity.
#[derive(Debug, Clone)]
pub struct PostfixToken {
    pub kind: PostfixKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy)]
pub enum PostfixKind {
    Operand(Value),
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl fmt::Display for PostfixToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            PostfixKind::Operand(value) => write!(f, "{}", value),
            PostfixKind::Binary(op) => write!(f, "{}", op),
            // Subscript marks the operator as unary in the visualization
            PostfixKind::Unary(UnaryOp::Identity) => write!(f, "+₁"),
            PostfixKind::Unary(UnaryOp::Negate) => write!(f, "-₁"),
        }
    }
}

/// Operator pending on the shunting-yard stack.
enum Pending {
    Unary(UnaryOp, Span),
    Binary(BinaryOp, Span),
    LeftParen(Span),
}

impl Pending {
    fn precedence(&self) -> u8 {
        match self {
            Pending::LeftParen(_) => 0,
            Pending::Binary(BinaryOp::Add | BinaryOp::Subtract, _) => 1,
            Pending::Binary(BinaryOp::Multiply | BinaryOp::Divide, _) => 2,
            Pending::Unary(..) => 3,
            Pending::Binary(BinaryOp::Power, _) => 4,
        }
    }
}

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Add | BinaryOp::Subtract => 1,
        BinaryOp::Multiply | BinaryOp::Divide => 2,
        BinaryOp::Power => 4,
    }
}

/// Shunting-yard parser for the visualization path. Same grammar and
/// precedence as [`crate::parser::Parser`], but instead of reducing it
/// reorders the tokens into postfix form.
pub struct PostfixParser {
    tokens: Vec<Token>,
    current: usize,
}

impl PostfixParser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> Result<Vec<PostfixToken>, CalcError> {
        let mut output: Vec<PostfixToken> = Vec::new();
        let mut pending: Vec<Pending> = Vec::new();
        // True whenever the grammar expects an operand next; this is what
        // disambiguates unary from binary '+'/'-'
        let mut expect_operand = true;

        while !self.is_at_end() {
            let token = self.advance().clone();

            match token.token_type {
                TokenType::Eof => unreachable!(),

                TokenType::Number | TokenType::Time => {
                    if !expect_operand {
                        return Err(CalcError::parse_error_with_help(
                            token.span,
                            format!("Unexpected token '{}' after expression", token.lexeme),
                            "Two operands in a row. Check for a missing operator.".to_string(),
                        ));
                    }
                    let value = literal_value(&token)?;
                    output.push(PostfixToken {
                        kind: PostfixKind::Operand(value),
                        span: token.span,
                    });
                    expect_operand = false;
                }

                TokenType::Plus | TokenType::Minus => {
                    let is_minus = token.token_type == TokenType::Minus;
                    if expect_operand {
                        // Prefix position: unary. Never flushes the stack,
                        // prefix operators are right-associative.
                        let op = if is_minus {
                            UnaryOp::Negate
                        } else {
                            UnaryOp::Identity
                        };
                        pending.push(Pending::Unary(op, token.span));
                    } else {
                        let op = if is_minus {
                            BinaryOp::Subtract
                        } else {
                            BinaryOp::Add
                        };
                        self.flush_pending(&mut output, &mut pending, op);
                        pending.push(Pending::Binary(op, token.span));
                        expect_operand = true;
                    }
                }

                TokenType::Star | TokenType::Slash | TokenType::Caret => {
                    if expect_operand {
                        return Err(CalcError::parse_error_with_help(
                            token.span,
                            format!("Expected expression, found '{}'", token.lexeme),
                            "This operator needs a left operand.".to_string(),
                        ));
                    }
                    let op = match token.token_type {
                        TokenType::Star => BinaryOp::Multiply,
                        TokenType::Slash => BinaryOp::Divide,
                        TokenType::Caret => BinaryOp::Power,
                        _ => unreachable!(),
                    };
                    self.flush_pending(&mut output, &mut pending, op);
                    pending.push(Pending::Binary(op, token.span));
                    expect_operand = true;
                }

                TokenType::LeftParen => {
                    if !expect_operand {
                        return Err(CalcError::parse_error_with_help(
                            token.span,
                            "Unexpected '(' after expression".to_string(),
                            "Check for a missing operator before the parenthesis.".to_string(),
                        ));
                    }
                    pending.push(Pending::LeftParen(token.span));
                }

                TokenType::RightParen => {
                    if expect_operand {
                        return Err(CalcError::parse_error_with_help(
                            token.span,
                            "Expected expression, found ')'".to_string(),
                            "Parentheses must contain an expression.".to_string(),
                        ));
                    }
                    // Flush back to the matching opening parenthesis
                    loop {
                        match pending.pop() {
                            Some(Pending::LeftParen(_)) => break,
                            Some(Pending::Binary(op, span)) => output.push(PostfixToken {
                                kind: PostfixKind::Binary(op),
                                span,
                            }),
                            Some(Pending::Unary(op, span)) => output.push(PostfixToken {
                                kind: PostfixKind::Unary(op),
                                span,
                            }),
                            None => {
                                return Err(CalcError::parse_error_with_help(
                                    token.span,
                                    "Found ')' without matching '('".to_string(),
                                    "Check for unbalanced parentheses.".to_string(),
                                ));
                            }
                        }
                    }
                }
            }
        }

        if expect_operand {
            if output.is_empty() && pending.is_empty() {
                return Err(CalcError::parse_error_with_help(
                    self.previous_span(),
                    "Empty expression".to_string(),
                    "Provide an expression to calculate. Example: (2 + 3) * 4".to_string(),
                ));
            }
            return Err(CalcError::parse_error_with_help(
                self.previous_span(),
                "Unexpected end of input".to_string(),
                "Expected a number, a time, or a parenthesized expression here.".to_string(),
            ));
        }

        // Drain the remaining operators
        while let Some(top) = pending.pop() {
            match top {
                Pending::Binary(op, span) => output.push(PostfixToken {
                    kind: PostfixKind::Binary(op),
                    span,
                }),
                Pending::Unary(op, span) => output.push(PostfixToken {
                    kind: PostfixKind::Unary(op),
                    span,
                }),
                Pending::LeftParen(span) => {
                    return Err(CalcError::parse_error_with_help(
                        span,
                        "Expected ')' after expression".to_string(),
                        "Every opening parenthesis '(' must have a matching closing parenthesis ')'."
                            .to_string(),
                    ));
                }
            }
        }

        Ok(output)
    }

    /// Pop pending operators that bind at least as tightly as the arriving
    /// binary operator. '^' is right-associative, so equal precedence stays.
    fn flush_pending(
        &self,
        output: &mut Vec<PostfixToken>,
        pending: &mut Vec<Pending>,
        arriving: BinaryOp,
    ) {
        let precedence = binary_precedence(arriving);
        let right_assoc = arriving == BinaryOp::Power;

        while let Some(top) = pending.last() {
            let top_precedence = top.precedence();
            let flush = if right_assoc {
                top_precedence > precedence
            } else {
                top_precedence >= precedence
            };
            if !flush {
                break;
            }
            match pending.pop() {
                Some(Pending::Binary(op, span)) => output.push(PostfixToken {
                    kind: PostfixKind::Binary(op),
                    span,
                }),
                Some(Pending::Unary(op, span)) => output.push(PostfixToken {
                    kind: PostfixKind::Unary(op),
                    span,
                }),
                // LeftParen has precedence 0 and never satisfies the flush
                // condition
                _ => unreachable!(),
            }
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.tokens[self.current].token_type == TokenType::Eof
    }

    fn previous_span(&self) -> Span {
        if self.current > 0 {
            Span::single(self.tokens[self.current - 1].span.end)
        } else {
            self.tokens[self.current].span.clone()
        }
    }
}
