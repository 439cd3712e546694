use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{CalcError, Span};
use crate::lexer::{Token, TokenType};
use crate::value::{Time, Value};

/// Convert a literal token into its typed runtime value. The domain tag is
/// decided here, once, from the token type the lexer assigned.
pub fn literal_value(token: &Token) -> Result<Value, CalcError> {
    match token.token_type {
        TokenType::Number => {
            if token.lexeme.contains('.') {
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    CalcError::parse_error(token.span.clone(), "Invalid number".to_string())
                })?;
                Ok(Value::Double(value))
            } else {
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    CalcError::parse_error(token.span.clone(), "Invalid number".to_string())
                })?;
                Ok(Value::Int(value))
            }
        }
        TokenType::Time => {
            let mut parts = Vec::new();
            for part in token.lexeme.split(':') {
                let n = part.parse::<i64>().map_err(|_| {
                    CalcError::parse_error(token.span.clone(), "Invalid time literal".to_string())
                })?;
                parts.push(n);
            }
            let time = match parts.as_slice() {
                [minutes, seconds] => Time::from_hms(0, *minutes, *seconds),
                [hours, minutes, seconds] => Time::from_hms(*hours, *minutes, *seconds),
                _ => {
                    return Err(CalcError::parse_error(
                        token.span.clone(),
                        "Invalid time literal".to_string(),
                    ))
                }
            };
            Ok(Value::Time(time))
        }
        _ => Err(CalcError::internal_error(
            token.span.clone(),
            format!("Token '{}' is not a literal", token.lexeme),
        )),
    }
}

/// Recursive-descent parser for the direct evaluation path.
///
/// Grammar, lowest to highest precedence:
/// ```text
/// expr    := term (("+"|"-") term)*
/// term    := unary (("*"|"/") unary)*
/// unary   := ("+"|"-") unary | power
/// power   := atom ("^" unary)?        // right-associative
/// atom    := NUMBER | TIME | "(" expr ")"
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> Result<Expr, CalcError> {
        if self.is_at_end() {
            return Err(CalcError::parse_error_with_help(
                self.peek().span.clone(),
                "Empty expression".to_string(),
                "Provide an expression to calculate. Example: (2 + 3) * 4".to_string(),
            ));
        }

        let expr = self.expression()?;

        // A complete expression must consume everything up to Eof
        if !self.is_at_end() {
            let token = self.peek();
            return Err(CalcError::parse_error_with_help(
                token.span.clone(),
                format!("Unexpected token '{}' after expression", token.lexeme),
                "The expression was already complete at this point. Check for a missing operator."
                    .to_string(),
            ));
        }

        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.term()?;

        while self.match_types(&[TokenType::Plus, TokenType::Minus]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Subtract,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.term().map_err(|_| {
                CalcError::parse_error_with_help(
                    operator_token.span.clone(),
                    format!("Expected expression after '{}'", operator_token.lexeme),
                    "Arithmetic operators like '+' and '-' require expressions on both sides."
                        .to_string(),
                )
            })?;
            let end = right.span().end;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.unary()?;

        while self.match_types(&[TokenType::Star, TokenType::Slash]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Slash => BinaryOp::Divide,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.unary().map_err(|_| {
                CalcError::parse_error_with_help(
                    operator_token.span.clone(),
                    format!("Expected expression after '{}'", operator_token.lexeme),
                    "Multiplication and division operators require expressions on both sides."
                        .to_string(),
                )
            })?;
            let end = right.span().end;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, CalcError> {
        if self.match_types(&[TokenType::Plus, TokenType::Minus]) {
            let operator = match self.previous().token_type {
                TokenType::Plus => UnaryOp::Identity,
                TokenType::Minus => UnaryOp::Negate,
                _ => unreachable!(),
            };

            let start = self.previous().span.start;
            let operand = self.unary()?;
            let end = operand.span().end;

            return Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
                span: Span::new(start, end),
            });
        }

        self.power()
    }

    fn power(&mut self) -> Result<Expr, CalcError> {
        let expr = self.atom()?;

        // Right-associative: the exponent re-enters at unary level, so
        // 2^-3^2 parses as 2^(-(3^2))
        if self.match_types(&[TokenType::Caret]) {
            let operator_token = self.previous().clone();
            let start = expr.span().start;
            let right = self.unary().map_err(|_| {
                CalcError::parse_error_with_help(
                    operator_token.span.clone(),
                    "Expected expression after '^'".to_string(),
                    "Exponentiation requires expressions on both sides.".to_string(),
                )
            })?;
            let end = right.span().end;

            return Ok(Expr::Binary {
                left: Box::new(expr),
                operator: BinaryOp::Power,
                right: Box::new(right),
                span: Span::new(start, end),
            });
        }

        Ok(expr)
    }

    fn atom(&mut self) -> Result<Expr, CalcError> {
        if self.is_at_end() {
            return Err(CalcError::parse_error_with_help(
                self.peek().span.clone(),
                "Unexpected end of input".to_string(),
                "Expected a number, a time, or a parenthesized expression here.".to_string(),
            ));
        }

        let token = self.advance().clone();

        match token.token_type {
            TokenType::Number | TokenType::Time => {
                let value = literal_value(&token)?;
                Ok(Expr::Literal {
                    value,
                    span: token.span,
                })
            }
            TokenType::LeftParen => {
                let start_span = token.span.clone();
                let expr = self.expression()?;
                let end_token = self.consume_with_help(
                    TokenType::RightParen,
                    "Expected ')' after expression",
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'."
                        .to_string(),
                )?;
                Ok(Expr::Grouping {
                    expr: Box::new(expr),
                    span: Span::new(start_span.start, end_token.span.end),
                })
            }
            _ => {
                let help_msg = match token.token_type {
                    TokenType::RightParen => {
                        "Found ')' without matching '('. Check for unbalanced parentheses."
                    }
                    _ => "Expected a number, a time, or a parenthesized expression here.",
                };

                Err(CalcError::parse_error_with_help(
                    token.span,
                    format!("Expected expression, found '{}'", token.lexeme),
                    help_msg.to_string(),
                ))
            }
        }
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            &self.peek().token_type == token_type
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: String,
    ) -> Result<&Token, CalcError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            // Point at the gap after the last real token when input ran out
            let error_span = if self.is_at_end() {
                if self.current > 0 {
                    let last_token = &self.tokens[self.current - 1];
                    Span::single(last_token.span.end)
                } else {
                    self.peek().span.clone()
                }
            } else {
                self.peek().span.clone()
            };

            Err(CalcError::parse_error_with_help(
                error_span,
                message.to_string(),
                help,
            ))
        }
    }
}
