use crate::error::{CalcError, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,

    // Literals
    Number,
    Time,

    // Special
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }
}

/// Forward-only cursor over an expression string. Tokens can be pulled one
/// at a time through the `Iterator` impl, or drained in one go with
/// `scan_tokens`, which appends the `Eof` terminator the parsers rely on.
pub struct Lexer {
    source: String,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: String) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
        }
    }

    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, CalcError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        tokens.push(Token::new(
            TokenType::Eof,
            "".to_string(),
            Span::single(self.current),
        ));

        Ok(tokens)
    }

    /// Produce the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, CalcError> {
        self.skip_whitespace();
        if self.is_at_end() {
            return Ok(None);
        }

        self.start = self.current;
        let c = self.advance();

        let token = match c {
            '(' => self.make_token(TokenType::LeftParen),
            ')' => self.make_token(TokenType::RightParen),
            '+' => self.make_token(TokenType::Plus),
            '-' => self.make_token(TokenType::Minus),
            '*' => self.make_token(TokenType::Star),
            '/' => self.make_token(TokenType::Slash),
            '^' => self.make_token(TokenType::Caret),
            c if c.is_ascii_digit() => self.number()?,
            _ => {
                return Err(CalcError::lex_error(
                    Span::new(self.start, self.current),
                    format!("Unexpected character: '{}'", c),
                ));
            }
        };

        Ok(Some(token))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), ' ' | '\r' | '\t' | '\n') && !self.is_at_end() {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        if self.current >= self.source.len() {
            return '\0';
        }

        let c = self.source[self.current..].chars().next().unwrap_or('\0');
        self.current += c.len_utf8();
        c
    }

    fn peek(&self) -> char {
        if self.current >= self.source.len() {
            return '\0';
        }
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    /// Scan the rest of a literal that started with a digit: either a
    /// number (`123`, `12.34`) or a time (`43:21`, `65:43:21`).
    fn number(&mut self) -> Result<Token, CalcError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // Colon-separated digits form a time literal
        if self.peek() == ':' && self.peek_next().is_ascii_digit() {
            return self.time();
        }

        let mut is_double = false;

        // Look for fractional part
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_double = true;
            // Consume the "."
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let number_slice = &self.source[self.start..self.current];

        // Reject out-of-range literals here, with the lexeme span intact
        let valid = if is_double {
            number_slice.parse::<f64>().is_ok()
        } else {
            number_slice.parse::<i64>().is_ok()
        };
        if !valid {
            return Err(CalcError::lex_error(
                Span::new(self.start, self.current),
                format!("Invalid number: {}", number_slice),
            ));
        }

        Ok(self.make_token(TokenType::Number))
    }

    /// Scan the remaining `:D+` or `:D+:D+` of a time literal. The leading
    /// digit run has already been consumed by `number`.
    fn time(&mut self) -> Result<Token, CalcError> {
        for _ in 0..2 {
            if self.peek() != ':' || !self.peek_next().is_ascii_digit() {
                break;
            }
            // Consume the ":"
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let time_slice = &self.source[self.start..self.current];
        for part in time_slice.split(':') {
            if part.parse::<i64>().is_err() {
                return Err(CalcError::lex_error(
                    Span::new(self.start, self.current),
                    format!("Invalid time literal: {}", time_slice),
                ));
            }
        }

        Ok(self.make_token(TokenType::Time))
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        let text = &self.source[self.start..self.current];
        Token::new(token_type, text.to_string(), Span::new(self.start, self.current))
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, CalcError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
