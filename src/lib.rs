// tcalc core library
//
// An infix expression calculator over two numeric domains, plain numbers
// and clock-time durations, with an optional stepwise postfix visualization
// of the evaluation.

// Public modules
pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod postfix;
pub mod runner;
pub mod value;
pub mod visual;

// Re-export commonly used items
pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{CalcError, ErrorKind, Span};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use postfix::{PostfixKind, PostfixParser, PostfixToken};
pub use value::{Time, Value};
pub use visual::{VisualEvaluator, VisualStep};

// Re-export pipeline entry points
pub use runner::{calculate, parse_postfix, run, run_visual, visualize};
