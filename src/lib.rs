// Declare modules publicly so they are part of the library interface
pub mod ast;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod pretty_print;
pub mod source;
pub mod value;

use std::io::Write;

pub use ast::{Block, CompareOp, Condition, Expr, ExprKind, Range, Stmt, StmtKind};
pub use environment::{EnvError, Environment};
pub use evaluator::{EvalError, EvalResult, interpret};
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{ParseError, ParseResult, Parser, parse_str};
pub use source::Span;
pub use value::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Eval(#[from] EvalError),
}

/// Lexes, parses and runs `source` in a fresh global environment, writing
/// printed lines to `out`.
///
/// Nothing runs if the source fails to parse.
pub fn run<W: Write>(source: &str, out: &mut W) -> Result<(), Error> {
    let program = parse_str(source)?;
    interpret(&program, Environment::new(), out)?;
    Ok(())
}

impl Error {
    pub fn pretty_print(&self, name: &str, input: &str) -> std::io::Result<()> {
        match self {
            Error::Parse(err) => err.pretty_print(name, input),
            Error::Eval(err) => err.pretty_print(name, input),
        }
    }
}
