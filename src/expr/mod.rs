//! Expression evaluation for the scientific calculator
//!
//! Text is tokenized, parsed into an [`Expr`] tree and evaluated by walking
//! the tree. Nothing is ever executed as code.

mod eval;
mod lexer;
mod parser;

pub use eval::{eval, AngleMode};
pub use parser::{parse, BinaryOp, Expr, Function, UnaryOp};

use log::debug;

use crate::error::CalcResult;

/// Parse and evaluate expression text
pub fn evaluate(input: &str, mode: AngleMode) -> CalcResult<f64> {
    let expr = parse(input)?;
    let value = eval(&expr, mode)?;
    debug!("{} = {} ({:?})", input.trim(), value, mode);
    Ok(value)
}
