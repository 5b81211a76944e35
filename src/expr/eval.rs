//! Tree-walking evaluation

use serde::{Deserialize, Serialize};

use super::parser::{BinaryOp, Expr, Function, UnaryOp};
use crate::error::{CalcError, CalcResult};

/// Largest n with a finite n! in f64
const MAX_FACTORIAL: f64 = 170.0;

/// Unit for trigonometric arguments and inverse-trig results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleMode {
    #[default]
    Radians,
    Degrees,
}

fn domain_error(value: f64, reason: &str) -> CalcError {
    CalcError::invalid_input("expression", value, reason)
}

fn factorial(n: f64) -> CalcResult<f64> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(domain_error(n, "factorial needs a non-negative integer"));
    }
    if n > MAX_FACTORIAL {
        return Err(domain_error(n, "factorial overflows above 170"));
    }
    Ok((2..=n as u32).fold(1.0, |acc, k| acc * k as f64))
}

fn trig(function: Function, x: f64, mode: AngleMode) -> CalcResult<f64> {
    let value = match mode {
        AngleMode::Radians => match function {
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            _ => x.tan(),
        },
        // Exact results at multiples of 90 degrees instead of 1e-16 noise
        AngleMode::Degrees => {
            let quarter_turns = x / 90.0;
            let exact = quarter_turns.fract() == 0.0;
            let quadrant = quarter_turns.rem_euclid(4.0);
            match function {
                Function::Sin if exact => [0.0, 1.0, 0.0, -1.0][quadrant as usize],
                Function::Cos if exact => [1.0, 0.0, -1.0, 0.0][quadrant as usize],
                Function::Tan if exact && quadrant % 2.0 == 1.0 => {
                    return Err(domain_error(x, "tangent is undefined at odd multiples of 90°"))
                }
                Function::Tan if exact => 0.0,
                Function::Sin => x.to_radians().sin(),
                Function::Cos => x.to_radians().cos(),
                _ => x.to_radians().tan(),
            }
        }
    };
    Ok(value)
}

fn inverse_trig(function: Function, x: f64, mode: AngleMode) -> CalcResult<f64> {
    if matches!(function, Function::Asin | Function::Acos) && !(-1.0..=1.0).contains(&x) {
        return Err(domain_error(x, "argument must be within [-1, 1]"));
    }
    let radians = match function {
        Function::Asin => x.asin(),
        Function::Acos => x.acos(),
        _ => x.atan(),
    };
    Ok(match mode {
        AngleMode::Radians => radians,
        AngleMode::Degrees => radians.to_degrees(),
    })
}

fn call(function: Function, args: &[f64], mode: AngleMode) -> CalcResult<f64> {
    let x = args[0];
    let value = match function {
        Function::Sin | Function::Cos | Function::Tan => trig(function, x, mode)?,
        Function::Asin | Function::Acos | Function::Atan => inverse_trig(function, x, mode)?,
        Function::Sqrt => {
            if x < 0.0 {
                return Err(domain_error(x, "square root of a negative number"));
            }
            x.sqrt()
        }
        Function::Cbrt => x.cbrt(),
        Function::Ln => {
            if x <= 0.0 {
                return Err(domain_error(x, "logarithm needs a positive argument"));
            }
            x.ln()
        }
        Function::Log => {
            if x <= 0.0 {
                return Err(domain_error(x, "logarithm needs a positive argument"));
            }
            match args.get(1) {
                None => x.log10(),
                Some(&base) if base > 0.0 && base != 1.0 => x.log(base),
                Some(&base) => {
                    return Err(domain_error(base, "logarithm base must be positive and not 1"))
                }
            }
        }
        Function::Abs => x.abs(),
        Function::Exp => x.exp(),
        Function::Floor => x.floor(),
        Function::Ceil => x.ceil(),
        Function::Round => x.round(),
        Function::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
        Function::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };
    Ok(value)
}

fn binary(op: BinaryOp, lhs: f64, rhs: f64) -> CalcResult<f64> {
    let value = match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Subtract => lhs - rhs,
        BinaryOp::Multiply => lhs * rhs,
        BinaryOp::Divide | BinaryOp::Remainder if rhs == 0.0 => {
            return Err(domain_error(lhs, "division by zero"))
        }
        BinaryOp::Divide => lhs / rhs,
        BinaryOp::Remainder => lhs % rhs,
        BinaryOp::Power => {
            if lhs < 0.0 && rhs.fract() != 0.0 {
                return Err(domain_error(lhs, "negative base with a fractional exponent"));
            }
            lhs.powf(rhs)
        }
    };
    Ok(value)
}

/// Evaluate a parsed tree
///
/// Every intermediate value must stay finite; overflow is reported rather
/// than propagated as infinity.
pub fn eval(expr: &Expr, mode: AngleMode) -> CalcResult<f64> {
    let value = match expr {
        Expr::Number(value) => *value,
        Expr::Unary { op, operand } => {
            let value = eval(operand, mode)?;
            match op {
                UnaryOp::Plus => value,
                UnaryOp::Minus => -value,
            }
        }
        Expr::Binary { op, lhs, rhs } => binary(*op, eval(lhs, mode)?, eval(rhs, mode)?)?,
        Expr::Factorial(operand) => factorial(eval(operand, mode)?)?,
        Expr::Call { function, args } => {
            let values = args
                .iter()
                .map(|arg| eval(arg, mode))
                .collect::<CalcResult<Vec<_>>>()?;
            call(*function, &values, mode)?
        }
    };

    if !value.is_finite() {
        return Err(domain_error(value, "result is not a finite number"));
    }
    Ok(value)
}
