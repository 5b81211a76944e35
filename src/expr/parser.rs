//! Recursive-descent parser producing an explicit expression tree
//!
//! Precedence, lowest first:
//!   additive       `+ -`
//!   multiplicative `* / %`
//!   unary          `+x -x`
//!   power          `^` (right associative, binds tighter than unary minus)
//!   postfix        `!`
//!   primary        number, constant, function call, parenthesised expression

use super::lexer::{tokenize, Token, TokenKind};
use crate::error::{CalcError, CalcResult};

/// Deepest tree the parser builds; counts parentheses, calls, signs,
/// exponents and chained operators
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Cbrt,
    Ln,
    /// Base 10, or base given as second argument
    Log,
    Abs,
    Exp,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sqrt" => Function::Sqrt,
            "cbrt" => Function::Cbrt,
            "ln" => Function::Ln,
            "log" => Function::Log,
            "abs" => Function::Abs,
            "exp" => Function::Exp,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "round" => Function::Round,
            "min" => Function::Min,
            "max" => Function::Max,
            _ => return None,
        };
        Some(function)
    }

    /// Accepted argument counts (inclusive)
    fn arity(&self) -> (usize, usize) {
        match self {
            Function::Log => (1, 2),
            Function::Min | Function::Max => (1, usize::MAX),
            _ => (1, 1),
        }
    }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        "tau" => Some(std::f64::consts::TAU),
        _ => None,
    }
}

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Factorial(Box<Expr>),
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Byte length of the source, reported for errors at end of input
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> CalcResult<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(CalcError::expression(self.position(), format!("expected {}", what)))
        }
    }

    /// One level deeper; fails past MAX_DEPTH
    fn descend(&mut self, position: usize) -> CalcResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::expression(position, "expression nested too deeply"));
        }
        Ok(())
    }

    fn additive(&mut self) -> CalcResult<Expr> {
        let entry = self.depth;
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Subtract,
                _ => {
                    self.depth = entry;
                    return Ok(lhs);
                }
            };
            self.descend(self.position())?;
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn multiplicative(&mut self) -> CalcResult<Expr> {
        let entry = self.depth;
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinaryOp::Multiply,
                Some(TokenKind::Slash) => BinaryOp::Divide,
                Some(TokenKind::Percent) => BinaryOp::Remainder,
                _ => {
                    self.depth = entry;
                    return Ok(lhs);
                }
            };
            self.descend(self.position())?;
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> CalcResult<Expr> {
        let op = match self.peek() {
            Some(TokenKind::Plus) => UnaryOp::Plus,
            Some(TokenKind::Minus) => UnaryOp::Minus,
            _ => return self.power(),
        };
        self.descend(self.position())?;
        self.pos += 1;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn power(&mut self) -> CalcResult<Expr> {
        let base = self.postfix()?;
        if self.eat(&TokenKind::Caret) {
            // Exponent may carry its own sign: 2^-3
            self.descend(self.position())?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Binary {
                op: BinaryOp::Power,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn postfix(&mut self) -> CalcResult<Expr> {
        let entry = self.depth;
        let mut expr = self.primary()?;
        while self.eat(&TokenKind::Bang) {
            self.descend(self.position())?;
            expr = Expr::Factorial(Box::new(expr));
        }
        self.depth = entry;
        Ok(expr)
    }

    fn primary(&mut self) -> CalcResult<Expr> {
        let position = self.position();
        match self.advance().map(|t| t.kind) {
            Some(TokenKind::Number(value)) => Ok(Expr::Number(value)),
            Some(TokenKind::LParen) => {
                self.descend(position)?;
                let inner = self.additive()?;
                self.expect(TokenKind::RParen, "')'")?;
                self.depth -= 1;
                Ok(inner)
            }
            Some(TokenKind::Ident(name)) => self.identifier(&name, position),
            Some(other) => Err(CalcError::expression(
                position,
                format!("unexpected {:?}", other),
            )),
            None => Err(CalcError::expression(position, "unexpected end of expression")),
        }
    }

    fn identifier(&mut self, name: &str, position: usize) -> CalcResult<Expr> {
        if let Some(function) = Function::from_name(name) {
            self.expect(TokenKind::LParen, &format!("'(' after {}", name))?;
            self.descend(position)?;
            let mut args = vec![self.additive()?];
            while self.eat(&TokenKind::Comma) {
                args.push(self.additive()?);
            }
            self.expect(TokenKind::RParen, "')'")?;
            self.depth -= 1;

            let (min, max) = function.arity();
            if args.len() < min || args.len() > max {
                let expected = if max == usize::MAX {
                    format!("at least {}", min)
                } else if min == max {
                    min.to_string()
                } else {
                    format!("{} to {}", min, max)
                };
                return Err(CalcError::expression(
                    position,
                    format!("{} takes {} argument(s), got {}", name, expected, args.len()),
                ));
            }
            return Ok(Expr::Call { function, args });
        }

        constant(name)
            .map(Expr::Number)
            .ok_or_else(|| {
                CalcError::expression(position, format!("unknown identifier '{}'", name))
            })
    }
}

/// Parse expression text into a tree
pub fn parse(input: &str) -> CalcResult<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
        depth: 0,
    };

    let expr = parser.additive()?;
    if parser.pos < parser.tokens.len() {
        return Err(CalcError::expression(parser.position(), "unexpected trailing input"));
    }
    Ok(expr)
}
