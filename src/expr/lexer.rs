//! Tokenizer for calculator expressions

use crate::error::{CalcError, CalcResult};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Bang,
    LParen,
    RParen,
    Comma,
}

/// Token with the byte offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

fn number_end(chars: &[(usize, char)], mut i: usize) -> usize {
    while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
        i += 1;
    }
    // Optional exponent: e, E followed by optional sign and at least one digit
    if i < chars.len() && (chars[i].1 == 'e' || chars[i].1 == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j].1 == '+' || chars[j].1 == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].1.is_ascii_digit() {
            while j < chars.len() && chars[j].1.is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

pub fn tokenize(input: &str) -> CalcResult<Vec<Token>> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (position, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let end = number_end(&chars, i);
            let stop = chars.get(end).map_or(input.len(), |&(p, _)| p);
            let text = &input[position..stop];
            let value: f64 = text.parse().map_err(|_| {
                CalcError::expression(position, format!("invalid number '{}'", text))
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                position,
            });
            i = end;
            continue;
        }

        // π is alphabetic, so it must be matched before the identifier scan
        if c == 'π' {
            tokens.push(Token {
                kind: TokenKind::Ident("pi".to_string()),
                position,
            });
            i += 1;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut end = i;
            while end < chars.len() && (chars[end].1.is_alphanumeric() || chars[end].1 == '_') {
                end += 1;
            }
            let stop = chars.get(end).map_or(input.len(), |&(p, _)| p);
            tokens.push(Token {
                kind: TokenKind::Ident(input[position..stop].to_ascii_lowercase()),
                position,
            });
            i = end;
            continue;
        }

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' | '−' => TokenKind::Minus,
            '*' | '×' => TokenKind::Star,
            '/' | '÷' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '!' => TokenKind::Bang,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            other => {
                return Err(CalcError::expression(
                    position,
                    format!("unexpected character '{}'", other),
                ))
            }
        };
        tokens.push(Token { kind, position });
        i += 1;
    }

    Ok(tokens)
}
