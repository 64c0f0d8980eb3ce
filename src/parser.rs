/// Parser from a flat token sequence to an expression tree
///
/// A lone symbol token becomes an atom. A sequence starting with `(` becomes
/// a list: the outer brackets are stripped and the inside is consumed left to
/// right, one atom or one balanced sub-sequence at a time. Sub-sequences are
/// delimited with a depth counter and parsed recursively.
///
/// Malformed input is never repaired. Every failure is reported as a
/// [`ParseError`] and no partial tree is produced.
use std::fmt;

use tracing::{debug, trace};

use crate::lexer::{tokenize, Token, TokenKind};
use crate::list::List;
use crate::value::Value;

/// Default nesting limit for [`parse`].
pub const MAX_PARSE_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// There was nothing to parse
    NoTokens,
    /// A `)` appeared where an expression must start
    UnexpectedClose { offset: usize },
    /// A `(` was never closed
    Unbalanced { offset: usize },
    /// Input continues after one complete expression
    TrailingTokens { offset: usize, found: String },
    /// A digit-led literal too large for an `i64`
    NumberOutOfRange { offset: usize, text: String },
    /// Lists nested deeper than the configured limit
    TooDeeplyNested { limit: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NoTokens => write!(f, "no tokens to read"),
            ParseError::UnexpectedClose { offset } => {
                write!(f, "unexpected ')' at offset {}", offset)
            }
            ParseError::Unbalanced { offset } => {
                write!(f, "unbalanced '(' at offset {}", offset)
            }
            ParseError::TrailingTokens { offset, found } => {
                write!(f, "unexpected '{}' after complete expression at offset {}", found, offset)
            }
            ParseError::NumberOutOfRange { offset, text } => {
                write!(f, "number '{}' at offset {} is out of range", text, offset)
            }
            ParseError::TooDeeplyNested { limit } => {
                write!(f, "expression nested deeper than {} levels", limit)
            }
        }
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Tokenize and parse `source` as a single expression.
pub fn read(source: &str) -> ParseResult<Value> {
    parse(tokenize(source))
}

/// Parse a complete token sequence into one expression.
pub fn parse(tokens: Vec<Token>) -> ParseResult<Value> {
    parse_with_limit(tokens, MAX_PARSE_DEPTH)
}

/// [`parse`] with an explicit nesting limit.
pub fn parse_with_limit(tokens: Vec<Token>, max_depth: usize) -> ParseResult<Value> {
    debug!(target: "reglisp::parser", count = tokens.len(), "Parsing tokens");
    let (first, rest) = tokens.split_first().ok_or(ParseError::NoTokens)?;

    match first.kind {
        TokenKind::Symbol => {
            if let Some(extra) = rest.first() {
                return Err(trailing(extra));
            }
            parse_atom(first)
        }
        TokenKind::Close => Err(ParseError::UnexpectedClose {
            offset: first.start,
        }),
        TokenKind::Open => {
            let close = matching_close(&tokens).ok_or(ParseError::Unbalanced {
                offset: first.start,
            })?;
            if let Some(extra) = tokens.get(close + 1) {
                return Err(trailing(extra));
            }
            parse_list(&tokens[..=close], 1, max_depth)
        }
    }
}

/// Number if the text starts with a decimal digit, otherwise a name.
///
/// Numbers take the leading run of digits, so `12abc` reads as 12.
fn parse_atom(token: &Token) -> ParseResult<Value> {
    let text = token.text.as_str();
    if !text.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(Value::name(text));
    }

    let digits = text
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text, |end| &text[..end]);
    digits
        .parse::<i64>()
        .map(Value::Number)
        .map_err(|_| ParseError::NumberOutOfRange {
            offset: token.start,
            text: text.to_string(),
        })
}

/// Parse `tokens`, which must be exactly one balanced `( ... )` group.
fn parse_list(tokens: &[Token], depth: usize, max_depth: usize) -> ParseResult<Value> {
    if depth > max_depth {
        return Err(ParseError::TooDeeplyNested { limit: max_depth });
    }

    let mut remainder = &tokens[1..tokens.len() - 1];
    let mut items = Vec::new();

    while let Some(first) = remainder.first() {
        match first.kind {
            TokenKind::Symbol => {
                items.push(parse_atom(first)?);
                remainder = &remainder[1..];
            }
            TokenKind::Open => {
                let close = matching_close(remainder).ok_or(ParseError::Unbalanced {
                    offset: first.start,
                })?;
                items.push(parse_list(&remainder[..=close], depth + 1, max_depth)?);
                remainder = &remainder[close + 1..];
            }
            TokenKind::Close => {
                return Err(ParseError::UnexpectedClose {
                    offset: first.start,
                })
            }
        }
    }

    trace!(target: "reglisp::parser", depth, len = items.len(), "Parsed list");
    Ok(Value::List(List::from(items)))
}

/// Index of the `)` that closes the `(` at `tokens[0]`, found by counting
/// opens against closes until they balance.
fn matching_close(tokens: &[Token]) -> Option<usize> {
    let mut open = 0usize;
    let mut close = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Open => open += 1,
            TokenKind::Close => close += 1,
            TokenKind::Symbol => {}
        }
        if open == close {
            return Some(index);
        }
    }
    None
}

fn trailing(token: &Token) -> ParseError {
    ParseError::TrailingTokens {
        offset: token.start,
        found: token.text.clone(),
    }
}
