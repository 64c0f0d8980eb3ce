/// Lexer for the Lisp reader
///
/// The lexer is a two-state automaton. In `Ready` it waits for the start of a
/// token; in `InSymbol` it accumulates symbol characters. Brackets, whitespace
/// and end of input all close a pending symbol before anything else happens,
/// so `(f(g))` and `( f ( g ) )` tokenize identically.
///
/// Only brackets and whitespace are significant. Any other character,
/// including operators like `+` or `=` and punctuation like `?`, is part of a
/// symbol.
use std::fmt;

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Open,
    Close,
    Symbol,
}

/// A lexical token with its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
    /// Exact source text. For brackets this is just `(` or `)`.
    pub text: String,
}

impl Token {
    fn bracket(kind: TokenKind, at: usize, ch: char) -> Self {
        Token {
            start: at,
            end: at + ch.len_utf8(),
            kind,
            text: ch.to_string(),
        }
    }

    fn symbol(source: &str, start: usize, end: usize) -> Self {
        Token {
            start,
            end,
            kind: TokenKind::Symbol,
            text: source[start..end].to_string(),
        }
    }

    pub fn is_symbol(&self) -> bool {
        self.kind == TokenKind::Symbol
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Open => write!(f, "OPEN@{}", self.start),
            TokenKind::Close => write!(f, "CLOSE@{}", self.start),
            TokenKind::Symbol => write!(f, "SYMBOL({})@{}..{}", self.text, self.start, self.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Ready,
    InSymbol { start: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Open,
    Close,
    Whitespace,
    Constituent,
}

fn classify(ch: char) -> CharClass {
    match ch {
        '(' => CharClass::Open,
        ')' => CharClass::Close,
        c if c.is_whitespace() => CharClass::Whitespace,
        _ => CharClass::Constituent,
    }
}

/// Split `source` into tokens. Empty (or all-whitespace) input yields no tokens.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut state = LexState::Ready;
    let mut chars = source.char_indices();

    loop {
        let next = chars.next();

        // A pending symbol ends at anything that is not a constituent,
        // including the end of input.
        if let LexState::InSymbol { start } = state {
            let ends_symbol = match next {
                Some((_, ch)) => classify(ch) != CharClass::Constituent,
                None => true,
            };
            if ends_symbol {
                let end = next.map_or(source.len(), |(at, _)| at);
                tokens.push(Token::symbol(source, start, end));
                state = LexState::Ready;
            }
        }

        let Some((at, ch)) = next else { break };

        state = match (state, classify(ch)) {
            (LexState::Ready, CharClass::Open) => {
                tokens.push(Token::bracket(TokenKind::Open, at, ch));
                LexState::Ready
            }
            (LexState::Ready, CharClass::Close) => {
                tokens.push(Token::bracket(TokenKind::Close, at, ch));
                LexState::Ready
            }
            (LexState::Ready, CharClass::Whitespace) => LexState::Ready,
            (LexState::Ready, CharClass::Constituent) => LexState::InSymbol { start: at },
            (in_symbol @ LexState::InSymbol { .. }, _) => in_symbol,
        };
    }

    trace!(target: "reglisp::lexer", count = tokens.len(), "Tokenized input");
    tokens
}
