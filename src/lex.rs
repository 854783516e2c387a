use std::fmt::Display;

use miette::SourceSpan;

use crate::CalcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of the run this token came from.
    pub offset: usize,
    /// Byte length of the original run; differs from `literal` for sign runs.
    pub len: usize,
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.offset + self.len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Ident,
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Equal,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Number => write!(f, "NUMBER {lit}"),
            TokenKind::Ident => write!(f, "IDENTIFIER {lit}"),
            TokenKind::Plus => write!(f, "PLUS {lit}"),
            TokenKind::Minus => write!(f, "MINUS {lit}"),
            TokenKind::Star => write!(f, "STAR {lit}"),
            TokenKind::Slash => write!(f, "SLASH {lit}"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit}"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit}"),
            TokenKind::Equal => write!(f, "EQUAL {lit}"),
        }
    }
}

/// Character classes the scanner groups runs by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Digit,
    Letter,
    Sign,
    Space,
    Equal,
    LeftParen,
    RightParen,
    Other,
}

impl Class {
    fn of(c: char) -> Self {
        match c {
            '0'..='9' => Class::Digit,
            '+' | '-' => Class::Sign,
            '=' => Class::Equal,
            '(' => Class::LeftParen,
            ')' => Class::RightParen,
            c if c.is_whitespace() => Class::Space,
            c if c.is_alphabetic() => Class::Letter,
            _ => Class::Other,
        }
    }
}

/// Collapses a run of operator characters to its canonical form.
///
/// An odd number of `-` gives `-`, otherwise any `+`/`-` run gives `+`.
/// Runs without signs come back trimmed but otherwise untouched. Returns
/// `None` for runs repeating `*` or `/`, which can never be an operator.
pub fn normalize_run(run: &str) -> Option<&str> {
    let op = run.trim();
    let minus = op.chars().filter(|&c| c == '-').count();
    let plus = op.chars().filter(|&c| c == '+').count();
    let star = op.chars().filter(|&c| c == '*').count();
    let slash = op.chars().filter(|&c| c == '/').count();

    if star > 1 || slash > 1 {
        return None;
    }
    if minus > 0 {
        Some(if minus % 2 != 0 { "-" } else { "+" })
    } else if plus > 0 {
        Some("+")
    } else {
        Some(op)
    }
}

/// Splits a line into runs of same-class characters.
///
/// Parentheses always stand alone and whitespace only separates. Sign runs
/// are normalized before they are yielded, so `5 --- 3` lexes as
/// `5`, `-`, `3`.
pub struct Lexer<'de> {
    rest: &'de str,
    byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            rest: input,
            byte: 0,
        }
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, CalcError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let c = self.rest.chars().next()?;
            let class = Class::of(c);

            let len = match class {
                Class::LeftParen | Class::RightParen => c.len_utf8(),
                _ => self
                    .rest
                    .find(|ch| Class::of(ch) != class)
                    .unwrap_or(self.rest.len()),
            };

            let run = &self.rest[..len];
            let offset = self.byte;
            self.rest = &self.rest[len..];
            self.byte += len;

            let token = |kind: TokenKind, literal: &'de str| {
                Some(Ok(Token {
                    kind,
                    literal,
                    offset,
                    len,
                }))
            };

            match class {
                Class::Space => continue,
                Class::Digit => return token(TokenKind::Number, run),
                Class::Letter => return token(TokenKind::Ident, run),
                Class::LeftParen => return token(TokenKind::LeftParen, run),
                Class::RightParen => return token(TokenKind::RightParen, run),
                Class::Equal if run.len() == 1 => return token(TokenKind::Equal, run),
                Class::Equal => {
                    return Some(Err(CalcError::invalid_expression(offset..self.byte)));
                }
                Class::Sign | Class::Other => {
                    let kind = match normalize_run(run) {
                        Some("+") => TokenKind::Plus,
                        Some("-") => TokenKind::Minus,
                        Some("*") => TokenKind::Star,
                        Some("/") => TokenKind::Slash,
                        _ => {
                            return Some(Err(CalcError::invalid_expression(offset..self.byte)));
                        }
                    };
                    let literal = match kind {
                        TokenKind::Plus => "+",
                        TokenKind::Minus => "-",
                        _ => run,
                    };
                    return token(kind, literal);
                }
            }
        }
    }
}

/// Lexes a whole line, stopping at the first malformed run.
pub fn tokenize(line: &str) -> Result<Vec<Token<'_>>, CalcError> {
    Lexer::new(line).collect()
}
