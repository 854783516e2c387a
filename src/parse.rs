use std::fmt::Display;

use miette::SourceSpan;
use num_bigint::BigInt;

use crate::{
    CalcError, Lexer,
    eval::{Environment, get_value},
    lex::TokenKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
}

impl Op {
    /// `*` and `/` bind tighter than `+` and `-`.
    pub fn priority(self) -> u8 {
        match self {
            Op::Star | Op::Slash => 4,
            Op::Plus | Op::Minus => 3,
        }
    }

    fn from_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Op::Plus),
            TokenKind::Minus => Some(Op::Minus),
            TokenKind::Star => Some(Op::Star),
            TokenKind::Slash => Some(Op::Slash),
            _ => None,
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Plus => write!(f, "+"),
            Op::Minus => write!(f, "-"),
            Op::Star => write!(f, "*"),
            Op::Slash => write!(f, "/"),
        }
    }
}

/// One element of an expression in reverse polish order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Postfix {
    Number(BigInt),
    Binary(Op),
    /// Prefix `-`, applied to the single value below it.
    Negate,
}

impl Display for Postfix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Postfix::Number(n) => write!(f, "{n}"),
            Postfix::Binary(op) => write!(f, "{op}"),
            Postfix::Negate => write!(f, "neg"),
        }
    }
}

pub struct DisplayPostfix<'a>(pub &'a [Postfix]);

impl Display for DisplayPostfix<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut items = self.0.iter();
        if let Some(first) = items.next() {
            write!(f, "{first}")?;
        }
        for item in items {
            write!(f, " {item}")?;
        }
        Ok(())
    }
}

/// Entries of the side stack while converting.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Binary(Op),
    Negate,
    LeftParen(SourceSpan),
}

impl Pending {
    fn priority(self) -> Option<u8> {
        match self {
            Pending::Binary(op) => Some(op.priority()),
            Pending::Negate => Some(5),
            Pending::LeftParen(_) => None,
        }
    }

    fn into_postfix(self) -> Option<Postfix> {
        match self {
            Pending::Binary(op) => Some(Postfix::Binary(op)),
            Pending::Negate => Some(Postfix::Negate),
            Pending::LeftParen(_) => None,
        }
    }
}

/// Shunting-yard conversion of one infix line into postfix order.
///
/// Identifiers are replaced by their current values while converting, so the
/// output only ever contains numbers and operators.
pub struct Parser<'de> {
    whole: &'de str,
    lexer: Lexer<'de>,
}

impl<'de> Parser<'de> {
    pub fn new(whole: &'de str) -> Self {
        Parser {
            whole,
            lexer: Lexer::new(whole),
        }
    }

    pub fn to_postfix(self, environment: &Environment) -> Result<Vec<Postfix>, CalcError> {
        let mut output = Vec::new();
        let mut stack: Vec<Pending> = Vec::new();
        // Start of line, after `(` and after an operator.
        let mut expect_operand = true;

        for token in self.lexer {
            let token = token?;
            match token.kind {
                TokenKind::Number | TokenKind::Ident => {
                    if !expect_operand {
                        return Err(CalcError::invalid_expression(token.span()));
                    }
                    output.push(Postfix::Number(get_value(&token, environment)?));
                    expect_operand = false;
                }
                TokenKind::LeftParen => {
                    if !expect_operand {
                        return Err(CalcError::invalid_expression(token.span()));
                    }
                    stack.push(Pending::LeftParen(token.span()));
                }
                TokenKind::RightParen => {
                    if expect_operand {
                        return Err(CalcError::invalid_expression(token.span()));
                    }
                    loop {
                        match stack.pop() {
                            Some(Pending::LeftParen(_)) => break,
                            Some(pending) => output.extend(pending.into_postfix()),
                            None => return Err(CalcError::invalid_expression(token.span())),
                        }
                    }
                }
                TokenKind::Plus | TokenKind::Minus if expect_operand => {
                    if token.kind == TokenKind::Minus {
                        stack.push(Pending::Negate);
                    }
                }
                TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash => {
                    let Some(op) = Op::from_kind(token.kind).filter(|_| !expect_operand) else {
                        return Err(CalcError::invalid_expression(token.span()));
                    };
                    while let Some(&top) = stack.last() {
                        match top.priority() {
                            Some(priority) if priority >= op.priority() => {
                                stack.pop();
                                output.extend(top.into_postfix());
                            }
                            _ => break,
                        }
                    }
                    stack.push(Pending::Binary(op));
                    expect_operand = true;
                }
                TokenKind::Equal => return Err(CalcError::invalid_expression(token.span())),
            }
        }

        if expect_operand {
            return Err(CalcError::invalid_expression((self.whole.len(), 0)));
        }

        while let Some(pending) = stack.pop() {
            match pending {
                Pending::LeftParen(span) => return Err(CalcError::invalid_expression(span)),
                pending => output.extend(pending.into_postfix()),
            }
        }

        Ok(output)
    }
}
