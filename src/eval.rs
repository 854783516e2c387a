use std::collections::HashMap;

use miette::SourceSpan;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::{
    CalcError, Parser,
    lex::{Token, TokenKind, tokenize},
    parse::{Op, Postfix},
    validate::{is_valid_assignment, is_valid_variable_name},
};

/// Named integer variables, owned by whoever drives the evaluation.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    values: HashMap<String, BigInt>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&BigInt> {
        self.values.get(name)
    }

    /// Binds `name`, replacing whatever it held before.
    pub fn define(&mut self, name: impl Into<String>, value: BigInt) {
        self.values.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolves a number or identifier token to its value.
pub fn get_value(token: &Token<'_>, environment: &Environment) -> Result<BigInt, CalcError> {
    match token.kind {
        TokenKind::Ident => environment
            .get(token.literal)
            .cloned()
            .ok_or_else(|| CalcError::UnknownVariable {
                name: token.literal.to_string(),
                span: token.span(),
            }),
        TokenKind::Number => token.literal.parse().map_err(|_| CalcError::NumberParse {
            literal: token.literal.to_string(),
            span: token.span(),
        }),
        _ => Err(CalcError::invalid_expression(token.span())),
    }
}

/// Reduces a postfix sequence to a single value.
pub fn eval_postfix(postfix: &[Postfix]) -> Result<BigInt, CalcError> {
    let mut stack: Vec<BigInt> = Vec::with_capacity(postfix.len());

    for item in postfix {
        match item {
            Postfix::Number(n) => stack.push(n.clone()),
            Postfix::Negate => {
                let value = stack.pop().ok_or_else(CalcError::malformed)?;
                stack.push(-value);
            }
            Postfix::Binary(op) => {
                let (Some(a), Some(b)) = (stack.pop(), stack.pop()) else {
                    return Err(CalcError::malformed());
                };
                let value = match op {
                    Op::Plus => b + a,
                    Op::Minus => b - a,
                    Op::Star => b * a,
                    Op::Slash => {
                        if a.is_zero() {
                            return Err(CalcError::DivisionByZero);
                        }
                        b / a
                    }
                };
                stack.push(value);
            }
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(value), true) => Ok(value),
        _ => Err(CalcError::malformed()),
    }
}

/// Evaluates an expression line against `environment`.
pub fn evaluate(line: &str, environment: &Environment) -> Result<BigInt, CalcError> {
    let postfix = Parser::new(line).to_postfix(environment)?;
    eval_postfix(&postfix)
}

/// Handles `name = [sign] value` where value is a number or a known name.
///
/// The environment is only touched once the whole line has been accepted.
pub fn assign(line: &str, environment: &mut Environment) -> Result<(), CalcError> {
    let Some((lhs, _)) = line.split_once('=') else {
        return Err(CalcError::InvalidAssignment);
    };

    let name = lhs.trim();
    if !is_valid_variable_name(name) {
        let start = lhs.len() - lhs.trim_start().len();
        return Err(CalcError::InvalidIdentifier {
            name: name.to_string(),
            span: SourceSpan::from(start..start + name.len()),
        });
    }

    let tokens = tokenize(line).map_err(|_| CalcError::InvalidAssignment)?;
    let rest = match tokens.as_slice() {
        [
            Token {
                kind: TokenKind::Ident,
                ..
            },
            Token {
                kind: TokenKind::Equal,
                ..
            },
            rest @ ..,
        ] => rest,
        _ => return Err(CalcError::InvalidAssignment),
    };

    let (negate, value) = match rest {
        [value] => (false, value),
        [sign, value] if sign.kind == TokenKind::Plus => (false, value),
        [sign, value] if sign.kind == TokenKind::Minus => (true, value),
        _ => return Err(CalcError::InvalidAssignment),
    };
    if !matches!(value.kind, TokenKind::Number | TokenKind::Ident) {
        return Err(CalcError::InvalidAssignment);
    }

    let value = get_value(value, environment)?;
    environment.define(name, if negate { -value } else { value });
    Ok(())
}

/// Runs whole lines against an environment it owns.
#[derive(Debug, Default)]
pub struct Interpreter {
    environment: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Returns the value of an expression line, or `None` after an
    /// assignment.
    pub fn run_line(&mut self, line: &str) -> Result<Option<BigInt>, CalcError> {
        if !is_valid_assignment(line) {
            return Err(CalcError::InvalidAssignment);
        }
        if line.contains('=') {
            assign(line, &mut self.environment)?;
            Ok(None)
        } else {
            evaluate(line, &self.environment).map(Some)
        }
    }

    /// Postfix form of an expression line, with variables substituted.
    pub fn postfix(&self, line: &str) -> Result<Vec<Postfix>, CalcError> {
        Parser::new(line).to_postfix(&self.environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn set_and_overwrite() {
        let mut environment = Environment::new();
        environment.define("x", int(1));
        environment.define("x", int(2));
        assert_eq!(environment.get("x"), Some(&int(2)));
        assert_eq!(environment.len(), 1);
        assert_eq!(environment.get("X"), None);
    }

    #[test]
    fn postfix_arithmetic() {
        let postfix = [
            Postfix::Number(int(7)),
            Postfix::Number(int(2)),
            Postfix::Binary(Op::Minus),
            Postfix::Number(int(3)),
            Postfix::Binary(Op::Star),
        ];
        assert_eq!(eval_postfix(&postfix), Ok(int(15)));
    }

    #[test]
    fn division_truncates_toward_zero() {
        let environment = Environment::new();
        assert_eq!(evaluate("7 / 2", &environment), Ok(int(3)));
        assert_eq!(evaluate("-7 / 2", &environment), Ok(int(-3)));
        assert_eq!(evaluate("7 / -2", &environment), Ok(int(-3)));
        assert_eq!(evaluate("8 / 4 / 2", &environment), Ok(int(1)));
    }

    #[test]
    fn division_by_zero() {
        let environment = Environment::new();
        assert_eq!(evaluate("1 / 0", &environment), Err(CalcError::DivisionByZero));
        assert_eq!(
            evaluate("1 / (2 - 2)", &environment),
            Err(CalcError::DivisionByZero)
        );
    }

    #[test]
    fn hand_built_number_token_must_parse() {
        let token = Token {
            kind: TokenKind::Number,
            literal: "12x",
            offset: 0,
            len: 3,
        };
        assert_eq!(
            get_value(&token, &Environment::new()),
            Err(CalcError::NumberParse {
                literal: "12x".to_string(),
                span: SourceSpan::from(0..3),
            })
        );
    }

    #[test]
    fn malformed_postfix_is_an_error() {
        assert!(eval_postfix(&[]).is_err());
        assert!(eval_postfix(&[Postfix::Binary(Op::Plus)]).is_err());
        assert!(eval_postfix(&[Postfix::Number(int(1)), Postfix::Number(int(2))]).is_err());
        assert!(eval_postfix(&[Postfix::Negate]).is_err());
    }

    #[test]
    fn big_values() {
        let environment = Environment::new();
        assert_eq!(
            evaluate("112234567890 + 112234567890 * (10000000999 - 999)", &environment)
                .unwrap()
                .to_string(),
            "1122345679012234567890"
        );
    }

    #[test]
    fn assignment_forms() {
        let mut environment = Environment::new();
        assign("a = 5", &mut environment).unwrap();
        assign("b=-a", &mut environment).unwrap();
        assign("c = --7", &mut environment).unwrap();
        assign("d = +a", &mut environment).unwrap();
        assert_eq!(environment.get("a"), Some(&int(5)));
        assert_eq!(environment.get("b"), Some(&int(-5)));
        assert_eq!(environment.get("c"), Some(&int(7)));
        assert_eq!(environment.get("d"), Some(&int(5)));
    }

    #[test]
    fn bad_identifier() {
        let mut environment = Environment::new();
        assert_eq!(
            assign("x 5 = 3", &mut environment),
            Err(CalcError::InvalidIdentifier {
                name: "x 5".to_string(),
                span: SourceSpan::from(0..3),
            })
        );
        assert!(matches!(
            assign("a1 = 3", &mut environment),
            Err(CalcError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            assign(" = 3", &mut environment),
            Err(CalcError::InvalidIdentifier { .. })
        ));
        assert!(environment.is_empty());
    }

    #[test]
    fn failed_assignment_leaves_environment_alone() {
        let mut environment = Environment::new();
        assign("x = 1", &mut environment).unwrap();
        assert!(matches!(
            assign("x = y", &mut environment),
            Err(CalcError::UnknownVariable { .. })
        ));
        assert_eq!(
            assign("x = 1 + 2", &mut environment),
            Err(CalcError::InvalidAssignment)
        );
        assert_eq!(
            assign("x = 1 $", &mut environment),
            Err(CalcError::InvalidAssignment)
        );
        assert_eq!(environment.get("x"), Some(&int(1)));
    }

    #[test]
    fn interpreter_routes_lines() {
        let mut interpreter = Interpreter::new();
        assert_eq!(interpreter.run_line("n = 3"), Ok(None));
        assert_eq!(interpreter.run_line("n * n"), Ok(Some(int(9))));
        assert_eq!(
            interpreter.run_line("n = 1 = 2"),
            Err(CalcError::InvalidAssignment)
        );
        assert_eq!(interpreter.environment().len(), 1);
    }
}
