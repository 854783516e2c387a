use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Everything that can go wrong while processing a single input line.
///
/// `Display` is the short phrase the shell prints; the fields are there for
/// callers that want to inspect or render the failure in more detail.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("Invalid assignment")]
    #[diagnostic(
        code(calc::invalid_assignment),
        help("assignments look like `name = value`, `name = -value` or `name = other`")
    )]
    InvalidAssignment,

    #[error("Invalid identifier")]
    #[diagnostic(
        code(calc::invalid_identifier),
        help("variable names may only contain letters: `{name}`")
    )]
    InvalidIdentifier {
        name: String,
        #[label("not a variable name")]
        span: SourceSpan,
    },

    #[error("Unknown variable")]
    #[diagnostic(
        code(calc::unknown_variable),
        help("assign `{name}` before using it, e.g. `{name} = 1`")
    )]
    UnknownVariable {
        name: String,
        #[label("never assigned")]
        span: SourceSpan,
    },

    #[error("Invalid expression")]
    #[diagnostic(code(calc::invalid_expression))]
    InvalidExpression {
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("Division by zero")]
    #[diagnostic(code(calc::division_by_zero))]
    DivisionByZero,

    // The lexer only yields ASCII digit runs, which always parse; this
    // covers `get_value` callers that build tokens themselves.
    #[error("Invalid number")]
    #[diagnostic(code(calc::invalid_number))]
    NumberParse {
        literal: String,
        #[label("this numeric literal")]
        span: SourceSpan,
    },
}

impl CalcError {
    pub(crate) fn invalid_expression(span: impl Into<SourceSpan>) -> Self {
        CalcError::InvalidExpression {
            span: Some(span.into()),
        }
    }

    pub(crate) fn malformed() -> Self {
        CalcError::InvalidExpression { span: None }
    }
}
