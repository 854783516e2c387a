//! Line-oriented integer calculator: tokenizing, sign-run collapsing,
//! shunting-yard conversion to postfix, and evaluation over
//! arbitrary-precision integers with named variables.

pub mod error;
pub mod eval;
pub mod lex;
pub mod parse;
pub mod repl;
pub mod system;
pub mod validate;

pub use error::CalcError;
pub use eval::{Environment, Interpreter, assign, eval_postfix, evaluate};
pub use lex::Lexer;
pub use parse::Parser;
pub use repl::Shell;
pub use validate::is_valid_assignment;
