//! Shell commands: lines starting with `/` never reach the evaluator.

pub const HELP: &str = "\
The program calculates integer expressions with +, -, * and /.
Parentheses group, repeated signs collapse (2 -- 3 is 2 + 3).
Assign variables with `name = value`; names are letters only.
Commands: /help, /exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    Unknown(String),
}

impl Command {
    /// `None` if the line is not a command at all.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('/') {
            return None;
        }
        Some(match line {
            "/exit" => Command::Exit,
            "/help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        })
    }
}
