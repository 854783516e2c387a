use std::io::{BufRead, Write};
use std::ops::ControlFlow;

use miette::{IntoDiagnostic, Report, WrapErr};

use crate::{
    CalcError, Interpreter,
    system::{Command, HELP},
};

/// Line-oriented front end over any reader/writer pair.
///
/// Results and short error phrases go to `out`. With `verbose` set, errors
/// are additionally rendered as full diagnostics on stderr.
pub struct Shell<W> {
    interpreter: Interpreter,
    out: W,
    verbose: bool,
}

impl<W: Write> Shell<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Shell {
            interpreter: Interpreter::new(),
            out,
            verbose,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Reads until `/exit` or end of input, then says goodbye.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily and rejected by the
    /// evaluator like any other malformed line; only I/O failures end the
    /// session early.
    pub fn run(&mut self, mut input: impl BufRead) -> miette::Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .into_diagnostic()
                .wrap_err("reading input failed")?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if self.handle_line(&line)?.is_break() {
                break;
            }
        }
        writeln!(self.out, "Bye!").into_diagnostic()?;
        self.out.flush().into_diagnostic()
    }

    pub fn handle_line(&mut self, line: &str) -> miette::Result<ControlFlow<()>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ControlFlow::Continue(()));
        }

        if let Some(command) = Command::parse(line) {
            match command {
                Command::Exit => return Ok(ControlFlow::Break(())),
                Command::Help => writeln!(self.out, "{HELP}").into_diagnostic()?,
                Command::Unknown(_) => writeln!(self.out, "Unknown command").into_diagnostic()?,
            }
            return Ok(ControlFlow::Continue(()));
        }

        match self.interpreter.run_line(line) {
            Ok(Some(value)) => writeln!(self.out, "{value}").into_diagnostic()?,
            Ok(None) => {}
            Err(e) => self.report(line, e)?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn report(&mut self, line: &str, error: CalcError) -> miette::Result<()> {
        writeln!(self.out, "{error}").into_diagnostic()?;
        if self.verbose {
            eprintln!("{:?}", Report::new(error).with_source_code(line.to_string()));
        }
        Ok(())
    }
}

/// Interactive session on stdin/stdout.
pub fn start(verbose: bool) -> miette::Result<()> {
    let stdin = std::io::stdin();
    let mut shell = Shell::new(std::io::stdout(), verbose);
    shell.run(stdin.lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> String {
        let mut shell = Shell::new(Vec::new(), false);
        shell.run(input.as_bytes()).unwrap();
        String::from_utf8(shell.into_inner()).unwrap()
    }

    #[test]
    fn prints_results_and_goodbye() {
        assert_eq!(session("1 + 2\n\n/exit\n3\n"), "3\nBye!\n");
    }

    #[test]
    fn end_of_input_also_says_goodbye() {
        assert_eq!(session("a = 4\na * a"), "16\nBye!\n");
    }

    #[test]
    fn commands_do_not_reach_the_evaluator() {
        let out = session("/help\n/foo\n/exit\n");
        assert!(out.starts_with(HELP));
        assert!(out.ends_with("Unknown command\nBye!\n"));
    }

    #[test]
    fn undecodable_line_does_not_end_the_session() {
        let mut shell = Shell::new(Vec::new(), false);
        shell.run(&b"1 + 1\n\xff\xfe\n2 + 2\n"[..]).unwrap();
        let out = String::from_utf8(shell.into_inner()).unwrap();
        assert_eq!(out, "2\nInvalid expression\n4\nBye!\n");
    }

    #[test]
    fn errors_are_short_phrases() {
        let out = session("x\n1 / 0\n(1\nx = y = 2\nx1 = 3\n");
        assert_eq!(
            out,
            "Unknown variable\nDivision by zero\nInvalid expression\n\
             Invalid assignment\nInvalid identifier\nBye!\n"
        );
    }
}
