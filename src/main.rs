use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap::Subcommand;
use miette::IntoDiagnostic;
use miette::Report;
use miette::WrapErr;
use smart_calc::Interpreter;
use smart_calc::Lexer;
use smart_calc::Shell;
use smart_calc::parse::DisplayPostfix;
use smart_calc::system::Command;

#[derive(Parser, Debug)]
#[command(version, about = "Integer calculator with variables")]
struct Args {
    /// Render errors as full diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Feed every line of a file through the calculator
    Run { filename: PathBuf },
    /// Print the tokens of every line
    Tokenize { filename: PathBuf },
    /// Print the postfix form of every expression line
    Postfix { filename: PathBuf },
}

fn read(filename: &Path) -> miette::Result<String> {
    fs::read_to_string(filename)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading `{}` failed", filename.display()))
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    match args.command {
        None => smart_calc::repl::start(args.verbose)?,
        Some(Commands::Run { filename }) => {
            let file_contents = read(&filename)?;
            let mut shell = Shell::new(std::io::stdout(), args.verbose);
            shell.run(file_contents.as_bytes())?;
        }
        Some(Commands::Tokenize { filename }) => {
            let file_contents = read(&filename)?;

            for line in file_contents.lines() {
                for token in Lexer::new(line) {
                    let token = match token {
                        Ok(token) => token,
                        Err(e) => return Err(Report::new(e).with_source_code(line.to_string())),
                    };
                    println!("{token}");
                }
                println!("EOF");
            }
        }
        Some(Commands::Postfix { filename }) => {
            let file_contents = read(&filename)?;
            let mut interpreter = Interpreter::new();

            for line in file_contents.lines().map(str::trim) {
                if line.is_empty() || Command::parse(line).is_some() {
                    continue;
                }
                let result = if line.contains('=') {
                    interpreter.run_line(line).map(|_| None)
                } else {
                    interpreter.postfix(line).map(Some)
                };
                match result {
                    Ok(Some(postfix)) => println!("{}", DisplayPostfix(&postfix)),
                    Ok(None) => {}
                    Err(e) => {
                        println!("{e}");
                        if args.verbose {
                            eprintln!("{:?}", Report::new(e).with_source_code(line.to_string()));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
