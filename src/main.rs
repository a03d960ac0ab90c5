use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use toy::{ast_printer::AstPrinter, Toy};

const EXIT_USAGE: u8 = 64;
const EXIT_SYNTAX_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;
const EXIT_IO_ERROR: u8 = 74;

struct Options {
    print_ast: bool,
    script: Option<String>,
}

/// Logs go to stderr, and only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        print_ast: false,
        script: None,
    };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--ast" => options.print_ast = true,
            _ if options.script.is_none() => options.script = Some(arg),
            _ => bail!("Only one script is supported"),
        }
    }
    Ok(options)
}

fn main() -> ExitCode {
    init_tracing();

    let options = match parse_args() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("Usage: toy [--ast] [script]");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let result = match &options.script {
        Some(path) => run_file(path, options.print_ast),
        None => run_prompt(options.print_ast),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(EXIT_IO_ERROR)
        }
    }
}

fn run_file(path: &str, print_ast: bool) -> Result<ExitCode> {
    let source = fs::read_to_string(path).with_context(|| format!("Reading {path}"))?;
    let mut toy = Toy::new();

    if print_ast {
        let statements = toy.parse(&source);
        println!("{}", AstPrinter.print_program(&statements));
    } else {
        toy.run(&source);
    }

    let diagnostics = toy.diagnostics();
    if diagnostics.had_error() {
        Ok(ExitCode::from(EXIT_SYNTAX_ERROR))
    } else if diagnostics.had_runtime_error() {
        Ok(ExitCode::from(EXIT_RUNTIME_ERROR))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Reads one line at a time until an empty line or end of input.
fn run_prompt(print_ast: bool) -> Result<ExitCode> {
    let mut toy = Toy::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock();

    loop {
        print!("> ");
        io::stdout().flush().context("Flushing prompt")?;

        let mut line = String::new();
        let read = lines.read_line(&mut line).context("Reading stdin")?;
        let line = line.trim_end_matches(['\r', '\n']);
        if read == 0 || line.is_empty() {
            break;
        }

        if print_ast {
            let statements = toy.parse(line);
            println!("{}", AstPrinter.print_program(&statements));
        } else {
            toy.run(line);
        }
        toy.reset_errors();
    }
    Ok(ExitCode::SUCCESS)
}
