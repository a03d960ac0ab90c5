//! A tree-walking interpreter for a small dynamically typed scripting language.
//!
//! Source flows through [`scanner`], [`parser`] and [`interpreter`]; every
//! stage reports problems into an [`error::Reporter`]. [`Toy`] wires the
//! stages together the way the command line driver uses them.

pub mod ast;
pub mod ast_printer;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod token;

use ast::Stmt;
use error::{Diagnostics, Reporter};
use interpreter::Interpreter;

/// One interpreter session. Global state survives between [`Toy::run`] calls.
pub struct Toy {
    interpreter: Interpreter,
    diagnostics: Diagnostics,
}

impl Toy {
    /// Prints to stdout and reports diagnostics to stderr.
    pub fn new() -> Toy {
        Toy::with_parts(Interpreter::new(), Diagnostics::new())
    }

    pub fn with_parts(interpreter: Interpreter, diagnostics: Diagnostics) -> Toy {
        Toy {
            interpreter,
            diagnostics,
        }
    }

    /// Scans and parses `source` without running it.
    pub fn parse(&mut self, source: &str) -> Vec<Stmt> {
        let tokens = scanner::scan(source, &mut self.diagnostics);
        parser::parse(&tokens, &mut self.diagnostics)
    }

    /// Runs `source`. A syntax error anywhere keeps the program from running.
    pub fn run(&mut self, source: &str) {
        let statements = self.parse(source);
        if self.diagnostics.had_error() {
            tracing::debug!("skipping evaluation after syntax errors");
            return;
        }

        if let Err(error) = self.interpreter.interpret(&statements) {
            tracing::debug!(%error, line = error.token().line, "runtime error");
            self.diagnostics
                .runtime_error(error.token(), &error.to_string());
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Clears the error flags, as the REPL does between lines.
    pub fn reset_errors(&mut self) {
        self.diagnostics.reset();
    }
}

impl Default for Toy {
    fn default() -> Self {
        Self::new()
    }
}
