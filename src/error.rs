//! Diagnostic sink shared by the scanner, the parser and the interpreter.
//!
//! The pipeline only reports into a [`Reporter`]; deciding what to do with
//! the flags (exit codes, skipping evaluation) is the caller's business.

use std::fmt;

use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Syntax,
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[line {}] Error{}: {}",
            self.line, self.location, self.message
        )
    }
}

/// `" at end"` for the end of input, `" at 'lexeme'"` otherwise.
pub fn location_of(token: &Token) -> String {
    if token.is_eof() {
        String::from(" at end")
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);

    /// Syntax error not tied to a token, as raised while scanning.
    fn error(&mut self, line: usize, message: &str) {
        self.report(Diagnostic {
            kind: DiagnosticKind::Syntax,
            line,
            location: String::new(),
            message: String::from(message),
        })
    }

    fn error_at(&mut self, token: &Token, message: &str) {
        self.report(Diagnostic {
            kind: DiagnosticKind::Syntax,
            line: token.line,
            location: location_of(token),
            message: String::from(message),
        })
    }

    fn runtime_error(&mut self, token: &Token, message: &str) {
        self.report(Diagnostic {
            kind: DiagnosticKind::Runtime,
            line: token.line,
            location: location_of(token),
            message: String::from(message),
        })
    }
}

/// Collects diagnostics and tracks the syntax/runtime error flags of a run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    echo: bool,
    had_error: bool,
    had_runtime_error: bool,
    reported: Vec<Diagnostic>,
}

impl Diagnostics {
    /// A sink that also writes every diagnostic to stderr.
    pub fn new() -> Diagnostics {
        Diagnostics {
            echo: true,
            ..Default::default()
        }
    }

    /// A sink that only records.
    pub fn silent() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reported(&self) -> &[Diagnostic] {
        &self.reported
    }

    /// Clears the flags and the recorded diagnostics between REPL lines.
    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
        self.reported.clear();
    }
}

impl Reporter for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::Syntax => self.had_error = true,
            DiagnosticKind::Runtime => self.had_runtime_error = true,
        }
        if self.echo {
            eprintln!("{}", diagnostic);
        }
        self.reported.push(diagnostic);
    }
}
