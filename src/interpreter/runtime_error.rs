use crate::token::Token;
use std::io;
use thiserror::Error;

use super::runtime_value::RuntimeValue;

/// Operator failure before it is attached to the operator's token.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OperatorError {
    #[error("Operand must be a number.")]
    OperandNotNumber,
    #[error("Operands must be numbers.")]
    OperandsNotNumbers,
    #[error("Operands must be two numbers or at least one string.")]
    InvalidOperands,
    #[error("Division by zero.")]
    DivisionByZero,
}

/// Error that aborts evaluation of the current program.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{}'.", .token.lexeme)]
    UndefinedVariable { token: Token },
    #[error("Operand must be a number.")]
    OperandNotNumber { token: Token },
    #[error("Operands must be numbers.")]
    OperandsNotNumbers { token: Token },
    #[error("Operands must be two numbers or at least one string.")]
    InvalidOperands { token: Token },
    #[error("Division by zero.")]
    DivisionByZero { token: Token },
    #[error("Can only call functions.")]
    NotCallable { token: Token },
    #[error("Expected {expected} arguments but got {found}.")]
    ArityMismatch {
        token: Token,
        expected: usize,
        found: usize,
    },
    #[error("Stack overflow.")]
    StackOverflow { token: Token },
    #[error("Sleep duration must be a number.")]
    SleepDurationNotNumber { token: Token },
    #[error("Failed to write output: {source}")]
    Output {
        token: Token,
        #[source]
        source: io::Error,
    },
}

impl RuntimeError {
    pub fn operator(token: &Token, error: OperatorError) -> RuntimeError {
        let token = token.clone();
        match error {
            OperatorError::OperandNotNumber => RuntimeError::OperandNotNumber { token },
            OperatorError::OperandsNotNumbers => RuntimeError::OperandsNotNumbers { token },
            OperatorError::InvalidOperands => RuntimeError::InvalidOperands { token },
            OperatorError::DivisionByZero => RuntimeError::DivisionByZero { token },
        }
    }

    /// The token the error is reported at.
    pub fn token(&self) -> &Token {
        match self {
            RuntimeError::UndefinedVariable { token }
            | RuntimeError::OperandNotNumber { token }
            | RuntimeError::OperandsNotNumbers { token }
            | RuntimeError::InvalidOperands { token }
            | RuntimeError::DivisionByZero { token }
            | RuntimeError::NotCallable { token }
            | RuntimeError::ArityMismatch { token, .. }
            | RuntimeError::StackOverflow { token }
            | RuntimeError::SleepDurationNotNumber { token }
            | RuntimeError::Output { token, .. } => token,
        }
    }
}

pub type RuntimeResult<T = RuntimeValue> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_name_the_problem() {
        let token = Token::new(TokenKind::Identifier, "missing", None, 3);
        let error = RuntimeError::UndefinedVariable {
            token: token.clone(),
        };
        assert_eq!(error.to_string(), "Undefined variable 'missing'.");
        assert_eq!(error.token().line, 3);

        let error = RuntimeError::ArityMismatch {
            token,
            expected: 2,
            found: 1,
        };
        assert_eq!(error.to_string(), "Expected 2 arguments but got 1.");
    }

    #[test]
    fn operator_errors_take_the_operator_token() {
        let slash = Token::new(TokenKind::Slash, "/", None, 9);
        let error = RuntimeError::operator(&slash, OperatorError::DivisionByZero);
        assert!(matches!(error, RuntimeError::DivisionByZero { .. }));
        assert_eq!(error.token(), &slash);
    }
}
