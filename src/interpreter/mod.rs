use crate::{
    ast::{Expr, Stmt},
    token::{Token, TokenKind},
};
use std::{
    io::{self, Write},
    rc::Rc,
    thread,
    time::Duration,
};

pub mod environment;
pub mod function;
pub mod native_functions;
pub mod runtime_error;
pub mod runtime_value;

use self::{
    environment::{EnvRef, Environment},
    function::Function,
    native_functions::NativeFnClock,
    runtime_error::{RuntimeError, RuntimeResult},
    runtime_value::RuntimeValue,
};

/// Deepest chain of nested calls before a program is stopped with
/// [`RuntimeError::StackOverflow`].
pub const MAX_CALL_DEPTH: usize = 1024;

/// Native stack left when a call grows the stack (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Stack added per growth (1MB).
const STACK_PER_CALL: usize = 1024 * 1024;

/// How a statement finished. Loops consume `Break` and `Continue`,
/// function calls consume `Return`.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Normal,
    Break,
    Continue,
    Return(RuntimeValue),
}

pub struct Interpreter {
    globals: EnvRef,
    output: Box<dyn Write>,
    call_depth: usize,
}

impl Interpreter {
    /// An interpreter printing to stdout.
    pub fn new() -> Interpreter {
        Interpreter::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Interpreter {
        Interpreter {
            globals: Interpreter::define_globals(),
            output,
            call_depth: 0,
        }
    }

    fn define_globals() -> EnvRef {
        let mut environment = Environment::new();
        environment.define("clock", RuntimeValue::Callable(Rc::new(NativeFnClock)));
        environment.into_ref()
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// Runs a program against the global environment, stopping at the first
    /// runtime error.
    ///
    /// # Panics
    ///
    /// If a `break`, `continue` or `return` reaches the top level. The parser
    /// rejects such programs.
    pub fn interpret(&mut self, statements: &[Stmt]) -> RuntimeResult<()> {
        let globals = Rc::clone(&self.globals);
        for statement in statements {
            match self.execute(statement, &globals)? {
                Completion::Normal => {}
                signal => unreachable!("{:?} escaped to the top level", signal),
            }
        }
        Ok(())
    }

    /// Runs `statements` in `environment`, stopping at the first signal.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: EnvRef,
    ) -> RuntimeResult<Completion> {
        for statement in statements {
            match self.execute(statement, &environment)? {
                Completion::Normal => {}
                signal => return Ok(signal),
            }
        }
        Ok(Completion::Normal)
    }

    pub fn execute(&mut self, statement: &Stmt, environment: &EnvRef) -> RuntimeResult<Completion> {
        match statement {
            Stmt::Expression { expression } => {
                self.evaluate(expression, environment)?;
            }
            Stmt::Print {
                keyword,
                expression,
            } => {
                let value = self.evaluate(expression, environment)?;
                writeln!(self.output, "{}", value).map_err(|source| RuntimeError::Output {
                    token: keyword.clone(),
                    source,
                })?;
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer, environment)?,
                    None => RuntimeValue::Nil,
                };
                environment.borrow_mut().define(&name.lexeme, value);
            }
            Stmt::Block { statements } => {
                let block_environment = Environment::new_with(environment).into_ref();
                return self.execute_block(statements, block_environment);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, environment)?.is_truthy() {
                    return self.execute(then_branch, environment);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch, environment);
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition, environment)?.is_truthy() {
                    match self.execute(body, environment)? {
                        Completion::Normal | Completion::Continue => {}
                        Completion::Break => break,
                        signal @ Completion::Return(_) => return Ok(signal),
                    }
                }
            }
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                return self.execute_for(
                    initializer.as_deref(),
                    condition.as_ref(),
                    increment.as_ref(),
                    body,
                    environment,
                )
            }
            Stmt::Function(declaration) => {
                let function = Function::new(declaration, environment);
                environment.borrow_mut().define(
                    &declaration.name.lexeme,
                    RuntimeValue::Callable(Rc::new(function)),
                );
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(value, environment)?,
                    None => RuntimeValue::Nil,
                };
                return Ok(Completion::Return(value));
            }
            Stmt::Break => return Ok(Completion::Break),
            Stmt::Continue => return Ok(Completion::Continue),
            Stmt::Sleep { keyword, duration } => self.sleep(keyword, duration, environment)?,
        }
        Ok(Completion::Normal)
    }

    fn execute_for(
        &mut self,
        initializer: Option<&Stmt>,
        condition: Option<&Expr>,
        increment: Option<&Expr>,
        body: &Stmt,
        environment: &EnvRef,
    ) -> RuntimeResult<Completion> {
        // The loop variable lives in one scope shared by every iteration.
        let loop_environment = match initializer {
            Some(initializer) => {
                let loop_environment = Environment::new_with(environment).into_ref();
                self.execute(initializer, &loop_environment)?;
                loop_environment
            }
            None => Rc::clone(environment),
        };

        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition, &loop_environment)?.is_truthy() {
                    break;
                }
            }
            match self.execute(body, &loop_environment)? {
                Completion::Normal | Completion::Continue => {}
                Completion::Break => break,
                signal @ Completion::Return(_) => return Ok(signal),
            }
            if let Some(increment) = increment {
                self.evaluate(increment, &loop_environment)?;
            }
        }
        Ok(Completion::Normal)
    }

    fn sleep(&mut self, keyword: &Token, duration: &Expr, environment: &EnvRef) -> RuntimeResult<()> {
        match self.evaluate(duration, environment)? {
            RuntimeValue::Number(millis) => {
                // Negative and NaN durations sleep for zero; f64::max drops NaN.
                let seconds = millis.max(0.0) / 1000.0;
                let duration = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX);
                tracing::debug!(millis, "sleeping");
                thread::sleep(duration);
                Ok(())
            }
            RuntimeValue::Nil
            | RuntimeValue::Boolean(_)
            | RuntimeValue::String(_)
            | RuntimeValue::Callable(_) => Err(RuntimeError::SleepDurationNotNumber {
                token: keyword.clone(),
            }),
        }
    }

    pub fn evaluate(&mut self, expr: &Expr, environment: &EnvRef) -> RuntimeResult {
        match expr {
            Expr::Literal(literal) => Ok(literal.clone().into()),
            Expr::Grouping { expression } => self.evaluate(expression, environment),
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right, environment)?;

                match operator.kind {
                    TokenKind::Minus => {
                        (-right).map_err(|err| RuntimeError::operator(operator, err))
                    }
                    TokenKind::Bang => Ok(!right),
                    kind => unreachable!("parser produced unary operator {:?}", kind),
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left, environment)?;
                let right = self.evaluate(right, environment)?;
                let result = match operator.kind {
                    TokenKind::Minus => left - right,
                    TokenKind::Plus => left + right,
                    TokenKind::Star => left * right,
                    TokenKind::Slash => left / right,
                    TokenKind::Greater => left
                        .numbers(&right)
                        .map(|(lhs, rhs)| RuntimeValue::Boolean(lhs > rhs)),
                    TokenKind::GreaterEqual => left
                        .numbers(&right)
                        .map(|(lhs, rhs)| RuntimeValue::Boolean(lhs >= rhs)),
                    TokenKind::Less => left
                        .numbers(&right)
                        .map(|(lhs, rhs)| RuntimeValue::Boolean(lhs < rhs)),
                    TokenKind::LessEqual => left
                        .numbers(&right)
                        .map(|(lhs, rhs)| RuntimeValue::Boolean(lhs <= rhs)),
                    TokenKind::BangEqual => Ok(RuntimeValue::Boolean(left != right)),
                    TokenKind::EqualEqual => Ok(RuntimeValue::Boolean(left == right)),
                    kind => unreachable!("parser produced binary operator {:?}", kind),
                };
                result.map_err(|err| RuntimeError::operator(operator, err))
            }
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left, environment)?;
                match (operator.kind, left.is_truthy()) {
                    (TokenKind::Or, true) | (TokenKind::And, false) => Ok(left),
                    _ => self.evaluate(right, environment),
                }
            }
            Expr::Variable(name) => environment.borrow().get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value, environment)?;
                environment.borrow_mut().assign(name, value)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_function_call(callee, paren, arguments, environment),
        }
    }

    fn evaluate_function_call(
        &mut self,
        callee: &Expr,
        paren: &Token,
        arguments: &[Expr],
        environment: &EnvRef,
    ) -> RuntimeResult {
        let callee = self.evaluate(callee, environment)?;

        let mut argument_vals = Vec::with_capacity(arguments.len());
        for argument in arguments {
            argument_vals.push(self.evaluate(argument, environment)?);
        }

        let function = match callee {
            RuntimeValue::Callable(function) => function,
            RuntimeValue::Nil
            | RuntimeValue::Boolean(_)
            | RuntimeValue::Number(_)
            | RuntimeValue::String(_) => {
                return Err(RuntimeError::NotCallable {
                    token: paren.clone(),
                })
            }
        };

        if function.arity() != argument_vals.len() {
            return Err(RuntimeError::ArityMismatch {
                token: paren.clone(),
                expected: function.arity(),
                found: argument_vals.len(),
            });
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow {
                token: paren.clone(),
            });
        }

        tracing::trace!(
            callee = %function,
            depth = self.call_depth,
            line = paren.line,
            "call"
        );
        self.call_depth += 1;
        let result = stacker::maybe_grow(RED_ZONE, STACK_PER_CALL, || {
            function.call(self, argument_vals)
        });
        self.call_depth -= 1;
        result
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
