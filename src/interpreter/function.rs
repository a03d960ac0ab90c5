use super::environment::{EnvRef, Environment};
use super::runtime_error::RuntimeResult;
use super::runtime_value::{Callable, RuntimeValue};
use super::{Completion, Interpreter};
use crate::ast::FunctionDecl;
use std::fmt;
use std::rc::Rc;

/// A user-defined function closed over the environment it was declared in.
pub struct Function {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
}

impl Function {
    pub fn new(declaration: &Rc<FunctionDecl>, closure: &EnvRef) -> Function {
        Function {
            declaration: Rc::clone(declaration),
            closure: Rc::clone(closure),
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }
}

// The closure can reach this function again, so it is left out.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<RuntimeValue>) -> RuntimeResult {
        let mut environment = Environment::new_with(&self.closure);
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        match interpreter.execute_block(&self.declaration.body, environment.into_ref())? {
            Completion::Normal => Ok(RuntimeValue::Nil),
            Completion::Return(value) => Ok(value),
            signal @ (Completion::Break | Completion::Continue) => {
                unreachable!("{:?} escaped the body of {}", signal, self)
            }
        }
    }
}
