use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::token::Token;

use super::{
    runtime_error::{RuntimeError, RuntimeResult},
    runtime_value::RuntimeValue,
};

/// Shared handle to a scope frame. Closures keep their defining frame alive
/// through one of these.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope: its own bindings plus the enclosing frame.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, RuntimeValue>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment::default()
    }

    /// instantate environment with an `outer_scope` environment
    pub fn new_with(outer_scope: &EnvRef) -> Environment {
        Environment {
            values: HashMap::new(),
            enclosing: Some(Rc::clone(outer_scope)),
        }
    }

    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Binds `name` in this frame, replacing any previous binding here.
    pub fn define(&mut self, name: &str, value: RuntimeValue) {
        self.values.insert(String::from(name), value);
    }

    pub fn get(&self, name: &Token) -> RuntimeResult {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else {
            match &self.enclosing {
                Some(enclosing) => enclosing.borrow().get(name),
                None => Err(RuntimeError::UndefinedVariable {
                    token: name.clone(),
                }),
            }
        }
    }

    /// Rebinds the nearest existing `name` in the chain. Never creates one.
    pub fn assign(&mut self, name: &Token, value: RuntimeValue) -> RuntimeResult {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value.clone();
            Ok(value)
        } else {
            match &self.enclosing {
                Some(enclosing) => enclosing.borrow_mut().assign(name, value),
                None => Err(RuntimeError::UndefinedVariable {
                    token: name.clone(),
                }),
            }
        }
    }
}
