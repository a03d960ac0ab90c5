use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Not, Sub};
use std::rc::Rc;

use super::{runtime_error::OperatorError, runtime_error::RuntimeResult, Interpreter};
use crate::ast::LiteralValue;

/// Anything that can be invoked with `callee(arguments)`.
pub trait Callable: fmt::Debug + fmt::Display {
    fn arity(&self) -> usize;
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<RuntimeValue>) -> RuntimeResult;
}

#[derive(Debug, Clone)]
pub enum RuntimeValue {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    Callable(Rc<dyn Callable>),
}

pub type OperatorResult = Result<RuntimeValue, OperatorError>;

impl RuntimeValue {
    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Nil | Self::Boolean(false) => false,
            Self::Boolean(true) | Self::Number(_) | Self::String(_) | Self::Callable(_) => true,
        }
    }

    /// Both operands as numbers, for arithmetic and comparison operators.
    pub fn numbers(&self, rhs: &Self) -> Result<(f64, f64), OperatorError> {
        match (self, rhs) {
            (Self::Number(lhs), Self::Number(rhs)) => Ok((*lhs, *rhs)),
            _ => Err(OperatorError::OperandsNotNumbers),
        }
    }
}

impl Neg for RuntimeValue {
    type Output = OperatorResult;
    fn neg(self) -> Self::Output {
        match self {
            Self::Number(val) => Ok(Self::Number(-val)),
            _ => Err(OperatorError::OperandNotNumber),
        }
    }
}

impl Not for RuntimeValue {
    type Output = Self;
    fn not(self) -> Self::Output {
        Self::Boolean(!self.is_truthy())
    }
}

impl Add for RuntimeValue {
    type Output = OperatorResult;
    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Self::Number(lhs), Self::Number(rhs)) => Ok(Self::Number(lhs + rhs)),
            (lhs @ Self::String(_), rhs) | (lhs, rhs @ Self::String(_)) => {
                Ok(Self::String(format!("{}{}", lhs, rhs)))
            }
            _ => Err(OperatorError::InvalidOperands),
        }
    }
}

impl Sub for RuntimeValue {
    type Output = OperatorResult;
    fn sub(self, rhs: Self) -> Self::Output {
        let (lhs, rhs) = self.numbers(&rhs)?;
        Ok(Self::Number(lhs - rhs))
    }
}

impl Mul for RuntimeValue {
    type Output = OperatorResult;
    fn mul(self, rhs: Self) -> Self::Output {
        let (lhs, rhs) = self.numbers(&rhs)?;
        Ok(Self::Number(lhs * rhs))
    }
}

impl Div for RuntimeValue {
    type Output = OperatorResult;
    fn div(self, rhs: Self) -> Self::Output {
        let (lhs, rhs) = self.numbers(&rhs)?;
        if rhs == 0.0 {
            Err(OperatorError::DivisionByZero)
        } else {
            Ok(Self::Number(lhs / rhs))
        }
    }
}

/// Structural equality without coercion; callables compare by identity.
impl PartialEq for RuntimeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Boolean(lhs), Self::Boolean(rhs)) => lhs == rhs,
            (Self::Number(lhs), Self::Number(rhs)) => lhs == rhs,
            (Self::String(lhs), Self::String(rhs)) => lhs == rhs,
            (Self::Callable(lhs), Self::Callable(rhs)) => Rc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }
}

/// Textual form used by `print` and string concatenation.
impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(val) => write!(f, "{}", val),
            Self::Number(val) => write!(f, "{}", val),
            Self::String(val) => write!(f, "{}", val),
            Self::Callable(callable) => write!(f, "{}", callable),
        }
    }
}

impl From<LiteralValue> for RuntimeValue {
    fn from(value: LiteralValue) -> Self {
        match value {
            LiteralValue::Number(litral_value) => RuntimeValue::Number(litral_value),
            LiteralValue::String(litral_value) => RuntimeValue::String(litral_value),
            LiteralValue::Boolean(litral_value) => RuntimeValue::Boolean(litral_value),
            LiteralValue::Nil => RuntimeValue::Nil,
        }
    }
}
