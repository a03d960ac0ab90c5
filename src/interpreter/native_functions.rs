use std::fmt;
use std::time::SystemTime;

use super::{
    runtime_error::RuntimeResult,
    runtime_value::{Callable, RuntimeValue},
    Interpreter,
};

/// `clock()`: seconds since the Unix epoch.
#[derive(Debug)]
pub struct NativeFnClock;

impl Callable for NativeFnClock {
    fn arity(&self) -> usize {
        0
    }

    fn call(&self, _interpreter: &mut Interpreter, _arguments: Vec<RuntimeValue>) -> RuntimeResult {
        // A clock set before the epoch reads as zero.
        let elapsed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        Ok(RuntimeValue::Number(elapsed.as_secs_f64()))
    }
}

impl fmt::Display for NativeFnClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn clock>")
    }
}
