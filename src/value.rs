//! Field values that may be computed lazily.

use std::fmt::{self, Debug};

use anyhow::Result;

/// A field value of a template node: either given directly, or a
/// producer that is called (once) right before the value is needed.
pub enum Value<T> {
    Literal(T),
    Deferred(Box<dyn FnOnce() -> Result<T>>),
}

/// Wrap a producer as a deferred value.
pub fn deferred<T, F>(f: F) -> Value<T>
where F: FnOnce() -> Result<T> + 'static
{
    Value::Deferred(Box::new(f))
}

impl<T> Value<T> {
    /// Get the value, running the producer if there is one. Errors
    /// from the producer are passed through untouched.
    pub fn force(self) -> Result<T> {
        match self {
            Value::Literal(v) => Ok(v),
            Value::Deferred(f) => f(),
        }
    }

    pub fn as_literal(&self) -> Option<&T> {
        match self {
            Value::Literal(v) => Some(v),
            Value::Deferred(_) => None,
        }
    }
}

impl<T: Debug> Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Value::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}
