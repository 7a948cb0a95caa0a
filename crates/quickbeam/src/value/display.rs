//! Display and Debug implementations for Value

use std::fmt;

use super::{StructRef, Value};

impl fmt::Display for Value {
    /// The language's printable form: what `print` emits.
    ///
    /// Both the `nil` literal and a nil struct handle print as `nil`.
    /// Printing a non-nil struct handle is undefined by the language; this
    /// implementation shows the type and instance index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(true) => write!(f, "true"),
            Value::Bool(false) => write!(f, "false"),
            Value::Nil => write!(f, "nil"),
            Value::StructRef(r) => write!(f, "{}", r),
            Value::Deferred(thunk) => match thunk.peek() {
                Some(inner) => write!(f, "{}", inner),
                None => write!(f, "<deferred>"),
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "Int({})", n),
            Value::Str(s) => write!(f, "Str({:?})", s.as_str()),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Nil => write!(f, "Nil"),
            Value::StructRef(r) => write!(f, "StructRef({})", r),
            Value::Deferred(thunk) => match thunk.peek() {
                Some(inner) => write!(f, "Deferred(forced {:?})", inner),
                None => write!(f, "Deferred(pending)"),
            },
        }
    }
}

impl fmt::Display for StructRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance {
            None => write!(f, "nil"),
            Some(id) => write!(f, "<{}#{}>", self.type_name, id.index()),
        }
    }
}
