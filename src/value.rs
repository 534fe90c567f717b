// ABOUTME: Runtime value types for the D interpreter — a superset of expression shapes

use crate::ast::{Body, TypeIndicator};
use crate::env::Environment;
use crate::error::RuntimeError;
use std::fmt;
use std::rc::Rc;

/// A host-provided function: takes already-evaluated argument values and
/// returns a value or a runtime error. This is the shape `register_builtin`
/// (spec §6) hangs off the environment.
pub type HostFn = Rc<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>;

#[derive(Clone)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    String(String),
    Array(Vec<Value>),
    /// Ordered, possibly-duplicate-keyed record. An empty name denotes an
    /// unnamed slot (spec §3).
    Tuple(Vec<(String, Value)>),
    Closure {
        params: Vec<String>,
        body: Rc<Body>,
        env: Rc<Environment>,
    },
    BuiltIn(HostFn),
    Empty,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        self.type_indicator().as_str()
    }

    pub fn type_indicator(&self) -> TypeIndicator {
        match self {
            Value::Int(_) => TypeIndicator::Int,
            Value::Real(_) => TypeIndicator::Real,
            Value::Bool(_) => TypeIndicator::Bool,
            Value::String(_) => TypeIndicator::String,
            Value::Array(_) => TypeIndicator::Array,
            Value::Tuple(_) => TypeIndicator::Tuple,
            Value::Closure { .. } | Value::BuiltIn(_) => TypeIndicator::Func,
            Value::Empty => TypeIndicator::Empty,
        }
    }

    pub fn is_instance_of(&self, indicator: TypeIndicator) -> bool {
        self.type_indicator() == indicator
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "Int({})", n),
            Value::Real(n) => write!(f, "Real({})", n),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Array(items) => write!(f, "Array({:?})", items),
            Value::Tuple(items) => write!(f, "Tuple({:?})", items),
            Value::Closure { params, .. } => write!(f, "Closure(params={:?})", params),
            Value::BuiltIn(_) => write!(f, "BuiltIn(..)"),
            Value::Empty => write!(f, "Empty"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Real(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Tuple(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if key.is_empty() {
                        write!(f, "{}", value)?;
                    } else {
                        write!(f, "{} := {}", key, value)?;
                    }
                }
                write!(f, "}}")
            }
            Value::Closure { .. } => write!(f, "<func>"),
            Value::BuiltIn(_) => write!(f, "<func>"),
            Value::Empty => write!(f, "empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_numbers() {
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(format!("{}", Value::Real(2.5)), "2.5");
    }

    #[test]
    fn display_bool() {
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::Bool(false)), "false");
    }

    #[test]
    fn display_array() {
        let arr = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(format!("{}", arr), "[1, 2, 3]");
    }

    #[test]
    fn display_tuple_with_and_without_keys() {
        let tuple = Value::Tuple(vec![
            ("a".to_string(), Value::Int(1)),
            (String::new(), Value::Int(2)),
            ("b".to_string(), Value::Int(3)),
        ]);
        assert_eq!(format!("{}", tuple), "{a := 1, 2, b := 3}");
    }

    #[test]
    fn display_empty() {
        assert_eq!(format!("{}", Value::Empty), "empty");
    }

    #[test]
    fn type_indicators() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Real(1.0).type_name(), "real");
        assert_eq!(Value::Empty.type_name(), "empty");
        assert!(Value::Int(1).is_instance_of(TypeIndicator::Int));
        assert!(!Value::Int(1).is_instance_of(TypeIndicator::Real));
    }
}
