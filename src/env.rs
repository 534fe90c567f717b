// ABOUTME: Environment module for managing variable bindings and lexical scopes

use crate::error::RuntimeError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A mutable mapping from names to values, plus a link to the enclosing
/// environment captured at closure-creation time (spec §3).
///
/// Because the whole mapping lives behind a `RefCell` and environments are
/// always shared via `Rc`, a closure's captured environment and later
/// mutations made through any other handle to the same `Rc<Environment>`
/// are the same storage — satisfying invariant I2 (shared cell identity)
/// without a separate per-variable cell type.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new top-level environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment linked to `parent`.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// `define(env, name, v)`: if `name` already has an entry in this
    /// environment's own mapping, overwrite it. Otherwise create a new
    /// entry. Never touches an outer scope (spec §4.4).
    pub fn define(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    /// `lookup(env, name)`: search this environment's mapping, then walk
    /// outward through parents. Fails with `UnboundVar` if no binding is
    /// found anywhere along the chain.
    pub fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Ok(value.clone());
        }

        if let Some(parent) = &self.parent {
            return parent.lookup(name);
        }

        Err(RuntimeError::unbound_get(name))
    }

    /// `assign(env, name, v)`: like lookup, but writes the binding
    /// in-place wherever it's found, so every environment sharing that
    /// mapping observes the new value. Fails with `UnboundVar` if the
    /// name was never declared.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }

        if let Some(parent) = &self.parent {
            return parent.assign(name, value);
        }

        Err(RuntimeError::unbound_set(name))
    }

    /// `bindVars(captured, pairs)`: a fresh environment whose parent is
    /// `captured`, with `pairs` defined on top of it. Used for function
    /// application — parameter bindings shadow the closure's captured
    /// scope without mutating it (spec §4.4).
    pub fn bind_vars(captured: Rc<Environment>, pairs: Vec<(String, Value)>) -> Rc<Environment> {
        let env = Environment::with_parent(captured);
        for (name, value) in pairs {
            env.define(&name, value);
        }
        env
    }
}
