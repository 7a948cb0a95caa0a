//! Runtime environment managing variable bindings
//!
//! An [`Environment`] is one scope's insertion-ordered mapping from
//! variable name to [`Binding`]. It enforces the scope-local contract —
//! `create` refuses redeclaration, `set` refuses to invent bindings — and
//! reports absence with `Option`/`bool`, leaving error construction to the
//! evaluator. The stack of environments lives in
//! [`ScopeStack`](crate::environment::ScopeStack).

mod stack;

pub use stack::{Mark, ScopeKind, ScopeStack};

use indexmap::IndexMap;

use crate::ast::TypeSpec;
use crate::value::Value;

/// A single variable binding.
///
/// The declared type rides along with the value because assignment and
/// return coercion target the *declared* type, and the current value may
/// be an unforced thunk whose type is not yet known.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The variable's declared type.
    pub ty: TypeSpec,
    /// The currently bound value.
    pub value: Value,
}

impl Binding {
    /// Create a binding.
    pub fn new(ty: TypeSpec, value: Value) -> Self {
        Self { ty, value }
    }
}

/// One scope's name-to-binding mapping.
///
/// # Example
///
/// ```
/// use quickbeam::{ast::TypeSpec, Binding, Environment, Value};
///
/// let mut env = Environment::new();
/// assert!(env.create("x", Binding::new(TypeSpec::Int, Value::Int(1))));
/// // Redeclaring in the same scope fails.
/// assert!(!env.create("x", Binding::new(TypeSpec::Int, Value::Int(2))));
/// // Assignment replaces the value of an existing binding only.
/// assert!(env.set("x", Value::Int(3)));
/// assert!(!env.set("y", Value::Int(4)));
/// assert_eq!(env.get("x").map(|b| &b.value), Some(&Value::Int(3)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: IndexMap<String, Binding>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new binding. Returns `false` if the name already exists
    /// in this environment — redeclaration within one scope is refused.
    pub fn create(&mut self, name: impl Into<String>, binding: Binding) -> bool {
        let name = name.into();
        if self.bindings.contains_key(&name) {
            return false;
        }
        self.bindings.insert(name, binding);
        true
    }

    /// Replace the value of an existing binding. Returns `false` if the
    /// name is not bound here — assignment never creates bindings.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.bindings.get_mut(name) {
            Some(binding) => {
                binding.value = value;
                true
            }
            None => false,
        }
    }

    /// Look up a binding by name.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Look up a binding mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings.get_mut(name)
    }

    /// Whether a name is bound in this environment.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// The number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the environment is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(name, b)| (name.as_str(), b))
    }
}
