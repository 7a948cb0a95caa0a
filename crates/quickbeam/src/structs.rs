//! Shared, mutable struct instances
//!
//! Instances live in a [`StructHeap`] arena owned by the interpreter and
//! are addressed by [`InstanceId`] handles. A
//! [`StructRef`](crate::value::StructRef) value copies the handle, never
//! the instance, so two variables holding the same handle observe each
//! other's field mutations. Equality compares handles.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::TypeSpec;
use crate::value::Value;

/// The field layout of one struct type, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct StructLayout {
    /// The struct type's name.
    pub name: String,
    /// Field name to declared type, in declaration order.
    pub fields: IndexMap<String, TypeSpec>,
}

/// A handle addressing one instance in the [`StructHeap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(usize);

impl InstanceId {
    /// The handle's arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One heap-resident mutable record.
#[derive(Debug, Clone)]
pub struct StructInstance {
    layout: Rc<StructLayout>,
    fields: IndexMap<String, Value>,
}

impl StructInstance {
    /// The instance's struct type name.
    pub fn type_name(&self) -> &str {
        &self.layout.name
    }

    /// Read a field's current value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The declared type of a field.
    pub fn field_type(&self, field: &str) -> Option<&TypeSpec> {
        self.layout.fields.get(field)
    }

    /// Overwrite an existing field. Returns `false` if the struct has no
    /// such field — field assignment never adds fields.
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        match self.fields.get_mut(field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Iterate over fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, v)| (name.as_str(), v))
    }
}

/// The arena of all struct instances allocated during a run.
///
/// Instances are never freed individually; the arena is dropped with the
/// interpreter when the run ends.
#[derive(Debug, Default)]
pub struct StructHeap {
    instances: Vec<StructInstance>,
}

impl StructHeap {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new instance of `layout`, every field holding its
    /// type's zero value.
    pub fn alloc(&mut self, layout: Rc<StructLayout>) -> InstanceId {
        let fields = layout
            .fields
            .iter()
            .map(|(name, ty)| (name.clone(), Value::zero(ty)))
            .collect();
        self.instances.push(StructInstance { layout, fields });
        InstanceId(self.instances.len() - 1)
    }

    /// Read an instance.
    ///
    /// # Panics
    ///
    /// Panics on a handle this heap did not mint (evaluator contract).
    pub fn get(&self, id: InstanceId) -> &StructInstance {
        &self.instances[id.0]
    }

    /// Read an instance mutably.
    ///
    /// # Panics
    ///
    /// Panics on a handle this heap did not mint (evaluator contract).
    pub fn get_mut(&mut self, id: InstanceId) -> &mut StructInstance {
        &mut self.instances[id.0]
    }

    /// The number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instances have been allocated.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
