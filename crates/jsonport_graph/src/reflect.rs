// SPDX-License-Identifier: MIT OR Apache-2.0
//! Capability-based field introspection.
//!
//! Every host object exposes its class name and a property store. The
//! settable fields and their type tags come from the [`ClassRegistry`], so
//! a deserializer can assign values to a target whose concrete type it does
//! not know statically.

use crate::node::ClassRegistry;
use crate::port::Field;
use crate::value::{StructValue, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a materialized object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Error when assigning a field through reflection
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReflectError {
    /// The class has no field with this name
    #[error("{class} has no field named {field}")]
    UnknownField {
        /// Class or struct name
        class: String,
        /// Requested field
        field: String,
    },

    /// The value does not fit the field's type tag
    #[error("value for {class}.{field} does not match the field type")]
    KindMismatch {
        /// Class or struct name
        class: String,
        /// Requested field
        field: String,
    },

    /// The field may not be written by generic assignment
    #[error("{class}.{field} is read-only")]
    ReadOnly {
        /// Class or struct name
        class: String,
        /// Requested field
        field: String,
    },
}

/// Reflective access to a host object
pub trait Reflect {
    /// Runtime class (or struct) name
    fn class_name(&self) -> &str;

    /// Instance name
    fn object_name(&self) -> &str;

    /// Assigned field values
    fn values(&self) -> &IndexMap<String, Value>;

    /// Mutable assigned field values
    fn values_mut(&mut self) -> &mut IndexMap<String, Value>;

    /// Look up a settable field by name
    fn field<'r>(&self, classes: &'r ClassRegistry, name: &str) -> Option<&'r Field> {
        classes.field(self.class_name(), name)
    }

    /// Enumerate all settable fields, inherited ones first
    fn fields<'r>(&self, classes: &'r ClassRegistry) -> Vec<&'r Field> {
        classes.fields(self.class_name())
    }

    /// Assign a field after checking it exists, is writable and accepts the value
    fn set_field(
        &mut self,
        classes: &ClassRegistry,
        name: &str,
        value: Value,
    ) -> Result<(), ReflectError> {
        let Some(field) = self.field(classes, name) else {
            return Err(ReflectError::UnknownField {
                class: self.class_name().to_string(),
                field: name.to_string(),
            });
        };
        if field.read_only {
            return Err(ReflectError::ReadOnly {
                class: self.class_name().to_string(),
                field: name.to_string(),
            });
        }
        if !field.kind.accepts(&value) {
            return Err(ReflectError::KindMismatch {
                class: self.class_name().to_string(),
                field: name.to_string(),
            });
        }
        self.values_mut().insert(name.to_string(), value);
        Ok(())
    }

    /// Read a field value; unassigned fields yield their declared default
    fn get_field(&self, classes: &ClassRegistry, name: &str) -> Option<Value> {
        if let Some(value) = self.values().get(name) {
            return Some(value.clone());
        }
        self.field(classes, name).map(Field::default)
    }

    /// Read an assigned value without consulting defaults
    fn value(&self, name: &str) -> Option<&Value> {
        self.values().get(name)
    }
}

/// A generic reflective object (assets and sub-objects)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Unique object ID
    pub id: ObjectId,
    /// Class name
    pub class: String,
    /// Object name
    pub name: String,
    /// Containing object name, if any
    pub outer: Option<String>,
    /// Assigned values
    pub values: IndexMap<String, Value>,
}

impl Object {
    /// Create a new empty object
    pub fn new(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            class: class.into(),
            name: name.into(),
            outer: None,
            values: IndexMap::new(),
        }
    }

    /// Set the containing object
    pub fn with_outer(mut self, outer: impl Into<String>) -> Self {
        self.outer = Some(outer.into());
        self
    }

    /// Serialize to a RON string
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

impl Reflect for Object {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn object_name(&self) -> &str {
        &self.name
    }

    fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    fn values_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.values
    }
}

impl Reflect for StructValue {
    fn class_name(&self) -> &str {
        &self.struct_name
    }

    fn object_name(&self) -> &str {
        &self.struct_name
    }

    fn values(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    fn values_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ClassDescriptor, NodeCategory};
    use crate::port::FieldKind;

    fn registry() -> ClassRegistry {
        let mut classes = ClassRegistry::new();
        classes.register(
            ClassDescriptor::new("Thing", NodeCategory::Asset).with_fields(vec![
                Field::new("Count", FieldKind::Int).with_default(Value::Int(4)),
                Field::new("Guid", FieldKind::structure("Guid")).read_only(),
            ]),
        );
        classes
    }

    #[test]
    fn test_set_and_get_field() {
        let classes = registry();
        let mut object = Object::new("Thing", "A");

        assert_eq!(object.get_field(&classes, "Count"), Some(Value::Int(4)));
        object.set_field(&classes, "Count", Value::Int(9)).unwrap();
        assert_eq!(object.get_field(&classes, "Count"), Some(Value::Int(9)));
    }

    #[test]
    fn test_set_field_errors() {
        let classes = registry();
        let mut object = Object::new("Thing", "A");

        assert!(matches!(
            object.set_field(&classes, "Nope", Value::Int(1)),
            Err(ReflectError::UnknownField { .. })
        ));
        assert!(matches!(
            object.set_field(&classes, "Count", Value::String("x".into())),
            Err(ReflectError::KindMismatch { .. })
        ));
        assert!(matches!(
            object.set_field(&classes, "Guid", Value::None),
            Err(ReflectError::ReadOnly { .. })
        ));
        assert!(object.values.is_empty());
    }
}
