// SPDX-License-Identifier: MIT OR Apache-2.0
//! Field descriptors: the type tags a class exposes for each settable field.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Flavour of an expression input slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InputKind {
    /// Plain expression input (no constant fallback)
    #[default]
    Default,
    /// Color material input, constant is an sRGB color
    Color,
    /// Scalar material input, constant is a float
    Scalar,
    /// Vector material input, constant is a 3D vector
    Vector,
}

/// Type tag of a field known to a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Boolean value
    Bool,
    /// Integer value (bytes, ints, int64)
    Int,
    /// Floating point value (float or double)
    Float,
    /// Free-form string
    String,
    /// Engine name
    Name,
    /// Localized text
    Text,
    /// Enumeration, carrying the enum type name
    Enum(String),
    /// Nested structure, carrying the struct type name
    Struct(String),
    /// Reference to another object of the given class
    Object(String),
    /// Array of values of the inner kind
    Array(Box<FieldKind>),
    /// Map from key kind to value kind
    Map(Box<FieldKind>, Box<FieldKind>),
    /// Expression input (graph edge)
    Input(InputKind),
}

impl FieldKind {
    /// Shorthand for an array kind
    pub fn array_of(inner: FieldKind) -> Self {
        Self::Array(Box::new(inner))
    }

    /// Shorthand for a map kind
    pub fn map_of(key: FieldKind, value: FieldKind) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Shorthand for a struct kind
    pub fn structure(name: impl Into<String>) -> Self {
        Self::Struct(name.into())
    }

    /// Shorthand for an object reference kind
    pub fn object(class: impl Into<String>) -> Self {
        Self::Object(class.into())
    }

    /// Shorthand for an enum kind
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    /// Check whether a native value can be stored in a field of this kind
    pub fn accepts(&self, value: &Value) -> bool {
        // Unset is valid for every field
        if matches!(value, Value::None) {
            return true;
        }

        match (self, value) {
            (Self::Bool, Value::Bool(_)) => true,
            (Self::Int, Value::Int(_)) => true,
            // Integers widen into float fields without loss for the values we store
            (Self::Float, Value::Float(_) | Value::Int(_)) => true,
            (Self::String | Self::Name | Self::Text, Value::String(_)) => true,
            (Self::Enum(_), Value::Enum(_)) => true,
            (Self::Struct(name), Value::Struct(s)) => s.struct_name == *name,
            (Self::Object(_), Value::Object(_)) => true,
            (Self::Array(inner), Value::Array(items)) => items.iter().all(|v| inner.accepts(v)),
            (Self::Map(key, val), Value::Map(entries)) => entries
                .iter()
                .all(|(k, v)| key.accepts(k) && val.accepts(v)),
            (Self::Input(_), Value::Input(_)) => true,
            _ => false,
        }
    }

    /// Whether this kind holds references that need resolving
    pub fn is_reference(&self) -> bool {
        match self {
            Self::Object(_) | Self::Input(_) => true,
            Self::Array(inner) => inner.is_reference(),
            Self::Map(key, value) => key.is_reference() || value.is_reference(),
            _ => false,
        }
    }
}

/// A settable field on a class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Field name as it appears in the property bag
    pub name: String,
    /// Type tag
    pub kind: FieldKind,
    /// Default value (falls back to `Value::None`)
    pub default_value: Option<Value>,
    /// Whether generic assignment may write this field
    pub read_only: bool,
}

impl Field {
    /// Create a new field
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default_value: None,
            read_only: false,
        }
    }

    /// Create an expression input field
    pub fn input(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Input(InputKind::Default))
    }

    /// Create a material input field of the given flavour
    pub fn material_input(name: impl Into<String>, kind: InputKind) -> Self {
        Self::new(name, FieldKind::Input(kind))
    }

    /// Set the default value
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Mark as read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// The value a fresh object holds for this field
    pub fn default(&self) -> Value {
        self.default_value.clone().unwrap_or(Value::None)
    }
}
