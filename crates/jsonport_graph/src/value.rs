// SPDX-License-Identifier: MIT OR Apache-2.0
//! Native values stored in reflective fields.

use crate::node::NodeId;
use crate::reflect::ObjectId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A field value in its native representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    /// Unset / default
    #[default]
    None,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float (stored as double)
    Float(f64),
    /// String, name or text
    String(String),
    /// Enum entry without its type prefix
    Enum(String),
    /// Nested structure
    Struct(StructValue),
    /// Resolved object reference
    Object(ObjectRef),
    /// Array
    Array(Vec<Value>),
    /// Map, in declaration order
    Map(Vec<(Value, Value)>),
    /// Expression input
    Input(ExpressionInput),
}

impl Value {
    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string slice (strings and enums)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Get as struct
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Get as object reference
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(r) => Some(r),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get as expression input
    pub fn as_input(&self) -> Option<&ExpressionInput> {
        match self {
            Self::Input(input) => Some(input),
            _ => None,
        }
    }

    /// Whether the value is unset
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Value of a nested structure. Fields that were never assigned keep their
/// descriptor default and are absent from `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructValue {
    /// Struct type name
    pub struct_name: String,
    /// Assigned fields
    pub fields: IndexMap<String, Value>,
}

impl StructValue {
    /// Create an empty struct value
    pub fn new(struct_name: impl Into<String>) -> Self {
        Self {
            struct_name: struct_name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field assignment
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Get an assigned field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a float field, treating unset as `None`
    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }
}

/// A resolved reference to another object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectRef {
    /// Expression node inside the graph being built
    Expression(NodeId),
    /// Sub-object materialized from the same export table
    Object(ObjectId),
    /// Externally persisted asset, by object path
    Asset(String),
}

/// Constant carried by a material input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputConstant {
    /// sRGB color bytes (R, G, B, A)
    Color([u8; 4]),
    /// Scalar value
    Scalar(f64),
    /// 3D vector
    Vector([f64; 3]),
}

/// Channel mask on an expression input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct MaskBits {
    /// Composite mask flag
    pub mask: bool,
    /// Red channel
    pub r: bool,
    /// Green channel
    pub g: bool,
    /// Blue channel
    pub b: bool,
    /// Alpha channel
    pub a: bool,
}

/// An input slot value: edge to another node's output, or a constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExpressionInput {
    /// Source node, if connected
    pub expression: Option<NodeId>,
    /// Output slot index on the source node
    pub output_index: i32,
    /// Optional input name override
    pub input_name: Option<String>,
    /// Channel mask
    pub mask: MaskBits,
    /// Constant fallback (material inputs only)
    pub constant: Option<InputConstant>,
    /// When set the constant is authoritative and the edge is inert
    pub use_constant: bool,
}

impl ExpressionInput {
    /// Create an input connected to a node output
    pub fn connected(expression: NodeId, output_index: i32) -> Self {
        Self {
            expression: Some(expression),
            output_index,
            ..Default::default()
        }
    }

    /// Create an input that uses a constant
    pub fn constant(constant: InputConstant) -> Self {
        Self {
            constant: Some(constant),
            use_constant: true,
            ..Default::default()
        }
    }

    /// Whether this input forms a live graph edge
    pub fn is_connected(&self) -> bool {
        !self.use_constant && self.expression.is_some()
    }

    /// The constant, if it is authoritative
    pub fn effective_constant(&self) -> Option<&InputConstant> {
        if self.use_constant {
            self.constant.as_ref()
        } else {
            None
        }
    }
}

/// Convert a linear color channel to an sRGB byte
pub fn linear_to_srgb_byte(linear: f64) -> u8 {
    let c = linear.clamp(0.0, 1.0);
    let srgb = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (srgb * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_input_is_inert() {
        let mut input = ExpressionInput::constant(InputConstant::Scalar(0.5));
        input.expression = Some(NodeId::new());
        assert!(!input.is_connected());
        assert_eq!(input.effective_constant(), Some(&InputConstant::Scalar(0.5)));
    }

    #[test]
    fn test_connected_input() {
        let input = ExpressionInput::connected(NodeId::new(), 2);
        assert!(input.is_connected());
        assert!(input.effective_constant().is_none());
        assert_eq!(input.output_index, 2);
    }

    #[test]
    fn test_srgb_conversion() {
        assert_eq!(linear_to_srgb_byte(0.0), 0);
        assert_eq!(linear_to_srgb_byte(1.0), 255);
        assert_eq!(linear_to_srgb_byte(2.0), 255);
        // Mid grey in linear space is brighter in sRGB
        assert!(linear_to_srgb_byte(0.5) > 128);
    }
}
