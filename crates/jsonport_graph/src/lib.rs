// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host object model for jsonport.
//!
//! This crate stands in for the engine side of an import:
//! - Type tags and typed values for reflective fields
//! - A class registry describing settable fields per class
//! - Generic objects and expression nodes that expose their fields at runtime
//! - The expression graph container owned by materials and anim blueprints
//!
//! ## Architecture
//!
//! Objects never own each other. An [`ExpressionGraph`] owns all of its
//! nodes, and edges are expression inputs holding the [`NodeId`] of their
//! source node.

pub mod port;
pub mod value;
pub mod reflect;
pub mod node;
pub mod connection;
pub mod graph;
pub mod structs;
pub mod graphs;

pub use node::{ClassDescriptor, ClassRegistry, Node, NodeCategory, NodeId};
pub use port::{Field, FieldKind, InputKind};
pub use reflect::{Object, ObjectId, Reflect, ReflectError};
pub use value::{ExpressionInput, InputConstant, MaskBits, ObjectRef, StructValue, Value};
pub use connection::Connection;
pub use graph::{ExpressionGraph, GraphError};
