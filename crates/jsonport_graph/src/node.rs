// SPDX-License-Identifier: MIT OR Apache-2.0
//! Class descriptors, the class registry and expression node instances.

use crate::port::Field;
use crate::reflect::{Object, Reflect};
use crate::value::{ExpressionInput, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Class category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Input nodes (constants)
    Input,
    /// Parameter nodes
    Parameter,
    /// Output nodes
    Output,
    /// Math operations
    Math,
    /// Texture operations
    Texture,
    /// Logic/flow control (switches)
    Logic,
    /// Function calls and pins
    Function,
    /// Utility nodes (reroute, composites)
    Utility,
    /// Animation graph nodes
    Animation,
    /// Comments and annotations
    Annotation,
    /// Top-level asset classes
    Asset,
    /// Sub-objects owned by an asset
    Subobject,
    /// Plain data structures
    Struct,
}

/// Description of a host class: its name, parent and settable fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Class name
    pub name: String,
    /// Parent class, for field inheritance and `is_child_of`
    pub parent: Option<String>,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Fields declared on this class (not inherited ones)
    pub fields: Vec<Field>,
    /// Number of positional input slots, for classes that store their
    /// inputs as a fixed array instead of named fields
    pub positional_inputs: Option<usize>,
}

impl ClassDescriptor {
    /// Create a new class descriptor
    pub fn new(name: impl Into<String>, category: NodeCategory) -> Self {
        Self {
            name: name.into(),
            parent: None,
            category,
            description: String::new(),
            fields: Vec::new(),
            positional_inputs: None,
        }
    }

    /// Set the parent class
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the declared fields
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Declare a fixed number of positional input slots
    pub fn with_positional_inputs(mut self, count: usize) -> Self {
        self.positional_inputs = Some(count);
        self
    }
}

/// Registry of host classes, structs and class redirects
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, ClassDescriptor>,
    structs: IndexMap<String, ClassDescriptor>,
    redirects: IndexMap<String, String>,
}

impl ClassRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class
    pub fn register(&mut self, class: ClassDescriptor) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Register a struct
    pub fn register_struct(&mut self, descriptor: ClassDescriptor) {
        self.structs.insert(descriptor.name.clone(), descriptor);
    }

    /// Register a renamed class
    pub fn add_redirect(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.redirects.insert(from.into(), to.into());
    }

    /// Merge another registry into this one
    pub fn extend(&mut self, other: ClassRegistry) {
        self.classes.extend(other.classes);
        self.structs.extend(other.structs);
        self.redirects.extend(other.redirects);
    }

    /// Get a class by name
    pub fn find(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    /// Get a struct by name
    pub fn find_struct(&self, name: &str) -> Option<&ClassDescriptor> {
        self.structs.get(name)
    }

    /// Get a class or struct by name
    pub fn descriptor(&self, name: &str) -> Option<&ClassDescriptor> {
        self.find(name).or_else(|| self.find_struct(name))
    }

    /// Whether a class with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Redirect target for a renamed class
    pub fn redirect(&self, name: &str) -> Option<&str> {
        self.redirects.get(name).map(String::as_str)
    }

    /// Get all registered classes
    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    /// Get classes by category
    pub fn classes_in_category(
        &self,
        category: NodeCategory,
    ) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values().filter(move |c| c.category == category)
    }

    /// The class and its ancestors, most derived first
    pub fn ancestry<'a>(&'a self, name: &str) -> Vec<&'a ClassDescriptor> {
        let mut chain = Vec::new();
        let mut current = self.descriptor(name);
        while let Some(class) = current {
            // Guards against parent cycles in hand-built registries
            if chain.len() > self.classes.len() + self.structs.len() {
                break;
            }
            chain.push(class);
            current = class.parent.as_deref().and_then(|p| self.descriptor(p));
        }
        chain
    }

    /// Whether `name` is `ancestor` or derives from it
    pub fn is_child_of(&self, name: &str, ancestor: &str) -> bool {
        self.ancestry(name).iter().any(|c| c.name == ancestor)
    }

    /// Look up a field on a class or struct, walking parents
    pub fn field(&self, type_name: &str, field: &str) -> Option<&Field> {
        self.ancestry(type_name)
            .into_iter()
            .find_map(|c| c.fields.iter().find(|f| f.name == field))
    }

    /// All fields of a class or struct, inherited ones first
    pub fn fields(&self, type_name: &str) -> Vec<&Field> {
        self.ancestry(type_name)
            .into_iter()
            .rev()
            .flat_map(|c| c.fields.iter())
            .collect()
    }

    /// Positional input slot count, inherited from parents
    pub fn positional_inputs(&self, class: &str) -> Option<usize> {
        self.ancestry(class).into_iter().find_map(|c| c.positional_inputs)
    }

    /// Create an empty object of a registered class
    pub fn create_object(&self, class: &str, name: impl Into<String>) -> Option<Object> {
        self.find(class).map(|c| Object::new(c.name.clone(), name))
    }

    /// Create an empty expression node of a registered class
    pub fn create_node(&self, class: &str, name: impl Into<String>) -> Option<Node> {
        let descriptor = self.find(class)?;
        let mut node = Node::new(descriptor, name);
        if let Some(count) = self.positional_inputs(class) {
            node.positional_inputs = vec![ExpressionInput::default(); count];
        }
        Some(node)
    }
}

/// An expression node instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Name, unique within its graph
    pub name: String,
    /// Class name
    pub class: String,
    /// Category of the class
    pub category: NodeCategory,
    /// Type name this node stands in for, when the real class was missing
    pub placeholder_for: Option<String>,
    /// Owning asset name
    pub owner: Option<String>,
    /// Containing sub-graph node, if any
    pub subgraph: Option<NodeId>,
    /// Positional input slots
    pub positional_inputs: Vec<ExpressionInput>,
    /// Assigned values
    pub values: IndexMap<String, Value>,
}

impl Node {
    /// Create an empty node from a class descriptor
    pub fn new(class: &ClassDescriptor, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            class: class.name.clone(),
            category: class.category,
            placeholder_for: None,
            owner: None,
            subgraph: None,
            positional_inputs: vec![ExpressionInput::default(); class.positional_inputs.unwrap_or(0)],
            values: IndexMap::new(),
        }
    }

    /// Whether this node is a stand-in for a missing class
    pub fn is_placeholder(&self) -> bool {
        self.placeholder_for.is_some()
    }

    /// Whether this node is a comment annotation
    pub fn is_comment(&self) -> bool {
        self.category == NodeCategory::Annotation
    }

    /// Expression inputs held by this node, with the label of their slot.
    /// Inputs nested in arrays and structs are labelled by path
    /// (`FunctionInputs[0].Input`), positional slots as `#i`.
    pub fn inputs(&self) -> Vec<(String, &ExpressionInput)> {
        let mut inputs = Vec::new();
        for (name, value) in &self.values {
            collect_inputs(name.clone(), value, &mut inputs);
        }
        for (index, input) in self.positional_inputs.iter().enumerate() {
            inputs.push((format!("#{index}"), input));
        }
        inputs
    }
}

fn collect_inputs<'a>(label: String, value: &'a Value, out: &mut Vec<(String, &'a ExpressionInput)>) {
    match value {
        Value::Input(input) => out.push((label, input)),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_inputs(format!("{label}[{index}]"), item, out);
            }
        }
        Value::Struct(inner) => {
            for (name, item) in &inner.fields {
                collect_inputs(format!("{label}.{name}"), item, out);
            }
        }
        _ => {}
    }
}

impl Reflect for Node {
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
