// SPDX-License-Identifier: MIT OR Apache-2.0
//! Expression graph container owned by a graph-shaped asset.

use crate::connection::Connection;
use crate::node::{Node, NodeId};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identity-free description of one edge: source name, output index,
/// target name, target slot
pub type EdgeKey = (String, i32, String, String);

/// The nodes of one material, material function or animation graph.
///
/// The graph owns every node. Edges are not stored separately; they are the
/// connected expression inputs held in node values, so [`Self::connections`]
/// is always consistent with the nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionGraph {
    /// Graph name (the owning asset name)
    pub name: String,
    /// Class of the owning asset
    pub owner_class: String,
    /// Computational nodes
    expressions: IndexMap<NodeId, Node>,
    /// Comment nodes
    comments: IndexMap<NodeId, Node>,
    /// Parameter nodes by parameter name
    parameters: IndexMap<String, NodeId>,
}

impl ExpressionGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>, owner_class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner_class: owner_class.into(),
            expressions: IndexMap::new(),
            comments: IndexMap::new(),
            parameters: IndexMap::new(),
        }
    }

    /// Attach a node. Comments go to the comment collection, nodes with a
    /// `ParameterName` are indexed as parameters.
    pub fn attach(&mut self, mut node: Node) -> Result<NodeId, GraphError> {
        if self.node_by_name(&node.name).is_some() {
            return Err(GraphError::DuplicateNodeName(node.name));
        }

        node.owner = Some(self.name.clone());
        let id = node.id;
        if node.is_comment() {
            self.comments.insert(id, node);
        } else {
            if let Some(Value::String(parameter)) = node.values.get("ParameterName") {
                self.parameters.insert(parameter.clone(), id);
            }
            self.expressions.insert(id, node);
        }
        Ok(id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.expressions
            .get(&node_id)
            .or_else(|| self.comments.get(&node_id))
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        if self.expressions.contains_key(&node_id) {
            self.expressions.get_mut(&node_id)
        } else {
            self.comments.get_mut(&node_id)
        }
    }

    /// Find a node by name
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes().find(|n| n.name == name)
    }

    /// Computational nodes in attach order
    pub fn expressions(&self) -> impl Iterator<Item = &Node> {
        self.expressions.values()
    }

    /// Comment nodes in attach order
    pub fn comments(&self) -> impl Iterator<Item = &Node> {
        self.comments.values()
    }

    /// All nodes, expressions first
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.expressions.values().chain(self.comments.values())
    }

    /// Number of computational nodes
    pub fn expression_count(&self) -> usize {
        self.expressions.len()
    }

    /// Number of comment nodes
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.expressions.len() + self.comments.len()
    }

    /// Look up a parameter node by parameter name
    pub fn parameter(&self, name: &str) -> Option<&Node> {
        self.parameters.get(name).and_then(|id| self.node(*id))
    }

    /// Live edges: connected inputs whose source node is in this graph
    pub fn connections(&self) -> Vec<Connection> {
        let mut connections = Vec::new();
        for node in self.expressions.values() {
            for (slot, input) in node.inputs() {
                if !input.is_connected() {
                    continue;
                }
                let Some(source) = input.expression else {
                    continue;
                };
                if self.node(source).is_some() {
                    connections.push(Connection::new(source, input.output_index, node.id, slot));
                }
            }
        }
        connections
    }

    /// Number of live edges
    pub fn connection_count(&self) -> usize {
        self.connections().len()
    }

    /// Edge topology keyed by node names, independent of node identities
    pub fn edge_signature(&self) -> BTreeSet<EdgeKey> {
        self.connections()
            .into_iter()
            .filter_map(|c| {
                let from = self.node(c.from_node)?;
                let to = self.node(c.to_node)?;
                Some((from.name.clone(), c.output_index, to.name.clone(), c.to_slot))
            })
            .collect()
    }

    /// Serialize to a RON string
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from a RON string
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

/// Error when modifying a graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A node with this name is already attached
    #[error("Duplicate node name: {0}")]
    DuplicateNodeName(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ClassDescriptor, NodeCategory};
    use crate::value::{ExpressionInput, InputConstant};

    fn node(name: &str, category: NodeCategory) -> Node {
        Node::new(&ClassDescriptor::new("Test", category), name)
    }

    #[test]
    fn test_attach_separates_comments() {
        let mut graph = ExpressionGraph::new("M", "Material");
        graph.attach(node("A", NodeCategory::Math)).unwrap();
        graph.attach(node("Note", NodeCategory::Annotation)).unwrap();

        assert_eq!(graph.expression_count(), 1);
        assert_eq!(graph.comment_count(), 1);
        assert_eq!(graph.node_by_name("A").unwrap().owner.as_deref(), Some("M"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut graph = ExpressionGraph::new("M", "Material");
        graph.attach(node("A", NodeCategory::Math)).unwrap();
        assert_eq!(
            graph.attach(node("A", NodeCategory::Math)),
            Err(GraphError::DuplicateNodeName("A".into()))
        );
    }

    #[test]
    fn test_parameter_index() {
        let mut graph = ExpressionGraph::new("M", "Material");
        let mut param = node("P", NodeCategory::Parameter);
        param
            .values
            .insert("ParameterName".into(), Value::String("Roughness".into()));
        let id = graph.attach(param).unwrap();

        assert_eq!(graph.parameter("Roughness").map(|n| n.id), Some(id));
        assert!(graph.parameter("Metallic").is_none());
    }

    #[test]
    fn test_connections_and_signature() {
        let mut graph = ExpressionGraph::new("M", "Material");
        let source = node("B", NodeCategory::Input);
        let source_id = source.id;
        let mut target = node("A", NodeCategory::Math);
        target
            .values
            .insert("A".into(), Value::Input(ExpressionInput::connected(source_id, 0)));
        // Inert constant input never forms an edge
        let mut constant = ExpressionInput::constant(InputConstant::Scalar(1.0));
        constant.expression = Some(source_id);
        target.values.insert("B".into(), Value::Input(constant));

        let target_id = graph.attach(target).unwrap();
        graph.attach(source).unwrap();

        let connections = graph.connections();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].from_node, source_id);
        assert_eq!(connections[0].to_node, target_id);

        let signature = graph.edge_signature();
        assert!(signature.contains(&("B".to_string(), 0, "A".to_string(), "A".to_string())));
    }

    #[test]
    fn test_dangling_edge_ignored() {
        let mut graph = ExpressionGraph::new("M", "Material");
        let mut target = node("A", NodeCategory::Math);
        target
            .values
            .insert("A".into(), Value::Input(ExpressionInput::connected(NodeId::new(), 0)));
        graph.attach(target).unwrap();
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_ron_roundtrip() {
        let mut graph = ExpressionGraph::new("M", "Material");
        graph.attach(node("A", NodeCategory::Math)).unwrap();
        let ron = graph.to_ron().unwrap();
        let loaded = ExpressionGraph::from_ron(&ron).unwrap();
        assert_eq!(loaded.node_count(), 1);
        assert_eq!(loaded.name, "M");
    }
}
