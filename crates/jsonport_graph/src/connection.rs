// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) view over expression inputs.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A connection from a node output into an input slot of another node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Source node ID
    pub from_node: NodeId,
    /// Output index on the source node
    pub output_index: i32,
    /// Target node ID
    pub to_node: NodeId,
    /// Input slot label on the target node (`Field`, `Field[i]` or `#i`)
    pub to_slot: String,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        from_node: NodeId,
        output_index: i32,
        to_node: NodeId,
        to_slot: impl Into<String>,
    ) -> Self {
        Self {
            from_node,
            output_index,
            to_node,
            to_slot: to_slot.into(),
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Whether the target slot is a positional one
    pub fn is_positional(&self) -> bool {
        self.to_slot.starts_with('#')
    }
}
