// SPDX-License-Identifier: MIT OR Apache-2.0
//! Import diagnostics and the missing-type registry.

use crate::export::PropertyBag;
use indexmap::IndexMap;
use serde::Serialize;

/// A user-facing finding produced while importing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// A node class is unknown to the host; reported once per type
    MissingNodeClass {
        /// Unresolved type name
        type_name: String,
        /// Asset in which it was first seen
        asset: String,
    },
    /// Nodes inside a sub-graph were skipped because the host has no sub-graphs
    UnsupportedSubgraph {
        /// Asset being imported
        asset: String,
        /// Skipped node names
        nodes: Vec<String>,
    },
    /// A graph asset came without its node collection
    MaterialDataMissing {
        /// Asset being imported
        asset: String,
    },
    /// An export record could not be parsed
    MalformedExport {
        /// Position in the export table
        index: usize,
        /// What is wrong with it
        reason: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingNodeClass { type_name, asset } => {
                write!(f, "Missing node class {type_name} (in {asset})")
            }
            Self::UnsupportedSubgraph { asset, nodes } => write!(
                f,
                "{} sub-graph node(s) skipped in {asset}: the host has no sub-graph support",
                nodes.len()
            ),
            Self::MaterialDataMissing { asset } => write!(f, "Material data missing ({asset})"),
            Self::MalformedExport { index, reason } => write!(f, "Export #{index}: {reason}"),
        }
    }
}

/// Unresolved type names seen during one batch, each with the property bag
/// of its first occurrence.
///
/// Owned by a single import session and dropped with it.
#[derive(Debug, Clone, Default)]
pub struct MissingTypeRegistry {
    types: IndexMap<String, PropertyBag>,
}

impl MissingTypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a missing type. Returns `true` the first time a type is seen.
    pub fn record(&mut self, type_name: &str, bag: &PropertyBag) -> bool {
        if self.types.contains_key(type_name) {
            return false;
        }
        self.types.insert(type_name.to_string(), bag.clone());
        true
    }

    /// Whether a type has been recorded
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Property bag retained for a type
    pub fn bag(&self, type_name: &str) -> Option<&PropertyBag> {
        self.types.get(type_name)
    }

    /// Recorded type names, in first-seen order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Number of distinct missing types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_deduplicates() {
        let mut missing = MissingTypeRegistry::new();
        let first = json!({"A": 1}).as_object().cloned().unwrap();
        let second = json!({"A": 2}).as_object().cloned().unwrap();

        assert!(missing.record("FutureNode", &first));
        assert!(!missing.record("FutureNode", &second));
        assert!(missing.record("OtherNode", &second));

        assert_eq!(missing.len(), 2);
        assert_eq!(missing.bag("FutureNode"), Some(&first));
        assert_eq!(missing.type_names().collect::<Vec<_>>(), vec!["FutureNode", "OtherNode"]);
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::MissingNodeClass {
            type_name: "UnknownFutureNodeType42".to_string(),
            asset: "M_Test".to_string(),
        };
        assert!(diagnostic.to_string().contains("UnknownFutureNodeType42"));
    }
}
