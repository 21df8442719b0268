// SPDX-License-Identifier: MIT OR Apache-2.0
//! Import error types.

use jsonport_graph::{GraphError, ReflectError};

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Error raised while importing one export or loading a batch
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// An export record lacks a required top-level field
    #[error("Export #{index} is malformed: {reason}")]
    MalformedExport {
        /// Position in the export table
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// A property the importer cannot do without is absent
    #[error("\"{asset}\" is missing the required property \"{property}\"")]
    MissingProperty {
        /// Asset being imported
        asset: String,
        /// Required property
        property: String,
    },

    /// A companion export the importer needs is absent
    #[error("\"{asset}\" needs an export named \"{export}\"")]
    MissingExport {
        /// Asset being imported
        asset: String,
        /// Name (or name prefix) of the required export
        export: String,
    },

    /// The host has no selected asset of the required class
    #[error("No {0} is selected")]
    NoSelection(String),

    /// The host does not know the asset class
    #[error("Unknown asset class: {0}")]
    UnknownClass(String),

    /// A graph asset came without its node collection
    #[error("Material data missing for \"{0}\"")]
    MaterialDataMissing(String),

    /// Reflection refused an assignment the importer requires
    #[error(transparent)]
    Reflect(#[from] ReflectError),

    /// Graph container refused a node
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be read or written
    #[error("Settings error: {0}")]
    Settings(String),
}
