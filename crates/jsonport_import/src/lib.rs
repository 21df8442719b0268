// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON export importer for jsonport.
//!
//! Turns a flat list of exported engine objects back into live host objects:
//! - Export tables with outer-name lookup and reference resolution
//! - Reflective property deserialization onto class fields
//! - Material, material function and anim blueprint expression graphs
//! - Per-type importers for physics assets, skeletons, string tables,
//!   user structs, data assets and templated asset types
//!
//! ## Architecture
//!
//! An [`ImportSession`] walks an [`ExportTable`], picks an import strategy
//! per export through the [`ImporterRegistry`] and registers each imported
//! asset with a [`HostEngine`]. Failures are per export and never stop the
//! batch. Everything that could not be represented is collected into the
//! [`BatchReport`].

pub mod builder;
pub mod deserialize;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod host;
pub mod importers;
pub mod library;
pub mod reference;
pub mod settings;

pub use builder::{BuildOutcome, ExpressionGraphBuilder, GraphSchema, NodeState, SkipReason};
pub use deserialize::{MaterializedObjects, PropertyDeserializer};
pub use diagnostics::{Diagnostic, MissingTypeRegistry};
pub use dispatch::{
    BatchReport, ExportOutcome, ImportContext, ImportSession, ImportStatus, ImportedAsset, Importer,
    ImporterRegistry, Strategy,
};
pub use error::{ImportError, ImportResult};
pub use export::{ExportRecord, ExportTable, PropertyBag};
pub use host::{HostCapabilities, HostEngine, InMemoryHost};
pub use importers::ANIM_GRAPH;
pub use reference::{ObjectReference, ReferenceResolver, Resolution};
pub use settings::{EngineVersion, ImportSettings};
