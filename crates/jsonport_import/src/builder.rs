// SPDX-License-Identifier: MIT OR Apache-2.0
//! Two-pass expression graph construction.
//!
//! Pass 1 materializes every node of the export set under its export name,
//! so pass 2 can wire edges by name lookup no matter where the referenced
//! node appears in the table. Each node moves through [`NodeState`]; a
//! skipped node never comes back.

use crate::deserialize::{new_guid, remove_properties, MaterializedObjects, PropertyDeserializer};
use crate::diagnostics::{Diagnostic, MissingTypeRegistry};
use crate::export::{ExportRecord, ExportTable, PropertyBag};
use crate::host::HostEngine;
use crate::reference::ObjectReference;
use indexmap::{IndexMap, IndexSet};
use jsonport_graph::graphs::{animation, material};
use jsonport_graph::{
    ExpressionGraph, InputKind, Node, Object, ObjectRef, Reflect, StructValue, Value,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Per graph-kind knobs of the builder
#[derive(Debug, Clone, Copy)]
pub struct GraphSchema {
    /// Class of the owning asset
    pub asset_class: &'static str,
    /// Prefix tried when an export type names a node class in short form
    pub class_prefix: &'static str,
    /// Base class every node must derive from
    pub node_base: &'static str,
    /// Annotation class for missing-class labels
    pub comment_class: Option<&'static str>,
    /// Pass-through class standing in for missing classes
    pub placeholder_class: Option<&'static str>,
    /// Suffix of the companion export holding editor-only data
    pub editor_data_suffix: Option<&'static str>,
    /// Node field pointing back at the owning asset
    pub owner_field: Option<&'static str>,
    /// Asset properties listing the graph nodes; never assigned to the asset
    pub collection_fields: &'static [&'static str],
    /// Texture holder base class; its nodes get a fresh parameter GUID
    pub texture_base: Option<&'static str>,
    /// Give every node a fresh expression GUID
    pub refresh_expression_guid: bool,
}

impl GraphSchema {
    /// Material graphs
    pub const MATERIAL: GraphSchema = GraphSchema {
        asset_class: "Material",
        class_prefix: material::MATERIAL_EXPRESSION,
        node_base: material::MATERIAL_EXPRESSION,
        comment_class: Some(material::COMMENT),
        placeholder_class: Some(material::REROUTE),
        editor_data_suffix: Some("EditorOnlyData"),
        owner_field: Some("Material"),
        collection_fields: &["Expressions", "EditorComments", "ExpressionCollection"],
        texture_base: Some("MaterialExpressionTextureBase"),
        refresh_expression_guid: true,
    };

    /// Material function graphs
    pub const MATERIAL_FUNCTION: GraphSchema = GraphSchema {
        asset_class: "MaterialFunction",
        class_prefix: material::MATERIAL_EXPRESSION,
        node_base: material::MATERIAL_EXPRESSION,
        comment_class: Some(material::COMMENT),
        placeholder_class: Some(material::REROUTE),
        editor_data_suffix: Some("EditorOnlyData"),
        owner_field: Some("Function"),
        collection_fields: &["FunctionExpressions", "FunctionEditorComments", "ExpressionCollection"],
        texture_base: Some("MaterialExpressionTextureBase"),
        refresh_expression_guid: false,
    };

    /// Animation blueprint graphs
    pub const ANIMATION: GraphSchema = GraphSchema {
        asset_class: "AnimBlueprint",
        class_prefix: "AnimGraphNode_",
        node_base: animation::ANIM_GRAPH_NODE,
        comment_class: None,
        placeholder_class: None,
        editor_data_suffix: None,
        owner_field: None,
        collection_fields: &[],
        texture_base: None,
        refresh_expression_guid: false,
    };

    /// Schema for a graph asset type
    pub fn for_asset(type_name: &str) -> Option<&'static GraphSchema> {
        match type_name {
            "Material" => Some(&Self::MATERIAL),
            "MaterialFunction" => Some(&Self::MATERIAL_FUNCTION),
            _ => None,
        }
    }
}

/// Why a node was left out of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Unknown class and the schema has no placeholder
    MissingClass,
    /// The class exists but is not a node class of this graph
    NotANode,
    /// The node lives in a sub-graph the host cannot represent
    UnsupportedSubgraph,
    /// Another node already holds this name
    DuplicateName,
}

/// Construction state of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeState {
    /// Export seen, nothing materialized
    Discovered,
    /// Instantiated with default values
    Empty,
    /// Properties and positional inputs assigned
    Propagated,
    /// Owner and sub-graph links set
    Wired,
    /// Added to the graph
    Attached,
    /// Left out for good
    Skipped(SkipReason),
}

/// Exports that make up one graph
#[derive(Debug, Clone)]
pub struct Collected<'t> {
    /// Companion editor-only data export, if any
    pub editor_data: Option<&'t ExportRecord>,
    /// Node exports in document order
    pub nodes: Vec<&'t ExportRecord>,
}

/// Result of a graph build
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The constructed graph
    pub graph: ExpressionGraph,
    /// Final state of every collected export, by name
    pub states: IndexMap<String, NodeState>,
    /// Findings raised while building
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutcome {
    /// Final state of a node export
    pub fn state(&self, name: &str) -> Option<NodeState> {
        self.states.get(name).copied()
    }

    /// Names of exports left out of the graph, with the reason
    pub fn skipped(&self) -> impl Iterator<Item = (&str, SkipReason)> {
        self.states.iter().filter_map(|(name, state)| match state {
            NodeState::Skipped(reason) => Some((name.as_str(), *reason)),
            _ => None,
        })
    }
}

struct Pending<'t> {
    record: &'t ExportRecord,
    state: NodeState,
    node: Option<Node>,
    annotation: Option<Node>,
}

impl<'t> Pending<'t> {
    fn skipped(record: &'t ExportRecord, reason: SkipReason) -> Self {
        Self {
            record,
            state: NodeState::Skipped(reason),
            node: None,
            annotation: None,
        }
    }
}

/// Builds the node graph of one graph-shaped asset
pub struct ExpressionGraphBuilder<'a> {
    schema: &'a GraphSchema,
    table: &'a ExportTable,
    host: &'a dyn HostEngine,
    deserializer: PropertyDeserializer<'a>,
}

impl<'a> ExpressionGraphBuilder<'a> {
    /// Create a builder over an export table
    pub fn new(
        schema: &'a GraphSchema,
        table: &'a ExportTable,
        host: &'a dyn HostEngine,
        deserializer: PropertyDeserializer<'a>,
    ) -> Self {
        Self {
            schema,
            table,
            host,
            deserializer,
        }
    }

    /// Build the graph owned by `asset` and assign the asset's own
    /// properties onto `target`
    pub fn build(
        &self,
        asset: &'a ExportRecord,
        target: &mut Object,
        missing: &mut MissingTypeRegistry,
    ) -> BuildOutcome {
        let collected = self.collect(asset);
        let mut diagnostics = Vec::new();

        let (mut pending, names) = self.construct(&collected, &asset.name, missing, &mut diagnostics);
        self.propagate(&mut pending, &names, &ObjectRef::Object(target.id));
        let (graph, states) = self.finish(asset, pending);

        let deserializer = self.deserializer.with_materialized(&names);
        for record in std::iter::once(asset).chain(collected.editor_data) {
            let bag = remove_properties(&record.properties, self.schema.collection_fields);
            deserializer.assign(&mut *target, &bag);
        }

        tracing::debug!(
            "Built {}: {} expressions, {} comments, {} edges",
            graph.name,
            graph.expression_count(),
            graph.comment_count(),
            graph.connection_count()
        );

        BuildOutcome {
            graph,
            states,
            diagnostics,
        }
    }

    /// Find the editor data export and the node exports of `asset`
    pub fn collect(&self, asset: &'a ExportRecord) -> Collected<'a> {
        let editor_data = self.schema.editor_data_suffix.and_then(|suffix| {
            let ty = format!("{}{}", asset.ty, suffix);
            self.table
                .iter()
                .find(|r| r.ty == ty && r.is_in(&asset.name))
                .or_else(|| self.table.find_by_type(&ty))
        });

        let mut listed = IndexSet::new();
        for record in std::iter::once(asset).chain(editor_data) {
            for field in self.schema.collection_fields {
                let Some(items) = record.property(field).and_then(JsonValue::as_array) else {
                    continue;
                };
                listed.extend(items.iter().filter_map(ObjectReference::from_json).map(|r| r.name));
            }
        }

        let nodes = self
            .table
            .iter()
            .filter(|r| r.index != asset.index && r.ty != asset.ty)
            .filter(|r| editor_data.map_or(true, |e| e.index != r.index))
            .filter(|r| {
                listed.contains(&r.name)
                    || self.table.is_within(r, &asset.name)
                    || editor_data.is_some_and(|e| self.table.is_within(r, &e.name))
                    || (r.outer.is_none() && r.ty.starts_with(self.schema.class_prefix))
            })
            .collect();

        Collected { editor_data, nodes }
    }

    /// Resolve an export type to a node class: direct name, prefixed short
    /// name, redirect table, then known renames
    pub fn resolve_class(&self, type_name: &str) -> Option<String> {
        let classes = self.host.classes();
        if classes.contains(type_name) {
            return Some(type_name.to_string());
        }

        let prefix = self.schema.class_prefix;
        if !type_name.starts_with(prefix) {
            let prefixed = format!("{prefix}{type_name}");
            if classes.contains(&prefixed) {
                return Some(prefixed);
            }
        }

        if self.host.capabilities().class_redirects {
            let candidates = [
                format!("/Script/InterchangeImport.{type_name}"),
                format!("/Script/Landscape.{type_name}"),
                type_name.to_string(),
            ];
            for candidate in &candidates {
                if let Some(target) = classes.redirect(candidate).filter(|t| classes.contains(t)) {
                    tracing::debug!("Redirected {} to {}", type_name, target);
                    return Some(target.to_string());
                }
            }
        }

        if type_name.contains("PhysicalMaterialOutput") && !type_name.contains("Landscape") {
            let renamed = type_name.replace("PhysicalMaterialOutput", "LandscapePhysicalMaterialOutput");
            if classes.contains(&renamed) {
                return Some(renamed);
            }
        }

        None
    }

    /// Pass 1: instantiate every node so each name has an identity
    fn construct(
        &self,
        collected: &Collected<'a>,
        asset_name: &str,
        missing: &mut MissingTypeRegistry,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (Vec<Pending<'a>>, MaterializedObjects) {
        let classes = self.host.classes();
        let subgraphs = self.host.capabilities().subgraphs;
        let mut pending = Vec::with_capacity(collected.nodes.len());
        let mut names = MaterializedObjects::new();
        let mut unsupported = Vec::new();

        for &record in &collected.nodes {
            if names.contains_key(&record.name) {
                tracing::warn!("Duplicate node name {} in {}", record.name, asset_name);
                pending.push(Pending::skipped(record, SkipReason::DuplicateName));
                continue;
            }

            if !subgraphs && declares_subgraph(&record.properties) {
                unsupported.push(record.name.clone());
                pending.push(Pending::skipped(record, SkipReason::UnsupportedSubgraph));
                continue;
            }

            let entry = match self.resolve_class(&record.ty) {
                Some(class) if !classes.is_child_of(&class, self.schema.node_base) => {
                    tracing::debug!("{} ({}) is not a graph node", record.name, class);
                    Pending::skipped(record, SkipReason::NotANode)
                }
                Some(class) => match classes.create_node(&class, &record.name) {
                    Some(node) => Pending {
                        record,
                        state: NodeState::Empty,
                        node: Some(node),
                        annotation: None,
                    },
                    None => Pending::skipped(record, SkipReason::MissingClass),
                },
                None => self.placeholder(record, asset_name, missing, diagnostics),
            };

            if let Some(node) = &entry.node {
                names.insert(record.name.clone(), ObjectRef::Expression(node.id));
            }
            pending.push(entry);
        }

        if !unsupported.is_empty() {
            tracing::warn!(
                "Skipped {} sub-graph node(s) in {}: the host has no sub-graph support",
                unsupported.len(),
                asset_name
            );
            diagnostics.push(Diagnostic::UnsupportedSubgraph {
                asset: asset_name.to_string(),
                nodes: unsupported,
            });
        }

        (pending, names)
    }

    fn placeholder(
        &self,
        record: &'a ExportRecord,
        asset_name: &str,
        missing: &mut MissingTypeRegistry,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Pending<'a> {
        if missing.record(&record.ty, &record.properties) {
            diagnostics.push(Diagnostic::MissingNodeClass {
                type_name: record.ty.clone(),
                asset: asset_name.to_string(),
            });
        }
        tracing::warn!("Missing node class {} for {} in {}", record.ty, record.name, asset_name);

        let classes = self.host.classes();
        let (Some(stand_in), Some(comment)) = (self.schema.placeholder_class, self.schema.comment_class) else {
            return Pending::skipped(record, SkipReason::MissingClass);
        };
        let Some(mut node) = classes.create_node(stand_in, &record.name) else {
            return Pending::skipped(record, SkipReason::MissingClass);
        };
        node.placeholder_for = Some(record.ty.clone());

        Pending {
            record,
            state: NodeState::Empty,
            node: Some(node),
            annotation: classes.create_node(comment, format!("MissingNodeComment_{}", record.name)),
        }
    }

    /// Pass 2: assign properties, then wire owner and sub-graph links
    fn propagate(&self, pending: &mut [Pending<'a>], names: &MaterializedObjects, owner: &ObjectRef) {
        let classes = self.host.classes();
        let subgraphs = self.host.capabilities().subgraphs;
        let deserializer = self.deserializer.with_materialized(names);

        for entry in pending.iter_mut() {
            let Some(node) = entry.node.as_mut() else {
                continue;
            };
            let bag = &entry.record.properties;

            deserializer.assign(&mut *node, bag);
            self.fill_positional(node, bag, &deserializer);
            if let Some(annotation) = entry.annotation.as_mut() {
                deserializer.assign(&mut *annotation, bag);
                label_missing(annotation, &entry.record.ty);
            }
            entry.state = NodeState::Propagated;

            if let Some(field) = self.schema.owner_field {
                node.values_mut()
                    .insert(field.to_string(), Value::Object(owner.clone()));
            }

            if subgraphs {
                if let Some(reference) = bag.get("SubgraphExpression").and_then(ObjectReference::from_json) {
                    match names.get(&reference.name) {
                        Some(link @ ObjectRef::Expression(id)) => {
                            node.subgraph = Some(*id);
                            node.values_mut()
                                .insert("SubgraphExpression".to_string(), Value::Object(link.clone()));
                        }
                        _ => tracing::debug!(
                            "Sub-graph {} of {} is not in the graph",
                            reference.name,
                            node.name
                        ),
                    }
                }
            }

            if let Some(base) = self.schema.texture_base {
                let has_texture = bag.get("Texture").is_some_and(|t| !t.is_null());
                if has_texture
                    && classes.is_child_of(&node.class, base)
                    && classes.field(&node.class, "ExpressionGUID").is_some()
                {
                    node.values_mut().insert("ExpressionGUID".to_string(), new_guid());
                }
            }

            if self.schema.refresh_expression_guid {
                node.values_mut()
                    .insert("MaterialExpressionGuid".to_string(), new_guid());
            }

            entry.state = NodeState::Wired;
        }
    }

    /// Fill fixed input slots from the declared `Inputs` array
    fn fill_positional(&self, node: &mut Node, bag: &PropertyBag, deserializer: &PropertyDeserializer<'_>) {
        let Some(entries) = bag.get("Inputs").and_then(JsonValue::as_array) else {
            return;
        };
        let classes = self.host.classes();

        let Some(slots) = classes.positional_inputs(&node.class) else {
            if classes.field(&node.class, "Inputs").is_none() {
                tracing::debug!("{} carries an Inputs array but has no input slots", node.class);
            }
            return;
        };

        if entries.len() > slots {
            tracing::warn!(
                "{} declares {} inputs, {} has {} slots",
                node.name,
                entries.len(),
                node.class,
                slots
            );
        }

        for (index, entry) in entries.iter().enumerate().take(slots) {
            // Unresolved slots stay unconnected
            if let Some(Value::Input(input)) = deserializer.convert_input(InputKind::Default, entry) {
                if let Some(slot) = node.positional_inputs.get_mut(index) {
                    *slot = input;
                }
            }
        }
    }

    /// Attach the wired nodes, comments to their own collection
    fn finish(
        &self,
        asset: &ExportRecord,
        pending: Vec<Pending<'a>>,
    ) -> (ExpressionGraph, IndexMap<String, NodeState>) {
        let mut graph = ExpressionGraph::new(&asset.name, &asset.ty);
        let mut states = IndexMap::new();

        for entry in pending {
            let mut state = entry.state;
            if let Some(node) = entry.node {
                state = match graph.attach(node) {
                    Ok(_) => NodeState::Attached,
                    Err(err) => {
                        tracing::warn!("{}", err);
                        NodeState::Skipped(SkipReason::DuplicateName)
                    }
                };
            }
            if let Some(annotation) = entry.annotation {
                if let Err(err) = graph.attach(annotation) {
                    tracing::warn!("{}", err);
                }
            }
            states.entry(entry.record.name.clone()).or_insert(state);
        }

        (graph, states)
    }
}

fn declares_subgraph(bag: &PropertyBag) -> bool {
    bag.get("SubgraphExpression")
        .and_then(ObjectReference::from_json)
        .is_some()
}

/// Turn a comment into the visible label of a missing node
fn label_missing(annotation: &mut Node, type_name: &str) {
    let color = StructValue::new("LinearColor")
        .with("R", Value::Float(1.0))
        .with("G", Value::Float(0.2))
        .with("B", Value::Float(0.2))
        .with("A", Value::Float(1.0));

    let values = annotation.values_mut();
    values.insert("Text".to_string(), Value::String(format!("Missing Node Class {type_name}")));
    values.insert("CommentColor".to_string(), Value::Struct(color));
    values.insert("bCommentBubbleVisible".to_string(), Value::Bool(true));
    values.insert("SizeX".to_string(), Value::Int(415));
    values.insert("SizeY".to_string(), Value::Int(40));
    values.insert(
        "Desc".to_string(),
        Value::String(format!(
            "{type_name} is not available in this engine build. The export probably comes from a newer engine version."
        )),
    );
}
