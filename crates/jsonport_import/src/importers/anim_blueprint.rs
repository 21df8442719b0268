// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation blueprint import.
//!
//! Cooked anim blueprints keep no editor graph. The node data lives as
//! `AnimGraphNode_<Type>_<Guid>` properties on the class default object,
//! pose links are `LinkID` indices into the reversed node list, and state
//! machines are described by `BakedStateMachines` on the generated class.
//! The importer rewrites that data into per-graph export sets and hands
//! them to the expression graph builder.

use crate::builder::{ExpressionGraphBuilder, GraphSchema};
use crate::deserialize::PropertyDeserializer;
use crate::dispatch::{ImportContext, ImportedAsset, Importer};
use crate::error::{ImportError, ImportResult};
use crate::export::{ExportRecord, ExportTable, PropertyBag};
use indexmap::IndexMap;
use jsonport_graph::{ExpressionGraph, NodeId, Object, ObjectRef, Value};
use serde_json::Value as JsonValue;
use std::collections::VecDeque;

/// Name of the main graph of an anim blueprint
pub const ANIM_GRAPH: &str = "AnimGraph";

const NODE_PREFIX: &str = "AnimGraphNode_";
const DEFAULT_OBJECT_PREFIX: &str = "Default__";
const TRANSITION_RESULT: &str = "AnimGraphNode_TransitionResult";
const SAVE_CACHED_POSE: &str = "AnimGraphNode_SaveCachedPose";
const USE_CACHED_POSE: &str = "AnimGraphNode_UseCachedPose";

/// Rebuilds the anim graph and state graphs of the selected anim blueprint
pub struct AnimBlueprintImporter;

impl Importer for AnimBlueprintImporter {
    fn types(&self) -> &[&'static str] {
        &["AnimBlueprintGeneratedClass", "AnimBlueprint"]
    }

    fn import(&self, ctx: &mut ImportContext<'_>) -> ImportResult<ImportedAsset> {
        let host = ctx.host;
        let (path, selected) = host
            .selected_asset("AnimBlueprint")
            .ok_or_else(|| ImportError::NoSelection("AnimBlueprint".to_string()))?;
        let mut blueprint = selected.clone();

        let record = ctx.record;
        let defaults = ctx
            .table
            .find_by_name_prefix(DEFAULT_OBJECT_PREFIX)
            .ok_or_else(|| ImportError::MissingExport {
                asset: record.name.clone(),
                export: DEFAULT_OBJECT_PREFIX.to_string(),
            })?;

        let mut nodes: PropertyBag = defaults
            .properties
            .iter()
            .filter(|(key, value)| key.starts_with(NODE_PREFIX) && value.is_object())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        merge_exposed_inputs(&mut nodes, &record.properties);

        let reversed: Vec<String> = nodes.keys().rev().cloned().collect();
        for node in nodes.values_mut() {
            rewrite_links(node, &reversed);
        }

        let machines = baked_state_machines(&record.properties);
        for machine in &machines {
            for state in &machine.states {
                let Some(start) = state.root.and_then(|i| reversed.get(i)) else {
                    continue;
                };
                tag_state_nodes(&mut nodes, start, &state.name, &machine.name);
            }
        }

        let mut blacklist = ctx.settings.property_blacklist.clone();
        blacklist.push("LinkID".to_string());
        let deserializer = ctx.deserializer().with_blacklist(&blacklist);

        let root_members: Vec<(&String, &PropertyBag)> = nodes
            .iter()
            .filter_map(|(key, node)| node.as_object().map(|bag| (key, bag)))
            .filter(|(_, bag)| !bag.contains_key("State") && !bag.contains_key("Machine"))
            .collect();
        let mut graph = build_graph(ctx, deserializer, ANIM_GRAPH, &root_members, &mut blueprint);

        let mut subgraphs = Vec::new();
        for machine in &machines {
            for state in &machine.states {
                let members: Vec<(&String, &PropertyBag)> = nodes
                    .iter()
                    .filter_map(|(key, node)| node.as_object().map(|bag| (key, bag)))
                    .filter(|(_, bag)| {
                        bag.get("State").and_then(JsonValue::as_str) == Some(state.name.as_str())
                            && bag.get("Machine").and_then(JsonValue::as_str) == Some(machine.name.as_str())
                    })
                    .collect();
                let name = format!("{}/{}", machine.name, state.name);
                subgraphs.push(build_graph(ctx, deserializer, &name, &members, &mut blueprint));
            }
        }

        // Cached poses always live in the main graph
        let caches: IndexMap<String, NodeId> = graph
            .nodes()
            .filter(|node| ctx.classes().is_child_of(&node.class, SAVE_CACHED_POSE))
            .map(|node| (node.name.clone(), node.id))
            .collect();
        for target in std::iter::once(&mut graph).chain(subgraphs.iter_mut()) {
            link_cached_poses(ctx, target, &nodes, &caches);
        }

        tracing::info!(
            "{}: anim graph with {} nodes, {} state graph(s)",
            record.name,
            graph.node_count(),
            subgraphs.len()
        );

        let mut imported = ImportedAsset::new(path, blueprint).with_graph(graph);
        imported.subgraphs = subgraphs;
        Ok(imported)
    }
}

/// One baked state machine
#[derive(Debug, Clone, PartialEq)]
struct BakedMachine {
    name: String,
    states: Vec<BakedState>,
}

#[derive(Debug, Clone, PartialEq)]
struct BakedState {
    name: String,
    /// Index of the state's result node in the reversed node list
    root: Option<usize>,
}

fn baked_state_machines(properties: &PropertyBag) -> Vec<BakedMachine> {
    let Some(machines) = properties.get("BakedStateMachines").and_then(JsonValue::as_array) else {
        return Vec::new();
    };

    machines
        .iter()
        .filter_map(|machine| {
            let name = machine.get("MachineName")?.as_str()?.to_string();
            let states = machine
                .get("States")
                .and_then(JsonValue::as_array)
                .map(|states| {
                    states
                        .iter()
                        .filter_map(|state| {
                            Some(BakedState {
                                name: state.get("StateName")?.as_str()?.to_string(),
                                root: state
                                    .get("StateRootNodeIndex")
                                    .and_then(JsonValue::as_i64)
                                    .and_then(|i| usize::try_from(i).ok()),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            Some(BakedMachine { name, states })
        })
        .collect()
}

/// Newer engines keep the exposed input records on the generated class.
/// Move each one onto the node it feeds.
fn merge_exposed_inputs(nodes: &mut PropertyBag, properties: &PropertyBag) {
    let Some(inputs) = properties
        .get("EvaluateGraphExposedInputs")
        .and_then(JsonValue::as_array)
    else {
        return;
    };

    for input in inputs {
        let Some(handler) = input
            .pointer("/ValueHandlerNodeProperty/ObjectName")
            .and_then(JsonValue::as_str)
        else {
            continue;
        };
        let name = handler.split_once(':').map_or(handler, |(_, name)| name).replace('\'', "");

        match nodes.get_mut(&name).and_then(JsonValue::as_object_mut) {
            Some(node) => {
                node.insert("EvaluateGraphExposedInputs".to_string(), input.clone());
            }
            None => tracing::debug!("Exposed inputs for unknown node {}", name),
        }
    }
}

/// Give every `LinkID` the name of the node it points at
fn rewrite_links(value: &mut JsonValue, reversed: &[String]) {
    match value {
        JsonValue::Object(object) => {
            let target = object
                .get("LinkID")
                .and_then(JsonValue::as_i64)
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| reversed.get(i));
            if let Some(target) = target {
                object.insert("ExpressionName".to_string(), JsonValue::String(target.clone()));
            }
            for child in object.values_mut() {
                rewrite_links(child, reversed);
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                rewrite_links(item, reversed);
            }
        }
        _ => {}
    }
}

/// Names of the nodes a node's pose links point at. The cache link is
/// not a pose link and is not followed.
fn pose_links(node: &PropertyBag) -> Vec<String> {
    fn walk(value: &JsonValue, out: &mut Vec<String>) {
        match value {
            JsonValue::Object(object) => {
                if let Some(name) = object.get("ExpressionName").and_then(JsonValue::as_str) {
                    out.push(name.to_string());
                }
                object.values().for_each(|child| walk(child, out));
            }
            JsonValue::Array(items) => items.iter().for_each(|item| walk(item, out)),
            _ => {}
        }
    }

    let mut links = Vec::new();
    for (key, value) in node {
        if key != "LinkToCachingNode" && key != "EvaluateGraphExposedInputs" {
            walk(value, &mut links);
        }
    }
    links
}

/// Tag every node reachable from a state's result node with the state
/// and machine names. Nodes tagged once keep their first owner.
fn tag_state_nodes(nodes: &mut PropertyBag, start: &str, state: &str, machine: &str) {
    let mut queue = VecDeque::from([start.to_string()]);
    while let Some(key) = queue.pop_front() {
        let Some(node) = nodes.get_mut(&key).and_then(JsonValue::as_object_mut) else {
            continue;
        };
        if node.contains_key("State") || node.contains_key("Machine") {
            continue;
        }
        node.insert("State".to_string(), JsonValue::String(state.to_string()));
        node.insert("Machine".to_string(), JsonValue::String(machine.to_string()));
        queue.extend(pose_links(node));
    }
}

/// `AnimGraphNode_SequencePlayer_<Guid>` into type and GUID. Indexed keys
/// (`AnimGraphNode_Slot[2]`) carry no GUID.
fn split_node_key(key: &str) -> (String, Option<&str>) {
    let (ty, guid) = match key.find('[') {
        Some(bracket) => {
            let clean = &key[..bracket];
            let parts: Vec<&str> = clean.split('_').filter(|p| !p.is_empty()).collect();
            let ty = match parts.as_slice() {
                [first, second, ..] => format!("{first}_{second}"),
                _ => clean.to_string(),
            };
            (ty, None)
        }
        None => match key.rsplit_once('_') {
            Some((ty, guid)) => (ty.to_string(), Some(guid)),
            None => (key.to_string(), None),
        },
    };

    if ty == "AnimGraphNode_SubInput" {
        return ("AnimGraphNode_LinkedInputPose".to_string(), guid);
    }
    (ty, guid)
}

/// Nodes with bound or copied inputs get their key as a visible comment
fn has_bound_inputs(node: &PropertyBag) -> bool {
    let Some(inputs) = node.get("EvaluateGraphExposedInputs") else {
        return false;
    };
    let Some(records) = inputs.get("CopyRecords").and_then(JsonValue::as_array) else {
        return false;
    };
    let bound = inputs.get("BoundFunction").and_then(JsonValue::as_str).unwrap_or_default();
    !records.is_empty() || bound != "None"
}

fn build_graph(
    ctx: &mut ImportContext<'_>,
    deserializer: PropertyDeserializer<'_>,
    name: &str,
    members: &[(&String, &PropertyBag)],
    blueprint: &mut Object,
) -> ExpressionGraph {
    let mut records = Vec::with_capacity(members.len());
    for (key, node) in members {
        let (ty, guid) = split_node_key(key);
        if ty == TRANSITION_RESULT {
            tracing::debug!("{} kept as data only", key);
            continue;
        }

        let mut bag = (*node).clone();
        if let Some(guid) = guid {
            bag.insert("NodeGuid".to_string(), JsonValue::String(guid.to_string()));
        }
        if has_bound_inputs(node) {
            bag.insert("NodeComment".to_string(), JsonValue::String(key.to_string()));
            bag.insert("bCommentBubbleVisible".to_string(), JsonValue::Bool(true));
        }
        records.push(
            ExportRecord::new(records.len() + 1, key.as_str(), ty)
                .with_outer(name)
                .with_properties(bag),
        );
    }

    let table = ExportTable::from_records(records);
    let owner = ExportRecord::new(0, name, GraphSchema::ANIMATION.asset_class);
    let builder = ExpressionGraphBuilder::new(&GraphSchema::ANIMATION, &table, ctx.host, deserializer);
    let outcome = builder.build(&owner, blueprint, ctx.missing);
    for (node, reason) in outcome.skipped() {
        tracing::debug!("{}: node {} skipped ({:?})", name, node, reason);
    }
    ctx.diagnostics.extend(outcome.diagnostics);
    outcome.graph
}

/// Write the fields the generic deserializer leaves alone: cache names
/// and the links from cache readers to cache writers
fn link_cached_poses(
    ctx: &ImportContext<'_>,
    graph: &mut ExpressionGraph,
    nodes: &PropertyBag,
    caches: &IndexMap<String, NodeId>,
) {
    let classes = ctx.classes();
    let mut updates = Vec::new();

    for node in graph.nodes() {
        let Some(json) = nodes.get(&node.name) else {
            continue;
        };
        if classes.is_child_of(&node.class, SAVE_CACHED_POSE) {
            if let Some(cache) = json.get("CachePoseName").and_then(JsonValue::as_str) {
                updates.push((node.id, "CacheName", Value::String(cache.to_string())));
            }
        }
        if classes.is_child_of(&node.class, USE_CACHED_POSE) {
            let source = json
                .pointer("/LinkToCachingNode/ExpressionName")
                .and_then(JsonValue::as_str)
                .and_then(|name| caches.get(name));
            match source {
                Some(id) => updates.push((
                    node.id,
                    "SaveCachedPoseNode",
                    Value::Object(ObjectRef::Expression(*id)),
                )),
                None => tracing::debug!("{} reads no cached pose of the main graph", node.name),
            }
        }
    }

    for (id, field, value) in updates {
        if let Some(node) = graph.node_mut(id) {
            node.values.insert(field.to_string(), value);
        }
    }
}
