// SPDX-License-Identifier: MIT OR Apache-2.0
//! Physics asset import.
//!
//! Bodies and constraints are sub-object exports listed by reference. The
//! lists and the collision table are owned by the asset, so they are
//! written directly instead of going through field assignment.

use crate::deserialize::{remove_properties, MaterializedObjects};
use crate::dispatch::{ImportContext, ImportedAsset, Importer};
use crate::error::{ImportError, ImportResult};
use crate::reference::Resolution;
use jsonport_graph::{Object, ObjectRef, Reflect, StructValue, Value};
use serde_json::Value as JsonValue;

/// Asset properties handled here rather than by plain assignment
const OWNED_PROPERTIES: [&str; 5] = [
    "SkeletalBodySetups",
    "ConstraintSetup",
    "BoundsBodies",
    "ThumbnailInfo",
    "CollisionDisableTable",
];

/// Imports physics assets with their bodies and constraints
pub struct PhysicsAssetImporter;

impl Importer for PhysicsAssetImporter {
    fn types(&self) -> &[&'static str] {
        &["PhysicsAsset"]
    }

    fn import(&self, ctx: &mut ImportContext<'_>) -> ImportResult<ImportedAsset> {
        let record = ctx.record;
        let collision = record
            .property("CollisionDisableTable")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| ImportError::MissingProperty {
                asset: record.name.clone(),
                property: "CollisionDisableTable".to_string(),
            })?;

        let mut asset = ctx.create_asset()?;
        let mut subobjects = Vec::new();
        let mut names = MaterializedObjects::new();

        let bodies = materialize_list(ctx, "SkeletalBodySetups", "SkeletalBodySetup", &mut subobjects, &mut names);
        let constraints = materialize_list(ctx, "ConstraintSetup", "PhysicsConstraintTemplate", &mut subobjects, &mut names);

        let values = asset.values_mut();
        values.insert("SkeletalBodySetups".to_string(), Value::Array(bodies));
        values.insert("ConstraintSetup".to_string(), Value::Array(constraints));
        values.insert("CollisionDisableTable".to_string(), collision_table(collision));

        if let Some((path, mesh)) = ctx.host.selected_asset("SkeletalMesh") {
            tracing::debug!("Previewing {} with {}", record.name, mesh.name);
            asset
                .values_mut()
                .insert("PreviewSkeletalMesh".to_string(), Value::Object(ObjectRef::Asset(path.to_string())));
        }

        let rest = remove_properties(&record.properties, &OWNED_PROPERTIES);
        ctx.deserializer().with_materialized(&names).assign(&mut asset, &rest);

        Ok(ImportedAsset::new(ctx.asset_path(), asset).with_subobjects(subobjects))
    }
}

/// Create the sub-objects named by a reference array, in list order.
/// Unresolvable references are dropped.
fn materialize_list(
    ctx: &ImportContext<'_>,
    property: &str,
    class: &str,
    subobjects: &mut Vec<Object>,
    names: &mut MaterializedObjects,
) -> Vec<Value> {
    let Some(items) = ctx.record.property(property).and_then(JsonValue::as_array) else {
        return Vec::new();
    };

    let resolver = ctx.resolver();
    let deserializer = ctx.deserializer();
    let mut list = Vec::with_capacity(items.len());

    for item in items {
        let Resolution::Export(export) = resolver.resolve_json(item) else {
            tracing::warn!("{}: unresolved {} entry {}", ctx.record.name, property, item);
            continue;
        };
        let Some(object) = ctx.classes().create_object(class, &export.name) else {
            continue;
        };
        let mut object = object.with_outer(&ctx.record.name);
        deserializer.assign(&mut object, &export.properties);

        let reference = ObjectRef::Object(object.id);
        names.insert(export.name.clone(), reference.clone());
        list.push(Value::Object(reference));
        subobjects.push(object);
    }
    list
}

/// `[{"Key": {"Indices": [a, b]}, "Value": bool}, ...]` as a native map
fn collision_table(entries: &[JsonValue]) -> Value {
    let mut table = Vec::with_capacity(entries.len());
    for entry in entries {
        let indices: Vec<Value> = entry
            .pointer("/Key/Indices")
            .and_then(JsonValue::as_array)
            .map(|indices| indices.iter().filter_map(JsonValue::as_i64).map(Value::Int).collect())
            .unwrap_or_default();
        if indices.len() != 2 {
            tracing::warn!("Collision table entry without a body pair: {}", entry);
            continue;
        }

        let disabled = entry.get("Value").and_then(JsonValue::as_bool).unwrap_or(false);
        let pair = StructValue::new("RigidBodyIndexPair").with("Indices", Value::Array(indices));
        table.push((Value::Struct(pair), Value::Bool(disabled)));
    }
    Value::Map(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportTable;
    use crate::host::InMemoryHost;
    use crate::importers::test_support::run;
    use crate::settings::ImportSettings;
    use serde_json::json;

    fn physics_table(with_collision: bool) -> ExportTable {
        let mut properties = json!({
            "SkeletalBodySetups": [
                {"ObjectName": "SkeletalBodySetup'PA_Hero:SkeletalBodySetup_0'"},
                {"ObjectName": "SkeletalBodySetup'PA_Hero:SkeletalBodySetup_1'"}
            ],
            "ConstraintSetup": [
                {"ObjectName": "PhysicsConstraintTemplate'PA_Hero:PhysicsConstraintTemplate_0'"}
            ],
            "BoundsBodies": [0, 1],
            "bNotForDedicatedServer": true
        });
        if with_collision {
            properties["CollisionDisableTable"] = json!([
                {"Key": {"Indices": [0, 1]}, "Value": true}
            ]);
        }

        ExportTable::from_values(&[
            json!({"Type": "PhysicsAsset", "Name": "PA_Hero", "Properties": properties}),
            json!({"Type": "SkeletalBodySetup", "Name": "SkeletalBodySetup_0", "Outer": "PA_Hero",
                   "Properties": {"BoneName": "pelvis", "PhysicsType": "PhysType_Default"}}),
            json!({"Type": "SkeletalBodySetup", "Name": "SkeletalBodySetup_1", "Outer": "PA_Hero",
                   "Properties": {"BoneName": "spine_01"}}),
            json!({"Type": "PhysicsConstraintTemplate", "Name": "PhysicsConstraintTemplate_0", "Outer": "PA_Hero",
                   "Properties": {"DefaultInstance": {"JointName": "spine_01", "ConstraintBone1": "spine_01", "ConstraintBone2": "pelvis"}}}),
        ])
    }

    #[test]
    fn test_bodies_constraints_and_collision() {
        let mut host = InMemoryHost::new(&ImportSettings::default());
        assert!(host.select_new("SkeletalMesh", "/Game/SK_Hero.SK_Hero"));
        let table = physics_table(true);

        let (result, _) = run(&PhysicsAssetImporter, &host, &table, "PA_Hero");
        let imported = result.unwrap();
        let asset = &imported.object;

        assert_eq!(imported.subobjects.len(), 3);
        assert_eq!(
            imported.subobjects[1].value("BoneName"),
            Some(&Value::String("spine_01".to_string()))
        );
        let bodies = asset.value("SkeletalBodySetups").and_then(Value::as_array).unwrap();
        assert_eq!(bodies[0].as_object(), Some(&ObjectRef::Object(imported.subobjects[0].id)));
        assert_eq!(asset.value("ConstraintSetup").and_then(Value::as_array).map(<[Value]>::len), Some(1));

        let Some(Value::Map(collision)) = asset.value("CollisionDisableTable") else {
            panic!("collision table not written");
        };
        assert_eq!(collision.len(), 1);
        assert_eq!(collision[0].1, Value::Bool(true));

        assert_eq!(asset.value("bNotForDedicatedServer"), Some(&Value::Bool(true)));
        assert!(asset.value("BoundsBodies").is_none());
        assert_eq!(
            asset.value("PreviewSkeletalMesh"),
            Some(&Value::Object(ObjectRef::Asset("/Game/SK_Hero.SK_Hero".to_string())))
        );
    }

    #[test]
    fn test_collision_table_is_required() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = physics_table(false);

        let (result, _) = run(&PhysicsAssetImporter, &host, &table, "PA_Hero");
        assert!(matches!(
            result,
            Err(ImportError::MissingProperty { property, .. }) if property == "CollisionDisableTable"
        ));
    }
}
