// SPDX-License-Identifier: MIT OR Apache-2.0
//! Generic asset import: create, materialize sub-objects, assign properties.

use crate::deserialize::MaterializedObjects;
use crate::dispatch::{ImportContext, ImportedAsset, Importer};
use crate::error::ImportResult;
use jsonport_graph::{Object, ObjectRef};

/// Imports any asset whose properties map directly onto its class.
///
/// Exports contained in the asset (sound nodes of a sound cue, thumbnail
/// info, ...) are created first, so references between them resolve.
pub struct TemplatedImporter;

impl Importer for TemplatedImporter {
    fn types(&self) -> &[&'static str] {
        &[]
    }

    fn import(&self, ctx: &mut ImportContext<'_>) -> ImportResult<ImportedAsset> {
        let mut asset = ctx.create_asset()?;
        let subobjects = import_into(ctx, &mut asset);
        Ok(ImportedAsset::new(ctx.asset_path(), asset).with_subobjects(subobjects))
    }
}

/// Create every export contained in `root` and assign its properties.
///
/// Objects are created in one pass and filled in a second one, so a
/// sub-object may reference any sibling regardless of table order.
pub(crate) fn materialize_subobjects(
    ctx: &ImportContext<'_>,
    root: &str,
) -> (MaterializedObjects, Vec<Object>) {
    let classes = ctx.classes();
    let mut names = MaterializedObjects::new();
    let mut objects = Vec::new();
    let mut records = Vec::new();

    for record in ctx.table.descendants(root) {
        if names.contains_key(&record.name) {
            continue;
        }
        let Some(object) = classes.create_object(&record.ty, &record.name) else {
            tracing::debug!("No class {} for sub-object {}, skipped", record.ty, record.name);
            continue;
        };
        let outer = record.outer.as_deref().unwrap_or(root);
        let object = object.with_outer(outer);
        names.insert(record.name.clone(), ObjectRef::Object(object.id));
        objects.push(object);
        records.push(record);
    }

    let deserializer = ctx.deserializer().with_materialized(&names);
    for (object, record) in objects.iter_mut().zip(&records) {
        deserializer.assign(object, &record.properties);
    }

    (names, objects)
}

/// Materialize the sub-objects of the current export, then assign its
/// own properties onto `asset`. Returns the sub-objects.
pub(crate) fn import_into(ctx: &ImportContext<'_>, asset: &mut Object) -> Vec<Object> {
    let (names, subobjects) = materialize_subobjects(ctx, &ctx.record.name);
    let assigned = ctx
        .deserializer()
        .with_materialized(&names)
        .assign(asset, &ctx.record.properties);
    tracing::debug!(
        "{}: {} properties, {} sub-objects",
        ctx.record.name,
        assigned,
        subobjects.len()
    );
    subobjects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportTable;
    use crate::host::InMemoryHost;
    use crate::importers::test_support::run;
    use crate::settings::ImportSettings;
    use jsonport_graph::{Reflect, Value};
    use serde_json::json;

    #[test]
    fn test_sound_cue_links_its_nodes() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = ExportTable::from_values(&[
            json!({"Type": "SoundCue", "Name": "SC_Step", "Properties": {
                "FirstNode": {"ObjectName": "SoundNodeRandom'SC_Step:SoundNodeRandom_0'"},
                "VolumeMultiplier": 0.5
            }}),
            json!({"Type": "SoundNodeRandom", "Name": "SoundNodeRandom_0", "Outer": "SC_Step", "Properties": {
                "ChildNodes": [
                    {"ObjectName": "SoundNodeWavePlayer'SC_Step:SoundNodeWavePlayer_1'"},
                    {"ObjectName": "SoundNodeWavePlayer'SC_Step:SoundNodeWavePlayer_2'"}
                ]
            }}),
            json!({"Type": "SoundNodeWavePlayer", "Name": "SoundNodeWavePlayer_1", "Outer": "SC_Step"}),
            json!({"Type": "SoundNodeWavePlayer", "Name": "SoundNodeWavePlayer_2", "Outer": "SC_Step"}),
        ]);

        let (result, _) = run(&TemplatedImporter, &host, &table, "SC_Step");
        let imported = result.unwrap();
        assert_eq!(imported.subobjects.len(), 3);
        assert_eq!(imported.path, "/Game/SC_Step.SC_Step");

        let random = &imported.subobjects[0];
        let first = imported.object.value("FirstNode").and_then(Value::as_object);
        assert_eq!(first, Some(&ObjectRef::Object(random.id)));

        let children = random.value("ChildNodes").and_then(Value::as_array).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[1].as_object(),
            Some(&ObjectRef::Object(imported.subobjects[2].id))
        );
        assert_eq!(random.outer.as_deref(), Some("SC_Step"));
    }

    #[test]
    fn test_blend_space_properties() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = ExportTable::from_values(&[json!({
            "Type": "BlendSpace",
            "Name": "BS_Walk",
            "Properties": {
                "BlendParameters": [
                    {"DisplayName": "Speed", "Min": 0.0, "Max": 600.0, "GridNum": 4},
                    {"DisplayName": "Direction", "Min": -180.0, "Max": 180.0, "GridNum": 4}
                ],
                "NotAField": true
            }
        })]);

        let (result, _) = run(&TemplatedImporter, &host, &table, "BS_Walk");
        let imported = result.unwrap();
        let parameters = imported
            .object
            .value("BlendParameters")
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(parameters.len(), 2);
        assert!(imported.object.value("NotAField").is_none());
        assert!(imported.subobjects.is_empty());
    }
}
