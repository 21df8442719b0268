// SPDX-License-Identifier: MIT OR Apache-2.0
//! Skeleton import into the selected skeleton.

use super::templated::materialize_subobjects;
use crate::deserialize::remove_properties;
use crate::dispatch::{ImportContext, ImportedAsset, Importer};
use crate::error::{ImportError, ImportResult};
use jsonport_graph::Reflect;

/// Cooked-only data that must not overwrite the editor skeleton
const COOKED_PROPERTIES: [&str; 4] = [
    "FinalRefBonePose",
    "FinalNameToIndexMap",
    "Guid",
    "ReferenceSkeleton",
];

/// Applies sockets, virtual bones and slot groups onto the skeleton
/// selected in the host. The bone hierarchy itself stays untouched.
pub struct SkeletonImporter;

impl Importer for SkeletonImporter {
    fn types(&self) -> &[&'static str] {
        &["Skeleton"]
    }

    fn import(&self, ctx: &mut ImportContext<'_>) -> ImportResult<ImportedAsset> {
        let (path, selected) = ctx
            .host
            .selected_asset("Skeleton")
            .ok_or_else(|| ImportError::NoSelection("Skeleton".to_string()))?;

        let mut skeleton = selected.clone();
        skeleton.values_mut().shift_remove("Sockets");

        let (names, subobjects) = materialize_subobjects(ctx, &ctx.record.name);
        let bag = remove_properties(&ctx.record.properties, &COOKED_PROPERTIES);
        ctx.deserializer().with_materialized(&names).assign(&mut skeleton, &bag);

        Ok(ImportedAsset::new(path, skeleton).with_subobjects(subobjects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportTable;
    use crate::host::InMemoryHost;
    use crate::importers::test_support::run;
    use crate::settings::ImportSettings;
    use jsonport_graph::{ObjectRef, Value};
    use serde_json::json;

    fn skeleton_table() -> ExportTable {
        ExportTable::from_values(&[
            json!({"Type": "Skeleton", "Name": "SK_Hero_Skeleton", "Properties": {
                "Sockets": [{"ObjectName": "SkeletalMeshSocket'SK_Hero_Skeleton:hand_r_socket'"}],
                "VirtualBones": [{"SourceBoneName": "hand_r", "TargetBoneName": "lowerarm_r", "VirtualBoneName": "VB hand_r"}],
                "Guid": "00000000000000000000000000000001"
            }}),
            json!({"Type": "SkeletalMeshSocket", "Name": "hand_r_socket", "Outer": "SK_Hero_Skeleton",
                   "Properties": {"SocketName": "weapon_r", "BoneName": "hand_r"}}),
        ])
    }

    #[test]
    fn test_requires_selected_skeleton() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let (result, _) = run(&SkeletonImporter, &host, &skeleton_table(), "SK_Hero_Skeleton");
        assert!(matches!(result, Err(ImportError::NoSelection(class)) if class == "Skeleton"));
    }

    #[test]
    fn test_sockets_replace_existing_ones() {
        let mut host = InMemoryHost::new(&ImportSettings::default());
        let mut existing = jsonport_graph::Object::new("Skeleton", "SK_Target");
        existing.values.insert(
            "Sockets".to_string(),
            Value::Array(vec![Value::Object(ObjectRef::Asset("/Game/Old.Old".to_string()))]),
        );
        let path = host.add_asset(existing);
        assert!(host.select(&path));

        let (result, _) = run(&SkeletonImporter, &host, &skeleton_table(), "SK_Hero_Skeleton");
        let imported = result.unwrap();

        assert_eq!(imported.path, "/Game/SK_Target.SK_Target");
        assert_eq!(imported.object.name, "SK_Target");
        assert_eq!(imported.subobjects.len(), 1);

        let sockets = imported.object.value("Sockets").and_then(Value::as_array).unwrap();
        assert_eq!(sockets, &[Value::Object(ObjectRef::Object(imported.subobjects[0].id))]);
        assert!(imported.object.value("VirtualBones").is_some());
        assert!(imported.object.value("Guid").is_none());
    }
}
