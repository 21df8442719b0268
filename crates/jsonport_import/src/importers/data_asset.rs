// SPDX-License-Identifier: MIT OR Apache-2.0
//! Data asset import.

use super::templated::import_into;
use crate::dispatch::{ImportContext, ImportedAsset, Importer};
use crate::error::{ImportError, ImportResult};
use crate::library::DATA_ASSET;

/// Imports any subclass of the generic data asset class
pub struct DataAssetImporter;

impl Importer for DataAssetImporter {
    fn types(&self) -> &[&'static str] {
        &[]
    }

    fn import(&self, ctx: &mut ImportContext<'_>) -> ImportResult<ImportedAsset> {
        if !ctx.classes().is_child_of(&ctx.record.ty, DATA_ASSET) {
            return Err(ImportError::UnknownClass(ctx.record.ty.clone()));
        }

        let mut asset = ctx.create_asset()?;
        let subobjects = import_into(ctx, &mut asset);
        Ok(ImportedAsset::new(ctx.asset_path(), asset).with_subobjects(subobjects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportTable;
    use crate::host::{HostCapabilities, InMemoryHost};
    use crate::importers::test_support::run;
    use crate::library::create_host_registry;
    use jsonport_graph::{ClassDescriptor, Field, FieldKind, NodeCategory, Reflect, Value};
    use serde_json::json;

    fn host_with_project_class() -> InMemoryHost {
        let mut classes = create_host_registry();
        classes.register(
            ClassDescriptor::new("WeaponData", NodeCategory::Asset)
                .with_parent("PrimaryDataAsset")
                .with_fields(vec![
                    Field::new("Damage", FieldKind::Float),
                    Field::new("Icon", FieldKind::structure("SlateBrush")),
                ]),
        );
        InMemoryHost::with_classes(classes, HostCapabilities::default())
    }

    #[test]
    fn test_project_data_asset() {
        let host = host_with_project_class();
        let table = ExportTable::from_values(&[
            json!({"Type": "WeaponData", "Name": "DA_Rifle", "Properties": {
                "Damage": 25,
                "Icon": {"ImageSize": {"X": 32.0, "Y": 32.0}}
            }}),
            json!({"Type": "SoundClass", "Name": "SC_Master"}),
        ]);

        let (result, _) = run(&DataAssetImporter, &host, &table, "DA_Rifle");
        let imported = result.unwrap();
        assert_eq!(imported.object.class, "WeaponData");
        assert_eq!(imported.object.value("Damage"), Some(&Value::Float(25.0)));
        assert!(matches!(imported.object.value("Icon"), Some(Value::Struct(_))));

        let (result, _) = run(&DataAssetImporter, &host, &table, "SC_Master");
        assert!(matches!(result, Err(ImportError::UnknownClass(_))));
    }
}
