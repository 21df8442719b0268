// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material and material function import.

use crate::builder::{ExpressionGraphBuilder, GraphSchema};
use crate::dispatch::{ImportContext, ImportedAsset, Importer};
use crate::error::{ImportError, ImportResult};

/// Imports graph-shaped material assets through the expression graph builder
pub struct MaterialImporter;

impl Importer for MaterialImporter {
    fn types(&self) -> &[&'static str] {
        &["Material", "MaterialFunction"]
    }

    fn import(&self, ctx: &mut ImportContext<'_>) -> ImportResult<ImportedAsset> {
        let record = ctx.record;
        let schema = GraphSchema::for_asset(&record.ty)
            .ok_or_else(|| ImportError::UnknownClass(record.ty.clone()))?;
        let mut asset = ctx.create_asset()?;

        let builder = ExpressionGraphBuilder::new(schema, ctx.table, ctx.host, ctx.deserializer());
        let collected = builder.collect(record);
        let listed = schema
            .collection_fields
            .iter()
            .any(|field| record.properties.contains_key(*field));
        if collected.editor_data.is_none() && !listed && collected.nodes.is_empty() {
            return Err(ImportError::MaterialDataMissing(record.name.clone()));
        }

        let outcome = builder.build(record, &mut asset, ctx.missing);
        for (name, reason) in outcome.skipped() {
            tracing::debug!("{}: node {} skipped ({:?})", record.name, name, reason);
        }
        ctx.diagnostics.extend(outcome.diagnostics);

        Ok(ImportedAsset::new(ctx.asset_path(), asset).with_graph(outcome.graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;
    use crate::export::ExportTable;
    use crate::host::InMemoryHost;
    use crate::importers::test_support::run;
    use crate::settings::ImportSettings;
    use jsonport_graph::{Reflect, Value};
    use serde_json::json;

    #[test]
    fn test_material_without_data_fails() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = ExportTable::from_values(&[json!({"Type": "Material", "Name": "M_Empty"})]);

        let (result, _) = run(&MaterialImporter, &host, &table, "M_Empty");
        assert!(matches!(result, Err(ImportError::MaterialDataMissing(name)) if name == "M_Empty"));
    }

    #[test]
    fn test_material_function_graph() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = ExportTable::from_values(&[
            json!({"Type": "MaterialFunction", "Name": "MF_Tint", "Properties": {
                "Description": "Tints a color",
                "FunctionExpressions": [
                    {"ObjectName": "MaterialExpressionFunctionInput'MF_Tint:In'"},
                    {"ObjectName": "MaterialExpressionFunctionOutput'MF_Tint:Out'"}
                ]
            }}),
            json!({"Type": "MaterialExpressionFunctionInput", "Name": "In", "Outer": "MF_Tint",
                   "Properties": {"InputName": "Color"}}),
            json!({"Type": "MaterialExpressionFunctionOutput", "Name": "Out", "Outer": "MF_Tint",
                   "Properties": {"A": {"Expression": {"ObjectName": "MaterialExpressionFunctionInput'MF_Tint:In'"}}}}),
            json!({"Type": "MaterialExpressionDoesNotExist", "Name": "Ghost", "Outer": "MF_Tint"}),
        ]);

        let (result, diagnostics) = run(&MaterialImporter, &host, &table, "MF_Tint");
        let imported = result.unwrap();
        let graph = imported.graph.unwrap();

        assert_eq!(graph.expression_count(), 3);
        assert_eq!(graph.connection_count(), 1);
        assert!(imported.object.value("FunctionExpressions").is_none());
        assert_eq!(
            imported.object.value("Description"),
            Some(&Value::String("Tints a color".to_string()))
        );
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::MissingNodeClass { type_name, .. }] if type_name == "MaterialExpressionDoesNotExist"
        ));
    }
}
