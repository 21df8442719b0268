// SPDX-License-Identifier: MIT OR Apache-2.0
//! String table import.

use crate::dispatch::{ImportContext, ImportedAsset, Importer};
use crate::error::{ImportError, ImportResult};
use jsonport_graph::Reflect;
use serde_json::Value as JsonValue;

/// JSON key of the table data to asset field
const TABLE_FIELDS: [(&str, &str); 3] = [
    ("TableNamespace", "TableNamespace"),
    ("KeysToEntries", "Entries"),
    ("KeysToMetaData", "MetaData"),
];

/// Imports localized string tables
pub struct StringTableImporter;

impl Importer for StringTableImporter {
    fn types(&self) -> &[&'static str] {
        &["StringTable"]
    }

    fn import(&self, ctx: &mut ImportContext<'_>) -> ImportResult<ImportedAsset> {
        let data = ctx
            .record
            .property("StringTable")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| ImportError::MissingProperty {
                asset: ctx.record.name.clone(),
                property: "StringTable".to_string(),
            })?;

        let classes = ctx.classes();
        let deserializer = ctx.deserializer();
        let mut table = ctx.create_asset()?;

        for (key, field) in TABLE_FIELDS {
            let Some(json) = data.get(key) else {
                continue;
            };
            let Some(kind) = table.field(classes, field).map(|f| f.kind.clone()) else {
                continue;
            };
            if let Some(value) = deserializer.convert(&kind, json) {
                table.set_field(classes, field, value)?;
            }
        }

        Ok(ImportedAsset::new(ctx.asset_path(), table))
    }
}
