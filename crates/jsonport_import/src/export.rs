// SPDX-License-Identifier: MIT OR Apache-2.0
//! Export records and the export table.
//!
//! An export table is the flat, unordered list of records produced by the
//! extraction tool. It is loaded once per batch and is read-only afterwards.

use crate::error::{ImportError, ImportResult};
use serde_json::{Map, Value as JsonValue};

/// Property bag: ordered field name to JSON value mapping
pub type PropertyBag = Map<String, JsonValue>;

/// Top-level fields that stay outside the property bag
const RESERVED_FIELDS: [&str; 5] = ["Type", "Name", "Class", "Flags", "Properties"];

/// One named record of the export table
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    /// Position in the source document
    pub index: usize,
    /// Export name, unique within the table
    pub name: String,
    /// Declared type name
    pub ty: String,
    /// Declared class path, if any
    pub class: Option<String>,
    /// Containment reference
    pub outer: Option<String>,
    /// Object flags as written by the extractor
    pub flags: Option<String>,
    /// Property bag, with stray top-level fields folded in
    pub properties: PropertyBag,
}

impl ExportRecord {
    /// Create a record with an empty property bag
    pub fn new(index: usize, name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            ty: ty.into(),
            class: None,
            outer: None,
            flags: None,
            properties: PropertyBag::new(),
        }
    }

    /// Set the outer
    pub fn with_outer(mut self, outer: impl Into<String>) -> Self {
        let outer = outer.into();
        self.properties
            .insert("Outer".to_string(), JsonValue::String(outer.clone()));
        self.outer = Some(outer);
        self
    }

    /// Set the property bag
    pub fn with_properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        if let Some(outer) = &self.outer {
            self.properties
                .insert("Outer".to_string(), JsonValue::String(outer.clone()));
        }
        self
    }

    /// Parse one record. Every top-level field other than `Type`, `Name`,
    /// `Class`, `Flags` and `Properties` is moved into the property bag.
    pub fn from_json(index: usize, value: &JsonValue) -> ImportResult<Self> {
        let object = value.as_object().ok_or_else(|| ImportError::MalformedExport {
            index,
            reason: "record is not an object".to_string(),
        })?;

        let required = |field: &str| -> ImportResult<String> {
            object
                .get(field)
                .and_then(JsonValue::as_str)
                .map(str::to_string)
                .ok_or_else(|| ImportError::MalformedExport {
                    index,
                    reason: format!("missing string field \"{field}\""),
                })
        };

        let ty = required("Type")?;
        let name = required("Name")?;

        let mut properties = match object.get("Properties") {
            Some(JsonValue::Object(bag)) => bag.clone(),
            _ => PropertyBag::new(),
        };
        for (key, field) in object {
            if !RESERVED_FIELDS.contains(&key.as_str()) {
                properties.insert(key.clone(), field.clone());
            }
        }

        let text = |field: &str| object.get(field).and_then(JsonValue::as_str).map(str::to_string);

        Ok(Self {
            index,
            name,
            ty,
            class: text("Class"),
            outer: text("Outer"),
            flags: text("Flags"),
            properties,
        })
    }

    /// Whether the record is contained in `outer`
    pub fn is_in(&self, outer: &str) -> bool {
        self.outer.as_deref() == Some(outer)
    }

    /// Get a property
    pub fn property(&self, name: &str) -> Option<&JsonValue> {
        self.properties.get(name)
    }
}

/// The flat export corpus of one JSON document
#[derive(Debug, Clone, Default)]
pub struct ExportTable {
    records: Vec<ExportRecord>,
    malformed: Vec<(usize, String)>,
}

impl ExportTable {
    /// Parse a document holding an array of records (or a single record)
    pub fn from_json_str(source: &str) -> ImportResult<Self> {
        let document: JsonValue = serde_json::from_str(source)?;
        Ok(match document {
            JsonValue::Array(values) => Self::from_values(&values),
            single => Self::from_values(std::slice::from_ref(&single)),
        })
    }

    /// Build a table from parsed records. Malformed records are kept aside
    /// and reported by [`Self::malformed`].
    pub fn from_values(values: &[JsonValue]) -> Self {
        let mut table = Self::default();
        for (index, value) in values.iter().enumerate() {
            match ExportRecord::from_json(index, value) {
                Ok(record) => table.records.push(record),
                Err(err) => {
                    tracing::warn!("Skipping export: {}", err);
                    table.malformed.push((index, err.to_string()));
                }
            }
        }
        table
    }

    /// Build a table from already constructed records
    pub fn from_records(records: Vec<ExportRecord>) -> Self {
        Self {
            records,
            malformed: Vec::new(),
        }
    }

    /// Records that failed to parse, by index and reason
    pub fn malformed(&self) -> &[(usize, String)] {
        &self.malformed
    }

    /// All records in document order
    pub fn iter(&self) -> impl Iterator<Item = &ExportRecord> {
        self.records.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record with this name
    pub fn get(&self, name: &str) -> Option<&ExportRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Record with this name contained in `outer`
    pub fn get_with_outer(&self, name: &str, outer: &str) -> Option<&ExportRecord> {
        self.records.iter().find(|r| r.name == name && r.is_in(outer))
    }

    /// Record at a document index
    pub fn by_index(&self, index: usize) -> Option<&ExportRecord> {
        self.records.iter().find(|r| r.index == index)
    }

    /// Whether `record` sits somewhere below `root` in the outer chain
    pub fn is_within(&self, record: &ExportRecord, root: &str) -> bool {
        let mut outer = record.outer.as_deref();
        // The chain is bounded by the table size, cyclic outers end the walk
        for _ in 0..=self.records.len() {
            match outer {
                Some(name) if name == root => return true,
                Some(name) => outer = self.get(name).and_then(|r| r.outer.as_deref()),
                None => return false,
            }
        }
        false
    }

    /// Records below `root` in the outer chain, in document order
    pub fn descendants<'a>(&'a self, root: &'a str) -> impl Iterator<Item = &'a ExportRecord> {
        self.records.iter().filter(move |r| self.is_within(r, root))
    }

    /// First record of exactly this type
    pub fn find_by_type(&self, ty: &str) -> Option<&ExportRecord> {
        self.records.iter().find(|r| r.ty == ty)
    }

    /// First record whose name starts with `prefix`
    pub fn find_by_name_prefix(&self, prefix: &str) -> Option<&ExportRecord> {
        self.records.iter().find(|r| r.name.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_fields_fold_into_properties() {
        let record = ExportRecord::from_json(
            0,
            &json!({
                "Type": "MaterialExpressionAdd",
                "Name": "Add_0",
                "Outer": "M_Test",
                "Class": "UScriptClass'MaterialExpressionAdd'",
                "Flags": "RF_Public",
                "Inputs": [],
                "Properties": { "ConstB": 2.0 }
            }),
        )
        .unwrap();

        assert_eq!(record.outer.as_deref(), Some("M_Test"));
        assert_eq!(record.flags.as_deref(), Some("RF_Public"));
        assert!(record.property("ConstB").is_some());
        assert!(record.property("Inputs").is_some());
        assert!(record.property("Outer").is_some());
        assert!(record.property("Type").is_none());
        assert!(record.property("Class").is_none());
    }

    #[test]
    fn test_malformed_records_are_set_aside() {
        let table = ExportTable::from_json_str(
            r#"[{"Type": "Material", "Name": "M"}, {"Name": "NoType"}, 42]"#,
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.malformed().len(), 2);
        assert_eq!(table.malformed()[0].0, 1);
    }

    #[test]
    fn test_lookups() {
        let table = ExportTable::from_values(&[
            json!({"Type": "Material", "Name": "M"}),
            json!({"Type": "MaterialEditorOnlyData", "Name": "MEOD", "Outer": "M"}),
            json!({"Type": "MaterialExpressionAdd", "Name": "Add", "Outer": "MEOD"}),
            json!({"Type": "MaterialExpressionAdd", "Name": "Add", "Outer": "Other"}),
        ]);

        assert_eq!(table.get_with_outer("Add", "Other").map(|r| r.index), Some(3));
        assert_eq!(table.get("Add").map(|r| r.index), Some(2));
        assert_eq!(table.by_index(1).map(|r| r.name.as_str()), Some("MEOD"));
        assert!(table.find_by_type("MaterialEditorOnlyData").is_some());

        assert_eq!(table.descendants("M").count(), 2);
        assert!(!table.is_within(table.get("M").unwrap(), "M"));
    }

    #[test]
    fn test_cyclic_outers_terminate() {
        let table = ExportTable::from_values(&[
            json!({"Type": "A", "Name": "X", "Outer": "Y"}),
            json!({"Type": "A", "Name": "Y", "Outer": "X"}),
        ]);
        assert_eq!(table.descendants("Root").count(), 0);
    }

    #[test]
    fn test_single_object_document() {
        let table = ExportTable::from_json_str(r#"{"Type": "StringTable", "Name": "ST"}"#).unwrap();
        assert_eq!(table.len(), 1);
        assert!(ExportTable::from_json_str("not json").is_err());
    }
}
