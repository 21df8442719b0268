// SPDX-License-Identifier: MIT OR Apache-2.0
//! Generic property deserializer.
//!
//! Assigns a JSON property bag onto any [`Reflect`] target. The target's
//! settable fields and their type tags come from the host class registry,
//! so the deserializer never needs to know the concrete target type.
//! Unknown names are ignored, unresolved references leave the field at its
//! default.

use crate::export::PropertyBag;
use crate::host::HostEngine;
use crate::reference::{expression_name, ObjectReference, ReferenceResolver, Resolution};
use indexmap::IndexMap;
use jsonport_graph::value::linear_to_srgb_byte;
use jsonport_graph::{
    ClassRegistry, ExpressionInput, FieldKind, InputConstant, InputKind, MaskBits, ObjectRef,
    Reflect, StructValue, Value,
};
use serde_json::Value as JsonValue;

/// Objects materialized by the current import, by export name
pub type MaterializedObjects = IndexMap<String, ObjectRef>;

/// Converts property bags into native field values
#[derive(Clone, Copy)]
pub struct PropertyDeserializer<'a> {
    classes: &'a ClassRegistry,
    host: &'a dyn HostEngine,
    resolver: ReferenceResolver<'a>,
    materialized: Option<&'a MaterializedObjects>,
    blacklist: &'a [String],
}

impl<'a> PropertyDeserializer<'a> {
    /// Create a deserializer resolving references through `resolver` and
    /// loading external assets from `host`
    pub fn new(host: &'a dyn HostEngine, resolver: ReferenceResolver<'a>) -> Self {
        Self {
            classes: host.classes(),
            host,
            resolver,
            materialized: None,
            blacklist: &[],
        }
    }

    /// Resolve references against objects already materialized by this import
    pub fn with_materialized(mut self, materialized: &'a MaterializedObjects) -> Self {
        self.materialized = Some(materialized);
        self
    }

    /// Never assign fields with these names
    pub fn with_blacklist(mut self, blacklist: &'a [String]) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Class registry used for field lookup
    pub fn classes(&self) -> &'a ClassRegistry {
        self.classes
    }

    /// Assign every known, writable field of `bag` onto `target`.
    /// Returns the number of fields assigned.
    pub fn assign(&self, target: &mut dyn Reflect, bag: &PropertyBag) -> usize {
        let mut assigned = 0;

        for (name, json) in bag {
            if self.blacklist.iter().any(|b| b == name) {
                continue;
            }

            let Some(field) = target.field(self.classes, name) else {
                tracing::debug!("{} has no field {}, ignored", target.class_name(), name);
                continue;
            };
            if field.read_only {
                tracing::debug!("{}.{} is read-only, ignored", target.class_name(), name);
                continue;
            }

            let Some(value) = self.convert(&field.kind, json) else {
                tracing::debug!(
                    "{}.{} of {} left at its default",
                    target.class_name(),
                    name,
                    target.object_name()
                );
                continue;
            };

            match target.set_field(self.classes, name, value) {
                Ok(()) => assigned += 1,
                Err(err) => tracing::debug!("{}", err),
            }
        }

        assigned
    }

    /// Convert a JSON value to the native representation of a field kind.
    /// `None` means the field should keep its default.
    pub fn convert(&self, kind: &FieldKind, json: &JsonValue) -> Option<Value> {
        if json.is_null() {
            return None;
        }

        match kind {
            FieldKind::Bool => match json {
                JsonValue::Bool(b) => Some(Value::Bool(*b)),
                JsonValue::Number(n) => n.as_i64().map(|n| Value::Bool(n != 0)),
                _ => None,
            },
            FieldKind::Int => json_int(json).map(Value::Int),
            FieldKind::Float => match json {
                JsonValue::Number(n) => n.as_f64().map(Value::Float),
                JsonValue::String(s) => s.parse::<f64>().ok().map(Value::Float),
                _ => None,
            },
            FieldKind::String | FieldKind::Name => match json {
                JsonValue::String(s) => Some(Value::String(s.clone())),
                JsonValue::Number(n) => Some(Value::String(n.to_string())),
                JsonValue::Bool(b) => Some(Value::String(b.to_string())),
                _ => None,
            },
            FieldKind::Text => text(json).map(Value::String),
            FieldKind::Enum(_) => match json {
                JsonValue::String(s) => Some(Value::Enum(strip_enum_prefix(s).to_string())),
                JsonValue::Number(n) => Some(Value::Enum(n.to_string())),
                _ => None,
            },
            FieldKind::Struct(name) => self.convert_struct(name, json),
            FieldKind::Object(_) => self.resolve_object(json),
            FieldKind::Array(inner) => {
                let items = json.as_array()?;
                Some(Value::Array(
                    items
                        .iter()
                        .map(|item| self.convert(inner, item).unwrap_or(Value::None))
                        .collect(),
                ))
            }
            FieldKind::Map(key, value) => self.convert_map(key, value, json),
            FieldKind::Input(input_kind) => self.convert_input(*input_kind, json),
        }
    }

    fn convert_struct(&self, name: &str, json: &JsonValue) -> Option<Value> {
        if name == "Guid" {
            if let JsonValue::String(hex) = json {
                return guid_from_hex(hex);
            }
        }

        let bag = json.as_object()?;
        let mut value = StructValue::new(name);
        self.assign(&mut value, bag);
        Some(Value::Struct(value))
    }

    fn convert_map(&self, key: &FieldKind, value: &FieldKind, json: &JsonValue) -> Option<Value> {
        let mut entries = Vec::new();
        match json {
            // [{"Key": k, "Value": v}, ...]
            JsonValue::Array(pairs) => {
                for pair in pairs {
                    let (Some(k), Some(v)) = (pair.get("Key"), pair.get("Value")) else {
                        continue;
                    };
                    if let Some(k) = self.convert(key, k) {
                        entries.push((k, self.convert(value, v).unwrap_or(Value::None)));
                    }
                }
            }
            JsonValue::Object(object) => {
                for (k, v) in object {
                    if let Some(k) = self.convert(key, &JsonValue::String(k.clone())) {
                        entries.push((k, self.convert(value, v).unwrap_or(Value::None)));
                    }
                }
            }
            _ => return None,
        }
        Some(Value::Map(entries))
    }

    /// Resolve an object reference: objects materialized by this import
    /// first, then the export table, then persisted assets
    pub fn resolve_object(&self, json: &JsonValue) -> Option<Value> {
        let reference = ObjectReference::from_json(json)?;

        if let Some(found) = self.materialized.and_then(|m| m.get(&reference.name)) {
            return Some(Value::Object(found.clone()));
        }

        let found = match self.resolver.resolve(&reference) {
            Resolution::Export(record) => self
                .materialized
                .and_then(|m| m.get(&record.name).cloned())
                .or_else(|| self.host.load_asset(&record.name)),
            Resolution::External(path) => self.host.load_asset(&path),
            Resolution::NotFound => None,
        };

        if found.is_none() {
            tracing::debug!("Unresolved reference to {}", reference.name);
        }
        found.map(Value::Object)
    }

    /// Convert an expression input. A constant input never resolves its
    /// expression; a connected input whose expression is not materialized
    /// yields `None`.
    pub fn convert_input(&self, kind: InputKind, json: &JsonValue) -> Option<Value> {
        let bag = json.as_object()?;
        let mut input = ExpressionInput::default();

        if kind != InputKind::Default {
            input.use_constant = bag.get("UseConstant").and_then(json_bool).unwrap_or(false);
            input.constant = bag.get("Constant").and_then(|c| input_constant(kind, c));
        }

        input.output_index = bag
            .get("OutputIndex")
            .and_then(json_int)
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(0);
        input.input_name = bag
            .get("InputName")
            .and_then(JsonValue::as_str)
            .filter(|name| !name.is_empty() && *name != "None")
            .map(str::to_string);
        input.mask = MaskBits {
            mask: mask_bit(bag, "Mask"),
            r: mask_bit(bag, "MaskR"),
            g: mask_bit(bag, "MaskG"),
            b: mask_bit(bag, "MaskB"),
            a: mask_bit(bag, "MaskA"),
        };

        if input.use_constant {
            return Some(Value::Input(input));
        }

        if let Some(name) = expression_name(bag) {
            match self.materialized.and_then(|m| m.get(&name)) {
                Some(ObjectRef::Expression(id)) => input.expression = Some(*id),
                _ => {
                    tracing::debug!("Input references {}, which is not in the graph", name);
                    return None;
                }
            }
        }

        Some(Value::Input(input))
    }
}

fn json_int(json: &JsonValue) -> Option<i64> {
    match json {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            // Integral floats are common for int fields
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => s.parse().ok(),
        JsonValue::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn json_bool(json: &JsonValue) -> Option<bool> {
    match json {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

fn mask_bit(bag: &PropertyBag, name: &str) -> bool {
    bag.get(name).and_then(json_bool).unwrap_or(false)
}

fn text(json: &JsonValue) -> Option<String> {
    match json {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Object(object) => ["SourceString", "CultureInvariantString", "LocalizedString"]
            .iter()
            .find_map(|key| object.get(*key).and_then(JsonValue::as_str))
            .map(str::to_string),
        _ => None,
    }
}

/// `EBlendMode::BLEND_Masked` -> `BLEND_Masked`
fn strip_enum_prefix(value: &str) -> &str {
    value.rsplit("::").next().unwrap_or(value)
}

fn input_constant(kind: InputKind, json: &JsonValue) -> Option<InputConstant> {
    let channel = |name: &str| json.get(name).and_then(JsonValue::as_f64).unwrap_or(0.0);

    match kind {
        InputKind::Scalar => json.as_f64().map(InputConstant::Scalar),
        InputKind::Vector => {
            json.as_object()?;
            Some(InputConstant::Vector([channel("X"), channel("Y"), channel("Z")]))
        }
        InputKind::Color => {
            json.as_object()?;
            // Constants are linear colors, stored as sRGB bytes
            Some(InputConstant::Color([
                linear_to_srgb_byte(channel("R")),
                linear_to_srgb_byte(channel("G")),
                linear_to_srgb_byte(channel("B")),
                (channel("A").clamp(0.0, 1.0) * 255.0).round() as u8,
            ]))
        }
        InputKind::Default => None,
    }
}

/// Parse a 32 digit hex GUID (dashes allowed) into a `Guid` struct value
pub fn guid_from_hex(hex: &str) -> Option<Value> {
    let digits: String = hex.chars().filter(|c| *c != '-').collect();
    if digits.len() != 32 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let mut guid = StructValue::new("Guid");
    for (i, part) in ["A", "B", "C", "D"].iter().enumerate() {
        let word = u32::from_str_radix(&digits[i * 8..i * 8 + 8], 16).ok()?;
        guid = guid.with(*part, Value::Int(i64::from(word)));
    }
    Some(Value::Struct(guid))
}

/// A fresh random `Guid` struct value
pub fn new_guid() -> Value {
    let bits = uuid::Uuid::new_v4().as_u128();
    let word = |shift: u32| Value::Int(i64::from((bits >> shift) as u32));
    Value::Struct(
        StructValue::new("Guid")
            .with("A", word(96))
            .with("B", word(64))
            .with("C", word(32))
            .with("D", word(0)),
    )
}

/// Copy of `bag` without the named properties
pub fn remove_properties(bag: &PropertyBag, names: &[&str]) -> PropertyBag {
    bag.iter()
        .filter(|(key, _)| !names.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Copy of `bag` holding only the named properties
pub fn keep_properties(bag: &PropertyBag, names: &[&str]) -> PropertyBag {
    bag.iter()
        .filter(|(key, _)| names.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportTable;
    use crate::host::InMemoryHost;
    use crate::settings::ImportSettings;
    use jsonport_graph::{NodeId, Object};
    use serde_json::json;

    fn bag(value: JsonValue) -> PropertyBag {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_assign_scalars_and_ignore_unknown() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = ExportTable::default();
        let deserializer = PropertyDeserializer::new(&host, ReferenceResolver::new(&table));

        let mut material = Object::new("Material", "M_Test");
        let assigned = deserializer.assign(
            &mut material,
            &bag(json!({
                "TwoSided": true,
                "OpacityMaskClipValue": 1,
                "BlendMode": "EBlendMode::BLEND_Masked",
                "NotAField": 42,
                "PhysMaterial": null
            })),
        );

        assert_eq!(assigned, 3);
        assert_eq!(material.value("TwoSided"), Some(&Value::Bool(true)));
        assert_eq!(material.value("OpacityMaskClipValue"), Some(&Value::Float(1.0)));
        assert_eq!(material.value("BlendMode"), Some(&Value::Enum("BLEND_Masked".into())));
        assert!(material.value("PhysMaterial").is_none());
    }

    #[test]
    fn test_nested_structs_and_arrays() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = ExportTable::default();
        let deserializer = PropertyDeserializer::new(&host, ReferenceResolver::new(&table));

        let mut collection = Object::new("MaterialParameterCollection", "MPC");
        deserializer.assign(
            &mut collection,
            &bag(json!({
                "ScalarParameters": [
                    {"ParameterName": "Wind", "DefaultValue": 2.0, "Id": "0123456789ABCDEF0123456789ABCDEF"}
                ]
            })),
        );

        let params = collection.value("ScalarParameters").and_then(Value::as_array).unwrap();
        let first = params[0].as_struct().unwrap();
        assert_eq!(first.get("ParameterName"), Some(&Value::String("Wind".into())));
        assert_eq!(first.float("DefaultValue"), Some(2.0));
    }

    #[test]
    fn test_int_fields_accept_integral_floats() {
        assert_eq!(json_int(&json!(3.0)), Some(3));
        assert_eq!(json_int(&json!(3.5)), None);
        assert_eq!(json_int(&json!("12")), Some(12));
    }

    #[test]
    fn test_blacklist() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = ExportTable::default();
        let blacklist = vec!["TwoSided".to_string()];
        let deserializer =
            PropertyDeserializer::new(&host, ReferenceResolver::new(&table)).with_blacklist(&blacklist);

        let mut material = Object::new("Material", "M");
        deserializer.assign(&mut material, &bag(json!({"TwoSided": true})));
        assert!(material.value("TwoSided").is_none());
    }

    #[test]
    fn test_constant_input_skips_resolution() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = ExportTable::default();
        let deserializer = PropertyDeserializer::new(&host, ReferenceResolver::new(&table));

        let value = deserializer
            .convert_input(
                InputKind::Scalar,
                &json!({"Expression": {"ObjectName": "X'M:Missing'"}, "UseConstant": true, "Constant": 0.25}),
            )
            .unwrap();
        let input = value.as_input().unwrap();
        assert!(input.use_constant);
        assert_eq!(input.expression, None);
        assert_eq!(input.effective_constant(), Some(&InputConstant::Scalar(0.25)));
    }

    #[test]
    fn test_connected_input_resolves_materialized_node() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = ExportTable::default();
        let id = NodeId::new();
        let mut names = MaterializedObjects::new();
        names.insert("Constant_0".to_string(), ObjectRef::Expression(id));
        let deserializer =
            PropertyDeserializer::new(&host, ReferenceResolver::new(&table)).with_materialized(&names);

        let value = deserializer
            .convert_input(
                InputKind::Color,
                &json!({
                    "Expression": {"ObjectName": "MaterialExpressionConstant'M:Constant_0'"},
                    "OutputIndex": 1,
                    "Mask": 1, "MaskR": 1, "MaskG": 0, "MaskB": 0, "MaskA": 0,
                    "UseConstant": false,
                    "Constant": {"R": 1.0, "G": 0.0, "B": 0.0, "A": 1.0}
                }),
            )
            .unwrap();
        let input = value.as_input().unwrap();
        assert!(input.is_connected());
        assert_eq!(input.expression, Some(id));
        assert_eq!(input.output_index, 1);
        assert!(input.mask.mask && input.mask.r && !input.mask.g);
        assert_eq!(input.constant, Some(InputConstant::Color([255, 0, 0, 255])));

        let missing = deserializer.convert_input(
            InputKind::Default,
            &json!({"Expression": {"ObjectName": "X'M:Missing'"}}),
        );
        assert!(missing.is_none());
    }

    #[test]
    fn test_color_constant_reads_integer_channels_as_linear() {
        let host = InMemoryHost::new(&ImportSettings::default());
        let table = ExportTable::default();
        let deserializer = PropertyDeserializer::new(&host, ReferenceResolver::new(&table));

        let constant = |color: JsonValue| {
            deserializer
                .convert_input(InputKind::Color, &json!({"UseConstant": true, "Constant": color}))
                .and_then(|value| value.as_input().and_then(|input| input.constant.clone()))
        };

        let floats = constant(json!({"R": 1.0, "G": 0.0, "B": 0.0, "A": 1.0}));
        let ints = constant(json!({"R": 1, "G": 0, "B": 0, "A": 1}));
        assert_eq!(floats, Some(InputConstant::Color([255, 0, 0, 255])));
        assert_eq!(ints, floats);
    }

    #[test]
    fn test_external_asset_reference() {
        let mut host = InMemoryHost::new(&ImportSettings::default());
        host.add_asset(Object::new("PhysicalMaterial", "PM_Stone"));
        let table = ExportTable::default();
        let deserializer = PropertyDeserializer::new(&host, ReferenceResolver::new(&table));

        let mut material = Object::new("Material", "M");
        deserializer.assign(
            &mut material,
            &bag(json!({
                "PhysMaterial": {"ObjectName": "PhysicalMaterial'PM_Stone'", "ObjectPath": "/Game/PM_Stone.0"}
            })),
        );
        assert_eq!(
            material.value("PhysMaterial"),
            Some(&Value::Object(ObjectRef::Asset("/Game/PM_Stone.PM_Stone".into())))
        );
    }

    #[test]
    fn test_guid_from_hex() {
        let guid = guid_from_hex("00000001-00000002-00000003-0000000A").unwrap();
        let guid = guid.as_struct().unwrap();
        assert_eq!(guid.get("A"), Some(&Value::Int(1)));
        assert_eq!(guid.get("D"), Some(&Value::Int(10)));
        assert!(guid_from_hex("xyz").is_none());
    }

    #[test]
    fn test_property_filters() {
        let source = bag(json!({"A": 1, "B": 2, "C": 3}));
        assert_eq!(remove_properties(&source, &["B"]).len(), 2);
        assert_eq!(keep_properties(&source, &["B", "Z"]).len(), 1);
    }
}
