// SPDX-License-Identifier: MIT OR Apache-2.0
//! User defined struct import.
//!
//! Member variables are rebuilt from the `ChildProperties` property
//! descriptions. Cooked member names look like `Health_12_0A1B...`, which
//! carries the display name, the member id and the member GUID.

use crate::deserialize::{guid_from_hex, keep_properties, PropertyDeserializer};
use crate::dispatch::{ImportContext, ImportedAsset, Importer};
use crate::error::ImportResult;
use crate::export::PropertyBag;
use jsonport_graph::{Reflect, StructValue, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

/// Asset properties assigned as-is
const ASSET_PROPERTIES: [&str; 3] = ["Guid", "DefaultProperties", "StructFlags"];

/// Imports user defined structs with their member variables
pub struct UserStructImporter;

impl Importer for UserStructImporter {
    fn types(&self) -> &[&'static str] {
        &["UserDefinedStruct"]
    }

    fn import(&self, ctx: &mut ImportContext<'_>) -> ImportResult<ImportedAsset> {
        let classes = ctx.classes();
        let deserializer = ctx.deserializer();
        let mut asset = ctx.create_asset()?;

        let bag = keep_properties(&ctx.record.properties, &ASSET_PROPERTIES);
        deserializer.assign(&mut asset, &bag);

        let members: Vec<&PropertyBag> = ctx
            .record
            .property("ChildProperties")
            .and_then(JsonValue::as_array)
            .map(|items| items.iter().filter_map(JsonValue::as_object).collect())
            .unwrap_or_default();

        // Ids taken by cooked names; fresh members get the next free one
        let mut used: BTreeSet<u32> = members
            .iter()
            .filter_map(|m| m.get("Name").and_then(JsonValue::as_str))
            .filter_map(split_member_name)
            .filter_map(|(_, id, _)| id.parse().ok())
            .collect();

        let mut variables = Vec::with_capacity(members.len());
        for member in members {
            match member_variable(&deserializer, member, &mut used) {
                Some(variable) => variables.push(Value::Struct(variable)),
                None => tracing::warn!("{}: member without name or type skipped", ctx.record.name),
            }
        }

        tracing::debug!("{}: {} member variables", ctx.record.name, variables.len());
        asset.set_field(classes, "Variables", Value::Array(variables))?;
        Ok(ImportedAsset::new(ctx.asset_path(), asset))
    }
}

/// `Display_Id_GUID` into its three parts
fn split_member_name(name: &str) -> Option<(&str, &str, &str)> {
    let mut parts = name.rsplitn(3, '_');
    let guid = parts.next()?;
    let id = parts.next()?;
    let display = parts.next()?;

    let valid_id = !id.is_empty() && id.chars().all(|c| c.is_ascii_digit());
    let valid_guid = !guid.is_empty()
        && guid.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase());
    (valid_id && valid_guid).then_some((display, id, guid))
}

fn member_variable(
    deserializer: &PropertyDeserializer<'_>,
    member: &PropertyBag,
    used: &mut BTreeSet<u32>,
) -> Option<StructValue> {
    let name = member.get("Name").and_then(JsonValue::as_str)?;
    member.get("Type").and_then(JsonValue::as_str)?;

    let (display, id, guid_hex) = match split_member_name(name) {
        Some((display, id, guid)) => (display.to_string(), id.to_string(), guid.to_string()),
        None => {
            let id = (1..).find(|candidate| !used.contains(candidate)).unwrap_or(1);
            used.insert(id);
            let guid = format!("{:032X}", uuid::Uuid::new_v4().as_u128());
            (name.to_string(), id.to_string(), guid)
        }
    };
    let guid = guid_from_hex(&guid_hex).unwrap_or_else(|| Value::Struct(StructValue::new("Guid")));

    let pin = PinType::resolve(deserializer, member);
    let mut variable = StructValue::new("StructVariableDescription")
        .with("VarName", Value::String(format!("{display}_{id}_{guid_hex}")))
        .with("FriendlyName", Value::String(display))
        .with("VarGuid", guid)
        .with("ContainerType", Value::Enum(pin.container.to_string()));
    variable = pin.write(variable, "Category", "SubCategory", "SubCategoryObject");

    if let Some(terminal) = pin.terminal {
        let terminal = terminal.write(
            StructValue::new("EdGraphTerminalType"),
            "TerminalCategory",
            "TerminalSubCategory",
            "TerminalSubCategoryObject",
        );
        variable = variable.with("PinValueType", Value::Struct(terminal));
    }
    Some(variable)
}

/// Editor pin type of one member
#[derive(Debug, Clone, PartialEq)]
struct PinType {
    category: &'static str,
    sub_category: Option<&'static str>,
    sub_object: Option<Value>,
    container: &'static str,
    terminal: Option<Box<PinType>>,
}

impl PinType {
    fn resolve(deserializer: &PropertyDeserializer<'_>, property: &PropertyBag) -> Self {
        let ty = property.get("Type").and_then(JsonValue::as_str).unwrap_or_default();
        let nested = |key: &str| -> Self {
            property
                .get(key)
                .and_then(JsonValue::as_object)
                .map(|inner| Self::resolve(deserializer, inner))
                .unwrap_or_else(|| Self::terminal("byte"))
        };

        match ty {
            "MapProperty" => Self {
                container: "Map",
                terminal: Some(Box::new(nested("ValueProp"))),
                ..nested("KeyProp")
            },
            "SetProperty" => Self {
                container: "Set",
                ..nested("ElementProp")
            },
            "ArrayProperty" => Self {
                container: "Array",
                ..nested("Inner")
            },
            _ => {
                let category = category(ty).unwrap_or_else(|| {
                    tracing::warn!("Unknown member type {}, stored as byte", ty);
                    "byte"
                });
                let sub_category = match ty {
                    "DoubleProperty" => Some("double"),
                    "FloatProperty" => Some("float"),
                    _ => None,
                };
                let sub_object = reference_key(ty).and_then(|key| {
                    let found = property.get(key).and_then(|r| deserializer.resolve_object(r));
                    if found.is_none() {
                        tracing::debug!("Member type {} has no loadable {}", ty, key);
                    }
                    found
                });
                Self {
                    category,
                    sub_category,
                    sub_object,
                    container: "None",
                    terminal: None,
                }
            }
        }
    }

    fn terminal(category: &'static str) -> Self {
        Self {
            category,
            sub_category: None,
            sub_object: None,
            container: "None",
            terminal: None,
        }
    }

    fn write(&self, mut target: StructValue, category: &str, sub_category: &str, sub_object: &str) -> StructValue {
        target = target.with(category, Value::String(self.category.to_string()));
        if let Some(sub) = self.sub_category {
            target = target.with(sub_category, Value::String(sub.to_string()));
        }
        if let Some(object) = &self.sub_object {
            target = target.with(sub_object, object.clone());
        }
        target
    }
}

fn category(ty: &str) -> Option<&'static str> {
    Some(match ty {
        "BoolProperty" => "bool",
        "ByteProperty" | "EnumProperty" => "byte",
        "IntProperty" => "int",
        "Int64Property" => "int64",
        "FloatProperty" | "DoubleProperty" => "real",
        "StrProperty" => "string",
        "TextProperty" => "text",
        "NameProperty" => "name",
        "ClassProperty" => "class",
        "SoftClassProperty" => "softclass",
        "ObjectProperty" => "object",
        "SoftObjectProperty" => "softobject",
        "StructProperty" => "struct",
        _ => return None,
    })
}

/// Property naming the sub-category object of a member type
fn reference_key(ty: &str) -> Option<&'static str> {
    match ty {
        "EnumProperty" | "ByteProperty" => Some("Enum"),
        "StructProperty" => Some("Struct"),
        "ClassProperty" | "SoftClassProperty" => Some("MetaClass"),
        "ObjectProperty" | "SoftObjectProperty" => Some("PropertyClass"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportTable;
    use crate::host::InMemoryHost;
    use crate::importers::test_support::run;
    use crate::settings::ImportSettings;
    use jsonport_graph::{Object, ObjectRef};
    use serde_json::json;

    #[test]
    fn test_split_member_name() {
        assert_eq!(
            split_member_name("Max_Health_3_8F1C2D3E4B5A69788796A5B4C3D2E1F0"),
            Some(("Max_Health", "3", "8F1C2D3E4B5A69788796A5B4C3D2E1F0"))
        );
        assert_eq!(split_member_name("Health"), None);
        assert_eq!(split_member_name("Health_x_ABC"), None);
    }

    #[test]
    fn test_members_are_rebuilt() {
        let mut host = InMemoryHost::new(&ImportSettings::default());
        host.add_asset(Object::new("UserDefinedEnum", "E_Team"));

        let table = ExportTable::from_values(&[json!({
            "Type": "UserDefinedStruct",
            "Name": "S_Stats",
            "Properties": {
                "StructFlags": "STRUCT_NoFlags",
                "Status": "UDSS_UpToDate"
            },
            "ChildProperties": [
                {"Type": "FloatProperty", "Name": "Health_2_8F1C2D3E4B5A69788796A5B4C3D2E1F0"},
                {"Type": "ByteProperty", "Name": "Team",
                 "Enum": {"ObjectName": "UserDefinedEnum'E_Team'", "ObjectPath": "/Game/E_Team.0"}},
                {"Type": "MapProperty", "Name": "Scores",
                 "KeyProp": {"Type": "NameProperty", "Name": "Scores_Key"},
                 "ValueProp": {"Type": "IntProperty", "Name": "Scores"}},
                {"Type": "ArrayProperty", "Name": "Tags", "Inner": {"Type": "NameProperty", "Name": "Tags"}},
                {"Name": "Broken"}
            ]
        })]);

        let (result, _) = run(&UserStructImporter, &host, &table, "S_Stats");
        let imported = result.unwrap();
        assert_eq!(
            imported.object.value("StructFlags"),
            Some(&Value::String("STRUCT_NoFlags".to_string()))
        );

        let variables = imported.object.value("Variables").and_then(Value::as_array).unwrap();
        assert_eq!(variables.len(), 4);
        let field = |index: usize, name: &str| variables[index].as_struct().and_then(|v| v.get(name)).cloned();

        assert_eq!(
            field(0, "VarName"),
            Some(Value::String("Health_2_8F1C2D3E4B5A69788796A5B4C3D2E1F0".to_string()))
        );
        assert_eq!(field(0, "FriendlyName"), Some(Value::String("Health".to_string())));
        assert_eq!(field(0, "SubCategory"), Some(Value::String("float".to_string())));

        // Fresh members take the free ids around the cooked one
        let Some(Value::String(team)) = field(1, "VarName") else {
            panic!("member name missing");
        };
        assert!(team.starts_with("Team_1_"));
        let Some(Value::String(scores)) = field(2, "VarName") else {
            panic!("member name missing");
        };
        assert!(scores.starts_with("Scores_3_"));
        assert_eq!(
            field(1, "SubCategoryObject"),
            Some(Value::Object(ObjectRef::Asset("/Game/E_Team.E_Team".to_string())))
        );

        assert_eq!(field(2, "ContainerType"), Some(Value::Enum("Map".to_string())));
        assert_eq!(field(2, "Category"), Some(Value::String("name".to_string())));
        let terminal = field(2, "PinValueType").unwrap();
        assert_eq!(
            terminal.as_struct().and_then(|t| t.get("TerminalCategory")),
            Some(&Value::String("int".to_string()))
        );
        assert_eq!(field(3, "ContainerType"), Some(Value::Enum("Array".to_string())));
    }
}
