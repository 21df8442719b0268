// SPDX-License-Identifier: MIT OR Apache-2.0
//! Textual object references and their resolution.
//!
//! References use the engine object path syntax
//! `Type'/Package/Path.Object:SubObject'`, paired with an `ObjectPath`
//! that carries either the package path plus an export index
//! (`/Game/M_Test.12`) or a loadable asset path.

use crate::export::{ExportRecord, ExportTable, PropertyBag};
use serde_json::Value as JsonValue;

/// A parsed object reference
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectReference {
    /// Declared type, the part before the first `'`
    pub type_name: Option<String>,
    /// Package path
    pub package: String,
    /// Outer object name, when the reference is qualified
    pub outer: Option<String>,
    /// Final object name
    pub name: String,
    /// Package path taken from `ObjectPath`, without the trailing index
    pub object_path: Option<String>,
    /// Export index taken from `ObjectPath`
    pub path_index: Option<usize>,
}

impl ObjectReference {
    /// Parse an `ObjectName` token and an optional `ObjectPath`
    pub fn parse(object_name: &str, object_path: Option<&str>) -> Self {
        let (type_name, inner) = match object_name.split_once('\'') {
            Some((ty, rest)) => (Some(ty.to_string()), rest.trim_end_matches('\'')),
            None => (None, object_name),
        };

        let (main, sub) = match inner.split_once(':') {
            Some((main, sub)) => (main, Some(sub)),
            None => (inner, None),
        };

        let (package, object) = match main.split_once('.') {
            Some((package, object)) => (package, Some(object)),
            None => (main, None),
        };

        // `Package.Outer.Object`
        let (main_outer, object) = match object.map(|o| o.rsplit_once('.').ok_or(o)) {
            Some(Ok((outer, object))) => (Some(outer), Some(object)),
            Some(Err(object)) => (None, Some(object)),
            None => (None, None),
        };

        let package_leaf = package.rsplit('/').next().unwrap_or(package);

        let (name, outer) = match sub {
            Some(sub) => match sub.rsplit_once('.') {
                Some((sub_outer, name)) => (name, Some(sub_outer)),
                None => (sub, Some(object.unwrap_or(package_leaf))),
            },
            None => (object.unwrap_or(package_leaf), main_outer),
        };

        let (object_path, path_index) = match object_path {
            Some(path) => match path.rsplit_once('.') {
                Some((package, index)) => (Some(package.to_string()), index.parse::<usize>().ok()),
                None => (Some(path.to_string()), None),
            },
            None => (None, None),
        };

        Self {
            type_name,
            package: package.to_string(),
            outer: outer.map(str::to_string),
            name: name.to_string(),
            object_path,
            path_index,
        }
    }

    /// Read a reference from its JSON form: `{ObjectName, ObjectPath}`,
    /// a soft reference `{AssetPathName}` or a bare `Type'Path'` string.
    /// `null` and `"None"` yield `None`.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(object) => {
                if let Some(name) = object.get("ObjectName").and_then(JsonValue::as_str) {
                    let path = object.get("ObjectPath").and_then(JsonValue::as_str);
                    return Some(Self::parse(name, path));
                }
                let asset = object.get("AssetPathName").and_then(JsonValue::as_str)?;
                Self::soft(asset)
            }
            JsonValue::String(token) if token.contains('\'') => Some(Self::parse(token, None)),
            JsonValue::String(path) => Self::soft(path),
            _ => None,
        }
    }

    fn soft(path: &str) -> Option<Self> {
        if path.is_empty() || path == "None" {
            return None;
        }
        let mut reference = Self::parse(path, None);
        reference.object_path = Some(reference.package.clone());
        Some(reference)
    }

    /// Package path to load from: `ObjectPath` when present, else the
    /// package named in the token
    pub fn load_path(&self) -> &str {
        self.object_path.as_deref().unwrap_or(&self.package)
    }
}

/// Outcome of resolving a reference
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// The reference names an export of the current table
    Export(&'a ExportRecord),
    /// The reference names a persisted asset to load by path
    External(String),
    /// Nothing matched
    NotFound,
}

/// Resolves references against one export table
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    table: &'a ExportTable,
    game_name: &'a str,
    package: Option<&'a str>,
}

impl<'a> ReferenceResolver<'a> {
    /// Create a resolver over a table
    pub fn new(table: &'a ExportTable) -> Self {
        Self {
            table,
            game_name: "",
            package: None,
        }
    }

    /// Set the game name used for path rewriting
    pub fn with_game_name(mut self, game_name: &'a str) -> Self {
        self.game_name = game_name;
        self
    }

    /// Set the name of the package the table was exported from; object path
    /// indices only resolve against the table for this package
    pub fn with_package(mut self, package: &'a str) -> Self {
        self.package = Some(package);
        self
    }

    /// The table being resolved against
    pub fn table(&self) -> &'a ExportTable {
        self.table
    }

    /// Resolve a reference: exact name and outer, then name only, then
    /// object path index, then an external asset path
    pub fn resolve(&self, reference: &ObjectReference) -> Resolution<'a> {
        if let Some(outer) = &reference.outer {
            if let Some(record) = self.table.get_with_outer(&reference.name, outer) {
                return Resolution::Export(record);
            }
        }

        if let Some(record) = self.table.get(&reference.name) {
            return Resolution::Export(record);
        }

        if self.is_local(reference) {
            return match reference.path_index.and_then(|i| self.table.by_index(i)) {
                Some(record) => Resolution::Export(record),
                None => Resolution::NotFound,
            };
        }

        match &reference.object_path {
            Some(_) if !reference.name.is_empty() => {
                let package = normalize_path(reference.load_path(), self.game_name);
                Resolution::External(format!("{}.{}", package, reference.name))
            }
            _ => Resolution::NotFound,
        }
    }

    /// Resolve a JSON reference value
    pub fn resolve_json(&self, value: &JsonValue) -> Resolution<'a> {
        match ObjectReference::from_json(value) {
            Some(reference) => self.resolve(&reference),
            None => Resolution::NotFound,
        }
    }

    fn is_local(&self, reference: &ObjectReference) -> bool {
        let (Some(package), Some(path)) = (self.package, reference.object_path.as_deref()) else {
            return false;
        };
        path.rsplit('/').next() == Some(package)
    }
}

/// Name of the node an expression input points at.
///
/// Reads the `Expression` reference; older exports that lack it (or hold
/// `null`) name the node in a plain `ExpressionName` string instead.
pub fn expression_name(input: &PropertyBag) -> Option<String> {
    match input.get("Expression") {
        None | Some(JsonValue::Null) => input
            .get("ExpressionName")
            .and_then(JsonValue::as_str)
            .filter(|name| !name.is_empty() && *name != "None")
            .map(str::to_string),
        Some(reference) => ObjectReference::from_json(reference).map(|r| r.name),
    }
}

/// Rewrite extractor content paths to mount points
pub fn normalize_path(path: &str, game_name: &str) -> String {
    let mut path = path.to_string();
    if !game_name.is_empty() {
        path = path.replace(&format!("{game_name}/Content"), "/Game");
    }
    path = path.replace("Engine/Content", "/Engine");
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_subobject_reference() {
        let reference = ObjectReference::parse(
            "MaterialExpressionAdd'M_Test:MaterialExpressionAdd_0'",
            Some("/Game/Materials/M_Test.4"),
        );
        assert_eq!(reference.type_name.as_deref(), Some("MaterialExpressionAdd"));
        assert_eq!(reference.name, "MaterialExpressionAdd_0");
        assert_eq!(reference.outer.as_deref(), Some("M_Test"));
        assert_eq!(reference.object_path.as_deref(), Some("/Game/Materials/M_Test"));
        assert_eq!(reference.path_index, Some(4));
    }

    #[test]
    fn test_parse_qualified_reference() {
        let reference = ObjectReference::parse("Texture2D'/Game/Textures/T_Albedo.T_Albedo'", None);
        assert_eq!(reference.package, "/Game/Textures/T_Albedo");
        assert_eq!(reference.name, "T_Albedo");
        assert_eq!(reference.outer, None);

        let nested = ObjectReference::parse("StaticMeshComponent'/Game/Maps/Map.Map:PersistentLevel.Rock'", None);
        assert_eq!(nested.name, "Rock");
        assert_eq!(nested.outer.as_deref(), Some("PersistentLevel"));

        let outer = ObjectReference::parse("Object'/Game/A.Outer.Inner'", None);
        assert_eq!(outer.name, "Inner");
        assert_eq!(outer.outer.as_deref(), Some("Outer"));
    }

    #[test]
    fn test_resolution_order() {
        let table = ExportTable::from_values(&[
            json!({"Type": "Material", "Name": "M_Test"}),
            json!({"Type": "MaterialExpressionAdd", "Name": "Add", "Outer": "Other"}),
            json!({"Type": "MaterialExpressionAdd", "Name": "Add", "Outer": "M_Test"}),
        ]);
        let resolver = ReferenceResolver::new(&table).with_package("M_Test");

        let qualified = ObjectReference::parse("MaterialExpressionAdd'M_Test:Add'", None);
        assert!(matches!(resolver.resolve(&qualified), Resolution::Export(r) if r.index == 2));

        let loose = ObjectReference::parse("MaterialExpressionAdd'Elsewhere:Add'", None);
        assert!(matches!(resolver.resolve(&loose), Resolution::Export(r) if r.index == 1));

        let by_index = ObjectReference::parse("Material'Renamed'", Some("/Game/M_Test.0"));
        assert!(matches!(resolver.resolve(&by_index), Resolution::Export(r) if r.name == "M_Test"));

        let missing_local = ObjectReference::parse("Thing'M_Test:Gone'", Some("/Game/M_Test.99"));
        assert_eq!(resolver.resolve(&missing_local), Resolution::NotFound);
    }

    #[test]
    fn test_external_reference() {
        let table = ExportTable::default();
        let resolver = ReferenceResolver::new(&table).with_game_name("ShooterGame");

        let value = json!({
            "ObjectName": "Texture2D'T_Rock'",
            "ObjectPath": "ShooterGame/Content/Textures/T_Rock.0"
        });
        assert_eq!(
            resolver.resolve_json(&value),
            Resolution::External("/Game/Textures/T_Rock.T_Rock".to_string())
        );

        let soft = json!({"AssetPathName": "/Engine/BasicShapes/Cube.Cube", "SubPathString": ""});
        assert_eq!(
            resolver.resolve_json(&soft),
            Resolution::External("/Engine/BasicShapes/Cube.Cube".to_string())
        );

        assert_eq!(resolver.resolve_json(&JsonValue::Null), Resolution::NotFound);
        assert_eq!(resolver.resolve_json(&json!({"AssetPathName": "None"})), Resolution::NotFound);
    }

    #[test]
    fn test_expression_name_fallback() {
        let modern = json!({
            "Expression": {"ObjectName": "MaterialExpressionConstant'M:Constant_0'", "ObjectPath": "/Game/M.3"},
            "OutputIndex": 0
        });
        assert_eq!(expression_name(modern.as_object().unwrap()).as_deref(), Some("Constant_0"));

        let legacy = json!({"Expression": null, "ExpressionName": "Constant_1"});
        assert_eq!(expression_name(legacy.as_object().unwrap()).as_deref(), Some("Constant_1"));

        let none = json!({"ExpressionName": "None"});
        assert_eq!(expression_name(none.as_object().unwrap()), None);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("Engine/Content/Functions/F", ""), "/Engine/Functions/F");
        assert_eq!(normalize_path("/Engine/Content/Functions/F", ""), "/Engine/Functions/F");
        assert_eq!(normalize_path("Game/Content/T", "Game"), "/Game/T");
    }
}
