// SPDX-License-Identifier: MIT OR Apache-2.0
//! Core struct descriptors shared by every class library.

use crate::node::{ClassDescriptor, ClassRegistry, NodeCategory};
use crate::port::{Field, FieldKind};

fn structure(name: &str, fields: Vec<Field>) -> ClassDescriptor {
    ClassDescriptor::new(name, NodeCategory::Struct).with_fields(fields)
}

fn floats(names: &[&str]) -> Vec<Field> {
    names.iter().map(|n| Field::new(*n, FieldKind::Float)).collect()
}

/// Register the math, color and identity structs
pub fn register_core_structs(registry: &mut ClassRegistry) {
    registry.register_struct(structure("Vector", floats(&["X", "Y", "Z"])));
    registry.register_struct(structure("Vector2D", floats(&["X", "Y"])));
    registry.register_struct(structure("Vector4", floats(&["X", "Y", "Z", "W"])));
    registry.register_struct(structure("Rotator", floats(&["Pitch", "Yaw", "Roll"])));
    registry.register_struct(structure("Quat", floats(&["X", "Y", "Z", "W"])));
    registry.register_struct(structure("LinearColor", floats(&["R", "G", "B", "A"])));
    registry.register_struct(structure(
        "Color",
        ["R", "G", "B", "A"]
            .iter()
            .map(|n| Field::new(*n, FieldKind::Int))
            .collect(),
    ));
    registry.register_struct(structure(
        "Guid",
        ["A", "B", "C", "D"]
            .iter()
            .map(|n| Field::new(*n, FieldKind::Int))
            .collect(),
    ));
    registry.register_struct(structure(
        "Transform",
        vec![
            Field::new("Rotation", FieldKind::structure("Quat")),
            Field::new("Translation", FieldKind::structure("Vector")),
            Field::new("Scale3D", FieldKind::structure("Vector")),
        ],
    ));
    registry.register_struct(structure(
        "RichCurveKey",
        vec![
            Field::new("InterpMode", FieldKind::enumeration("ERichCurveInterpMode")),
            Field::new("Time", FieldKind::Float),
            Field::new("Value", FieldKind::Float),
            Field::new("ArriveTangent", FieldKind::Float),
            Field::new("LeaveTangent", FieldKind::Float),
        ],
    ));
    registry.register_struct(structure(
        "RichCurve",
        vec![Field::new("Keys", FieldKind::array_of(FieldKind::structure("RichCurveKey")))],
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_structs_registered() {
        let mut registry = ClassRegistry::new();
        register_core_structs(&mut registry);

        assert!(registry.find_struct("LinearColor").is_some());
        assert_eq!(registry.fields("Vector").len(), 3);
        assert_eq!(
            registry.field("Color", "A").map(|f| &f.kind),
            Some(&FieldKind::Int)
        );
        // Structs are not instantiable classes
        assert!(!registry.contains("Vector"));
    }
}
