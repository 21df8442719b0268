// SPDX-License-Identifier: MIT OR Apache-2.0
//! Engine class library of the in-memory host.
//!
//! Declares the importable asset classes (physics, skeleton, tables, curves,
//! sound, foliage, user-defined types) and their sub-object classes, and
//! merges in the material and animation libraries.

use jsonport_graph::graphs::{animation, material};
use jsonport_graph::structs::register_core_structs;
use jsonport_graph::{ClassDescriptor, ClassRegistry, Field, FieldKind, NodeCategory, Value};

/// Base class of data assets; unregistered subclasses import through it
pub const DATA_ASSET: &str = "DataAsset";

fn asset(name: &str, fields: Vec<Field>) -> ClassDescriptor {
    ClassDescriptor::new(name, NodeCategory::Asset).with_fields(fields)
}

fn subobject(name: &str, fields: Vec<Field>) -> ClassDescriptor {
    ClassDescriptor::new(name, NodeCategory::Subobject).with_fields(fields)
}

fn structure(name: &str, fields: Vec<Field>) -> ClassDescriptor {
    ClassDescriptor::new(name, NodeCategory::Struct).with_fields(fields)
}

fn float(name: &str) -> Field {
    Field::new(name, FieldKind::Float)
}

fn vector(name: &str) -> Field {
    Field::new(name, FieldKind::structure("Vector"))
}

/// Create the full host class registry
pub fn create_host_registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    register_core_structs(&mut registry);
    material::register_material_classes(&mut registry);
    animation::register_animation_classes(&mut registry);
    register_engine_classes(&mut registry);
    registry
}

/// Register the non-graph engine classes
pub fn register_engine_classes(registry: &mut ClassRegistry) {
    register_data_assets(registry);
    register_physics(registry);
    register_skeleton(registry);
    register_tables(registry);
    register_curves(registry);
    register_user_defined(registry);
    register_sound(registry);
    register_landscape(registry);
}

fn register_data_assets(registry: &mut ClassRegistry) {
    registry.register(asset(DATA_ASSET, vec![]));
    registry.register(asset("PrimaryDataAsset", vec![]).with_parent(DATA_ASSET));

    registry.register_struct(structure(
        "SlateBrush",
        vec![
            Field::new("ImageSize", FieldKind::structure("Vector2D")),
            Field::new("DrawAs", FieldKind::enumeration("ESlateBrushDrawType")),
            Field::new("ResourceObject", FieldKind::object("Object")),
        ],
    ));
    registry.register(asset(
        "SlateBrushAsset",
        vec![Field::new("Brush", FieldKind::structure("SlateBrush"))],
    ));
    registry.register(asset("SlateWidgetStyleAsset", vec![]));

    registry.register(asset(
        "AnimBoneCompressionSettings",
        vec![
            Field::new("Codecs", FieldKind::array_of(FieldKind::object("AnimBoneCompressionCodec"))),
            Field::new("bForceBelowThreshold", FieldKind::Bool),
            float("ErrorThreshold"),
        ],
    ));
    registry.register(asset(
        "AnimCurveCompressionSettings",
        vec![Field::new("Codec", FieldKind::object("AnimCurveCompressionCodec"))],
    ));
    registry.register(subobject("AnimBoneCompressionCodec", vec![Field::new("Description", FieldKind::String)]));
    registry.register(subobject("AnimCurveCompressionCodec", vec![]));

    registry.register(asset(
        "SkeletalMeshLODSettings",
        vec![Field::new("MinLod", FieldKind::Int)],
    ));
    registry.register(asset(
        "NiagaraParameterCollection",
        vec![Field::new("Namespace", FieldKind::Name)],
    ));
    registry.register(asset("StaticMesh", vec![]));

    // Editor bookkeeping objects exported next to most assets
    registry.register(subobject("ThumbnailInfo", vec![]));
    registry.register(subobject("SceneThumbnailInfo", vec![]).with_parent("ThumbnailInfo"));
    registry.register(
        subobject("SceneThumbnailInfoWithPrimitive", vec![]).with_parent("SceneThumbnailInfo"),
    );
    registry.register(subobject("AssetImportData", vec![]));
}

fn register_physics(registry: &mut ClassRegistry) {
    registry.register(asset(
        "PhysicalMaterial",
        vec![
            float("Friction").with_default(Value::Float(0.7)),
            float("Restitution").with_default(Value::Float(0.3)),
            float("Density").with_default(Value::Float(1.0)),
            Field::new("SurfaceType", FieldKind::enumeration("EPhysicalSurface")),
        ],
    ));

    registry.register_struct(structure(
        "RigidBodyIndexPair",
        vec![Field::new("Indices", FieldKind::array_of(FieldKind::Int))],
    ));
    registry.register_struct(structure(
        "KSphereElem",
        vec![Field::new("Name", FieldKind::Name), vector("Center"), float("Radius")],
    ));
    registry.register_struct(structure(
        "KBoxElem",
        vec![
            Field::new("Name", FieldKind::Name),
            vector("Center"),
            Field::new("Rotation", FieldKind::structure("Rotator")),
            float("X"),
            float("Y"),
            float("Z"),
        ],
    ));
    registry.register_struct(structure(
        "KSphylElem",
        vec![
            Field::new("Name", FieldKind::Name),
            vector("Center"),
            Field::new("Rotation", FieldKind::structure("Rotator")),
            float("Radius"),
            float("Length"),
        ],
    ));
    registry.register_struct(structure(
        "KAggregateGeom",
        vec![
            Field::new("SphereElems", FieldKind::array_of(FieldKind::structure("KSphereElem"))),
            Field::new("BoxElems", FieldKind::array_of(FieldKind::structure("KBoxElem"))),
            Field::new("SphylElems", FieldKind::array_of(FieldKind::structure("KSphylElem"))),
        ],
    ));
    registry.register_struct(structure(
        "BodyInstance",
        vec![
            Field::new("bSimulatePhysics", FieldKind::Bool),
            float("MassScale").with_default(Value::Float(1.0)),
            float("LinearDamping"),
            float("AngularDamping"),
            Field::new("CollisionProfileName", FieldKind::Name),
        ],
    ));
    registry.register_struct(structure(
        "ConstraintProfileProperties",
        vec![
            Field::new("bDisableCollision", FieldKind::Bool),
            Field::new("bEnableProjection", FieldKind::Bool),
            float("ProjectionLinearTolerance"),
        ],
    ));
    registry.register_struct(structure(
        "ConstraintInstance",
        vec![
            Field::new("JointName", FieldKind::Name),
            Field::new("ConstraintBone1", FieldKind::Name),
            Field::new("ConstraintBone2", FieldKind::Name),
            vector("Pos1"),
            vector("Pos2"),
            Field::new("ProfileInstance", FieldKind::structure("ConstraintProfileProperties")),
        ],
    ));

    registry.register(subobject(
        "SkeletalBodySetup",
        vec![
            Field::new("BoneName", FieldKind::Name),
            Field::new("PhysicsType", FieldKind::enumeration("EPhysicsType")),
            Field::new("AggGeom", FieldKind::structure("KAggregateGeom")),
            Field::new("DefaultInstance", FieldKind::structure("BodyInstance")),
            Field::new("PhysMaterial", FieldKind::object("PhysicalMaterial")),
        ],
    ));
    registry.register(subobject(
        "PhysicsConstraintTemplate",
        vec![Field::new("DefaultInstance", FieldKind::structure("ConstraintInstance"))],
    ));

    registry.register(asset(
        "PhysicsAsset",
        vec![
            // Filled by the physics asset importer from sub-object exports
            Field::new("SkeletalBodySetups", FieldKind::array_of(FieldKind::object("SkeletalBodySetup"))).read_only(),
            Field::new("ConstraintSetup", FieldKind::array_of(FieldKind::object("PhysicsConstraintTemplate"))).read_only(),
            Field::new(
                "CollisionDisableTable",
                FieldKind::map_of(FieldKind::structure("RigidBodyIndexPair"), FieldKind::Bool),
            )
            .read_only(),
            Field::new("PreviewSkeletalMesh", FieldKind::object("SkeletalMesh")).read_only(),
            Field::new("PhysicalAnimationProfiles", FieldKind::array_of(FieldKind::Name)),
            Field::new("ConstraintProfiles", FieldKind::array_of(FieldKind::Name)),
            Field::new("bNotForDedicatedServer", FieldKind::Bool),
        ],
    ));

    registry.register(asset(
        "SkeletalMesh",
        vec![
            Field::new("Skeleton", FieldKind::object("Skeleton")),
            Field::new("PhysicsAsset", FieldKind::object("PhysicsAsset")),
        ],
    ));
}

fn register_skeleton(registry: &mut ClassRegistry) {
    registry.register_struct(structure(
        "BoneNode",
        vec![
            Field::new("Name", FieldKind::Name),
            Field::new(
                "TranslationRetargetingMode",
                FieldKind::enumeration("EBoneTranslationRetargetingMode"),
            ),
        ],
    ));
    registry.register_struct(structure(
        "VirtualBone",
        vec![
            Field::new("SourceBoneName", FieldKind::Name),
            Field::new("TargetBoneName", FieldKind::Name),
            Field::new("VirtualBoneName", FieldKind::Name),
        ],
    ));
    registry.register_struct(structure(
        "AnimSlotGroup",
        vec![
            Field::new("GroupName", FieldKind::Name),
            Field::new("SlotNames", FieldKind::array_of(FieldKind::Name)),
        ],
    ));

    registry.register(subobject(
        "SkeletalMeshSocket",
        vec![
            Field::new("SocketName", FieldKind::Name),
            Field::new("BoneName", FieldKind::Name),
            vector("RelativeLocation"),
            Field::new("RelativeRotation", FieldKind::structure("Rotator")),
            vector("RelativeScale"),
            Field::new("bForceAlwaysAnimated", FieldKind::Bool),
        ],
    ));

    registry.register(asset(
        "Skeleton",
        vec![
            Field::new("Sockets", FieldKind::array_of(FieldKind::object("SkeletalMeshSocket"))),
            Field::new("BoneTree", FieldKind::array_of(FieldKind::structure("BoneNode"))),
            Field::new("VirtualBones", FieldKind::array_of(FieldKind::structure("VirtualBone"))),
            Field::new("SlotGroups", FieldKind::array_of(FieldKind::structure("AnimSlotGroup"))),
        ],
    ));
}

fn register_tables(registry: &mut ClassRegistry) {
    registry.register(asset(
        "StringTable",
        vec![
            Field::new("TableNamespace", FieldKind::String),
            Field::new("Entries", FieldKind::map_of(FieldKind::String, FieldKind::String)),
            Field::new(
                "MetaData",
                FieldKind::map_of(
                    FieldKind::String,
                    FieldKind::map_of(FieldKind::Name, FieldKind::String),
                ),
            ),
        ],
    ));

    registry.register(asset(
        "CurveTable",
        vec![Field::new(
            "RowMap",
            FieldKind::map_of(FieldKind::Name, FieldKind::structure("RichCurve")),
        )],
    ));

    // TODO: declare `Rows` once row structs are resolved from `RowStruct`
    registry.register(asset(
        "DataTable",
        vec![
            Field::new("RowStruct", FieldKind::object("ScriptStruct")),
            Field::new("bStripFromClientBuilds", FieldKind::Bool),
        ],
    ));
}

fn register_curves(registry: &mut ClassRegistry) {
    registry.register(asset("CurveBase", vec![]));
    registry.register(
        asset(
            "CurveFloat",
            vec![
                Field::new("FloatCurve", FieldKind::structure("RichCurve")),
                Field::new("bIsEventCurve", FieldKind::Bool),
            ],
        )
        .with_parent("CurveBase"),
    );
    registry.register(
        asset(
            "CurveVector",
            vec![Field::new("FloatCurves", FieldKind::array_of(FieldKind::structure("RichCurve")))],
        )
        .with_parent("CurveBase"),
    );
    registry.register(
        asset(
            "CurveLinearColor",
            vec![
                Field::new("FloatCurves", FieldKind::array_of(FieldKind::structure("RichCurve"))),
                float("AdjustHue"),
                float("AdjustSaturation").with_default(Value::Float(1.0)),
                float("AdjustBrightness").with_default(Value::Float(1.0)),
            ],
        )
        .with_parent("CurveBase"),
    );
    registry.register(
        asset(
            "CurveLinearColorAtlas",
            vec![
                Field::new("TextureSize", FieldKind::Int).with_default(Value::Int(256)),
                Field::new("GradientCurves", FieldKind::array_of(FieldKind::object("CurveLinearColor"))),
                Field::new("bSquareResolution", FieldKind::Bool),
            ],
        )
        .with_parent("Texture2D"),
    );

    registry.register_struct(structure(
        "SubsurfaceProfileStruct",
        vec![
            Field::new("SurfaceAlbedo", FieldKind::structure("LinearColor")),
            Field::new("MeanFreePathColor", FieldKind::structure("LinearColor")),
            float("MeanFreePathDistance"),
            float("WorldUnitScale").with_default(Value::Float(0.1)),
        ],
    ));
    registry.register(asset(
        "SubsurfaceProfile",
        vec![Field::new("Settings", FieldKind::structure("SubsurfaceProfileStruct"))],
    ));
}

fn register_user_defined(registry: &mut ClassRegistry) {
    registry.register_struct(structure(
        "EdGraphTerminalType",
        vec![
            Field::new("TerminalCategory", FieldKind::Name),
            Field::new("TerminalSubCategory", FieldKind::Name),
            Field::new("TerminalSubCategoryObject", FieldKind::object("Object")),
        ],
    ));
    registry.register_struct(structure(
        "StructVariableDescription",
        vec![
            Field::new("VarName", FieldKind::Name),
            Field::new("FriendlyName", FieldKind::String),
            Field::new("VarGuid", FieldKind::structure("Guid")),
            Field::new("Category", FieldKind::Name),
            Field::new("SubCategory", FieldKind::Name),
            Field::new("SubCategoryObject", FieldKind::object("Object")),
            Field::new("ContainerType", FieldKind::enumeration("EPinContainerType")),
            Field::new("PinValueType", FieldKind::structure("EdGraphTerminalType")),
        ],
    ));

    registry.register(asset(
        "UserDefinedStruct",
        vec![
            Field::new("Guid", FieldKind::structure("Guid")),
            Field::new("StructFlags", FieldKind::String),
            Field::new("DefaultProperties", FieldKind::map_of(FieldKind::Name, FieldKind::String)),
            Field::new(
                "Variables",
                FieldKind::array_of(FieldKind::structure("StructVariableDescription")),
            ),
        ],
    ));

    registry.register(asset(
        "UserDefinedEnum",
        vec![
            Field::new("Names", FieldKind::map_of(FieldKind::Name, FieldKind::Int)),
            Field::new("DisplayNameMap", FieldKind::map_of(FieldKind::Name, FieldKind::Text)),
            Field::new("CppForm", FieldKind::enumeration("ECppForm")),
        ],
    ));
}

fn register_sound(registry: &mut ClassRegistry) {
    registry.register_struct(structure(
        "SoundClassProperties",
        vec![
            float("Volume").with_default(Value::Float(1.0)),
            float("Pitch").with_default(Value::Float(1.0)),
            float("LowPassFilterFrequency"),
        ],
    ));
    registry.register(asset(
        "SoundClass",
        vec![
            Field::new("Properties", FieldKind::structure("SoundClassProperties")),
            Field::new("ChildClasses", FieldKind::array_of(FieldKind::object("SoundClass"))),
            Field::new("ParentClass", FieldKind::object("SoundClass")),
        ],
    ));

    registry.register_struct(structure(
        "SoundAttenuationSettings",
        vec![
            Field::new("bAttenuate", FieldKind::Bool),
            Field::new("bSpatialize", FieldKind::Bool),
            float("FalloffDistance"),
            vector("AttenuationShapeExtents"),
        ],
    ));
    registry.register(asset(
        "SoundAttenuation",
        vec![Field::new("Attenuation", FieldKind::structure("SoundAttenuationSettings"))],
    ));

    registry.register_struct(structure(
        "SoundConcurrencySettings",
        vec![
            Field::new("MaxCount", FieldKind::Int).with_default(Value::Int(16)),
            Field::new("ResolutionRule", FieldKind::enumeration("EMaxConcurrentResolutionRule")),
        ],
    ));
    registry.register(asset(
        "SoundConcurrency",
        vec![Field::new("Concurrency", FieldKind::structure("SoundConcurrencySettings"))],
    ));

    registry.register_struct(structure(
        "SoundClassAdjuster",
        vec![
            Field::new("SoundClassObject", FieldKind::object("SoundClass")),
            float("VolumeAdjuster").with_default(Value::Float(1.0)),
            float("PitchAdjuster").with_default(Value::Float(1.0)),
        ],
    ));
    registry.register(asset(
        "SoundMix",
        vec![
            Field::new("SoundClassEffects", FieldKind::array_of(FieldKind::structure("SoundClassAdjuster"))),
            float("FadeInTime"),
            float("FadeOutTime"),
        ],
    ));
    registry.register(asset("SoundModulationPatch", vec![]));

    registry.register(asset(
        "SoundBase",
        vec![
            Field::new("SoundClassObject", FieldKind::object("SoundClass")),
            Field::new("AttenuationSettings", FieldKind::object("SoundAttenuation")),
            Field::new("SoundConcurrencySet", FieldKind::array_of(FieldKind::object("SoundConcurrency"))),
            float("Duration"),
        ],
    ));
    registry.register(
        asset(
            "SoundCue",
            vec![
                Field::new("FirstNode", FieldKind::object("SoundNode")),
                float("VolumeMultiplier").with_default(Value::Float(1.0)),
                float("PitchMultiplier").with_default(Value::Float(1.0)),
            ],
        )
        .with_parent("SoundBase"),
    );
    registry.register(asset("SoundWave", vec![Field::new("bLooping", FieldKind::Bool)]).with_parent("SoundBase"));

    registry.register(subobject(
        "SoundNode",
        vec![Field::new("ChildNodes", FieldKind::array_of(FieldKind::object("SoundNode")))],
    ));
    registry.register(
        subobject(
            "SoundNodeWavePlayer",
            vec![
                Field::new("SoundWaveAssetPtr", FieldKind::object("SoundWave")),
                Field::new("bLooping", FieldKind::Bool),
            ],
        )
        .with_parent("SoundNode"),
    );
    registry.register(
        subobject(
            "SoundNodeRandom",
            vec![
                Field::new("Weights", FieldKind::array_of(FieldKind::Float)),
                Field::new("bRandomizeWithoutReplacement", FieldKind::Bool),
            ],
        )
        .with_parent("SoundNode"),
    );
    registry.register(
        subobject("SoundNodeMixer", vec![Field::new("InputVolume", FieldKind::array_of(FieldKind::Float))])
            .with_parent("SoundNode"),
    );
    registry.register(
        subobject(
            "SoundNodeAttenuation",
            vec![Field::new("AttenuationSettings", FieldKind::object("SoundAttenuation"))],
        )
        .with_parent("SoundNode"),
    );

    registry.register(asset(
        "ReverbEffect",
        vec![
            float("Density").with_default(Value::Float(0.85)),
            float("Diffusion").with_default(Value::Float(0.85)),
            float("Gain").with_default(Value::Float(0.32)),
            float("DecayTime").with_default(Value::Float(1.49)),
        ],
    ));

    registry.register_struct(structure(
        "SubmixEffectDynamicsProcessorSettings",
        vec![
            float("ThresholdDb"),
            float("Ratio"),
            float("AttackTimeMsec"),
            float("ReleaseTimeMsec"),
        ],
    ));
    registry.register(asset(
        "SubmixEffectDynamicsProcessorPreset",
        vec![Field::new("Settings", FieldKind::structure("SubmixEffectDynamicsProcessorSettings"))],
    ));
}

fn register_landscape(registry: &mut ClassRegistry) {
    registry.register_struct(structure("FloatInterval", vec![float("Min"), float("Max")]));
    registry.register(asset(
        "FoliageType",
        vec![
            float("Density").with_default(Value::Float(100.0)),
            float("Radius"),
            Field::new("Scaling", FieldKind::enumeration("EFoliageScaling")),
            Field::new("ScaleX", FieldKind::structure("FloatInterval")),
            Field::new("AlignToNormal", FieldKind::Bool),
        ],
    ));
    registry.register(
        asset(
            "FoliageType_InstancedStaticMesh",
            vec![Field::new("Mesh", FieldKind::object("StaticMesh"))],
        )
        .with_parent("FoliageType"),
    );
    registry.register(
        asset("FoliageType_Actor", vec![Field::new("ActorClass", FieldKind::object("Class"))])
            .with_parent("FoliageType"),
    );

    registry.register_struct(structure(
        "GrassVariety",
        vec![
            Field::new("GrassMesh", FieldKind::object("StaticMesh")),
            float("GrassDensity"),
            Field::new("StartCullDistance", FieldKind::Int),
            Field::new("EndCullDistance", FieldKind::Int),
            Field::new("Scaling", FieldKind::enumeration("EGrassScaling")),
        ],
    ));
    registry.register(asset(
        "LandscapeGrassType",
        vec![Field::new("GrassVarieties", FieldKind::array_of(FieldKind::structure("GrassVariety")))],
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_merges_graph_classes() {
        let registry = create_host_registry();
        assert!(registry.contains("MaterialExpressionAdd"));
        assert!(registry.contains("AnimGraphNode_Root"));
        assert!(registry.contains("PhysicsAsset"));
        assert!(registry.find_struct("Guid").is_some());
    }

    #[test]
    fn test_inherited_sound_fields() {
        let registry = create_host_registry();
        assert!(registry.field("SoundCue", "SoundClassObject").is_some());
        assert!(registry.is_child_of("SoundNodeRandom", "SoundNode"));
        assert!(registry.is_child_of("PrimaryDataAsset", DATA_ASSET));
    }

    #[test]
    fn test_physics_sub_object_lists_are_importer_owned() {
        let registry = create_host_registry();
        assert!(registry.field("PhysicsAsset", "SkeletalBodySetups").unwrap().read_only);
        assert!(!registry.field("PhysicsAsset", "bNotForDedicatedServer").unwrap().read_only);
    }
}
