// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation graph class library.
//!
//! Pose links between animation nodes are modelled as expression inputs, so
//! the same graph container and edge view serve materials and animation
//! blueprints.

use crate::node::{ClassDescriptor, ClassRegistry, NodeCategory};
use crate::port::{Field, FieldKind};
use crate::value::Value;

/// Base class of every animation graph node
pub const ANIM_GRAPH_NODE: &str = "AnimGraphNode_Base";

fn anim_node(name: &str, description: &str, fields: Vec<Field>) -> ClassDescriptor {
    ClassDescriptor::new(name, NodeCategory::Animation)
        .with_parent(ANIM_GRAPH_NODE)
        .with_description(description)
        .with_fields(fields)
}

fn pose_array(name: &str) -> Field {
    Field::new(name, FieldKind::array_of(FieldKind::Input(Default::default())))
}

/// Create a registry holding only the animation classes
pub fn create_animation_registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    crate::structs::register_core_structs(&mut registry);
    register_animation_classes(&mut registry);
    registry
}

/// Register animation assets and anim graph node classes
pub fn register_animation_classes(registry: &mut ClassRegistry) {
    register_assets(registry);

    registry.register(
        ClassDescriptor::new(ANIM_GRAPH_NODE, NodeCategory::Animation).with_fields(vec![
            Field::new("NodePosX", FieldKind::Int),
            Field::new("NodePosY", FieldKind::Int),
            Field::new("NodeComment", FieldKind::String),
            Field::new("bCommentBubbleVisible", FieldKind::Bool),
            Field::new("NodeGuid", FieldKind::structure("Guid")),
        ]),
    );

    registry.register(anim_node(
        "AnimGraphNode_Root",
        "Final pose of the graph",
        vec![Field::input("Result"), Field::new("Name", FieldKind::Name)],
    ));

    registry.register(anim_node(
        "AnimGraphNode_StateResult",
        "Final pose of a state",
        vec![Field::input("Result")],
    ));

    registry.register(anim_node(
        "AnimGraphNode_SequencePlayer",
        "Plays an animation sequence",
        vec![
            Field::new("Sequence", FieldKind::object("AnimSequenceBase")),
            Field::new("PlayRate", FieldKind::Float).with_default(Value::Float(1.0)),
            Field::new("StartPosition", FieldKind::Float),
            Field::new("bLoopAnimation", FieldKind::Bool).with_default(Value::Bool(true)),
        ],
    ));

    registry.register(anim_node(
        "AnimGraphNode_TwoWayBlend",
        "Blends two poses by alpha",
        vec![
            Field::input("A"),
            Field::input("B"),
            Field::new("Alpha", FieldKind::Float),
        ],
    ));

    registry.register(anim_node(
        "AnimGraphNode_BlendListByBool",
        "Selects a pose by a bool",
        vec![
            pose_array("BlendPose"),
            Field::new("BlendTime", FieldKind::array_of(FieldKind::Float)),
            Field::new("bActiveValue", FieldKind::Bool),
        ],
    ));

    registry.register(anim_node(
        "AnimGraphNode_LayeredBoneBlend",
        "Blends poses per bone branch",
        vec![
            Field::input("BasePose"),
            pose_array("BlendPoses"),
            Field::new("BlendWeights", FieldKind::array_of(FieldKind::Float)),
        ],
    ));

    registry.register(anim_node(
        "AnimGraphNode_Slot",
        "Montage slot",
        vec![Field::input("Source"), Field::new("SlotName", FieldKind::Name)],
    ));

    registry.register(anim_node(
        "AnimGraphNode_SaveCachedPose",
        "Caches a pose under a name",
        vec![
            Field::input("Pose"),
            // Taken from CachePoseName by the anim blueprint importer
            Field::new("CacheName", FieldKind::String).read_only(),
        ],
    ));

    registry.register(anim_node(
        "AnimGraphNode_UseCachedPose",
        "Reads a cached pose",
        vec![Field::new("SaveCachedPoseNode", FieldKind::object("AnimGraphNode_SaveCachedPose")).read_only()],
    ));

    registry.register(anim_node(
        "AnimGraphNode_StateMachine",
        "State machine; its states are sub-graphs",
        vec![Field::new("StateMachineIndexInClass", FieldKind::Int)],
    ));

    registry.register(anim_node(
        "AnimGraphNode_LinkedInputPose",
        "Input pose of a linked anim graph",
        vec![Field::new("Name", FieldKind::Name)],
    ));
}

fn register_assets(registry: &mut ClassRegistry) {
    let structure = |name: &str, fields: Vec<Field>| {
        ClassDescriptor::new(name, NodeCategory::Struct).with_fields(fields)
    };

    registry.register_struct(structure(
        "BlendSample",
        vec![
            Field::new("Animation", FieldKind::object("AnimSequence")),
            Field::new("SampleValue", FieldKind::structure("Vector")),
            Field::new("RateScale", FieldKind::Float).with_default(Value::Float(1.0)),
        ],
    ));
    registry.register_struct(structure(
        "BlendParameter",
        vec![
            Field::new("DisplayName", FieldKind::String),
            Field::new("Min", FieldKind::Float),
            Field::new("Max", FieldKind::Float),
            Field::new("GridNum", FieldKind::Int),
        ],
    ));

    registry.register(
        ClassDescriptor::new("AnimationAsset", NodeCategory::Asset)
            .with_fields(vec![Field::new("Skeleton", FieldKind::object("Skeleton"))]),
    );
    registry.register(
        ClassDescriptor::new("AnimSequenceBase", NodeCategory::Asset)
            .with_parent("AnimationAsset")
            .with_fields(vec![
                Field::new("SequenceLength", FieldKind::Float),
                Field::new("RateScale", FieldKind::Float).with_default(Value::Float(1.0)),
            ]),
    );
    registry.register(ClassDescriptor::new("AnimSequence", NodeCategory::Asset).with_parent("AnimSequenceBase"));
    registry.register(ClassDescriptor::new("AnimMontage", NodeCategory::Asset).with_parent("AnimSequenceBase"));

    registry.register(
        ClassDescriptor::new("BlendSpace", NodeCategory::Asset)
            .with_parent("AnimationAsset")
            .with_fields(vec![
                Field::new("SampleData", FieldKind::array_of(FieldKind::structure("BlendSample"))),
                Field::new(
                    "BlendParameters",
                    FieldKind::array_of(FieldKind::structure("BlendParameter")),
                ),
                Field::new("AxisToScaleAnimation", FieldKind::enumeration("EBlendSpaceAxis")),
            ]),
    );
    for name in ["BlendSpace1D", "AimOffsetBlendSpace", "AimOffsetBlendSpace1D"] {
        registry.register(ClassDescriptor::new(name, NodeCategory::Asset).with_parent("BlendSpace"));
    }

    registry.register(
        ClassDescriptor::new("AnimBlueprint", NodeCategory::Asset)
            .with_description("Animation blueprint; owns the anim graph")
            .with_fields(vec![Field::new("TargetSkeleton", FieldKind::object("Skeleton"))]),
    );
    registry.register(
        ClassDescriptor::new("AnimBlueprintGeneratedClass", NodeCategory::Asset)
            .with_description("Compiled anim blueprint class; carries the baked node data")
            .with_fields(vec![Field::new("TargetSkeleton", FieldKind::object("Skeleton"))]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::InputKind;

    #[test]
    fn test_pose_links_are_inputs() {
        let registry = create_animation_registry();
        assert_eq!(
            registry.field("AnimGraphNode_TwoWayBlend", "A").map(|f| &f.kind),
            Some(&FieldKind::Input(InputKind::Default))
        );
        assert!(registry
            .field("AnimGraphNode_BlendListByBool", "BlendPose")
            .unwrap()
            .kind
            .is_reference());
    }

    #[test]
    fn test_blend_space_family() {
        let registry = create_animation_registry();
        assert!(registry.is_child_of("AimOffsetBlendSpace1D", "BlendSpace"));
        assert!(registry.field("BlendSpace1D", "Skeleton").is_some());
    }
}
