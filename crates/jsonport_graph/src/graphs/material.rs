// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material expression class library.
//!
//! Declares the material and material function asset classes together with
//! the expression node classes that can appear in their graphs. Only fields
//! that importers assign are declared; everything else in an export's
//! property bag is ignored on assignment.

use crate::node::{ClassDescriptor, ClassRegistry, NodeCategory};
use crate::port::{Field, FieldKind, InputKind};
use crate::value::{StructValue, Value};

/// Base class of every material expression
pub const MATERIAL_EXPRESSION: &str = "MaterialExpression";
/// Comment expression class
pub const COMMENT: &str = "MaterialExpressionComment";
/// Reroute expression class, used as a stand-in for missing classes
pub const REROUTE: &str = "MaterialExpressionReroute";

fn expression(name: &str, category: NodeCategory, description: &str) -> ClassDescriptor {
    ClassDescriptor::new(name, category)
        .with_parent(MATERIAL_EXPRESSION)
        .with_description(description)
}

fn linear_color(r: f64, g: f64, b: f64, a: f64) -> Value {
    Value::Struct(
        StructValue::new("LinearColor")
            .with("R", Value::Float(r))
            .with("G", Value::Float(g))
            .with("B", Value::Float(b))
            .with("A", Value::Float(a)),
    )
}

fn binary(name: &str, category: NodeCategory, description: &str) -> ClassDescriptor {
    expression(name, category, description).with_fields(vec![
        Field::input("A"),
        Field::input("B"),
        Field::new("ConstA", FieldKind::Float).with_default(Value::Float(0.0)),
        Field::new("ConstB", FieldKind::Float).with_default(Value::Float(1.0)),
    ])
}

/// Create a registry holding only the material classes
pub fn create_material_registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    crate::structs::register_core_structs(&mut registry);
    register_material_classes(&mut registry);
    registry
}

/// Register material assets and expression classes
pub fn register_material_classes(registry: &mut ClassRegistry) {
    register_structs(registry);
    register_assets(registry);

    // ========================================================================
    // Base
    // ========================================================================

    registry.register(
        ClassDescriptor::new(MATERIAL_EXPRESSION, NodeCategory::Utility)
            .with_description("Base material expression")
            .with_fields(vec![
                Field::new("MaterialExpressionEditorX", FieldKind::Int),
                Field::new("MaterialExpressionEditorY", FieldKind::Int),
                Field::new("MaterialExpressionGuid", FieldKind::structure("Guid")),
                Field::new("Desc", FieldKind::String),
                Field::new("bCommentBubbleVisible", FieldKind::Bool),
                Field::new("bCollapsed", FieldKind::Bool),
                // Linked by the graph builder, never by generic assignment
                Field::new("Material", FieldKind::object("Material")).read_only(),
                Field::new("Function", FieldKind::object("MaterialFunction")).read_only(),
                Field::new("SubgraphExpression", FieldKind::object(MATERIAL_EXPRESSION)).read_only(),
            ]),
    );

    // ========================================================================
    // Annotation / utility
    // ========================================================================

    registry.register(
        expression(COMMENT, NodeCategory::Annotation, "Comment box").with_fields(vec![
            Field::new("SizeX", FieldKind::Int).with_default(Value::Int(400)),
            Field::new("SizeY", FieldKind::Int).with_default(Value::Int(100)),
            Field::new("Text", FieldKind::String),
            Field::new("CommentColor", FieldKind::structure("LinearColor"))
                .with_default(linear_color(1.0, 1.0, 1.0, 1.0)),
            Field::new("FontSize", FieldKind::Int).with_default(Value::Int(18)),
        ]),
    );

    registry.register(
        expression(REROUTE, NodeCategory::Utility, "Passes its input through")
            .with_fields(vec![Field::input("Input")]),
    );

    registry.register(
        expression("MaterialExpressionComposite", NodeCategory::Utility, "Collapsed sub-graph")
            .with_fields(vec![
                Field::new("SubgraphName", FieldKind::String),
                Field::new("InputExpressions", FieldKind::object("MaterialExpressionPinBase")),
                Field::new("OutputExpressions", FieldKind::object("MaterialExpressionPinBase")),
            ]),
    );

    registry.register(
        expression("MaterialExpressionPinBase", NodeCategory::Utility, "Sub-graph pin collection")
            .with_fields(vec![
                Field::new("PinDirection", FieldKind::enumeration("EEdGraphPinDirection")),
                Field::new(
                    "ReroutePins",
                    FieldKind::array_of(FieldKind::structure("CompositeReroute")),
                ),
            ]),
    );

    registry.register(
        expression("MaterialExpressionCustom", NodeCategory::Utility, "Custom shader code")
            .with_fields(vec![
                Field::new("Code", FieldKind::String),
                Field::new("OutputType", FieldKind::enumeration("ECustomMaterialOutputType")),
                Field::new("Description", FieldKind::String),
                Field::new("Inputs", FieldKind::array_of(FieldKind::structure("CustomInput"))),
            ]),
    );

    // ========================================================================
    // Constants
    // ========================================================================

    registry.register(
        expression("MaterialExpressionConstant", NodeCategory::Input, "Scalar constant")
            .with_fields(vec![Field::new("R", FieldKind::Float).with_default(Value::Float(0.0))]),
    );

    registry.register(
        expression("MaterialExpressionConstant2Vector", NodeCategory::Input, "2D constant")
            .with_fields(vec![
                Field::new("R", FieldKind::Float),
                Field::new("G", FieldKind::Float),
            ]),
    );

    registry.register(
        expression("MaterialExpressionConstant3Vector", NodeCategory::Input, "3D constant")
            .with_fields(vec![Field::new("Constant", FieldKind::structure("LinearColor"))]),
    );

    registry.register(
        expression("MaterialExpressionConstant4Vector", NodeCategory::Input, "4D constant")
            .with_fields(vec![Field::new("Constant", FieldKind::structure("LinearColor"))]),
    );

    registry.register(expression(
        "MaterialExpressionTime",
        NodeCategory::Input,
        "Game time in seconds",
    ));

    registry.register(
        expression("MaterialExpressionTextureCoordinate", NodeCategory::Input, "Mesh UVs")
            .with_fields(vec![
                Field::new("CoordinateIndex", FieldKind::Int),
                Field::new("UTiling", FieldKind::Float).with_default(Value::Float(1.0)),
                Field::new("VTiling", FieldKind::Float).with_default(Value::Float(1.0)),
            ]),
    );

    // ========================================================================
    // Parameters
    // ========================================================================

    registry.register(
        expression("MaterialExpressionParameter", NodeCategory::Parameter, "Named parameter")
            .with_fields(vec![
                Field::new("ParameterName", FieldKind::Name),
                Field::new("Group", FieldKind::Name),
                Field::new("SortPriority", FieldKind::Int).with_default(Value::Int(32)),
                Field::new("ExpressionGUID", FieldKind::structure("Guid")),
            ]),
    );

    registry.register(
        ClassDescriptor::new("MaterialExpressionScalarParameter", NodeCategory::Parameter)
            .with_parent("MaterialExpressionParameter")
            .with_description("Scalar parameter")
            .with_fields(vec![
                Field::new("DefaultValue", FieldKind::Float),
                Field::new("SliderMin", FieldKind::Float),
                Field::new("SliderMax", FieldKind::Float),
            ]),
    );

    registry.register(
        ClassDescriptor::new("MaterialExpressionVectorParameter", NodeCategory::Parameter)
            .with_parent("MaterialExpressionParameter")
            .with_description("Color / vector parameter")
            .with_fields(vec![Field::new("DefaultValue", FieldKind::structure("LinearColor"))]),
    );

    registry.register(
        ClassDescriptor::new("MaterialExpressionStaticSwitchParameter", NodeCategory::Parameter)
            .with_parent("MaterialExpressionParameter")
            .with_description("Compile-time switch parameter")
            .with_fields(vec![
                Field::input("A"),
                Field::input("B"),
                Field::new("DefaultValue", FieldKind::Bool),
            ]),
    );

    // ========================================================================
    // Math
    // ========================================================================

    registry.register(binary("MaterialExpressionAdd", NodeCategory::Math, "A + B"));
    registry.register(binary("MaterialExpressionSubtract", NodeCategory::Math, "A - B"));
    registry.register(binary("MaterialExpressionMultiply", NodeCategory::Math, "A * B"));
    registry.register(binary("MaterialExpressionDivide", NodeCategory::Math, "A / B"));

    registry.register(
        expression("MaterialExpressionLinearInterpolate", NodeCategory::Math, "Lerp(A, B, Alpha)")
            .with_fields(vec![
                Field::input("A"),
                Field::input("B"),
                Field::input("Alpha"),
                Field::new("ConstA", FieldKind::Float).with_default(Value::Float(0.0)),
                Field::new("ConstB", FieldKind::Float).with_default(Value::Float(1.0)),
                Field::new("ConstAlpha", FieldKind::Float).with_default(Value::Float(0.5)),
            ]),
    );

    registry.register(
        expression("MaterialExpressionOneMinus", NodeCategory::Math, "1 - Input")
            .with_fields(vec![Field::input("Input")]),
    );

    registry.register(
        expression("MaterialExpressionPower", NodeCategory::Math, "Base ^ Exponent")
            .with_fields(vec![
                Field::input("Base"),
                Field::input("Exponent"),
                Field::new("ConstExponent", FieldKind::Float).with_default(Value::Float(2.0)),
            ]),
    );

    registry.register(
        expression("MaterialExpressionClamp", NodeCategory::Math, "Clamp(Input, Min, Max)")
            .with_fields(vec![
                Field::input("Input"),
                Field::input("Min"),
                Field::input("Max"),
                Field::new("MinDefault", FieldKind::Float).with_default(Value::Float(0.0)),
                Field::new("MaxDefault", FieldKind::Float).with_default(Value::Float(1.0)),
            ]),
    );

    registry.register(
        expression("MaterialExpressionComponentMask", NodeCategory::Math, "Channel selection")
            .with_fields(vec![
                Field::input("Input"),
                Field::new("R", FieldKind::Bool),
                Field::new("G", FieldKind::Bool),
                Field::new("B", FieldKind::Bool),
                Field::new("A", FieldKind::Bool),
            ]),
    );

    registry.register(
        expression("MaterialExpressionPanner", NodeCategory::Math, "Scrolling UVs")
            .with_fields(vec![
                Field::input("Coordinate"),
                Field::input("Time"),
                Field::new("SpeedX", FieldKind::Float),
                Field::new("SpeedY", FieldKind::Float),
            ]),
    );

    // ========================================================================
    // Textures
    // ========================================================================

    registry.register(
        expression("MaterialExpressionTextureBase", NodeCategory::Texture, "Texture holder")
            .with_fields(vec![
                Field::new("Texture", FieldKind::object("Texture")),
                Field::new("SamplerType", FieldKind::enumeration("EMaterialSamplerType")),
            ]),
    );

    registry.register(
        ClassDescriptor::new("MaterialExpressionTextureSample", NodeCategory::Texture)
            .with_parent("MaterialExpressionTextureBase")
            .with_description("Samples a texture")
            .with_fields(vec![
                Field::input("Coordinates"),
                Field::input("TextureObject"),
                Field::new("ConstCoordinate", FieldKind::Int),
            ]),
    );

    registry.register(
        ClassDescriptor::new("MaterialExpressionTextureSampleParameter", NodeCategory::Parameter)
            .with_parent("MaterialExpressionTextureSample")
            .with_fields(vec![
                Field::new("ParameterName", FieldKind::Name),
                Field::new("Group", FieldKind::Name),
                Field::new("ExpressionGUID", FieldKind::structure("Guid")),
            ]),
    );

    registry.register(
        ClassDescriptor::new("MaterialExpressionTextureSampleParameter2D", NodeCategory::Parameter)
            .with_parent("MaterialExpressionTextureSampleParameter")
            .with_description("Texture parameter"),
    );

    // ========================================================================
    // Switches (positional inputs)
    // ========================================================================

    registry.register(
        expression("MaterialExpressionQualitySwitch", NodeCategory::Logic, "Per quality level")
            .with_fields(vec![Field::input("Default")])
            .with_positional_inputs(4),
    );

    registry.register(
        expression("MaterialExpressionShadingPathSwitch", NodeCategory::Logic, "Per shading path")
            .with_fields(vec![Field::input("Default")])
            .with_positional_inputs(3),
    );

    registry.register(
        expression("MaterialExpressionFeatureLevelSwitch", NodeCategory::Logic, "Per feature level")
            .with_fields(vec![Field::input("Default")])
            .with_positional_inputs(5),
    );

    // ========================================================================
    // Functions
    // ========================================================================

    registry.register(
        expression("MaterialExpressionFunctionInput", NodeCategory::Function, "Function input pin")
            .with_fields(vec![
                Field::input("Preview"),
                Field::new("InputName", FieldKind::Name),
                Field::new("Description", FieldKind::String),
                Field::new("Id", FieldKind::structure("Guid")),
                Field::new("InputType", FieldKind::enumeration("EFunctionInputType")),
                Field::new("SortPriority", FieldKind::Int),
                Field::new("bUsePreviewValueAsDefault", FieldKind::Bool),
            ]),
    );

    registry.register(
        expression("MaterialExpressionFunctionOutput", NodeCategory::Function, "Function output pin")
            .with_fields(vec![
                Field::input("A"),
                Field::new("OutputName", FieldKind::Name),
                Field::new("Description", FieldKind::String),
                Field::new("Id", FieldKind::structure("Guid")),
                Field::new("SortPriority", FieldKind::Int),
            ]),
    );

    registry.register(
        expression("MaterialExpressionMaterialFunctionCall", NodeCategory::Function, "Calls a function")
            .with_fields(vec![
                Field::new("MaterialFunction", FieldKind::object("MaterialFunction")),
                Field::new(
                    "FunctionInputs",
                    FieldKind::array_of(FieldKind::structure("FunctionExpressionInput")),
                ),
            ]),
    );

    // ========================================================================
    // Landscape
    // ========================================================================

    registry.register(
        expression(
            "MaterialExpressionLandscapePhysicalMaterialOutput",
            NodeCategory::Output,
            "Physical material per landscape layer",
        )
        .with_fields(vec![Field::new(
            "Inputs",
            FieldKind::array_of(FieldKind::structure("PhysicalMaterialInput")),
        )]),
    );
}

fn register_structs(registry: &mut ClassRegistry) {
    let structure = |name: &str, fields: Vec<Field>| {
        ClassDescriptor::new(name, NodeCategory::Struct).with_fields(fields)
    };

    registry.register_struct(structure(
        "FunctionExpressionInput",
        vec![
            Field::new("ExpressionInputId", FieldKind::structure("Guid")),
            Field::input("Input"),
        ],
    ));
    registry.register_struct(structure(
        "CustomInput",
        vec![Field::new("InputName", FieldKind::Name), Field::input("Input")],
    ));
    registry.register_struct(structure(
        "PhysicalMaterialInput",
        vec![
            Field::new("PhysicalMaterial", FieldKind::object("PhysicalMaterial")),
            Field::input("Input"),
        ],
    ));
    registry.register_struct(structure(
        "CompositeReroute",
        vec![
            Field::new("Name", FieldKind::Name),
            Field::new("Expression", FieldKind::object(REROUTE)),
        ],
    ));
    registry.register_struct(structure(
        "MaterialParameterInfo",
        vec![
            Field::new("Name", FieldKind::Name),
            Field::new("Association", FieldKind::enumeration("EMaterialParameterAssociation")),
            Field::new("Index", FieldKind::Int),
        ],
    ));
    registry.register_struct(structure(
        "ScalarParameterValue",
        vec![
            Field::new("ParameterInfo", FieldKind::structure("MaterialParameterInfo")),
            Field::new("ParameterValue", FieldKind::Float),
        ],
    ));
    registry.register_struct(structure(
        "VectorParameterValue",
        vec![
            Field::new("ParameterInfo", FieldKind::structure("MaterialParameterInfo")),
            Field::new("ParameterValue", FieldKind::structure("LinearColor")),
        ],
    ));
    registry.register_struct(structure(
        "TextureParameterValue",
        vec![
            Field::new("ParameterInfo", FieldKind::structure("MaterialParameterInfo")),
            Field::new("ParameterValue", FieldKind::object("Texture")),
        ],
    ));
    registry.register_struct(structure(
        "CollectionScalarParameter",
        vec![
            Field::new("ParameterName", FieldKind::Name),
            Field::new("Id", FieldKind::structure("Guid")),
            Field::new("DefaultValue", FieldKind::Float),
        ],
    ));
    registry.register_struct(structure(
        "CollectionVectorParameter",
        vec![
            Field::new("ParameterName", FieldKind::Name),
            Field::new("Id", FieldKind::structure("Guid")),
            Field::new("DefaultValue", FieldKind::structure("LinearColor")),
        ],
    ));
}

fn register_assets(registry: &mut ClassRegistry) {
    registry.register(
        ClassDescriptor::new("MaterialInterface", NodeCategory::Asset)
            .with_description("Anything usable as a material"),
    );

    registry.register(
        ClassDescriptor::new("Material", NodeCategory::Asset)
            .with_parent("MaterialInterface")
            .with_description("Material asset")
            .with_fields(vec![
                Field::material_input("BaseColor", InputKind::Color),
                Field::material_input("EmissiveColor", InputKind::Color),
                Field::material_input("SubsurfaceColor", InputKind::Color),
                Field::material_input("Metallic", InputKind::Scalar),
                Field::material_input("Specular", InputKind::Scalar),
                Field::material_input("Roughness", InputKind::Scalar),
                Field::material_input("Anisotropy", InputKind::Scalar),
                Field::material_input("Opacity", InputKind::Scalar),
                Field::material_input("OpacityMask", InputKind::Scalar),
                Field::material_input("AmbientOcclusion", InputKind::Scalar),
                Field::material_input("Refraction", InputKind::Scalar),
                Field::material_input("PixelDepthOffset", InputKind::Scalar),
                Field::material_input("Normal", InputKind::Vector),
                Field::material_input("Tangent", InputKind::Vector),
                Field::material_input("WorldPositionOffset", InputKind::Vector),
                Field::new("MaterialDomain", FieldKind::enumeration("EMaterialDomain")),
                Field::new("BlendMode", FieldKind::enumeration("EBlendMode")),
                Field::new("ShadingModel", FieldKind::enumeration("EMaterialShadingModel")),
                Field::new("TwoSided", FieldKind::Bool),
                Field::new("OpacityMaskClipValue", FieldKind::Float)
                    .with_default(Value::Float(0.333)),
                Field::new("bUsedWithSkeletalMesh", FieldKind::Bool),
                Field::new("PhysMaterial", FieldKind::object("PhysicalMaterial")),
            ]),
    );

    registry.register(
        ClassDescriptor::new("MaterialFunction", NodeCategory::Asset)
            .with_description("Reusable material graph")
            .with_fields(vec![
                Field::new("Description", FieldKind::String),
                Field::new("UserExposedCaption", FieldKind::String),
                Field::new("bExposeToLibrary", FieldKind::Bool),
                Field::new("LibraryCategoriesText", FieldKind::array_of(FieldKind::Text)),
            ]),
    );

    registry.register(
        ClassDescriptor::new("MaterialInstanceConstant", NodeCategory::Asset)
            .with_parent("MaterialInterface")
            .with_description("Material instance with constant overrides")
            .with_fields(vec![
                Field::new("Parent", FieldKind::object("MaterialInterface")),
                Field::new(
                    "ScalarParameterValues",
                    FieldKind::array_of(FieldKind::structure("ScalarParameterValue")),
                ),
                Field::new(
                    "VectorParameterValues",
                    FieldKind::array_of(FieldKind::structure("VectorParameterValue")),
                ),
                Field::new(
                    "TextureParameterValues",
                    FieldKind::array_of(FieldKind::structure("TextureParameterValue")),
                ),
            ]),
    );

    registry.register(
        ClassDescriptor::new("MaterialParameterCollection", NodeCategory::Asset)
            .with_description("Global material parameters")
            .with_fields(vec![
                Field::new(
                    "ScalarParameters",
                    FieldKind::array_of(FieldKind::structure("CollectionScalarParameter")),
                ),
                Field::new(
                    "VectorParameters",
                    FieldKind::array_of(FieldKind::structure("CollectionVectorParameter")),
                ),
            ]),
    );

    registry.register(ClassDescriptor::new("Texture", NodeCategory::Asset));
    registry.register(ClassDescriptor::new("Texture2D", NodeCategory::Asset).with_parent("Texture"));
    registry.register(
        ClassDescriptor::new("TextureRenderTarget2D", NodeCategory::Asset)
            .with_parent("Texture")
            .with_fields(vec![
                Field::new("SizeX", FieldKind::Int),
                Field::new("SizeY", FieldKind::Int),
                Field::new("ClearColor", FieldKind::structure("LinearColor")),
                Field::new("RenderTargetFormat", FieldKind::enumeration("ETextureRenderTargetFormat")),
            ]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_slot_counts() {
        let registry = create_material_registry();
        assert_eq!(registry.positional_inputs("MaterialExpressionQualitySwitch"), Some(4));
        assert_eq!(registry.positional_inputs("MaterialExpressionShadingPathSwitch"), Some(3));
        assert_eq!(registry.positional_inputs("MaterialExpressionFeatureLevelSwitch"), Some(5));
        assert_eq!(registry.positional_inputs("MaterialExpressionAdd"), None);
    }

    #[test]
    fn test_expression_hierarchy() {
        let registry = create_material_registry();
        assert!(registry.is_child_of("MaterialExpressionTextureSampleParameter2D", "MaterialExpressionTextureBase"));
        assert!(registry.is_child_of("MaterialExpressionScalarParameter", MATERIAL_EXPRESSION));
        assert!(registry.field("MaterialExpressionAdd", "MaterialExpressionEditorX").is_some());
        assert!(registry.field("MaterialExpressionAdd", "SubgraphExpression").unwrap().read_only);
    }

    #[test]
    fn test_material_inputs() {
        let registry = create_material_registry();
        assert_eq!(
            registry.field("Material", "BaseColor").map(|f| &f.kind),
            Some(&FieldKind::Input(InputKind::Color))
        );
        assert_eq!(
            registry.field("Material", "Normal").map(|f| &f.kind),
            Some(&FieldKind::Input(InputKind::Vector))
        );
    }

    #[test]
    fn test_comment_is_annotation() {
        let registry = create_material_registry();
        let comment = registry.create_node(COMMENT, "Note").unwrap();
        assert!(comment.is_comment());
    }
}
