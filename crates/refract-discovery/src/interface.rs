//! Stage input/output interface extraction and validation.

use refract_model::{
    FunctionDefinition, ProgramModel, Semantic, ShaderStage, ShaderType, StructureDefinition,
};

use crate::error::DiscoveryError;

/// What a fragment entry point writes.
#[derive(Clone, Debug, PartialEq)]
pub enum FragmentOutput {
    /// A single `vec4` color.
    Color,
    /// Nothing (depth-only passes).
    None,
    /// One explicitly indexed color output per field, in declared
    /// field order. Every field carries [`Semantic::ColorTarget`].
    Targets(StructureDefinition),
}

/// The validated stage contract of one entry point.
///
/// Backends synthesize the stage `main` wrapper from this; all
/// semantic-presence rules are enforced here, once, before any backend
/// runs.
#[derive(Clone, Debug, PartialEq)]
pub enum StageInterface {
    /// Vertex stage: one input structure in, one output structure out.
    Vertex {
        /// The entry function's input structure.
        input: StructureDefinition,
        /// The returned structure.
        output: StructureDefinition,
        /// Index of the [`Semantic::SystemPosition`] field in `output`.
        position_field: usize,
    },
    /// Fragment stage.
    Fragment {
        /// The entry function's input structure, if it takes one.
        input: Option<StructureDefinition>,
        /// Index of a [`Semantic::SystemPosition`] field in the input,
        /// bound to the target's fragment-coordinate builtin.
        system_position_field: Option<usize>,
        /// What the stage writes.
        output: FragmentOutput,
    },
    /// Compute stage; inputs come from thread-id builtins.
    Compute,
}

impl StageInterface {
    /// Extracts and validates the interface of `entry` for `stage`.
    pub fn build(
        model: &dyn ProgramModel,
        entry: &FunctionDefinition,
        stage: ShaderStage,
    ) -> Result<Self, DiscoveryError> {
        let func = &entry.function;
        if func.stage != stage {
            return Err(DiscoveryError::StageMismatch {
                key: func.key.clone(),
                expected: stage,
                actual: func.stage,
            });
        }

        let signature_err = |reason: &str| DiscoveryError::InvalidEntrySignature {
            key: func.key.clone(),
            reason: reason.to_owned(),
        };

        let lookup = |name: &str| {
            model
                .structure(name)
                .cloned()
                .ok_or_else(|| DiscoveryError::UnresolvedStructure {
                    name: name.to_owned(),
                })
        };

        match stage {
            ShaderStage::Vertex => {
                let [param] = func.parameters.as_slice() else {
                    return Err(signature_err(
                        "a vertex entry point takes exactly one structure parameter",
                    ));
                };
                let input = match param.ty.struct_name() {
                    Some(name) => lookup(name)?,
                    None => {
                        return Err(signature_err(
                            "the vertex input parameter must be a structure",
                        ))
                    }
                };
                let output = match func.return_type.struct_name() {
                    Some(name) => lookup(name)?,
                    None => {
                        return Err(signature_err(
                            "a vertex entry point must return a structure",
                        ))
                    }
                };
                let position_field = output
                    .field_with_semantic(Semantic::SystemPosition)
                    .ok_or(DiscoveryError::MissingPositionSemantic {
                        structure: output.name.clone(),
                    })?;
                Ok(Self::Vertex {
                    input,
                    output,
                    position_field,
                })
            }
            ShaderStage::Fragment => {
                let input = match func.parameters.as_slice() {
                    [] => None,
                    [param] => match param.ty.struct_name() {
                        Some(name) => Some(lookup(name)?),
                        None => {
                            return Err(signature_err(
                                "the fragment input parameter must be a structure",
                            ))
                        }
                    },
                    _ => {
                        return Err(signature_err(
                            "a fragment entry point takes at most one structure parameter",
                        ))
                    }
                };
                let system_position_field = input
                    .as_ref()
                    .and_then(|s| s.field_with_semantic(Semantic::SystemPosition));

                let output = match &func.return_type {
                    ShaderType::Void => FragmentOutput::None,
                    ty if *ty == ShaderType::vec4() => FragmentOutput::Color,
                    ShaderType::Struct(name) => {
                        let structure = lookup(name)?;
                        for field in &structure.fields {
                            if field.semantic != Some(Semantic::ColorTarget) {
                                return Err(DiscoveryError::MissingColorTargetSemantic {
                                    structure: structure.name.clone(),
                                    field: field.name.clone(),
                                });
                            }
                        }
                        FragmentOutput::Targets(structure)
                    }
                    _ => {
                        return Err(signature_err(
                            "a fragment entry point must return vec4, void, or a structure",
                        ))
                    }
                };
                Ok(Self::Fragment {
                    input,
                    system_position_field,
                    output,
                })
            }
            ShaderStage::Compute => {
                if !func.parameters.is_empty() {
                    return Err(signature_err(
                        "a compute entry point takes no parameters; use thread-id builtins",
                    ));
                }
                if func.return_type != ShaderType::Void {
                    return Err(signature_err("a compute entry point returns nothing"));
                }
                Ok(Self::Compute)
            }
            ShaderStage::Normal => Err(signature_err("not an entry-point stage")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_model::{
        FieldDefinition, FunctionKey, ParameterDefinition, ShaderFunction, ShaderModel,
        ShaderModelBuilder,
    };

    fn vertex_entry(input: &str, output: &str) -> FunctionDefinition {
        FunctionDefinition {
            function: ShaderFunction {
                key: FunctionKey::new("S", "VS"),
                parameters: vec![ParameterDefinition::new(
                    "input",
                    ShaderType::Struct(input.into()),
                )],
                return_type: ShaderType::Struct(output.into()),
                stage: ShaderStage::Vertex,
                group_size: [1, 1, 1],
                uses_multisample_load: false,
            },
            body: vec![],
        }
    }

    fn graphics_model(output_fields: Vec<FieldDefinition>) -> ShaderModel {
        ShaderModelBuilder::new()
            .structure(StructureDefinition::new(
                "VIn",
                vec![FieldDefinition::with_semantic(
                    "Position",
                    ShaderType::vec3(),
                    Semantic::Position,
                )],
            ))
            .structure(StructureDefinition::new("VOut", output_fields))
            .build()
    }

    #[test]
    fn vertex_interface_finds_position_field() {
        let model = graphics_model(vec![
            FieldDefinition::with_semantic(
                "TexCoord",
                ShaderType::vec2(),
                Semantic::TextureCoordinate,
            ),
            FieldDefinition::with_semantic(
                "ClipPos",
                ShaderType::vec4(),
                Semantic::SystemPosition,
            ),
        ]);
        let entry = vertex_entry("VIn", "VOut");
        let iface = StageInterface::build(&model, &entry, ShaderStage::Vertex).unwrap();
        match iface {
            StageInterface::Vertex { position_field, .. } => assert_eq!(position_field, 1),
            other => panic!("expected vertex interface, got {other:?}"),
        }
    }

    #[test]
    fn vertex_without_position_semantic_fails() {
        let model = graphics_model(vec![FieldDefinition::with_semantic(
            "Color",
            ShaderType::vec4(),
            Semantic::Color,
        )]);
        let entry = vertex_entry("VIn", "VOut");
        let err = StageInterface::build(&model, &entry, ShaderStage::Vertex).unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::MissingPositionSemantic { .. }
        ));
    }

    #[test]
    fn stage_mismatch_rejected() {
        let model = graphics_model(vec![]);
        let entry = vertex_entry("VIn", "VOut");
        let err = StageInterface::build(&model, &entry, ShaderStage::Fragment).unwrap_err();
        assert!(matches!(err, DiscoveryError::StageMismatch { .. }));
    }

    #[test]
    fn fragment_composite_requires_color_targets() {
        let model = ShaderModelBuilder::new()
            .structure(StructureDefinition::new(
                "FOut",
                vec![
                    FieldDefinition::with_semantic(
                        "Albedo",
                        ShaderType::vec4(),
                        Semantic::ColorTarget,
                    ),
                    FieldDefinition::with_semantic(
                        "Normal",
                        ShaderType::vec4(),
                        Semantic::Normal,
                    ),
                ],
            ))
            .build();
        let entry = FunctionDefinition {
            function: ShaderFunction {
                key: FunctionKey::new("S", "FS"),
                parameters: vec![],
                return_type: ShaderType::Struct("FOut".into()),
                stage: ShaderStage::Fragment,
                group_size: [1, 1, 1],
                uses_multisample_load: false,
            },
            body: vec![],
        };
        let err = StageInterface::build(&model, &entry, ShaderStage::Fragment).unwrap_err();
        match err {
            DiscoveryError::MissingColorTargetSemantic { field, .. } => {
                assert_eq!(field, "Normal");
            }
            other => panic!("expected color-target error, got {other}"),
        }
    }

    #[test]
    fn fragment_vec4_and_void_returns() {
        let model = ShaderModelBuilder::new().build();
        let mut entry = FunctionDefinition {
            function: ShaderFunction {
                key: FunctionKey::new("S", "FS"),
                parameters: vec![],
                return_type: ShaderType::vec4(),
                stage: ShaderStage::Fragment,
                group_size: [1, 1, 1],
                uses_multisample_load: false,
            },
            body: vec![],
        };
        let iface = StageInterface::build(&model, &entry, ShaderStage::Fragment).unwrap();
        assert!(matches!(
            iface,
            StageInterface::Fragment {
                output: FragmentOutput::Color,
                ..
            }
        ));

        entry.function.return_type = ShaderType::Void;
        let iface = StageInterface::build(&model, &entry, ShaderStage::Fragment).unwrap();
        assert!(matches!(
            iface,
            StageInterface::Fragment {
                output: FragmentOutput::None,
                ..
            }
        ));
    }

    #[test]
    fn compute_with_parameters_rejected() {
        let model = ShaderModelBuilder::new().build();
        let entry = FunctionDefinition {
            function: ShaderFunction {
                key: FunctionKey::new("S", "CS"),
                parameters: vec![ParameterDefinition::new("id", ShaderType::UINT)],
                return_type: ShaderType::Void,
                stage: ShaderStage::Compute,
                group_size: [8, 8, 1],
                uses_multisample_load: false,
            },
            body: vec![],
        };
        let err = StageInterface::build(&model, &entry, ShaderStage::Compute).unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::InvalidEntrySignature { .. }
        ));
    }
}
