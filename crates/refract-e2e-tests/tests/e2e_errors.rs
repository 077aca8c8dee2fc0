mod common;

use common::{entry, run_all, struct_ty};
use refract_backend_core::GenerateError;
use refract_discovery::{plan_set, DiscoveryError};
use refract_model::{
    Expr, FieldDefinition, FunctionDefinition, FunctionKey, Intrinsic, ParameterDefinition,
    ProgramModel, ResourceField, ResourceKind, ScalarKind, Semantic, ShaderFunction, ShaderModel,
    ShaderModelBuilder, ShaderSetSource, ShaderStage, ShaderType, Stmt, StructureDefinition,
    VectorSize,
};
use refract_transpile::TranspileError;

fn helper(name: &str, calls: &[&str]) -> FunctionDefinition {
    let body = calls
        .iter()
        .map(|callee| {
            Stmt::Expression(Expr::call(
                ShaderType::FLOAT,
                FunctionKey::new("S", *callee),
                vec![],
            ))
        })
        .chain([Stmt::Return(Some(Expr::float(0.0)))])
        .collect();
    FunctionDefinition {
        function: ShaderFunction::helper(
            FunctionKey::new("S", name),
            vec![],
            ShaderType::FLOAT,
        ),
        body,
    }
}

fn passthrough_vs() -> FunctionDefinition {
    entry(
        FunctionKey::new("S", "VS"),
        vec![ParameterDefinition::new("v", struct_ty("VIn"))],
        struct_ty("VOut"),
        ShaderStage::Vertex,
        vec![
            Stmt::Local {
                name: "o".into(),
                ty: struct_ty("VOut"),
                init: None,
            },
            Stmt::Return(Some(Expr::var(struct_ty("VOut"), "o"))),
        ],
    )
}

fn interface_structs(position_out: bool) -> (StructureDefinition, StructureDefinition) {
    let out_semantic = if position_out {
        Semantic::SystemPosition
    } else {
        Semantic::Color
    };
    (
        StructureDefinition::new(
            "VIn",
            vec![FieldDefinition::with_semantic(
                "Position",
                ShaderType::vec4(),
                Semantic::Position,
            )],
        ),
        StructureDefinition::new(
            "VOut",
            vec![FieldDefinition::with_semantic(
                "ClipPos",
                ShaderType::vec4(),
                out_semantic,
            )],
        ),
    )
}

fn graphics_set(fs_body: Vec<Stmt>, resources: Vec<ResourceField>) -> ShaderModel {
    let (vin, vout) = interface_structs(true);
    let fs = entry(
        FunctionKey::new("S", "FS"),
        vec![],
        ShaderType::vec4(),
        ShaderStage::Fragment,
        fs_body,
    );
    ShaderModelBuilder::new()
        .structure(vin)
        .structure(vout)
        .function(passthrough_vs())
        .function(fs)
        .resources("S", resources)
        .shader_set(ShaderSetSource::graphics(
            "S",
            FunctionKey::new("S", "VS"),
            FunctionKey::new("S", "FS"),
        ))
        .build()
}

#[test]
fn cyclic_call_graph_is_fatal() {
    let cs = entry(
        FunctionKey::new("S", "CS"),
        vec![],
        ShaderType::Void,
        ShaderStage::Compute,
        vec![Stmt::Expression(Expr::call(
            ShaderType::FLOAT,
            FunctionKey::new("S", "A"),
            vec![],
        ))],
    );
    let model = ShaderModelBuilder::new()
        .function(cs)
        .function(helper("A", &["B"]))
        .function(helper("B", &["A"]))
        .shader_set(ShaderSetSource::compute("S", FunctionKey::new("S", "CS")))
        .build();

    let err = plan_set(&model, &model.shader_sets()[0].clone()).unwrap_err();
    match err {
        DiscoveryError::CyclicCallGraph { cycle } => {
            assert_eq!(cycle, "S.A -> S.B -> S.A");
        }
        other => panic!("expected call cycle, got {other}"),
    }
}

#[test]
fn cyclic_structure_graph_is_fatal() {
    let node = StructureDefinition::new(
        "Node",
        vec![FieldDefinition::new("Next", struct_ty("Link"))],
    );
    let link = StructureDefinition::new(
        "Link",
        vec![FieldDefinition::new("Back", struct_ty("Node"))],
    );
    let cs = entry(
        FunctionKey::new("S", "CS"),
        vec![],
        ShaderType::Void,
        ShaderStage::Compute,
        vec![Stmt::Local {
            name: "n".into(),
            ty: struct_ty("Node"),
            init: None,
        }],
    );
    let model = ShaderModelBuilder::new()
        .structure(node)
        .structure(link)
        .function(cs)
        .shader_set(ShaderSetSource::compute("S", FunctionKey::new("S", "CS")))
        .build();

    let err = plan_set(&model, &model.shader_sets()[0].clone()).unwrap_err();
    match err {
        DiscoveryError::CyclicStructureGraph { cycle } => {
            assert_eq!(cycle, "Node -> Link -> Node");
        }
        other => panic!("expected structure cycle, got {other}"),
    }
}

#[test]
fn missing_position_semantic_fails_the_whole_set() {
    let (vin, vout) = interface_structs(false);
    let fs = entry(
        FunctionKey::new("S", "FS"),
        vec![],
        ShaderType::vec4(),
        ShaderStage::Fragment,
        vec![Stmt::Return(Some(Expr::construct(
            ShaderType::vec4(),
            vec![
                Expr::float(1.0),
                Expr::float(0.0),
                Expr::float(0.0),
                Expr::float(1.0),
            ],
        )))],
    );
    let model = ShaderModelBuilder::new()
        .structure(vin)
        .structure(vout)
        .function(passthrough_vs())
        .function(fs)
        .shader_set(ShaderSetSource::graphics(
            "S",
            FunctionKey::new("S", "VS"),
            FunctionKey::new("S", "FS"),
        ))
        .build();

    let report = run_all(&model);
    assert!(report.outputs.is_empty());
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.set, "S");
    assert!(failure.backend.is_none());
    assert!(matches!(
        failure.error,
        TranspileError::Discovery(DiscoveryError::MissingPositionSemantic { .. })
    ));
}

#[test]
fn mixed_regular_and_shadow_sampling_conflicts() {
    let uv = || Expr::construct(ShaderType::vec2(), vec![Expr::float(0.5), Expr::float(0.5)]);
    let body = vec![
        Stmt::Local {
            name: "lit".into(),
            ty: ShaderType::FLOAT,
            init: Some(Expr::intrinsic(
                ShaderType::FLOAT,
                Intrinsic::SampleCmpLevelZero,
                vec![
                    Expr::resource(ShaderType::Resource(ResourceKind::Texture2D), "Depth"),
                    Expr::resource(ShaderType::Resource(ResourceKind::Sampler), "Smp"),
                    uv(),
                    Expr::float(0.5),
                ],
            )),
        },
        Stmt::Return(Some(Expr::intrinsic(
            ShaderType::vec4(),
            Intrinsic::Sample,
            vec![
                Expr::resource(ShaderType::Resource(ResourceKind::Texture2D), "Depth"),
                Expr::resource(ShaderType::Resource(ResourceKind::Sampler), "Smp"),
                uv(),
            ],
        ))),
    ];
    let model = graphics_set(
        body,
        vec![
            ResourceField::new("Depth", ResourceKind::Texture2D, ShaderType::Void),
            ResourceField::new("Smp", ResourceKind::Sampler, ShaderType::Void),
        ],
    );

    let report = run_all(&model);
    assert!(report.outputs.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].backend.is_none());
    assert!(matches!(
        report.failures[0].error,
        TranspileError::Discovery(DiscoveryError::ShadowUsageConflict { .. })
    ));
}

#[test]
fn es300_rejects_multisample_loads_while_others_succeed() {
    let body = vec![Stmt::Return(Some(Expr::intrinsic(
        ShaderType::vec4(),
        Intrinsic::Load,
        vec![
            Expr::resource(ShaderType::Resource(ResourceKind::Texture2DMS), "MsTex"),
            Expr::construct(
                ShaderType::Vector {
                    scalar: ScalarKind::Int,
                    size: VectorSize::Two,
                },
                vec![Expr::int(0), Expr::int(0)],
            ),
            Expr::int(0),
        ],
    )))];
    let model = graphics_set(
        body,
        vec![ResourceField::new(
            "MsTex",
            ResourceKind::Texture2DMS,
            ShaderType::Void,
        )],
    );

    let report = run_all(&model);
    let backends: Vec<&str> = report.outputs.iter().map(|o| o.backend.as_str()).collect();
    assert_eq!(backends, ["hlsl", "glsl330", "glsl450", "metal"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].backend.as_deref(), Some("glsles300"));
    assert!(matches!(
        report.failures[0].error,
        TranspileError::Generate(GenerateError::UnsupportedFeature { .. })
    ));

    // The Vulkan flavor needs an extension for samplerless fetches, but
    // only in the unit that loads.
    let set = report.outputs.iter().find(|o| o.backend == "glsl450").unwrap();
    let extension = "#extension GL_EXT_samplerless_texture_functions : enable";
    assert!(set.fragment.as_ref().unwrap().source.contains(extension));
    assert!(!set.vertex.as_ref().unwrap().source.contains(extension));
    assert!(set
        .fragment
        .as_ref()
        .unwrap()
        .source
        .contains("texelFetch(MsTex, ivec2(0, 0), 0)"));
}

#[test]
fn thread_id_outside_compute_is_rejected() {
    let (vin, vout) = interface_structs(true);
    let vs = entry(
        FunctionKey::new("S", "VS"),
        vec![ParameterDefinition::new("v", struct_ty("VIn"))],
        struct_ty("VOut"),
        ShaderStage::Vertex,
        vec![
            Stmt::Expression(Expr::intrinsic(
                ShaderType::Vector {
                    scalar: ScalarKind::UInt,
                    size: VectorSize::Three,
                },
                Intrinsic::DispatchThreadId,
                vec![],
            )),
            Stmt::Return(Some(Expr::var(struct_ty("VOut"), "o"))),
        ],
    );
    let fs = entry(
        FunctionKey::new("S", "FS"),
        vec![],
        ShaderType::vec4(),
        ShaderStage::Fragment,
        vec![Stmt::Return(Some(Expr::construct(
            ShaderType::vec4(),
            vec![
                Expr::float(0.0),
                Expr::float(0.0),
                Expr::float(0.0),
                Expr::float(1.0),
            ],
        )))],
    );
    let model = ShaderModelBuilder::new()
        .structure(vin)
        .structure(vout)
        .function(vs)
        .function(fs)
        .shader_set(ShaderSetSource::graphics(
            "S",
            FunctionKey::new("S", "VS"),
            FunctionKey::new("S", "FS"),
        ))
        .build();

    let report = run_all(&model);
    assert!(report.outputs.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].backend.is_none());
    assert!(matches!(
        report.failures[0].error,
        TranspileError::Discovery(DiscoveryError::ThreadIdOutsideCompute { .. })
    ));
}
