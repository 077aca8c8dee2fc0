use refract_backend_core::GeneratedShaderSet;
use refract_model::{
    Expr, FieldDefinition, FunctionDefinition, FunctionKey, Intrinsic, ParameterDefinition,
    ResourceField, ResourceKind, ScalarKind, Semantic, ShaderFunction, ShaderModel,
    ShaderModelBuilder, ShaderSetSource, ShaderStage, ShaderType, Stmt, StructureDefinition,
    VectorSize,
};
use refract_transpile::{TranspileReport, Transpiler};

#[allow(dead_code)]
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Runs the model through every built-in backend.
#[allow(dead_code)]
pub fn run_all(model: &ShaderModel) -> TranspileReport {
    init_logs();
    Transpiler::with_default_backends().run(model)
}

/// The output for one backend, by backend name.
#[allow(dead_code)]
pub fn output<'a>(report: &'a TranspileReport, backend: &str) -> &'a GeneratedShaderSet {
    report
        .outputs
        .iter()
        .find(|o| o.backend == backend)
        .unwrap_or_else(|| panic!("no output for backend {backend}"))
}

#[allow(dead_code)]
pub fn struct_ty(name: &str) -> ShaderType {
    ShaderType::Struct(name.to_owned())
}

#[allow(dead_code)]
pub fn uint3() -> ShaderType {
    ShaderType::Vector {
        scalar: ScalarKind::UInt,
        size: VectorSize::Three,
    }
}

#[allow(dead_code)]
pub fn entry(
    key: FunctionKey,
    parameters: Vec<ParameterDefinition>,
    return_type: ShaderType,
    stage: ShaderStage,
    body: Vec<Stmt>,
) -> FunctionDefinition {
    FunctionDefinition {
        function: ShaderFunction {
            key,
            parameters,
            return_type,
            stage,
            group_size: [1, 1, 1],
            uses_multisample_load: false,
        },
        body,
    }
}

/// A textured, lit graphics pipeline: the fragment stage calls a
/// helper that reads a second uniform, so call ordering, set-wide
/// binding assignment, and swizzles are all exercised.
#[allow(dead_code)]
pub fn lit_graphics_model() -> ShaderModel {
    let vin = StructureDefinition::new(
        "VertexInput",
        vec![
            FieldDefinition::with_semantic("Position", ShaderType::vec3(), Semantic::Position),
            FieldDefinition::with_semantic("Normal", ShaderType::vec3(), Semantic::Normal),
            FieldDefinition::with_semantic(
                "TexCoord",
                ShaderType::vec2(),
                Semantic::TextureCoordinate,
            ),
        ],
    );
    let vout = StructureDefinition::new(
        "VertexOutput",
        vec![
            FieldDefinition::with_semantic(
                "ClipPos",
                ShaderType::vec4(),
                Semantic::SystemPosition,
            ),
            FieldDefinition::with_semantic("Normal", ShaderType::vec3(), Semantic::Normal),
            FieldDefinition::with_semantic(
                "TexCoord",
                ShaderType::vec2(),
                Semantic::TextureCoordinate,
            ),
        ],
    );

    let assign = |field: &str, ty: ShaderType, value: Expr| Stmt::Assign {
        target: Expr::field(ty, Expr::var(struct_ty("VertexOutput"), "output"), field),
        value,
    };
    let vs = entry(
        FunctionKey::new("LitShader", "VS"),
        vec![ParameterDefinition::new("input", struct_ty("VertexInput"))],
        struct_ty("VertexOutput"),
        ShaderStage::Vertex,
        vec![
            Stmt::Local {
                name: "output".into(),
                ty: struct_ty("VertexOutput"),
                init: None,
            },
            assign(
                "ClipPos",
                ShaderType::vec4(),
                Expr::intrinsic(
                    ShaderType::vec4(),
                    Intrinsic::Mul,
                    vec![
                        Expr::resource(ShaderType::Matrix4x4, "World"),
                        Expr::construct(
                            ShaderType::vec4(),
                            vec![
                                Expr::field(
                                    ShaderType::vec3(),
                                    Expr::var(struct_ty("VertexInput"), "input"),
                                    "Position",
                                ),
                                Expr::float(1.0),
                            ],
                        ),
                    ],
                ),
            ),
            assign(
                "Normal",
                ShaderType::vec3(),
                Expr::field(
                    ShaderType::vec3(),
                    Expr::var(struct_ty("VertexInput"), "input"),
                    "Normal",
                ),
            ),
            assign(
                "TexCoord",
                ShaderType::vec2(),
                Expr::field(
                    ShaderType::vec2(),
                    Expr::var(struct_ty("VertexInput"), "input"),
                    "TexCoord",
                ),
            ),
            Stmt::Return(Some(Expr::var(struct_ty("VertexOutput"), "output"))),
        ],
    );

    let lighting = FunctionDefinition {
        function: ShaderFunction::helper(
            FunctionKey::new("LitShader", "Lighting"),
            vec![ParameterDefinition::new("normal", ShaderType::vec3())],
            ShaderType::FLOAT,
        ),
        body: vec![Stmt::Return(Some(Expr::intrinsic(
            ShaderType::FLOAT,
            Intrinsic::Saturate,
            vec![Expr::intrinsic(
                ShaderType::FLOAT,
                Intrinsic::Dot,
                vec![
                    Expr::var(ShaderType::vec3(), "normal"),
                    Expr::field(
                        ShaderType::vec3(),
                        Expr::resource(ShaderType::vec4(), "LightDir"),
                        "XYZ",
                    ),
                ],
            )],
        )))],
    };

    let fs = entry(
        FunctionKey::new("LitShader", "FS"),
        vec![ParameterDefinition::new("input", struct_ty("VertexOutput"))],
        ShaderType::vec4(),
        ShaderStage::Fragment,
        vec![
            Stmt::Local {
                name: "texColor".into(),
                ty: ShaderType::vec4(),
                init: Some(Expr::intrinsic(
                    ShaderType::vec4(),
                    Intrinsic::Sample,
                    vec![
                        Expr::resource(ShaderType::Resource(ResourceKind::Texture2D), "Tex"),
                        Expr::resource(ShaderType::Resource(ResourceKind::Sampler), "Smp"),
                        Expr::field(
                            ShaderType::vec2(),
                            Expr::var(struct_ty("VertexOutput"), "input"),
                            "TexCoord",
                        ),
                    ],
                )),
            },
            Stmt::Return(Some(Expr::binary(
                ShaderType::vec4(),
                refract_model::BinaryOp::Multiply,
                Expr::var(ShaderType::vec4(), "texColor"),
                Expr::call(
                    ShaderType::FLOAT,
                    FunctionKey::new("LitShader", "Lighting"),
                    vec![Expr::field(
                        ShaderType::vec3(),
                        Expr::var(struct_ty("VertexOutput"), "input"),
                        "Normal",
                    )],
                ),
            ))),
        ],
    );

    ShaderModelBuilder::new()
        .structure(vin)
        .structure(vout)
        .function(vs)
        .function(lighting)
        .function(fs)
        .resources(
            "LitShader",
            vec![
                ResourceField::new("World", ResourceKind::Uniform, ShaderType::Matrix4x4),
                ResourceField::new("LightDir", ResourceKind::Uniform, ShaderType::vec4()),
                ResourceField::new("Tex", ResourceKind::Texture2D, ShaderType::Void),
                ResourceField::new("Smp", ResourceKind::Sampler, ShaderType::Void),
            ],
        )
        .shader_set(ShaderSetSource::graphics(
            "LitShader",
            FunctionKey::new("LitShader", "VS"),
            FunctionKey::new("LitShader", "FS"),
        ))
        .build()
}

/// A compute set scaling a structured buffer by a uniform.
#[allow(dead_code)]
pub fn scale_compute_model() -> ShaderModel {
    let element = |idx: Expr| {
        Expr::index(
            ShaderType::FLOAT,
            Expr::resource(
                ShaderType::Resource(ResourceKind::RWStructuredBuffer),
                "Data",
            ),
            idx,
        )
    };
    let idx = || Expr::var(ShaderType::UINT, "idx");

    let cs = FunctionDefinition {
        function: ShaderFunction {
            key: FunctionKey::new("ScaleShader", "CS"),
            parameters: vec![],
            return_type: ShaderType::Void,
            stage: ShaderStage::Compute,
            group_size: [64, 1, 1],
            uses_multisample_load: false,
        },
        body: vec![
            Stmt::Local {
                name: "idx".into(),
                ty: ShaderType::UINT,
                init: Some(Expr::field(
                    ShaderType::UINT,
                    Expr::intrinsic(uint3(), Intrinsic::DispatchThreadId, vec![]),
                    "X",
                )),
            },
            Stmt::Assign {
                target: element(idx()),
                value: Expr::binary(
                    ShaderType::FLOAT,
                    refract_model::BinaryOp::Multiply,
                    element(idx()),
                    Expr::resource(ShaderType::FLOAT, "Scale"),
                ),
            },
        ],
    };

    ShaderModelBuilder::new()
        .function(cs)
        .resources(
            "ScaleShader",
            vec![
                ResourceField::new("Data", ResourceKind::RWStructuredBuffer, ShaderType::FLOAT),
                ResourceField::new("Scale", ResourceKind::Uniform, ShaderType::FLOAT),
            ],
        )
        .shader_set(ShaderSetSource::compute(
            "ScaleShader",
            FunctionKey::new("ScaleShader", "CS"),
        ))
        .build()
}
