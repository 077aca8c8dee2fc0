#![warn(missing_docs)]
//! GLSL shader generation for OpenGL 3.3, OpenGL ES 3.0, and Vulkan.
//!
//! The three targets share one dialect parameterized by
//! [`GlslVersion`]. Stage interfaces are flattened into global `in`/
//! `out` variables (`fsin_N` interpolants, `_outputColor_N` targets)
//! and the synthesized `main` shuttles values between the globals and
//! the translated entry point. GLSL 330 and ES 300 use combined
//! `sampler2D` objects and drop standalone sampler declarations; GLSL
//! 450 keeps textures and samplers separate with `set`/`binding`
//! layouts and recombines them at each call site.

use refract_backend_core::{
    declaration, emit_function, escape_ident, field_type, CodeWriter, Dialect, IntrinsicCall,
    ShaderBackend, StructRole, TranslateError, UnitContext,
};
use refract_discovery::{FragmentOutput, ResourceDefinition, StageInterface};
use refract_model::{
    FunctionDefinition, Intrinsic, ResourceKind, ScalarKind, ShaderStage, ShaderType,
    StructureDefinition,
};

/// Which GLSL flavor to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlslVersion {
    /// Desktop OpenGL 3.3 core (compute units bump to 4.30).
    Glsl330,
    /// OpenGL ES 3.0 (compute units bump to ES 3.10).
    GlslEs300,
    /// Vulkan-flavored GLSL 4.50.
    Glsl450,
}

/// GLSL keywords plus the names the synthesized wrapper claims.
const RESERVED: &[&str] = &[
    "main", "input_", "output_", "bool", "int", "uint", "float", "double", "void", "true",
    "false", "if", "else", "for", "while", "do", "switch", "case", "default", "break",
    "continue", "return", "discard", "struct", "in", "out", "inout", "uniform", "buffer",
    "shared", "layout", "flat", "smooth", "centroid", "invariant", "precise", "lowp", "mediump",
    "highp", "precision", "const", "attribute", "varying", "sampler", "sampler2D", "sampler3D",
    "samplerCube", "sampler2DShadow", "sampler2DArray", "sampler2DMS", "texture", "image2D",
    "mat2", "mat3", "mat4", "vec2", "vec3", "vec4", "ivec2", "ivec3", "ivec4", "uvec2", "uvec3",
    "uvec4", "bvec2", "bvec3", "bvec4", "common", "partition", "active", "filter", "using",
];

fn vector_prefix(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "bvec",
        ScalarKind::Int => "ivec",
        ScalarKind::UInt => "uvec",
        ScalarKind::Float => "vec",
    }
}

/// The GLSL dialect tables for one [`GlslVersion`].
#[derive(Debug)]
pub struct GlslDialect {
    version: GlslVersion,
}

impl GlslDialect {
    /// Creates the dialect for one GLSL flavor.
    pub fn new(version: GlslVersion) -> Self {
        Self { version }
    }

    /// Whether textures and samplers fold into combined sampler objects.
    fn combined_samplers(&self) -> bool {
        self.version != GlslVersion::Glsl450
    }

    /// The combined sampler type for a texture resource.
    fn combined_sampler_type(&self, res: &ResourceDefinition) -> &'static str {
        match (res.kind, res.shadow_sampled) {
            (ResourceKind::Texture2D, false) => "sampler2D",
            (ResourceKind::Texture2D, true) => "sampler2DShadow",
            (ResourceKind::TextureCube, false) => "samplerCube",
            (ResourceKind::TextureCube, true) => "samplerCubeShadow",
            (ResourceKind::Texture2DArray, false) => "sampler2DArray",
            (ResourceKind::Texture2DArray, true) => "sampler2DArrayShadow",
            (ResourceKind::Texture2DMS, _) => "sampler2DMS",
            _ => "sampler2D",
        }
    }

    /// Rebuilds a combined sampler at a 450 call site from a separate
    /// texture and sampler argument pair.
    fn recombine(
        &self,
        call: &IntrinsicCall<'_>,
        shadow: bool,
    ) -> Result<String, TranslateError> {
        let combined = match call.resource_arg(0).map(|r| r.kind) {
            Some(ResourceKind::TextureCube) => {
                if shadow {
                    "samplerCubeShadow"
                } else {
                    "samplerCube"
                }
            }
            Some(ResourceKind::Texture2DArray) => {
                if shadow {
                    "sampler2DArrayShadow"
                } else {
                    "sampler2DArray"
                }
            }
            Some(ResourceKind::Texture2DMS) => "sampler2DMS",
            _ => {
                if shadow {
                    "sampler2DShadow"
                } else {
                    "sampler2D"
                }
            }
        };
        Ok(format!("{combined}({}, {})", arg(call, 0)?, arg(call, 1)?))
    }

    fn version_line(&self, stage: ShaderStage) -> &'static str {
        let compute = stage == ShaderStage::Compute;
        match (self.version, compute) {
            (GlslVersion::Glsl330, false) => "#version 330 core",
            (GlslVersion::Glsl330, true) => "#version 430",
            (GlslVersion::GlslEs300, false) => "#version 300 es",
            (GlslVersion::GlslEs300, true) => "#version 310 es",
            (GlslVersion::Glsl450, _) => "#version 450",
        }
    }

    /// `layout(location = N) ` when the version requires explicit
    /// interface locations.
    fn location(&self, n: u32) -> String {
        match self.version {
            GlslVersion::Glsl450 => format!("layout(location = {n}) "),
            _ => String::new(),
        }
    }

    fn write_vertex_main(
        &self,
        w: &mut CodeWriter,
        ctx: &UnitContext<'_>,
        input: &StructureDefinition,
        output: &StructureDefinition,
        position_field: usize,
    ) -> Result<(), TranslateError> {
        for (i, field) in input.fields.iter().enumerate() {
            w.line(format!(
                "{}in {};",
                self.location(i as u32),
                declaration(self, &field_type(field), &escape_ident(self, &field.name))?
            ));
        }
        let mut n = 0u32;
        for (i, field) in output.fields.iter().enumerate() {
            if i == position_field {
                continue;
            }
            w.line(format!(
                "{}out {} fsin_{n};",
                self.location(n),
                self.type_name(&field_type(field))?
            ));
            n += 1;
        }
        w.blank();

        w.open("void main()");
        w.line(format!("{} input_;", escape_ident(self, &input.name)));
        for field in &input.fields {
            let name = escape_ident(self, &field.name);
            w.line(format!("input_.{name} = {name};"));
        }
        w.line(format!(
            "{} output_ = {}(input_);",
            escape_ident(self, &output.name),
            escape_ident(self, &ctx.entry.function.key.method)
        ));
        let mut n = 0u32;
        for (i, field) in output.fields.iter().enumerate() {
            if i == position_field {
                continue;
            }
            w.line(format!(
                "fsin_{n} = output_.{};",
                escape_ident(self, &field.name)
            ));
            n += 1;
        }
        w.line(format!(
            "gl_Position = output_.{};",
            escape_ident(self, &output.fields[position_field].name)
        ));
        match self.version {
            GlslVersion::Glsl330 | GlslVersion::GlslEs300 => {
                w.line("gl_Position.z = gl_Position.z * 2.0 - gl_Position.w;");
            }
            GlslVersion::Glsl450 => {
                w.line("gl_Position.y = -gl_Position.y;");
            }
        }
        w.close();
        Ok(())
    }

    fn write_fragment_main(
        &self,
        w: &mut CodeWriter,
        ctx: &UnitContext<'_>,
        input: &Option<StructureDefinition>,
        system_position_field: Option<usize>,
        output: &FragmentOutput,
    ) -> Result<(), TranslateError> {
        if let Some(input) = input {
            let mut n = 0u32;
            for (i, field) in input.fields.iter().enumerate() {
                if Some(i) == system_position_field {
                    continue;
                }
                w.line(format!(
                    "{}in {} fsin_{n};",
                    self.location(n),
                    self.type_name(&field_type(field))?
                ));
                n += 1;
            }
        }
        match output {
            FragmentOutput::Color => {
                w.line(format!("{}out vec4 _outputColor_;", self.location(0)));
            }
            FragmentOutput::None => {}
            FragmentOutput::Targets(structure) => {
                for (i, field) in structure.fields.iter().enumerate() {
                    w.line(format!(
                        "layout(location = {i}) out {} _outputColor_{i};",
                        self.type_name(&field_type(field))?
                    ));
                }
            }
        }
        w.blank();

        w.open("void main()");
        let call_args = match input {
            Some(input) => {
                w.line(format!("{} input_;", escape_ident(self, &input.name)));
                let mut n = 0u32;
                for (i, field) in input.fields.iter().enumerate() {
                    let name = escape_ident(self, &field.name);
                    if Some(i) == system_position_field {
                        w.line(format!("input_.{name} = gl_FragCoord;"));
                    } else {
                        w.line(format!("input_.{name} = fsin_{n};"));
                        n += 1;
                    }
                }
                "input_"
            }
            None => "",
        };
        let call = format!(
            "{}({call_args})",
            escape_ident(self, &ctx.entry.function.key.method)
        );
        match output {
            FragmentOutput::Color => w.line(format!("_outputColor_ = {call};")),
            FragmentOutput::None => w.line(format!("{call};")),
            FragmentOutput::Targets(structure) => {
                w.line(format!(
                    "{} output_ = {call};",
                    escape_ident(self, &structure.name)
                ));
                for (i, field) in structure.fields.iter().enumerate() {
                    w.line(format!(
                        "_outputColor_{i} = output_.{};",
                        escape_ident(self, &field.name)
                    ));
                }
            }
        }
        w.close();
        Ok(())
    }
}

fn arg<'a>(call: &'a IntrinsicCall<'_>, i: usize) -> Result<&'a str, TranslateError> {
    call.args
        .get(i)
        .map(String::as_str)
        .ok_or_else(|| TranslateError::UnsupportedConstruct {
            reason: format!("{} is missing argument {i}", call.intrinsic),
        })
}

impl Dialect for GlslDialect {
    fn name(&self) -> &'static str {
        match self.version {
            GlslVersion::Glsl330 => "GLSL330",
            GlslVersion::GlslEs300 => "GLSLES300",
            GlslVersion::Glsl450 => "GLSL450",
        }
    }

    fn type_name(&self, ty: &ShaderType) -> Result<String, TranslateError> {
        match ty {
            ShaderType::Void => Ok("void".to_owned()),
            ShaderType::Scalar(ScalarKind::Bool) => Ok("bool".to_owned()),
            ShaderType::Scalar(ScalarKind::Int) => Ok("int".to_owned()),
            ShaderType::Scalar(ScalarKind::UInt) => Ok("uint".to_owned()),
            ShaderType::Scalar(ScalarKind::Float) => Ok("float".to_owned()),
            ShaderType::Vector { scalar, size } => {
                Ok(format!("{}{}", vector_prefix(*scalar), size.count()))
            }
            ShaderType::Matrix4x4 => Ok("mat4".to_owned()),
            ShaderType::Struct(name) => Ok(escape_ident(self, name)),
            _ => Err(TranslateError::UnknownType {
                ty: ty.clone(),
                dialect: self.name().to_owned(),
            }),
        }
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn matrix_element(&self, row: u32, col: u32) -> String {
        format!("[{col}][{row}]")
    }

    fn uniform_field_prefix(&self) -> &'static str {
        "field_"
    }

    fn requires_int_float_coercion(&self) -> bool {
        self.version == GlslVersion::GlslEs300
    }

    fn supports_multisample_textures(&self) -> bool {
        self.version != GlslVersion::GlslEs300
    }

    fn resource_ref(&self, res: &ResourceDefinition) -> String {
        if res.kind == ResourceKind::Uniform || res.kind.is_structured_buffer() {
            // Block members carry the field prefix to dodge the block name.
            format!("{}{}", self.uniform_field_prefix(), res.name)
        } else {
            escape_ident(self, &res.name)
        }
    }

    fn construct(&self, ty: &ShaderType, args: &[String]) -> Result<String, TranslateError> {
        match ty {
            ShaderType::Vector { .. } | ShaderType::Matrix4x4 | ShaderType::Struct(_) => {
                Ok(format!("{}({})", self.type_name(ty)?, args.join(", ")))
            }
            _ => Err(TranslateError::UnsupportedConstruct {
                reason: format!("GLSL cannot construct {ty:?} inline"),
            }),
        }
    }

    fn cast(&self, ty: &ShaderType, operand: &str) -> Result<String, TranslateError> {
        Ok(format!("{}({operand})", self.type_name(ty)?))
    }

    fn intrinsic(&self, call: &IntrinsicCall<'_>) -> Result<String, TranslateError> {
        let named = |name: &str| format!("{name}({})", call.args.join(", "));
        Ok(match call.intrinsic {
            Intrinsic::Abs => named("abs"),
            Intrinsic::Acos => named("acos"),
            Intrinsic::Asin => named("asin"),
            Intrinsic::Atan => named("atan"),
            Intrinsic::Atan2 => named("atan"),
            Intrinsic::Ceil => named("ceil"),
            Intrinsic::Clamp => named("clamp"),
            Intrinsic::Cos => named("cos"),
            Intrinsic::Cross => named("cross"),
            Intrinsic::Ddx => named("dFdx"),
            Intrinsic::Ddy => named("dFdy"),
            Intrinsic::Discard => "discard".to_owned(),
            Intrinsic::Distance => named("distance"),
            Intrinsic::Dot => named("dot"),
            Intrinsic::Floor => named("floor"),
            Intrinsic::Frac => named("fract"),
            Intrinsic::Length => named("length"),
            Intrinsic::Lerp => named("mix"),
            // Under 450 this is the samplerless form, enabled in the
            // preamble when a unit loads.
            Intrinsic::Load => format!(
                "texelFetch({}, {}, {})",
                arg(call, 0)?,
                arg(call, 1)?,
                arg(call, 2)?
            ),
            Intrinsic::Max => named("max"),
            Intrinsic::Min => named("min"),
            Intrinsic::Mod => named("mod"),
            Intrinsic::Mul => format!("({} * {})", arg(call, 0)?, arg(call, 1)?),
            Intrinsic::Normalize => named("normalize"),
            Intrinsic::Pow => named("pow"),
            Intrinsic::Reflect => named("reflect"),
            Intrinsic::Round => named("round"),
            Intrinsic::Sample => {
                if self.combined_samplers() {
                    format!("texture({}, {})", arg(call, 0)?, arg(call, 2)?)
                } else {
                    format!(
                        "texture({}, {})",
                        self.recombine(call, false)?,
                        arg(call, 2)?
                    )
                }
            }
            Intrinsic::SampleGrad => {
                if self.combined_samplers() {
                    format!(
                        "textureGrad({}, {}, {}, {})",
                        arg(call, 0)?,
                        arg(call, 2)?,
                        arg(call, 3)?,
                        arg(call, 4)?
                    )
                } else {
                    format!(
                        "textureGrad({}, {}, {}, {})",
                        self.recombine(call, false)?,
                        arg(call, 2)?,
                        arg(call, 3)?,
                        arg(call, 4)?
                    )
                }
            }
            Intrinsic::SampleCmpLevelZero => {
                let coord = format!("vec3({}, {})", arg(call, 2)?, arg(call, 3)?);
                if self.combined_samplers() {
                    format!("texture({}, {coord})", arg(call, 0)?)
                } else {
                    format!("texture({}, {coord})", self.recombine(call, true)?)
                }
            }
            Intrinsic::Saturate => format!("clamp({}, 0.0, 1.0)", arg(call, 0)?),
            Intrinsic::Sin => named("sin"),
            Intrinsic::SmoothStep => named("smoothstep"),
            Intrinsic::Sqrt => named("sqrt"),
            Intrinsic::Tan => named("tan"),
            Intrinsic::Truncate => named("trunc"),
            Intrinsic::DispatchThreadId => "gl_GlobalInvocationID".to_owned(),
            Intrinsic::GroupThreadId => "gl_LocalInvocationID".to_owned(),
        })
    }

    fn write_preamble(&self, w: &mut CodeWriter, ctx: &UnitContext<'_>) {
        w.line(self.version_line(ctx.plan.stage));
        if self.version == GlslVersion::Glsl450 && ctx.plan.uses_multisample_load {
            w.line("#extension GL_EXT_samplerless_texture_functions : enable");
        }
        if self.version == GlslVersion::GlslEs300 && ctx.plan.stage != ShaderStage::Vertex {
            w.line("precision mediump float;");
            w.line("precision mediump int;");
        }
        w.blank();
    }

    fn write_structure(
        &self,
        w: &mut CodeWriter,
        structure: &StructureDefinition,
        _role: StructRole,
    ) -> Result<(), TranslateError> {
        w.open(format!("struct {}", escape_ident(self, &structure.name)));
        for field in &structure.fields {
            w.line(format!(
                "{};",
                declaration(self, &field_type(field), &escape_ident(self, &field.name))?
            ));
        }
        w.close_semi();
        w.blank();
        Ok(())
    }

    fn write_resource(
        &self,
        w: &mut CodeWriter,
        _ctx: &UnitContext<'_>,
        res: &ResourceDefinition,
    ) -> Result<(), TranslateError> {
        let name = escape_ident(self, &res.name);
        let vulkan = self.version == GlslVersion::Glsl450;
        match res.kind {
            ResourceKind::Uniform => {
                let layout = if vulkan {
                    format!("layout(set = {}, binding = {}) ", res.set, res.binding)
                } else {
                    String::new()
                };
                w.open(format!("{layout}uniform {name}Buffer"));
                w.line(format!(
                    "{};",
                    declaration(
                        self,
                        &res.value_type,
                        &format!("{}{}", self.uniform_field_prefix(), res.name)
                    )?
                ));
                w.close_semi();
                w.blank();
            }
            ResourceKind::StructuredBuffer | ResourceKind::RWStructuredBuffer => {
                let layout = if vulkan {
                    format!(
                        "layout(set = {}, binding = {}, std430) ",
                        res.set, res.binding
                    )
                } else {
                    format!("layout(std430, binding = {}) ", res.binding)
                };
                let access = if res.kind == ResourceKind::StructuredBuffer {
                    "readonly "
                } else {
                    ""
                };
                w.open(format!("{layout}{access}buffer {name}Buffer"));
                w.line(format!(
                    "{} {}{}[];",
                    self.type_name(&res.value_type)?,
                    self.uniform_field_prefix(),
                    res.name
                ));
                w.close_semi();
                w.blank();
            }
            ResourceKind::Sampler => {
                if vulkan {
                    let ty = if res.shadow_sampled {
                        "samplerShadow"
                    } else {
                        "sampler"
                    };
                    w.line(format!(
                        "layout(set = {}, binding = {}) uniform {ty} {name};",
                        res.set, res.binding
                    ));
                    w.blank();
                }
                // Combined-sampler versions fold the sampler into the
                // texture declaration and emit nothing here.
            }
            kind if kind.is_texture() => {
                if vulkan {
                    let ty = match kind {
                        ResourceKind::TextureCube => "textureCube",
                        ResourceKind::Texture2DArray => "texture2DArray",
                        ResourceKind::Texture2DMS => "texture2DMS",
                        _ => "texture2D",
                    };
                    w.line(format!(
                        "layout(set = {}, binding = {}) uniform {ty} {name};",
                        res.set, res.binding
                    ));
                } else {
                    w.line(format!(
                        "uniform {} {name};",
                        self.combined_sampler_type(res)
                    ));
                }
                w.blank();
            }
            _ => {}
        }
        Ok(())
    }

    fn write_function(
        &self,
        w: &mut CodeWriter,
        ctx: &UnitContext<'_>,
        def: &FunctionDefinition,
    ) -> Result<(), TranslateError> {
        emit_function(self, ctx, def, &[], w)
    }

    fn write_main(&self, w: &mut CodeWriter, ctx: &UnitContext<'_>) -> Result<(), TranslateError> {
        match ctx.interface() {
            StageInterface::Vertex {
                input,
                output,
                position_field,
            } => self.write_vertex_main(w, ctx, input, output, *position_field),
            StageInterface::Fragment {
                input,
                system_position_field,
                output,
            } => self.write_fragment_main(w, ctx, input, *system_position_field, output),
            StageInterface::Compute => {
                let [x, y, z] = ctx.entry.function.group_size;
                w.line(format!(
                    "layout(local_size_x = {x}, local_size_y = {y}, local_size_z = {z}) in;"
                ));
                w.blank();
                w.open("void main()");
                w.line(format!(
                    "{}();",
                    escape_ident(self, &ctx.entry.function.key.method)
                ));
                w.close();
                Ok(())
            }
        }
    }
}

/// One of the three GLSL backends.
#[derive(Debug)]
pub struct GlslBackend {
    dialect: GlslDialect,
    name: &'static str,
    targets: &'static [&'static str],
    extension: &'static str,
}

impl GlslBackend {
    /// The desktop OpenGL 3.3 backend.
    pub fn glsl330() -> Self {
        Self {
            dialect: GlslDialect::new(GlslVersion::Glsl330),
            name: "glsl330",
            targets: &["glsl330", "opengl"],
            extension: "330.glsl",
        }
    }

    /// The OpenGL ES 3.0 backend.
    pub fn glsl_es300() -> Self {
        Self {
            dialect: GlslDialect::new(GlslVersion::GlslEs300),
            name: "glsles300",
            targets: &["glsles300", "opengles"],
            extension: "300.glsles",
        }
    }

    /// The Vulkan GLSL 4.50 backend.
    pub fn glsl450() -> Self {
        Self {
            dialect: GlslDialect::new(GlslVersion::Glsl450),
            name: "glsl450",
            targets: &["glsl450", "vulkan"],
            extension: "450.glsl",
        }
    }
}

impl ShaderBackend for GlslBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn targets(&self) -> &[&str] {
        self.targets
    }

    fn file_extension(&self) -> &'static str {
        self.extension
    }

    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_backend_core::{GeneratedShaderSet, Translator};
    use refract_discovery::plan_set;
    use refract_model::{
        BinaryOp, Expr, FieldDefinition, FunctionKey, ParameterDefinition, ProgramModel,
        ResourceField, Semantic, ShaderFunction, ShaderModel, ShaderModelBuilder,
        ShaderSetSource, Stmt,
    };

    fn graphics_model() -> ShaderModel {
        let vin = StructureDefinition::new(
            "VIn",
            vec![
                FieldDefinition::with_semantic("Position", ShaderType::vec3(), Semantic::Position),
                FieldDefinition::with_semantic(
                    "TexCoord",
                    ShaderType::vec2(),
                    Semantic::TextureCoordinate,
                ),
            ],
        );
        let vout = StructureDefinition::new(
            "VOut",
            vec![
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
            ],
        );

        let vs = FunctionDefinition {
            function: ShaderFunction {
                key: FunctionKey::new("S", "VS"),
                parameters: vec![ParameterDefinition::new(
                    "v",
                    ShaderType::Struct("VIn".into()),
                )],
                return_type: ShaderType::Struct("VOut".into()),
                stage: ShaderStage::Vertex,
                group_size: [1, 1, 1],
                uses_multisample_load: false,
            },
            body: vec![
                Stmt::Local {
                    name: "o".into(),
                    ty: ShaderType::Struct("VOut".into()),
                    init: None,
                },
                Stmt::Assign {
                    target: Expr::field(
                        ShaderType::vec4(),
                        Expr::var(ShaderType::Struct("VOut".into()), "o"),
                        "ClipPos",
                    ),
                    value: Expr::intrinsic(
                        ShaderType::vec4(),
                        Intrinsic::Mul,
                        vec![
                            Expr::resource(ShaderType::Matrix4x4, "World"),
                            Expr::construct(
                                ShaderType::vec4(),
                                vec![
                                    Expr::field(
                                        ShaderType::vec3(),
                                        Expr::var(ShaderType::Struct("VIn".into()), "v"),
                                        "Position",
                                    ),
                                    Expr::float(1.0),
                                ],
                            ),
                        ],
                    ),
                },
                Stmt::Return(Some(Expr::var(ShaderType::Struct("VOut".into()), "o"))),
            ],
        };
        let fs = FunctionDefinition {
            function: ShaderFunction {
                key: FunctionKey::new("S", "FS"),
                parameters: vec![ParameterDefinition::new(
                    "f",
                    ShaderType::Struct("VOut".into()),
                )],
                return_type: ShaderType::vec4(),
                stage: ShaderStage::Fragment,
                group_size: [1, 1, 1],
                uses_multisample_load: false,
            },
            body: vec![Stmt::Return(Some(Expr::intrinsic(
                ShaderType::vec4(),
                Intrinsic::Sample,
                vec![
                    Expr::resource(ShaderType::Resource(ResourceKind::Texture2D), "Tex"),
                    Expr::resource(ShaderType::Resource(ResourceKind::Sampler), "Smp"),
                    Expr::field(
                        ShaderType::vec2(),
                        Expr::var(ShaderType::Struct("VOut".into()), "f"),
                        "TexCoord",
                    ),
                ],
            )))],
        };

        ShaderModelBuilder::new()
            .structure(vin)
            .structure(vout)
            .function(vs)
            .function(fs)
            .resources(
                "S",
                vec![
                    ResourceField::new("World", ResourceKind::Uniform, ShaderType::Matrix4x4),
                    ResourceField::new("Tex", ResourceKind::Texture2D, ShaderType::Void),
                    ResourceField::new("Smp", ResourceKind::Sampler, ShaderType::Void),
                ],
            )
            .shader_set(ShaderSetSource::graphics(
                "S",
                FunctionKey::new("S", "VS"),
                FunctionKey::new("S", "FS"),
            ))
            .build()
    }

    fn generate(backend: &GlslBackend, model: &ShaderModel) -> GeneratedShaderSet {
        let plan = plan_set(model, &model.shader_sets()[0].clone()).unwrap();
        backend.generate_set(model, &plan).unwrap()
    }

    #[test]
    fn glsl330_vertex_flattens_interface() {
        let model = graphics_model();
        let set = generate(&GlslBackend::glsl330(), &model);
        let vs = &set.vertex.as_ref().unwrap().source;

        assert!(vs.starts_with("#version 330 core\n"));
        assert!(vs.contains("uniform WorldBuffer"));
        assert!(vs.contains("mat4 field_World;"));
        assert!(vs.contains("in vec3 Position;"));
        assert!(vs.contains("out vec2 fsin_0;"));
        assert!(vs.contains("input_.Position = Position;"));
        assert!(vs.contains("VOut output_ = VS(input_);"));
        assert!(vs.contains("fsin_0 = output_.TexCoord;"));
        assert!(vs.contains("gl_Position = output_.ClipPos;"));
        assert!(vs.contains("gl_Position.z = gl_Position.z * 2.0 - gl_Position.w;"));
        assert!(vs.contains("(field_World * vec4(v.Position, 1.0))"));
    }

    #[test]
    fn glsl330_fragment_uses_combined_sampler() {
        let model = graphics_model();
        let set = generate(&GlslBackend::glsl330(), &model);
        let fs = &set.fragment.as_ref().unwrap().source;

        assert!(fs.contains("uniform sampler2D Tex;"));
        // The standalone sampler disappears into the combined object.
        assert!(!fs.contains(" Smp"));
        assert!(fs.contains("texture(Tex, f.TexCoord)"));
        assert!(fs.contains("out vec4 _outputColor_;"));
        assert!(fs.contains("_outputColor_ = FS(input_);"));
        assert!(fs.contains("input_.TexCoord = fsin_0;"));
    }

    #[test]
    fn glsl450_keeps_separate_texture_and_sampler() {
        let model = graphics_model();
        let set = generate(&GlslBackend::glsl450(), &model);
        let fs = &set.fragment.as_ref().unwrap().source;

        assert!(fs.starts_with("#version 450\n"));
        assert!(fs.contains("layout(set = 0, binding = 1) uniform texture2D Tex;"));
        assert!(fs.contains("layout(set = 0, binding = 2) uniform sampler Smp;"));
        assert!(fs.contains("texture(sampler2D(Tex, Smp), f.TexCoord)"));
        assert!(fs.contains("layout(location = 0) out vec4 _outputColor_;"));
    }

    #[test]
    fn glsl450_vertex_flips_y() {
        let model = graphics_model();
        let set = generate(&GlslBackend::glsl450(), &model);
        let vs = &set.vertex.as_ref().unwrap().source;

        assert!(vs.contains("layout(set = 0, binding = 0) uniform WorldBuffer"));
        assert!(vs.contains("layout(location = 0) in vec3 Position;"));
        assert!(vs.contains("gl_Position.y = -gl_Position.y;"));
        assert!(!vs.contains("* 2.0 -"));
    }

    #[test]
    fn es300_prefixes_precision_and_coerces() {
        let model = graphics_model();
        let set = generate(&GlslBackend::glsl_es300(), &model);
        let vs = &set.vertex.as_ref().unwrap().source;
        let fs = &set.fragment.as_ref().unwrap().source;

        assert!(vs.starts_with("#version 300 es\n"));
        assert!(!vs.contains("precision mediump"));
        assert!(fs.starts_with("#version 300 es\nprecision mediump float;\n"));

        // int / float mixes get explicit conversions under ES.
        let dialect = GlslDialect::new(GlslVersion::GlslEs300);
        let mixed = Expr::binary(
            ShaderType::FLOAT,
            BinaryOp::Multiply,
            Expr::int(2),
            Expr::float(0.5),
        );
        let plan = plan_set(&model, &model.shader_sets()[0].clone()).unwrap();
        let entry = model.function(&plan.stages[0].entry).unwrap();
        let ctx = UnitContext {
            model: &model,
            set_name: "S",
            plan: &plan.stages[0],
            registry: &plan.registry,
            entry,
        };
        let text = Translator::new(&dialect, &ctx).expr(&mixed).unwrap();
        assert_eq!(text, "(float(2) * 0.5)");
    }

    #[test]
    fn compute_unit_bumps_version_and_reads_builtin() {
        let cs = FunctionDefinition {
            function: ShaderFunction {
                key: FunctionKey::new("S", "CS"),
                parameters: vec![],
                return_type: ShaderType::Void,
                stage: ShaderStage::Compute,
                group_size: [64, 1, 1],
                uses_multisample_load: false,
            },
            body: vec![Stmt::Assign {
                target: Expr::index(
                    ShaderType::FLOAT,
                    Expr::resource(
                        ShaderType::Resource(ResourceKind::RWStructuredBuffer),
                        "Data",
                    ),
                    Expr::field(
                        ShaderType::UINT,
                        Expr::intrinsic(
                            ShaderType::Vector {
                                scalar: ScalarKind::UInt,
                                size: refract_model::VectorSize::Three,
                            },
                            Intrinsic::DispatchThreadId,
                            vec![],
                        ),
                        "X",
                    ),
                ),
                value: Expr::float(1.0),
            }],
        };
        let model = ShaderModelBuilder::new()
            .function(cs)
            .resources(
                "S",
                vec![ResourceField::new(
                    "Data",
                    ResourceKind::RWStructuredBuffer,
                    ShaderType::FLOAT,
                )],
            )
            .shader_set(ShaderSetSource::compute("S", FunctionKey::new("S", "CS")))
            .build();

        let set = generate(&GlslBackend::glsl330(), &model);
        let src = &set.compute.as_ref().unwrap().source;
        assert!(src.starts_with("#version 430\n"));
        assert!(src.contains("layout(std430, binding = 0) buffer DataBuffer"));
        assert!(src.contains("float field_Data[];"));
        assert!(src.contains("layout(local_size_x = 64, local_size_y = 1, local_size_z = 1) in;"));
        assert!(src.contains("field_Data[gl_GlobalInvocationID.x] = 1.0;"));
        assert!(src.contains("CS();"));
    }
}
