#![warn(missing_docs)]
//! Metal Shading Language generation.
//!
//! Metal has no global resource bindings: every registered resource
//! becomes a parameter of the `main0` entry wrapper with a
//! `[[buffer]]`/`[[texture]]`/`[[sampler]]` attribute, and the same
//! parameter list (without attributes) is appended to every user
//! function so helpers can reach the resources they touch. Call sites
//! thread the names through automatically.

use refract_backend_core::{
    declaration, emit_function, escape_ident, field_type, thread_ids_used, CodeWriter, Dialect,
    IntrinsicCall, ShaderBackend, StructRole, TranslateError, Translator, UnitContext,
};
use refract_discovery::{FragmentOutput, ResourceDefinition, ResourceRegistry, StageInterface};
use refract_model::{
    FunctionDefinition, FunctionKey, Intrinsic, ResourceKind, ScalarKind, ShaderStage,
    ShaderType, StructureDefinition,
};

/// MSL/C++ keywords plus the names the synthesized wrapper claims.
const RESERVED: &[&str] = &[
    "main", "main0", "_dispatch_id", "_group_thread_id", "bool", "int", "uint", "short",
    "ushort", "char", "uchar", "long", "float", "half", "double", "void", "true", "false", "if",
    "else", "for", "while", "do", "switch", "case", "default", "break", "continue", "return",
    "struct", "class", "template", "typename", "using", "namespace", "constexpr", "const",
    "constant", "device", "threadgroup", "thread", "kernel", "vertex", "fragment", "sampler",
    "texture", "new", "delete", "operator", "private", "public", "protected", "virtual",
    "static", "auto", "this", "sizeof", "union", "enum", "typedef", "volatile", "register",
    "metal", "air", "assert",
];

/// Metal binding index classes.
#[derive(Clone, Copy, PartialEq, Eq)]
enum BindClass {
    Buffer,
    Texture,
    Sampler,
}

fn bind_class(kind: ResourceKind) -> BindClass {
    match kind {
        ResourceKind::Sampler => BindClass::Sampler,
        kind if kind.is_texture() => BindClass::Texture,
        _ => BindClass::Buffer,
    }
}

/// Per-class binding index in registry order; identical across stages.
fn bind_slot(registry: &ResourceRegistry, res: &ResourceDefinition) -> u32 {
    let class = bind_class(res.kind);
    registry
        .resources()
        .iter()
        .take_while(|r| r.name != res.name)
        .filter(|r| bind_class(r.kind) == class)
        .count() as u32
}

fn scalar_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "bool",
        ScalarKind::Int => "int",
        ScalarKind::UInt => "uint",
        ScalarKind::Float => "float",
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

/// The Metal dialect tables.
#[derive(Debug, Default)]
pub struct MetalDialect;

impl MetalDialect {
    fn texture_type(&self, res: &ResourceDefinition) -> &'static str {
        match (res.kind, res.shadow_sampled) {
            (ResourceKind::Texture2D, false) => "texture2d<float>",
            (ResourceKind::Texture2D, true) => "depth2d<float>",
            (ResourceKind::TextureCube, false) => "texturecube<float>",
            (ResourceKind::TextureCube, true) => "depthcube<float>",
            (ResourceKind::Texture2DArray, false) => "texture2d_array<float>",
            (ResourceKind::Texture2DArray, true) => "depth2d_array<float>",
            (ResourceKind::Texture2DMS, _) => "texture2d_ms<float>",
            _ => "texture2d<float>",
        }
    }

    /// One resource as a function parameter; the binding attribute is
    /// only attached on the `main0` signature.
    fn resource_param(
        &self,
        registry: &ResourceRegistry,
        res: &ResourceDefinition,
        with_attr: bool,
    ) -> Result<String, TranslateError> {
        let name = escape_ident(self, &res.name);
        let slot = bind_slot(registry, res);
        let (decl, attr) = match res.kind {
            ResourceKind::Uniform => (
                format!("constant {}& {name}", self.type_name(&res.value_type)?),
                format!(" [[buffer({slot})]]"),
            ),
            ResourceKind::StructuredBuffer => (
                format!("const device {}* {name}", self.type_name(&res.value_type)?),
                format!(" [[buffer({slot})]]"),
            ),
            ResourceKind::RWStructuredBuffer => (
                format!("device {}* {name}", self.type_name(&res.value_type)?),
                format!(" [[buffer({slot})]]"),
            ),
            ResourceKind::Sampler => {
                (format!("sampler {name}"), format!(" [[sampler({slot})]]"))
            }
            _ => (
                format!("{} {name}", self.texture_type(res)),
                format!(" [[texture({slot})]]"),
            ),
        };
        Ok(if with_attr { decl + &attr } else { decl })
    }

    fn resource_params(
        &self,
        ctx: &UnitContext<'_>,
        with_attrs: bool,
    ) -> Result<Vec<String>, TranslateError> {
        ctx.registry
            .resources()
            .iter()
            .map(|res| self.resource_param(ctx.registry, res, with_attrs))
            .collect()
    }

    fn resource_args(&self, ctx: &UnitContext<'_>) -> Vec<String> {
        ctx.registry
            .resources()
            .iter()
            .map(|res| escape_ident(self, &res.name))
            .collect()
    }
}

impl Dialect for MetalDialect {
    fn name(&self) -> &'static str {
        "Metal"
    }

    fn type_name(&self, ty: &ShaderType) -> Result<String, TranslateError> {
        match ty {
            ShaderType::Void => Ok("void".to_owned()),
            ShaderType::Scalar(kind) => Ok(scalar_name(*kind).to_owned()),
            ShaderType::Vector { scalar, size } => {
                Ok(format!("{}{}", scalar_name(*scalar), size.count()))
            }
            ShaderType::Matrix4x4 => Ok("float4x4".to_owned()),
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

    fn entry_point_name(&self) -> &'static str {
        "main0"
    }

    fn resource_ref(&self, res: &ResourceDefinition) -> String {
        escape_ident(self, &res.name)
    }

    fn construct(&self, ty: &ShaderType, args: &[String]) -> Result<String, TranslateError> {
        match ty {
            ShaderType::Vector { .. } | ShaderType::Matrix4x4 => {
                Ok(format!("{}({})", self.type_name(ty)?, args.join(", ")))
            }
            ShaderType::Struct(_) => {
                Ok(format!("{}{{{}}}", self.type_name(ty)?, args.join(", ")))
            }
            _ => Err(TranslateError::UnsupportedConstruct {
                reason: format!("Metal cannot construct {ty:?} inline"),
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
            Intrinsic::Atan2 => named("atan2"),
            Intrinsic::Ceil => named("ceil"),
            Intrinsic::Clamp => named("clamp"),
            Intrinsic::Cos => named("cos"),
            Intrinsic::Cross => named("cross"),
            Intrinsic::Ddx => named("dfdx"),
            Intrinsic::Ddy => named("dfdy"),
            Intrinsic::Discard => "discard_fragment()".to_owned(),
            Intrinsic::Distance => named("distance"),
            Intrinsic::Dot => named("dot"),
            Intrinsic::Floor => named("floor"),
            Intrinsic::Frac => named("fract"),
            Intrinsic::Length => named("length"),
            Intrinsic::Lerp => named("mix"),
            Intrinsic::Load => format!(
                "{}.read(uint2({}), {})",
                arg(call, 0)?,
                arg(call, 1)?,
                arg(call, 2)?
            ),
            Intrinsic::Max => named("max"),
            Intrinsic::Min => named("min"),
            Intrinsic::Mod => named("fmod"),
            Intrinsic::Mul => format!("({} * {})", arg(call, 0)?, arg(call, 1)?),
            Intrinsic::Normalize => named("normalize"),
            Intrinsic::Pow => named("pow"),
            Intrinsic::Reflect => named("reflect"),
            Intrinsic::Round => named("round"),
            Intrinsic::Sample => format!(
                "{}.sample({}, {})",
                arg(call, 0)?,
                arg(call, 1)?,
                arg(call, 2)?
            ),
            Intrinsic::SampleGrad => format!(
                "{}.sample({}, {}, gradient2d({}, {}))",
                arg(call, 0)?,
                arg(call, 1)?,
                arg(call, 2)?,
                arg(call, 3)?,
                arg(call, 4)?
            ),
            Intrinsic::SampleCmpLevelZero => format!(
                "{}.sample_compare({}, {}, {}, level(0))",
                arg(call, 0)?,
                arg(call, 1)?,
                arg(call, 2)?,
                arg(call, 3)?
            ),
            Intrinsic::Saturate => named("saturate"),
            Intrinsic::Sin => named("sin"),
            Intrinsic::SmoothStep => named("smoothstep"),
            Intrinsic::Sqrt => named("sqrt"),
            Intrinsic::Tan => named("tan"),
            Intrinsic::Truncate => named("trunc"),
            Intrinsic::DispatchThreadId => "_dispatch_id".to_owned(),
            Intrinsic::GroupThreadId => "_group_thread_id".to_owned(),
        })
    }

    fn user_call(
        &self,
        ctx: &UnitContext<'_>,
        function: &FunctionKey,
        mut args: Vec<String>,
    ) -> String {
        args.extend(self.resource_args(ctx));
        format!(
            "{}({})",
            escape_ident(self, &function.method),
            args.join(", ")
        )
    }

    fn write_preamble(&self, w: &mut CodeWriter, _ctx: &UnitContext<'_>) {
        w.line("#include <metal_stdlib>");
        w.line("using namespace metal;");
        w.blank();
    }

    fn write_structure(
        &self,
        w: &mut CodeWriter,
        structure: &StructureDefinition,
        role: StructRole,
    ) -> Result<(), TranslateError> {
        w.open(format!("struct {}", escape_ident(self, &structure.name)));
        for (i, field) in structure.fields.iter().enumerate() {
            let mut line =
                declaration(self, &field_type(field), &escape_ident(self, &field.name))?;
            match role {
                StructRole::VertexInput => {
                    line.push_str(&format!(" [[attribute({i})]]"));
                }
                StructRole::VertexOutput | StructRole::FragmentInput => {
                    if field.semantic == Some(refract_model::Semantic::SystemPosition) {
                        line.push_str(" [[position]]");
                    }
                }
                StructRole::FragmentOutput => {
                    line.push_str(&format!(" [[color({i})]]"));
                }
                StructRole::Plain => {}
            }
            w.line(format!("{line};"));
        }
        w.close_semi();
        w.blank();
        Ok(())
    }

    fn write_resource(
        &self,
        _w: &mut CodeWriter,
        _ctx: &UnitContext<'_>,
        _res: &ResourceDefinition,
    ) -> Result<(), TranslateError> {
        // Resources surface as entry parameters, not globals.
        Ok(())
    }

    fn write_function(
        &self,
        w: &mut CodeWriter,
        ctx: &UnitContext<'_>,
        def: &FunctionDefinition,
    ) -> Result<(), TranslateError> {
        // The compute entry body is inlined into main0 so thread-id
        // builtins can read the kernel parameters.
        if ctx.plan.stage == ShaderStage::Compute && def.function.key == ctx.plan.entry {
            return Ok(());
        }
        let extra = self.resource_params(ctx, false)?;
        emit_function(self, ctx, def, &extra, w)
    }

    fn write_main(&self, w: &mut CodeWriter, ctx: &UnitContext<'_>) -> Result<(), TranslateError> {
        let entry_name = escape_ident(self, &ctx.entry.function.key.method);
        let resources = self.resource_params(ctx, true)?;
        let call_extra = self.resource_args(ctx);

        let call = |user_args: &str| {
            let mut parts: Vec<String> = Vec::new();
            if !user_args.is_empty() {
                parts.push(user_args.to_owned());
            }
            parts.extend(call_extra.iter().cloned());
            format!("{entry_name}({})", parts.join(", "))
        };

        match ctx.interface() {
            StageInterface::Vertex { input, output, .. } => {
                let param = entry_param_name(ctx, 0);
                let mut params = vec![format!(
                    "{} {param} [[stage_in]]",
                    escape_ident(self, &input.name)
                )];
                params.extend(resources);
                w.open(format!(
                    "vertex {} main0({})",
                    escape_ident(self, &output.name),
                    params.join(", ")
                ));
                w.line(format!("return {};", call(&param)));
                w.close();
            }
            StageInterface::Fragment { input, output, .. } => {
                let mut params = Vec::new();
                let user_args = match input {
                    Some(input) => {
                        let param = entry_param_name(ctx, 0);
                        params.push(format!(
                            "{} {param} [[stage_in]]",
                            escape_ident(self, &input.name)
                        ));
                        param
                    }
                    None => String::new(),
                };
                params.extend(resources);
                let params = params.join(", ");
                match output {
                    FragmentOutput::Color => {
                        w.open(format!("fragment float4 main0({params})"));
                        w.line(format!("return {};", call(&user_args)));
                    }
                    FragmentOutput::None => {
                        w.open(format!("fragment void main0({params})"));
                        w.line(format!("{};", call(&user_args)));
                    }
                    FragmentOutput::Targets(structure) => {
                        w.open(format!(
                            "fragment {} main0({params})",
                            escape_ident(self, &structure.name)
                        ));
                        w.line(format!("return {};", call(&user_args)));
                    }
                }
                w.close();
            }
            StageInterface::Compute => {
                let (dispatch, group) = thread_ids_used(&ctx.entry.body);
                let mut params = resources;
                if dispatch {
                    params.push("uint3 _dispatch_id [[thread_position_in_grid]]".to_owned());
                }
                if group {
                    params.push(
                        "uint3 _group_thread_id [[thread_position_in_threadgroup]]".to_owned(),
                    );
                }
                w.open(format!("kernel void main0({})", params.join(", ")));
                Translator::new(self, ctx).block(&ctx.entry.body, w)?;
                w.close();
            }
        }
        Ok(())
    }
}

fn entry_param_name(ctx: &UnitContext<'_>, i: usize) -> String {
    ctx.entry
        .function
        .parameters
        .get(i)
        .map(|p| escape_ident(&MetalDialect, &p.name))
        .unwrap_or_else(|| "input_".to_owned())
}

/// The Metal backend.
#[derive(Debug, Default)]
pub struct MetalBackend {
    dialect: MetalDialect,
}

impl MetalBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self {
            dialect: MetalDialect,
        }
    }
}

impl ShaderBackend for MetalBackend {
    fn name(&self) -> &str {
        "metal"
    }

    fn targets(&self) -> &[&str] {
        &["metal", "msl"]
    }

    fn file_extension(&self) -> &'static str {
        "metal"
    }

    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }
}
