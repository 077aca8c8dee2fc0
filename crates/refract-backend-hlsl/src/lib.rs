#![warn(missing_docs)]
//! HLSL shader generation for Direct3D 11.
//!
//! Resources become global declarations with per-class register slots
//! (`b` for constant buffers, `t` for shader resource views, `s` for
//! samplers, `u` for unordered access views), stage interfaces keep
//! their structure shape with HLSL semantics on the fields, and the
//! synthesized `main` wraps the translated entry point.

use refract_backend_core::{
    declaration, emit_function, escape_ident, field_type, thread_ids_used, CodeWriter, Dialect,
    IntrinsicCall, ShaderBackend, StructRole, TranslateError, Translator, UnitContext,
};
use refract_discovery::{FragmentOutput, ResourceDefinition, ResourceRegistry, StageInterface};
use refract_model::{
    Intrinsic, ResourceKind, ScalarKind, Semantic, ShaderStage, ShaderType, StructureDefinition,
};

/// HLSL keywords plus the names the synthesized wrapper claims.
const RESERVED: &[&str] = &[
    "main", "_dispatch_id", "_group_thread_id", "bool", "int", "uint", "dword", "half", "float",
    "double", "void", "true", "false", "if", "else", "for", "while", "do", "switch", "case",
    "default", "break", "continue", "return", "discard", "struct", "cbuffer", "tbuffer",
    "register", "packoffset", "in", "out", "inout", "uniform", "static", "const", "row_major",
    "column_major", "sampler", "SamplerState", "SamplerComparisonState", "Texture1D", "Texture2D",
    "Texture3D", "TextureCube", "Texture2DArray", "Texture2DMS", "StructuredBuffer",
    "RWStructuredBuffer", "ByteAddressBuffer", "matrix", "vector", "linear", "centroid",
    "nointerpolation", "noperspective", "point", "line", "technique", "pass", "string",
];

/// The register class letter a resource kind binds through.
fn register_class(kind: ResourceKind) -> char {
    match kind {
        ResourceKind::Uniform => 'b',
        ResourceKind::Sampler => 's',
        ResourceKind::RWStructuredBuffer => 'u',
        _ => 't',
    }
}

/// The register slot for `res`: resources share a class counter in
/// registry order, so slots are identical for every stage of a set.
fn register_slot(registry: &ResourceRegistry, res: &ResourceDefinition) -> u32 {
    let class = register_class(res.kind);
    registry
        .resources()
        .iter()
        .take_while(|r| r.name != res.name)
        .filter(|r| register_class(r.kind) == class)
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

/// Maps one field semantic, advancing the per-structure counters.
fn semantic_name(semantic: Semantic, counters: &mut [u32; 5], targets: &mut u32) -> String {
    let indexed = |name: &str, slot: &mut u32| {
        let n = *slot;
        *slot += 1;
        format!("{name}{n}")
    };
    match semantic {
        Semantic::Position => indexed("POSITION", &mut counters[0]),
        Semantic::Normal => indexed("NORMAL", &mut counters[1]),
        Semantic::TextureCoordinate => indexed("TEXCOORD", &mut counters[2]),
        Semantic::Color => indexed("COLOR", &mut counters[3]),
        Semantic::Tangent => indexed("TANGENT", &mut counters[4]),
        Semantic::SystemPosition => "SV_Position".to_owned(),
        Semantic::ColorTarget => indexed("SV_Target", targets),
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

/// The HLSL dialect tables.
#[derive(Debug, Default)]
pub struct HlslDialect;

impl Dialect for HlslDialect {
    fn name(&self) -> &'static str {
        "HLSL"
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
        format!("._m{row}{col}")
    }

    fn resource_ref(&self, res: &ResourceDefinition) -> String {
        escape_ident(self, &res.name)
    }

    fn construct(&self, ty: &ShaderType, args: &[String]) -> Result<String, TranslateError> {
        match ty {
            ShaderType::Vector { .. } | ShaderType::Matrix4x4 => {
                Ok(format!("{}({})", self.type_name(ty)?, args.join(", ")))
            }
            _ => Err(TranslateError::UnsupportedConstruct {
                reason: format!("HLSL cannot construct {ty:?} inline"),
            }),
        }
    }

    fn cast(&self, ty: &ShaderType, operand: &str) -> Result<String, TranslateError> {
        Ok(format!("(({})({operand}))", self.type_name(ty)?))
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
            Intrinsic::Ddx => named("ddx"),
            Intrinsic::Ddy => named("ddy"),
            Intrinsic::Discard => "discard".to_owned(),
            Intrinsic::Distance => named("distance"),
            Intrinsic::Dot => named("dot"),
            Intrinsic::Floor => named("floor"),
            Intrinsic::Frac => named("frac"),
            Intrinsic::Length => named("length"),
            Intrinsic::Lerp => named("lerp"),
            Intrinsic::Load => format!(
                "{}.Load({}, {})",
                arg(call, 0)?,
                arg(call, 1)?,
                arg(call, 2)?
            ),
            Intrinsic::Max => named("max"),
            Intrinsic::Min => named("min"),
            Intrinsic::Mod => named("fmod"),
            Intrinsic::Mul => format!("mul({}, {})", arg(call, 0)?, arg(call, 1)?),
            Intrinsic::Normalize => named("normalize"),
            Intrinsic::Pow => named("pow"),
            Intrinsic::Reflect => named("reflect"),
            Intrinsic::Round => named("round"),
            Intrinsic::Sample => format!(
                "{}.Sample({}, {})",
                arg(call, 0)?,
                arg(call, 1)?,
                arg(call, 2)?
            ),
            Intrinsic::SampleGrad => format!(
                "{}.SampleGrad({}, {}, {}, {})",
                arg(call, 0)?,
                arg(call, 1)?,
                arg(call, 2)?,
                arg(call, 3)?,
                arg(call, 4)?
            ),
            Intrinsic::SampleCmpLevelZero => format!(
                "{}.SampleCmpLevelZero({}, {}, {})",
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

    fn write_preamble(&self, _w: &mut CodeWriter, _ctx: &UnitContext<'_>) {}

    fn write_structure(
        &self,
        w: &mut CodeWriter,
        structure: &StructureDefinition,
        _role: StructRole,
    ) -> Result<(), TranslateError> {
        let mut counters = [0u32; 5];
        let mut targets = 0u32;
        w.open(format!("struct {}", escape_ident(self, &structure.name)));
        for field in &structure.fields {
            let mut line =
                declaration(self, &field_type(field), &escape_ident(self, &field.name))?;
            if let Some(semantic) = field.semantic {
                line.push_str(&format!(
                    " : {}",
                    semantic_name(semantic, &mut counters, &mut targets)
                ));
            }
            w.line(format!("{line};"));
        }
        w.close_semi();
        w.blank();
        Ok(())
    }

    fn write_resource(
        &self,
        w: &mut CodeWriter,
        ctx: &UnitContext<'_>,
        res: &ResourceDefinition,
    ) -> Result<(), TranslateError> {
        let name = escape_ident(self, &res.name);
        let slot = register_slot(ctx.registry, res);
        match res.kind {
            ResourceKind::Uniform => {
                w.open(format!("cbuffer {name}Buffer : register(b{slot})"));
                w.line(format!("{};", declaration(self, &res.value_type, &name)?));
                w.close();
            }
            ResourceKind::Texture2D => w.line(format!("Texture2D {name} : register(t{slot});")),
            ResourceKind::TextureCube => {
                w.line(format!("TextureCube {name} : register(t{slot});"));
            }
            ResourceKind::Texture2DArray => {
                w.line(format!("Texture2DArray {name} : register(t{slot});"));
            }
            ResourceKind::Texture2DMS => {
                w.line(format!("Texture2DMS<float4> {name} : register(t{slot});"));
            }
            ResourceKind::Sampler => {
                let ty = if res.shadow_sampled {
                    "SamplerComparisonState"
                } else {
                    "SamplerState"
                };
                w.line(format!("{ty} {name} : register(s{slot});"));
            }
            ResourceKind::StructuredBuffer => w.line(format!(
                "StructuredBuffer<{}> {name} : register(t{slot});",
                self.type_name(&res.value_type)?
            )),
            ResourceKind::RWStructuredBuffer => w.line(format!(
                "RWStructuredBuffer<{}> {name} : register(u{slot});",
                self.type_name(&res.value_type)?
            )),
        }
        w.blank();
        Ok(())
    }

    fn write_function(
        &self,
        w: &mut CodeWriter,
        ctx: &UnitContext<'_>,
        def: &refract_model::FunctionDefinition,
    ) -> Result<(), TranslateError> {
        // The compute entry body is inlined into main so thread-id
        // builtins can read the SV_* parameters.
        if ctx.plan.stage == ShaderStage::Compute && def.function.key == ctx.plan.entry {
            return Ok(());
        }
        emit_function(self, ctx, def, &[], w)
    }

    fn write_main(&self, w: &mut CodeWriter, ctx: &UnitContext<'_>) -> Result<(), TranslateError> {
        let entry_name = escape_ident(self, &ctx.entry.function.key.method);
        match ctx.interface() {
            StageInterface::Vertex { input, output, .. } => {
                let param = entry_param_name(ctx, 0);
                w.open(format!(
                    "{} main({} {param})",
                    escape_ident(self, &output.name),
                    escape_ident(self, &input.name)
                ));
                w.line(format!("return {entry_name}({param});"));
                w.close();
            }
            StageInterface::Fragment { input, output, .. } => {
                let (params, args) = match input {
                    Some(input) => {
                        let param = entry_param_name(ctx, 0);
                        (
                            format!("{} {param}", escape_ident(self, &input.name)),
                            param,
                        )
                    }
                    None => (String::new(), String::new()),
                };
                match output {
                    FragmentOutput::Color => {
                        w.open(format!("float4 main({params}) : SV_Target"));
                        w.line(format!("return {entry_name}({args});"));
                    }
                    FragmentOutput::None => {
                        w.open(format!("void main({params})"));
                        w.line(format!("{entry_name}({args});"));
                    }
                    FragmentOutput::Targets(structure) => {
                        w.open(format!(
                            "{} main({params})",
                            escape_ident(self, &structure.name)
                        ));
                        w.line(format!("return {entry_name}({args});"));
                    }
                }
                w.close();
            }
            StageInterface::Compute => {
                let [x, y, z] = ctx.entry.function.group_size;
                let (dispatch, group) = thread_ids_used(&ctx.entry.body);
                let mut params = Vec::new();
                if dispatch {
                    params.push("uint3 _dispatch_id : SV_DispatchThreadID".to_owned());
                }
                if group {
                    params.push("uint3 _group_thread_id : SV_GroupThreadID".to_owned());
                }
                w.line(format!("[numthreads({x}, {y}, {z})]"));
                w.open(format!("void main({})", params.join(", ")));
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
        .map(|p| escape_ident(&HlslDialect, &p.name))
        .unwrap_or_else(|| "input_".to_owned())
}

/// The HLSL backend.
#[derive(Debug, Default)]
pub struct HlslBackend {
    dialect: HlslDialect,
}

impl HlslBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self {
            dialect: HlslDialect,
        }
    }
}

impl ShaderBackend for HlslBackend {
    fn name(&self) -> &str {
        "hlsl"
    }

    fn targets(&self) -> &[&str] {
        &["hlsl", "d3d11"]
    }

    fn file_extension(&self) -> &'static str {
        "hlsl"
    }

    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }
}
