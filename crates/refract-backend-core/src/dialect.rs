//! The per-dialect strategy surface.
//!
//! Every target language implements [`Dialect`]: a set of small
//! strategy tables and declaration emitters consumed by the shared
//! translator and generation pipeline. The pipeline order is fixed;
//! only the syntax each step emits varies per dialect.

use std::fmt;

use refract_discovery::{
    visit_exprs, ResourceDefinition, ResourceRegistry, StageInterface, StagePlan,
};
use refract_model::{
    Block, Expr, ExprKind, FieldDefinition, FunctionDefinition, FunctionKey, Intrinsic,
    ProgramModel, ShaderType, StructureDefinition,
};

use crate::error::TranslateError;
use crate::writer::CodeWriter;

/// How a structure is used within one generated source unit. Dialects
/// that annotate stage-interface fields (semantics, attributes) key off
/// this; the GLSL family ignores it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructRole {
    /// An ordinary data structure.
    Plain,
    /// The vertex entry point's input structure.
    VertexInput,
    /// The vertex entry point's output structure.
    VertexOutput,
    /// The fragment entry point's input structure.
    FragmentInput,
    /// The fragment entry point's composite output structure.
    FragmentOutput,
}

/// Everything a dialect sees while generating one source unit.
pub struct UnitContext<'a> {
    /// The read-only program model.
    pub model: &'a dyn ProgramModel,
    /// Shader set name.
    pub set_name: &'a str,
    /// The stage plan being emitted.
    pub plan: &'a StagePlan,
    /// The set-wide resource registry.
    pub registry: &'a ResourceRegistry,
    /// The entry point definition.
    pub entry: &'a FunctionDefinition,
}

impl UnitContext<'_> {
    /// The validated stage interface.
    pub fn interface(&self) -> &StageInterface {
        &self.plan.interface
    }

    /// The role `structure` plays in this unit.
    pub fn struct_role(&self, structure: &str) -> StructRole {
        match self.interface() {
            StageInterface::Vertex { input, output, .. } => {
                if structure == input.name {
                    StructRole::VertexInput
                } else if structure == output.name {
                    StructRole::VertexOutput
                } else {
                    StructRole::Plain
                }
            }
            StageInterface::Fragment { input, output, .. } => {
                if input.as_ref().is_some_and(|s| s.name == structure) {
                    StructRole::FragmentInput
                } else if matches!(output, refract_discovery::FragmentOutput::Targets(s) if s.name == structure)
                {
                    StructRole::FragmentOutput
                } else {
                    StructRole::Plain
                }
            }
            StageInterface::Compute => StructRole::Plain,
        }
    }
}

/// A built-in invocation handed to a dialect's intrinsic table.
pub struct IntrinsicCall<'a> {
    /// Which built-in.
    pub intrinsic: Intrinsic,
    /// Translated argument text, in order.
    pub args: Vec<String>,
    /// The original argument expressions (for type dispatch).
    pub arg_exprs: &'a [Expr],
    /// The set-wide registry (for texture kind and shadow lookups).
    pub registry: &'a ResourceRegistry,
}

impl IntrinsicCall<'_> {
    /// The registered resource behind argument `i`, if that argument is
    /// a direct resource reference.
    pub fn resource_arg(&self, i: usize) -> Option<&ResourceDefinition> {
        match &self.arg_exprs.get(i)?.kind {
            ExprKind::Resource(name) => self.registry.get(name),
            _ => None,
        }
    }

    /// The resolved type of argument `i`.
    pub fn arg_type(&self, i: usize) -> Option<&ShaderType> {
        self.arg_exprs.get(i).map(|e| &e.ty)
    }
}

/// One target shading language: its name/type/intrinsic tables and
/// declaration syntax.
///
/// Implementations are immutable table holders constructed once at
/// startup and shared by reference across concurrent generation tasks.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Dialect name for diagnostics (e.g. "HLSL", "GLSL450").
    fn name(&self) -> &'static str;

    /// Target type name for a value type.
    fn type_name(&self, ty: &ShaderType) -> Result<String, TranslateError>;

    /// Identifiers that must not be emitted verbatim.
    fn reserved_words(&self) -> &'static [&'static str];

    /// Target accessor for a zero-based matrix element.
    fn matrix_element(&self, row: u32, col: u32) -> String;

    /// Prefix applied to the exposed field of a block-based uniform or
    /// buffer declaration, to keep it from colliding with the block
    /// name. Empty for dialects without blocks.
    fn uniform_field_prefix(&self) -> &'static str {
        ""
    }

    /// Whether int/float operand mixes need explicit conversions.
    fn requires_int_float_coercion(&self) -> bool {
        false
    }

    /// Whether multisampled textures are expressible at all.
    fn supports_multisample_textures(&self) -> bool {
        true
    }

    /// Name of the synthesized stage entry function.
    fn entry_point_name(&self) -> &'static str {
        "main"
    }

    /// How an expression referencing `res` reads inside function bodies.
    fn resource_ref(&self, res: &ResourceDefinition) -> String;

    /// Composite construction syntax.
    fn construct(&self, ty: &ShaderType, args: &[String]) -> Result<String, TranslateError>;

    /// Numeric conversion syntax.
    fn cast(&self, ty: &ShaderType, operand: &str) -> Result<String, TranslateError>;

    /// Built-in translation table.
    fn intrinsic(&self, call: &IntrinsicCall<'_>) -> Result<String, TranslateError>;

    /// A call to a user-defined helper function.
    fn user_call(
        &self,
        ctx: &UnitContext<'_>,
        function: &FunctionKey,
        args: Vec<String>,
    ) -> String {
        let _ = ctx;
        format!(
            "{}({})",
            escape_ident(self, &function.method),
            args.join(", ")
        )
    }

    /// Version/header preamble for this unit.
    fn write_preamble(&self, w: &mut CodeWriter, ctx: &UnitContext<'_>);

    /// One structure declaration.
    fn write_structure(
        &self,
        w: &mut CodeWriter,
        structure: &StructureDefinition,
        role: StructRole,
    ) -> Result<(), TranslateError>;

    /// One resource declaration.
    fn write_resource(
        &self,
        w: &mut CodeWriter,
        ctx: &UnitContext<'_>,
        res: &ResourceDefinition,
    ) -> Result<(), TranslateError>;

    /// One translated user function (signature plus body).
    fn write_function(
        &self,
        w: &mut CodeWriter,
        ctx: &UnitContext<'_>,
        def: &FunctionDefinition,
    ) -> Result<(), TranslateError>;

    /// The synthesized stage `main`.
    fn write_main(&self, w: &mut CodeWriter, ctx: &UnitContext<'_>)
        -> Result<(), TranslateError>;
}

/// Escapes an identifier that collides with a dialect's reserved words
/// by suffixing an underscore. Deterministic and not user-configurable.
pub fn escape_ident(dialect: &(impl Dialect + ?Sized), ident: &str) -> String {
    if dialect.reserved_words().contains(&ident) {
        format!("{ident}_")
    } else {
        ident.to_owned()
    }
}

/// Formats a float literal so every dialect parses it as floating
/// point (a bare `1` would be integral).
pub fn format_float(value: f32) -> String {
    let text = format!("{value}");
    if text.contains('.') || text.contains('e') || text.contains("inf") || text.contains("NaN")
    {
        text
    } else {
        format!("{text}.0")
    }
}

/// Renders a local/field declaration, folding fixed-size arrays into
/// C-style suffix syntax shared by all four dialects.
pub fn declaration(
    dialect: &(impl Dialect + ?Sized),
    ty: &ShaderType,
    name: &str,
) -> Result<String, TranslateError> {
    match ty {
        ShaderType::Array { element, length } => Ok(format!(
            "{} {}[{}]",
            dialect.type_name(element)?,
            name,
            length
        )),
        _ => Ok(format!("{} {}", dialect.type_name(ty)?, name)),
    }
}

/// The declared type of a structure field, folding an inline array
/// length into an array type. Frontends that already resolve the field
/// to an array type pass through unchanged.
pub fn field_type(field: &FieldDefinition) -> ShaderType {
    match field.array_length {
        Some(length) if !matches!(field.ty, ShaderType::Array { .. }) => ShaderType::Array {
            element: Box::new(field.ty.clone()),
            length,
        },
        _ => field.ty.clone(),
    }
}

/// Which thread-id builtins a compute entry body reads, as
/// `(dispatch, group)` flags.
pub fn thread_ids_used(body: &Block) -> (bool, bool) {
    let mut dispatch = false;
    let mut group = false;
    visit_exprs(body, &mut |e| {
        if let ExprKind::Intrinsic { intrinsic, .. } = &e.kind {
            match intrinsic {
                Intrinsic::DispatchThreadId => dispatch = true,
                Intrinsic::GroupThreadId => group = true,
                _ => {}
            }
        }
    });
    (dispatch, group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_formatting() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(-2.0), "-2.0");
        assert_eq!(format_float(1.25e10), "12500000000.0");
    }
}
