//! The shared statement/expression translator.
//!
//! One traversal serves all dialects; everything syntax-specific is
//! delegated to the active [`Dialect`]'s tables. Numeric coercion is
//! inserted here, at binary-expression and call-argument boundaries,
//! for dialects that lack implicit int/float promotion.

use refract_model::{
    Block, Expr, ExprKind, FunctionDefinition, Literal, ScalarKind, ShaderType, Stmt, UnaryOp,
};

use crate::dialect::{declaration, escape_ident, format_float, Dialect, IntrinsicCall, UnitContext};
use crate::error::TranslateError;
use crate::writer::CodeWriter;

/// Translates resolved bodies into one dialect's statement syntax.
pub struct Translator<'a> {
    dialect: &'a dyn Dialect,
    ctx: &'a UnitContext<'a>,
}

impl<'a> Translator<'a> {
    /// Creates a translator for one generation unit.
    pub fn new(dialect: &'a dyn Dialect, ctx: &'a UnitContext<'a>) -> Self {
        Self { dialect, ctx }
    }

    /// Escapes an identifier against the dialect's reserved words.
    pub fn escape(&self, ident: &str) -> String {
        escape_ident(self.dialect, ident)
    }

    /// Emits a whole block, one statement per line.
    pub fn block(&self, block: &Block, w: &mut CodeWriter) -> Result<(), TranslateError> {
        for stmt in block {
            self.stmt(stmt, w)?;
        }
        Ok(())
    }

    fn stmt(&self, stmt: &Stmt, w: &mut CodeWriter) -> Result<(), TranslateError> {
        match stmt {
            Stmt::Local { .. } | Stmt::Assign { .. } | Stmt::Expression(_) => {
                let text = self.stmt_inline(stmt)?;
                w.line(format!("{text};"));
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
            } => {
                w.open(format!("if ({})", self.expr(condition)?));
                self.block(then_block, w)?;
                w.close();
                if let Some(else_block) = else_block {
                    w.open("else");
                    self.block(else_block, w)?;
                    w.close();
                }
            }
            Stmt::For {
                init,
                condition,
                step,
                body,
            } => {
                w.open(format!(
                    "for ({}; {}; {})",
                    self.stmt_inline(init)?,
                    self.expr(condition)?,
                    self.stmt_inline(step)?
                ));
                self.block(body, w)?;
                w.close();
            }
            Stmt::While { condition, body } => {
                w.open(format!("while ({})", self.expr(condition)?));
                self.block(body, w)?;
                w.close();
            }
            Stmt::Return(value) => match value {
                Some(value) => w.line(format!("return {};", self.expr(value)?)),
                None => w.line("return;"),
            },
        }
        Ok(())
    }

    /// Renders a simple statement without the trailing semicolon, for
    /// both plain statement lines and `for` headers.
    fn stmt_inline(&self, stmt: &Stmt) -> Result<String, TranslateError> {
        match stmt {
            Stmt::Local { name, ty, init } => {
                let decl = declaration(self.dialect, ty, &self.escape(name))?;
                match init {
                    Some(init) => Ok(format!("{decl} = {}", self.expr(init)?)),
                    None => Ok(decl),
                }
            }
            Stmt::Assign { target, value } => Ok(format!(
                "{} = {}",
                self.expr(target)?,
                self.expr(value)?
            )),
            Stmt::Expression(expr) => self.expr(expr),
            _ => Err(TranslateError::UnsupportedConstruct {
                reason: "compound statement in expression position".into(),
            }),
        }
    }

    /// Translates one expression to target text.
    pub fn expr(&self, e: &Expr) -> Result<String, TranslateError> {
        match &e.kind {
            ExprKind::Literal(lit) => Ok(match lit {
                Literal::Bool(v) => format!("{v}"),
                Literal::Int(v) => format!("{v}"),
                Literal::UInt(v) => format!("{v}u"),
                Literal::Float(v) => format_float(*v),
            }),
            ExprKind::Variable(name) => Ok(self.escape(name)),
            ExprKind::Resource(name) => {
                let res = self
                    .ctx
                    .registry
                    .get(name)
                    .ok_or_else(|| TranslateError::UnknownResource { name: name.clone() })?;
                Ok(self.dialect.resource_ref(res))
            }
            ExprKind::Field { base, member } => self.field(base, member),
            ExprKind::Index { base, index } => Ok(format!(
                "{}[{}]",
                self.expr(base)?,
                self.expr(index)?
            )),
            ExprKind::Unary { op, operand } => {
                let token = match op {
                    UnaryOp::Negate => "-",
                    UnaryOp::Not => "!",
                };
                Ok(format!("{token}({})", self.expr(operand)?))
            }
            ExprKind::Binary { op, left, right } => {
                let (l, r) = self.coerce_pair(left, right)?;
                Ok(format!("({l} {} {r})", op.token()))
            }
            ExprKind::Construct(args) => {
                let parts = args
                    .iter()
                    .map(|a| self.expr(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.dialect.construct(&e.ty, &parts)
            }
            ExprKind::Cast(operand) => {
                let inner = self.expr(operand)?;
                self.dialect.cast(&e.ty, &inner)
            }
            ExprKind::Intrinsic { intrinsic, args } => {
                let parts = args
                    .iter()
                    .map(|a| self.expr(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.dialect.intrinsic(&IntrinsicCall {
                    intrinsic: *intrinsic,
                    args: parts,
                    arg_exprs: args,
                    registry: self.ctx.registry,
                })
            }
            ExprKind::CallUser { function, args } => {
                let callee = self.ctx.model.function(function);
                let mut parts = Vec::with_capacity(args.len());
                for (i, arg) in args.iter().enumerate() {
                    let mut text = self.expr(arg)?;
                    if let Some(param_ty) = callee
                        .and_then(|c| c.function.parameters.get(i))
                        .map(|p| &p.ty)
                    {
                        text = self.coerce_to(arg, text, param_ty)?;
                    }
                    parts.push(text);
                }
                Ok(self.dialect.user_call(self.ctx, function, parts))
            }
        }
    }

    fn field(&self, base: &Expr, member: &str) -> Result<String, TranslateError> {
        let base_text = self.expr(base)?;
        match &base.ty {
            ShaderType::Vector { .. } => {
                let mut swizzle = String::with_capacity(member.len());
                for c in member.chars() {
                    match c {
                        'X' | 'x' => swizzle.push('x'),
                        'Y' | 'y' => swizzle.push('y'),
                        'Z' | 'z' => swizzle.push('z'),
                        'W' | 'w' => swizzle.push('w'),
                        _ => {
                            return Err(TranslateError::InvalidMember {
                                member: member.to_owned(),
                                ty: base.ty.clone(),
                            })
                        }
                    }
                }
                Ok(format!("{base_text}.{swizzle}"))
            }
            ShaderType::Matrix4x4 => {
                let element = parse_matrix_member(member).ok_or_else(|| {
                    TranslateError::InvalidMember {
                        member: member.to_owned(),
                        ty: base.ty.clone(),
                    }
                })?;
                let (row, col) = element;
                Ok(format!(
                    "{base_text}{}",
                    self.dialect.matrix_element(row, col)
                ))
            }
            ShaderType::Struct(_) => Ok(format!("{base_text}.{}", self.escape(member))),
            other => Err(TranslateError::InvalidMember {
                member: member.to_owned(),
                ty: other.clone(),
            }),
        }
    }

    /// Coerces both operands of a binary expression to agree on
    /// integerness when the dialect demands it.
    fn coerce_pair(&self, left: &Expr, right: &Expr) -> Result<(String, String), TranslateError> {
        let l = self.expr(left)?;
        let r = self.expr(right)?;
        if !self.dialect.requires_int_float_coercion() {
            return Ok((l, r));
        }
        if left.ty.is_integer() && right.ty.is_float() {
            let l = self.dialect.cast(&float_version(&left.ty), &l)?;
            return Ok((l, r));
        }
        if left.ty.is_float() && right.ty.is_integer() {
            let r = self.dialect.cast(&float_version(&right.ty), &r)?;
            return Ok((l, r));
        }
        Ok((l, r))
    }

    /// Coerces a call argument to the callee's declared parameter type
    /// when their integerness differs.
    fn coerce_to(
        &self,
        arg: &Expr,
        text: String,
        param_ty: &ShaderType,
    ) -> Result<String, TranslateError> {
        if !self.dialect.requires_int_float_coercion() {
            return Ok(text);
        }
        let mismatched = (arg.ty.is_integer() && param_ty.is_float())
            || (arg.ty.is_float() && param_ty.is_integer());
        if mismatched {
            self.dialect.cast(param_ty, &text)
        } else {
            Ok(text)
        }
    }
}

/// Parses a host matrix member name (`M11`..`M44`, one-based) into a
/// zero-based (row, column) pair.
fn parse_matrix_member(member: &str) -> Option<(u32, u32)> {
    let mut chars = member.chars();
    if chars.next()? != 'M' {
        return None;
    }
    let row = chars.next()?.to_digit(10)?;
    let col = chars.next()?.to_digit(10)?;
    if chars.next().is_some() || !(1..=4).contains(&row) || !(1..=4).contains(&col) {
        return None;
    }
    Some((row - 1, col - 1))
}

fn float_version(ty: &ShaderType) -> ShaderType {
    match ty {
        ShaderType::Scalar(_) => ShaderType::FLOAT,
        ShaderType::Vector { size, .. } => ShaderType::Vector {
            scalar: ScalarKind::Float,
            size: *size,
        },
        other => other.clone(),
    }
}

/// Renders a C-style function signature shared by the HLSL, GLSL, and
/// Metal families: `ret name(params...)` with optional dialect-supplied
/// trailing parameters.
pub fn function_signature(
    dialect: &dyn Dialect,
    def: &FunctionDefinition,
    extra_params: &[String],
) -> Result<String, TranslateError> {
    let ret = dialect.type_name(&def.function.return_type)?;
    let mut params: Vec<String> = Vec::with_capacity(def.function.parameters.len());
    for p in &def.function.parameters {
        params.push(declaration(dialect, &p.ty, &escape_ident(dialect, &p.name))?);
    }
    params.extend(extra_params.iter().cloned());
    Ok(format!(
        "{ret} {}({})",
        escape_ident(dialect, &def.function.key.method),
        params.join(", ")
    ))
}

/// Emits a full translated function: signature, brace block, body.
pub fn emit_function(
    dialect: &dyn Dialect,
    ctx: &UnitContext<'_>,
    def: &FunctionDefinition,
    extra_params: &[String],
    w: &mut CodeWriter,
) -> Result<(), TranslateError> {
    w.open(function_signature(dialect, def, extra_params)?);
    Translator::new(dialect, ctx).block(&def.body, w)?;
    w.close();
    w.blank();
    Ok(())
}
