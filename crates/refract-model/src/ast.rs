//! Typed statement/expression trees for resolved function bodies.
//!
//! The frontend resolves symbols and types before handing bodies over,
//! so every expression node carries its resolved [`ShaderType`]. The
//! translator never infers types; it only reads them.

use std::fmt;

use crate::func::FunctionKey;
use crate::types::ShaderType;

/// A literal constant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    /// Boolean literal.
    Bool(bool),
    /// Signed integer literal.
    Int(i32),
    /// Unsigned integer literal.
    UInt(u32),
    /// Float literal.
    Float(f32),
}

/// A unary operator.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Negate,
    /// Logical not.
    Not,
}

/// A binary operator.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// The operator's surface syntax, identical in all target dialects.
    pub fn token(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// A built-in shader function.
///
/// These are leaves of the call graph: they never expand discovery and
/// are rewritten per backend by its intrinsic table.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Intrinsic {
    Abs,
    Acos,
    Asin,
    Atan,
    Atan2,
    Ceil,
    Clamp,
    Cos,
    Cross,
    Ddx,
    Ddy,
    Discard,
    Distance,
    Dot,
    Floor,
    Frac,
    Length,
    Lerp,
    /// Multisampled texture load: `(texture2dms, coord ivec2, sample index)`.
    Load,
    Max,
    Min,
    Mod,
    /// Matrix product: `(matrix, matrix-or-vector)`.
    Mul,
    Normalize,
    Pow,
    Reflect,
    Round,
    /// Texture sample: `(texture, sampler, coordinates)`.
    Sample,
    /// Texture sample with explicit gradients:
    /// `(texture, sampler, coordinates, ddx, ddy)`.
    SampleGrad,
    /// Depth-comparison sample at mip zero:
    /// `(texture, sampler, coordinates, compare value)`.
    SampleCmpLevelZero,
    Saturate,
    Sin,
    SmoothStep,
    Sqrt,
    Tan,
    Truncate,
    /// Global dispatch thread id (compute entry body only).
    DispatchThreadId,
    /// Thread id within the local workgroup (compute entry body only).
    GroupThreadId,
}

impl Intrinsic {
    /// Returns `true` for the compute thread-id values.
    pub fn is_thread_id(self) -> bool {
        matches!(self, Self::DispatchThreadId | Self::GroupThreadId)
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The shape of an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// A literal constant.
    Literal(Literal),
    /// A local variable or parameter reference.
    Variable(String),
    /// A reference to a resource field of the shader class.
    Resource(String),
    /// Member access: struct field, vector component/swizzle, or matrix
    /// element (`M11`..`M44`).
    Field {
        /// Accessed value.
        base: Box<Expr>,
        /// Host-side member name.
        member: String,
    },
    /// Indexing into an array or structured buffer.
    Index {
        /// Indexed value.
        base: Box<Expr>,
        /// Element index.
        index: Box<Expr>,
    },
    /// A unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// A binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Construction of a vector, matrix, or struct from components;
    /// the result type is the expression's type.
    Construct(Vec<Expr>),
    /// Numeric conversion to the expression's type.
    Cast(Box<Expr>),
    /// A built-in invocation.
    Intrinsic {
        /// Which built-in.
        intrinsic: Intrinsic,
        /// Arguments.
        args: Vec<Expr>,
    },
    /// A call to another user-defined function.
    CallUser {
        /// Callee identity.
        function: FunctionKey,
        /// Arguments.
        args: Vec<Expr>,
    },
}

/// A resolved expression: shape plus resolved result type.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    /// Resolved result type.
    pub ty: ShaderType,
    /// Expression shape.
    pub kind: ExprKind,
}

impl Expr {
    /// A float literal.
    pub fn float(value: f32) -> Self {
        Self {
            ty: ShaderType::FLOAT,
            kind: ExprKind::Literal(Literal::Float(value)),
        }
    }

    /// A signed integer literal.
    pub fn int(value: i32) -> Self {
        Self {
            ty: ShaderType::INT,
            kind: ExprKind::Literal(Literal::Int(value)),
        }
    }

    /// An unsigned integer literal.
    pub fn uint(value: u32) -> Self {
        Self {
            ty: ShaderType::UINT,
            kind: ExprKind::Literal(Literal::UInt(value)),
        }
    }

    /// A variable reference.
    pub fn var(ty: ShaderType, name: impl Into<String>) -> Self {
        Self {
            ty,
            kind: ExprKind::Variable(name.into()),
        }
    }

    /// A resource-field reference.
    pub fn resource(ty: ShaderType, name: impl Into<String>) -> Self {
        Self {
            ty,
            kind: ExprKind::Resource(name.into()),
        }
    }

    /// Member access.
    pub fn field(ty: ShaderType, base: Expr, member: impl Into<String>) -> Self {
        Self {
            ty,
            kind: ExprKind::Field {
                base: Box::new(base),
                member: member.into(),
            },
        }
    }

    /// Indexing.
    pub fn index(ty: ShaderType, base: Expr, index: Expr) -> Self {
        Self {
            ty,
            kind: ExprKind::Index {
                base: Box::new(base),
                index: Box::new(index),
            },
        }
    }

    /// A binary operation.
    pub fn binary(ty: ShaderType, op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self {
            ty,
            kind: ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    /// A unary operation.
    pub fn unary(ty: ShaderType, op: UnaryOp, operand: Expr) -> Self {
        Self {
            ty,
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
        }
    }

    /// Construction of a composite value.
    pub fn construct(ty: ShaderType, args: Vec<Expr>) -> Self {
        Self {
            ty,
            kind: ExprKind::Construct(args),
        }
    }

    /// Numeric conversion.
    pub fn cast(ty: ShaderType, operand: Expr) -> Self {
        Self {
            ty,
            kind: ExprKind::Cast(Box::new(operand)),
        }
    }

    /// A built-in invocation.
    pub fn intrinsic(ty: ShaderType, intrinsic: Intrinsic, args: Vec<Expr>) -> Self {
        Self {
            ty,
            kind: ExprKind::Intrinsic { intrinsic, args },
        }
    }

    /// A user-function call.
    pub fn call(ty: ShaderType, function: FunctionKey, args: Vec<Expr>) -> Self {
        Self {
            ty,
            kind: ExprKind::CallUser { function, args },
        }
    }
}

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// A local variable declaration.
    Local {
        /// Variable name.
        name: String,
        /// Declared type.
        ty: ShaderType,
        /// Optional initializer.
        init: Option<Expr>,
    },
    /// An assignment to an lvalue expression.
    Assign {
        /// Assignment target.
        target: Expr,
        /// Assigned value.
        value: Expr,
    },
    /// An expression evaluated for its side effects.
    Expression(Expr),
    /// A conditional.
    If {
        /// Branch condition.
        condition: Expr,
        /// Taken when the condition holds.
        then_block: Block,
        /// Taken otherwise, if present.
        else_block: Option<Block>,
    },
    /// A `for` loop with declaration, condition, and step.
    For {
        /// Loop variable initializer.
        init: Box<Stmt>,
        /// Loop condition.
        condition: Expr,
        /// Per-iteration step.
        step: Box<Stmt>,
        /// Loop body.
        body: Block,
    },
    /// A `while` loop.
    While {
        /// Loop condition.
        condition: Expr,
        /// Loop body.
        body: Block,
    },
    /// Return from the function.
    Return(Option<Expr>),
}

/// A sequence of statements.
pub type Block = Vec<Stmt>;
