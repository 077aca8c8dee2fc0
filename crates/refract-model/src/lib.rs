//! Resolved program model for the refract shader transpiler.
//!
//! The transpiler never parses host-language source text. Instead it
//! consumes an already type-resolved view of the program through the
//! [`ProgramModel`] trait: shader entry points, user-defined functions
//! with fully typed bodies, structure definitions, and resource fields.
//! Frontends (and tests) build that view with [`ShaderModelBuilder`].

mod ast;
mod func;
mod model;
mod resource;
mod semantics;
mod structure;
mod types;

pub use ast::{BinaryOp, Block, Expr, ExprKind, Intrinsic, Literal, Stmt, UnaryOp};
pub use func::{
    FunctionDefinition, FunctionKey, ParameterDefinition, ShaderFunction, ShaderStage,
};
pub use model::{ProgramModel, ShaderModel, ShaderModelBuilder, ShaderSetSource};
pub use resource::{ResourceField, ResourceKind, ResourceLayout};
pub use semantics::Semantic;
pub use structure::{FieldDefinition, StructureDefinition};
pub use types::{ScalarKind, ShaderType, VectorSize};
