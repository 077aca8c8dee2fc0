//! Shader functions and entry points.

use std::fmt;

use crate::ast::Block;
use crate::types::ShaderType;

/// The pipeline stage a function belongs to.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ShaderStage {
    /// A vertex entry point.
    Vertex,
    /// A fragment entry point.
    Fragment,
    /// A compute entry point.
    Compute,
    /// A plain helper function, callable from any stage.
    Normal,
}

impl ShaderStage {
    /// Returns `true` for the entry-point stages.
    pub fn is_entry(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
            Self::Normal => "normal",
        })
    }
}

/// The identity of a user function: declaring type plus method name.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct FunctionKey {
    /// Name of the declaring host type.
    pub type_name: String,
    /// Method name.
    pub method: String,
}

impl FunctionKey {
    /// Creates a key from a declaring type and method name.
    pub fn new(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.method)
    }
}

/// A formal parameter of a shader function.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDefinition {
    /// Parameter name.
    pub name: String,
    /// Resolved parameter type.
    pub ty: ShaderType,
}

impl ParameterDefinition {
    /// Creates a parameter.
    pub fn new(name: impl Into<String>, ty: ShaderType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Metadata of a discovered shader function.
///
/// Identity is the [`FunctionKey`]; immutable once discovered.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderFunction {
    /// Function identity.
    pub key: FunctionKey,
    /// Ordered parameters.
    pub parameters: Vec<ParameterDefinition>,
    /// Resolved return type ([`ShaderType::Void`] for none).
    pub return_type: ShaderType,
    /// Stage kind.
    pub stage: ShaderStage,
    /// Compute workgroup dimensions `[x, y, z]`; `[1, 1, 1]` unless the
    /// function is a compute entry point.
    pub group_size: [u32; 3],
    /// Whether any call site in the body loads from a multisampled
    /// texture. Gates dialects that cannot declare one.
    pub uses_multisample_load: bool,
}

impl ShaderFunction {
    /// A helper (non-entry) function.
    pub fn helper(
        key: FunctionKey,
        parameters: Vec<ParameterDefinition>,
        return_type: ShaderType,
    ) -> Self {
        Self {
            key,
            parameters,
            return_type,
            stage: ShaderStage::Normal,
            group_size: [1, 1, 1],
            uses_multisample_load: false,
        }
    }
}

/// A shader function together with its fully resolved body.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDefinition {
    /// Function metadata.
    pub function: ShaderFunction,
    /// Resolved body.
    pub body: Block,
}
