//! Value types of the restricted shader-compatible host subset.

use crate::resource::ResourceKind;

/// The kind of a scalar value.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ScalarKind {
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 32-bit unsigned integer.
    UInt,
    /// 32-bit floating point.
    Float,
}

impl ScalarKind {
    /// Returns `true` for the integer kinds (`Int`, `UInt`).
    pub fn is_integer(self) -> bool {
        matches!(self, Self::Int | Self::UInt)
    }
}

/// Number of components in a vector.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum VectorSize {
    /// 2 components.
    Two = 2,
    /// 3 components.
    Three = 3,
    /// 4 components.
    Four = 4,
}

impl VectorSize {
    /// Component count as a plain integer.
    pub fn count(self) -> u32 {
        self as u32
    }
}

/// A fully resolved value type.
///
/// The frontend resolves every host type down to this closed set before
/// handing the program to the transpiler; anything outside it is not part
/// of the supported subset.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum ShaderType {
    /// No value (function return only).
    Void,
    /// A single scalar.
    Scalar(ScalarKind),
    /// A vector of scalars.
    Vector {
        /// Component kind.
        scalar: ScalarKind,
        /// Component count.
        size: VectorSize,
    },
    /// A 4x4 float matrix.
    Matrix4x4,
    /// A user-defined structure, by name.
    Struct(String),
    /// A fixed-length array.
    Array {
        /// Element type.
        element: Box<ShaderType>,
        /// Element count.
        length: u32,
    },
    /// A resource handle (texture, sampler, buffer).
    Resource(ResourceKind),
}

impl ShaderType {
    /// Shorthand for a float scalar.
    pub const FLOAT: Self = Self::Scalar(ScalarKind::Float);
    /// Shorthand for an int scalar.
    pub const INT: Self = Self::Scalar(ScalarKind::Int);
    /// Shorthand for a uint scalar.
    pub const UINT: Self = Self::Scalar(ScalarKind::UInt);
    /// Shorthand for a bool scalar.
    pub const BOOL: Self = Self::Scalar(ScalarKind::Bool);

    /// A float vector of the given size.
    pub fn vec(size: VectorSize) -> Self {
        Self::Vector {
            scalar: ScalarKind::Float,
            size,
        }
    }

    /// Shorthand for `vec2`.
    pub fn vec2() -> Self {
        Self::vec(VectorSize::Two)
    }

    /// Shorthand for `vec3`.
    pub fn vec3() -> Self {
        Self::vec(VectorSize::Three)
    }

    /// Shorthand for `vec4`.
    pub fn vec4() -> Self {
        Self::vec(VectorSize::Four)
    }

    /// The scalar kind of this type, if it is a scalar or vector.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            Self::Vector { scalar, .. } => Some(*scalar),
            _ => None,
        }
    }

    /// Returns `true` if this is an integer scalar or integer vector.
    pub fn is_integer(&self) -> bool {
        self.scalar_kind().is_some_and(ScalarKind::is_integer)
    }

    /// Returns `true` if this is a float scalar or float vector.
    pub fn is_float(&self) -> bool {
        self.scalar_kind() == Some(ScalarKind::Float)
    }

    /// The structure name, if this is a struct type.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Self::Struct(name) => Some(name),
            _ => None,
        }
    }
}
