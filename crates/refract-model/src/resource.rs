//! Resource fields declared on a shader class.

use std::fmt;

use crate::types::ShaderType;

/// The kind of a bound resource.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ResourceKind {
    /// A uniform/constant buffer holding one value.
    Uniform,
    /// A 2D texture.
    Texture2D,
    /// A cube texture.
    TextureCube,
    /// A 2D texture array.
    Texture2DArray,
    /// A multisampled 2D texture.
    Texture2DMS,
    /// A sampler state.
    Sampler,
    /// A read-only structured buffer.
    StructuredBuffer,
    /// A read-write structured buffer.
    RWStructuredBuffer,
}

impl ResourceKind {
    /// Returns `true` for the texture kinds.
    pub fn is_texture(self) -> bool {
        matches!(
            self,
            Self::Texture2D | Self::TextureCube | Self::Texture2DArray | Self::Texture2DMS
        )
    }

    /// Returns `true` for the structured-buffer kinds.
    pub fn is_structured_buffer(self) -> bool {
        matches!(self, Self::StructuredBuffer | Self::RWStructuredBuffer)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uniform => "Uniform",
            Self::Texture2D => "Texture2D",
            Self::TextureCube => "TextureCube",
            Self::Texture2DArray => "Texture2DArray",
            Self::Texture2DMS => "Texture2DMS",
            Self::Sampler => "Sampler",
            Self::StructuredBuffer => "StructuredBuffer",
            Self::RWStructuredBuffer => "RWStructuredBuffer",
        })
    }
}

/// An explicit `set`/`binding` layout declared on a resource field.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct ResourceLayout {
    /// Descriptor set index.
    pub set: u32,
    /// Binding index within the set.
    pub binding: u32,
}

/// A resource-typed field declared on a shader class.
///
/// Discovery turns the subset of these that the entry point's call
/// closure actually touches into registered resource definitions.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceField {
    /// Field name; unique within the declaring class.
    pub name: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Value type, for uniforms and structured buffers.
    pub value_type: ShaderType,
    /// Explicit layout, if the source declared one.
    pub layout: Option<ResourceLayout>,
}

impl ResourceField {
    /// A resource field with no explicit layout.
    pub fn new(name: impl Into<String>, kind: ResourceKind, value_type: ShaderType) -> Self {
        Self {
            name: name.into(),
            kind,
            value_type,
            layout: None,
        }
    }

    /// Attaches an explicit `set`/`binding` layout.
    pub fn with_layout(mut self, set: u32, binding: u32) -> Self {
        self.layout = Some(ResourceLayout { set, binding });
        self
    }
}
