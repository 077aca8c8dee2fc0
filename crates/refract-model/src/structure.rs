//! User-defined structures.

use crate::semantics::Semantic;
use crate::types::ShaderType;

/// A field of a structure.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition {
    /// Field name.
    pub name: String,
    /// Resolved field type.
    pub ty: ShaderType,
    /// Optional stage semantic.
    pub semantic: Option<Semantic>,
    /// Fixed array length, for array-typed fields declared inline.
    pub array_length: Option<u32>,
}

impl FieldDefinition {
    /// A plain field with no semantic.
    pub fn new(name: impl Into<String>, ty: ShaderType) -> Self {
        Self {
            name: name.into(),
            ty,
            semantic: None,
            array_length: None,
        }
    }

    /// A field carrying a stage semantic.
    pub fn with_semantic(name: impl Into<String>, ty: ShaderType, semantic: Semantic) -> Self {
        Self {
            name: name.into(),
            ty,
            semantic: Some(semantic),
            array_length: None,
        }
    }
}

/// A user-defined structure: a name plus an ordered field list.
///
/// Fields may reference other structures only by value; a cyclic
/// structure graph is rejected at discovery time.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureDefinition {
    /// Structure name.
    pub name: String,
    /// Ordered fields.
    pub fields: Vec<FieldDefinition>,
}

impl StructureDefinition {
    /// Creates a structure from a name and field list.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Index of the first field with the given semantic, if any.
    pub fn field_with_semantic(&self, semantic: Semantic) -> Option<usize> {
        self.fields.iter().position(|f| f.semantic == Some(semantic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_with_semantic_lookup() {
        let s = StructureDefinition::new(
            "VertexOutput",
            vec![
                FieldDefinition::with_semantic(
                    "TexCoord",
                    ShaderType::vec2(),
                    Semantic::TextureCoordinate,
                ),
                FieldDefinition::with_semantic(
                    "Position",
                    ShaderType::vec4(),
                    Semantic::SystemPosition,
                ),
            ],
        );
        assert_eq!(s.field_with_semantic(Semantic::SystemPosition), Some(1));
        assert_eq!(s.field_with_semantic(Semantic::Color), None);
    }

    #[test]
    fn plain_field_has_no_semantic() {
        let f = FieldDefinition::new("Weight", ShaderType::FLOAT);
        assert!(f.semantic.is_none());
        assert!(f.array_length.is_none());
    }
}
