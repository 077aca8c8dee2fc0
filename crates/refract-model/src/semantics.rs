//! Stage semantics attached to structure fields.

use std::fmt;

/// The role of a structure field in a stage input/output contract.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Semantic {
    /// Vertex position input.
    Position,
    /// Surface normal.
    Normal,
    /// Texture coordinate.
    TextureCoordinate,
    /// Vertex color.
    Color,
    /// Surface tangent.
    Tangent,
    /// Clip-space position produced by a vertex stage; maps to the
    /// target's built-in position variable.
    SystemPosition,
    /// A fragment-stage color render target.
    ColorTarget,
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Position => "Position",
            Self::Normal => "Normal",
            Self::TextureCoordinate => "TextureCoordinate",
            Self::Color => "Color",
            Self::Tangent => "Tangent",
            Self::SystemPosition => "SystemPosition",
            Self::ColorTarget => "ColorTarget",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(format!("{}", Semantic::SystemPosition), "SystemPosition");
        assert_eq!(format!("{}", Semantic::ColorTarget), "ColorTarget");
        assert_eq!(
            format!("{}", Semantic::TextureCoordinate),
            "TextureCoordinate"
        );
    }
}
