//! Translation and generation failures.

use refract_discovery::DiscoveryError;
use refract_model::{Intrinsic, ShaderStage, ShaderType};

/// Errors raised while rewriting one function body for a dialect.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// The dialect has no mapping for this built-in.
    #[error("unsupported intrinsic {intrinsic} for {dialect}")]
    UnsupportedIntrinsic {
        /// The unmapped built-in.
        intrinsic: Intrinsic,
        /// Dialect name.
        dialect: String,
    },

    /// The dialect has no name for this type.
    #[error("no {dialect} type for {ty:?}")]
    UnknownType {
        /// The unmappable type.
        ty: ShaderType,
        /// Dialect name.
        dialect: String,
    },

    /// An expression referenced a resource the registry never saw.
    #[error("unknown resource: {name}")]
    UnknownResource {
        /// Resource name.
        name: String,
    },

    /// A member access that fits no known accessor pattern.
    #[error("invalid member {member} on {ty:?}")]
    InvalidMember {
        /// Accessed member name.
        member: String,
        /// Type of the accessed value.
        ty: ShaderType,
    },

    /// A host construct outside the supported subset.
    #[error("unsupported construct: {reason}")]
    UnsupportedConstruct {
        /// What was encountered.
        reason: String,
    },
}

/// Errors raised while generating one shader source unit.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Discovery re-validation failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Body translation failed.
    #[error("{stage} stage of '{set}': {source}")]
    Translation {
        /// Shader set name.
        set: String,
        /// Stage being generated.
        stage: ShaderStage,
        /// The underlying translation failure.
        #[source]
        source: TranslateError,
    },

    /// The dialect cannot express a required feature at all.
    #[error("{dialect} does not support {feature} ({stage} stage of '{set}')")]
    UnsupportedFeature {
        /// Dialect name.
        dialect: String,
        /// The missing capability.
        feature: String,
        /// Shader set name.
        set: String,
        /// Stage being generated.
        stage: ShaderStage,
    },
}
