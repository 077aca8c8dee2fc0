//! Discovery-time failures.
//!
//! All of these are deterministic source-level errors: they are fatal
//! for the entry point that triggered them and are never retried.

use refract_model::{FunctionKey, ResourceKind};

/// Errors raised while discovering an entry point's dependencies.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The call graph contains a cycle; shading languages forbid
    /// recursion.
    #[error("cyclic call graph: {cycle}")]
    CyclicCallGraph {
        /// The cycle, rendered as `A -> B -> A`.
        cycle: String,
    },

    /// The structure graph contains a cycle.
    #[error("cyclic structure graph: {cycle}")]
    CyclicStructureGraph {
        /// The cycle, rendered as `A -> B -> A`.
        cycle: String,
    },

    /// A referenced function is not present in the program model.
    #[error("unresolved function: {key}")]
    UnresolvedFunction {
        /// The missing function's identity.
        key: FunctionKey,
    },

    /// A referenced structure is not present in the program model.
    #[error("unresolved structure: {name}")]
    UnresolvedStructure {
        /// The missing structure's name.
        name: String,
    },

    /// A referenced resource field is not declared on the shader class.
    #[error("unresolved resource: {name} (declaring type {type_name})")]
    UnresolvedResource {
        /// The missing resource's name.
        name: String,
        /// The shader class that was searched.
        type_name: String,
    },

    /// The same resource name was seen with two different kinds.
    #[error("resource {name} re-registered as {second}, previously {first}")]
    ResourceKindConflict {
        /// Resource name.
        name: String,
        /// Kind recorded at first discovery.
        first: ResourceKind,
        /// Conflicting kind.
        second: ResourceKind,
    },

    /// A texture is sampled both normally and through a depth-compare
    /// intrinsic. The declared sampler type cannot satisfy both.
    #[error("texture {name} used with both regular and depth-comparison sampling")]
    ShadowUsageConflict {
        /// Texture resource name.
        name: String,
    },

    /// A vertex entry point's output structure has no
    /// system-position field.
    #[error("vertex output structure {structure} is missing a SystemPosition semantic")]
    MissingPositionSemantic {
        /// The offending output structure.
        structure: String,
    },

    /// A fragment composite return field lacks the color-target
    /// semantic.
    #[error(
        "fragment output field {structure}.{field} must carry a ColorTarget semantic"
    )]
    MissingColorTargetSemantic {
        /// The return structure.
        structure: String,
        /// The offending field.
        field: String,
    },

    /// An entry point's stage does not match its slot in the shader set.
    #[error("function {key} is declared {actual} but used as a {expected} entry point")]
    StageMismatch {
        /// The entry point.
        key: FunctionKey,
        /// Stage required by the shader set slot.
        expected: refract_model::ShaderStage,
        /// Stage the function declares.
        actual: refract_model::ShaderStage,
    },

    /// A dispatch/group thread-id value was used outside a compute
    /// entry body, where not every dialect can supply it.
    #[error("thread-id builtin used outside a compute entry body in {key}")]
    ThreadIdOutsideCompute {
        /// The function containing the use.
        key: FunctionKey,
    },

    /// An entry point's signature does not fit its stage contract.
    #[error("entry point {key}: {reason}")]
    InvalidEntrySignature {
        /// The entry point.
        key: FunctionKey,
        /// Why the signature is rejected.
        reason: String,
    },
}
