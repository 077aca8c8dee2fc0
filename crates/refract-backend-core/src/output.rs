//! Generated output types handed back to the caller.

use std::fmt;

use refract_model::{ShaderFunction, ShaderStage};

/// One generated shader source unit.
#[derive(Clone, Debug)]
pub struct GeneratedShader {
    /// Descriptor of the host entry point (name, stage, group size),
    /// for callers invoking a native downstream compiler.
    pub function: ShaderFunction,
    /// Name of the synthesized stage entry in the generated source.
    pub entry_point: String,
    /// The generated source text.
    pub source: String,
}

/// The generated output for one (shader set, backend) pair.
///
/// Produced once per pair; immutable afterwards except through the
/// caller-supplied post-processing hook.
#[derive(Clone, Debug, Default)]
pub struct GeneratedShaderSet {
    /// Shader set name.
    pub name: String,
    /// Name of the backend that produced this set.
    pub backend: String,
    /// Vertex stage output, if the set has a vertex entry point.
    pub vertex: Option<GeneratedShader>,
    /// Fragment stage output, if the set has a fragment entry point.
    pub fragment: Option<GeneratedShader>,
    /// Compute stage output, if the set has a compute entry point.
    pub compute: Option<GeneratedShader>,
}

impl GeneratedShaderSet {
    /// The output slot for `stage`, if generated.
    pub fn stage(&self, stage: ShaderStage) -> Option<&GeneratedShader> {
        match stage {
            ShaderStage::Vertex => self.vertex.as_ref(),
            ShaderStage::Fragment => self.fragment.as_ref(),
            ShaderStage::Compute => self.compute.as_ref(),
            ShaderStage::Normal => None,
        }
    }

    /// Number of generated stage units.
    pub fn unit_count(&self) -> usize {
        [&self.vertex, &self.fragment, &self.compute]
            .iter()
            .filter(|s| s.is_some())
            .count()
    }
}

impl fmt::Display for GeneratedShaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} unit(s)",
            self.name,
            self.backend,
            self.unit_count()
        )
    }
}
