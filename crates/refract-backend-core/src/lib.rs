#![warn(missing_docs)]
//! Backend trait and shared generation machinery for Refract.
//!
//! Defines the [`ShaderBackend`] trait that all target-language
//! emitters implement, the [`Dialect`] strategy surface they plug into
//! the shared [`pipeline`], and a [`BackendRegistry`] for target
//! dispatch.

pub mod dialect;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod translate;
pub mod writer;

pub use dialect::{
    declaration, escape_ident, field_type, format_float, thread_ids_used, Dialect, IntrinsicCall,
    StructRole, UnitContext,
};
pub use error::{GenerateError, TranslateError};
pub use output::{GeneratedShader, GeneratedShaderSet};
pub use translate::{emit_function, function_signature, Translator};
pub use writer::CodeWriter;

use std::fmt::Debug;

use refract_discovery::{DiscoveryError, ShaderSetPlan};
use refract_model::{ProgramModel, ShaderStage};

/// A backend that generates one target language from planned shader
/// sets.
pub trait ShaderBackend: Debug + Send + Sync {
    /// Human-readable name (e.g. "glsl450").
    fn name(&self) -> &str;

    /// Target identifiers this backend handles (for dispatch).
    fn targets(&self) -> &[&str];

    /// Suggested file extension for generated sources (no dot).
    fn file_extension(&self) -> &'static str;

    /// The dialect driving the shared pipeline.
    fn dialect(&self) -> &dyn Dialect;

    /// Generates every planned stage of one shader set.
    fn generate_set(
        &self,
        model: &dyn ProgramModel,
        plan: &ShaderSetPlan,
    ) -> Result<GeneratedShaderSet, GenerateError> {
        let mut out = GeneratedShaderSet {
            name: plan.name.clone(),
            backend: self.name().to_owned(),
            ..GeneratedShaderSet::default()
        };
        for stage_plan in &plan.stages {
            let entry = model.function(&stage_plan.entry).ok_or_else(|| {
                GenerateError::Discovery(DiscoveryError::UnresolvedFunction {
                    key: stage_plan.entry.clone(),
                })
            })?;
            let ctx = UnitContext {
                model,
                set_name: &plan.name,
                plan: stage_plan,
                registry: &plan.registry,
                entry,
            };
            let unit = pipeline::generate_unit(self.dialect(), &ctx)?;
            match stage_plan.stage {
                ShaderStage::Vertex => out.vertex = Some(unit),
                ShaderStage::Fragment => out.fragment = Some(unit),
                ShaderStage::Compute => out.compute = Some(unit),
                ShaderStage::Normal => {}
            }
        }
        Ok(out)
    }
}

/// Registry of available backends, used for target dispatch.
#[derive(Debug, Default)]
pub struct BackendRegistry {
    backends: Vec<Box<dyn ShaderBackend>>,
}

impl BackendRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a backend.
    pub fn register(&mut self, backend: Box<dyn ShaderBackend>) {
        self.backends.push(backend);
    }

    /// Finds a backend that handles the given target identifier.
    pub fn find(&self, target: &str) -> Option<&dyn ShaderBackend> {
        self.backends
            .iter()
            .find(|b| b.targets().contains(&target))
            .map(|b| &**b)
    }

    /// All registered backends, in registration order.
    pub fn backends(&self) -> impl Iterator<Item = &dyn ShaderBackend> {
        self.backends.iter().map(|b| &**b)
    }

    /// Lists all supported target identifiers.
    pub fn list_targets(&self) -> Vec<&str> {
        self.backends
            .iter()
            .flat_map(|b| b.targets().iter().copied())
            .collect()
    }
}
