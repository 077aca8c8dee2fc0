#![warn(missing_docs)]
//! The transpilation orchestrator.
//!
//! Discovery runs once per shader set; the resulting plans are shared
//! read-only and every (set, backend) pair generates independently on
//! the rayon pool. Results come back in deterministic set-major,
//! registration-order sequence regardless of scheduling, and one
//! failing pair never disturbs the others.

use log::{debug, warn};
use rayon::prelude::*;

use refract_backend_core::{BackendRegistry, GenerateError, GeneratedShaderSet, ShaderBackend};
use refract_discovery::{plan_set, DiscoveryError, ShaderSetPlan};
use refract_model::ProgramModel;

use refract_backend_glsl::GlslBackend;
use refract_backend_hlsl::HlslBackend;
use refract_backend_metal::MetalBackend;

/// Error from a caller-supplied post-processing hook.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ProcessError {
    /// What went wrong.
    pub message: String,
}

impl ProcessError {
    /// Creates a processing error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A failure for one shader set, or one (set, backend) pair.
#[derive(Debug, thiserror::Error)]
pub enum TranspileError {
    /// Set discovery failed; no backend ran for the set.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// One backend failed to generate the set.
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// The post-processing hook rejected the generated set.
    #[error("post-processing: {0}")]
    Process(#[from] ProcessError),
}

/// One recorded failure in a [`TranspileReport`].
#[derive(Debug)]
pub struct PairFailure {
    /// Shader set name.
    pub set: String,
    /// Failing backend, or `None` when discovery itself failed.
    pub backend: Option<String>,
    /// The failure.
    pub error: TranspileError,
}

/// Everything a transpilation run produced.
#[derive(Debug, Default)]
pub struct TranspileReport {
    /// Successful outputs, set-major in declaration order, backends in
    /// registration order within a set.
    pub outputs: Vec<GeneratedShaderSet>,
    /// Failures, discovery failures first.
    pub failures: Vec<PairFailure>,
}

impl TranspileReport {
    /// Returns `true` when nothing failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A caller-supplied hook run on each generated set before it lands in
/// the report (native compilation, validation, caching).
pub trait ShaderSetProcessor: Send + Sync {
    /// Inspects or rewrites one generated set; an error fails the
    /// (set, backend) pair.
    fn process(&self, set: &mut GeneratedShaderSet) -> Result<(), ProcessError>;
}

/// Plans shader sets once and fans generation out across backends.
#[derive(Debug, Default)]
pub struct Transpiler {
    registry: BackendRegistry,
}

impl Transpiler {
    /// Creates a transpiler with no backends registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transpiler with every built-in backend: HLSL, the
    /// three GLSL flavors, and Metal.
    pub fn with_default_backends() -> Self {
        let mut t = Self::new();
        t.register(Box::new(HlslBackend::new()));
        t.register(Box::new(GlslBackend::glsl330()));
        t.register(Box::new(GlslBackend::glsl_es300()));
        t.register(Box::new(GlslBackend::glsl450()));
        t.register(Box::new(MetalBackend::new()));
        t
    }

    /// Registers a backend.
    pub fn register(&mut self, backend: Box<dyn ShaderBackend>) {
        debug!("registered backend '{}'", backend.name());
        self.registry.register(backend);
    }

    /// The backend registry, for target dispatch.
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Transpiles every declared shader set with every registered
    /// backend.
    pub fn run(&self, model: &dyn ProgramModel) -> TranspileReport {
        self.run_with(model, None)
    }

    /// Like [`run`](Self::run), passing each generated set through the
    /// given hook.
    pub fn run_with(
        &self,
        model: &dyn ProgramModel,
        processor: Option<&dyn ShaderSetProcessor>,
    ) -> TranspileReport {
        let mut report = TranspileReport::default();

        let mut plans: Vec<ShaderSetPlan> = Vec::new();
        for set in model.shader_sets() {
            match plan_set(model, set) {
                Ok(plan) => plans.push(plan),
                Err(err) => {
                    warn!("discovery failed for shader set '{}': {err}", set.name);
                    report.failures.push(PairFailure {
                        set: set.name.clone(),
                        backend: None,
                        error: err.into(),
                    });
                }
            }
        }

        let backends: Vec<&dyn ShaderBackend> = self.registry.backends().collect();
        let pairs: Vec<(&ShaderSetPlan, &dyn ShaderBackend)> = plans
            .iter()
            .flat_map(|plan| backends.iter().map(move |backend| (plan, *backend)))
            .collect();

        debug!(
            "generating {} pair(s) across {} backend(s)",
            pairs.len(),
            backends.len()
        );

        let results: Vec<Result<GeneratedShaderSet, PairFailure>> = pairs
            .par_iter()
            .map(|(plan, backend)| {
                backend
                    .generate_set(model, plan)
                    .map_err(TranspileError::from)
                    .and_then(|mut set| {
                        if let Some(processor) = processor {
                            processor.process(&mut set)?;
                        }
                        Ok(set)
                    })
                    .map_err(|error| PairFailure {
                        set: plan.name.clone(),
                        backend: Some(backend.name().to_owned()),
                        error,
                    })
            })
            .collect();

        for result in results {
            match result {
                Ok(set) => report.outputs.push(set),
                Err(failure) => {
                    warn!(
                        "backend '{}' failed for shader set '{}': {}",
                        failure.backend.as_deref().unwrap_or("?"),
                        failure.set,
                        failure.error
                    );
                    report.failures.push(failure);
                }
            }
        }
        report
    }
}
