//! The shared generation pipeline.
//!
//! Emission order is fixed across all dialects: preamble, structures in
//! dependency order, resources in registry order, helper functions in
//! call order, then the synthesized stage entry. Dialects only control
//! the syntax of each step.

use log::debug;

use crate::dialect::{Dialect, UnitContext};
use crate::error::GenerateError;
use crate::output::GeneratedShader;
use crate::writer::CodeWriter;
use refract_discovery::DiscoveryError;

/// Generates one shader source unit for one stage of one set.
pub fn generate_unit(
    dialect: &dyn Dialect,
    ctx: &UnitContext<'_>,
) -> Result<GeneratedShader, GenerateError> {
    debug!(
        "generating {} stage of '{}' for {}",
        ctx.plan.stage,
        ctx.set_name,
        dialect.name()
    );

    if ctx.plan.uses_multisample_load && !dialect.supports_multisample_textures() {
        return Err(GenerateError::UnsupportedFeature {
            dialect: dialect.name().to_owned(),
            feature: "multisampled texture loads".to_owned(),
            set: ctx.set_name.to_owned(),
            stage: ctx.plan.stage,
        });
    }

    let translation = |source| GenerateError::Translation {
        set: ctx.set_name.to_owned(),
        stage: ctx.plan.stage,
        source,
    };

    let mut w = CodeWriter::new();
    dialect.write_preamble(&mut w, ctx);

    for name in &ctx.plan.structure_order {
        let structure = ctx.model.structure(name).ok_or_else(|| {
            GenerateError::Discovery(DiscoveryError::UnresolvedStructure { name: name.clone() })
        })?;
        dialect
            .write_structure(&mut w, structure, ctx.struct_role(name))
            .map_err(translation)?;
    }

    for res in ctx.registry.resources() {
        dialect.write_resource(&mut w, ctx, res).map_err(translation)?;
    }

    for key in &ctx.plan.call_order {
        let def = ctx.model.function(key).ok_or_else(|| {
            GenerateError::Discovery(DiscoveryError::UnresolvedFunction { key: key.clone() })
        })?;
        dialect.write_function(&mut w, ctx, def).map_err(translation)?;
    }

    dialect.write_main(&mut w, ctx).map_err(translation)?;

    Ok(GeneratedShader {
        function: ctx.entry.function.clone(),
        entry_point: dialect.entry_point_name().to_owned(),
        source: w.finish(),
    })
}
