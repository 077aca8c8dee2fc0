//! Per-shader-set discovery plans.

use refract_model::{
    ExprKind, FunctionKey, ProgramModel, ShaderSetSource, ShaderStage,
};

use crate::calls::CallGraph;
use crate::error::DiscoveryError;
use crate::interface::StageInterface;
use crate::resources::{uses_multisample_load, ResourceRegistry};
use crate::structs::{collect_structures, structure_order};
use crate::walk::visit_exprs;

/// Everything one backend needs to emit one stage of one shader set.
#[derive(Clone, Debug)]
pub struct StagePlan {
    /// The stage this plan covers.
    pub stage: ShaderStage,
    /// The entry point.
    pub entry: FunctionKey,
    /// The call closure, callees first; the entry point is last.
    pub call_order: Vec<FunctionKey>,
    /// Reachable structures in dependency order.
    pub structure_order: Vec<String>,
    /// Validated stage input/output contract.
    pub interface: StageInterface,
    /// Whether the closure loads from a multisampled texture.
    pub uses_multisample_load: bool,
}

/// The discovery result for one shader set, shared by every backend.
///
/// The registry spans all stages so a resource keeps one binding slot
/// whether the vertex or the fragment stage touches it first.
#[derive(Clone, Debug)]
pub struct ShaderSetPlan {
    /// Shader set name.
    pub name: String,
    /// Set-wide resource registry.
    pub registry: ResourceRegistry,
    /// Per-stage plans, in vertex/fragment/compute order.
    pub stages: Vec<StagePlan>,
}

/// Runs full discovery for one shader set: call graphs, thread-id
/// validation, the set-wide resource registry, structure orders, and
/// stage interfaces.
pub fn plan_set(
    model: &dyn ProgramModel,
    set: &ShaderSetSource,
) -> Result<ShaderSetPlan, DiscoveryError> {
    let slots = [
        (ShaderStage::Vertex, set.vertex.as_ref()),
        (ShaderStage::Fragment, set.fragment.as_ref()),
        (ShaderStage::Compute, set.compute.as_ref()),
    ];

    // Call closures first; the registry scan order is "entry first,
    // then callees", per stage, in stage order.
    let mut graphs: Vec<(ShaderStage, &FunctionKey, CallGraph)> = Vec::new();
    for (stage, entry) in slots.into_iter() {
        let Some(entry) = entry else { continue };
        let graph = CallGraph::discover(model, entry)?;
        validate_thread_ids(model, &graph, entry, stage)?;
        graphs.push((stage, entry, graph));
    }

    let mut scan_order: Vec<FunctionKey> = Vec::new();
    for (_, _, graph) in &graphs {
        for key in graph.ordered().iter().rev() {
            if !scan_order.contains(key) {
                scan_order.push(key.clone());
            }
        }
    }
    let entry_type = graphs
        .first()
        .map(|(_, entry, _)| entry.type_name.clone())
        .unwrap_or_default();
    let registry = ResourceRegistry::discover(model, &entry_type, &scan_order)?;

    let mut stages = Vec::new();
    for (stage, entry, graph) in graphs {
        let def = model
            .function(entry)
            .ok_or_else(|| DiscoveryError::UnresolvedFunction { key: entry.clone() })?;
        let interface = StageInterface::build(model, def, stage)?;

        let mut reading_order: Vec<FunctionKey> =
            graph.ordered().iter().rev().cloned().collect();
        reading_order.dedup();
        let roots = collect_structures(model, &reading_order, &registry)?;
        let structures = structure_order(model, &roots)?;

        stages.push(StagePlan {
            stage,
            entry: entry.clone(),
            call_order: graph.ordered().to_vec(),
            structure_order: structures,
            interface,
            uses_multisample_load: uses_multisample_load(model, graph.ordered()),
        });
    }

    log::debug!(
        "planned shader set '{}': {} stage(s), {} resource(s)",
        set.name,
        stages.len(),
        registry.resources().len()
    );

    Ok(ShaderSetPlan {
        name: set.name.clone(),
        registry,
        stages,
    })
}

/// Thread-id builtins are only expressible in a compute entry body:
/// GLSL reads them from globals, but HLSL and Metal receive them as
/// synthesized `main` parameters passed into the entry call.
fn validate_thread_ids(
    model: &dyn ProgramModel,
    graph: &CallGraph,
    entry: &FunctionKey,
    stage: ShaderStage,
) -> Result<(), DiscoveryError> {
    for key in graph.ordered() {
        let allowed = stage == ShaderStage::Compute && key == entry;
        if allowed {
            continue;
        }
        let def = model
            .function(key)
            .ok_or_else(|| DiscoveryError::UnresolvedFunction { key: key.clone() })?;
        let mut used = false;
        visit_exprs(&def.body, &mut |e| {
            if let ExprKind::Intrinsic { intrinsic, .. } = &e.kind {
                if intrinsic.is_thread_id() {
                    used = true;
                }
            }
        });
        if used {
            return Err(DiscoveryError::ThreadIdOutsideCompute { key: key.clone() });
        }
    }
    Ok(())
}
