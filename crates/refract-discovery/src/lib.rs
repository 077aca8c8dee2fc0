//! Entry-point discovery for the refract shader transpiler.
//!
//! Starting from a shader entry point this crate computes everything a
//! backend needs before emission: the call closure in callees-first
//! order, the reachable structures in dependency order, the resource
//! registry with stable binding slots, and the validated stage
//! input/output interface. All graph searches use explicit tri-color
//! marking so cyclic inputs fail fast with a description of the cycle
//! instead of recursing unboundedly.

mod calls;
mod error;
mod interface;
mod plan;
mod resources;
mod structs;
mod walk;

pub use calls::CallGraph;
pub use error::DiscoveryError;
pub use interface::{FragmentOutput, StageInterface};
pub use plan::{plan_set, ShaderSetPlan, StagePlan};
pub use resources::{ResourceDefinition, ResourceRegistry};
pub use structs::{collect_structures, structure_order};
pub use walk::visit_exprs;
