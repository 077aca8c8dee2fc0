//! Resource discovery and the binding registry.

use std::collections::{HashMap, HashSet};

use refract_model::{
    ExprKind, FunctionKey, Intrinsic, ProgramModel, ResourceKind, ShaderType,
};

use crate::error::DiscoveryError;
use crate::walk::visit_exprs;

/// A registered resource with its assigned binding slot.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceDefinition {
    /// Resource name; unique within the shader set.
    pub name: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Value type, for uniforms and structured buffers.
    pub value_type: ShaderType,
    /// Descriptor set index.
    pub set: u32,
    /// Binding index within the set.
    pub binding: u32,
    /// Whether every discovered use of this texture/sampler goes
    /// through a depth-comparison intrinsic. Changes the declared
    /// sampler type in dialects that distinguish shadow samplers.
    pub shadow_sampled: bool,
}

/// Registry of the resources an entry point closure actually touches.
///
/// Binding indices are assigned in first-discovery order per set unless
/// the source declares an explicit layout, which is honored verbatim.
/// The registry is computed once per shader set and shared read-only by
/// every backend, so slots agree across dialects.
#[derive(Clone, Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<ResourceDefinition>,
    index: HashMap<String, usize>,
}

impl ResourceRegistry {
    /// Scans `functions` (entry first, then callees) for resource-field
    /// references and builds the registry.
    ///
    /// Field declarations are resolved against the function's declaring
    /// type first, then against `entry_type`. Re-encountering a name
    /// with a different kind is fatal, as is mixing regular and
    /// depth-comparison sampling of one texture.
    pub fn discover(
        model: &dyn ProgramModel,
        entry_type: &str,
        functions: &[FunctionKey],
    ) -> Result<Self, DiscoveryError> {
        let mut registry = Self::default();
        let mut next_binding: HashMap<u32, u32> = HashMap::new();
        let mut shadow_uses: HashSet<String> = HashSet::new();
        let mut regular_uses: HashSet<String> = HashSet::new();

        for key in functions {
            let def = model
                .function(key)
                .ok_or_else(|| DiscoveryError::UnresolvedFunction { key: key.clone() })?;

            let mut found: Result<(), DiscoveryError> = Ok(());
            visit_exprs(&def.body, &mut |e| {
                if found.is_err() {
                    return;
                }
                match &e.kind {
                    ExprKind::Resource(name) => {
                        found = registry.register(
                            model,
                            &key.type_name,
                            entry_type,
                            name,
                            &mut next_binding,
                        );
                    }
                    ExprKind::Intrinsic { intrinsic, args } => {
                        let classify: Option<&mut HashSet<String>> = match intrinsic {
                            Intrinsic::SampleCmpLevelZero => Some(&mut shadow_uses),
                            Intrinsic::Sample | Intrinsic::SampleGrad => {
                                Some(&mut regular_uses)
                            }
                            _ => None,
                        };
                        if let Some(uses) = classify {
                            // Texture and sampler operands both take on
                            // the sampling pattern of the call site.
                            for arg in args.iter().take(2) {
                                if let ExprKind::Resource(name) = &arg.kind {
                                    uses.insert(name.clone());
                                }
                            }
                        }
                    }
                    _ => {}
                }
            });
            found?;
        }

        for res in &mut registry.resources {
            let shadow = shadow_uses.contains(&res.name);
            let regular = regular_uses.contains(&res.name);
            if shadow && regular {
                return Err(DiscoveryError::ShadowUsageConflict {
                    name: res.name.clone(),
                });
            }
            res.shadow_sampled = shadow;
        }

        log::debug!("registry: {} resource(s)", registry.resources.len());
        Ok(registry)
    }

    fn register(
        &mut self,
        model: &dyn ProgramModel,
        declaring_type: &str,
        entry_type: &str,
        name: &str,
        next_binding: &mut HashMap<u32, u32>,
    ) -> Result<(), DiscoveryError> {
        let field = model
            .resource_fields(declaring_type)
            .iter()
            .chain(model.resource_fields(entry_type))
            .find(|f| f.name == name)
            .ok_or_else(|| DiscoveryError::UnresolvedResource {
                name: name.to_owned(),
                type_name: entry_type.to_owned(),
            })?;

        if let Some(&existing) = self.index.get(name) {
            let registered = &self.resources[existing];
            if registered.kind != field.kind {
                return Err(DiscoveryError::ResourceKindConflict {
                    name: name.to_owned(),
                    first: registered.kind,
                    second: field.kind,
                });
            }
            return Ok(());
        }

        let (set, binding) = match field.layout {
            Some(layout) => (layout.set, layout.binding),
            None => {
                let set = 0;
                let slot = next_binding.entry(set).or_insert(0);
                let binding = *slot;
                *slot += 1;
                (set, binding)
            }
        };

        self.index.insert(name.to_owned(), self.resources.len());
        self.resources.push(ResourceDefinition {
            name: name.to_owned(),
            kind: field.kind,
            value_type: field.value_type.clone(),
            set,
            binding,
            shadow_sampled: false,
        });
        Ok(())
    }

    /// All registered resources, in discovery order.
    pub fn resources(&self) -> &[ResourceDefinition] {
        &self.resources
    }

    /// Looks up a resource by name.
    pub fn get(&self, name: &str) -> Option<&ResourceDefinition> {
        self.index.get(name).map(|&i| &self.resources[i])
    }

    /// Returns `true` if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Whether any function in the closure loads from a multisampled
/// texture, either by declared flag or by a discovered `Load` call.
pub(crate) fn uses_multisample_load(
    model: &dyn ProgramModel,
    functions: &[FunctionKey],
) -> bool {
    functions.iter().any(|key| {
        let Some(def) = model.function(key) else {
            return false;
        };
        if def.function.uses_multisample_load {
            return true;
        }
        let mut found = false;
        visit_exprs(&def.body, &mut |e| {
            if let ExprKind::Intrinsic {
                intrinsic: Intrinsic::Load,
                ..
            } = &e.kind
            {
                found = true;
            }
        });
        found
    })
}
