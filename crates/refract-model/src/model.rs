//! The read-only program model adapter.

use std::collections::HashMap;

use crate::func::{FunctionDefinition, FunctionKey};
use crate::resource::ResourceField;
use crate::structure::StructureDefinition;

/// A named grouping of entry points meant to run together.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderSetSource {
    /// Shader set name.
    pub name: String,
    /// Vertex entry point, if any.
    pub vertex: Option<FunctionKey>,
    /// Fragment entry point, if any.
    pub fragment: Option<FunctionKey>,
    /// Compute entry point, if any.
    pub compute: Option<FunctionKey>,
}

impl ShaderSetSource {
    /// A vertex + fragment set.
    pub fn graphics(
        name: impl Into<String>,
        vertex: FunctionKey,
        fragment: FunctionKey,
    ) -> Self {
        Self {
            name: name.into(),
            vertex: Some(vertex),
            fragment: Some(fragment),
            compute: None,
        }
    }

    /// A compute-only set.
    pub fn compute(name: impl Into<String>, compute: FunctionKey) -> Self {
        Self {
            name: name.into(),
            vertex: None,
            fragment: None,
            compute: Some(compute),
        }
    }
}

/// Read-only view over a fully type-resolved source program.
///
/// This is the transpiler's only window into the host program: the
/// frontend (an external collaborator) resolves syntax, symbols, and
/// types, then exposes the result through these lookups. Implementations
/// must be immutable for the duration of a generation run; the
/// orchestrator shares one instance across concurrent tasks.
pub trait ProgramModel: Send + Sync {
    /// Looks up a structure by name.
    fn structure(&self, name: &str) -> Option<&StructureDefinition>;

    /// Looks up a function by identity.
    fn function(&self, key: &FunctionKey) -> Option<&FunctionDefinition>;

    /// Resource fields declared on the given shader class, in
    /// declaration order.
    fn resource_fields(&self, type_name: &str) -> &[ResourceField];

    /// All declared shader sets, in declaration order.
    fn shader_sets(&self) -> &[ShaderSetSource];
}

/// A concrete, owned [`ProgramModel`].
///
/// Frontends lower their resolved program into this; tests build it
/// directly with [`ShaderModelBuilder`].
#[derive(Clone, Debug, Default)]
pub struct ShaderModel {
    structures: Vec<StructureDefinition>,
    structure_index: HashMap<String, usize>,
    functions: Vec<FunctionDefinition>,
    function_index: HashMap<FunctionKey, usize>,
    resources: HashMap<String, Vec<ResourceField>>,
    sets: Vec<ShaderSetSource>,
}

impl ProgramModel for ShaderModel {
    fn structure(&self, name: &str) -> Option<&StructureDefinition> {
        self.structure_index.get(name).map(|&i| &self.structures[i])
    }

    fn function(&self, key: &FunctionKey) -> Option<&FunctionDefinition> {
        self.function_index.get(key).map(|&i| &self.functions[i])
    }

    fn resource_fields(&self, type_name: &str) -> &[ResourceField] {
        self.resources.get(type_name).map_or(&[], Vec::as_slice)
    }

    fn shader_sets(&self) -> &[ShaderSetSource] {
        &self.sets
    }
}

/// Builder for [`ShaderModel`].
#[derive(Debug, Default)]
pub struct ShaderModelBuilder {
    model: ShaderModel,
}

impl ShaderModelBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a structure definition.
    pub fn structure(mut self, structure: StructureDefinition) -> Self {
        self.model
            .structure_index
            .insert(structure.name.clone(), self.model.structures.len());
        self.model.structures.push(structure);
        self
    }

    /// Adds a function definition.
    pub fn function(mut self, function: FunctionDefinition) -> Self {
        self.model
            .function_index
            .insert(function.function.key.clone(), self.model.functions.len());
        self.model.functions.push(function);
        self
    }

    /// Declares the resource fields of a shader class, in declaration
    /// order.
    pub fn resources(mut self, type_name: impl Into<String>, fields: Vec<ResourceField>) -> Self {
        self.model.resources.insert(type_name.into(), fields);
        self
    }

    /// Declares a shader set.
    pub fn shader_set(mut self, set: ShaderSetSource) -> Self {
        self.model.sets.push(set);
        self
    }

    /// Finishes the model.
    pub fn build(self) -> ShaderModel {
        self.model
    }
}
