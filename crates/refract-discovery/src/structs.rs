//! Structure dependency graph: reachability and emission order.

use std::collections::HashMap;

use refract_model::{FunctionKey, ProgramModel, ShaderType, Stmt};

use crate::error::DiscoveryError;
use crate::resources::ResourceRegistry;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// Collects the root structure names referenced by a set of functions
/// and their bound resources, in first-discovery order.
///
/// Roots come from parameter types, return types, local declarations,
/// and buffer/uniform value types; nested containment is resolved by
/// [`structure_order`].
pub fn collect_structures(
    model: &dyn ProgramModel,
    functions: &[FunctionKey],
    registry: &ResourceRegistry,
) -> Result<Vec<String>, DiscoveryError> {
    let mut roots: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !roots.iter().any(|n| n == name) {
            roots.push(name.to_owned());
        }
    };

    for key in functions {
        let def = model
            .function(key)
            .ok_or_else(|| DiscoveryError::UnresolvedFunction { key: key.clone() })?;
        for param in &def.function.parameters {
            if let Some(name) = param.ty.struct_name() {
                push(name);
            }
        }
        if let Some(name) = def.function.return_type.struct_name() {
            push(name);
        }
        collect_from_block(&def.body, &mut push);
    }

    for res in registry.resources() {
        if let Some(name) = res.value_type.struct_name() {
            push(name);
        }
    }

    Ok(roots)
}

fn collect_from_block(block: &[Stmt], push: &mut impl FnMut(&str)) {
    for stmt in block {
        match stmt {
            Stmt::Local { ty, .. } => {
                if let Some(name) = ty.struct_name() {
                    push(name);
                }
            }
            Stmt::If {
                then_block,
                else_block,
                ..
            } => {
                collect_from_block(then_block, push);
                if let Some(else_block) = else_block {
                    collect_from_block(else_block, push);
                }
            }
            Stmt::For { init, body, .. } => {
                collect_from_block(std::slice::from_ref(init), push);
                collect_from_block(body, push);
            }
            Stmt::While { body, .. } => collect_from_block(body, push),
            _ => {}
        }
    }
}

/// Produces an emission order over `roots` and every structure they
/// transitively contain: each structure appears after all structures it
/// has fields of.
///
/// Ties between independent structures keep first-discovery order, so
/// repeated runs over the same input emit identical text. A containment
/// cycle is fatal.
pub fn structure_order(
    model: &dyn ProgramModel,
    roots: &[String],
) -> Result<Vec<String>, DiscoveryError> {
    let mut marks: HashMap<String, Mark> = HashMap::new();
    let mut path: Vec<String> = Vec::new();
    let mut order: Vec<String> = Vec::new();

    for root in roots {
        visit(model, root, &mut marks, &mut path, &mut order)?;
    }
    log::debug!("structure emission order: {order:?}");
    Ok(order)
}

fn visit(
    model: &dyn ProgramModel,
    name: &str,
    marks: &mut HashMap<String, Mark>,
    path: &mut Vec<String>,
    order: &mut Vec<String>,
) -> Result<(), DiscoveryError> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => {
            let start = path.iter().position(|n| n == name).unwrap_or(0);
            let mut parts = path[start..].to_vec();
            parts.push(name.to_owned());
            return Err(DiscoveryError::CyclicStructureGraph {
                cycle: parts.join(" -> "),
            });
        }
        None => {}
    }

    let def = model
        .structure(name)
        .ok_or_else(|| DiscoveryError::UnresolvedStructure {
            name: name.to_owned(),
        })?;

    marks.insert(name.to_owned(), Mark::InProgress);
    path.push(name.to_owned());

    for field in &def.fields {
        if let Some(contained) = contained_struct(&field.ty) {
            visit(model, contained, marks, path, order)?;
        }
    }

    path.pop();
    marks.insert(name.to_owned(), Mark::Done);
    order.push(name.to_owned());
    Ok(())
}

/// The structure a field contains by value, if any. Resource- and
/// scalar/vector-typed fields are not containment edges.
fn contained_struct(ty: &ShaderType) -> Option<&str> {
    match ty {
        ShaderType::Struct(name) => Some(name),
        ShaderType::Array { element, .. } => contained_struct(element),
        _ => None,
    }
}
