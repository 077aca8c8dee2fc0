//! Function call graph discovery and linearization.

use std::collections::HashMap;

use refract_model::{ExprKind, FunctionKey, ProgramModel};

use crate::error::DiscoveryError;
use crate::walk::visit_exprs;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// The call closure of one entry point, linearized callees-first.
#[derive(Clone, Debug)]
pub struct CallGraph {
    order: Vec<FunctionKey>,
}

impl CallGraph {
    /// Discovers every user function reachable from `entry` and orders
    /// them so each function follows all of its callees. The entry
    /// point itself is the final element.
    ///
    /// Intrinsic invocations are leaves; they never expand the graph.
    /// A cycle is fatal: target shading languages cannot express
    /// recursion.
    pub fn discover(
        model: &dyn ProgramModel,
        entry: &FunctionKey,
    ) -> Result<Self, DiscoveryError> {
        let mut marks: HashMap<FunctionKey, Mark> = HashMap::new();
        let mut path: Vec<FunctionKey> = Vec::new();
        let mut order: Vec<FunctionKey> = Vec::new();
        Self::visit(model, entry, &mut marks, &mut path, &mut order)?;
        log::debug!(
            "call closure of {entry}: {} function(s)",
            order.len()
        );
        Ok(Self { order })
    }

    fn visit(
        model: &dyn ProgramModel,
        key: &FunctionKey,
        marks: &mut HashMap<FunctionKey, Mark>,
        path: &mut Vec<FunctionKey>,
        order: &mut Vec<FunctionKey>,
    ) -> Result<(), DiscoveryError> {
        match marks.get(key) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(DiscoveryError::CyclicCallGraph {
                    cycle: render_cycle(path, key),
                });
            }
            None => {}
        }

        let def = model
            .function(key)
            .ok_or_else(|| DiscoveryError::UnresolvedFunction { key: key.clone() })?;

        marks.insert(key.clone(), Mark::InProgress);
        path.push(key.clone());

        let mut callees: Vec<FunctionKey> = Vec::new();
        visit_exprs(&def.body, &mut |e| {
            if let ExprKind::CallUser { function, .. } = &e.kind {
                if !callees.contains(function) {
                    callees.push(function.clone());
                }
            }
        });
        for callee in &callees {
            Self::visit(model, callee, marks, path, order)?;
        }

        path.pop();
        marks.insert(key.clone(), Mark::Done);
        order.push(key.clone());
        Ok(())
    }

    /// Every function in the closure, callees before callers; the
    /// entry point is last.
    pub fn ordered(&self) -> &[FunctionKey] {
        &self.order
    }

    /// The helper functions only (everything except the entry point).
    pub fn helpers(&self) -> &[FunctionKey] {
        &self.order[..self.order.len() - 1]
    }
}

fn render_cycle(path: &[FunctionKey], repeat: &FunctionKey) -> String {
    let start = path.iter().position(|k| k == repeat).unwrap_or(0);
    let mut parts: Vec<String> = path[start..].iter().map(ToString::to_string).collect();
    parts.push(repeat.to_string());
    parts.join(" -> ")
}
