//! Syntactic traversal of resolved function bodies.

use refract_model::{Block, Expr, ExprKind, Stmt};

/// Visits every expression in a block in syntactic order, outermost
/// first. Discovery passes use this single traversal for call, resource,
/// and intrinsic scanning so "first-discovery order" means the same
/// thing everywhere.
pub fn visit_exprs(block: &Block, visit: &mut impl FnMut(&Expr)) {
    for stmt in block {
        visit_stmt(stmt, visit);
    }
}

fn visit_stmt(stmt: &Stmt, visit: &mut impl FnMut(&Expr)) {
    match stmt {
        Stmt::Local { init, .. } => {
            if let Some(init) = init {
                visit_expr(init, visit);
            }
        }
        Stmt::Assign { target, value } => {
            visit_expr(target, visit);
            visit_expr(value, visit);
        }
        Stmt::Expression(expr) => visit_expr(expr, visit),
        Stmt::If {
            condition,
            then_block,
            else_block,
        } => {
            visit_expr(condition, visit);
            visit_exprs(then_block, visit);
            if let Some(else_block) = else_block {
                visit_exprs(else_block, visit);
            }
        }
        Stmt::For {
            init,
            condition,
            step,
            body,
        } => {
            visit_stmt(init, visit);
            visit_expr(condition, visit);
            visit_stmt(step, visit);
            visit_exprs(body, visit);
        }
        Stmt::While { condition, body } => {
            visit_expr(condition, visit);
            visit_exprs(body, visit);
        }
        Stmt::Return(value) => {
            if let Some(value) = value {
                visit_expr(value, visit);
            }
        }
    }
}

fn visit_expr(expr: &Expr, visit: &mut impl FnMut(&Expr)) {
    visit(expr);
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Variable(_) | ExprKind::Resource(_) => {}
        ExprKind::Field { base, .. } => visit_expr(base, visit),
        ExprKind::Index { base, index } => {
            visit_expr(base, visit);
            visit_expr(index, visit);
        }
        ExprKind::Unary { operand, .. } => visit_expr(operand, visit),
        ExprKind::Binary { left, right, .. } => {
            visit_expr(left, visit);
            visit_expr(right, visit);
        }
        ExprKind::Construct(args)
        | ExprKind::Intrinsic { args, .. }
        | ExprKind::CallUser { args, .. } => {
            for arg in args {
                visit_expr(arg, visit);
            }
        }
        ExprKind::Cast(operand) => visit_expr(operand, visit),
    }
}
