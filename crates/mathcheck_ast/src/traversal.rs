//! AST traversal utilities.
//!
//! Counting and variable collection use explicit stacks so they are safe for
//! any tree depth. Substitution rebuilds only the spine that changed.

use crate::expression::{Context, Expr, ExprId};
use std::collections::BTreeSet;

fn push_children(node: &Expr, stack: &mut Vec<ExprId>) {
    match node {
        Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
            stack.push(*l);
            stack.push(*r);
        }
        Expr::Neg(e) => stack.push(*e),
        Expr::Function(_, args) => stack.extend(args.iter().copied()),
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => {}
    }
}

/// Count all nodes in an expression tree (shared subtrees counted per use).
pub fn count_all_nodes(ctx: &Context, root: ExprId) -> usize {
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        count += 1;
        push_children(ctx.get(id), &mut stack);
    }
    count
}

/// Collect all unique variable names, sorted.
pub fn collect_variables(ctx: &Context, root: ExprId) -> BTreeSet<String> {
    let mut vars = BTreeSet::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        let node = ctx.get(id);
        if let Expr::Variable(name) = node {
            vars.insert(name.clone());
        }
        push_children(node, &mut stack);
    }

    vars
}

/// Does `root` mention the variable `var` anywhere?
pub fn contains_named_var(ctx: &Context, root: ExprId, var: &str) -> bool {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let node = ctx.get(id);
        if matches!(node, Expr::Variable(name) if name == var) {
            return true;
        }
        push_children(node, &mut stack);
    }
    false
}

/// Operator joining one link of a flattened chain to what precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ChainOp {
    fn join(self, l: ExprId, r: ExprId) -> Expr {
        match self {
            ChainOp::Add => Expr::Add(l, r),
            ChainOp::Sub => Expr::Sub(l, r),
            ChainOp::Mul => Expr::Mul(l, r),
            ChainOp::Div => Expr::Div(l, r),
        }
    }
}

/// Flatten the left spine of `Add`/`Sub` nodes under `root`.
///
/// `a - b + c` comes back as `(a, [(Sub, b), (Add, c)])`. A root that is not
/// a sum is its own head with no links.
pub fn additive_chain(ctx: &Context, root: ExprId) -> (ExprId, Vec<(ChainOp, ExprId)>) {
    let mut links = Vec::new();
    let mut current = root;
    loop {
        match ctx.get(current) {
            Expr::Add(l, r) => {
                links.push((ChainOp::Add, *r));
                current = *l;
            }
            Expr::Sub(l, r) => {
                links.push((ChainOp::Sub, *r));
                current = *l;
            }
            _ => break,
        }
    }
    links.reverse();
    (current, links)
}

/// Flatten the left spine of `Mul`/`Div` nodes under `root`.
pub fn multiplicative_chain(ctx: &Context, root: ExprId) -> (ExprId, Vec<(ChainOp, ExprId)>) {
    let mut links = Vec::new();
    let mut current = root;
    loop {
        match ctx.get(current) {
            Expr::Mul(l, r) => {
                links.push((ChainOp::Mul, *r));
                current = *l;
            }
            Expr::Div(l, r) => {
                links.push((ChainOp::Div, *r));
                current = *l;
            }
            _ => break,
        }
    }
    links.reverse();
    (current, links)
}

/// Fold a flattened chain back into a left-associative tree.
pub fn rebuild_chain(ctx: &mut Context, head: ExprId, links: &[(ChainOp, ExprId)]) -> ExprId {
    links
        .iter()
        .fold(head, |acc, (op, operand)| ctx.add(op.join(acc, *operand)))
}

/// Replace every occurrence of variable `var` with `replacement`.
///
/// Returns `root` unchanged when the variable does not occur. Sums and
/// products are walked as chains, so only nesting of different operators
/// costs stack.
pub fn substitute_variable(
    ctx: &mut Context,
    root: ExprId,
    var: &str,
    replacement: ExprId,
) -> ExprId {
    let expr = ctx.get(root).clone();
    match expr {
        Expr::Variable(name) if name == var => replacement,
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => root,
        Expr::Add(_, _) | Expr::Sub(_, _) => {
            let (head, links) = additive_chain(ctx, root);
            substitute_chain(ctx, root, head, links, var, replacement)
        }
        Expr::Mul(_, _) | Expr::Div(_, _) => {
            let (head, links) = multiplicative_chain(ctx, root);
            substitute_chain(ctx, root, head, links, var, replacement)
        }
        Expr::Pow(b, e) => {
            let nb = substitute_variable(ctx, b, var, replacement);
            let ne = substitute_variable(ctx, e, var, replacement);
            if (nb, ne) == (b, e) {
                root
            } else {
                ctx.add(Expr::Pow(nb, ne))
            }
        }
        Expr::Neg(inner) => {
            let new_inner = substitute_variable(ctx, inner, var, replacement);
            if new_inner == inner {
                root
            } else {
                ctx.add(Expr::Neg(new_inner))
            }
        }
        Expr::Function(name, args) => {
            let new_args: Vec<ExprId> = args
                .iter()
                .map(|a| substitute_variable(ctx, *a, var, replacement))
                .collect();
            if new_args == args {
                root
            } else {
                ctx.add(Expr::Function(name, new_args))
            }
        }
    }
}

fn substitute_chain(
    ctx: &mut Context,
    root: ExprId,
    head: ExprId,
    links: Vec<(ChainOp, ExprId)>,
    var: &str,
    replacement: ExprId,
) -> ExprId {
    let new_head = substitute_variable(ctx, head, var, replacement);
    let mut changed = new_head != head;
    let mut new_links = Vec::with_capacity(links.len());
    for (op, operand) in links {
        let new_operand = substitute_variable(ctx, operand, var, replacement);
        changed |= new_operand != operand;
        new_links.push((op, new_operand));
    }
    if changed {
        rebuild_chain(ctx, new_head, &new_links)
    } else {
        root
    }
}
