//! Symbolic differentiation.
//!
//! Implements the constant, sum, product, quotient, power and chain rules
//! over the raw tree. The result is unsimplified; [`crate::Cas`] runs it
//! through the simplifier before handing it out.

use crate::error::CasError;
use mathcheck_ast::{
    additive_chain, contains_named_var, multiplicative_chain, rebuild_chain, render, ChainOp,
    Constant, Context, Expr, ExprId,
};

pub fn differentiate(ctx: &mut Context, expr: ExprId, var: &str) -> Result<ExprId, CasError> {
    // Constant rule: d/dx c = 0
    if !contains_named_var(ctx, expr, var) {
        return Ok(ctx.num(0));
    }

    match ctx.get(expr).clone() {
        Expr::Variable(name) => Ok(ctx.num(if name == var { 1 } else { 0 })),
        Expr::Add(_, _) | Expr::Sub(_, _) => {
            let (head, links) = additive_chain(ctx, expr);
            let d_head = differentiate(ctx, head, var)?;
            let mut d_links = Vec::with_capacity(links.len());
            for (op, operand) in links {
                d_links.push((op, differentiate(ctx, operand, var)?));
            }
            Ok(rebuild_chain(ctx, d_head, &d_links))
        }
        Expr::Neg(inner) => {
            let d = differentiate(ctx, inner, var)?;
            Ok(ctx.add(Expr::Neg(d)))
        }
        Expr::Mul(_, _) | Expr::Div(_, _) => differentiate_product(ctx, expr, var),
        Expr::Pow(base, exp) => differentiate_power(ctx, expr, base, exp, var),
        Expr::Function(name, args) => differentiate_call(ctx, expr, &name, &args, var),
        Expr::Number(_) | Expr::Constant(_) => Ok(ctx.num(0)),
    }
}

/// Product and quotient rules applied left to right along a `Mul`/`Div`
/// chain, carrying the prefix `u` and its derivative `u'`.
fn differentiate_product(ctx: &mut Context, expr: ExprId, var: &str) -> Result<ExprId, CasError> {
    let (head, links) = multiplicative_chain(ctx, expr);
    let mut value = head;
    let mut slope = differentiate(ctx, head, var)?;
    let mut varies = contains_named_var(ctx, head, var);

    for (op, v) in links {
        let dv = differentiate(ctx, v, var)?;
        let v_varies = contains_named_var(ctx, v, var);
        if varies || v_varies {
            // (uv)' = u'v + uv'
            let term1 = ctx.add(Expr::Mul(slope, v));
            let term2 = ctx.add(Expr::Mul(value, dv));
            slope = if op == ChainOp::Div {
                // (u/v)' = (u'v - uv') / v^2
                let num = ctx.add(Expr::Sub(term1, term2));
                let two = ctx.num(2);
                let den = ctx.add(Expr::Pow(v, two));
                ctx.add(Expr::Div(num, den))
            } else {
                ctx.add(Expr::Add(term1, term2))
            };
        }
        varies |= v_varies;
        value = rebuild_chain(ctx, value, &[(op, v)]);
    }
    Ok(slope)
}

fn differentiate_power(
    ctx: &mut Context,
    expr: ExprId,
    base: ExprId,
    exp: ExprId,
    var: &str,
) -> Result<ExprId, CasError> {
    if !contains_named_var(ctx, exp, var) {
        // (u^n)' = n * u^(n-1) * u'
        let db = differentiate(ctx, base, var)?;
        let one = ctx.num(1);
        let n_minus_one = ctx.add(Expr::Sub(exp, one));
        let pow_term = ctx.add(Expr::Pow(base, n_minus_one));
        let term = ctx.add(Expr::Mul(exp, pow_term));
        return Ok(ctx.add(Expr::Mul(term, db)));
    }

    let de = differentiate(ctx, exp, var)?;
    if !contains_named_var(ctx, base, var) {
        // (a^u)' = a^u * ln(a) * u'
        let ln_a = ln_of(ctx, base);
        let term = ctx.add(Expr::Mul(expr, ln_a));
        return Ok(ctx.add(Expr::Mul(term, de)));
    }

    // (u^v)' = u^v * (v' * ln(u) + v * u' / u)
    let db = differentiate(ctx, base, var)?;
    let ln_base = ctx.call("ln", vec![base]);
    let term1 = ctx.add(Expr::Mul(de, ln_base));
    let term2_num = ctx.add(Expr::Mul(exp, db));
    let term2 = ctx.add(Expr::Div(term2_num, base));
    let inner = ctx.add(Expr::Add(term1, term2));
    Ok(ctx.add(Expr::Mul(expr, inner)))
}

/// `ln(a)`, folded to `1` for the constant `e`.
fn ln_of(ctx: &mut Context, base: ExprId) -> ExprId {
    if matches!(ctx.get(base), Expr::Constant(Constant::E)) {
        ctx.num(1)
    } else {
        ctx.call("ln", vec![base])
    }
}

fn differentiate_call(
    ctx: &mut Context,
    expr: ExprId,
    name: &str,
    args: &[ExprId],
    var: &str,
) -> Result<ExprId, CasError> {
    if name == "log" && args.len() == 2 {
        // log(u, b) = ln(u) / ln(b)
        let ln_u = ctx.call("ln", vec![args[0]]);
        let ln_b = ctx.call("ln", vec![args[1]]);
        let quotient = ctx.add(Expr::Div(ln_u, ln_b));
        return differentiate(ctx, quotient, var);
    }
    let [arg] = args else {
        return Err(CasError::NotDifferentiable(render(ctx, expr)));
    };
    let arg = *arg;
    let da = differentiate(ctx, arg, var)?;
    let one = ctx.num(1);
    let two = ctx.num(2);

    // f'(u), multiplied by u' below
    let outer = match name {
        "sin" => ctx.call("cos", vec![arg]),
        "cos" => {
            let sin_u = ctx.call("sin", vec![arg]);
            ctx.add(Expr::Neg(sin_u))
        }
        "tan" => {
            // sec^2(u) = 1 / cos^2(u)
            let cos_u = ctx.call("cos", vec![arg]);
            let cos_sq = ctx.add(Expr::Pow(cos_u, two));
            ctx.add(Expr::Div(one, cos_sq))
        }
        "sec" => {
            let tan_u = ctx.call("tan", vec![arg]);
            ctx.add(Expr::Mul(expr, tan_u))
        }
        "csc" => {
            let cot_u = ctx.call("cot", vec![arg]);
            let prod = ctx.add(Expr::Mul(expr, cot_u));
            ctx.add(Expr::Neg(prod))
        }
        "cot" => {
            let sin_u = ctx.call("sin", vec![arg]);
            let sin_sq = ctx.add(Expr::Pow(sin_u, two));
            let quotient = ctx.add(Expr::Div(one, sin_sq));
            ctx.add(Expr::Neg(quotient))
        }
        "asin" | "acos" => {
            // ±1 / sqrt(1 - u^2)
            let u_sq = ctx.add(Expr::Pow(arg, two));
            let diff = ctx.add(Expr::Sub(one, u_sq));
            let root = ctx.call("sqrt", vec![diff]);
            let quotient = ctx.add(Expr::Div(one, root));
            if name == "asin" {
                quotient
            } else {
                ctx.add(Expr::Neg(quotient))
            }
        }
        "atan" => {
            let u_sq = ctx.add(Expr::Pow(arg, two));
            let sum = ctx.add(Expr::Add(one, u_sq));
            ctx.add(Expr::Div(one, sum))
        }
        "sinh" => ctx.call("cosh", vec![arg]),
        "cosh" => ctx.call("sinh", vec![arg]),
        "tanh" => {
            let cosh_u = ctx.call("cosh", vec![arg]);
            let cosh_sq = ctx.add(Expr::Pow(cosh_u, two));
            ctx.add(Expr::Div(one, cosh_sq))
        }
        "exp" => expr,
        "ln" | "log" => ctx.add(Expr::Div(one, arg)),
        "sqrt" => {
            // 1 / (2 sqrt(u))
            let den = ctx.add(Expr::Mul(two, expr));
            ctx.add(Expr::Div(one, den))
        }
        // u / |u|
        "abs" => ctx.add(Expr::Div(arg, expr)),
        _ => return Err(CasError::NotDifferentiable(render(ctx, expr))),
    };
    Ok(ctx.add(Expr::Mul(outer, da)))
}
