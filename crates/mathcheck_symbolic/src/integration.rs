//! Symbolic integration.
//!
//! Works on simplified input, so polynomials arrive as sums of monomials and
//! quotients as `numerator / denominator` with a constant or power
//! denominator. Handles linearity, constant multiples, the power rule with a
//! linear inner function, `1/(ax+b)`, exponentials and the basic trig and
//! hyperbolic functions of a linear argument. Anything else has no rule and
//! reports [`CasError::NoIntegral`].

use crate::error::CasError;
use mathcheck_ast::{
    additive_chain, contains_named_var, rebuild_chain, render, Constant, Context, Expr, ExprId,
};
use num_rational::BigRational;
use num_traits::One;

pub fn integrate(ctx: &mut Context, expr: ExprId, var: &str) -> Result<ExprId, CasError> {
    integrate_rule(ctx, expr, var).ok_or_else(|| CasError::NoIntegral(render(ctx, expr)))
}

fn integrate_rule(ctx: &mut Context, expr: ExprId, var: &str) -> Option<ExprId> {
    // Constant: ∫c dx = c*x
    if !contains_named_var(ctx, expr, var) {
        let x = ctx.var(var);
        return Some(ctx.add(Expr::Mul(expr, x)));
    }

    match ctx.get(expr).clone() {
        Expr::Add(_, _) | Expr::Sub(_, _) => {
            let (head, links) = additive_chain(ctx, expr);
            let int_head = integrate_rule(ctx, head, var)?;
            let mut int_links = Vec::with_capacity(links.len());
            for (op, operand) in links {
                int_links.push((op, integrate_rule(ctx, operand, var)?));
            }
            Some(rebuild_chain(ctx, int_head, &int_links))
        }
        Expr::Neg(inner) => {
            let int_inner = integrate_rule(ctx, inner, var)?;
            Some(ctx.add(Expr::Neg(int_inner)))
        }
        Expr::Mul(l, r) => {
            // ∫c*f = c*∫f
            if !contains_named_var(ctx, l, var) {
                let int_r = integrate_rule(ctx, r, var)?;
                return Some(ctx.add(Expr::Mul(l, int_r)));
            }
            if !contains_named_var(ctx, r, var) {
                let int_l = integrate_rule(ctx, l, var)?;
                return Some(ctx.add(Expr::Mul(r, int_l)));
            }
            None
        }
        Expr::Div(num, den) => integrate_quotient(ctx, num, den, var),
        Expr::Variable(_) => {
            // ∫x dx = x^2/2
            let two = ctx.num(2);
            let sq = ctx.add(Expr::Pow(expr, two));
            Some(ctx.add(Expr::Div(sq, two)))
        }
        Expr::Pow(base, exp) => integrate_power(ctx, expr, base, exp, var),
        Expr::Function(name, args) => integrate_call(ctx, &name, &args, var),
        Expr::Number(_) | Expr::Constant(_) => None,
    }
}

fn integrate_quotient(ctx: &mut Context, num: ExprId, den: ExprId, var: &str) -> Option<ExprId> {
    // ∫f/c = (∫f)/c
    if !contains_named_var(ctx, den, var) {
        let int_num = integrate_rule(ctx, num, var)?;
        return Some(ctx.add(Expr::Div(int_num, den)));
    }
    if contains_named_var(ctx, num, var) {
        return None;
    }
    // ∫c/(ax+b) = c*ln(ax+b)/a
    if let Some((a, _)) = linear_coeffs(ctx, den, var) {
        let ln_den = ctx.call("ln", vec![den]);
        let quotient = ctx.add(Expr::Div(ln_den, a));
        return Some(ctx.add(Expr::Mul(num, quotient)));
    }
    // ∫c/u^n = c*∫u^(-n)
    if let Expr::Pow(base, exp) = ctx.get(den).clone() {
        if let Expr::Number(n) = ctx.get(exp).clone() {
            let neg = ctx.rational(-n);
            let flipped = ctx.add(Expr::Pow(base, neg));
            let int = integrate_rule(ctx, flipped, var)?;
            return Some(ctx.add(Expr::Mul(num, int)));
        }
    }
    None
}

fn integrate_power(
    ctx: &mut Context,
    expr: ExprId,
    base: ExprId,
    exp: ExprId,
    var: &str,
) -> Option<ExprId> {
    // ∫(ax+b)^n = (ax+b)^(n+1) / (a*(n+1)), n ≠ -1
    if !contains_named_var(ctx, exp, var) {
        if let Some((a, _)) = linear_coeffs(ctx, base, var) {
            if let Expr::Number(n) = ctx.get(exp) {
                if *n == -BigRational::one() {
                    let ln_u = ctx.call("ln", vec![base]);
                    return Some(ctx.add(Expr::Div(ln_u, a)));
                }
            }
            let one = ctx.num(1);
            let new_exp = ctx.add(Expr::Add(exp, one));
            let new_denom = if is_one(ctx, a) {
                new_exp
            } else {
                ctx.add(Expr::Mul(a, new_exp))
            };
            let pow_expr = ctx.add(Expr::Pow(base, new_exp));
            return Some(ctx.add(Expr::Div(pow_expr, new_denom)));
        }

        // ∫1/cos(ax+b)^2 = tan(ax+b)/a
        if let (Expr::Function(name, args), Expr::Number(n)) =
            (ctx.get(base).clone(), ctx.get(exp).clone())
        {
            if name == "cos" && args.len() == 1 && n == BigRational::from_integer((-2).into()) {
                let (a, _) = linear_coeffs(ctx, args[0], var)?;
                let tan_u = ctx.call("tan", vec![args[0]]);
                return Some(divide_unless_one(ctx, tan_u, a));
            }
        }
        return None;
    }

    // ∫c^(ax+b) = c^(ax+b) / (a*ln(c))
    if !contains_named_var(ctx, base, var) {
        let (a, _) = linear_coeffs(ctx, exp, var)?;
        if matches!(ctx.get(base), Expr::Constant(Constant::E)) {
            return Some(divide_unless_one(ctx, expr, a));
        }
        let ln_c = ctx.call("ln", vec![base]);
        let denom = if is_one(ctx, a) {
            ln_c
        } else {
            ctx.add(Expr::Mul(a, ln_c))
        };
        return Some(ctx.add(Expr::Div(expr, denom)));
    }
    None
}

fn integrate_call(ctx: &mut Context, name: &str, args: &[ExprId], var: &str) -> Option<ExprId> {
    let [arg] = args else {
        return None;
    };
    let arg = *arg;
    let (a, _) = linear_coeffs(ctx, arg, var)?;
    let antiderivative = match name {
        "sin" => {
            let cos_u = ctx.call("cos", vec![arg]);
            ctx.add(Expr::Neg(cos_u))
        }
        "cos" => ctx.call("sin", vec![arg]),
        "sinh" => ctx.call("cosh", vec![arg]),
        "cosh" => ctx.call("sinh", vec![arg]),
        "exp" => ctx.call("exp", vec![arg]),
        "sqrt" => {
            // (ax+b)^(3/2) / (3a/2)
            let three_halves = ctx.rational(BigRational::new(3.into(), 2.into()));
            let pow = ctx.add(Expr::Pow(arg, three_halves));
            let scaled = ctx.add(Expr::Div(pow, three_halves));
            return Some(divide_unless_one(ctx, scaled, a));
        }
        _ => return None,
    };
    Some(divide_unless_one(ctx, antiderivative, a))
}

fn divide_unless_one(ctx: &mut Context, value: ExprId, a: ExprId) -> ExprId {
    if is_one(ctx, a) {
        value
    } else {
        ctx.add(Expr::Div(value, a))
    }
}

fn is_one(ctx: &Context, id: ExprId) -> bool {
    matches!(ctx.get(id), Expr::Number(n) if n.is_one())
}

fn is_var(ctx: &Context, expr: ExprId, var: &str) -> bool {
    matches!(ctx.get(expr), Expr::Variable(name) if name == var)
}

/// `(a, b)` such that `expr = a*var + b`, with `a` and `b` free of `var`.
pub(crate) fn linear_coeffs(ctx: &mut Context, expr: ExprId, var: &str) -> Option<(ExprId, ExprId)> {
    if !contains_named_var(ctx, expr, var) {
        return Some((ctx.num(0), expr));
    }

    match ctx.get(expr).clone() {
        Expr::Variable(name) if name == var => Some((ctx.num(1), ctx.num(0))),
        Expr::Mul(l, r) => {
            if !contains_named_var(ctx, l, var) && is_var(ctx, r, var) {
                return Some((l, ctx.num(0)));
            }
            if is_var(ctx, l, var) && !contains_named_var(ctx, r, var) {
                return Some((r, ctx.num(0)));
            }
            None
        }
        Expr::Div(l, r) => {
            // (a*x + b) / c
            if contains_named_var(ctx, r, var) {
                return None;
            }
            let (a, b) = linear_coeffs(ctx, l, var)?;
            let a = ctx.add(Expr::Div(a, r));
            let b = ctx.add(Expr::Div(b, r));
            Some((a, b))
        }
        Expr::Neg(inner) => {
            let (a, b) = linear_coeffs(ctx, inner, var)?;
            Some((ctx.add(Expr::Neg(a)), ctx.add(Expr::Neg(b))))
        }
        Expr::Add(l, r) => {
            let (a1, b1) = linear_coeffs(ctx, l, var)?;
            let (a2, b2) = linear_coeffs(ctx, r, var)?;
            Some((ctx.add(Expr::Add(a1, a2)), ctx.add(Expr::Add(b1, b2))))
        }
        Expr::Sub(l, r) => {
            let (a1, b1) = linear_coeffs(ctx, l, var)?;
            let (a2, b2) = linear_coeffs(ctx, r, var)?;
            Some((ctx.add(Expr::Sub(a1, a2)), ctx.add(Expr::Sub(b1, b2))))
        }
        _ => None,
    }
}
