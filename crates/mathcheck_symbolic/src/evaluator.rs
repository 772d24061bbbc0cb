//! Checked floating-point evaluation.
//!
//! Every failure is a typed [`CasError`]: division by an exact zero, a value
//! outside a function's real domain, a non-finite intermediate, a variable
//! with no value, or nesting beyond the depth budget.

use crate::error::CasError;
use mathcheck_ast::{additive_chain, multiplicative_chain, ChainOp, Context, Expr, ExprId};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::collections::HashMap;

/// Evaluate `expr` with `var_map` supplying every free variable.
pub fn eval_f64(
    ctx: &Context,
    expr: ExprId,
    var_map: &HashMap<String, f64>,
    max_depth: usize,
) -> Result<f64, CasError> {
    eval_depth(ctx, expr, var_map, max_depth, 0)
}

fn finite(value: f64) -> Result<f64, CasError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CasError::NonFinite)
    }
}

fn eval_depth(
    ctx: &Context,
    expr: ExprId,
    var_map: &HashMap<String, f64>,
    max_depth: usize,
    depth: usize,
) -> Result<f64, CasError> {
    if depth > max_depth {
        return Err(CasError::TooDeep(max_depth));
    }
    let eval = |id: ExprId| eval_depth(ctx, id, var_map, max_depth, depth + 1);

    let value = match ctx.get(expr) {
        Expr::Number(n) => n.to_f64().ok_or(CasError::NonFinite)?,
        Expr::Constant(c) => c.value(),
        Expr::Variable(name) => *var_map
            .get(name)
            .ok_or_else(|| CasError::UnboundVariable(name.clone()))?,
        Expr::Add(_, _) | Expr::Sub(_, _) => {
            let (head, links) = additive_chain(ctx, expr);
            let mut acc = eval(head)?;
            for (op, operand) in links {
                let value = eval(operand)?;
                acc = finite(if op == ChainOp::Sub { acc - value } else { acc + value })?;
            }
            acc
        }
        Expr::Mul(_, _) | Expr::Div(_, _) => {
            let (head, links) = multiplicative_chain(ctx, expr);
            let mut acc = eval(head)?;
            for (op, operand) in links {
                let value = eval(operand)?;
                acc = if op == ChainOp::Div {
                    if value == 0.0 {
                        return Err(CasError::DivisionByZero);
                    }
                    finite(acc / value)?
                } else {
                    finite(acc * value)?
                };
            }
            acc
        }
        Expr::Pow(b, e) => {
            let base = eval(*b)?;
            // odd roots of negative numbers stay real: (-8)^(1/3) = -2
            if let Some(q) = exact_rational(ctx, *e) {
                if base < 0.0 && !q.is_integer() {
                    if q.denom().is_even() {
                        return Err(CasError::domain(
                            "pow",
                            format!("even root of negative number {}", base),
                        ));
                    }
                    let magnitude = base.abs().powf(q.to_f64().ok_or(CasError::NonFinite)?);
                    let sign = if q.numer().is_odd() { -1.0 } else { 1.0 };
                    return finite(sign * magnitude);
                }
            }
            let exponent = eval(*e)?;
            if base == 0.0 && exponent < 0.0 {
                return Err(CasError::DivisionByZero);
            }
            if base < 0.0 && exponent.fract() != 0.0 {
                return Err(CasError::domain(
                    "pow",
                    format!("{} raised to non-integer {}", base, exponent),
                ));
            }
            base.powf(exponent)
        }
        Expr::Neg(inner) => -eval(*inner)?,
        Expr::Function(name, args) => {
            let values = args
                .iter()
                .map(|a| eval(*a))
                .collect::<Result<Vec<_>, _>>()?;
            eval_function(name, &values)?
        }
    };
    finite(value)
}

/// The exponent as an exact rational when it is built only from numbers.
fn exact_rational(ctx: &Context, id: ExprId) -> Option<BigRational> {
    match ctx.get(id) {
        Expr::Number(q) => Some(q.clone()),
        Expr::Neg(inner) => exact_rational(ctx, *inner).map(|q| -q),
        Expr::Div(a, b) => {
            let den = exact_rational(ctx, *b)?;
            if den.is_zero() {
                return None;
            }
            Some(exact_rational(ctx, *a)? / den)
        }
        _ => None,
    }
}

fn eval_function(name: &str, args: &[f64]) -> Result<f64, CasError> {
    let unary = |f: fn(f64) -> f64| -> Result<f64, CasError> {
        match args {
            [x] => Ok(f(*x)),
            _ => Err(CasError::UnknownFunction(format!(
                "{}/{}",
                name,
                args.len()
            ))),
        }
    };

    match name {
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "tan" => {
            let x = unary(|x| x)?;
            if x.cos() == 0.0 {
                return Err(CasError::domain("tan", "argument at a pole"));
            }
            Ok(x.tan())
        }
        "sec" => {
            let c = unary(f64::cos)?;
            if c == 0.0 {
                return Err(CasError::DivisionByZero);
            }
            Ok(1.0 / c)
        }
        "csc" => {
            let s = unary(f64::sin)?;
            if s == 0.0 {
                return Err(CasError::DivisionByZero);
            }
            Ok(1.0 / s)
        }
        "cot" => {
            let x = unary(|x| x)?;
            if x.sin() == 0.0 {
                return Err(CasError::DivisionByZero);
            }
            Ok(x.cos() / x.sin())
        }
        "asin" | "acos" => {
            let x = unary(|x| x)?;
            if !(-1.0..=1.0).contains(&x) {
                return Err(CasError::domain(name, format!("{} is outside [-1, 1]", x)));
            }
            Ok(if name == "asin" { x.asin() } else { x.acos() })
        }
        "atan" => unary(f64::atan),
        "sinh" => unary(f64::sinh),
        "cosh" => unary(f64::cosh),
        "tanh" => unary(f64::tanh),
        "exp" => unary(f64::exp),
        "ln" => {
            let x = unary(|x| x)?;
            if x <= 0.0 {
                return Err(CasError::domain("ln", format!("{} is not positive", x)));
            }
            Ok(x.ln())
        }
        "log" => match args {
            [x] if *x > 0.0 => Ok(x.ln()),
            [x, b] if *x > 0.0 && *b > 0.0 && *b != 1.0 => Ok(x.ln() / b.ln()),
            _ => Err(CasError::domain("log", format!("invalid arguments {:?}", args))),
        },
        "sqrt" => {
            let x = unary(|x| x)?;
            if x < 0.0 {
                return Err(CasError::domain("sqrt", format!("{} is negative", x)));
            }
            Ok(x.sqrt())
        }
        "abs" => unary(f64::abs),
        "fact" => {
            let x = unary(|x| x)?;
            if x < 0.0 || x.fract() != 0.0 {
                return Err(CasError::domain(
                    "fact",
                    format!("{} is not a non-negative integer", x),
                ));
            }
            Ok((2..=x as u64).fold(1.0, |acc, k| acc * k as f64))
        }
        _ => Err(CasError::UnknownFunction(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathcheck_parser::parse;

    fn eval_str(input: &str, vars: &[(&str, f64)]) -> Result<f64, CasError> {
        let mut ctx = Context::new();
        let root = parse(input, &mut ctx).expect("parse");
        let map: HashMap<String, f64> = vars.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        eval_f64(&ctx, root, &map, 200)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_str("8 * 5", &[]), Ok(40.0));
        assert_eq!(eval_str("2^10 - 24", &[]), Ok(1000.0));
        let third = eval_str("1/3", &[]).expect("eval");
        assert!((third - 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_variables_and_functions() {
        let v = eval_str("x^2 + 5x", &[("x", 2.0)]).expect("eval");
        assert_eq!(v, 14.0);
        let s = eval_str("sin(pi / 2) + ln(e)", &[]).expect("eval");
        assert!((s - 2.0).abs() < 1e-12);
        assert_eq!(eval_str("log(8, 2)", &[]).map(|v| v.round()), Ok(3.0));
        assert_eq!(eval_str("4!", &[]), Ok(24.0));
    }

    #[test]
    fn test_long_chains_within_depth() {
        let sum = vec!["1"; 1_000].join(" + ");
        assert_eq!(eval_str(&sum, &[]), Ok(1000.0));
        let quotient = format!("1024{}", " / 2".repeat(10));
        assert_eq!(eval_str(&quotient, &[]), Ok(1.0));
        assert_eq!(eval_str("6 / 3 / (1 - 1)", &[]), Err(CasError::DivisionByZero));
    }

    #[test]
    fn test_odd_root_of_negative() {
        let v = eval_str("(-8)^(1/3)", &[]).expect("eval");
        assert!((v + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_errors_are_typed() {
        assert_eq!(eval_str("1 / (x - 1)", &[("x", 1.0)]), Err(CasError::DivisionByZero));
        assert_eq!(
            eval_str("y + 1", &[]),
            Err(CasError::UnboundVariable("y".to_string()))
        );
        assert!(matches!(eval_str("ln(0)", &[]), Err(CasError::Domain { .. })));
        assert!(matches!(eval_str("sqrt(-1)", &[]), Err(CasError::Domain { .. })));
        assert!(matches!(eval_str("asin(2)", &[]), Err(CasError::Domain { .. })));
        assert_eq!(eval_str("10^400", &[]), Err(CasError::NonFinite));
    }

    #[test]
    fn test_depth_budget() {
        let mut ctx = Context::new();
        let mut root = ctx.var("x");
        for _ in 0..50 {
            root = ctx.add(Expr::Neg(root));
        }
        let map = HashMap::from([("x".to_string(), 1.0)]);
        assert_eq!(eval_f64(&ctx, root, &map, 10), Err(CasError::TooDeep(10)));
        assert_eq!(eval_f64(&ctx, root, &map, 200), Ok(1.0));
    }
}
