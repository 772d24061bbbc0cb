//! Display formatting for expressions.
//!
//! `DisplayExpr` prints the canonical ASCII form used everywhere a string
//! crosses a crate boundary: `2 * x + 3`, `x^2`, `sin(x) / 2`. Parentheses are
//! emitted only where precedence requires them, so the output re-parses to the
//! same tree shape.

use crate::traversal::{additive_chain, multiplicative_chain, ChainOp};
use crate::{Context, Expr, ExprId};
use num_traits::{Signed, Zero};
use std::fmt;

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_NEG: u8 = 3;
const PREC_POW: u8 = 4;
const PREC_ATOM: u8 = 5;

fn precedence(ctx: &Context, id: ExprId) -> u8 {
    match ctx.get(id) {
        Expr::Add(_, _) | Expr::Sub(_, _) => PREC_ADD,
        Expr::Mul(_, _) | Expr::Div(_, _) => PREC_MUL,
        Expr::Neg(_) => PREC_NEG,
        Expr::Pow(_, _) => PREC_POW,
        Expr::Number(n) if !n.is_integer() => PREC_MUL,
        Expr::Number(n) if n.is_negative() => PREC_NEG,
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) | Expr::Function(_, _) => {
            PREC_ATOM
        }
    }
}

/// True when the printed form of `id` starts with a minus sign.
fn leads_with_minus(ctx: &Context, mut id: ExprId) -> bool {
    loop {
        match ctx.get(id) {
            Expr::Neg(_) => return true,
            Expr::Number(n) => return n.is_negative(),
            Expr::Add(l, _) | Expr::Sub(l, _) | Expr::Mul(l, _) | Expr::Div(l, _) => id = *l,
            _ => return false,
        }
    }
}

pub struct DisplayExpr<'a> {
    pub context: &'a Context,
    pub id: ExprId,
}

impl<'a> DisplayExpr<'a> {
    fn child(&self, id: ExprId) -> DisplayExpr<'a> {
        DisplayExpr {
            context: self.context,
            id,
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, id: ExprId, parens: bool) -> fmt::Result {
        if parens {
            write!(f, "({})", self.child(id))
        } else {
            write!(f, "{}", self.child(id))
        }
    }
}

impl fmt::Display for DisplayExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.context;
        match ctx.get(self.id) {
            Expr::Number(n) => {
                if n.is_integer() {
                    write!(f, "{}", n.numer())
                } else {
                    write!(f, "{}/{}", n.numer(), n.denom())
                }
            }
            Expr::Constant(c) => write!(f, "{}", c.name()),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Add(_, _) | Expr::Sub(_, _) => {
                let (head, links) = additive_chain(ctx, self.id);
                self.write_operand(f, head, false)?;
                for (op, r) in links {
                    if op == ChainOp::Sub {
                        write!(f, " - ")?;
                        let parens = precedence(ctx, r) <= PREC_ADD || leads_with_minus(ctx, r);
                        self.write_operand(f, r, parens)?;
                        continue;
                    }
                    // a + (-b) prints as a - b
                    match ctx.get(r) {
                        Expr::Neg(inner) => {
                            write!(f, " - ")?;
                            self.write_operand(f, *inner, precedence(ctx, *inner) <= PREC_ADD)?;
                        }
                        Expr::Number(n) if n.is_negative() && n.is_integer() => {
                            write!(f, " - {}", -n.numer())?;
                        }
                        _ => {
                            write!(f, " + ")?;
                            self.write_operand(f, r, leads_with_minus(ctx, r))?;
                        }
                    }
                }
                Ok(())
            }
            Expr::Mul(_, _) | Expr::Div(_, _) => {
                let (head, links) = multiplicative_chain(ctx, self.id);
                self.write_operand(f, head, precedence(ctx, head) < PREC_MUL)?;
                for (op, r) in links {
                    write!(f, "{}", if op == ChainOp::Div { " / " } else { " * " })?;
                    let parens = precedence(ctx, r) <= PREC_MUL || leads_with_minus(ctx, r);
                    self.write_operand(f, r, parens)?;
                }
                Ok(())
            }
            Expr::Pow(b, e) => {
                self.write_operand(f, *b, precedence(ctx, *b) <= PREC_POW)?;
                write!(f, "^")?;
                self.write_operand(f, *e, precedence(ctx, *e) < PREC_ATOM)
            }
            Expr::Neg(inner) => {
                write!(f, "-")?;
                let parens = precedence(ctx, *inner) <= PREC_NEG;
                self.write_operand(f, *inner, parens)
            }
            Expr::Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.child(*arg))?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Shorthand used by tests and log statements.
pub fn render(ctx: &Context, id: ExprId) -> String {
    DisplayExpr { context: ctx, id }.to_string()
}

/// True when the node is the literal number zero.
pub fn is_zero_literal(ctx: &Context, id: ExprId) -> bool {
    matches!(ctx.get(id), Expr::Number(n) if n.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    #[test]
    fn test_display_polynomial() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let three = ctx.num(3);
        let sq = ctx.add(Expr::Pow(x, two));
        let three_x = ctx.add(Expr::Mul(three, x));
        let sum = ctx.add(Expr::Add(sq, three_x));
        assert_eq!(render(&ctx, sum), "x^2 + 3 * x");
    }

    #[test]
    fn test_display_add_of_negation_prints_minus() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let neg = ctx.add(Expr::Neg(one));
        let sum = ctx.add(Expr::Add(x, neg));
        assert_eq!(render(&ctx, sum), "x - 1");

        let minus_five = ctx.num(-5);
        let sum2 = ctx.add(Expr::Add(x, minus_five));
        assert_eq!(render(&ctx, sum2), "x - 5");
    }

    #[test]
    fn test_display_parenthesizes_where_needed() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let two = ctx.num(2);
        let sum = ctx.add(Expr::Add(a, b));
        let sq = ctx.add(Expr::Pow(sum, two));
        assert_eq!(render(&ctx, sq), "(a + b)^2");

        let diff = ctx.add(Expr::Sub(a, b));
        let nested = ctx.add(Expr::Sub(a, diff));
        assert_eq!(render(&ctx, nested), "a - (a - b)");

        let half = ctx.rational(BigRational::new(BigInt::from(1), BigInt::from(2)));
        let root = ctx.add(Expr::Pow(a, half));
        assert_eq!(render(&ctx, root), "a^(1/2)");

        let m = ctx.num(-1);
        let inv = ctx.add(Expr::Pow(a, m));
        assert_eq!(render(&ctx, inv), "a^(-1)");
    }

    #[test]
    fn test_display_function_call() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let arg = ctx.add(Expr::Mul(two, x));
        let sin = ctx.call("sin", vec![arg]);
        let over = ctx.add(Expr::Div(sin, two));
        assert_eq!(render(&ctx, over), "sin(2 * x) / 2");
    }

    #[test]
    fn test_display_long_chains() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let neg_x = ctx.add(Expr::Neg(x));
        let mut sum = x;
        for _ in 0..50_000 {
            sum = ctx.add(Expr::Add(sum, one));
        }
        let sum = ctx.add(Expr::Add(sum, neg_x));
        let printed = render(&ctx, sum);
        assert!(printed.starts_with("x + 1 + 1"));
        assert!(printed.ends_with("+ 1 - x"));

        let two = ctx.num(2);
        let mut quot = x;
        for _ in 0..50_000 {
            quot = ctx.add(Expr::Div(quot, two));
        }
        assert!(render(&ctx, quot).ends_with("/ 2 / 2"));
    }
}
