//! Simplification into the exact polynomial normal form and back.
//!
//! `simplify` expands products and integer powers, collects like terms, folds
//! rational constants and exact roots, and evaluates functions at the handful
//! of points with exact values (`sin(0)`, `ln(1)`, `ln(e^u)`...). Everything
//! else becomes an opaque atom, so the result is canonical for polynomials
//! and for rational functions sharing a denominator, and merely tidy for the
//! rest.
//!
//! Fractional powers follow the principal real branch: `(x^2)^(1/2)` is left
//! alone rather than rewritten to `x`.

use crate::error::CasError;
use crate::expression::Expression;
use crate::poly::{degree, merge_monomials, Atom, AtomKind, Monomial, Poly};
use mathcheck_ast::{
    additive_chain, multiplicative_chain, ChainOp, Constant, Context, Expr, ExprId,
};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::collections::BTreeMap;
use tracing::trace;

/// Largest |n| for which `c^n` is computed exactly on rational constants.
const MAX_EXACT_POWER: usize = 1024;
/// Largest argument for which `fact(n)` is folded to an exact integer.
const MAX_EXACT_FACTORIAL: u32 = 170;

#[derive(Debug, Clone, Copy)]
pub struct Simplifier {
    max_expand_exponent: u32,
    max_depth: usize,
}

impl Simplifier {
    pub fn new(max_expand_exponent: u32, max_depth: usize) -> Self {
        Self {
            max_expand_exponent,
            max_depth,
        }
    }

    pub fn simplify(&self, expr: &Expression) -> Result<Expression, CasError> {
        let poly = self.to_poly(expr.context(), expr.root(), 0)?;
        let mut ctx = Context::new();
        let root = poly_to_expr(&mut ctx, &poly);
        trace!(target: "mathcheck::simplify", input = %expr, nodes = ctx.len(), "simplified");
        Ok(Expression::from_parts(ctx, root))
    }

    fn to_poly(&self, ctx: &Context, id: ExprId, depth: usize) -> Result<Poly, CasError> {
        if depth > self.max_depth {
            return Err(CasError::TooDeep(self.max_depth));
        }
        let next = depth + 1;
        match ctx.get(id) {
            Expr::Number(n) => Ok(Poly::constant(n.clone())),
            Expr::Constant(c) => Ok(Poly::from_atom(Atom::constant(*c))),
            Expr::Variable(name) => Ok(Poly::from_atom(Atom::symbol(name))),
            // chains fold in a loop, so only cross-operator nesting counts
            // against the depth limit
            Expr::Add(_, _) | Expr::Sub(_, _) => {
                let (head, links) = additive_chain(ctx, id);
                let mut acc = self.to_poly(ctx, head, next)?;
                for (op, operand) in links {
                    let term = self.to_poly(ctx, operand, next)?;
                    acc = if op == ChainOp::Sub {
                        acc.sub(&term)
                    } else {
                        acc.add(&term)
                    };
                }
                Ok(acc)
            }
            Expr::Mul(_, _) | Expr::Div(_, _) => {
                let (head, links) = multiplicative_chain(ctx, id);
                let mut acc = self.to_poly(ctx, head, next)?;
                for (op, operand) in links {
                    let factor = self.to_poly(ctx, operand, next)?;
                    acc = if op == ChainOp::Div {
                        let inverse = self.reciprocal(&factor)?;
                        self.mul(&acc, &inverse)?
                    } else {
                        self.mul(&acc, &factor)?
                    };
                }
                Ok(acc)
            }
            Expr::Pow(b, e) => {
                let base = self.to_poly(ctx, *b, next)?;
                let exponent = self.to_poly(ctx, *e, next)?;
                self.pow(&base, &exponent)
            }
            Expr::Neg(inner) => Ok(self.to_poly(ctx, *inner, next)?.neg()),
            Expr::Function(name, args) => {
                let args = args
                    .iter()
                    .map(|a| self.to_poly(ctx, *a, next))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(name, args)
            }
        }
    }

    fn mul(&self, a: &Poly, b: &Poly) -> Result<Poly, CasError> {
        if a.is_zero() || b.is_zero() {
            return Ok(Poly::zero());
        }
        if a.is_one() {
            return Ok(b.clone());
        }
        if b.is_one() {
            return Ok(a.clone());
        }
        let mut acc = Poly::zero();
        for (ma, ca) in a.terms() {
            for (mb, cb) in b.terms() {
                let term = self.normalize_term(ca * cb, merge_monomials(ma, mb))?;
                acc = acc.add(&term);
            }
        }
        Ok(acc)
    }

    /// Bring one product term back to normal form: integer parts of radicand
    /// exponents move into the coefficient, exponentials over the same base
    /// merge, and groups raised to small positive integers are expanded.
    fn normalize_term(
        &self,
        coefficient: BigRational,
        monomial: Monomial,
    ) -> Result<Poly, CasError> {
        enum Slot {
            Keep,
            Radicand(BigRational),
            Exponential(String),
            Group(Poly),
        }

        if coefficient.is_zero() {
            return Ok(Poly::zero());
        }
        let mut coefficient = coefficient;
        let mut out = Monomial::new();
        let mut factors: Vec<Poly> = Vec::new();
        let mut exponentials: BTreeMap<String, Vec<(Atom, BigRational)>> = BTreeMap::new();

        for (atom, exponent) in monomial {
            let slot = match &atom.kind {
                AtomKind::Radicand(value) => Slot::Radicand(value.clone()),
                AtomKind::Exponential(base, _) => Slot::Exponential(base.key()),
                AtomKind::Group(poly) if exponent.is_integer() && exponent.is_positive() => {
                    Slot::Group(poly.clone())
                }
                _ => Slot::Keep,
            };
            match slot {
                Slot::Keep => {
                    out.insert(atom, exponent);
                }
                Slot::Radicand(value) => {
                    let whole = exponent.floor();
                    let frac = &exponent - &whole;
                    if !whole.is_zero() {
                        coefficient *= integer_power(&value, &whole.to_integer())?;
                    }
                    if !frac.is_zero() {
                        out.insert(atom, frac);
                    }
                }
                Slot::Exponential(key) => {
                    exponentials.entry(key).or_default().push((atom, exponent));
                }
                Slot::Group(poly) => {
                    match exponent
                        .to_integer()
                        .to_u32()
                        .filter(|n| *n <= self.max_expand_exponent)
                    {
                        Some(n) => factors.push(self.pow_int(&poly, n)?),
                        None => {
                            out.insert(atom, exponent);
                        }
                    }
                }
            }
        }

        for (_, members) in exponentials {
            if members.len() == 1 && members[0].1.is_one() {
                for (atom, exponent) in members {
                    out.insert(atom, exponent);
                }
                continue;
            }
            let mut base = None;
            let mut total = Poly::zero();
            for (atom, exponent) in members {
                if let AtomKind::Exponential(b, x) = atom.kind {
                    total = total.add(&x.scale(&exponent));
                    base = Some(*b);
                }
            }
            let Some(base) = base else { continue };
            if total.as_constant().is_some() {
                factors.push(self.pow(&base, &total)?);
            } else {
                out.insert(Atom::exponential(base, total), BigRational::one());
            }
        }

        let mut result = Poly::term(coefficient, out);
        for factor in factors {
            result = self.mul(&result, &factor)?;
        }
        Ok(result)
    }

    fn pow(&self, base: &Poly, exponent: &Poly) -> Result<Poly, CasError> {
        let Some(r) = exponent.as_constant() else {
            if base.is_one() {
                return Ok(Poly::one());
            }
            return Ok(Poly::from_atom(Atom::exponential(
                base.clone(),
                exponent.clone(),
            )));
        };
        if r.is_zero() {
            return Ok(Poly::one());
        }
        if r.is_one() {
            return Ok(base.clone());
        }
        if let Some(c) = base.as_constant() {
            return rational_power(&c, &r);
        }
        if let Some((monomial, coefficient)) = base.single_term() {
            if let Some(p) = self.pow_monomial(coefficient, monomial, &r)? {
                return Ok(p);
            }
        }
        if r.is_integer() {
            let n = r.to_integer();
            let small = n
                .abs()
                .to_u32()
                .filter(|k| *k <= self.max_expand_exponent);
            match small {
                Some(k) if n.is_positive() => return self.pow_int(base, k),
                Some(k) if k > 1 => {
                    let expanded = self.pow_int(base, k)?;
                    return self.reciprocal(&expanded);
                }
                _ => {}
            }
        }
        self.group_power(base, &r)
    }

    /// `(c * Π a^e)^r`, or `None` when distributing `r` would change the value
    /// for negative atoms (an even root of an even power).
    fn pow_monomial(
        &self,
        coefficient: &BigRational,
        monomial: &Monomial,
        r: &BigRational,
    ) -> Result<Option<Poly>, CasError> {
        if !r.is_integer() {
            let odd_root = r.denom().is_odd();
            let sound = odd_root
                || monomial
                    .values()
                    .all(|e| e.numer().is_odd() || (e * r).numer().is_even());
            if !sound || (coefficient.is_negative() && !odd_root) {
                return Ok(None);
            }
        }
        let scaled: Monomial = monomial
            .iter()
            .map(|(atom, e)| (atom.clone(), e * r))
            .collect();
        let atoms = self.normalize_term(BigRational::one(), scaled)?;
        let coefficient = rational_power(coefficient, r)?;
        Ok(Some(self.mul(&coefficient, &atoms)?))
    }

    fn pow_int(&self, base: &Poly, n: u32) -> Result<Poly, CasError> {
        let mut result = Poly::one();
        let mut square = base.clone();
        let mut k = n;
        while k > 0 {
            if k & 1 == 1 {
                result = self.mul(&result, &square)?;
            }
            k >>= 1;
            if k > 0 {
                square = self.mul(&square, &square)?;
            }
        }
        Ok(result)
    }

    fn reciprocal(&self, p: &Poly) -> Result<Poly, CasError> {
        if p.is_zero() {
            return Err(CasError::DivisionByZero);
        }
        self.pow(p, &Poly::constant(-BigRational::one()))
    }

    /// Keep `base^r` as a group atom, pulling the leading coefficient out so
    /// `1/(2x + 2)` and `1/(x + 1) / 2` share the same atom.
    fn group_power(&self, base: &Poly, r: &BigRational) -> Result<Poly, CasError> {
        let lead = base
            .leading_coefficient()
            .cloned()
            .unwrap_or_else(BigRational::one);
        if lead.is_one() || (!r.is_integer() && lead.is_negative()) {
            let mut monomial = Monomial::new();
            monomial.insert(Atom::group(base.clone()), r.clone());
            return Ok(Poly::term(BigRational::one(), monomial));
        }
        let unit = base.scale(&lead.recip());
        let mut monomial = Monomial::new();
        monomial.insert(Atom::group(unit), r.clone());
        let coefficient = rational_power(&lead, r)?;
        self.mul(&coefficient, &Poly::term(BigRational::one(), monomial))
    }

    fn call(&self, name: &str, args: Vec<Poly>) -> Result<Poly, CasError> {
        if name == "log" && args.len() == 2 {
            let value = self.call("ln", vec![args[0].clone()])?;
            let base = self.call("ln", vec![args[1].clone()])?;
            let inverse = self.reciprocal(&base)?;
            return self.mul(&value, &inverse);
        }
        if args.len() != 1 {
            return Ok(Poly::from_atom(Atom::call(name, args)));
        }

        let arg = &args[0];
        let constant = arg.as_constant();
        match name {
            "sqrt" => return self.pow(arg, &Poly::constant(half())),
            "exp" => return self.pow(&Poly::from_atom(Atom::constant(Constant::E)), arg),
            "sec" => {
                let cos = self.call("cos", vec![arg.clone()])?;
                return self.reciprocal(&cos);
            }
            "csc" => {
                let sin = self.call("sin", vec![arg.clone()])?;
                return self.reciprocal(&sin);
            }
            "cot" => {
                let cos = self.call("cos", vec![arg.clone()])?;
                let sin = self.call("sin", vec![arg.clone()])?;
                let inverse = self.reciprocal(&sin)?;
                return self.mul(&cos, &inverse);
            }
            "sin" | "tan" | "asin" | "atan" | "sinh" | "tanh" if arg.is_zero() => {
                return Ok(Poly::zero())
            }
            "cos" | "cosh" if arg.is_zero() => return Ok(Poly::one()),
            "acos" if arg.is_one() => return Ok(Poly::zero()),
            "ln" => {
                if let Some(c) = &constant {
                    if c.is_one() {
                        return Ok(Poly::zero());
                    }
                    if !c.is_positive() {
                        return Err(CasError::domain("ln", format!("{} is not positive", c)));
                    }
                }
                if let Some(exponent) = power_of_e(arg) {
                    return Ok(exponent);
                }
            }
            "abs" => {
                if let Some(c) = &constant {
                    return Ok(Poly::constant(c.abs()));
                }
            }
            "fact" => {
                if let Some(c) = &constant {
                    return factorial(c).map(Poly::constant);
                }
            }
            _ => {}
        }
        Ok(Poly::from_atom(Atom::call(name, args)))
    }
}

fn half() -> BigRational {
    BigRational::new(BigInt::one(), BigInt::from(2))
}

/// `u` when `p` is `e^u`.
fn power_of_e(p: &Poly) -> Option<Poly> {
    let (monomial, coefficient) = p.single_term()?;
    if !coefficient.is_one() || monomial.len() != 1 {
        return None;
    }
    let (atom, exponent) = monomial.iter().next()?;
    match &atom.kind {
        AtomKind::Constant(Constant::E) => Some(Poly::constant(exponent.clone())),
        AtomKind::Exponential(base, x) if exponent.is_one() => {
            let is_e = matches!(
                base.as_atom().map(|a| &a.kind),
                Some(AtomKind::Constant(Constant::E))
            );
            is_e.then(|| (**x).clone())
        }
        _ => None,
    }
}

fn factorial(c: &BigRational) -> Result<BigRational, CasError> {
    if !c.is_integer() || c.is_negative() {
        return Err(CasError::domain(
            "fact",
            format!("{} is not a non-negative integer", c),
        ));
    }
    let n = c
        .to_integer()
        .to_u32()
        .filter(|n| *n <= MAX_EXACT_FACTORIAL)
        .ok_or_else(|| CasError::Overflow(c.to_string()))?;
    let product = (2..=n).fold(BigInt::one(), |acc, k| acc * BigInt::from(k));
    Ok(BigRational::from_integer(product))
}

fn integer_power(c: &BigRational, n: &BigInt) -> Result<BigRational, CasError> {
    let k = n
        .abs()
        .to_usize()
        .filter(|k| *k <= MAX_EXACT_POWER)
        .ok_or_else(|| CasError::Overflow(n.to_string()))?;
    if c.is_zero() && n.is_negative() {
        return Err(CasError::DivisionByZero);
    }
    let raised = BigRational::new(
        num_traits::pow(c.numer().clone(), k),
        num_traits::pow(c.denom().clone(), k),
    );
    Ok(if n.is_negative() { raised.recip() } else { raised })
}

fn exact_root(n: &BigInt, k: u32) -> Option<BigInt> {
    let root = n.nth_root(k);
    (num_traits::pow(root.clone(), k as usize) == *n).then_some(root)
}

/// `c^r` for rational `c` and `r`, exact where the root is rational and a
/// radicand atom otherwise.
fn rational_power(c: &BigRational, r: &BigRational) -> Result<Poly, CasError> {
    if r.is_integer() {
        return integer_power(c, &r.to_integer()).map(Poly::constant);
    }
    if c.is_zero() {
        return if r.is_positive() {
            Ok(Poly::zero())
        } else {
            Err(CasError::DivisionByZero)
        };
    }
    if c.is_negative() {
        if r.denom().is_even() {
            return Err(CasError::domain(
                "pow",
                format!("even root of negative number {}", c),
            ));
        }
        let magnitude = rational_power(&-c, r)?;
        return Ok(if r.numer().is_odd() {
            magnitude.neg()
        } else {
            magnitude
        });
    }
    let index = r
        .denom()
        .to_u32()
        .ok_or_else(|| CasError::Overflow(r.to_string()))?;
    if let (Some(n), Some(d)) = (exact_root(c.numer(), index), exact_root(c.denom(), index)) {
        return integer_power(&BigRational::new(n, d), r.numer()).map(Poly::constant);
    }
    let whole = r.floor();
    let frac = r - &whole;
    let scale = integer_power(c, &whole.to_integer())?;
    let mut monomial = Monomial::new();
    monomial.insert(Atom::radicand(c.clone()), frac);
    Ok(Poly::term(scale, monomial))
}

// ============================================================================
// Back to expression trees
// ============================================================================

/// Render a polynomial as a tree: terms by descending degree, negative terms
/// as subtraction, negative exponents in a denominator.
pub(crate) fn poly_to_expr(ctx: &mut Context, poly: &Poly) -> ExprId {
    let mut terms: Vec<(&Monomial, &BigRational)> = poly.terms().collect();
    terms.sort_by(|a, b| degree(b.0).cmp(&degree(a.0)).then_with(|| a.0.cmp(b.0)));

    let mut acc: Option<ExprId> = None;
    for (monomial, coefficient) in terms {
        let next = match acc {
            None => term_to_expr(ctx, coefficient, monomial),
            Some(prev) if coefficient.is_negative() => {
                let term = term_to_expr(ctx, &-coefficient, monomial);
                ctx.add(Expr::Sub(prev, term))
            }
            Some(prev) => {
                let term = term_to_expr(ctx, coefficient, monomial);
                ctx.add(Expr::Add(prev, term))
            }
        };
        acc = Some(next);
    }
    acc.unwrap_or_else(|| ctx.num(0))
}

fn term_to_expr(ctx: &mut Context, coefficient: &BigRational, monomial: &Monomial) -> ExprId {
    if monomial.is_empty() {
        return ctx.rational(coefficient.clone());
    }
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for (atom, exponent) in monomial {
        if exponent.is_negative() {
            denominator.push(atom_power(ctx, atom, &-exponent));
        } else {
            numerator.push(atom_power(ctx, atom, exponent));
        }
    }

    let numer = coefficient.numer();
    let mut negate = false;
    if numerator.is_empty() || !numer.abs().is_one() {
        let c = ctx.rational(BigRational::from_integer(numer.clone()));
        numerator.insert(0, c);
    } else if numer.is_negative() {
        negate = true;
    }
    let denom = coefficient.denom();
    if !denom.is_one() {
        let d = ctx.rational(BigRational::from_integer(denom.clone()));
        denominator.insert(0, d);
    }

    let mut top = product(ctx, &numerator);
    if negate {
        top = ctx.add(Expr::Neg(top));
    }
    if denominator.is_empty() {
        top
    } else {
        let bottom = product(ctx, &denominator);
        ctx.add(Expr::Div(top, bottom))
    }
}

fn product(ctx: &mut Context, factors: &[ExprId]) -> ExprId {
    let mut iter = factors.iter().copied();
    let first = iter.next().unwrap_or_else(|| ctx.num(1));
    iter.fold(first, |acc, f| ctx.add(Expr::Mul(acc, f)))
}

fn atom_power(ctx: &mut Context, atom: &Atom, exponent: &BigRational) -> ExprId {
    let base = atom_to_expr(ctx, atom);
    if exponent.is_one() {
        base
    } else {
        let e = ctx.rational(exponent.clone());
        ctx.add(Expr::Pow(base, e))
    }
}

fn atom_to_expr(ctx: &mut Context, atom: &Atom) -> ExprId {
    match &atom.kind {
        AtomKind::Symbol(name) => ctx.var(name),
        AtomKind::Constant(c) => ctx.constant(*c),
        AtomKind::Radicand(value) => ctx.rational(value.clone()),
        AtomKind::Group(poly) => poly_to_expr(ctx, poly),
        AtomKind::Call(name, args) => {
            let args = args.iter().map(|a| poly_to_expr(ctx, a)).collect();
            ctx.call(name, args)
        }
        AtomKind::Exponential(base, exponent) => {
            let b = poly_to_expr(ctx, base);
            let e = poly_to_expr(ctx, exponent);
            ctx.add(Expr::Pow(b, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathcheck_ast::render;
    use mathcheck_parser::parse;

    fn simplified(input: &str) -> String {
        let mut ctx = Context::new();
        let root = parse(input, &mut ctx).expect("parse");
        let expr = Expression::from_parts(ctx, root);
        Simplifier::new(16, 200)
            .simplify(&expr)
            .map(|e| render(e.context(), e.root()))
            .expect("simplify")
    }

    fn simplify_err(input: &str) -> CasError {
        let mut ctx = Context::new();
        let root = parse(input, &mut ctx).expect("parse");
        Simplifier::new(16, 200)
            .simplify(&Expression::from_parts(ctx, root))
            .expect_err("should fail")
    }

    #[test]
    fn test_collects_like_terms() {
        assert_eq!(simplified("2x + 3 + x - 1"), "3 * x + 2");
        assert_eq!(simplified("x + x + x"), "3 * x");
        assert_eq!(simplified("(2x + 3) - (2 * x + 3)"), "0");
    }

    #[test]
    fn test_expands_products_and_powers() {
        assert_eq!(simplified("(x + 1)^2"), "x^2 + 2 * x + 1");
        assert_eq!(simplified("(x + 1)(x - 1)"), "x^2 - 1");
        assert_eq!(simplified("2(x + 3)"), "2 * x + 6");
    }

    #[test]
    fn test_folds_constants() {
        assert_eq!(simplified("8 * 5"), "40");
        assert_eq!(simplified("1/2 + 1/3"), "5/6");
        assert_eq!(simplified("2^10"), "1024");
        assert_eq!(simplified("-3 - 4"), "-7");
    }

    #[test]
    fn test_exact_roots() {
        assert_eq!(simplified("sqrt(16)"), "4");
        assert_eq!(simplified("8^(1/3)"), "2");
        assert_eq!(simplified("(-8)^(1/3)"), "-2");
        assert_eq!(simplified("sqrt(2) * sqrt(2)"), "2");
        assert_eq!(simplified("sqrt(2)"), "2^(1/2)");
    }

    #[test]
    fn test_cancels_monomial_quotients() {
        assert_eq!(simplified("x / x"), "1");
        assert_eq!(simplified("x^3 / x"), "x^2");
        assert_eq!(simplified("(2x^2 + 4x) / (2x)"), "x + 2");
        assert_eq!(simplified("x^2 / 2"), "x^2 / 2");
    }

    #[test]
    fn test_rational_function_denominators_share_atoms() {
        assert_eq!(
            simplified("1/(2x + 2) - (1/2) / (x + 1)"),
            "0",
            "leading coefficient is factored out of group atoms"
        );
        assert_eq!(simplified("1 / (x + 1)"), "1 / (x + 1)");
    }

    #[test]
    fn test_exponentials_merge() {
        assert_eq!(simplified("e^x * e^x"), "e^(2 * x)");
        assert_eq!(simplified("e^x * e^(-x)"), "1");
        assert_eq!(simplified("exp(2x) * 2 - 2 * e^(2x)"), "0");
    }

    #[test]
    fn test_known_function_values() {
        assert_eq!(simplified("sin(0) + cos(0)"), "1");
        assert_eq!(simplified("ln(1)"), "0");
        assert_eq!(simplified("ln(e)"), "1");
        assert_eq!(simplified("ln(e^(3x))"), "3 * x");
        assert_eq!(simplified("abs(-3)"), "3");
        assert_eq!(simplified("5!"), "120");
    }

    #[test]
    fn test_reciprocal_trig_rewrites() {
        assert_eq!(simplified("sec(x)^2 - 1 / cos(x)^2"), "0");
        assert_eq!(simplified("sin(x) * csc(x)"), "1");
    }

    #[test]
    fn test_even_root_of_even_power_kept() {
        assert_ne!(simplified("sqrt(x^2)"), "x");
        assert_eq!(simplified("sqrt(x) * sqrt(x)"), "x");
        assert_eq!(simplified("(x^4)^(1/2)"), "x^2");
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(simplify_err("1 / 0"), CasError::DivisionByZero);
        assert_eq!(simplify_err("x / (x - x)"), CasError::DivisionByZero);
        assert!(matches!(simplify_err("ln(-2)"), CasError::Domain { .. }));
        assert!(matches!(simplify_err("(-4)^(1/2)"), CasError::Domain { .. }));
        assert!(matches!(simplify_err("(-1)!"), CasError::Domain { .. }));
    }

    #[test]
    fn test_large_powers_stay_grouped() {
        let out = simplified("(x + 1)^40");
        assert_eq!(out, "(x + 1)^40");
    }

    #[test]
    fn test_depth_limit() {
        let mut ctx = Context::new();
        let mut root = ctx.var("x");
        for _ in 0..300 {
            root = ctx.add(Expr::Neg(root));
        }
        let err = Simplifier::new(16, 200)
            .simplify(&Expression::from_parts(ctx, root))
            .expect_err("too deep");
        assert_eq!(err, CasError::TooDeep(200));
    }

    #[test]
    fn test_long_sum_is_not_too_deep() {
        let sum = vec!["1"; 250].join(" + ");
        assert_eq!(simplified(&sum), "250");

        let mixed = vec!["x"; 300].join(" - 1 + ");
        assert_eq!(simplified(&mixed), "300 * x - 299");

        let product = vec!["2"; 40].join(" * ");
        assert_eq!(simplified(&product), "1099511627776");
    }
}
