//! Exact polynomial normal form over opaque atoms.
//!
//! A [`Poly`] is a sum of terms `coefficient * Π atom^exponent` with
//! `BigRational` coefficients and exponents. Two expressions that expand to
//! the same sum of terms produce equal `Poly` values, which is what makes
//! "difference simplifies to zero" decidable for polynomial-shaped input.

use mathcheck_ast::Constant;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Atom exponents of one term. Exponents are never zero.
pub(crate) type Monomial = BTreeMap<Atom, BigRational>;

#[derive(Debug, Clone)]
pub(crate) enum AtomKind {
    Symbol(String),
    Constant(Constant),
    /// Positive rational under a fractional power, e.g. the `2` of `2^(1/2)`.
    Radicand(BigRational),
    /// Polynomial kept as a unit because its power could not be expanded.
    Group(Poly),
    Call(String, Vec<Poly>),
    /// `base^exponent` where the exponent is not a number.
    Exponential(Box<Poly>, Box<Poly>),
}

/// Ordered by `(rank, key)`; the key is a canonical rendering of the kind, so
/// structurally equal atoms compare equal.
#[derive(Debug, Clone)]
pub(crate) struct Atom {
    rank: u8,
    key: String,
    pub(crate) kind: AtomKind,
}

impl Atom {
    pub(crate) fn symbol(name: &str) -> Self {
        Atom {
            rank: 0,
            key: name.to_string(),
            kind: AtomKind::Symbol(name.to_string()),
        }
    }

    pub(crate) fn constant(c: Constant) -> Self {
        Atom {
            rank: 1,
            key: c.name().to_string(),
            kind: AtomKind::Constant(c),
        }
    }

    pub(crate) fn call(name: &str, args: Vec<Poly>) -> Self {
        let keys: Vec<String> = args.iter().map(Poly::key).collect();
        Atom {
            rank: 2,
            key: format!("{}({})", name, keys.join(",")),
            kind: AtomKind::Call(name.to_string(), args),
        }
    }

    pub(crate) fn exponential(base: Poly, exponent: Poly) -> Self {
        Atom {
            rank: 3,
            key: format!("({})^({})", base.key(), exponent.key()),
            kind: AtomKind::Exponential(Box::new(base), Box::new(exponent)),
        }
    }

    pub(crate) fn group(poly: Poly) -> Self {
        Atom {
            rank: 4,
            key: format!("({})", poly.key()),
            kind: AtomKind::Group(poly),
        }
    }

    pub(crate) fn radicand(value: BigRational) -> Self {
        Atom {
            rank: 5,
            key: value.to_string(),
            kind: AtomKind::Radicand(value),
        }
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank && self.key == other.key
    }
}

impl Eq for Atom {}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.key.cmp(&other.key))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Poly {
    terms: BTreeMap<Monomial, BigRational>,
}

impl Poly {
    pub(crate) fn zero() -> Self {
        Poly::default()
    }

    pub(crate) fn one() -> Self {
        Poly::constant(BigRational::one())
    }

    pub(crate) fn constant(value: BigRational) -> Self {
        Poly::term(value, Monomial::new())
    }

    pub(crate) fn term(coefficient: BigRational, monomial: Monomial) -> Self {
        let mut terms = BTreeMap::new();
        if !coefficient.is_zero() {
            terms.insert(monomial, coefficient);
        }
        Poly { terms }
    }

    pub(crate) fn from_atom(atom: Atom) -> Self {
        let mut monomial = Monomial::new();
        monomial.insert(atom, BigRational::one());
        Poly::term(BigRational::one(), monomial)
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub(crate) fn is_one(&self) -> bool {
        self.as_constant().is_some_and(|c| c.is_one())
    }

    pub(crate) fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => {
                let (monomial, coefficient) = self.terms.iter().next()?;
                monomial.is_empty().then(|| coefficient.clone())
            }
            _ => None,
        }
    }

    pub(crate) fn single_term(&self) -> Option<(&Monomial, &BigRational)> {
        if self.terms.len() == 1 {
            self.terms.iter().next()
        } else {
            None
        }
    }

    /// The lone atom of a `1 * atom^1` polynomial.
    pub(crate) fn as_atom(&self) -> Option<&Atom> {
        let (monomial, coefficient) = self.single_term()?;
        if !coefficient.is_one() || monomial.len() != 1 {
            return None;
        }
        let (atom, exponent) = monomial.iter().next()?;
        exponent.is_one().then_some(atom)
    }

    pub(crate) fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    /// Coefficient of the first term in canonical order.
    pub(crate) fn leading_coefficient(&self) -> Option<&BigRational> {
        self.terms.values().next()
    }

    pub(crate) fn add(&self, other: &Poly) -> Poly {
        let mut terms = self.terms.clone();
        for (monomial, coefficient) in &other.terms {
            let slot = terms
                .entry(monomial.clone())
                .or_insert_with(BigRational::zero);
            *slot += coefficient;
            if slot.is_zero() {
                terms.remove(monomial);
            }
        }
        Poly { terms }
    }

    pub(crate) fn neg(&self) -> Poly {
        self.scale(&-BigRational::one())
    }

    pub(crate) fn sub(&self, other: &Poly) -> Poly {
        self.add(&other.neg())
    }

    pub(crate) fn scale(&self, factor: &BigRational) -> Poly {
        if factor.is_zero() {
            return Poly::zero();
        }
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        }
    }

    /// Canonical text used to key atoms built from this polynomial.
    pub(crate) fn key(&self) -> String {
        if self.terms.is_empty() {
            return "0".to_string();
        }
        let mut out = String::new();
        for (i, (monomial, coefficient)) in self.terms.iter().enumerate() {
            if i > 0 {
                out.push('+');
            }
            let _ = write!(out, "{}", coefficient);
            for (atom, exponent) in monomial {
                let _ = write!(out, "*{}^{}", atom.key, exponent);
            }
        }
        out
    }
}

/// Sum of exponents of a term, used to order terms by degree.
pub(crate) fn degree(monomial: &Monomial) -> BigRational {
    monomial
        .values()
        .fold(BigRational::zero(), |acc, e| acc + e)
}

/// Product of two monomials with exponents added and zeros dropped.
pub(crate) fn merge_monomials(a: &Monomial, b: &Monomial) -> Monomial {
    let mut out = a.clone();
    for (atom, exponent) in b {
        let slot = out.entry(atom.clone()).or_insert_with(BigRational::zero);
        *slot += exponent;
        if slot.is_zero() {
            out.remove(atom);
        }
    }
    out
}
