use mathcheck_ast::{count_all_nodes, Constant, Context, Equation, Expr, ExprId, RelOp};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::multispace0,
    combinator::{map, opt},
    multi::separated_list1,
    sequence::{delimited, pair, preceded},
    IResult,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// Function names the grammar accepts in call position, with their
/// canonical spelling after lowering.
const KNOWN_FUNCTIONS: &[(&str, &str)] = &[
    ("sin", "sin"),
    ("cos", "cos"),
    ("tan", "tan"),
    ("sec", "sec"),
    ("csc", "csc"),
    ("cot", "cot"),
    ("asin", "asin"),
    ("acos", "acos"),
    ("atan", "atan"),
    ("arcsin", "asin"),
    ("arccos", "acos"),
    ("arctan", "atan"),
    ("sinh", "sinh"),
    ("cosh", "cosh"),
    ("tanh", "tanh"),
    ("ln", "ln"),
    ("log", "log"),
    ("exp", "exp"),
    ("sqrt", "sqrt"),
    ("abs", "abs"),
    ("fact", "fact"),
];

/// Canonical name of a known function, if `name` is one.
pub fn canonical_function_name(name: &str) -> Option<&'static str> {
    KNOWN_FUNCTIONS
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
}

// ============================================================================
// Unicode Math Helpers
// ============================================================================

/// Convert a superscript digit character to its numeric value
fn superscript_to_digit(c: char) -> Option<u32> {
    match c {
        '⁰' => Some(0),
        '¹' => Some(1),
        '²' => Some(2),
        '³' => Some(3),
        '⁴' => Some(4),
        '⁵' => Some(5),
        '⁶' => Some(6),
        '⁷' => Some(7),
        '⁸' => Some(8),
        '⁹' => Some(9),
        _ => None,
    }
}

/// Parse a run of superscript digits into a number plus the remaining input
fn parse_superscript_number(input: &str) -> Option<(u64, &str)> {
    let mut value: u64 = 0;
    let mut byte_len = 0;

    for c in input.chars() {
        match superscript_to_digit(c) {
            Some(digit) => {
                value = value.saturating_mul(10).saturating_add(digit as u64);
                byte_len += c.len_utf8();
            }
            None => break,
        }
    }

    if byte_len > 0 {
        Some((value, &input[byte_len..]))
    } else {
        None
    }
}

/// Root index of a leading `√`, `∛`, `∜` or `ⁿ√`
fn parse_unicode_root_prefix(input: &str) -> Option<(u64, &str)> {
    if let Some(rest) = input.strip_prefix('∛') {
        return Some((3, rest));
    }
    if let Some(rest) = input.strip_prefix('∜') {
        return Some((4, rest));
    }
    if let Some(rest) = input.strip_prefix('√') {
        return Some((2, rest));
    }
    if let Some((index, after_num)) = parse_superscript_number(input) {
        if let Some(rest) = after_num.strip_prefix('√') {
            return Some((index, rest));
        }
    }
    None
}

/// Bounds on what a single parse may build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Deepest nesting of groups, calls, signs, roots and exponents.
    pub max_nesting: usize,
    /// Largest tree, in nodes, one input may lower to.
    pub max_nodes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_nesting: 64,
            max_nodes: 4_000,
        }
    }
}

type NomError<'a> = nom::Err<nom::error::Error<&'a str>>;

/// Nesting level threaded through the recursive grammar tiers.
#[derive(Debug, Clone, Copy)]
struct Depth {
    level: usize,
    max: usize,
}

impl Depth {
    fn new(max: usize) -> Self {
        Self { level: 0, max }
    }

    /// One level further in. Past the limit this is a `Failure`, so `alt`
    /// stops backtracking and the whole parse unwinds at once.
    fn enter(self, input: &str) -> Result<Depth, NomError<'_>> {
        if self.level >= self.max {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::TooLarge,
            )));
        }
        Ok(Depth {
            level: self.level + 1,
            max: self.max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddOp {
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MulOp {
    Mul,
    Div,
}

// Intermediate AST for parsing. Sums and products stay flat so that long
// chains cost no recursion when lowered or dropped.
#[derive(Debug, Clone)]
enum ParseNode {
    Number(BigRational),
    Constant(Constant),
    Variable(String),
    Sum(Box<ParseNode>, Vec<(AddOp, ParseNode)>),
    Product(Box<ParseNode>, Vec<(MulOp, ParseNode)>),
    Pow(Box<ParseNode>, Box<ParseNode>),
    Neg(Box<ParseNode>),
    Function(String, Vec<ParseNode>),
    Root(Box<ParseNode>, u64),
    // Parenthesized or bracketed group; only affects implicit multiplication
    Group(Box<ParseNode>),
}

impl ParseNode {
    /// Lowers left to right into the usual left-associative tree.
    fn lower(self, ctx: &mut Context) -> ExprId {
        match self {
            ParseNode::Number(n) => ctx.add(Expr::Number(n)),
            ParseNode::Constant(c) => ctx.add(Expr::Constant(c)),
            ParseNode::Variable(s) => ctx.add(Expr::Variable(s)),
            ParseNode::Sum(head, rest) => {
                let mut acc = head.lower(ctx);
                for (op, term) in rest {
                    let rid = term.lower(ctx);
                    acc = ctx.add(match op {
                        AddOp::Add => Expr::Add(acc, rid),
                        AddOp::Sub => Expr::Sub(acc, rid),
                    });
                }
                acc
            }
            ParseNode::Product(head, rest) => {
                let mut acc = head.lower(ctx);
                for (op, factor) in rest {
                    let rid = factor.lower(ctx);
                    acc = ctx.add(match op {
                        MulOp::Mul => Expr::Mul(acc, rid),
                        MulOp::Div => Expr::Div(acc, rid),
                    });
                }
                acc
            }
            ParseNode::Pow(b, e) => {
                let bid = b.lower(ctx);
                let eid = e.lower(ctx);
                ctx.add(Expr::Pow(bid, eid))
            }
            ParseNode::Neg(e) => {
                let eid = e.lower(ctx);
                ctx.add(Expr::Neg(eid))
            }
            ParseNode::Group(inner) => inner.lower(ctx),
            ParseNode::Root(arg, index) => {
                let aid = arg.lower(ctx);
                if index == 2 {
                    ctx.call("sqrt", vec![aid])
                } else {
                    let exp = ctx.rational(BigRational::new(BigInt::one(), BigInt::from(index)));
                    ctx.add(Expr::Pow(aid, exp))
                }
            }
            ParseNode::Function(name, args) => {
                let arg_ids: Vec<ExprId> = args.into_iter().map(|a| a.lower(ctx)).collect();
                match (name.as_str(), arg_ids.as_slice()) {
                    // exp(x) -> e^x
                    ("exp", [arg]) => {
                        let e = ctx.constant(Constant::E);
                        ctx.add(Expr::Pow(e, *arg))
                    }
                    // log with one argument is the natural logarithm
                    ("log", [arg]) => ctx.call("ln", vec![*arg]),
                    _ => ctx.add(Expr::Function(name, arg_ids)),
                }
            }
        }
    }
}

fn nom_fail<T>(input: &str, kind: nom::error::ErrorKind) -> IResult<&str, T> {
    Err(nom::Err::Error(nom::error::Error::new(input, kind)))
}

fn pow10(k: u32) -> BigInt {
    num_traits::pow(BigInt::from(10), k as usize)
}

/// Convert a decimal string to BigRational.
/// Supports: "8.2" → 41/5, ".5" → 1/2, "8." → 8, "123" → 123
fn decimal_to_rational(integer_part: &str, fractional_part: &str) -> BigRational {
    let int_val: BigInt = if integer_part.is_empty() {
        BigInt::zero()
    } else {
        integer_part.parse().unwrap_or_else(|_| BigInt::zero())
    };

    if fractional_part.is_empty() {
        return BigRational::from_integer(int_val);
    }

    let denominator = pow10(fractional_part.len() as u32);
    let frac_val: BigInt = fractional_part.parse().unwrap_or_else(|_| BigInt::zero());
    BigRational::new(int_val * &denominator + frac_val, denominator)
}

/// Optional `e±NN` suffix; only consumed when digits follow, so `2e` stays `2 * e`.
fn parse_exponent_suffix(input: &str) -> Option<(i64, &str)> {
    let rest = input.strip_prefix(['e', 'E'])?;
    let (negative, rest) = match rest.chars().next() {
        Some('-') => (true, &rest[1..]),
        Some('+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let digit_len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digit_len == 0 {
        return None;
    }
    let value: i64 = rest[..digit_len].parse().ok()?;
    Some((if negative { -value } else { value }, &rest[digit_len..]))
}

// Parser for numeric literals: 123, 8.2, .5, 8., 1.5e-3
fn parse_number(input: &str) -> IResult<&str, ParseNode> {
    fn is_digit(c: char) -> bool {
        c.is_ascii_digit()
    }

    let (remaining, (int_part, maybe_frac)) = pair(
        take_while(is_digit),
        opt(pair(tag("."), take_while(is_digit))),
    )(input)?;

    let frac_str = maybe_frac.map(|(_, frac)| frac).unwrap_or("");

    if int_part.is_empty() && frac_str.is_empty() {
        return nom_fail(input, nom::error::ErrorKind::Digit);
    }

    let mut value = decimal_to_rational(int_part, frac_str);
    let mut remaining = remaining;

    if let Some((exp, rest)) = parse_exponent_suffix(remaining) {
        if exp.unsigned_abs() > 308 {
            return nom_fail(input, nom::error::ErrorKind::TooLarge);
        }
        let scale = BigRational::from_integer(pow10(exp.unsigned_abs() as u32));
        value = if exp >= 0 { value * scale } else { value / scale };
        remaining = rest;
    }

    Ok((remaining, ParseNode::Number(value)))
}

fn is_word_boundary(remaining: &str) -> bool {
    remaining
        .chars()
        .next()
        .map_or(true, |c| !c.is_ascii_alphanumeric() && c != '_')
}

// 'e' and 'pi' must not match prefixes of longer identifiers ('exact', 'pivot')
fn parse_constant(input: &str) -> IResult<&str, ParseNode> {
    if let Some(rest) = input.strip_prefix("pi") {
        if is_word_boundary(rest) {
            return Ok((rest, ParseNode::Constant(Constant::Pi)));
        }
    }
    if let Some(rest) = input.strip_prefix('π') {
        return Ok((rest, ParseNode::Constant(Constant::Pi)));
    }
    if let Some(rest) = input.strip_prefix('e') {
        if is_word_boundary(rest) {
            return Ok((rest, ParseNode::Constant(Constant::E)));
        }
    }
    nom_fail(input, nom::error::ErrorKind::Tag)
}

// Identifiers: letter or underscore, then letters, digits, underscores (x, x1, theta, C_1)
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    let mut chars = input.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return nom_fail(input, nom::error::ErrorKind::Alpha),
    }

    let len = 1 + chars
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .count();
    Ok((&input[len..], &input[..len]))
}

fn parse_variable(input: &str) -> IResult<&str, ParseNode> {
    map(parse_identifier, |s: &str| ParseNode::Variable(s.to_string()))(input)
}

fn parse_parens(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    map(
        alt((
            delimited(
                tag("("),
                |i| parse_expr(i, depth),
                preceded(multispace0, tag(")")),
            ),
            delimited(
                tag("["),
                |i| parse_expr(i, depth),
                preceded(multispace0, tag("]")),
            ),
        )),
        |inner| ParseNode::Group(Box::new(inner)),
    )(input)
}

// Function calls. A single unknown letter before '(' is a variable times a
// group (`x(x+1)`), not a call.
fn parse_function(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    let (rest, name) = parse_identifier(input)?;
    let canonical = match canonical_function_name(name) {
        Some(canonical) => canonical.to_string(),
        None if name.len() > 1 => name.to_string(),
        None => return nom_fail(input, nom::error::ErrorKind::Verify),
    };
    let (rest, _) = preceded(multispace0, tag("("))(rest)?;
    let (rest, args) = separated_list1(preceded(multispace0, tag(",")), |i| {
        parse_expr(i, depth)
    })(rest)?;
    let (rest, _) = preceded(multispace0, tag(")"))(rest)?;
    Ok((rest, ParseNode::Function(canonical, args)))
}

fn parse_abs(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    map(
        delimited(
            tag("|"),
            |i| parse_expr(i, depth),
            preceded(multispace0, tag("|")),
        ),
        |expr| ParseNode::Function("abs".to_string(), vec![expr]),
    )(input)
}

// Unicode roots: √x, ∛8, ³√(x+1)
fn parse_unicode_root(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    let (index, after_prefix) = match parse_unicode_root_prefix(input) {
        Some(found) => found,
        None => return nom_fail(input, nom::error::ErrorKind::Tag),
    };
    if index < 2 {
        return nom_fail(input, nom::error::ErrorKind::Verify);
    }
    let depth = depth.enter(input)?;
    let (remaining, arg) = parse_factorial(after_prefix, depth)?;
    Ok((remaining, ParseNode::Root(Box::new(arg), index)))
}

fn parse_atom(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            |i| parse_unicode_root(i, depth),
            parse_number,
            |i| parse_function(i, depth),
            parse_constant,
            parse_variable,
            |i| parse_parens(i, depth),
            |i| parse_abs(i, depth),
        )),
    )(input)
}

// Postfix factorial, then attached superscript exponents (x² → x^2)
fn parse_factorial(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    let (mut input, mut with_factorial) = parse_atom(input, depth)?;

    // each `!` wraps one more call, so it counts as a level
    let mut level = depth;
    while let Ok((rest, _)) = bang(input) {
        level = level.enter(input)?;
        with_factorial = ParseNode::Function("fact".to_string(), vec![with_factorial]);
        input = rest;
    }

    if let Some((exp_value, remaining)) = parse_superscript_number(input) {
        let exp_node = ParseNode::Number(BigRational::from_integer(BigInt::from(exp_value)));
        return Ok((
            remaining,
            ParseNode::Pow(Box::new(with_factorial), Box::new(exp_node)),
        ));
    }

    Ok((input, with_factorial))
}

// `!` but not the `!` of `!=`
fn bang(input: &str) -> IResult<&str, &str> {
    let (rest, found) = preceded(multispace0, tag("!"))(input)?;
    if rest.starts_with('=') {
        return nom_fail(input, nom::error::ErrorKind::Tag);
    }
    Ok((rest, found))
}

fn caret(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, tag("^"))(input)
}

// Power - right associative: 2^3^4 = 2^(3^4)
fn parse_power(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    let (input, base) = parse_factorial(input, depth)?;

    if let Ok((input, _)) = caret(input) {
        let (input, exp) = parse_power_exponent(input, depth)?;
        Ok((input, ParseNode::Pow(Box::new(base), Box::new(exp))))
    } else {
        Ok((input, base))
    }
}

// Exponents allow a sign prefix: x^-2, x^-(a+b)
fn parse_power_exponent(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    let depth = depth.enter(input)?;
    let result = preceded(
        multispace0,
        alt((
            map(
                pair(tag("-"), |i| parse_power_exponent(i, depth)),
                |(_, expr)| ParseNode::Neg(Box::new(expr)),
            ),
            map(
                pair(tag("+"), |i| parse_power_exponent(i, depth)),
                |(_, expr)| expr,
            ),
            |i| parse_power(i, depth),
        )),
    )(input);
    result
}

fn sign(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, alt((tag("-"), tag("+"))))(input)
}

fn parse_unary(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    if let Ok((rest, op)) = sign(input) {
        let inner = depth.enter(input)?;
        let (rest, expr) = parse_unary(rest, inner)?;
        let node = if op == "-" {
            ParseNode::Neg(Box::new(expr))
        } else {
            expr
        };
        return Ok((rest, node));
    }
    parse_power(input, depth)
}

fn mul_op(input: &str) -> IResult<&str, MulOp> {
    preceded(
        multispace0,
        alt((
            map(tag("*"), |_| MulOp::Mul),
            map(tag("·"), |_| MulOp::Mul),
            map(tag("/"), |_| MulOp::Div),
        )),
    )(input)
}

// Term: explicit `*`, `·`, `/` and implicit multiplication (2x, 3(x+1),
// (x+1)(x-1), 2sin(x)) at the same precedence, left to right.
fn parse_term(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    let (mut input, head) = parse_unary(input, depth)?;
    let mut rest: Vec<(MulOp, ParseNode)> = Vec::new();

    loop {
        if let Ok((after_op, op)) = mul_op(input) {
            match parse_unary(after_op, depth) {
                Ok((after, rhs)) => {
                    rest.push((op, rhs));
                    input = after;
                    continue;
                }
                Err(nom::Err::Failure(e)) => return Err(nom::Err::Failure(e)),
                Err(_) => break,
            }
        }

        let last = rest.last().map_or(&head, |(_, factor)| factor);
        match implicit_factor(input, last, depth)? {
            Some((after, factor)) => {
                rest.push((MulOp::Mul, factor));
                input = after;
            }
            None => break,
        }
    }

    if rest.is_empty() {
        Ok((input, head))
    } else {
        Ok((input, ParseNode::Product(Box::new(head), rest)))
    }
}

// Implicit multiplication only applies with no whitespace before the factor.
// A nesting failure inside the factor is passed on; any other miss just ends
// the term.
fn implicit_factor<'a>(
    input: &'a str,
    last: &ParseNode,
    depth: Depth,
) -> Result<Option<(&'a str, ParseNode)>, NomError<'a>> {
    let Some(first) = input.chars().next() else {
        return Ok(None);
    };
    let allowed = match first {
        c if c.is_ascii_alphabetic() || c == '_' || c == 'π' || c == '√' => {
            can_implicit_mul(last)
        }
        '(' | '[' => can_implicit_mul(last) || ends_with_variable(last),
        _ => false,
    };
    if !allowed {
        return Ok(None);
    }
    match parse_power(input, depth) {
        Ok(found) => Ok(Some(found)),
        Err(nom::Err::Failure(e)) => Err(nom::Err::Failure(e)),
        Err(_) => Ok(None),
    }
}

fn can_implicit_mul(node: &ParseNode) -> bool {
    match node {
        ParseNode::Number(_) | ParseNode::Group(_) | ParseNode::Pow(_, _) => true,
        ParseNode::Function(name, args) if name == "fact" && args.len() == 1 => true,
        ParseNode::Neg(inner) => can_implicit_mul(inner),
        ParseNode::Product(head, rest) => {
            can_implicit_mul(rest.last().map_or(head.as_ref(), |(_, factor)| factor))
        }
        _ => false,
    }
}

fn ends_with_variable(node: &ParseNode) -> bool {
    match node {
        ParseNode::Variable(_) | ParseNode::Constant(_) => true,
        ParseNode::Neg(inner) => ends_with_variable(inner),
        ParseNode::Product(head, rest) => {
            ends_with_variable(rest.last().map_or(head.as_ref(), |(_, factor)| factor))
        }
        _ => false,
    }
}

fn add_op(input: &str) -> IResult<&str, AddOp> {
    preceded(
        multispace0,
        alt((map(tag("+"), |_| AddOp::Add), map(tag("-"), |_| AddOp::Sub))),
    )(input)
}

fn parse_expr(input: &str, depth: Depth) -> IResult<&str, ParseNode> {
    let depth = depth.enter(input)?;
    let (mut input, head) = parse_term(input, depth)?;
    let mut rest: Vec<(AddOp, ParseNode)> = Vec::new();

    while let Ok((after_op, op)) = add_op(input) {
        match parse_term(after_op, depth) {
            Ok((after, term)) => {
                rest.push((op, term));
                input = after;
            }
            Err(nom::Err::Failure(e)) => return Err(nom::Err::Failure(e)),
            // dangling operator, left for the caller to report
            Err(_) => break,
        }
    }

    if rest.is_empty() {
        Ok((input, head))
    } else {
        Ok((input, ParseNode::Sum(Box::new(head), rest)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statement {
    Expression(ExprId),
    Equation(Equation),
}

fn parse_relop(input: &str) -> IResult<&str, RelOp> {
    preceded(
        multispace0,
        alt((
            map(tag("!="), |_| RelOp::Neq),
            map(tag("<="), |_| RelOp::Leq),
            map(tag(">="), |_| RelOp::Geq),
            map(tag("=="), |_| RelOp::Eq),
            map(tag("="), |_| RelOp::Eq),
            map(tag("<"), |_| RelOp::Lt),
            map(tag(">"), |_| RelOp::Gt),
        )),
    )(input)
}

fn parse_equation(input: &str, depth: Depth) -> IResult<&str, (ParseNode, RelOp, ParseNode)> {
    let (input, lhs) = parse_expr(input, depth)?;
    let (input, op) = parse_relop(input)?;
    let (input, rhs) = parse_expr(input, depth)?;
    Ok((input, (lhs, op, rhs)))
}

use crate::error::ParseError;

fn parse_failure(e: NomError<'_>, limits: ParseLimits) -> ParseError {
    match e {
        nom::Err::Failure(inner) if inner.code == nom::error::ErrorKind::TooLarge => {
            ParseError::TooDeep(limits.max_nesting)
        }
        other => ParseError::NomError(format!("{}", other)),
    }
}

/// Lower `node` and reject it when the tree outgrows `limits.max_nodes`.
fn lower_checked(
    node: ParseNode,
    ctx: &mut Context,
    limits: ParseLimits,
) -> Result<ExprId, ParseError> {
    let id = node.lower(ctx);
    if count_all_nodes(ctx, id) > limits.max_nodes {
        return Err(ParseError::TooLarge(limits.max_nodes));
    }
    Ok(id)
}

pub fn parse(input: &str, ctx: &mut Context) -> Result<ExprId, ParseError> {
    parse_with_limits(input, ctx, ParseLimits::default())
}

pub fn parse_with_limits(
    input: &str,
    ctx: &mut Context,
    limits: ParseLimits,
) -> Result<ExprId, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let (remaining, expr_node) =
        parse_expr(input, Depth::new(limits.max_nesting)).map_err(|e| parse_failure(e, limits))?;

    let remaining = remaining.trim();
    if !remaining.is_empty() {
        return Err(ParseError::UnconsumedInput(remaining.to_string()));
    }

    lower_checked(expr_node, ctx, limits)
}

pub fn parse_statement(input: &str, ctx: &mut Context) -> Result<Statement, ParseError> {
    let limits = ParseLimits::default();
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let depth = Depth::new(limits.max_nesting);

    match parse_equation(input, depth) {
        Ok((remaining, (lhs, op, rhs))) if remaining.trim().is_empty() => {
            let lhs_id = lower_checked(lhs, ctx, limits)?;
            let rhs_id = lower_checked(rhs, ctx, limits)?;
            return Ok(Statement::Equation(Equation {
                lhs: lhs_id,
                rhs: rhs_id,
                op,
            }));
        }
        Err(e @ nom::Err::Failure(_)) => return Err(parse_failure(e, limits)),
        _ => {}
    }

    match parse_expr(input, depth) {
        Ok((remaining, expr_node)) => {
            if remaining.trim().is_empty() {
                Ok(Statement::Expression(lower_checked(expr_node, ctx, limits)?))
            } else {
                Err(ParseError::UnconsumedInput(remaining.trim().to_string()))
            }
        }
        Err(e) => Err(parse_failure(e, limits)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathcheck_ast::render;

    fn show(input: &str) -> String {
        let mut ctx = Context::new();
        let id = parse(input, &mut ctx).unwrap();
        render(&ctx, id)
    }

    #[test]
    fn test_parse_number() {
        let mut ctx = Context::new();
        let e = parse("123", &mut ctx).unwrap();
        if let Expr::Number(n) = ctx.get(e) {
            assert_eq!(n.to_integer(), 123.into());
        } else {
            panic!("Expected Number");
        }
    }

    #[test]
    fn test_parse_decimal_literals() {
        let mut ctx = Context::new();
        let e = parse("8.2", &mut ctx).unwrap();
        assert_eq!(
            ctx.get(e),
            &Expr::Number(BigRational::new(41.into(), 5.into()))
        );
        let half = parse(".5", &mut ctx).unwrap();
        assert_eq!(
            ctx.get(half),
            &Expr::Number(BigRational::new(1.into(), 2.into()))
        );
    }

    #[test]
    fn test_parse_scientific_notation() {
        let mut ctx = Context::new();
        let e = parse("1.5e-3", &mut ctx).unwrap();
        assert_eq!(
            ctx.get(e),
            &Expr::Number(BigRational::new(3.into(), 2000.into()))
        );
        // Without digits after 'e' it is Euler's number
        assert_eq!(show("2e"), "2 * e");
    }

    #[test]
    fn test_parse_arithmetic_and_precedence() {
        assert_eq!(show("1 + 2 * 3"), "1 + 2 * 3");
        assert_eq!(show("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(show("8 / 4 / 2"), "8 / 4 / 2");
    }

    #[test]
    fn test_power_right_associativity() {
        let mut ctx = Context::new();
        let e = parse("2^3^4", &mut ctx).unwrap();
        match ctx.get(e) {
            Expr::Pow(_, exp) => assert!(matches!(ctx.get(*exp), Expr::Pow(_, _))),
            other => panic!("Expected Pow, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_exponent() {
        assert_eq!(show("x^-2"), "x^(-2)");
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(show("2x"), "2 * x");
        assert_eq!(show("3x^2"), "3 * x^2");
        assert_eq!(show("3(a+b)"), "3 * (a + b)");
        assert_eq!(show("(x+1)(x-1)"), "(x + 1) * (x - 1)");
        assert_eq!(show("x(x+1)"), "x * (x + 1)");
        assert_eq!(show("2sin(x)"), "2 * sin(x)");
        assert_eq!(show("2pi"), "2 * pi");
        // implicit factor followed by an explicit operator
        assert_eq!(show("2x*3"), "2 * x * 3");
        // x1 stays a single variable
        assert_eq!(show("x1"), "x1");
    }

    #[test]
    fn test_unicode_input() {
        assert_eq!(show("x²"), "x^2");
        assert_eq!(show("√x"), "sqrt(x)");
        assert_eq!(show("∛8"), "8^(1/3)");
        assert_eq!(show("2π"), "2 * pi");
    }

    #[test]
    fn test_function_lowering() {
        assert_eq!(show("exp(2x)"), "e^(2 * x)");
        assert_eq!(show("log(x)"), "ln(x)");
        assert_eq!(show("log(x, 10)"), "log(x, 10)");
        assert_eq!(show("arcsin(x)"), "asin(x)");
        assert_eq!(show("|x - 1|"), "abs(x - 1)");
        assert_eq!(show("3!"), "fact(3)");
    }

    #[test]
    fn test_parse_statement_equation() {
        let mut ctx = Context::new();
        match parse_statement("2x + 3 = 7", &mut ctx).unwrap() {
            Statement::Equation(eq) => {
                assert_eq!(eq.op, RelOp::Eq);
                assert_eq!(render(&ctx, eq.lhs), "2 * x + 3");
                assert_eq!(render(&ctx, eq.rhs), "7");
            }
            other => panic!("Expected equation, got {:?}", other),
        }
        assert!(matches!(
            parse_statement("x + 1", &mut ctx).unwrap(),
            Statement::Expression(_)
        ));
        match parse_statement("x! != 3", &mut ctx).unwrap() {
            Statement::Equation(eq) => {
                assert_eq!(eq.op, RelOp::Neq);
                assert_eq!(render(&ctx, eq.lhs), "fact(x)");
            }
            other => panic!("Expected equation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        let mut ctx = Context::new();
        assert_eq!(parse("   ", &mut ctx), Err(ParseError::Empty));
        assert!(matches!(
            parse("2 +", &mut ctx),
            Err(ParseError::UnconsumedInput(_))
        ));
        assert!(parse("(x + 1", &mut ctx).is_err());
        assert!(parse("x = 3", &mut ctx).is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let mut ctx = Context::new();
        let deep = format!("{}x{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(parse(&deep, &mut ctx), Err(ParseError::TooDeep(64)));
        assert!(matches!(
            parse_statement(&deep, &mut ctx),
            Err(ParseError::TooDeep(64))
        ));

        let bangs = format!("3{}", "!".repeat(10_000));
        assert_eq!(parse(&bangs, &mut ctx), Err(ParseError::TooDeep(64)));

        let signs = format!("{}1", "-".repeat(10_000));
        assert_eq!(parse(&signs, &mut ctx), Err(ParseError::TooDeep(64)));

        let tower = vec!["2"; 5_000].join("^");
        assert_eq!(parse(&tower, &mut ctx), Err(ParseError::TooDeep(64)));

        // inside an implicit product the limit still applies
        let implicit = format!("2{}x{}", "(".repeat(5_000), ")".repeat(5_000));
        assert_eq!(parse(&implicit, &mut ctx), Err(ParseError::TooDeep(64)));
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let nested = format!("{}x{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(show(&nested), "x");
        assert_eq!(show("-(-(-(x)))"), "-(-(-x))");
    }

    #[test]
    fn test_long_chains_parse_flat() {
        let mut ctx = Context::new();
        let sum = vec!["1"; 250].join(" + ");
        let id = parse(&sum, &mut ctx).unwrap();
        assert_eq!(count_all_nodes(&ctx, id), 499);
        assert!(matches!(ctx.get(id), Expr::Add(_, _)));

        let product = vec!["x"; 250].join(" * ");
        assert!(parse(&product, &mut ctx).is_ok());
        assert_eq!(show("1 - 2 + 3 - 4"), "1 - 2 + 3 - 4");
        assert_eq!(show("a / b * c / d"), "a / b * c / d");
    }

    #[test]
    fn test_oversized_input_is_rejected() {
        let mut ctx = Context::new();
        let sum = vec!["x"; 5_000].join(" + ");
        assert_eq!(parse(&sum, &mut ctx), Err(ParseError::TooLarge(4_000)));

        let limits = ParseLimits {
            max_nesting: 8,
            max_nodes: 10,
        };
        assert!(parse_with_limits("1 + 2 + 3", &mut ctx, limits).is_ok());
        assert_eq!(
            parse_with_limits("1 + 2 + 3 + 4 + 5 + 6", &mut ctx, limits),
            Err(ParseError::TooLarge(10))
        );
        assert_eq!(
            parse_with_limits("((((((((1))))))))", &mut ctx, limits),
            Err(ParseError::TooDeep(8))
        );
    }
}
