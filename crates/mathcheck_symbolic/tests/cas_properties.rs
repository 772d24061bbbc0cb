//! Property tests for the symbolic capability: normal-form canonicity,
//! calculus round trips, and agreement between exact and float evaluation.

use mathcheck_symbolic::{eval_f64, Cas, Evaluated};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

fn poly_text(a: i32, b: i32, c: i32) -> String {
    format!("({})*x^2 + ({})*x + ({})", a, b, c)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn reordered_polynomial_simplifies_to_zero_difference(
        a in -20i32..20, b in -20i32..20, c in -20i32..20,
    ) {
        let cas = Cas::default();
        let text = format!(
            "({}) - (({}) + ({})*x + x*x*({}))",
            poly_text(a, b, c), c, b, a
        );
        let expr = cas.parse(&text).expect("parse");
        let simplified = cas.simplify(&expr).expect("simplify");
        prop_assert_eq!(simplified.to_string(), "0");
    }

    #[test]
    fn derivative_of_integral_is_identity(
        a in -20i32..20, b in -20i32..20, c in -20i32..20,
    ) {
        let cas = Cas::default();
        let f = cas.parse(&poly_text(a, b, c)).expect("parse");
        let integral = cas.integrate(&f, "x").expect("integrate");
        let back = cas.differentiate(&integral, "x").expect("differentiate");
        let expected = cas.simplify(&f).expect("simplify");
        prop_assert_eq!(back.to_string(), expected.to_string());
    }

    #[test]
    fn exact_and_float_evaluation_agree(
        a in -9i32..9, b in -9i32..9, x in -50i32..50,
    ) {
        let cas = Cas::default();
        let expr = cas.parse(&format!("({})*x^3 - ({})*x / 4 + 7", a, b)).expect("parse");
        let value = f64::from(x) / 8.0;

        let subs = BTreeMap::from([("x".to_string(), value)]);
        let exact = match cas.evaluate(&expr, &subs).expect("evaluate") {
            Evaluated::Number(v) => v,
            Evaluated::Symbolic(e) => panic!("unexpected symbolic result {}", e),
        };
        let vars = HashMap::from([("x".to_string(), value)]);
        let float = eval_f64(expr.context(), expr.root(), &vars, 200).expect("eval");
        prop_assert!((exact - float).abs() < 1e-9, "{} vs {}", exact, float);
    }
}

#[test]
fn simplify_output_reparses_to_same_normal_form() {
    let cas = Cas::default();
    for input in [
        "(x + 1)^3",
        "x^2 / 2 - 3x + 1/4",
        "e^(2x) * sin(x) - cos(x)^2",
        "1 / (2x + 2) + sqrt(x)",
        "ln(x) / ln(10)",
    ] {
        let once = cas.simplify(&cas.parse(input).expect("parse")).expect("simplify");
        let twice = cas
            .simplify(&cas.parse(&once.to_string()).expect("reparse"))
            .expect("simplify");
        assert_eq!(once.to_string(), twice.to_string(), "input: {}", input);
    }
}

#[test]
fn shared_instance_across_threads() {
    let cas = Cas::default();
    std::thread::scope(|scope| {
        for k in 1..=4 {
            let cas = &cas;
            scope.spawn(move || {
                let expr = cas.parse(&format!("{}x^2", k)).expect("parse");
                let d = cas.differentiate(&expr, "x").expect("differentiate");
                assert_eq!(d.to_string(), format!("{} * x", 2 * k));
            });
        }
    });
}
