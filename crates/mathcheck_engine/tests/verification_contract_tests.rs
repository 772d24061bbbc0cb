//! Contract tests for the six operations, through the public engine API.

use mathcheck_engine::{
    ErrorKind, Substitutions, VerificationEngine, VerificationOutcome, VerificationRequest,
};
use mathcheck_symbolic::Cas;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("mathcheck=debug")
        .with_test_writer()
        .try_init();
}

fn engine() -> VerificationEngine {
    init_tracing();
    VerificationEngine::<Cas>::default()
}

#[test]
fn calculation_reports_correct_result_either_way() {
    let engine = engine();
    let right = engine.verify_calculation("8 * 5", "40");
    assert!(right.verdict);
    assert_eq!(right.correct_result.as_deref(), Some("40"));

    let wrong = engine.verify_calculation("8 * 5", "35");
    assert!(!wrong.verdict);
    assert_eq!(wrong.correct_result.as_deref(), Some("40"));
    assert_eq!(wrong.error, None);
}

#[test]
fn derivative_verdicts() {
    let engine = engine();
    assert!(engine.verify_derivative("x^2 + 3x", "2x + 3").verdict);
    let wrong = engine.verify_derivative("x^2 + 3x", "2x + 5");
    assert!(!wrong.verdict);
    assert_eq!(wrong.correct_derivative.as_deref(), Some("2 * x + 3"));
}

#[test]
fn integral_ignores_constant_of_integration() {
    let engine = engine();
    assert!(engine.verify_integral("2x + 3", "x^2 + 3x + C").verdict);
    assert!(engine.verify_integral("2x + 3", "x^2 + 3x").verdict);
    assert!(!engine.verify_integral("2x + 3", "x^2 + 2x + C").verdict);
}

#[test]
fn spaced_products_are_multiplication() {
    let engine = engine();
    assert!(engine
        .verify_derivative("x^2 sin(x)", "2x sin(x) + x^2 cos(x)")
        .verdict);
    let r = engine.verify_derivative("x sin(x)", "x cos(x) + sin(x)");
    assert!(r.verdict);
    assert_eq!(r.error, None);
    assert!(engine.verify_integral("x e^x", "x e^x - e^x + C").verdict);
    assert!(engine.verify_calculation("2 (3 + 4)", "14").verdict);
    assert!(engine.verify_calculation("sin (0) + 1", "1").verdict);
}

#[test]
fn long_flat_sums_verify() {
    let engine = engine();
    let sum = vec!["1"; 250].join(" + ");
    let r = engine.verify_calculation(&sum, "250");
    assert!(r.verdict, "{}", r.explanation);
    assert_eq!(r.error, None);

    let terms = vec!["x"; 250].join(" + ");
    assert!(engine.verify_derivative(&terms, "250").verdict);
}

#[test]
fn deep_or_oversized_input_fails_without_crashing() {
    let engine = engine();
    let failed = |kind: Option<ErrorKind>| {
        matches!(kind, Some(ErrorKind::InvalidFormat) | Some(ErrorKind::EvaluationFailed))
    };

    let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    let r = engine.verify_calculation(&deep, "1");
    assert!(!r.verdict);
    assert!(failed(r.error), "{:?}", r.error);

    let wide = vec!["1"; 5_000].join(" + ");
    let r = engine.verify_calculation(&wide, "5000");
    assert!(!r.verdict);
    assert!(failed(r.error), "{:?}", r.error);

    let r = engine.verify_derivative(&deep, "0");
    assert!(!r.verdict);
    assert!(r.error.is_some());
}

#[test]
fn malformed_claimed_solution_is_invalid_format() {
    let engine = engine();
    let r = engine.verify_equation_solution("2x + 3 = 11", "4");
    assert!(!r.verdict);
    assert_eq!(r.error, Some(ErrorKind::InvalidFormat));
    assert!(!r.explanation.is_empty());
}

#[test]
fn evaluate_with_substitution() {
    let engine = engine();
    let subs = Substitutions::from([("x".to_string(), 2.0)]);
    let r = engine.evaluate_expression("x^2 + 5x", &subs);
    assert_eq!(r.result, "14");
    assert_eq!(r.error, None);
}

#[test]
fn errors_always_carry_false_verdict_and_prose() {
    let engine = engine();
    let results = [
        engine.verify_equation_solution("x = = 2", "x = 2"),
        engine.verify_equation_solution("1 / x = 2", "x = 0"),
        engine.verify_algebraic_step("x +* 1", "x", None),
        engine.verify_calculation("8 * 5", "forty"),
        engine.verify_calculation("sqrt(-1)", "1"),
        engine.verify_derivative("+", "1"),
        engine.verify_integral("2x", ")"),
    ];
    for r in results {
        assert!(r.error.is_some(), "{:?}", r);
        assert!(!r.verdict, "{:?}", r);
        assert!(!r.explanation.trim().is_empty(), "{:?}", r);
    }
}

#[test]
fn repeated_calls_are_identical() {
    let engine = engine();
    let first = engine.verify_algebraic_step("2x + 3 = 7", "x = 2", Some("solve"));
    for _ in 0..5 {
        assert_eq!(engine.verify_algebraic_step("2x + 3 = 7", "x = 2", Some("solve")), first);
    }
    let a = engine.verify_integral("cos(x)", "sin(x) + C");
    let b = engine.verify_integral("cos(x)", "sin(x) + C");
    assert_eq!(a, b);
}

#[test]
fn shared_engine_across_threads() {
    let engine = engine();
    std::thread::scope(|scope| {
        for k in 1..=4 {
            let engine = &engine;
            scope.spawn(move || {
                let r = engine.verify_calculation(&format!("{} * 10", k), &format!("{}", k * 10));
                assert!(r.verdict);
            });
        }
    });
}

#[test]
fn json_request_round_trip() {
    let engine = engine();
    let requests: Vec<VerificationRequest> = serde_json::from_str(
        r#"[
            {"kind": "equation_solution", "equation": "2x + 3 = 11", "claimed_solution": "x = 4"},
            {"kind": "algebraic_step", "original": "2(x + 1)", "resulting": "2x + 2", "operation": "distribute"},
            {"kind": "calculation", "expression": "8 * 5", "claimed_result": "35"},
            {"kind": "evaluate", "expression": "x^2 + 5x", "substitutions": {"x": 2}}
        ]"#,
    )
    .expect("valid requests");
    let outcomes = engine.verify_all(&requests);
    assert_eq!(
        outcomes.iter().map(|o| o.verdict()).collect::<Vec<_>>(),
        vec![Some(true), Some(true), Some(false), None]
    );

    let json = serde_json::to_value(&outcomes).expect("serialize");
    assert_eq!(json[0]["operation"], "equation_solution");
    assert_eq!(json[0]["left_value"], 11.0);
    assert_eq!(json[2]["correct_result"], "40");
    assert_eq!(json[3]["result"], "14");
    assert!(json[3].get("verdict").is_none());

    match &outcomes[3] {
        VerificationOutcome::Evaluation(r) => assert_eq!(r.result, "14"),
        other => panic!("expected evaluation, got {:?}", other),
    }
}

#[test]
fn counterexample_is_reported_for_wrong_step() {
    let engine = engine();
    let r = engine.verify_algebraic_step("(x + 1)^2", "x^2 + 1", None);
    assert!(!r.verdict);
    let ce = r.counterexample.expect("counterexample");
    assert_eq!(ce.assignments.get("x"), Some(&1.0));
    assert!((ce.difference - 2.0).abs() < 1e-12);
    assert_eq!(r.corrected_expression.as_deref(), Some("x^2 + 2 * x + 1"));
}
