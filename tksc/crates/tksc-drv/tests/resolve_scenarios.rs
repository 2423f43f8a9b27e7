//! End-to-end batch resolution scenarios.

mod common;

use common::{full_config, tokens};
use tksc_drv::{resolve, Config, TokenErrorKind};

#[test]
fn base_and_derived() {
    let config = Config::new();
    let out = resolve(&tokens(&[("base", "16"), ("derived", "{base} * 2px")]), &config);
    let rendered = out.rendered(&config);
    assert_eq!(rendered["base"], "16");
    assert_eq!(rendered["derived"], "32px");
    assert!(out.warnings.is_empty());
}

#[test]
fn two_token_cycle_keeps_bodies() {
    let config = Config::new();
    let out = resolve(&tokens(&[("a", "{b}"), ("b", "{a}")]), &config);
    for (name, body) in [("a", "{b}"), ("b", "{a}")] {
        let token = &out.tokens[name];
        assert_eq!(
            token.error.as_ref().unwrap().kind,
            TokenErrorKind::CircularDependency
        );
        assert_eq!(token.value.render(), body);
    }
}

#[test]
fn color_conversion_via_to_proxy() {
    let config = full_config();
    let out = resolve(
        &tokens(&[("c.primary", "rgb(255,0,128).to.hex()")]),
        &config,
    );
    assert!(out.tokens["c.primary"].is_ok(), "{:?}", out.tokens["c.primary"].error);
    assert_eq!(out.rendered(&config)["c.primary"], "#ff0080");
}

#[test]
fn min_returns_unitless_number() {
    let config = Config::new();
    let out = resolve(&tokens(&[("x", "min(10px, 20px, 5px)")]), &config);
    assert_eq!(out.rendered(&config)["x"], "5");
}

#[test]
fn chained_references_resolve_in_dependency_order() {
    let config = Config::new();
    let out = resolve(
        &tokens(&[
            ("a", "16"),
            ("chain.1", "{a}+1"),
            ("chain.2", "{chain.1}+1"),
            ("chain.3", "{chain.2}+1"),
        ]),
        &config,
    );
    let rendered = out.rendered(&config);
    assert_eq!(rendered["a"], "16");
    assert_eq!(rendered["chain.1"], "17");
    assert_eq!(rendered["chain.2"], "18");
    assert_eq!(rendered["chain.3"], "19");
}

#[test]
fn missing_reference_marks_only_the_user() {
    let config = full_config();
    let out = resolve(
        &tokens(&[("p", "rgb({r},{g},{b})"), ("r", "255"), ("g", "128")]),
        &config,
    );
    assert_eq!(out.rendered(&config)["r"], "255");
    assert_eq!(out.rendered(&config)["g"], "128");

    let p = &out.tokens["p"];
    let error = p.error.as_ref().unwrap();
    assert!(matches!(
        error.kind,
        TokenErrorKind::MissingReference | TokenErrorKind::CircularDependency
    ));
    assert_eq!(error.original_value, "rgb({r},{g},{b})");
    assert_eq!(p.value.render(), "rgb({r},{g},{b})");
}

#[test]
fn resolution_is_deterministic_byte_for_byte() {
    let config = full_config();
    let input = tokens(&[
        ("c", "rgb(1, 2, 3).to.hex()"),
        ("b", "{a} * 2"),
        ("a", "21"),
        ("cycle.x", "{cycle.y}"),
        ("cycle.y", "{cycle.x}"),
    ]);
    let first = resolve(&input, &config);
    let second = resolve(&input, &config);

    let first_rendered: Vec<(String, String)> = first.rendered(&config).into_iter().collect();
    let second_rendered: Vec<(String, String)> = second.rendered(&config).into_iter().collect();
    assert_eq!(first_rendered, second_rendered);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn permuted_input_resolves_same_values() {
    let config = Config::new();
    let forward = tokens(&[("a", "2"), ("b", "{a} * 3"), ("c", "{b} + 1")]);
    let backward = tokens(&[("c", "{b} + 1"), ("b", "{a} * 3"), ("a", "2")]);

    let forward_out = resolve(&forward, &config);
    let backward_out = resolve(&backward, &config);

    for name in ["a", "b", "c"] {
        assert_eq!(
            forward_out.tokens[name].value.render(),
            backward_out.tokens[name].value.render()
        );
    }
    // Iteration order follows each input's order.
    let keys: Vec<_> = backward_out.tokens.keys().cloned().collect();
    assert_eq!(keys, vec!["c".to_string(), "b".to_string(), "a".to_string()]);
}

#[test]
fn iteration_cap_stops_infinite_loops() {
    let config = Config::new();
    let out = resolve(
        &tokens(&[("spin", "variable i: Number = 0; while (true) [ i = i + 1; ] i")]),
        &config,
    );
    let error = out.tokens["spin"].error.as_ref().unwrap();
    assert_eq!(error.kind, TokenErrorKind::EvaluationError);
    assert!(error.details.contains("100000"), "{}", error.details);
}

#[test]
fn registered_unit_flows_through_tokens() {
    let config = full_config();
    let out = resolve(
        &tokens(&[("gap", "2gu"), ("total", "{gap} + 4px")]),
        &config,
    );
    assert_eq!(out.rendered(&config)["gap"], "2gu");
    assert_eq!(out.rendered(&config)["total"], "12px");
}

#[test]
fn lossless_color_round_trip() {
    let config = full_config();
    let out = resolve(
        &tokens(&[("there_and_back", "rgb(255, 0, 128).to.hex().to.rgb().to.hex()")]),
        &config,
    );
    assert_eq!(out.rendered(&config)["there_and_back"], "#ff0080");
}

#[test]
fn control_flow_in_token_body() {
    let config = Config::new();
    let out = resolve(
        &tokens(&[(
            "clamped",
            "variable x: NumberWithUnit.Px = {raw}px; if (x > 20px) [ x = 20px; ] x",
        ), ("raw", "32")]),
        &config,
    );
    assert_eq!(out.rendered(&config)["clamped"], "20px");
}

#[test]
fn shared_interpreter_sees_growing_reference_map() {
    // chain.2 only resolves if chain.1's result entered the live map.
    let config = Config::new();
    let out = resolve(
        &tokens(&[("chain.2", "{chain.1} * 2"), ("chain.1", "{seed} + 1"), ("seed", "4")]),
        &config,
    );
    assert_eq!(out.rendered(&config)["chain.2"], "10");
}

#[test]
fn warnings_and_errors_keep_successes_intact() {
    let config = Config::new();
    let out = resolve(
        &tokens(&[
            ("broken", "1 +"),
            ("loop", "{loop}"),
            ("fine", "{broken}"),
        ]),
        &config,
    );
    assert_eq!(out.tokens["broken"].error.as_ref().unwrap().kind, TokenErrorKind::ParseError);
    assert_eq!(
        out.tokens["loop"].error.as_ref().unwrap().kind,
        TokenErrorKind::CircularDependency
    );
    // `fine` consumes the parse-failed body as a literal string.
    assert!(out.tokens["fine"].is_ok());
    assert_eq!(out.tokens["fine"].value.render(), "1 +");
    assert_eq!(out.warnings.len(), 2);
}
