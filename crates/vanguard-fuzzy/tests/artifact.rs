use vanguard_fuzzy::{builtin, RuleEvaluationError, RuleSet, TskEngine};

const GOOD_ARTIFACT: &str = r#"{
    "variables": {
        "speed": {
            "lo": 0.0,
            "hi": 30.0,
            "terms": {
                "slow": {"shape": "trapezoidal", "a": 0.0, "b": 0.0, "c": 5.0, "d": 12.0},
                "fast": {"shape": "triangular", "a": 8.0, "b": 20.0, "c": 30.0}
            }
        }
    },
    "rules": [
        {
            "when": [{"variable": "speed", "label": "slow"}],
            "output": "boost",
            "then": {"constant": 0.8}
        },
        {
            "when": [{"variable": "speed", "label": "fast"}],
            "weight": 0.5,
            "output": "boost",
            "then": {"constant": -0.2, "coefficients": {"speed": 0.01}}
        }
    ],
    "defaults": {"boost": 0.0}
}"#;

#[test]
fn well_formed_artifact_loads_and_evaluates() {
    let set = RuleSet::from_json(GOOD_ARTIFACT).unwrap();
    let engine = TskEngine::new(set).unwrap();

    let slow = engine.evaluate(&[("speed", 2.0)]);
    assert!((slow["boost"] - 0.8).abs() < 1e-12);

    let fast = engine.evaluate(&[("speed", 25.0)]);
    assert!(fast["boost"] < 0.8);
}

#[test]
fn missing_optional_fields_take_defaults() {
    // `weight` defaults to 1 and `coefficients` to empty.
    let set = RuleSet::from_json(GOOD_ARTIFACT).unwrap();
    assert_eq!(set.rules[0].weight, 1.0);
    assert!(set.rules[0].then.coefficients.is_empty());
    assert_eq!(set.rules[1].weight, 0.5);
}

#[test]
fn invalid_json_is_a_parse_error() {
    let err = RuleSet::from_json("{ not json").unwrap_err();
    assert!(matches!(err, RuleEvaluationError::Parse(_)));
}

#[test]
fn unknown_variable_in_a_rule_is_rejected() {
    let mut set = RuleSet::from_json(GOOD_ARTIFACT).unwrap();
    set.rules[0].when[0].variable = "altitude".to_owned();
    assert!(matches!(
        set.validate().unwrap_err(),
        RuleEvaluationError::UnknownVariable { index: 0, .. }
    ));
}

#[test]
fn unknown_label_in_a_rule_is_rejected() {
    let mut set = RuleSet::from_json(GOOD_ARTIFACT).unwrap();
    set.rules[1].when[0].label = "glacial".to_owned();
    assert!(matches!(
        set.validate().unwrap_err(),
        RuleEvaluationError::UnknownLabel { index: 1, .. }
    ));
}

#[test]
fn undeclared_output_is_rejected() {
    let mut set = RuleSet::from_json(GOOD_ARTIFACT).unwrap();
    set.rules[0].output = "afterburner".to_owned();
    assert!(matches!(
        set.validate().unwrap_err(),
        RuleEvaluationError::UnknownOutput { .. }
    ));
}

#[test]
fn inverted_domain_is_rejected() {
    let mut set = RuleSet::from_json(GOOD_ARTIFACT).unwrap();
    let variable = set.variables.get_mut("speed").unwrap();
    variable.lo = 30.0;
    variable.hi = 0.0;
    assert!(matches!(
        set.validate().unwrap_err(),
        RuleEvaluationError::BadDomain { .. }
    ));
}

#[test]
fn unordered_membership_points_are_rejected() {
    let json = GOOD_ARTIFACT.replace(
        r#""slow": {"shape": "trapezoidal", "a": 0.0, "b": 0.0, "c": 5.0, "d": 12.0}"#,
        r#""slow": {"shape": "trapezoidal", "a": 5.0, "b": 0.0, "c": 5.0, "d": 12.0}"#,
    );
    assert!(matches!(
        RuleSet::from_json(&json).unwrap_err(),
        RuleEvaluationError::BadShape { .. }
    ));
}

#[test]
fn negative_weight_is_rejected() {
    let mut set = RuleSet::from_json(GOOD_ARTIFACT).unwrap();
    set.rules[0].weight = -1.0;
    assert!(matches!(
        set.validate().unwrap_err(),
        RuleEvaluationError::BadWeight { index: 0, .. }
    ));
}

#[test]
fn missing_artifact_file_is_an_io_error() {
    let err = RuleSet::load(std::path::Path::new("/nonexistent/rules.json")).unwrap_err();
    assert!(matches!(err, RuleEvaluationError::Io { .. }));
}

#[test]
fn builtin_rule_bases_roundtrip_through_json() {
    for set in [builtin::movement_rules(), builtin::firing_rules()] {
        let json = serde_json::to_string_pretty(&set).unwrap();
        let back = RuleSet::from_json(&json).unwrap();
        assert_eq!(back.rules.len(), set.rules.len());
        assert_eq!(back.defaults, set.defaults);
    }
}
