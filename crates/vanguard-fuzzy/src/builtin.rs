//! Built-in rule bases used when no artifact is configured.
//!
//! Tuned for waypoint following and turret engagement over the default map
//! scale (cells a few world units wide, engagement ranges under ~200 units).

use std::collections::BTreeMap;

use crate::artifact::RuleSet;
use crate::membership::Membership;
use crate::rule::{Consequent, TskRule};
use crate::variable::FuzzyVariable;

fn variable(lo: f64, hi: f64, terms: &[(&str, Membership)]) -> FuzzyVariable {
    FuzzyVariable {
        lo,
        hi,
        terms: terms
            .iter()
            .map(|(label, shape)| ((*label).to_owned(), *shape))
            .collect(),
    }
}

fn affine(constant: f64, coefficients: &[(&str, f64)]) -> Consequent {
    Consequent {
        constant,
        coefficients: coefficients
            .iter()
            .map(|(name, c)| ((*name).to_owned(), *c))
            .collect(),
    }
}

fn tri(a: f64, b: f64, c: f64) -> Membership {
    Membership::Triangular { a, b, c }
}

fn trap(a: f64, b: f64, c: f64, d: f64) -> Membership {
    Membership::Trapezoidal { a, b, c, d }
}

/// Waypoint-following rules: `{distance_to_waypoint, bearing_error}` to
/// `{throttle, steering}`.
///
/// Bearing error is signed degrees, positive when the waypoint lies
/// counter-clockwise of the hull heading; steering shares the sign.
pub fn movement_rules() -> RuleSet {
    let mut variables = BTreeMap::new();
    variables.insert(
        "distance_to_waypoint".to_owned(),
        variable(
            0.0,
            50.0,
            &[
                ("near", trap(0.0, 0.0, 0.5, 2.5)),
                ("mid", tri(1.5, 4.0, 8.0)),
                ("far", trap(5.0, 10.0, 50.0, 50.0)),
            ],
        ),
    );
    variables.insert(
        "bearing_error".to_owned(),
        variable(
            -180.0,
            180.0,
            &[
                ("hard_right", trap(-180.0, -180.0, -60.0, -25.0)),
                ("right", tri(-60.0, -20.0, -4.0)),
                ("center", tri(-10.0, 0.0, 10.0)),
                ("left", tri(4.0, 20.0, 60.0)),
                ("hard_left", trap(25.0, 60.0, 180.0, 180.0)),
            ],
        ),
    );

    let d = "distance_to_waypoint";
    let b = "bearing_error";
    let rules = vec![
        // Throttle: fast when far and aligned, creep near the waypoint,
        // shed speed while turning.
        TskRule::new(vec![(d, "near")], "throttle", affine(0.0, &[(d, 0.3)])),
        TskRule::new(
            vec![(d, "mid"), (b, "center")],
            "throttle",
            affine(0.5, &[(d, 0.08)]),
        ),
        TskRule::new(
            vec![(d, "far"), (b, "center")],
            "throttle",
            Consequent::constant(1.0),
        ),
        TskRule::new(vec![(b, "left")], "throttle", Consequent::constant(0.35)),
        TskRule::new(vec![(b, "right")], "throttle", Consequent::constant(0.35)),
        TskRule::new(vec![(b, "hard_left")], "throttle", Consequent::constant(0.05)),
        TskRule::new(vec![(b, "hard_right")], "throttle", Consequent::constant(0.05)),
        // Steering: proportional near center, saturating outward.
        TskRule::new(vec![(b, "center")], "steering", affine(0.0, &[(b, 0.05)])),
        TskRule::new(vec![(b, "left")], "steering", affine(0.45, &[(b, 0.006)])),
        TskRule::new(vec![(b, "hard_left")], "steering", Consequent::constant(0.9)),
        TskRule::new(vec![(b, "right")], "steering", affine(-0.45, &[(b, 0.006)])),
        TskRule::new(vec![(b, "hard_right")], "steering", Consequent::constant(-0.9)),
    ];

    let mut defaults = BTreeMap::new();
    defaults.insert("throttle".to_owned(), 0.0);
    defaults.insert("steering".to_owned(), 0.0);

    RuleSet {
        variables,
        rules,
        defaults,
    }
}

/// Turret engagement rules: `{target_range, target_bearing, line_of_sight}`
/// to `{fire_decision, coarse_traverse}`.
///
/// `target_bearing` is signed degrees from the turret to the target;
/// `line_of_sight` is 1 for a clear lane, 0 for blocked. `fire_decision` is a
/// confidence in [0, 1]; the caller applies its own threshold.
pub fn firing_rules() -> RuleSet {
    let mut variables = BTreeMap::new();
    variables.insert(
        "target_range".to_owned(),
        variable(
            0.0,
            200.0,
            &[
                ("close", trap(0.0, 0.0, 15.0, 30.0)),
                ("effective", tri(20.0, 45.0, 90.0)),
                ("long", trap(70.0, 120.0, 200.0, 200.0)),
            ],
        ),
    );
    variables.insert(
        "target_bearing".to_owned(),
        variable(
            -180.0,
            180.0,
            &[
                ("off_right", trap(-180.0, -180.0, -60.0, -25.0)),
                ("slight_right", tri(-45.0, -15.0, -2.0)),
                ("on_target", tri(-6.0, 0.0, 6.0)),
                ("slight_left", tri(2.0, 15.0, 45.0)),
                ("off_left", trap(25.0, 60.0, 180.0, 180.0)),
            ],
        ),
    );
    variables.insert(
        "line_of_sight".to_owned(),
        variable(
            0.0,
            1.0,
            &[
                ("blocked", trap(0.0, 0.0, 0.25, 0.6)),
                ("clear", trap(0.4, 0.75, 1.0, 1.0)),
            ],
        ),
    );

    let r = "target_range";
    let b = "target_bearing";
    let los = "line_of_sight";
    let rules = vec![
        // Fire confidence peaks when aligned with a clear lane in range.
        TskRule::new(
            vec![(b, "on_target"), (los, "clear"), (r, "close")],
            "fire_decision",
            Consequent::constant(1.0),
        ),
        TskRule::new(
            vec![(b, "on_target"), (los, "clear"), (r, "effective")],
            "fire_decision",
            Consequent::constant(0.85),
        ),
        TskRule::new(
            vec![(b, "on_target"), (los, "clear"), (r, "long")],
            "fire_decision",
            Consequent::constant(0.4),
        ),
        TskRule::new(
            vec![(b, "slight_left"), (los, "clear")],
            "fire_decision",
            Consequent::constant(0.15),
        ),
        TskRule::new(
            vec![(b, "slight_right"), (los, "clear")],
            "fire_decision",
            Consequent::constant(0.15),
        ),
        TskRule::new(vec![(los, "blocked")], "fire_decision", Consequent::constant(0.0)),
        // Coarse traverse: fine proportional tracking once aligned,
        // saturating swing when far off.
        TskRule::new(vec![(b, "on_target")], "coarse_traverse", affine(0.0, &[(b, 0.02)])),
        TskRule::new(
            vec![(b, "slight_left")],
            "coarse_traverse",
            affine(0.3, &[(b, 0.01)]),
        ),
        TskRule::new(
            vec![(b, "slight_right")],
            "coarse_traverse",
            affine(-0.3, &[(b, 0.01)]),
        ),
        TskRule::new(vec![(b, "off_left")], "coarse_traverse", Consequent::constant(0.85)),
        TskRule::new(
            vec![(b, "off_right")],
            "coarse_traverse",
            Consequent::constant(-0.85),
        ),
    ];

    let mut defaults = BTreeMap::new();
    defaults.insert("fire_decision".to_owned(), 0.0);
    defaults.insert("coarse_traverse".to_owned(), 0.0);

    RuleSet {
        variables,
        rules,
        defaults,
    }
}
