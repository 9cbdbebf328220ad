// tests/grammar_expansion.rs
use lsystem_turtle::{
    RawRule, RawRuleOption, RuleDefinition, RuleSet, expand, normalize_rule_definition,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn rules(pairs: &[(char, &str)]) -> RuleSet {
    pairs
        .iter()
        .map(|(symbol, text)| (*symbol, RuleDefinition::fixed(*text)))
        .collect()
}

#[test]
fn test_fixed_rules_expand_deterministically() {
    let mut rng = SmallRng::seed_from_u64(1);
    let set = rules(&[('F', "F[+F]F[-F]F")]);

    let once = expand("F", &set, 1, &mut rng);
    assert_eq!(once, "F[+F]F[-F]F");

    let a = expand("F", &set, 3, &mut rng);
    let b = expand("F", &set, 3, &mut SmallRng::seed_from_u64(99));
    assert_eq!(a, b, "Fixed rules must not depend on the random stream");
}

#[test]
fn test_algae_growth() {
    let mut rng = SmallRng::seed_from_u64(0);
    let set = rules(&[('A', "AB"), ('B', "A")]);
    assert_eq!(expand("A", &set, 2, &mut rng), "ABA");
    assert_eq!(expand("A", &set, 5, &mut rng), "ABAABABAABAAB");
}

#[test]
fn test_no_rules_or_no_iterations_leave_axiom() {
    let mut rng = SmallRng::seed_from_u64(0);
    assert_eq!(expand("F+[X]-G", &RuleSet::new(), 6, &mut rng), "F+[X]-G");
    assert_eq!(
        expand("F+F", &rules(&[('F', "FF")]), 0, &mut rng),
        "F+F"
    );
}

#[test]
fn test_empty_rule_keeps_symbol_terminal() {
    let mut rng = SmallRng::seed_from_u64(0);
    let set: RuleSet = serde_json::from_str(r#"{ "F": "   ", "X": [] }"#).unwrap();
    assert_eq!(set.get('F'), Some(&RuleDefinition::fixed("")));
    assert_eq!(expand("FX", &set, 3, &mut rng), "FX");
}

#[test]
fn test_all_zero_weights_pick_first_alternative() {
    let set: RuleSet = serde_json::from_str(
        r#"{ "F": [ { "value": "FF", "weight": 0 }, { "value": "F-F", "weight": 0 } ] }"#,
    )
    .unwrap();
    for seed in 0..10 {
        let mut rng = SmallRng::seed_from_u64(seed);
        assert_eq!(expand("F", &set, 3, &mut rng), "FFFFFFFF");
    }
}

#[test]
fn test_weighted_rule_rerolls_per_occurrence() {
    let mut rng = SmallRng::seed_from_u64(42);
    let set = RuleSet::from_iter([('F', RuleDefinition::weighted([("a", 1.0), ("b", 1.0)]))]);

    let sentence = expand(&"F".repeat(64), &set, 1, &mut rng);
    assert_eq!(sentence.len(), 64);
    assert!(sentence.contains('a'), "Both alternatives should appear: {sentence}");
    assert!(sentence.contains('b'), "Both alternatives should appear: {sentence}");
}

#[test]
fn test_seeded_expansion_is_reproducible() {
    let set = RuleSet::from_iter([(
        'F',
        RuleDefinition::weighted([("FF-[-F+F+F]+[+F-F-F]", 0.5), ("FF+[+F-F]-[-F+F]", 0.5)]),
    )]);
    let a = expand("F", &set, 4, &mut SmallRng::seed_from_u64(2024));
    let b = expand("F", &set, 4, &mut SmallRng::seed_from_u64(2024));
    assert_eq!(a, b);
}

#[test]
fn test_normalization_shapes() {
    assert_eq!(
        normalize_rule_definition(&RawRule::from("  F+F ")),
        RuleDefinition::fixed("F+F")
    );
    assert_eq!(
        normalize_rule_definition(&RawRule::Single(RawRuleOption::entry("FF", 3.0))),
        RuleDefinition::weighted([("FF", 3.0)])
    );
    assert_eq!(
        normalize_rule_definition(&RawRule::List(vec![
            RawRuleOption::Text(" ".into()),
            RawRuleOption::Text("FX".into()),
        ])),
        RuleDefinition::fixed("FX")
    );
    assert_eq!(
        normalize_rule_definition(&RawRule::List(vec![
            RawRuleOption::Text("F".into()),
            RawRuleOption::Entry {
                value: Some(serde_json::json!("G")),
                weight: None,
            },
        ])),
        RuleDefinition::weighted([("F", 1.0), ("G", 1.0)])
    );
    assert_eq!(
        normalize_rule_definition(&RawRule::Other(serde_json::Value::Null)),
        RuleDefinition::fixed("")
    );
}

#[test]
fn test_stray_json_values_are_coerced() {
    let set: RuleSet =
        serde_json::from_str(r#"{ "F": ["FF", 5, true], "X": 5, "Y": null, "Z": [false] }"#)
            .unwrap();
    assert_eq!(set.get('F'), Some(&RuleDefinition::fixed("FF")));
    assert_eq!(set.get('X'), Some(&RuleDefinition::fixed("")));
    assert_eq!(set.get('Y'), Some(&RuleDefinition::fixed("")));
    assert_eq!(set.get('Z'), Some(&RuleDefinition::fixed("")));

    let mut rng = SmallRng::seed_from_u64(0);
    assert_eq!(expand("FXYZ", &set, 2, &mut rng), "FFFFXYZ");
}

#[test]
fn test_normalization_is_idempotent() {
    let inputs: Vec<RawRule> = vec![
        serde_json::from_str(r#""F[+F]""#).unwrap(),
        serde_json::from_str(r#"{ "value": " X ", "weight": "2.5" }"#).unwrap(),
        serde_json::from_str(r#"[ "A", { "value": "B", "weight": "oops" }, { "weight": 3 } ]"#)
            .unwrap(),
        serde_json::from_str(r#"[ { "value": "", "weight": 1 } ]"#).unwrap(),
        serde_json::from_str("null").unwrap(),
        serde_json::from_str("42").unwrap(),
        serde_json::from_str(r#"[ 1, "F", { "value": "G", "weight": 2 }, [] ]"#).unwrap(),
    ];

    for raw in &inputs {
        let once = normalize_rule_definition(raw);
        let twice = normalize_rule_definition(&RawRule::from(&once));
        assert_eq!(once, twice, "Normalizing {raw:?} twice changed it");
    }
}

#[test]
fn test_rule_set_round_trips_through_json() {
    let set = RuleSet::from_iter([
        ('F', RuleDefinition::fixed("FF")),
        ('X', RuleDefinition::weighted([("F[+X]", 0.7), ("F[-X]", 0.3)])),
    ]);
    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(
        json,
        r#"{"F":"FF","X":[{"value":"F[+X]","weight":0.7},{"value":"F[-X]","weight":0.3}]}"#
    );
    let back: RuleSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, set);
}
