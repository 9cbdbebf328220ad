// tests/engine_surface.rs
use lsystem_turtle::{
    EngineError, EngineEvent, GrammarSettings, LSystemEngine, Origin, PlaybackMode, PresetCatalog,
    RawRule, RuleDefinition, RuleSet, SettingsPatch, StrokeColor,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn setup() -> LSystemEngine {
    LSystemEngine::builder()
        .catalog(PresetCatalog::builtin())
        .seed(7)
        .build()
        .unwrap()
}

#[test]
fn test_builder_requires_catalog() {
    let result = LSystemEngine::builder().seed(1).build();
    assert!(matches!(result, Err(EngineError::MissingCatalog)));
}

#[test]
fn test_build_applies_default_preset() {
    let engine = setup();
    assert_eq!(engine.settings().preset_key, "fractalTree");
    assert_eq!(engine.preset_label("fractalTree"), "Fractal tree");

    let stats = engine.stats();
    assert_eq!(stats.symbol_count, engine.sentence().chars().count());
    assert_eq!(engine.trace().len(), stats.symbol_count);
    // F -> F[+F][-F] triples the F count each generation.
    assert_eq!(stats.branch_count, 3usize.pow(7));
    assert!(stats.expand_time_ms.is_some());
}

#[test]
fn test_presets_do_not_leak_fields() {
    let mut engine = setup();
    engine.apply_preset("dragonCurve");
    assert_eq!(engine.settings().base_hue, 200);
    assert_eq!(engine.settings().hue_step, 12);

    // alternatingTree does not define hue fields, so they come from the base template.
    engine.apply_preset("alternatingTree");
    let base = GrammarSettings::base_template();
    assert_eq!(engine.settings().base_hue, base.base_hue);
    assert_eq!(engine.settings().hue_step, base.hue_step);
    assert_eq!(engine.sentence().matches('F').count(), 5usize.pow(5));
}

#[test]
fn test_unknown_preset_is_custom_base_template() {
    let mut engine = setup();
    engine.apply_preset("noSuchPreset");
    assert_eq!(engine.settings_snapshot(), GrammarSettings::base_template());
    assert_eq!(engine.sentence(), "F");
    assert_eq!(engine.preset_label("custom"), "Custom");
}

#[test]
fn test_triangle_preset_draws_with_a_and_b() {
    let mut engine = setup();
    engine.apply_preset("trianglePattern");
    let sentence = engine.sentence();
    let movers = sentence.chars().filter(|c| *c == 'A' || *c == 'B').count();
    assert_eq!(engine.stats().branch_count, movers);
}

#[test]
fn test_set_rule_uses_first_character_and_marks_custom() {
    let mut engine = setup();
    engine.set_rule("  Xyz", &RawRule::from("F+F"));
    assert_eq!(engine.settings().rules.get('X'), Some(&RuleDefinition::fixed("F+F")));
    assert_eq!(engine.settings().preset_key, "custom");

    engine.apply_preset("fractalTree");
    let before = engine.settings_snapshot();
    engine.set_rule("   ", &RawRule::from("FF"));
    assert_eq!(engine.settings_snapshot(), before, "Blank symbols are ignored");

    // Setting an identical rule still switches to custom.
    engine.set_rule("F", &RawRule::from("F[+F][-F]"));
    assert_eq!(engine.settings().preset_key, "custom");
}

#[test]
fn test_set_rule_text_parses_weights() {
    let mut engine = setup();
    engine.set_rule_text("F", "FF | 3 ; F-F | 1");
    assert_eq!(
        engine.settings().rules.get('F'),
        Some(&RuleDefinition::weighted([("FF", 3.0), ("F-F", 1.0)]))
    );
}

#[test]
fn test_settings_patch_clamps_and_defers_regeneration() {
    let mut engine = setup();
    let version = engine.render_snapshot().version;

    let change = engine.set_settings(&SettingsPatch {
        iterations: Some(0.0),
        turn_angle: Some(400.0),
        origin: Some(Origin::new(-3.0, 0.5)),
        ..Default::default()
    });
    assert!(change.grammar && change.turtle && change.appearance);
    assert_eq!(engine.settings().iterations, 1);
    assert_eq!(engine.settings().turn_angle, 360.0);
    assert_eq!(engine.settings().origin, Origin::new(-1.0, 0.5));
    assert_eq!(engine.settings().preset_key, "custom");
    assert_eq!(engine.render_snapshot().version, version);

    assert!(engine.is_dirty());
    assert!(engine.regenerate_if_dirty());
    assert_eq!(engine.sentence(), "F[+F][-F]");
    assert!(!engine.regenerate_if_dirty());
}

#[test]
fn test_turtle_only_change_keeps_sentence() {
    let mut engine = setup();
    engine.apply_preset("randomBush");
    let sentence = engine.sentence().to_owned();
    let first_length = engine.trace().segments[0].length;

    engine.set_settings(&SettingsPatch {
        step_length: Some(16.0),
        ..Default::default()
    });
    assert!(engine.regenerate_if_dirty());
    assert_eq!(engine.sentence(), sentence);
    assert_eq!(engine.trace().segments[0].length, 16.0);
    assert_ne!(first_length, 16.0);
}

#[test]
fn test_snapshot_round_trip() {
    let mut engine = setup();
    engine.apply_preset("randomBush");
    let snapshot = engine.settings_snapshot();

    engine.apply_preset("snowCrystal");
    engine.apply_settings_snapshot(&snapshot);
    assert_eq!(engine.settings_snapshot(), snapshot);

    let json = serde_json::to_string(&snapshot).unwrap();
    engine.apply_preset("dragonCurve");
    engine.apply_settings_json(&json).unwrap();
    assert_eq!(engine.settings_snapshot(), snapshot);
}

#[test]
fn test_invalid_snapshot_json_is_reported() {
    let mut engine = setup();
    let before = engine.settings_snapshot();
    let result = engine.apply_settings_json("{ not json");
    assert!(matches!(result, Err(EngineError::Snapshot(_))));
    assert_eq!(engine.settings_snapshot(), before);
}

#[test]
fn test_seeded_engines_agree() {
    let build = || {
        let mut engine = setup();
        engine.apply_preset("randomBush");
        engine.sentence().to_owned()
    };
    assert_eq!(build(), build());
}

#[test]
fn test_observers_see_completed_mutations() {
    let mut engine = setup();
    let events: Arc<Mutex<Vec<EngineEvent>>> = Arc::default();
    let sink = Arc::clone(&events);
    engine.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    engine.apply_preset("snowCrystal");

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    match &events[0] {
        EngineEvent::Regenerated { stats, settings, .. } => {
            assert_eq!(settings.preset_key, "snowCrystal");
            assert_eq!(stats.symbol_count, engine.sentence().chars().count());
        }
        other => panic!("Expected Regenerated, got {other:?}"),
    }
    assert!(matches!(
        &events[1],
        EngineEvent::PresetChanged { key, .. } if key == "snowCrystal"
    ));
}

#[test]
fn test_snapshot_stays_consistent_after_regeneration() {
    let mut engine = setup();
    let old = engine.render_snapshot();
    engine.apply_preset("detailedPlant");
    let new = engine.render_snapshot();

    assert!(new.version > old.version);
    assert_eq!(old.trace.len(), old.sentence.chars().count());
    assert_eq!(new.trace.len(), new.sentence.chars().count());
}

#[test]
fn test_step_playback_scrubs_trace() {
    let mut engine = setup();
    let total = engine.trace().len();
    assert_eq!(engine.executed_count(), total);
    assert_eq!(engine.visible_segments().len(), engine.trace().segments.len());
    assert!(engine.highlighted_segment().is_none());

    engine.set_playback_mode(PlaybackMode::Step, true);
    assert_eq!(engine.executed_count(), 0);
    assert!(engine.visible_segments().is_empty());
    assert_eq!(engine.turtle_at_cursor(), engine.trace().state_at(0));

    engine.step_playback(6);
    assert_eq!(engine.executed_count(), 6);
    assert!(engine.visible_segments().iter().all(|s| s.command_index < 6));
    assert_eq!(engine.turtle_at_cursor(), engine.trace().state_at(6));
    assert!(engine.highlighted_segment().is_some());

    engine.set_playback_speed(100.0);
    engine.start_playback(false);
    engine.advance_playback(Duration::from_millis(500));
    assert_eq!(engine.executed_count(), 56);
    assert!(engine.playback_state().playing);

    // Regenerating keeps step mode but rewinds the cursor.
    engine.regenerate();
    let state = engine.playback_state();
    assert_eq!(state.mode, PlaybackMode::Step);
    assert!(!state.playing);
    assert_eq!(state.step_index, 0.0);
    assert_eq!(state.total_steps, engine.trace().len());

    engine.set_playback_mode(PlaybackMode::Static, false);
    assert_eq!(engine.executed_count(), engine.trace().len());
}

#[test]
fn test_reset_and_toggle_playback() {
    let mut engine = setup();

    engine.toggle_playback();
    let state = engine.playback_state();
    assert_eq!(state.mode, PlaybackMode::Step);
    assert!(state.playing);

    engine.toggle_playback();
    assert!(!engine.playback_state().playing);

    engine.step_playback(10);
    engine.reset_step_playback();
    assert_eq!(engine.executed_count(), 0);

    engine.set_playback_speed(f64::NAN);
    assert_eq!(engine.playback_state().speed, 360.0);
    engine.set_playback_speed(1.0);
    assert_eq!(engine.playback_state().speed, 10.0);
}

#[test]
fn test_set_rules_replaces_grammar() {
    let mut engine = setup();
    engine.set_rules(RuleSet::from_iter([('F', RuleDefinition::fixed("FF"))]));
    assert_eq!(engine.settings().preset_key, "custom");
    assert!(engine.is_dirty());

    assert!(engine.regenerate_if_dirty());
    // fractalTree runs 7 iterations of F -> FF.
    assert_eq!(engine.sentence(), "F".repeat(128));
    assert_eq!(engine.stats().branch_count, 128);
}

#[test]
fn test_injected_rng_reproduces_sentence() {
    let build = || {
        let mut engine = LSystemEngine::builder()
            .catalog(PresetCatalog::builtin())
            .rng(StdRng::seed_from_u64(11))
            .build()
            .unwrap();
        engine.apply_preset("randomBush");
        engine.sentence().to_owned()
    };
    let first = build();
    assert!(first.len() > 1);
    assert_eq!(first, build());
}

#[test]
fn test_builder_draw_aliases_change_branch_count() {
    let mut engine = LSystemEngine::builder()
        .catalog(PresetCatalog::builtin())
        .seed(3)
        .draw_aliases(['F'])
        .build()
        .unwrap();
    engine.apply_preset("trianglePattern");
    // The arrowhead only moves with A and B, which no longer draw.
    assert_eq!(engine.stats().branch_count, 0);
    assert!(engine.trace().segments.is_empty());

    engine.apply_preset("fractalTree");
    assert_eq!(engine.stats().branch_count, 3usize.pow(7));
}

#[test]
fn test_snapshot_json_coerces_malformed_rules() {
    let mut engine = setup();
    engine
        .apply_settings_json(r#"{ "axiom": "FX", "rules": { "F": 5, "X": ["XF", 2, true] } }"#)
        .unwrap();
    assert_eq!(engine.settings().rules.get('F'), Some(&RuleDefinition::fixed("")));
    assert_eq!(engine.settings().rules.get('X'), Some(&RuleDefinition::fixed("XF")));
    // Iterations stay at fractalTree's 7.
    assert_eq!(engine.sentence(), format!("FX{}", "F".repeat(7)));
}

#[test]
fn test_loaded_catalog_template_is_clamped() {
    let mut template = serde_json::to_value(GrammarSettings::base_template()).unwrap();
    template["axiom"] = serde_json::json!("");
    template["iterations"] = serde_json::json!(40);
    template["stepLength"] = serde_json::json!(900.0);
    let catalog = serde_json::json!({
        "presets": [],
        "defaultKey": "missing",
        "baseTemplate": template,
    });

    let catalog = PresetCatalog::from_json(&catalog.to_string()).unwrap();
    assert_eq!(catalog.base_template.axiom, "F");
    assert_eq!(catalog.base_template.iterations, 20);
    assert_eq!(catalog.base_template.step_length, 160.0);

    let engine = LSystemEngine::builder().catalog(catalog).seed(1).build().unwrap();
    // The template rule F -> F keeps the sentence at one symbol.
    assert_eq!(engine.sentence(), "F");
    assert_eq!(engine.settings().preset_key, "custom");
}

#[test]
fn test_stroke_follows_current_settings() {
    let mut engine = setup();
    let segment = engine.trace().segments[0];
    let plain = engine.stroke_for(&segment, false);
    assert_eq!(plain.color, StrokeColor::Rgb { rgb: [40.0, 40.0, 40.0] });
    assert_eq!(plain.weight, 6.0);

    engine.apply_preset("dragonCurve");
    let segment = engine.trace().segments[0];
    assert!(matches!(
        engine.stroke_for(&segment, true).color,
        StrokeColor::Hsb { brightness, .. } if brightness == 82.0
    ));
}
