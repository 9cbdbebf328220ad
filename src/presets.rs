//! Named settings presets.
//!
//! A preset only lists the fields it cares about. Applying one starts from the
//! catalog's base template, so fields a preset omits never leak over from the
//! previously active preset.

use crate::error::EngineError;
use crate::rules::{RuleDefinition, RuleSet};
use crate::settings::{CUSTOM_PRESET_KEY, GrammarSettings, Origin, SettingsPatch};
use serde::{Deserialize, Serialize};

/// Label reported for settings that do not match a preset.
pub const CUSTOM_LABEL: &str = "Custom";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub settings: SettingsPatch,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetCatalog {
    pub presets: Vec<Preset>,
    pub default_key: String,
    #[serde(default)]
    pub base_template: GrammarSettings,
}

impl PresetCatalog {
    /// Parses a catalog from JSON.
    ///
    /// The catalog's base template goes through the same clamping as any other
    /// settings input.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let mut catalog: Self = serde_json::from_str(text).map_err(EngineError::Catalog)?;
        let mut base_template = GrammarSettings::base_template();
        base_template.apply_patch(&SettingsPatch::from(&catalog.base_template));
        catalog.base_template = base_template;
        Ok(catalog)
    }

    pub fn get(&self, key: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.key == key)
    }

    pub fn label(&self, key: &str) -> &str {
        self.get(key).map_or(CUSTOM_LABEL, |preset| preset.label.as_str())
    }

    /// Settings for `key`: the base template with the preset overlaid.
    ///
    /// Unknown keys yield the bare base template marked as custom.
    pub fn resolve(&self, key: &str) -> GrammarSettings {
        let mut settings = self.base_template.clone();
        match self.get(key) {
            Some(preset) => {
                settings.apply_patch(&preset.settings);
                settings.preset_key = preset.key.clone();
            }
            None => settings.preset_key = CUSTOM_PRESET_KEY.to_owned(),
        }
        settings
    }

    /// The ten presets shipped with the sketch.
    pub fn builtin() -> Self {
        Self {
            presets: vec![
                preset(
                    "spreadingTree",
                    "Spreading tree",
                    "A straight trunk whose branches spread evenly to both sides.",
                    SettingsPatch {
                        axiom: Some("F".into()),
                        rules: Some(fixed_rules(&[('F', "FF+[+F-F-F]-[-F+F+F]")])),
                        iterations: Some(5.0),
                        turn_angle: Some(24.0),
                        step_length: Some(9.0),
                        step_decay: Some(0.78),
                        width_decay: Some(0.72),
                        base_branch_width: Some(9.0),
                        colorize: Some(true),
                        base_hue: Some(118.0),
                        hue_step: Some(6.0),
                        branch_color: Some([96.0, 70.0, 40.0]),
                        background_color: Some([238.0, 247.0, 255.0]),
                        initial_rotation: Some(0.0),
                        origin: Some(Origin::new(0.5, 0.94)),
                        ..Default::default()
                    },
                ),
                preset(
                    "detailedPlant",
                    "Leafy plant",
                    "Two rules combine into a soft plant with many fine twigs.",
                    SettingsPatch {
                        axiom: Some("X".into()),
                        rules: Some(fixed_rules(&[('X', "F+[[X]-X]-F[-FX]+X"), ('F', "FF")])),
                        iterations: Some(6.0),
                        turn_angle: Some(28.0),
                        step_length: Some(7.0),
                        step_decay: Some(0.88),
                        width_decay: Some(0.72),
                        base_branch_width: Some(7.0),
                        colorize: Some(true),
                        base_hue: Some(110.0),
                        hue_step: Some(8.0),
                        branch_color: Some([92.0, 70.0, 40.0]),
                        background_color: Some([232.0, 246.0, 243.0]),
                        initial_rotation: Some(0.0),
                        origin: Some(Origin::new(0.48, 0.96)),
                        ..Default::default()
                    },
                ),
                preset(
                    "alternatingTree",
                    "Alternating tree",
                    "Branches leave the trunk at different heights, right then left.",
                    SettingsPatch {
                        axiom: Some("F".into()),
                        rules: Some(fixed_rules(&[('F', "F[+F]F[-F]F")])),
                        iterations: Some(5.0),
                        turn_angle: Some(22.0),
                        step_length: Some(4.0),
                        step_decay: Some(0.8),
                        width_decay: Some(0.68),
                        base_branch_width: Some(8.0),
                        colorize: Some(false),
                        branch_color: Some([72.0, 60.0, 52.0]),
                        background_color: Some([241.0, 248.0, 255.0]),
                        initial_rotation: Some(0.0),
                        origin: Some(Origin::new(0.5, 0.94)),
                        ..Default::default()
                    },
                ),
                preset(
                    "denseTree",
                    "Dense tree",
                    "Branches grow right, left and straight up for a thick crown.",
                    SettingsPatch {
                        axiom: Some("F".into()),
                        rules: Some(fixed_rules(&[('F', "F[+F]F[-F][F]")])),
                        iterations: Some(6.0),
                        turn_angle: Some(23.0),
                        step_length: Some(11.0),
                        step_decay: Some(0.76),
                        width_decay: Some(0.70),
                        base_branch_width: Some(9.0),
                        colorize: Some(true),
                        base_hue: Some(105.0),
                        hue_step: Some(8.0),
                        branch_color: Some([85.0, 68.0, 45.0]),
                        background_color: Some([243.0, 249.0, 246.0]),
                        initial_rotation: Some(0.0),
                        origin: Some(Origin::new(0.5, 0.94)),
                        ..Default::default()
                    },
                ),
                preset(
                    "symmetricTree",
                    "Symmetric tree",
                    "Matching branches sprout left and right from the same node.",
                    SettingsPatch {
                        axiom: Some("F".into()),
                        rules: Some(fixed_rules(&[('F', "F[+F][-F]F")])),
                        iterations: Some(6.0),
                        turn_angle: Some(25.0),
                        step_length: Some(10.0),
                        step_decay: Some(0.78),
                        width_decay: Some(0.70),
                        base_branch_width: Some(3.0),
                        colorize: Some(true),
                        base_hue: Some(90.0),
                        hue_step: Some(7.0),
                        branch_color: Some([80.0, 65.0, 45.0]),
                        background_color: Some([245.0, 250.0, 248.0]),
                        initial_rotation: Some(0.0),
                        origin: Some(Origin::new(0.5, 0.94)),
                        ..Default::default()
                    },
                ),
                preset(
                    "randomBush",
                    "Random water weed",
                    "Two rules chosen half the time each; every run grows differently.",
                    SettingsPatch {
                        axiom: Some("F".into()),
                        rules: Some(RuleSet::from_iter([(
                            'F',
                            RuleDefinition::weighted([
                                ("FF-[-F+F+F]+[+F-F-F]", 0.5),
                                ("FF+[+F-F]-[-F+F]", 0.5),
                            ]),
                        )])),
                        iterations: Some(5.0),
                        turn_angle: Some(24.0),
                        step_length: Some(8.0),
                        step_decay: Some(0.83),
                        width_decay: Some(0.74),
                        base_branch_width: Some(7.0),
                        colorize: Some(true),
                        base_hue: Some(112.0),
                        hue_step: Some(10.0),
                        branch_color: Some([90.0, 70.0, 42.0]),
                        background_color: Some([226.0, 244.0, 235.0]),
                        initial_rotation: Some(0.0),
                        origin: Some(Origin::new(0.5, 0.96)),
                        ..Default::default()
                    },
                ),
                preset(
                    "fractalTree",
                    "Fractal tree",
                    "A perfectly symmetric binary tree splitting at a constant angle.",
                    SettingsPatch {
                        axiom: Some("F".into()),
                        rules: Some(fixed_rules(&[('F', "F[+F][-F]")])),
                        iterations: Some(7.0),
                        turn_angle: Some(25.7),
                        step_length: Some(100.0),
                        step_decay: Some(0.8),
                        width_decay: Some(0.75),
                        base_branch_width: Some(6.0),
                        colorize: Some(false),
                        branch_color: Some([40.0, 40.0, 40.0]),
                        background_color: Some([250.0, 250.0, 250.0]),
                        initial_rotation: Some(0.0),
                        origin: Some(Origin::new(0.5, 0.95)),
                        ..Default::default()
                    },
                ),
                preset(
                    "snowCrystal",
                    "Snow crystal",
                    "Koch snowflake: every edge folds into a peak each generation.",
                    SettingsPatch {
                        axiom: Some("F--F--F".into()),
                        rules: Some(fixed_rules(&[('F', "F+F--F+F")])),
                        iterations: Some(4.0),
                        turn_angle: Some(60.0),
                        step_length: Some(9.0),
                        step_decay: Some(1.0),
                        width_decay: Some(1.0),
                        base_branch_width: Some(2.0),
                        colorize: Some(false),
                        branch_color: Some([24.0, 66.0, 128.0]),
                        background_color: Some([245.0, 249.0, 255.0]),
                        initial_rotation: Some(-90.0),
                        origin: Some(Origin::new(0.75, 0.3)),
                        ..Default::default()
                    },
                ),
                preset(
                    "trianglePattern",
                    "Triangle pattern",
                    "Sierpinski arrowhead; both A and B move forward.",
                    SettingsPatch {
                        axiom: Some("A".into()),
                        rules: Some(fixed_rules(&[('A', "B-A-B"), ('B', "A+B+A")])),
                        iterations: Some(7.0),
                        turn_angle: Some(60.0),
                        step_length: Some(9.0),
                        step_decay: Some(1.0),
                        width_decay: Some(1.0),
                        base_branch_width: Some(1.6),
                        colorize: Some(false),
                        branch_color: Some([36.0, 68.0, 110.0]),
                        background_color: Some([248.0, 250.0, 252.0]),
                        initial_rotation: Some(-30.0),
                        origin: Some(Origin::new(0.9, 0.9)),
                        ..Default::default()
                    },
                ),
                preset(
                    "dragonCurve",
                    "Dragon curve",
                    "The shape of a strip of paper folded in half again and again.",
                    SettingsPatch {
                        axiom: Some("FX".into()),
                        rules: Some(fixed_rules(&[('X', "X+YF+"), ('Y', "-FX-Y")])),
                        iterations: Some(13.0),
                        turn_angle: Some(90.0),
                        step_length: Some(8.0),
                        step_decay: Some(1.0),
                        width_decay: Some(0.95),
                        base_branch_width: Some(2.5),
                        colorize: Some(true),
                        base_hue: Some(200.0),
                        hue_step: Some(12.0),
                        branch_color: Some([40.0, 40.0, 40.0]),
                        background_color: Some([245.0, 247.0, 250.0]),
                        initial_rotation: Some(90.0),
                        origin: Some(Origin::new(0.8, 0.65)),
                        ..Default::default()
                    },
                ),
            ],
            default_key: "fractalTree".to_owned(),
            base_template: GrammarSettings::base_template(),
        }
    }
}

fn preset(key: &str, label: &str, description: &str, settings: SettingsPatch) -> Preset {
    Preset {
        key: key.to_owned(),
        label: label.to_owned(),
        description: description.to_owned(),
        settings,
    }
}

fn fixed_rules(rules: &[(char, &str)]) -> RuleSet {
    rules
        .iter()
        .map(|(symbol, text)| (*symbol, RuleDefinition::fixed(*text)))
        .collect()
}
