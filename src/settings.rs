//! Grammar and turtle settings, partial patches and their clamping rules.

use crate::rules::{RuleDefinition, RuleSet};
use crate::turtle::{INITIAL_HEADING, TurtleConfig};
use serde::{Deserialize, Deserializer, Serialize};

/// Preset identity used whenever settings were edited by hand.
pub const CUSTOM_PRESET_KEY: &str = "custom";

/// An RGB colour with channels in `[0, 255]`.
pub type Rgb = [f32; 3];

/// Drawing origin as fractions of the canvas size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub x: f32,
    pub y: f32,
}

impl Origin {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamps both coordinates to `[-1, 2]`, keeping `fallback` for NaN.
    pub fn normalized(self, fallback: Origin) -> Self {
        Self {
            x: clamp_number(self.x, -1.0, 2.0, fallback.x),
            y: clamp_number(self.y, -1.0, 2.0, fallback.y),
        }
    }
}

/// Clamps `value` into `[min, max]`; NaN yields `fallback`.
pub fn clamp_number(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Rounds and clamps `value` into `[min, max]`; NaN yields `fallback`.
pub fn clamp_to_int(value: f64, min: i64, max: i64, fallback: i64) -> i64 {
    if value.is_nan() {
        fallback
    } else {
        value.round().clamp(min as f64, max as f64) as i64
    }
}

/// Clamps every channel to `[0, 255]`, channel-wise fallback for NaN.
pub fn normalize_color(value: Rgb, fallback: Rgb) -> Rgb {
    [0, 1, 2].map(|i| clamp_number(value[i], 0.0, 255.0, fallback[i]))
}

/// Complete settings owned by the engine. Also the shape of a settings snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarSettings {
    pub axiom: String,
    pub rules: RuleSet,
    pub iterations: u32,
    /// Degrees added (`+`) or subtracted (`-`) per turn command.
    pub turn_angle: f32,
    pub step_length: f32,
    /// Step length multiplier applied on every push.
    pub step_decay: f32,
    /// Stroke width multiplier applied on every push.
    pub width_decay: f32,
    pub base_branch_width: f32,
    pub colorize: bool,
    pub base_hue: i32,
    pub hue_step: i32,
    pub branch_color: Rgb,
    pub background_color: Rgb,
    /// Rotation in degrees applied by the renderer around the origin.
    pub initial_rotation: f32,
    pub origin: Origin,
    pub preset_key: String,
}

impl Default for GrammarSettings {
    fn default() -> Self {
        Self::base_template()
    }
}

impl GrammarSettings {
    /// The template every preset is overlaid on.
    pub fn base_template() -> Self {
        Self {
            axiom: "F".to_owned(),
            rules: RuleSet::from_iter([('F', RuleDefinition::fixed("F"))]),
            iterations: 4,
            turn_angle: 25.0,
            step_length: 8.0,
            step_decay: 0.75,
            width_decay: 0.7,
            base_branch_width: 10.0,
            colorize: true,
            base_hue: 120,
            hue_step: 5,
            branch_color: [96.0, 70.0, 40.0],
            background_color: [240.0, 248.0, 255.0],
            initial_rotation: 0.0,
            origin: Origin::new(0.5, 0.92),
            preset_key: CUSTOM_PRESET_KEY.to_owned(),
        }
    }

    /// Turtle parameters derived from these settings.
    pub fn turtle_config(&self) -> TurtleConfig {
        TurtleConfig {
            turn_angle: self.turn_angle,
            step_length: self.step_length,
            step_decay: self.step_decay,
            width_decay: self.width_decay,
            base_width: self.base_branch_width,
            initial_heading: INITIAL_HEADING,
        }
    }

    /// Applies every field present in `patch`, clamping out-of-range values.
    ///
    /// Does not touch `preset_key`; callers decide the resulting identity.
    pub fn apply_patch(&mut self, patch: &SettingsPatch) -> SettingsChange {
        let mut change = SettingsChange::default();

        if let Some(axiom) = &patch.axiom {
            self.axiom = if axiom.is_empty() {
                "F".to_owned()
            } else {
                axiom.clone()
            };
            change.grammar = true;
        }
        if let Some(rules) = &patch.rules {
            self.rules = rules.clone();
            change.grammar = true;
        }
        if let Some(iterations) = patch.iterations {
            self.iterations = clamp_to_int(iterations, 1, 20, i64::from(self.iterations)) as u32;
            change.grammar = true;
        }

        if let Some(v) = patch.turn_angle {
            self.turn_angle = clamp_number(v, 0.0, 360.0, self.turn_angle);
            change.turtle = true;
        }
        if let Some(v) = patch.step_length {
            self.step_length = clamp_number(v, 1.0, 160.0, self.step_length);
            change.turtle = true;
        }
        if let Some(v) = patch.step_decay {
            self.step_decay = clamp_number(v, 0.3, 1.2, self.step_decay);
            change.turtle = true;
        }
        if let Some(v) = patch.width_decay {
            self.width_decay = clamp_number(v, 0.2, 1.1, self.width_decay);
            change.turtle = true;
        }
        if let Some(v) = patch.base_branch_width {
            self.base_branch_width = clamp_number(v, 1.0, 40.0, self.base_branch_width);
            change.turtle = true;
        }

        if let Some(v) = patch.colorize {
            self.colorize = v;
            change.appearance = true;
        }
        if let Some(v) = patch.base_hue {
            self.base_hue = clamp_to_int(v, 0, 360, i64::from(self.base_hue)) as i32;
            change.appearance = true;
        }
        if let Some(v) = patch.hue_step {
            self.hue_step = clamp_to_int(v, 0, 120, i64::from(self.hue_step)) as i32;
            change.appearance = true;
        }
        if let Some(v) = patch.branch_color {
            self.branch_color = normalize_color(v, self.branch_color);
            change.appearance = true;
        }
        if let Some(v) = patch.background_color {
            self.background_color = normalize_color(v, self.background_color);
            change.appearance = true;
        }
        if let Some(v) = patch.initial_rotation {
            self.initial_rotation = clamp_number(v, -360.0, 360.0, self.initial_rotation);
            change.appearance = true;
        }
        if let Some(v) = patch.origin {
            self.origin = v.normalized(self.origin);
            change.appearance = true;
        }

        change
    }
}

/// A partial update. Absent fields are left alone.
///
/// Numeric fields are deliberately wide so that out-of-range input can be
/// clamped instead of rejected. `preset_key` is only honoured when a patch is
/// applied as a whole snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axiom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleSet>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f64")]
    pub iterations: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f32")]
    pub turn_angle: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f32")]
    pub step_length: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f32")]
    pub step_decay: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f32")]
    pub width_decay: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f32")]
    pub base_branch_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f64")]
    pub base_hue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f64")]
    pub hue_step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_f32")]
    pub initial_rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_key: Option<String>,
}

/// Number coercion for snapshot fields: numeric strings parse, blank strings
/// and `false` read as `0`, `true` as `1`. Anything else becomes NaN, which the
/// clamps turn into "keep the current value".
fn coerce_number(value: &serde_json::Value) -> f64 {
    use serde_json::Value;
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        _ => f64::NAN,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<serde_json::Value>::deserialize(deserializer)?.map(|value| coerce_number(&value)))
}

fn lenient_f32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    Ok(lenient_f64(deserializer)?.map(|value| value as f32))
}

impl From<&GrammarSettings> for SettingsPatch {
    fn from(settings: &GrammarSettings) -> Self {
        Self {
            axiom: Some(settings.axiom.clone()),
            rules: Some(settings.rules.clone()),
            iterations: Some(f64::from(settings.iterations)),
            turn_angle: Some(settings.turn_angle),
            step_length: Some(settings.step_length),
            step_decay: Some(settings.step_decay),
            width_decay: Some(settings.width_decay),
            base_branch_width: Some(settings.base_branch_width),
            colorize: Some(settings.colorize),
            base_hue: Some(f64::from(settings.base_hue)),
            hue_step: Some(f64::from(settings.hue_step)),
            branch_color: Some(settings.branch_color),
            background_color: Some(settings.background_color),
            initial_rotation: Some(settings.initial_rotation),
            origin: Some(settings.origin),
            preset_key: Some(settings.preset_key.clone()),
        }
    }
}

/// Which derived data a settings mutation invalidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsChange {
    /// Axiom, rules or iteration count changed: the sentence must be re-expanded.
    pub grammar: bool,
    /// Turtle parameters changed: the trace must be rebuilt.
    pub turtle: bool,
    /// Only colours or placement changed: a redraw is enough.
    pub appearance: bool,
}

impl SettingsChange {
    pub const ALL: Self = Self {
        grammar: true,
        turtle: true,
        appearance: true,
    };

    pub fn merge(self, other: Self) -> Self {
        Self {
            grammar: self.grammar || other.grammar,
            turtle: self.turtle || other.turtle,
            appearance: self.appearance || other.appearance,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.grammar || self.turtle || self.appearance)
    }
}
