//! Stroke styling and canvas placement for renderers.

use crate::settings::GrammarSettings;
use crate::trace::DrawSegment;
use glam::Vec2;
use serde::{Deserialize, Serialize};

const MIN_STROKE_WEIGHT: f32 = 0.4;
const HIGHLIGHT_WIDTH_SCALE: f32 = 1.15;
const HIGHLIGHT_RGB_BOOST: f32 = 32.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum StrokeColor {
    /// Hue in degrees, saturation and brightness in percent.
    Hsb {
        hue: f32,
        saturation: f32,
        brightness: f32,
    },
    Rgb { rgb: [f32; 3] },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: StrokeColor,
    pub weight: f32,
}

/// How `segment` should be stroked under `settings`.
///
/// With colorize on, hue walks by `hue_step` per nesting level and saturation
/// rises with depth; otherwise the fixed branch colour is used.
pub fn stroke_style(settings: &GrammarSettings, segment: &DrawSegment, highlight: bool) -> StrokeStyle {
    let color = if settings.colorize {
        let depth = segment.depth as f32;
        StrokeColor::Hsb {
            hue: (settings.base_hue as f32 + depth * settings.hue_step as f32).rem_euclid(360.0),
            saturation: 25.0 + depth / 12.0 * 65.0,
            brightness: if highlight { 82.0 } else { 65.0 },
        }
    } else {
        let boost = if highlight { HIGHLIGHT_RGB_BOOST } else { 0.0 };
        StrokeColor::Rgb {
            rgb: settings.branch_color.map(|c| (c + boost).min(255.0)),
        }
    };

    let width = if segment.width.is_finite() {
        segment.width
    } else {
        settings.base_branch_width
    }
    .max(MIN_STROKE_WEIGHT);
    let weight = if highlight { width * HIGHLIGHT_WIDTH_SCALE } else { width };

    StrokeStyle {
        color,
        weight: weight.max(MIN_STROKE_WEIGHT),
    }
}

/// Maps the turtle's local frame onto a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasPlacement {
    /// Canvas pixel the local origin lands on.
    pub translation: Vec2,
    /// Clockwise rotation in degrees applied around that pixel.
    pub rotation: f32,
}

impl CanvasPlacement {
    pub fn new(settings: &GrammarSettings, canvas_size: Vec2) -> Self {
        Self {
            translation: canvas_size * Vec2::new(settings.origin.x, settings.origin.y),
            rotation: settings.initial_rotation,
        }
    }

    pub fn to_canvas(&self, local: Vec2) -> Vec2 {
        self.translation + Vec2::from_angle(self.rotation.to_radians()).rotate(local)
    }
}
