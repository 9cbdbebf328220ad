//! Turtle state and operations for 2D interpretation.
//!
//! Screen convention: `+x` points right, `+y` points down, headings are in
//! degrees with `0°` pointing right and increasing clockwise. The turtle starts
//! at the local origin facing up (`-90°`); placing that origin on a canvas is
//! the renderer's job (see [`crate::style::CanvasPlacement`]).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Heading of a fresh turtle: straight up on screen.
pub const INITIAL_HEADING: f32 = -90.0;

/// Parameters the interpreter walks a sentence with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurtleConfig {
    /// Degrees per turn command.
    pub turn_angle: f32,
    /// Length of a draw step at depth zero.
    pub step_length: f32,
    /// Multiplier applied to the step length on every push.
    pub step_decay: f32,
    /// Multiplier applied to the stroke width on every push.
    pub width_decay: f32,
    /// Stroke width at depth zero.
    pub base_width: f32,
    pub initial_heading: f32,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            turn_angle: 25.0,
            step_length: 8.0,
            step_decay: 0.75,
            width_decay: 0.7,
            base_width: 10.0,
            initial_heading: INITIAL_HEADING,
        }
    }
}

/// The state of the drawing turtle.
///
/// This is also the frame saved on the branch stack by `[` and restored by `]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Position in the local drawing frame.
    pub position: Vec2,
    /// Heading in degrees.
    pub heading: f32,
    /// Current stroke width.
    pub width: f32,
    /// Current step length.
    pub length: f32,
}

impl TurtleState {
    /// The state every interpretation starts from (and falls back to on a stray `]`).
    pub fn initial(config: &TurtleConfig) -> Self {
        Self {
            position: Vec2::ZERO,
            heading: config.initial_heading,
            width: config.base_width,
            length: config.step_length,
        }
    }

    /// Unit vector along the current heading.
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.heading.to_radians())
    }

    /// Moves one step along the heading. Returns the start and end points.
    pub fn advance(&mut self) -> (Vec2, Vec2) {
        let start = self.position;
        self.position += self.direction() * self.length;
        (start, self.position)
    }

    /// Rotates clockwise on screen by `degrees` (counter-clockwise when negative).
    pub fn turn(&mut self, degrees: f32) {
        self.heading += degrees;
    }

    /// Shrinks width and length for a child branch.
    pub fn shrink(&mut self, width_decay: f32, step_decay: f32) {
        self.width *= width_decay;
        self.length *= step_decay;
    }
}

/// Operations that can be bound to a symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurtleOp {
    /// Advance one step and emit a draw segment (`F`, `A`, `B`, `G`).
    Draw,
    /// Turn by `turn_angle` times the sign (`+` is `1.0`, `-` is `-1.0`).
    Turn(f32),
    /// Save the turtle onto the branch stack, then shrink (`[`).
    Push,
    /// Restore the most recently saved turtle (`]`).
    Pop,
    /// No-op: the symbol only occupies a trace slot.
    Ignore,
}
