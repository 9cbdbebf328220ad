//! The materialized result of interpreting a sentence.
//!
//! An [`ExecutionTrace`] holds one [`CommandRecord`] per symbol and one
//! [`DrawSegment`] per draw command. It is built once per sentence/parameter
//! change and then queried at arbitrary playback cursors without re-walking.

use crate::turtle::TurtleState;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Category of an executed symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    Draw,
    /// Counter-clockwise on screen (heading decreased).
    TurnLeft,
    /// Clockwise on screen (heading increased).
    TurnRight,
    PushState,
    PopState,
    NoOp,
}

/// The turtle before and after one symbol.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRecord {
    /// Position of the symbol in the sentence, counted in characters.
    pub index: usize,
    pub symbol: char,
    pub kind: CommandKind,
    pub before: TurtleState,
    pub after: TurtleState,
    pub depth_before: usize,
    pub depth_after: usize,
}

/// A line drawn by one draw command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawSegment {
    /// Index of the originating command in the trace.
    pub command_index: usize,
    /// Branch stack depth when the segment was drawn.
    pub depth: usize,
    pub width: f32,
    pub length: f32,
    pub start: Vec2,
    pub end: Vec2,
}

/// Axis-aligned box around all segment endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn include(&mut self, point: Vec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Turtle state at a playback cursor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CursorState {
    pub turtle: TurtleState,
    pub depth: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionTrace {
    pub commands: Vec<CommandRecord>,
    /// Ordered by `command_index`.
    pub segments: Vec<DrawSegment>,
    pub branch_count: usize,
    /// `None` when nothing was drawn.
    pub bounds: Option<Bounds>,
    pub initial: TurtleState,
}

impl ExecutionTrace {
    /// A trace of an empty sentence.
    pub fn empty(initial: TurtleState) -> Self {
        Self {
            commands: Vec::new(),
            segments: Vec::new(),
            branch_count: 0,
            bounds: None,
            initial,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Turtle state after `cursor` commands have executed.
    ///
    /// `0` gives the state before the first command (the initial state for an
    /// empty trace); cursors past the end clamp to the final state.
    pub fn state_at(&self, cursor: usize) -> CursorState {
        if cursor == 0 || self.commands.is_empty() {
            return match self.commands.first() {
                Some(first) => CursorState {
                    turtle: first.before,
                    depth: first.depth_before,
                },
                None => CursorState {
                    turtle: self.initial,
                    depth: 0,
                },
            };
        }
        let command = &self.commands[cursor.min(self.commands.len()) - 1];
        CursorState {
            turtle: command.after,
            depth: command.depth_after,
        }
    }

    /// State after the whole sentence.
    pub fn final_state(&self) -> CursorState {
        self.state_at(self.commands.len())
    }

    /// Segments produced by the first `cursor` commands, in drawing order.
    pub fn segments_before(&self, cursor: usize) -> &[DrawSegment] {
        let end = self
            .segments
            .partition_point(|segment| segment.command_index < cursor);
        &self.segments[..end]
    }

    /// The most recent segment drawn once `executed` commands ran, if any.
    pub fn highlight_segment(&self, executed: usize) -> Option<&DrawSegment> {
        if executed == 0 {
            return None;
        }
        self.segments_before(executed.min(self.commands.len()))
            .last()
    }
}
