//! Turtle walk over an expanded sentence.
//!
//! [`TurtleInterpreter::interpret`] runs one command per character and returns
//! an [`ExecutionTrace`] holding the before/after turtle of every command, the
//! drawn segments in order and their bounds. Which characters draw is
//! configurable; `+ - [ ]` are fixed by [`TurtleInterpreter::standard`].

use crate::trace::{Bounds, CommandKind, CommandRecord, DrawSegment, ExecutionTrace};
use crate::turtle::{TurtleConfig, TurtleOp, TurtleState};
use std::collections::HashMap;

/// Symbols that draw by default. Some grammars (the Sierpiński presets) move with `A`/`B`.
pub const DEFAULT_DRAW_ALIASES: [char; 4] = ['F', 'A', 'B', 'G'];

/// Walks sentences with a turtle and records every step.
#[derive(Clone, Debug)]
pub struct TurtleInterpreter {
    op_map: HashMap<char, TurtleOp>,
    config: TurtleConfig,
}

impl Default for TurtleInterpreter {
    fn default() -> Self {
        Self::standard(TurtleConfig::default())
    }
}

impl TurtleInterpreter {
    /// Creates an interpreter with the given configuration and an empty symbol map.
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            op_map: HashMap::new(),
            config,
        }
    }

    /// Creates an interpreter with [`populate_standard_symbols`](Self::populate_standard_symbols) applied.
    pub fn standard(config: TurtleConfig) -> Self {
        let mut interpreter = Self::new(config);
        interpreter.populate_standard_symbols();
        interpreter
    }

    /// Assigns a single [`TurtleOp`] to a symbol.
    pub fn set_op(&mut self, symbol: char, op: TurtleOp) {
        self.op_map.insert(symbol, op);
    }

    pub fn op(&self, symbol: char) -> TurtleOp {
        self.op_map.get(&symbol).copied().unwrap_or(TurtleOp::Ignore)
    }

    /// Registers the draw aliases plus `+`, `-`, `[` and `]`.
    pub fn populate_standard_symbols(&mut self) {
        self.set_draw_aliases(DEFAULT_DRAW_ALIASES);
        self.set_op('+', TurtleOp::Turn(1.0));
        self.set_op('-', TurtleOp::Turn(-1.0));
        self.set_op('[', TurtleOp::Push);
        self.set_op(']', TurtleOp::Pop);
    }

    /// Replaces the set of symbols that draw. Previous aliases become no-ops.
    pub fn set_draw_aliases(&mut self, aliases: impl IntoIterator<Item = char>) {
        self.op_map.retain(|_, op| *op != TurtleOp::Draw);
        for symbol in aliases {
            self.set_op(symbol, TurtleOp::Draw);
        }
    }

    pub fn draw_aliases(&self) -> Vec<char> {
        let mut aliases: Vec<char> = self
            .op_map
            .iter()
            .filter(|(_, op)| **op == TurtleOp::Draw)
            .map(|(symbol, _)| *symbol)
            .collect();
        aliases.sort_unstable();
        aliases
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TurtleConfig) {
        self.config = config;
    }

    /// Interprets `sentence` and returns the full trace.
    ///
    /// The trace holds exactly one record per character. The turtle starts at
    /// the local origin facing up.
    ///
    /// # Push / Pop
    ///
    /// `[` saves position, heading, width and length on an explicit stack, then
    /// shrinks width and length by the decay factors. `]` restores the saved
    /// frame; on an empty stack it resets to the initial state. Frames left
    /// open at the end are discarded.
    pub fn interpret(&self, sentence: &str) -> ExecutionTrace {
        let initial = TurtleState::initial(&self.config);
        let mut trace = ExecutionTrace::empty(initial);
        trace.commands.reserve(sentence.len());

        let mut turtle = initial;
        let mut stack: Vec<TurtleState> = Vec::new();

        for (index, symbol) in sentence.chars().enumerate() {
            let before = turtle;
            let depth_before = stack.len();

            let kind = match self.op(symbol) {
                TurtleOp::Draw => {
                    let (start, end) = turtle.advance();
                    trace.segments.push(DrawSegment {
                        command_index: index,
                        depth: stack.len(),
                        width: turtle.width,
                        length: turtle.length,
                        start,
                        end,
                    });
                    match trace.bounds.as_mut() {
                        Some(bounds) => {
                            bounds.include(start);
                            bounds.include(end);
                        }
                        None => trace.bounds = Some(Bounds::from_points(start, end)),
                    }
                    trace.branch_count += 1;
                    CommandKind::Draw
                }
                TurtleOp::Turn(sign) => {
                    turtle.turn(self.config.turn_angle * sign);
                    if sign < 0.0 {
                        CommandKind::TurnLeft
                    } else {
                        CommandKind::TurnRight
                    }
                }
                TurtleOp::Push => {
                    stack.push(turtle);
                    turtle.shrink(self.config.width_decay, self.config.step_decay);
                    CommandKind::PushState
                }
                TurtleOp::Pop => {
                    turtle = stack.pop().unwrap_or(initial);
                    CommandKind::PopState
                }
                TurtleOp::Ignore => CommandKind::NoOp,
            };

            trace.commands.push(CommandRecord {
                index,
                symbol,
                kind,
                before,
                after: turtle,
                depth_before,
                depth_after: stack.len(),
            });
        }

        trace
    }
}
