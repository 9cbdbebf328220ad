//! # lsystem-turtle
//!
//! Stochastic L-System expansion paired with a 2D turtle interpreter whose
//! output can be scrubbed at any position.
//!
//! The [`grammar`] module rewrites an axiom with fixed or weighted production
//! rules. The [`interpreter`] walks the resulting sentence once and materializes
//! an [`ExecutionTrace`]: the turtle before and after every symbol plus the list
//! of draw segments. Renderers then read any prefix of that trace through a
//! [`PlaybackController`] cursor without re-running anything.
//!
//! [`LSystemEngine`] owns the settings, presets, random source and the current
//! trace snapshot, and is what GUIs and renderers talk to.

pub mod engine;
pub mod error;
pub mod grammar;
pub mod interpreter;
pub mod logging;
pub mod playback;
pub mod presets;
pub mod rules;
pub mod settings;
pub mod style;
pub mod trace;
pub mod turtle;

pub use engine::*;
pub use error::*;
pub use grammar::*;
pub use interpreter::*;
pub use playback::*;
pub use presets::*;
pub use rules::*;
pub use settings::*;
pub use style::*;
pub use trace::*;
pub use turtle::*;
