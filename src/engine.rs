//! The engine instance that owns settings, the expanded sentence and its trace.
//!
//! Mutations ([`LSystemEngine::set_settings`], [`LSystemEngine::set_rule`], ...)
//! only record what they invalidated. [`LSystemEngine::regenerate`] (or
//! [`LSystemEngine::regenerate_if_dirty`]) rebuilds the sentence and trace,
//! publishes them as one [`RenderSnapshot`] and resets the playback cursor in
//! the same step.

use crate::error::EngineError;
use crate::grammar::{ExpansionStats, expand};
use crate::interpreter::TurtleInterpreter;
use crate::playback::{PlaybackController, PlaybackMode, PlaybackSnapshot};
use crate::presets::PresetCatalog;
use crate::rules::{RawRule, RuleSet, normalize_rule_definition, parse_rule_input, symbol_key};
use crate::settings::{CUSTOM_PRESET_KEY, GrammarSettings, SettingsChange, SettingsPatch};
use crate::style::{StrokeStyle, stroke_style};
use crate::trace::{CursorState, DrawSegment, ExecutionTrace};
use crate::turtle::TurtleState;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A sentence and the trace computed from it, replaced as a unit.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSnapshot {
    /// Increases by one on every rebuild.
    pub version: u64,
    pub sentence: String,
    pub trace: ExecutionTrace,
}

/// Notifications delivered to observers after a mutation completed.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Regenerated {
        version: u64,
        stats: ExpansionStats,
        settings: GrammarSettings,
    },
    PresetChanged {
        key: String,
        settings: GrammarSettings,
    },
}

type Observer = Box<dyn FnMut(&EngineEvent) + Send>;

/// Builds an [`LSystemEngine`].
#[derive(Default)]
pub struct EngineBuilder {
    catalog: Option<PresetCatalog>,
    rng: Option<Box<dyn RngCore + Send>>,
    draw_aliases: Option<Vec<char>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(mut self, catalog: PresetCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Uses a seeded generator so weighted rules expand reproducibly.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Some(Box::new(SmallRng::seed_from_u64(seed)));
        self
    }

    /// Injects the random source used for weighted rule selection.
    pub fn rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn draw_aliases(mut self, aliases: impl IntoIterator<Item = char>) -> Self {
        self.draw_aliases = Some(aliases.into_iter().collect());
        self
    }

    /// Applies the catalog's default preset and performs the first regeneration.
    ///
    /// Without a seed or injected generator the engine draws from entropy, so
    /// weighted grammars differ between runs.
    pub fn build(self) -> Result<LSystemEngine, EngineError> {
        let catalog = self.catalog.ok_or(EngineError::MissingCatalog)?;
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(SmallRng::from_entropy()));
        Ok(LSystemEngine::assemble(catalog, rng, self.draw_aliases))
    }
}

pub struct LSystemEngine {
    catalog: PresetCatalog,
    settings: GrammarSettings,
    interpreter: TurtleInterpreter,
    rng: Box<dyn RngCore + Send>,
    stats: ExpansionStats,
    snapshot: Arc<RenderSnapshot>,
    playback: PlaybackController,
    pending: SettingsChange,
    observers: Vec<Observer>,
}

impl LSystemEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    fn assemble(
        catalog: PresetCatalog,
        rng: Box<dyn RngCore + Send>,
        draw_aliases: Option<Vec<char>>,
    ) -> Self {
        let settings = catalog.resolve(&catalog.default_key);
        let config = settings.turtle_config();

        let mut interpreter = TurtleInterpreter::standard(config.clone());
        if let Some(aliases) = draw_aliases {
            interpreter.set_draw_aliases(aliases);
        }

        let mut engine = Self {
            interpreter,
            rng,
            stats: ExpansionStats::default(),
            snapshot: Arc::new(RenderSnapshot {
                version: 0,
                sentence: String::new(),
                trace: ExecutionTrace::empty(TurtleState::initial(&config)),
            }),
            playback: PlaybackController::new(),
            pending: SettingsChange::ALL,
            observers: Vec::new(),
            catalog,
            settings,
        };
        engine.regenerate();
        engine
    }

    /// Registers a callback invoked after regenerations and preset changes.
    pub fn subscribe(&mut self, observer: impl FnMut(&EngineEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: EngineEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    // --- Regeneration ---

    /// Re-expands the sentence, rebuilds the trace and resets playback.
    pub fn regenerate(&mut self) -> Arc<RenderSnapshot> {
        let start = Instant::now();
        let sentence = expand(
            &self.settings.axiom,
            &self.settings.rules,
            self.settings.iterations,
            &mut self.rng,
        );
        let elapsed = start.elapsed();

        self.stats.symbol_count = sentence.chars().count();
        self.stats.expand_time_ms = Some((elapsed.as_secs_f64() * 1000.0).round() as u64);
        tracing::debug!(
            preset = %self.settings.preset_key,
            iterations = self.settings.iterations,
            symbols = self.stats.symbol_count,
            elapsed_ms = self.stats.expand_time_ms,
            "expanded sentence"
        );

        self.publish(sentence);
        self.emit_regenerated();
        Arc::clone(&self.snapshot)
    }

    /// Rebuilds only what pending mutations invalidated.
    ///
    /// Grammar changes re-expand, turtle-only changes re-interpret the existing
    /// sentence. Returns whether anything was rebuilt.
    pub fn regenerate_if_dirty(&mut self) -> bool {
        if self.pending.grammar {
            self.regenerate();
            true
        } else if self.pending.turtle {
            let sentence = self.snapshot.sentence.clone();
            self.publish(sentence);
            self.emit_regenerated();
            true
        } else {
            self.pending = SettingsChange::default();
            false
        }
    }

    fn emit_regenerated(&mut self) {
        self.emit(EngineEvent::Regenerated {
            version: self.snapshot.version,
            stats: self.stats,
            settings: self.settings.clone(),
        });
    }

    fn publish(&mut self, sentence: String) {
        self.interpreter.set_config(self.settings.turtle_config());
        let trace = self.interpreter.interpret(&sentence);
        self.stats.branch_count = trace.branch_count;
        self.playback.reset_for(trace.len());
        self.snapshot = Arc::new(RenderSnapshot {
            version: self.snapshot.version + 1,
            sentence,
            trace,
        });
        self.pending = SettingsChange::default();
    }

    // --- Settings mutation ---

    /// Replaces all settings with the named preset over the base template, then regenerates.
    ///
    /// Unknown keys apply the bare base template as custom settings.
    pub fn apply_preset(&mut self, key: &str) {
        if self.catalog.get(key).is_none() {
            tracing::warn!(key, "unknown preset, falling back to base template");
        }
        self.settings = self.catalog.resolve(key);
        self.pending = SettingsChange::ALL;
        self.regenerate();
        self.emit(EngineEvent::PresetChanged {
            key: self.settings.preset_key.clone(),
            settings: self.settings.clone(),
        });
    }

    /// Applies a partial update, clamping out-of-range values. Marks settings as custom.
    pub fn set_settings(&mut self, patch: &SettingsPatch) -> SettingsChange {
        let change = self.settings.apply_patch(patch);
        self.settings.preset_key = CUSTOM_PRESET_KEY.to_owned();
        self.pending = self.pending.merge(change);
        change
    }

    /// Sets the rule of the first character of `symbol`. Blank symbols are ignored.
    pub fn set_rule(&mut self, symbol: &str, raw: &RawRule) {
        let Some(key) = symbol_key(symbol) else {
            return;
        };
        self.settings.rules.insert(key, normalize_rule_definition(raw));
        self.settings.preset_key = CUSTOM_PRESET_KEY.to_owned();
        self.pending.grammar = true;
    }

    /// Like [`set_rule`](Self::set_rule) for the `value | weight ; ...` text form.
    pub fn set_rule_text(&mut self, symbol: &str, text: &str) {
        let rule = parse_rule_input(text);
        self.set_rule(symbol, &RawRule::from(&rule));
    }

    pub fn set_rules(&mut self, rules: RuleSet) {
        self.settings.rules = rules;
        self.settings.preset_key = CUSTOM_PRESET_KEY.to_owned();
        self.pending.grammar = true;
    }

    /// Bulk-applies a snapshot produced by [`settings_snapshot`](Self::settings_snapshot)
    /// and regenerates. The snapshot's preset identity is kept.
    pub fn apply_settings_snapshot(&mut self, snapshot: &GrammarSettings) {
        self.apply_patch_snapshot(&SettingsPatch::from(snapshot));
    }

    /// Parses and applies a (possibly partial) JSON settings snapshot.
    pub fn apply_settings_json(&mut self, text: &str) -> Result<(), EngineError> {
        let patch: SettingsPatch = serde_json::from_str(text).map_err(EngineError::Snapshot)?;
        self.apply_patch_snapshot(&patch);
        Ok(())
    }

    fn apply_patch_snapshot(&mut self, patch: &SettingsPatch) {
        self.settings.apply_patch(patch);
        self.settings.preset_key = patch
            .preset_key
            .clone()
            .unwrap_or_else(|| CUSTOM_PRESET_KEY.to_owned());
        self.pending = SettingsChange::ALL;
        self.regenerate();
    }

    // --- Introspection ---

    pub fn sentence(&self) -> &str {
        &self.snapshot.sentence
    }

    pub fn stats(&self) -> ExpansionStats {
        self.stats
    }

    pub fn settings(&self) -> &GrammarSettings {
        &self.settings
    }

    /// Deep copy of the current settings.
    pub fn settings_snapshot(&self) -> GrammarSettings {
        self.settings.clone()
    }

    /// The current sentence/trace pair. Safe to hand to another thread.
    pub fn render_snapshot(&self) -> Arc<RenderSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn trace(&self) -> &ExecutionTrace {
        &self.snapshot.trace
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    pub fn preset_label(&self, key: &str) -> &str {
        self.catalog.label(key)
    }

    // --- Playback ---

    pub fn playback_state(&self) -> PlaybackSnapshot {
        self.playback.snapshot()
    }

    pub fn set_playback_mode(&mut self, mode: PlaybackMode, reset: bool) {
        self.playback.set_mode(mode, reset);
    }

    pub fn toggle_step_mode(&mut self) {
        self.playback.toggle_step_mode();
    }

    pub fn start_playback(&mut self, restart: bool) {
        self.playback.start(restart);
    }

    pub fn pause_playback(&mut self) {
        self.playback.pause();
    }

    pub fn toggle_playback(&mut self) {
        self.playback.toggle();
    }

    pub fn step_playback(&mut self, delta: i64) {
        self.playback.step(delta);
    }

    pub fn reset_step_playback(&mut self) {
        self.playback.reset_step();
    }

    pub fn set_playback_speed(&mut self, speed: f64) {
        self.playback.set_speed(speed);
    }

    /// Called once per rendering tick with the time since the previous tick.
    pub fn advance_playback(&mut self, elapsed: Duration) {
        self.playback.advance(elapsed);
    }

    pub fn executed_count(&self) -> usize {
        self.playback.executed_count()
    }

    /// Turtle at the playback cursor, for drawing an indicator.
    pub fn turtle_at_cursor(&self) -> CursorState {
        self.snapshot.trace.state_at(self.executed_count())
    }

    /// Segments to draw at the current cursor.
    pub fn visible_segments(&self) -> &[DrawSegment] {
        self.snapshot.trace.segments_before(self.executed_count())
    }

    pub fn highlighted_segment(&self) -> Option<&DrawSegment> {
        self.playback.highlight_index()?;
        self.snapshot.trace.highlight_segment(self.executed_count())
    }

    pub fn stroke_for(&self, segment: &DrawSegment, highlight: bool) -> StrokeStyle {
        stroke_style(&self.settings, segment, highlight)
    }
}
