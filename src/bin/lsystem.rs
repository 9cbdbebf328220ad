use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lsystem_turtle::logging::init_logging;
use lsystem_turtle::{LSystemEngine, PlaybackMode, PresetCatalog, SettingsPatch};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Output {
    /// Preset, sentence size and drawing statistics.
    Summary,
    /// The settings snapshot as JSON.
    Settings,
    /// The expanded sentence.
    Sentence,
    /// Segments drawn up to the cursor, as JSON.
    Segments,
    /// Turtle state at the cursor, as JSON.
    Turtle,
}

/// Expand an L-System and inspect the turtle trace it produces.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Preset key to start from (see --list-presets).
    #[arg(short, long)]
    preset: Option<String>,

    /// JSON preset catalog replacing the built-in presets.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// JSON settings snapshot applied after the preset.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Override the iteration count (clamped to 1..=20).
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Seed for weighted rule selection. Unseeded runs differ each time.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of commands to execute; omit to show the whole trace.
    #[arg(short, long)]
    cursor: Option<i64>,

    #[arg(short, long, value_enum, default_value_t = Output::Summary)]
    output: Output,

    /// Print the available preset keys and exit.
    #[arg(long)]
    list_presets: bool,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let catalog = match &cli.catalog {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path.display()))?;
            PresetCatalog::from_json(&text)?
        }
        None => PresetCatalog::builtin(),
    };

    if cli.list_presets {
        for preset in &catalog.presets {
            println!("{:<18} {}", preset.key, preset.label);
        }
        return Ok(());
    }

    let mut builder = LSystemEngine::builder().catalog(catalog);
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    let mut engine = builder.build()?;

    if let Some(key) = &cli.preset {
        engine.apply_preset(key);
    }
    if let Some(path) = &cli.settings {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        engine.apply_settings_json(&text)?;
    }
    if let Some(iterations) = cli.iterations {
        engine.set_settings(&SettingsPatch {
            iterations: Some(f64::from(iterations)),
            ..Default::default()
        });
    }
    engine.regenerate_if_dirty();

    if let Some(cursor) = cli.cursor {
        engine.set_playback_mode(PlaybackMode::Step, true);
        engine.step_playback(cursor);
    }

    match cli.output {
        Output::Summary => {
            let settings = engine.settings();
            let stats = engine.stats();
            let trace = engine.trace();
            println!("preset:      {}", engine.preset_label(&settings.preset_key));
            println!("iterations:  {}", settings.iterations);
            println!("symbols:     {}", stats.symbol_count);
            println!("branches:    {}", stats.branch_count);
            println!("executed:    {} / {}", engine.executed_count(), trace.len());
            if let Some(ms) = stats.expand_time_ms {
                println!("expand time: {ms} ms");
            }
            if let Some(bounds) = trace.bounds {
                let size = bounds.size();
                println!("bounds:      {:.1} x {:.1}", size.x, size.y);
            }
        }
        Output::Settings => {
            println!("{}", serde_json::to_string_pretty(&engine.settings_snapshot())?);
        }
        Output::Sentence => println!("{}", engine.sentence()),
        Output::Segments => {
            println!("{}", serde_json::to_string_pretty(engine.visible_segments())?);
        }
        Output::Turtle => {
            println!("{}", serde_json::to_string_pretty(&engine.turtle_at_cursor())?);
        }
    }

    Ok(())
}
