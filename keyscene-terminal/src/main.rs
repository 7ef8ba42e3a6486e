//! keyscene terminal player
//!
//! Plays the built-in models (or an imported scene and clip) in the terminal.
//! Controls are listed on the second line of the screen; Q/ESC quits.

use anyhow::{Context, Result};
use clap::Parser;
use keyscene_core::{
    AnimationClip, Easing, Model, ProjectionKind, SceneGraph, Studio, StudioConfig,
};
use keyscene_terminal::TerminalApp;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "keyscene-terminal", version, about = "Play keyframe scenes in the terminal")]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model shown at start-up (box, plane, hierarchy, person)
    #[arg(short, long)]
    model: Option<String>,

    /// Initial projection
    #[arg(short, long)]
    projection: Option<ProjectionKind>,

    /// Animation frames per second
    #[arg(long)]
    fps: Option<f64>,

    /// Easing between keyframes (linear, sine, quad, cubic, quart, expo, circ)
    #[arg(short, long)]
    ease: Option<Easing>,

    /// Serialized scene tree to load as an extra model
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Animation clip for the scene given with --scene
    #[arg(long, requires = "scene")]
    animation: Option<PathBuf>,

    /// Start playing immediately
    #[arg(long)]
    play: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = cli.log_level() {
        logger.filter_level(level);
    }
    logger.init();

    let studio = build_studio(&cli)?;
    let mut app = TerminalApp::new(studio)?;
    if cli.play {
        app.studio_mut().play();
    }
    app.run()?;

    Ok(())
}

impl Cli {
    /// Level forced by `-v`/`-q`; `None` leaves `RUST_LOG` in charge
    fn log_level(&self) -> Option<log::LevelFilter> {
        match (self.verbose, self.quiet) {
            (0, true) => Some(log::LevelFilter::Error),
            (0, false) => None,
            (1, _) => Some(log::LevelFilter::Info),
            (2, _) => Some(log::LevelFilter::Debug),
            _ => Some(log::LevelFilter::Trace),
        }
    }
}

fn build_studio(cli: &Cli) -> Result<Studio> {
    let mut config = match &cli.config {
        Some(path) => StudioConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StudioConfig::default(),
    };

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(projection) = cli.projection {
        config.camera.projection = projection;
    }
    if let Some(fps) = cli.fps {
        config.fps = fps;
    }
    if let Some(ease) = cli.ease {
        config.ease = ease;
    }

    let mut models = keyscene_core::studio::builtin_models()?;
    if let Some(path) = &cli.scene {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        let scene = SceneGraph::from_json(&json)
            .with_context(|| format!("failed to import scene {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scene".to_string());

        let mut model = Model::new(name.clone(), scene);
        if let Some(path) = &cli.animation {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read animation {}", path.display()))?;
            model = model.with_clip(AnimationClip::from_json(&json)?);
        }
        log::info!("loaded scene {name} from {}", path.display());
        models.push(model);
        if cli.model.is_none() {
            config.model = name;
        }
    }

    Ok(Studio::with_models(config, models)?)
}
