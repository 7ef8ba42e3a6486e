//! Plays the walk cycle without a terminal and prints every committed frame
//!
//! Usage: cargo run --example headless_playback -- [model] [projection]

use anyhow::Result;
use keyscene_core::{ProjectionKind, Studio, StudioConfig};
use keyscene_terminal::AsciiRenderer;
use std::env;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let config = StudioConfig {
        model: args.next().unwrap_or_else(|| "person".to_string()),
        fps: 4.0,
        ..StudioConfig::default()
    };
    let projection: ProjectionKind = match args.next() {
        Some(name) => name.parse()?,
        None => ProjectionKind::Oblique,
    };

    let mut studio = Studio::new(config)?;
    studio.set_projection(projection);
    studio.rig_mut().resize(1200.0, 600.0)?;
    studio.rig_mut().orbit(-20.0, 15.0)?;
    studio.play();

    let mut renderer = AsciiRenderer::new(72, 30);
    let length = studio.engine().length().max(1);
    for _ in 0..length {
        renderer.clear();
        renderer.render_frame(&studio.frame()?);
        println!("{} | {}", studio.model_name(), studio.status());
        println!("{}\n", renderer.to_text());

        // A quarter second at 4 fps commits exactly one frame
        studio.update(0.25);
    }

    Ok(())
}
