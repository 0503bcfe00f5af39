//! Vela - render the hexagonal room from the command line.

mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vela_core::presets::Preset;
use vela_renderer::{generate_buckets, render_with_progress, save_image, Camera, Eye};

use settings::{Settings, ToneKind};

/// CPU ray tracer for triangle scenes
#[derive(Parser, Debug)]
#[command(
    name = "vela",
    version,
    about = "Render the hexagonal room with a recursive CPU ray tracer",
    after_help = "EXAMPLES:\n  \
                  vela --preset showcase --spp 64 --output room.png\n  \
                  vela --config settings.json --eye far\n  \
                  RUST_LOG=debug vela --preset room --tone max\n  \
                  vela --preset room --tone sqrt --output room.ppm"
)]
struct Cli {
    /// JSON settings file. Flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image width in pixels
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Samples per pixel
    #[arg(long)]
    spp: Option<u32>,

    /// Deepest recursion level traced
    #[arg(long)]
    depth: Option<u32>,

    /// Display gamma
    #[arg(long)]
    gamma: Option<f32>,

    /// Base random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Viewpoint: near or far
    #[arg(long)]
    eye: Option<Eye>,

    /// Scene preset: room or showcase
    #[arg(short, long)]
    preset: Option<Preset>,

    /// Tone mapping for the output image
    #[arg(long, value_enum)]
    tone: Option<ToneKind>,

    /// Output image (.ppm, or any format the image crate can encode)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_settings: bool,
}

impl Cli {
    /// Override loaded settings with any flags given on the command line.
    fn apply(&self, settings: &mut Settings) {
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(spp) = self.spp {
            settings.render.samples_per_pixel = spp;
        }
        if let Some(depth) = self.depth {
            settings.render.max_depth = depth;
        }
        if let Some(gamma) = self.gamma {
            settings.render.gamma = gamma;
        }
        if let Some(seed) = self.seed {
            settings.render.seed = seed;
        }
        if let Some(eye) = self.eye {
            settings.eye = eye;
        }
        if let Some(preset) = self.preset {
            settings.preset = preset;
        }
        if let Some(tone) = self.tone {
            settings.tone_map = tone;
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    cli.apply(&mut settings);
    settings.validate()?;

    if cli.print_settings {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    log::info!(
        "Starting Vela: preset '{}' from the {} eye",
        settings.preset,
        settings.eye
    );

    let scene = settings
        .preset
        .build()
        .with_context(|| format!("failed to build preset '{}'", settings.preset))?;
    let camera = Camera::room(settings.eye, settings.width, settings.height);

    let total = generate_buckets(settings.width, settings.height, settings.render.bucket_size).len();
    let step = (total / 10).max(1);
    let image = render_with_progress(&camera, &scene, &settings.render, |_, done| {
        if done % step == 0 || done == total {
            log::info!(
                "Progress: {}/{} buckets ({:.0}%)",
                done,
                total,
                100.0 * done as f32 / total as f32
            );
        }
    })
    .context("invalid render settings")?;

    save_image(&settings.output, &image, settings.tone_map())
        .with_context(|| format!("failed to write {}", settings.output.display()))?;

    Ok(())
}
