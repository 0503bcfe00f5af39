//! Render settings loaded from JSON and overridden from the command line.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use vela_core::presets::Preset;
use vela_renderer::{Eye, RenderConfig, ToneMap};

/// Which tone mapper writes the final image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ToneKind {
    /// Clamp and gamma-correct with the configured gamma
    #[default]
    Gamma,
    /// Scale the brightest channel to full white
    Max,
    /// Square root of raw radiance, saturating at full white
    Sqrt,
}

/// Everything needed for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub eye: Eye,
    pub preset: Preset,
    pub output: PathBuf,
    pub tone_map: ToneKind,
    #[serde(flatten)]
    pub render: RenderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            eye: Eye::default(),
            preset: Preset::default(),
            output: PathBuf::from("render.ppm"),
            tone_map: ToneKind::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("image size must be non-zero, got {}x{}", self.width, self.height);
        }
        self.render.validate().context("invalid render settings")?;
        Ok(())
    }

    pub fn tone_map(&self) -> ToneMap {
        match self.tone_map {
            ToneKind::Gamma => ToneMap::Gamma(self.render.gamma),
            ToneKind::Max => ToneMap::NormalizeMax,
            ToneKind::Sqrt => ToneMap::Sqrt,
        }
    }
}
