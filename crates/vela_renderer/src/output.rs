//! Tone mapping and image files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use vela_math::{Color, Interval};

use crate::renderer::ImageBuffer;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image has no pixels")]
    EmptyImage,
}

/// Mapping from linear radiance to 8-bit display values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneMap {
    /// Clamp to [0, 1] and apply `v^(1/gamma)`
    Gamma(f32),
    /// Scale so the brightest channel in the image lands on 255
    NormalizeMax,
    /// Square root of the raw radiance, saturating at 255
    Sqrt,
}

impl Default for ToneMap {
    fn default() -> Self {
        ToneMap::Gamma(2.2)
    }
}

impl ToneMap {
    /// Convert a whole image to packed RGB bytes, top row first.
    pub fn to_rgb8(self, image: &ImageBuffer) -> Vec<u8> {
        let scale = match self {
            ToneMap::NormalizeMax => {
                let max = image.max_component();
                if max > 0.0 {
                    255.99 / max
                } else {
                    0.0
                }
            }
            ToneMap::Gamma(_) | ToneMap::Sqrt => 1.0,
        };

        image
            .pixels
            .iter()
            .flat_map(|&color| self.map_color(color, scale))
            .collect()
    }

    fn map_color(self, color: Color, scale: f32) -> [u8; 3] {
        let channel = |v: f32| match self {
            ToneMap::Gamma(gamma) => (255.0 * Interval::UNIT.clamp(v).powf(1.0 / gamma)) as u8,
            // Float to int casts saturate, so stray negatives land on 0
            ToneMap::NormalizeMax => (v * scale) as u8,
            ToneMap::Sqrt => v.max(0.0).sqrt() as u8,
        };
        [channel(color.x), channel(color.y), channel(color.z)]
    }
}

/// Write an image as binary PPM (P6).
pub fn write_ppm<W: Write>(
    writer: &mut W,
    image: &ImageBuffer,
    tone: ToneMap,
) -> Result<(), OutputError> {
    write!(writer, "P6\n{} {}\n255\n", image.width, image.height)?;
    writer.write_all(&tone.to_rgb8(image))?;
    Ok(())
}

/// Save an image, picking the format from the file extension.
///
/// `.ppm` is written directly; anything else is encoded by the `image` crate.
pub fn save_image(path: &Path, image: &ImageBuffer, tone: ToneMap) -> Result<(), OutputError> {
    if image.pixels.is_empty() {
        return Err(OutputError::EmptyImage);
    }

    let is_ppm = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let mut writer = BufWriter::new(File::create(path)?);
        write_ppm(&mut writer, image, tone)?;
        writer.flush()?;
    } else {
        let rgb = image::RgbImage::from_raw(image.width, image.height, tone.to_rgb8(image))
            .ok_or(OutputError::EmptyImage)?;
        rgb.save(path)?;
    }

    log::info!(
        "Wrote {}x{} image to {}",
        image.width,
        image.height,
        path.display()
    );
    Ok(())
}
