//! Frame accumulation.
//!
//! Averages jittered samples per pixel into a linear framebuffer, rendering
//! buckets in parallel with rayon.

use std::time::Instant;

use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vela_core::Scene;
use vela_math::Color;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::{Camera, Integrator};

/// How a ray leaving a transparent medium past the critical angle is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalInternalReflection {
    /// Trace the mirrored ray back into the medium
    #[default]
    Retrace,
    /// Drop the refracted term
    Absorb,
}

/// Errors from validating a render configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("samples_per_pixel must be at least 1")]
    NoSamples,

    #[error("gamma must be positive, got {0}")]
    InvalidGamma(f32),

    #[error("refractive indices must be positive, got air={air} glass={glass}")]
    InvalidRefractiveIndex { air: f32, glass: f32 },

    #[error("ray_epsilon must be positive, got {0}")]
    InvalidEpsilon(f32),
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing and variance reduction
    pub samples_per_pixel: u32,
    /// Deepest recursion level still traced
    pub max_depth: u32,
    /// Display gamma used by the output mapper
    pub gamma: f32,
    /// Base seed; each bucket derives its own stream from it
    pub seed: u64,
    /// Edge length of render buckets in pixels
    pub bucket_size: u32,
    /// Extra weight on the diffuse bounce
    pub diffuse_weight: f32,
    /// Offset of secondary ray origins along the normal
    pub ray_epsilon: f32,
    /// Refractive index outside transparent objects
    pub air_index: f32,
    /// Refractive index inside transparent objects
    pub glass_index: f32,
    /// Policy for total internal reflection
    pub total_internal_reflection: TotalInternalReflection,
    /// Paths whose accumulated weight drops below this are cut (0 disables)
    pub importance_cutoff: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            max_depth: 3,
            gamma: 2.2,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
            diffuse_weight: 0.8,
            ray_epsilon: 1e-5,
            air_index: 1.0,
            glass_index: 1.5,
            total_internal_reflection: TotalInternalReflection::Retrace,
            importance_cutoff: 0.0,
        }
    }
}

impl RenderConfig {
    /// Check the settings before a render starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::NoSamples);
        }
        if !(self.gamma > 0.0) {
            return Err(ConfigError::InvalidGamma(self.gamma));
        }
        if !(self.air_index > 0.0 && self.glass_index > 0.0) {
            return Err(ConfigError::InvalidRefractiveIndex {
                air: self.air_index,
                glass: self.glass_index,
            });
        }
        if !(self.ray_epsilon > 0.0) {
            return Err(ConfigError::InvalidEpsilon(self.ray_epsilon));
        }
        Ok(())
    }
}

/// Linear-radiance framebuffer, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.offset(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let offset = self.offset(x, y);
        self.pixels[offset] = color;
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Copy a finished bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Largest channel value in the image (0 for an empty image).
    pub fn max_component(&self) -> f32 {
        self.pixels
            .iter()
            .map(|c| c.max_element())
            .fold(0.0, f32::max)
    }
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    integrator: &Integrator,
    x: u32,
    y: u32,
    samples_per_pixel: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples_per_pixel {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += integrator.radiance(&ray, scene, 0, rng);
    }

    // Average the samples
    pixel_color / samples_per_pixel.max(1) as f32
}

/// Render the entire scene to an image buffer.
///
/// Fails without tracing anything if `config` does not validate.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
) -> Result<ImageBuffer, ConfigError> {
    render_with_progress(camera, scene, config, |_, _| {})
}

/// Render the entire scene, reporting each finished bucket.
///
/// `on_bucket` receives the bucket result and the number of buckets
/// finished so far. It is called from worker threads.
pub fn render_with_progress<F>(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    on_bucket: F,
) -> Result<ImageBuffer, ConfigError>
where
    F: Fn(&BucketResult, usize) + Sync,
{
    config.validate()?;

    if !scene.has_lights() {
        log::warn!("Scene '{}' has no point or area lights", scene.name);
    }
    log::info!(
        "Rendering '{}' ({} triangles, {} materials) at {}x{} @ {} spp, max depth {}",
        scene.name,
        scene.triangle_count(),
        scene.material_count(),
        camera.image_width,
        camera.image_height,
        config.samples_per_pixel,
        config.max_depth
    );

    let start = Instant::now();
    let integrator = Integrator::new(config);
    let buckets = generate_buckets(camera.image_width, camera.image_height, config.bucket_size);
    let total = buckets.len();
    let finished = std::sync::atomic::AtomicUsize::new(0);

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let result = render_bucket(
                bucket,
                camera,
                scene,
                &integrator,
                config.samples_per_pixel,
                config.seed,
            );
            let done = finished.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
            log::debug!("Bucket {} done ({}/{})", bucket.index, done, total);
            on_bucket(&result, done);
            result
        })
        .collect();

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Rendered {} buckets in {:?}", total, start.elapsed());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Bucket;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use vela_core::presets;

    #[test]
    fn test_config_defaults_are_valid() {
        let config = RenderConfig::default();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.diffuse_weight, 0.8);
        assert_eq!(config.ray_epsilon, 1e-5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let bad = |f: fn(&mut RenderConfig)| {
            let mut config = RenderConfig::default();
            f(&mut config);
            config.validate()
        };

        assert_eq!(bad(|c| c.samples_per_pixel = 0), Err(ConfigError::NoSamples));
        assert_eq!(bad(|c| c.gamma = 0.0), Err(ConfigError::InvalidGamma(0.0)));
        assert!(matches!(
            bad(|c| c.glass_index = -1.0),
            Err(ConfigError::InvalidRefractiveIndex { .. })
        ));
        assert!(bad(|c| c.ray_epsilon = f32::NAN).is_err());
    }

    #[test]
    fn test_image_buffer_bucket_write() {
        let mut image = ImageBuffer::new(4, 3);
        let bucket = Bucket::new(2, 1, 2, 2, 0);
        let pixels = (0..4).map(|i| Color::splat(i as f32)).collect();
        image.write_bucket(&BucketResult::new(bucket, pixels));

        assert_eq!(image.get(2, 1), Color::splat(0.0));
        assert_eq!(image.get(3, 1), Color::splat(1.0));
        assert_eq!(image.get(2, 2), Color::splat(2.0));
        assert_eq!(image.get(3, 2), Color::splat(3.0));
        assert_eq!(image.max_component(), 3.0);
    }

    #[test]
    fn test_render_pixel_in_room() {
        let scene = presets::lit_room().unwrap();
        let camera = Camera::room(crate::Eye::Near, 8, 8);
        let integrator = Integrator::new(&RenderConfig::default());
        let mut rng = StdRng::seed_from_u64(42);

        // Lower rows look at the white floor under the light
        let color = render_pixel(&camera, &scene, &integrator, 4, 7, 4, &mut rng);
        assert!(color.length() > 0.0);
    }

    #[test]
    fn test_render_is_deterministic() {
        let scene = presets::lit_room().unwrap();
        let camera = Camera::room(crate::Eye::Far, 12, 10);
        let config = RenderConfig {
            samples_per_pixel: 2,
            max_depth: 1,
            bucket_size: 4,
            seed: 99,
            ..RenderConfig::default()
        };

        let a = render(&camera, &scene, &config).unwrap();
        let b = render(&camera, &scene, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.pixels.len(), 120);
    }

    #[test]
    fn test_progress_sees_every_bucket() {
        let scene = presets::lit_room().unwrap();
        let camera = Camera::room(crate::Eye::Near, 10, 10);
        let config = RenderConfig {
            samples_per_pixel: 1,
            max_depth: 0,
            bucket_size: 5,
            ..RenderConfig::default()
        };
        let calls = std::sync::atomic::AtomicUsize::new(0);

        render_with_progress(&camera, &scene, &config, |_, _| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(calls.into_inner(), 4);
    }

    #[test]
    fn test_invalid_config_renders_nothing() {
        let scene = presets::lit_room().unwrap();
        let camera = Camera::room(crate::Eye::Near, 4, 4);
        let config = RenderConfig {
            glass_index: 0.0,
            ..RenderConfig::default()
        };
        let calls = std::sync::atomic::AtomicUsize::new(0);

        let result = render_with_progress(&camera, &scene, &config, |_, _| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRefractiveIndex { .. })
        ));
        assert_eq!(calls.into_inner(), 0);
    }

    #[test]
    fn test_image_indexing_uses_wide_arithmetic() {
        let image = ImageBuffer {
            width: 70_000,
            height: 70_000,
            pixels: Vec::new(),
        };
        // 69_999 * 70_000 overflows u32
        assert_eq!(image.offset(1, 69_999), 4_899_930_001);
    }
}
