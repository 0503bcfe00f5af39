//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon.

use rand::rngs::StdRng;
use rand::SeedableRng;
use vela_core::Scene;
use vela_math::Color;

use crate::renderer::render_pixel;
use crate::{Camera, Integrator};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Seed for this bucket's random stream.
    ///
    /// Derived from the bucket's position rather than its render order, so
    /// a seeded render is identical however the buckets are scheduled.
    pub fn seed(&self, base: u64) -> u64 {
        let position = ((self.y as u64) << 32) | self.x as u64;
        base ^ position.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    // Generate grid of buckets
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    // Sort by distance from center (spiral order)
    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let bx = b.x as f32 + b.width as f32 / 2.0;
        let by = b.y as f32 + b.height as f32 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    buckets.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render a single bucket with its own seeded random stream.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    scene: &Scene,
    integrator: &Integrator,
    samples_per_pixel: u32,
    seed: u64,
) -> BucketResult {
    let mut rng = StdRng::seed_from_u64(bucket.seed(seed));
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            let color = render_pixel(
                camera,
                scene,
                integrator,
                global_x,
                global_y,
                samples_per_pixel,
                &mut rng,
            );
            pixels.push(color);
        }
    }

    BucketResult::new(*bucket, pixels)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}
