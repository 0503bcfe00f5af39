//! Vela renderer - CPU Monte Carlo ray tracing
//!
//! A recursive ray tracer over flat-shaded triangle scenes: point and area
//! lights, diffuse, mirror and refractive materials, rendered in parallel
//! buckets.

mod bucket;
mod camera;
mod integrator;
mod intersect;
mod output;
mod renderer;
mod sampling;
mod shadow;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, Eye};
pub use integrator::{reflect, refract, Integrator, Transmission};
pub use intersect::{find_closest_hit, intersect, Hit, TriangleHit};
pub use output::{save_image, write_ppm, OutputError, ToneMap};
pub use renderer::{
    render, render_pixel, render_with_progress, ConfigError, ImageBuffer, RenderConfig,
    TotalInternalReflection,
};
pub use sampling::{barycentric_point, cosine_hemisphere, sample_triangle};
pub use shadow::shadow_factor;

/// Re-export common math types from vela_math
pub use vela_math::{Color, Ray, Vec3};
