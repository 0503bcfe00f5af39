//! Random sampling helpers.
//!
//! Every function takes its random source explicitly so renders can be
//! seeded per bucket and replayed exactly.

use rand::{Rng, RngCore};
use std::f32::consts::TAU;
use vela_math::{Onb, Vec3};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Sample a random point in the unit square [-0.5, 0.5] x [-0.5, 0.5].
pub fn sample_square(rng: &mut dyn RngCore) -> (f32, f32) {
    (gen_f32(rng) - 0.5, gen_f32(rng) - 0.5)
}

/// Cosine-weighted direction on the hemisphere around `normal`.
///
/// `r1` is an angle in [0, 2π) and `r2` a radius term in [0, 1).
pub fn cosine_hemisphere(normal: Vec3, r1: f32, r2: f32) -> Vec3 {
    let onb = Onb::from_normal(normal);
    let r2s = r2.sqrt();
    onb.local(r1.cos() * r2s, r1.sin() * r2s, (1.0 - r2).sqrt())
}

/// Draw a cosine-weighted hemisphere direction.
pub fn random_cosine_direction(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let r1 = TAU * gen_f32(rng);
    let r2 = gen_f32(rng);
    cosine_hemisphere(normal, r1, r2)
}

/// Point on a triangle from three barycentric weights normalized to sum 1.
pub fn barycentric_point([a, b, c]: [Vec3; 3], weights: [f32; 3]) -> Vec3 {
    let sum = weights[0] + weights[1] + weights[2];
    if sum <= 0.0 {
        return (a + b + c) / 3.0;
    }
    (weights[0] * a + weights[1] * b + weights[2] * c) / sum
}

/// Random point on a triangle from three independent uniforms.
pub fn sample_triangle(corners: [Vec3; 3], rng: &mut dyn RngCore) -> Vec3 {
    let weights = [gen_f32(rng), gen_f32(rng), gen_f32(rng)];
    barycentric_point(corners, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cosine_hemisphere_pole() {
        let n = Vec3::new(0.0, 1.0, 0.0);
        let d = cosine_hemisphere(n, 1.3, 0.0);
        assert!((d - n).length() < 1e-6);
    }

    #[test]
    fn test_cosine_hemisphere_stays_above_surface() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = Vec3::new(0.2, -0.7, 0.4).normalize();

        for _ in 0..1000 {
            let d = random_cosine_direction(n, &mut rng);
            assert!((d.length() - 1.0).abs() < 1e-4);
            assert!(d.dot(n) >= 0.0);
        }
    }

    #[test]
    fn test_triangle_samples_are_inside() {
        let mut rng = StdRng::seed_from_u64(11);
        let corners = [Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)];

        for _ in 0..500 {
            let p = sample_triangle(corners, &mut rng);
            assert!(p.z.abs() < 1e-6);
            assert!(p.x >= -1e-5 && p.y >= -1e-5);
            assert!(p.x / 4.0 + p.y / 2.0 <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_barycentric_zero_weights_fall_back_to_centroid() {
        let corners = [Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0)];
        let p = barycentric_point(corners, [0.0, 0.0, 0.0]);
        assert!((p - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_sample_square_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let (x, y) = sample_square(&mut rng);
            assert!((-0.5..0.5).contains(&x));
            assert!((-0.5..0.5).contains(&y));
        }
    }
}
