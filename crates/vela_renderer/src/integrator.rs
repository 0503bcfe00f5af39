//! Recursive radiance estimator.
//!
//! Every hit accumulates, in order:
//! - self-emission,
//! - direct light from point lights and sampled area lights,
//! - a cosine-weighted diffuse bounce,
//! - a mirror bounce,
//! - a refracted bounce.
//!
//! The result is a mixture weighted by the material fractions. Recursion ends
//! once the depth exceeds `max_depth`.

use rand::RngCore;
use vela_core::Scene;
use vela_math::{Color, Ray, Vec3};

use crate::intersect::{find_closest_hit, Hit};
use crate::renderer::{RenderConfig, TotalInternalReflection};
use crate::sampling::{random_cosine_direction, sample_triangle};
use crate::shadow::shadow_factor;

/// Angular slack around the critical angle treated as grazing exit.
const GRAZING_TOLERANCE: f32 = 1e-6;

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface whose normal faces against it.
///
/// `eta` is the ratio of refractive indices (incident over transmitted).
/// Returns `None` when no transmitted direction exists.
#[inline]
pub fn refract(incident: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = n.dot(incident);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some(eta * incident - n * (eta * cos_i + k.sqrt()))
}

/// What happens to light crossing a transparent surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transmission {
    /// Light continues along `direction`; `normal` faces against it.
    Refract { direction: Vec3, normal: Vec3 },
    /// Exiting past the critical angle; `normal` faces back into the medium.
    TotalInternalReflection { normal: Vec3 },
    /// Exiting exactly at the critical angle; nothing is transmitted.
    Grazing,
}

/// Depth-bounded Monte Carlo radiance estimator.
#[derive(Debug, Clone)]
pub struct Integrator {
    max_depth: u32,
    diffuse_weight: f32,
    epsilon: f32,
    importance_cutoff: f32,
    tir: TotalInternalReflection,
    /// Refraction ratio entering the medium (air over glass)
    eta_in: f32,
    /// Refraction ratio leaving the medium (glass over air)
    eta_out: f32,
    critical_angle: f32,
}

impl Integrator {
    /// Create an integrator from render settings.
    pub fn new(config: &RenderConfig) -> Self {
        let eta_in = config.air_index / config.glass_index;
        Self {
            max_depth: config.max_depth,
            diffuse_weight: config.diffuse_weight,
            epsilon: config.ray_epsilon,
            importance_cutoff: config.importance_cutoff,
            tir: config.total_internal_reflection,
            eta_in,
            eta_out: config.glass_index / config.air_index,
            critical_angle: eta_in.clamp(-1.0, 1.0).asin(),
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Critical angle (radians) for leaving the transparent medium.
    pub fn critical_angle(&self) -> f32 {
        self.critical_angle
    }

    /// Radiance arriving along `ray` at recursion level `depth`.
    ///
    /// Returns exactly zero once `depth > max_depth`, and black when the ray
    /// leaves the scene.
    pub fn radiance(&self, ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
        self.trace(ray, scene, depth, 1.0, rng)
    }

    fn trace(
        &self,
        ray: &Ray,
        scene: &Scene,
        depth: u32,
        importance: f32,
        rng: &mut dyn RngCore,
    ) -> Color {
        if depth > self.max_depth || importance < self.importance_cutoff {
            return Color::ZERO;
        }

        let Some(hit) = find_closest_hit(ray, scene) else {
            return Color::ZERO;
        };
        let triangle = scene.triangle(hit.triangle);
        let material = scene.material_of(triangle);

        let mut color = Color::ZERO;

        if material.is_emissive() {
            color += (1.0 + material.emittance) * material.color;
        }

        color += self.direct_light(scene, &hit, rng) * material.color;

        if material.diffuse > 0.0 {
            let scale = self.diffuse_weight * material.diffuse * material.color;
            let origin = hit.point + self.epsilon * hit.normal;
            let bounce = Ray::new(origin, random_cosine_direction(hit.normal, rng));
            color += scale
                * self.trace(&bounce, scene, depth + 1, importance * scale.max_element(), rng);
        }

        if material.specular > 0.0 {
            let origin = hit.point + self.epsilon * hit.normal;
            let bounce = Ray::new(origin, reflect(ray.direction(), hit.normal));
            color += material.specular
                * self.trace(&bounce, scene, depth + 1, importance * material.specular, rng);
        }

        if material.transparency > 0.0 {
            color += material.transparency
                * self.refraction(ray, &hit, scene, depth, importance * material.transparency, rng);
        }

        color
    }

    /// Direct light reaching a hit point, before the surface tint.
    ///
    /// Point lights contribute `intensity * color * cos * shadow`. Each area
    /// light contributes one uniform sample `emittance * color * cos * shadow`.
    pub fn direct_light(&self, scene: &Scene, hit: &Hit, rng: &mut dyn RngCore) -> Color {
        let n = hit.normal;
        let origin = hit.point + self.epsilon * n;
        let mut light = Color::ZERO;

        for point_light in scene.point_lights() {
            let to_light = point_light.position - origin;
            let distance = to_light.length();
            if distance <= 0.0 {
                continue;
            }
            let direction = to_light / distance;
            let cos = n.dot(direction);
            if cos <= 0.0 {
                continue;
            }

            let shadow = shadow_factor(&Ray::new(origin, direction), scene, distance, None);
            light += point_light.intensity * point_light.color * cos * shadow;
        }

        for &emitter_id in scene.emissive_triangles() {
            if emitter_id == hit.triangle {
                continue;
            }
            let emitter = scene.triangle(emitter_id);
            let sample = sample_triangle(scene.positions(emitter), rng);

            let to_light = sample - origin;
            let distance = to_light.length();
            if distance <= 0.0 {
                continue;
            }
            let direction = to_light / distance;
            let cos = n.dot(direction);
            if cos <= 0.0 {
                continue;
            }

            let shadow = shadow_factor(&Ray::new(origin, direction), scene, distance, Some(emitter_id));
            let emissive = scene.material_of(emitter);
            light += emissive.emittance * emissive.color * cos * shadow;
        }

        light
    }

    /// Decide how light with unit direction `incident` crosses a surface.
    ///
    /// `geometric_normal` is the triangle's stored normal, which points out
    /// of the medium.
    pub fn transmit(&self, incident: Vec3, geometric_normal: Vec3) -> Transmission {
        let cos_i = geometric_normal.dot(incident);

        if cos_i < 0.0 {
            // Entering the medium
            return match refract(incident, geometric_normal, self.eta_in) {
                Some(direction) => Transmission::Refract {
                    direction,
                    normal: geometric_normal,
                },
                None => Transmission::Grazing,
            };
        }

        // Leaving the medium: flip the normal to face the incoming light
        let normal = -geometric_normal;
        let alpha = cos_i.min(1.0).acos();
        if alpha > self.critical_angle + GRAZING_TOLERANCE {
            return Transmission::TotalInternalReflection { normal };
        }
        if alpha >= self.critical_angle - GRAZING_TOLERANCE {
            return Transmission::Grazing;
        }

        match refract(incident, normal, self.eta_out) {
            Some(direction) => Transmission::Refract { direction, normal },
            None => Transmission::TotalInternalReflection { normal },
        }
    }

    /// Refracted (or internally reflected) radiance at a hit, before the
    /// transparency weight.
    fn refraction(
        &self,
        ray: &Ray,
        hit: &Hit,
        scene: &Scene,
        depth: u32,
        importance: f32,
        rng: &mut dyn RngCore,
    ) -> Color {
        match self.transmit(ray.direction(), hit.geometric_normal) {
            Transmission::Refract { direction, normal } => {
                let origin = hit.point - self.epsilon * normal;
                self.trace(&Ray::new(origin, direction), scene, depth + 1, importance, rng)
            }
            Transmission::TotalInternalReflection { normal } => match self.tir {
                TotalInternalReflection::Retrace => {
                    let origin = hit.point + self.epsilon * normal;
                    let mirrored = Ray::new(origin, reflect(ray.direction(), normal));
                    self.trace(&mirrored, scene, depth + 1, importance, rng)
                }
                TotalInternalReflection::Absorb => Color::ZERO,
            },
            Transmission::Grazing => Color::ZERO,
        }
    }
}
