//! Visibility between a surface point and a light sample.

use vela_core::{Scene, TriangleId};
use vela_math::Ray;

use crate::intersect::intersect;

/// Fraction of light that reaches the end of a shadow ray.
///
/// Every triangle crossing the ray closer than `max_distance` multiplies the
/// result by its material's transparency. `exclude` skips one triangle, so an
/// area light never shadows its own samples. Returns 0 for full shadow and
/// 1 for an unobstructed path.
pub fn shadow_factor(
    ray: &Ray,
    scene: &Scene,
    max_distance: f32,
    exclude: Option<TriangleId>,
) -> f32 {
    let mut factor = 1.0;

    for (id, triangle) in scene.iter_triangles() {
        if exclude == Some(id) {
            continue;
        }
        let Some(hit) = intersect(ray, scene.positions(triangle)) else {
            continue;
        };
        if hit.t >= max_distance {
            continue;
        }

        factor *= scene.material_of(triangle).transparency;
        if factor <= 0.0 {
            return 0.0;
        }
    }

    factor
}
