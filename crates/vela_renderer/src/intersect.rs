//! Ray-triangle intersection.
//!
//! Uses the Möller-Trumbore algorithm. There is no acceleration structure:
//! closest-hit queries test every triangle in the scene.

use vela_core::{Scene, TriangleId};
use vela_math::{Interval, Ray, Vec3};

/// Below this fraction of `|E1| |E2|`, the determinant counts as a ray
/// parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Raw result of a single ray-triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter of the hit (distance, since ray directions are unit)
    pub t: f32,
    /// Barycentric weight of the second vertex
    pub u: f32,
    /// Barycentric weight of the third vertex
    pub v: f32,
    /// Interpolated hit position `(1-u-v)V0 + uV1 + vV2`
    pub point: Vec3,
}

/// Möller-Trumbore ray-triangle intersection.
///
/// A hit requires `u >= 0`, `v >= 0`, `u + v <= 1` and `t > 0`.
pub fn intersect(ray: &Ray, [v0, v1, v2]: [Vec3; 3]) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction().cross(edge2);
    let det = edge1.dot(h);

    // Ray is parallel to triangle
    if det.abs() < PARALLEL_EPSILON * (edge1.length() * edge2.length()) {
        return None;
    }

    let f = 1.0 / det;
    let s = ray.origin() - v0;
    let u = f * s.dot(h);
    if u < 0.0 {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction().dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if !Interval::FORWARD.surrounds(t) {
        return None;
    }

    Some(TriangleHit {
        t,
        u,
        v,
        point: (1.0 - u - v) * v0 + u * v1 + v * v2,
    })
}

/// Closest surface hit by a ray.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// Triangle that was hit
    pub triangle: TriangleId,
    /// Point of intersection
    pub point: Vec3,
    /// Euclidean distance from the ray origin
    pub distance: f32,
    /// Face normal as stored on the triangle
    pub geometric_normal: Vec3,
    /// Face normal flipped to point against the ray
    pub normal: Vec3,
    /// Whether the ray hit the side the face normal points to
    pub front_face: bool,
}

impl Hit {
    fn new(ray: &Ray, triangle: TriangleId, hit: TriangleHit, outward_normal: Vec3) -> Self {
        // If the ray and normal point in the same direction, we're on the back side
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            triangle,
            point: hit.point,
            distance: hit.t,
            geometric_normal: outward_normal,
            normal,
            front_face,
        }
    }
}

/// Find the nearest triangle along a ray, if any.
pub fn find_closest_hit(ray: &Ray, scene: &Scene) -> Option<Hit> {
    let mut closest: Option<Hit> = None;

    for (id, triangle) in scene.iter_triangles() {
        let Some(hit) = intersect(ray, scene.positions(triangle)) else {
            continue;
        };
        if closest.map_or(true, |c| hit.t < c.distance) {
            closest = Some(Hit::new(ray, id, hit, triangle.normal()));
        }
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::Material;

    const TRI: [Vec3; 3] = [
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(0.0, 1.0, -1.0),
    ];

    #[test]
    fn test_triangle_hit() {
        // Ray pointing at triangle center
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = intersect(&ray, TRI).unwrap();

        assert!((hit.t - 1.0).abs() < 0.001);
        assert!((hit.point - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_interior_barycentric_points() {
        let origin = Vec3::new(0.3, 0.2, 4.0);
        let weights: [(f32, f32, f32); 4] = [
            (0.2, 0.3, 0.5),
            (0.6, 0.2, 0.2),
            (0.1, 0.1, 0.8),
            (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0),
        ];
        for (a, b, c) in weights {
            let target = a * TRI[0] + b * TRI[1] + c * TRI[2];
            let ray = Ray::towards(origin, target);
            let hit = intersect(&ray, TRI).expect("interior point should be hit");

            assert!((hit.point - target).length() < 1e-4);
            assert!((hit.u - b).abs() < 1e-4);
            assert!((hit.v - c).abs() < 1e-4);
        }
    }

    #[test]
    fn test_outside_points_miss() {
        let origin = Vec3::new(0.0, 0.0, 3.0);
        for target in [
            Vec3::new(2.0, 0.0, -1.0),
            Vec3::new(0.0, 1.5, -1.0),
            Vec3::new(0.0, -1.2, -1.0),
            Vec3::new(-0.9, 0.8, -1.0),
        ] {
            let ray = Ray::towards(origin, target);
            assert!(intersect(&ray, TRI).is_none(), "{target:?} should miss");
        }
    }

    #[test]
    fn test_triangle_behind_ray_misses() {
        // Ray pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(intersect(&ray, TRI).is_none());
    }

    #[test]
    fn test_tiny_triangle_is_hit() {
        let tiny = [Vec3::ZERO, Vec3::new(5e-4, 0.0, 0.0), Vec3::new(0.0, 5e-4, 0.0)];
        let ray = Ray::new(Vec3::new(1.25e-4, 1.25e-4, 1.0), -Vec3::Z);
        let hit = intersect(&ray, tiny).unwrap();

        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!((hit.u - 0.25).abs() < 1e-3);
        assert!((hit.v - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);
        assert!(intersect(&ray, TRI).is_none());
    }

    #[test]
    fn test_origin_on_surface_is_not_a_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(intersect(&ray, TRI).is_none());
    }

    #[test]
    fn test_closest_hit_picks_nearest() {
        let mut scene = Scene::new("layers");
        let m = scene.add_material(Material::default());
        let mut layer = |z: f32| {
            let a = scene.add_vertex(Vec3::new(-1.0, -1.0, z));
            let b = scene.add_vertex(Vec3::new(1.0, -1.0, z));
            let c = scene.add_vertex(Vec3::new(0.0, 1.0, z));
            scene.add_triangle(a, b, c, m).unwrap()
        };
        let _far = layer(-5.0);
        let near = layer(-2.0);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = find_closest_hit(&ray, &scene).unwrap();

        assert_eq!(hit.triangle, near);
        assert!((hit.distance - 2.0).abs() < 1e-5);
        // Counter-clockwise triangles face +Z, so this ray sees the front
        assert!(hit.front_face);
        assert_eq!(hit.normal, Vec3::Z);
    }

    #[test]
    fn test_back_face_normal_flips() {
        let mut scene = Scene::new("back");
        let m = scene.add_material(Material::default());
        let a = scene.add_vertex(TRI[0]);
        let b = scene.add_vertex(TRI[1]);
        let c = scene.add_vertex(TRI[2]);
        scene.add_triangle(a, b, c, m).unwrap();

        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let hit = find_closest_hit(&ray, &scene).unwrap();

        assert!(!hit.front_face);
        assert_eq!(hit.geometric_normal, Vec3::Z);
        assert_eq!(hit.normal, -Vec3::Z);
    }

    #[test]
    fn test_empty_scene_has_no_hit() {
        let scene = Scene::new("empty");
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(find_closest_hit(&ray, &scene).is_none());
    }
}
