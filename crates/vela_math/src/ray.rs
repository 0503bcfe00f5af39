use crate::Vec3;

/// A ray in 3D space with an origin and a unit direction.
///
/// Rays are cheap value types: one is created per camera sample, shadow
/// query and bounce, and never shared.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Create a ray starting at `origin` and pointing at `target`.
    pub fn towards(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, target - origin)
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the unit direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0));

        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert!((ray.direction - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_towards() {
        let ray = Ray::towards(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, 6.0));

        assert_eq!(ray.origin(), Vec3::new(1.0, 1.0, 1.0));
        assert!((ray.direction() - Vec3::Z).length() < 1e-6);
    }
}
