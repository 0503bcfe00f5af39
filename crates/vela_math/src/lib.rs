// Re-export glam for convenience
pub use glam::*;

// Vela math types
mod interval;
mod onb;
mod ray;

pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;

/// Linear RGB radiance. Channels are unbounded until tone mapping.
pub type Color = Vec3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_color_is_componentwise() {
        let a = Color::new(0.5, 1.0, 2.0);
        let b = Color::new(2.0, 0.5, 0.25);
        assert_eq!(a * b, Color::new(1.0, 0.5, 0.5));
    }
}
