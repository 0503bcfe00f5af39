//! Orthonormal basis around a surface normal.

use crate::Vec3;

/// Right-handed orthonormal frame `(u, v, w)` with `w` along a given normal.
#[derive(Debug, Clone, Copy)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    /// Build a frame around `normal` (assumed unit length).
    ///
    /// The helper axis is world Y when the normal has a noticeable X
    /// component and world X otherwise, so it is never parallel to `w`.
    pub fn from_normal(normal: Vec3) -> Self {
        let w = normal;
        let helper = if w.x.abs() > 0.1 { Vec3::Y } else { Vec3::X };
        let u = helper.cross(w).normalize();
        let v = w.cross(u);
        Self { u, v, w }
    }

    /// Express local coordinates `(a, b, c)` in world space.
    #[inline]
    pub fn local(&self, a: f32, b: f32, c: f32) -> Vec3 {
        a * self.u + b * self.v + c * self.w
    }
}
