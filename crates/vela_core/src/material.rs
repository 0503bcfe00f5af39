//! Surface materials.
//!
//! A material splits incoming light into three additive fractions (diffuse,
//! specular, transparent) plus an independent emission multiplier. The three
//! fractions never sum to more than one.

use vela_math::Color;

/// An immutable surface description shared by many triangles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Surface tint (linear RGB)
    pub color: Color,

    /// Fraction of light scattered diffusely
    pub diffuse: f32,

    /// Fraction of light mirrored
    pub specular: f32,

    /// Fraction of light transmitted through the surface
    pub transparency: f32,

    /// Emission multiplier; any value above zero turns the surface into an area light
    pub emittance: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self::diffuse(Color::splat(0.5)) // Grey default
    }
}

impl Material {
    /// Create a material from all of its terms.
    ///
    /// Negative terms are clamped to zero. When the reflectance terms sum to
    /// more than one they are rescaled proportionally so the sum is exactly one.
    pub fn new(color: Color, diffuse: f32, specular: f32, transparency: f32, emittance: f32) -> Self {
        let (diffuse, specular, transparency) = normalize_reflectance(diffuse, specular, transparency);
        Self {
            color,
            diffuse,
            specular,
            transparency,
            emittance: emittance.max(0.0),
        }
    }

    /// Pure Lambertian surface.
    pub fn diffuse(color: Color) -> Self {
        Self::new(color, 1.0, 0.0, 0.0, 0.0)
    }

    /// Mirror reflecting the given fraction of light.
    pub fn mirror(specular: f32) -> Self {
        Self::new(Color::ONE, 0.0, specular, 0.0, 0.0)
    }

    /// Clear glass transmitting the given fraction of light.
    pub fn glass(transparency: f32) -> Self {
        Self::new(Color::ONE, 0.0, 0.0, transparency, 0.0)
    }

    /// Diffuse surface that also emits light.
    pub fn emissive(color: Color, emittance: f32) -> Self {
        Self::diffuse(color).with_emittance(emittance)
    }

    /// Replace the diffuse fraction, renormalizing.
    pub fn with_diffuse(self, diffuse: f32) -> Self {
        Self::new(self.color, diffuse, self.specular, self.transparency, self.emittance)
    }

    /// Replace the specular fraction, renormalizing.
    pub fn with_specular(self, specular: f32) -> Self {
        Self::new(self.color, self.diffuse, specular, self.transparency, self.emittance)
    }

    /// Replace the emission multiplier.
    pub fn with_emittance(self, emittance: f32) -> Self {
        Self::new(self.color, self.diffuse, self.specular, self.transparency, emittance)
    }

    /// Check if this material is an area light.
    pub fn is_emissive(&self) -> bool {
        self.emittance > 0.0
    }

    /// Sum of the three reflectance fractions (at most one).
    pub fn reflectance(&self) -> f32 {
        self.diffuse + self.specular + self.transparency
    }
}

fn normalize_reflectance(diffuse: f32, specular: f32, transparency: f32) -> (f32, f32, f32) {
    let diffuse = diffuse.max(0.0);
    let specular = specular.max(0.0);
    let transparency = transparency.max(0.0);

    let sum = diffuse + specular + transparency;
    if sum > 1.0 {
        (diffuse / sum, specular / sum, transparency / sum)
    } else {
        (diffuse, specular, transparency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_unity_is_rescaled() {
        let m = Material::new(Color::ONE, 0.6, 0.6, 0.0, 0.0);

        assert!((m.diffuse - 0.5).abs() < 1e-6);
        assert!((m.specular - 0.5).abs() < 1e-6);
        assert_eq!(m.transparency, 0.0);
        assert!((m.reflectance() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_under_unity_is_untouched() {
        let m = Material::new(Color::ONE, 0.2, 0.3, 0.1, 0.0);

        assert_eq!(m.diffuse, 0.2);
        assert_eq!(m.specular, 0.3);
        assert_eq!(m.transparency, 0.1);
    }

    #[test]
    fn test_rescale_keeps_proportions() {
        let m = Material::new(Color::ONE, 2.0, 1.0, 1.0, 0.0);

        assert!((m.diffuse - 0.5).abs() < 1e-6);
        assert!((m.specular - 0.25).abs() < 1e-6);
        assert!((m.transparency - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_emittance_is_independent() {
        let m = Material::emissive(Color::ONE, 12.0);

        assert_eq!(m.emittance, 12.0);
        assert_eq!(m.diffuse, 1.0);
        assert!(m.is_emissive());
        assert!(!Material::default().is_emissive());
    }

    #[test]
    fn test_negative_terms_clamp_to_zero() {
        let m = Material::new(Color::ONE, -1.0, 0.5, -0.2, -3.0);

        assert_eq!(m.diffuse, 0.0);
        assert_eq!(m.specular, 0.5);
        assert_eq!(m.transparency, 0.0);
        assert_eq!(m.emittance, 0.0);
    }

    #[test]
    fn test_builder_renormalizes() {
        let m = Material::diffuse(Color::ONE).with_specular(1.0);

        assert!((m.diffuse - 0.5).abs() < 1e-6);
        assert!((m.specular - 0.5).abs() < 1e-6);
    }
}
