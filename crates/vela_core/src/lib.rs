//! Vela Core - scene model for the Vela ray tracer.
//!
//! This crate provides:
//!
//! - **Materials**: energy-normalized diffuse / specular / transparent mixtures
//! - **Scene model**: vertex arena, triangles, point lights and the emissive
//!   triangle index used for area-light sampling
//! - **Presets**: ready-made scenes (the hexagonal room and its showcase)
//!
//! # Example
//!
//! ```ignore
//! use vela_core::{Material, PointLight, Scene};
//! use vela_math::Vec3;
//!
//! let mut scene = Scene::new("single");
//! let white = scene.add_material(Material::diffuse(Vec3::ONE));
//! let a = scene.add_vertex(Vec3::new(-1.0, -1.0, 0.0));
//! let b = scene.add_vertex(Vec3::new(1.0, -1.0, 0.0));
//! let c = scene.add_vertex(Vec3::new(0.0, 1.0, 0.0));
//! scene.add_triangle(a, b, c, white)?;
//! scene.add_point_light(PointLight::new(Vec3::new(0.0, 0.0, 2.0), 1.0, Vec3::ONE));
//! ```

pub mod material;
pub mod presets;
pub mod scene;

// Re-export commonly used types
pub use material::Material;
pub use scene::{
    MaterialId, PointLight, Scene, SceneError, SceneResult, Triangle, TriangleId, VertexId,
};
