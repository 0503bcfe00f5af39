//! Scene model for Vela.
//!
//! The scene owns every piece of geometry in flat arenas: a vertex table, a
//! material table, the triangle list and the point lights. Triangles refer to
//! vertices and materials by index, so sharing a vertex between faces of the
//! same mesh costs nothing and the references stay valid as tables grow.

use thiserror::Error;
use vela_math::{Color, Vec3};

use crate::material::Material;

/// Squared sine of the smallest corner angle accepted at the first vertex.
///
/// Scale-free, so tiny but well-shaped triangles are kept.
const DEGENERATE_SIN_SQ: f32 = 1e-12;

/// Errors that can occur while building a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Invalid vertex reference: {0}")]
    InvalidVertex(usize),

    #[error("Invalid material reference: {0}")]
    InvalidMaterial(usize),

    #[error("Invalid triangle reference: {0}")]
    InvalidTriangle(usize),

    #[error("Degenerate triangle with vertices {0}, {1}, {2}")]
    DegenerateTriangle(usize, usize, usize),
}

/// Result type for scene construction.
pub type SceneResult<T> = Result<T, SceneError>;

/// Index into the scene's vertex table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexId(usize);

/// Index into the scene's material table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

/// Index into the scene's triangle list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TriangleId(usize);

/// A triangle referencing three shared vertices and a material.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    vertices: [VertexId; 3],
    /// Unit face normal, `normalize((v1 - v0) x (v2 - v0))`
    normal: Vec3,
    material: MaterialId,
}

impl Triangle {
    /// Vertex indices in winding order.
    pub fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    /// Unit face normal (counter-clockwise winding faces the viewer).
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    fn uses_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains(&id)
    }
}

/// An omnidirectional light without falloff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    /// Scalar intensity (never negative)
    pub intensity: f32,
    pub color: Color,
}

impl PointLight {
    /// Create a point light. Negative intensities are clamped to zero.
    pub fn new(position: Vec3, intensity: f32, color: Color) -> Self {
        Self {
            position,
            intensity: intensity.max(0.0),
            color,
        }
    }
}

/// A complete renderable scene.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Scene name (used in logs)
    pub name: String,

    vertices: Vec<Vec3>,
    materials: Vec<Material>,
    triangles: Vec<Triangle>,
    point_lights: Vec<PointLight>,

    /// Triangles whose material emits light
    emissive: Vec<TriangleId>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a vertex position and return its ID.
    pub fn add_vertex(&mut self, position: Vec3) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(position);
        id
    }

    /// Get a vertex position.
    pub fn vertex(&self, id: VertexId) -> Option<Vec3> {
        self.vertices.get(id.0).copied()
    }

    /// Move a vertex and recompute the normals of every triangle using it.
    ///
    /// The scene is left unchanged if the move would collapse a triangle.
    pub fn set_vertex(&mut self, id: VertexId, position: Vec3) -> SceneResult<()> {
        let previous = *self
            .vertices
            .get(id.0)
            .ok_or(SceneError::InvalidVertex(id.0))?;
        self.vertices[id.0] = position;

        let mut normals = Vec::new();
        for (index, triangle) in self.triangles.iter().enumerate() {
            if !triangle.uses_vertex(id) {
                continue;
            }
            match self.face_normal(triangle.vertices) {
                Ok(normal) => normals.push((index, normal)),
                Err(err) => {
                    self.vertices[id.0] = previous;
                    return Err(err);
                }
            }
        }

        for (index, normal) in normals {
            self.triangles[index].normal = normal;
        }
        Ok(())
    }

    /// Add a material to the scene and return its ID.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len());
        self.materials.push(material);
        id
    }

    /// Get a material by ID.
    ///
    /// Panics if the ID did not come from this scene.
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    /// Add a triangle over three existing vertices.
    ///
    /// The face normal is computed here. Emissive triangles are registered
    /// in the area-light index.
    pub fn add_triangle(
        &mut self,
        v0: VertexId,
        v1: VertexId,
        v2: VertexId,
        material: MaterialId,
    ) -> SceneResult<TriangleId> {
        if material.0 >= self.materials.len() {
            return Err(SceneError::InvalidMaterial(material.0));
        }
        let vertices = [v0, v1, v2];
        let normal = self.face_normal(vertices)?;

        let id = TriangleId(self.triangles.len());
        self.triangles.push(Triangle {
            vertices,
            normal,
            material,
        });
        if self.materials[material.0].is_emissive() {
            self.emissive.push(id);
        }
        Ok(id)
    }

    /// Add a planar quad `v0 v1 v2 v3` (counter-clockwise) as two triangles.
    pub fn add_quad(
        &mut self,
        v0: VertexId,
        v1: VertexId,
        v2: VertexId,
        v3: VertexId,
        material: MaterialId,
    ) -> SceneResult<[TriangleId; 2]> {
        let first = self.add_triangle(v0, v1, v2, material)?;
        let second = self.add_triangle(v0, v2, v3, material)?;
        Ok([first, second])
    }

    /// Remove a triangle. IDs of later triangles shift down by one.
    pub fn remove_triangle(&mut self, id: TriangleId) -> SceneResult<Triangle> {
        if id.0 >= self.triangles.len() {
            return Err(SceneError::InvalidTriangle(id.0));
        }
        let removed = self.triangles.remove(id.0);
        self.rebuild_emissive_index();
        Ok(removed)
    }

    /// Add a point light.
    pub fn add_point_light(&mut self, light: PointLight) {
        self.point_lights.push(light);
    }

    /// Rebuild the area-light index from the triangle list.
    pub fn rebuild_emissive_index(&mut self) {
        self.emissive = self
            .triangles
            .iter()
            .enumerate()
            .filter(|(_, t)| self.materials[t.material.0].is_emissive())
            .map(|(i, _)| TriangleId(i))
            .collect();
        log::debug!(
            "Scene {}: {} emissive triangles indexed",
            self.name,
            self.emissive.len()
        );
    }

    /// All triangles, in insertion order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Iterate over triangles together with their IDs.
    pub fn iter_triangles(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> + '_ {
        self.triangles
            .iter()
            .enumerate()
            .map(|(i, t)| (TriangleId(i), t))
    }

    /// Get a triangle by ID.
    ///
    /// Panics if the ID did not come from this scene.
    pub fn triangle(&self, id: TriangleId) -> &Triangle {
        &self.triangles[id.0]
    }

    /// Corner positions of a triangle.
    pub fn positions(&self, triangle: &Triangle) -> [Vec3; 3] {
        let [a, b, c] = triangle.vertices;
        [self.vertices[a.0], self.vertices[b.0], self.vertices[c.0]]
    }

    /// Material of a triangle.
    pub fn material_of(&self, triangle: &Triangle) -> &Material {
        self.material(triangle.material)
    }

    /// All point lights.
    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    /// Triangles acting as area lights.
    pub fn emissive_triangles(&self) -> &[TriangleId] {
        &self.emissive
    }

    /// True if the scene has at least one point or area light.
    pub fn has_lights(&self) -> bool {
        !self.point_lights.is_empty() || !self.emissive.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn face_normal(&self, vertices: [VertexId; 3]) -> SceneResult<Vec3> {
        let mut p = [Vec3::ZERO; 3];
        for (slot, id) in p.iter_mut().zip(vertices) {
            *slot = self.vertex(id).ok_or(SceneError::InvalidVertex(id.0))?;
        }

        let (e1, e2) = (p[1] - p[0], p[2] - p[0]);
        let cross = e1.cross(e2);
        let bound = DEGENERATE_SIN_SQ * e1.length_squared() * e2.length_squared();
        if !cross.is_finite() || cross.length_squared() <= bound {
            return Err(SceneError::DegenerateTriangle(
                vertices[0].0,
                vertices[1].0,
                vertices[2].0,
            ));
        }
        Ok(cross.normalize())
    }
}
