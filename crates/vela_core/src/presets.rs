//! Ready-made scenes.
//!
//! The reference scene is a six-sided room, 16 units across and 10 units
//! tall, centred on (5, 0, 0) with +Z up. A camera sitting near the negative
//! X wall and looking down +X sees the whole interior.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vela_math::{Color, Vec3};

use crate::material::Material;
use crate::scene::{MaterialId, PointLight, Scene, SceneResult, TriangleId, VertexId};

pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
pub const RED: Color = Color::new(1.0, 0.0, 0.0);
pub const GREEN: Color = Color::new(0.0, 1.0, 0.0);
pub const BLUE: Color = Color::new(0.0, 0.0, 1.0);

/// Centre of the hexagonal room.
pub const ROOM_CENTER: Vec3 = Vec3::new(5.0, 0.0, 0.0);

/// Named scenes selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Empty room lit by a single point light
    Room,
    /// Room with glass and mirror objects and a ceiling area light
    #[default]
    Showcase,
}

impl Preset {
    /// Build the scene for this preset.
    pub fn build(self) -> SceneResult<Scene> {
        match self {
            Preset::Room => lit_room(),
            Preset::Showcase => showcase(),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "room" => Ok(Preset::Room),
            "showcase" => Ok(Preset::Showcase),
            other => Err(format!("unknown preset '{}' (expected room or showcase)", other)),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Room => write!(f, "room"),
            Preset::Showcase => write!(f, "showcase"),
        }
    }
}

/// The bare hexagonal room: white floor, black ceiling, and six walls
/// coloured red, green, blue, red, green, blue. All normals face inward.
pub fn hexagonal_room() -> SceneResult<Scene> {
    let mut scene = Scene::new("hexagonal room");

    let floor = hexagon(&mut scene, -5.0);
    let ceiling = hexagon(&mut scene, 5.0);
    let [fc, f1, f2, f3, f4, f5, f6] = floor;
    let [cc, c1, c2, c3, c4, c5, c6] = ceiling;

    let floor_mat = scene.add_material(Material::diffuse(WHITE));
    let ceiling_mat = scene.add_material(Material::diffuse(BLACK));
    let wall_mats: Vec<MaterialId> = [RED, GREEN, BLUE, RED, GREEN, BLUE]
        .into_iter()
        .map(|c| scene.add_material(Material::diffuse(c)))
        .collect();

    for (a, b) in [(f6, f1), (f1, f2), (f2, f3), (f3, f4), (f4, f5), (f5, f6)] {
        scene.add_triangle(fc, a, b, floor_mat)?;
    }
    for (a, b) in [(c1, c6), (c2, c1), (c3, c2), (c4, c3), (c5, c4), (c6, c5)] {
        scene.add_triangle(cc, a, b, ceiling_mat)?;
    }

    let walls = [
        [(f2, c2, f3), (f3, c2, c3)],
        [(f3, c3, f4), (f4, c3, c4)],
        [(f4, c4, f5), (c4, c5, f5)],
        [(c5, f6, f5), (c5, c6, f6)],
        [(c6, c1, f6), (c1, f1, f6)],
        [(f2, f1, c2), (f1, c1, c2)],
    ];
    for (wall, material) in walls.iter().zip(wall_mats) {
        for &(a, b, c) in wall {
            scene.add_triangle(a, b, c, material)?;
        }
    }

    Ok(scene)
}

/// The room with one white point light under the ceiling.
pub fn lit_room() -> SceneResult<Scene> {
    let mut scene = hexagonal_room()?;
    scene.name = "room".to_string();
    scene.add_point_light(PointLight::new(Vec3::new(5.0, 0.0, 4.0), 1.0, WHITE));
    Ok(scene)
}

/// The room with a glass tetrahedron, a mirror tetrahedron, a diffuse
/// tetrahedron, a square ceiling lamp and a point light.
pub fn showcase() -> SceneResult<Scene> {
    let mut scene = hexagonal_room()?;
    scene.name = "showcase".to_string();

    let glass = scene.add_material(Material::glass(0.9).with_specular(0.1));
    let mirror = scene.add_material(Material::mirror(0.9));
    let matte = scene.add_material(
        Material::diffuse(Color::new(0.9, 0.8, 0.3))
            .with_diffuse(0.8)
            .with_specular(0.1),
    );
    let lamp = scene.add_material(Material::emissive(WHITE, 1.5));

    add_tetrahedron(&mut scene, Vec3::new(7.0, 1.5, -3.0), 1.5, glass)?;
    add_tetrahedron(&mut scene, Vec3::new(9.5, -2.5, -3.5), 1.5, mirror)?;
    add_tetrahedron(&mut scene, Vec3::new(5.0, -1.0, -4.0), 1.0, matte)?;

    // Lamp quad just below the ceiling, facing down
    let a = scene.add_vertex(Vec3::new(4.0, -1.0, 4.95));
    let b = scene.add_vertex(Vec3::new(4.0, 1.0, 4.95));
    let c = scene.add_vertex(Vec3::new(7.0, 1.0, 4.95));
    let d = scene.add_vertex(Vec3::new(7.0, -1.0, 4.95));
    scene.add_quad(a, b, c, d, lamp)?;

    scene.add_point_light(PointLight::new(Vec3::new(3.0, 0.0, 3.0), 0.6, WHITE));

    Ok(scene)
}

/// Add a regular tetrahedron with outward-facing normals.
///
/// `size` is the distance from the centre to each corner.
pub fn add_tetrahedron(
    scene: &mut Scene,
    center: Vec3,
    size: f32,
    material: MaterialId,
) -> SceneResult<[TriangleId; 4]> {
    let corners = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
    ]
    .map(|d| center + d.normalize() * size);
    let ids = corners.map(|p| scene.add_vertex(p));

    let faces = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
    let mut out = Vec::with_capacity(4);
    for [i, j, k] in faces {
        let (a, b, c) = (corners[i], corners[j], corners[k]);
        let outward = (b - a).cross(c - a).dot((a + b + c) / 3.0 - center) > 0.0;
        let id = if outward {
            scene.add_triangle(ids[i], ids[j], ids[k], material)?
        } else {
            scene.add_triangle(ids[i], ids[k], ids[j], material)?
        };
        out.push(id);
    }
    Ok([out[0], out[1], out[2], out[3]])
}

/// Centre plus six rim vertices of a room cap at height `z`.
fn hexagon(scene: &mut Scene, z: f32) -> [VertexId; 7] {
    [
        Vec3::new(5.0, 0.0, z),
        Vec3::new(-3.0, 0.0, z),
        Vec3::new(0.0, -6.0, z),
        Vec3::new(10.0, -6.0, z),
        Vec3::new(13.0, 0.0, z),
        Vec3::new(10.0, 6.0, z),
        Vec3::new(0.0, 6.0, z),
    ]
    .map(|p| scene.add_vertex(p))
}
