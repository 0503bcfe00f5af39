//! End-to-end renders of small scenes.

use rand::rngs::StdRng;
use rand::SeedableRng;
use vela_core::{presets, Material, PointLight, Scene};
use vela_math::Vec3;
use vela_renderer::{
    render, render_pixel, write_ppm, Camera, Eye, Integrator, RenderConfig, ToneMap,
};

const CENTROID: Vec3 = Vec3::new(0.0, -1.0 / 3.0, 0.0);

/// One diffuse triangle in the z = 0 plane with its centroid at `CENTROID`.
fn single_triangle(color: Vec3) -> Scene {
    let mut scene = Scene::new("single triangle");
    let m = scene.add_material(Material::diffuse(color));
    let a = scene.add_vertex(Vec3::new(-1.0, -1.0, 0.0));
    let b = scene.add_vertex(Vec3::new(1.0, -1.0, 0.0));
    let c = scene.add_vertex(Vec3::new(0.0, 1.0, 0.0));
    scene.add_triangle(a, b, c, m).unwrap();
    scene
}

/// One-pixel camera at `height` looking straight down at the centroid.
fn overhead_camera(height: f32) -> Camera {
    let mut camera = Camera::new()
        .with_resolution(1, 1)
        .with_position(CENTROID + Vec3::new(0.0, 0.0, height), CENTROID, Vec3::Y)
        .with_fov(1.0);
    camera.initialize();
    camera
}

#[test]
fn single_triangle_under_point_light() {
    let color = Vec3::new(0.8, 0.6, 0.4);
    let intensity = 1.5;
    let mut scene = single_triangle(color);
    scene.add_point_light(PointLight::new(
        CENTROID + Vec3::new(0.0, 0.0, 2.0),
        intensity,
        Vec3::ONE,
    ));

    let camera = overhead_camera(3.0);
    let integrator = Integrator::new(&RenderConfig::default());
    let mut rng = StdRng::seed_from_u64(42);

    // The light sits straight above, so cos is 1 up to pixel jitter, and
    // every diffuse bounce leaves the scene
    let pixel = render_pixel(&camera, &scene, &integrator, 0, 0, 16, &mut rng);
    let expected = intensity * color;
    assert!(
        (pixel - expected).length() < 1e-3,
        "{pixel:?} vs {expected:?}"
    );
}

#[test]
fn opaque_occluder_blocks_point_light() {
    let mut scene = single_triangle(Vec3::ONE);
    scene.add_point_light(PointLight::new(
        CENTROID + Vec3::new(0.0, 0.0, 2.0),
        1.5,
        Vec3::ONE,
    ));

    // Opaque panel between the triangle and the light
    let m = scene.add_material(Material::diffuse(Vec3::ONE));
    let corners = [(-2.0, -2.0), (2.0, -2.0), (2.0, 2.0), (-2.0, 2.0)]
        .map(|(x, y)| scene.add_vertex(CENTROID + Vec3::new(x, y, 1.0)));
    scene
        .add_quad(corners[0], corners[1], corners[2], corners[3], m)
        .unwrap();

    // Camera below the panel so the primary ray reaches the triangle
    let camera = overhead_camera(0.5);
    let integrator = Integrator::new(&RenderConfig::default());
    let mut rng = StdRng::seed_from_u64(7);

    let pixel = render_pixel(&camera, &scene, &integrator, 0, 0, 8, &mut rng);
    assert_eq!(pixel, Vec3::ZERO);
}

#[test]
fn seeded_render_is_reproducible() {
    let scene = presets::showcase().unwrap();
    let camera = Camera::room(Eye::Near, 16, 16);
    let config = RenderConfig {
        samples_per_pixel: 2,
        bucket_size: 8,
        seed: 1234,
        ..RenderConfig::default()
    };

    let first = render(&camera, &scene, &config).unwrap();
    let second = render(&camera, &scene, &config).unwrap();
    assert_eq!(first, second);

    let reseeded = render(&camera, &scene, &RenderConfig { seed: 4321, ..config }).unwrap();
    assert_ne!(first, reseeded);
}

#[test]
fn showcase_renders_to_ppm() {
    let scene = presets::showcase().unwrap();
    let camera = Camera::room(Eye::Far, 24, 16);
    let config = RenderConfig {
        samples_per_pixel: 2,
        ..RenderConfig::default()
    };

    let image = render(&camera, &scene, &config).unwrap();
    assert!(image.pixels.iter().all(|c| c.is_finite()));
    assert!(image.pixels.iter().all(|c| c.min_element() >= 0.0));
    assert!(image.max_component() > 0.0);

    let mut bytes = Vec::new();
    write_ppm(&mut bytes, &image, ToneMap::NormalizeMax).unwrap();
    assert!(bytes.starts_with(b"P6\n24 16\n255\n"));
    assert_eq!(bytes.len(), b"P6\n24 16\n255\n".len() + 24 * 16 * 3);
}
