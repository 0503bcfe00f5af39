//! Pinhole camera for ray generation.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use vela_math::{Ray, Vec3};

use crate::sampling::sample_square;

/// The two viewpoints used for the hexagonal room.
///
/// Both look down +X with +Z up through a 2x2 image plane at x = 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eye {
    /// Eye at (-1, 0, 0): wide 90 degree view
    #[default]
    Near,
    /// Eye at (-2, 0, 0): narrower view of the same plane
    Far,
}

impl Eye {
    /// Position of the eye.
    pub fn position(self) -> Vec3 {
        match self {
            Eye::Near => Vec3::new(-1.0, 0.0, 0.0),
            Eye::Far => Vec3::new(-2.0, 0.0, 0.0),
        }
    }
}

impl FromStr for Eye {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "near" => Ok(Eye::Near),
            "far" => Ok(Eye::Far),
            other => Err(format!("unknown eye '{}' (expected near or far)", other)),
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eye::Near => write!(f, "near"),
            Eye::Far => write!(f, "far"),
        }
    }
}

/// Camera for generating rays into the scene.
#[derive(Clone, Debug)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    /// Vertical field of view in degrees
    vfov: f32,

    // Cached computed values (set by initialize())
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    w: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 256,
            image_height: 256,
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
            // Cached values (initialized to defaults)
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            w: Vec3::Z,
        }
    }

    /// Initialized camera for the hexagonal room from one of its viewpoints.
    pub fn room(eye: Eye, width: u32, height: u32) -> Self {
        let position = eye.position();
        // The image plane at x = 0 spans [-1, 1] vertically
        let vfov = 2.0 * (1.0 / -position.x).atan().to_degrees();

        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_position(position, position + Vec3::X, Vec3::Z)
            .with_fov(vfov);
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        self.center = self.look_from;

        // Calculate viewport dimensions one unit in front of the eye
        let theta = self.vfov.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(self.w).normalize();
        let v = self.w.cross(u);

        // Calculate viewport vectors (v runs down the image)
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        // Calculate upper left pixel location
        let viewport_upper_left = self.center - self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }

    /// Ray through a uniformly jittered point inside pixel (i, j).
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let (dx, dy) = sample_square(rng);
        self.ray_through(i as f32 + dx, j as f32 + dy)
    }

    /// Eye position.
    pub fn origin(&self) -> Vec3 {
        self.center
    }

    /// Ray through image position (x, y), in pixels from the centre of pixel (0, 0).
    fn ray_through(&self, x: f32, y: f32) -> Ray {
        let pixel_sample = self.pixel00_loc + x * self.pixel_delta_u + y * self.pixel_delta_v;
        Ray::towards(self.center, pixel_sample)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
