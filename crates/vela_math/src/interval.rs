/// A closed range of ray parameters or channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Strictly positive ray parameters, up to infinity.
    pub const FORWARD: Interval = Interval {
        min: 0.0,
        max: f32::INFINITY,
    };

    /// The unit range used for display channel values.
    pub const UNIT: Interval = Interval { min: 0.0, max: 1.0 };

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Clamps x to be within the interval [min, max].
    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }
}
