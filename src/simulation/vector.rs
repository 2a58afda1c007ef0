use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0., y: 0. };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, w: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + w.x,
            y: self.y + w.y,
        }
    }

    pub fn subtract(self, w: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - w.x,
            y: self.y - w.y,
        }
    }

    pub fn scale(self, k: f64) -> Vec2 {
        Vec2 {
            x: self.x * k,
            y: self.y * k,
        }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector with the same direction. The zero vector maps to itself.
    pub fn normalize(self) -> Vec2 {
        let length = self.length();
        if length == 0. {
            Vec2::ZERO
        } else {
            self.scale(1. / length)
        }
    }

    pub fn scale_to_length(self, length: f64) -> Vec2 {
        self.normalize().scale(length)
    }

    /// Rotates by `degrees`. With the y axis pointing down the rotation is
    /// clockwise on screen for positive angles.
    pub fn rotate(self, degrees: f64) -> Vec2 {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vec2 {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}
