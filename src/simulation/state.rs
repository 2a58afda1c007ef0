use serde::Serialize;

use super::{Termination, Vec2};
use crate::error::Error;

/// Axis aligned rectangle in screen coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: Vec2, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width / 2.,
            center.y - height / 2.,
            width,
            height,
        )
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2., self.y + self.height / 2.)
    }

    /// Strict overlap, rectangles sharing only an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Action {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
}

impl Action {
    pub const IDLE: Action = Action {
        rotate_left: false,
        rotate_right: false,
        thrust: false,
    };

    pub fn new(rotate_left: bool, rotate_right: bool, thrust: bool) -> Self {
        Self {
            rotate_left,
            rotate_right,
            thrust,
        }
    }

    pub fn thrust() -> Self {
        Self {
            thrust: true,
            ..Self::IDLE
        }
    }

    /// Signed rotation form: positive turns left, negative turns right.
    pub fn from_rotation(rotation: f64, thrust: bool) -> Self {
        Self {
            rotate_left: rotation > 0.,
            rotate_right: rotation < 0.,
            thrust,
        }
    }

    /// Reads `[rotate_left, rotate_right, thrust]` network outputs, each one
    /// active when strictly above `threshold`.
    pub fn from_outputs(outputs: &[f64], threshold: f64) -> Result<Self, Error> {
        let [left, right, thrust] = outputs else {
            return Err(Error::InvalidPolicyOutput(format!(
                "expected 3 outputs, got {}",
                outputs.len()
            )));
        };
        if let Some(nan) = outputs.iter().position(|v| v.is_nan()) {
            return Err(Error::InvalidPolicyOutput(format!("output {nan} is NaN")));
        }
        Ok(Self {
            rotate_left: *left > threshold,
            rotate_right: *right > threshold,
            thrust: *thrust > threshold,
        })
    }

    /// Net rotation in steps, both buttons at once cancel out.
    pub fn rotation(&self) -> f64 {
        match (self.rotate_left, self.rotate_right) {
            (true, false) => 1.,
            (false, true) => -1.,
            _ => 0.,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EpisodeState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Degrees in (-180, 180], counter-clockwise on screen.
    pub angle: f64,
    pub thrust_active: bool,
    pub elapsed_time: f64,
    pub platform: Rect,
    pub done: bool,
    pub landed: bool,
    pub termination: Option<Termination>,
    pub low_speed_start_time: Option<f64>,
    pub stalled_x_start_time: Option<f64>,
    pub last_x_position: f64,
    pub previous_distance_x: Option<f64>,
    pub previous_distance_y: Option<f64>,
    pub cumulative_reward: f64,
    pub landings: u32,
}

impl EpisodeState {
    pub fn new(position: Vec2, platform: Rect) -> Self {
        Self {
            position,
            platform,
            last_x_position: position.x,
            ..Default::default()
        }
    }

    pub fn with_position(self, position: Vec2) -> Self {
        Self { position, ..self }
    }

    pub fn with_velocity(self, velocity: Vec2) -> Self {
        Self { velocity, ..self }
    }

    pub fn with_angle(self, angle: f64) -> Self {
        Self { angle, ..self }
    }

    pub fn with_platform(self, platform: Rect) -> Self {
        Self { platform, ..self }
    }

    pub fn with_elapsed_time(self, elapsed_time: f64) -> Self {
        Self {
            elapsed_time,
            ..self
        }
    }

    /// Unsigned axis distances from the craft centre to the platform centre.
    pub fn platform_distance(&self) -> (f64, f64) {
        let Vec2 { x, y } = self.platform.center().subtract(self.position);
        (x.abs(), y.abs())
    }

    /// Places the craft again after a checkpoint landing. Score, clock and
    /// landing count carry over.
    pub(crate) fn respawn(&mut self, position: Vec2, platform: Rect) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.angle = 0.;
        self.platform = platform;
        self.last_x_position = position.x;
        self.low_speed_start_time = None;
        self.stalled_x_start_time = None;
        self.previous_distance_x = None;
        self.previous_distance_y = None;
    }
}
