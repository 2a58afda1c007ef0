use rand::Rng;

use super::Vec2;
use crate::error::ConfigError;

/// Placement rule used by `reset` for the craft and the platform.
///
/// For the platform the sampled point is the top-left corner of its rectangle
/// and the whole rectangle stays inside the region. For the craft the sampled
/// point is its centre. Random placements land on whole pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnPolicy {
    Fixed {
        x: f64,
        y: f64,
    },
    RandomInBox {
        left: f64,
        top: f64,
        right: f64,
        bottom: f64,
    },
    RandomOnLine {
        y: f64,
        left: f64,
        right: f64,
    },
}

impl SpawnPolicy {
    /// Box covering the arena shrunk by `margin` (a fraction) on every side.
    pub fn with_margin(width: f64, height: f64, margin: f64) -> Self {
        Self::RandomInBox {
            left: (width * margin).trunc(),
            top: (height * margin).trunc(),
            right: (width * (1. - margin)).trunc(),
            bottom: (height * (1. - margin)).trunc(),
        }
    }

    /// Samples a position for an object of size `(width, height)`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, (width, height): (f64, f64)) -> Vec2 {
        match *self {
            Self::Fixed { x, y } => Vec2::new(x, y),
            Self::RandomInBox {
                left,
                top,
                right,
                bottom,
            } => Vec2::new(
                sample_pixel(rng, left, right - width),
                sample_pixel(rng, top, bottom - height),
            ),
            Self::RandomOnLine { y, left, right } => {
                Vec2::new(sample_pixel(rng, left, right - width), y)
            }
        }
    }

    pub(crate) fn validate(
        &self,
        name: &'static str,
        (width, height): (f64, f64),
        (arena_width, arena_height): (f64, f64),
    ) -> Result<(), ConfigError> {
        let out_of_arena = |reason: String| ConfigError::SpawnOutOfArena { name, reason };
        let (left, top, right, bottom) = match *self {
            // a fixed platform may hang over the arena edge, only its corner is checked
            Self::Fixed { x, y } => (x, y, x, y),
            Self::RandomInBox {
                left,
                top,
                right,
                bottom,
            } => (left, top, right, bottom),
            Self::RandomOnLine { y, left, right } => (left, y, right, y + height),
        };
        for value in [left, top, right, bottom] {
            super::config::finite(name, value)?;
        }
        let random_x = !matches!(self, Self::Fixed { .. });
        let random_y = matches!(self, Self::RandomInBox { .. });
        if random_x && pixel_range(left, right - width).is_none() {
            return Err(out_of_arena(format!(
                "no whole pixel between {left} and {} horizontally",
                right - width
            )));
        }
        if random_y && pixel_range(top, bottom - height).is_none() {
            return Err(out_of_arena(format!(
                "no whole pixel between {top} and {} vertically",
                bottom - height
            )));
        }
        if left < 0. || top < 0. || right > arena_width || bottom > arena_height {
            return Err(out_of_arena(format!(
                "[{left}, {right}] x [{top}, {bottom}] exceeds [0, {arena_width}] x [0, {arena_height}]"
            )));
        }
        Ok(())
    }
}

fn pixel_range(low: f64, high: f64) -> Option<(i64, i64)> {
    let (low, high) = (low.ceil() as i64, high.floor() as i64);
    if low <= high {
        Some((low, high))
    } else {
        None
    }
}

fn sample_pixel<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    match pixel_range(low, high) {
        Some((low, high)) => rng.gen_range(low..=high) as f64,
        // only reachable with a config that failed validation
        None => low,
    }
}
