use super::{EpisodeState, SimulationConfig};

pub const OBSERVATION_SIZE: usize = 7;

/// Features seen by the policy:
/// `[x, y, vx, vy, angle, platform dx, platform dy]`, scaled by the arena
/// size, the maximum speed and a full turn. The values are not clamped.
pub type Observation = [f64; OBSERVATION_SIZE];

pub fn encode(state: &EpisodeState, config: &SimulationConfig) -> Observation {
    let target = state.platform.center().subtract(state.position);
    [
        state.position.x / config.width,
        state.position.y / config.height,
        state.velocity.x / config.max_speed,
        state.velocity.y / config.max_speed,
        state.angle / 360.,
        target.x / config.width,
        target.y / config.height,
    ]
}
