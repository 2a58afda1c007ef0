use super::{Action, EpisodeState, SimulationConfig, Vec2};

/// Fixed step integrator. One call to [`Physics::iterate`] is one tick.
#[derive(Debug, Clone)]
pub struct Physics {
    gravity: f64,
    thrust: f64,
    rotation_speed: f64,
    max_speed: f64,
    width: f64,
    height: f64,
    dt: f64,
    bounce: bool,
}

impl Default for Physics {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl Physics {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            gravity: config.gravity,
            thrust: config.thrust,
            rotation_speed: config.rotation_speed,
            max_speed: config.max_speed,
            width: config.width,
            height: config.height,
            dt: config.tick_duration,
            bounce: config.wall_bounce && !config.wall_crash,
        }
    }

    pub fn with_gravity(self, gravity: f64) -> Self {
        Self { gravity, ..self }
    }
    pub fn with_thrust(self, thrust: f64) -> Self {
        Self { thrust, ..self }
    }
    pub fn with_max_speed(self, max_speed: f64) -> Self {
        Self { max_speed, ..self }
    }
    pub fn with_bounce(self, bounce: bool) -> Self {
        Self { bounce, ..self }
    }

    pub fn iterate(&self, mut state: EpisodeState, action: &Action) -> EpisodeState {
        // rotate
        state.angle = normalize_angle(state.angle + action.rotation() * self.rotation_speed);

        // thrust along the nose, gravity always
        if action.thrust {
            state.velocity = state
                .velocity
                .add(Vec2::new(0., -self.thrust).rotate(-state.angle));
        }
        state.velocity.y += self.gravity;

        if state.velocity.length() > self.max_speed {
            state.velocity = state.velocity.scale_to_length(self.max_speed);
        }

        state.position = state.position.add(state.velocity);
        self.keep_in_arena(&mut state);

        state.thrust_active = action.thrust;
        state.elapsed_time += self.dt;
        state
    }

    fn keep_in_arena(&self, state: &mut EpisodeState) {
        let Vec2 { x, y } = state.position;
        let clamped = Vec2::new(x.clamp(0., self.width), y.clamp(0., self.height));
        if self.bounce {
            if clamped.x != x {
                state.velocity.x = -state.velocity.x;
            }
            if clamped.y != y {
                state.velocity.y = -state.velocity.y;
            }
        }
        state.position = clamped;
    }
}

/// Wraps degrees into (-180, 180].
pub fn normalize_angle(angle: f64) -> f64 {
    let angle = angle % 360.;
    if angle > 180. {
        angle - 360.
    } else if angle <= -180. {
        angle + 360.
    } else {
        angle
    }
}
