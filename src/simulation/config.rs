use crate::error::ConfigError;

use super::{RewardPolicy, SpawnPolicy, TerminalRewards};

pub(crate) mod defaults {
    pub const WIDTH: f64 = 800.;
    pub const HEIGHT: f64 = 600.;
    pub const GRAVITY: f64 = 0.1;
    pub const THRUST: f64 = 0.2;
    pub const ROTATION_SPEED: f64 = 3.;
    pub const MAX_SPEED: f64 = 5.;
    pub const MAX_LANDING_ANGLE: f64 = 40.;
    pub const MAX_LANDING_SPEED: f64 = 5.;
    pub const LOW_SPEED_THRESHOLD: f64 = 0.5;
    pub const MAX_STALL_DURATION: f64 = 3.;
    pub const MAX_HORIZONTAL_STALL_DURATION: f64 = 5.;
    pub const EPISODE_TIME_LIMIT: f64 = 60.;
    pub const TICK_DURATION: f64 = 1. / 60.;
    pub const PLATFORM_WIDTH: f64 = 100.;
    pub const PLATFORM_HEIGHT: f64 = 10.;
    pub const LANDER_WIDTH: f64 = 20.;
    pub const LANDER_HEIGHT: f64 = 40.;
    pub const PLATFORM_MARGIN: f64 = 0.1;
    pub const LANDER_SPAWN_DEPTH: f64 = 0.2;
}

/// What happens when the craft lands safely on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LandingMode {
    /// The landing finishes the episode.
    #[default]
    Terminate,
    /// The landing counts as a checkpoint: craft and platform are placed
    /// again and the episode keeps running.
    Respawn,
}

/// Physical constants, thresholds and policy switches of an episode.
///
/// Units are pixels and simulation steps for motion, degrees for angles and
/// seconds for every duration. Each step advances the clock by
/// `tick_duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub width: f64,
    pub height: f64,
    pub gravity: f64,
    pub thrust: f64,
    pub rotation_speed: f64,
    pub max_speed: f64,
    pub max_landing_angle: f64,
    pub max_landing_speed: f64,
    pub low_speed_threshold: f64,
    pub max_stall_duration: f64,
    pub max_horizontal_stall_duration: f64,
    pub episode_time_limit: f64,
    pub tick_duration: f64,
    pub platform_width: f64,
    pub platform_height: f64,
    pub lander_width: f64,
    pub lander_height: f64,
    pub platform_spawn: SpawnPolicy,
    pub lander_spawn: SpawnPolicy,
    pub wall_crash: bool,
    pub wall_bounce: bool,
    pub landing_mode: LandingMode,
    pub reward_policy: RewardPolicy,
    pub terminal_rewards: TerminalRewards,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: defaults::WIDTH,
            height: defaults::HEIGHT,
            gravity: defaults::GRAVITY,
            thrust: defaults::THRUST,
            rotation_speed: defaults::ROTATION_SPEED,
            max_speed: defaults::MAX_SPEED,
            max_landing_angle: defaults::MAX_LANDING_ANGLE,
            max_landing_speed: defaults::MAX_LANDING_SPEED,
            low_speed_threshold: defaults::LOW_SPEED_THRESHOLD,
            max_stall_duration: defaults::MAX_STALL_DURATION,
            max_horizontal_stall_duration: defaults::MAX_HORIZONTAL_STALL_DURATION,
            episode_time_limit: defaults::EPISODE_TIME_LIMIT,
            tick_duration: defaults::TICK_DURATION,
            platform_width: defaults::PLATFORM_WIDTH,
            platform_height: defaults::PLATFORM_HEIGHT,
            lander_width: defaults::LANDER_WIDTH,
            lander_height: defaults::LANDER_HEIGHT,
            platform_spawn: SpawnPolicy::with_margin(
                defaults::WIDTH,
                defaults::HEIGHT,
                defaults::PLATFORM_MARGIN,
            ),
            lander_spawn: SpawnPolicy::RandomInBox {
                left: defaults::WIDTH * defaults::PLATFORM_MARGIN,
                top: 0.,
                right: defaults::WIDTH * (1. - defaults::PLATFORM_MARGIN),
                bottom: defaults::HEIGHT * defaults::LANDER_SPAWN_DEPTH,
            },
            wall_crash: true,
            wall_bounce: false,
            landing_mode: LandingMode::default(),
            reward_policy: RewardPolicy::default(),
            terminal_rewards: TerminalRewards::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_arena(self, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..self
        }
    }
    pub fn with_gravity(self, gravity: f64) -> Self {
        Self { gravity, ..self }
    }
    pub fn with_thrust(self, thrust: f64) -> Self {
        Self { thrust, ..self }
    }
    pub fn with_rotation_speed(self, rotation_speed: f64) -> Self {
        Self {
            rotation_speed,
            ..self
        }
    }
    pub fn with_max_speed(self, max_speed: f64) -> Self {
        Self { max_speed, ..self }
    }
    pub fn with_landing_limits(self, max_landing_angle: f64, max_landing_speed: f64) -> Self {
        Self {
            max_landing_angle,
            max_landing_speed,
            ..self
        }
    }
    pub fn with_low_speed_stall(self, low_speed_threshold: f64, max_stall_duration: f64) -> Self {
        Self {
            low_speed_threshold,
            max_stall_duration,
            ..self
        }
    }
    pub fn with_max_horizontal_stall_duration(self, max_horizontal_stall_duration: f64) -> Self {
        Self {
            max_horizontal_stall_duration,
            ..self
        }
    }
    pub fn with_episode_time_limit(self, episode_time_limit: f64) -> Self {
        Self {
            episode_time_limit,
            ..self
        }
    }
    pub fn with_tick_duration(self, tick_duration: f64) -> Self {
        Self {
            tick_duration,
            ..self
        }
    }
    pub fn with_platform_size(self, platform_width: f64, platform_height: f64) -> Self {
        Self {
            platform_width,
            platform_height,
            ..self
        }
    }
    pub fn with_lander_size(self, lander_width: f64, lander_height: f64) -> Self {
        Self {
            lander_width,
            lander_height,
            ..self
        }
    }
    pub fn with_platform_spawn(self, platform_spawn: SpawnPolicy) -> Self {
        Self {
            platform_spawn,
            ..self
        }
    }
    pub fn with_lander_spawn(self, lander_spawn: SpawnPolicy) -> Self {
        Self {
            lander_spawn,
            ..self
        }
    }
    pub fn with_wall_crash(self, wall_crash: bool) -> Self {
        Self { wall_crash, ..self }
    }
    pub fn with_wall_bounce(self, wall_bounce: bool) -> Self {
        Self {
            wall_bounce,
            ..self
        }
    }
    pub fn with_landing_mode(self, landing_mode: LandingMode) -> Self {
        Self {
            landing_mode,
            ..self
        }
    }
    pub fn with_reward_policy(self, reward_policy: RewardPolicy) -> Self {
        Self {
            reward_policy,
            ..self
        }
    }
    pub fn with_terminal_rewards(self, terminal_rewards: TerminalRewards) -> Self {
        Self {
            terminal_rewards,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("max_speed", self.max_speed),
            ("max_landing_angle", self.max_landing_angle),
            ("max_landing_speed", self.max_landing_speed),
            ("tick_duration", self.tick_duration),
        ] {
            positive(name, value)?;
        }
        for (name, value) in [
            ("gravity", self.gravity),
            ("thrust", self.thrust),
            ("rotation_speed", self.rotation_speed),
        ] {
            finite(name, value)?;
        }
        for (name, value) in [
            ("low_speed_threshold", self.low_speed_threshold),
            ("max_stall_duration", self.max_stall_duration),
            (
                "max_horizontal_stall_duration",
                self.max_horizontal_stall_duration,
            ),
            ("episode_time_limit", self.episode_time_limit),
            ("platform_width", self.platform_width),
            ("platform_height", self.platform_height),
            ("lander_width", self.lander_width),
            ("lander_height", self.lander_height),
        ] {
            non_negative(name, value)?;
        }

        self.platform_spawn.validate(
            "platform",
            (self.platform_width, self.platform_height),
            (self.width, self.height),
        )?;
        self.lander_spawn
            .validate("lander", (0., 0.), (self.width, self.height))?;
        self.reward_policy.validate()?;
        self.terminal_rewards.validate()
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value <= 0. {
        return Err(ConfigError::NotPositive { name, value });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0. {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

pub(crate) fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn non_positive_arena() {
        let err = SimulationConfig::default()
            .with_arena(0., 600.)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { name: "width", .. }));

        let err = SimulationConfig::default()
            .with_arena(800., -1.)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { name: "height", .. }));
    }

    #[test]
    fn non_positive_max_speed() {
        assert!(SimulationConfig::default()
            .with_max_speed(0.)
            .validate()
            .is_err());
    }

    #[test]
    fn non_positive_landing_limits() {
        assert!(SimulationConfig::default()
            .with_landing_limits(0., 5.)
            .validate()
            .is_err());
        assert!(SimulationConfig::default()
            .with_landing_limits(40., -5.)
            .validate()
            .is_err());
    }

    #[test]
    fn nan_gravity() {
        let err = SimulationConfig::default()
            .with_gravity(f64::NAN)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFinite { name: "gravity", .. }));
    }

    #[test]
    fn platform_spawn_outside_arena() {
        let err = SimulationConfig::default()
            .with_arena(400., 300.)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SpawnOutOfArena {
                name: "platform",
                ..
            }
        ));
    }
}
