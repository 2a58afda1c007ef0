use super::{EpisodeState, LandingMode, SimulationConfig, Termination};
use crate::error::ConfigError;

/// Coefficients of the per-step shaped reward.
///
/// `step + x_approach * dx + y_approach * dy - drift? + upright * cos(angle)
///  - distance * (dist_x + dist_y)` where `dx`/`dy` are the reductions of the
/// axis distances to the platform centre since the previous step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapingWeights {
    pub step: f64,
    pub x_approach: f64,
    pub y_approach: f64,
    /// Subtracted when the craft moves vertically without approaching
    /// horizontally.
    pub drift_penalty: f64,
    pub drift_x_tolerance: f64,
    pub drift_y_threshold: f64,
    pub upright: f64,
    pub distance: f64,
}

impl Default for ShapingWeights {
    fn default() -> Self {
        Self {
            step: 1.,
            x_approach: 2.,
            y_approach: 1.,
            drift_penalty: 1.,
            drift_x_tolerance: 0.1,
            drift_y_threshold: 0.1,
            upright: 0.2,
            distance: 0.01,
        }
    }
}

impl ShapingWeights {
    /// Approach reward only, without survival bonus or static terms.
    pub fn distance_delta() -> Self {
        Self {
            step: 0.,
            drift_penalty: 0.,
            upright: 0.,
            distance: 0.,
            ..Self::default()
        }
    }

    pub fn with_step(self, step: f64) -> Self {
        Self { step, ..self }
    }
}

/// Bonuses and penalties added on the tick an outcome happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalRewards {
    pub landed: f64,
    /// Landing in [`LandingMode::Respawn`].
    pub checkpoint: f64,
    pub crashed_on_platform: f64,
    pub crashed_wall: f64,
    pub stalled: f64,
    pub timed_out: f64,
    /// When set, a terminal tick yields the terminal value alone instead of
    /// adding it to the step reward.
    pub replaces_step: bool,
}

impl Default for TerminalRewards {
    fn default() -> Self {
        Self {
            landed: 1000.,
            checkpoint: 100.,
            crashed_on_platform: -1000. + 200.,
            crashed_wall: -1000.,
            stalled: -100.,
            timed_out: -50.,
            replaces_step: false,
        }
    }
}

impl TerminalRewards {
    pub fn low_stakes() -> Self {
        Self {
            crashed_wall: -100.,
            ..Self::default()
        }
    }

    pub fn with_crashed_wall(self, crashed_wall: f64) -> Self {
        Self {
            crashed_wall,
            ..self
        }
    }

    pub fn with_replaces_step(self, replaces_step: bool) -> Self {
        Self {
            replaces_step,
            ..self
        }
    }

    pub fn reward(&self, termination: Termination, landing_mode: LandingMode) -> f64 {
        match (termination, landing_mode) {
            (Termination::Landed, LandingMode::Terminate) => self.landed,
            (Termination::Landed, LandingMode::Respawn) => self.checkpoint,
            (Termination::CrashedOnPlatform, _) => self.crashed_on_platform,
            (Termination::CrashedWall, _) => self.crashed_wall,
            (Termination::Stalled, _) => self.stalled,
            (Termination::TimedOut, _) => self.timed_out,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("landed", self.landed),
            ("checkpoint", self.checkpoint),
            ("crashed_on_platform", self.crashed_on_platform),
            ("crashed_wall", self.crashed_wall),
            ("stalled", self.stalled),
            ("timed_out", self.timed_out),
        ] {
            super::config::finite(name, value)?;
        }
        Ok(())
    }
}

/// Per-step reward formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RewardPolicy {
    Shaped(ShapingWeights),
    /// `-|platform centre - craft| / scale` every step.
    NegativeDistance { scale: f64 },
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::Shaped(ShapingWeights::default())
    }
}

impl RewardPolicy {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Shaped(w) => [
                ("step", w.step),
                ("x_approach", w.x_approach),
                ("y_approach", w.y_approach),
                ("drift_penalty", w.drift_penalty),
                ("drift_x_tolerance", w.drift_x_tolerance),
                ("drift_y_threshold", w.drift_y_threshold),
                ("upright", w.upright),
                ("distance", w.distance),
            ]
            .into_iter()
            .try_for_each(|(name, value)| super::config::finite(name, value)),
            Self::NegativeDistance { scale } => {
                super::config::finite("scale", *scale)?;
                if *scale <= 0. {
                    return Err(ConfigError::NotPositive {
                        name: "scale",
                        value: *scale,
                    });
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RewardShaper {
    policy: RewardPolicy,
    terminal: TerminalRewards,
    landing_mode: LandingMode,
}

impl Default for RewardShaper {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl RewardShaper {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            policy: config.reward_policy,
            terminal: config.terminal_rewards,
            landing_mode: config.landing_mode,
        }
    }

    pub fn with_policy(self, policy: RewardPolicy) -> Self {
        Self { policy, ..self }
    }

    /// Reward of the tick from `previous` to `current`. Records the current
    /// platform distances in `current` for the next tick.
    pub fn shape(
        &self,
        previous: &EpisodeState,
        current: &mut EpisodeState,
        termination: Option<Termination>,
    ) -> f64 {
        let (distance_x, distance_y) = current.platform_distance();

        let step_reward = match self.policy {
            RewardPolicy::Shaped(weights) => {
                shaped(&weights, previous, current.angle, (distance_x, distance_y))
            }
            RewardPolicy::NegativeDistance { scale } => -distance_x.hypot(distance_y) / scale,
        };

        current.previous_distance_x = Some(distance_x);
        current.previous_distance_y = Some(distance_y);

        match termination {
            Some(termination) if self.terminal.replaces_step => {
                self.terminal.reward(termination, self.landing_mode)
            }
            Some(termination) => {
                step_reward + self.terminal.reward(termination, self.landing_mode)
            }
            None => step_reward,
        }
    }
}

fn shaped(
    weights: &ShapingWeights,
    previous: &EpisodeState,
    angle: f64,
    (distance_x, distance_y): (f64, f64),
) -> f64 {
    let mut reward = weights.step;

    if let (Some(previous_x), Some(previous_y)) =
        (previous.previous_distance_x, previous.previous_distance_y)
    {
        let (delta_x, delta_y) = (previous_x - distance_x, previous_y - distance_y);
        reward += weights.x_approach * delta_x + weights.y_approach * delta_y;
        if delta_x.abs() < weights.drift_x_tolerance && delta_y.abs() > weights.drift_y_threshold
        {
            reward -= weights.drift_penalty;
        }
    }

    reward += weights.upright * angle.to_radians().cos();
    reward -= weights.distance * (distance_x + distance_y);
    reward
}

#[cfg(test)]
mod reward_tests {
    use super::*;
    use crate::simulation::{Rect, Vec2};

    fn assert_feq(left: f64, right: f64) {
        if (left - right).abs() > 1e-9 {
            panic!("Float equal assertion failed, {left} != {right}");
        }
    }

    // platform centre at (400, 500)
    fn at(x: f64, y: f64) -> EpisodeState {
        EpisodeState::new(Vec2::new(x, y), Rect::new(350., 495., 100., 10.))
    }

    fn recorded(x: f64, y: f64) -> EpisodeState {
        let mut state = at(x, y);
        let (dx, dy) = state.platform_distance();
        state.previous_distance_x = Some(dx);
        state.previous_distance_y = Some(dy);
        state
    }

    #[test]
    fn first_step_has_no_approach_term() {
        let mut current = at(300., 400.);
        let reward = RewardShaper::default().shape(&at(300., 400.), &mut current, None);
        // 1 + 0.2 * cos(0) - 0.01 * (100 + 100)
        assert_feq(reward, 1. + 0.2 - 2.);
        assert_eq!(current.previous_distance_x, Some(100.));
        assert_eq!(current.previous_distance_y, Some(100.));
    }

    #[test]
    fn approach_term() {
        let mut current = at(305., 405.);
        let reward = RewardShaper::default().shape(&recorded(300., 400.), &mut current, None);
        // 1 + 2 * 5 + 1 * 5 + 0.2 - 0.01 * 190
        assert_feq(reward, 1. + 10. + 5. + 0.2 - 1.9);
    }

    #[test]
    fn vertical_drift_penalty() {
        let mut current = at(300., 405.);
        let reward = RewardShaper::default().shape(&recorded(300., 400.), &mut current, None);
        // 1 + 0 + 5 - 1 + 0.2 - 0.01 * 195
        assert_feq(reward, 1. + 5. - 1. + 0.2 - 1.95);
    }

    #[test]
    fn upright_bonus_sign() {
        let shaper = RewardShaper::default().with_policy(RewardPolicy::Shaped(ShapingWeights {
            step: 0.,
            distance: 0.,
            ..ShapingWeights::default()
        }));
        let mut upright = at(300., 400.);
        assert_feq(shaper.shape(&at(300., 400.), &mut upright, None), 0.2);
        let mut inverted = at(300., 400.).with_angle(180.);
        assert_feq(shaper.shape(&at(300., 400.), &mut inverted, None), -0.2);
    }

    #[test]
    fn terminal_rewards() {
        let shaper = RewardShaper::default().with_policy(RewardPolicy::Shaped(ShapingWeights {
            step: 0.,
            upright: 0.,
            distance: 0.,
            ..ShapingWeights::default()
        }));
        let reward = |termination| {
            let mut current = at(300., 400.);
            shaper.shape(&at(300., 400.), &mut current, Some(termination))
        };
        assert_feq(reward(Termination::Landed), 1000.);
        assert_feq(reward(Termination::CrashedOnPlatform), -800.);
        assert_feq(reward(Termination::CrashedWall), -1000.);
        assert_feq(reward(Termination::Stalled), -100.);
        assert_feq(reward(Termination::TimedOut), -50.);
    }

    #[test]
    fn checkpoint_landing() {
        let config = SimulationConfig::default().with_landing_mode(LandingMode::Respawn);
        let rewards = TerminalRewards::default();
        assert_feq(rewards.reward(Termination::Landed, config.landing_mode), 100.);
        assert_feq(
            TerminalRewards::low_stakes().reward(Termination::CrashedWall, config.landing_mode),
            -100.,
        );
        assert_eq!(
            TerminalRewards::default().with_crashed_wall(-100.),
            TerminalRewards::low_stakes()
        );
    }

    #[test]
    fn terminal_value_replaces_step_reward() {
        let shaper = RewardShaper::from_config(
            &SimulationConfig::default()
                .with_reward_policy(RewardPolicy::NegativeDistance { scale: 1000. })
                .with_terminal_rewards(TerminalRewards::low_stakes().with_replaces_step(true)),
        );
        let reward = |termination| {
            let mut current = at(100., 100.);
            shaper.shape(&at(100., 100.), &mut current, termination)
        };
        assert_eq!(reward(Some(Termination::Landed)), 1000.);
        assert_eq!(reward(Some(Termination::CrashedWall)), -100.);
        assert_feq(reward(None), -0.5);
    }

    #[test]
    fn negative_distance_policy() {
        let shaper = RewardShaper::default()
            .with_policy(RewardPolicy::NegativeDistance { scale: 1000. });
        let mut current = at(100., 100.);
        // distance (300, 400)
        assert_feq(shaper.shape(&at(100., 100.), &mut current, None), -0.5);
    }

    #[test]
    fn distance_delta_policy() {
        let shaper =
            RewardShaper::default().with_policy(RewardPolicy::Shaped(ShapingWeights::distance_delta()));
        let mut current = at(290., 395.);
        assert_feq(shaper.shape(&recorded(300., 400.), &mut current, None), -20. - 5.);
    }

    #[test]
    fn approaching_is_positive_retreating_is_negative() {
        let shaper = RewardShaper::default();

        let mut previous = at(100., 100.);
        let mut approaching = 0.;
        for step in 1..=40 {
            let mut current = at(100. + 5. * step as f64, 100. + 5. * step as f64);
            approaching += shaper.shape(&previous, &mut current, None);
            previous = current;
        }
        assert!(approaching > 0., "{approaching}");

        let mut previous = at(300., 300.);
        let mut retreating = 0.;
        for step in 1..=40 {
            let mut current = at(300. - 5. * step as f64, 300. - 5. * step as f64);
            retreating += shaper.shape(&previous, &mut current, None);
            previous = current;
        }
        assert!(retreating < 0., "{retreating}");
    }

    #[test]
    fn invalid_policy() {
        assert!(RewardPolicy::NegativeDistance { scale: 0. }
            .validate()
            .is_err());
        assert!(RewardPolicy::Shaped(ShapingWeights::default().with_step(f64::INFINITY))
            .validate()
            .is_err());
    }
}
