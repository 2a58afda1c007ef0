use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace};

use super::{
    encode, Action, EpisodeState, LandingMode, Observation, Physics, Rect, RewardShaper,
    SimulationConfig, Termination, TerminationDetector, Vec2,
};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Running,
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    /// Outcome of the tick. A checkpoint landing reports `Landed` with
    /// `done == false`.
    pub termination: Option<Termination>,
}

/// One lander episode behind a `reset` / `step` interface.
///
/// The only randomness is the spawn sampling, drawn from the environment's
/// own seeded generator.
pub struct Environment {
    config: SimulationConfig,
    physics: Physics,
    detector: TerminationDetector,
    shaper: RewardShaper,
    rng: StdRng,
    state: EpisodeState,
    stage: Stage,
}

enum Stage {
    Ready,
    Running,
    Terminal(StepResult),
}

impl Environment {
    pub fn try_new(config: SimulationConfig, seed: u64) -> Result<Self, Error> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: SimulationConfig, rng: StdRng) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            physics: Physics::from_config(&config),
            detector: TerminationDetector::from_config(&config),
            shaper: RewardShaper::from_config(&config),
            config,
            rng,
            state: EpisodeState::default(),
            stage: Stage::Ready,
        })
    }

    /// Starts a new episode. With a seed the generator is reseeded first, so
    /// equal seeds give equal spawns.
    pub fn reset(&mut self, seed: Option<u64>) -> Observation {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        let (position, platform) = self.spawn();
        self.state = EpisodeState::new(position, platform);
        self.stage = Stage::Running;
        debug!(?seed, ?position, ?platform, "Episode reset");
        encode(&self.state, &self.config)
    }

    pub fn step(&mut self, action: &Action) -> Result<StepResult, Error> {
        match &self.stage {
            Stage::Ready => return Err(Error::NotReset),
            Stage::Terminal(last_step) => return Ok(last_step.clone()),
            Stage::Running => {}
        }

        let previous = &self.state;
        let mut current = self.physics.iterate(previous.clone(), action);
        // a checkpoint landing is only reported on its own tick
        current.landed = false;
        current.termination = None;
        let termination = self.detector.check(previous, &mut current);
        let reward = self.shaper.shape(previous, &mut current, termination);
        current.cumulative_reward += reward;

        match termination {
            Some(Termination::Landed) if self.config.landing_mode == LandingMode::Respawn => {
                current.landed = true;
                current.landings += 1;
                current.termination = Some(Termination::Landed);
                let (position, platform) = self.spawn();
                current.respawn(position, platform);
                debug!(
                    landings = current.landings,
                    elapsed_time = current.elapsed_time,
                    "Checkpoint landing, lander respawned"
                );
            }
            Some(termination) => {
                current.done = true;
                current.landed = termination == Termination::Landed;
                if current.landed {
                    current.landings += 1;
                }
                current.termination = Some(termination);
                info!(
                    ?termination,
                    elapsed_time = current.elapsed_time,
                    cumulative_reward = current.cumulative_reward,
                    "Episode finished"
                );
            }
            None => {}
        }

        self.state = current;
        let result = StepResult {
            observation: encode(&self.state, &self.config),
            reward,
            done: self.state.done,
            termination,
        };
        trace!(?action, reward, position = ?self.state.position, "Step");
        if result.done {
            self.stage = Stage::Terminal(result.clone());
        }
        Ok(result)
    }

    fn spawn(&mut self) -> (Vec2, Rect) {
        let config = &self.config;
        let corner = config
            .platform_spawn
            .sample(&mut self.rng, (config.platform_width, config.platform_height));
        let platform = Rect::new(
            corner.x,
            corner.y,
            config.platform_width,
            config.platform_height,
        );
        let position = config.lander_spawn.sample(&mut self.rng, (0., 0.));
        (position, platform)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &EpisodeState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Ready => Phase::Ready,
            Stage::Running => Phase::Running,
            Stage::Terminal(_) => Phase::Terminal,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    pub fn angle(&self) -> f64 {
        self.state.angle
    }

    pub fn thrust_active(&self) -> bool {
        self.state.thrust_active
    }

    pub fn platform(&self) -> Rect {
        self.state.platform
    }

    /// Collision footprint of the craft, the rotated sprite bounds.
    pub fn footprint(&self) -> Rect {
        self.detector.footprint(&self.state)
    }

    pub fn elapsed_time(&self) -> f64 {
        self.state.elapsed_time
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.state.cumulative_reward
    }

    /// True once the episode ended with a landing, or on the tick of a
    /// checkpoint landing in [`LandingMode::Respawn`].
    pub fn landed(&self) -> bool {
        self.state.landed
    }

    pub fn crashed(&self) -> bool {
        self.state.done && self.state.termination.is_some_and(Termination::is_crash)
    }

    pub fn landings(&self) -> u32 {
        self.state.landings
    }

    pub fn last_termination(&self) -> Option<Termination> {
        self.state.termination
    }
}
