use serde::Serialize;
use tracing::debug;

use crate::simulation::*;
use crate::Error;

/// Decision function mapping an observation to an action.
pub trait Policy {
    fn act(&mut self, observation: &Observation) -> Result<Action, Error>;
}

impl<F> Policy for F
where
    F: FnMut(&Observation) -> Result<Action, Error>,
{
    fn act(&mut self, observation: &Observation) -> Result<Action, Error> {
        self(observation)
    }
}

/// Read-only hook run after `reset` and after every step, e.g. a renderer.
pub trait StepObserver {
    fn on_reset(&mut self, _environment: &Environment) {}
    fn on_step(&mut self, environment: &Environment, result: &StepResult);
}

/// Observer that does nothing.
pub struct NoObserver;

impl StepObserver for NoObserver {
    fn on_step(&mut self, _: &Environment, _: &StepResult) {}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub fitness: f64,
    pub steps: usize,
    pub termination: Option<Termination>,
    pub landings: u32,
    pub elapsed_time: f64,
}

pub struct EpisodeRunner {
    environment: Environment,
    max_steps: Option<usize>,
}

impl EpisodeRunner {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            max_steps: None,
        }
    }

    pub fn try_from_config(config: SimulationConfig, seed: u64) -> Result<Self, Error> {
        Ok(Self::new(Environment::try_new(config, seed)?))
    }

    /// Stops an episode after `max_steps` steps even if it is not done.
    pub fn with_max_steps(self, max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
            ..self
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn run_episode(
        &mut self,
        seed: Option<u64>,
        policy: &mut impl Policy,
        observer: &mut impl StepObserver,
    ) -> Result<EpisodeSummary, Error> {
        let mut observation = self.environment.reset(seed);
        observer.on_reset(&self.environment);

        let mut steps = 0;
        while self.max_steps.map_or(true, |max_steps| steps < max_steps) {
            let action = policy.act(&observation)?;
            let result = self.environment.step(&action)?;
            steps += 1;
            observer.on_step(&self.environment, &result);
            observation = result.observation;
            if result.done {
                break;
            }
        }

        let state = self.environment.state();
        let summary = EpisodeSummary {
            fitness: state.cumulative_reward,
            steps,
            // a checkpoint landing alone does not finish the episode
            termination: if state.done { state.termination } else { None },
            landings: state.landings,
            elapsed_time: state.elapsed_time,
        };
        debug!(?summary, "Episode evaluated");
        Ok(summary)
    }

    /// Fitness of every policy, each run from the same seeded spawn.
    pub fn evaluate_population<P: Policy>(
        &mut self,
        policies: &mut [P],
        seed: u64,
    ) -> Result<Vec<f64>, Error> {
        policies
            .iter_mut()
            .enumerate()
            .map(|(id, policy)| {
                let summary = self.run_episode(Some(seed), policy, &mut NoObserver)?;
                debug!(id, fitness = summary.fitness, "Policy evaluated");
                Ok(summary.fitness)
            })
            .collect()
    }
}

/// Trajectory recorder, column per quantity.
#[derive(Clone, Debug, Default, Serialize)]
pub struct EpisodeHistory {
    x: Vec<f64>,
    y: Vec<f64>,
    vx: Vec<f64>,
    vy: Vec<f64>,
    angle: Vec<f64>,
    thrust: Vec<bool>,
    reward: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f64,
    pub thrust: bool,
    pub reward: f64,
}

impl EpisodeHistory {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn append(&mut self, state: &EpisodeState, reward: f64) {
        self.x.push(state.position.x);
        self.y.push(state.position.y);
        self.vx.push(state.velocity.x);
        self.vy.push(state.velocity.y);
        self.angle.push(state.angle);
        self.thrust.push(state.thrust_active);
        self.reward.push(reward);
    }

    pub fn iter_history(&self) -> impl Iterator<Item = HistoryEntry> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.vx)
            .zip(&self.vy)
            .zip(&self.angle)
            .zip(&self.thrust)
            .zip(&self.reward)
            .map(
                |((((((x, y), vx), vy), angle), thrust), reward)| HistoryEntry {
                    position: Vec2::new(*x, *y),
                    velocity: Vec2::new(*vx, *vy),
                    angle: *angle,
                    thrust: *thrust,
                    reward: *reward,
                },
            )
    }

    pub fn pretty_to_string(&self) -> String {
        self.iter_history().fold(
            format!(
                "{:>8} {:>8} {:>8} {:>8} {:>8} {:>7} {:>10}",
                "X", "Y", "VX", "VY", "ANGLE", "THRUST", "REWARD"
            ),
            |out,
             HistoryEntry {
                 position,
                 velocity,
                 angle,
                 thrust,
                 reward,
             }| {
                out + &format!(
                    "\n{:8.2} {:8.2} {:8.2} {:8.2} {:8.1} {:>7} {:10.3}",
                    position.x, position.y, velocity.x, velocity.y, angle, thrust, reward
                )
            },
        )
    }
}

impl StepObserver for EpisodeHistory {
    fn on_reset(&mut self, environment: &Environment) {
        *self = Self::default();
        self.append(environment.state(), 0.);
    }

    fn on_step(&mut self, environment: &Environment, result: &StepResult) {
        self.append(environment.state(), result.reward);
    }
}
