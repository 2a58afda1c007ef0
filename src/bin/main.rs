use clap::{Parser, ValueEnum};
use rand::{rngs::StdRng, Rng, SeedableRng};
use simulation::{
    init, Action, EpisodeHistory, EpisodeRunner, Error, NoObserver, Observation, Policy,
    SimulationConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyKind {
    /// Never touches the controls
    Idle,
    /// Keeps the nose up and brakes the descent
    Hover,
    /// Presses random buttons
    Random,
}

#[derive(Parser, Debug)]
#[command(version, about = "Runs lander episodes with a built-in policy")]
struct Cli {
    /// JSON configuration file, defaults are used when absent
    #[arg(long)]
    config: Option<String>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 1)]
    episodes: u64,

    #[arg(long, value_enum, default_value_t = PolicyKind::Hover)]
    policy: PolicyKind,

    /// Stop an episode after this many steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// Print the trajectory of the first episode
    #[arg(long)]
    history: bool,
}

struct BuiltinPolicy {
    kind: PolicyKind,
    rng: StdRng,
}

impl Policy for BuiltinPolicy {
    fn act(&mut self, observation: &Observation) -> Result<Action, Error> {
        let [_, _, _, vy, angle, dx, _] = *observation;
        Ok(match self.kind {
            PolicyKind::Idle => Action::IDLE,
            PolicyKind::Hover => {
                // lean slightly towards the platform, thrust while sinking fast
                let target_angle = (-dx * 90.).clamp(-20., 20.) / 360.;
                Action::from_rotation(target_angle - angle, vy > 0.3)
            }
            PolicyKind::Random => Action::new(self.rng.gen(), self.rng.gen(), self.rng.gen()),
        })
    }
}

/// Seed of the `episode`-th run, wrapping around at `u64::MAX`.
fn episode_seed(seed: u64, episode: u64) -> u64 {
    seed.wrapping_add(episode)
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => init::json::parse_config(path).map_err(|e| e.to_string())?,
        None => SimulationConfig::default(),
    };

    let mut runner = EpisodeRunner::try_from_config(config, cli.seed).map_err(|e| e.to_string())?;
    if let Some(max_steps) = cli.max_steps {
        runner = runner.with_max_steps(max_steps);
    }
    let mut policy = BuiltinPolicy {
        kind: cli.policy,
        rng: StdRng::seed_from_u64(cli.seed),
    };

    for episode in 0..cli.episodes {
        let seed = Some(episode_seed(cli.seed, episode));
        let summary = if episode == 0 && cli.history {
            let mut history = EpisodeHistory::default();
            let summary = runner
                .run_episode(seed, &mut policy, &mut history)
                .map_err(|e| e.to_string())?;
            println!("{}", history.pretty_to_string());
            summary
        } else {
            runner
                .run_episode(seed, &mut policy, &mut NoObserver)
                .map_err(|e| e.to_string())?
        };
        println!(
            "{}",
            serde_json::to_string(&summary).map_err(|e| e.to_string())?
        );
    }
    Ok(())
}
