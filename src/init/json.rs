use std::{fs::File, io::Read, path::Path};

use json::{self, JsonValue};

use crate::error::{ConfigError, Error};
use crate::simulation::*;

macro_rules! override_json {
    ($target:expr, $json:ident, $($key:literal),+ => $func:ident) => {{
        let value = &$json$([$key])+;
        if !value.is_null() {
            $target = value
                .$func()
                .ok_or_else(|| invalid(concat!($("/", $key),+), stringify!($func)))?;
        }
    }};
}

fn invalid(key: &str, expected: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        reason: format!("expected a value readable with {expected}"),
    }
}

/// Reads a JSON configuration file. Missing keys keep their default value.
pub fn parse_config<P: AsRef<Path>>(config_file_path: P) -> Result<SimulationConfig, Error> {
    let config_file_path = config_file_path.as_ref();
    let mut file_content = String::new();
    File::open(config_file_path)
        .and_then(|mut file| file.read_to_string(&mut file_content))
        .map_err(|source| Error::Io {
            path: config_file_path.display().to_string(),
            source,
        })?;
    Ok(parse_config_from_string(&file_content)?)
}

pub fn parse_config_from_string(content: &str) -> Result<SimulationConfig, ConfigError> {
    let json = json::parse(content).map_err(|e| ConfigError::Json(e.to_string()))?;
    let mut config = SimulationConfig::default();

    override_json!(config.width, json, "Arena", "Width" => as_f64);
    override_json!(config.height, json, "Arena", "Height" => as_f64);

    override_json!(config.gravity, json, "Physics", "Gravity" => as_f64);
    override_json!(config.thrust, json, "Physics", "Thrust" => as_f64);
    override_json!(config.rotation_speed, json, "Physics", "RotationSpeed" => as_f64);
    override_json!(config.max_speed, json, "Physics", "MaxSpeed" => as_f64);
    override_json!(config.tick_duration, json, "Physics", "TickDuration" => as_f64);

    override_json!(config.max_landing_angle, json, "Landing", "MaxAngle" => as_f64);
    override_json!(config.max_landing_speed, json, "Landing", "MaxSpeed" => as_f64);
    let mode = &json["Landing"]["Mode"];
    if !mode.is_null() {
        config.landing_mode = match mode.as_str() {
            Some("Terminate") => LandingMode::Terminate,
            Some("Respawn") => LandingMode::Respawn,
            _ => return Err(invalid("/Landing/Mode", "\"Terminate\" or \"Respawn\"")),
        };
    }

    override_json!(config.low_speed_threshold, json, "Stall", "LowSpeedThreshold" => as_f64);
    override_json!(config.max_stall_duration, json, "Stall", "MaxDuration" => as_f64);
    override_json!(
        config.max_horizontal_stall_duration,
        json,
        "Stall",
        "MaxHorizontalDuration" => as_f64
    );
    override_json!(config.episode_time_limit, json, "EpisodeTimeLimit" => as_f64);

    override_json!(config.platform_width, json, "Platform", "Width" => as_f64);
    override_json!(config.platform_height, json, "Platform", "Height" => as_f64);
    if let Some(spawn) = parse_spawn(&json["Platform"]["Spawn"], "/Platform/Spawn")? {
        config.platform_spawn = spawn;
    }

    override_json!(config.lander_width, json, "Lander", "Width" => as_f64);
    override_json!(config.lander_height, json, "Lander", "Height" => as_f64);
    if let Some(spawn) = parse_spawn(&json["Lander"]["Spawn"], "/Lander/Spawn")? {
        config.lander_spawn = spawn;
    }

    override_json!(config.wall_crash, json, "Walls", "Crash" => as_bool);
    override_json!(config.wall_bounce, json, "Walls", "Bounce" => as_bool);

    config.reward_policy = parse_reward_policy(&json["Reward"])?;
    config.terminal_rewards = parse_terminal_rewards(&json["Reward"]["Terminal"])?;
    override_json!(
        config.terminal_rewards.replaces_step,
        json,
        "Reward",
        "TerminalReplacesStep" => as_bool
    );

    config.validate()?;
    Ok(config)
}

fn parse_spawn(json: &JsonValue, key: &str) -> Result<Option<SpawnPolicy>, ConfigError> {
    if json.is_null() {
        return Ok(None);
    }
    let number = |name: &str| {
        json[name]
            .as_f64()
            .ok_or_else(|| invalid(&format!("{key}/{name}"), "as_f64"))
    };
    let spawn = match json["Type"].as_str() {
        Some("Fixed") => SpawnPolicy::Fixed {
            x: number("X")?,
            y: number("Y")?,
        },
        Some("RandomInBox") => SpawnPolicy::RandomInBox {
            left: number("Left")?,
            top: number("Top")?,
            right: number("Right")?,
            bottom: number("Bottom")?,
        },
        Some("RandomOnLine") => SpawnPolicy::RandomOnLine {
            y: number("Y")?,
            left: number("Left")?,
            right: number("Right")?,
        },
        _ => {
            return Err(invalid(
                &format!("{key}/Type"),
                "\"Fixed\", \"RandomInBox\" or \"RandomOnLine\"",
            ))
        }
    };
    Ok(Some(spawn))
}

fn parse_reward_policy(json: &JsonValue) -> Result<RewardPolicy, ConfigError> {
    let mut weights = match json["Policy"].as_str() {
        None if !json["Policy"].is_null() => return Err(invalid("/Reward/Policy", "as_str")),
        None | Some("Shaped") => ShapingWeights::default(),
        Some("DistanceDelta") => ShapingWeights::distance_delta(),
        Some("NegativeDistance") => {
            let mut scale = 1000.;
            override_json!(scale, json, "Scale" => as_f64);
            return Ok(RewardPolicy::NegativeDistance { scale });
        }
        Some(_) => {
            return Err(invalid(
                "/Reward/Policy",
                "\"Shaped\", \"DistanceDelta\" or \"NegativeDistance\"",
            ))
        }
    };
    // explicit weights refine the preset
    override_json!(weights.step, json, "Step" => as_f64);
    override_json!(weights.x_approach, json, "XApproach" => as_f64);
    override_json!(weights.y_approach, json, "YApproach" => as_f64);
    override_json!(weights.drift_penalty, json, "DriftPenalty" => as_f64);
    override_json!(weights.drift_x_tolerance, json, "DriftXTolerance" => as_f64);
    override_json!(weights.drift_y_threshold, json, "DriftYThreshold" => as_f64);
    override_json!(weights.upright, json, "Upright" => as_f64);
    override_json!(weights.distance, json, "Distance" => as_f64);
    Ok(RewardPolicy::Shaped(weights))
}

fn parse_terminal_rewards(json: &JsonValue) -> Result<TerminalRewards, ConfigError> {
    let mut rewards = TerminalRewards::default();
    override_json!(rewards.landed, json, "Landed" => as_f64);
    override_json!(rewards.checkpoint, json, "Checkpoint" => as_f64);
    override_json!(rewards.crashed_on_platform, json, "CrashedOnPlatform" => as_f64);
    override_json!(rewards.crashed_wall, json, "CrashedWall" => as_f64);
    override_json!(rewards.stalled, json, "Stalled" => as_f64);
    override_json!(rewards.timed_out, json, "TimedOut" => as_f64);
    Ok(rewards)
}
