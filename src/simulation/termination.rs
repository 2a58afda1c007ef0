use serde::Serialize;

use super::{EpisodeState, Rect, SimulationConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    Landed,
    /// Arena edge or ground.
    CrashedWall,
    /// Touched the platform too fast or too tilted.
    CrashedOnPlatform,
    TimedOut,
    Stalled,
}

impl Termination {
    pub fn is_crash(self) -> bool {
        matches!(self, Self::CrashedWall | Self::CrashedOnPlatform)
    }
}

/// Decides whether the tick that produced `current` ends the episode.
///
/// Rules are evaluated in a fixed order and the first match wins: arena
/// edge, platform contact, ground contact, stall timers, time limit.
#[derive(Debug, Clone)]
pub struct TerminationDetector {
    width: f64,
    height: f64,
    wall_crash: bool,
    lander_size: (f64, f64),
    max_landing_angle: f64,
    max_landing_speed: f64,
    low_speed_threshold: f64,
    max_stall_duration: f64,
    max_horizontal_stall_duration: f64,
    episode_time_limit: f64,
}

impl Default for TerminationDetector {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl TerminationDetector {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            wall_crash: config.wall_crash,
            lander_size: (config.lander_width, config.lander_height),
            max_landing_angle: config.max_landing_angle,
            max_landing_speed: config.max_landing_speed,
            low_speed_threshold: config.low_speed_threshold,
            max_stall_duration: config.max_stall_duration,
            max_horizontal_stall_duration: config.max_horizontal_stall_duration,
            episode_time_limit: config.episode_time_limit,
        }
    }

    pub fn with_wall_crash(self, wall_crash: bool) -> Self {
        Self { wall_crash, ..self }
    }

    /// Bounding box of the craft sprite rotated by `angle`, centred on the
    /// craft position.
    pub fn footprint(&self, state: &EpisodeState) -> Rect {
        let (width, height) = self.lander_size;
        let (sin, cos) = state.angle.to_radians().sin_cos();
        let (sin, cos) = (sin.abs(), cos.abs());
        Rect::from_center(
            state.position,
            width * cos + height * sin,
            width * sin + height * cos,
        )
    }

    /// Updates the stall timers of `current` and returns the outcome of the
    /// tick, if any.
    pub fn check(&self, previous: &EpisodeState, current: &mut EpisodeState) -> Option<Termination> {
        self.update_stall_timers(previous, current);

        if self.wall_crash && self.touches_edge(current) {
            return Some(Termination::CrashedWall);
        }

        let footprint = self.footprint(current);
        if footprint.overlaps(&current.platform) {
            return if current.angle.abs() < self.max_landing_angle
                && current.velocity.length() < self.max_landing_speed
            {
                Some(Termination::Landed)
            } else {
                Some(Termination::CrashedOnPlatform)
            };
        }

        if footprint.bottom() >= self.height {
            return Some(Termination::CrashedWall);
        }

        if self.stalled(current) {
            return Some(Termination::Stalled);
        }

        if current.elapsed_time > self.episode_time_limit {
            return Some(Termination::TimedOut);
        }

        None
    }

    fn touches_edge(&self, state: &EpisodeState) -> bool {
        let (x, y) = (state.position.x, state.position.y);
        x <= 0. || x >= self.width || y <= 0. || y >= self.height
    }

    fn update_stall_timers(&self, previous: &EpisodeState, current: &mut EpisodeState) {
        let now = current.elapsed_time;

        let speed = current.velocity.length();
        current.low_speed_start_time = if speed > 0. && speed < self.low_speed_threshold {
            current.low_speed_start_time.or(Some(now))
        } else {
            None
        };

        current.last_x_position = previous.position.x;
        current.stalled_x_start_time = if current.position.x == current.last_x_position {
            current.stalled_x_start_time.or(Some(now))
        } else {
            None
        };
    }

    fn stalled(&self, state: &EpisodeState) -> bool {
        let exceeded = |start: Option<f64>, limit: f64| {
            start.is_some_and(|start| state.elapsed_time - start > limit)
        };
        exceeded(state.low_speed_start_time, self.max_stall_duration)
            || exceeded(
                state.stalled_x_start_time,
                self.max_horizontal_stall_duration,
            )
    }
}

#[cfg(test)]
mod termination_tests {
    use super::*;
    use crate::simulation::Vec2;

    fn platform() -> Rect {
        Rect::new(350., 500., 100., 10.)
    }

    fn detector() -> TerminationDetector {
        TerminationDetector::from_config(
            &SimulationConfig::default()
                .with_lander_size(20., 40.)
                .with_low_speed_stall(0.5, 2.)
                .with_max_horizontal_stall_duration(4.)
                .with_episode_time_limit(10.),
        )
    }

    fn flying(x: f64, y: f64) -> EpisodeState {
        EpisodeState::new(Vec2::new(x, y), platform()).with_velocity(Vec2::new(1., 2.))
    }

    fn check(previous: &EpisodeState, mut current: EpisodeState) -> Option<Termination> {
        detector().check(previous, &mut current)
    }

    #[test]
    fn still_in_flight() {
        assert_eq!(check(&flying(99., 100.), flying(100., 102.)), None);
    }

    #[test]
    fn wall_crash() {
        assert_eq!(
            check(&flying(1., 100.), flying(0., 102.)),
            Some(Termination::CrashedWall)
        );
        assert_eq!(
            check(&flying(799., 100.), flying(800., 102.)),
            Some(Termination::CrashedWall)
        );
        assert_eq!(
            check(&flying(100., 1.), flying(101., 0.)),
            Some(Termination::CrashedWall)
        );
    }

    #[test]
    fn wall_crash_disabled() {
        let mut current = flying(0., 100.);
        assert_eq!(
            detector()
                .with_wall_crash(false)
                .check(&flying(1., 100.), &mut current),
            None
        );
    }

    #[test]
    fn landed() {
        let current = flying(400., 485.).with_velocity(Vec2::new(0., 3.));
        assert_eq!(
            check(&flying(400., 482.), current),
            Some(Termination::Landed)
        );
    }

    #[test]
    fn too_fast_on_platform() {
        let current = flying(400., 485.).with_velocity(Vec2::new(0., 5.));
        assert_eq!(
            check(&flying(400., 480.), current),
            Some(Termination::CrashedOnPlatform)
        );
    }

    #[test]
    fn too_tilted_on_platform() {
        let current = flying(400., 485.)
            .with_velocity(Vec2::new(0., 1.))
            .with_angle(-40.);
        assert_eq!(
            check(&flying(400., 484.), current),
            Some(Termination::CrashedOnPlatform)
        );
    }

    #[test]
    fn rotated_footprint_reaches_platform() {
        // upright the craft is 20 wide and misses, lying on its side it is 40 wide
        let upright = flying(335., 495.).with_velocity(Vec2::new(0., 1.));
        assert_eq!(check(&flying(335., 494.), upright.clone()), None);
        assert_eq!(
            check(&flying(335., 494.), upright.with_angle(90.)),
            Some(Termination::CrashedOnPlatform)
        );
    }

    #[test]
    fn ground_crash() {
        assert_eq!(
            check(&flying(100., 575.), flying(101., 580.)),
            Some(Termination::CrashedWall)
        );
    }

    #[test]
    fn ground_crash_without_wall_crash() {
        let mut current = flying(101., 580.);
        assert_eq!(
            detector()
                .with_wall_crash(false)
                .check(&flying(100., 575.), &mut current),
            Some(Termination::CrashedWall)
        );
    }

    #[test]
    fn edge_before_platform() {
        let platform = Rect::new(0., 590., 100., 10.);
        let current = flying(0., 580.)
            .with_platform(platform)
            .with_velocity(Vec2::new(0., 1.));
        assert_eq!(
            check(&flying(1., 579.).with_platform(platform), current),
            Some(Termination::CrashedWall)
        );
    }

    #[test]
    fn low_speed_stall_timer() {
        let detector = detector();
        let slow = Vec2::new(0.1, 0.1);
        let mut previous = flying(100., 100.).with_velocity(slow);
        // the timer starts at 0.5 and the limit is crossed strictly after 2.5
        for step in 1..=6 {
            let mut current = flying(100. + step as f64 * 0.1, 100.)
                .with_velocity(slow)
                .with_elapsed_time(step as f64 * 0.5);
            current.low_speed_start_time = previous.low_speed_start_time;
            let outcome = detector.check(&previous, &mut current);
            assert_eq!(current.low_speed_start_time, Some(0.5));
            if step < 6 {
                assert_eq!(outcome, None, "step {step}");
            } else {
                assert_eq!(outcome, Some(Termination::Stalled));
            }
            previous = current;
        }
    }

    #[test]
    fn low_speed_timer_resets() {
        let mut current = flying(101., 100.).with_velocity(Vec2::new(0., 3.));
        current.low_speed_start_time = Some(0.);
        detector().check(&flying(100., 100.), &mut current);
        assert_eq!(current.low_speed_start_time, None);
    }

    #[test]
    fn zero_speed_is_not_low_speed() {
        let mut current = flying(101., 100.).with_velocity(Vec2::ZERO);
        detector().check(&flying(100., 100.), &mut current);
        assert_eq!(current.low_speed_start_time, None);
    }

    #[test]
    fn horizontal_stall() {
        let previous = flying(100., 100.).with_elapsed_time(4.5);
        let mut current = flying(100., 104.).with_elapsed_time(5.);
        current.stalled_x_start_time = Some(0.5);
        assert_eq!(
            detector().check(&previous, &mut current),
            Some(Termination::Stalled)
        );

        let mut current = flying(100., 104.).with_elapsed_time(5.);
        current.stalled_x_start_time = Some(1.5);
        assert_eq!(detector().check(&previous, &mut current), None);
        assert_eq!(current.stalled_x_start_time, Some(1.5));
        assert_eq!(current.last_x_position, 100.);
    }

    #[test]
    fn horizontal_timer_resets_on_move() {
        let mut current = flying(100.5, 104.);
        current.stalled_x_start_time = Some(1.);
        detector().check(&flying(100., 100.), &mut current);
        assert_eq!(current.stalled_x_start_time, None);
    }

    #[test]
    fn timeout() {
        let current = flying(101., 100.).with_elapsed_time(10.01);
        assert_eq!(
            check(&flying(100., 100.), current),
            Some(Termination::TimedOut)
        );
        let current = flying(101., 100.).with_elapsed_time(10.);
        assert_eq!(check(&flying(100., 100.), current), None);
    }
}
