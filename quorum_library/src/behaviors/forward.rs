//! The forward behavior: keep the robot cruising.

use quorum_core::{Actuators, Behavior, BehaviorInfo, Config, SpeedVote};
use std::time::Duration;

/// Votes a steady cruising speed and a straight-ahead steering
/// preference every iteration. On its own this just drives the robot
/// forward; under arbitration it is the low-priority "default plan"
/// that avoidance behaviors out-vote when something gets close.
pub struct Forward {
    actuators: Actuators,
    cruising_speed: f32,
    cruising_pwm: i32,
    update_delay: Duration,
}

impl Forward {
    pub const NAME: &'static str = "forward";

    pub fn new(config: &Config, actuators: &Actuators) -> Self {
        let cruising_speed = config
            .get_f32(Self::NAME, "cruising_speed", 0.4)
            .clamp(0.1, 2.0);
        let cruising_pwm = (config.get_i64(Self::NAME, "cruising_pwm", 35) as i32).clamp(10, 100);
        let update_delay = config
            .get_i64(Self::NAME, "update_delay", 250)
            .clamp(1, 10_000) as u64;
        Self {
            actuators: actuators.clone(),
            cruising_speed,
            cruising_pwm,
            update_delay: Duration::from_millis(update_delay),
        }
    }
}

impl Behavior for Forward {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn update_delay(&self) -> Duration {
        self.update_delay
    }

    fn action(&mut self, info: &mut BehaviorInfo) {
        self.actuators
            .speed
            .vote(Self::NAME, SpeedVote::new(self.cruising_speed, self.cruising_pwm));
        self.actuators
            .turn
            .vote(Self::NAME, self.actuators.turn.vote_centered_at(0.0));
        info.record_vote();
    }
}
