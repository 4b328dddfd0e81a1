//! The speed arbiter: winner-take-all by behavior priority.

use super::{arbiter_delay, Arbiter, Priorities, Tally, VoteData};
use crate::config::Config;
use crate::robot::Robot;

/// A behavior's speed recommendation: a top speed in m/s plus the
/// open-loop PWM duty to use on platforms without an RPM sensor.
/// All speed-voting behaviors should fill in both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedVote {
    pub max_speed: f32,
    pub pwm: i32,
}

impl SpeedVote {
    pub fn new(max_speed: f32, pwm: i32) -> Self {
        Self { max_speed, pwm }
    }

    /// A full stop.
    pub fn stop() -> Self {
        Self::new(0.0, 0)
    }
}

/// Rosenblatt's DAMN speed arbiter picks the minimum speed that
/// satisfies every behavior. Here we instead issue the drive command
/// of the highest-priority voter: speed is a safety-relevant scalar,
/// and blending (or min-ing) the requests of, say, an extricate
/// behavior and an always-stop behavior produces a command neither of
/// them intended. Ties go to the first vote seen, which is stable for
/// a given arrival order.
pub struct SpeedTally;

impl Tally for SpeedTally {
    type Vote = SpeedVote;

    fn actuator(&self) -> &'static str {
        "speed"
    }

    fn motor_cmd(&self, votes: &[VoteData<SpeedVote>], priorities: &Priorities, robot: &mut dyn Robot) {
        // The engine never passes an empty snapshot, but the method is
        // public; an empty slice issues nothing rather than panicking.
        let Some(mut winner) = votes.first() else {
            return;
        };
        let mut winner_priority = priorities.of(&winner.behavior);
        for vote in &votes[1..] {
            let p = priorities.of(&vote.behavior);
            if p > winner_priority {
                winner = vote;
                winner_priority = p;
            }
        }
        robot.drive(winner.vote.max_speed, winner.vote.pwm);
    }
}

/// The one tally authority for the drive actuator.
pub type SpeedArbiter = Arbiter<SpeedTally>;

impl SpeedArbiter {
    /// Build from the `[speed_arbiter]` config section; behavior
    /// priorities come from each behavior's own `speed_priority` key.
    pub fn from_config(config: &Config, behaviors: &[String]) -> Self {
        Arbiter::new(
            SpeedTally,
            arbiter_delay(config, "speed_arbiter"),
            Priorities::from_config(config, behaviors, "speed_priority"),
        )
    }
}
