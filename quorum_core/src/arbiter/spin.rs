//! The spin arbiter: priority-weighted sum of in-place turn amounts.

use super::{arbiter_delay, Arbiter, Priorities, Tally, VoteData};
use crate::config::Config;
use crate::robot::Robot;

/// Largest in-place rotation a single command may ask for (degrees).
pub const MAX_SPIN: f32 = 360.0;

/// A behavior's request to rotate in place by some angle (degrees,
/// positive counterclockwise). Spin is continuous, so unlike turn
/// votes there is no discretization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinVote {
    pub angle: f32,
}

impl SpinVote {
    /// Clamps the requested angle to ±[`MAX_SPIN`].
    pub fn new(angle: f32) -> Self {
        Self {
            angle: angle.clamp(-MAX_SPIN, MAX_SPIN),
        }
    }
}

/// Combines spin votes as a priority-weighted sum, clamped so that no
/// coalition of voters can command more than a full rotation.
pub struct SpinTally;

impl Tally for SpinTally {
    type Vote = SpinVote;

    fn actuator(&self) -> &'static str {
        "spin"
    }

    fn motor_cmd(&self, votes: &[VoteData<SpinVote>], priorities: &Priorities, robot: &mut dyn Robot) {
        let mut result = 0.0;
        for vote in votes {
            result += vote.vote.angle * priorities.of(&vote.behavior);
        }
        robot.spin(result.clamp(-MAX_SPIN, MAX_SPIN));
    }
}

/// The one tally authority for in-place rotation.
pub type SpinArbiter = Arbiter<SpinTally>;

impl SpinArbiter {
    /// Build from the `[spin_arbiter]` config section; behavior
    /// priorities come from each behavior's own `spin_priority` key.
    pub fn from_config(config: &Config, behaviors: &[String]) -> Self {
        Arbiter::new(
            SpinTally,
            arbiter_delay(config, "spin_arbiter"),
            Priorities::from_config(config, behaviors, "spin_priority"),
        )
    }
}
