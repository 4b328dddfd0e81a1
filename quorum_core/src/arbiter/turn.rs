//! The turn arbiter: priority-weighted command fusion over a discrete
//! set of steering directions, with Gaussian smoothing.

use super::{arbiter_delay, Arbiter, Priorities, Tally, VoteData};
use crate::config::Config;
use crate::robot::Robot;
use std::collections::BTreeMap;

/// Vote values closer together than this are considered tied.
const VOTE_EPSILON: f32 = 1e-6;

/// The turn arbiter's configured candidate-direction set and smoothing
/// parameters.
///
/// Supported steering directions run from `-turn_max` to `+turn_max`
/// degrees in steps of `turn_step` (positive is left). All behaviors
/// voting with one turn arbiter share this direction set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnParams {
    pub turn_max: i32,
    pub turn_step: i32,
    pub smoothing_width: i32,
    pub sigma: f32,
}

impl TurnParams {
    /// Read the `[turn_arbiter]` section, clamping each knob to a
    /// usable range so a weird config cannot produce a degenerate
    /// direction set.
    pub fn from_config(config: &Config) -> Self {
        let turn_max = (config.get_i64("turn_arbiter", "turn_max", 20) as i32).clamp(5, 60);
        let turn_step =
            (config.get_i64("turn_arbiter", "turn_step", 1) as i32).clamp(1, turn_max / 2);
        let smoothing_width =
            (config.get_i64("turn_arbiter", "smoothing_width", 7) as i32).max(1);
        let sigma = config
            .get_f32("turn_arbiter", "smoothing_sigma", 1.0)
            .clamp(0.5, turn_max as f32 / 2.0);
        Self {
            turn_max,
            turn_step,
            smoothing_width,
            sigma,
        }
    }

    /// The supported directions, ascending. The step is floored to 1
    /// so a hand-built params value cannot produce a zero stride.
    pub fn directions(&self) -> Vec<i32> {
        let step = self.turn_step.max(1);
        let mut v: Vec<i32> = (-self.turn_max..=self.turn_max)
            .step_by(step as usize)
            .collect();
        // Integer stepping from -max can miss +max when max is not a
        // multiple of step; the set is defined symmetric.
        if *v.last().unwrap_or(&0) != self.turn_max {
            v.push(self.turn_max);
        }
        v
    }
}

impl Default for TurnParams {
    fn default() -> Self {
        Self {
            turn_max: 20,
            turn_step: 1,
            smoothing_width: 7,
            sigma: 1.0,
        }
    }
}

/// A vote over the arbiter's discrete steering directions.
///
/// Each direction carries a strength in [-1, +1]: -1 is strongly
/// against steering that way, +1 strongly for, 0 neutral.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnVote {
    votes: BTreeMap<i32, f32>,
}

impl TurnVote {
    /// A neutral (all-zero) vote over the params' direction set.
    pub fn neutral(params: &TurnParams) -> Self {
        let votes = params.directions().into_iter().map(|d| (d, 0.0)).collect();
        Self { votes }
    }

    /// A triangular profile peaking at +1 for the supported direction
    /// nearest `center`, falling off linearly by `step/max` per
    /// direction-step away, clamped to [-1, +1]. The standard way for
    /// a steering behavior to say "prefer angle C" without filling
    /// every bin by hand.
    pub fn centered_at(params: &TurnParams, center: f32) -> Self {
        let t = params.turn_max as f32;
        let votes = params
            .directions()
            .into_iter()
            .map(|d| (d, (1.0 - (d as f32 - center).abs() / t).clamp(-1.0, 1.0)))
            .collect();
        Self { votes }
    }

    /// Strength for the supported direction nearest `direction`.
    pub fn get(&self, direction: i32) -> f32 {
        self.votes[&self.nearest(direction)]
    }

    /// Set the strength for the supported direction nearest
    /// `direction`. Strengths are clamped to [-1, +1].
    pub fn set(&mut self, direction: i32, strength: f32) {
        let key = self.nearest(direction);
        self.votes.insert(key, strength.clamp(-1.0, 1.0));
    }

    /// Accumulate `other * weight` into this vote, bin by bin.
    pub fn add_scaled(&mut self, other: &TurnVote, weight: f32) {
        for (direction, strength) in &other.votes {
            *self.votes.entry(*direction).or_insert(0.0) += strength * weight;
        }
    }

    /// Gaussian-smooth across neighboring directions to suppress
    /// jitter between adjacent candidate angles. Window width is in
    /// direction-index space; the kernel distance is in degrees.
    pub fn smoothed(&self, params: &TurnParams) -> TurnVote {
        let v: Vec<(i32, f32)> = self.votes.iter().map(|(d, s)| (*d, *s)).collect();
        let n = v.len() as i32;
        let w = params.smoothing_width.clamp(1, n);
        let s2 = 2.0 * params.sigma * params.sigma;
        let scale = 1.0 / (2.506_628_f32 /* sqrt(2*pi) */ * params.sigma);

        let mut votes = BTreeMap::new();
        for i in 0..n {
            let mut sum = 0.0;
            for j in (i - w)..=(i + w) {
                if j < 0 || j >= n {
                    continue;
                }
                let d = (v[j as usize].0 - v[i as usize].0) as f32;
                sum += v[j as usize].1 * (-(d * d) / s2).exp() * scale;
            }
            votes.insert(v[i as usize].0, sum);
        }
        TurnVote { votes }
    }

    /// Linearly rescale all strengths into [-1, +1] using this cycle's
    /// observed min/max. If every direction carries the same value
    /// there is no information to rescale; the result is all-zero.
    pub fn normalized(&self) -> TurnVote {
        let min = self.votes.values().cloned().fold(f32::INFINITY, f32::min);
        let max = self
            .votes
            .values()
            .cloned()
            .fold(f32::NEG_INFINITY, f32::max);

        let votes = if (max - min).abs() <= VOTE_EPSILON {
            self.votes.keys().map(|d| (*d, 0.0)).collect()
        } else {
            self.votes
                .iter()
                .map(|(d, v)| (*d, 2.0 * (v - min) / (max - min) - 1.0))
                .collect()
        };
        TurnVote { votes }
    }

    /// The direction with the maximum strength. Ties break to the
    /// direction closest to straight ahead; a dead heat between a left
    /// and a right direction of equal magnitude goes left (positive).
    pub fn winner(&self) -> i32 {
        let mut best_d: i32 = 0;
        let mut best_v = f32::NEG_INFINITY;
        for (&d, &v) in &self.votes {
            let better = if v > best_v + VOTE_EPSILON {
                true
            } else if (v - best_v).abs() <= VOTE_EPSILON {
                d.abs() < best_d.abs() || (d.abs() == best_d.abs() && d > best_d)
            } else {
                false
            };
            if better {
                best_d = d;
                best_v = v;
            }
        }
        best_d
    }

    /// Direction/strength pairs, ascending by direction.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f32)> + '_ {
        self.votes.iter().map(|(d, s)| (*d, *s))
    }

    fn nearest(&self, direction: i32) -> i32 {
        *self
            .votes
            .keys()
            .min_by_key(|k| (*k - direction).abs())
            .unwrap_or(&0)
    }
}

/// Combines turn votes by priority-weighted summation, smooths the
/// result and issues the best-supported direction.
pub struct TurnTally {
    params: TurnParams,
}

impl TurnTally {
    pub fn new(params: TurnParams) -> Self {
        Self { params }
    }
}

impl Tally for TurnTally {
    type Vote = TurnVote;

    fn actuator(&self) -> &'static str {
        "turn"
    }

    fn motor_cmd(&self, votes: &[VoteData<TurnVote>], priorities: &Priorities, robot: &mut dyn Robot) {
        let mut result = TurnVote::neutral(&self.params);
        for vote in votes {
            result.add_scaled(&vote.vote, priorities.of(&vote.behavior));
        }
        let result = result.smoothed(&self.params).normalized();
        robot.turn(result.winner() as f32);
    }
}

/// The one tally authority for car-like steering.
pub type TurnArbiter = Arbiter<TurnTally>;

impl TurnArbiter {
    /// Build from the `[turn_arbiter]` config section; behavior
    /// priorities come from each behavior's own `turn_priority` key.
    pub fn from_config(config: &Config, behaviors: &[String]) -> Self {
        Arbiter::new(
            TurnTally::new(TurnParams::from_config(config)),
            arbiter_delay(config, "turn_arbiter"),
            Priorities::from_config(config, behaviors, "turn_priority"),
        )
    }

    /// The configured direction set and smoothing knobs.
    pub fn params(&self) -> &TurnParams {
        &self.tally.params
    }

    /// Convenience for behaviors: a triangular vote profile peaking at
    /// `center` over this arbiter's direction set.
    pub fn vote_centered_at(&self, center: f32) -> TurnVote {
        TurnVote::centered_at(&self.tally.params, center)
    }
}
