//! The DAMN-style arbitration engine.
//!
//! Behaviors do not command the motors directly and do not suppress
//! each other. Instead they vote for candidate motor commands, and one
//! arbiter per actuator (speed, turn, spin) tallies the votes on a
//! fixed cycle and issues the single winning command. This module owns
//! the generic engine (vote inbox, priority table, freeze state
//! machine, tally loop) and delegates the actual vote combination to
//! the per-actuator [`Tally`] strategies.

pub mod speed;
pub mod spin;
pub mod turn;

pub use speed::{SpeedArbiter, SpeedTally, SpeedVote};
pub use spin::{SpinArbiter, SpinTally, SpinVote};
pub use turn::{TurnArbiter, TurnParams, TurnTally, TurnVote};

use crate::config::Config;
use crate::core::info::{BehaviorInfo, BehaviorState};
use crate::core::shutdown::Shutdown;
use crate::error::QuorumResult;
use crate::robot::Robot;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Arbiter update delays are clamped to this range (milliseconds).
/// The delay is a config-sourced value, so a bizarre setting must not
/// be able to wedge or busy-spin the tally loop.
pub const MIN_ARBITER_DELAY_MS: i64 = 1;
pub const MAX_ARBITER_DELAY_MS: i64 = 1000;

/// A robot handle shareable between the three arbiter threads.
pub type SharedRobot = Arc<Mutex<dyn Robot>>;

/// Normalized behavior priority table for one arbiter.
///
/// Raw priorities come from the config file on an arbitrary positive
/// scale; each is divided by the sum of all raw priorities registered
/// with the arbiter, so the normalized values sum to 1.0. A behavior
/// the arbiter was never configured with has priority 0.0.
#[derive(Debug, Clone, Default)]
pub struct Priorities {
    map: HashMap<String, f32>,
}

impl Priorities {
    /// Normalize a set of raw priorities. Negative raw values are
    /// taken by magnitude; if the sum is zero every priority is 0.0.
    pub fn new(raw: &[(String, f32)]) -> Self {
        let sum: f32 = raw.iter().map(|(_, p)| p.abs()).sum();
        let mut map = HashMap::with_capacity(raw.len());
        for (name, p) in raw {
            let normalized = if sum > 0.0 { p.abs() / sum } else { 0.0 };
            map.insert(name.clone(), normalized);
        }
        Self { map }
    }

    /// Read each behavior's `key` from its own config section and
    /// normalize the results.
    pub fn from_config(config: &Config, behaviors: &[String], key: &str) -> Self {
        let raw: Vec<(String, f32)> = behaviors
            .iter()
            .map(|name| (name.clone(), config.get_f32(name, key, 0.0)))
            .collect();
        Self::new(&raw)
    }

    /// The normalized priority of `behavior` (0.0 if unknown).
    pub fn of(&self, behavior: &str) -> f32 {
        self.map.get(behavior).copied().unwrap_or(0.0)
    }
}

/// One vote plus its metadata, as stored in the arbiter's inbox.
/// Tally strategies treat this as read-only.
#[derive(Debug)]
pub struct VoteData<V> {
    pub behavior: String,
    pub cast_at: Instant,
    pub vote: V,
}

/// The arbiter's freeze state.
///
/// At most one behavior holds the freeze at a time. While frozen, the
/// tally step ignores votes from any behavior whose priority is
/// strictly below the freeze threshold (the holder's own priority).
#[derive(Debug, Clone, PartialEq)]
enum FreezeState {
    Unfrozen,
    Frozen { holder: String, threshold: f32 },
}

/// Per-actuator vote combination strategy.
///
/// The engine hands each strategy the post-freeze-filter snapshot of
/// one cycle's votes; the strategy computes the winning command and
/// issues it to the robot. The snapshot is never empty: the engine
/// skips the call entirely on empty cycles so the previous actuator
/// state is retained.
pub trait Tally: Send + Sync + 'static {
    /// The vote payload this actuator understands. Casting the wrong
    /// payload at an arbiter is a compile error, not a runtime one.
    type Vote: Send + 'static;

    /// Actuator name, used for thread naming and logging.
    fn actuator(&self) -> &'static str;

    /// Combine one cycle's votes into a single motor command and issue
    /// it.
    fn motor_cmd(&self, votes: &[VoteData<Self::Vote>], priorities: &Priorities, robot: &mut dyn Robot);
}

/// The generic arbitration engine: one instance per actuator kind.
///
/// `vote()` may be called concurrently from many behavior threads; it
/// only ever holds the inbox mutex long enough to push one entry. The
/// tally loop likewise holds it only long enough to swap the inbox out
/// against an empty one, so tally duration never blocks voting; votes
/// cast while a tally is in flight simply land in the next cycle.
pub struct Arbiter<S: Tally> {
    tally: S,
    update_delay: Duration,
    priorities: Priorities,
    inbox: Mutex<Vec<VoteData<S::Vote>>>,
    freeze: Mutex<FreezeState>,
}

impl<S: Tally> Arbiter<S> {
    pub fn new(tally: S, update_delay: Duration, priorities: Priorities) -> Self {
        Self {
            tally,
            update_delay,
            priorities,
            inbox: Mutex::new(Vec::new()),
            freeze: Mutex::new(FreezeState::Unfrozen),
        }
    }

    /// The tally cycle period.
    pub fn update_delay(&self) -> Duration {
        self.update_delay
    }

    /// The actuator this arbiter controls.
    pub fn actuator(&self) -> &'static str {
        self.tally.actuator()
    }

    /// The named behavior's normalized priority with this arbiter.
    pub fn priority(&self, behavior: &str) -> f32 {
        self.priorities.of(behavior)
    }

    /// Cast a vote. Ownership of the vote passes to the arbiter; it is
    /// tallied (at most) once, on the next cycle, then dropped. A
    /// behavior must vote every cycle it wishes to influence the
    /// outcome.
    pub fn vote(&self, behavior: &str, vote: S::Vote) {
        let mut inbox = self
            .inbox
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inbox.push(VoteData {
            behavior: behavior.to_string(),
            cast_at: Instant::now(),
            vote,
        });
    }

    /// Freeze the arbiter at the named behavior's priority. While
    /// frozen, votes from behaviors with strictly lower priority are
    /// ignored.
    ///
    /// First writer wins: if a different behavior already holds the
    /// freeze, the request is rejected and `false` is returned.
    /// Re-freezing by the current holder is an accepted no-op.
    pub fn freeze(&self, behavior: &str) -> bool {
        let mut freeze = self
            .freeze
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match &*freeze {
            FreezeState::Unfrozen => {
                *freeze = FreezeState::Frozen {
                    holder: behavior.to_string(),
                    threshold: self.priorities.of(behavior),
                };
                true
            }
            FreezeState::Frozen { holder, .. } => holder == behavior,
        }
    }

    /// Release the freeze, but only if `behavior` is the current
    /// holder. Anyone else's unfreeze is silently ignored, so an
    /// unrelated behavior can never release someone else's freeze.
    pub fn unfreeze(&self, behavior: &str) {
        let mut freeze = self
            .freeze
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let FreezeState::Frozen { holder, .. } = &*freeze {
            if holder == behavior {
                *freeze = FreezeState::Unfrozen;
            }
        }
    }

    /// Whether the named behavior currently holds the freeze.
    pub fn is_frozen(&self, behavior: &str) -> bool {
        let freeze = self
            .freeze
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        matches!(&*freeze, FreezeState::Frozen { holder, .. } if holder == behavior)
    }

    /// Run one tally cycle: snapshot and clear the inbox, apply the
    /// freeze filter, and hand the surviving votes to the strategy.
    ///
    /// Returns `true` if a command was issued. An empty (post-filter)
    /// cycle issues nothing: absence of votes retains the previous
    /// actuator state rather than coasting to some default.
    pub fn tally_once(&self, robot: &mut dyn Robot) -> bool {
        // Swap, don't drain in place: the mutex is held only for the
        // pointer exchange, so voters are never blocked on a tally.
        let mut snapshot = {
            let mut inbox = self
                .inbox
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *inbox)
        };

        let threshold = {
            let freeze = self
                .freeze
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match &*freeze {
                FreezeState::Unfrozen => None,
                FreezeState::Frozen { threshold, .. } => Some(*threshold),
            }
        };
        if let Some(threshold) = threshold {
            snapshot.retain(|v| self.priorities.of(&v.behavior) >= threshold);
        }

        if snapshot.is_empty() {
            return false;
        }
        self.tally.motor_cmd(&snapshot, &self.priorities, robot);
        true
    }

    /// The arbiter's main loop: tally, issue, sleep, repeat until
    /// shutdown. Runs on the calling thread; see [`spawn_arbiter`].
    pub fn run(&self, robot: &SharedRobot, shutdown: &Shutdown, logging: bool) {
        let mut info = BehaviorInfo::new(format!("{}_arbiter", self.actuator()), logging);
        info.set_state(BehaviorState::Running);
        info.log_info(&format!(
            "arbiter started (period {} ms)",
            self.update_delay.as_millis()
        ));

        while !shutdown.in_progress() {
            info.start_tick();
            {
                let mut robot = robot
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                self.tally_once(&mut *robot);
            }
            info.record_tick();
            thread::sleep(self.update_delay);
        }

        info.set_state(BehaviorState::Stopped);
        info.log_info(&format!(
            "arbiter stopped after {} cycles",
            info.metrics().total_ticks
        ));
    }
}

/// Spawn an arbiter's tally loop onto its own named thread.
pub fn spawn_arbiter<S: Tally>(
    arbiter: Arc<Arbiter<S>>,
    robot: SharedRobot,
    shutdown: Shutdown,
    logging: bool,
) -> QuorumResult<JoinHandle<()>> {
    let name = format!("{}_arbiter", arbiter.actuator());
    let handle = thread::Builder::new()
        .name(name)
        .spawn(move || arbiter.run(&robot, &shutdown, logging))?;
    Ok(handle)
}

/// The per-actuator tally authorities, built once at startup and
/// handed to every behavior that needs to vote.
///
/// This is the process-wide "exactly one arbiter per actuator kind"
/// context: behaviors receive it by reference at construction and keep
/// whichever `Arc`s they vote with, which also makes it trivial to
/// hand a behavior a test double of the set.
#[derive(Clone)]
pub struct Actuators {
    pub speed: Arc<SpeedArbiter>,
    pub turn: Arc<TurnArbiter>,
    pub spin: Arc<SpinArbiter>,
}

impl Actuators {
    /// Build all three arbiters from the config file. `behaviors` is
    /// the active behavior roster whose priorities get normalized into
    /// each arbiter's table.
    pub fn from_config(config: &Config, behaviors: &[String]) -> Self {
        Self {
            speed: Arc::new(SpeedArbiter::from_config(config, behaviors)),
            turn: Arc::new(TurnArbiter::from_config(config, behaviors)),
            spin: Arc::new(SpinArbiter::from_config(config, behaviors)),
        }
    }

    /// Spawn the three tally loops.
    pub fn spawn_all(
        &self,
        robot: &SharedRobot,
        shutdown: &Shutdown,
        logging: bool,
    ) -> QuorumResult<Vec<JoinHandle<()>>> {
        Ok(vec![
            spawn_arbiter(self.speed.clone(), robot.clone(), shutdown.clone(), logging)?,
            spawn_arbiter(self.turn.clone(), robot.clone(), shutdown.clone(), logging)?,
            spawn_arbiter(self.spin.clone(), robot.clone(), shutdown.clone(), logging)?,
        ])
    }
}

/// Read an arbiter's update delay from its config section, clamped to
/// the safe range.
pub(crate) fn arbiter_delay(config: &Config, section: &str) -> Duration {
    let ms = config
        .get_i64(section, "update_delay", 500)
        .clamp(MIN_ARBITER_DELAY_MS, MAX_ARBITER_DELAY_MS);
    Duration::from_millis(ms as u64)
}
