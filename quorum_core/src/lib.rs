//! # QUORUM Core
//!
//! The core runtime for the QUORUM behavior-based robot controller.
//!
//! QUORUM follows the DAMN (Distributed Architecture for Mobile
//! Navigation) scheme: behaviors never command the motors and never
//! suppress each other. Each behavior runs on its own thread and votes
//! for the motor commands it favors; one arbiter per actuator kind
//! (speed, turn, spin) tallies the votes every cycle and issues the
//! single command with the highest consensus. This crate provides:
//!
//! - **Behaviors**: the [`Behavior`] trait, its per-thread run loop and
//!   the name-keyed factory registry
//! - **Arbiters**: the generic voting/tally engine with its freeze
//!   protocol, plus the three actuator-specific tally strategies
//! - **Config**: TOML section/key settings with default substitution
//! - **Robot**: the actuator trait the arbiters drive
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use quorum_core::{Actuators, Config, Shutdown};
//!
//! let config = Config::from_file("quorum.toml").unwrap_or_default();
//! let behaviors = config.get_strings("app", "behaviors");
//! let actuators = Actuators::from_config(&config, &behaviors);
//!
//! // A behavior votes once per iteration, e.g.:
//! actuators.turn.vote("wanderer", actuators.turn.vote_centered_at(10.0));
//! # let _ = Shutdown::new();
//! ```

pub mod arbiter;
pub mod config;
pub mod core;
pub mod error;
pub mod robot;

// Re-export commonly used types for easy access
pub use arbiter::{
    spawn_arbiter, Actuators, Arbiter, Priorities, SharedRobot, SpeedArbiter, SpeedVote,
    SpinArbiter, SpinVote, Tally, TurnArbiter, TurnParams, TurnVote, VoteData,
};
pub use config::Config;
pub use core::{
    create_behavior, register_behavior, spawn_behavior, Behavior, BehaviorInfo, BehaviorState,
    Shutdown,
};
pub use error::{QuorumError, QuorumResult};
pub use robot::Robot;
