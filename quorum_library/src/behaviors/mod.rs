//! Reusable standard behaviors.
//!
//! Each behavior is a self-contained voter: it reads its parameters
//! from its own config section, takes the arbiter handles (and, where
//! relevant, the shared danger zone) at construction, and casts votes
//! from its `action`. None of them touch the motors directly.

pub mod emergency_stop;
pub mod extricate;
pub mod forward;

pub use emergency_stop::EmergencyStop;
pub use extricate::Extricate;
pub use forward::Forward;
