//! # Quorum Standard Library
//!
//! Reusable behaviors and sensor models for the `quorum_core`
//! behavior-arbitration engine.
//!
//! ## Structure
//!
//! ```text
//! quorum_library/
//! ── sensors/        # Danger zone model fed by a range sensor
//! ── behaviors/      # Standard voting behaviors
//! ── apps/           # Complete demo applications (wander)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quorum_core::{Actuators, Config, create_behavior};
//! use quorum_library::{register_standard_behaviors, shared_danger_zone};
//!
//! let config = Config::from_file("quorum.toml")?;
//! let behaviors = vec!["forward".into(), "emergency_stop".into(), "extricate".into()];
//! let actuators = Actuators::from_config(&config, &behaviors);
//!
//! let zone = shared_danger_zone(&config);
//! register_standard_behaviors(&zone);
//!
//! for name in &behaviors {
//!     let behavior = create_behavior(name, &config, &actuators)?;
//!     // spawn_behavior(behavior, shutdown.clone(), true)?;
//! }
//! ```

pub mod behaviors;
pub mod sensors;

pub use behaviors::{EmergencyStop, Extricate, Forward};
pub use sensors::{shared_danger_zone, DangerZone, Reading, SharedDangerZone};

use quorum_core::register_behavior;

/// Register factories for all standard behaviors. The factories
/// capture clones of the danger zone handle, so every behavior built
/// through the registry observes the same sensor state.
pub fn register_standard_behaviors(zone: &SharedDangerZone) {
    register_behavior(Forward::NAME, |config, actuators| {
        Box::new(Forward::new(config, actuators))
    });

    let stop_zone = zone.clone();
    register_behavior(EmergencyStop::NAME, move |config, actuators| {
        Box::new(EmergencyStop::new(config, actuators, stop_zone.clone()))
    });

    let extricate_zone = zone.clone();
    register_behavior(Extricate::NAME, move |config, actuators| {
        Box::new(Extricate::new(config, actuators, extricate_zone.clone()))
    });
}
