//! Behavior lifecycle: the trait, its run loop, the execution context
//! and the factory registry.

pub mod behavior;
pub mod info;
pub mod registry;
pub mod shutdown;

pub use behavior::{spawn_behavior, Behavior, DEFAULT_UPDATE_DELAY, MIN_UPDATE_DELAY};
pub use info::{BehaviorInfo, BehaviorMetrics, BehaviorState};
pub use registry::{create_behavior, register_behavior, registered_behaviors, BehaviorFactory};
pub use shutdown::Shutdown;
