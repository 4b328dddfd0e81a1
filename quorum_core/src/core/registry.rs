//! Central registry of behavior factories.
//!
//! Each reusable behavior registers a constructor under its string
//! name; the application then instantiates whatever its config file's
//! behavior list names. Registration is explicit at startup (a library
//! exposes one `register_*` call) rather than hidden in static
//! initializers. Factories may be closures so they can capture shared
//! resources such as sensor handles.

use super::behavior::Behavior;
use crate::arbiter::Actuators;
use crate::config::Config;
use crate::error::{QuorumError, QuorumResult};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Constructor signature: build a behavior from its config section and
/// the arbiter handles it will vote with.
pub type BehaviorFactory = Arc<dyn Fn(&Config, &Actuators) -> Box<dyn Behavior> + Send + Sync>;

// BTreeMap so registered_behaviors() lists names deterministically.
static REGISTRY: Lazy<Mutex<BTreeMap<&'static str, BehaviorFactory>>> =
    Lazy::new(|| Mutex::new(BTreeMap::new()));

/// Register (or replace) the factory for `name`.
pub fn register_behavior<F>(name: &'static str, factory: F)
where
    F: Fn(&Config, &Actuators) -> Box<dyn Behavior> + Send + Sync + 'static,
{
    let mut registry = REGISTRY
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.insert(name, Arc::new(factory));
}

/// Instantiate the behavior registered under `name`.
pub fn create_behavior(
    name: &str,
    config: &Config,
    actuators: &Actuators,
) -> QuorumResult<Box<dyn Behavior>> {
    // Clone the factory out so user code never runs under the
    // registry lock.
    let factory = {
        let registry = REGISTRY
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registry.get(name).cloned()
    };
    match factory {
        Some(factory) => Ok(factory(config, actuators)),
        None => Err(QuorumError::UnknownBehavior(name.to_string())),
    }
}

/// Names with a registered factory, sorted.
pub fn registered_behaviors() -> Vec<&'static str> {
    REGISTRY
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .keys()
        .copied()
        .collect()
}
