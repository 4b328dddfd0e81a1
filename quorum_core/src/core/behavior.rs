//! The behavior trait and its per-thread run loop.

use super::info::{BehaviorInfo, BehaviorState};
use super::shutdown::Shutdown;
use crate::error::QuorumResult;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Floor applied to every behavior's update delay. The delay comes
/// from the config file, so a zero or negative setting must not be
/// allowed to turn a behavior into a busy loop.
pub const MIN_UPDATE_DELAY: Duration = Duration::from_millis(1);

/// Default iteration period when a behavior does not override
/// `update_delay()`.
pub const DEFAULT_UPDATE_DELAY: Duration = Duration::from_millis(500);

/// An independently scheduled sensorimotor control strategy.
///
/// A behavior never commands the motors directly; it casts votes with
/// whichever arbiters it holds a handle to, once per iteration. Each
/// behavior runs on its own thread; `action()` is the body of one
/// iteration, not a loop; the surrounding loop (shutdown polling,
/// sleeping, metrics) is provided by [`spawn_behavior`].
///
/// `action()` must not assume exclusive access to shared sensor state:
/// anything refreshed by the sensor thread is read under the shared
/// side of the update lock.
pub trait Behavior: Send {
    /// The behavior's name, fixed at construction. Used as the config
    /// section name, the vote signature and the thread name.
    fn name(&self) -> &'static str;

    /// Interval between iterations. Implementations typically read
    /// this from their config section and clamp it to something sane;
    /// the run loop additionally enforces [`MIN_UPDATE_DELAY`].
    fn update_delay(&self) -> Duration {
        DEFAULT_UPDATE_DELAY
    }

    /// Called once on the behavior's thread before the first
    /// iteration. Default is a no-op.
    fn pre_run(&mut self, _info: &mut BehaviorInfo) {}

    /// One iteration of the behavior's sense/vote logic.
    fn action(&mut self, info: &mut BehaviorInfo);

    /// Called once after the loop exits, for cleanup. Default is a
    /// no-op.
    fn post_run(&mut self, _info: &mut BehaviorInfo) {}
}

/// Spawn a behavior onto its own thread and drive its iteration loop
/// until `shutdown` is signalled.
///
/// A panic inside `action()` is caught: the behavior transitions to
/// `Crashed`, its loop ends, and the rest of the controller keeps
/// running without its votes. `post_run()` still runs so the behavior
/// can release anything it holds (votes pending, an arbiter freeze).
pub fn spawn_behavior(
    mut behavior: Box<dyn Behavior>,
    shutdown: Shutdown,
    logging: bool,
) -> QuorumResult<JoinHandle<()>> {
    let name = behavior.name();
    let handle = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let mut info = BehaviorInfo::new(name, logging);
            let delay = behavior.update_delay().max(MIN_UPDATE_DELAY);

            info.set_state(BehaviorState::Running);
            behavior.pre_run(&mut info);
            info.log_info(&format!(
                "behavior started (period {} ms)",
                delay.as_millis()
            ));

            while !shutdown.in_progress() {
                info.start_tick();
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    behavior.action(&mut info)
                }));
                if let Err(panic_err) = result {
                    let msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                        format!("action panicked: {}", s)
                    } else if let Some(s) = panic_err.downcast_ref::<String>() {
                        format!("action panicked: {}", s)
                    } else {
                        "action panicked with unknown error".to_string()
                    };
                    info.transition_to_crashed(msg);
                    break;
                }
                info.record_tick();
                thread::sleep(delay);
            }

            let crashed = matches!(info.state(), BehaviorState::Crashed(_));
            if !crashed {
                info.set_state(BehaviorState::Stopping);
            }
            behavior.post_run(&mut info);
            if !crashed {
                info.set_state(BehaviorState::Stopped);
                info.log_info(&format!(
                    "behavior stopped after {} ticks",
                    info.metrics().total_ticks
                ));
            }
        })?;
    Ok(handle)
}
