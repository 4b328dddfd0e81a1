//! The emergency stop behavior: stop when the danger zone is
//! penetrated.

use crate::sensors::SharedDangerZone;
use quorum_core::{Actuators, Behavior, BehaviorInfo, Config, SpeedArbiter, SpeedVote};
use std::sync::Arc;
use std::time::Duration;

/// Monitors the danger zone and votes a full stop whenever something
/// has gotten too close. It casts no vote at all while the zone is
/// clear, so it exerts no influence on normal driving.
pub struct EmergencyStop {
    speed: Arc<SpeedArbiter>,
    danger_zone: SharedDangerZone,
    update_delay: Duration,
    was_stopping: bool,
}

impl EmergencyStop {
    pub const NAME: &'static str = "emergency_stop";

    pub fn new(config: &Config, actuators: &Actuators, danger_zone: SharedDangerZone) -> Self {
        let update_delay = config
            .get_i64(Self::NAME, "update_delay", 75)
            .clamp(1, 1000) as u64;
        Self {
            speed: actuators.speed.clone(),
            danger_zone,
            update_delay: Duration::from_millis(update_delay),
            was_stopping: false,
        }
    }
}

impl Behavior for EmergencyStop {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn update_delay(&self) -> Duration {
        self.update_delay
    }

    fn action(&mut self, info: &mut BehaviorInfo) {
        // Hold the read lock only long enough to sample the flag.
        let penetrated = self.danger_zone.read().penetrated();

        if penetrated {
            self.speed.vote(Self::NAME, SpeedVote::stop());
            info.record_vote();
            if !self.was_stopping {
                info.log_warning("danger zone penetrated, voting full stop");
            }
        } else if self.was_stopping {
            info.log_info("danger zone clear");
        }
        self.was_stopping = penetrated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{DangerZone, Reading};
    use parking_lot::RwLock;
    use quorum_core::Robot;

    #[derive(Default)]
    struct RecordingRobot {
        drives: Vec<(f32, i32)>,
    }

    impl Robot for RecordingRobot {
        fn drive(&mut self, speed: f32, pwm: i32) {
            self.drives.push((speed, pwm));
        }
        fn turn(&mut self, _direction: f32) {}
        fn spin(&mut self, _angle: f32) {}
        fn off(&mut self) {}
    }

    fn setup(penetrated: bool) -> (Actuators, EmergencyStop) {
        let cfg = Config::from_str("[emergency_stop]\nspeed_priority = 4.0\n").unwrap();
        let actuators = Actuators::from_config(&cfg, &[EmergencyStop::NAME.to_string()]);

        let mut zone = DangerZone::new(0.3, 1);
        if penetrated {
            zone.update(vec![Reading::new(0, 0.1)]);
        }
        let zone = Arc::new(RwLock::new(zone));
        let stop = EmergencyStop::new(&cfg, &actuators, zone);
        (actuators, stop)
    }

    #[test]
    fn test_votes_stop_when_penetrated() {
        let (actuators, mut stop) = setup(true);
        let mut info = BehaviorInfo::new(EmergencyStop::NAME, false);
        stop.action(&mut info);

        let mut robot = RecordingRobot::default();
        assert!(actuators.speed.tally_once(&mut robot));
        assert_eq!(robot.drives, vec![(0.0, 0)]);
    }

    #[test]
    fn test_silent_while_clear() {
        let (actuators, mut stop) = setup(false);
        let mut info = BehaviorInfo::new(EmergencyStop::NAME, false);
        stop.action(&mut info);

        let mut robot = RecordingRobot::default();
        // No vote cast: the arbiter has nothing to issue.
        assert!(!actuators.speed.tally_once(&mut robot));
        assert!(robot.drives.is_empty());
    }
}
