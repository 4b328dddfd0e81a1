//! The extricate behavior: get the robot unstuck when the danger zone
//! has been penetrated.

use crate::sensors::{Reading, SharedDangerZone};
use quorum_core::{Actuators, Behavior, BehaviorInfo, Config, SpeedVote, SpinVote};
use std::time::Duration;

/// A 2D force accumulator for the range readings.
#[derive(Debug, Clone, Copy, Default)]
struct Vec2 {
    x: f32,
    y: f32,
}

impl Vec2 {
    fn add_scaled(&mut self, angle_deg: f32, magnitude: f32) {
        let angle = angle_deg.to_radians();
        self.x += magnitude * angle.cos();
        self.y += magnitude * angle.sin();
    }

    fn heading_deg(&self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }

    fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Drives the robot out of tight spots with a potential-field scheme:
/// every reading inside the danger zone contributes a repulsive force
/// and every reading outside it an attractive one, and the combined
/// vector picks the escape heading.
///
/// While an extrication is in progress the behavior freezes the speed
/// arbiter at its own (high) priority, so lower-priority cruising
/// cannot water down the escape command mid-maneuver; the freeze is
/// released as soon as the danger zone reads clear.
pub struct Extricate {
    actuators: Actuators,
    danger_zone: SharedDangerZone,
    extricate_speed: f32,
    extricate_pwm: i32,
    spin_style_steering: bool,
    update_delay: Duration,
}

impl Extricate {
    pub const NAME: &'static str = "extricate";

    pub fn new(config: &Config, actuators: &Actuators, danger_zone: SharedDangerZone) -> Self {
        let extricate_speed = config
            .get_f32(Self::NAME, "extricate_speed", 0.15)
            .clamp(0.1, 0.75);
        let extricate_pwm = (config.get_i64(Self::NAME, "extricate_pwm", 25) as i32).clamp(10, 50);
        let spin_style_steering = config.get_bool(Self::NAME, "spin_style_steering", false);
        let update_delay = config
            .get_i64(Self::NAME, "update_delay", 500)
            .clamp(100, 10_000) as u64;
        Self {
            actuators: actuators.clone(),
            danger_zone,
            extricate_speed,
            extricate_pwm,
            spin_style_steering,
            update_delay: Duration::from_millis(update_delay),
        }
    }

    /// Total force over the scan. Readings inside the danger distance
    /// repel (error squared, to make up for their small magnitudes
    /// relative to far-away attractive readings); readings outside it
    /// attract.
    fn escape_heading(readings: &[Reading], danger_distance: f32) -> Option<f32> {
        let mut force = Vec2::default();
        for reading in readings {
            if !reading.is_valid() {
                continue;
            }
            let error = reading.distance - danger_distance;
            if error < 0.0 {
                force.add_scaled(reading.angle as f32, -(error * error));
            } else {
                force.add_scaled(reading.angle as f32, error);
            }
        }
        if force.is_zero() {
            None
        } else {
            Some(force.heading_deg())
        }
    }
}

impl Behavior for Extricate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn update_delay(&self) -> Duration {
        self.update_delay
    }

    fn action(&mut self, info: &mut BehaviorInfo) {
        // Copy the scan out so the update lock is not held while the
        // force field is evaluated.
        let (penetrated, readings, danger_distance) = {
            let zone = self.danger_zone.read();
            (
                zone.penetrated(),
                zone.readings().to_vec(),
                zone.distance(),
            )
        };

        if !penetrated {
            if self.actuators.speed.is_frozen(Self::NAME) {
                self.actuators.speed.unfreeze(Self::NAME);
                info.log_info("danger zone clear, releasing speed arbiter");
            }
            return;
        }

        let heading = match Self::escape_heading(&readings, danger_distance) {
            Some(heading) => heading,
            None => return, // no usable readings this cycle
        };

        if !self.actuators.speed.freeze(Self::NAME) {
            // Someone higher up holds the freeze; leave the escape to
            // them and try again next cycle.
            info.log_debug("speed arbiter frozen by another behavior");
            return;
        }

        if self.spin_style_steering {
            self.actuators.speed.vote(Self::NAME, SpeedVote::stop());
            self.actuators.spin.vote(Self::NAME, SpinVote::new(heading));
        } else {
            self.actuators
                .speed
                .vote(Self::NAME, SpeedVote::new(self.extricate_speed, self.extricate_pwm));
            self.actuators
                .turn
                .vote(Self::NAME, self.actuators.turn.vote_centered_at(heading));
        }
        info.record_vote();
    }

    fn post_run(&mut self, _info: &mut BehaviorInfo) {
        // Never leave the arbiter frozen across shutdown.
        self.actuators.speed.unfreeze(Self::NAME);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::DangerZone;
    use approx::assert_relative_eq;
    use parking_lot::RwLock;
    use quorum_core::Robot;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingRobot {
        drives: Vec<(f32, i32)>,
        turns: Vec<f32>,
        spins: Vec<f32>,
    }

    impl Robot for RecordingRobot {
        fn drive(&mut self, speed: f32, pwm: i32) {
            self.drives.push((speed, pwm));
        }
        fn turn(&mut self, direction: f32) {
            self.turns.push(direction);
        }
        fn spin(&mut self, angle: f32) {
            self.spins.push(angle);
        }
        fn off(&mut self) {}
    }

    const CONFIG: &str = r#"
        [extricate]
        speed_priority = 3.0
        turn_priority = 3.0
        spin_priority = 3.0

        [forward]
        speed_priority = 1.0
    "#;

    fn setup(readings: Vec<Reading>) -> (Actuators, Extricate) {
        let cfg = Config::from_str(CONFIG).unwrap();
        let names = vec![Extricate::NAME.to_string(), "forward".to_string()];
        let actuators = Actuators::from_config(&cfg, &names);

        let mut zone = DangerZone::new(0.3, 1);
        zone.update(readings);
        let zone = Arc::new(RwLock::new(zone));
        let extricate = Extricate::new(&cfg, &actuators, zone);
        (actuators, extricate)
    }

    #[test]
    fn test_escape_heading_points_away_from_obstacle() {
        // Obstacle close on the right (-30 deg), open space to the
        // left: the force field should steer left (positive).
        let readings = vec![
            Reading::new(-30, 0.1),
            Reading::new(0, 1.0),
            Reading::new(30, 2.0),
        ];
        let heading = Extricate::escape_heading(&readings, 0.3).unwrap();
        assert!(heading > 0.0, "heading was {}", heading);
    }

    #[test]
    fn test_escape_heading_none_without_valid_readings() {
        let readings = vec![Reading::new(0, -1.0)];
        assert!(Extricate::escape_heading(&readings, 0.3).is_none());
    }

    #[test]
    fn test_extrication_freezes_out_lower_priority_cruise() {
        let readings = vec![Reading::new(-30, 0.1), Reading::new(30, 2.0)];
        let (actuators, mut extricate) = setup(readings);
        let mut info = BehaviorInfo::new(Extricate::NAME, false);

        extricate.action(&mut info);
        assert!(actuators.speed.is_frozen(Extricate::NAME));

        // A cruise vote from the lower-priority forward behavior is
        // excluded by the freeze.
        actuators.speed.vote("forward", SpeedVote::new(0.9, 90));

        let mut robot = RecordingRobot::default();
        assert!(actuators.speed.tally_once(&mut robot));
        assert_eq!(robot.drives.len(), 1);
        assert_relative_eq!(robot.drives[0].0, 0.15);
        assert_eq!(robot.drives[0].1, 25);
    }

    #[test]
    fn test_freeze_released_when_zone_clears() {
        let readings = vec![Reading::new(-30, 0.1), Reading::new(30, 2.0)];
        let (actuators, mut extricate) = setup(readings);
        let mut info = BehaviorInfo::new(Extricate::NAME, false);

        extricate.action(&mut info);
        assert!(actuators.speed.is_frozen(Extricate::NAME));

        // Zone clears; next iteration releases the freeze.
        extricate.danger_zone.write().update(vec![Reading::new(0, 2.0)]);
        extricate.action(&mut info);
        assert!(!actuators.speed.is_frozen(Extricate::NAME));
    }

    #[test]
    fn test_spin_style_steering_stops_and_spins() {
        let cfg = Config::from_str(
            "[extricate]\nspin_style_steering = true\nspeed_priority = 3.0\nspin_priority = 3.0\n",
        )
        .unwrap();
        let names = vec![Extricate::NAME.to_string()];
        let actuators = Actuators::from_config(&cfg, &names);

        let mut zone = DangerZone::new(0.3, 1);
        zone.update(vec![Reading::new(-30, 0.1), Reading::new(30, 2.0)]);
        let mut extricate = Extricate::new(&cfg, &actuators, Arc::new(RwLock::new(zone)));

        let mut info = BehaviorInfo::new(Extricate::NAME, false);
        extricate.action(&mut info);

        let mut robot = RecordingRobot::default();
        assert!(actuators.speed.tally_once(&mut robot));
        assert!(actuators.spin.tally_once(&mut robot));
        assert_eq!(robot.drives, vec![(0.0, 0)]);
        assert_eq!(robot.spins.len(), 1);
        assert!(robot.spins[0] > 0.0);
        assert!(robot.turns.is_empty());
    }
}
