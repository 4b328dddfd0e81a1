//! Shared sensor state consumed by the standard behaviors.
//!
//! The danger zone divides the range sensor's field of view into
//! per-angle distance readings and flags when too many of them fall
//! inside a configured danger distance. One sensor thread refreshes
//! the zone holding the write side of the update lock; behaviors take
//! the read side, copy what they need, and release: classic
//! single-writer/multi-reader.

use parking_lot::RwLock;
use quorum_core::Config;
use std::sync::Arc;

/// One range reading: an angle (degrees, 0 is straight ahead,
/// positive left) and a distance (meters). A negative distance marks a
/// bad reading and is ignored by consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub angle: i32,
    pub distance: f32,
}

impl Reading {
    pub fn new(angle: i32, distance: f32) -> Self {
        Self { angle, distance }
    }

    pub fn is_valid(&self) -> bool {
        self.distance >= 0.0
    }
}

/// The robot's danger zone: the latest scan plus the penetration rule.
///
/// The zone counts readings closer than the danger distance; only when
/// at least `min_readings` of them agree is the zone considered
/// penetrated, so a single spurious echo cannot stop the robot.
#[derive(Debug, Clone)]
pub struct DangerZone {
    readings: Vec<Reading>,
    distance: f32,
    min_readings: usize,
}

impl DangerZone {
    pub fn new(distance: f32, min_readings: usize) -> Self {
        Self {
            readings: Vec::new(),
            distance,
            min_readings: min_readings.max(1),
        }
    }

    /// Read the `[danger_zone]` config section.
    pub fn from_config(config: &Config) -> Self {
        let distance = config
            .get_f32("danger_zone", "distance", 0.35)
            .clamp(0.05, 2.0);
        let min_readings = config.get_i64("danger_zone", "min_readings", 3).max(1) as usize;
        Self::new(distance, min_readings)
    }

    /// Replace the scan. Caller must hold the write side of the
    /// update lock.
    pub fn update(&mut self, readings: Vec<Reading>) {
        self.readings = readings;
    }

    /// Whether enough readings have crossed inside the danger
    /// distance.
    pub fn penetrated(&self) -> bool {
        self.penetrating_count() >= self.min_readings
    }

    /// How many valid readings currently sit inside the danger
    /// distance.
    pub fn penetrating_count(&self) -> usize {
        self.readings
            .iter()
            .filter(|r| r.is_valid() && r.distance < self.distance)
            .count()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }
}

/// The update-lock-guarded danger zone handle shared between the
/// sensor thread and the behaviors.
pub type SharedDangerZone = Arc<RwLock<DangerZone>>;

/// Build a shareable danger zone from config.
pub fn shared_danger_zone(config: &Config) -> SharedDangerZone {
    Arc::new(RwLock::new(DangerZone::from_config(config)))
}
