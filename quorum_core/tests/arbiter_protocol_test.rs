// Protocol-level tests for the arbitration engine: freeze semantics,
// vote-inbox isolation and the priority tally rules.
use quorum_core::arbiter::{Arbiter, Priorities, SpeedTally};
use quorum_core::{Config, Robot, SpeedArbiter, SpeedVote};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

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

fn speed_arbiter(priorities: &[(&str, f32)]) -> SpeedArbiter {
    Arbiter::new(
        SpeedTally,
        Duration::from_millis(10),
        Priorities::new(
            &priorities
                .iter()
                .map(|(n, p)| (n.to_string(), *p))
                .collect::<Vec<_>>(),
        ),
    )
}

#[test]
fn test_priority_winner_take_all() {
    let arbiter = speed_arbiter(&[("a", 0.6), ("b", 0.3), ("c", 0.1)]);
    arbiter.vote("a", SpeedVote::new(0.2, 20));
    arbiter.vote("b", SpeedVote::new(0.4, 40));
    arbiter.vote("c", SpeedVote::new(0.5, 50));

    let mut robot = RecordingRobot::default();
    assert!(arbiter.tally_once(&mut robot));

    // a wins on priority; the speeds are not blended.
    assert_eq!(robot.drives, vec![(0.2, 20)]);
}

#[test]
fn test_inbox_is_cleared_after_each_cycle() {
    let arbiter = speed_arbiter(&[("a", 1.0)]);
    arbiter.vote("a", SpeedVote::new(0.3, 30));

    let mut robot = RecordingRobot::default();
    assert!(arbiter.tally_once(&mut robot));
    // Votes do not persist: the next cycle has nothing to tally.
    assert!(!arbiter.tally_once(&mut robot));
    assert_eq!(robot.drives.len(), 1);
}

#[test]
fn test_freeze_excludes_lower_priority_votes() {
    let arbiter = speed_arbiter(&[("high", 0.7), ("low", 0.3)]);
    assert!(arbiter.freeze("high"));
    assert!(arbiter.is_frozen("high"));

    arbiter.vote("high", SpeedVote::new(0.1, 10));
    arbiter.vote("low", SpeedVote::new(0.9, 90));

    let mut robot = RecordingRobot::default();
    assert!(arbiter.tally_once(&mut robot));
    assert_eq!(robot.drives, vec![(0.1, 10)]);

    // With only the low-priority behavior voting, the frozen arbiter
    // issues nothing at all.
    arbiter.vote("low", SpeedVote::new(0.9, 90));
    assert!(!arbiter.tally_once(&mut robot));
    assert_eq!(robot.drives.len(), 1);
}

#[test]
fn test_unfreeze_by_non_holder_is_ignored() {
    let arbiter = speed_arbiter(&[("a", 0.6), ("b", 0.4)]);
    assert!(arbiter.freeze("a"));

    arbiter.unfreeze("b");
    assert!(arbiter.is_frozen("a"));

    arbiter.unfreeze("a");
    assert!(!arbiter.is_frozen("a"));

    // Unfreezing twice is the same as unfreezing once.
    arbiter.unfreeze("a");
    assert!(!arbiter.is_frozen("a"));
}

#[test]
fn test_second_freezer_is_rejected() {
    let arbiter = speed_arbiter(&[("a", 0.6), ("b", 0.4)]);
    assert!(arbiter.freeze("a"));

    // First writer wins; b cannot steal the freeze.
    assert!(!arbiter.freeze("b"));
    assert!(arbiter.is_frozen("a"));
    assert!(!arbiter.is_frozen("b"));

    // Re-freeze by the holder is an accepted no-op.
    assert!(arbiter.freeze("a"));

    arbiter.unfreeze("a");
    assert!(arbiter.freeze("b"));
    assert!(arbiter.is_frozen("b"));
}

/// A robot that casts a new vote into the arbiter from inside the
/// motor command, i.e. while cycle N is still tallying. That vote must
/// only be visible in cycle N+1.
struct ReentrantRobot {
    arbiter: Arc<SpeedArbiter>,
    drives: Vec<(f32, i32)>,
}

impl Robot for ReentrantRobot {
    fn drive(&mut self, speed: f32, pwm: i32) {
        self.drives.push((speed, pwm));
        self.arbiter.vote("late", SpeedVote::new(0.9, 90));
    }
    fn turn(&mut self, _direction: f32) {}
    fn spin(&mut self, _angle: f32) {}
    fn off(&mut self) {}
}

#[test]
fn test_votes_cast_during_tally_land_in_next_cycle() {
    let arbiter = Arc::new(speed_arbiter(&[("early", 0.4), ("late", 0.6)]));
    arbiter.vote("early", SpeedVote::new(0.2, 20));

    let mut robot = ReentrantRobot {
        arbiter: arbiter.clone(),
        drives: Vec::new(),
    };

    // Cycle N: only the early vote is visible, even though a new vote
    // arrives mid-tally.
    assert!(arbiter.tally_once(&mut robot));
    assert_eq!(robot.drives, vec![(0.2, 20)]);

    // Cycle N+1: the late vote is there, never lost.
    assert!(arbiter.tally_once(&mut robot));
    assert_eq!(robot.drives.len(), 2);
    assert_eq!(robot.drives[1], (0.9, 90));
}

#[test]
fn test_concurrent_voters_never_lose_votes() {
    let arbiter = Arc::new(speed_arbiter(&[("a", 0.5), ("b", 0.3), ("c", 0.2)]));

    let mut handles = Vec::new();
    for name in ["a", "b", "c"] {
        let arbiter = arbiter.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                arbiter.vote(name, SpeedVote::new(0.25, 25));
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // All 300 votes were appended; the winner is a's vote and the
    // drained inbox leaves the next cycle empty.
    let mut robot = RecordingRobot::default();
    assert!(arbiter.tally_once(&mut robot));
    assert_eq!(robot.drives, vec![(0.25, 25)]);
    assert!(!arbiter.tally_once(&mut robot));
}

#[test]
fn test_frozen_threshold_uses_holder_priority() {
    let cfg = Config::from_str(
        "[guard]\nspeed_priority = 2.0\n\n[cruise]\nspeed_priority = 1.0\n\n[crawl]\nspeed_priority = 1.0\n",
    )
    .unwrap();
    let names: Vec<String> = ["guard", "cruise", "crawl"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let arbiter = SpeedArbiter::from_config(&cfg, &names);

    assert!(arbiter.freeze("guard"));

    // Equal-priority voters sit below the holder's threshold and are
    // excluded; the holder's own votes survive the filter.
    arbiter.vote("cruise", SpeedVote::new(0.5, 50));
    arbiter.vote("guard", SpeedVote::new(0.1, 10));

    let robot = Arc::new(Mutex::new(RecordingRobot::default()));
    {
        let mut robot = robot.lock().unwrap();
        assert!(arbiter.tally_once(&mut *robot));
        assert_eq!(robot.drives, vec![(0.1, 10)]);
    }
}
