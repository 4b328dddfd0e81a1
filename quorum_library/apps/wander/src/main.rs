//! Wander - obstacle-avoiding demo for the QUORUM controller
//!
//! Spawns the configured behaviors and the three motor arbiters
//! against a simulated robot and range sensor. The "robot" just prints
//! the motor commands the arbiters issue; the sensor thread walks a
//! fake obstacle toward the robot and back so the emergency-stop and
//! extricate behaviors get something to react to.
//!
//! Usage:
//!   cargo run -p wander [quorum.toml]
//!
//! Press Ctrl+C to stop.

use anyhow::{Context, Result};
use colored::Colorize;
use quorum_core::{
    create_behavior, spawn_behavior, Actuators, Config, Robot, SharedRobot, Shutdown,
};
use quorum_library::{register_standard_behaviors, shared_danger_zone, Reading};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Prints each motor command instead of driving hardware.
struct SimRobot;

impl Robot for SimRobot {
    fn drive(&mut self, speed: f32, pwm: i32) {
        println!(
            "{} speed={:.2} pwm={}",
            "[drive]".green().bold(),
            speed,
            pwm
        );
    }

    fn turn(&mut self, direction: f32) {
        println!("{} direction={:.1}°", "[turn] ".yellow().bold(), direction);
    }

    fn spin(&mut self, angle: f32) {
        println!("{} angle={:.1}°", "[spin] ".magenta().bold(), angle);
    }

    fn off(&mut self) {
        println!("{} motors off", "[off]  ".red().bold());
    }
}

/// Walk a fake obstacle toward the robot and back, refreshing the
/// danger zone the way a lidar driver would.
fn run_sensor_sim(zone: quorum_library::SharedDangerZone, shutdown: Shutdown) {
    let mut rng = StdRng::from_entropy();
    let mut obstacle_angle: i32 = rng.gen_range(-60..=60);
    let mut obstacle_distance: f32 = 2.0;

    while !shutdown.in_progress() {
        obstacle_distance -= 0.08;
        if obstacle_distance < 0.1 {
            obstacle_distance = 2.0;
            obstacle_angle = rng.gen_range(-60..=60);
            println!(
                "{} new obstacle at {}°",
                "[sim]  ".cyan(),
                obstacle_angle
            );
        }

        // A coarse sweep: open space everywhere except near the
        // obstacle bearing.
        let readings: Vec<Reading> = (-90..=90)
            .step_by(15)
            .map(|angle| {
                let distance = if (angle - obstacle_angle).abs() <= 15 {
                    obstacle_distance + rng.gen_range(-0.02..0.02)
                } else {
                    2.0 + rng.gen_range(-0.1..0.1)
                };
                Reading::new(angle, distance.max(0.05))
            })
            .collect();

        zone.write().update(readings);
        thread::sleep(Duration::from_millis(100));
    }
}

fn main() -> Result<()> {
    println!();
    println!("  QUORUM Wander - obstacle-avoiding demo");
    println!();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "quorum.toml".to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        println!("[>] Loading config from {}", config_path);
        Config::from_file(&config_path).with_context(|| format!("loading {}", config_path))?
    } else {
        println!("[>] No config file found, using built-in defaults");
        Config::empty()
    };

    let mut behaviors = config.get_strings("app", "behaviors");
    if behaviors.is_empty() {
        behaviors = vec![
            "forward".to_string(),
            "emergency_stop".to_string(),
            "extricate".to_string(),
        ];
    }
    println!("[>] Behaviors: {}", behaviors.join(", "));

    let zone = shared_danger_zone(&config);
    register_standard_behaviors(&zone);

    let actuators = Actuators::from_config(&config, &behaviors);
    let robot: SharedRobot = Arc::new(Mutex::new(SimRobot));

    let shutdown = Shutdown::new();
    shutdown
        .install_ctrlc_handler()
        .context("installing ctrl-c handler")?;

    let mut handles = actuators
        .spawn_all(&robot, &shutdown, true)
        .context("spawning arbiters")?;

    for name in &behaviors {
        let behavior = create_behavior(name, &config, &actuators)
            .with_context(|| format!("creating behavior '{}'", name))?;
        handles.push(spawn_behavior(behavior, shutdown.clone(), true)?);
    }

    let sensor_zone = zone.clone();
    let sensor_shutdown = shutdown.clone();
    handles.push(
        thread::Builder::new()
            .name("sensor_sim".to_string())
            .spawn(move || run_sensor_sim(sensor_zone, sensor_shutdown))?,
    );

    println!("\n[>] Running... (Press Ctrl+C to stop)\n");
    while !shutdown.in_progress() {
        thread::sleep(Duration::from_millis(50));
    }

    println!("\n[>] Shutting down...");
    for handle in handles {
        let _ = handle.join();
    }

    robot
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .off();

    println!("[>] Wander shutdown complete.\n");
    Ok(())
}
