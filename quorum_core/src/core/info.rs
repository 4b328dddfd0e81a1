use std::fmt;
use std::time::{Duration, Instant};

/// Lifecycle states for behaviors and arbiter loops.
#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorState {
    Uninitialized,
    Running,
    Stopping,
    Stopped,
    Crashed(String),
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorState::Uninitialized => write!(f, "Uninitialized"),
            BehaviorState::Running => write!(f, "Running"),
            BehaviorState::Stopping => write!(f, "Stopping"),
            BehaviorState::Stopped => write!(f, "Stopped"),
            BehaviorState::Crashed(msg) => write!(f, "Crashed: {}", msg),
        }
    }
}

/// Performance metrics for one behavior loop.
#[derive(Debug, Clone, Default)]
pub struct BehaviorMetrics {
    pub total_ticks: u64,
    pub avg_tick_duration_ms: f64,
    pub max_tick_duration_ms: f64,
    pub min_tick_duration_ms: f64,
    pub last_tick_duration_ms: f64,
    pub votes_cast: u64,
    pub errors_count: u64,
    pub warnings_count: u64,
    pub uptime_seconds: f64,
}

/// Per-thread execution context handed to each behavior iteration.
///
/// Owns the behavior's lifecycle state, tick metrics and logging. The
/// run loop creates one of these per spawned behavior; the behavior
/// only ever sees it as `&mut` inside `action()`, so no locking is
/// needed here, everything is thread-local to the behavior's thread.
pub struct BehaviorInfo {
    name: String,
    state: BehaviorState,
    previous_state: BehaviorState,
    state_change_time: Instant,

    metrics: BehaviorMetrics,
    creation_time: Instant,
    tick_start_time: Option<Instant>,

    error_history: Vec<(Instant, String)>,
    warning_history: Vec<(Instant, String)>,

    enable_logging: bool,
    log_level: String,
}

impl BehaviorInfo {
    pub fn new(name: impl Into<String>, enable_logging: bool) -> Self {
        let now = Instant::now();
        Self {
            name: name.into(),
            state: BehaviorState::Uninitialized,
            previous_state: BehaviorState::Uninitialized,
            state_change_time: now,
            metrics: BehaviorMetrics::default(),
            creation_time: now,
            tick_start_time: None,
            error_history: Vec::new(),
            warning_history: Vec::new(),
            enable_logging,
            log_level: "INFO".to_string(),
        }
    }

    // State management

    pub fn state(&self) -> &BehaviorState {
        &self.state
    }

    pub fn previous_state(&self) -> &BehaviorState {
        &self.previous_state
    }

    pub fn set_state(&mut self, new_state: BehaviorState) {
        if self.state != new_state {
            self.previous_state = self.state.clone();
            self.state = new_state;
            self.state_change_time = Instant::now();
        }
    }

    pub fn transition_to_crashed(&mut self, crash_msg: String) {
        self.log_error(&crash_msg);
        self.set_state(BehaviorState::Crashed(crash_msg));
    }

    // Tick management

    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
    }

    pub fn record_tick(&mut self) {
        if let Some(start_time) = self.tick_start_time.take() {
            let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

            self.metrics.total_ticks += 1;
            self.metrics.last_tick_duration_ms = duration_ms;

            if self.metrics.min_tick_duration_ms == 0.0
                || duration_ms < self.metrics.min_tick_duration_ms
            {
                self.metrics.min_tick_duration_ms = duration_ms;
            }
            if duration_ms > self.metrics.max_tick_duration_ms {
                self.metrics.max_tick_duration_ms = duration_ms;
            }

            let total = self.metrics.avg_tick_duration_ms * (self.metrics.total_ticks - 1) as f64;
            self.metrics.avg_tick_duration_ms =
                (total + duration_ms) / self.metrics.total_ticks as f64;

            self.metrics.uptime_seconds = self.creation_time.elapsed().as_secs_f64();
        }
    }

    pub fn record_vote(&mut self) {
        self.metrics.votes_cast += 1;
    }

    // Logging

    pub fn log_info(&self, message: &str) {
        if self.enable_logging && (self.log_level == "INFO" || self.log_level == "DEBUG") {
            let now = chrono::Local::now();
            eprintln!(
                "\x1b[36m[{}]\x1b[0m \x1b[34m[INFO]\x1b[0m \x1b[33m[{}]\x1b[0m {}",
                now.format("%H:%M:%S%.3f"),
                self.name,
                message
            );
        }
    }

    pub fn log_warning(&mut self, message: &str) {
        if self.enable_logging {
            let now = chrono::Local::now();
            eprintln!(
                "\x1b[36m[{}]\x1b[0m \x1b[33m[WARN]\x1b[0m \x1b[33m[{}]\x1b[0m {}",
                now.format("%H:%M:%S%.3f"),
                self.name,
                message
            );
        }

        self.warning_history
            .push((Instant::now(), message.to_string()));
        if self.warning_history.len() > 100 {
            self.warning_history.remove(0);
        }
        self.metrics.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        if self.enable_logging {
            let now = chrono::Local::now();
            eprintln!(
                "\x1b[36m[{}]\x1b[0m \x1b[31m[ERROR]\x1b[0m \x1b[33m[{}]\x1b[0m {}",
                now.format("%H:%M:%S%.3f"),
                self.name,
                message
            );
        }

        self.error_history
            .push((Instant::now(), message.to_string()));
        if self.error_history.len() > 100 {
            self.error_history.remove(0);
        }
        self.metrics.errors_count += 1;
    }

    pub fn log_debug(&self, message: &str) {
        if self.enable_logging && self.log_level == "DEBUG" {
            eprintln!(
                "\x1b[90m[DEBUG]\x1b[0m \x1b[33m[{}]\x1b[0m {}",
                self.name, message
            );
        }
    }

    // Getters / setters

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &BehaviorMetrics {
        &self.metrics
    }

    pub fn uptime(&self) -> Duration {
        self.creation_time.elapsed()
    }

    pub fn time_in_current_state(&self) -> Duration {
        self.state_change_time.elapsed()
    }

    pub fn set_log_level(&mut self, level: &str) {
        self.log_level = level.to_string();
    }
}
