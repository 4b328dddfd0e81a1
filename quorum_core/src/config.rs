//! Section/key configuration store for the QUORUM controller.
//!
//! The config file is plain TOML: one table per behavior or arbiter,
//! keys inside. Lookups never fail hard: a missing or malformed value
//! falls back to the caller-supplied default, so a bad config file can
//! degrade the controller but never kill it.

use crate::error::{QuorumError, QuorumResult};
use serde::Deserialize;
use std::path::Path;
use toml::Value;

/// Immutable section/key parameter store backed by a TOML document.
///
/// Built once at startup and then shared by reference; behaviors and
/// arbiters read their settings at construction time only.
#[derive(Debug, Clone, Default)]
pub struct Config {
    root: toml::Table,
}

impl Config {
    /// An empty config: every lookup yields the default.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a config from a TOML string.
    pub fn from_str(text: &str) -> QuorumResult<Self> {
        let root: toml::Table = text
            .parse()
            .map_err(|e| QuorumError::config(format!("bad TOML: {}", e)))?;
        Ok(Self { root })
    }

    /// Load a config file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> QuorumResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&text)
    }

    /// Look up `key` inside `section`, deserializing to the requested
    /// type. Returns `None` when the section or key is absent or the
    /// value has the wrong shape.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, section: &str, key: &str) -> Option<T> {
        let value = self.root.get(section)?.as_table()?.get(key)?;
        value.clone().try_into().ok()
    }

    /// Look up `key` inside `section` with a fallback default.
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, section: &str, key: &str, default: T) -> T {
        self.get(section, key).unwrap_or(default)
    }

    /// `get_or` for floats. TOML distinguishes `1` from `1.0`, so an
    /// integer-written value is widened rather than dropped.
    pub fn get_f32(&self, section: &str, key: &str, default: f32) -> f32 {
        match self.root.get(section).and_then(|s| s.as_table()?.get(key)) {
            Some(Value::Float(f)) => *f as f32,
            Some(Value::Integer(i)) => *i as f32,
            _ => default,
        }
    }

    /// `get_or` for integers.
    pub fn get_i64(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get_or(section, key, default)
    }

    /// `get_or` for booleans.
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_or(section, key, default)
    }

    /// A list of strings, e.g. the active behavior roster.
    pub fn get_strings(&self, section: &str, key: &str) -> Vec<String> {
        self.get_or(section, key, Vec::new())
    }

    /// Whether the named section exists at all.
    pub fn has_section(&self, section: &str) -> bool {
        self.root.get(section).map(Value::is_table).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [app]
        behaviors = ["forward", "emergency_stop"]

        [turn_arbiter]
        update_delay = 500
        turn_max = 20
        smoothing_sigma = 1.5

        [forward]
        speed_priority = 1.0
        cruising_speed = 0.5
    "#;

    #[test]
    fn test_basic_lookups() {
        let cfg = Config::from_str(SAMPLE).unwrap();

        assert_eq!(cfg.get_i64("turn_arbiter", "update_delay", 0), 500);
        assert_eq!(cfg.get_f32("forward", "cruising_speed", 0.0), 0.5);
        assert_eq!(
            cfg.get_strings("app", "behaviors"),
            vec!["forward".to_string(), "emergency_stop".to_string()]
        );
    }

    #[test]
    fn test_defaults_for_missing_values() {
        let cfg = Config::from_str(SAMPLE).unwrap();

        // Missing key, missing section, wrong type: all yield defaults.
        assert_eq!(cfg.get_i64("turn_arbiter", "no_such_key", 7), 7);
        assert_eq!(cfg.get_f32("no_such_section", "x", 0.25), 0.25);
        assert_eq!(cfg.get_i64("app", "behaviors", 42), 42);
        assert!(cfg.get_bool("forward", "cruising_speed", true));
    }

    #[test]
    fn test_integer_widens_to_float() {
        let cfg = Config::from_str("[s]\nk = 3\n").unwrap();
        assert_eq!(cfg.get_f32("s", "k", 0.0), 3.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let cfg = Config::from_file(file.path()).unwrap();
        assert_eq!(cfg.get_f32("turn_arbiter", "smoothing_sigma", 0.0), 1.5);
        assert!(cfg.has_section("forward"));
        assert!(!cfg.has_section("spin_arbiter"));
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(Config::from_str("not [valid").is_err());
    }
}
