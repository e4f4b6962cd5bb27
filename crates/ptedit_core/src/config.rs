//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_COMPOSITION_QUIET_MS, DEFAULT_DECORATORS, DEFAULT_HISTORY_MAX_OPS};
use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How the engine tree is reconciled against a new document snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReconcileStrategy {
    /// Compare index by index; replace, append or truncate.
    #[default]
    Positional,
    /// Reuse existing nodes by `_key` regardless of position.
    Keyed,
}

impl FromStr for ReconcileStrategy {
    type Err = EditorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "positional" => Ok(Self::Positional),
            "keyed" => Ok(Self::Keyed),
            other => Err(EditorError::Config(format!(
                "unknown reconcile strategy '{}'",
                other
            ))),
        }
    }
}

/// Runtime configuration for an editor instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub read_only: bool,
    pub reconcile: ReconcileStrategy,
    pub composition_quiet_period: Duration,
    pub history_max_ops: usize,
    /// Mark names treated as decorators rather than annotation references.
    pub decorators: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            reconcile: ReconcileStrategy::default(),
            composition_quiet_period: Duration::from_millis(DEFAULT_COMPOSITION_QUIET_MS),
            history_max_ops: DEFAULT_HISTORY_MAX_OPS,
            decorators: DEFAULT_DECORATORS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

impl EditorConfig {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`EditorConfig`] with defaults applied when env vars are missing.
    ///
    /// # Errors
    /// Returns [`EditorError::Config`] when `PTEDIT_RECONCILE` names an unknown strategy.
    pub fn from_env() -> Result<Self, EditorError> {
        let defaults = Self::default();
        let reconcile = match env::var("PTEDIT_RECONCILE") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => defaults.reconcile,
        };
        Ok(Self {
            read_only: env_flag_enabled("PTEDIT_READ_ONLY"),
            reconcile,
            composition_quiet_period: env::var("PTEDIT_COMPOSITION_QUIET_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.composition_quiet_period),
            history_max_ops: env::var("PTEDIT_HISTORY_MAX_OPS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.history_max_ops),
            decorators: defaults.decorators,
        })
    }

    /// Whether `mark` is a decorator (as opposed to a markDef reference).
    pub fn is_decorator(&self, mark: &str) -> bool {
        self.decorators.iter().any(|d| d == mark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = [
        "PTEDIT_READ_ONLY",
        "PTEDIT_RECONCILE",
        "PTEDIT_COMPOSITION_QUIET_MS",
        "PTEDIT_HISTORY_MAX_OPS",
    ];

    /// Runs `check` with exactly the given `PTEDIT_*` overrides set, then
    /// puts the previous process values back.
    fn with_config_env(overrides: &[(&str, &str)], check: impl FnOnce()) {
        let _lock = ENV.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved: Vec<(&str, Option<String>)> =
            VARS.iter().map(|name| (*name, env::var(name).ok())).collect();
        for name in VARS {
            match overrides.iter().find(|(key, _)| *key == name) {
                Some((_, value)) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(check));
        for (name, value) in saved {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
        if let Err(panic) = result {
            std::panic::resume_unwind(panic);
        }
    }

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
        assert_eq!(parse_env_flag("enabled"), None);
    }

    #[test]
    fn from_env_reads_overrides() {
        let overrides = [
            ("PTEDIT_READ_ONLY", "yes"),
            ("PTEDIT_RECONCILE", "Keyed"),
            ("PTEDIT_COMPOSITION_QUIET_MS", "250"),
        ];
        with_config_env(&overrides, || {
            let config = EditorConfig::from_env().expect("config");
            assert!(config.read_only);
            assert_eq!(config.reconcile, ReconcileStrategy::Keyed);
            assert_eq!(config.composition_quiet_period, Duration::from_millis(250));
            assert_eq!(config.history_max_ops, DEFAULT_HISTORY_MAX_OPS);
        });
    }

    #[test]
    fn from_env_without_overrides_matches_default() {
        with_config_env(&[], || {
            assert_eq!(EditorConfig::from_env().expect("config"), EditorConfig::default());
        });
    }

    #[test]
    fn from_env_rejects_unknown_reconcile_strategy() {
        with_config_env(&[("PTEDIT_RECONCILE", "fuzzy")], || {
            assert!(matches!(
                EditorConfig::from_env(),
                Err(EditorError::Config(_))
            ));
        });
    }
}
