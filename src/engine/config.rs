//! Engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What happens after a logic fault has been logged and the instance halted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Return the fault to the caller; the instance refuses further events.
    #[default]
    Halt,

    /// Panic with the fault message.
    Panic,
}

/// Per-instance engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum drain-loop iterations per external event. `None` disables the limit.
    pub max_cascade_depth: Option<usize>,

    /// Committed transitions kept in the instance history.
    pub history_limit: usize,

    pub fault_policy: FaultPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cascade_depth: Some(64),
            history_limit: 64,
            fault_policy: FaultPolicy::Halt,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn max_cascade_depth(mut self, limit: Option<usize>) -> Self {
        self.max_cascade_depth = limit;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config = EngineConfig::from_json(r#"{ "history_limit": 8 }"#).unwrap();
        assert_eq!(config.history_limit, 8);
        assert_eq!(config.max_cascade_depth, Some(64));
        assert_eq!(config.fault_policy, FaultPolicy::Halt);
    }

    #[test]
    fn parses_every_field() {
        let config = EngineConfig::from_json(
            r#"{ "max_cascade_depth": null, "history_limit": 0, "fault_policy": "panic" }"#,
        )
        .unwrap();
        assert_eq!(
            config,
            EngineConfig::default()
                .max_cascade_depth(None)
                .history_limit(0)
                .fault_policy(FaultPolicy::Panic)
        );
    }

    #[test]
    fn rejects_malformed_json() {
        let result = EngineConfig::from_json(r#"{ "history_limit": "lots" }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
