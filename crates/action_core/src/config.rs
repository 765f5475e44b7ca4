use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dnd::EditorId;
use crate::record::{ActionRecord, ActionRecordId, NodeType, QualifierOption};
use crate::suggestion::RegisteredAction;

const DEFAULT_FRAME_MS: u64 = 16;
const DEFAULT_BLUR_DELAY_MS: u64 = 100;
const DEFAULT_REENTRANCY_COOLDOWN_MS: u64 = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("editor id must not be empty")]
    EmptyEditorId,
    #[error("default qualifier {0:?} is not one of the qualifier options")]
    UnknownDefaultQualifier(String),
    #[error("initial action {id} has type {found:?}, editor hosts {expected:?}")]
    ForeignInitialAction {
        id: ActionRecordId,
        expected: NodeType,
        found: NodeType,
    },
    #[error("initial action id {0} appears more than once")]
    DuplicateInitialAction(ActionRecordId),
    #[error("invalid editor config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deferral delays in milliseconds. Zero selects the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingConfig {
    pub frame_ms: u64,
    pub blur_delay_ms: u64,
    pub reentrancy_cooldown_ms: u64,
}

impl TimingConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.frame_ms == 0 {
            self.frame_ms = DEFAULT_FRAME_MS;
        }
        if self.blur_delay_ms == 0 {
            self.blur_delay_ms = DEFAULT_BLUR_DELAY_MS;
        }
        if self.reentrancy_cooldown_ms == 0 {
            self.reentrancy_cooldown_ms = DEFAULT_REENTRANCY_COOLDOWN_MS;
        }
        self
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.with_defaults().frame_ms)
    }

    pub fn blur_delay(&self) -> Duration {
        Duration::from_millis(self.with_defaults().blur_delay_ms)
    }

    pub fn reentrancy_cooldown(&self) -> Duration {
        Duration::from_millis(self.with_defaults().reentrancy_cooldown_ms)
    }
}

fn default_qualifier_options() -> Vec<QualifierOption> {
    QualifierOption::defaults()
}

fn default_qualifier() -> String {
    "incoming".to_string()
}

/// Everything a host supplies once per editor instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEditorConfig {
    pub editor_id: EditorId,
    pub node_type: NodeType,
    #[serde(default)]
    pub registered_actions: Vec<RegisteredAction>,
    #[serde(default = "default_qualifier_options")]
    pub qualifier_options: Vec<QualifierOption>,
    #[serde(default = "default_qualifier")]
    pub default_qualifier: String,
    #[serde(default)]
    pub initial_actions: Vec<ActionRecord>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub timing: TimingConfig,
}

impl ActionEditorConfig {
    pub fn new(editor_id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            editor_id: EditorId::new(editor_id),
            node_type,
            registered_actions: Vec::new(),
            qualifier_options: default_qualifier_options(),
            default_qualifier: default_qualifier(),
            initial_actions: Vec::new(),
            read_only: false,
            timing: TimingConfig::default(),
        }
    }

    pub fn registered_actions(mut self, actions: Vec<RegisteredAction>) -> Self {
        self.registered_actions = actions;
        self
    }

    pub fn qualifier_options(mut self, options: Vec<QualifierOption>) -> Self {
        self.qualifier_options = options;
        self
    }

    pub fn default_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.default_qualifier = qualifier.into();
        self
    }

    pub fn initial_actions(mut self, actions: Vec<ActionRecord>) -> Self {
        self.initial_actions = actions;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.editor_id.as_str().trim().is_empty() {
            return Err(ConfigError::EmptyEditorId);
        }
        if !self
            .qualifier_options
            .iter()
            .any(|option| option.id == self.default_qualifier)
        {
            return Err(ConfigError::UnknownDefaultQualifier(
                self.default_qualifier.clone(),
            ));
        }
        let mut seen = HashSet::new();
        for action in &self.initial_actions {
            if action.action_node_type != self.node_type {
                return Err(ConfigError::ForeignInitialAction {
                    id: action.id.clone(),
                    expected: self.node_type,
                    found: action.action_node_type,
                });
            }
            if !seen.insert(&action.id) {
                return Err(ConfigError::DuplicateInitialAction(action.id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timings_fall_back_to_defaults() {
        let timing = TimingConfig {
            frame_ms: 0,
            blur_delay_ms: 250,
            reentrancy_cooldown_ms: 0,
        };
        assert_eq!(timing.frame(), Duration::from_millis(16));
        assert_eq!(timing.blur_delay(), Duration::from_millis(250));
        assert_eq!(timing.reentrancy_cooldown(), Duration::from_millis(50));
    }

    #[test]
    fn unknown_default_qualifier_is_rejected() {
        let config = ActionEditorConfig::new("e1", NodeType::ItemActionNode).default_qualifier("x");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownDefaultQualifier(q)) if q == "x"
        ));
    }
}
