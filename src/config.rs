//! Configuration types and defaults for the mention widget

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

// =============================================================================
// Token Style
// =============================================================================

/// Colors used to render tokens of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenStyle {
    pub background: String,
    /// Text color
    #[serde(alias = "foreground")]
    pub color: String,
    pub border: String,
}

impl Default for TokenStyle {
    fn default() -> Self {
        Self {
            background: "#e3f2fd".to_string(),
            color: "#1565c0".to_string(),
            border: "#90caf9".to_string(),
        }
    }
}

impl TokenStyle {
    /// Inline CSS declaration list
    pub fn to_css(&self) -> String {
        format!(
            "background-color: {}; color: {}; border: 1px solid {};",
            self.background, self.color, self.border
        )
    }
}

// =============================================================================
// Widget Configuration
// =============================================================================

/// Widget-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Character that opens a mention session. Default: '@'
    pub trigger: char,
    /// Plain-text unit inserted after every token. Default: ' '
    pub separator: char,
    /// Quiet period before a remote query is issued. Default: 300
    pub debounce_ms: u64,
    /// Placeholder entry shown when there are no options
    pub no_results_label: String,
    /// Label used when a record has none of the conventional name fields
    pub no_name_label: String,
    /// Placeholder entry shown while a remote fetch is outstanding
    pub loading_label: String,
    /// Style for categories that do not declare one
    pub default_style: TokenStyle,
    /// CSS class prefix for rendered tokens. Default: "mention"
    pub class_prefix: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            trigger: '@',
            separator: ' ',
            debounce_ms: 300,
            no_results_label: "No results".to_string(),
            no_name_label: "no name".to_string(),
            loading_label: "Loading...".to_string(),
            default_style: TokenStyle::default(),
            class_prefix: "mention".to_string(),
        }
    }
}

impl WidgetConfig {
    /// Configuration for hosts that want remote queries issued immediately
    pub fn immediate() -> Self {
        Self {
            debounce_ms: 0,
            ..Self::default()
        }
    }

    pub fn with_trigger(mut self, trigger: char) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }

    /// Reject trigger/separator combinations the detector cannot work with
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.trigger.is_whitespace() {
            return Err(ConfigurationError::InvalidConfig(
                "trigger must not be whitespace".to_string(),
            ));
        }
        if self.trigger == self.separator {
            return Err(ConfigurationError::InvalidConfig(format!(
                "trigger and separator must differ (both '{}')",
                self.trigger
            )));
        }
        if self.class_prefix.is_empty() {
            return Err(ConfigurationError::InvalidConfig(
                "class_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
