//! Construction options for [`crate::CellSelector`].

use crate::error::ConfigError;
use cellselector_core::{needs_packup, GridError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options fixed when a selector is created.
///
/// Missing fields take their defaults, so partial YAML or TOML documents
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellSelectorConfig {
    /// Items per row
    pub width: usize,
    /// Rows shown while collapsed
    pub max_rows_when_brief: usize,
    /// Whether the grid may collapse at all
    pub can_packup: bool,
    /// Start expanded
    pub default_expanded: bool,
    /// Animate mode switches instead of snapping
    pub can_animate: bool,
    /// Fade duration in milliseconds
    pub animation_duration_ms: u64,
}

impl Default for CellSelectorConfig {
    fn default() -> Self {
        Self {
            width: 4,
            max_rows_when_brief: 2,
            can_packup: false,
            default_expanded: false,
            can_animate: true,
            animation_duration_ms: 250,
        }
    }
}

impl CellSelectorConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set items per row.
    #[must_use]
    pub const fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Set rows shown while collapsed.
    #[must_use]
    pub const fn max_rows_when_brief(mut self, rows: usize) -> Self {
        self.max_rows_when_brief = rows;
        self
    }

    /// Allow or forbid collapsing.
    #[must_use]
    pub const fn can_packup(mut self, can_packup: bool) -> Self {
        self.can_packup = can_packup;
        self
    }

    /// Start expanded.
    #[must_use]
    pub const fn default_expanded(mut self, expanded: bool) -> Self {
        self.default_expanded = expanded;
        self
    }

    /// Enable or disable animations.
    #[must_use]
    pub const fn can_animate(mut self, can_animate: bool) -> Self {
        self.can_animate = can_animate;
        self
    }

    /// Set the fade duration.
    #[must_use]
    pub const fn animation_duration_ms(mut self, ms: u64) -> Self {
        self.animation_duration_ms = ms;
        self
    }

    /// Fade duration as a [`Duration`].
    #[must_use]
    pub const fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// Whether `item_count` items overflow the collapsed rows.
    #[must_use]
    pub const fn needs_packup(&self, item_count: usize) -> bool {
        needs_packup(
            self.can_packup,
            item_count,
            self.width,
            self.max_rows_when_brief,
        )
    }

    /// Check that the values can build a grid.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.width == 0 {
            return Err(GridError::InvalidArgument(
                "width must be greater than 0".into(),
            ));
        }
        if self.max_rows_when_brief == 0 {
            return Err(GridError::InvalidArgument(
                "max_rows_when_brief must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}
