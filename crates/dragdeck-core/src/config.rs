//! Deck interaction configuration.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Axes the container pans along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanAxis {
    #[default]
    Horizontal,
    Vertical,
    Both,
}

impl PanAxis {
    pub fn pans_x(self) -> bool {
        matches!(self, PanAxis::Horizontal | PanAxis::Both)
    }

    pub fn pans_y(self) -> bool {
        matches!(self, PanAxis::Vertical | PanAxis::Both)
    }
}

/// What happens to an item's placement when it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Item stays where it was dropped, outside the flow layout.
    #[default]
    KeepAbsolute,
    /// Item returns to its slot in the flow layout.
    ReturnToFlow,
}

/// Configuration for a deck and its interaction controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Scroll distance per pixel of pointer movement while panning.
    pub pan_speed: f64,
    pub pan_axis: PanAxis,
    /// Allow panning by dragging the container background.
    pub panning: bool,
    /// Allow dragging items.
    pub item_drag: bool,
    pub drop_policy: DropPolicy,
    /// Only the primary button starts or ends a drag.
    pub primary_button_only: bool,
    /// End a drag when an uncaptured pointer leaves the container.
    pub end_on_leave: bool,
    /// Coalesce move samples to one per pointer per frame.
    pub coalesce_moves: bool,
    /// Horizontal gap between items in the flow layout.
    pub item_gap: f64,
    /// Inset of the flow layout from the container edges.
    pub padding: f64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            pan_speed: 1.0,
            pan_axis: PanAxis::Horizontal,
            panning: true,
            item_drag: true,
            drop_policy: DropPolicy::KeepAbsolute,
            primary_button_only: true,
            end_on_leave: true,
            coalesce_moves: false,
            item_gap: 0.0,
            padding: 0.0,
        }
    }
}

impl DeckConfig {
    /// Parse and validate a JSON configuration. Missing fields use defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded deck config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.pan_speed.is_finite() || self.pan_speed <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "pan_speed",
                reason: format!("must be a positive number, got {}", self.pan_speed),
            });
        }
        for (field, value) in [("item_gap", self.item_gap), ("padding", self.padding)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}
