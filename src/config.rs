//! Engine configuration supplied by the host.
//!
//! Hosts pass configuration as a JSON object (typically built from
//! `window.devicePixelRatio` and theme settings). Missing fields take the
//! defaults from [`crate::consts`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::{
    ACCENT_COLOR, GRID_COLOR, GRID_DOT_RADIUS_MAJOR, GRID_DOT_RADIUS_MINOR, GRID_MAX_ZOOM, GRID_MIN_SPACING, GRID_SPACING,
    HANDLE_COLOR, HANDLE_SIZE, STORAGE_KEY,
};
use crate::engine::EngineError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ratio of surface pixels to host layout pixels.
    pub zoom: f64,
    /// The grid is skipped once `zoom` reaches this value.
    pub grid_max_zoom: f64,
    /// Lattice spacing in logical units.
    pub grid_spacing: f64,
    pub grid_dot_radius_major: f64,
    pub grid_dot_radius_minor: f64,
    pub grid_color: String,
    /// Fill and stroke colour for elements.
    pub accent_color: String,
    /// Colour for the selection outline and handles.
    pub handle_color: String,
    /// Side length of a corner handle in logical units.
    pub handle_size: f64,
    /// Key-value store key for the persisted element list.
    pub storage_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            grid_max_zoom: GRID_MAX_ZOOM,
            grid_spacing: GRID_SPACING,
            grid_dot_radius_major: GRID_DOT_RADIUS_MAJOR,
            grid_dot_radius_minor: GRID_DOT_RADIUS_MINOR,
            grid_color: GRID_COLOR.to_owned(),
            accent_color: ACCENT_COLOR.to_owned(),
            handle_color: HANDLE_COLOR.to_owned(),
            handle_size: HANDLE_SIZE,
            storage_key: STORAGE_KEY.to_owned(),
        }
    }
}

impl EngineConfig {
    /// Default configuration at the given zoom factor.
    #[must_use]
    pub fn with_zoom(zoom: f64) -> Self {
        Self { zoom, ..Self::default() }
    }

    /// Parse a host-provided JSON object and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] for malformed JSON or
    /// out-of-range values.
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all numeric settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), EngineError> {
        require_positive("zoom", self.zoom)?;
        require_positive("grid_max_zoom", self.grid_max_zoom)?;
        require_positive("grid_spacing", self.grid_spacing)?;
        if self.grid_spacing < GRID_MIN_SPACING {
            return Err(EngineError::InvalidConfig(format!(
                "grid_spacing must be at least {GRID_MIN_SPACING}, got {}",
                self.grid_spacing
            )));
        }
        require_positive("grid_dot_radius_major", self.grid_dot_radius_major)?;
        require_positive("grid_dot_radius_minor", self.grid_dot_radius_minor)?;
        require_positive("handle_size", self.handle_size)?;
        if self.storage_key.is_empty() {
            return Err(EngineError::InvalidConfig("storage_key must not be empty".into()));
        }
        Ok(())
    }
}

fn require_positive(field: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!("{field} must be a positive number, got {value}")))
    }
}
