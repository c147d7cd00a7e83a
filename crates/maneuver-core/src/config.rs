//! Tunable defaults for the plotter.

use crate::color::HexColor;
use serde::{Deserialize, Serialize};

/// Initial identity ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityDefaults {
    /// Fraction of canvas width.
    pub length: f64,
    /// Fraction of canvas height.
    pub width: f64,
    pub stroke_color: HexColor,
}

impl Default for IdentityDefaults {
    fn default() -> Self {
        Self {
            length: 0.16,
            width: 0.036,
            stroke_color: HexColor::default_ship_stroke(),
        }
    }
}

/// Proportions of the pan handle and rotate ring, relative to ship length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolProportions {
    /// Pan handle radius as a share of ship length.
    pub pan_radius: f64,
    /// Inner ring radius as a multiple of the pan radius.
    pub ring_gap: f64,
    /// Ring width as a share of ship length.
    pub ring_width: f64,
    /// Axis indicator triangle size as a share of the pan radius.
    pub axis_indicator: f64,
}

impl Default for ToolProportions {
    fn default() -> Self {
        Self {
            pan_radius: 0.30,
            ring_gap: 1.05,
            ring_width: 0.25,
            axis_indicator: 0.25,
        }
    }
}

/// Plotter configuration. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlotterConfig {
    pub identity: IdentityDefaults,
    pub tools: ToolProportions,
    /// Zoom factor applied to the tool geometry.
    pub tool_scale: f64,
    /// Whether drags starting on an axis indicator are locked to that axis.
    pub axis_lock: bool,
    /// Canvas size as a share of the viewport when there is no background image.
    pub canvas_fill_ratio: f64,
    /// Extra shrink applied when fitting a background image to the viewport.
    pub background_fit_ratio: f64,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            identity: IdentityDefaults::default(),
            tools: ToolProportions::default(),
            tool_scale: 1.0,
            axis_lock: true,
            canvas_fill_ratio: 0.95,
            background_fit_ratio: 0.99,
        }
    }
}

impl PlotterConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        log::debug!("Loaded plotter config: {config:?}");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlotterConfig::default();
        assert_eq!(config.identity.length, 0.16);
        assert_eq!(config.identity.width, 0.036);
        assert_eq!(config.identity.stroke_color.as_str(), "#020595");
        assert_eq!(config.tools.pan_radius, 0.30);
        assert!(config.axis_lock);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PlotterConfig::from_json(r#"{"toolScale": 2.0, "tools": {"ringWidth": 0.5}}"#).unwrap();
        assert_eq!(config.tool_scale, 2.0);
        assert_eq!(config.tools.ring_width, 0.5);
        assert_eq!(config.tools.pan_radius, 0.30);
        assert_eq!(config.canvas_fill_ratio, 0.95);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(PlotterConfig::from_json("{}").unwrap(), PlotterConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let mut config = PlotterConfig::default();
        config.axis_lock = false;
        let json = config.to_json().unwrap();
        assert_eq!(PlotterConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_bad_color_is_error() {
        assert!(PlotterConfig::from_json(r#"{"identity": {"strokeColor": "blue"}}"#).is_err());
    }
}
