//! Wind and current indicators.
//!
//! [`DirectionArrow`] is the stored form; [`RelativeArrow`] adds the shape
//! sized for the current canvas.

use crate::color::CssColor;
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};

/// Arrow length as a share of canvas width.
pub const ARROW_LENGTH_RATIO: f64 = 0.02;
/// Arrows never get shorter than this, in pixels.
pub const MIN_ARROW_LENGTH: f64 = 30.0;
pub const MAX_DIRECTION: f64 = 359.0;
/// Knots.
pub const MAX_STRENGTH: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowSymbol {
    Arrow,
    Wind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionArrow {
    pub label: String,
    /// Compass degrees the arrow points to.
    pub direction: f64,
    pub strength: f64,
    pub symbol: ArrowSymbol,
    pub color: CssColor,
}

impl DirectionArrow {
    pub fn new(label: impl Into<String>, symbol: ArrowSymbol, color: CssColor) -> Self {
        Self {
            label: label.into(),
            direction: 0.0,
            strength: 1.0,
            symbol,
            color,
        }
    }

    pub fn to_relative(&self, canvas_width: f64) -> RelativeArrow {
        let shape = match self.symbol {
            ArrowSymbol::Arrow => arrow_shape(canvas_width),
            ArrowSymbol::Wind => wind_shape(canvas_width, self.strength),
        };

        RelativeArrow {
            label: self.label.clone(),
            direction: self.direction,
            strength: self.strength,
            symbol: self.symbol,
            color: self.color.clone(),
            path: shape.path,
            length: shape.length,
            width: shape.width,
        }
    }
}

/// An arrow with its shape for the current canvas.
#[derive(Debug, Clone)]
pub struct RelativeArrow {
    pub label: String,
    pub direction: f64,
    pub strength: f64,
    pub symbol: ArrowSymbol,
    pub color: CssColor,
    /// Centered on the origin, pointing up (towards -y) before rotation.
    pub path: BezPath,
    pub length: f64,
    pub width: f64,
}

/// Path plus the size it was built for.
#[derive(Debug, Clone)]
pub struct ArrowShape {
    pub path: BezPath,
    pub length: f64,
    pub width: f64,
}

pub fn arrow_length(canvas_width: f64) -> f64 {
    (ARROW_LENGTH_RATIO * canvas_width).max(MIN_ARROW_LENGTH)
}

/// Filled chevron.
pub fn arrow_shape(canvas_width: f64) -> ArrowShape {
    let length = arrow_length(canvas_width);
    let width = length * 0.7;
    let half_length = length / 2.0;
    let half_width = width / 2.0;

    let mut path = BezPath::new();
    path.move_to((0.0, -half_length));
    path.line_to((half_width, half_length));
    path.line_to((0.0, length * 0.3));
    path.line_to((-half_width, half_length));
    path.close_path();

    ArrowShape { path, length, width }
}

/// One side line on a wind arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Barb {
    /// Ten knots.
    Full,
    /// A remainder below five knots.
    Half,
}

/// Barbs drawn for a wind strength, from the head of the stem down.
///
/// Every full ten knots is a full barb. A remainder adds one more barb,
/// half when it is below five and full otherwise.
pub fn wind_barbs(strength: f64) -> Vec<Barb> {
    let strength = strength.max(0.0);
    let full = (strength / 10.0).floor() as usize;
    let remainder = strength % 10.0;

    let mut barbs = vec![Barb::Full; full];
    if remainder > 0.0 {
        barbs.push(if remainder < 5.0 { Barb::Half } else { Barb::Full });
    }
    barbs
}

/// Stem with barbs, stroked.
pub fn wind_shape(canvas_width: f64, strength: f64) -> ArrowShape {
    let length = arrow_length(canvas_width);
    let width = length * 0.5;

    let mut path = BezPath::new();
    path.move_to((0.0, 0.5 * length));
    path.line_to((0.0, -0.4 * length));

    for (i, barb) in wind_barbs(strength).into_iter().enumerate() {
        let height = (-0.4 + i as f64 * 0.1) * length;
        path.move_to((0.0, height));
        let end = match barb {
            Barb::Full => Point::new(width, height - 0.1 * length),
            Barb::Half => Point::new(width / 2.0, height - 0.05 * length),
        };
        path.line_to(end);
    }

    ArrowShape { path, length, width }
}

fn clamp_direction(direction: f64) -> f64 {
    if direction.is_nan() {
        return 0.0;
    }
    direction.clamp(0.0, MAX_DIRECTION)
}

fn clamp_strength(strength: f64) -> f64 {
    if strength.is_nan() {
        return 0.0;
    }
    strength.clamp(0.0, MAX_STRENGTH)
}

/// The arrows of a plot, keyed by label.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionArrows {
    arrows: Vec<DirectionArrow>,
    revision: u64,
}

impl Default for DirectionArrows {
    fn default() -> Self {
        Self {
            arrows: default_arrows(),
            revision: 0,
        }
    }
}

/// Wind and current, both pointing north at one knot.
pub fn default_arrows() -> Vec<DirectionArrow> {
    vec![
        DirectionArrow::new("Wind", ArrowSymbol::Wind, CssColor::from_static("darkred")),
        DirectionArrow::new("Current", ArrowSymbol::Arrow, CssColor::from_static("darkblue")),
    ]
}

impl DirectionArrows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arrows(&self) -> &[DirectionArrow] {
        &self.arrows
    }

    pub fn get(&self, label: &str) -> Option<&DirectionArrow> {
        self.arrows.iter().find(|arrow| arrow.label == label)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Set direction and strength of the arrow with `label`, clamped to
    /// their ranges. Returns `false` for an unknown label.
    pub fn update_arrow(&mut self, label: &str, direction: f64, strength: f64) -> bool {
        let Some(arrow) = self.arrows.iter_mut().find(|arrow| arrow.label == label) else {
            log::warn!("No direction arrow labelled {label}");
            return false;
        };

        arrow.direction = clamp_direction(direction);
        arrow.strength = clamp_strength(strength);
        self.revision += 1;
        true
    }

    /// Replace all arrows. Direction and strength are clamped to their
    /// ranges, and only the first arrow of each label is kept.
    pub fn load(&mut self, arrows: Vec<DirectionArrow>) {
        let mut loaded: Vec<DirectionArrow> = Vec::with_capacity(arrows.len());
        for mut arrow in arrows {
            if loaded.iter().any(|kept| kept.label == arrow.label) {
                log::warn!("Dropping second direction arrow labelled {}", arrow.label);
                continue;
            }
            arrow.direction = clamp_direction(arrow.direction);
            arrow.strength = clamp_strength(arrow.strength);
            loaded.push(arrow);
        }
        self.arrows = loaded;
        self.revision += 1;
    }

    pub fn relative(&self, canvas_width: f64) -> Vec<RelativeArrow> {
        self.arrows.iter().map(|arrow| arrow.to_relative(canvas_width)).collect()
    }
}
