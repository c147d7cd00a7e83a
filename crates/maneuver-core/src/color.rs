//! Hex color values as they appear in saved documents.

use peniko::Color;
use peniko::color::Srgb;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default stroke color for ships without their own color.
pub const DEFAULT_SHIP_STROKE_COLOR: &str = "#020595";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Color must look like #RRGGBB, got {0:?}")]
    InvalidFormat(String),
    #[error("Color must not be empty")]
    Empty,
}

/// A `#RRGGBB` color.
///
/// The input spelling is kept so documents round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColor {
    text: String,
    rgb: [u8; 3],
}

impl HexColor {
    pub fn parse(text: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidFormat(text.to_string());

        let digits = text.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self {
            text: text.to_string(),
            rgb: [channel(0)?, channel(2)?, channel(4)?],
        })
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            text: format!("#{r:02x}{g:02x}{b:02x}"),
            rgb: [r, g, b],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    /// The color with an explicit alpha, e.g. `0x33` for tool fills.
    pub fn with_alpha(&self, alpha: u8) -> Color {
        let [r, g, b] = self.rgb;
        Color::from_rgba8(r, g, b, alpha)
    }

    pub fn default_ship_stroke() -> Self {
        Self::from_rgb(0x02, 0x05, 0x95)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::default_ship_stroke()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&HexColor> for Color {
    fn from(color: &HexColor) -> Self {
        color.with_alpha(255)
    }
}

impl From<HexColor> for Color {
    fn from(color: HexColor) -> Self {
        (&color).into()
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Any CSS color string, e.g. `darkred` or `#8b0000`.
///
/// Arrow colors are stored as written; they are only interpreted when drawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CssColor(String);

impl CssColor {
    pub fn parse(text: &str) -> Result<Self, ColorError> {
        if text.trim().is_empty() {
            return Err(ColorError::Empty);
        }
        Ok(Self(text.to_string()))
    }

    pub(crate) fn from_static(text: &'static str) -> Self {
        Self(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve for drawing. `None` when the string is not a color CSS knows.
    pub fn to_color(&self) -> Option<Color> {
        peniko::color::parse_color(self.0.trim())
            .ok()
            .map(|color| color.to_alpha_color::<Srgb>())
    }
}

impl From<&HexColor> for CssColor {
    fn from(color: &HexColor) -> Self {
        Self(color.as_str().to_string())
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CssColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
