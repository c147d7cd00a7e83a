//! The saved maneuver file.
//!
//! Loading happens in two steps: a structural check on the raw JSON value,
//! then a typed decode. A document that fails either step is rejected as a
//! whole.

use crate::color::HexColor;
use crate::direction_arrow::DirectionArrow;
use crate::scene::ShipData;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Missing field {0}")]
    MissingField(String),
    #[error("Field {path} must be {expected}")]
    WrongType { path: String, expected: &'static str },
    #[error("Failed to decode document: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("{path} {value:?} appears more than once")]
    Duplicate { path: String, value: String },
    #[error("Background image is not valid base64: {0}")]
    InvalidImage(#[from] base64::DecodeError),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Background image embedded in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundImage {
    /// Base64 of the raw file bytes.
    pub content: String,
    /// MIME type, e.g. `image/png`.
    #[serde(rename = "type")]
    pub mime_type: String,
    pub extension: String,
}

impl BackgroundImage {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            content: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
            extension: extension.into(),
        }
    }

    /// Build from a file name, taking the extension after the last dot.
    pub fn from_file(bytes: &[u8], file_name: &str, mime_type: impl Into<String>) -> Self {
        let extension = file_name.rsplit_once('.').map_or(file_name, |(_, ext)| ext);
        Self::from_bytes(bytes, mime_type, extension)
    }

    pub fn decode(&self) -> DocumentResult<Vec<u8>> {
        Ok(STANDARD.decode(&self.content)?)
    }

    pub fn file_name(&self) -> String {
        format!("background.{}", self.extension)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    pub bg_image: Option<BackgroundImage>,
    pub ship_stroke_color: HexColor,
}

/// Everything needed to restore a plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManeuverDocument {
    pub general: GeneralSettings,
    pub ship_data: ShipData,
    pub direction_arrows: Vec<DirectionArrow>,
}

impl ManeuverDocument {
    pub fn to_json(&self) -> DocumentResult<String> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Encode)
    }

    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let value: Value = serde_json::from_str(json).map_err(DocumentError::InvalidJson)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> DocumentResult<Self> {
        validate_structure(&value)?;
        let document: Self = serde_json::from_value(value).map_err(DocumentError::Decode)?;
        document.check_unique_keys()?;
        Ok(document)
    }

    /// Ship ids and arrow labels identify entries, so each may occur once.
    fn check_unique_keys(&self) -> DocumentResult<()> {
        first_repeat(self.ship_data.ships.iter().map(|ship| ship.id.as_str()), "shipData.ships[].id")?;
        first_repeat(
            self.direction_arrows.iter().map(|arrow| arrow.label.as_str()),
            "directionArrows[].label",
        )
    }
}

fn first_repeat<'a>(keys: impl Iterator<Item = &'a str>, path: &str) -> DocumentResult<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(DocumentError::Duplicate {
                path: path.to_string(),
                value: key.to_string(),
            });
        }
    }
    Ok(())
}

fn as_object<'a>(value: &'a Value, path: &str) -> DocumentResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| DocumentError::WrongType {
        path: path.to_string(),
        expected: "an object",
    })
}

fn field<'a>(object: &'a Map<String, Value>, parent: &str, key: &str) -> DocumentResult<(&'a Value, String)> {
    let path = if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    };
    match object.get(key) {
        Some(value) => Ok((value, path)),
        None => Err(DocumentError::MissingField(path)),
    }
}

fn expect(ok: bool, path: String, expected: &'static str) -> DocumentResult<()> {
    if ok {
        Ok(())
    } else {
        Err(DocumentError::WrongType { path, expected })
    }
}

/// Check the shape of a raw document before decoding it.
pub fn validate_structure(value: &Value) -> DocumentResult<()> {
    let root = as_object(value, "document")?;

    let (general, path) = field(root, "", "general")?;
    let general = as_object(general, &path)?;

    let (bg_image, path) = field(general, "general", "bgImage")?;
    if !bg_image.is_null() {
        let image = as_object(bg_image, &path)?;
        for key in ["content", "type", "extension"] {
            let (value, key_path) = field(image, &path, key)?;
            expect(value.is_string(), key_path, "a string")?;
        }
    }

    let (color, path) = field(general, "general", "shipStrokeColor")?;
    expect(color.is_string(), path, "a string")?;

    let (ship_data, path) = field(root, "", "shipData")?;
    let ship_data = as_object(ship_data, &path)?;

    let (ships, path) = field(ship_data, "shipData", "ships")?;
    let ships = ships.as_array().ok_or_else(|| DocumentError::WrongType {
        path: path.clone(),
        expected: "an array",
    })?;
    if let Some(first) = ships.first() {
        let first_path = format!("{path}[0]");
        let first = as_object(first, &first_path)?;
        for key in ["position", "length", "width"] {
            field(first, &first_path, key)?;
        }
    }

    for key in ["identityLength", "identityWidth"] {
        let (value, key_path) = field(ship_data, "shipData", key)?;
        expect(value.is_number(), key_path, "a number")?;
    }

    let (arrows, path) = field(root, "", "directionArrows")?;
    expect(arrows.is_array(), path, "an array")?;

    Ok(())
}
