//! Segment: one straight stroke piece with its tool/style metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::CodecError;

/// Drawing tool. Determines rendering style only, never geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Pen,
    #[default]
    Pencil,
    Brush,
    Eraser,
}

impl Tool {
    /// Every tool, in toolbar order.
    pub const ALL: [Tool; 4] = [Tool::Pen, Tool::Pencil, Tool::Brush, Tool::Eraser];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pen => "pen",
            Self::Pencil => "pencil",
            Self::Brush => "brush",
            Self::Eraser => "eraser",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| CodecError::UnknownTool(s.to_owned()))
    }
}

/// One atomic straight-line drawing instruction.
///
/// Coordinates are pixels in the sender's own canvas space; they are not
/// normalized, so peers with different canvas sizes see the stroke at the
/// same pixel position rather than the same relative position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub tool: Tool,
    pub color: String,
    /// Base width before the tool's multiplier. Browsers report range input
    /// values as strings, so numeric strings are accepted on decode.
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub width: f64,
}

impl Segment {
    /// Wire payload for this segment.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "x1": self.x1,
            "y1": self.y1,
            "x2": self.x2,
            "y2": self.y2,
            "tool": self.tool.as_str(),
            "color": self.color,
            "width": self.width,
        })
    }
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}
