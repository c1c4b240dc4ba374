//! One raw entry of a scenario file.
//!
//! Scenario files are hand-written, so fields are read loosely: text may be a
//! string or a list of lines, numbers may be quoted, and `correct` is 1-based
//! when quoted and 0-based when numeric.

use quizroom_core::model::Mechanic;
use serde::Deserialize;
use serde_json::Value;

/// A text field given either as one string or as a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TextBlock {
    Single(String),
    Lines(Vec<String>),
}

impl TextBlock {
    /// The text with list entries joined by newlines.
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            Self::Single(text) => text.clone(),
            Self::Lines(lines) => lines.join("\n"),
        }
    }
}

/// A scenario entry before normalization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScenarioItem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<TextBlock>,
    #[serde(default)]
    pub text: Option<TextBlock>,
    #[serde(default)]
    pub options: Vec<Value>,
    #[serde(default)]
    pub correct: Option<Value>,
    #[serde(default)]
    pub correct_options: Vec<Value>,
    #[serde(default)]
    pub other_options: Vec<Value>,
    #[serde(default)]
    pub points: Option<Value>,
    /// Timer length in seconds.
    #[serde(default)]
    pub time: Option<Value>,
}

impl ScenarioItem {
    /// Creates an item of the given kind with every other field empty.
    #[must_use]
    pub fn of_kind(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_owned()),
            ..Self::default()
        }
    }

    /// The mechanic named by `type`, if it is one the engine runs.
    #[must_use]
    pub fn mechanic(&self) -> Option<Mechanic> {
        self.kind.as_deref().and_then(Mechanic::from_tag)
    }

    /// Title, or `fallback` when absent or blank.
    #[must_use]
    pub fn title_or(&self, fallback: &str) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(fallback)
            .to_owned()
    }

    /// `description`, falling back to `text`.
    #[must_use]
    pub fn body(&self) -> Option<String> {
        self.description
            .as_ref()
            .or(self.text.as_ref())
            .map(TextBlock::joined)
            .filter(|b| !b.is_empty())
    }

    /// Option labels, stringified.
    #[must_use]
    pub fn option_texts(&self) -> Vec<String> {
        self.options.iter().filter_map(scalar_text).collect()
    }

    /// `time` converted to milliseconds.
    #[must_use]
    pub fn timer_ms(&self) -> Option<u64> {
        self.time.as_ref().and_then(non_negative).map(|s| s * 1000)
    }

    /// `points` as an integer.
    #[must_use]
    pub fn points_value(&self) -> Option<i64> {
        self.points
            .as_ref()
            .and_then(non_negative)
            .and_then(|p| i64::try_from(p).ok())
    }
}

/// Renders a scalar YAML/JSON value as option text.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reads a correct-answer reference: a digit string is 1-based, an integer
/// is 0-based.
#[must_use]
pub fn correct_index(value: &Value) -> Option<u32> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            trimmed.parse::<u32>().ok()?.checked_sub(1)
        }
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn non_negative(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        _ => None,
    }
}
