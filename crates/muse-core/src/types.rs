use serde::{Deserialize, Serialize};

/// Experimental arm controlling when AI-generated examples are shown
/// relative to the participant's own response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Only the brief or image is shown; AI examples are never shown.
    NoAi,
    /// AI examples are shown before the participant responds.
    AiFirst,
    /// AI examples are revealed only after the participant has responded.
    HumanFirst,
}

impl Condition {
    /// All conditions in the canonical fixed counterbalancing order.
    pub const FIXED_ORDER: [Condition; 3] =
        [Condition::NoAi, Condition::AiFirst, Condition::HumanFirst];

    /// Stable label used in ledger keys and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Condition::NoAi => "no-ai",
            Condition::AiFirst => "ai-first",
            Condition::HumanFirst => "human-first",
        }
    }
}

/// Identifier for an item in the content catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Creates a new identifier from its raw string representation.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw string representation of the identifier.
    pub fn as_raw(&self) -> &str {
        &self.0
    }
}

/// One typed participant answer held by the response ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ResponseValue {
    /// Free text (single or multi line).
    Text(String),
    /// Ordinal rating on the fixed 1..=5 scale.
    Scale(u8),
    /// One option from an enumerated single-choice field.
    Choice(String),
    /// Binary yes/no answer.
    YesNo(bool),
}

impl ResponseValue {
    /// Midpoint default for scale fields.
    pub const SCALE_DEFAULT: u8 = 3;

    /// Flattens the value to one tabular cell.
    pub fn to_cell(&self) -> String {
        match self {
            ResponseValue::Text(text) => text.clone(),
            ResponseValue::Scale(rating) => rating.to_string(),
            ResponseValue::Choice(option) => option.clone(),
            ResponseValue::YesNo(true) => "Yes".to_string(),
            ResponseValue::YesNo(false) => "No".to_string(),
        }
    }

    /// Whether a free-text value is empty after trimming whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, ResponseValue::Text(text) if text.trim().is_empty())
    }
}
