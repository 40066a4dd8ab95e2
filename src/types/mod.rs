use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared type of a flag, as reported by the evaluation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlagType {
    Boolean,
    String,
    Number,
}

impl FlagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagType::Boolean => "BOOLEAN",
            FlagType::String => "STRING",
            FlagType::Number => "NUMBER",
        }
    }
}

impl std::fmt::Display for FlagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
    String(String),
    #[default]
    Null,
    Json(serde_json::Value),
}

impl FlagValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            FlagValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FlagValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FlagValue::Number(n) if n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    /// Raw payload of an object or array value.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            FlagValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FlagValue::Null)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::String(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::String(value.to_string())
    }
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        FlagValue::Number(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Number(value as f64)
    }
}

/// A Rust type a flag can be read as.
///
/// The typed getters on [`FeatureFlagClient`](crate::FeatureFlagClient) only
/// hand out a value when the declared [`FlagType`] equals `FLAG_TYPE` and the
/// payload converts; no cross-type coercion takes place.
pub trait FlagValueType: Sized {
    const FLAG_TYPE: FlagType;

    fn from_flag_value(value: &FlagValue) -> Option<Self>;
}

impl FlagValueType for bool {
    const FLAG_TYPE: FlagType = FlagType::Boolean;

    fn from_flag_value(value: &FlagValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FlagValueType for String {
    const FLAG_TYPE: FlagType = FlagType::String;

    fn from_flag_value(value: &FlagValue) -> Option<Self> {
        value.as_string().map(str::to_string)
    }
}

impl FlagValueType for f64 {
    const FLAG_TYPE: FlagType = FlagType::Number;

    fn from_flag_value(value: &FlagValue) -> Option<Self> {
        value.as_number()
    }
}

impl FlagValueType for i64 {
    const FLAG_TYPE: FlagType = FlagType::Number;

    fn from_flag_value(value: &FlagValue) -> Option<Self> {
        value.as_int()
    }
}

/// Outcome of evaluating one flag for one (flag, user) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub flag_key: String,
    #[serde(default)]
    pub value: FlagValue,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    /// `true` when the flag's static default was served rather than a variant.
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

impl EvaluationResult {
    pub fn new(flag_key: impl Into<String>, value: impl Into<FlagValue>, flag_type: FlagType) -> Self {
        Self {
            flag_key: flag_key.into(),
            value: value.into(),
            flag_type,
            is_default: true,
            variant_id: None,
        }
    }

    pub fn with_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.is_default = false;
        self.variant_id = Some(variant_id.into());
        self
    }

    /// The value as `T`, or `None` when the declared type is not `T`'s.
    pub fn typed_value<T: FlagValueType>(&self) -> Option<T> {
        if self.flag_type != T::FLAG_TYPE {
            return None;
        }
        T::from_flag_value(&self.value)
    }
}

/// Answer of one bulk evaluation round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkEvaluationResult {
    pub flags: HashMap<String, EvaluationResult>,
}
